//! UserCoupons repo, responsible for handling user_coupons table

use diesel;
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_dsl::RunQueryDsl;
use diesel::Connection;
use failure::Error as FailureError;

use models::UserCoupon;
use repos::types::RepoResult;
use schema::user_coupons::dsl as DslUserCoupons;

/// UserCoupons repository, responsible for handling coupon assignments
pub struct UserCouponsRepoImpl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> {
    pub db_conn: &'a T,
}

pub trait UserCouponsRepo {
    /// Get the assignment of a coupon to a user
    fn find(&self, user_id: i32, coupon_id: i32) -> RepoResult<Option<UserCoupon>>;

    /// Flag an unused assignment as used. Returns the number of updated
    /// rows: zero means the assignment is missing or already used.
    fn mark_as_used(&self, user_id: i32, coupon_id: i32) -> RepoResult<usize>;
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> UserCouponsRepoImpl<'a, T> {
    pub fn new(db_conn: &'a T) -> Self {
        Self { db_conn }
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> UserCouponsRepo
    for UserCouponsRepoImpl<'a, T>
{
    /// Get the assignment of a coupon to a user
    fn find(&self, user_id: i32, coupon_id: i32) -> RepoResult<Option<UserCoupon>> {
        debug!("Find assignment of coupon {} to user {}.", coupon_id, user_id);
        let query = DslUserCoupons::user_coupons
            .filter(DslUserCoupons::user_id.eq(user_id))
            .filter(DslUserCoupons::coupon_id.eq(coupon_id));

        query
            .get_result(self.db_conn)
            .optional()
            .map_err(From::from)
            .map_err(|e: FailureError| {
                e.context(format!(
                    "Find assignment of coupon: {} to user: {} error occurred",
                    coupon_id, user_id
                )).into()
            })
    }

    /// Flag an unused assignment as used
    fn mark_as_used(&self, user_id: i32, coupon_id: i32) -> RepoResult<usize> {
        debug!("Mark coupon {} as used by user {}.", coupon_id, user_id);
        let filtered = DslUserCoupons::user_coupons
            .filter(DslUserCoupons::user_id.eq(user_id))
            .filter(DslUserCoupons::coupon_id.eq(coupon_id))
            .filter(DslUserCoupons::is_used.eq(false));
        let query = diesel::update(filtered).set(DslUserCoupons::is_used.eq(true));

        query
            .execute(self.db_conn)
            .map_err(From::from)
            .map_err(|e: FailureError| {
                e.context(format!(
                    "Mark coupon: {} as used by user: {} error occurred",
                    coupon_id, user_id
                )).into()
            })
    }
}

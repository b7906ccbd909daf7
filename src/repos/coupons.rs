//! Coupons repo, responsible for handling coupons table

use diesel;
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_dsl::RunQueryDsl;
use diesel::Connection;
use failure::Error as FailureError;

use models::{normalize_coupon_code, Coupon};
use repos::types::RepoResult;
use schema::coupons::dsl as Coupons;

/// Coupons repository, read side plus the usage counter
pub struct CouponsRepoImpl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> {
    pub db_conn: &'a T,
}

pub trait CouponsRepo {
    /// Get coupon by code, ignoring case and surrounding whitespace
    fn find_by_code(&self, code: &str) -> RepoResult<Option<Coupon>>;

    /// Increment current_uses of a coupon while it is below max_uses.
    /// Returns the number of updated rows: zero means the quota is
    /// already spent.
    fn increment_usage(&self, coupon_id: i32) -> RepoResult<usize>;
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CouponsRepoImpl<'a, T> {
    pub fn new(db_conn: &'a T) -> Self {
        Self { db_conn }
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CouponsRepo for CouponsRepoImpl<'a, T> {
    /// Get coupon by code, ignoring case and surrounding whitespace
    fn find_by_code(&self, code: &str) -> RepoResult<Option<Coupon>> {
        debug!("Find coupon with code {}.", code);
        // Codes are stored upper-cased, so one normalized equality
        // comparison is enough.
        let code = normalize_coupon_code(code);
        let query = Coupons::coupons.filter(Coupons::code.eq(&code));
        query
            .get_result(self.db_conn)
            .optional()
            .map_err(From::from)
            .map_err(|e: FailureError| e.context(format!("Find coupon by code: {} error occurred", code)).into())
    }

    /// Increment current_uses of a coupon while it is below max_uses
    fn increment_usage(&self, coupon_id: i32) -> RepoResult<usize> {
        debug!("Increment usage of coupon with id {}.", coupon_id);
        let filtered = Coupons::coupons
            .filter(Coupons::id.eq(coupon_id))
            .filter(Coupons::current_uses.lt(Coupons::max_uses));
        let query = diesel::update(filtered).set(Coupons::current_uses.eq(Coupons::current_uses + 1));

        query
            .execute(self.db_conn)
            .map_err(From::from)
            .map_err(|e: FailureError| e.context(format!("Increment usage of coupon: {} error occurred", coupon_id)).into())
    }
}

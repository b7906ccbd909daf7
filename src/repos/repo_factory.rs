use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;

use repos::*;

pub trait ReposFactory<C: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static>: Clone + Send + 'static {
    fn create_coupons_repo<'a>(&self, db_conn: &'a C) -> Box<CouponsRepo + 'a>;
    fn create_user_coupons_repo<'a>(&self, db_conn: &'a C) -> Box<UserCouponsRepo + 'a>;
}

#[derive(Clone, Copy, Default)]
pub struct ReposFactoryImpl;

impl ReposFactoryImpl {
    pub fn new() -> Self {
        ReposFactoryImpl
    }
}

impl<C: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> ReposFactory<C> for ReposFactoryImpl {
    fn create_coupons_repo<'a>(&self, db_conn: &'a C) -> Box<CouponsRepo + 'a> {
        Box::new(CouponsRepoImpl::new(db_conn)) as Box<CouponsRepo>
    }
    fn create_user_coupons_repo<'a>(&self, db_conn: &'a C) -> Box<UserCouponsRepo + 'a> {
        Box::new(UserCouponsRepoImpl::new(db_conn)) as Box<UserCouponsRepo>
    }
}

#[cfg(test)]
pub mod tests {

    use std::error::Error;
    use std::fmt;
    use std::sync::Arc;
    use std::time::SystemTime;

    use chrono::NaiveDate;
    use diesel::connection::AnsiTransactionManager;
    use diesel::connection::SimpleConnection;
    use diesel::deserialize::QueryableByName;
    use diesel::pg::Pg;
    use diesel::query_builder::AsQuery;
    use diesel::query_builder::QueryFragment;
    use diesel::query_builder::QueryId;
    use diesel::sql_types::HasSqlType;
    use diesel::Connection;
    use diesel::ConnectionResult;
    use diesel::QueryResult;
    use diesel::Queryable;
    use futures_cpupool::CpuPool;
    use r2d2;
    use r2d2::ManageConnection;

    use config::Config;
    use controller::context::*;
    use models::*;
    use repos::*;
    use services::*;

    pub const MOCK_REPO_FACTORY: ReposFactoryMock = ReposFactoryMock {};
    pub static MOCK_USER_ID: i32 = 1;
    pub static MOCK_USER_ID_USED: i32 = 2;
    pub static MOCK_COUPON_CODE: &'static str = "SAVE10";
    pub static MOCK_COUPON_CODE_EXPIRED: &'static str = "EXPIRED10";
    pub static MOCK_COUPON_CODE_EXHAUSTED: &'static str = "MAXUSED";
    pub static MOCK_COUPON_CODE_THIRD_PARTY: &'static str = "THIRDPARTY25";
    // Looks available on read, but the conditional increment reports the
    // quota as spent. Simulates a concurrent consumer winning the race.
    pub static MOCK_COUPON_CODE_RACED: &'static str = "LASTONE";
    // Any lookup of this code fails, flows that must not read the
    // coupons table stay unaffected by it.
    pub static MOCK_COUPON_CODE_BROKEN: &'static str = "BROKEN";

    pub fn create_service(vendor_valid: bool) -> Service<MockConnection, MockConnectionManager, ReposFactoryMock> {
        let manager = MockConnectionManager::default();
        let db_pool = r2d2::Pool::builder().build(manager).expect("Failed to create connection pool");
        let cpu_pool = CpuPool::new(1);

        let config = Config::new().unwrap();
        let coupon_verifier = Arc::new(MockCouponVerifier { valid: vendor_valid }) as Arc<CouponVerifier>;
        let static_context = StaticContext::new(db_pool, cpu_pool, Arc::new(config), MOCK_REPO_FACTORY, coupon_verifier);
        let dynamic_context = DynamicContext::new(None);

        Service::new(static_context, dynamic_context)
    }

    pub struct MockCouponVerifier {
        pub valid: bool,
    }

    impl CouponVerifier for MockCouponVerifier {
        fn verify(&self, _code: &str) -> bool {
            self.valid
        }
    }

    #[derive(Default, Copy, Clone)]
    pub struct ReposFactoryMock;

    impl<C: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> ReposFactory<C> for ReposFactoryMock {
        fn create_coupons_repo<'a>(&self, _db_conn: &'a C) -> Box<CouponsRepo + 'a> {
            Box::new(CouponsRepoMock::default()) as Box<CouponsRepo>
        }
        fn create_user_coupons_repo<'a>(&self, _db_conn: &'a C) -> Box<UserCouponsRepo + 'a> {
            Box::new(UserCouponsRepoMock::default()) as Box<UserCouponsRepo>
        }
    }

    #[derive(Clone, Default)]
    pub struct CouponsRepoMock;

    impl CouponsRepo for CouponsRepoMock {
        fn find_by_code(&self, code: &str) -> RepoResult<Option<Coupon>> {
            let code = normalize_coupon_code(code);
            if code == "BROKEN" {
                return Err(format_err!("Find coupon by code: {} error occurred", code));
            }
            let coupon = match code.as_ref() {
                "SAVE10" => Some(create_coupon(1, "SAVE10", 10f64, far_future(), false, 100, 0)),
                "EXPIRED10" => Some(create_coupon(4, "EXPIRED10", 10f64, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), false, 100, 0)),
                "MAXUSED" => Some(create_coupon(5, "MAXUSED", 10f64, far_future(), false, 1, 1)),
                "THIRDPARTY25" => Some(create_coupon(6, "THIRDPARTY25", 25f64, far_future(), true, 100, 0)),
                "LASTONE" => Some(create_coupon(7, "LASTONE", 10f64, far_future(), false, 1, 0)),
                _ => None,
            };
            Ok(coupon)
        }

        fn increment_usage(&self, coupon_id: i32) -> RepoResult<usize> {
            match coupon_id {
                5 | 7 => Ok(0),
                _ => Ok(1),
            }
        }
    }

    #[derive(Clone, Default)]
    pub struct UserCouponsRepoMock;

    impl UserCouponsRepo for UserCouponsRepoMock {
        fn find(&self, user_id: i32, coupon_id: i32) -> RepoResult<Option<UserCoupon>> {
            let assignment = match (user_id, coupon_id) {
                (1, _) => Some(create_user_coupon(user_id, coupon_id, false)),
                (2, 1) => Some(create_user_coupon(user_id, coupon_id, true)),
                _ => None,
            };
            Ok(assignment)
        }

        fn mark_as_used(&self, user_id: i32, coupon_id: i32) -> RepoResult<usize> {
            match self.find(user_id, coupon_id)? {
                Some(ref assignment) if !assignment.is_used => Ok(1),
                _ => Ok(0),
            }
        }
    }

    pub fn create_coupon(
        id: i32,
        code: &str,
        discount_amount: f64,
        expiry_date: NaiveDate,
        is_third_party: bool,
        max_uses: i32,
        current_uses: i32,
    ) -> Coupon {
        Coupon {
            id,
            code: code.to_string(),
            discount_amount,
            expiry_date,
            is_third_party,
            max_uses,
            current_uses,
            created_at: SystemTime::now(),
            updated_at: SystemTime::now(),
        }
    }

    pub fn create_user_coupon(user_id: i32, coupon_id: i32, is_used: bool) -> UserCoupon {
        UserCoupon {
            id: 1,
            user_id,
            coupon_id,
            assigned_at: SystemTime::now(),
            is_used,
        }
    }

    fn far_future() -> NaiveDate {
        NaiveDate::from_ymd_opt(2099, 12, 31).unwrap()
    }

    #[derive(Default)]
    pub struct MockConnection {
        tr: AnsiTransactionManager,
    }

    impl Connection for MockConnection {
        type Backend = Pg;
        type TransactionManager = AnsiTransactionManager;

        fn establish(_database_url: &str) -> ConnectionResult<MockConnection> {
            Ok(MockConnection::default())
        }

        fn execute(&self, _query: &str) -> QueryResult<usize> {
            unimplemented!()
        }

        fn query_by_index<T, U>(&self, _source: T) -> QueryResult<Vec<U>>
        where
            T: AsQuery,
            T::Query: QueryFragment<Pg> + QueryId,
            Pg: HasSqlType<T::SqlType>,
            U: Queryable<T::SqlType, Pg>,
        {
            unimplemented!()
        }

        fn query_by_name<T, U>(&self, _source: &T) -> QueryResult<Vec<U>>
        where
            T: QueryFragment<Pg> + QueryId,
            U: QueryableByName<Pg>,
        {
            unimplemented!()
        }

        fn execute_returning_count<T>(&self, _source: &T) -> QueryResult<usize>
        where
            T: QueryFragment<Pg> + QueryId,
        {
            unimplemented!()
        }

        fn transaction_manager(&self) -> &Self::TransactionManager {
            &self.tr
        }
    }

    impl SimpleConnection for MockConnection {
        fn batch_execute(&self, _query: &str) -> QueryResult<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct MockConnectionManager;

    impl ManageConnection for MockConnectionManager {
        type Connection = MockConnection;
        type Error = MockError;

        fn connect(&self) -> Result<MockConnection, MockError> {
            Ok(MockConnection::default())
        }

        fn is_valid(&self, _conn: &mut MockConnection) -> Result<(), MockError> {
            Ok(())
        }

        fn has_broken(&self, _conn: &mut MockConnection) -> bool {
            false
        }
    }

    #[derive(Debug)]
    pub struct MockError {}

    impl fmt::Display for MockError {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "MockError is here!")
        }
    }

    impl Error for MockError {
        fn description(&self) -> &str {
            "Mock connection error"
        }

        fn cause(&self) -> Option<&Error> {
            None
        }
    }
}

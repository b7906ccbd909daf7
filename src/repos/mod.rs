//! Repos is a module responsible for interacting with postgres db

pub mod coupons;
pub mod repo_factory;
pub mod types;
pub mod user_coupons;

pub use self::coupons::*;
pub use self::repo_factory::*;
pub use self::types::*;
pub use self::user_coupons::*;

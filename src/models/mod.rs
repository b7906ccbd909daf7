//! Models contains all structures that are used in different
//! modules of the app

pub mod coupon;
pub mod discount;
pub mod user_coupon;
pub mod validation_rules;

pub use self::coupon::*;
pub use self::discount::*;
pub use self::user_coupon::*;

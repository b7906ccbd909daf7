//! Services is a core layer for the app business logic

pub mod discounts;
pub mod system;
pub mod types;
pub mod vendor;

pub use self::discounts::*;
pub use self::system::*;
pub use self::types::*;
pub use self::vendor::*;

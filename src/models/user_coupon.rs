//! Model user_coupon

use std::time::SystemTime;

use schema::user_coupons;

/// Assignment of a coupon to a user. Rows are never deleted, a consumed
/// assignment is flagged with `is_used`.
#[derive(Debug, Serialize, Deserialize, Queryable, Clone, Identifiable)]
#[table_name = "user_coupons"]
pub struct UserCoupon {
    pub id: i32,
    pub user_id: i32,
    pub coupon_id: i32,
    pub assigned_at: SystemTime,
    pub is_used: bool,
}

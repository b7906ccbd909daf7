//! Model coupon

use std::time::SystemTime;

use chrono::NaiveDate;

use schema::coupons;

/// Payload for querying coupons
#[derive(Debug, Serialize, Deserialize, Queryable, Clone, Identifiable)]
#[table_name = "coupons"]
pub struct Coupon {
    pub id: i32,
    pub code: String,
    pub discount_amount: f64,
    pub expiry_date: NaiveDate,
    pub is_third_party: bool,
    pub max_uses: i32,
    pub current_uses: i32,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl Coupon {
    pub fn has_remaining_uses(&self) -> bool {
        self.current_uses < self.max_uses
    }
}

/// Coupon codes are stored upper-cased; comparisons ignore case and
/// surrounding whitespace.
pub fn normalize_coupon_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_coupon_code() {
        assert_eq!(normalize_coupon_code(" save10 "), "SAVE10");
        assert_eq!(normalize_coupon_code("SAVE10"), "SAVE10");
        assert_eq!(normalize_coupon_code("\tSaVe10\n"), "SAVE10");
    }
}

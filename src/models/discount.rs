//! Models for the apply-discount endpoint

use std::fmt;

use chrono::NaiveDate;
use validator::Validate;

use models::validation_rules::*;

/// Caller-supplied user together with the coupon codes assigned to it
#[derive(Serialize, Deserialize, Clone, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    #[validate(custom = "validate_not_blank")]
    pub id: String,
    #[serde(default)]
    pub assigned_coupon_codes: Vec<String>,
}

/// Caller-supplied coupon under evaluation. Out-of-range or blank values
/// here are not a request-shape error: the evaluation silently keeps the
/// original price instead.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CouponPayload {
    pub code: String,
    pub discount_amount: f64,
    pub expiry_date: NaiveDate,
    #[serde(default)]
    pub is_third_party: bool,
    pub vendor_url: Option<String>,
}

/// Payload for the apply-discount endpoint
#[derive(Serialize, Deserialize, Clone, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApplyDiscountPayload {
    pub user: UserPayload,
    pub coupon: CouponPayload,
    #[validate(range(min = "0", max = "1.7976931348623157e308"))]
    pub original_subscription_price: f64,
}

/// Why an evaluation kept the original price
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RejectionReason {
    InvalidStructure,
    NotAssigned,
    Expired,
    QuotaExhausted,
    VendorRejected,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RejectionReason::InvalidStructure => write!(f, "invalid structure"),
            RejectionReason::NotAssigned => write!(f, "not assigned"),
            RejectionReason::Expired => write!(f, "expired"),
            RejectionReason::QuotaExhausted => write!(f, "quota exhausted"),
            RejectionReason::VendorRejected => write!(f, "vendor rejected"),
        }
    }
}

/// Result of a discount evaluation. A rejected coupon is not an error:
/// the response simply carries the unmodified original price.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DiscountResponse {
    pub final_price: f64,
    pub original_price: f64,
    pub discount_applied: f64,
    pub coupon_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<RejectionReason>,
}

impl DiscountResponse {
    pub fn applied(original_price: f64, final_price: f64, coupon_code: String) -> Self {
        Self {
            final_price,
            original_price,
            discount_applied: original_price - final_price,
            coupon_code,
            rejection_reason: None,
        }
    }

    pub fn rejected(original_price: f64, coupon_code: String, reason: RejectionReason) -> Self {
        Self {
            final_price: original_price,
            original_price,
            discount_applied: 0f64,
            coupon_code,
            rejection_reason: Some(reason),
        }
    }
}

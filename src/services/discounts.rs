//! Discounts Service, evaluates coupons against subscription prices

use chrono::{NaiveDate, Utc};
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::result::Error as DieselError;
use diesel::Connection;
use failure::Error as FailureError;
use r2d2::ManageConnection;

use super::types::ServiceFuture;
use models::*;
use repos::{CouponsRepo, ReposFactory, UserCouponsRepo};
use services::vendor::CouponVerifier;
use services::Service;

pub const MIN_DISCOUNT: f64 = 1.0;
pub const MAX_DISCOUNT: f64 = 1000.0;

pub trait DiscountsService {
    /// Evaluates a coupon against a subscription price and records
    /// usage when the discount applies
    fn apply_discount(&self, payload: ApplyDiscountPayload) -> ServiceFuture<DiscountResponse>;
}

impl<T, M, F> DiscountsService for Service<T, M, F>
where
    T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
    M: ManageConnection<Connection = T>,
    F: ReposFactory<T>,
{
    fn apply_discount(&self, payload: ApplyDiscountPayload) -> ServiceFuture<DiscountResponse> {
        let repo_factory = self.static_context.repo_factory.clone();
        let coupon_verifier = self.static_context.coupon_verifier.clone();

        debug!(
            "Applying coupon {} for user {} to price {}.",
            payload.coupon.code, payload.user.id, payload.original_subscription_price
        );

        self.spawn_on_pool(move |conn| {
            evaluate_discount(&*conn, &repo_factory, &*coupon_verifier, payload)
                .map_err(|e: FailureError| e.context("Service Discounts, apply_discount endpoint error occurred.").into())
        })
    }
}

/// Runs the evaluation pipeline. Every failed check short-circuits into a
/// rejected response carrying the unmodified original price, so the caller
/// sees an error only when the evaluation itself could not be completed.
fn evaluate_discount<T, F>(
    conn: &T,
    repo_factory: &F,
    verifier: &CouponVerifier,
    payload: ApplyDiscountPayload,
) -> Result<DiscountResponse, FailureError>
where
    T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
    F: ReposFactory<T>,
{
    let coupons_repo = repo_factory.create_coupons_repo(conn);
    let user_coupons_repo = repo_factory.create_user_coupons_repo(conn);

    let ApplyDiscountPayload {
        user,
        coupon,
        original_subscription_price: original_price,
    } = payload;

    if !is_valid_coupon_structure(&coupon) {
        warn!("Coupon {} for user {} failed the structure check.", coupon.code, user.id);
        return Ok(DiscountResponse::rejected(original_price, coupon.code, RejectionReason::InvalidStructure));
    }

    // Pure membership test first, a coupon outside the assigned list is
    // rejected without touching the database.
    if !is_in_assigned_list(&user, &coupon) {
        debug!("Coupon {} is not in the assigned list of user {}.", coupon.code, user.id);
        return Ok(DiscountResponse::rejected(original_price, coupon.code, RejectionReason::NotAssigned));
    }

    let persisted = coupons_repo.find_by_code(&coupon.code)?;

    if !check_assignment(&*user_coupons_repo, &user, &coupon, persisted.as_ref())? {
        return Ok(DiscountResponse::rejected(original_price, coupon.code, RejectionReason::NotAssigned));
    }

    if is_expired(coupon.expiry_date) {
        debug!("Coupon {} expired on {}.", coupon.code, coupon.expiry_date);
        return Ok(DiscountResponse::rejected(original_price, coupon.code, RejectionReason::Expired));
    }

    if let Some(ref value) = persisted {
        if !value.has_remaining_uses() {
            debug!("Coupon {} usage quota is exhausted.", coupon.code);
            return Ok(DiscountResponse::rejected(original_price, coupon.code, RejectionReason::QuotaExhausted));
        }
    }

    if coupon.is_third_party && !verifier.verify(&coupon.code) {
        debug!("Coupon {} was rejected by the vendor.", coupon.code);
        return Ok(DiscountResponse::rejected(original_price, coupon.code, RejectionReason::VendorRejected));
    }

    let final_price = calculate_final_price(original_price, coupon.discount_amount);

    match (user.id.trim().parse::<i32>(), persisted) {
        (Ok(user_id), Some(value)) => {
            if !record_usage(conn, &*coupons_repo, &*user_coupons_repo, user_id, value.id)? {
                debug!("Coupon {} was consumed concurrently, keeping original price.", coupon.code);
                return Ok(DiscountResponse::rejected(original_price, coupon.code, RejectionReason::QuotaExhausted));
            }
            info!("Recorded usage of coupon {} by user {}.", coupon.code, user_id);
        }
        (Ok(user_id), None) => {
            debug!("Coupon {} is not persisted, skipping usage record for user {}.", coupon.code, user_id);
        }
        (Err(_), _) => {
            debug!("User id {} is not numeric, skipping usage record.", user.id);
        }
    }

    Ok(DiscountResponse::applied(original_price, final_price, coupon.code))
}

/// Normalized membership test against the caller-supplied list
fn is_in_assigned_list(user: &UserPayload, coupon: &CouponPayload) -> bool {
    let code = normalize_coupon_code(&coupon.code);
    user.assigned_coupon_codes
        .iter()
        .any(|value| normalize_coupon_code(value) == code)
}

/// A listed coupon is assigned when the persisted assignment, if one can
/// exist, is still unused. A coupon or user unknown to the database is
/// trusted from the list alone, callers predating the assignment table
/// keep working that way.
fn check_assignment(
    user_coupons_repo: &UserCouponsRepo,
    user: &UserPayload,
    coupon: &CouponPayload,
    persisted: Option<&Coupon>,
) -> Result<bool, FailureError> {
    let persisted = match persisted {
        Some(value) => value,
        None => {
            debug!("Coupon {} is not persisted, trusting the assigned list.", coupon.code);
            return Ok(true);
        }
    };

    let user_id = match user.id.trim().parse::<i32>() {
        Ok(value) => value,
        Err(_) => {
            debug!("User id {} is not numeric, trusting the assigned list.", user.id);
            return Ok(true);
        }
    };

    match user_coupons_repo.find(user_id, persisted.id)? {
        None => {
            debug!("No assignment of coupon {} to user {}.", coupon.code, user_id);
            Ok(false)
        }
        Some(ref assignment) if assignment.is_used => {
            debug!("Coupon {} is already used by user {}.", coupon.code, user_id);
            Ok(false)
        }
        Some(_) => Ok(true),
    }
}

/// Flags the assignment and increments the usage counter in one
/// transaction. The guarded increment is the authority on the quota:
/// zero updated rows rolls the whole transaction back and the coupon is
/// reported as consumed.
fn record_usage<T>(
    conn: &T,
    coupons_repo: &CouponsRepo,
    user_coupons_repo: &UserCouponsRepo,
    user_id: i32,
    coupon_id: i32,
) -> Result<bool, FailureError>
where
    T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
{
    let result = conn.transaction::<bool, FailureError, _>(|| {
        let flagged = user_coupons_repo.mark_as_used(user_id, coupon_id)?;
        if flagged == 0 {
            debug!("Assignment of coupon {} to user {} is already used.", coupon_id, user_id);
            return Ok(false);
        }

        let incremented = coupons_repo.increment_usage(coupon_id)?;
        if incremented == 0 {
            return Err(DieselError::RollbackTransaction.into());
        }

        Ok(true)
    });

    match result {
        Ok(recorded) => Ok(recorded),
        Err(ref e) if is_rollback(e) => Ok(false),
        Err(e) => Err(e),
    }
}

fn is_rollback(err: &FailureError) -> bool {
    err.iter_chain().any(|cause| match cause.downcast_ref::<DieselError>() {
        Some(&DieselError::RollbackTransaction) => true,
        _ => false,
    })
}

/// Structure violations are silent: the price stays unchanged, no error
/// is reported to the caller.
pub fn is_valid_coupon_structure(coupon: &CouponPayload) -> bool {
    !coupon.code.trim().is_empty()
        && coupon.discount_amount.is_finite()
        && coupon.discount_amount >= MIN_DISCOUNT
        && coupon.discount_amount <= MAX_DISCOUNT
}

/// Day granularity, a coupon expiring today is still valid
pub fn is_expired(expiry_date: NaiveDate) -> bool {
    expiry_date < Utc::now().naive_utc().date()
}

pub fn calculate_final_price(original_price: f64, discount_amount: f64) -> f64 {
    (original_price - discount_amount).max(0f64)
}

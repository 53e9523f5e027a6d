//! Resolves the cart's coupon to a capped discount. Every rejection is soft:
//! the checkout continues with no coupon discount.

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    entity::{
        coupon_usages::{Column as UsageCol, Entity as CouponUsages},
        coupons::{Column as CouponCol, Entity as Coupons, Model as CouponModel},
    },
    error::{AppError, AppResult},
    money::{Discount, Money},
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CouponRejection {
    #[error("coupon does not exist")]
    NotFound,
    #[error("coupon is not active")]
    Inactive,
    #[error("coupon has expired")]
    Expired,
    #[error("cart subtotal is below the coupon minimum of {0}")]
    BelowMinimum(Money),
    #[error("coupon was already used by this account")]
    AlreadyUsed,
    #[error("coupon has malformed discount data")]
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CouponOutcome {
    pub code: Option<String>,
    /// Set only when the coupon was accepted.
    pub coupon_id: Option<Uuid>,
    pub discount: Money,
    pub rejection: Option<CouponRejection>,
}

impl CouponOutcome {
    fn rejected(code: &str, rejection: CouponRejection) -> Self {
        Self {
            code: Some(code.to_owned()),
            coupon_id: None,
            discount: Money::ZERO,
            rejection: Some(rejection),
        }
    }
}

/// Discount a coupon grants against `subtotal`, never more than `subtotal`.
pub fn evaluate(
    coupon: &CouponModel,
    subtotal: Money,
    now: DateTime<Utc>,
    already_used: bool,
) -> Result<Money, CouponRejection> {
    if !coupon.active {
        return Err(CouponRejection::Inactive);
    }
    if coupon.expires_at.is_some_and(|expires| expires.with_timezone(&Utc) <= now) {
        return Err(CouponRejection::Expired);
    }
    if already_used {
        return Err(CouponRejection::AlreadyUsed);
    }
    if subtotal < Money(coupon.min_buy) {
        return Err(CouponRejection::BelowMinimum(Money(coupon.min_buy)));
    }

    let discount = Discount::parse(&coupon.discount_type, coupon.discount)
        .ok_or(CouponRejection::Malformed)?;
    let amount = match discount {
        Discount::Percent(_) => {
            let amount = discount.apply_to(subtotal);
            match coupon.max_discount {
                Some(cap) if cap >= 0 => amount.min(Money(cap)),
                _ => amount,
            }
        }
        Discount::Amount(_) => discount.apply_to(subtotal),
    };

    Ok(amount.min(subtotal))
}

/// Looks up `code` and evaluates it for `user_id`.
pub async fn resolve<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    code: Option<&str>,
    subtotal: Money,
    now: DateTime<Utc>,
) -> AppResult<CouponOutcome> {
    let Some(code) = code else {
        return Ok(CouponOutcome::default());
    };

    let coupon = Coupons::find()
        .filter(CouponCol::Code.eq(code))
        .one(conn)
        .await
        .map_err(AppError::from_read)?;
    let Some(coupon) = coupon else {
        tracing::warn!(%user_id, code, "unknown coupon on cart");
        return Ok(CouponOutcome::rejected(code, CouponRejection::NotFound));
    };

    let used = CouponUsages::find()
        .filter(UsageCol::CouponId.eq(coupon.id))
        .filter(UsageCol::UserId.eq(user_id))
        .count(conn)
        .await
        .map_err(AppError::from_read)?
        > 0;

    match evaluate(&coupon, subtotal, now, used) {
        Ok(discount) => Ok(CouponOutcome {
            code: Some(coupon.code),
            coupon_id: Some(coupon.id),
            discount,
            rejection: None,
        }),
        Err(rejection) => {
            tracing::warn!(%user_id, code, %rejection, "coupon rejected");
            Ok(CouponOutcome::rejected(code, rejection))
        }
    }
}

//! Fixed-point money and the percent/flat adjustments the catalog stores.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Amount in minor currency units.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct Money(pub i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn minor(self) -> i64 {
        self.0
    }

    /// Clamps negative amounts to zero.
    pub fn non_negative(self) -> Money {
        Money(self.0.max(0))
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Applies a percentage, rounding half away from zero to the minor unit.
    pub fn percent(self, rate: Rate) -> Money {
        let scaled = i128::from(self.0) * i128::from(rate.basis_points());
        let half = i128::from(Rate::SCALE / 2);
        let rounded = if scaled >= 0 {
            (scaled + half) / i128::from(Rate::SCALE)
        } else {
            (scaled - half) / i128::from(Rate::SCALE)
        };
        Money(i64::try_from(rounded).unwrap_or(if rounded > 0 { i64::MAX } else { i64::MIN }))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    fn mul(self, rhs: i64) -> Money {
        Money(self.0.saturating_mul(rhs))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

/// Percentage held in basis points, so `10%` is `Rate(1000)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct Rate(i64);

impl Rate {
    pub const SCALE: i64 = 10_000;

    pub fn from_basis_points(bps: i64) -> Rate {
        Rate(bps)
    }

    pub fn from_percent(percent: i64) -> Rate {
        Rate(percent.saturating_mul(100))
    }

    pub fn basis_points(self) -> i64 {
        self.0
    }
}

/// Per-unit product discount or a whole-cart coupon discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discount {
    Percent(Rate),
    Amount(Money),
}

impl Discount {
    /// Parses the `(discount_type, value)` column pair. Percent values are in
    /// basis points. Returns `None` for unknown types or negative values.
    pub fn parse(kind: &str, value: i64) -> Option<Discount> {
        if value < 0 {
            return None;
        }
        match kind.trim().to_ascii_lowercase().as_str() {
            "percent" => Some(Discount::Percent(Rate::from_basis_points(value))),
            "amount" | "flat" => Some(Discount::Amount(Money(value))),
            _ => None,
        }
    }

    /// Discount on `base`, never negative.
    pub fn apply_to(self, base: Money) -> Money {
        match self {
            Discount::Percent(rate) => base.percent(rate).non_negative(),
            Discount::Amount(value) => value.non_negative(),
        }
    }
}

/// Tax rule attached to a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tax {
    /// Percent of the discounted line total.
    Percent(Rate),
    /// Fixed amount per unit.
    Flat(Money),
}

impl Tax {
    pub fn parse(kind: &str, value: i64) -> Option<Tax> {
        if value < 0 {
            return None;
        }
        match kind.trim().to_ascii_lowercase().as_str() {
            "percent" => Some(Tax::Percent(Rate::from_basis_points(value))),
            "amount" | "flat" => Some(Tax::Flat(Money(value))),
            _ => None,
        }
    }

    pub fn for_line(self, line_total: Money, quantity: i64) -> Money {
        match self {
            Tax::Percent(rate) => line_total.percent(rate).non_negative(),
            Tax::Flat(value) => (value * quantity).non_negative(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_half_away_from_zero() {
        assert_eq!(Money(100_000).percent(Rate::from_percent(10)), Money(10_000));
        assert_eq!(Money(5).percent(Rate::from_percent(10)), Money(1));
        assert_eq!(Money(4).percent(Rate::from_percent(10)), Money(0));
        assert_eq!(Money(333).percent(Rate::from_basis_points(750)), Money(25));
    }

    #[test]
    fn parse_rejects_malformed_pairs() {
        assert_eq!(
            Discount::parse("percent", 1000),
            Some(Discount::Percent(Rate::from_percent(10)))
        );
        assert_eq!(Discount::parse("Amount", 500), Some(Discount::Amount(Money(500))));
        assert_eq!(Discount::parse("percent", -1), None);
        assert_eq!(Discount::parse("bogus", 10), None);
        assert_eq!(Tax::parse("flat", 20), Some(Tax::Flat(Money(20))));
        assert_eq!(Tax::parse("", 20), None);
    }

    #[test]
    fn flat_tax_scales_with_quantity() {
        assert_eq!(Tax::Flat(Money(15)).for_line(Money(1_000), 3), Money(45));
        assert_eq!(
            Tax::Percent(Rate::from_percent(5)).for_line(Money(1_000), 3),
            Money(50)
        );
    }

    #[test]
    fn arithmetic_saturates_instead_of_wrapping() {
        assert_eq!(Money(i64::MAX) + Money(1), Money(i64::MAX));
        assert_eq!(Money(-5).non_negative(), Money::ZERO);
        let total: Money = [Money(1), Money(2), Money(3)].into_iter().sum();
        assert_eq!(total, Money(6));
    }
}

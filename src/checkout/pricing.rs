//! Per-line discounting and cart aggregation.

use crate::{checkout::snapshot::CartLine, money::Money};

/// A cart line with its computed amounts.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub line: CartLine,
    pub effective_price: Money,
    pub line_total: Money,
    pub tax: Money,
    /// Charged once per line, independent of quantity.
    pub shipping: Money,
}

impl PricedLine {
    pub fn quantity(&self) -> i64 {
        self.line.quantity
    }

    pub fn gross_total(&self) -> Money {
        self.line.unit_price * self.line.quantity
    }

    pub fn item_discount(&self) -> Money {
        (self.line.unit_price - self.effective_price) * self.line.quantity
    }
}

/// Aggregated amounts for a checkout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    /// `Σ unit_price * quantity`, before product discounts.
    pub gross_subtotal: Money,
    /// `Σ line_total`, after product discounts.
    pub subtotal: Money,
    pub tax: Money,
    pub shipping_total: Money,
    pub item_discount_total: Money,
    pub coupon_discount: Money,
}

impl Totals {
    pub fn grand_total(&self) -> Money {
        (self.subtotal + self.shipping_total + self.tax - self.coupon_discount).non_negative()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PricedCart {
    pub lines: Vec<PricedLine>,
    pub totals: Totals,
}

impl PricedCart {
    /// Records a resolved coupon discount, capped at the subtotal.
    pub fn apply_coupon(&mut self, discount: Money) {
        self.totals.coupon_discount = discount.non_negative().min(self.totals.subtotal);
    }
}

pub fn price_line(line: &CartLine) -> PricedLine {
    let base = line.unit_price.non_negative();
    let discount = line.discount.apply_to(base);
    let effective_price = (base - discount).non_negative();
    let line_total = effective_price * line.quantity;
    let tax = line.tax.for_line(line_total, line.quantity);

    PricedLine {
        line: line.clone(),
        effective_price,
        line_total,
        tax,
        shipping: line.shipping_cost.non_negative(),
    }
}

pub fn price_cart(lines: &[CartLine]) -> PricedCart {
    let mut totals = Totals::default();
    let lines: Vec<PricedLine> = lines
        .iter()
        .map(|line| {
            let priced = price_line(line);
            totals.gross_subtotal += priced.gross_total();
            totals.subtotal += priced.line_total;
            totals.shipping_total += priced.shipping;
            totals.tax += priced.tax;
            totals.item_discount_total += priced.item_discount();
            priced
        })
        .collect();

    PricedCart { lines, totals }
}

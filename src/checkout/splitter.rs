//! Groups priced lines by seller and spreads the coupon discount across the
//! resulting seller orders.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::{checkout::pricing::PricedLine, money::Money};

/// One seller's share of a checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct SellerGroup {
    pub seller_id: Uuid,
    pub lines: Vec<PricedLine>,
    pub subtotal: Money,
    pub tax: Money,
    pub shipping: Money,
    pub coupon_share: Money,
}

impl SellerGroup {
    fn new(seller_id: Uuid) -> Self {
        Self {
            seller_id,
            lines: Vec::new(),
            subtotal: Money::ZERO,
            tax: Money::ZERO,
            shipping: Money::ZERO,
            coupon_share: Money::ZERO,
        }
    }

    pub fn grand_total(&self) -> Money {
        (self.subtotal + self.tax + self.shipping - self.coupon_share).non_negative()
    }
}

/// Groups lines by seller in ascending seller id order. Line order within a
/// group follows the input.
pub fn split_by_seller(lines: &[PricedLine]) -> Vec<SellerGroup> {
    let mut groups: BTreeMap<Uuid, SellerGroup> = BTreeMap::new();
    for priced in lines {
        let group = groups
            .entry(priced.line.seller_id)
            .or_insert_with(|| SellerGroup::new(priced.line.seller_id));
        group.subtotal += priced.line_total;
        group.tax += priced.tax;
        group.shipping += priced.shipping;
        group.lines.push(priced.clone());
    }
    groups.into_values().collect()
}

/// Allocates `coupon` proportionally to each group's subtotal using the
/// largest-remainder method. Shares sum to `coupon` exactly when `coupon` does
/// not exceed the combined subtotal; ties go to the earlier group.
pub fn allocate_coupon(groups: &mut [SellerGroup], coupon: Money) {
    for group in groups.iter_mut() {
        group.coupon_share = Money::ZERO;
    }

    let total: i128 = groups.iter().map(|g| i128::from(g.subtotal.minor())).sum();
    let coupon = i128::from(coupon.non_negative().minor()).min(total);
    if coupon == 0 || total == 0 {
        return;
    }

    let mut remainders: Vec<(usize, i128)> = Vec::with_capacity(groups.len());
    let mut allocated: i128 = 0;
    for (index, group) in groups.iter_mut().enumerate() {
        let weighted = coupon * i128::from(group.subtotal.minor());
        let share = weighted / total;
        allocated += share;
        remainders.push((index, weighted % total));
        group.coupon_share = Money(share as i64);
    }

    remainders.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    let leftover = (coupon - allocated) as usize;
    for (index, _) in remainders.into_iter().take(leftover) {
        if let Some(group) = groups.get_mut(index) {
            group.coupon_share += Money(1);
        }
    }
}

mod common;

use common::{
    NewProduct, SELLER_ONE, SELLER_TWO, add_to_cart, apply_coupon, cart_len, checkout_ok, customer,
    insert_coupon, insert_product, shipping_request, stock_of, test_state,
};
use marketplace_checkout::{
    dto::checkout::{CheckoutWarning, ExclusionReason},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        combined_orders::Entity as CombinedOrders,
        coupon_usages::Entity as CouponUsages,
        order_details::Entity as OrderDetails,
        products::{ActiveModel as ProductActive, Entity as Products},
        seller_orders::Entity as SellerOrders,
    },
    error::AppError,
    money::Money,
    services::{checkout_service, order_service},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use std::time::Duration;

#[tokio::test]
async fn single_seller_checkout_charges_discounted_price() -> anyhow::Result<()> {
    let state = test_state().await?;
    let user = customer();
    let product = insert_product(&state, NewProduct::new(SELLER_ONE, 100_000, 10).percent_off(1_000))
        .await?;
    add_to_cart(&state, &user, product.id, 2).await?;

    let result = checkout_ok(&state, &user).await?;

    assert_eq!(result.totals.gross_subtotal, Money(200_000));
    assert_eq!(result.totals.subtotal, Money(180_000));
    assert_eq!(result.totals.item_discount_total, Money(20_000));
    assert_eq!(result.totals.coupon_discount, Money::ZERO);
    assert_eq!(result.totals.grand_total, Money(180_000));
    assert_eq!(result.seller_orders.len(), 1);
    assert_eq!(result.seller_orders[0].grand_total, Money(180_000));
    assert!(result.code.starts_with("ORD-"));
    assert!(!result.replayed);

    assert_eq!(stock_of(&state, product.id).await?, 8);
    let sold = Products::find_by_id(product.id).one(&state.orm).await?;
    assert_eq!(sold.map(|p| p.num_of_sale), Some(2));
    assert_eq!(cart_len(&state, &user).await?, 0);

    let details = OrderDetails::find().all(&state.orm).await?;
    assert_eq!(details.len(), 1);
    assert_eq!(details[0].price, 180_000);
    assert_eq!(details[0].quantity, 2);
    Ok(())
}

#[tokio::test]
async fn percent_coupon_reduces_grand_total_and_records_usage() -> anyhow::Result<()> {
    let state = test_state().await?;
    let user = customer();
    let product = insert_product(&state, NewProduct::new(SELLER_ONE, 100_000, 10).percent_off(1_000))
        .await?;
    insert_coupon(&state, "SAVE20", 2_000, "percent", 0).await?;
    add_to_cart(&state, &user, product.id, 2).await?;
    apply_coupon(&state, &user, "SAVE20").await?;

    let result = checkout_ok(&state, &user).await?;

    assert_eq!(result.totals.coupon_discount, Money(36_000));
    assert_eq!(result.totals.grand_total, Money(144_000));
    assert_eq!(result.seller_orders[0].coupon_discount, Money(36_000));
    assert_eq!(result.seller_orders[0].grand_total, Money(144_000));
    assert!(result.warnings.is_empty());
    assert_eq!(CouponUsages::find().count(&state.orm).await?, 1);
    Ok(())
}

#[tokio::test]
async fn coupon_is_rejected_on_second_use() -> anyhow::Result<()> {
    let state = test_state().await?;
    let user = customer();
    let product = insert_product(&state, NewProduct::new(SELLER_ONE, 50_000, 10)).await?;
    insert_coupon(&state, "ONCE", 5_000, "amount", 0).await?;

    add_to_cart(&state, &user, product.id, 1).await?;
    apply_coupon(&state, &user, "ONCE").await?;
    let first = checkout_ok(&state, &user).await?;
    assert_eq!(first.totals.grand_total, Money(45_000));

    add_to_cart(&state, &user, product.id, 1).await?;
    apply_coupon(&state, &user, "ONCE").await?;
    let second = checkout_ok(&state, &user).await?;

    assert_eq!(second.totals.coupon_discount, Money::ZERO);
    assert_eq!(second.totals.grand_total, Money(50_000));
    assert!(matches!(
        second.warnings.as_slice(),
        [CheckoutWarning::CouponRejected { code, .. }] if code == "ONCE"
    ));
    assert_eq!(CouponUsages::find().count(&state.orm).await?, 1);
    Ok(())
}

#[tokio::test]
async fn coupon_below_minimum_is_a_warning_not_a_failure() -> anyhow::Result<()> {
    let state = test_state().await?;
    let user = customer();
    let product = insert_product(&state, NewProduct::new(SELLER_ONE, 20_000, 10)).await?;
    insert_coupon(&state, "BIGSPEND", 10_000, "amount", 500_000).await?;
    add_to_cart(&state, &user, product.id, 1).await?;
    apply_coupon(&state, &user, "BIGSPEND").await?;

    let result = checkout_ok(&state, &user).await?;

    assert_eq!(result.totals.grand_total, Money(20_000));
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(CouponUsages::find().count(&state.orm).await?, 0);
    Ok(())
}

#[tokio::test]
async fn multi_seller_cart_is_split_per_seller() -> anyhow::Result<()> {
    let state = test_state().await?;
    let user = customer();
    let first = insert_product(&state, NewProduct::new(SELLER_ONE, 90_000, 5)).await?;
    let second = insert_product(&state, NewProduct::new(SELLER_TWO, 50_000, 5)).await?;
    add_to_cart(&state, &user, second.id, 1).await?;
    add_to_cart(&state, &user, first.id, 2).await?;

    let result = checkout_ok(&state, &user).await?;

    let sellers: Vec<_> = result.seller_orders.iter().map(|o| o.seller_id).collect();
    assert_eq!(sellers, vec![SELLER_ONE, SELLER_TWO]);
    assert_eq!(result.seller_orders[0].grand_total, Money(180_000));
    assert_eq!(result.seller_orders[1].grand_total, Money(50_000));
    assert_eq!(result.totals.grand_total, Money(230_000));
    assert_eq!(result.seller_orders[0].code, format!("{}-1", result.code));
    assert_eq!(result.seller_orders[1].code, format!("{}-2", result.code));

    assert_eq!(SellerOrders::find().count(&state.orm).await?, 2);
    assert_eq!(OrderDetails::find().count(&state.orm).await?, 2);
    Ok(())
}

#[tokio::test]
async fn coupon_split_across_sellers_sums_to_combined_total() -> anyhow::Result<()> {
    let state = test_state().await?;
    let user = customer();
    let first = insert_product(&state, NewProduct::new(SELLER_ONE, 33_333, 5)).await?;
    let second = insert_product(&state, NewProduct::new(SELLER_TWO, 66_667, 5)).await?;
    insert_coupon(&state, "TENOFF", 1_000, "percent", 0).await?;
    add_to_cart(&state, &user, first.id, 1).await?;
    add_to_cart(&state, &user, second.id, 1).await?;
    apply_coupon(&state, &user, "TENOFF").await?;

    let result = checkout_ok(&state, &user).await?;

    let coupon_sum: Money = result.seller_orders.iter().map(|o| o.coupon_discount).sum();
    let grand_sum: Money = result.seller_orders.iter().map(|o| o.grand_total).sum();
    assert_eq!(coupon_sum, result.totals.coupon_discount);
    assert_eq!(grand_sum, result.totals.grand_total);
    assert_eq!(result.totals.grand_total, Money(90_000));
    Ok(())
}

#[tokio::test]
async fn missing_shipping_phone_aborts_before_any_write() -> anyhow::Result<()> {
    let state = test_state().await?;
    let user = customer();
    let product = insert_product(&state, NewProduct::new(SELLER_ONE, 10_000, 3)).await?;
    add_to_cart(&state, &user, product.id, 1).await?;

    let mut request = shipping_request();
    request.shipping_phone = None;
    let err = checkout_service::checkout(&state, &user, request)
        .await
        .err()
        .ok_or_else(|| anyhow::anyhow!("checkout should fail"))?;

    assert!(matches!(&err, AppError::Validation(msg) if msg.contains("shipping_phone")));
    assert_eq!(err.kind(), "validation");
    assert_eq!(CombinedOrders::find().count(&state.orm).await?, 0);
    assert_eq!(stock_of(&state, product.id).await?, 3);
    assert_eq!(cart_len(&state, &user).await?, 1);
    Ok(())
}

#[tokio::test]
async fn empty_cart_is_rejected() -> anyhow::Result<()> {
    let state = test_state().await?;
    let user = customer();

    let err = checkout_service::checkout(&state, &user, shipping_request())
        .await
        .err()
        .ok_or_else(|| anyhow::anyhow!("checkout should fail"))?;

    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(CombinedOrders::find().count(&state.orm).await?, 0);
    Ok(())
}

#[tokio::test]
async fn insufficient_stock_rolls_back_everything() -> anyhow::Result<()> {
    let state = test_state().await?;
    let user = customer();
    let plenty = insert_product(&state, NewProduct::new(SELLER_ONE, 10_000, 10)).await?;
    let scarce = insert_product(&state, NewProduct::new(SELLER_TWO, 20_000, 1)).await?;
    add_to_cart(&state, &user, plenty.id, 3).await?;
    add_to_cart(&state, &user, scarce.id, 2).await?;

    let err = checkout_service::checkout(&state, &user, shipping_request())
        .await
        .err()
        .ok_or_else(|| anyhow::anyhow!("checkout should fail"))?;

    match err {
        AppError::StockUnavailable {
            product_id,
            requested,
            available,
        } => {
            assert_eq!(product_id, scarce.id);
            assert_eq!(requested, 2);
            assert_eq!(available, 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(CombinedOrders::find().count(&state.orm).await?, 0);
    assert_eq!(SellerOrders::find().count(&state.orm).await?, 0);
    assert_eq!(OrderDetails::find().count(&state.orm).await?, 0);
    assert_eq!(stock_of(&state, plenty.id).await?, 10);
    assert_eq!(stock_of(&state, scarce.id).await?, 1);
    assert_eq!(cart_len(&state, &user).await?, 2);
    Ok(())
}

#[tokio::test]
async fn unpublished_lines_are_excluded_and_left_in_cart() -> anyhow::Result<()> {
    let state = test_state().await?;
    let user = customer();
    let live = insert_product(&state, NewProduct::new(SELLER_ONE, 10_000, 5)).await?;
    let retired = insert_product(&state, NewProduct::new(SELLER_ONE, 15_000, 5)).await?;
    add_to_cart(&state, &user, live.id, 1).await?;
    add_to_cart(&state, &user, retired.id, 1).await?;

    let mut active: ProductActive = retired.clone().into();
    active.published = Set(false);
    active.update(&state.orm).await?;

    let result = checkout_ok(&state, &user).await?;

    assert_eq!(result.totals.grand_total, Money(10_000));
    assert!(result.warnings.iter().any(|w| matches!(
        w,
        CheckoutWarning::LineExcluded { product_id, reason: ExclusionReason::Unpublished, .. }
            if *product_id == retired.id
    )));
    let remaining = CartItems::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .all(&state.orm)
        .await?;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].product_id, retired.id);
    assert_eq!(stock_of(&state, retired.id).await?, 5);
    Ok(())
}

#[tokio::test]
async fn price_change_since_add_is_reported() -> anyhow::Result<()> {
    let state = test_state().await?;
    let user = customer();
    let product = insert_product(&state, NewProduct::new(SELLER_ONE, 10_000, 5)).await?;
    add_to_cart(&state, &user, product.id, 1).await?;

    let mut active: ProductActive = product.clone().into();
    active.unit_price = Set(12_000);
    active.update(&state.orm).await?;

    let result = checkout_ok(&state, &user).await?;

    assert_eq!(result.totals.grand_total, Money(12_000));
    assert_eq!(
        result.warnings,
        vec![CheckoutWarning::PriceChanged {
            product_id: product.id,
            was: Money(10_000),
            now: Money(12_000),
        }]
    );
    Ok(())
}

#[tokio::test]
async fn resubmitting_an_idempotency_key_replays_the_first_order() -> anyhow::Result<()> {
    let state = test_state().await?;
    let user = customer();
    let product = insert_product(&state, NewProduct::new(SELLER_ONE, 10_000, 5)).await?;
    add_to_cart(&state, &user, product.id, 1).await?;

    let mut request = shipping_request();
    request.idempotency_key = Some("checkout-key-0001".to_string());
    let first = checkout_service::checkout(&state, &user, request)
        .await?
        .into_data()
        .ok_or_else(|| anyhow::anyhow!("no data"))?;

    // The cart is empty now; a replay must not need it.
    let mut request = shipping_request();
    request.idempotency_key = Some("checkout-key-0001".to_string());
    let second = checkout_service::checkout(&state, &user, request)
        .await?
        .into_data()
        .ok_or_else(|| anyhow::anyhow!("no data"))?;

    assert!(second.replayed);
    assert_eq!(second.combined_order_id, first.combined_order_id);
    assert_eq!(second.totals, first.totals);
    assert_eq!(CombinedOrders::find().count(&state.orm).await?, 1);
    assert_eq!(stock_of(&state, product.id).await?, 4);
    Ok(())
}

#[tokio::test]
async fn placed_order_can_be_read_back_by_its_owner_only() -> anyhow::Result<()> {
    let state = test_state().await?;
    let user = customer();
    let first = insert_product(&state, NewProduct::new(SELLER_ONE, 10_000, 5)).await?;
    let second = insert_product(&state, NewProduct::new(SELLER_TWO, 7_500, 5)).await?;
    add_to_cart(&state, &user, first.id, 1).await?;
    add_to_cart(&state, &user, second.id, 2).await?;
    let placed = checkout_ok(&state, &user).await?;

    let order = order_service::get_order(&state, &user, placed.combined_order_id)
        .await?
        .into_data()
        .ok_or_else(|| anyhow::anyhow!("no data"))?;
    assert_eq!(order.order.grand_total, 25_000);
    assert_eq!(order.order.shipping_address["city"], "Bandung");
    assert_eq!(order.seller_orders.len(), 2);
    assert!(order.seller_orders.iter().all(|s| s.details.len() == 1));
    assert_eq!(order.seller_orders[1].details[0].quantity, 2);

    let stranger = customer();
    let err = order_service::get_order(&state, &stranger, placed.combined_order_id).await;
    assert!(matches!(err, Err(AppError::NotFound)));
    Ok(())
}

#[tokio::test]
async fn ordering_the_last_units_leaves_zero_stock() -> anyhow::Result<()> {
    let state = test_state().await?;
    let user = customer();
    let product = insert_product(&state, NewProduct::new(SELLER_ONE, 12_500, 3)).await?;
    add_to_cart(&state, &user, product.id, 3).await?;

    let result = checkout_ok(&state, &user).await?;

    assert_eq!(result.totals.grand_total, Money(37_500));
    assert_eq!(stock_of(&state, product.id).await?, 0);
    Ok(())
}

#[tokio::test]
async fn malformed_product_pricing_is_charged_without_discount_or_tax() -> anyhow::Result<()> {
    let state = test_state().await?;
    let user = customer();
    let mut broken = NewProduct::new(SELLER_ONE, 40_000, 5);
    broken.discount = 5_000;
    broken.discount_type = "bogus";
    broken.tax = 1_000;
    broken.tax_type = "per_moon";
    let product = insert_product(&state, broken).await?;
    add_to_cart(&state, &user, product.id, 2).await?;

    let result = checkout_ok(&state, &user).await?;

    assert_eq!(result.totals.item_discount_total, Money::ZERO);
    assert_eq!(result.totals.tax, Money::ZERO);
    assert_eq!(result.totals.subtotal, Money(80_000));
    assert_eq!(result.totals.grand_total, Money(80_000));
    assert_eq!(stock_of(&state, product.id).await?, 3);
    Ok(())
}

#[tokio::test]
async fn timed_out_checkout_rolls_back_and_can_be_retried() -> anyhow::Result<()> {
    let mut state = test_state().await?;
    let user = customer();
    let product = insert_product(&state, NewProduct::new(SELLER_ONE, 10_000, 4)).await?;
    add_to_cart(&state, &user, product.id, 2).await?;

    state.checkout.timeout = Duration::from_nanos(1);
    let err = checkout_service::checkout(&state, &user, shipping_request())
        .await
        .err()
        .ok_or_else(|| anyhow::anyhow!("checkout should time out"))?;

    assert!(matches!(&err, AppError::Persistence(msg) if msg.contains("timed out")));
    assert_eq!(err.kind(), "persistence");
    assert_eq!(CombinedOrders::find().count(&state.orm).await?, 0);
    assert_eq!(stock_of(&state, product.id).await?, 4);
    assert_eq!(cart_len(&state, &user).await?, 1);

    state.checkout.timeout = Duration::from_secs(5);
    let result = checkout_ok(&state, &user).await?;
    assert_eq!(result.totals.grand_total, Money(20_000));
    assert_eq!(stock_of(&state, product.id).await?, 2);
    Ok(())
}

use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseTransaction, DbBackend, EntityTrait, QueryFilter,
    QueryOrder, Statement, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    checkout::{
        coupon,
        pricing::price_cart,
        snapshot::CartRepository,
        splitter::{allocate_coupon, split_by_seller},
        transaction::{
            CheckoutPhase, OrderPlan, PersistedOrder, ValidatedRequest, persist, validate_cart,
            validate_request,
        },
    },
    config::CheckoutConfig,
    dto::checkout::{
        CheckoutRequest, CheckoutResult, CheckoutTotals, CheckoutWarning, SellerOrderSummary,
    },
    entity::{
        checkout_submissions::{Column as SubmissionCol, Entity as CheckoutSubmissions},
        combined_orders::Entity as CombinedOrders,
        seller_orders::{Column as SellerOrderCol, Entity as SellerOrders},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    money::Money,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Tracks where a checkout is, so aborts are logged with the phase they hit.
struct OrderTransaction {
    user_id: Uuid,
    phase: CheckoutPhase,
}

impl OrderTransaction {
    fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            phase: CheckoutPhase::Init,
        }
    }

    fn advance(&mut self, next: CheckoutPhase) {
        tracing::debug!(user_id = %self.user_id, from = %self.phase, to = %next, "checkout phase");
        self.phase = next;
    }

    fn abort(&mut self, err: &AppError) {
        tracing::warn!(
            user_id = %self.user_id,
            phase = %self.phase,
            kind = err.kind(),
            error = %err,
            "checkout aborted"
        );
        self.phase = CheckoutPhase::Aborted;
    }
}

/// Turns the caller's cart into one combined order with a seller order per
/// seller. Either every row is written and the consumed cart rows are gone,
/// or nothing changes.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<CheckoutResult>> {
    let mut order_txn = OrderTransaction::new(user.user_id);

    let request = match validate_request(&payload) {
        Ok(request) => request,
        Err(err) => {
            order_txn.abort(&err);
            return Err(err);
        }
    };

    if let Some(key) = request.idempotency_key.as_deref() {
        if let Some(result) = replay(&state.orm, user.user_id, key).await? {
            tracing::info!(
                user_id = %user.user_id,
                order_id = %result.combined_order_id,
                "checkout replayed from idempotency key"
            );
            return Ok(ApiResponse::success(
                "Checkout already processed",
                result,
                Some(Meta::empty()),
            ));
        }
    }

    let outcome =
        tokio::time::timeout(state.checkout.timeout, place_order(state, &mut order_txn, &request))
            .await;
    let result = match outcome {
        Ok(result) => result?,
        Err(_) => {
            // The transaction future was dropped, which rolls it back.
            let err = AppError::Persistence("checkout timed out".into());
            order_txn.abort(&err);
            return Err(err);
        }
    };

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "checkout",
        Some("combined_orders"),
        Some(serde_json::json!({
            "order_id": result.combined_order_id,
            "code": result.code,
            "grand_total": result.totals.grand_total,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Checkout success",
        result,
        Some(Meta::empty()),
    ))
}

async fn place_order(
    state: &AppState,
    order_txn: &mut OrderTransaction,
    request: &ValidatedRequest,
) -> AppResult<CheckoutResult> {
    let cart_repo = CartRepository::for_account(order_txn.user_id);
    let txn = state.orm.begin().await.map_err(AppError::from_read)?;

    let outcome = run(&txn, order_txn, &cart_repo, request, state.checkout).await;
    match outcome {
        Ok((persisted, warnings)) => {
            if let Err(err) = txn.commit().await {
                let err = AppError::Persistence(err.to_string());
                order_txn.abort(&err);
                return Err(err);
            }
            order_txn.advance(CheckoutPhase::Committed);
            tracing::info!(
                user_id = %order_txn.user_id,
                order_id = %persisted.combined_order_id,
                code = %persisted.code,
                grand_total = %persisted.totals.grand_total,
                sellers = persisted.seller_orders.len(),
                "checkout committed"
            );
            Ok(CheckoutResult {
                combined_order_id: persisted.combined_order_id,
                code: persisted.code,
                totals: persisted.totals,
                seller_orders: persisted.seller_orders,
                warnings,
                replayed: false,
            })
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!(error = %rollback_err, "checkout rollback failed");
            }
            order_txn.abort(&err);
            Err(err)
        }
    }
}

async fn run(
    txn: &DatabaseTransaction,
    order_txn: &mut OrderTransaction,
    cart_repo: &CartRepository,
    request: &ValidatedRequest,
    config: CheckoutConfig,
) -> AppResult<(PersistedOrder, Vec<CheckoutWarning>)> {
    if txn.get_database_backend() == DbBackend::Postgres {
        txn.execute(Statement::from_string(
            DbBackend::Postgres,
            format!("SET LOCAL lock_timeout = '{}ms'", config.lock_timeout.as_millis()),
        ))
        .await?;
    }

    let snapshot = cart_repo.load_snapshot(txn).await?;
    validate_cart(&snapshot.lines)?;

    let now = Utc::now();
    let mut cart = price_cart(&snapshot.lines);
    let coupon = coupon::resolve(
        txn,
        order_txn.user_id,
        snapshot.coupon_code(),
        cart.totals.subtotal,
        now,
    )
    .await?;
    cart.apply_coupon(coupon.discount);

    let mut groups = split_by_seller(&cart.lines);
    allocate_coupon(&mut groups, cart.totals.coupon_discount);

    let mut warnings = snapshot.warnings.clone();
    if let (Some(code), Some(rejection)) = (&coupon.code, &coupon.rejection) {
        warnings.push(CheckoutWarning::CouponRejected {
            code: code.clone(),
            reason: rejection.to_string(),
        });
    }

    let plan = OrderPlan {
        cart,
        groups,
        coupon,
        consumed_cart_items: snapshot.cart_item_ids(),
    };
    order_txn.advance(CheckoutPhase::Validated);

    order_txn.advance(CheckoutPhase::Persisting);
    let persisted = persist(txn, cart_repo, request, &plan, now).await?;

    Ok((persisted, warnings))
}

/// Rebuilds the result of an earlier checkout submitted with `key`.
async fn replay<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    key: &str,
) -> AppResult<Option<CheckoutResult>> {
    let submission = CheckoutSubmissions::find()
        .filter(SubmissionCol::UserId.eq(user_id))
        .filter(SubmissionCol::IdempotencyKey.eq(key))
        .one(conn)
        .await
        .map_err(AppError::from_read)?;
    let Some(submission) = submission else {
        return Ok(None);
    };

    let Some(order) = CombinedOrders::find_by_id(submission.combined_order_id)
        .one(conn)
        .await?
    else {
        return Ok(None);
    };

    let seller_orders = SellerOrders::find()
        .filter(SellerOrderCol::CombinedOrderId.eq(order.id))
        .order_by_asc(SellerOrderCol::SellerId)
        .all(conn)
        .await?
        .into_iter()
        .map(|seller_order| SellerOrderSummary {
            id: seller_order.id,
            seller_id: seller_order.seller_id,
            code: seller_order.code,
            subtotal: Money(seller_order.subtotal),
            coupon_discount: Money(seller_order.coupon_discount),
            grand_total: Money(seller_order.grand_total),
        })
        .collect();

    Ok(Some(CheckoutResult {
        combined_order_id: order.id,
        code: order.code,
        totals: CheckoutTotals {
            gross_subtotal: Money(order.subtotal) + Money(order.item_discount_total),
            subtotal: Money(order.subtotal),
            tax: Money(order.tax),
            shipping_total: Money(order.shipping_total),
            item_discount_total: Money(order.item_discount_total),
            coupon_discount: Money(order.coupon_discount),
            grand_total: Money(order.grand_total),
        },
        seller_orders,
        warnings: Vec::new(),
        replayed: true,
    }))
}

use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        cart::{AddToCartRequest, ApplyCouponRequest},
        checkout::{
            CheckoutRequest, CheckoutResult, CheckoutTotals, CheckoutWarning, ExclusionReason,
            SellerOrderSummary,
        },
        orders::{CombinedOrderWithSellers, SellerOrderWithDetails},
    },
    models::{CartItem, CombinedOrder, OrderDetail, SellerOrder},
    money::{Money, Rate},
    response::{ApiResponse, Meta},
    routes::{cart, health, orders},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::readiness,
        cart::add_to_cart,
        cart::apply_coupon,
        orders::checkout,
        orders::get_order,
    ),
    components(
        schemas(
            Money,
            Rate,
            CartItem,
            CombinedOrder,
            SellerOrder,
            OrderDetail,
            AddToCartRequest,
            ApplyCouponRequest,
            CheckoutRequest,
            CheckoutResult,
            CheckoutTotals,
            CheckoutWarning,
            ExclusionReason,
            SellerOrderSummary,
            SellerOrderWithDetails,
            CombinedOrderWithSellers,
            health::HealthData,
            Meta,
            ApiResponse<CheckoutResult>,
            ApiResponse<CombinedOrderWithSellers>,
            ApiResponse<CartItem>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Cart", description = "Cart endpoints feeding checkout"),
        (name = "Orders", description = "Checkout and order endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
    //.custom_html(SCALAR_HTML)
}

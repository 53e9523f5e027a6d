use chrono::Utc;
use marketplace_checkout::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{
        coupons::{self, ActiveModel as CouponActive, Entity as Coupons},
        products::{self, ActiveModel as ProductActive, Entity as Products},
    },
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

/// Two demo sellers with fixed ids so carts can be split across them.
const SELLER_ONE: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0001);
const SELLER_TWO: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0002);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;

    seed_products(&orm).await?;
    seed_coupons(&orm).await?;

    tracing::info!(seller_one = %SELLER_ONE, seller_two = %SELLER_TWO, "seed completed");
    Ok(())
}

async fn seed_products(orm: &DatabaseConnection) -> anyhow::Result<()> {
    // (seller, name, price, discount, discount type, tax, tax type, shipping, stock)
    let catalog = [
        (SELLER_ONE, "Axum Hoodie", 550_000, 1_000, "percent", 500, "percent", 15_000, 50),
        (SELLER_ONE, "Ferris Mug", 120_000, 10_000, "amount", 0, "percent", 8_000, 100),
        (SELLER_TWO, "Rust Sticker Pack", 50_000, 0, "amount", 1_000, "flat", 0, 200),
        (SELLER_TWO, "E-book: Async Rust", 250_000, 2_000, "percent", 0, "percent", 0, 75),
    ];

    for (seller_id, name, price, discount, discount_type, tax, tax_type, shipping, stock) in catalog
    {
        let exists = Products::find()
            .filter(products::Column::Name.eq(name))
            .one(orm)
            .await?
            .is_some();
        if exists {
            continue;
        }

        Products::insert(ProductActive {
            id: Set(Uuid::new_v4()),
            seller_id: Set(seller_id),
            name: Set(name.to_owned()),
            unit_price: Set(price),
            discount: Set(discount),
            discount_type: Set(discount_type.to_owned()),
            tax: Set(tax),
            tax_type: Set(tax_type.to_owned()),
            shipping_cost: Set(shipping),
            current_stock: Set(stock),
            num_of_sale: Set(0),
            published: Set(true),
            approved: Set(true),
            created_at: Set(Utc::now().into()),
        })
        .exec(orm)
        .await?;
        tracing::info!(name, %seller_id, "seeded product");
    }

    Ok(())
}

async fn seed_coupons(orm: &DatabaseConnection) -> anyhow::Result<()> {
    // (code, value, type, min buy, max discount)
    let coupons = [
        ("WELCOME20", 2_000, "percent", 0, Some(100_000)),
        ("FLAT50K", 50_000, "amount", 300_000, None),
    ];

    for (code, value, discount_type, min_buy, max_discount) in coupons {
        let exists = Coupons::find()
            .filter(coupons::Column::Code.eq(code))
            .one(orm)
            .await?
            .is_some();
        if exists {
            continue;
        }

        Coupons::insert(CouponActive {
            id: Set(Uuid::new_v4()),
            code: Set(code.to_owned()),
            discount: Set(value),
            discount_type: Set(discount_type.to_owned()),
            active: Set(true),
            min_buy: Set(min_buy),
            max_discount: Set(max_discount),
            expires_at: Set(None),
            created_at: Set(Utc::now().into()),
        })
        .exec(orm)
        .await?;
        tracing::info!(code, "seeded coupon");
    }

    Ok(())
}

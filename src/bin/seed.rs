use rust_decimal::Decimal;
use supplement_store::{
    config::AppConfig,
    db::create_pool,
    domain::{Category, product::slugify},
};
use uuid::Uuid;

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    quantity: i32,
    price_cents: i64,
    vendor: &'static str,
    category: Category,
}

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "Whey Protein Powder Isolate",
        description: "24g of whey protein per serving to support muscle growth and maintenance",
        quantity: 20,
        price_cents: 4999,
        vendor: "Optimum Nutrition",
        category: Category::MuscleGain,
    },
    SeedProduct {
        name: "Serious Mass Weight Gainer Protein Powder",
        description: "50g of protein and 252g of carbohydrates per serving to support weight gain",
        quantity: 10,
        price_cents: 5999,
        vendor: "Optimum Nutrition",
        category: Category::WeightGain,
    },
    SeedProduct {
        name: "Super Mass Gainer Protein Powder",
        description: "52g of protein and 244g of carbohydrates per serving to support weight gain",
        quantity: 15,
        price_cents: 6999,
        vendor: "Dymatize",
        category: Category::WeightGain,
    },
    SeedProduct {
        name: "Brown Rice Protein Powder",
        description: "Plant protein with a light carbohydrate load for calorie-controlled diets",
        quantity: 8,
        price_cents: 7999,
        vendor: "MuscleTech",
        category: Category::WeightLoss,
    },
    SeedProduct {
        name: "Low Carb Protein Powder",
        description: "25g of protein per serving to support muscle growth and recovery",
        quantity: 8,
        price_cents: 7999,
        vendor: "MuscleTech",
        category: Category::GeneralHealth,
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, config.max_connections).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(&pool, "Roxanna", "admin@app.com", "ADMIN", None).await?;
    let user_id =
        ensure_user(&pool, "John Doe", "user@app.com", "CUSTOMER", Some("123 Main St")).await?;
    seed_products(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    name: &str,
    email: &str,
    role: &str,
    address: Option<&str>,
) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, role, address)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(role)
    .bind(address)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(id)
}

async fn seed_products(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    for product in PRODUCTS {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, slug, description, price, quantity, category, vendor, image)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, '')
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(product.name)
        .bind(slugify(product.name))
        .bind(product.description)
        .bind(Decimal::new(product.price_cents, 2))
        .bind(product.quantity)
        .bind(product.category.as_str())
        .bind(product.vendor)
        .execute(pool)
        .await?;
    }

    println!("Seeded {} products", PRODUCTS.len());
    Ok(())
}

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use catalog_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let staff_id = ensure_user(&pool, "staff@example.com", "Staff", "staff123", true).await?;
    let user_id = ensure_user(&pool, "user@example.com", "Sample User", "user123", false).await?;
    seed_catalog(&pool, user_id).await?;

    println!("Seed completed. Staff ID: {staff_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    name: &str,
    password: &str,
    is_staff: bool,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, name, password_hash, is_staff)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET is_staff = EXCLUDED.is_staff
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(name)
    .bind(password_hash)
    .bind(is_staff)
    .fetch_one(pool)
    .await?;

    Ok(user_id)
}

async fn seed_catalog(pool: &sqlx::PgPool, user_id: Uuid) -> anyhow::Result<()> {
    let (category_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO categories (id, name, user_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind("General")
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let samples = [
        ("Canvas Tote", "Everyday carry bag", 2500_i64, 40_i32),
        ("Steel Bottle", "Insulated water bottle", 1800, 25),
        ("Desk Lamp", "Adjustable LED lamp", 4200, 10),
    ];

    for (name, description, price, stock) in samples {
        sqlx::query(
            r#"
            INSERT INTO products (id, user_id, name, description, price, stock, category_id)
            SELECT $1, $2, $3, $4, $5, $6, $7
            WHERE NOT EXISTS (SELECT 1 FROM products WHERE name = $3 AND user_id = $2)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(stock)
        .bind(category_id)
        .execute(pool)
        .await?;
    }

    Ok(())
}

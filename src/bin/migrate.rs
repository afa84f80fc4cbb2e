use catalog_api::{config::AppConfig, db::create_pool};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    println!("Migrations applied");
    Ok(())
}

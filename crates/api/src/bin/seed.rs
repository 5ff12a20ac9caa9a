//! Create the initial user account.
//!
//! Reads `DATABASE_URL`, `SEED_USER_EMAIL` and `SEED_USER_PASSWORD`, applies
//! migrations, and inserts the user unless the email is already registered.

use anyhow::Context;
use taskboard_api::auth::password::hash_password;
use taskboard_db::models::user::CreateUser;
use taskboard_db::{PgStore, Store};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard_seed=info,taskboard_api=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let email = std::env::var("SEED_USER_EMAIL").context("SEED_USER_EMAIL must be set")?;
    let password = std::env::var("SEED_USER_PASSWORD").context("SEED_USER_PASSWORD must be set")?;

    let pool = taskboard_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    taskboard_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let store = PgStore::new(pool);

    if let Some(existing) = store.find_user_by_email(&email).await? {
        tracing::info!(user_id = existing.id, %email, "Seed user already exists");
        return Ok(());
    }

    let password_hash =
        hash_password(&password).map_err(|e| anyhow::anyhow!("Password hashing failed: {e}"))?;

    let user = store
        .create_user(&CreateUser {
            email: email.clone(),
            password_hash,
        })
        .await?;

    tracing::info!(user_id = user.id, %email, "Seed user created");
    Ok(())
}

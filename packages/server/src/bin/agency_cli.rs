//! Operator CLI: seed a development database or create an admin account

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use agency_core::common::utils::{has_min_chars, is_valid_email, normalize_email};
use agency_core::config::Config;
use agency_core::domains::auth::password::{hash_password, password_long_enough};
use agency_core::domains::clients::{Client, ClientFields};
use agency_core::domains::users::{CreateUser, User, UserRole};

#[derive(Parser)]
#[command(name = "agency_cli")]
#[command(about = "Avatar Agency operator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the demo admin, editor and client (skips anything that already exists)
    Seed,

    /// Create an admin account
    CreateAdmin {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

const DEMO_CLIENT_NAME: &str = "Demo Client";

/// Create a user unless the email is already taken. Returns whether it was created.
async fn ensure_user(
    name: &str,
    email: &str,
    password: &str,
    role: UserRole,
    bcrypt_cost: u32,
    pool: &PgPool,
) -> Result<bool> {
    let email = normalize_email(email);
    if User::find_by_email(&email, pool).await?.is_some() {
        return Ok(false);
    }

    let password_hash = hash_password(password, bcrypt_cost).await?;
    User::create(
        CreateUser {
            name: name.to_string(),
            email,
            password_hash,
            role,
        },
        pool,
    )
    .await?;
    Ok(true)
}

async fn seed(config: &Config, pool: &PgPool) -> Result<()> {
    println!("Seeding database...");

    for (name, email, password, role) in [
        ("Admin User", "admin@avataragen.cy", "admin123", UserRole::Admin),
        ("Editor User", "editor@avataragen.cy", "editor123", UserRole::Editor),
    ] {
        if ensure_user(name, email, password, role, config.bcrypt_cost, pool).await? {
            println!("Created {} user: {}", role, email);
        } else {
            println!("User already exists: {}", email);
        }
    }

    let clients = Client::list_with_project_counts(pool).await?;
    if clients.iter().any(|row| row.client.name == DEMO_CLIENT_NAME) {
        println!("Sample client already exists");
    } else {
        let client = Client::create(
            ClientFields {
                name: DEMO_CLIENT_NAME.to_string(),
                content_niche: "Technology".to_string(),
                avatar_id: Some("demo-avatar-123".to_string()),
                voice_id: Some("demo-voice-456".to_string()),
                brand_guidelines_url: Some(
                    "https://drive.google.com/demo-brand-guidelines".to_string(),
                ),
                editing_guidelines_url: Some(
                    "https://drive.google.com/demo-editing-guidelines".to_string(),
                ),
                is_active: true,
            },
            pool,
        )
        .await?;
        println!("Created sample client: {}", client.name);
    }

    println!("Seeding complete!");
    Ok(())
}

async fn create_admin(
    config: &Config,
    pool: &PgPool,
    name: &str,
    email: &str,
    password: &str,
) -> Result<()> {
    if !has_min_chars(name, 2) {
        bail!("Name must be at least 2 characters");
    }
    if !is_valid_email(email) {
        bail!("Invalid email address");
    }
    if !password_long_enough(password) {
        bail!("Password must be at least 8 characters");
    }

    if !ensure_user(name, email, password, UserRole::Admin, config.bcrypt_cost, pool).await? {
        bail!("Email already exists");
    }

    println!("Created admin user: {}", normalize_email(email));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    match cli.command {
        Commands::Seed => seed(&config, &pool).await,
        Commands::CreateAdmin {
            name,
            email,
            password,
        } => create_admin(&config, &pool, &name, &email, &password).await,
    }
}

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::app::{self, AppState};
use crate::auth::Role;
use crate::config::AppConfig;
use crate::database::models::NewUser;
use crate::database::DatabaseManager;
use crate::services::UserService;

#[derive(Parser)]
#[command(name = "campus-token-api")]
#[command(about = "Campus token API - users, profiles and token ledger")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve,

    #[command(about = "Create the database tables if they are missing")]
    InitDb,

    #[command(about = "Register an administrator account")]
    CreateAdmin {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "Campus")]
        first_name: String,
        #[arg(long, default_value = "Administrator")]
        last_name: String,
        #[arg(long, default_value = "")]
        phone_number: String,
        #[arg(long, default_value = "Administration")]
        campus_affiliation: String,
    },
}

pub async fn run(cli: Cli, config: &AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::InitDb => {
            let pool = DatabaseManager::connect_lazy(&config.database)?;
            DatabaseManager::init_schema(&pool)
                .await
                .context("failed to apply schema")?;
            println!("Schema ready");
            Ok(())
        }
        Commands::CreateAdmin {
            username,
            email,
            password,
            first_name,
            last_name,
            phone_number,
            campus_affiliation,
        } => {
            let pool = DatabaseManager::connect_lazy(&config.database)?;
            let users = UserService::new(pool, config.security.bcrypt_cost);
            let new_user = NewUser {
                username,
                email,
                password,
                first_name,
                last_name,
                phone_number,
                campus_affiliation,
            };
            let admin = users
                .create(new_user, Role::Admin)
                .await
                .context("failed to create admin")?;
            println!("Created admin {} ({})", admin.username, admin.id);
            Ok(())
        }
    }
}

async fn serve(config: &AppConfig) -> anyhow::Result<()> {
    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set");
    }

    let pool = DatabaseManager::connect_lazy(&config.database)?;
    let router = app::router(AppState::new(pool, config), config);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("Campus token API listening on http://{}", bind_addr);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

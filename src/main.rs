use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use log::{error, info};
use std::sync::Arc;

use invoiceserver::core::config::AppConfig;
use invoiceserver::core::shared::state::AppState;
use invoiceserver::core::shared::utils::{create_conn, run_migrations};
use invoiceserver::main_module::{
    run_axum_server, run_init, InitOptions, DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD,
    DEFAULT_COMPANY_NAME,
};

#[derive(Parser)]
#[command(name = "invoiceserver", version, about = "Multi-tenant invoicing server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create the admin account, default company and owner role
    Init {
        #[arg(long, default_value = DEFAULT_ADMIN_EMAIL)]
        admin_email: String,
        #[arg(long, default_value = DEFAULT_ADMIN_PASSWORD)]
        admin_password: String,
        #[arg(long, default_value = DEFAULT_COMPANY_NAME)]
        company_name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Init {
            admin_email,
            admin_password,
            company_name,
        } => {
            let options = InitOptions {
                admin_email,
                admin_password,
                company_name,
            };
            let report = tokio::task::spawn_blocking(move || run_init(&config, &options)).await??;
            println!("{}", report.summary());
            Ok(())
        }
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    info!("Starting invoiceserver {}", env!("CARGO_PKG_VERSION"));

    let pool = match create_conn(&config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to create database pool: {}", e);
            return Err(e.into());
        }
    };
    let migration_pool = pool.clone();
    tokio::task::spawn_blocking(move || run_migrations(&migration_pool)).await??;

    if let Err(e) = tokio::fs::create_dir_all(config.invoice_pdf_dir()).await {
        error!(
            "Failed to create media directory {}: {}",
            config.invoice_pdf_dir().display(),
            e
        );
    }

    let state = Arc::new(AppState::new(pool, config));
    if state.renderer.locate().is_none() {
        log::warn!("wkhtmltopdf not found; PDF downloads and emails will be unavailable");
    }

    run_axum_server(state).await?;
    info!("Server stopped");
    Ok(())
}

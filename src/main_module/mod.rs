//! Application shell: bootstrap, health, server and shutdown handling.

mod bootstrap;
mod health;
mod server;
mod shutdown;

pub use bootstrap::{
    bootstrap_tenant, run_init, username_for, InitOptions, InitReport, DEFAULT_ADMIN_EMAIL,
    DEFAULT_ADMIN_PASSWORD, DEFAULT_COMPANY_NAME,
};
pub use health::health_check;
pub use server::{build_router, run_axum_server};
pub use shutdown::shutdown_signal;

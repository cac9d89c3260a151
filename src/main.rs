//! `instructor-payroll` HTTP server.
//!
//! # Environment variables
//!
//! | Variable             | Default            | Description                     |
//! |----------------------|--------------------|---------------------------------|
//! | `PAYROLL_CONFIG_DIR` | `./config/academy` | Directory holding `engine.yaml` |
//! | `HOST`               | `0.0.0.0`          | Bind address                    |
//! | `PORT`               | `3000`             | Bind port                       |

use instructor_payroll::api::{AppState, create_router};
use instructor_payroll::config::ConfigLoader;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG_DIR: &str = "./config/academy";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: &str = "3000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "instructor_payroll=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_dir =
        std::env::var("PAYROLL_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let host = std::env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| DEFAULT_PORT.to_string());

    let config = ConfigLoader::load(&config_dir)?;
    tracing::info!(
        config_dir = %config_dir,
        academy = %config.engine().name,
        rate_tables = config.config().tax_rates().len(),
        "Configuration loaded"
    );

    let app = create_router(AppState::new(config));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Starting instructor-payroll server");

    axum::serve(listener, app).await?;
    Ok(())
}

use dotenvy::dotenv;
use migration::MigratorTrait;
use service::service_item::features::FeatureConfiguration;
use tracing::{error, info};
use uuid::Uuid;

fn init_logging(format: &str) {
    // Load .env early so RUST_LOG takes effect
    dotenv().ok();
    common::logging::init_logging(format);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Up,
    Down,
    Status,
}

fn parse_command(arg: Option<&str>) -> Result<Command, String> {
    match arg {
        None | Some("up") => Ok(Command::Up),
        Some("down") => Ok(Command::Down),
        Some("status") => Ok(Command::Status),
        Some(other) => Err(format!("unknown command {other:?}; expected up, down or status")),
    }
}

fn main() -> std::process::ExitCode {
    let config = configs::AppConfig::load_and_validate();
    let log_format = config.as_ref().map(|c| c.logging.format.clone()).unwrap_or_else(|_| "compact".into());
    init_logging(&log_format);

    let run_id = Uuid::new_v4();
    let version = env!("CARGO_PKG_VERSION");

    let arg = std::env::args().nth(1);
    let command = match parse_command(arg.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            error!(service = "migrate", event = "bad_arguments", error = %e, "invalid command line");
            return std::process::ExitCode::FAILURE;
        }
    };

    // Config file is optional; fall back to DATABASE_URL alone
    let (db_config, service_items) = match config {
        Ok(cfg) => (cfg.database, cfg.service_items),
        Err(e) => {
            info!(service = "migrate", event = "config_fallback", error = %e, "using environment database settings");
            (configs::DatabaseConfig::from_env(), configs::ServiceItemsConfig::default())
        }
    };

    // Refuse to migrate a database the service could not run against
    match service::service_item::CreatorConfig::from_config(&service_items) {
        Ok(cfg) => info!(
            service = "migrate",
            event = "service_items_config_ok",
            creatable = cfg.features.allowed_codes().len(),
            "service item configuration validated"
        ),
        Err(e) => {
            error!(service = "migrate", event = "config_invalid", error = %e, "invalid service item configuration");
            return std::process::ExitCode::FAILURE;
        }
    }

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "migrate", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(service = "migrate", event = "start", %run_id, version, command = ?command, "migration run starting");

    let result: anyhow::Result<()> = rt.block_on(async move {
        let db = models::db::connect_with_config(&db_config).await?;
        match command {
            Command::Up => migration::Migrator::up(&db, None).await?,
            Command::Down => migration::Migrator::down(&db, Some(1)).await?,
            Command::Status => migration::Migrator::status(&db).await?,
        }
        Ok(())
    });

    match result {
        Ok(()) => {
            info!(service = "migrate", event = "done", %run_id, command = ?command, "migration run finished");
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "migrate", event = "failed", %run_id, error = %e, "migration run failed");
            std::process::ExitCode::FAILURE
        }
    }
}

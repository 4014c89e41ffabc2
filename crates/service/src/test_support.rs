#![cfg(test)]
use tokio::sync::OnceCell;
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use configs::DatabaseConfig;
use models::db::connect_with_config;

// Migrations run once per test process; `false` means no usable database
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

/// A migrated database connection, or `None` when DB tests should be skipped.
pub async fn get_db() -> Option<DatabaseConnection> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let mut cfg = DatabaseConfig::from_env();
    cfg.min_connections = cfg.min_connections.min(1);
    cfg.connect_timeout_secs = cfg.connect_timeout_secs.min(5);
    cfg.acquire_timeout_secs = cfg.acquire_timeout_secs.min(10);

    let ready = *MIGRATED
        .get_or_init(|| async {
            let db = match connect_with_config(&cfg).await {
                Ok(db) => db,
                Err(e) => {
                    eprintln!("skip: cannot connect to db: {}", e);
                    return false;
                }
            };
            if let Err(e) = migration::Migrator::up(&db, None).await {
                eprintln!("skip: migrate up failed: {}", e);
                return false;
            }
            true
        })
        .await;
    if !ready {
        return None;
    }

    // Fresh connection for the current test's runtime
    match connect_with_config(&cfg).await {
        Ok(db) => Some(db),
        Err(e) => {
            eprintln!("skip: cannot connect to db: {}", e);
            None
        }
    }
}

use migration::MigratorTrait;
use sea_orm::DatabaseConnection;


/// Transaction handling and unique constraint tests
pub mod transaction_tests;

/// Connect and migrate, or `None` when no database is available.
pub(crate) async fn setup_test_db() -> Option<DatabaseConnection> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let db = match crate::db::connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("skip: cannot connect to db: {}", e);
            return None;
        }
    };
    if let Err(e) = migration::Migrator::up(&db, None).await {
        eprintln!("skip: migrate up failed: {}", e);
        return None;
    }
    Some(db)
}

pub(crate) fn unique_locator() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..6].to_uppercase()
}

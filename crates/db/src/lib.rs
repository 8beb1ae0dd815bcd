use db_migration::Migrator;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use utils_core::assets::asset_dir;

pub mod entities;
pub mod models;
pub mod types;

pub use sea_orm::{ConnectionTrait, DbErr, TransactionTrait};

#[derive(Clone)]
pub struct DBService {
    pub pool: DatabaseConnection,
}

impl DBService {
    /// Open (creating if missing) the sqlite database under the asset
    /// directory and bring the schema up to date.
    pub async fn new() -> Result<DBService, DbErr> {
        let database_url = format!(
            "sqlite://{}?mode=rwc",
            asset_dir().join("db.sqlite").to_string_lossy()
        );
        Self::new_with_url(&database_url).await
    }

    /// Connect to an explicit database URL. Tests use `sqlite::memory:`;
    /// a single connection keeps the in-memory schema alive.
    pub async fn new_with_url(database_url: &str) -> Result<DBService, DbErr> {
        let mut options = ConnectOptions::new(database_url.to_string());
        if database_url.contains(":memory:") {
            options.max_connections(1);
        }
        options.sqlx_logging(false);
        let pool = Database::connect(options).await?;
        Migrator::up(&pool, None).await?;
        Ok(DBService { pool })
    }
}

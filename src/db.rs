use anyhow::Context;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::{config::Config, repository::COLLECTION};

/// Opens the pool, checks the server answers, and makes sure the movie
/// table exists. The connection is held for the life of the process.
pub async fn connect(config: &Config) -> anyhow::Result<DatabaseConnection> {
    let url = config.database_url()?;
    let mut opts = ConnectOptions::new(url);
    opts.sqlx_logging(false);

    let db = Database::connect(opts).await.context("connecting to the database")?;
    prepare(&db).await?;

    tracing::info!(collection = COLLECTION, "connected to the database");
    Ok(db)
}

async fn prepare(db: &DatabaseConnection) -> anyhow::Result<()> {
    db.ping().await.context("pinging the database")?;
    Migrator::up(db, None).await.context("creating the movies table")?;
    Ok(())
}

#[cfg(test)]
pub async fn connect_memory() -> anyhow::Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opts).await?;
    prepare(&db).await?;
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: Option<&str>) -> Config {
        Config {
            addr: "127.0.0.1:0".parse().unwrap(),
            explicit_url: url.map(str::to_string),
            database_scheme: "postgres".into(),
            database_server: "localhost:5432".into(),
            database_user: "movies-admin".into(),
            database_name: "movies".into(),
            database_password: None,
        }
    }

    #[tokio::test]
    async fn unsupported_url_fails_to_connect() {
        let err = connect(&config(Some("nosuchdb://localhost/movies"))).await.unwrap_err();
        assert!(err.to_string().contains("connecting to the database"));
    }

    #[tokio::test]
    async fn unopenable_sqlite_file_fails_to_connect() {
        let url = "sqlite:///nonexistent-dir/movies-api/movies.db";
        assert!(connect(&config(Some(url))).await.is_err());
    }

    #[tokio::test]
    async fn missing_credential_fails_before_connecting() {
        let err = connect(&config(None)).await.unwrap_err();
        assert!(err.to_string().contains(crate::config::PASSWORD_VAR));
    }

    #[tokio::test]
    async fn in_memory_sqlite_connects_and_migrates() {
        let db = connect(&config(Some("sqlite::memory:"))).await.unwrap();
        assert!(db.ping().await.is_ok());
    }
}

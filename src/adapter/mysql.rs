use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};

use super::{payload, BackendAdapter};

/// Connection settings for a MySQL server reached over a Unix socket.
#[derive(Debug, Clone)]
pub struct MysqlConfig {
    /// Path of the server's Unix socket file.
    pub socket: PathBuf,
    pub user: String,
    pub pass: String,
    pub database: String,
    /// Scratch table name; must not already exist.
    pub table: String,
    /// Sized to the run's concurrency so workers never queue on the pool.
    pub pool_size: u32,
}

/// Relational backend: one row per key, 1 KiB blob payload.
pub struct MysqlAdapter {
    pool: MySqlPool,
    table: String,
}

impl MysqlAdapter {
    pub async fn connect(config: MysqlConfig) -> Result<Self> {
        // Table names cannot be bound as parameters; keep them boring.
        ensure!(
            !config.table.is_empty()
                && config
                    .table
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_'),
            "scratch table name must be alphanumeric/underscore, got {:?}",
            config.table
        );

        let options = MySqlConnectOptions::new()
            .socket(&config.socket)
            .username(&config.user)
            .password(&config.pass)
            .database(&config.database);

        let pool = MySqlPoolOptions::new()
            .max_connections(config.pool_size)
            .connect_with(options)
            .await
            .with_context(|| {
                format!("connecting to mysql over socket {}", config.socket.display())
            })?;

        Ok(Self {
            pool,
            table: config.table,
        })
    }
}

#[async_trait]
impl BackendAdapter for MysqlAdapter {
    async fn setup(&self) -> Result<()> {
        sqlx::query(&format!(
            "CREATE TABLE {} (id INT PRIMARY KEY, value BLOB)",
            self.table
        ))
        .execute(&self.pool)
        .await
        .with_context(|| format!("creating scratch table {}", self.table))?;
        Ok(())
    }

    async fn teardown(&self) -> Result<()> {
        sqlx::query(&format!("DROP TABLE {}", self.table))
            .execute(&self.pool)
            .await
            .with_context(|| format!("dropping scratch table {}", self.table))?;
        Ok(())
    }

    async fn read(&self, id: u64) -> Result<()> {
        // A missing row is still a successful read.
        sqlx::query(&format!("SELECT id, value FROM {} WHERE id = ?", self.table))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert(&self, id: u64) -> Result<()> {
        sqlx::query(&format!("INSERT INTO {} VALUES (?, ?)", self.table))
            .bind(id)
            .bind(payload())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update(&self, id: u64) -> Result<()> {
        sqlx::query(&format!("UPDATE {} SET value = ? WHERE id = ?", self.table))
            .bind(payload())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

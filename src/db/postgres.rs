//! PostgreSQL-backed bar store.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error, info};

use super::store::BarStore;
use crate::error::{Result, TraderError};
use crate::models::Bar;

const UPSERT_BAR: &str = "INSERT INTO minute_bars (symbol, ts, open, high, low, close, volume)
     VALUES ($1, $2, $3, $4, $5, $6, $7)
     ON CONFLICT (symbol, ts) DO UPDATE SET
        open = EXCLUDED.open,
        high = EXCLUDED.high,
        low = EXCLUDED.low,
        close = EXCLUDED.close,
        volume = EXCLUDED.volume";

/// Bars of one symbol in the shared `minute_bars` table, keyed by
/// `(symbol, ts)`. Timestamps are stored as exchange-local `TIMESTAMP`.
pub struct PostgresBarStore {
    client: Client,
    symbol: String,
}

impl PostgresBarStore {
    pub async fn connect(database_url: &str, symbol: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(database_url, NoTls)
            .await
            .map_err(|e| {
                TraderError::StorageUnavailable(format!("Failed to connect to database: {}", e))
            })?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "Database connection error");
            }
        });

        let store = Self {
            client,
            symbol: symbol.to_string(),
        };
        store.init_schema().await?;

        info!(symbol = %store.symbol, "PostgresBarStore: schema ready");
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        self.client
            .execute(
                "CREATE TABLE IF NOT EXISTS minute_bars (
                    symbol TEXT NOT NULL,
                    ts TIMESTAMP NOT NULL,
                    open NUMERIC(18, 8) NOT NULL,
                    high NUMERIC(18, 8) NOT NULL,
                    low NUMERIC(18, 8) NOT NULL,
                    close NUMERIC(18, 8) NOT NULL,
                    volume NUMERIC(18, 8) NOT NULL,
                    PRIMARY KEY (symbol, ts)
                )",
                &[],
            )
            .await
            .map_err(|e| {
                TraderError::StorageUnavailable(format!("Failed to create minute_bars table: {}", e))
            })?;
        Ok(())
    }
}

#[async_trait]
impl BarStore for PostgresBarStore {
    async fn upsert(&self, bars: &[Bar]) -> Result<usize> {
        if bars.is_empty() {
            return Ok(0);
        }

        let statement = self.client.prepare(UPSERT_BAR).await?;
        let mut written = 0;
        for bar in bars {
            self.client
                .execute(
                    &statement,
                    &[
                        &self.symbol,
                        &bar.timestamp,
                        &bar.open,
                        &bar.high,
                        &bar.low,
                        &bar.close,
                        &bar.volume,
                    ],
                )
                .await
                .map_err(|e| {
                    TraderError::StorageUnavailable(format!(
                        "Failed to store bar {}: {}",
                        bar.timestamp, e
                    ))
                })?;
            written += 1;
        }

        debug!(symbol = %self.symbol, written, "PostgresBarStore: upserted bars");
        Ok(written)
    }

    async fn latest_timestamp(&self) -> Result<Option<NaiveDateTime>> {
        let row = self
            .client
            .query_one(
                "SELECT MAX(ts) FROM minute_bars WHERE symbol = $1",
                &[&self.symbol],
            )
            .await?;
        Ok(row.get::<_, Option<NaiveDateTime>>(0))
    }

    async fn query_recent(&self, limit: usize) -> Result<Vec<Bar>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = self
            .client
            .query(
                "SELECT ts, open, high, low, close, volume
                 FROM minute_bars
                 WHERE symbol = $1
                 ORDER BY ts DESC
                 LIMIT $2",
                &[&self.symbol, &limit],
            )
            .await?;

        let mut bars: Vec<Bar> = rows
            .iter()
            .map(|row| {
                Bar::new(
                    row.get::<_, NaiveDateTime>(0),
                    row.get::<_, Decimal>(1),
                    row.get::<_, Decimal>(2),
                    row.get::<_, Decimal>(3),
                    row.get::<_, Decimal>(4),
                    row.get::<_, Decimal>(5),
                )
            })
            .collect();

        // Oldest first
        bars.reverse();
        Ok(bars)
    }
}

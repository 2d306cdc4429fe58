//! Scan history persistence.
//!
//! One row per completed scan, holding the inputs, the policy in effect, and
//! every unrounded number the engine produced. Rejected scans are not stored.

use anyhow::{Context, Result};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use crate::scanner::ScanOutcome;

/// Bankroll mode recorded with each scan. Only automatic sizing exists.
const BANKROLL_MODE_AUTO: &str = "auto";

/// Database connection pool.
pub struct Database {
    pool: SqlitePool,
}

/// Stored scan record.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StoredScan {
    pub id: i64,
    pub created_at: String,
    pub symbol: String,
    pub total_value: f64,
    pub sleep_hours: f64,
    pub exercise_minutes: i64,
    pub risk_per_trade_pct: f64,
    pub stop_loss_pct: f64,
    pub bankroll_mode: String,
    pub bankroll_pct: f64,
    pub bankroll_amount: f64,
    pub psychology_score: f64,
    pub psychology_note: String,
    pub psychology_alert: String,
    pub psychology_guidance: String,
    pub risk_per_trade: f64,
    pub stop_loss_used_pct: f64,
    pub stop_basis: String,
    pub atr: Option<f64>,
    pub entry_price: f64,
    pub position_size: f64,
    pub stop_loss_at: f64,
    pub risk_per_share: f64,
}

impl StoredScan {
    /// Whole shares a broker ticket would carry.
    pub fn whole_shares(&self) -> i64 {
        self.position_size.floor() as i64
    }
}

impl Database {
    /// Create a new database connection.
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Private in-memory database. A single connection that never recycles,
    /// since each new connection would open an empty database.
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS scan_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at TEXT NOT NULL,
                symbol TEXT NOT NULL,
                total_value REAL NOT NULL,
                sleep_hours REAL NOT NULL,
                exercise_minutes INTEGER NOT NULL,
                risk_per_trade_pct REAL NOT NULL,
                stop_loss_pct REAL NOT NULL,
                bankroll_mode TEXT NOT NULL,
                bankroll_pct REAL NOT NULL,
                bankroll_amount REAL NOT NULL,
                psychology_score REAL NOT NULL,
                psychology_note TEXT NOT NULL,
                psychology_alert TEXT NOT NULL,
                psychology_guidance TEXT NOT NULL DEFAULT '',
                risk_per_trade REAL NOT NULL,
                stop_loss_used_pct REAL NOT NULL,
                stop_basis TEXT NOT NULL DEFAULT 'percent',
                atr REAL,
                entry_price REAL NOT NULL,
                position_size REAL NOT NULL,
                stop_loss_at REAL NOT NULL,
                risk_per_share REAL NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_scan_records_symbol ON scan_records(symbol)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Persist a completed scan, returning its id.
    pub async fn insert_scan(&self, outcome: &ScanOutcome) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO scan_records (
                created_at, symbol, total_value, sleep_hours, exercise_minutes,
                risk_per_trade_pct, stop_loss_pct, bankroll_mode, bankroll_pct, bankroll_amount,
                psychology_score, psychology_note, psychology_alert, psychology_guidance,
                risk_per_trade, stop_loss_used_pct, stop_basis, atr,
                entry_price, position_size, stop_loss_at, risk_per_share
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(outcome.created_at.to_rfc3339())
        .bind(&outcome.symbol)
        .bind(outcome.request.total_value)
        .bind(outcome.request.readiness.sleep_hours)
        .bind(i64::from(outcome.request.readiness.exercise_minutes))
        .bind(outcome.policy.risk_per_trade_pct)
        .bind(outcome.policy.stop_loss_pct)
        .bind(BANKROLL_MODE_AUTO)
        .bind(outcome.allocation.fraction_of_total)
        .bind(outcome.allocation.amount)
        .bind(outcome.factor.value)
        .bind(&outcome.factor.note)
        .bind(outcome.factor.alert.as_str())
        .bind(&outcome.factor.guidance)
        .bind(outcome.plan.risk_capital_per_trade)
        .bind(outcome.plan.stop_pct)
        .bind(outcome.plan.stop_basis.as_str())
        .bind(outcome.volatility.atr)
        .bind(outcome.plan.entry_price)
        .bind(outcome.plan.share_count)
        .bind(outcome.plan.stop_price)
        .bind(outcome.plan.risk_per_share)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert scan")?;

        Ok(sqlx::Row::get(&result, "id"))
    }

    /// Stored scans, newest first, optionally for one symbol.
    pub async fn list_scans(
        &self,
        limit: i64,
        offset: i64,
        symbol: Option<&str>,
    ) -> Result<Vec<StoredScan>> {
        match symbol {
            Some(symbol) => sqlx::query_as::<_, StoredScan>(
                "SELECT * FROM scan_records WHERE symbol = ? ORDER BY id DESC LIMIT ? OFFSET ?",
            )
            .bind(symbol.trim().to_uppercase())
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch scans"),
            None => sqlx::query_as::<_, StoredScan>(
                "SELECT * FROM scan_records ORDER BY id DESC LIMIT ? OFFSET ?",
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch scans"),
        }
    }

    /// A single stored scan.
    pub async fn get_scan(&self, id: i64) -> Result<Option<StoredScan>> {
        sqlx::query_as::<_, StoredScan>("SELECT * FROM scan_records WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch scan")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::StaticBars;
    use crate::models::PriceBar;
    use crate::risk::RiskPolicy;
    use crate::scanner::{ScanRequest, Scanner};
    use std::sync::Arc;

    async fn outcome_for(symbol: &str, close: f64) -> ScanOutcome {
        let bars = vec![PriceBar::new(close + 1.0, close - 1.0, close)];
        let scanner = Scanner::new(Arc::new(StaticBars::new(bars)), RiskPolicy::default());
        scanner
            .scan(&ScanRequest::new(symbol, 50_000.0, 7.5, 60))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get_scan() {
        let db = Database::in_memory().await.unwrap();
        let outcome = outcome_for("msft", 102.5).await;

        let id = db.insert_scan(&outcome).await.unwrap();
        let stored = db.get_scan(id).await.unwrap().unwrap();

        assert_eq!(stored.symbol, "MSFT");
        assert_eq!(stored.bankroll_mode, "auto");
        assert_eq!(stored.exercise_minutes, 60);
        assert_eq!(stored.psychology_score, outcome.factor.value);
        assert_eq!(stored.psychology_alert, outcome.factor.alert.as_str());
        assert_eq!(stored.entry_price, 102.5);
        assert_eq!(stored.position_size, outcome.plan.share_count);
        assert_eq!(stored.stop_basis, "percent");
        assert_eq!(stored.atr, None);
        assert_eq!(stored.whole_shares(), outcome.plan.share_count.floor() as i64);
    }

    #[tokio::test]
    async fn test_get_missing_scan() {
        let db = Database::in_memory().await.unwrap();
        assert!(db.get_scan(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_scans_newest_first_with_filter() {
        let db = Database::in_memory().await.unwrap();
        let first = db.insert_scan(&outcome_for("SPY", 400.0).await).await.unwrap();
        let second = db.insert_scan(&outcome_for("QQQ", 350.0).await).await.unwrap();
        let third = db.insert_scan(&outcome_for("SPY", 401.0).await).await.unwrap();

        let all = db.list_scans(50, 0, None).await.unwrap();
        let ids: Vec<i64> = all.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![third, second, first]);

        let spy = db.list_scans(50, 0, Some("spy")).await.unwrap();
        let ids: Vec<i64> = spy.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![third, first]);

        let page = db.list_scans(1, 1, None).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, second);
    }
}

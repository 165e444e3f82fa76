//! SQLite persistence for profiles, recruiter postings, matches, and interview sessions.

mod interviews;
mod market;
mod matches;
mod postings;
mod profiles;

use crate::config::{Config, get_config};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use time::OffsetDateTime;

pub use market::{DistributionEntry, MarketOverview};
pub use matches::{MatchRecord, MatchStatistics};
pub use postings::{NewRecruiterPosting, RecruiterPosting};
pub use profiles::JobSeekerProfile;

/// Errors raised by the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database driver error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    /// A JSON column could not be encoded or decoded.
    #[error("Stored JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),
    /// Database directory could not be created.
    #[error("Failed to prepare database directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Handle to the CareerLens database.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open the database named by the global configuration.
    pub async fn open() -> Result<Self, StoreError> {
        Self::from_config(get_config()).await
    }

    /// Open the database named by `config`.
    pub async fn from_config(config: &Config) -> Result<Self, StoreError> {
        Self::connect(&config.database_path).await
    }

    /// Open (creating if needed) the database at `path` and ensure the schema exists.
    ///
    /// The special path `:memory:` opens a private in-memory database.
    pub async fn connect(path: &Path) -> Result<Self, StoreError> {
        if path.as_os_str() == ":memory:" {
            return Self::in_memory().await;
        }

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        tracing::debug!(path = %path.display(), "Opened database");
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Open an in-memory database; every handle clone shares the single connection.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Run a trivial query to confirm the database answers.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(*statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS job_seekers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        job_seeker_id TEXT UNIQUE NOT NULL,
        created_at TEXT NOT NULL,
        primary_role TEXT NOT NULL DEFAULT '',
        analysis_json TEXT NOT NULL,
        details_json TEXT NOT NULL,
        hard_skills TEXT NOT NULL DEFAULT '',
        location_preference TEXT NOT NULL DEFAULT '',
        resume_filename TEXT NOT NULL DEFAULT '',
        resume_text TEXT NOT NULL DEFAULT '',
        resume_fingerprint TEXT NOT NULL DEFAULT ''
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_job_seekers_fingerprint ON job_seekers(resume_fingerprint)",
    r#"
    CREATE TABLE IF NOT EXISTS recruiter_postings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        created_at TEXT NOT NULL,
        job_title TEXT NOT NULL,
        job_description TEXT NOT NULL DEFAULT '',
        main_responsibilities TEXT NOT NULL DEFAULT '',
        required_skills TEXT NOT NULL DEFAULT '',
        client_company TEXT NOT NULL DEFAULT '',
        industry TEXT NOT NULL DEFAULT '',
        work_location TEXT NOT NULL DEFAULT '',
        work_type TEXT NOT NULL DEFAULT '',
        company_size TEXT NOT NULL DEFAULT '',
        employment_type TEXT NOT NULL DEFAULT '',
        experience_level TEXT NOT NULL DEFAULT '',
        visa_support TEXT NOT NULL DEFAULT '',
        min_salary REAL,
        max_salary REAL,
        currency TEXT NOT NULL DEFAULT '',
        benefits TEXT NOT NULL DEFAULT '',
        application_method TEXT NOT NULL DEFAULT '',
        valid_until TEXT NOT NULL DEFAULT ''
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_recruiter_postings_title ON recruiter_postings(job_title)",
    r#"
    CREATE TABLE IF NOT EXISTS matched_jobs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        job_seeker_id TEXT NOT NULL,
        job_id TEXT NOT NULL,
        job_title TEXT NOT NULL,
        company_name TEXT NOT NULL DEFAULT '',
        location TEXT NOT NULL DEFAULT '',
        job_description TEXT NOT NULL DEFAULT '',
        application_url TEXT NOT NULL DEFAULT '',
        posted_date TEXT NOT NULL DEFAULT '',
        employment_type TEXT,
        salary_min REAL,
        salary_max REAL,
        salary_currency TEXT,
        cosine_similarity_score REAL,
        semantic_score REAL NOT NULL DEFAULT 0,
        skill_match_score REAL NOT NULL DEFAULT 0,
        match_percentage REAL NOT NULL DEFAULT 0,
        matched_skills TEXT NOT NULL DEFAULT '[]',
        missing_skills TEXT NOT NULL DEFAULT '[]',
        matched_at TEXT NOT NULL,
        last_updated TEXT NOT NULL,
        UNIQUE(job_seeker_id, job_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_matched_jobs_seeker ON matched_jobs(job_seeker_id)",
    "CREATE INDEX IF NOT EXISTS idx_matched_jobs_percentage ON matched_jobs(match_percentage DESC)",
    "CREATE INDEX IF NOT EXISTS idx_matched_jobs_date ON matched_jobs(matched_at DESC)",
    r#"
    CREATE TABLE IF NOT EXISTS interview_sessions (
        session_id TEXT PRIMARY KEY,
        job_seeker_id TEXT NOT NULL,
        status TEXT NOT NULL,
        session_json TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_interview_sessions_seeker ON interview_sessions(job_seeker_id)",
];

/// Current timestamp formatted for storage.
pub(crate) fn current_timestamp_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_creation_is_idempotent() {
        let store = Store::in_memory().await.expect("store");
        store.migrate().await.expect("second migration");
        store.ping().await.expect("ping");
    }

    #[tokio::test]
    async fn file_databases_are_created_on_demand() {
        let dir = std::env::temp_dir().join(format!("careerlens-{}", uuid::Uuid::new_v4()));
        let path = dir.join("nested").join("careerlens.db");
        let store = Store::connect(&path).await.expect("file store");
        store.ping().await.expect("ping");
        assert!(path.exists());
        drop(store);
        let _ = std::fs::remove_dir_all(dir);
    }
}

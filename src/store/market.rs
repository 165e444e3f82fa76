use super::{Store, StoreError};
use serde::Serialize;
use sqlx::Row;

/// Share of postings falling into one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionEntry {
    /// Category label.
    pub label: String,
    /// Postings in the category.
    pub count: i64,
    /// Share of all postings, 0..=100 with one decimal.
    pub percentage: f64,
}

/// Snapshot of the local job market: postings by industry and experience level.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarketOverview {
    /// Profiles stored.
    pub total_job_seekers: i64,
    /// Recruiter postings stored.
    pub total_postings: i64,
    /// Recruiter postings still valid today.
    pub active_postings: i64,
    /// Matched jobs stored.
    pub total_matches: i64,
    /// Postings per industry, largest first.
    pub industries: Vec<DistributionEntry>,
    /// Postings per experience level, largest first.
    pub experience_levels: Vec<DistributionEntry>,
}

impl Store {
    /// Aggregate counts and distributions across all tables.
    pub async fn market_overview(&self) -> Result<MarketOverview, StoreError> {
        let total_job_seekers = self.count("SELECT COUNT(*) FROM job_seekers").await?;
        let total_postings = self.count("SELECT COUNT(*) FROM recruiter_postings").await?;
        let active_postings = self
            .count("SELECT COUNT(*) FROM recruiter_postings WHERE valid_until >= date('now')")
            .await?;
        let total_matches = self.count("SELECT COUNT(*) FROM matched_jobs").await?;

        Ok(MarketOverview {
            total_job_seekers,
            total_postings,
            active_postings,
            total_matches,
            industries: self.distribution("industry", total_postings).await?,
            experience_levels: self
                .distribution("experience_level", total_postings)
                .await?,
        })
    }

    async fn count(&self, sql: &str) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(sql).fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn distribution(
        &self,
        column: &str,
        total: i64,
    ) -> Result<Vec<DistributionEntry>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT CASE WHEN trim({column}) = '' THEN 'Unspecified' ELSE {column} END AS label, \
                    COUNT(*) AS count \
             FROM recruiter_postings GROUP BY label ORDER BY count DESC, label"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let count: i64 = row.try_get("count")?;
                Ok(DistributionEntry {
                    label: row.try_get("label")?,
                    count,
                    percentage: percentage(count, total),
                })
            })
            .collect()
    }
}

fn percentage(count: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    crate::text::round1(count as f64 / total as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NewRecruiterPosting;

    #[tokio::test]
    async fn overview_groups_postings() {
        let store = Store::in_memory().await.unwrap();
        for (industry, level) in [
            ("Finance", "3-5 years"),
            ("Finance", "1-3 years"),
            ("Healthcare", "3-5 years"),
            ("", "3-5 years"),
        ] {
            store
                .save_posting(&NewRecruiterPosting {
                    job_title: "Analyst".into(),
                    industry: industry.into(),
                    experience_level: level.into(),
                    valid_until: "2999-01-01".into(),
                    ..NewRecruiterPosting::default()
                })
                .await
                .unwrap();
        }

        let overview = store.market_overview().await.unwrap();
        assert_eq!(overview.total_postings, 4);
        assert_eq!(overview.active_postings, 4);
        assert_eq!(overview.total_job_seekers, 0);
        assert_eq!(
            overview.industries[0],
            DistributionEntry {
                label: "Finance".into(),
                count: 2,
                percentage: 50.0
            }
        );
        assert!(overview.industries.iter().any(|entry| entry.label == "Unspecified"));
        assert_eq!(overview.experience_levels[0].label, "3-5 years");
        assert_eq!(overview.experience_levels[0].percentage, 75.0);
    }

    #[test]
    fn percentage_guards_empty_totals() {
        assert_eq!(percentage(3, 0), 0.0);
        assert_eq!(percentage(1, 3), 33.3);
    }
}

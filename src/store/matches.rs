use super::{Store, StoreError, current_timestamp_rfc3339};
use crate::matching::ScoredJob;
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

const MATCH_COLUMNS: &str = "job_seeker_id, job_id, job_title, company_name, location, \
job_description, application_url, posted_date, employment_type, salary_min, salary_max, \
salary_currency, cosine_similarity_score, semantic_score, skill_match_score, match_percentage, \
matched_skills, missing_skills, matched_at, last_updated";

/// A job-board posting matched to a job seeker, with its scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Owning job seeker.
    pub job_seeker_id: String,
    /// Provider job identifier.
    pub job_id: String,
    /// Job title.
    pub job_title: String,
    /// Hiring company.
    pub company_name: String,
    /// Display location.
    pub location: String,
    /// Job description.
    pub job_description: String,
    /// Application link.
    pub application_url: String,
    /// Posting date as reported by the provider.
    pub posted_date: String,
    /// Employment type, when known.
    pub employment_type: Option<String>,
    /// Lower salary bound, when known.
    pub salary_min: Option<f64>,
    /// Upper salary bound, when known.
    pub salary_max: Option<f64>,
    /// Salary currency, when known.
    pub salary_currency: Option<String>,
    /// Raw cosine similarity, 0..=1.
    pub cosine_similarity_score: Option<f64>,
    /// Semantic score, 0..=100.
    pub semantic_score: f64,
    /// Skill overlap percentage, 0..=100.
    pub skill_match_score: f64,
    /// Combined score, 0..=100.
    pub match_percentage: f64,
    /// Candidate skills found in the posting (at most ten).
    pub matched_skills: Vec<String>,
    /// Candidate skills absent from the posting.
    pub missing_skills: Vec<String>,
    /// First time the pair was matched.
    pub matched_at: String,
    /// Last time the scores were refreshed.
    pub last_updated: String,
}

impl MatchRecord {
    /// Build a record for `job_seeker_id` from a scored posting.
    pub fn from_scored(job_seeker_id: &str, scored: &ScoredJob) -> Self {
        let now = current_timestamp_rfc3339();
        let salary = scored.job.salary.as_ref();
        Self {
            job_seeker_id: job_seeker_id.to_string(),
            job_id: scored.job.id.clone(),
            job_title: scored.job.title.clone(),
            company_name: scored.job.company.clone(),
            location: scored.job.location.clone(),
            job_description: scored.job.description.clone(),
            application_url: scored.job.url.clone(),
            posted_date: scored.job.posted_date.clone(),
            employment_type: scored.job.employment_type.clone(),
            salary_min: salary.and_then(|s| s.min),
            salary_max: salary.and_then(|s| s.max),
            salary_currency: salary.and_then(|s| s.currency.clone()),
            cosine_similarity_score: Some(scored.cosine_similarity),
            semantic_score: scored.semantic_score,
            skill_match_score: scored.skill_match_score,
            match_percentage: scored.combined_score,
            matched_skills: scored.matched_skills.clone(),
            missing_skills: scored.missing_skills.clone(),
            matched_at: now.clone(),
            last_updated: now,
        }
    }
}

/// Aggregate scores over one seeker's matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchStatistics {
    /// Number of stored matches.
    pub total_matches: i64,
    /// Mean cosine similarity.
    pub avg_similarity: Option<f64>,
    /// Highest cosine similarity.
    pub max_similarity: Option<f64>,
    /// Lowest cosine similarity.
    pub min_similarity: Option<f64>,
    /// Mean combined score.
    pub avg_match_percentage: Option<f64>,
    /// Highest combined score.
    pub max_match_percentage: Option<f64>,
    /// Mean skill overlap.
    pub avg_skill_match: Option<f64>,
}

fn match_from_row(row: &SqliteRow) -> Result<MatchRecord, StoreError> {
    let matched: String = row.try_get("matched_skills")?;
    let missing: String = row.try_get("missing_skills")?;
    Ok(MatchRecord {
        job_seeker_id: row.try_get("job_seeker_id")?,
        job_id: row.try_get("job_id")?,
        job_title: row.try_get("job_title")?,
        company_name: row.try_get("company_name")?,
        location: row.try_get("location")?,
        job_description: row.try_get("job_description")?,
        application_url: row.try_get("application_url")?,
        posted_date: row.try_get("posted_date")?,
        employment_type: row.try_get("employment_type")?,
        salary_min: row.try_get("salary_min")?,
        salary_max: row.try_get("salary_max")?,
        salary_currency: row.try_get("salary_currency")?,
        cosine_similarity_score: row.try_get("cosine_similarity_score")?,
        semantic_score: row.try_get("semantic_score")?,
        skill_match_score: row.try_get("skill_match_score")?,
        match_percentage: row.try_get("match_percentage")?,
        matched_skills: serde_json::from_str(&matched)?,
        missing_skills: serde_json::from_str(&missing)?,
        matched_at: row.try_get("matched_at")?,
        last_updated: row.try_get("last_updated")?,
    })
}

impl Store {
    /// Insert a match or refresh the scores of an existing (seeker, job) pair.
    pub async fn save_match(&self, record: &MatchRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO matched_jobs (job_seeker_id, job_id, job_title, company_name, location,
                job_description, application_url, posted_date, employment_type, salary_min,
                salary_max, salary_currency, cosine_similarity_score, semantic_score,
                skill_match_score, match_percentage, matched_skills, missing_skills,
                matched_at, last_updated)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(job_seeker_id, job_id) DO UPDATE SET
                job_title = excluded.job_title,
                company_name = excluded.company_name,
                location = excluded.location,
                job_description = excluded.job_description,
                application_url = excluded.application_url,
                posted_date = excluded.posted_date,
                employment_type = excluded.employment_type,
                salary_min = excluded.salary_min,
                salary_max = excluded.salary_max,
                salary_currency = excluded.salary_currency,
                cosine_similarity_score = excluded.cosine_similarity_score,
                semantic_score = excluded.semantic_score,
                skill_match_score = excluded.skill_match_score,
                match_percentage = excluded.match_percentage,
                matched_skills = excluded.matched_skills,
                missing_skills = excluded.missing_skills,
                last_updated = excluded.last_updated
            "#,
        )
        .bind(&record.job_seeker_id)
        .bind(&record.job_id)
        .bind(&record.job_title)
        .bind(&record.company_name)
        .bind(&record.location)
        .bind(&record.job_description)
        .bind(&record.application_url)
        .bind(&record.posted_date)
        .bind(&record.employment_type)
        .bind(record.salary_min)
        .bind(record.salary_max)
        .bind(&record.salary_currency)
        .bind(record.cosine_similarity_score)
        .bind(record.semantic_score)
        .bind(record.skill_match_score)
        .bind(record.match_percentage)
        .bind(serde_json::to_string(&record.matched_skills)?)
        .bind(serde_json::to_string(&record.missing_skills)?)
        .bind(&record.matched_at)
        .bind(&record.last_updated)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Save several matches, logging failures; returns how many were written.
    pub async fn save_matches(&self, records: &[MatchRecord]) -> usize {
        let mut saved = 0;
        for record in records {
            match self.save_match(record).await {
                Ok(()) => saved += 1,
                Err(error) => tracing::warn!(
                    job_id = %record.job_id,
                    job_seeker_id = %record.job_seeker_id,
                    error = %error,
                    "Failed to save matched job"
                ),
            }
        }
        saved
    }

    /// One stored match for a seeker.
    pub async fn get_match(
        &self,
        job_seeker_id: &str,
        job_id: &str,
    ) -> Result<Option<MatchRecord>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {MATCH_COLUMNS} FROM matched_jobs WHERE job_seeker_id = ? AND job_id = ?"
        ))
        .bind(job_seeker_id)
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(match_from_row).transpose()
    }

    /// A seeker's matches with a combined score of at least `min_score` (0..=100), best first.
    pub async fn list_matches(
        &self,
        job_seeker_id: &str,
        min_score: f64,
        limit: u32,
    ) -> Result<Vec<MatchRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {MATCH_COLUMNS} FROM matched_jobs \
             WHERE job_seeker_id = ? AND match_percentage >= ? \
             ORDER BY match_percentage DESC, cosine_similarity_score DESC \
             LIMIT ?"
        ))
        .bind(job_seeker_id)
        .bind(min_score)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(match_from_row).collect()
    }

    /// A seeker's most recently matched jobs.
    pub async fn recent_matches(
        &self,
        job_seeker_id: &str,
        limit: u32,
    ) -> Result<Vec<MatchRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {MATCH_COLUMNS} FROM matched_jobs WHERE job_seeker_id = ? \
             ORDER BY matched_at DESC, id DESC LIMIT ?"
        ))
        .bind(job_seeker_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(match_from_row).collect()
    }

    /// Remove one match; returns whether it existed.
    pub async fn delete_match(
        &self,
        job_seeker_id: &str,
        job_id: &str,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM matched_jobs WHERE job_seeker_id = ? AND job_id = ?")
            .bind(job_seeker_id)
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove every match of a seeker; returns the number removed.
    pub async fn delete_matches_for_seeker(&self, job_seeker_id: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM matched_jobs WHERE job_seeker_id = ?")
            .bind(job_seeker_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Aggregate scores over a seeker's matches.
    pub async fn match_statistics(
        &self,
        job_seeker_id: &str,
    ) -> Result<MatchStatistics, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total_matches,
                AVG(cosine_similarity_score) AS avg_similarity,
                MAX(cosine_similarity_score) AS max_similarity,
                MIN(cosine_similarity_score) AS min_similarity,
                AVG(match_percentage) AS avg_match_percentage,
                MAX(match_percentage) AS max_match_percentage,
                AVG(skill_match_score) AS avg_skill_match
            FROM matched_jobs
            WHERE job_seeker_id = ?
            "#,
        )
        .bind(job_seeker_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(MatchStatistics {
            total_matches: row.try_get("total_matches")?,
            avg_similarity: row.try_get("avg_similarity")?,
            max_similarity: row.try_get("max_similarity")?,
            min_similarity: row.try_get("min_similarity")?,
            avg_match_percentage: row.try_get("avg_match_percentage")?,
            max_match_percentage: row.try_get("max_match_percentage")?,
            avg_skill_match: row.try_get("avg_skill_match")?,
        })
    }

    /// Seekers that have at least one stored match.
    pub async fn matched_seekers(&self) -> Result<Vec<String>, StoreError> {
        let seekers: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT job_seeker_id FROM matched_jobs ORDER BY job_seeker_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(seekers)
    }
}

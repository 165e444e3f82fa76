use super::{Store, StoreError, current_timestamp_rfc3339};
use crate::resume::{ParsedResume, ResumeAnalysis, StructuredProfile};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use uuid::Uuid;

const MAX_ID_ATTEMPTS: u32 = 5;

const PROFILE_COLUMNS: &str = "job_seeker_id, created_at, analysis_json, details_json, \
resume_filename, resume_text, resume_fingerprint";

/// A job seeker as persisted after resume processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSeekerProfile {
    /// `JS_` followed by eight uppercase hex digits.
    pub job_seeker_id: String,
    /// RFC 3339 creation time.
    pub created_at: String,
    /// Role detection output.
    pub analysis: ResumeAnalysis,
    /// Structured free-text details.
    pub details: StructuredProfile,
    /// Name of the uploaded file.
    pub resume_filename: String,
    /// Extracted resume text.
    pub resume_text: String,
    /// Hash of the normalized resume text.
    pub resume_fingerprint: String,
}

impl JobSeekerProfile {
    /// Assemble a new profile with a fresh identifier.
    pub fn new(
        resume: &ParsedResume,
        analysis: ResumeAnalysis,
        details: StructuredProfile,
    ) -> Self {
        Self {
            job_seeker_id: new_job_seeker_id(),
            created_at: current_timestamp_rfc3339(),
            analysis,
            details,
            resume_filename: resume.filename.clone(),
            resume_text: resume.raw_text.clone(),
            resume_fingerprint: resume.fingerprint.clone(),
        }
    }

    /// Candidate skills used for matching: analysed skills, falling back to extracted hard skills.
    pub fn skills(&self) -> Vec<String> {
        if self.analysis.skills.is_empty() {
            crate::text::split_list(&self.details.hard_skills)
        } else {
            self.analysis.skills.clone()
        }
    }
}

fn new_job_seeker_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("JS_{}", hex[..8].to_uppercase())
}

fn profile_from_row(row: &SqliteRow) -> Result<JobSeekerProfile, StoreError> {
    let analysis: String = row.try_get("analysis_json")?;
    let details: String = row.try_get("details_json")?;
    Ok(JobSeekerProfile {
        job_seeker_id: row.try_get("job_seeker_id")?,
        created_at: row.try_get("created_at")?,
        analysis: serde_json::from_str(&analysis)?,
        details: serde_json::from_str(&details)?,
        resume_filename: row.try_get("resume_filename")?,
        resume_text: row.try_get("resume_text")?,
        resume_fingerprint: row.try_get("resume_fingerprint")?,
    })
}

impl Store {
    /// Insert a new profile; fails if its job seeker id is already taken.
    pub async fn save_profile(&self, profile: &JobSeekerProfile) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO job_seekers (job_seeker_id, created_at, primary_role, analysis_json,
                                     details_json, hard_skills, location_preference,
                                     resume_filename, resume_text, resume_fingerprint)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&profile.job_seeker_id)
        .bind(&profile.created_at)
        .bind(&profile.analysis.primary_role)
        .bind(serde_json::to_string(&profile.analysis)?)
        .bind(serde_json::to_string(&profile.details)?)
        .bind(searchable_skills(profile))
        .bind(searchable_location(profile))
        .bind(&profile.resume_filename)
        .bind(&profile.resume_text)
        .bind(&profile.resume_fingerprint)
        .execute(&self.pool)
        .await?;

        tracing::debug!(job_seeker_id = %profile.job_seeker_id, "Saved job seeker profile");
        Ok(())
    }

    /// Insert a new profile, drawing a fresh id whenever the current one is taken.
    pub async fn create_profile(&self, profile: &mut JobSeekerProfile) -> Result<(), StoreError> {
        let mut attempt = 1;
        loop {
            match self.save_profile(profile).await {
                Err(StoreError::Database(sqlx::Error::Database(error)))
                    if error.is_unique_violation() && attempt < MAX_ID_ATTEMPTS =>
                {
                    tracing::warn!(
                        job_seeker_id = %profile.job_seeker_id,
                        attempt,
                        "Job seeker id already taken; drawing a new one"
                    );
                    profile.job_seeker_id = new_job_seeker_id();
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    /// Replace the structured details of an existing profile.
    pub async fn update_profile_details(
        &self,
        job_seeker_id: &str,
        details: &StructuredProfile,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE job_seekers SET details_json = ?, hard_skills = ?, location_preference = ? \
             WHERE job_seeker_id = ?",
        )
        .bind(serde_json::to_string(details)?)
        .bind(&details.hard_skills)
        .bind(&details.location_preference)
        .bind(job_seeker_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Fetch one profile.
    pub async fn get_profile(
        &self,
        job_seeker_id: &str,
    ) -> Result<Option<JobSeekerProfile>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM job_seekers WHERE job_seeker_id = ?"
        ))
        .bind(job_seeker_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(profile_from_row).transpose()
    }

    /// Most recently created profile.
    pub async fn latest_profile(&self) -> Result<Option<JobSeekerProfile>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM job_seekers ORDER BY id DESC LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(profile_from_row).transpose()
    }

    /// Profile previously created from the same resume text, if any.
    pub async fn profile_by_fingerprint(
        &self,
        fingerprint: &str,
    ) -> Result<Option<JobSeekerProfile>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM job_seekers WHERE resume_fingerprint = ? \
             ORDER BY id DESC LIMIT 1"
        ))
        .bind(fingerprint)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(profile_from_row).transpose()
    }

    /// All profiles, newest first.
    pub async fn list_profiles(&self) -> Result<Vec<JobSeekerProfile>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM job_seekers ORDER BY id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(profile_from_row).collect()
    }

    /// Profiles whose skills, role, or location contain `query` (case-insensitive).
    pub async fn search_profiles(&self, query: &str) -> Result<Vec<JobSeekerProfile>, StoreError> {
        let pattern = format!("%{}%", query.trim().to_lowercase());
        let rows = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM job_seekers \
             WHERE lower(hard_skills) LIKE ?1 OR lower(primary_role) LIKE ?1 \
                OR lower(location_preference) LIKE ?1 \
             ORDER BY id DESC"
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(profile_from_row).collect()
    }
}

fn searchable_skills(profile: &JobSeekerProfile) -> String {
    if profile.details.hard_skills.trim().is_empty() {
        profile.analysis.skills.join(", ")
    } else {
        profile.details.hard_skills.clone()
    }
}

fn searchable_location(profile: &JobSeekerProfile) -> String {
    if profile.details.location_preference.trim().is_empty() {
        profile.analysis.location_preference.clone()
    } else {
        profile.details.location_preference.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::parse_resume_text;

    fn profile(role: &str, skills: &[&str]) -> JobSeekerProfile {
        let resume = parse_resume_text(
            &format!("{role} with experience in {}. ", skills.join(", ")).repeat(3),
            "resume.txt",
        )
        .expect("resume");
        let analysis = ResumeAnalysis {
            primary_role: role.into(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            ..ResumeAnalysis::fallback()
        };
        let details = StructuredProfile::from_analysis(&analysis);
        JobSeekerProfile::new(&resume, analysis, details)
    }

    #[test]
    fn ids_follow_the_js_format() {
        let id = new_job_seeker_id();
        assert_eq!(id.len(), 11);
        assert!(id.starts_with("JS_"));
        assert!(id[3..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[tokio::test]
    async fn profiles_round_trip_through_sqlite() {
        let store = Store::in_memory().await.unwrap();
        let first = profile("Data Analyst", &["SQL", "Tableau"]);
        let second = profile("Nurse", &["Triage"]);
        store.save_profile(&first).await.unwrap();
        store.save_profile(&second).await.unwrap();

        let loaded = store.get_profile(&first.job_seeker_id).await.unwrap();
        assert_eq!(loaded.as_ref(), Some(&first));
        assert_eq!(
            store.latest_profile().await.unwrap().unwrap().job_seeker_id,
            second.job_seeker_id
        );
        assert_eq!(store.list_profiles().await.unwrap().len(), 2);
        assert!(store.get_profile("JS_MISSING").await.unwrap().is_none());

        let found = store
            .profile_by_fingerprint(&first.resume_fingerprint)
            .await
            .unwrap();
        assert_eq!(found.map(|p| p.job_seeker_id), Some(first.job_seeker_id));
    }

    #[tokio::test]
    async fn taken_ids_are_never_overwritten() {
        let store = Store::in_memory().await.unwrap();
        let original = profile("Data Analyst", &["SQL"]);
        store.save_profile(&original).await.unwrap();

        let mut intruder = profile("Nurse", &["Triage"]);
        intruder.job_seeker_id = original.job_seeker_id.clone();
        let err = store.save_profile(&intruder).await.expect_err("duplicate id");
        assert!(matches!(
            err,
            StoreError::Database(sqlx::Error::Database(ref db)) if db.is_unique_violation()
        ));

        store.create_profile(&mut intruder).await.unwrap();
        assert_ne!(intruder.job_seeker_id, original.job_seeker_id);
        assert_eq!(
            store.get_profile(&original.job_seeker_id).await.unwrap().as_ref(),
            Some(&original)
        );
        assert_eq!(
            store.get_profile(&intruder.job_seeker_id).await.unwrap().as_ref(),
            Some(&intruder)
        );
    }

    #[tokio::test]
    async fn search_matches_skills_and_roles() {
        let store = Store::in_memory().await.unwrap();
        store
            .save_profile(&profile("Data Analyst", &["SQL", "Tableau"]))
            .await
            .unwrap();
        store
            .save_profile(&profile("Nurse", &["Triage"]))
            .await
            .unwrap();

        assert_eq!(store.search_profiles("tableau").await.unwrap().len(), 1);
        assert_eq!(store.search_profiles("NURSE").await.unwrap().len(), 1);
        assert!(store.search_profiles("welding").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn details_can_be_replaced() {
        let store = Store::in_memory().await.unwrap();
        let seeker = profile("Data Analyst", &["SQL"]);
        store.save_profile(&seeker).await.unwrap();

        let details = StructuredProfile {
            education_level: "Master".into(),
            hard_skills: "SQL, dbt".into(),
            ..StructuredProfile::default()
        };
        assert!(
            store
                .update_profile_details(&seeker.job_seeker_id, &details)
                .await
                .unwrap()
        );
        let reloaded = store
            .get_profile(&seeker.job_seeker_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.details, details);
        assert!(!store.update_profile_details("JS_NOPE", &details).await.unwrap());
    }
}

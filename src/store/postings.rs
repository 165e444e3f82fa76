use super::{Store, StoreError, current_timestamp_rfc3339};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

const POSTING_COLUMNS: &str = "id, created_at, job_title, job_description, main_responsibilities, \
required_skills, client_company, industry, work_location, work_type, company_size, \
employment_type, experience_level, visa_support, min_salary, max_salary, currency, benefits, \
application_method, valid_until";

/// Position submitted by a recruiter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewRecruiterPosting {
    /// Position title.
    pub job_title: String,
    /// Role description.
    pub job_description: String,
    /// Main responsibilities.
    pub main_responsibilities: String,
    /// Required skills, free text.
    pub required_skills: String,
    /// Hiring company.
    pub client_company: String,
    /// Industry sector.
    pub industry: String,
    /// Work location.
    pub work_location: String,
    /// On-site, hybrid, or remote.
    pub work_type: String,
    /// Company size band.
    pub company_size: String,
    /// Full-time, contract, etc.
    pub employment_type: String,
    /// Experience bucket such as "3-5 years".
    pub experience_level: String,
    /// Visa sponsorship notes.
    pub visa_support: String,
    /// Minimum salary.
    pub min_salary: Option<f64>,
    /// Maximum salary.
    pub max_salary: Option<f64>,
    /// Salary currency.
    pub currency: String,
    /// Benefits offered.
    pub benefits: String,
    /// How to apply.
    pub application_method: String,
    /// Last day the posting is active, `YYYY-MM-DD`.
    pub valid_until: String,
}

/// A stored recruiter posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecruiterPosting {
    /// Row identifier.
    pub id: i64,
    /// RFC 3339 creation time.
    pub created_at: String,
    /// Submitted fields.
    #[serde(flatten)]
    pub posting: NewRecruiterPosting,
}

fn posting_from_row(row: &SqliteRow) -> Result<RecruiterPosting, StoreError> {
    Ok(RecruiterPosting {
        id: row.try_get("id")?,
        created_at: row.try_get("created_at")?,
        posting: NewRecruiterPosting {
            job_title: row.try_get("job_title")?,
            job_description: row.try_get("job_description")?,
            main_responsibilities: row.try_get("main_responsibilities")?,
            required_skills: row.try_get("required_skills")?,
            client_company: row.try_get("client_company")?,
            industry: row.try_get("industry")?,
            work_location: row.try_get("work_location")?,
            work_type: row.try_get("work_type")?,
            company_size: row.try_get("company_size")?,
            employment_type: row.try_get("employment_type")?,
            experience_level: row.try_get("experience_level")?,
            visa_support: row.try_get("visa_support")?,
            min_salary: row.try_get("min_salary")?,
            max_salary: row.try_get("max_salary")?,
            currency: row.try_get("currency")?,
            benefits: row.try_get("benefits")?,
            application_method: row.try_get("application_method")?,
            valid_until: row.try_get("valid_until")?,
        },
    })
}

impl Store {
    /// Store a recruiter posting and return it with its assigned id.
    pub async fn save_posting(
        &self,
        posting: &NewRecruiterPosting,
    ) -> Result<RecruiterPosting, StoreError> {
        let created_at = current_timestamp_rfc3339();
        let result = sqlx::query(
            r#"
            INSERT INTO recruiter_postings (created_at, job_title, job_description,
                main_responsibilities, required_skills, client_company, industry, work_location,
                work_type, company_size, employment_type, experience_level, visa_support,
                min_salary, max_salary, currency, benefits, application_method, valid_until)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&created_at)
        .bind(&posting.job_title)
        .bind(&posting.job_description)
        .bind(&posting.main_responsibilities)
        .bind(&posting.required_skills)
        .bind(&posting.client_company)
        .bind(&posting.industry)
        .bind(&posting.work_location)
        .bind(&posting.work_type)
        .bind(&posting.company_size)
        .bind(&posting.employment_type)
        .bind(&posting.experience_level)
        .bind(&posting.visa_support)
        .bind(posting.min_salary)
        .bind(posting.max_salary)
        .bind(&posting.currency)
        .bind(&posting.benefits)
        .bind(&posting.application_method)
        .bind(&posting.valid_until)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        tracing::debug!(posting_id = id, title = %posting.job_title, "Saved recruiter posting");
        Ok(RecruiterPosting {
            id,
            created_at,
            posting: posting.clone(),
        })
    }

    /// Fetch one posting.
    pub async fn get_posting(&self, id: i64) -> Result<Option<RecruiterPosting>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {POSTING_COLUMNS} FROM recruiter_postings WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(posting_from_row).transpose()
    }

    /// Postings newest first; `active_only` keeps those valid through today.
    pub async fn list_postings(
        &self,
        active_only: bool,
    ) -> Result<Vec<RecruiterPosting>, StoreError> {
        let filter = if active_only {
            "WHERE valid_until >= date('now')"
        } else {
            ""
        };
        let rows = sqlx::query(&format!(
            "SELECT {POSTING_COLUMNS} FROM recruiter_postings {filter} ORDER BY id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(posting_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(title: &str, valid_until: &str) -> NewRecruiterPosting {
        NewRecruiterPosting {
            job_title: title.into(),
            required_skills: "SQL Python".into(),
            min_salary: Some(60_000.0),
            valid_until: valid_until.into(),
            ..NewRecruiterPosting::default()
        }
    }

    #[tokio::test]
    async fn postings_are_saved_and_filtered_by_validity() {
        let store = Store::in_memory().await.unwrap();
        let active = store
            .save_posting(&posting("Data Analyst", "2999-12-31"))
            .await
            .unwrap();
        store
            .save_posting(&posting("Archivist", "2001-01-01"))
            .await
            .unwrap();

        let loaded = store.get_posting(active.id).await.unwrap().unwrap();
        assert_eq!(loaded, active);
        assert_eq!(loaded.posting.max_salary, None);

        assert_eq!(store.list_postings(false).await.unwrap().len(), 2);
        let current = store.list_postings(true).await.unwrap();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].posting.job_title, "Data Analyst");
        assert!(store.get_posting(999).await.unwrap().is_none());
    }

    #[test]
    fn postings_deserialize_with_defaults() {
        let posting: NewRecruiterPosting =
            serde_json::from_str(r#"{"job_title": "Welder", "max_salary": 50000}"#).unwrap();
        assert_eq!(posting.job_title, "Welder");
        assert_eq!(posting.max_salary, Some(50_000.0));
        assert!(posting.industry.is_empty());
    }
}

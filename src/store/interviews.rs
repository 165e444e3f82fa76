use super::{Store, StoreError};
use crate::interview::InterviewSession;

impl Store {
    /// Insert or overwrite an interview session.
    pub async fn save_session(&self, session: &InterviewSession) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO interview_sessions (session_id, job_seeker_id, status, session_json,
                                            created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(session_id) DO UPDATE SET
                status = excluded.status,
                session_json = excluded.session_json,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&session.session_id)
        .bind(&session.job_seeker_id)
        .bind(session.status.as_str())
        .bind(serde_json::to_string(session)?)
        .bind(&session.created_at)
        .bind(&session.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Fetch one interview session.
    pub async fn get_session(
        &self,
        session_id: &str,
    ) -> Result<Option<InterviewSession>, StoreError> {
        let json: Option<String> =
            sqlx::query_scalar("SELECT session_json FROM interview_sessions WHERE session_id = ?")
                .bind(session_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(json.map(|json| serde_json::from_str(&json)).transpose()?)
    }

    /// A seeker's interview sessions, newest first.
    pub async fn list_sessions(
        &self,
        job_seeker_id: &str,
    ) -> Result<Vec<InterviewSession>, StoreError> {
        let rows: Vec<String> = sqlx::query_scalar(
            "SELECT session_json FROM interview_sessions WHERE job_seeker_id = ? \
             ORDER BY created_at DESC",
        )
        .bind(job_seeker_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|json| serde_json::from_str(json).map_err(StoreError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::{InterviewJob, InterviewStatus};

    fn session(id: &str, created_at: &str) -> InterviewSession {
        InterviewSession {
            session_id: id.into(),
            job_seeker_id: "JS_AAAA0001".into(),
            job: InterviewJob {
                job_id: "job-1".into(),
                title: "Data Analyst".into(),
                ..InterviewJob::default()
            },
            total_questions: 2,
            questions: vec!["Why data?".into()],
            answers: Vec::new(),
            evaluations: Vec::new(),
            summary: None,
            summary_error: None,
            status: InterviewStatus::InProgress,
            created_at: created_at.into(),
            updated_at: created_at.into(),
        }
    }

    #[tokio::test]
    async fn sessions_round_trip_and_update() {
        let store = Store::in_memory().await.unwrap();
        let mut first = session("s-1", "2026-01-01T00:00:00Z");
        store.save_session(&first).await.unwrap();
        store
            .save_session(&session("s-2", "2026-02-01T00:00:00Z"))
            .await
            .unwrap();

        first.answers.push("I like numbers.".into());
        first.status = InterviewStatus::Completed;
        first.updated_at = "2026-01-01T00:05:00Z".into();
        store.save_session(&first).await.unwrap();

        let loaded = store.get_session("s-1").await.unwrap().expect("session");
        assert_eq!(loaded, first);
        assert!(store.get_session("missing").await.unwrap().is_none());

        let listed = store.list_sessions("JS_AAAA0001").await.unwrap();
        let ids: Vec<_> = listed.iter().map(|s| s.session_id.as_str()).collect();
        assert_eq!(ids, vec!["s-2", "s-1"]);
    }
}

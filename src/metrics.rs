use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing platform activity since startup.
#[derive(Default)]
pub struct PlatformMetrics {
    resumes_processed: AtomicU64,
    job_searches: AtomicU64,
    jobs_retrieved: AtomicU64,
    jobs_indexed: AtomicU64,
    matches_persisted: AtomicU64,
    interviews_started: AtomicU64,
    interviews_completed: AtomicU64,
    resumes_tailored: AtomicU64,
}

impl PlatformMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resume that made it through extraction and analysis.
    pub fn record_resume(&self) {
        self.resumes_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one job search run and its retrieval/indexing volume.
    pub fn record_search(&self, retrieved: u64, indexed: u64, persisted: u64) {
        self.job_searches.fetch_add(1, Ordering::Relaxed);
        self.jobs_retrieved.fetch_add(retrieved, Ordering::Relaxed);
        self.jobs_indexed.fetch_add(indexed, Ordering::Relaxed);
        self.matches_persisted
            .fetch_add(persisted, Ordering::Relaxed);
    }

    /// Record a newly opened mock interview.
    pub fn record_interview_started(&self) {
        self.interviews_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a mock interview that produced its summary.
    pub fn record_interview_completed(&self) {
        self.interviews_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a generated tailored resume.
    pub fn record_tailored_resume(&self) {
        self.resumes_tailored.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            resumes_processed: self.resumes_processed.load(Ordering::Relaxed),
            job_searches: self.job_searches.load(Ordering::Relaxed),
            jobs_retrieved: self.jobs_retrieved.load(Ordering::Relaxed),
            jobs_indexed: self.jobs_indexed.load(Ordering::Relaxed),
            matches_persisted: self.matches_persisted.load(Ordering::Relaxed),
            interviews_started: self.interviews_started.load(Ordering::Relaxed),
            interviews_completed: self.interviews_completed.load(Ordering::Relaxed),
            resumes_tailored: self.resumes_tailored.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of platform counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Resumes parsed and analysed.
    pub resumes_processed: u64,
    /// Job search runs executed.
    pub job_searches: u64,
    /// Postings returned by the job board across all searches.
    pub jobs_retrieved: u64,
    /// Postings embedded and written to the vector store.
    pub jobs_indexed: u64,
    /// Matched jobs saved to the database.
    pub matches_persisted: u64,
    /// Mock interviews started.
    pub interviews_started: u64,
    /// Mock interviews that reached a summary.
    pub interviews_completed: u64,
    /// Tailored resumes generated.
    pub resumes_tailored: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_search_volume() {
        let metrics = PlatformMetrics::new();
        metrics.record_search(20, 15, 10);
        metrics.record_search(5, 5, 3);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.job_searches, 2);
        assert_eq!(snapshot.jobs_retrieved, 25);
        assert_eq!(snapshot.jobs_indexed, 20);
        assert_eq!(snapshot.matches_persisted, 13);
    }

    #[test]
    fn snapshot_starts_empty() {
        let metrics = PlatformMetrics::new();
        metrics.record_resume();
        metrics.record_interview_started();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.resumes_processed, 1);
        assert_eq!(snapshot.interviews_started, 1);
        assert_eq!(snapshot.interviews_completed, 0);
        assert_eq!(snapshot.resumes_tailored, 0);
    }
}

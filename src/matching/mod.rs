//! Resume-to-job scoring.
//!
//! Job-board postings are ranked by blending the vector-store cosine similarity with a
//! keyword skill overlap: `combined = 0.6 * semantic + 0.4 * skill_pct`, where both terms are
//! percentages. [`recruiter`] holds the rule-based scores used on the recruiter side.

pub mod recruiter;

use crate::jobs::JobPosting;
use crate::text::{round1, round4, truncate_chars};
use serde::Serialize;
use std::collections::HashSet;

/// Weight of the semantic similarity in the combined score.
pub const SEMANTIC_WEIGHT: f64 = 0.6;
/// Weight of the skill overlap in the combined score.
pub const SKILL_WEIGHT: f64 = 0.4;

const QUERY_SKILLS: usize = 20;
const QUERY_RESUME_CHARS: usize = 1000;
const MATCHED_SKILLS_SHOWN: usize = 10;
const MIN_INDEX_FLOOR: usize = 15;
const MAX_VECTOR_RESULTS: usize = 20;

pub use recruiter::{CandidateAssessment, PostingScore, assess_candidate, rule_based_score};

/// A posting with its match scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredJob {
    /// The posting.
    pub job: JobPosting,
    /// Cosine similarity clamped to 0..=1, four decimals.
    pub cosine_similarity: f64,
    /// Cosine similarity as a percentage, one decimal.
    pub semantic_score: f64,
    /// Share of candidate skills found in the posting, one decimal.
    pub skill_match_score: f64,
    /// Weighted blend of the two, one decimal.
    pub combined_score: f64,
    /// Candidate skills found in the posting, at most ten.
    pub matched_skills: Vec<String>,
    /// Candidate skills missing from the posting.
    pub missing_skills: Vec<String>,
}

/// Text embedded for a posting.
pub fn job_text(job: &JobPosting) -> String {
    format!("{} {} {}", job.title, job.company, job.description)
}

/// Text embedded for the candidate: role, top skills, and the start of the resume.
pub fn query_text(primary_role: &str, skills: &[String], resume_text: &str) -> String {
    let skills = skills
        .iter()
        .take(QUERY_SKILLS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "{primary_role} {skills} {}",
        truncate_chars(resume_text, QUERY_RESUME_CHARS)
    )
}

/// Number of retrieved postings worth embedding for a search returning `top_k` matches.
pub fn determine_index_limit(total: usize, top_k: usize, max_jobs_to_index: usize) -> usize {
    let wanted = (top_k + 10).max(MIN_INDEX_FLOOR);
    total.min(max_jobs_to_index.min(wanted))
}

/// Nearest-neighbour limit for a run that indexed `indexed` postings.
pub fn vector_query_limit(indexed: usize) -> usize {
    indexed.min(MAX_VECTOR_RESULTS)
}

/// Lowercased candidate skills with duplicates removed, in first-seen order.
pub fn candidate_skills(skills: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    skills
        .iter()
        .map(|skill| skill.trim().to_lowercase())
        .filter(|skill| !skill.is_empty() && seen.insert(skill.clone()))
        .collect()
}

/// Score one posting against the candidate.
///
/// `skills` must already be normalized with [`candidate_skills`].
pub fn score_job(job: JobPosting, cosine: f32, skills: &[String]) -> ScoredJob {
    let cosine = if cosine.is_finite() {
        f64::from(cosine).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let semantic = cosine * 100.0;

    let description = job.description.to_lowercase();
    let title = job.title.to_lowercase();
    let (matched, missing): (Vec<String>, Vec<String>) = skills
        .iter()
        .cloned()
        .partition(|skill| description.contains(skill.as_str()) || title.contains(skill.as_str()));

    let skill_pct = if skills.is_empty() {
        0.0
    } else {
        matched.len() as f64 / skills.len() as f64 * 100.0
    };
    let combined = SEMANTIC_WEIGHT * semantic + SKILL_WEIGHT * skill_pct;

    ScoredJob {
        job,
        cosine_similarity: round4(cosine),
        semantic_score: round1(semantic),
        skill_match_score: round1(skill_pct),
        combined_score: round1(combined),
        matched_skills: matched.into_iter().take(MATCHED_SKILLS_SHOWN).collect(),
        missing_skills: missing,
    }
}

/// Sort scored postings best first.
pub fn rank_jobs(mut jobs: Vec<ScoredJob>) -> Vec<ScoredJob> {
    jobs.sort_by(|a, b| b.combined_score.total_cmp(&a.combined_score));
    jobs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(title: &str, description: &str) -> JobPosting {
        JobPosting {
            id: title.to_lowercase(),
            title: title.into(),
            description: description.into(),
            ..JobPosting::default()
        }
    }

    fn skills(values: &[&str]) -> Vec<String> {
        candidate_skills(&values.iter().map(|v| v.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn blends_semantic_and_skill_scores() {
        let scored = score_job(
            job("Data Analyst", "We use SQL and Tableau daily."),
            0.8,
            &skills(&["SQL", "Tableau", "Python", "R"]),
        );
        assert_eq!(scored.semantic_score, 80.0);
        assert_eq!(scored.skill_match_score, 50.0);
        assert_eq!(scored.combined_score, 68.0);
        assert_eq!(scored.cosine_similarity, 0.8);
        assert_eq!(scored.matched_skills, vec!["sql", "tableau"]);
        assert_eq!(scored.missing_skills, vec!["python", "r"]);
    }

    #[test]
    fn title_hits_count_as_matches() {
        let scored = score_job(job("Python Developer", ""), 0.5, &skills(&["python"]));
        assert_eq!(scored.skill_match_score, 100.0);
        assert_eq!(scored.combined_score, 70.0);
    }

    #[test]
    fn scores_stay_in_range() {
        let scored = score_job(job("A", "b"), 1.4, &[]);
        assert_eq!(scored.cosine_similarity, 1.0);
        assert_eq!(scored.skill_match_score, 0.0);
        assert_eq!(scored.combined_score, 60.0);

        let negative = score_job(job("A", "b"), -0.3, &[]);
        assert_eq!(negative.semantic_score, 0.0);
        let nan = score_job(job("A", "b"), f32::NAN, &[]);
        assert_eq!(nan.combined_score, 0.0);
    }

    #[test]
    fn matched_skills_are_capped() {
        let many: Vec<String> = (0..15).map(|n| format!("skill{n:02}")).collect();
        let description = many.join(" ");
        let scored = score_job(job("Generalist", &description), 0.0, &candidate_skills(&many));
        assert_eq!(scored.matched_skills.len(), 10);
        assert_eq!(scored.skill_match_score, 100.0);
        assert!(scored.missing_skills.is_empty());
    }

    #[test]
    fn candidate_skills_are_lowercased_and_unique() {
        assert_eq!(skills(&["SQL", " sql ", "", "Go"]), vec!["sql", "go"]);
    }

    #[test]
    fn ranking_is_descending() {
        let ranked = rank_jobs(vec![
            score_job(job("Low", ""), 0.1, &[]),
            score_job(job("High", ""), 0.9, &[]),
            score_job(job("Mid", ""), 0.5, &[]),
        ]);
        let titles: Vec<_> = ranked.iter().map(|s| s.job.title.as_str()).collect();
        assert_eq!(titles, vec!["High", "Mid", "Low"]);
    }

    #[test]
    fn index_limit_respects_caps() {
        assert_eq!(determine_index_limit(40, 20, 15), 15);
        assert_eq!(determine_index_limit(40, 20, 100), 30);
        assert_eq!(determine_index_limit(8, 20, 15), 8);
        assert_eq!(determine_index_limit(40, 1, 100), 15);
        assert_eq!(vector_query_limit(35), 20);
        assert_eq!(vector_query_limit(12), 12);
    }

    #[test]
    fn query_text_combines_role_skills_and_resume() {
        let skills: Vec<String> = (0..25).map(|n| format!("s{n}")).collect();
        let text = query_text("Analyst", &skills, &"r".repeat(1500));
        assert!(text.starts_with("Analyst s0 s1"));
        assert!(text.contains("s19 "));
        assert!(!text.contains("s20"));
        assert!(text.ends_with(&"r".repeat(1000)));
        assert!(!text.contains(&"r".repeat(1001)));
    }
}

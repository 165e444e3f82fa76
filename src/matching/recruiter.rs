//! Rule-based scores between stored profiles and recruiter postings.

use crate::store::{JobSeekerProfile, RecruiterPosting};
use serde::Serialize;
use std::collections::HashSet;

/// Recruiter-facing view of how well a candidate fits a posting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateAssessment {
    /// Candidate being assessed.
    pub job_seeker_id: String,
    /// 0..=100.
    pub match_score: u8,
    /// What speaks for the candidate.
    pub key_strengths: Vec<String>,
    /// What speaks against the candidate.
    pub potential_gaps: Vec<String>,
    /// Next step for the recruiter.
    pub recommendation: String,
    /// `Good` or `Average`.
    pub salary_match: String,
    /// `High` or `Medium`.
    pub culture_fit: String,
}

/// Seeker-facing score of a recruiter posting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostingScore {
    /// Posting being scored.
    pub posting_id: i64,
    /// 0..=100.
    pub overall_score: u8,
    /// Seeker skills mentioned by the posting.
    pub matched_skills: Vec<String>,
    /// Both sides are senior.
    pub experience_match: bool,
    /// The seeker's preferred location appears in the posting's location.
    pub location_match: bool,
}

fn experience_rank(level: &str) -> Option<i32> {
    match level.trim().to_lowercase().as_str() {
        "fresh graduate" => Some(0),
        "1-3 years" => Some(1),
        "3-5 years" => Some(2),
        "5-10 years" => Some(3),
        "10+ years" => Some(4),
        _ => None,
    }
}

/// Either string contains the other; both must be non-empty.
fn overlaps(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    !a.is_empty() && !b.is_empty() && (a.contains(&b) || b.contains(&a))
}

fn seeker_location(seeker: &JobSeekerProfile) -> &str {
    if seeker.details.location_preference.trim().is_empty() {
        &seeker.analysis.location_preference
    } else {
        &seeker.details.location_preference
    }
}

fn seeker_skills(seeker: &JobSeekerProfile) -> String {
    if seeker.details.hard_skills.trim().is_empty() {
        seeker.analysis.skills.join(", ")
    } else {
        seeker.details.hard_skills.clone()
    }
}

/// Score a candidate for a posting from skill words, experience, industry, and location.
pub fn assess_candidate(
    posting: &RecruiterPosting,
    seeker: &JobSeekerProfile,
) -> CandidateAssessment {
    let job = &posting.posting;
    let mut score = 50.0;

    let job_words: HashSet<String> = job
        .required_skills
        .to_lowercase()
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| c == ',' || c == ';').to_string())
        .filter(|word| !word.is_empty())
        .collect();
    let seeker_words: HashSet<String> = seeker_skills(seeker)
        .to_lowercase()
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| c == ',' || c == ';').to_string())
        .filter(|word| !word.is_empty())
        .collect();
    let overlap = job_words.intersection(&seeker_words).count();
    score += overlap as f64 / job_words.len().max(1) as f64 * 20.0;

    if let (Some(required), Some(actual)) = (
        experience_rank(&job.experience_level),
        experience_rank(&seeker.details.work_experience),
    ) {
        score -= f64::from((required - actual).abs() * 5);
    }

    let seeker_industry = if seeker.details.industry_preference.trim().is_empty() {
        seeker.analysis.industries.join(", ")
    } else {
        seeker.details.industry_preference.clone()
    };
    if overlaps(&job.industry, &seeker_industry) {
        score += 10.0;
    }
    if overlaps(&job.work_location, seeker_location(seeker)) {
        score += 5.0;
    }

    let match_score = score.clamp(0.0, 100.0) as u8;
    let (strengths, gaps, recommendation): (&[&str], &[&str], &str) = if match_score >= 80 {
        (
            &[
                "High skill match",
                "Experience meets requirements",
                "Strong industry relevance",
            ],
            &[],
            "Highly recommend for interview",
        )
    } else if match_score >= 60 {
        (
            &["Core skills match", "Basic experience aligns"],
            &["Some skills need improvement", "Slight experience gap"],
            "Recommend further communication",
        )
    } else {
        (
            &["Has relevant background"],
            &["Low skill match", "Experience does not meet requirements"],
            "Further evaluation needed",
        )
    };

    CandidateAssessment {
        job_seeker_id: seeker.job_seeker_id.clone(),
        match_score,
        key_strengths: strengths.iter().map(|s| s.to_string()).collect(),
        potential_gaps: gaps.iter().map(|s| s.to_string()).collect(),
        recommendation: recommendation.to_string(),
        salary_match: if match_score > 70 { "Good" } else { "Average" }.to_string(),
        culture_fit: if match_score > 75 { "High" } else { "Medium" }.to_string(),
    }
}

/// Score a recruiter posting for a seeker from skills, seniority, location, and title.
pub fn rule_based_score(seeker: &JobSeekerProfile, posting: &RecruiterPosting) -> PostingScore {
    let job = &posting.posting;
    let mut score: u32 = 0;

    let haystack = format!("{} {}", job.job_description, job.required_skills).to_lowercase();
    let mut matched_skills = Vec::new();
    for skill in crate::text::split_list(&seeker_skills(seeker)) {
        let skill = skill.to_lowercase();
        if haystack.contains(&skill) {
            score += 5;
            matched_skills.push(skill);
            if score >= 40 {
                score = 40;
                break;
            }
        }
    }

    let title = job.job_title.to_lowercase();
    let experience = seeker.details.work_experience.to_lowercase();
    let seniority_aligned = (title.contains("senior") && experience.contains("senior"))
        || (title.contains("junior") && experience.contains("junior"))
        || (title.contains("entry") && experience.contains("fresh"));
    score += if seniority_aligned { 20 } else { 10 };

    let wanted_location = seeker_location(seeker).trim().to_lowercase();
    let job_location = job.work_location.trim().to_lowercase();
    let mut location_match = false;
    if !wanted_location.is_empty() && !job_location.is_empty() {
        if overlaps(&wanted_location, &job_location) {
            score += 20;
            location_match = job_location.contains(&wanted_location);
        } else {
            score += 5;
        }
    }

    let role = seeker.analysis.primary_role.trim().to_lowercase();
    if !role.is_empty() && !title.is_empty() {
        if title.contains(&role) {
            score += 20;
        } else if seeker
            .analysis
            .simple_search_terms
            .iter()
            .map(|term| term.trim().to_lowercase())
            .any(|term| !term.is_empty() && title.contains(&term))
        {
            score += 15;
        }
    }

    PostingScore {
        posting_id: posting.id,
        overall_score: score.min(100) as u8,
        matched_skills,
        experience_match: title.contains("senior") && experience.contains("senior"),
        location_match,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::{ResumeAnalysis, StructuredProfile};
    use crate::store::NewRecruiterPosting;

    fn seeker(details: StructuredProfile) -> JobSeekerProfile {
        JobSeekerProfile {
            job_seeker_id: "JS_TEST0001".into(),
            created_at: String::new(),
            analysis: ResumeAnalysis {
                primary_role: "Data Analyst".into(),
                simple_search_terms: vec!["Analyst".into()],
                ..ResumeAnalysis::fallback()
            },
            details,
            resume_filename: String::new(),
            resume_text: String::new(),
            resume_fingerprint: String::new(),
        }
    }

    fn posting(job: NewRecruiterPosting) -> RecruiterPosting {
        RecruiterPosting {
            id: 7,
            created_at: String::new(),
            posting: job,
        }
    }

    #[test]
    fn strong_candidates_are_recommended() {
        let job = posting(NewRecruiterPosting {
            job_title: "Data Analyst".into(),
            required_skills: "SQL Python".into(),
            industry: "Finance".into(),
            work_location: "Hong Kong".into(),
            experience_level: "3-5 years".into(),
            ..NewRecruiterPosting::default()
        });
        let candidate = seeker(StructuredProfile {
            hard_skills: "SQL Python Excel".into(),
            work_experience: "3-5 years".into(),
            industry_preference: "Finance, Banking".into(),
            location_preference: "Hong Kong".into(),
            ..StructuredProfile::default()
        });

        let assessment = assess_candidate(&job, &candidate);
        assert_eq!(assessment.match_score, 85);
        assert_eq!(assessment.recommendation, "Highly recommend for interview");
        assert!(assessment.potential_gaps.is_empty());
        assert_eq!(assessment.salary_match, "Good");
        assert_eq!(assessment.culture_fit, "High");
    }

    #[test]
    fn experience_gaps_lower_the_score() {
        let job = posting(NewRecruiterPosting {
            required_skills: "Kubernetes".into(),
            experience_level: "10+ years".into(),
            ..NewRecruiterPosting::default()
        });
        let candidate = seeker(StructuredProfile {
            hard_skills: "Excel".into(),
            work_experience: "Fresh graduate".into(),
            industry_preference: "Retail".into(),
            ..StructuredProfile::default()
        });

        let assessment = assess_candidate(&job, &candidate);
        assert_eq!(assessment.match_score, 30);
        assert_eq!(assessment.recommendation, "Further evaluation needed");
        assert_eq!(assessment.salary_match, "Average");
        assert_eq!(assessment.culture_fit, "Medium");
    }

    #[test]
    fn empty_fields_earn_no_containment_bonus() {
        let job = posting(NewRecruiterPosting::default());
        let mut candidate = seeker(StructuredProfile::default());
        candidate.analysis.industries.clear();
        candidate.analysis.location_preference.clear();
        assert_eq!(assess_candidate(&job, &candidate).match_score, 50);
    }

    #[test]
    fn rule_based_score_adds_up_components() {
        let job = posting(NewRecruiterPosting {
            job_title: "Senior Data Analyst".into(),
            job_description: "SQL, Tableau and stakeholder reporting".into(),
            work_location: "Hong Kong Island".into(),
            ..NewRecruiterPosting::default()
        });
        let candidate = seeker(StructuredProfile {
            hard_skills: "SQL, Tableau, Rust".into(),
            work_experience: "Senior analyst, 5-10 years".into(),
            location_preference: "Hong Kong".into(),
            ..StructuredProfile::default()
        });

        let score = rule_based_score(&candidate, &job);
        assert_eq!(score.matched_skills, vec!["sql", "tableau"]);
        assert_eq!(score.overall_score, 10 + 20 + 20 + 20);
        assert!(score.experience_match);
        assert!(score.location_match);
    }

    #[test]
    fn skill_points_are_capped_at_forty() {
        let skills: Vec<String> = (0..12).map(|n| format!("tool{n:02}")).collect();
        let job = posting(NewRecruiterPosting {
            job_title: "Operator".into(),
            job_description: skills.join(" "),
            ..NewRecruiterPosting::default()
        });
        let mut candidate = seeker(StructuredProfile {
            hard_skills: skills.join(", "),
            ..StructuredProfile::default()
        });
        candidate.analysis.location_preference.clear();

        let score = rule_based_score(&candidate, &job);
        assert_eq!(score.matched_skills.len(), 8);
        assert_eq!(score.overall_score, 40 + 10);
    }
}

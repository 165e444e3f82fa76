//! System prompts and user-prompt builders for every LLM call.

use crate::interview::{AnswerEvaluation, InterviewJob};
use crate::resume::StructuredProfile;
use crate::store::MatchRecord;
use crate::text::{join_or, truncate_chars};

/// Resume characters sent to role detection.
const ANALYSIS_RESUME_CHARS: usize = 3000;
/// Resume characters sent to structured extraction and tailoring.
const PROFILE_RESUME_CHARS: usize = 6000;
const JOB_DESCRIPTION_CHARS: usize = 2000;

/// Role detection.
pub const RESUME_ANALYST_SYSTEM: &str = "You are an expert career advisor and technical recruiter. \
Analyse resumes precisely and respond with a single JSON object only.";

/// Structured profile extraction.
pub const PROFILE_EXTRACTOR_SYSTEM: &str = "You extract structured candidate information from resumes. \
Respond with a single JSON object only and use empty strings for unknown fields.";

/// Interview question generation.
pub const INTERVIEWER_SYSTEM: &str = "You are a professional recruitment interviewer. \
Ask one clear, specific interview question at a time and never answer on the candidate's behalf.";

/// Answer evaluation and interview summaries.
pub const EVALUATOR_SYSTEM: &str = "You are an experienced hiring manager evaluating interview answers. \
Be fair, specific, and constructive. Respond with a single JSON object only.";

/// Resume tailoring.
pub const RESUME_WRITER_SYSTEM: &str = "You are a professional resume writer. \
Tailor resumes truthfully to a target job: reorder and rephrase, never invent experience. \
Respond with a single JSON object only.";

/// Role-detection prompt over the first part of the resume.
pub fn resume_analysis_prompt(resume_text: &str) -> String {
    format!(
        r#"Analyze this resume and identify the candidate's primary professional role.

Return JSON with exactly these keys:
{{
  "primary_role": "most likely job title",
  "simple_search_terms": ["2-3 short job titles suited to a job board search"],
  "confidence": 0.0-1.0,
  "seniority_level": "Entry-Level | Junior | Mid-Level | Senior | Lead | Executive",
  "skills": ["concrete technical and domain skills"],
  "core_strengths": ["distinguishing strengths"],
  "job_search_keywords": ["keywords"],
  "optimal_search_query": "best single search query",
  "location_preference": "city or region, or empty",
  "industries": ["industries"],
  "alternative_roles": ["adjacent job titles"]
}}

Do not list employment types (full-time, remote, contract) as skills.

RESUME:
{}"#,
        truncate_chars(resume_text, ANALYSIS_RESUME_CHARS)
    )
}

/// Structured-profile extraction prompt.
pub fn profile_extraction_prompt(resume_text: &str) -> String {
    format!(
        r#"Extract the following fields from the resume as JSON strings:
education_level, major, graduation_status, university_background, languages, certificates,
hard_skills, soft_skills, work_experience, project_experience, location_preference,
industry_preference, salary_expectation, benefits_expectation.

Rules:
- work_experience must be one of: "Fresh graduate", "1-3 years", "3-5 years", "5-10 years", "10+ years".
- Separate multiple values with commas.
- Use "" when the resume does not say.

RESUME:
{}"#,
        truncate_chars(resume_text, PROFILE_RESUME_CHARS)
    )
}

fn job_block(job: &InterviewJob) -> String {
    format!(
        "Position: {}\nCompany: {}\nIndustry: {}\nExperience required: {}\nDescription: {}\nMain responsibilities: {}\nRequired skills: {}",
        job.title,
        job.company,
        or_na(&job.industry),
        or_na(&job.experience_level),
        truncate_chars(&job.description, JOB_DESCRIPTION_CHARS),
        or_na(&job.responsibilities),
        or_na(&job.required_skills),
    )
}

fn candidate_block(candidate: &StructuredProfile) -> String {
    format!(
        "Education: {} {}\nWork experience: {}\nHard skills: {}\nSoft skills: {}\nProjects: {}",
        or_na(&candidate.education_level),
        candidate.major,
        or_na(&candidate.work_experience),
        or_na(&candidate.hard_skills),
        or_na(&candidate.soft_skills),
        or_na(&candidate.project_experience),
    )
}

fn or_na(value: &str) -> &str {
    if value.trim().is_empty() { "N/A" } else { value }
}

/// Prompt for the opening interview question.
pub fn first_question_prompt(job: &InterviewJob, candidate: &StructuredProfile) -> String {
    format!(
        "You are interviewing a candidate for the role below.\n\nJOB\n{}\n\nCANDIDATE\n{}\n\n\
Ask the first interview question. It should assess the candidate's fit for the core \
responsibilities of the role. Return only the question text.",
        job_block(job),
        candidate_block(candidate)
    )
}

/// Prompt for a follow-up question that builds on the conversation so far.
pub fn follow_up_question_prompt(
    job: &InterviewJob,
    candidate: &StructuredProfile,
    history: &[(String, String)],
    question_number: usize,
    total_questions: usize,
) -> String {
    let transcript = history
        .iter()
        .enumerate()
        .map(|(index, (question, answer))| {
            format!("Q{}: {question}\nA{}: {answer}", index + 1, index + 1)
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are interviewing a candidate for the role below.\n\nJOB\n{}\n\nCANDIDATE\n{}\n\n\
CONVERSATION SO FAR\n{transcript}\n\n\
Ask question {question_number} of {total_questions}. Probe a different competency than the \
previous questions, or dig deeper into a weak spot in the last answer. Return only the question text.",
        job_block(job),
        candidate_block(candidate)
    )
}

/// Prompt for scoring one answer.
pub fn evaluation_prompt(job: &InterviewJob, question: &str, answer: &str) -> String {
    format!(
        r#"Evaluate the candidate's interview answer for the position of {} at {}.

QUESTION: {question}
ANSWER: {answer}

Return JSON:
{{
  "score": integer 0-10,
  "feedback": "2-3 sentences of specific feedback",
  "strengths": ["what the answer did well"],
  "improvements": ["how the answer could be better"]
}}"#,
        job.title, job.company
    )
}

/// Prompt for the end-of-interview summary.
pub fn summary_prompt(
    job: &InterviewJob,
    transcript: &[(String, String, AnswerEvaluation)],
) -> String {
    let rounds = transcript
        .iter()
        .enumerate()
        .map(|(index, (question, answer, evaluation))| {
            format!(
                "Q{n}: {question}\nA{n}: {answer}\nScore: {}/10. {}",
                evaluation.score,
                evaluation.feedback,
                n = index + 1
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"Summarise this mock interview for the position of {} at {}.

{rounds}

Return JSON:
{{
  "overall_score": integer 0-100,
  "summary": "overall assessment",
  "key_strengths": ["..."],
  "improvement_areas": ["..."],
  "job_fit": "High | Medium | Low",
  "recommendations": ["concrete next steps for the candidate"]
}}"#,
        job.title, job.company
    )
}

/// Prompt for a resume tailored to one matched job.
pub fn tailoring_prompt(
    primary_role: &str,
    candidate: &StructuredProfile,
    resume_text: &str,
    job: &MatchRecord,
) -> String {
    format!(
        r#"Rewrite the candidate's resume for the target job.

TARGET JOB
Title: {}
Company: {}
Location: {}
Description: {}
Skills the candidate already matches: {}
Skills to emphasise if truthfully supported: {}

CANDIDATE
Current role: {primary_role}
{}

ORIGINAL RESUME
{}

Return JSON:
{{
  "headline": "one-line professional headline",
  "summary": "3-4 sentence professional summary aimed at the job",
  "highlighted_skills": ["most relevant skills first"],
  "experience": [{{"role": "...", "organization": "...", "period": "...", "bullets": ["achievement-focused bullet"]}}],
  "education": ["..."],
  "certifications": ["..."],
  "keywords": ["job-description keywords woven into the resume"]
}}"#,
        job.job_title,
        job.company_name,
        job.location,
        truncate_chars(&job.job_description, JOB_DESCRIPTION_CHARS),
        join_or(&job.matched_skills, "none"),
        join_or(&job.missing_skills, "none"),
        candidate_block(candidate),
        truncate_chars(resume_text, PROFILE_RESUME_CHARS),
    )
}

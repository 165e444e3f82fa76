//! Cleanup of skill lists coming back from the LLM.

use std::collections::HashSet;

/// Employment-type and workplace terms that models like to report as skills.
const NON_SKILL_TERMS: [&str; 16] = [
    "full time",
    "full-time",
    "part time",
    "part-time",
    "contract",
    "permanent",
    "temporary",
    "freelance",
    "internship",
    "remote",
    "on site",
    "onsite",
    "hybrid",
    "shift work",
    "day shift",
    "night shift",
];

/// Normalise a skill for comparison: lowercase, `_`/`-` as spaces, single-spaced.
pub fn canonical_skill(skill: &str) -> String {
    skill
        .trim()
        .to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether `skill` is an employment term rather than a competency.
pub fn is_non_skill(skill: &str) -> bool {
    let canonical = canonical_skill(skill);
    NON_SKILL_TERMS
        .iter()
        .any(|term| canonical_skill(term) == canonical)
}

/// Drop blanks and employment terms, deduplicating by canonical form.
///
/// The first spelling of each skill wins and is returned trimmed.
pub fn filter_skills<I, S>(skills: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    skills
        .into_iter()
        .filter_map(|skill| {
            let trimmed = skill.as_ref().trim();
            if trimmed.is_empty() || is_non_skill(trimmed) {
                return None;
            }
            seen.insert(canonical_skill(trimmed))
                .then(|| trimmed.to_string())
        })
        .collect()
}

//! Salary extraction from job payloads and descriptions.

use super::{JobPosting, SalaryRange};
use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::Value;
use std::sync::LazyLock;

const CURRENCY: &str = r"HK\$|US\$|S\$|A\$|C\$|\$|£|€|USD|HKD|GBP|EUR";
const AMOUNT: &str = r"\d[\d,]*(?:\.\d+)?";
const PERIOD: &str = r"(?:\s*(?:(?:per|/|an?)\s*(?P<unit>year|annum|yr|month|mo|week|day|hour|hr)\b|(?P<adverb>annually|monthly|weekly|daily|hourly)))?";

static RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)(?P<cur>{CURRENCY})?\s?(?P<lo>{AMOUNT})\s?(?P<lok>k\b)?\s*(?:-|–|to)\s*(?:{CURRENCY})?\s?(?P<hi>{AMOUNT})\s?(?P<hik>k\b)?{PERIOD}"
    ))
    .expect("valid salary range regex")
});

static SINGLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)(?P<cur>{CURRENCY})\s?(?P<amount>{AMOUNT})\s?(?P<k>k\b)?{PERIOD}"
    ))
    .expect("valid salary regex")
});

/// Summary statistics over the salaries of a result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryBand {
    /// Lowest bound seen.
    pub min: f64,
    /// Median of the per-posting midpoints.
    pub median: f64,
    /// Highest bound seen.
    pub max: f64,
    /// Postings that carried salary data.
    pub count: usize,
}

/// Parse the provider's structured `salary_raw` object.
///
/// Accepts the schema.org `MonetaryAmount` shape (`{currency, value: {minValue, maxValue,
/// unitText}}`) as well as flat `{min, max, currency, unit}` objects.
pub fn parse_salary_raw(raw: &Value) -> Option<SalaryRange> {
    let object = raw.as_object()?;
    let value = object.get("value").and_then(Value::as_object).unwrap_or(object);

    let min = number(value.get("minValue"))
        .or_else(|| number(value.get("min")))
        .or_else(|| number(value.get("value")));
    let max = number(value.get("maxValue"))
        .or_else(|| number(value.get("max")))
        .or_else(|| number(value.get("value")));
    if min.is_none() && max.is_none() {
        return None;
    }

    let currency = object
        .get("currency")
        .or_else(|| value.get("currency"))
        .and_then(Value::as_str)
        .map(|code| code.trim().to_uppercase())
        .filter(|code| !code.is_empty());
    let period = value
        .get("unitText")
        .or_else(|| value.get("unit"))
        .or_else(|| object.get("unit"))
        .and_then(Value::as_str)
        .and_then(normalize_period);

    Some(SalaryRange {
        min,
        max,
        currency,
        period,
    })
}

/// Find the first salary range or amount mentioned in free text.
///
/// Ranges need either a currency marker or a `k` suffix so that year spans such as
/// `2019 - 2023` are not mistaken for pay.
pub fn extract_salary(text: &str) -> Option<SalaryRange> {
    for captures in RANGE.captures_iter(text) {
        let has_currency = captures.name("cur").is_some();
        let lo_k = captures.name("lok").is_some();
        let hi_k = captures.name("hik").is_some();
        if !has_currency && !lo_k && !hi_k {
            continue;
        }
        let Some(mut lo) = amount(&captures, "lo") else {
            continue;
        };
        let Some(mut hi) = amount(&captures, "hi") else {
            continue;
        };
        if lo_k || (hi_k && lo < 1000.0) {
            lo *= 1000.0;
        }
        if hi_k {
            hi *= 1000.0;
        }
        if hi < lo {
            std::mem::swap(&mut lo, &mut hi);
        }
        return Some(SalaryRange {
            min: Some(lo),
            max: Some(hi),
            currency: captures.name("cur").map(|m| currency_code(m.as_str())),
            period: captured_period(&captures),
        });
    }

    let captures = SINGLE.captures(text)?;
    let mut value = amount(&captures, "amount")?;
    if captures.name("k").is_some() {
        value *= 1000.0;
    }
    Some(SalaryRange {
        min: Some(value),
        max: Some(value),
        currency: captures.name("cur").map(|m| currency_code(m.as_str())),
        period: captured_period(&captures),
    })
}

/// Keep postings that can pay at least `minimum`, plus those without salary data.
pub fn filter_by_salary(jobs: Vec<JobPosting>, minimum: f64) -> Vec<JobPosting> {
    jobs.into_iter()
        .filter(|job| match &job.salary {
            Some(salary) => salary.max.or(salary.min).is_none_or(|top| top >= minimum),
            None => true,
        })
        .collect()
}

/// Compute min / median / max over postings that carry salary data.
pub fn salary_band(jobs: &[JobPosting]) -> Option<SalaryBand> {
    let ranges: Vec<&SalaryRange> = jobs.iter().filter_map(|job| job.salary.as_ref()).collect();
    let mut midpoints: Vec<f64> = ranges.iter().filter_map(|range| range.midpoint()).collect();
    if midpoints.is_empty() {
        return None;
    }
    midpoints.sort_by(f64::total_cmp);

    let min = ranges
        .iter()
        .filter_map(|range| range.min.or(range.max))
        .fold(f64::INFINITY, f64::min);
    let max = ranges
        .iter()
        .filter_map(|range| range.max.or(range.min))
        .fold(f64::NEG_INFINITY, f64::max);
    let middle = midpoints.len() / 2;
    let median = if midpoints.len() % 2 == 0 {
        (midpoints[middle - 1] + midpoints[middle]) / 2.0
    } else {
        midpoints[middle]
    };

    Some(SalaryBand {
        min,
        median,
        max,
        count: midpoints.len(),
    })
}

fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.replace(',', "").trim().parse().ok(),
        _ => None,
    }
}

fn amount(captures: &Captures<'_>, name: &str) -> Option<f64> {
    captures.name(name)?.as_str().replace(',', "").parse().ok()
}

fn captured_period(captures: &Captures<'_>) -> Option<String> {
    captures
        .name("unit")
        .or_else(|| captures.name("adverb"))
        .and_then(|m| normalize_period(m.as_str()))
}

fn normalize_period(unit: &str) -> Option<String> {
    let period = match unit.trim().to_lowercase().as_str() {
        "year" | "yearly" | "annum" | "annually" | "yr" | "annual" => "year",
        "month" | "monthly" | "mo" => "month",
        "week" | "weekly" => "week",
        "day" | "daily" => "day",
        "hour" | "hourly" | "hr" => "hour",
        _ => return None,
    };
    Some(period.to_string())
}

fn currency_code(symbol: &str) -> String {
    match symbol.to_uppercase().as_str() {
        "$" | "US$" | "USD" => "USD",
        "HK$" | "HKD" => "HKD",
        "S$" => "SGD",
        "A$" => "AUD",
        "C$" => "CAD",
        "£" | "GBP" => "GBP",
        "€" | "EUR" => "EUR",
        other => return other.to_string(),
    }
    .to_string()
}

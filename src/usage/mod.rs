//! Shared bookkeeping for outbound AI and job-board calls.
//!
//! [`TokenUsageTracker`] accumulates token counts and estimated spend per model, and
//! [`RateLimiter`] enforces a sliding-window request budget in front of each vendor API.

mod rate_limit;
mod tokens;

pub use rate_limit::RateLimiter;
pub use tokens::{ModelUsage, TokenUsageTracker, UsageSummary};

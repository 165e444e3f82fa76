use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// USD per 1K tokens for embedding models.
const EMBEDDING_PRICE_PER_1K: f64 = 0.000_02;
/// USD per 1K prompt tokens for chat models.
const PROMPT_PRICE_PER_1K: f64 = 0.000_15;
/// USD per 1K completion tokens for chat models.
const COMPLETION_PRICE_PER_1K: f64 = 0.000_6;

/// Token counts attributed to a single model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ModelUsage {
    /// Prompt (input) tokens.
    pub prompt_tokens: u64,
    /// Completion (output) tokens.
    pub completion_tokens: u64,
    /// Estimated spend in USD.
    pub cost: f64,
}

#[derive(Default)]
struct UsageState {
    embedding_tokens: u64,
    prompt_tokens: u64,
    completion_tokens: u64,
    total_cost: f64,
    by_model: BTreeMap<String, ModelUsage>,
}

/// Aggregated view returned by [`TokenUsageTracker::summary`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsageSummary {
    /// Tokens sent to embedding models.
    pub embedding_tokens: u64,
    /// Prompt tokens sent to chat models.
    pub prompt_tokens: u64,
    /// Completion tokens returned by chat models.
    pub completion_tokens: u64,
    /// Sum of all token counters.
    pub total_tokens: u64,
    /// Estimated spend in USD, rounded to 4 decimals.
    pub estimated_cost: f64,
    /// Per-model breakdown.
    pub usage_by_model: BTreeMap<String, ModelUsage>,
}

/// Thread-safe accumulator of token usage and estimated cost.
#[derive(Default)]
pub struct TokenUsageTracker {
    state: Mutex<UsageState>,
}

impl TokenUsageTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute a call's tokens to `model`.
    ///
    /// Models whose name contains `embedding` are billed at the embedding rate for every token.
    pub fn add_usage(&self, model: &str, prompt_tokens: u64, completion_tokens: u64) {
        let is_embedding = model.to_lowercase().contains("embedding");
        let cost = if is_embedding {
            (prompt_tokens + completion_tokens) as f64 / 1000.0 * EMBEDDING_PRICE_PER_1K
        } else {
            prompt_tokens as f64 / 1000.0 * PROMPT_PRICE_PER_1K
                + completion_tokens as f64 / 1000.0 * COMPLETION_PRICE_PER_1K
        };

        let mut state = self.lock();
        if is_embedding {
            state.embedding_tokens += prompt_tokens + completion_tokens;
        } else {
            state.prompt_tokens += prompt_tokens;
            state.completion_tokens += completion_tokens;
        }
        state.total_cost += cost;
        let entry = state.by_model.entry(model.to_string()).or_default();
        entry.prompt_tokens += prompt_tokens;
        entry.completion_tokens += completion_tokens;
        entry.cost += cost;
    }

    /// Record embedding tokens that are not attributed to a specific model.
    pub fn add_embedding_tokens(&self, tokens: u64) {
        let mut state = self.lock();
        state.embedding_tokens += tokens;
        state.total_cost += tokens as f64 / 1000.0 * EMBEDDING_PRICE_PER_1K;
    }

    /// Record chat tokens that are not attributed to a specific model.
    pub fn add_completion_tokens(&self, prompt_tokens: u64, completion_tokens: u64) {
        let mut state = self.lock();
        state.prompt_tokens += prompt_tokens;
        state.completion_tokens += completion_tokens;
        state.total_cost += prompt_tokens as f64 / 1000.0 * PROMPT_PRICE_PER_1K
            + completion_tokens as f64 / 1000.0 * COMPLETION_PRICE_PER_1K;
    }

    /// Total estimated spend in USD, rounded to 6 decimals.
    pub fn total_cost(&self) -> f64 {
        round_to(self.lock().total_cost, 6)
    }

    /// Snapshot of all counters.
    pub fn summary(&self) -> UsageSummary {
        let state = self.lock();
        UsageSummary {
            embedding_tokens: state.embedding_tokens,
            prompt_tokens: state.prompt_tokens,
            completion_tokens: state.completion_tokens,
            total_tokens: state.embedding_tokens + state.prompt_tokens + state.completion_tokens,
            estimated_cost: round_to(state.total_cost, 4),
            usage_by_model: state
                .by_model
                .iter()
                .map(|(model, usage)| {
                    (
                        model.clone(),
                        ModelUsage {
                            cost: round_to(usage.cost, 6),
                            ..*usage
                        },
                    )
                })
                .collect(),
        }
    }

    /// Clear every counter.
    pub fn reset(&self) {
        *self.lock() = UsageState::default();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, UsageState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_models_use_prompt_and_completion_rates() {
        let tracker = TokenUsageTracker::new();
        tracker.add_usage("gpt-4o-mini", 2000, 1000);

        // 2 * 0.00015 + 1 * 0.0006
        assert!((tracker.total_cost() - 0.0009).abs() < 1e-9);
        let summary = tracker.summary();
        assert_eq!(summary.prompt_tokens, 2000);
        assert_eq!(summary.completion_tokens, 1000);
        assert_eq!(summary.embedding_tokens, 0);
        assert_eq!(summary.usage_by_model["gpt-4o-mini"].prompt_tokens, 2000);
    }

    #[test]
    fn embedding_models_are_billed_at_embedding_rate() {
        let tracker = TokenUsageTracker::new();
        tracker.add_usage("text-embedding-3-small", 10_000, 0);

        assert!((tracker.total_cost() - 0.0002).abs() < 1e-9);
        let summary = tracker.summary();
        assert_eq!(summary.embedding_tokens, 10_000);
        assert_eq!(summary.total_tokens, 10_000);
    }

    #[test]
    fn unattributed_counters_and_reset() {
        let tracker = TokenUsageTracker::new();
        tracker.add_embedding_tokens(1000);
        tracker.add_completion_tokens(1000, 1000);

        let summary = tracker.summary();
        assert_eq!(summary.total_tokens, 3000);
        assert!(summary.usage_by_model.is_empty());
        assert!((summary.estimated_cost - 0.0008).abs() < 1e-9);

        tracker.reset();
        assert_eq!(tracker.summary(), UsageSummary::default());
        assert_eq!(tracker.total_cost(), 0.0);
    }
}

use serde::Serialize;

// Rough token estimates per request: system prompt plus caption in,
// structured response out.
const AVG_INPUT_TOKENS: u64 = 800;
const AVG_OUTPUT_TOKENS: u64 = 400;

// Per-million-token rates for gpt-4o-mini; batch runs at half price.
const LIVE_INPUT_RATE: f64 = 0.150;
const LIVE_OUTPUT_RATE: f64 = 0.600;
const BATCH_INPUT_RATE: f64 = 0.075;
const BATCH_OUTPUT_RATE: f64 = 0.300;

/// How the posts would be processed for an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMode {
    Batch,
    Live,
}

/// Estimated cost of processing a set of posts.
#[derive(Debug, Clone, Serialize)]
pub struct CostEstimate {
    pub mode: ProcessingMode,
    pub total_posts: usize,
    pub estimated_requests: u64,
    pub estimated_input_tokens: u64,
    pub estimated_output_tokens: u64,
    pub estimated_input_cost: f64,
    pub estimated_output_cost: f64,
    pub estimated_total_cost: f64,
    pub cost_per_post: f64,
}

/// Estimate the cost of processing `post_count` posts in the given mode.
///
/// The live path issues two requests per post (detection plus extraction);
/// the batch path submits a single extraction request per post.
pub fn estimate(post_count: usize, mode: ProcessingMode) -> CostEstimate {
    let requests = match mode {
        ProcessingMode::Batch => post_count as u64,
        ProcessingMode::Live => post_count as u64 * 2,
    };
    let input_tokens = requests * AVG_INPUT_TOKENS;
    let output_tokens = requests * AVG_OUTPUT_TOKENS;

    let (input_rate, output_rate) = match mode {
        ProcessingMode::Batch => (BATCH_INPUT_RATE, BATCH_OUTPUT_RATE),
        ProcessingMode::Live => (LIVE_INPUT_RATE, LIVE_OUTPUT_RATE),
    };

    let input_cost = (input_tokens as f64 / 1_000_000.0) * input_rate;
    let output_cost = (output_tokens as f64 / 1_000_000.0) * output_rate;
    let total_cost = input_cost + output_cost;

    CostEstimate {
        mode,
        total_posts: post_count,
        estimated_requests: requests,
        estimated_input_tokens: input_tokens,
        estimated_output_tokens: output_tokens,
        estimated_input_cost: input_cost,
        estimated_output_cost: output_cost,
        estimated_total_cost: total_cost,
        cost_per_post: if post_count > 0 {
            total_cost / post_count as f64
        } else {
            0.0
        },
    }
}

/// Batch-versus-live comparison for a set of posts.
#[derive(Debug, Clone, Serialize)]
pub struct SavingsSummary {
    pub posts_count: usize,
    pub batch_cost: f64,
    pub live_cost: f64,
    pub savings_amount: f64,
    pub savings_percentage: f64,
}

pub fn compare_modes(post_count: usize) -> SavingsSummary {
    let batch = estimate(post_count, ProcessingMode::Batch);
    let live = estimate(post_count, ProcessingMode::Live);

    let savings = live.estimated_total_cost - batch.estimated_total_cost;
    let percentage = if live.estimated_total_cost > 0.0 {
        (savings / live.estimated_total_cost) * 100.0
    } else {
        0.0
    };

    SavingsSummary {
        posts_count: post_count,
        batch_cost: batch.estimated_total_cost,
        live_cost: live.estimated_total_cost,
        savings_amount: savings,
        savings_percentage: percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_is_quarter_of_live() {
        // Half the rate and half the requests
        let batch = estimate(100, ProcessingMode::Batch);
        let live = estimate(100, ProcessingMode::Live);
        assert!((batch.estimated_total_cost * 4.0 - live.estimated_total_cost).abs() < 1e-9);
    }

    #[test]
    fn test_requests_per_post_depend_on_mode() {
        let live = estimate(10, ProcessingMode::Live);
        assert_eq!(live.estimated_requests, 20);
        assert_eq!(live.estimated_input_tokens, 20 * AVG_INPUT_TOKENS);

        let batch = estimate(10, ProcessingMode::Batch);
        assert_eq!(batch.estimated_requests, 10);
    }

    #[test]
    fn test_zero_posts_has_zero_cost() {
        let estimate = estimate(0, ProcessingMode::Batch);
        assert_eq!(estimate.estimated_total_cost, 0.0);
        assert_eq!(estimate.cost_per_post, 0.0);
    }

    #[test]
    fn test_savings_percentage_is_seventy_five() {
        let summary = compare_modes(50);
        assert!((summary.savings_percentage - 75.0).abs() < 1e-9);
        assert!(summary.savings_amount > 0.0);
    }
}

//! Score normalization shared by the ranking strategies.

use crate::rag::core::record::ScoredResult;

/// Normalize scores in place to `[0, 1]` by dividing by the batch maximum.
///
/// Scores are only meaningful relative to their own batch after this:
/// callers must not cache or compare normalized scores across queries.
/// Negative native scores (a cosine similarity can dip below zero) clamp to
/// zero first so the scale invariant holds; if the maximum is zero the
/// whole batch normalizes to zero.
pub fn max_normalize(results: &mut [ScoredResult]) {
    for result in results.iter_mut() {
        if result.score < 0.0 {
            result.score = 0.0;
        }
    }

    let max = results
        .iter()
        .map(|r| r.score)
        .fold(0.0f64, f64::max);
    if max <= 0.0 {
        for result in results.iter_mut() {
            result.score = 0.0;
        }
        return;
    }

    for result in results.iter_mut() {
        result.score /= max;
    }
}

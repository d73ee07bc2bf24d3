//! Comment ranking score.
//!
//! Raw `ups / (ups + downs)` ratios overrate comments with a handful of votes:
//! a single upvote gives a perfect 1.0. Instead each comment is ranked by the
//! lower bound of the [Wilson score interval] for its true positive
//! proportion. Few votes give a wide interval and therefore a low bound; many
//! consistent votes pull the bound up towards the observed ratio.
//!
//! ```text
//! n   = ups + downs
//! p   = ups / n
//! z2n = z² / n
//!
//!         p + z2n/2 − z·√((p(1−p) + z2n/4) / n)
//! lb  =   ─────────────────────────────────────
//!                      1 + z2n
//! ```
//!
//! A comment with no votes scores exactly `0.0`, the lowest possible rank.
//!
//! [Wilson score interval]: https://en.wikipedia.org/wiki/Binomial_proportion_confidence_interval#Wilson_score_interval

/// Standard normal quantile for a 95% confidence level.
pub const Z_95: f64 = 1.96;

/// Ranking score at 95% confidence. Always in `[0, 1]`.
pub fn score(ups: i64, downs: i64) -> f64 {
    wilson_lower_bound(ups, downs, Z_95)
}

/// Lower bound of the Wilson interval for `ups` successes out of
/// `ups + downs` trials. Negative counts are treated as zero.
pub fn wilson_lower_bound(ups: i64, downs: i64, z: f64) -> f64 {
    let ups = ups.max(0) as f64;
    let downs = downs.max(0) as f64;
    let n = ups + downs;
    if n <= 0.0 {
        return 0.0;
    }

    let p = ups / n;
    let z2n = z * z / n;
    let bound = (p + z2n / 2.0 - z * ((p * (1.0 - p) + z2n / 4.0) / n).sqrt()) / (1.0 + z2n);
    // p = 0 is mathematically exactly 0 but can round to -1e-17
    bound.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_votes_scores_zero() {
        assert_eq!(score(0, 0), 0.0);
    }

    #[test]
    fn negative_counts_are_clamped() {
        assert_eq!(score(-5, -3), 0.0);
        assert_eq!(score(-5, 4), score(0, 4));
        assert_eq!(score(7, -2), score(7, 0));
    }

    #[test]
    fn only_downvotes_scores_zero() {
        for downs in [1, 2, 10, 1000] {
            let s = score(0, downs);
            assert!(s.abs() < 1e-12, "score(0, {downs}) = {s}");
        }
    }

    #[test]
    fn single_upvote_matches_closed_form() {
        // With p = 1 the bound reduces to n / (n + z²).
        let expected = 1.0 / (1.0 + Z_95 * Z_95);
        assert!((score(1, 0) - expected).abs() < 1e-12);
    }

    #[test]
    fn known_value() {
        // 10 up / 0 down: 10 / (10 + 3.8416)
        assert!((score(10, 0) - 0.722_459_8).abs() < 1e-6);
    }

    #[test]
    fn strictly_increasing_in_upvotes() {
        let mut previous = score(1, 0);
        for ups in 2..=10_000 {
            let current = score(ups, 0);
            assert!(current > previous, "score({ups}, 0) did not increase");
            previous = current;
        }
    }

    #[test]
    fn always_within_unit_interval() {
        for ups in (0..10_000).step_by(37) {
            for downs in (0..10_000).step_by(41) {
                let s = score(ups, downs);
                assert!(
                    (0.0..=1.0).contains(&s),
                    "score({ups}, {downs}) = {s} out of range"
                );
            }
        }
    }

    #[test]
    fn small_samples_rank_below_large_consistent_ones() {
        assert!(score(1, 0) < score(100, 1));
        assert!(score(2, 0) < score(10, 0));
    }

    #[test]
    fn downvotes_lower_the_score() {
        assert!(score(10, 5) < score(10, 0));
        assert!(score(10, 10) < score(10, 5));
    }

    #[test]
    fn deterministic() {
        assert_eq!(score(123, 45).to_bits(), score(123, 45).to_bits());
    }
}

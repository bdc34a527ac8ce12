// ABOUTME: Directional compatibility test deciding whether two candidates can share a cluster.
// ABOUTME: Combines document distance, nesting depth, token Jaccard and a strong-neighbour escape hatch.

use std::collections::BTreeSet;

use crate::cluster::candidate::Candidate;
use crate::options::ExtractionOptions;

/// Share of the anchor's score a low-affinity neighbour must exceed to join anyway.
pub const ESCAPE_SCORE_RATIO: f64 = 0.9;

/// Intersection over union; two empty sets are identical, one empty set shares nothing.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.0,
        (false, false) => {
            let shared = a.intersection(b).count();
            let union = a.len() + b.len() - shared;
            shared as f64 / union as f64
        }
    }
}

/// Whether `next` may join a cluster anchored on `anchor`.
///
/// Not symmetric: the score escape compares `next` against `anchor`.
pub fn is_compatible(anchor: &Candidate, next: &Candidate, opts: &ExtractionOptions) -> bool {
    let rank_gap = anchor.order_index.abs_diff(next.order_index);
    if rank_gap > opts.cluster_max_rank_gap {
        return false;
    }

    if anchor.depth.abs_diff(next.depth) > opts.cluster_max_depth_delta {
        return false;
    }

    if jaccard(&anchor.tokens, &next.tokens) < opts.cluster_min_token_jaccard {
        let near = rank_gap <= (opts.cluster_max_rank_gap / 2).max(1);
        return near && next.score > anchor.score * ESCAPE_SCORE_RATIO;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::candidate::NodePath;
    use scraper::{Html, Selector};

    fn set(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn candidate<'a>(
        doc: &'a Html,
        order_index: usize,
        depth: usize,
        score: f64,
        tokens: &[&str],
    ) -> Candidate<'a> {
        let sel = Selector::parse("div").unwrap();
        Candidate {
            path: NodePath::from_indices(&[order_index]),
            order_index,
            depth,
            score,
            tokens: set(tokens),
            element: doc.select(&sel).next().unwrap(),
        }
    }

    #[test]
    fn jaccard_edge_cases() {
        assert_eq!(jaccard(&set(&[]), &set(&[])), 1.0);
        assert_eq!(jaccard(&set(&["news"]), &set(&[])), 0.0);
        assert_eq!(jaccard(&set(&[]), &set(&["news"])), 0.0);
        let third = jaccard(&set(&["news", "sport"]), &set(&["news", "weather"]));
        assert!((third - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn rank_gap_beyond_limit_is_rejected_even_with_identical_tokens() {
        let doc = Html::parse_fragment("<div></div>");
        let opts = ExtractionOptions::default();
        let a = candidate(&doc, 0, 2, 10.0, &["article"]);
        let b = candidate(&doc, 21, 2, 100.0, &["article"]);
        assert!(!is_compatible(&a, &b, &opts));
        let c = candidate(&doc, 20, 2, 1.0, &["article"]);
        assert!(is_compatible(&a, &c, &opts));
    }

    #[test]
    fn depth_delta_beyond_limit_is_rejected() {
        let doc = Html::parse_fragment("<div></div>");
        let opts = ExtractionOptions::default();
        let a = candidate(&doc, 0, 2, 10.0, &["article"]);
        let b = candidate(&doc, 1, 6, 10.0, &["article"]);
        assert!(!is_compatible(&a, &b, &opts));
    }

    #[test]
    fn low_jaccard_needs_score_escape() {
        let doc = Html::parse_fragment("<div></div>");
        let opts = ExtractionOptions {
            cluster_min_token_jaccard: 0.5,
            ..ExtractionOptions::default()
        };
        let a = candidate(&doc, 0, 2, 10.0, &["news", "sport"]);
        let weak = candidate(&doc, 3, 2, 9.0, &["news", "weather"]);
        let strong = candidate(&doc, 3, 2, 9.5, &["news", "weather"]);
        assert!(!is_compatible(&a, &weak, &opts));
        assert!(is_compatible(&a, &strong, &opts));
    }

    #[test]
    fn score_escape_requires_half_rank_gap() {
        let doc = Html::parse_fragment("<div></div>");
        let opts = ExtractionOptions::default();
        let a = candidate(&doc, 0, 2, 10.0, &["lead"]);
        let near = candidate(&doc, 10, 2, 50.0, &[]);
        let far = candidate(&doc, 11, 2, 50.0, &[]);
        assert!(is_compatible(&a, &near, &opts));
        assert!(!is_compatible(&a, &far, &opts));
    }

    #[test]
    fn escape_window_is_at_least_one() {
        let doc = Html::parse_fragment("<div></div>");
        let opts = ExtractionOptions {
            cluster_max_rank_gap: 1,
            ..ExtractionOptions::default()
        };
        let a = candidate(&doc, 4, 2, 10.0, &["lead"]);
        let b = candidate(&doc, 5, 2, 20.0, &["body"]);
        assert!(is_compatible(&a, &b, &opts));
    }

    #[test]
    fn relation_is_directional() {
        let doc = Html::parse_fragment("<div></div>");
        let opts = ExtractionOptions::default();
        let weak = candidate(&doc, 0, 2, 5.0, &["lead"]);
        let strong = candidate(&doc, 2, 2, 50.0, &["body"]);
        assert!(is_compatible(&weak, &strong, &opts));
        assert!(!is_compatible(&strong, &weak, &opts));
    }
}

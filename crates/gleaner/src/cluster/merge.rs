// ABOUTME: Assembles the winning cluster into one synthetic root element.
// ABOUTME: Members are deep-copied in document order and nested duplicates are skipped.

use tracing::debug;
use url::Url;

use crate::cluster::candidate::{Candidate, NodePath};
use crate::cluster::partition::partition;
use crate::cluster::select::select_cluster;
use crate::dom::cleaners::absolutize_urls;
use crate::dom::tree::OwnedElement;
use crate::error::ExtractError;
use crate::options::ExtractionOptions;

/// Marker class placed on every merged root.
pub const MERGED_ROOT_CLASS: &str = "gleaner-article";

/// Synthetic container holding copies of the selected content nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRoot {
    pub element: OwnedElement,
    /// Document URL the content was taken from.
    pub base_uri: String,
}

impl MergedRoot {
    fn new(opts: &ExtractionOptions, base_uri: &str) -> Self {
        let mut element = OwnedElement::new(opts.wrapper_tag().as_str());
        element.add_class(MERGED_ROOT_CLASS);
        Self {
            element,
            base_uri: base_uri.to_string(),
        }
    }

    pub fn to_html(&self) -> String {
        self.element.to_html()
    }

    /// HTML with relative `href`, `src` and `poster` values resolved against
    /// `base_uri`. An unparseable base leaves every link as written.
    pub fn to_resolved_html(&self) -> String {
        let html = self.to_html();
        match Url::parse(&self.base_uri) {
            Ok(base) => absolutize_urls(&html, &base),
            Err(_) => html,
        }
    }

    pub fn text(&self) -> String {
        self.element.text()
    }

    /// Number of content blocks appended to the wrapper.
    pub fn block_count(&self) -> usize {
        self.element.child_elements().count()
    }
}

/// Take the `top_n` highest scorers, best first; equal scores keep document order.
fn top_candidates<'a>(mut candidates: Vec<Candidate<'a>>, top_n: usize) -> Vec<Candidate<'a>> {
    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.order_index.cmp(&b.order_index))
    });
    candidates.truncate(top_n);
    candidates
}

/// Copy members into the wrapper in document order, skipping any member that
/// lies inside one already added.
fn append_members(root: &mut MergedRoot, mut members: Vec<Candidate<'_>>) {
    members.sort_by_key(|c| c.order_index);

    let mut added: Vec<NodePath> = Vec::new();
    for member in members {
        if added.iter().any(|path| member.path.is_within(path)) {
            debug!(path = %member.path, "skipping nested duplicate");
            continue;
        }
        root.element
            .append_child(OwnedElement::deep_copy(&member.element));
        added.push(member.path);
    }
}

/// Select and merge the article content from scored candidates.
///
/// Fails with `NoReadableContent` when `candidates` is empty. The source
/// document is only read; every appended node is an independent copy.
pub fn merge_candidates(
    candidates: Vec<Candidate<'_>>,
    opts: &ExtractionOptions,
    base_uri: &str,
) -> Result<MergedRoot, ExtractError> {
    if candidates.is_empty() {
        debug!("no scored candidates to merge");
        return Err(ExtractError::no_readable_content("merge_candidates"));
    }

    let opts = opts.normalized();
    let pool = top_candidates(candidates, opts.cluster_top_n);
    let mut root = MergedRoot::new(&opts, base_uri);

    if pool.len() == 1 {
        debug!("single candidate, skipping clustering");
        append_members(&mut root, pool);
        return Ok(root);
    }

    debug!(pool = pool.len(), "clustering candidate pool");
    let winner = select_cluster(partition(pool, &opts))?;
    append_members(&mut root, winner.into_members());
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scraper::{ElementRef, Html, Selector};
    use std::collections::BTreeSet;

    fn by_id<'a>(doc: &'a Html, id: &str) -> ElementRef<'a> {
        let sel = Selector::parse(&format!("#{}", id)).unwrap();
        doc.select(&sel).next().unwrap()
    }

    fn candidate<'a>(
        element: ElementRef<'a>,
        path: &str,
        order_index: usize,
        score: f64,
        tokens: &[&str],
    ) -> Candidate<'a> {
        Candidate {
            path: NodePath::from(path),
            order_index,
            depth: 2,
            score,
            tokens: tokens.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>(),
            element,
        }
    }

    const DOC: &str = r#"<div id="a"><p id="b">Nested</p></div><div id="c">Sibling</div><div id="d">Far</div>"#;

    #[test]
    fn empty_input_is_no_readable_content() {
        let err = merge_candidates(Vec::new(), &ExtractionOptions::default(), "").unwrap_err();
        assert!(err.is_no_readable_content());
    }

    #[test]
    fn nested_member_is_added_once() {
        let doc = Html::parse_fragment(DOC);
        let candidates = vec![
            candidate(by_id(&doc, "b"), "a/b", 1, 5.0, &[]),
            candidate(by_id(&doc, "a"), "a", 0, 5.0, &[]),
        ];
        let root = merge_candidates(candidates, &ExtractionOptions::default(), "").unwrap();
        assert_eq!(root.block_count(), 1);
        assert_eq!(
            root.to_html(),
            r#"<article class="gleaner-article"><div id="a"><p id="b">Nested</p></div></article>"#
        );
    }

    #[test]
    fn single_candidate_short_circuits_regardless_of_thresholds() {
        let doc = Html::parse_fragment(DOC);
        let opts = ExtractionOptions {
            cluster_max_rank_gap: 0,
            cluster_max_depth_delta: 0,
            cluster_min_token_jaccard: 1.0,
            wrap_in_article_tag: false,
            ..ExtractionOptions::default()
        };
        let root = merge_candidates(vec![candidate(by_id(&doc, "d"), "d", 9, -3.0, &[])], &opts, "")
            .unwrap();
        assert_eq!(
            root.to_html(),
            r#"<div class="gleaner-article"><div id="d">Far</div></div>"#
        );
    }

    #[test]
    fn top_n_of_one_keeps_only_best_candidate() {
        let doc = Html::parse_fragment(DOC);
        let opts = ExtractionOptions {
            cluster_top_n: 0,
            ..ExtractionOptions::default()
        };
        let candidates = vec![
            candidate(by_id(&doc, "a"), "a", 0, 5.0, &["post"]),
            candidate(by_id(&doc, "c"), "c", 2, 8.0, &["post"]),
        ];
        let root = merge_candidates(candidates, &opts, "").unwrap();
        assert_eq!(root.block_count(), 1);
        assert_eq!(root.text(), "Sibling");
    }

    #[test]
    fn compatible_siblings_are_merged_in_document_order() {
        let doc = Html::parse_fragment(DOC);
        let candidates = vec![
            candidate(by_id(&doc, "c"), "c", 2, 8.0, &["post"]),
            candidate(by_id(&doc, "a"), "a", 0, 5.0, &["post"]),
        ];
        let root = merge_candidates(candidates, &ExtractionOptions::default(), "https://example.com/")
            .unwrap();
        assert_eq!(root.text(), "NestedSibling");
        assert_eq!(root.base_uri, "https://example.com/");
    }

    #[test]
    fn resolved_html_uses_the_base_uri() {
        let doc = Html::parse_fragment(r#"<div id="a"><a href="next.html">Next</a></div>"#);
        let candidates = vec![candidate(by_id(&doc, "a"), "a", 0, 5.0, &[])];

        let root = merge_candidates(
            candidates.clone(),
            &ExtractionOptions::default(),
            "https://example.com/posts/one",
        )
        .unwrap();
        assert!(root
            .to_resolved_html()
            .contains(r#"href="https://example.com/posts/next.html""#));

        let unresolved = merge_candidates(candidates, &ExtractionOptions::default(), "").unwrap();
        assert_eq!(unresolved.to_resolved_html(), unresolved.to_html());
    }

    #[test]
    fn merge_is_deterministic_and_leaves_document_untouched() {
        let doc = Html::parse_fragment(DOC);
        let before = doc.root_element().html();
        let build = || {
            vec![
                candidate(by_id(&doc, "a"), "a", 0, 5.0, &["post"]),
                candidate(by_id(&doc, "c"), "c", 2, 5.0, &["post"]),
                candidate(by_id(&doc, "d"), "d", 3, 1.0, &[]),
            ]
        };
        let first = merge_candidates(build(), &ExtractionOptions::default(), "").unwrap();
        let second = merge_candidates(build(), &ExtractionOptions::default(), "").unwrap();
        assert_eq!(first.to_html(), second.to_html());
        assert_eq!(doc.root_element().html(), before);
    }

    #[test]
    fn end_to_end_strong_far_block_wins() {
        let doc = Html::parse_fragment(
            r#"<div id="x">Lead</div><div id="y">Body</div><div id="z">Big block</div>"#,
        );
        let opts = ExtractionOptions {
            cluster_top_n: 3,
            ..ExtractionOptions::default()
        };
        let candidates = vec![
            candidate(by_id(&doc, "x"), "0/0", 0, 10.0, &["article"]),
            candidate(by_id(&doc, "y"), "0/1", 5, 9.0, &["article"]),
            candidate(by_id(&doc, "z"), "0/2", 40, 50.0, &[]),
        ];
        let root = merge_candidates(candidates, &opts, "").unwrap();
        assert_eq!(root.block_count(), 1);
        assert_eq!(root.text(), "Big block");
    }
}

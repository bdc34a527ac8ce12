// ABOUTME: Readability-style content scoring that turns a parsed document into scored candidates.
// ABOUTME: Scores paragraphs and their ancestors, then records order, depth, path and tokens per node.

use ego_tree::iter::Edge;
use ego_tree::NodeId;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;

use crate::cluster::candidate::{Candidate, NodePath};
use crate::cluster::tokens::element_tokens;
use crate::dom::cleaners::is_unlikely_candidate;

static PARAGRAPH_SCORE_TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(p|li|span|pre)$").unwrap());
static CHILD_CONTENT_TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(td|blockquote|ol|ul|dl)$").unwrap());
static BAD_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(address|form)$").unwrap());
pub static NON_TOP_CANDIDATE_TAGS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(br|b|i|label|hr|area|base|basefont|input|img|link|meta)$").unwrap()
});
static POSITIVE_SCORE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)article|articlecontent|instapaper_body|blog|body|content|entry-content-asset|entry|hentry|main|Normal|page|pagination|permalink|post|story|text|[-_]copy|\Bcopy").unwrap()
});
static NEGATIVE_SCORE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)adbox|advert|author|bio|bookmark|bottom|byline|clear|com-|combx|comment|contact|copy|credit|crumb|date|deck|excerpt|featured|foot|footer|footnote|graf|head|info|infotext|instapaper_ignore|jump|linebreak|link|masthead|media|meta|modal|outbrain|promo|pr_|related|respond|roundcontent|scroll|secondary|share|shopping|shoutbox|side|sidebar|sponsor|stamp|sub|summary|tags|tools|widget").unwrap()
});
static PHOTO_HINTS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)figure|photo|image|caption").unwrap());
static READABILITY_ASSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)entry-content-asset").unwrap());
static HIDDEN_STYLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)display\s*:\s*none|visibility\s*:\s*hidden").unwrap());
static PARAGRAPHS: Lazy<Selector> = Lazy::new(|| Selector::parse("p, pre").unwrap());
static LINKS: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());

// hNews parent/child pairs; matching parents get a flat boost
const HNEWS_CONTENT_SELECTORS: &[(&str, &str)] = &[
    (".hentry", ".entry-content"),
    ("entry", ".entry-content"),
    (".entry", ".entry_content"),
    (".post", ".postbody"),
    (".post", ".post_body"),
    (".post", ".post-body"),
];

const HNEWS_BOOST: i32 = 80;

/// Score storage using NodeId as key
pub type NodeScores = HashMap<NodeId, i32>;

/// Count commas in text (more commas = better content quality)
pub(crate) fn score_commas(text: &str) -> i32 {
    text.matches(',').count() as i32
}

/// Bonus for text length in 50-character chunks
fn score_length(text: &str) -> i32 {
    (text.len() / 50) as i32
}

/// Multi-factor paragraph scoring
fn score_paragraph(text: &str) -> i32 {
    let text = text.trim();
    if text.is_empty() {
        return 0;
    }

    let mut score = score_commas(text) + score_length(text);

    if text.len() < 20 {
        score -= 10;
    }

    if text.len() >= 50 && text.len() <= 200 {
        score += 5;
    }

    score
}

/// Base score for a node from its tag
fn score_node(element: &ElementRef) -> i32 {
    let tag_name = element.value().name().to_lowercase();

    if PARAGRAPH_SCORE_TAGS.is_match(&tag_name) {
        let text = element.text().collect::<String>();
        return score_paragraph(&text);
    }

    match tag_name.as_str() {
        "div" => 5,
        "th" => -5,
        _ if CHILD_CONTENT_TAGS.is_match(&tag_name) => 3,
        _ if BAD_TAGS.is_match(&tag_name) => -3,
        _ => 0,
    }
}

/// Get weight based on className and id patterns
pub fn get_weight(element: &ElementRef) -> i32 {
    let class = element.value().attr("class").unwrap_or("");
    let id = element.value().attr("id").unwrap_or("");
    let mut score = 0i32;

    if !id.is_empty() {
        if POSITIVE_SCORE_RE.is_match(id) {
            score += 25;
        }
        if NEGATIVE_SCORE_RE.is_match(id) {
            score -= 25;
        }
    }

    if !class.is_empty() {
        if score == 0 {
            if POSITIVE_SCORE_RE.is_match(class) {
                score += 25;
            }
            if NEGATIVE_SCORE_RE.is_match(class) {
                score -= 25;
            }
        }

        if PHOTO_HINTS_RE.is_match(class) {
            score += 10;
        }

        if READABILITY_ASSET.is_match(class) {
            score += 25;
        }
    }

    score
}

/// Calculate link density (ratio of link text to total text)
pub fn link_density(element: &ElementRef) -> f64 {
    let total_len = element.text().map(str::len).sum::<usize>();
    if total_len == 0 {
        return 0.0;
    }

    let link_text_len: usize = element
        .select(&LINKS)
        .map(|a| a.text().map(str::len).sum::<usize>())
        .sum();

    link_text_len as f64 / total_len as f64
}

/// Normalize whitespace in text
pub fn normalize_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True for nodes a reader would never see.
pub fn is_hidden(element: &ElementRef) -> bool {
    let value = element.value();
    if value.attr("hidden").is_some() {
        return true;
    }
    if value
        .attr("aria-hidden")
        .map_or(false, |v| v.trim().eq_ignore_ascii_case("true"))
    {
        return true;
    }
    value
        .attr("style")
        .map_or(false, |style| HIDDEN_STYLE_RE.is_match(style))
}

/// Accumulates scores over one document.
struct Scorer {
    scores: NodeScores,
    weight_nodes: bool,
}

impl Scorer {
    fn get(&self, node_id: NodeId) -> i32 {
        self.scores.get(&node_id).copied().unwrap_or(0)
    }

    /// Existing score, or the node's base score (which is also credited to its parent).
    fn get_or_init(&mut self, element: &ElementRef) -> i32 {
        let existing = self.get(element.id());
        if existing != 0 {
            return existing;
        }

        let mut score = score_node(element);
        if self.weight_nodes {
            score += get_weight(element);
        }

        if let Some(parent) = element.parent().and_then(ElementRef::wrap) {
            let addition = (score as f64 * 0.25) as i32;
            let parent_score = self.get(parent.id());
            self.scores.insert(parent.id(), parent_score + addition);
        }
        score
    }

    fn add(&mut self, element: &ElementRef, amount: i32) {
        let base = self.get_or_init(element);
        self.scores.insert(element.id(), base + amount);
    }

    fn boost_hnews(&mut self, doc: &Html) {
        for (parent_sel, child_sel) in HNEWS_CONTENT_SELECTORS {
            let (Ok(selector), Ok(parent_selector)) = (
                Selector::parse(&format!("{} {}", parent_sel, child_sel)),
                Selector::parse(parent_sel),
            ) else {
                continue;
            };

            for element in doc.select(&selector) {
                let parent = element
                    .ancestors()
                    .filter_map(ElementRef::wrap)
                    .find(|el| parent_selector.matches(el));
                if let Some(parent) = parent {
                    self.add(&parent, HNEWS_BOOST);
                }
            }
        }
    }

    /// Paragraph pass: each `p`/`pre` is scored once and feeds its parent
    /// fully and its grandparent by half. Runs twice so parents initialised
    /// late still pick up their children.
    fn score_paragraphs(&mut self, doc: &Html) {
        for _ in 0..2 {
            for element in doc.select(&PARAGRAPHS) {
                if self.scores.contains_key(&element.id()) {
                    continue;
                }

                let score = self.get_or_init(&element);
                self.scores.insert(element.id(), score);

                let raw_score = score_node(&element);
                if let Some(parent) = element.parent().and_then(ElementRef::wrap) {
                    self.add(&parent, raw_score);
                    if let Some(grandparent) = parent.parent().and_then(ElementRef::wrap) {
                        self.add(&grandparent, raw_score / 2);
                    }
                }
            }
        }
    }
}

/// Score content in a document.
pub fn score_content(doc: &Html, weight_nodes: bool) -> NodeScores {
    let mut scorer = Scorer {
        scores: HashMap::new(),
        weight_nodes,
    };
    scorer.boost_hnews(doc);
    scorer.score_paragraphs(doc);
    scorer.scores
}

/// Structural position of an element in document pre-order.
#[derive(Debug, Clone)]
struct Position {
    order_index: usize,
    depth: usize,
    /// Only built for scored elements; unscored ones never become candidates.
    path: Option<NodePath>,
    /// Hidden, or inside an unlikely/hidden subtree.
    excluded: bool,
}

/// Per open element: the next child index to hand out and the exclusion flag.
struct Frame {
    next_child: usize,
    excluded: bool,
}

/// Walk elements in pre-order without recursion so deep nesting cannot
/// exhaust the stack.
fn index_elements<'a>(doc: &'a Html, scores: &NodeScores) -> Vec<(ElementRef<'a>, Position)> {
    let mut out = Vec::new();
    let mut path: Vec<usize> = Vec::new();
    let mut frames: Vec<Frame> = Vec::new();

    for edge in doc.root_element().traverse() {
        match edge {
            Edge::Open(node) => {
                let Some(element) = ElementRef::wrap(node) else {
                    continue;
                };
                let (index, excluded_ancestor) = match frames.last_mut() {
                    Some(parent) => {
                        parent.next_child += 1;
                        (parent.next_child - 1, parent.excluded)
                    }
                    None => (0, false),
                };
                path.push(index);

                let tag_name = element.value().name();
                let is_root =
                    tag_name.eq_ignore_ascii_case("html") || tag_name.eq_ignore_ascii_case("body");
                let excluded = excluded_ancestor
                    || is_hidden(&element)
                    || (!is_root && is_unlikely_candidate(&element));
                let position = Position {
                    order_index: out.len(),
                    depth: path.len() - 1,
                    path: scores
                        .contains_key(&element.id())
                        .then(|| NodePath::from_indices(&path)),
                    excluded,
                };
                out.push((element, position));
                frames.push(Frame {
                    next_child: 0,
                    excluded,
                });
            }
            Edge::Close(node) => {
                if node.value().is_element() {
                    frames.pop();
                    path.pop();
                }
            }
        }
    }
    out
}

/// Turn scored elements into candidates for clustering.
///
/// Skips `html`/`body`, inline and void tags, and hidden or unlikely
/// subtrees. Link-heavy nodes keep only their non-link share of the score.
pub fn collect_candidates<'a>(doc: &'a Html, scores: &NodeScores) -> Vec<Candidate<'a>> {
    index_elements(doc, scores)
        .into_iter()
        .filter_map(|(element, position)| {
            if position.excluded {
                return None;
            }
            let score = *scores.get(&element.id())?;
            let path = position.path?;

            let tag_name = element.value().name().to_lowercase();
            if tag_name == "html" || tag_name == "body" || NON_TOP_CANDIDATE_TAGS_RE.is_match(&tag_name)
            {
                return None;
            }
            let density = link_density(&element);
            let score = if density > 0.5 && score > 0 {
                score as f64 * (1.0 - density)
            } else {
                score as f64
            };

            Some(Candidate {
                path,
                order_index: position.order_index,
                depth: position.depth,
                score,
                tokens: element_tokens(&element),
                element,
            })
        })
        .collect()
}

/// Score a document and collect its candidates.
pub fn score_document(doc: &Html) -> Vec<Candidate<'_>> {
    let scores = score_content(doc, true);
    collect_candidates(doc, &scores)
}

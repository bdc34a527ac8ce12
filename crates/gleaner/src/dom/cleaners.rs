// ABOUTME: DOM cleaners applied to merged article HTML before sanitizing.
// ABOUTME: Strips unlikely blocks, weak conditional blocks, stray headers, spacer images and empty paragraphs.

use ego_tree::iter::Edge;
use ego_tree::{NodeId, NodeRef};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashSet;
use url::Url;

use super::scoring::{get_weight, link_density, normalize_spaces, score_commas};
use super::tree::{escape_attr, escape_text, is_void_element};
use crate::cluster::MERGED_ROOT_CLASS;

// Class for elements that must survive cleaning
const KEEP_CLASS: &str = "gleaner-keep";

// Media embeds worth keeping (YouTube, Vimeo, Reddit iframes)
const KEEP_SELECTORS: &[&str] = &[
    r#"iframe[src^="https://www.youtube.com"]"#,
    r#"iframe[src^="https://www.youtube-nocookie.com"]"#,
    r#"iframe[src^="http://www.youtube.com"]"#,
    r#"iframe[src^="https://player.vimeo"]"#,
    r#"iframe[src^="http://player.vimeo"]"#,
    r#"iframe[src^="https://www.redditmedia.com"]"#,
];

static SPACER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)transparent|spacer|blank").unwrap());

static CANDIDATES_BLACKLIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(ad-break|ad-banner|adbox|advert|addthis|agegate|aux|blogger-labels|combx|comment|conversation|disqus|entry-unrelated|extra|foot|header|hidden|loader|login|menu|meta|nav|outbrain|pager|pagination|predicta|presence_control_external|popup|printfriendly|related|remove|remark|rss|share|shoutbox|sidebar|sociable|sponsor|taboola|tools)").unwrap()
});
static CANDIDATES_WHITELIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(and|article|body|blogindex|column|content|entry-content-asset|format|hfeed|hentry|hatom|main|page|posts|shadow)").unwrap()
});

static WHITELIST_ATTRS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(src|srcset|sizes|type|href|class|id|alt|xlink:href|width|height)$").unwrap()
});

static DIV_TO_P_BLOCKS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a,blockquote,dl,div,img,p,pre,table").unwrap());
static CLEAN_CONDITIONALLY: Lazy<Selector> =
    Lazy::new(|| Selector::parse("ul,ol,table,div,button,form").unwrap());
static HEADERS: Lazy<Selector> = Lazy::new(|| Selector::parse("h2,h3,h4,h5,h6").unwrap());
static ALL: Lazy<Selector> = Lazy::new(|| Selector::parse("*").unwrap());
static IMAGES: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());
static PARAGRAPHS: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static INPUTS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("input, textarea, select, button").unwrap());
static SCRIPTS: Lazy<Selector> = Lazy::new(|| Selector::parse("script").unwrap());

/// Per-element output decisions for [`serialize_fragment`].
struct Rewrite<'a> {
    skip: &'a HashSet<NodeId>,
    rename: &'a dyn Fn(&ElementRef) -> Option<&'static str>,
    attr: &'a dyn Fn(&str, &str) -> Option<String>,
}

fn serialize_fragment(fragment: &Html, rewrite: &Rewrite) -> String {
    let mut out = String::new();
    for child in fragment.root_element().children() {
        serialize_node(child, rewrite, &mut out);
    }
    out
}

/// Write one node and its subtree. Skipped nodes drop their whole subtree.
fn serialize_node<'a>(node: NodeRef<'a, Node>, rewrite: &Rewrite, out: &mut String) {
    // Close tags of open elements; `None` for void elements.
    let mut open: Vec<Option<&'a str>> = Vec::new();
    let mut skipping = 0usize;

    for edge in node.traverse() {
        match edge {
            Edge::Open(node) => {
                if skipping > 0 || rewrite.skip.contains(&node.id()) {
                    skipping += 1;
                    continue;
                }
                match node.value() {
                    Node::Text(t) => out.push_str(&escape_text(t)),
                    Node::Comment(c) => {
                        out.push_str("<!--");
                        out.push_str(c);
                        out.push_str("-->");
                    }
                    Node::Element(el) => {
                        let tag = ElementRef::wrap(node)
                            .and_then(|element| (rewrite.rename)(&element))
                            .unwrap_or(el.name());

                        out.push('<');
                        out.push_str(tag);
                        for (k, v) in el.attrs() {
                            if let Some(value) = (rewrite.attr)(k, v) {
                                out.push(' ');
                                out.push_str(k);
                                out.push_str("=\"");
                                out.push_str(&escape_attr(&value));
                                out.push('"');
                            }
                        }

                        if is_void_element(tag) {
                            out.push_str(" />");
                            open.push(None);
                        } else {
                            out.push('>');
                            open.push(Some(tag));
                        }
                    }
                    _ => {}
                }
            }
            Edge::Close(node) => {
                if skipping > 0 {
                    skipping -= 1;
                    continue;
                }
                if !node.value().is_element() {
                    continue;
                }
                if let Some(Some(tag)) = open.pop() {
                    out.push_str("</");
                    out.push_str(tag);
                    out.push('>');
                }
            }
        }
    }
}

fn has_keep_marker(element: &ElementRef) -> bool {
    element
        .value()
        .classes()
        .any(|c| c == KEEP_CLASS || c == MERGED_ROOT_CLASS)
}

/// Kept elements, the merged root, and anything containing a kept element survive.
fn should_keep(element: &ElementRef, keep_ids: &HashSet<NodeId>) -> bool {
    if keep_ids.contains(&element.id()) || has_keep_marker(element) {
        return true;
    }
    element
        .descendants()
        .filter_map(ElementRef::wrap)
        .any(|d| keep_ids.contains(&d.id()) || d.value().classes().any(|c| c == KEEP_CLASS))
}

/// Whether a conditionally-cleaned block lacks enough real content to stay.
fn remove_unless_content(element: &ElementRef, weight: i32) -> bool {
    if element
        .value()
        .classes()
        .any(|c| c == "entry-content-asset")
    {
        return false;
    }

    let content = normalize_spaces(&element.text().collect::<String>());
    if score_commas(&content) >= 10 {
        return false;
    }

    let p_count = element.select(&PARAGRAPHS).count();
    let input_count = element.select(&INPUTS).count();
    if (input_count as f64) > (p_count as f64 / 3.0) {
        return true;
    }

    let content_length = content.len();
    let img_count = element.select(&IMAGES).count();
    if content_length < 25 && img_count == 0 {
        return true;
    }

    let density = link_density(element);
    if weight < 25 && density > 0.2 && content_length > 75 {
        return true;
    }

    if weight >= 25 && density > 0.5 {
        // A link list introduced by "...:" is content, not navigation.
        let tag_name = element.value().name();
        if tag_name.eq_ignore_ascii_case("ol") || tag_name.eq_ignore_ascii_case("ul") {
            let introduced = element
                .prev_siblings()
                .filter_map(ElementRef::wrap)
                .next()
                .map_or(false, |prev| {
                    normalize_spaces(&prev.text().collect::<String>()).ends_with(':')
                });
            if introduced {
                return false;
            }
        }
        return true;
    }

    element.select(&SCRIPTS).next().is_some() && content_length < 150
}

/// Check if element should be stripped as unlikely candidate
pub fn is_unlikely_candidate(element: &ElementRef) -> bool {
    if element.value().name().eq_ignore_ascii_case("a") {
        return false;
    }

    let class = element.value().attr("class").unwrap_or("");
    let id = element.value().attr("id").unwrap_or("");
    if class.is_empty() && id.is_empty() {
        return false;
    }

    let class_and_id = format!("{} {}", class, id);
    if CANDIDATES_WHITELIST.is_match(&class_and_id) {
        return false;
    }
    CANDIDATES_BLACKLIST.is_match(&class_and_id)
}

/// Check if header should be removed
pub fn should_remove_header(element: &ElementRef, title: &str, has_preceding_paragraph: bool) -> bool {
    if !has_preceding_paragraph {
        return true;
    }

    let header_text = normalize_spaces(&element.text().collect::<String>());
    if !title.is_empty() && header_text == normalize_spaces(title) {
        return true;
    }

    get_weight(element) < 0 || header_text.len() < 3
}

/// Check if image should be removed (spacer or too small)
pub fn should_remove_image(element: &ElementRef) -> bool {
    match element.value().attr("src") {
        Some(src) if SPACER_RE.is_match(src) => return true,
        Some(_) => {}
        None => return true,
    }

    let dimension = |name: &str| {
        element
            .value()
            .attr(name)
            .and_then(|v| v.trim().parse::<i32>().ok())
            .unwrap_or(20)
    };
    dimension("height") < 10 || dimension("width") < 10
}

/// Check if paragraph is empty (no text content and no images)
pub fn is_empty_paragraph(element: &ElementRef) -> bool {
    element.text().all(|t| t.trim().is_empty()) && element.select(&IMAGES).next().is_none()
}

/// Divs without block children read as paragraphs.
fn convert_divs_to_paragraphs(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    serialize_fragment(
        &fragment,
        &Rewrite {
            skip: &HashSet::new(),
            rename: &|el| {
                let is_div = el.value().name().eq_ignore_ascii_case("div");
                let has_block = el
                    .children()
                    .filter_map(ElementRef::wrap)
                    .any(|c| DIV_TO_P_BLOCKS.matches(&c));
                (is_div && !has_block && !has_keep_marker(el)).then_some("p")
            },
            attr: &|_, v| Some(v.to_string()),
        },
    )
}

fn build_keep_ids(fragment: &Html) -> HashSet<NodeId> {
    KEEP_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .flat_map(|sel| fragment.select(&sel).map(|el| el.id()).collect::<Vec<_>>())
        .collect()
}

fn mark_unlikely(fragment: &Html, keep_ids: &HashSet<NodeId>, skip: &mut HashSet<NodeId>) {
    for el in fragment.select(&ALL) {
        if is_unlikely_candidate(&el) && !should_keep(&el, keep_ids) {
            skip.insert(el.id());
        }
    }
}

fn mark_clean_conditionally(
    fragment: &Html,
    keep_ids: &HashSet<NodeId>,
    skip: &mut HashSet<NodeId>,
) {
    for el in fragment.select(&CLEAN_CONDITIONALLY) {
        if should_keep(&el, keep_ids) {
            continue;
        }
        let weight = get_weight(&el);
        if weight < 0 || remove_unless_content(&el, weight) {
            skip.insert(el.id());
        }
    }
}

fn mark_headers(fragment: &Html, title: &str, skip: &mut HashSet<NodeId>) {
    let mut seen_p = false;
    for el in fragment.tree.root().descendants().filter_map(ElementRef::wrap) {
        if el.value().name().eq_ignore_ascii_case("p") {
            seen_p = true;
        }
        if HEADERS.matches(&el) && should_remove_header(&el, title, seen_p) {
            skip.insert(el.id());
        }
    }
}

fn mark_images(fragment: &Html, skip: &mut HashSet<NodeId>) {
    for el in fragment.select(&IMAGES) {
        if should_remove_image(&el) {
            skip.insert(el.id());
        }
    }
}

fn mark_empty(fragment: &Html, skip: &mut HashSet<NodeId>) {
    for el in fragment.select(&PARAGRAPHS) {
        if is_empty_paragraph(&el) {
            skip.insert(el.id());
        }
    }
}

/// Clean merged article HTML.
pub fn clean_article(html: &str, title: &str) -> String {
    let converted = convert_divs_to_paragraphs(html);

    let fragment = Html::parse_fragment(&converted);
    let keep_ids = build_keep_ids(&fragment);

    let mut skip = HashSet::new();
    mark_unlikely(&fragment, &keep_ids, &mut skip);
    mark_clean_conditionally(&fragment, &keep_ids, &mut skip);
    mark_headers(&fragment, title, &mut skip);
    mark_images(&fragment, &mut skip);
    mark_empty(&fragment, &mut skip);

    let cleaned = serialize_fragment(
        &fragment,
        &Rewrite {
            skip: &skip,
            rename: &|_| None,
            attr: &|k, v| WHITELIST_ATTRS_RE.is_match(k).then(|| v.to_string()),
        },
    );

    super::brs::brs_to_ps(&cleaned)
}

/// Rewrite relative `href`, `src` and `poster` values against `base`.
///
/// Fragment links and values that fail to resolve are left alone.
pub fn absolutize_urls(html: &str, base: &Url) -> String {
    let fragment = Html::parse_fragment(html);
    serialize_fragment(
        &fragment,
        &Rewrite {
            skip: &HashSet::new(),
            rename: &|_| None,
            attr: &|k, v| Some(resolve_url_attr(base, k, v)),
        },
    )
}

fn resolve_url_attr(base: &Url, name: &str, value: &str) -> String {
    let is_url_attr = matches!(name.to_ascii_lowercase().as_str(), "href" | "src" | "poster");
    let trimmed = value.trim();
    if !is_url_attr || trimmed.is_empty() || trimmed.starts_with('#') {
        return value.to_string();
    }
    base.join(trimmed)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| value.to_string())
}

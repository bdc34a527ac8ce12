// ABOUTME: Output format converters for merged article content.
// ABOUTME: Sanitizes HTML and converts it to Markdown or plain text.

//! Output format conversion.
//!
//! The merged root is sanitized with an ammonia allow-list before it is
//! exposed; text and Markdown are derived from the sanitized HTML.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

use crate::options::ContentType;

/// Length of a generated excerpt, in characters.
pub const EXCERPT_LEN: usize = 200;

static BR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?\s*>").unwrap());
static BLANK_LINES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static NEWLINES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n+").unwrap());
static INLINE_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]+").unwrap());
static BLOCK_END_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</(p|div|article|section|li|h[1-6]|blockquote|pre|tr|figure)>").unwrap()
});

/// Sanitize article HTML.
///
/// Structural and inline text elements, links, images and media iframes are
/// kept. `class` survives on `article` and `div` so the merged root keeps its
/// marker.
pub fn sanitize_html(html: &str) -> String {
    let allowed_tags = [
        "article", "section", "p", "br", "hr", "strong", "b", "em", "i", "u", "s", "sub", "sup",
        "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "dl", "dt", "dd", "blockquote",
        "pre", "code", "figure", "figcaption", "table", "thead", "tbody", "tr", "th", "td", "img",
        "a", "span", "div", "iframe",
    ];

    let mut builder = ammonia::Builder::new();
    builder.tags(allowed_tags.iter().copied().collect());

    builder.add_tag_attributes("a", &["href", "title"]);
    builder.add_tag_attributes("img", &["src", "alt", "width", "height", "srcset", "sizes"]);
    builder.add_tag_attributes("iframe", &["src", "width", "height"]);
    builder.add_tag_attributes("article", &["class"]);
    builder.add_tag_attributes("div", &["class", "id"]);
    builder.add_tag_attributes("span", &["class"]);
    builder.add_tag_attributes("td", &["colspan", "rowspan"]);
    builder.add_tag_attributes("th", &["colspan", "rowspan"]);
    for h in &["h1", "h2", "h3", "h4", "h5", "h6"] {
        builder.add_tag_attributes(h, &["id"]);
    }

    builder
        .url_schemes(["http", "https", "mailto"].iter().copied().collect())
        .clean(html)
        .to_string()
}

/// Convert HTML to Markdown using htmd.
///
/// Script and style content is skipped; runs of blank lines collapse to one.
/// On conversion error the input is returned unchanged.
pub fn html_to_markdown(html: &str) -> String {
    let preprocessed = BR_RE.replace_all(html, "\n");

    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "noscript"])
        .build();

    let md = converter
        .convert(&preprocessed)
        .unwrap_or_else(|_| preprocessed.to_string());

    BLANK_LINES_RE.replace_all(md.trim(), "\n\n").to_string()
}

/// Convert HTML to plain text.
///
/// Block ends and `<br>` become line breaks, inline whitespace collapses to
/// one space and blank lines are removed.
pub fn html_to_text(html: &str) -> String {
    let broken = BR_RE.replace_all(html, "\n");
    let blocked = BLOCK_END_RE.replace_all(&broken, "$0\n");

    let fragment = Html::parse_fragment(&blocked);
    let raw: String = fragment.root_element().text().collect();

    let spaced = INLINE_SPACE_RE.replace_all(&raw, " ");
    let lines: Vec<&str> = spaced.lines().map(str::trim).collect();
    let joined = lines.join("\n");
    NEWLINES_RE.replace_all(&joined, "\n").trim().to_string()
}

/// Render sanitized HTML in the requested representation.
pub fn render(html: &str, content_type: ContentType) -> String {
    match content_type {
        ContentType::Html => html.to_string(),
        ContentType::Markdown => html_to_markdown(html),
        ContentType::Text => html_to_text(html),
    }
}

/// First [`EXCERPT_LEN`] characters of `text` on one line, or `None` if blank.
pub fn excerpt(text: &str) -> Option<String> {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.is_empty() {
        return None;
    }
    Some(flat.chars().take(EXCERPT_LEN).collect())
}

/// Whitespace-separated word count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sanitize_keeps_marker_class_and_drops_scripts() {
        let html = r#"<article class="gleaner-article"><p onclick="x()">Hi</p><script>bad()</script></article>"#;
        let clean = sanitize_html(html);
        assert_eq!(clean, r#"<article class="gleaner-article"><p>Hi</p></article>"#);
    }

    #[test]
    fn sanitize_strips_javascript_urls() {
        let clean = sanitize_html(r#"<a href="javascript:alert(1)">x</a>"#);
        assert!(!clean.contains("javascript"), "got: {}", clean);
    }

    #[test]
    fn html_to_markdown_converts_headings_and_emphasis() {
        let md = html_to_markdown("<h2>Title</h2><p>Some <strong>bold</strong> text.</p>");
        assert!(md.contains("## Title"), "got: {}", md);
        assert!(md.contains("**bold**"), "got: {}", md);
    }

    #[test]
    fn html_to_markdown_skips_script_and_style() {
        let md = html_to_markdown("<p>Before</p><script>alert(1)</script><style>.x{}</style><p>After</p>");
        assert!(!md.contains("alert"), "got: {}", md);
        assert!(!md.contains(".x{}"), "got: {}", md);
        assert!(md.contains("Before") && md.contains("After"), "got: {}", md);
    }

    #[test]
    fn html_to_markdown_preserves_links() {
        let md = html_to_markdown(r#"<p>Visit <a href="https://example.com">Example</a></p>"#);
        assert!(md.contains("[Example](https://example.com)"), "got: {}", md);
    }

    #[test]
    fn html_to_markdown_collapses_blank_lines() {
        let md = html_to_markdown("<p>Para 1</p>\n\n\n\n\n<p>Para 2</p>");
        assert!(!md.contains("\n\n\n"), "got: {:?}", md);
    }

    #[test]
    fn html_to_text_separates_blocks() {
        let text = html_to_text("<article><p>First   one</p><p>Second</p></article>");
        assert_eq!(text, "First one\nSecond");
    }

    #[test]
    fn html_to_text_keeps_inline_runs_together() {
        let text = html_to_text("<div><span>One</span> <em>Two</em> <strong>Three</strong></div>");
        assert_eq!(text, "One Two Three");
    }

    #[test]
    fn html_to_text_treats_br_as_newline() {
        assert_eq!(html_to_text("<p>Line 1<br>Line 2</p>"), "Line 1\nLine 2");
    }

    #[test]
    fn render_follows_content_type() {
        let html = "<p>Hello</p>";
        assert_eq!(render(html, ContentType::Html), html);
        assert_eq!(render(html, ContentType::Text), "Hello");
        assert_eq!(render(html, ContentType::Markdown), "Hello");
    }

    #[test]
    fn excerpt_truncates_and_flattens() {
        assert_eq!(excerpt("  a\n b  "), Some("a b".to_string()));
        assert_eq!(excerpt(&"x".repeat(300)).map(|s| s.len()), Some(EXCERPT_LEN));
        assert_eq!(excerpt("   "), None);
    }

    #[test]
    fn word_count_splits_on_whitespace() {
        assert_eq!(word_count("one two\nthree\t four"), 4);
        assert_eq!(word_count(""), 0);
    }
}

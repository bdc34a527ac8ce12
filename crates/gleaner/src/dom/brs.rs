// ABOUTME: Turns runs of two or more <br> elements into paragraph boundaries.
// ABOUTME: Works on the parsed fragment so wrapping never breaks element nesting.

use ego_tree::iter::Edge;
use ego_tree::NodeRef;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Node};

use super::tree::{escape_attr, escape_text, is_void_element};

static DOUBLE_BR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>(\s|&nbsp;)*<br\s*/?>").unwrap());

// Children that end a paragraph run instead of joining it
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "div", "dl", "figure", "footer", "form", "h1",
    "h2", "h3", "h4", "h5", "h6", "header", "hr", "ol", "p", "pre", "section", "table", "ul",
];

fn is_br(node: &NodeRef<Node>) -> bool {
    matches!(node.value(), Node::Element(el) if el.name().eq_ignore_ascii_case("br"))
}

fn is_blank_text(node: &NodeRef<Node>) -> bool {
    matches!(node.value(), Node::Text(t) if t.trim().is_empty())
}

fn is_block(node: &NodeRef<Node>) -> bool {
    matches!(node.value(), Node::Element(el) if BLOCK_TAGS.iter().any(|t| el.name().eq_ignore_ascii_case(t)))
}

/// Whether the direct children contain two <br>s separated only by whitespace.
fn has_double_br(node: NodeRef<Node>) -> bool {
    let mut run = 0;
    for child in node.children() {
        if is_br(&child) {
            run += 1;
            if run >= 2 {
                return true;
            }
        } else if !is_blank_text(&child) {
            run = 0;
        }
    }
    false
}

/// Convert consecutive BR tags to paragraphs
pub fn brs_to_ps(html: &str) -> String {
    if !DOUBLE_BR_RE.is_match(html) {
        return html.to_string();
    }

    let fragment = Html::parse_fragment(html);
    let mut out = String::new();
    for child in fragment.root_element().children() {
        write_node(child, &mut out);
    }
    out
}

/// Paragraph state of an element whose children contain a double <br>.
#[derive(Default)]
struct Runs {
    segment: String,
    pending_brs: usize,
}

/// An element being written: its rendered output so far and where it lands.
struct Frame<'a> {
    close_tag: Option<&'a str>,
    buf: String,
    runs: Option<Runs>,
    /// Lands in the parent's current paragraph rather than between paragraphs.
    in_segment: bool,
}

/// Where output for the next child of the top frame goes.
fn sink<'s>(frames: &'s mut [Frame], out: &'s mut String, in_segment: bool) -> &'s mut String {
    let Some(frame) = frames.last_mut() else {
        return out;
    };
    match (&mut frame.runs, in_segment) {
        (Some(runs), true) => &mut runs.segment,
        _ => &mut frame.buf,
    }
}

fn flush(segment: &mut String, out: &mut String) {
    let trimmed = segment.trim();
    if !trimmed.is_empty() {
        out.push_str("<p>");
        out.push_str(trimmed);
        out.push_str("</p>");
    }
    segment.clear();
}

/// Write a node, grouping inline children between <br> runs into paragraphs.
///
/// Elements are written into per-frame buffers on an explicit stack, so deep
/// nesting never recurses.
fn write_node<'a>(node: NodeRef<'a, Node>, out: &mut String) {
    let mut frames: Vec<Frame<'a>> = Vec::new();

    for edge in node.traverse() {
        match edge {
            Edge::Open(child) => {
                let mut in_segment = false;
                if let Some(frame) = frames.last_mut() {
                    if let Some(runs) = frame.runs.as_mut() {
                        if is_br(&child) {
                            runs.pending_brs += 1;
                            continue;
                        }
                        if runs.pending_brs > 0 && is_blank_text(&child) {
                            continue;
                        }
                        match runs.pending_brs {
                            0 => {}
                            1 => runs.segment.push_str("<br />"),
                            _ => flush(&mut runs.segment, &mut frame.buf),
                        }
                        runs.pending_brs = 0;

                        if is_block(&child) {
                            flush(&mut runs.segment, &mut frame.buf);
                        } else {
                            in_segment = true;
                        }
                    }
                }

                match child.value() {
                    Node::Text(t) => sink(&mut frames, out, in_segment).push_str(&escape_text(t)),
                    Node::Comment(c) => {
                        let target = sink(&mut frames, out, in_segment);
                        target.push_str("<!--");
                        target.push_str(c);
                        target.push_str("-->");
                    }
                    Node::Element(el) => {
                        let tag = el.name();
                        let split = has_double_br(child);

                        // A split <p> becomes its paragraphs; nesting <p> in <p> is invalid.
                        if split && tag.eq_ignore_ascii_case("p") {
                            frames.push(Frame {
                                close_tag: None,
                                buf: String::new(),
                                runs: Some(Runs::default()),
                                in_segment,
                            });
                            continue;
                        }

                        let mut open_tag = String::new();
                        open_tag.push('<');
                        open_tag.push_str(tag);
                        for (k, v) in el.attrs() {
                            open_tag.push(' ');
                            open_tag.push_str(k);
                            open_tag.push_str("=\"");
                            open_tag.push_str(&escape_attr(v));
                            open_tag.push('"');
                        }
                        if is_void_element(tag) {
                            open_tag.push_str(" />");
                            sink(&mut frames, out, in_segment).push_str(&open_tag);
                            continue;
                        }
                        open_tag.push('>');
                        frames.push(Frame {
                            close_tag: Some(tag),
                            buf: open_tag,
                            runs: split.then(Runs::default),
                            in_segment,
                        });
                    }
                    _ => {}
                }
            }
            Edge::Close(child) => {
                let Node::Element(el) = child.value() else {
                    continue;
                };
                if is_void_element(el.name()) {
                    continue;
                }
                let Some(mut frame) = frames.pop() else {
                    continue;
                };
                if let Some(runs) = frame.runs.as_mut() {
                    flush(&mut runs.segment, &mut frame.buf);
                }
                if let Some(tag) = frame.close_tag {
                    frame.buf.push_str("</");
                    frame.buf.push_str(tag);
                    frame.buf.push('>');
                }
                sink(&mut frames, out, frame.in_segment).push_str(&frame.buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn no_double_br_is_unchanged() {
        let html = "<div>One<br>Two</div>";
        assert_eq!(brs_to_ps(html), html);
    }

    #[test]
    fn double_br_splits_into_paragraphs() {
        let out = brs_to_ps("<div>First part<br><br>Second <b>part</b></div>");
        assert_eq!(out, "<div><p>First part</p><p>Second <b>part</b></p></div>");
    }

    #[test]
    fn whitespace_between_brs_still_splits() {
        let out = brs_to_ps("<div>A<br />\n  <br />B<br>C</div>");
        assert_eq!(out, "<div><p>A</p><p>B<br />C</p></div>");
    }

    #[test]
    fn split_paragraph_is_not_nested() {
        let out = brs_to_ps("<article><p>One<br><br>Two</p></article>");
        assert_eq!(out, "<article><p>One</p><p>Two</p></article>");
    }

    #[test]
    fn deeply_nested_markup_is_rewritten_without_recursion() {
        const DEPTH: usize = 10_000;
        let html = format!(
            "{}One<br><br>Two{}",
            "<section>".repeat(DEPTH),
            "</section>".repeat(DEPTH)
        );
        let out = brs_to_ps(&html);

        assert!(out.contains("<section><p>One</p><p>Two</p></section>"));
        assert_eq!(out.matches("<section>").count(), DEPTH);
        assert_eq!(out.matches("</section>").count(), DEPTH);
    }

    #[test]
    fn block_children_end_a_run() {
        let out = brs_to_ps("<div>Intro<br><br><ul><li>x</li></ul>Tail</div>");
        assert_eq!(out, "<div><p>Intro</p><ul><li>x</li></ul><p>Tail</p></div>");
    }
}

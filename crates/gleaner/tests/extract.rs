// ABOUTME: Library-level end-to-end tests for article extraction.
// ABOUTME: Exercises multi-block merging, exclusion of hidden and discussion regions, options and errors.

use gleaner::{extract, ContentType, ExtractionOptions, Reader};
use pretty_assertions::assert_eq;

const SPLIT_STORY: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<title>Split Story</title>
<meta property="og:site_name" content="Daily Example">
<meta property="article:published_time" content="2024-02-10T08:30:00Z">
</head>
<body>
<div class="story-body">
<p>Alpha paragraph opens the story, sets the scene, and introduces the town council.</p>
<p>Bravo paragraph adds detail, quotes a resident, and explains the budget vote.</p>
</div>
<div class="advert">Buy now and save big</div>
<div class="story-body">
<p>Charlie paragraph continues after the break, with reaction, context, and numbers.</p>
<p>Delta paragraph wraps up the story, notes next steps, and links <a href="/council">the agenda</a>.</p>
</div>
<div id="comments">
<p>Great article, thanks, I agree with everything, especially the budget part, wow.</p>
</div>
<div style="display:none"><p>Hidden teaser text that, for sure, should never be extracted at all.</p></div>
</body>
</html>"#;

const URL: &str = "https://news.example.com/2024/02/split-story";

#[test]
fn separated_story_blocks_are_merged() {
    let article = extract(SPLIT_STORY, URL).unwrap();

    for needle in ["Alpha", "Bravo", "Charlie", "Delta"] {
        assert!(article.text.contains(needle), "missing {}: {}", needle, article.text);
    }
    assert!(!article.text.contains("Buy now"));
    assert!(!article.text.contains("Great article"));
    assert!(!article.text.contains("Hidden teaser"));
}

#[test]
fn merged_article_carries_metadata() {
    let article = extract(SPLIT_STORY, URL).unwrap();

    assert_eq!(article.title, "Split Story");
    assert_eq!(article.domain, "news.example.com");
    assert_eq!(article.site_name.as_deref(), Some("Daily Example"));
    assert_eq!(article.language.as_deref(), Some("en"));
    assert_eq!(
        article.date_published.map(|d| d.to_rfc3339()),
        Some("2024-02-10T08:30:00+00:00".to_string())
    );
    assert!(article.html.starts_with(r#"<article class="gleaner-article">"#));
    assert!(article.html.contains(r#"href="https://news.example.com/council""#));
    assert!(article.excerpt.as_deref().unwrap_or_default().starts_with("Alpha paragraph"));
}

#[test]
fn extraction_is_deterministic() {
    let first = extract(SPLIT_STORY, URL).unwrap();
    let second = extract(SPLIT_STORY, URL).unwrap();
    assert_eq!(first, second);
}

#[test]
fn reader_can_be_shared_across_threads() {
    let reader = Reader::default();
    let expected = reader.parse_html(SPLIT_STORY, URL).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| reader.parse_html(SPLIT_STORY, URL).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn top_n_of_one_keeps_a_single_block() {
    let reader = Reader::builder().cluster_top_n(1).build();
    let article = reader.parse_html(SPLIT_STORY, URL).unwrap();

    let first_half = article.text.contains("Alpha");
    let second_half = article.text.contains("Charlie");
    assert!(first_half != second_half, "expected one block, got: {}", article.text);
}

#[test]
fn div_wrapper_and_markdown_output() {
    let reader = Reader::builder()
        .extraction(ExtractionOptions {
            wrap_in_article_tag: false,
            ..ExtractionOptions::default()
        })
        .content_type(ContentType::Markdown)
        .build();
    let article = reader.parse_html(SPLIT_STORY, URL).unwrap();

    assert!(article.html.starts_with(r#"<div class="gleaner-article">"#));
    assert!(article.content.contains("[the agenda](https://news.example.com/council)"));
    assert!(!article.content.contains("<p>"));
}

#[test]
fn parse_bytes_honours_charset_hint() {
    let mut bytes = b"<html><head><title>Caf\xe9</title></head><body><div class=\"post\">".to_vec();
    bytes.extend_from_slice(b"<p>The caf\xe9 opened its doors, served coffee, and drew a long queue of curious neighbours.</p>");
    bytes.extend_from_slice(b"</div></body></html>");

    let article = Reader::default()
        .parse_bytes(&bytes, Some("text/html; charset=windows-1252"), URL)
        .unwrap();
    assert_eq!(article.title, "Café");
    assert!(article.text.contains("The café opened"));
}

#[test]
fn page_without_scored_content_fails() {
    let err = extract("<html><body><div>nothing</div></body></html>", URL).unwrap_err();
    assert!(err.is_no_readable_content());
    assert_eq!(err.url, URL);
    assert!(err.to_string().contains("no readable content"));
}

#[test]
fn deeply_nested_page_is_extracted() {
    const DEPTH: usize = 10_000;
    let html = format!(
        "<html><head><title>Deep</title></head><body>{}<p>{}</p>{}</body></html>",
        "<div>".repeat(DEPTH),
        "The only paragraph sits below thousands of wrappers, with commas, and plenty of words.",
        "</div>".repeat(DEPTH)
    );

    let article = extract(&html, URL).unwrap();
    assert_eq!(article.title, "Deep");
    assert!(article.text.contains("The only paragraph sits below"));
}

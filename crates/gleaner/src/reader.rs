// ABOUTME: Reader facade running the full extraction pipeline over one HTML document.
// ABOUTME: Validates input, scores, clusters and merges, cleans, sanitizes and resolves metadata.

use scraper::Html;
use tracing::{debug, warn};
use url::Url;

use crate::article::Article;
use crate::cluster::merge_candidates;
use crate::decode::decode_html;
use crate::dom::cleaners::clean_article;
use crate::dom::scoring::score_document;
use crate::error::ExtractError;
use crate::formats::{html_to_text, render, sanitize_html, word_count};
use crate::metadata::{self, Metadata};
use crate::options::{Options, ReaderBuilder};

/// Extracts readable articles from HTML documents.
///
/// A `Reader` only holds its options, so one instance can serve any number of
/// documents, including from several threads at once.
#[derive(Debug, Clone, Default)]
pub struct Reader {
    opts: Options,
}

fn parse_base(url: &str, op: &str) -> Result<Url, ExtractError> {
    if url.trim().is_empty() {
        return Err(ExtractError::invalid_url(url, op, None));
    }
    Url::parse(url.trim()).map_err(|e| ExtractError::invalid_url(url, op, Some(e.into())))
}

impl Reader {
    pub fn builder() -> ReaderBuilder {
        ReaderBuilder::new()
    }

    pub fn new(opts: Options) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Extract the article from an HTML string.
    ///
    /// `url` is the document's absolute URL; it is the base for relative
    /// links and the source of [`Article::domain`].
    pub fn parse_html(&self, html: &str, url: &str) -> Result<Article, ExtractError> {
        let base = parse_base(url, "parse_html")?;
        if html.trim().is_empty() {
            return Err(ExtractError::empty_input(url, "parse_html"));
        }

        let doc = Html::parse_document(html);
        let candidates = score_document(&doc);
        debug!(url, candidates = candidates.len(), "scored document");

        let merged = merge_candidates(candidates, &self.opts.extraction, base.as_str())
            .map_err(|err| {
                warn!(url, "no readable content found");
                err.with_url(url)
            })?;
        debug!(blocks = merged.block_count(), "merged article content");

        let merged_html = if self.opts.resolve_urls {
            merged.to_resolved_html()
        } else {
            merged.to_html()
        };

        let title = metadata::title(&doc).unwrap_or_default();
        let cleaned = clean_article(&merged_html, &title);
        let html = sanitize_html(&cleaned);
        let text = html_to_text(&html);
        let meta = Metadata::resolve(&doc, &html, &text, &base);

        Ok(Article {
            url: url.to_string(),
            domain: base
                .host_str()
                .map(|h| h.to_lowercase())
                .unwrap_or_default(),
            title: meta.title,
            byline: meta.byline,
            excerpt: meta.excerpt,
            content: render(&html, self.opts.content_type),
            word_count: word_count(&text),
            html,
            text,
            lead_image_url: meta.lead_image_url,
            site_name: meta.site_name,
            language: meta.language,
            date_published: meta.date_published,
        })
    }

    /// Decode raw bytes, then extract as [`Reader::parse_html`] does.
    ///
    /// `content_type_hint` is a Content-Type style value whose `charset`
    /// parameter, when present, overrides detection.
    pub fn parse_bytes(
        &self,
        bytes: &[u8],
        content_type_hint: Option<&str>,
        url: &str,
    ) -> Result<Article, ExtractError> {
        if bytes.is_empty() {
            return Err(ExtractError::empty_input(url, "parse_bytes"));
        }
        let html = decode_html(bytes, content_type_hint);
        self.parse_html(&html, url)
    }
}

/// Extract an article with default options.
pub fn extract(html: &str, url: &str) -> Result<Article, ExtractError> {
    Reader::default().parse_html(html, url)
}

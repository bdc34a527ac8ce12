// ABOUTME: Configuration for gleaner including ContentType, ExtractionOptions, Options and ReaderBuilder.
// ABOUTME: ReaderBuilder provides a fluent API for constructing Reader instances with custom settings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::reader::Reader;

/// The content type format for the article `content` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Html,
    Markdown,
    Text,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContentType::Html => "html",
            ContentType::Markdown => "markdown",
            ContentType::Text => "text",
        };
        write!(f, "{}", s)
    }
}

impl From<&str> for ContentType {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => ContentType::Markdown,
            "text" | "txt" => ContentType::Text,
            _ => ContentType::Html,
        }
    }
}

/// Tag of the synthetic element that wraps merged content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapperTag {
    Article,
    Div,
}

impl WrapperTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            WrapperTag::Article => "article",
            WrapperTag::Div => "div",
        }
    }
}

/// Knobs for the candidate clustering and merge engine.
///
/// Unknown keys are ignored when deserializing and absent keys take the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionOptions {
    pub wrap_in_article_tag: bool,
    /// Size of the highest-scoring candidate pool handed to the partitioner.
    pub cluster_top_n: usize,
    /// Maximum document-order distance between two members of one cluster.
    pub cluster_max_rank_gap: usize,
    /// Maximum nesting-depth difference between two members of one cluster.
    pub cluster_max_depth_delta: usize,
    /// Minimum Jaccard similarity of id/class tokens, in `[0, 1]`.
    pub cluster_min_token_jaccard: f64,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            wrap_in_article_tag: true,
            cluster_top_n: 12,
            cluster_max_rank_gap: 20,
            cluster_max_depth_delta: 3,
            cluster_min_token_jaccard: 0.18,
        }
    }
}

impl ExtractionOptions {
    /// Clamp values into their valid ranges.
    pub fn normalized(&self) -> Self {
        let jaccard = if self.cluster_min_token_jaccard.is_nan() {
            0.0
        } else {
            self.cluster_min_token_jaccard.clamp(0.0, 1.0)
        };
        Self {
            cluster_top_n: self.cluster_top_n.max(1),
            cluster_min_token_jaccard: jaccard,
            ..self.clone()
        }
    }

    pub fn wrapper_tag(&self) -> WrapperTag {
        if self.wrap_in_article_tag {
            WrapperTag::Article
        } else {
            WrapperTag::Div
        }
    }
}

/// Configuration options for the gleaner reader.
#[derive(Debug, Clone)]
pub struct Options {
    pub content_type: ContentType,
    pub extraction: ExtractionOptions,
    /// Rewrite relative `href`/`src` values against the document URL.
    pub resolve_urls: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            content_type: ContentType::Html,
            extraction: ExtractionOptions::default(),
            resolve_urls: true,
        }
    }
}

/// Builder for constructing Reader instances with custom configuration.
#[derive(Debug, Clone)]
pub struct ReaderBuilder {
    opts: Options,
}

impl ReaderBuilder {
    /// Create a new ReaderBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
        }
    }

    /// Set the content type of the article `content` field.
    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.opts.content_type = content_type;
        self
    }

    /// Replace the whole clustering configuration.
    pub fn extraction(mut self, extraction: ExtractionOptions) -> Self {
        self.opts.extraction = extraction;
        self
    }

    /// Wrap merged content in `<article>` (true) or `<div>` (false).
    pub fn wrap_in_article_tag(mut self, wrap: bool) -> Self {
        self.opts.extraction.wrap_in_article_tag = wrap;
        self
    }

    pub fn cluster_top_n(mut self, n: usize) -> Self {
        self.opts.extraction.cluster_top_n = n;
        self
    }

    pub fn cluster_max_rank_gap(mut self, gap: usize) -> Self {
        self.opts.extraction.cluster_max_rank_gap = gap;
        self
    }

    pub fn cluster_max_depth_delta(mut self, delta: usize) -> Self {
        self.opts.extraction.cluster_max_depth_delta = delta;
        self
    }

    pub fn cluster_min_token_jaccard(mut self, jaccard: f64) -> Self {
        self.opts.extraction.cluster_min_token_jaccard = jaccard;
        self
    }

    /// Enable or disable rewriting of relative URLs in the extracted content.
    pub fn resolve_urls(mut self, resolve: bool) -> Self {
        self.opts.resolve_urls = resolve;
        self
    }

    /// Build the Reader with the configured options.
    pub fn build(self) -> Reader {
        Reader::new(self.opts)
    }
}

impl Default for ReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

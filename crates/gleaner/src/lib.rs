// ABOUTME: Main library entry point for the gleaner readability extractor.
// ABOUTME: Re-exports the public API: Reader, ReaderBuilder, Article, ExtractError, ErrorCode and options.

//! Gleaner extracts the readable article from an HTML page.
//!
//! The page is scored, the best-scoring blocks are grouped into clusters of
//! neighbouring, similarly-named nodes, and the strongest cluster is merged
//! into one `<article>` wrapper before cleaning and sanitizing.
//!
//! # Example
//!
//! ```no_run
//! use gleaner::{ContentType, ExtractError, Reader};
//!
//! fn main() -> Result<(), ExtractError> {
//!     let html = std::fs::read_to_string("page.html").unwrap_or_default();
//!     let reader = Reader::builder()
//!         .content_type(ContentType::Markdown)
//!         .cluster_top_n(8)
//!         .build();
//!     let article = reader.parse_html(&html, "https://example.com/post")?;
//!     println!("{}", article.format_markdown());
//!     Ok(())
//! }
//! ```

pub mod article;
pub mod cluster;
pub mod decode;
pub mod dom;
pub mod error;
pub mod formats;
pub mod metadata;
pub mod options;
pub mod reader;

pub use crate::article::Article;
pub use crate::cluster::{merge_candidates, Candidate, MergedRoot, NodePath};
pub use crate::error::{ErrorCode, ExtractError};
pub use crate::options::{ContentType, ExtractionOptions, Options, ReaderBuilder, WrapperTag};
pub use crate::reader::{extract, Reader};

// ABOUTME: DOM helpers for scoring, cleaning and copying parsed HTML.
// ABOUTME: Groups the scorer, the cleaners and the owned element tree used for merged output.

//! DOM utilities.
//!
//! `scoring` turns a parsed document into clustering candidates, `tree`
//! holds detached copies of the chosen nodes, and `cleaners`/`brs` tidy the
//! merged HTML before it is sanitized.

pub mod brs;
pub mod cleaners;
pub mod scoring;
pub mod tree;

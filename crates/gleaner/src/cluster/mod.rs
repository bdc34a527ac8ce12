// ABOUTME: Candidate clustering and merge engine that decides which scored nodes form the article.
// ABOUTME: Re-exports candidate types, the compatibility test, partitioning, selection and merging.

//! Candidate clustering and merging.
//!
//! Given scored candidates, the engine keeps the `cluster_top_n` best, walks
//! them in document order grouping compatible neighbours (close in order and
//! depth, similar id/class tokens, or strong enough to join anyway), ranks the
//! groups and copies the winning group into one wrapper element.
//!
//! Everything here is synchronous and stateless; the parsed document is only
//! read, so extractions over the same document can run concurrently.

pub mod candidate;
pub mod compat;
pub mod merge;
pub mod partition;
pub mod select;
pub mod tokens;

pub use candidate::{Candidate, NodePath};
pub use compat::{is_compatible, jaccard};
pub use merge::{merge_candidates, MergedRoot, MERGED_ROOT_CLASS};
pub use partition::{partition, Cluster};
pub use select::select_cluster;
pub use tokens::{element_tokens, tokens_from_attrs};

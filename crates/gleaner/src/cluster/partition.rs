// ABOUTME: Single forward pass that splits document-ordered candidates into clusters.
// ABOUTME: Each newcomer is tested against the cluster seed and its current tail.

use tracing::debug;

use crate::cluster::candidate::Candidate;
use crate::cluster::compat::is_compatible;
use crate::options::ExtractionOptions;

/// Non-empty run of compatible candidates in ascending document order.
#[derive(Debug, Clone)]
pub struct Cluster<'a> {
    members: Vec<Candidate<'a>>,
}

impl<'a> Cluster<'a> {
    fn seeded(seed: Candidate<'a>) -> Self {
        Self {
            members: vec![seed],
        }
    }

    pub fn members(&self) -> &[Candidate<'a>] {
        &self.members
    }

    pub fn into_members(self) -> Vec<Candidate<'a>> {
        self.members
    }

    pub(crate) fn len(&self) -> usize {
        self.members.len()
    }

    fn seed(&self) -> &Candidate<'a> {
        &self.members[0]
    }

    fn tail(&self) -> &Candidate<'a> {
        &self.members[self.members.len() - 1]
    }

    fn accepts(&self, next: &Candidate<'a>, opts: &ExtractionOptions) -> bool {
        is_compatible(self.seed(), next, opts) || is_compatible(self.tail(), next, opts)
    }
}

/// Partition candidates into clusters.
///
/// Candidates are ordered by `order_index` first. This is O(n): a newcomer
/// only has to resemble the seed or the tail, not every member.
pub fn partition<'a>(
    mut candidates: Vec<Candidate<'a>>,
    opts: &ExtractionOptions,
) -> Vec<Cluster<'a>> {
    candidates.sort_by_key(|c| c.order_index);

    let mut clusters: Vec<Cluster<'a>> = Vec::new();
    let mut current: Option<Cluster<'a>> = None;

    for next in candidates {
        current = match current.take() {
            None => Some(Cluster::seeded(next)),
            Some(mut cluster) => {
                if cluster.accepts(&next, opts) {
                    cluster.members.push(next);
                    Some(cluster)
                } else {
                    clusters.push(cluster);
                    Some(Cluster::seeded(next))
                }
            }
        };
    }
    clusters.extend(current);

    debug!(clusters = clusters.len(), "partitioned candidates");
    clusters
}

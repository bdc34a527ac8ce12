// ABOUTME: Ranks clusters by summed score plus a logarithmic size bonus and picks the winner.
// ABOUTME: Ties go to the cluster that appears first in document order.

use tracing::debug;

use crate::cluster::partition::Cluster;
use crate::error::ExtractError;

/// Weight of the `ln(len + 1)` size bonus.
pub const SIZE_BONUS_WEIGHT: f64 = 0.25;

impl<'a> Cluster<'a> {
    /// Summed member score plus a small bonus for multi-block clusters.
    pub fn value(&self) -> f64 {
        let total: f64 = self.members().iter().map(|m| m.score).sum();
        total + SIZE_BONUS_WEIGHT * ((self.len() + 1) as f64).ln()
    }
}

/// Pick the highest-valued cluster, keeping the first of equal maxima.
pub fn select_cluster<'a>(clusters: Vec<Cluster<'a>>) -> Result<Cluster<'a>, ExtractError> {
    let mut best: Option<(f64, Cluster<'a>)> = None;

    for cluster in clusters {
        let value = cluster.value();
        debug!(
            value,
            members = cluster.len(),
            first = cluster.members()[0].order_index,
            "cluster value"
        );
        // Strict comparison keeps the earlier cluster on ties; Iterator::max_by would keep the last.
        let better = match &best {
            Some((best_value, _)) => value > *best_value,
            None => true,
        };
        if better {
            best = Some((value, cluster));
        }
    }

    best.map(|(_, cluster)| cluster)
        .ok_or_else(|| ExtractError::no_readable_content("select_cluster"))
}

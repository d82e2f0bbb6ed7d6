use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

const DEFAULT_TIER_NAMES: [&str; 10] = [
    "Bronze",
    "Silver",
    "Gold",
    "Platinum",
    "Diamond",
    "Epic",
    "Legendary",
    "Master",
    "GrandMaster",
    "Lord",
];

const DEFAULT_TIER_THRESHOLDS: [u64; 10] = [
    0,
    5_000,
    25_000,
    100_000,
    1_000_000,
    2_000_000,
    10_000_000,
    50_000_000,
    100_000_000,
    1_000_000_000,
];

static DEFAULT_TIERS: Lazy<TierTable> = Lazy::new(|| TierTable {
    tiers: DEFAULT_TIER_NAMES
        .iter()
        .zip(DEFAULT_TIER_THRESHOLDS)
        .map(|(name, min_points)| Tier {
            name: name.to_string(),
            min_points,
        })
        .collect(),
});

/// The process-wide Bronze..Lord table.
pub fn default_table() -> &'static TierTable {
    &DEFAULT_TIERS
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Tier {
    pub name: String,
    pub min_points: u64,
}

/// Ordered tier brackets. Tier `i` covers `[min_points[i], min_points[i + 1])`,
/// the last tier is open-ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TierTable {
    tiers: Vec<Tier>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Progression {
    pub tier_index: usize,
    /// Fraction of the way from the current tier's threshold to the next one, in `[0, 1]`.
    pub progress: f64,
}

impl Progression {
    pub fn progress_percent(&self) -> f64 {
        self.progress * 100.0
    }
}

impl TierTable {
    pub fn new(names: &[&str], thresholds: &[u64]) -> AppResult<Self> {
        if names.is_empty() {
            return Err(AppError::ValidationError(
                "Tier table must contain at least one tier".to_string(),
            ));
        }

        if names.len() != thresholds.len() {
            return Err(AppError::ValidationError(format!(
                "Tier table has {} names but {} thresholds",
                names.len(),
                thresholds.len()
            )));
        }

        if thresholds[0] != 0 {
            return Err(AppError::ValidationError(
                "First tier threshold must be 0".to_string(),
            ));
        }

        if thresholds.windows(2).any(|pair| pair[1] < pair[0]) {
            return Err(AppError::ValidationError(
                "Tier thresholds must be non-decreasing".to_string(),
            ));
        }

        let tiers = names
            .iter()
            .zip(thresholds)
            .map(|(name, min_points)| Tier {
                name: name.to_string(),
                min_points: *min_points,
            })
            .collect();

        Ok(Self { tiers })
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.tiers.len() - 1
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn get(&self, index: usize) -> Option<&Tier> {
        self.tiers.get(index)
    }

    pub fn clamp_index(&self, index: usize) -> usize {
        index.min(self.last_index())
    }

    /// Corrects a cached tier index by at most one step and reports progress
    /// toward the next tier from the corrected position.
    ///
    /// Callers are expected to run this on every balance change so the cached
    /// index never drifts by more than one tier. Use [`TierTable::rescan`] to
    /// repair larger drift.
    pub fn derive_tier(&self, balance: u64, prior_index: usize) -> Progression {
        let prior = self.clamp_index(prior_index);
        let last = self.last_index();

        let tier_index = if prior < last && balance >= self.tiers[prior + 1].min_points {
            prior + 1
        } else if prior > 0 && balance < self.tiers[prior].min_points {
            prior - 1
        } else {
            prior
        };

        Progression {
            tier_index,
            progress: self.progress_within(balance, tier_index),
        }
    }

    /// Full scan for the exact tier containing `balance`.
    pub fn rescan(&self, balance: u64) -> usize {
        self.tiers
            .iter()
            .rposition(|tier| balance >= tier.min_points)
            .unwrap_or(0)
    }

    fn progress_within(&self, balance: u64, index: usize) -> f64 {
        if index >= self.last_index() {
            return 1.0;
        }

        let floor = self.tiers[index].min_points;
        let ceiling = self.tiers[index + 1].min_points;
        if ceiling <= floor {
            return 1.0;
        }

        let earned = balance.saturating_sub(floor) as f64;
        (earned / (ceiling - floor) as f64).clamp(0.0, 1.0)
    }

    pub fn next_tier(&self, index: usize) -> Option<&Tier> {
        self.tiers.get(index + 1)
    }

    /// Points still needed to reach the tier after `index`, `None` at the top tier.
    pub fn points_to_next(&self, balance: u64, index: usize) -> Option<u64> {
        self.next_tier(index)
            .map(|next| next.min_points.saturating_sub(balance))
    }
}

//! Factions and derived team labels.

use serde::{Deserialize, Serialize};

/// One of the two opposing sides in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    Axis,
    Allies,
}

impl Faction {
    /// The label a player gets when this faction dominates their kills.
    pub fn label(&self) -> TeamLabel {
        match self {
            Faction::Axis => TeamLabel::Axis,
            Faction::Allies => TeamLabel::Allies,
        }
    }
}

impl std::fmt::Display for Faction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Faction::Axis => write!(f, "axis"),
            Faction::Allies => write!(f, "allies"),
        }
    }
}

/// Team inferred for a player from their post-game kill statistics.
///
/// Display-time value: recomputed whenever statistics are loaded, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TeamLabel {
    /// At least the threshold share of kills came from Axis weapons
    Axis,
    /// At least the threshold share of kills came from Allied weapons
    Allies,
    /// Kills on both sides, neither reaching the threshold
    Mixed,
    /// No recognized kills on at least one side and no dominant faction
    #[default]
    Unknown,
}

impl TeamLabel {
    /// Returns true if the label names a single faction.
    pub fn is_decisive(&self) -> bool {
        matches!(self, TeamLabel::Axis | TeamLabel::Allies)
    }

    /// The faction this label names, if any.
    pub fn faction(&self) -> Option<Faction> {
        match self {
            TeamLabel::Axis => Some(Faction::Axis),
            TeamLabel::Allies => Some(Faction::Allies),
            TeamLabel::Mixed | TeamLabel::Unknown => None,
        }
    }
}

impl std::fmt::Display for TeamLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamLabel::Axis => write!(f, "axis"),
            TeamLabel::Allies => write!(f, "allies"),
            TeamLabel::Mixed => write!(f, "mixed"),
            TeamLabel::Unknown => write!(f, "unknown"),
        }
    }
}

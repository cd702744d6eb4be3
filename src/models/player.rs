//! Player statistics records and their classified counterparts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{TeamLabel, WeaponUsage};

/// Kill statistics for one player in one completed match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerKillRecord {
    /// All kills, including ones without a recorded weapon
    #[serde(default)]
    pub total_kills: u32,

    /// Kills per weapon, in the order the statistics feed listed them
    #[serde(default)]
    pub weapon_usage: WeaponUsage,
}

impl PlayerKillRecord {
    pub fn new(total_kills: u32, weapon_usage: WeaponUsage) -> Self {
        Self {
            total_kills,
            weapon_usage,
        }
    }

    /// Whether the weapon breakdown fits within the kill total.
    ///
    /// Expected to hold, but never enforced: some kills have no weapon.
    pub fn is_consistent(&self) -> bool {
        u64::from(self.total_kills) >= self.weapon_usage.total()
    }
}

/// A kill record tagged with the player it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    /// Opaque identifier used to correlate with the statistics source
    pub player_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,

    #[serde(flatten)]
    pub record: PlayerKillRecord,
}

impl PlayerStats {
    pub fn new(player_id: impl Into<String>, record: PlayerKillRecord) -> Self {
        Self {
            player_id: player_id.into(),
            player_name: None,
            record,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.player_name = Some(name.into());
        self
    }
}

/// Player statistics with the inferred team attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedPlayer {
    #[serde(flatten)]
    pub player: PlayerStats,

    pub team: TeamLabel,
}

/// Per-label player counts for one match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub axis: u32,
    pub allies: u32,
    pub mixed: u32,
    pub unknown: u32,
}

impl TeamSummary {
    /// Count one more player under `label`.
    pub fn record(&mut self, label: TeamLabel) {
        match label {
            TeamLabel::Axis => self.axis += 1,
            TeamLabel::Allies => self.allies += 1,
            TeamLabel::Mixed => self.mixed += 1,
            TeamLabel::Unknown => self.unknown += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.axis + self.allies + self.mixed + self.unknown
    }
}

impl FromIterator<TeamLabel> for TeamSummary {
    fn from_iter<I: IntoIterator<Item = TeamLabel>>(iter: I) -> Self {
        let mut summary = TeamSummary::default();
        for label in iter {
            summary.record(label);
        }
        summary
    }
}

/// Statistics for every player of a completed match, as supplied upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_id: Option<String>,

    #[serde(default)]
    pub players: Vec<PlayerStats>,
}

/// A match whose players all carry a team label.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedMatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_id: Option<String>,

    /// Version of the weapon taxonomy the labels were derived with
    pub taxonomy_version: String,

    pub classified_at: DateTime<Utc>,

    /// Players in input order
    pub players: Vec<ClassifiedPlayer>,

    pub summary: TeamSummary,
}

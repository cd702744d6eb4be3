//! Team classification engine.
//!
//! Infers which faction a player fought for from post-game weapon kill
//! counts. Walks the player's weapons from most to least used, adding each
//! recognized weapon's kills to its faction, and stops as soon as one
//! faction holds the threshold share of the player's total kills:
//! - a faction reaching the threshold wins outright (Axis is checked first)
//! - kills on both sides without a winner give `mixed`
//! - anything else gives `unknown`

use std::ops::ControlFlow;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{
    ClassifiedMatch, ClassifiedPlayer, Faction, MatchStats, PlayerKillRecord, PlayerStats,
    TeamLabel, TeamSummary, WeaponUsage,
};
use crate::taxonomy::WeaponTaxonomy;

/// Share of total kills a faction needs for a decisive label.
pub const DEFAULT_THRESHOLD_RATIO: f64 = 0.8;

/// How players with zero total kills are labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ZeroKillPolicy {
    /// Always `unknown`, whatever weapons are listed
    #[default]
    Unknown,
    /// Historical behaviour: the threshold is zero, so any listed weapon
    /// yields a decisive label (Axis, since it is checked first)
    Legacy,
}

/// Classifier tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Fraction of total kills, in (0.0, 1.0]
    #[serde(default = "default_threshold_ratio")]
    pub threshold_ratio: f64,

    #[serde(default)]
    pub zero_kills: ZeroKillPolicy,
}

fn default_threshold_ratio() -> f64 {
    DEFAULT_THRESHOLD_RATIO
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            threshold_ratio: default_threshold_ratio(),
            zero_kills: ZeroKillPolicy::default(),
        }
    }
}

/// Running kill totals per faction.
#[derive(Debug, Clone, Copy, Default)]
struct KillTally {
    axis: u64,
    allies: u64,
}

impl KillTally {
    fn add(&mut self, faction: Faction, count: u32) {
        match faction {
            Faction::Axis => self.axis += u64::from(count),
            Faction::Allies => self.allies += u64::from(count),
        }
    }

    fn dominant(&self, threshold: f64) -> Option<Faction> {
        if self.axis as f64 >= threshold {
            Some(Faction::Axis)
        } else if self.allies as f64 >= threshold {
            Some(Faction::Allies)
        } else {
            None
        }
    }

    fn fallback(&self) -> TeamLabel {
        if self.axis > 0 && self.allies > 0 {
            TeamLabel::Mixed
        } else {
            TeamLabel::Unknown
        }
    }
}

/// Classify one player with the default configuration.
pub fn classify(total_kills: u32, usage: &WeaponUsage, taxonomy: &WeaponTaxonomy) -> TeamLabel {
    classify_with(total_kills, usage, taxonomy, &ClassifierConfig::default())
}

/// Classify one player.
///
/// Total over its inputs: unrecognized weapons are ignored and can only
/// lower confidence towards `mixed` or `unknown`.
pub fn classify_with(
    total_kills: u32,
    usage: &WeaponUsage,
    taxonomy: &WeaponTaxonomy,
    config: &ClassifierConfig,
) -> TeamLabel {
    if total_kills == 0 && config.zero_kills == ZeroKillPolicy::Unknown {
        return TeamLabel::Unknown;
    }

    let threshold = f64::from(total_kills) * config.threshold_ratio;

    let outcome = usage.by_count_desc().into_iter().try_fold(
        KillTally::default(),
        |mut tally, (weapon, count)| {
            if let Some(faction) = taxonomy.faction_of(weapon) {
                tally.add(faction, count);
            }
            match tally.dominant(threshold) {
                Some(faction) => ControlFlow::Break(faction.label()),
                None => ControlFlow::Continue(tally),
            }
        },
    );

    match outcome {
        ControlFlow::Break(label) => label,
        ControlFlow::Continue(tally) => tally.fallback(),
    }
}

/// Classifier bound to a taxonomy. Cheap to clone and safe to share.
#[derive(Debug, Clone)]
pub struct Classifier {
    taxonomy: Arc<WeaponTaxonomy>,
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new(taxonomy: Arc<WeaponTaxonomy>, config: ClassifierConfig) -> Self {
        Self { taxonomy, config }
    }

    pub fn taxonomy(&self) -> &WeaponTaxonomy {
        &self.taxonomy
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Label a single kill record.
    pub fn classify(&self, record: &PlayerKillRecord) -> TeamLabel {
        if !record.is_consistent() {
            debug!(
                "Weapon kills ({}) exceed total kills ({})",
                record.weapon_usage.total(),
                record.total_kills
            );
        }
        classify_with(
            record.total_kills,
            &record.weapon_usage,
            &self.taxonomy,
            &self.config,
        )
    }

    /// Attach a team label to a copy of the player's statistics.
    pub fn classify_player(&self, player: &PlayerStats) -> ClassifiedPlayer {
        ClassifiedPlayer {
            team: self.classify(&player.record),
            player: player.clone(),
        }
    }

    /// Label every player, keeping input order.
    pub fn classify_players(&self, players: &[PlayerStats]) -> Vec<ClassifiedPlayer> {
        players.iter().map(|p| self.classify_player(p)).collect()
    }

    /// Label every player of a match and summarize the result.
    pub fn classify_match(&self, stats: &MatchStats) -> ClassifiedMatch {
        let players = self.classify_players(&stats.players);
        let summary: TeamSummary = players.iter().map(|p| p.team).collect();

        debug!(
            "Classified {} players (axis={}, allies={}, mixed={}, unknown={})",
            summary.total(),
            summary.axis,
            summary.allies,
            summary.mixed,
            summary.unknown
        );

        ClassifiedMatch {
            match_id: stats.match_id.clone(),
            taxonomy_version: self.taxonomy.version().to_string(),
            classified_at: Utc::now(),
            players,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::WeaponGroup;
    use pretty_assertions::assert_eq;

    fn test_taxonomy() -> WeaponTaxonomy {
        WeaponTaxonomy::from_groups(
            "test",
            vec![
                WeaponGroup {
                    nation: "germany".to_string(),
                    faction: Faction::Axis,
                    infantry: vec!["Kar98k".to_string(), "MP40".to_string()],
                    vehicles: vec!["Panzer IV".to_string()],
                },
                WeaponGroup {
                    nation: "united_states".to_string(),
                    faction: Faction::Allies,
                    infantry: vec!["M1Garand".to_string(), "Thompson".to_string()],
                    vehicles: vec!["Sherman".to_string()],
                },
            ],
        )
        .unwrap()
    }

    fn usage(entries: &[(&str, u32)]) -> WeaponUsage {
        entries.iter().map(|(w, c)| (*w, *c)).collect()
    }

    fn legacy() -> ClassifierConfig {
        ClassifierConfig {
            zero_kills: ZeroKillPolicy::Legacy,
            ..Default::default()
        }
    }

    #[test]
    fn test_axis_dominance() {
        let t = test_taxonomy();
        let label = classify(10, &usage(&[("Kar98k", 9), ("M1Garand", 1)]), &t);
        assert_eq!(label, TeamLabel::Axis);
    }

    #[test]
    fn test_allies_dominance() {
        let t = test_taxonomy();
        let label = classify(10, &usage(&[("Kar98k", 1), ("M1Garand", 9)]), &t);
        assert_eq!(label, TeamLabel::Allies);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let t = test_taxonomy();
        assert_eq!(
            classify(10, &usage(&[("Kar98k", 8), ("M1Garand", 2)]), &t),
            TeamLabel::Axis
        );
        assert_eq!(
            classify(10, &usage(&[("Kar98k", 2), ("M1Garand", 8)]), &t),
            TeamLabel::Allies
        );
    }

    #[test]
    fn test_dominance_summed_across_weapons() {
        let t = test_taxonomy();
        let label = classify(
            10,
            &usage(&[("MP40", 3), ("Kar98k", 3), ("Panzer IV", 2), ("Thompson", 2)]),
            &t,
        );
        assert_eq!(label, TeamLabel::Axis);
    }

    #[test]
    fn test_single_weapon_dominance_for_any_total() {
        let t = test_taxonomy();
        for total in 1..=50u32 {
            let needed = (f64::from(total) * 0.8).ceil() as u32;
            for count in needed..=total {
                let rest = total - count;
                let u = usage(&[("Thompson", count), ("Kar98k", rest)]);
                assert_eq!(
                    classify(total, &u, &t),
                    TeamLabel::Allies,
                    "total={} count={}",
                    total,
                    count
                );
            }
        }
    }

    #[test]
    fn test_mixed() {
        let t = test_taxonomy();
        let label = classify(10, &usage(&[("M1Garand", 5), ("Kar98k", 5)]), &t);
        assert_eq!(label, TeamLabel::Mixed);
    }

    #[test]
    fn test_all_unrecognized_is_unknown() {
        let t = test_taxonomy();
        let label = classify(10, &usage(&[("UnknownGadget", 10)]), &t);
        assert_eq!(label, TeamLabel::Unknown);
    }

    #[test]
    fn test_one_side_below_threshold_is_unknown() {
        let t = test_taxonomy();
        let label = classify(10, &usage(&[("Kar98k", 7), ("UnknownGadget", 3)]), &t);
        assert_eq!(label, TeamLabel::Unknown);
    }

    #[test]
    fn test_unlisted_kills_dilute_the_threshold() {
        // 6 of 10 kills have no weapon entry, so neither side reaches 8.
        let t = test_taxonomy();
        let label = classify(10, &usage(&[("Kar98k", 3), ("M1Garand", 1)]), &t);
        assert_eq!(label, TeamLabel::Mixed);
    }

    #[test]
    fn test_zero_kills_empty_usage_is_unknown() {
        let t = test_taxonomy();
        let empty = WeaponUsage::new();
        assert_eq!(classify(0, &empty, &t), TeamLabel::Unknown);
        assert_eq!(classify_with(0, &empty, &t, &legacy()), TeamLabel::Unknown);
    }

    #[test]
    fn test_zero_kills_with_entries_is_unknown_by_default() {
        let t = test_taxonomy();
        assert_eq!(classify(0, &usage(&[("Kar98k", 0)]), &t), TeamLabel::Unknown);
        assert_eq!(
            classify(0, &usage(&[("M1Garand", 0)]), &t),
            TeamLabel::Unknown
        );
    }

    #[test]
    fn test_zero_kills_legacy_quirk() {
        let t = test_taxonomy();
        let config = legacy();

        assert_eq!(
            classify_with(0, &usage(&[("Kar98k", 0)]), &t, &config),
            TeamLabel::Axis
        );
        // Axis is checked first and 0 >= 0, even for an Allied or unknown weapon.
        assert_eq!(
            classify_with(0, &usage(&[("M1Garand", 0)]), &t, &config),
            TeamLabel::Axis
        );
        assert_eq!(
            classify_with(0, &usage(&[("UnknownGadget", 0)]), &t, &config),
            TeamLabel::Axis
        );
    }

    #[test]
    fn test_legacy_policy_matches_default_for_nonzero_kills() {
        let t = test_taxonomy();
        let u = usage(&[("M1Garand", 5), ("Kar98k", 5)]);
        assert_eq!(classify_with(10, &u, &t, &legacy()), classify(10, &u, &t));
    }

    #[test]
    fn test_tie_break_follows_insertion_order() {
        let t = test_taxonomy();

        // Threshold is 3.2, so whichever equal-count weapon comes first wins.
        let allies_first = usage(&[("M1Garand", 4), ("Kar98k", 4)]);
        let axis_first = usage(&[("Kar98k", 4), ("M1Garand", 4)]);

        assert_eq!(classify(4, &allies_first, &t), TeamLabel::Allies);
        assert_eq!(classify(4, &axis_first, &t), TeamLabel::Axis);
    }

    #[test]
    fn test_tie_break_not_alphabetical() {
        let t = test_taxonomy();
        // "Thompson" sorts after "MP40"; insertion order must still win.
        let u = usage(&[("UnknownGadget", 1), ("Thompson", 3), ("MP40", 3)]);
        assert_eq!(classify(3, &u, &t), TeamLabel::Allies);
    }

    #[test]
    fn test_highest_count_processed_first() {
        let t = test_taxonomy();
        // Axis listed first, but the larger Allied entry is processed first.
        let u = usage(&[("Kar98k", 4), ("M1Garand", 5)]);
        assert_eq!(classify(5, &u, &t), TeamLabel::Allies);
    }

    #[test]
    fn test_deterministic() {
        let t = test_taxonomy();
        let u = usage(&[("Thompson", 2), ("Kar98k", 2), ("Sherman", 2), ("MP40", 2)]);
        let first = classify(8, &u, &t);
        for _ in 0..10 {
            assert_eq!(classify(8, &u, &t), first);
        }
    }

    #[test]
    fn test_custom_threshold_ratio() {
        let t = test_taxonomy();
        let config = ClassifierConfig {
            threshold_ratio: 0.5,
            ..Default::default()
        };
        let u = usage(&[("Kar98k", 5), ("M1Garand", 5)]);
        assert_eq!(classify_with(10, &u, &t, &config), TeamLabel::Axis);
    }

    #[test]
    fn test_builtin_taxonomy_classification() {
        let t = WeaponTaxonomy::builtin().unwrap();
        let u = usage(&[("PPSH 41", 12), ("MOSIN NAGANT 91/30", 6), ("MP40", 2)]);
        assert_eq!(classify(20, &u, &t), TeamLabel::Allies);
    }

    #[test]
    fn test_classifier_match() {
        let classifier = Classifier::new(Arc::new(test_taxonomy()), ClassifierConfig::default());
        let stats = MatchStats {
            match_id: Some("m-42".to_string()),
            players: vec![
                PlayerStats::new(
                    "p1",
                    PlayerKillRecord::new(10, usage(&[("Kar98k", 9), ("M1Garand", 1)])),
                ),
                PlayerStats::new(
                    "p2",
                    PlayerKillRecord::new(10, usage(&[("M1Garand", 5), ("Kar98k", 5)])),
                ),
                PlayerStats::new("p3", PlayerKillRecord::default()).with_name("Spectator"),
                PlayerStats::new("p4", PlayerKillRecord::new(4, usage(&[("Sherman", 4)]))),
            ],
        };

        let result = classifier.classify_match(&stats);

        assert_eq!(result.match_id.as_deref(), Some("m-42"));
        assert_eq!(result.taxonomy_version, "test");
        let teams: Vec<(&str, TeamLabel)> = result
            .players
            .iter()
            .map(|p| (p.player.player_id.as_str(), p.team))
            .collect();
        assert_eq!(
            teams,
            vec![
                ("p1", TeamLabel::Axis),
                ("p2", TeamLabel::Mixed),
                ("p3", TeamLabel::Unknown),
                ("p4", TeamLabel::Allies),
            ]
        );
        assert_eq!(
            result.summary,
            TeamSummary {
                axis: 1,
                allies: 1,
                mixed: 1,
                unknown: 1,
            }
        );
        // Source statistics are carried through untouched.
        assert_eq!(result.players[2].player, stats.players[2]);
    }

    #[test]
    fn test_classifier_shared_across_threads() {
        let classifier = Classifier::new(Arc::new(test_taxonomy()), ClassifierConfig::default());
        let record = PlayerKillRecord::new(10, usage(&[("Thompson", 9), ("MP40", 1)]));

        let labels: Vec<TeamLabel> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| classifier.classify(&record)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(labels.iter().all(|l| *l == TeamLabel::Allies));
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: ClassifierConfig = toml::from_str("").unwrap();
        assert_eq!(config, ClassifierConfig::default());

        let config: ClassifierConfig = toml::from_str("zero_kills = \"legacy\"").unwrap();
        assert_eq!(config.zero_kills, ZeroKillPolicy::Legacy);
        assert_eq!(config.threshold_ratio, DEFAULT_THRESHOLD_RATIO);
    }
}

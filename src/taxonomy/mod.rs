//! Weapon taxonomy: which faction each in-game weapon belongs to.
//!
//! The table is versioned TOML, either the built-in copy compiled into the
//! binary or a file named in the configuration. New game content only needs
//! a table update. Weapons are grouped by nation and split into infantry and
//! vehicle armament; classification only looks at the flattened
//! weapon-to-faction index.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::Faction;

const BUILTIN_TAXONOMY: &str = include_str!("builtin.toml");

/// Errors raised while loading a taxonomy table.
#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("Failed to read taxonomy file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse taxonomy: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Weapon '{weapon}' is listed as {first} and as {second}")]
    ConflictingFaction {
        weapon: String,
        first: Faction,
        second: Faction,
    },

    #[error("Group '{0}' contains an empty weapon identifier")]
    EmptyWeapon(String),

    #[error("Taxonomy version must not be empty")]
    MissingVersion,

    #[error("Taxonomy contains no weapons")]
    Empty,
}

/// Infantry weapon or vehicle armament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponKind {
    Infantry,
    Vehicle,
}

/// One nation's weapons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponGroup {
    pub nation: String,
    pub faction: Faction,
    #[serde(default)]
    pub infantry: Vec<String>,
    #[serde(default)]
    pub vehicles: Vec<String>,
}

impl WeaponGroup {
    fn weapons(&self) -> impl Iterator<Item = (&str, WeaponKind)> {
        self.infantry
            .iter()
            .map(|w| (w.as_str(), WeaponKind::Infantry))
            .chain(
                self.vehicles
                    .iter()
                    .map(|w| (w.as_str(), WeaponKind::Vehicle)),
            )
    }
}

/// What the taxonomy knows about one weapon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeaponEntry {
    pub faction: Faction,
    /// First group listing the weapon
    pub nation: String,
    pub kind: WeaponKind,
}

#[derive(Debug, Deserialize)]
struct TaxonomyFile {
    version: String,
    #[serde(default)]
    groups: Vec<WeaponGroup>,
}

/// Versioned weapon-to-faction lookup table. Immutable once built.
#[derive(Debug, Clone)]
pub struct WeaponTaxonomy {
    version: String,
    groups: Vec<WeaponGroup>,
    index: HashMap<String, WeaponEntry>,
}

impl WeaponTaxonomy {
    /// Build a taxonomy from weapon groups.
    ///
    /// Fails if any weapon is claimed by both factions.
    pub fn from_groups(
        version: impl Into<String>,
        groups: Vec<WeaponGroup>,
    ) -> Result<Self, TaxonomyError> {
        let version = version.into();
        if version.trim().is_empty() {
            return Err(TaxonomyError::MissingVersion);
        }

        let mut index: HashMap<String, WeaponEntry> = HashMap::new();
        for group in &groups {
            for (weapon, kind) in group.weapons() {
                if weapon.trim().is_empty() {
                    return Err(TaxonomyError::EmptyWeapon(group.nation.clone()));
                }
                match index.get(weapon) {
                    Some(existing) if existing.faction != group.faction => {
                        return Err(TaxonomyError::ConflictingFaction {
                            weapon: weapon.to_string(),
                            first: existing.faction,
                            second: group.faction,
                        });
                    }
                    Some(_) => {}
                    None => {
                        index.insert(
                            weapon.to_string(),
                            WeaponEntry {
                                faction: group.faction,
                                nation: group.nation.clone(),
                                kind,
                            },
                        );
                    }
                }
            }
        }

        if index.is_empty() {
            return Err(TaxonomyError::Empty);
        }

        debug!(
            "Indexed {} weapons from {} groups (taxonomy {})",
            index.len(),
            groups.len(),
            version
        );

        Ok(Self {
            version,
            groups,
            index,
        })
    }

    /// Parse a taxonomy from TOML.
    pub fn from_toml_str(contents: &str) -> Result<Self, TaxonomyError> {
        let file: TaxonomyFile = toml::from_str(contents)?;
        Self::from_groups(file.version, file.groups)
    }

    /// Load a taxonomy from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, TaxonomyError> {
        let contents = std::fs::read_to_string(path)?;
        let taxonomy = Self::from_toml_str(&contents)?;
        info!(
            "Loaded weapon taxonomy {} from {:?} ({} weapons)",
            taxonomy.version,
            path,
            taxonomy.len()
        );
        Ok(taxonomy)
    }

    /// The table shipped with the crate.
    pub fn builtin() -> Result<Self, TaxonomyError> {
        Self::from_toml_str(BUILTIN_TAXONOMY)
    }

    /// Load from `path` if given, otherwise fall back to the built-in table.
    pub fn load(path: Option<&Path>) -> Result<Self, TaxonomyError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let taxonomy = Self::builtin()?;
                info!(
                    "Using built-in weapon taxonomy {} ({} weapons)",
                    taxonomy.version,
                    taxonomy.len()
                );
                Ok(taxonomy)
            }
        }
    }

    /// Faction of a weapon, or `None` if the weapon is unrecognized.
    ///
    /// Identifiers match exactly, including case.
    pub fn faction_of(&self, weapon: &str) -> Option<Faction> {
        self.index.get(weapon).map(|entry| entry.faction)
    }

    /// Full entry for a weapon.
    pub fn lookup(&self, weapon: &str) -> Option<&WeaponEntry> {
        self.index.get(weapon)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn groups(&self) -> &[WeaponGroup] {
        &self.groups
    }

    /// Number of distinct weapons.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of distinct weapons belonging to `faction`.
    pub fn count(&self, faction: Faction) -> usize {
        self.index.values().filter(|e| e.faction == faction).count()
    }
}

//! Per-player weapon kill counts.

use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Kill count per weapon identifier for one player in one match.
///
/// Entries keep insertion order, which breaks ties between equally
/// used weapons during classification. Serialized as a JSON object whose
/// key order is the insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeaponUsage {
    entries: Vec<(String, u32)>,
    /// Weapon -> index into `entries`
    positions: HashMap<String, usize>,
}

impl WeaponUsage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `count` kills for `weapon`.
    ///
    /// A weapon already present keeps its position and takes the new count.
    pub fn insert(&mut self, weapon: impl Into<String>, count: u32) {
        let weapon = weapon.into();
        match self.positions.get(&weapon) {
            Some(&idx) => self.entries[idx].1 = count,
            None => {
                self.positions.insert(weapon.clone(), self.entries.len());
                self.entries.push((weapon, count));
            }
        }
    }

    /// Kill count for a weapon, if recorded.
    pub fn get(&self, weapon: &str) -> Option<u32> {
        self.positions.get(weapon).map(|&idx| self.entries[idx].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(w, c)| (w.as_str(), *c))
    }

    /// Sum of all recorded kills.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, c)| u64::from(*c)).sum()
    }

    /// Entries ordered by kill count, highest first.
    ///
    /// Equal counts stay in insertion order.
    pub fn by_count_desc(&self) -> Vec<(&str, u32)> {
        let mut sorted: Vec<(&str, u32)> = self.iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted
    }
}

impl<W: Into<String>> FromIterator<(W, u32)> for WeaponUsage {
    fn from_iter<I: IntoIterator<Item = (W, u32)>>(iter: I) -> Self {
        let mut usage = WeaponUsage::new();
        for (weapon, count) in iter {
            usage.insert(weapon, count);
        }
        usage
    }
}

impl Serialize for WeaponUsage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (weapon, count) in &self.entries {
            map.serialize_entry(weapon, count)?;
        }
        map.end()
    }
}

struct WeaponUsageVisitor;

impl<'de> Visitor<'de> for WeaponUsageVisitor {
    type Value = WeaponUsage;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of weapon names to non-negative kill counts")
    }

    fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let capacity = access.size_hint().unwrap_or(0);
        let mut usage = WeaponUsage {
            entries: Vec::with_capacity(capacity),
            positions: HashMap::with_capacity(capacity),
        };
        while let Some((weapon, count)) = access.next_entry::<String, u32>()? {
            usage.insert(weapon, count);
        }
        Ok(usage)
    }
}

// Reads entries straight from the map so document order survives.
impl<'de> Deserialize<'de> for WeaponUsage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(WeaponUsageVisitor)
    }
}

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Score used for every trait the estimator could not supply.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Prefix under which trait scores appear as node attributes.
pub const TRAIT_ATTR_PREFIX: &str = "trait_";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum BigFive {
    Openness,
    Conscientiousness,
    Extraversion,
    Agreeableness,
    Neuroticism,
}

impl BigFive {
    pub const ALL: [BigFive; 5] = [
        BigFive::Openness,
        BigFive::Conscientiousness,
        BigFive::Extraversion,
        BigFive::Agreeableness,
        BigFive::Neuroticism,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BigFive::Openness => "openness",
            BigFive::Conscientiousness => "conscientiousness",
            BigFive::Extraversion => "extraversion",
            BigFive::Agreeableness => "agreeableness",
            BigFive::Neuroticism => "neuroticism",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        BigFive::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for BigFive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered `(trait name, score)` list stored on an entity node.
///
/// Names are normalised to lowercase. Setting an existing trait overwrites its
/// score in place, so insertion order is stable across repeated merges.
/// Scores are clamped to `[0, 1]`; non-finite scores are rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraitProfile {
    scores: Vec<(String, f64)>,
}

impl TraitProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// All five Big Five traits at [`NEUTRAL_SCORE`].
    pub fn neutral() -> Self {
        let mut profile = Self::new();
        profile.fill_missing(NEUTRAL_SCORE);
        profile
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut profile = Self::new();
        for (name, score) in pairs {
            profile.set(name.as_ref(), score);
        }
        profile
    }

    /// Returns false when the score was rejected.
    pub fn set(&mut self, name: &str, score: f64) -> bool {
        if !score.is_finite() {
            return false;
        }
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return false;
        }
        let score = score.clamp(0.0, 1.0);
        match self.scores.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = score,
            None => self.scores.push((name, score)),
        }
        true
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        let name = name.trim().to_lowercase();
        self.scores.iter().find(|(n, _)| *n == name).map(|(_, s)| *s)
    }

    pub fn score(&self, t: BigFive) -> Option<f64> {
        self.get(t.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.scores.iter().map(|(n, s)| (n.as_str(), *s))
    }

    /// Adds any missing Big Five trait with `default`. Returns how many were added.
    pub fn fill_missing(&mut self, default: f64) -> usize {
        let mut filled = 0;
        for t in BigFive::ALL {
            if !self.contains(t.as_str()) {
                self.set(t.as_str(), default);
                filled += 1;
            }
        }
        filled
    }

    /// True when all five Big Five traits are present.
    pub fn is_complete(&self) -> bool {
        BigFive::ALL.iter().all(|t| self.contains(t.as_str()))
    }

    /// Overlays every score of `other` onto `self`.
    pub fn overlay(&mut self, other: &TraitProfile) {
        for (name, score) in other.iter() {
            self.set(name, score);
        }
    }

    /// Attribute view: `trait_<name>` → score.
    pub fn attributes(&self) -> Vec<(String, f64)> {
        self.iter()
            .map(|(n, s)| (format!("{TRAIT_ATTR_PREFIX}{n}"), s))
            .collect()
    }
}

impl Serialize for TraitProfile {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.scores.len()))?;
        for (name, score) in &self.scores {
            map.serialize_entry(name, score)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TraitProfile {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, f64>::deserialize(deserializer)?;
        // Canonical Big Five order first, then anything else alphabetically.
        let mut profile = TraitProfile::new();
        for t in BigFive::ALL {
            if let Some(score) = raw.get(t.as_str()) {
                profile.set(t.as_str(), *score);
            }
        }
        for (name, score) in &raw {
            if BigFive::parse(name).is_none() {
                profile.set(name, *score);
            }
        }
        Ok(profile)
    }
}

/// Entity id → trait profile, as produced by an estimator.
pub type TraitMap = BTreeMap<String, TraitProfile>;

/// `trait_openness` → `Openness`.
pub fn display_trait_name(name: &str) -> String {
    let bare = name.strip_prefix(TRAIT_ATTR_PREFIX).unwrap_or(name);
    let mut chars = bare.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

//! Parity profiles: resolution policies that mirror legacy conventions.
//!
//! A profile never changes the arithmetic of resolution. It only decides
//! which patch categories are considered, how equal-precedence candidates
//! are ordered, which side of a fall-back overlap wins, and how much
//! confidence a patched result carries. The concrete tables live in the
//! patch data file under `[profiles.<name>]`; the values below are the
//! fallbacks used when a file omits a profile.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::patch::{EvidenceGrade, PatchCategory};

/// Resolution policy selected per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParityProfile {
    /// Prefer the best-documented patch; flag conflicts.
    #[default]
    StrictHistory,
    /// Legacy convention of a widely used chart service.
    AstroCom,
    /// Legacy convention of a desktop astrology package.
    Clairvision,
}

impl ParityProfile {
    pub const ALL: [ParityProfile; 3] = [Self::StrictHistory, Self::AstroCom, Self::Clairvision];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StrictHistory => "strict_history",
            Self::AstroCom => "astro_com",
            Self::Clairvision => "clairvision",
        }
    }
}

impl Display for ParityProfile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParityProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| format!("unknown parity profile '{s}'"))
    }
}

/// Which offset wins when a local time occurs twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapChoice {
    /// The first occurrence (pre-transition offset, usually DST).
    Earlier,
    /// The second occurrence (post-transition offset).
    Later,
}

/// How candidates with equal precedence are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Better evidence first, then the common ordering.
    Evidence,
    /// Narrowest validity range, then id.
    Narrowest,
}

/// Per-profile policy table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileRules {
    #[serde(default)]
    pub suppressed_categories: Vec<PatchCategory>,
    /// Patches below this grade are ignored by the profile.
    #[serde(default = "default_min_evidence")]
    pub min_evidence: EvidenceGrade,
    pub overlap: OverlapChoice,
    pub tie_break: TieBreak,
    /// Confidence of a result produced by a patch.
    pub patched_confidence: f64,
}

fn default_min_evidence() -> EvidenceGrade {
    EvidenceGrade::Inferred
}

impl ProfileRules {
    /// Built-in table for a profile.
    pub fn default_for(profile: ParityProfile) -> Self {
        match profile {
            ParityProfile::StrictHistory => Self {
                suppressed_categories: Vec::new(),
                min_evidence: EvidenceGrade::Inferred,
                overlap: OverlapChoice::Earlier,
                tie_break: TieBreak::Evidence,
                patched_confidence: 0.85,
            },
            ParityProfile::AstroCom => Self {
                suppressed_categories: vec![PatchCategory::LocalMeanTime],
                min_evidence: EvidenceGrade::Reported,
                overlap: OverlapChoice::Earlier,
                tie_break: TieBreak::Narrowest,
                patched_confidence: 0.8,
            },
            ParityProfile::Clairvision => Self {
                suppressed_categories: vec![PatchCategory::RegionalDeviation],
                min_evidence: EvidenceGrade::Reported,
                overlap: OverlapChoice::Later,
                tie_break: TieBreak::Narrowest,
                patched_confidence: 0.75,
            },
        }
    }

    pub fn suppresses(&self, category: PatchCategory) -> bool {
        self.suppressed_categories.contains(&category)
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if !(self.patched_confidence > 0.0 && self.patched_confidence <= 1.0) {
            return Err("patched_confidence must be in (0, 1]");
        }
        Ok(())
    }
}

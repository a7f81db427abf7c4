//! The Zone-Patch Database.
//!
//! Loaded once, validated, sorted, then shared read-only (typically behind
//! an `Arc`). Selection is a pure function of the request and the table:
//! the same inputs always pick the same patch regardless of file order.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::error::ResolveError;
use crate::patch::ZonePatch;
use crate::profile::{ParityProfile, ProfileRules, TieBreak};

const BUILTIN_PATCHES: &str = include_str!("../data/zone_patches.toml");

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PatchFile {
    #[serde(default)]
    patch: Vec<ZonePatch>,
    #[serde(default)]
    profiles: HashMap<String, ProfileRules>,
}

/// What the resolver knows when it asks for patches.
#[derive(Debug, Clone, Copy)]
pub struct PatchQuery {
    pub lat: f64,
    pub lon: f64,
    /// Wall-clock reading being resolved.
    pub local: NaiveDateTime,
    /// Current UTC estimate (nominal on the first pass).
    pub utc_estimate: DateTime<Utc>,
    /// Nominal zone's DST at the estimate, for `follow_nominal` patches.
    pub nominal_dst_seconds: i32,
}

impl PatchQuery {
    /// Whether `patch` could cover this reading under either the current
    /// estimate or its own offset.
    fn admits(&self, patch: &ZonePatch) -> bool {
        if !patch.region.contains(self.lat, self.lon) {
            return false;
        }
        if patch.is_valid_at(self.utc_estimate) {
            return true;
        }
        let own = patch
            .offset
            .total_seconds(self.nominal_dst_seconds, self.utc_estimate);
        patch.is_valid_at(self.local.and_utc() - Duration::seconds(i64::from(own)))
    }
}

/// Outcome of patch selection for one query under one profile.
#[derive(Debug, Clone, Default)]
pub struct PatchSelection<'a> {
    pub winner: Option<&'a ZonePatch>,
    /// Equal-precedence candidates whose offset disagrees with the winner.
    pub conflicts: Vec<&'a ZonePatch>,
    /// Candidates the profile filtered out.
    pub suppressed: Vec<&'a ZonePatch>,
}

/// Immutable, validated collection of zone patches plus profile tables.
#[derive(Debug, Clone)]
pub struct PatchDatabase {
    patches: Vec<ZonePatch>,
    profiles: HashMap<ParityProfile, ProfileRules>,
}

impl PatchDatabase {
    /// The patch table compiled into the crate.
    pub fn builtin() -> Result<Self, ResolveError> {
        Self::from_toml_str(BUILTIN_PATCHES)
    }

    /// Load a patch file from disk.
    pub fn load(path: &Path) -> Result<Self, ResolveError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ResolveError> {
        let file: PatchFile = toml::from_str(content)?;

        let mut profiles: HashMap<ParityProfile, ProfileRules> = ParityProfile::ALL
            .into_iter()
            .map(|p| (p, ProfileRules::default_for(p)))
            .collect();
        for (name, rules) in file.profiles {
            let profile = name
                .parse::<ParityProfile>()
                .map_err(ResolveError::ZoneData)?;
            rules
                .validate()
                .map_err(|e| ResolveError::ZoneData(format!("profile {name}: {e}")))?;
            profiles.insert(profile, rules);
        }

        Self::new(file.patch, profiles)
    }

    /// Build from already-parsed patches. Ids must be unique.
    pub fn new(
        mut patches: Vec<ZonePatch>,
        profiles: HashMap<ParityProfile, ProfileRules>,
    ) -> Result<Self, ResolveError> {
        for patch in &patches {
            patch.validate().map_err(ResolveError::ZoneData)?;
        }
        let mut seen = HashSet::new();
        if let Some(dup) = patches.iter().find(|p| !seen.insert(p.id.as_str())) {
            return Err(ResolveError::ZoneData(format!("duplicate patch id {}", dup.id)));
        }
        patches.sort_by(|a, b| {
            b.precedence
                .cmp(&a.precedence)
                .then(a.range_seconds().cmp(&b.range_seconds()))
                .then(a.id.cmp(&b.id))
        });
        Ok(Self { patches, profiles })
    }

    /// Patches in precedence order.
    pub fn patches(&self) -> &[ZonePatch] {
        &self.patches
    }

    pub fn get(&self, id: &str) -> Option<&ZonePatch> {
        self.patches.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Policy table for a profile (file override or built-in default).
    pub fn rules(&self, profile: ParityProfile) -> ProfileRules {
        self.profiles
            .get(&profile)
            .cloned()
            .unwrap_or_else(|| ProfileRules::default_for(profile))
    }

    /// Pick the patch that governs `query` under `profile`, if any.
    pub fn select(&self, query: &PatchQuery, profile: ParityProfile) -> PatchSelection<'_> {
        let rules = self.rules(profile);
        let mut selection = PatchSelection::default();
        let mut admitted: Vec<&ZonePatch> = Vec::new();

        for patch in self.patches.iter().filter(|p| query.admits(p)) {
            if rules.suppresses(patch.category) || patch.evidence < rules.min_evidence {
                selection.suppressed.push(patch);
            } else {
                admitted.push(patch);
            }
        }

        let Some(top) = admitted.first().map(|p| p.precedence) else {
            return selection;
        };
        let tier: Vec<&ZonePatch> = admitted
            .into_iter()
            .take_while(|p| p.precedence == top)
            .collect();

        let winner = match rules.tie_break {
            // max_by_key keeps the last maximum; reverse so the earliest wins.
            TieBreak::Evidence => tier.iter().rev().max_by_key(|p| p.evidence).copied(),
            TieBreak::Narrowest => tier.first().copied(),
        };
        if let Some(w) = winner {
            let offset_of =
                |p: &ZonePatch| p.offset.total_seconds(query.nominal_dst_seconds, query.utc_estimate);
            let offset = offset_of(w);
            selection.conflicts = tier
                .iter()
                .filter(|p| p.id != w.id && offset_of(p) != offset)
                .copied()
                .collect();
        }
        selection.winner = winner;
        selection
    }
}

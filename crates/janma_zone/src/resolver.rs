//! The Time Resolver: (local datetime, place, profile) → UTC instant.
//!
//! Steps:
//! 1. validate coordinates (before any lookup);
//! 2. find the nominal IANA zone and its offset(s) for the wall-clock reading;
//! 3. ask the patch database for a governing patch, re-checking at most
//!    twice against the refined UTC estimate;
//! 4. score confidence and record provenance.
//!
//! Nominal resolution always succeeds, so a missing patch is never an error.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::{OffsetComponents, Tz, TzOffset};
use tracing::{debug, info};

use crate::db::{PatchDatabase, PatchQuery, PatchSelection};
use crate::error::ResolveError;
use crate::locator::{BoundaryLocator, LookupSource, ZoneLocator};
use crate::patch::{PatchDst, ZonePatch};
use crate::profile::{OverlapChoice, ParityProfile};
use crate::types::{CivilTimeRequest, Provenance, ResolutionMode, ResolvedTime, format_offset};

/// Patch applicability is re-checked at most this many times. Irregularities
/// last months or years, so an offset change can move the estimate across
/// a patch boundary at most once.
pub const MAX_PATCH_PASSES: usize = 2;

const NOMINAL_CONFIDENCE: f64 = 1.0;
/// Nautical zones say nothing about the clock a ship actually kept.
const NAUTICAL_CONFIDENCE: f64 = 0.6;
const GAP_PENALTY: f64 = 0.2;
const OVERLAP_PENALTY: f64 = 0.15;
const CONFLICT_CAP: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OffsetParts {
    total: i32,
    dst: i32,
}

impl OffsetParts {
    fn of(offset: &TzOffset) -> Self {
        Self {
            total: offset.fix().local_minus_utc(),
            dst: offset.dst_offset().num_seconds() as i32,
        }
    }
}

/// How a wall-clock reading maps onto a zone's offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NominalReading {
    Single(OffsetParts),
    /// Spring-forward: the reading never occurred.
    Gap { pre: OffsetParts, post: OffsetParts },
    /// Fall-back: the reading occurred twice.
    Overlap { earlier: OffsetParts, later: OffsetParts },
}

fn nominal_reading(tz: Tz, local: NaiveDateTime) -> NominalReading {
    match tz.from_local_datetime(&local) {
        chrono::LocalResult::Single(dt) => NominalReading::Single(OffsetParts::of(dt.offset())),
        chrono::LocalResult::Ambiguous(a, b) => {
            let (first, second) = if a.naive_utc() <= b.naive_utc() { (a, b) } else { (b, a) };
            NominalReading::Overlap {
                earlier: OffsetParts::of(first.offset()),
                later: OffsetParts::of(second.offset()),
            }
        }
        chrono::LocalResult::None => {
            let day_before = local.checked_sub_signed(Duration::days(1)).unwrap_or(local);
            let pre = OffsetParts::of(&tz.offset_from_utc_datetime(&day_before));
            let shifted = local
                .checked_sub_signed(Duration::seconds(i64::from(pre.total)))
                .unwrap_or(local);
            let post = OffsetParts::of(&tz.offset_from_utc_datetime(&shifted));
            NominalReading::Gap { pre, post }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    None,
    Gap,
    Overlap(OverlapChoice),
}

fn to_utc(local: NaiveDateTime, offset_seconds: i32) -> Result<DateTime<Utc>, ResolveError> {
    local
        .checked_sub_signed(Duration::seconds(i64::from(offset_seconds)))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ResolveError::UnresolvableTime(format!("{local} is outside the supported range")))
}

/// Converts civil readings into UTC instants. Cheap to clone; all state is shared.
#[derive(Debug, Clone)]
pub struct TimeResolver {
    patches: Arc<PatchDatabase>,
    locator: Arc<dyn ZoneLocator>,
}

impl TimeResolver {
    pub fn new(patches: Arc<PatchDatabase>, locator: Arc<dyn ZoneLocator>) -> Self {
        Self { patches, locator }
    }

    /// Built-in patch table and the shared boundary locator.
    pub fn builtin() -> Result<Self, ResolveError> {
        Ok(Self::new(
            Arc::new(PatchDatabase::builtin()?),
            BoundaryLocator::shared(),
        ))
    }

    pub fn patches(&self) -> &PatchDatabase {
        &self.patches
    }

    pub fn locator(&self) -> &dyn ZoneLocator {
        self.locator.as_ref()
    }

    /// Parse-and-resolve convenience.
    pub fn resolve_str(
        &self,
        local_datetime: &str,
        latitude: f64,
        longitude: f64,
        profile: ParityProfile,
    ) -> Result<ResolvedTime, ResolveError> {
        let request = CivilTimeRequest::parse(local_datetime, latitude, longitude, profile)?;
        self.resolve(&request)
    }

    pub fn resolve(&self, request: &CivilTimeRequest) -> Result<ResolvedTime, ResolveError> {
        request.validate()?;
        let CivilTimeRequest {
            local_datetime: local,
            latitude: lat,
            longitude: lon,
            parity_profile: profile,
        } = *request;

        let lookup = self.locator.locate(lat, lon);
        let tz = lookup.zone;
        let rules = self.patches.rules(profile);

        let (nominal, nominal_transition) = match nominal_reading(tz, local) {
            NominalReading::Single(p) => (p, Transition::None),
            NominalReading::Gap { post, .. } => (post, Transition::Gap),
            NominalReading::Overlap { earlier, later } => match rules.overlap {
                OverlapChoice::Earlier => (earlier, Transition::Overlap(OverlapChoice::Earlier)),
                OverlapChoice::Later => (later, Transition::Overlap(OverlapChoice::Later)),
            },
        };
        debug!(
            zone = tz.name(),
            offset = nominal.total,
            dst = nominal.dst,
            %local,
            "nominal offset"
        );

        let mut estimate = to_utc(local, nominal.total)?;
        let mut offset = nominal;
        let mut selection = PatchSelection::default();
        for pass in 1..=MAX_PATCH_PASSES {
            let nominal_dst = if pass == 1 {
                nominal.dst
            } else {
                OffsetParts::of(&tz.offset_from_utc_datetime(&estimate.naive_utc())).dst
            };
            let query = PatchQuery {
                lat,
                lon,
                local,
                utc_estimate: estimate,
                nominal_dst_seconds: nominal_dst,
            };
            selection = self.patches.select(&query, profile);
            let next = match selection.winner {
                Some(patch) => OffsetParts {
                    total: patch.offset.total_seconds(nominal_dst, estimate),
                    dst: patch.offset.dst_seconds(nominal_dst, estimate),
                },
                None => nominal,
            };
            let next_estimate = to_utc(local, next.total)?;
            offset = next;
            if next_estimate == estimate {
                break;
            }
            estimate = next_estimate;
        }
        let utc = estimate;

        let winner: Option<&ZonePatch> = selection.winner;
        let transition = match winner {
            Some(p) if p.offset.dst != PatchDst::FollowNominal => Transition::None,
            _ => nominal_transition,
        };

        let mut reasons = Vec::new();
        match (winner, lookup.source) {
            (Some(p), _) => {
                info!(patch = %p.id, zone = tz.name(), offset = offset.total, "zone patch applied");
                reasons.push(format!(
                    "patch {} ({}) overrides {} with {}",
                    p.id,
                    p.name,
                    tz.name(),
                    format_offset(offset.total)
                ));
            }
            (None, LookupSource::Boundary) => reasons.push(format!(
                "nominal rules of {} give {}",
                tz.name(),
                format_offset(offset.total)
            )),
            (None, LookupSource::Nautical) => reasons.push(format!(
                "no land zone at this point; nautical zone {} gives {}",
                tz.name(),
                format_offset(offset.total)
            )),
        }

        let mut confidence = match (winner, lookup.source) {
            (Some(_), _) => rules.patched_confidence,
            (None, LookupSource::Boundary) => NOMINAL_CONFIDENCE,
            (None, LookupSource::Nautical) => NAUTICAL_CONFIDENCE,
        };
        match transition {
            Transition::None => {}
            Transition::Gap => {
                confidence -= GAP_PENALTY;
                reasons.push(format!(
                    "local time falls in a spring-forward gap; post-transition offset {} used",
                    format_offset(offset.total)
                ));
            }
            Transition::Overlap(choice) => {
                confidence -= OVERLAP_PENALTY;
                let which = match choice {
                    OverlapChoice::Earlier => "earlier",
                    OverlapChoice::Later => "later",
                };
                reasons.push(format!(
                    "local time is ambiguous in a fall-back overlap; {which} occurrence chosen by {profile} profile"
                ));
            }
        }
        if !selection.conflicts.is_empty() {
            confidence = confidence.min(CONFLICT_CAP);
            let ids: Vec<&str> = selection.conflicts.iter().map(|p| p.id.as_str()).collect();
            reasons.push(format!(
                "equal-precedence patches disagree: {}",
                ids.join(", ")
            ));
        }
        if !selection.suppressed.is_empty() {
            let ids: Vec<&str> = selection.suppressed.iter().map(|p| p.id.as_str()).collect();
            reasons.push(format!("ignored by {profile} profile: {}", ids.join(", ")));
        }

        let resolution_mode = match (transition, winner) {
            (Transition::Overlap(_), _) => ResolutionMode::AmbiguousFallback,
            (_, Some(_)) => ResolutionMode::Patched,
            (_, None) => ResolutionMode::Nominal,
        };

        Ok(ResolvedTime {
            utc,
            zone_id: tz.name().to_string(),
            offset_seconds: offset.total,
            dst_active: offset.dst != 0,
            confidence: confidence.clamp(0.0, 1.0),
            reason: reasons.join("; "),
            provenance: Provenance {
                patches_applied: winner.map(|p| vec![p.id.clone()]).unwrap_or_default(),
                resolution_mode,
            },
        })
    }
}

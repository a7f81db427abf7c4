//! Zone patches: documented deviations from nominal time-zone rules.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::{OffsetComponents, Tz};
use serde::{Deserialize, Serialize};

use crate::region::Region;

/// Kind of historical irregularity a patch records.
///
/// Profiles suppress whole categories, so the category is part of the
/// patch's identity rather than a free-form tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchCategory {
    /// War-time clock changes kept by an installation or district.
    WarTime,
    /// A locality that kept a different standard than its surrounding zone.
    RegionalDeviation,
    /// Local mean time kept before standard time was adopted.
    LocalMeanTime,
    /// Double summer time or other stacked DST.
    DoubleSummerTime,
}

impl PatchCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WarTime => "war_time",
            Self::RegionalDeviation => "regional_deviation",
            Self::LocalMeanTime => "local_mean_time",
            Self::DoubleSummerTime => "double_summer_time",
        }
    }
}

/// How well a patch is attested. Ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceGrade {
    Inferred,
    Reported,
    Documented,
}

/// DST component of a patch offset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case", deny_unknown_fields)]
pub enum PatchDst {
    /// The patch offset is standard time all year.
    None,
    /// A fixed DST amount on top of the standard offset.
    Fixed { seconds: i32 },
    /// Whatever DST the nominal zone observes at that instant.
    FollowNominal,
    /// The DST another IANA zone observes at that instant.
    FollowZone { zone: String },
}

/// Offset a patch imposes in place of the nominal zone's.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchOffset {
    /// Standard offset east of UTC, seconds.
    pub std_seconds: i32,
    pub dst: PatchDst,
}

impl PatchOffset {
    /// DST seconds in effect at `utc`, given the nominal zone's DST there.
    pub fn dst_seconds(&self, nominal_dst_seconds: i32, utc: DateTime<Utc>) -> i32 {
        match &self.dst {
            PatchDst::None => 0,
            PatchDst::Fixed { seconds } => *seconds,
            PatchDst::FollowNominal => nominal_dst_seconds,
            PatchDst::FollowZone { zone } => zone
                .parse::<Tz>()
                .map(|tz| {
                    tz.offset_from_utc_datetime(&utc.naive_utc())
                        .dst_offset()
                        .num_seconds() as i32
                })
                .unwrap_or(0),
        }
    }

    /// Total UTC offset at `utc`, seconds east.
    pub fn total_seconds(&self, nominal_dst_seconds: i32, utc: DateTime<Utc>) -> i32 {
        self.std_seconds + self.dst_seconds(nominal_dst_seconds, utc)
    }
}

/// One documented irregularity, keyed by region and UTC validity range.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZonePatch {
    pub id: String,
    pub name: String,
    pub category: PatchCategory,
    pub evidence: EvidenceGrade,
    pub precedence: i32,
    /// Inclusive start of validity (UTC).
    pub valid_from: DateTime<Utc>,
    /// Exclusive end of validity (UTC).
    pub valid_to: DateTime<Utc>,
    pub region: Region,
    pub offset: PatchOffset,
    pub source: String,
}

/// Offsets beyond ±18 h are not civil time anywhere.
const MAX_OFFSET_SECONDS: i32 = 18 * 3600;

impl ZonePatch {
    pub fn is_valid_at(&self, utc: DateTime<Utc>) -> bool {
        self.valid_from <= utc && utc < self.valid_to
    }

    /// Length of the validity range in seconds; narrower patches sort first.
    pub fn range_seconds(&self) -> i64 {
        (self.valid_to - self.valid_from).num_seconds()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("patch id must not be empty".to_string());
        }
        if self.valid_from >= self.valid_to {
            return Err(format!("patch {}: valid_from must precede valid_to", self.id));
        }
        self.region
            .validate()
            .map_err(|e| format!("patch {}: {e}", self.id))?;
        if let PatchDst::FollowZone { zone } = &self.offset.dst {
            if zone.parse::<Tz>().is_err() {
                return Err(format!("patch {}: unknown zone {zone}", self.id));
            }
        }
        let dst = self.offset.dst_seconds(0, self.valid_from);
        if self.offset.std_seconds.abs() > MAX_OFFSET_SECONDS || dst.abs() > 3 * 3600 {
            return Err(format!("patch {}: offset out of range", self.id));
        }
        Ok(())
    }
}

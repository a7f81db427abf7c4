//! Kernel bundle selection.
//!
//! DE440 is the short-span, high-accuracy bundle; DE441 covers a much longer
//! span at slightly lower accuracy. `auto` uses DE440 where it applies.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EphemerisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KernelBundle {
    De440,
    De441,
}

impl KernelBundle {
    pub const fn name(self) -> &'static str {
        match self {
            Self::De440 => "de440",
            Self::De441 => "de441",
        }
    }

    /// Coverage as (first day, last day), inclusive start, exclusive end.
    pub fn coverage(self) -> (DateTime<Utc>, DateTime<Utc>) {
        match self {
            Self::De440 => (utc_day(1550, 1, 1), utc_day(2650, 1, 22)),
            Self::De441 => (utc_day(-13200, 8, 15), utc_day(17191, 3, 15)),
        }
    }

    pub fn covers(self, utc: DateTime<Utc>) -> bool {
        let (start, end) = self.coverage();
        start <= utc && utc < end
    }
}

impl Display for KernelBundle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn utc_day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Which bundle serves a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EphemerisPolicy {
    #[default]
    Auto,
    De440,
    De441,
}

impl EphemerisPolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::De440 => "de440",
            Self::De441 => "de441",
        }
    }

    /// Bundle for an instant, or `OutOfRange` when no allowed bundle covers it.
    pub fn bundle_for(self, utc: DateTime<Utc>) -> Result<KernelBundle, EphemerisError> {
        let pick = match self {
            Self::Auto if KernelBundle::De440.covers(utc) => KernelBundle::De440,
            Self::Auto | Self::De441 => KernelBundle::De441,
            Self::De440 => KernelBundle::De440,
        };
        if pick.covers(utc) {
            Ok(pick)
        } else {
            Err(EphemerisError::OutOfRange {
                utc,
                bundle: pick.name(),
            })
        }
    }

    /// Bundle a freshly started worker loads first.
    pub const fn primary_bundle(self) -> KernelBundle {
        match self {
            Self::Auto | Self::De440 => KernelBundle::De440,
            Self::De441 => KernelBundle::De441,
        }
    }

    /// DE440 coverage when the policy switches on it.
    pub fn de440_range(self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match self {
            Self::Auto => Some(KernelBundle::De440.coverage()),
            _ => None,
        }
    }
}

impl Display for EphemerisPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EphemerisPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "de440" => Ok(Self::De440),
            "de441" => Ok(Self::De441),
            other => Err(format!("unknown ephemeris policy '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn auto_prefers_de440_inside_range() {
        let t = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(EphemerisPolicy::Auto.bundle_for(t).unwrap(), KernelBundle::De440);
    }

    #[test]
    fn auto_falls_back_to_de441() {
        let t = Utc.with_ymd_and_hms(1500, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(EphemerisPolicy::Auto.bundle_for(t).unwrap(), KernelBundle::De441);
        let t = Utc.with_ymd_and_hms(2700, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(EphemerisPolicy::Auto.bundle_for(t).unwrap(), KernelBundle::De441);
    }

    #[test]
    fn de440_edges() {
        let (start, end) = KernelBundle::De440.coverage();
        assert!(KernelBundle::De440.covers(start));
        assert!(!KernelBundle::De440.covers(end));
    }

    #[test]
    fn pinned_de440_rejects_outside() {
        let t = Utc.with_ymd_and_hms(1400, 1, 1, 0, 0, 0).unwrap();
        assert!(matches!(
            EphemerisPolicy::De440.bundle_for(t),
            Err(EphemerisError::OutOfRange { bundle: "de440", .. })
        ));
    }

    #[test]
    fn parse_policy() {
        assert_eq!("AUTO".parse::<EphemerisPolicy>().unwrap(), EphemerisPolicy::Auto);
        assert!("de430".parse::<EphemerisPolicy>().is_err());
        assert!(EphemerisPolicy::Auto.de440_range().is_some());
        assert!(EphemerisPolicy::De441.de440_range().is_none());
    }
}

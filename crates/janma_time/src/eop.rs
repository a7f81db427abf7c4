//! IERS Earth Orientation Parameters: UT1 − UTC lookup.
//!
//! Parses the fixed-width finals2000A format (daily rows) and interpolates
//! DUT1 linearly between rows. Relevant columns (1-indexed):
//! - 8-15: Modified Julian Date
//! - 58: 'I' (final) or 'P' (prediction)
//! - 59-68: UT1 − UTC in seconds

use std::path::Path;

use crate::error::TimeError;
use crate::julian::{MJD_OFFSET, SECONDS_PER_DAY};

/// Daily (MJD, DUT1) table, sorted ascending by MJD.
#[derive(Debug, Clone)]
pub struct EopData {
    entries: Vec<(f64, f64)>,
}

impl EopData {
    /// Parse finals2000A text. Rows with a blank or unparseable DUT1 are skipped.
    pub fn parse_finals(content: &str) -> Result<Self, TimeError> {
        let mut entries: Vec<(f64, f64)> = content
            .lines()
            .filter(|line| line.len() >= 68)
            .filter_map(|line| {
                let mjd = line.get(7..15)?.trim().parse::<f64>().ok()?;
                let dut1 = line.get(58..68)?.trim().parse::<f64>().ok()?;
                Some((mjd, dut1))
            })
            .collect();

        if entries.is_empty() {
            return Err(TimeError::EopParse("no valid DUT1 entries found".to_string()));
        }
        entries.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// MJD range covered by the table: (first, last).
    pub fn range(&self) -> (f64, f64) {
        match (self.entries.first(), self.entries.last()) {
            (Some(first), Some(last)) => (first.0, last.0),
            _ => (f64::NAN, f64::NAN),
        }
    }

    /// DUT1 in seconds at an MJD, linearly interpolated.
    pub fn dut1_at_mjd(&self, mjd: f64) -> Result<f64, TimeError> {
        let (start, end) = self.range();
        if !(start..=end).contains(&mjd) {
            return Err(TimeError::EopOutOfRange);
        }

        let idx = self
            .entries
            .partition_point(|&(m, _)| m < mjd)
            .saturating_sub(1);
        let (m0, d0) = self.entries[idx];
        let Some(&(m1, d1)) = self.entries.get(idx + 1) else {
            return Ok(d0);
        };
        if (m1 - m0).abs() < 1e-12 {
            return Ok(d0);
        }
        let frac = ((mjd - m0) / (m1 - m0)).clamp(0.0, 1.0);
        Ok(d0 + frac * (d1 - d0))
    }

    /// UTC Julian Date → UT1 Julian Date.
    pub fn utc_to_ut1_jd(&self, jd_utc: f64) -> Result<f64, TimeError> {
        let dut1 = self.dut1_at_mjd(jd_utc - MJD_OFFSET)?;
        Ok(jd_utc + dut1 / SECONDS_PER_DAY)
    }
}

/// Loaded IERS EOP file.
#[derive(Debug, Clone)]
pub struct EopKernel {
    data: EopData,
}

impl EopKernel {
    /// Load a finals2000A file from disk.
    pub fn load(path: &Path) -> Result<Self, TimeError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, TimeError> {
        Ok(Self {
            data: EopData::parse_finals(content)?,
        })
    }

    pub fn data(&self) -> &EopData {
        &self.data
    }

    pub fn utc_to_ut1_jd(&self, jd_utc: f64) -> Result<f64, TimeError> {
        self.data.utc_to_ut1_jd(jd_utc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snippet(rows: &[(f64, f64)]) -> String {
        rows.iter()
            .map(|&(mjd, dut1)| {
                let mut line = vec![b' '; 70];
                line[7..15].copy_from_slice(format!("{mjd:8.2}").as_bytes());
                line[57] = b'I';
                line[58..68].copy_from_slice(format!("{dut1:10.7}").as_bytes());
                String::from_utf8(line).unwrap()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn sample() -> EopData {
        EopData::parse_finals(&snippet(&[
            (40587.0, 0.0361),
            (40588.0, 0.0352),
            (40589.0, 0.0343),
        ]))
        .unwrap()
    }

    #[test]
    fn parses_rows() {
        let data = sample();
        assert_eq!(data.len(), 3);
        let (start, end) = data.range();
        assert!((start - 40587.0).abs() < 0.01);
        assert!((end - 40589.0).abs() < 0.01);
    }

    #[test]
    fn interpolates_midpoint() {
        let dut1 = sample().dut1_at_mjd(40587.5).unwrap();
        assert!((dut1 - 0.03565).abs() < 1e-7, "dut1 = {dut1}");
    }

    #[test]
    fn exact_last_row() {
        let dut1 = sample().dut1_at_mjd(40589.0).unwrap();
        assert!((dut1 - 0.0343).abs() < 1e-9);
    }

    #[test]
    fn out_of_range() {
        assert_eq!(sample().dut1_at_mjd(40000.0), Err(TimeError::EopOutOfRange));
        assert_eq!(sample().dut1_at_mjd(40600.0), Err(TimeError::EopOutOfRange));
    }

    #[test]
    fn ut1_shift() {
        let jd = sample().utc_to_ut1_jd(2_440_587.5).unwrap();
        assert!(((jd - 2_440_587.5) * SECONDS_PER_DAY - 0.0361).abs() < 1e-5);
    }

    #[test]
    fn short_and_blank_lines_skipped() {
        let mut text = snippet(&[(40587.0, 0.0361)]);
        text.push_str("\nshort line\n");
        text.push_str(&" ".repeat(80));
        assert_eq!(EopData::parse_finals(&text).unwrap().len(), 1);
    }

    #[test]
    fn empty_is_error() {
        assert!(matches!(
            EopData::parse_finals(""),
            Err(TimeError::EopParse(_))
        ));
    }
}

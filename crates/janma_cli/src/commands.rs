//! Subcommand bodies. Each returns the text to print.

use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use janma_frames::mean_obliquity_deg;
use janma_houses::{Ayanamsa, HouseInputs, HouseSystem, MCHemisphere, compute};
use janma_rs::{BirthTime, ServiceConfig};
use janma_time::{EopKernel, Ut1Source, datetime_to_jd, jd_to_centuries, ut1_jd};
use janma_zone::{
    BoundaryLocator, CivilTimeRequest, ParityProfile, PatchDatabase, ResolvedTime, TimeResolver,
    format_offset, validate_coordinates,
};

fn resolver(patches: Option<&Path>) -> Result<TimeResolver> {
    let db = match patches {
        Some(path) => PatchDatabase::load(path)
            .with_context(|| format!("loading patches from {}", path.display()))?,
        None => PatchDatabase::builtin()?,
    };
    Ok(TimeResolver::new(Arc::new(db), BoundaryLocator::shared()))
}

fn utc_str(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn resolved_text(r: &ResolvedTime) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "utc         {}", utc_str(r.utc));
    let _ = writeln!(out, "zone        {}", r.zone_id);
    let _ = writeln!(
        out,
        "offset      {}{}",
        format_offset(r.offset_seconds),
        if r.dst_active { " (DST)" } else { "" }
    );
    let _ = writeln!(out, "confidence  {:.2}", r.confidence);
    let _ = writeln!(out, "mode        {}", r.provenance.resolution_mode.as_str());
    if !r.provenance.patches_applied.is_empty() {
        let _ = writeln!(out, "patches     {}", r.provenance.patches_applied.join(", "));
    }
    let _ = write!(out, "reason      {}", r.reason);
    out
}

pub fn resolve(
    datetime: &str,
    lat: f64,
    lon: f64,
    profile: ParityProfile,
    patches: Option<&Path>,
    json: bool,
) -> Result<String> {
    let request = CivilTimeRequest::parse(datetime, lat, lon, profile)?;
    let resolved = resolver(patches)?.resolve(&request)?;
    if json {
        Ok(serde_json::to_string_pretty(&resolved)?)
    } else {
        Ok(resolved_text(&resolved))
    }
}

pub struct HousesArgs {
    pub datetime: String,
    pub lat: f64,
    pub lon: f64,
    pub system: HouseSystem,
    pub ayanamsa: Ayanamsa,
    pub mc_hemisphere: MCHemisphere,
    pub profile: ParityProfile,
}

pub fn houses(args: &HousesArgs, eop: Option<&Path>, json: bool) -> Result<String> {
    validate_coordinates(args.lat, args.lon)?;
    let (utc, resolved) = match BirthTime::parse(&args.datetime)? {
        BirthTime::Utc(utc) => (utc, None),
        BirthTime::Local(local_datetime) => {
            let r = resolver(None)?.resolve(&CivilTimeRequest {
                local_datetime,
                latitude: args.lat,
                longitude: args.lon,
                parity_profile: args.profile,
            })?;
            (r.utc, Some(r))
        }
    };

    let eop = eop
        .map(|path| {
            EopKernel::load(path).with_context(|| format!("loading EOP from {}", path.display()))
        })
        .transpose()?;
    let (jd_ut1, ut1_source) = ut1_jd(utc, eop.as_ref());
    let jd_utc = datetime_to_jd(utc);
    let obliquity = mean_obliquity_deg(jd_to_centuries(jd_utc));
    let inputs = HouseInputs::at(jd_ut1, args.lat, args.lon, obliquity);
    let ayanamsa_deg = args.ayanamsa.deg_at_jd(jd_utc);
    let result = compute(&inputs, args.system, args.mc_hemisphere)?.to_sidereal(ayanamsa_deg)?;

    if json {
        let value = serde_json::json!({
            "utc": utc,
            "resolved": resolved,
            "system": args.system,
            "frame": result.frame,
            "ayanamsa": args.ayanamsa,
            "ayanamsa_deg": ayanamsa_deg,
            "mc_hemisphere": args.mc_hemisphere.resolve(args.lat),
            "local_sidereal_time_deg": inputs.local_sidereal_time_deg,
            "obliquity_deg": obliquity,
            "ut1_source": match ut1_source {
                Ut1Source::Eop => "eop",
                Ut1Source::UtcApprox => "utc",
            },
            "asc": result.ascendant,
            "mc": result.midheaven,
            "cusps": result.cusps,
        });
        return Ok(serde_json::to_string_pretty(&value)?);
    }

    let mut out = String::new();
    if let Some(r) = &resolved {
        let _ = writeln!(out, "{}", resolved_text(r));
    } else {
        let _ = writeln!(out, "utc         {}", utc_str(utc));
    }
    let _ = writeln!(out, "system      {} ({})", args.system, args.ayanamsa);
    if args.ayanamsa.is_sidereal() {
        let _ = writeln!(out, "ayanamsa    {ayanamsa_deg:.6}");
    }
    let _ = writeln!(out, "lst         {:.6}", inputs.local_sidereal_time_deg);
    let _ = writeln!(out, "obliquity   {obliquity:.6}");
    let _ = writeln!(out, "asc         {:.6}", result.ascendant);
    let _ = writeln!(out, "mc          {:.6}", result.midheaven);
    for (i, cusp) in result.cusps.iter().enumerate() {
        let _ = write!(out, "\n{:>2}  {cusp:>10.6}", i + 1);
    }
    Ok(out)
}

pub fn patches(file: Option<&Path>) -> Result<String> {
    let db = match file {
        Some(path) => PatchDatabase::load(path)
            .with_context(|| format!("loading patches from {}", path.display()))?,
        None => PatchDatabase::builtin()?,
    };
    let mut out = format!("{} patches", db.len());
    for p in db.patches() {
        let _ = write!(
            out,
            "\n{:<32} {:<20} {:>4} {} .. {}  {}",
            p.id,
            p.category.as_str(),
            p.precedence,
            p.valid_from.format("%Y-%m-%d"),
            p.valid_to.format("%Y-%m-%d"),
            p.name
        );
    }
    Ok(out)
}

pub fn check_config(path: &Path) -> Result<String> {
    let config = ServiceConfig::load(path)?;
    Ok(format!(
        "{}: ok (workers {}, queue {}, timeout {} ms, cache {} @ {} ms, policy {}, profile {})",
        path.display(),
        config.pool.workers,
        config.pool.queue_capacity,
        config.pool.request_timeout_ms,
        config.cache.capacity,
        config.cache.granularity_ms,
        config.ephemeris.policy,
        config.time.parity_profile_default,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn epoch_args(system: HouseSystem) -> HousesArgs {
        HousesArgs {
            datetime: "1970-01-01T00:00:00Z".into(),
            lat: 0.0,
            lon: 0.0,
            system,
            ayanamsa: Ayanamsa::FaganBradley,
            mc_hemisphere: MCHemisphere::North,
            profile: ParityProfile::StrictHistory,
        }
    }

    #[test]
    fn resolve_text_names_zone_and_offset() {
        let out = resolve(
            "1962-07-02T23:33:00",
            37.840347,
            -85.949127,
            ParityProfile::StrictHistory,
            None,
            false,
        )
        .unwrap();
        assert!(out.contains("1962-07-03T04:33:00Z"));
        assert!(out.contains("UTC-05:00"));
        assert!(!out.contains("(DST)"));
    }

    #[test]
    fn resolve_rejects_bad_latitude() {
        let err = resolve("1962-07-02T23:33:00", 91.0, 0.0, ParityProfile::StrictHistory, None, true)
            .unwrap_err();
        assert!(err.to_string().contains("latitude"));
    }

    #[test]
    fn houses_json_matches_epoch_golden() {
        let out = houses(&epoch_args(HouseSystem::Placidus), None, true).unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        let asc = v["asc"].as_f64().unwrap();
        assert!((asc - 166.811025).abs() < 0.02);
        assert_eq!(v["cusps"].as_array().unwrap().len(), 12);
        assert_eq!(v["ut1_source"], "utc");
        assert!(v["resolved"].is_null());
    }

    #[test]
    fn houses_resolves_local_times() {
        let mut args = epoch_args(HouseSystem::Equal);
        args.datetime = "1962-07-02T23:33:00".into();
        args.lat = 37.840347;
        args.lon = -85.949127;
        let out = houses(&args, None, false).unwrap();
        assert!(out.contains("America/Kentucky/Louisville"));
        assert!(out.contains("12  "));
    }

    #[test]
    fn polar_placidus_fails() {
        let mut args = epoch_args(HouseSystem::Placidus);
        args.lat = 75.0;
        let err = houses(&args, None, false).unwrap_err();
        assert!(err.to_string().contains("undefined"));
    }

    #[test]
    fn builtin_patches_listed() {
        let out = patches(None).unwrap();
        assert!(out.contains("us-ky-fort-knox-ewt-1942"));
        assert!(out.contains("war_time"));
    }
}

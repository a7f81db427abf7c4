use std::path::PathBuf;

use clap::{Parser, Subcommand};
use janma_houses::{Ayanamsa, HouseSystem, MCHemisphere};
use janma_rs::{LoggingConfig, init_logger};
use janma_zone::ParityProfile;

mod commands;

#[derive(Parser)]
#[command(name = "janma", version, about = "Birth time resolution and house cusps")]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a local birth time to UTC with provenance
    Resolve {
        /// Local datetime without offset (YYYY-MM-DDThh:mm[:ss])
        datetime: String,
        /// Latitude in degrees, north positive
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude in degrees, east positive
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// strict_history, astro_com or clairvision
        #[arg(long, default_value = "strict_history")]
        profile: ParityProfile,
        /// Zone-patch file replacing the built-in table
        #[arg(long)]
        patches: Option<PathBuf>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Ascendant, midheaven and cusps using IAU 2006 mean obliquity
    Houses {
        /// UTC instant (with Z or offset) or a local datetime to resolve
        datetime: String,
        /// Latitude in degrees, north positive
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude in degrees, east positive
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// placidus, whole_sign or equal
        #[arg(long, default_value = "placidus")]
        system: HouseSystem,
        /// tropical, lahiri, fagan_bradley, krishnamurti or raman
        #[arg(long, default_value = "tropical")]
        ayanamsa: Ayanamsa,
        /// north, south or auto
        #[arg(long, default_value = "auto")]
        mc_hemisphere: MCHemisphere,
        /// Parity profile for local datetimes
        #[arg(long, default_value = "strict_history")]
        profile: ParityProfile,
        /// IERS finals2000A file for UT1
        #[arg(long)]
        eop: Option<PathBuf>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List zone patches
    Patches {
        /// Patch file to list instead of the built-in table
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Load and validate a service configuration file
    CheckConfig {
        /// Path to the TOML file
        path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logger(&LoggingConfig {
        filter: if cli.verbose { "janma=debug" } else { "janma=warn" }.to_string(),
        json: false,
    });

    let output = match cli.command {
        Commands::Resolve {
            datetime,
            lat,
            lon,
            profile,
            patches,
            json,
        } => commands::resolve(&datetime, lat, lon, profile, patches.as_deref(), json)?,
        Commands::Houses {
            datetime,
            lat,
            lon,
            system,
            ayanamsa,
            mc_hemisphere,
            profile,
            eop,
            json,
        } => commands::houses(
            &commands::HousesArgs {
                datetime,
                lat,
                lon,
                system,
                ayanamsa,
                mc_hemisphere,
                profile,
            },
            eop.as_deref(),
            json,
        )?,
        Commands::Patches { file } => commands::patches(file.as_deref())?,
        Commands::CheckConfig { path } => commands::check_config(&path)?,
    };
    println!("{output}");
    Ok(())
}

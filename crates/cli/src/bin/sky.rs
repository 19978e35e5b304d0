use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use log::{LevelFilter, debug};
use sky_map_engine::clock::{
    Clock, ManualWallClock, TransitioningCompositeClock, WallClock,
};
use sky_map_engine::config::{
    AnomalyModelSetting, EngineConfig, find_site, load_engine_config, load_sites,
};
use sky_map_engine::core::LatLong;
use sky_map_engine::ephemeris::{Ephemeris, Planet, RiseSetIndicator, RiseSetSettings};
use sky_map_engine::export::riseset::{RiseSetRow, write_rise_set_csv, write_rise_set_json};
use sky_map_engine::export::snapshot::{write_snapshot_csv, write_snapshot_json};
use sky_map_engine::orbits::AnomalyModel;

#[derive(Parser)]
#[command(
    name = "sky",
    author,
    version,
    about = "Solar-system positions, rise/set times, lunar phase and time travel"
)]
struct Cli {
    /// Log at debug level (RUST_LOG still applies)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Engine settings file (YAML or TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// RA/Dec, distance, phase and magnitude of every body
    Positions {
        /// Instant (RFC 3339 or YYYY-MM-DD); defaults to now
        #[arg(long)]
        at: Option<String>,
        /// Solve Kepler's equation instead of using the mean anomaly
        #[arg(long, default_value_t = false)]
        kepler: bool,
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
        /// Output path for json/csv (`-` for stdout)
        #[arg(long, default_value = "-")]
        output: PathBuf,
    },
    /// Next rise and set of a body for an observer
    Riseset {
        /// Body name (case-insensitive)
        #[arg(long, default_value = "sun")]
        body: Planet,
        /// Observer latitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
        /// Observer longitude in degrees, east positive
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,
        /// Site name to look up in --sites
        #[arg(long)]
        site: Option<String>,
        /// Site catalog (YAML list, TOML file or directory of TOML files)
        #[arg(long)]
        sites: Option<PathBuf>,
        #[arg(long)]
        at: Option<String>,
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
        #[arg(long, default_value = "-")]
        output: PathBuf,
    },
    /// Lunar phase and the next full and new moon
    Moon {
        #[arg(long)]
        at: Option<String>,
        /// Refine the next full moon by an hourly search
        #[arg(long, default_value_t = false)]
        search: bool,
    },
    /// Preview a time-travel transition on a simulated wall clock
    Travel {
        /// Target instant
        #[arg(long)]
        to: String,
        /// Starting real time; defaults to now
        #[arg(long)]
        from: Option<String>,
        /// Samples across the transition
        #[arg(long, default_value_t = 10)]
        steps: u32,
        /// Speed-ladder notches to accelerate after arriving (negative decelerates)
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        accelerate: i32,
    },
}

#[derive(Copy, Clone, ValueEnum, Debug, PartialEq, Eq)]
enum Format {
    Table,
    Json,
    Csv,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => load_engine_config(path)
            .with_context(|| format!("loading engine config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Positions {
            at,
            kepler,
            format,
            output,
        } => positions(&config, at.as_deref(), kepler, format, &output),
        Commands::Riseset {
            body,
            lat,
            lon,
            site,
            sites,
            at,
            format,
            output,
        } => {
            let observer = resolve_observer(lat, lon, site.as_deref(), sites.as_deref())?;
            rise_set(&config, body, &observer, at.as_deref(), format, &output)
        }
        Commands::Moon { at, search } => moon(&config, at.as_deref(), search),
        Commands::Travel {
            to,
            from,
            steps,
            accelerate,
        } => travel(&config, &to, from.as_deref(), steps, accelerate),
    }
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    let _ = builder.try_init();
}

fn parse_instant(text: Option<&str>) -> Result<DateTime<Utc>> {
    let Some(text) = text else {
        return Ok(Utc::now());
    };
    if let Ok(t) = DateTime::parse_from_rfc3339(text) {
        return Ok(t.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .with_context(|| format!("'{text}' is neither RFC 3339 nor YYYY-MM-DD"))?;
    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .ok_or_else(|| anyhow!("'{text}' has no midnight"))
}

fn ephemeris_for(config: &EngineConfig, force_kepler: bool) -> Ephemeris {
    let model = if force_kepler || config.anomaly_model == AnomalyModelSetting::Kepler {
        AnomalyModel::Kepler
    } else {
        AnomalyModel::Mean
    };
    Ephemeris::new(model).with_rise_set_settings(RiseSetSettings {
        max_iterations: config.rise_set_max_iterations,
        convergence_hours: config.rise_set_convergence_hours,
    })
}

fn utc_string(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn positions(
    config: &EngineConfig,
    at: Option<&str>,
    kepler: bool,
    format: Format,
    output: &Path,
) -> Result<()> {
    let instant = parse_instant(at)?;
    let eph = ephemeris_for(config, kepler);
    let rows = eph.snapshot(&instant);
    match format {
        Format::Json => write_snapshot_json(output, &rows)
            .with_context(|| format!("writing {}", output.display()))?,
        Format::Csv => write_snapshot_csv(output, &rows)
            .with_context(|| format!("writing {}", output.display()))?,
        Format::Table => {
            println!("=== Positions at {} ===", utc_string(&instant));
            println!(
                "{:<8} {:>9} {:>9} {:>8} {:>8} {:>7} {:>6} {:>7}",
                "body", "ra_deg", "dec_deg", "r_au", "delta_au", "phase", "lit%", "mag"
            );
            for row in &rows {
                println!(
                    "{:<8} {:>9.3} {:>9.3} {:>8} {:>8} {:>7.2} {:>6.1} {:>7.2}",
                    row.body.name(),
                    row.ra_deg,
                    row.dec_deg,
                    optional(row.heliocentric_au),
                    optional(row.geocentric_au),
                    row.phase_deg,
                    row.illuminated_pct,
                    row.magnitude,
                );
            }
        }
    }
    Ok(())
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.4}")).unwrap_or_else(|| "-".into())
}

struct Observer {
    name: Option<String>,
    location: LatLong,
    utc_offset: Option<FixedOffset>,
}

fn resolve_observer(
    lat: Option<f64>,
    lon: Option<f64>,
    site: Option<&str>,
    sites: Option<&Path>,
) -> Result<Observer> {
    if let Some(name) = site {
        let catalog = sites.ok_or_else(|| anyhow!("--site requires --sites"))?;
        let all = load_sites(catalog)
            .with_context(|| format!("loading sites from {}", catalog.display()))?;
        let found = find_site(&all, name)?;
        let utc_offset = found
            .utc_offset_hours
            .and_then(|h| FixedOffset::east_opt((h * 3_600.0).round() as i32));
        return Ok(Observer {
            name: Some(found.name.clone()),
            location: LatLong::new(found.latitude_deg, found.longitude_deg),
            utc_offset,
        });
    }
    match (lat, lon) {
        (Some(lat), Some(lon)) => Ok(Observer {
            name: None,
            location: LatLong::new(lat, lon),
            utc_offset: None,
        }),
        _ => Err(anyhow!("provide --lat and --lon, or --site with --sites")),
    }
}

fn rise_set(
    config: &EngineConfig,
    body: Planet,
    observer: &Observer,
    at: Option<&str>,
    format: Format,
    output: &Path,
) -> Result<()> {
    let now = parse_instant(at)?;
    let eph = ephemeris_for(config, false);
    let loc = &observer.location;

    let events = [
        ("rise", RiseSetIndicator::Rise),
        ("set", RiseSetIndicator::Set),
    ];
    let rows: Vec<RiseSetRow> = events
        .into_iter()
        .map(|(event, indicator)| RiseSetRow {
            body,
            event,
            latitude_deg: loc.latitude(),
            longitude_deg: loc.longitude(),
            utc: eph
                .next_rise_set(body, &now, loc, indicator)
                .map(|t| utc_string(&t)),
        })
        .collect();

    match format {
        Format::Json => write_rise_set_json(output, &rows)
            .with_context(|| format!("writing {}", output.display()))?,
        Format::Csv => write_rise_set_csv(output, &rows)
            .with_context(|| format!("writing {}", output.display()))?,
        Format::Table => {
            let label = observer
                .name
                .clone()
                .unwrap_or_else(|| format!("{:.4}, {:.4}", loc.latitude(), loc.longitude()));
            println!("=== {body} from {label} after {} ===", utc_string(&now));
            for row in &rows {
                match &row.utc {
                    Some(utc) => {
                        let local = observer.utc_offset.and_then(|offset| {
                            DateTime::parse_from_rfc3339(utc)
                                .ok()
                                .map(|t| t.with_timezone(&offset).format("%H:%M %:z").to_string())
                        });
                        match local {
                            Some(local) => println!("{:<5}: {utc} (local {local})", row.event),
                            None => println!("{:<5}: {utc}", row.event),
                        }
                    }
                    None => println!("{:<5}: does not occur today at this location", row.event),
                }
            }
        }
    }
    Ok(())
}

fn moon(config: &EngineConfig, at: Option<&str>, search: bool) -> Result<()> {
    let instant = parse_instant(at)?;
    let eph = ephemeris_for(config, false);
    let phase = eph.phase_angle(Planet::Moon, &instant);
    let bucket = eph.lunar_phase(&instant);

    println!("=== Moon at {} ===", utc_string(&instant));
    println!("Phase angle     : {phase:.2} deg");
    println!(
        "Illuminated     : {:.1}%",
        eph.percent_illuminated(Planet::Moon, &instant)
    );
    println!("Phase           : {} (image {})", bucket.label(), bucket.image_index());
    let ra_dec = eph.ra_dec(Planet::Moon, &instant);
    println!("RA / Dec        : {:.3} / {:.3} deg", ra_dec.ra, ra_dec.dec);
    println!("Next full moon  : {}", utc_string(&eph.next_full_moon(&instant)));
    println!("Next new moon   : {}", utc_string(&eph.next_new_moon(&instant)));
    if search {
        match eph.next_full_moon_by_search(&instant) {
            Some(t) => println!("Full moon search: {}", utc_string(&t)),
            None => println!("Full moon search: no peak found"),
        }
    }
    Ok(())
}

fn travel(
    config: &EngineConfig,
    to: &str,
    from: Option<&str>,
    steps: u32,
    accelerate: i32,
) -> Result<()> {
    let target = parse_instant(Some(to))?;
    let start = parse_instant(from)?;
    let wall = ManualWallClock::starting_at(&start);
    let mut clock = TransitioningCompositeClock::with_wall_clock(wall.clone())
        .with_transition_time_ms(config.transition_time_ms);
    let glide_ms = clock.transition_time_ms();

    clock.go_time_travel(&target);
    println!("=== Time travel {} -> {} ===", utc_string(&start), utc_string(&target));
    let steps = steps.max(1);
    for i in 0..=steps {
        let elapsed = glide_ms * i64::from(i) / i64::from(steps);
        wall.set(start.timestamp_millis() + elapsed);
        println!("t+{elapsed:>5} ms  {}", reading(&mut clock)?);
    }
    wall.set(start.timestamp_millis() + glide_ms + 1);
    println!("arrived         {} ({:?})", reading(&mut clock)?, clock.mode());

    if accelerate != 0 {
        for _ in 0..accelerate.unsigned_abs() {
            if accelerate > 0 {
                clock.accelerate();
            } else {
                clock.decelerate();
            }
        }
        let tag = clock.current_speed_tag();
        debug!("speed rate {} s/s", clock.current_speed().rate);
        println!("speed           {tag}");
        let base = wall.now_millis();
        for second in 1..=3 {
            wall.set(base + second * 1_000);
            println!("wall +{second}s        {}", reading(&mut clock)?);
        }
    }
    Ok(())
}

fn reading<C: Clock>(clock: &mut C) -> Result<String> {
    let t = clock.now()?;
    Ok(utc_string(&t))
}

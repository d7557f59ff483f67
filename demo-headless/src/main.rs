use anyhow::{bail, Context, Result};
use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use windfarm_weather_core::{
    assess_fleet, describe_wmo_code, AnalysisConfig, FarmSnapshot, FleetSummary, FrontDetector,
    GeoBounds, GridAnalysis, GridCoord, OperationalStatus, WeatherCondition, WeatherGrid,
    WeatherSample, WindFarm,
};

/// Offshore wind farm weather analysis demo
#[derive(Parser, Debug)]
#[command(name = "windfarm-weather-demo")]
#[command(about = "Fronts, pressure systems and turbine status for UK offshore wind farms", long_about = None)]
struct Args {
    /// Snapshot file: { "grid": {...}, "farms": [...] }
    #[arg(short, long, conflicts_with = "seed")]
    input: Option<PathBuf>,

    /// Seed for a synthetic snapshot (used when no input is given)
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Analysis configuration overrides (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Synthetic grid size (points per side)
    #[arg(long, default_value_t = 10)]
    grid_size: usize,

    /// Synthetic forecast length in hours
    #[arg(long, default_value_t = 48)]
    hours: u32,

    /// Print the results as JSON instead of text
    #[arg(long)]
    json: bool,
}

/// Everything one analysis run consumes
#[derive(Debug, Deserialize)]
struct Snapshot {
    #[serde(default)]
    grid: Option<WeatherGrid>,
    #[serde(default)]
    farms: Vec<FarmSnapshot>,
}

/// Everything one analysis run produces
#[derive(Debug, Serialize)]
struct Output {
    grid: Option<GridAnalysis>,
    fleet: FleetSummary,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => read_json::<AnalysisConfig>(path)?,
        None => AnalysisConfig::default(),
    };
    config.validate()?;

    let snapshot = match &args.input {
        Some(path) => read_json::<Snapshot>(path)?,
        None => {
            if args.grid_size < config.detector.min_grid_size {
                bail!(
                    "--grid-size {} is below the detector minimum of {}",
                    args.grid_size,
                    config.detector.min_grid_size
                );
            }
            info!("Synthesising snapshot with seed {}", args.seed);
            synthesize(args.seed, args.grid_size, args.hours)?
        }
    };

    let grid = match &snapshot.grid {
        Some(grid) => Some(
            FrontDetector::new(config.detector)
                .detect(grid)
                .context("grid analysis failed")?,
        ),
        None => None,
    };
    let fleet = assess_fleet(&snapshot.farms, &config);

    let output = Output { grid, fleet };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_text(&snapshot, &output);
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn print_text(snapshot: &Snapshot, output: &Output) {
    println!("=== Offshore Wind Weather Analysis ===\n");

    if let Some(grid) = &snapshot.grid {
        print_condition_map(grid);
    }

    if let Some(grid) = &output.grid {
        println!("Pressure systems: {}", grid.pressure_systems.len());
        for system in &grid.pressure_systems {
            println!(
                "  {} {:.0} at ({:.2}, {:.2})",
                system.kind.symbol(),
                system.pressure,
                system.latitude,
                system.longitude
            );
        }
        println!("Fronts: {}", grid.fronts.len());
        for front in &grid.fronts {
            println!(
                "  {} {:?} at ({:.2}, {:.2}), {:+.1}°C, moving {:.1}",
                front.kind.symbol(),
                front.kind,
                front.latitude,
                front.longitude,
                front.temperature_change,
                front.velocity
            );
        }
        if let Some(movement) = &grid.movement {
            match movement.direction {
                Some(direction) => {
                    let towards = direction.reversed();
                    println!(
                        "Front movement: {:.1} towards {} {:.0}",
                        movement.velocity,
                        towards.compass_point().arrow(),
                        towards
                    );
                }
                None => println!("Front movement: {:.1}", movement.velocity),
            }
            if let Some(trend) = movement.pressure_trend {
                println!("Pressure trend: {trend:+.1} hPa/3h");
            }
        }
        println!();
    }

    let fleet = &output.fleet;
    for report in &fleet.reports {
        print!("{report}");
        if let Some(farm) = snapshot.farms.iter().find(|f| f.farm == report.farm) {
            println!("  Conditions: {}", conditions(&farm.current));
        }
        println!();
    }
    for failure in &fleet.failures {
        println!("{}: not assessed ({})\n", failure.name, failure.reason);
    }

    println!("=== Fleet ===");
    println!(
        "Output: {:.0} / {:.0} MW ({:.0}%)",
        fleet.estimated_output_mw,
        fleet.total_capacity_mw,
        fleet.fleet_capacity_factor() * 100.0
    );
    for status in [
        OperationalStatus::Normal,
        OperationalStatus::SubOptimal,
        OperationalStatus::Idle,
        OperationalStatus::IcingRisk,
        OperationalStatus::Shutdown,
    ] {
        let count = fleet.count(status);
        if count > 0 {
            println!("  {status}: {count}");
        }
    }
    if fleet.escalated_farms > 0 {
        println!("  {} farm(s) escalated by forecast risk", fleet.escalated_farms);
    }
}

/// Weather symbols per grid point, north at the top
fn print_condition_map(grid: &WeatherGrid) {
    println!("Conditions map:");
    for row in (0..grid.rows()).rev() {
        let line: Vec<&str> = (0..grid.cols())
            .map(|col| {
                grid.get(GridCoord::new(row, col))
                    .and_then(WeatherSample::condition)
                    .map_or("·", WeatherCondition::symbol)
            })
            .collect();
        println!("  {}", line.join(" "));
    }
    println!();
}

/// "☁ Overcast, wind 39.6 km/h from 240°"
fn conditions(sample: &WeatherSample) -> String {
    let sky = sample.weather_code.map_or_else(
        || "No report".to_owned(),
        |code| {
            let symbol = WeatherCondition::from_wmo_code(code).symbol();
            format!("{symbol} {}", describe_wmo_code(code))
        },
    );
    match (sample.wind_speed, sample.wind_direction) {
        (Some(speed), Some(from)) => {
            format!("{sky}, wind {:.1} from {:.0}", speed.to_kmh(), from.normalized())
        }
        (Some(speed), None) => format!("{sky}, wind {:.1}", speed.to_kmh()),
        _ => sky,
    }
}

/// Rough WMO code for synthetic cells: wetter and colder as humidity rises
fn weather_code(temperature: f64, humidity: f64) -> u8 {
    match humidity {
        h if h >= 92.0 && temperature <= 1.0 => 71,
        h if h >= 92.0 => 63,
        h if h >= 85.0 => 3,
        h if h >= 70.0 => 2,
        _ => 0,
    }
}

/// A grid with one HIGH, one LOW and a west/east temperature step, plus a
/// handful of UK farms with hourly forecasts.
fn synthesize(seed: u64, grid_size: usize, hours: u32) -> Result<Snapshot> {
    let mut rng = StdRng::seed_from_u64(seed);
    let now = Utc::now().duration_trunc(TimeDelta::hours(1))?;

    let n = grid_size as f64;
    let high = (n / 3.0, n / 3.0);
    let low = (2.0 * n / 3.0, 2.0 * n / 3.0);
    let bump = |(r, c): (f64, f64), row: f64, col: f64| {
        let d2 = (row - r).powi(2) + (col - c).powi(2);
        (-d2 / (n / 4.0).powi(2)).exp()
    };

    let cells = GeoBounds::UK
        .grid_points(grid_size)
        .into_iter()
        .enumerate()
        .map(|(i, (lat, lon))| {
            let row = (i / grid_size) as f64;
            let col = (i % grid_size) as f64;
            let pressure = 1012.0 + 12.0 * bump(high, row, col) - 12.0 * bump(low, row, col);
            // Pressure falls fastest ahead of the low
            let trend = -3.0 * bump(low, row, col) + rng.random_range(-0.5..0.5);
            let base = if col < n / 2.0 { 4.0 } else { 10.0 };
            let temperature = base + rng.random_range(-0.3..0.3);
            let humidity = rng.random_range(60.0..95.0);
            Some(
                WeatherSample::at(lat, lon, now)
                    .with_pressure(pressure)
                    .with_pressure_trend(trend)
                    .with_temperature(temperature)
                    .with_wind(rng.random_range(6.0..14.0), rng.random_range(200.0..250.0))
                    .with_humidity(humidity)
                    .with_weather_code(weather_code(temperature, humidity)),
            )
        })
        .collect();
    let grid = WeatherGrid::new(grid_size, grid_size, cells)?;

    let farms = [
        ("Hornsea One", 1218.0, 53.885, 1.791, 11.0, 6.0),
        ("Dogger Bank", 3600.0, 54.75, 1.9, 16.0, 5.0),
        ("Walney Extension", 659.0, 54.09, -3.74, 7.0, 4.0),
        ("Moray East", 950.0, 58.1, -2.8, 9.0, 0.5),
        ("London Array", 630.0, 51.63, 1.48, 4.0, 8.0),
    ]
    .into_iter()
    .map(|(name, capacity_mw, latitude, longitude, wind, temp)| {
        let farm = WindFarm {
            name: name.to_owned(),
            capacity_mw,
            latitude,
            longitude,
        };
        let forecast: Vec<_> = (0..hours)
            .map(|h| {
                let at = now + TimeDelta::hours(i64::from(h));
                forecast_hour(&mut rng, &farm, at, f64::from(h), wind, temp)
            })
            .collect();
        FarmSnapshot {
            current: forecast
                .first()
                .cloned()
                .unwrap_or_else(|| forecast_hour(&mut rng, &farm, now, 0.0, wind, temp)),
            farm,
            forecast,
        }
    })
    .collect();

    Ok(Snapshot {
        grid: Some(grid),
        farms,
    })
}

/// A storm peaks a day out; temperatures dip overnight.
fn forecast_hour(
    rng: &mut StdRng,
    farm: &WindFarm,
    at: DateTime<Utc>,
    hour: f64,
    wind: f64,
    temp: f64,
) -> WeatherSample {
    let storm = 14.0 * (-((hour - 24.0) / 6.0).powi(2)).exp();
    let speed = (wind + storm + rng.random_range(-1.5..1.5)).max(0.0);
    let diurnal = -2.0 * (hour * std::f64::consts::TAU / 24.0).cos();
    let humidity = rng.random_range(75.0..95.0);
    WeatherSample::at(farm.latitude, farm.longitude, at)
        .with_wind(speed, rng.random_range(200.0..260.0))
        .with_gust(speed * 1.3)
        .with_temperature(temp + diurnal)
        .with_humidity(humidity)
        .with_weather_code(weather_code(temp + diurnal, humidity))
}

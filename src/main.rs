use anyhow::{Context, Result};
use chrono::NaiveDate;
use lineup_rapm::batch::run_season;
use lineup_rapm::config::{Config, LoggingConfig};
use lineup_rapm::engine::history::{build_daily_boxscore, build_onoff_history, DateWindow};
use lineup_rapm::engine::rapm::{compute_rapm, PlayerDirectory};
use lineup_rapm::engine::shooting_state::{CareerTotals, ShootingStateTable};
use lineup_rapm::engine::shot_model::ShotMixTable;
use lineup_rapm::feed::types::PlayerId;
use lineup_rapm::feed::ManifestSource;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const USAGE: &str = "usage: lineup-rapm <manifest.json> [--config config.toml] [--out out/] \
[--state player_state.json] [--shot-mix shot_mix.json] [--career career.json] \
[--start YYYY-MM-DD] [--end YYYY-MM-DD]";

/// Value following `flag`, e.g. `--out dir`.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_date_flag(args: &[String], flag: &str) -> Result<Option<NaiveDate>> {
    flag_value(args, flag)
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("Invalid {flag} date: {s}")))
        .transpose()
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    match &logging.file {
        Some(path) => {
            let log_file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file: {path}"))?;
            tracing_subscriber::fmt()
                .with_env_filter(logging.filter.as_str())
                .with_writer(log_file)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(logging.filter.as_str())
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

fn write_json<T: Serialize + ?Sized>(dir: &Path, name: &str, value: &T) -> Result<()> {
    let path = dir.join(name);
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), "wrote output");
    Ok(())
}

#[derive(Serialize)]
struct FailureRow<'a> {
    game_id: &'a str,
    date: NaiveDate,
    error: String,
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(manifest) = args.first().filter(|a| !a.starts_with("--")) else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let config_path = flag_value(&args, "--config").unwrap_or("config.toml");
    let config = if Path::new(config_path).exists() {
        Config::load(Path::new(config_path))?
    } else {
        Config::default()
    };
    init_logging(&config.logging)?;

    let out_dir = PathBuf::from(flag_value(&args, "--out").unwrap_or("out"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create output dir: {}", out_dir.display()))?;
    let window = DateWindow::new(parse_date_flag(&args, "--start")?, parse_date_flag(&args, "--end")?);

    let source = ManifestSource::load(Path::new(manifest))?;
    let dates: Vec<NaiveDate> = source.dates().into_iter().filter(|d| window.contains(*d)).collect();

    let mut state = match flag_value(&args, "--state") {
        Some(path) if Path::new(path).exists() => read_json::<ShootingStateTable>(Path::new(path))?,
        _ => ShootingStateTable::new(),
    };
    if let Some(path) = flag_value(&args, "--career") {
        let career: HashMap<PlayerId, CareerTotals> = read_json(Path::new(path))?;
        state = state.with_career_baseline(&career);
        tracing::info!(players = career.len(), "applied career baseline");
    }
    let shot_mix = match flag_value(&args, "--shot-mix") {
        Some(path) => {
            let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
            ShotMixTable::from_json(&raw).with_context(|| format!("Failed to parse {path}"))?
        }
        None => ShotMixTable::default(),
    };

    println!();
    println!("  Lineup RAPM v0.1.0");
    println!("  ==================");
    println!("  Dates: {}  Starting players tracked: {}", dates.len(), state.len());
    println!();

    let run = run_season(&source, &dates, state, &shot_mix, &config);

    let rows = run.player_rows();
    let stints = run.stints();
    let stint_rows: Vec<_> = stints.iter().map(|s| s.to_row()).collect();
    let shots: Vec<_> = run.reports().flat_map(|r| r.shots.iter()).collect();
    let luck: Vec<_> = run.reports().flat_map(|r| r.luck.iter()).collect();
    let teams: Vec<_> = run
        .reports()
        .flat_map(|r| r.teams.iter().map(move |t| (r.game_id.as_str(), r.date, t)))
        .map(|(game_id, date, t)| serde_json::json!({ "game_id": game_id, "date": date, "team": t }))
        .collect();
    let failures: Vec<FailureRow> = run
        .failures()
        .filter_map(|o| {
            o.result.as_ref().err().map(|e| FailureRow {
                game_id: &o.game_id,
                date: o.date,
                error: format!("{e:#}"),
            })
        })
        .collect();

    write_json(&out_dir, "adjusted_onoff.json", &rows)?;
    write_json(&out_dir, "stints.json", &stint_rows)?;
    write_json(&out_dir, "shots.json", &shots)?;
    write_json(&out_dir, "luck.json", &luck)?;
    write_json(&out_dir, "team_games.json", &teams)?;
    write_json(&out_dir, "player_state.json", &run.state)?;
    write_json(&out_dir, "onoff_history.json", &build_onoff_history(&rows, &window))?;
    write_json(&out_dir, "daily_boxscore.json", &build_daily_boxscore(&rows))?;
    write_json(&out_dir, "failures.json", &failures)?;

    println!(
        "  Games: {} ok, {} failed  Player rows: {}  Stints: {}",
        run.reports().count(),
        failures.len(),
        rows.len(),
        stints.len()
    );
    for (date, error) in &run.failed_dates {
        println!("  Could not list games for {date}: {error}");
    }
    for report in run.reports() {
        if let Some(swing) = report.biggest_swing() {
            tracing::debug!(
                game_id = %report.game_id,
                player = %swing.player_name,
                luck_pts = swing.luck_pts,
                "biggest 3PT swing"
            );
        }
    }

    let directory = PlayerDirectory::from_rows(&rows);
    match compute_rapm(&stints, &directory, &config.rapm, &window) {
        Ok(report) => {
            write_json(&out_dir, "rapm.json", &report.rows)?;
            let label = if config.rapm.use_adjusted { "3PT-ADJUSTED " } else { "" };
            println!();
            println!("  TOP 10 BY {label}RAPM (intercept {:+.2})", report.intercept);
            for row in report.rows.iter().take(10) {
                println!(
                    "  {:25} {:>6.0} min  {:+6.2}  (O {:+6.2} / D {:+6.2})",
                    row.player_name, row.minutes, row.rapm, row.orapm, row.drapm
                );
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "RAPM fit skipped");
            println!("  RAPM skipped: {e:#}");
        }
    }

    println!();
    println!("  Outputs written to {}", out_dir.display());
    Ok(())
}

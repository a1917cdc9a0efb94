#[macro_use]
extern crate failure;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate slog;

use std::env;
use std::path;
use std::process;
use std::time;

use slog::Drain;
use structopt::StructOpt;

use crate::sensors::Environment;

mod assess;
mod collect;
mod config;
mod db;
mod error;
mod model;
mod plants;
mod sensors;
mod util;

#[derive(Debug, StructOpt)]
#[structopt(about = "Logs the sensor board and looks up plant care data")]
struct Options {
    /// Configuration file; `verdant.toml` is read when present
    #[structopt(short, long, parse(from_os_str))]
    config: Option<path::PathBuf>,
    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Reads the sensor board periodically and stores every reading until interrupted
    Log,
    /// Reads the sensor board once
    Read,
    /// Lists the plant ids the plant API reports for a category
    Search {
        term: String,
        /// Shows names and care hints instead of bare ids
        #[structopt(long)]
        details: bool,
        /// Maximum number of hits shown with --details
        #[structopt(long, default_value = "10")]
        limit: usize,
    },
    /// Shows the care profile of a plant
    Profile {
        id: String,
        /// Prints the [minTemp, maxTemp, minLight, maxLight, watering] tuple
        #[structopt(long)]
        legacy: bool,
    },
    /// Shows descriptive information about a plant
    Details { id: String },
    /// Searches a category and shows the care profile of every hit
    Survey { term: String },
    /// Compares a fresh reading against the care profile of a plant
    Check { id: String },
}

fn main() {
    let options = Options::from_args();

    let code = {
        let log = init_logging();
        let _scope_guard = slog_scope::set_global_logger(log.clone());
        if let Err(e) = slog_stdlog::init() {
            warn!(log, "could not forward library logs"; "error" => ?e);
        }

        let result = tokio::runtime::Runtime::new()
            .map_err(failure::Error::from)
            .and_then(|runtime| runtime.block_on(run(log.clone(), options)));

        match result {
            Ok(()) => 0,
            Err(e) => {
                let chain = e
                    .iter_chain()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(": ");
                crit!(log, "failed"; "error" => chain);
                1
            }
        }
    };

    process::exit(code);
}

fn init_logging() -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();

    let mut filter = slog_envlogger::LogBuilder::new(drain).filter(None, slog::FilterLevel::Info);
    if let Ok(directives) = env::var("RUST_LOG") {
        filter = filter.parse(&directives);
    }
    let drain = slog_async::Async::new(filter.build().fuse()).build().fuse();

    slog::Logger::root(drain, o!("version" => env!("CARGO_PKG_VERSION")))
}

async fn run(log: slog::Logger, options: Options) -> Result<(), failure::Error> {
    let config = config::Config::load(options.config.as_deref())?;

    match options.command {
        Command::Log => {
            if config.sensor.interval_secs == 0 {
                return Err(error::Error::Configuration(
                    "sensor.interval_secs must be positive".to_owned(),
                )
                .into());
            }

            let board = util::blocking(|| sensors::SenseBoard::open(&log, &config.sensor))?;
            let store = db::TableStore::connect(
                log.new(o!("component" => "table-store")),
                &config.table_store,
            )?;
            let collector = collect::Collector::new(
                log.new(o!("component" => "collector")),
                board,
                store,
                time::Duration::from_secs(config.sensor.interval_secs),
            );

            collector.run(interrupted(log.clone())).await;
        }
        Command::Read => {
            let reading = util::blocking(|| read_once(&log, &config.sensor))?;
            print_json(&reading)?;
        }
        Command::Search {
            term,
            details,
            limit,
        } => {
            let api = plant_api(&log, &config)?;
            if details {
                print_json(&api.search(&term, limit).await?)?;
            } else {
                print_json(&api.search_ids(&term).await?)?;
            }
        }
        Command::Profile { id, legacy } => {
            let profile = plant_api(&log, &config)?
                .fetch_profile(&model::PlantId(id))
                .await?;
            if legacy {
                print_json(&profile.to_legacy())?;
            } else {
                print_json(&profile)?;
            }
        }
        Command::Details { id } => {
            let details = plant_api(&log, &config)?
                .fetch_details(&model::PlantId(id))
                .await?;
            print_json(&details)?;
        }
        Command::Survey { term } => {
            let entries = plant_api(&log, &config)?.survey(&term).await?;
            let report = entries
                .iter()
                .map(|entry| match &entry.profile {
                    Ok(profile) => serde_json::json!({ "id": entry.id, "profile": profile }),
                    Err(e) => serde_json::json!({ "id": entry.id, "error": e.to_string() }),
                })
                .collect::<Vec<_>>();
            print_json(&report)?;
        }
        Command::Check { id } => {
            let id = model::PlantId(id);
            let profile = plant_api(&log, &config)?.fetch_profile(&id).await?;
            let reading = util::blocking(|| read_once(&log, &config.sensor))?;
            let assessment = assess::assess(&profile, &reading, config.sensor.lux_per_count);

            if !assessment.is_ideal() {
                info!(log, "conditions are outside the plant's range";
                      "id" => %id, "temperature" => ?assessment.temperature, "light" => ?assessment.light);
            }
            print_json(&serde_json::json!({
                "id": id,
                "profile": profile,
                "reading": reading,
                "assessment": assessment,
            }))?;
        }
    }

    Ok(())
}

fn read_once(
    log: &slog::Logger,
    config: &config::Sensor,
) -> Result<model::EnvironmentReading, failure::Error> {
    sensors::SenseBoard::open(log, config)?.read_environment()
}

fn plant_api(log: &slog::Logger, config: &config::Config) -> Result<plants::PlantApi, error::Error> {
    plants::PlantApi::new(log.new(o!("component" => "plant-api")), &config.plant_api)
}

/// Resolves on Ctrl-C. If the signal cannot be watched, never resolves.
async fn interrupted(log: slog::Logger) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!(log, "interrupted, shutting down"),
        Err(e) => {
            error!(log, "could not listen for Ctrl-C"; "error" => %e);
            futures::future::pending::<()>().await
        }
    }
}

fn print_json<T>(value: &T) -> Result<(), failure::Error>
where
    T: serde::Serialize,
{
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

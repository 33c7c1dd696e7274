//! Workday CLI - work-day session control from the terminal.

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use workday_core::{
    describe_distance, locate_roster, Coordinates, EmployeeId, EmployeeLocationSample,
    RosterEntry, WorkLocation, WorkSession,
};
use workday_services::{ApiClient, HttpAttendanceService, HttpMonitoringService};
use workday_session::{GatewayConfig, Notice, SessionController, SessionGateway, StartDayRequest};

use crate::config::WorkdayConfig;

#[derive(Parser)]
#[command(name = "workday")]
#[command(about = "Work-day session control", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Employee to act for
    #[arg(short, long, global = true)]
    employee: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current work day
    Status,
    /// Start the work day
    Start {
        /// Where the day is worked from (office or home)
        #[arg(long, default_value = "office")]
        location: WorkLocation,
        /// Current latitude
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Current longitude
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Current address
        #[arg(long)]
        address: Option<String>,
    },
    /// Pause the running day
    Pause,
    /// Resume a paused day
    Resume,
    /// End the day
    End,
    /// Follow progress until interrupted
    Watch,
    /// Distance from a point to the office
    Geofence {
        /// Latitude
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// Place a roster file (JSON array of entries) on the office fence
    Roster {
        /// Roster file
        file: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = WorkdayConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
        config.validate()?;
    }
    debug!("Using API at {}", config.api_base_url);

    match cli.command {
        Commands::Geofence { lat, lon } => {
            let point = Coordinates::new(lat, lon)?;
            let result = config.office.check(&point)?;
            println!("{}", describe_distance(&result));
        }
        Commands::Roster { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read roster {}", file.display()))?;
            let entries: Vec<RosterEntry> = serde_json::from_str(&content)
                .with_context(|| format!("Invalid roster {}", file.display()))?;
            let located = locate_roster(&config.office, &entries)?;

            println!("Located {} of {} employees", located.len(), entries.len());
            for employee in located {
                println!(
                    "  {} | {} | {}",
                    employee.entry.name.as_deref().unwrap_or(employee.entry.employee_id.as_str()),
                    employee.presence,
                    describe_distance(&employee.geofence),
                );
            }
        }
        command => {
            let employee = cli
                .employee
                .map(EmployeeId::new)
                .context("--employee is required for session commands")?;
            let controller = connect(&config, employee);
            run_session_command(&controller, &config, command).await?;
        }
    }

    Ok(())
}

fn connect(config: &WorkdayConfig, employee: EmployeeId) -> SessionController {
    let api = ApiClient::new(config.api_base_url.clone(), config.request_timeout());
    let gateway = SessionGateway::new(
        Arc::new(HttpMonitoringService::new(api.clone())),
        Arc::new(HttpAttendanceService::new(api)),
    )
    .with_config(GatewayConfig {
        target_hours: config.target_hours,
    });
    SessionController::new(Arc::new(gateway), employee)
}

async fn run_session_command(
    controller: &SessionController,
    config: &WorkdayConfig,
    command: Commands,
) -> Result<()> {
    match command {
        Commands::Status => {
            let session = controller.refresh().await;
            print_session(&session);
        }
        Commands::Start {
            location,
            lat,
            lon,
            address,
        } => {
            let request = StartDayRequest {
                work_location: location,
                location: Some(EmployeeLocationSample {
                    latitude: lat,
                    longitude: lon,
                    address,
                }),
            };
            if let Ok(point) = Coordinates::new(lat, lon) {
                if let Ok(result) = config.office.check(&point) {
                    info!("Office distance: {}", describe_distance(&result));
                }
            }
            report(controller.start(&request).await, controller)?;
        }
        Commands::Pause => report(controller.pause().await, controller)?,
        Commands::Resume => report(controller.resume().await, controller)?,
        Commands::End => report(controller.end().await, controller)?,
        Commands::Watch => {
            let session = controller.refresh().await;
            print_session(&session);

            let ticker = controller.spawn_ticker(config.tick_interval());
            let mut progress = ticker.subscribe();
            loop {
                tokio::select! {
                    changed = progress.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        println!("{}", *progress.borrow_and_update());
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
            ticker.stop().await;
        }
        Commands::Geofence { .. } | Commands::Roster { .. } => {}
    }
    Ok(())
}

fn report(notice: Notice, controller: &SessionController) -> Result<()> {
    if notice.is_error() {
        bail!("{}", notice);
    }
    println!("{}", notice);
    print_session(&controller.session());
    Ok(())
}

fn print_session(session: &WorkSession) {
    println!("Status: {}", session.status());
    let Some(details) = session.details() else {
        return;
    };
    println!("  Location: {}", details.work_location);
    println!("  Started: {}", details.start_time);
    if let Some(end) = session.end_time() {
        println!("  Ended: {}", end);
    }
    if session.is_provisional() {
        println!("  (provisional until the services confirm)");
    }
    println!("  Progress: {}", session.progress(Utc::now()));
}

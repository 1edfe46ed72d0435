use anyhow::Result;
use clap::Parser;
use myenovos::EnovosError;
use myenovos::app;
use myenovos::cli::{Cli, Command};
use myenovos::config::Config;
use myenovos::logging::init_logging;
use myenovos::portal::MyEnovos;
use myenovos::selector::Selection;
use myenovos::sink::{InfluxSink, JsonSink};
use myenovos::transport::ReqwestTransport;
use myenovos::window::TimeWindow;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("myenovos: {:#}", e);
            return exit_code_for(&e);
        }
    };

    match execute(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            exit_code_for(&e)
        }
    }
}

/// Config file, then command-line overrides, then validation and logging
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };
    cli.apply_to(&mut config);
    config.validate()?;
    init_logging(&config.logging)?;
    Ok(config)
}

fn execute(cli: &Cli, config: &Config) -> Result<()> {
    info!("myenovos {} starting", env!("APP_VERSION"));

    let credentials = app::credentials_from(config)?;
    let client = MyEnovos::from_config(config, credentials)?;
    let selection = Selection::from(&config.selection);

    match &cli.command {
        Command::History { .. } => {
            let window = resolve_window(config)?;
            let mut sink = JsonSink::new(std::io::stdout().lock());
            app::run(&client, &selection, &window, &mut sink)?;
        }
        Command::Influx { .. } => {
            let window = resolve_window(config)?;
            let timeout = config.portal.timeout_seconds.map(Duration::from_secs);
            let transport = ReqwestTransport::new(timeout)?;
            let mut sink = InfluxSink::new(Arc::new(transport), &config.influx)?;
            let report = app::run(&client, &selection, &window, &mut sink)?;
            info!(
                "Stored {} point(s) for contract {} in {}",
                report.points,
                report.contract_nr,
                sink.database()
            );
        }
        Command::Contracts { .. } => {
            let contracts = app::list_contracts(&client, selection.customer_nr.as_deref())?;
            let mut out = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut out, &contracts)?;
            writeln!(out)?;
        }
    }

    Ok(())
}

fn resolve_window(config: &Config) -> Result<TimeWindow> {
    let zone = config.calendar_zone()?;
    Ok(TimeWindow::resolve(
        config.selection.start_timestamp,
        config.selection.end_timestamp,
        &zone,
    )?)
}

fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    let code = err
        .downcast_ref::<EnovosError>()
        .map_or(1, EnovosError::exit_code);
    ExitCode::from(code)
}

//! Command line definition and handlers

use crate::api;
use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use mdsweep_core::{LogFormat, SweepConfig, SweepService};
use mdsweep_graph::{OutputPolicy, SweepRequest};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Default `serve` listen address
pub const DEFAULT_LISTEN: &str = "127.0.0.1:9000";

fn sweep_args() -> [Arg; 6] {
    [
        Arg::new("molecules")
            .long("molecules")
            .value_parser(value_parser!(u32))
            .help("Number of molecules [default: 1000]"),
        Arg::new("min")
            .long("min")
            .value_parser(value_parser!(f64))
            .allow_negative_numbers(true)
            .help("Lowest temperature [default: 85]"),
        Arg::new("max")
            .long("max")
            .value_parser(value_parser!(f64))
            .allow_negative_numbers(true)
            .help("Highest temperature [default: 90]"),
        Arg::new("step")
            .long("step")
            .value_parser(value_parser!(f64))
            .help("Temperature increment [default: 1]"),
        Arg::new("end-time")
            .long("end-time")
            .value_parser(value_parser!(f64))
            .help("Simulated seconds [default: 5.5]"),
        Arg::new("movie")
            .long("movie")
            .action(ArgAction::SetTrue)
            .help("Render a movie per temperature"),
    ]
}

/// Top-level command
#[must_use]
pub fn command() -> Command {
    Command::new("mdsweep")
        .version(mdsweep_core::VERSION)
        .about("Temperature sweeps of molecular dynamics simulations")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("service-url")
                .long("service-url")
                .global(true)
                .help("Execution service endpoint"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log as JSON lines"),
        )
        .subcommand(
            Command::new("plan")
                .about("Print the workflow graph a sweep would submit")
                .args(sweep_args())
                .arg(
                    Arg::new("sinks-only")
                        .long("sinks-only")
                        .action(ArgAction::SetTrue)
                        .help("Declare only final artifacts as outputs"),
                ),
        )
        .subcommand(
            Command::new("submit")
                .about("Submit a sweep to the execution service")
                .args(sweep_args())
                .arg(
                    Arg::new("sinks-only")
                        .long("sinks-only")
                        .action(ArgAction::SetTrue)
                        .help("Declare only final artifacts as outputs"),
                ),
        )
        .subcommand(
            Command::new("probe")
                .about("Check whether an artifact is available")
                .arg(
                    Arg::new("resource")
                        .required(true)
                        .help("Artifact locator"),
                ),
        )
        .subcommand(
            Command::new("serve")
                .about("Serve the operator API")
                .arg(
                    Arg::new("listen")
                        .long("listen")
                        .default_value(DEFAULT_LISTEN)
                        .value_parser(value_parser!(SocketAddr))
                        .help("Listen address"),
                ),
        )
}

/// Configuration from file, environment and global flags, in that order
///
/// # Errors
/// Fails if the configuration file cannot be loaded or the result is invalid.
pub fn load_config(matches: &ArgMatches) -> Result<SweepConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => SweepConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => SweepConfig::default(),
    }
    .apply_env();

    if let Some(url) = matches.get_one::<String>("service-url") {
        config = config.with_service_url(url.clone());
    }
    if matches.get_flag("json-logs") {
        config.logging = config.logging.with_format(LogFormat::Json);
    }
    config.validate()?;
    Ok(config)
}

/// Sweep request from defaults overridden by flags
#[must_use]
pub fn request_from(matches: &ArgMatches) -> SweepRequest {
    let defaults = SweepRequest::default();
    let real = |name: &str, default: f64| matches.get_one::<f64>(name).copied().unwrap_or(default);

    SweepRequest::default()
        .with_molecules(
            matches
                .get_one::<u32>("molecules")
                .copied()
                .unwrap_or(defaults.molecules),
        )
        .with_range(
            real("min", defaults.min_temperature),
            real("max", defaults.max_temperature),
            real("step", defaults.step_temperature),
        )
        .with_simulation_end_time(real("end-time", defaults.simulation_end_time))
        .with_movie(matches.get_flag("movie"))
}

fn apply_policy(mut config: SweepConfig, matches: &ArgMatches) -> SweepConfig {
    if matches.get_flag("sinks-only") {
        config.graph = config.graph.with_output_policy(OutputPolicy::SinksOnly);
    }
    config
}

/// `plan`: print the graph without submitting
///
/// # Errors
/// Fails on an invalid request.
pub fn plan(config: SweepConfig, matches: &ArgMatches) -> Result<()> {
    let service = SweepService::from_config(&apply_policy(config, matches))?;
    let plan = service.plan(&request_from(matches))?;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

/// `submit`: submit once and print the recorded experiment
///
/// # Errors
/// Fails on an invalid request or a failed submission.
pub async fn submit(config: SweepConfig, matches: &ArgMatches) -> Result<()> {
    let service = SweepService::from_config(&apply_policy(config, matches))?;
    let experiment = service.submit_sweep(request_from(matches)).await?;
    println!("{}", serde_json::to_string_pretty(&experiment)?);
    Ok(())
}

/// `probe`: print the status label of one artifact
///
/// # Errors
/// Fails only if the service cannot be assembled.
pub async fn probe(config: SweepConfig, matches: &ArgMatches) -> Result<()> {
    let service = SweepService::from_config(&config)?;
    let resource = matches
        .get_one::<String>("resource")
        .map(String::as_str)
        .unwrap_or_default();
    println!("{}", service.probe(resource).await);
    Ok(())
}

/// `serve`: run the operator API until interrupted
///
/// # Errors
/// Fails if the service cannot be assembled or the address cannot be bound.
pub async fn serve(config: SweepConfig, matches: &ArgMatches) -> Result<()> {
    let listen = matches
        .get_one::<SocketAddr>("listen")
        .copied()
        .context("missing listen address")?;
    let service = Arc::new(SweepService::from_config(&config)?);

    let (addr, server) = warp::serve(api::routes(service))
        .try_bind_with_graceful_shutdown(listen, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
        })
        .with_context(|| format!("binding {listen}"))?;

    tracing::info!(%addr, "Operator API listening");
    server.await;
    tracing::info!("Operator API stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_well_formed() {
        command().debug_assert();
    }

    #[test]
    fn flags_override_request_defaults() {
        let matches = command()
            .try_get_matches_from([
                "mdsweep", "plan", "--min", "-5", "--max", "5", "--step", "2.5", "--movie",
            ])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        let request = request_from(sub);

        assert_eq!(request.molecules, 1000);
        assert_eq!(request.min_temperature, -5.0);
        assert_eq!(request.max_temperature, 5.0);
        assert_eq!(request.step_temperature, 2.5);
        assert!(request.record_movie);
        assert_eq!(request.point_count(), 5);
    }

    #[test]
    fn global_service_url_overrides_default() {
        let matches = command()
            .try_get_matches_from([
                "mdsweep",
                "probe",
                "http://s3/x.tgz",
                "--service-url",
                "http://hf:1/apps",
            ])
            .unwrap();
        let config = load_config(&matches).unwrap();
        assert_eq!(config.service_url.as_str(), "http://hf:1/apps");
    }

    #[test]
    fn serve_defaults_listen_address() {
        let matches = command().try_get_matches_from(["mdsweep", "serve"]).unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "serve");
        assert_eq!(
            sub.get_one::<SocketAddr>("listen").copied(),
            DEFAULT_LISTEN.parse().ok()
        );
    }
}

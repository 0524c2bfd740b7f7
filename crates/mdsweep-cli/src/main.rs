use anyhow::Result;
use mdsweep_cli::commands;
use mdsweep_core::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = commands::command().get_matches();
    let config = commands::load_config(&matches)?;
    telemetry::init(&config.logging).map_err(|e| anyhow::anyhow!(e))?;

    match matches.subcommand() {
        Some(("plan", args)) => commands::plan(config, args),
        Some(("submit", args)) => commands::submit(config, args).await,
        Some(("probe", args)) => commands::probe(config, args).await,
        Some(("serve", args)) => commands::serve(config, args).await,
        Some((other, _)) => anyhow::bail!("unknown command {other}"),
        None => anyhow::bail!("no command given"),
    }
}

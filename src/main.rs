use std::path::PathBuf;

use clap::Parser;

use strata_wm::actor::replay;
use strata_wm::common::config::Config;
use strata_wm::common::log;

#[derive(Debug, Parser)]
#[command(name = "strata", about = "tiling window arrangement engine", version)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
    /// Replay a JSON-lines event trace headlessly and print status output.
    #[arg(long, value_name = "TRACE")]
    replay: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    log::init();
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    if cli.check {
        println!("configuration ok");
        return Ok(());
    }
    if let Some(trace) = cli.replay {
        return replay::run_file(&trace, config);
    }
    anyhow::bail!("no compositor backend is linked into this build; use --replay or --check")
}

//! GlobeSort Benchmark Client - Main CLI Application
//!
//! Pings a GlobeSort server, asks it to sort a batch of random integers and
//! reports application and one-way network throughput.

use clap::{error::ErrorKind, Parser};
use globesort_bench::{
    app::App,
    cli::Cli,
    config::{load_config, EnvManager},
    error::Result,
    PKG_NAME, VERSION,
};
use std::process;

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(99);
    }));

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            // Printing can only fail if the terminal is gone
            let _ = e.print();
            process::exit(code);
        }
    };

    let use_color = cli.use_colors();
    if let Err(e) = run_application(cli).await {
        eprintln!("{}", e.format_for_console(use_color));
        eprintln!();
        eprintln!("{}", e.user_friendly_message());
        process::exit(e.exit_code());
    }
}

async fn run_application(cli: Cli) -> Result<()> {
    if cli.debug {
        eprintln!("{} v{}", PKG_NAME, VERSION);
        eprintln!(
            "Built {} ({}) for {}",
            option_env!("BUILD_TIME").unwrap_or("unknown"),
            option_env!("GIT_COMMIT").unwrap_or("unknown commit"),
            option_env!("TARGET_TRIPLE").unwrap_or("unknown target"),
        );
        for warning in EnvManager::validate_current_env() {
            eprintln!("{}", warning);
        }
    }

    let config = load_config(cli)?;
    App::new(config).run().await?;
    Ok(())
}

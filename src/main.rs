use clap::Parser;
use tracing_subscriber::EnvFilter;

use donor_match::cli;
use donor_match::config::Config;
use donor_match::web;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag; RUST_LOG takes precedence
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("donor_match=debug,info")
        } else {
            EnvFilter::new("donor_match=warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(path) = cli.directory {
        config.directory.path = Some(path);
    }

    match cli.command {
        cli::Commands::Rank(args) => {
            cli::rank::run(args, cli.format, cli.verbose, &config)?;
        }
        cli::Commands::Digest(args) => {
            cli::digest::run(args, cli.format, cli.verbose, &config)?;
        }
        cli::Commands::Donors(args) => {
            cli::directory::run_donors(args, cli.format, cli.verbose, &config)?;
        }
        cli::Commands::Requests(args) => {
            cli::directory::run_requests(args, cli.format, cli.verbose, &config)?;
        }
        cli::Commands::Hospitals(args) => {
            cli::directory::run_hospitals(args, cli.format, cli.verbose, &config)?;
        }
        cli::Commands::Serve(args) => {
            web::server::run(args, &config)?;
        }
    }

    Ok(())
}

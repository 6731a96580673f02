//! Command-line interface for donor-match.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **rank**: Rank compatible donors for a blood request
//! - **digest**: Summarize open requests
//! - **donors**: List or register donors
//! - **requests**: List or post requests
//! - **hospitals**: List hospitals
//! - **serve**: Start the JSON API server
//!
//! ## Usage
//!
//! ```text
//! # Rank donors for an urgent O- request in Dhaka
//! donor-match rank --blood-type O- --location Dhaka --urgency high
//!
//! # Rank an existing request by id
//! donor-match rank --request REQ002
//!
//! # JSON output for scripting
//! donor-match --format json donors list --blood-type A+
//!
//! # Digest through the configured text service, falling back locally
//! donor-match --config donor-match.toml digest --source service --fallback
//!
//! # Start the API server
//! donor-match serve --port 8080
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod digest;
pub mod directory;
pub mod rank;

#[derive(Parser)]
#[command(name = "donor-match")]
#[command(author = "BloodMatch BD")]
#[command(version)]
#[command(about = "Match blood donors to requests by ABO/Rh compatibility and location")]
#[command(
    long_about = "donor-match keeps a directory of blood donors and open requests and ranks which donors can give to a request.\n\nFor each request it provides:\n- The donors whose blood type is transfusion-compatible\n- A ranking by location closeness and type specificity\n- A short reason for every candidate"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory file, overriding the configuration
    #[arg(short, long, global = true)]
    pub directory: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank compatible donors for a blood request
    Rank(rank::RankArgs),

    /// Summarize open blood requests
    Digest(digest::DigestArgs),

    /// List or register donors
    Donors(directory::DonorsArgs),

    /// List or post blood requests
    Requests(directory::RequestsArgs),

    /// List hospitals
    Hospitals(directory::HospitalsArgs),

    /// Start the web server
    Serve(ServeArgs),
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Port to listen on [default: from config, else 8080]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind to [default: from config, else 127.0.0.1]
    #[arg(short, long)]
    pub address: Option<String>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

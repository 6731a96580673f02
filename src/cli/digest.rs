use clap::Args;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::core::request::RequestSummaryInput;
use crate::digest::{summarize_requests, summarize_with_service, DigestSource};
use crate::directory::requests_or_empty;
use crate::narrative::TextServiceError;

/// Who should write the digest
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum DigestSourceArg {
    /// Deterministic local summary
    #[default]
    Local,
    /// Configured generative text service
    Service,
}

impl From<DigestSourceArg> for DigestSource {
    fn from(arg: DigestSourceArg) -> Self {
        match arg {
            DigestSourceArg::Local => DigestSource::Local,
            DigestSourceArg::Service => DigestSource::Service,
        }
    }
}

#[derive(Args)]
pub struct DigestArgs {
    /// Digest source
    #[arg(long, value_enum, default_value = "local")]
    pub source: DigestSourceArg,

    /// Use the local digest if the text service fails
    #[arg(long)]
    pub fallback: bool,
}

/// Execute digest subcommand
///
/// # Errors
///
/// Returns an error if the directory cannot be opened, or if the text service
/// fails and `--fallback` was not given.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(
    args: DigestArgs,
    format: OutputFormat,
    verbose: bool,
    config: &Config,
) -> anyhow::Result<()> {
    let directory = config.directory.open()?;
    let inputs: Vec<RequestSummaryInput> = requests_or_empty(&directory)
        .iter()
        .map(|r| r.summary_input())
        .collect();

    if verbose {
        eprintln!("Summarizing {} open requests", inputs.len());
    }

    let (digest, source) = match DigestSource::from(args.source) {
        DigestSource::Local => (summarize_requests(&inputs), DigestSource::Local),
        DigestSource::Service => match service_digest(config, &inputs) {
            Ok(digest) => (digest, DigestSource::Service),
            Err(e) if args.fallback => {
                eprintln!("Warning: {e}; using local digest");
                (summarize_requests(&inputs), DigestSource::Local)
            }
            Err(e) => return Err(e.into()),
        },
    };

    match format {
        OutputFormat::Text => println!("{digest}"),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "digest": digest,
                "source": source,
                "request_count": inputs.len(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("source\trequest_count\tdigest");
            println!("{source}\t{}\t{}", inputs.len(), digest.replace('\n', " "));
        }
    }

    Ok(())
}

fn service_digest(
    config: &Config,
    inputs: &[RequestSummaryInput],
) -> Result<String, TextServiceError> {
    let service = config
        .text_service
        .build()?
        .ok_or(TextServiceError::NotConfigured)?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| TextServiceError::Transport(e.to_string()))?;
    rt.block_on(summarize_with_service(&service, inputs))
}

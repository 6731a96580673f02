use clap::Args;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::core::types::{BloodType, RequestId, UrgencyLevel};
use crate::directory::{donors_or_empty, RequestDirectory};
use crate::matching::{urgency_weight, MatchReport, MatchRequest, MatchingConfig, MatchingEngine};

#[derive(Args)]
pub struct RankArgs {
    /// Rank donors for an existing request (e.g. REQ001)
    #[arg(long, conflicts_with_all = ["blood_type", "location", "urgency"])]
    pub request: Option<String>,

    /// Requested blood type (A+, A-, B+, B-, AB+, AB-, O+, O-)
    #[arg(short, long, required_unless_present = "request")]
    pub blood_type: Option<String>,

    /// Requester location (free text)
    #[arg(short, long)]
    pub location: Option<String>,

    /// Urgency: high, medium, or low [default: medium]
    #[arg(short, long)]
    pub urgency: Option<String>,

    /// Number of matches to show [default: from config, else all]
    #[arg(short = 'n', long)]
    pub max_matches: Option<usize>,

    /// Multiply --max-matches by the urgency weight (high 3, medium 2, low 1)
    #[arg(long, requires = "max_matches")]
    pub scale_by_urgency: bool,
}

/// Execute rank subcommand
///
/// # Errors
///
/// Returns an error if the request is invalid or unknown, or the directory cannot be opened.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(
    args: RankArgs,
    format: OutputFormat,
    verbose: bool,
    config: &Config,
) -> anyhow::Result<()> {
    if args.max_matches == Some(0) {
        anyhow::bail!("--max-matches must be at least 1");
    }

    let directory = config.directory.open()?;
    let request = build_request(&args, &directory)?;

    let donors = donors_or_empty(&directory);
    if verbose {
        eprintln!("Loaded directory with {} donors", donors.len());
    }

    let result_cap = args
        .max_matches
        .map(|n| {
            if args.scale_by_urgency {
                n.saturating_mul(urgency_weight(request.urgency) as usize)
            } else {
                n
            }
        })
        .or(config.matching.result_cap);

    let engine = MatchingEngine::with_config(&donors, MatchingConfig { result_cap });
    let report = engine.find_matches(&request);

    match format {
        OutputFormat::Text => print_text_results(&request, &report, verbose),
        OutputFormat::Json => print_json_results(&request, &report)?,
        OutputFormat::Tsv => print_tsv_results(&report),
    }

    Ok(())
}

fn build_request(
    args: &RankArgs,
    directory: &dyn RequestDirectory,
) -> anyhow::Result<MatchRequest> {
    if let Some(id) = &args.request {
        let id = RequestId::new(id.trim());
        let request = directory
            .list_requests()?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| anyhow::anyhow!("No request with id '{id}' in the directory"))?;
        return Ok(MatchRequest::from(&request));
    }

    let blood_type: BloodType = args
        .blood_type
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("--blood-type is required without --request"))?
        .parse()?;
    let urgency = match &args.urgency {
        Some(u) => u.parse()?,
        None => UrgencyLevel::Medium,
    };
    let location = args.location.as_deref().unwrap_or("").trim();

    Ok(MatchRequest::new(blood_type, location, urgency))
}

fn print_text_results(request: &MatchRequest, report: &MatchReport, verbose: bool) {
    let location = if request.location.is_empty() {
        "(no location)"
    } else {
        request.location.as_str()
    };
    println!(
        "Donors for {} in {} ({} urgency, weight {})",
        request.blood_type, location, request.urgency, report.urgency_weight
    );

    if report.is_empty() {
        eprintln!("No compatible donors found.");
        return;
    }

    if report.truncated {
        println!(
            "Showing {} of {} compatible donors",
            report.candidates.len(),
            report.compatible_count
        );
    } else {
        println!("Compatible donors: {}", report.compatible_count);
    }

    for (i, m) in report.candidates.iter().enumerate() {
        if i > 0 {
            println!("\n{}", "─".repeat(60));
        }

        println!("\n#{} {} ({})", m.rank, m.donor.name, m.donor.id);
        println!("   Blood Type: {}", m.donor.blood_type);
        println!("   Location: {}", m.donor.location);
        println!("   Contact: {}", m.donor.contact);
        println!("   Reason: {}", m.match_reason());

        if verbose {
            println!(
                "   Location affinity: {:.1} ({:?})",
                m.location_affinity.score, m.location_affinity.tier
            );
        }
    }
}

fn print_json_results(request: &MatchRequest, report: &MatchReport) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "request": request,
        "urgency_weight": report.urgency_weight,
        "compatible_count": report.compatible_count,
        "truncated": report.truncated,
        "matches": report.candidates,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_results(report: &MatchReport) {
    println!("rank\tdonor_id\tname\tblood_type\tlocation\tcontact\tcompatibility\tlocation_affinity\tmatch_reason");
    for m in &report.candidates {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            m.rank,
            m.donor.id,
            m.donor.name,
            m.donor.blood_type,
            m.donor.location,
            m.donor.contact,
            m.compatibility().describe(),
            m.location_affinity.tier.describe(),
            m.match_reason()
        );
    }
}

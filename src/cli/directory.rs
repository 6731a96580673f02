use clap::{Args, Subcommand};

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::core::donor::{Donor, NewDonorData};
use crate::core::hospital::Hospital;
use crate::core::request::{BloodRequest, NewRequestData};
use crate::directory::{
    donors_or_empty, hospitals_or_empty, requests_or_empty, DonorDirectory, DonorFilter,
    HospitalFilter, JsonDirectory, RequestDirectory, RequestFilter, RequestSort,
};

#[derive(Args)]
pub struct DonorsArgs {
    #[command(subcommand)]
    pub command: DonorsCommands,
}

#[derive(Subcommand)]
pub enum DonorsCommands {
    /// List registered donors
    List {
        /// Only donors of this blood type
        #[arg(short, long)]
        blood_type: Option<String>,

        /// Only donors whose location contains this text
        #[arg(short, long)]
        location: Option<String>,
    },

    /// Register a new donor
    Add {
        /// Full name
        #[arg(long)]
        name: String,

        /// Blood type (A+, A-, B+, B-, AB+, AB-, O+, O-)
        #[arg(short, long)]
        blood_type: String,

        /// Location (city or area)
        #[arg(short, long)]
        location: String,

        /// Phone number
        #[arg(long)]
        contact: String,
    },
}

#[derive(Args)]
pub struct RequestsArgs {
    #[command(subcommand)]
    pub command: RequestsCommands,
}

/// Sort order for request listings
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum SortArg {
    /// Most urgent first, then most recent
    #[default]
    Urgency,
    /// Most recent first
    Recency,
}

impl From<SortArg> for RequestSort {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Urgency => RequestSort::Urgency,
            SortArg::Recency => RequestSort::Recency,
        }
    }
}

#[derive(Subcommand)]
pub enum RequestsCommands {
    /// List open blood requests
    List {
        /// Only requests for this blood type
        #[arg(short, long)]
        blood_type: Option<String>,

        /// Only requests whose location contains this text
        #[arg(short, long)]
        location: Option<String>,

        /// Only requests of this urgency
        #[arg(short, long)]
        urgency: Option<String>,

        /// Sort order
        #[arg(long, value_enum, default_value = "urgency")]
        sort: SortArg,
    },

    /// Post a new blood request
    Add {
        /// Patient's full name
        #[arg(long)]
        patient_name: String,

        /// Blood type needed
        #[arg(short, long)]
        blood_type: String,

        /// Location (city or area)
        #[arg(short, long)]
        location: String,

        /// Urgency: high, medium, or low
        #[arg(short, long)]
        urgency: String,

        /// Phone number
        #[arg(long)]
        contact: String,

        /// Hospital name
        #[arg(long)]
        hospital: Option<String>,

        /// Additional notes
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Args)]
pub struct HospitalsArgs {
    #[command(subcommand)]
    pub command: HospitalsCommands,
}

#[derive(Subcommand)]
pub enum HospitalsCommands {
    /// List hospitals in the directory
    List {
        /// Only hospitals whose location contains this text
        #[arg(short, long)]
        location: Option<String>,

        /// Only hospitals offering a service containing this text
        #[arg(short, long)]
        service: Option<String>,
    },
}

/// Execute donors subcommand
///
/// # Errors
///
/// Returns an error if filters are invalid, the directory cannot be opened,
/// or a new donor cannot be saved.
pub fn run_donors(
    args: DonorsArgs,
    format: OutputFormat,
    verbose: bool,
    config: &Config,
) -> anyhow::Result<()> {
    match args.command {
        DonorsCommands::List {
            blood_type,
            location,
        } => {
            let filter = DonorFilter {
                blood_type: blood_type.as_deref().map(str::parse).transpose()?,
                location,
            };
            let directory = config.directory.open()?;
            let donors = filter.apply(donors_or_empty(&directory));
            if verbose {
                eprintln!("{} donors match the filter", donors.len());
            }
            print_donors(&donors, format)
        }
        DonorsCommands::Add {
            name,
            blood_type,
            location,
            contact,
        } => {
            let directory = open_for_write(config)?;
            let id = directory.create_donor(&NewDonorData {
                name,
                blood_type,
                location,
                contact,
            })?;
            print_created("donor", &id.0, format)
        }
    }
}

/// Execute requests subcommand
///
/// # Errors
///
/// Returns an error if filters are invalid, the directory cannot be opened,
/// or a new request cannot be saved.
pub fn run_requests(
    args: RequestsArgs,
    format: OutputFormat,
    verbose: bool,
    config: &Config,
) -> anyhow::Result<()> {
    match args.command {
        RequestsCommands::List {
            blood_type,
            location,
            urgency,
            sort,
        } => {
            let filter = RequestFilter {
                blood_type: blood_type.as_deref().map(str::parse).transpose()?,
                location,
                urgency: urgency.as_deref().map(str::parse).transpose()?,
            };
            let directory = config.directory.open()?;
            let requests = filter.apply(requests_or_empty(&directory), sort.into());
            if verbose {
                eprintln!("{} requests match the filter", requests.len());
            }
            print_requests(&requests, format)
        }
        RequestsCommands::Add {
            patient_name,
            blood_type,
            location,
            urgency,
            contact,
            hospital,
            notes,
        } => {
            let directory = open_for_write(config)?;
            let id = directory.create_request(&NewRequestData {
                patient_name,
                blood_type,
                location,
                urgency,
                contact,
                hospital_name: hospital,
                notes,
            })?;
            print_created("request", &id.0, format)
        }
    }
}

/// Execute hospitals subcommand
///
/// # Errors
///
/// Returns an error if the directory cannot be opened or output fails.
pub fn run_hospitals(
    args: HospitalsArgs,
    format: OutputFormat,
    verbose: bool,
    config: &Config,
) -> anyhow::Result<()> {
    match args.command {
        HospitalsCommands::List { location, service } => {
            let filter = HospitalFilter { location, service };
            let directory = config.directory.open()?;
            let hospitals = filter.apply(hospitals_or_empty(&directory));
            if verbose {
                eprintln!("{} hospitals match the filter", hospitals.len());
            }
            print_hospitals(&hospitals, format)
        }
    }
}

/// Writes need a backing file; an in-memory add would be lost on exit
fn open_for_write(config: &Config) -> anyhow::Result<JsonDirectory> {
    if config.directory.path.is_none() {
        anyhow::bail!(
            "No directory file configured; pass --directory <FILE> or set [directory] path"
        );
    }
    Ok(config.directory.open()?)
}

fn print_created(kind: &str, id: &str, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => println!("Created {kind} {id}"),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "id": id }))?);
        }
        OutputFormat::Tsv => println!("id\n{id}"),
    }
    Ok(())
}

fn print_donors(donors: &[Donor], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            if donors.is_empty() {
                eprintln!("No donors found.");
                return Ok(());
            }

            let name_width = donors
                .iter()
                .map(|d| d.name.chars().count().min(30))
                .max()
                .unwrap_or(4)
                .max(4);
            let location_width = donors
                .iter()
                .map(|d| d.location.chars().count().min(25))
                .max()
                .unwrap_or(8)
                .max(8);

            println!("Donors ({})\n", donors.len());
            println!(
                "{:<8} {:<name_w$} {:<5} {:<loc_w$} Contact",
                "ID",
                "Name",
                "Type",
                "Location",
                name_w = name_width,
                loc_w = location_width
            );
            println!("{}", "-".repeat(8 + name_width + 5 + location_width + 3 + 15));

            for d in donors {
                println!(
                    "{:<8} {:<name_w$} {:<5} {:<loc_w$} {}",
                    d.id.0,
                    truncate(&d.name, name_width),
                    d.blood_type.as_str(),
                    truncate(&d.location, location_width),
                    d.contact,
                    name_w = name_width,
                    loc_w = location_width
                );
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(donors)?),
        OutputFormat::Tsv => {
            println!("id\tname\tblood_type\tlocation\tcontact");
            for d in donors {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    d.id.0, d.name, d.blood_type, d.location, d.contact
                );
            }
        }
    }
    Ok(())
}

fn print_requests(requests: &[BloodRequest], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            if requests.is_empty() {
                eprintln!("No requests found.");
                return Ok(());
            }

            println!("Open Requests ({})", requests.len());
            for r in requests {
                println!(
                    "\n{} {} needs {} in {} ({} urgency)",
                    r.id.0, r.patient_name, r.blood_type, r.location, r.urgency
                );
                if let Some(hospital) = &r.hospital_name {
                    println!("   Hospital: {hospital}");
                }
                println!("   Contact: {}", r.contact);
                println!("   Posted: {}", r.posted_at.format("%Y-%m-%d %H:%M UTC"));
                if let Some(notes) = &r.notes {
                    println!("   Notes: {notes}");
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(requests)?),
        OutputFormat::Tsv => {
            println!("id\tpatient_name\tblood_type\tlocation\turgency\tcontact\thospital_name\tposted_at");
            for r in requests {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    r.id.0,
                    r.patient_name,
                    r.blood_type,
                    r.location,
                    r.urgency,
                    r.contact,
                    r.hospital_name.as_deref().unwrap_or(""),
                    r.posted_at.to_rfc3339()
                );
            }
        }
    }
    Ok(())
}

fn print_hospitals(hospitals: &[Hospital], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            if hospitals.is_empty() {
                eprintln!("No hospitals listed.");
                return Ok(());
            }

            println!("Hospitals ({})", hospitals.len());
            for h in hospitals {
                println!("\n{} {} ({})", h.id.0, h.name, h.location);
                if let Some(contact) = &h.contact {
                    println!("   Contact: {contact}");
                }
                if !h.services.is_empty() {
                    println!("   Services: {}", h.services.join(", "));
                }
                if let Some(website) = &h.website {
                    println!("   Website: {website}");
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(hospitals)?),
        OutputFormat::Tsv => {
            println!("id\tname\tlocation\tcontact\tservices\twebsite");
            for h in hospitals {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    h.id.0,
                    h.name,
                    h.location,
                    h.contact.as_deref().unwrap_or(""),
                    h.services.join(";"),
                    h.website.as_deref().unwrap_or("")
                );
            }
        }
    }
    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

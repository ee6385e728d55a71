//! adaquery: run a query profile against the sample employees database.
//!
//! Opens a session, runs the profile's search, lists the returned field
//! names and prints every record through the string and integer accessors.

use std::path::PathBuf;

use clap::Parser;
use tracing::debug;

use open_mainframe_adaapi::{demo, AdaError, AdaResult, QueryProfile, Session};

/// Query the sample employees database.
#[derive(Parser)]
#[command(name = "adaquery", about = "Search an ADABAS file or map and print the records")]
struct Cli {
    /// Search predicate (defaults to the profile's predicate).
    predicate: Option<String>,

    /// Built-in profile to run (employees, employees-map).
    #[arg(short, long, default_value = "employees")]
    profile: String,

    /// Load the profile from a JSON file instead.
    #[arg(long = "profile-file")]
    profile_file: Option<PathBuf>,

    /// Connection string (e.g. "acj;target=24;config=[24,4]").
    #[arg(short, long)]
    config: Option<String>,

    /// List the built-in profiles and exit.
    #[arg(long)]
    list_profiles: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if cli.list_profiles {
        for name in QueryProfile::builtin_names() {
            println!("{name}");
        }
        return;
    }

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn load_profile(cli: &Cli) -> AdaResult<QueryProfile> {
    match &cli.profile_file {
        Some(path) => {
            let json = std::fs::read_to_string(path).map_err(|e| AdaError::Profile {
                reason: format!("{}: {e}", path.display()),
            })?;
            QueryProfile::from_json(&json)
        }
        None => QueryProfile::builtin(&cli.profile).ok_or_else(|| AdaError::Profile {
            reason: format!(
                "unknown profile '{}' (built-in: {})",
                cli.profile,
                QueryProfile::builtin_names().join(", ")
            ),
        }),
    }
}

fn run(cli: &Cli) -> AdaResult<()> {
    let profile = load_profile(cli)?;
    let config = match &cli.config {
        Some(config) => config.clone(),
        None if profile.uses_map() => "acj;map;config=[24,4]".to_string(),
        None => "acj;target=24;config=[24,4]".to_string(),
    };
    debug!(profile = %profile.name, config = %config, "starting query");

    let nucleus = demo::employees_nucleus()?;
    let mut session = Session::open(&nucleus, &config)?;
    let outcome = query(&mut session, &profile, cli.predicate.as_deref());
    let closed = session.close();
    outcome.and(closed)
}

fn query(session: &mut Session, profile: &QueryProfile, predicate: Option<&str>) -> AdaResult<()> {
    let count = session.search(
        profile.target.clone(),
        &profile.field_list(),
        profile.predicate(predicate),
    )?;
    println!("Got return {count}");

    for name in session.field_names()? {
        println!("Field {name}");
    }

    for record in session.records()? {
        println!("{}.Record", record.index());
        for field in &profile.string_fields {
            match record.string(field) {
                Ok(value) => println!(" Data {field} -> {value}"),
                Err(AdaError::UnknownField { .. }) => println!(" Data {field} -> <not returned>"),
                Err(e) => return Err(e),
            }
        }
        for field in &profile.integer_fields {
            match record.integer(field) {
                Ok(value) => println!(" Data {field} -> {value}"),
                Err(AdaError::TypeMismatch { format, .. }) => {
                    println!(" Data {field} -> <format {format}>")
                }
                Err(AdaError::UnknownField { .. }) => println!(" Data {field} -> <not returned>"),
                Err(e) => return Err(e),
            }
        }
    }
    Ok(())
}

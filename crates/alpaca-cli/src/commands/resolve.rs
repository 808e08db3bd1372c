//! Resolve command implementation

use std::path::Path;

use alpaca_core::{ConfigMerger, ContextPlan, Environment, MergeReport};
use alpaca_namespace::MemoryNamespace;
use colored::Colorize;

use crate::error::{CliError, Result};

/// Run the resolve command
///
/// Merges the bootstrap plan for `app` from a namespace snapshot into an
/// otherwise empty chain, then prints the chain and each requested key.
pub fn run_resolve(
    app: &str,
    profiles: &[String],
    snapshot: &Path,
    keys: &[String],
) -> Result<Environment> {
    if !snapshot.exists() {
        return Err(CliError::user(format!(
            "Snapshot not found: {}",
            snapshot.display()
        )));
    }
    let text = alpaca_fs::io::read_text(snapshot)?;
    let namespace = MemoryNamespace::from_yaml(&text)?;

    let mut environment = Environment::new().with_profiles(profiles.iter().cloned());
    let plan = ContextPlan::bootstrap(app, profiles);
    let report = ConfigMerger::new(&namespace).apply(&plan, &mut environment)?;

    print_chain(&environment, &report);
    print_keys(&environment, keys);
    Ok(environment)
}

fn print_chain(environment: &Environment, report: &MergeReport) {
    println!("{}:", "Property chain".bold());
    if environment.property_sources().is_empty() {
        println!("  {}", "No layers resolved".dimmed());
    }
    for source in environment.property_sources().iter() {
        println!(
            "  {} {} ({} properties)",
            "+".green(),
            source.name().cyan(),
            source.property_names().len()
        );
    }
    if report.skipped_empty > 0 {
        println!("  {} {} empty layer(s) skipped", "-".dimmed(), report.skipped_empty);
    }
    if report.document_errors > 0 {
        println!(
            "  {} {} document(s) failed to parse",
            "!".yellow(),
            report.document_errors
        );
    }
}

fn print_keys(environment: &Environment, keys: &[String]) {
    if keys.is_empty() {
        return;
    }
    println!();
    println!("{}:", "Properties".bold());
    for key in keys {
        match environment.property_sources().resolve(key) {
            Some((source, value)) => {
                println!("  {} = {} {}", key.cyan(), value, format!("[{source}]").dimmed())
            }
            None => println!("  {} {}", key.cyan(), "(unset)".dimmed()),
        }
    }
}

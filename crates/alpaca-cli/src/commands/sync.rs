//! Sync command implementation

use std::path::PathBuf;
use std::time::Duration;

use alpaca_core::settings::default_basedir;
use alpaca_git::{RepoState, RepoSync, SyncReport, TransportOptions};
use colored::Colorize;

use crate::error::Result;

/// Arguments for [`run_sync`].
#[derive(Debug, Clone)]
pub struct SyncArgs {
    pub uri: String,
    pub basedir: Option<PathBuf>,
    pub label: String,
    pub username: String,
    pub password: String,
    pub proxy: Option<String>,
    pub timeout: Duration,
}

/// Run the sync command
pub fn run_sync(args: SyncArgs) -> Result<SyncReport> {
    let basedir = args.basedir.unwrap_or_else(default_basedir);
    let transport = TransportOptions {
        username: args.username,
        password: args.password,
        proxy: args.proxy.filter(|p| !p.trim().is_empty()),
        timeout: args.timeout,
    };

    println!(
        "{} {} into {}",
        "Syncing".green().bold(),
        args.uri.cyan(),
        basedir.display()
    );

    let report = RepoSync::new(&args.uri, &basedir)
        .with_transport(transport)
        .sync(&args.label)?;

    print_report(&report);
    Ok(report)
}

fn print_report(report: &SyncReport) {
    println!();
    println!("{}:   {}", "Label".dimmed(), report.label.cyan());
    println!(
        "{}:   {} -> {}",
        "State".dimmed(),
        state_label(report.initial_state),
        state_label(report.final_state)
    );
    println!("{}:   {}", "Refs".dimmed(), report.updated_refs);

    if report.merged {
        println!("  {} merged origin/{}", "+".green(), report.label);
    }
    if report.reset {
        println!("  {} reset to origin/{}", "!".yellow(), report.label);
    }
    if !report.dirty_files.is_empty() {
        println!("{}:", "Dirty files".bold());
        for file in &report.dirty_files {
            println!("  {} {}", "-".yellow(), file);
        }
    }
}

fn state_label(state: RepoState) -> colored::ColoredString {
    match state {
        RepoState::Absent => state.to_string().dimmed(),
        RepoState::OpenClean | RepoState::Synced => state.to_string().green(),
        RepoState::OpenDirty => state.to_string().yellow(),
    }
}

//! Plan command implementation

use alpaca_core::ContextPlan;
use colored::Colorize;

use crate::error::Result;

/// Run the plan command
///
/// Exactly one of `app` and `component` is expected; clap enforces it.
pub fn run_plan(app: Option<&str>, component: Option<&str>, profiles: &[String]) -> Result<ContextPlan> {
    let (title, plan) = match (app, component) {
        (Some(app), _) => (format!("Bootstrap plan for {app}"), ContextPlan::bootstrap(app, profiles)),
        (None, Some(prefix)) => (
            format!("Component plan for {prefix}"),
            ContextPlan::component(prefix, profiles),
        ),
        (None, None) => (String::from("Empty plan"), ContextPlan::default()),
    };

    println!("{}", title.bold());
    println!("{}:   {}", "Profiles".dimmed(), profiles.join(", "));
    println!();

    if plan.is_empty() {
        println!("  {} (prefix is not a resolvable family)", "Nothing to resolve".dimmed());
        return Ok(plan);
    }

    println!("{}:", "Declared".bold());
    for entry in plan.declared() {
        println!("  {} {}", "-".dimmed(), entry);
    }
    println!();

    println!("{}:", "Resolution order (highest precedence first)".bold());
    for (rank, entry) in plan.resolution_order().enumerate() {
        println!("  {}. {}", rank + 1, entry.to_string().cyan());
    }

    Ok(plan)
}

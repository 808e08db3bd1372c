//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// alpaca - Inspect and exercise layered configuration resolution
#[derive(Parser, Debug)]
#[command(name = "alpaca")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Synchronize a configuration repository working copy
    ///
    /// Clones when the base directory holds no repository, otherwise fetches,
    /// merges, checks out the label and resets local modifications.
    ///
    /// Examples:
    ///   alpaca sync --uri https://git.example/config.git
    ///   alpaca sync --uri ../config --basedir /tmp/cfg --label release-1
    Sync {
        /// Repository URI
        #[arg(long, env = "ALPACA_CONFIG_URI")]
        uri: String,

        /// Local working copy directory
        #[arg(long)]
        basedir: Option<PathBuf>,

        /// Branch, tag or commit to check out
        #[arg(long, default_value = "master")]
        label: String,

        /// Username for HTTP authentication
        #[arg(long, default_value = "")]
        username: String,

        /// Password for HTTP authentication
        #[arg(long, env = "ALPACA_CONFIG_PASSWORD", default_value = "", hide_env_values = true)]
        password: String,

        /// HTTP proxy URL
        #[arg(long, env = "alpaca_http_proxy")]
        proxy: Option<String>,

        /// Network timeout in seconds
        #[arg(long, default_value_t = 5)]
        timeout: u64,
    },

    /// Show which namespace paths would be resolved, and in which order
    ///
    /// Examples:
    ///   alpaca plan --app billing -p dev
    ///   alpaca plan --component alpaca.datasource.primary -p dev -p local
    Plan {
        /// Application name for the bootstrap plan
        #[arg(long, required_unless_present = "component", conflicts_with = "component")]
        app: Option<String>,

        /// Declared prefix of a component
        #[arg(long)]
        component: Option<String>,

        /// Active profiles, in order
        #[arg(short, long = "profile", required = true)]
        profiles: Vec<String>,
    },

    /// Merge a namespace snapshot into a fresh chain and print the result
    ///
    /// The snapshot is a YAML tree mirroring the namespace; leaf scalars
    /// become node payloads.
    Resolve {
        /// Application name
        #[arg(long)]
        app: String,

        /// Active profiles, in order
        #[arg(short, long = "profile", required = true)]
        profiles: Vec<String>,

        /// Namespace snapshot file
        #[arg(long)]
        snapshot: PathBuf,

        /// Keys to look up in the merged chain
        #[arg(short, long = "key")]
        keys: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Commands {
        Cli::try_parse_from(args).unwrap().command.unwrap()
    }

    #[test]
    fn test_sync_defaults() {
        match parse(&["alpaca", "sync", "--uri", "../config"]) {
            Commands::Sync { uri, label, timeout, basedir, .. } => {
                assert_eq!(uri, "../config");
                assert_eq!(label, "master");
                assert_eq!(timeout, 5);
                assert!(basedir.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_plan_repeats_profiles() {
        let cmd = parse(&["alpaca", "plan", "--app", "svc", "-p", "dev", "-p", "local"]);
        assert_eq!(
            cmd,
            Commands::Plan {
                app: Some("svc".into()),
                component: None,
                profiles: vec!["dev".into(), "local".into()],
            }
        );
    }

    #[test]
    fn test_plan_requires_app_or_component() {
        assert!(Cli::try_parse_from(["alpaca", "plan", "-p", "dev"]).is_err());
        assert!(
            Cli::try_parse_from([
                "alpaca", "plan", "--app", "svc", "--component", "server", "-p", "dev"
            ])
            .is_err()
        );
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["alpaca", "plan", "--app", "svc", "-p", "dev", "-v"]).unwrap();
        assert!(cli.verbose);
    }
}

//! Startup orchestration
//!
//! ```text
//! application name ─► RepoSync ─► file layers ─► connect ─► bootstrap plan ─► merge
//! ```

use std::sync::Arc;

use alpaca_fs::PropertyMap;
use alpaca_git::{RepoSync, SyncReport};
use alpaca_namespace::{ConnectSettings, CoordinationClient};

use crate::merger::{self, MergeReport};
use crate::settings::{BootstrapSettings, RepositorySettings};
use crate::{ConfigMerger, ContextPlan, Environment, LayeredSource, Result};

/// Opens the coordination-service client once the connection settings are known.
pub type Connector<'a> =
    dyn FnOnce(&ConnectSettings) -> alpaca_namespace::Result<Arc<dyn CoordinationClient>> + 'a;

/// Outcome of a successful bootstrap.
pub struct Bootstrapped {
    pub application_name: String,
    pub profiles: Vec<String>,
    /// `None` when no repository URI was configured.
    pub sync: Option<SyncReport>,
    /// File layers and namespace layers installed during bootstrap.
    pub merge: MergeReport,
    /// The client, for later component resolution passes.
    pub client: Arc<dyn CoordinationClient>,
}

impl std::fmt::Debug for Bootstrapped {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bootstrapped")
            .field("application_name", &self.application_name)
            .field("profiles", &self.profiles)
            .field("sync", &self.sync)
            .field("merge", &self.merge)
            .finish_non_exhaustive()
    }
}

/// Single-threaded startup pass over a host environment.
pub struct Bootstrap;

impl Bootstrap {
    /// Run the full startup pass.
    ///
    /// 1. Require `alpaca.application.name`.
    /// 2. When `alpaca.config.uri` is set, synchronize the repository and
    ///    install `<basedir>/<profile>.yml` for every active profile.
    /// 3. Connect through `connector` with settings read from the chain as
    ///    it now stands.
    /// 4. Merge the bootstrap plan's namespace layers.
    pub fn run(
        environment: &mut Environment,
        connector: Box<Connector<'_>>,
    ) -> Result<Bootstrapped> {
        let application_name = BootstrapSettings::application_name(environment)?;
        let profiles = environment.active_profiles();
        let mut merge = MergeReport::default();

        let sync = match RepositorySettings::from_environment(environment)? {
            Some(repository) => {
                let report = sync_repository(&repository)?;
                merge.absorb(install_file_layers(environment, &repository, &profiles));
                Some(report)
            }
            None => {
                tracing::info!("No configuration repository configured, skipping sync");
                None
            }
        };

        let connect = BootstrapSettings::connect_settings(environment)?;
        tracing::info!(connect_string = %connect.connect_string, "Using coordination service");
        let client = connector(&connect)?;

        let plan = ContextPlan::bootstrap(&application_name, &profiles);
        merge.absorb(ConfigMerger::new(client.as_ref()).apply(&plan, environment)?);

        tracing::info!(
            application = %application_name,
            installed = merge.installed.len(),
            "Bootstrap complete"
        );
        Ok(Bootstrapped {
            application_name,
            profiles,
            sync,
            merge,
            client,
        })
    }

    /// Run with an already connected client.
    pub fn run_with_client(
        environment: &mut Environment,
        client: Arc<dyn CoordinationClient>,
    ) -> Result<Bootstrapped> {
        Self::run(environment, Box::new(move |_: &ConnectSettings| Ok(client)))
    }

    /// Run with a ZooKeeper client.
    #[cfg(feature = "zookeeper")]
    pub fn run_with_zookeeper(environment: &mut Environment) -> Result<Bootstrapped> {
        Self::run(
            environment,
            Box::new(|settings: &ConnectSettings| {
                let client = alpaca_namespace::ZkClient::connect(settings)?;
                Ok(Arc::new(client) as Arc<dyn CoordinationClient>)
            }),
        )
    }
}

fn sync_repository(repository: &RepositorySettings) -> Result<SyncReport> {
    tracing::info!(
        uri = %repository.uri,
        label = %repository.label,
        basedir = %repository.basedir.display(),
        "Synchronizing configuration repository"
    );
    let report = RepoSync::new(&repository.uri, &repository.basedir)
        .with_transport(repository.transport.clone())
        .sync(&repository.label)?;
    Ok(report)
}

/// Name of the file layer for `profile`.
pub fn file_layer_name(profile: &str) -> String {
    format!("repository:{profile}.yml")
}

/// Install `<basedir>/<profile>.yml` for each profile, in profile order.
///
/// Missing files are skipped. A file that fails to parse is logged and
/// counted, never fatal.
fn install_file_layers(
    environment: &mut Environment,
    repository: &RepositorySettings,
    profiles: &[String],
) -> MergeReport {
    let mut report = MergeReport::default();
    tracing::info!(profiles = ?profiles, "Loading profile files");

    for profile in profiles {
        let path = repository.basedir.join(format!("{profile}.yml"));
        let entries: PropertyMap = match alpaca_fs::load_file(&path) {
            Ok(Some(entries)) => entries,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable profile file");
                report.document_errors += 1;
                continue;
            }
        };
        let source = LayeredSource::new(file_layer_name(profile), "", entries);
        merger::install(environment, source, &mut report);
    }
    report
}

//! Per-call transport configuration for network operations

use std::cell::Cell;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use git2::{AutotagOption, Cred, CredentialType, FetchOptions, ProxyOptions, RemoteCallbacks};

/// Credential callback invocations allowed per operation before giving up.
const MAX_CREDENTIAL_ATTEMPTS: u32 = 3;

/// Serializes every read and write of libgit2's server timeout options.
static SERVER_TIMEOUTS: Mutex<()> = Mutex::new(());

/// Credentials, proxy and deadline for one clone or fetch.
///
/// When `proxy` is `None`, git's own proxy configuration (`http.proxy`,
/// `https_proxy`, ...) is honored. The deadline bounds connecting and every
/// socket read through [`TransportOptions::server_timeouts`], and the
/// transfer as a whole through the progress callbacks.
#[derive(Clone, PartialEq, Eq)]
pub struct TransportOptions {
    pub username: String,
    pub password: String,
    pub proxy: Option<String>,
    pub timeout: Duration,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            proxy: None,
            timeout: Duration::from_secs(5),
        }
    }
}

impl fmt::Debug for TransportOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportOptions")
            .field("username", &self.username)
            .field("password", &"***")
            .field("proxy", &self.proxy)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl TransportOptions {
    /// Build fetch options for one network call.
    ///
    /// The deadline starts now. Transfers still running once it passes are
    /// cancelled from the progress callbacks; pair with
    /// [`TransportOptions::server_timeouts`] so a silent remote is bounded
    /// too. Every updated ref is counted into `updated_refs`. All tags are
    /// fetched.
    pub fn fetch_options<'a>(&'a self, updated_refs: &'a Cell<usize>) -> FetchOptions<'a> {
        let deadline = Instant::now() + self.timeout;
        let timeout = self.timeout;

        let mut callbacks = RemoteCallbacks::new();

        let mut attempts = 0;
        callbacks.credentials(move |url, username_from_url, allowed| {
            attempts += 1;
            if attempts > MAX_CREDENTIAL_ATTEMPTS {
                return Err(git2::Error::from_str(&format!(
                    "authentication to {url} failed after {MAX_CREDENTIAL_ATTEMPTS} attempts"
                )));
            }
            tracing::debug!(url, ?allowed, attempt = attempts, "Credentials requested");

            if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) && !self.username.is_empty() {
                Cred::userpass_plaintext(&self.username, &self.password)
            } else if allowed.contains(CredentialType::SSH_KEY) {
                Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"))
            } else if allowed.contains(CredentialType::USERNAME) {
                Cred::username(username_from_url.unwrap_or(&self.username))
            } else {
                Cred::default()
            }
        });

        callbacks.transfer_progress(move |_progress| within_deadline(deadline, timeout));
        callbacks.sideband_progress(move |_data| within_deadline(deadline, timeout));

        callbacks.update_tips(move |refname, old, new| {
            tracing::debug!(refname, %old, %new, "Updated ref");
            updated_refs.set(updated_refs.get() + 1);
            true
        });

        let mut proxy = ProxyOptions::new();
        match &self.proxy {
            Some(url) => {
                tracing::info!(proxy = %url, "Using proxy for repository transport");
                proxy.url(url);
            }
            None => {
                proxy.auto();
            }
        }

        let mut options = FetchOptions::new();
        options
            .remote_callbacks(callbacks)
            .proxy_options(proxy)
            .download_tags(AutotagOption::All);
        options
    }

    /// Apply the timeout to libgit2's connect and read timeouts until the
    /// returned guard is dropped.
    ///
    /// These options are process-wide. The guard holds a lock for its whole
    /// lifetime and restores the previous values on drop, so concurrent
    /// network calls run one at a time.
    pub fn server_timeouts(&self) -> Result<ServerTimeoutGuard, git2::Error> {
        let lock = SERVER_TIMEOUTS.lock().unwrap_or_else(PoisonError::into_inner);
        let millis = i32::try_from(self.timeout.as_millis())
            .unwrap_or(i32::MAX)
            .max(1);

        // SAFETY: SERVER_TIMEOUTS is held for every access to these options.
        let previous = unsafe {
            let connect = git2::opts::get_server_connect_timeout_in_milliseconds()?;
            let read = git2::opts::get_server_timeout_in_milliseconds()?;
            git2::opts::set_server_connect_timeout_in_milliseconds(millis)?;
            if let Err(e) = git2::opts::set_server_timeout_in_milliseconds(millis) {
                let _ = git2::opts::set_server_connect_timeout_in_milliseconds(connect);
                return Err(e);
            }
            (connect, read)
        };
        tracing::debug!(timeout_ms = millis, "Applied server timeouts");

        Ok(ServerTimeoutGuard {
            previous,
            _lock: lock,
        })
    }
}

/// Restores libgit2's server timeouts when dropped.
#[must_use = "the timeouts are restored as soon as the guard is dropped"]
pub struct ServerTimeoutGuard {
    previous: (i32, i32),
    _lock: MutexGuard<'static, ()>,
}

impl fmt::Debug for ServerTimeoutGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerTimeoutGuard")
            .field("previous", &self.previous)
            .finish_non_exhaustive()
    }
}

impl Drop for ServerTimeoutGuard {
    fn drop(&mut self) {
        let (connect, read) = self.previous;
        // SAFETY: the lock field is still held while this runs.
        let restored = unsafe {
            git2::opts::set_server_connect_timeout_in_milliseconds(connect)
                .and_then(|()| git2::opts::set_server_timeout_in_milliseconds(read))
        };
        if let Err(e) = restored {
            tracing::warn!(error = %e, "Could not restore server timeouts");
        }
    }
}

fn within_deadline(deadline: Instant, timeout: Duration) -> bool {
    let ok = Instant::now() < deadline;
    if !ok {
        tracing::warn!(timeout_secs = timeout.as_secs(), "Transfer exceeded deadline, cancelling");
    }
    ok
}

//! ZooKeeper-backed [`CoordinationClient`]

use std::sync::mpsc;
use std::time::Instant;

use zookeeper::{KeeperState, WatchedEvent, ZkError, ZooKeeper};

use crate::{ConnectSettings, CoordinationClient, Error, NodePath, Result, connect_with_retry};

/// A live ZooKeeper session.
pub struct ZkClient {
    zk: ZooKeeper,
}

impl ZkClient {
    /// Connect with the retry policy in `settings`.
    ///
    /// Each attempt waits up to `connect_wait` for the session to reach
    /// `SyncConnected`.
    pub fn connect(settings: &ConnectSettings) -> Result<Self> {
        connect_with_retry(settings, Self::connect_once)
    }

    fn connect_once(settings: &ConnectSettings) -> Result<Self> {
        let connect_string = settings.connect_string.clone();
        let (tx, rx) = mpsc::channel();
        let watcher = move |event: WatchedEvent| {
            // The receiver is dropped after the session is up.
            let _ = tx.send(event.keeper_state);
        };

        let zk = ZooKeeper::connect(&connect_string, settings.connect_wait, watcher).map_err(
            |e| Error::Connect {
                connect_string: connect_string.clone(),
                message: e.to_string(),
            },
        )?;

        let deadline = Instant::now() + settings.connect_wait;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                let _ = zk.close();
                return Err(Error::SessionTimeout {
                    connect_string,
                    wait: settings.connect_wait,
                });
            }
            match rx.recv_timeout(remaining) {
                Ok(KeeperState::SyncConnected) | Ok(KeeperState::ConnectedReadOnly) => break,
                Ok(state) => {
                    tracing::debug!(?state, "ZooKeeper session state changed");
                }
                Err(mpsc::RecvTimeoutError::Timeout) => continue,
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    return Err(Error::Interrupted { connect_string });
                }
            }
        }

        tracing::info!(connect_string = %connect_string, "Connected to ZooKeeper");
        Ok(Self { zk })
    }

    /// Close the session.
    pub fn close(self) -> Result<()> {
        self.zk
            .close()
            .map_err(|e| Error::client(NodePath::root(), e))
    }
}

fn not_found_as_none<T>(path: &NodePath, result: std::result::Result<T, ZkError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ZkError::NoNode) => Ok(None),
        Err(e) => Err(Error::client(path, e)),
    }
}

impl CoordinationClient for ZkClient {
    fn get_data(&self, path: &NodePath) -> Result<Option<Vec<u8>>> {
        let result = self.zk.get_data(path.as_str(), false).map(|(data, _stat)| data);
        not_found_as_none(path, result)
    }

    fn get_children(&self, path: &NodePath) -> Result<Option<Vec<String>>> {
        not_found_as_none(path, self.zk.get_children(path.as_str(), false))
    }
}

impl std::fmt::Debug for ZkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZkClient").finish_non_exhaustive()
    }
}

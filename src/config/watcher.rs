//! Configuration file watcher for hot reload.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::HealthzConfig;

/// Watches the configuration file and emits every valid new version.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<HealthzConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<HealthzConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. The returned watcher must be kept alive.
    ///
    /// Invalid files are logged and skipped; the receiver only sees
    /// configurations that passed validation.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx;
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    match load_config(&path) {
                        Ok(config) => {
                            tracing::info!(
                                path = %path.display(),
                                status_port = config.status_port,
                                "Config change detected"
                            );
                            let _ = tx.send(config);
                        }
                        Err(e) => {
                            tracing::error!(
                                path = %path.display(),
                                error = %e,
                                "Failed to reload config, keeping current configuration"
                            );
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %self.path.display(), "Config watcher started");
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio::time::timeout;

    /// Overwrite in place with one write so the watcher never sees an empty file.
    fn overwrite(path: &Path, content: &str) {
        let mut file = std::fs::OpenOptions::new().write(true).open(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.sync_all().unwrap();
    }

    async fn drain(updates: &mut mpsc::UnboundedReceiver<HealthzConfig>) {
        while let Ok(Some(_)) = timeout(Duration::from_millis(500), updates.recv()).await {}
    }

    #[tokio::test]
    async fn test_emits_valid_and_skips_invalid_updates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("healthz.toml");
        std::fs::write(&path, "status_port = 20001\n").unwrap();

        let (watcher, mut updates) = ConfigWatcher::new(&path);
        let _watcher = watcher.run().unwrap();

        overwrite(&path, "status_port = 20002\n");
        let next = timeout(Duration::from_secs(10), updates.recv())
            .await
            .expect("valid change should be delivered")
            .unwrap();
        assert_eq!(next.status_port, 20002);
        drain(&mut updates).await;

        // Longer than the previous content, so the old bytes are fully covered.
        overwrite(&path, "status_port = 0\nprobe_timeout_ms = 5000\n");
        let nothing = timeout(Duration::from_millis(1500), updates.recv()).await;
        assert!(
            !matches!(nothing, Ok(Some(_))),
            "invalid config must not be delivered"
        );
    }
}

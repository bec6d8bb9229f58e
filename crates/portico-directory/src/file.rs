//! File-based tenant directory
//!
//! Loads tenant records from a YAML (or TOML) file, keyed by normalized
//! domain, for development and small self-hosted deployments. A
//! background watcher can reload the file on change; reloads replace
//! the whole snapshot atomically so readers never observe a partial
//! directory.

use async_trait::async_trait;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use portico_core::{Error, Result, TenantDirectory, TenantSite, normalize_domain};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, error, info, warn};

/// On-disk shape of the tenants file.
#[derive(Debug, Deserialize)]
struct TenantsFile {
    #[serde(default)]
    tenants: Vec<TenantSite>,
}

type Snapshot = Arc<HashMap<String, TenantSite>>;

/// Tenant directory backed by a single file on disk.
#[derive(Debug)]
pub struct FileTenantDirectory {
    /// Path to the tenants file
    path: PathBuf,
    /// Current snapshot, replaced wholesale on reload
    snapshot: RwLock<Snapshot>,
}

impl FileTenantDirectory {
    /// Load a tenants file.
    ///
    /// YAML by default, TOML when the extension is `.toml`. Domains are
    /// normalized at load time; two records normalizing to the same
    /// domain are a load error, not a silent override.
    ///
    /// # Errors
    /// - `Error::ConfigNotFound` if the file doesn't exist
    /// - `Error::Config` if it can't be parsed or contains duplicates
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = expand_tilde(path.into())?;

        if !path.exists() {
            return Err(Error::ConfigNotFound);
        }

        let snapshot = Arc::new(load_snapshot(&path)?);
        info!("Loaded {} tenants from {:?}", snapshot.len(), path);

        Ok(Self {
            path,
            snapshot: RwLock::new(snapshot),
        })
    }

    /// Number of tenants in the current snapshot.
    pub fn len(&self) -> usize {
        self.current().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current().is_empty()
    }

    fn current(&self) -> Snapshot {
        self.snapshot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Re-read the file and atomically replace the snapshot.
    ///
    /// On failure the previous snapshot stays in place.
    pub fn reload(&self) -> Result<usize> {
        let next = Arc::new(load_snapshot(&self.path)?);
        let count = next.len();
        *self
            .snapshot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = next;
        debug!("Replaced tenant directory snapshot ({} tenants)", count);
        Ok(count)
    }

    /// Spawn a background watcher that reloads the snapshot whenever
    /// the file changes. Reload failures log and keep the previous
    /// snapshot; the watcher runs for the life of the process.
    pub fn watch(self: &Arc<Self>) {
        let directory = Arc::clone(self);

        tokio::task::spawn_blocking(move || {
            let (notify_tx, notify_rx) = std::sync::mpsc::channel();

            // Use std::result::Result to avoid conflict with our Result type
            let mut watcher = match RecommendedWatcher::new(
                move |res: std::result::Result<Event, notify::Error>| {
                    if let Err(e) = notify_tx.send(res) {
                        error!("Failed to send file watch event: {}", e);
                    }
                },
                notify::Config::default(),
            ) {
                Ok(w) => w,
                Err(e) => {
                    error!("Failed to create tenants file watcher: {}", e);
                    return;
                }
            };

            if let Err(e) = watcher.watch(&directory.path, RecursiveMode::NonRecursive) {
                error!("Failed to watch tenants file: {}", e);
                return;
            }

            info!("Watching tenants file for changes: {:?}", directory.path);

            while let Ok(event_result) = notify_rx.recv() {
                match event_result {
                    Ok(event) => {
                        if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                            match directory.reload() {
                                Ok(count) => {
                                    info!("Tenants file changed, reloaded {} tenants", count)
                                }
                                Err(e) => warn!(
                                    "Tenants file reload failed, keeping previous snapshot: {}",
                                    e
                                ),
                            }
                        }
                    }
                    Err(e) => warn!("Tenants file watch error: {}", e),
                }
            }
        });
    }
}

#[async_trait]
impl TenantDirectory for FileTenantDirectory {
    /// Lookup by normalized domain. Callers going through
    /// `resolve_tenant` get normalization for free.
    async fn lookup(&self, domain: &str) -> Result<Option<TenantSite>> {
        Ok(self.current().get(domain).cloned())
    }
}

/// Read and key the tenants file by normalized domain.
fn load_snapshot(path: &Path) -> Result<HashMap<String, TenantSite>> {
    let contents = std::fs::read_to_string(path)?;

    let file: TenantsFile = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
        toml::from_str(&contents).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?
    } else {
        serde_yaml::from_str(&contents).map_err(|e| Error::Config(format!("Invalid YAML: {}", e)))?
    };

    let mut map = HashMap::with_capacity(file.tenants.len());
    for site in file.tenants {
        let domain = normalize_domain(&site.domain);
        if domain.is_empty() {
            return Err(Error::Config(format!(
                "Tenant '{}' has an empty domain",
                site.name
            )));
        }
        if let Some(existing) = map.insert(domain.clone(), site) {
            return Err(Error::Config(format!(
                "Duplicate tenant domain after normalization: '{}' (first held by '{}')",
                domain, existing.name
            )));
        }
    }
    Ok(map)
}

/// Expand a leading tilde to the home directory.
fn expand_tilde(path: PathBuf) -> Result<PathBuf> {
    if let Ok(stripped) = path.strip_prefix("~") {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;
        Ok(home.join(stripped))
    } else {
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    const SAMPLE_YAML: &str = r#"
tenants:
  - domain: example.com
    name: Example
    archetype: landing
    template_name: launchpad
  - domain: www.harbor-cafe.test
    name: Harbor Cafe
    archetype: directory
    template_name: harbor
"#;

    #[tokio::test]
    async fn missing_file_is_config_not_found() {
        let result = FileTenantDirectory::new("/nonexistent/tenants.yaml").await;
        assert!(matches!(result.unwrap_err(), Error::ConfigNotFound));
    }

    #[tokio::test]
    async fn loads_yaml_and_keys_by_normalized_domain() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), SAMPLE_YAML).unwrap();

        let directory = FileTenantDirectory::new(file.path()).await.unwrap();
        assert_eq!(directory.len(), 2);

        let site = directory.lookup("example.com").await.unwrap().unwrap();
        assert_eq!(site.name, "Example");

        // The www. prefix was stripped at load time.
        let cafe = directory.lookup("harbor-cafe.test").await.unwrap().unwrap();
        assert_eq!(cafe.template_name, "harbor");
        assert!(directory.lookup("www.harbor-cafe.test").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_domain_is_none() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), SAMPLE_YAML).unwrap();

        let directory = FileTenantDirectory::new(file.path()).await.unwrap();
        assert!(directory.lookup("unknown.test").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_normalized_domains_fail_to_load() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            r#"
tenants:
  - domain: example.com
    name: First
    archetype: landing
  - domain: www.example.com
    name: Second
    archetype: static
"#,
        )
        .unwrap();

        let err = FileTenantDirectory::new(file.path()).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("Duplicate tenant domain"));
    }

    #[tokio::test]
    async fn invalid_yaml_fails_to_load() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "tenants: [not: [valid").unwrap();

        assert!(FileTenantDirectory::new(file.path()).await.is_err());
    }

    #[tokio::test]
    async fn toml_extension_switches_parser() {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        std::fs::write(
            file.path(),
            r#"
[[tenants]]
domain = "example.com"
name = "Example"
archetype = "service"
template_name = "atelier"
"#,
        )
        .unwrap();

        let directory = FileTenantDirectory::new(file.path()).await.unwrap();
        let site = directory.lookup("example.com").await.unwrap().unwrap();
        assert_eq!(site.template_name, "atelier");
    }

    #[tokio::test]
    async fn reload_replaces_the_snapshot() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), SAMPLE_YAML).unwrap();

        let directory = FileTenantDirectory::new(file.path()).await.unwrap();
        assert_eq!(directory.len(), 2);

        std::fs::write(
            file.path(),
            r#"
tenants:
  - domain: example.com
    name: Example (renamed)
    archetype: landing
"#,
        )
        .unwrap();

        assert_eq!(directory.reload().unwrap(), 1);
        let site = directory.lookup("example.com").await.unwrap().unwrap();
        assert_eq!(site.name, "Example (renamed)");
        assert!(directory.lookup("harbor-cafe.test").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_snapshot() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), SAMPLE_YAML).unwrap();

        let directory = FileTenantDirectory::new(file.path()).await.unwrap();
        std::fs::write(file.path(), "tenants: [broken").unwrap();

        assert!(directory.reload().is_err());
        assert_eq!(directory.len(), 2);
        assert!(directory.lookup("example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn empty_tenants_list_is_valid() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "tenants: []\n").unwrap();

        let directory = FileTenantDirectory::new(file.path()).await.unwrap();
        assert!(directory.is_empty());
    }
}

//! Loading widget markup from built UI assets.

use async_trait::async_trait;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use thiserror::Error;
use tokio::sync::OnceCell;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error(
        "Widget HTML for \"{component}\" not found in {dir}. Build the UI assets before starting the server."
    )]
    NotFound { component: String, dir: PathBuf },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Somewhere widget markup can be loaded from, by logical component name.
#[async_trait]
pub trait MarkupSource: Send + Sync + 'static {
    async fn load_markup(&self, component: &str) -> Result<String, AssetError>;
}

/// Markup read from a directory of built assets.
///
/// `{component}.html` is preferred. Failing that, builds that emit hashed or versioned filenames
/// (`{component}-<suffix>.html`) are matched, and the lexicographically last one wins.
#[derive(Debug, Clone)]
pub struct AssetDir {
    dir: PathBuf,
}

impl AssetDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    async fn find_versioned(&self, component: &str) -> Result<Option<PathBuf>, AssetError> {
        let prefix = format!("{component}-");
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(AssetError::Io {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut best: Option<String> = None;
        while let Some(entry) = entries.next_entry().await.map_err(|source| AssetError::Io {
            path: self.dir.clone(),
            source,
        })? {
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if name.starts_with(&prefix)
                && name.ends_with(".html")
                && best.as_ref().map_or(true, |b| name > *b)
            {
                best = Some(name);
            }
        }
        Ok(best.map(|name| self.dir.join(name)))
    }
}

async fn read_file(path: &Path) -> Result<String, AssetError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[async_trait]
impl MarkupSource for AssetDir {
    async fn load_markup(&self, component: &str) -> Result<String, AssetError> {
        let exact = self.dir.join(format!("{component}.html"));
        let exists = tokio::fs::try_exists(&exact)
            .await
            .map_err(|source| AssetError::Io {
                path: exact.clone(),
                source,
            })?;
        if exists {
            tracing::debug!(path = %exact.display(), "Loading widget markup");
            return read_file(&exact).await;
        }

        match self.find_versioned(component).await? {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading versioned widget markup");
                read_file(&path).await
            }
            None => Err(AssetError::NotFound {
                component: component.to_string(),
                dir: self.dir.clone(),
            }),
        }
    }
}

/// Fixed markup, keyed by component name. Useful for tests and for embedding assets in the binary.
#[derive(Debug, Clone, Default)]
pub struct StaticMarkup {
    components: HashMap<String, String>,
}

impl StaticMarkup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_component(mut self, component: impl Into<String>, html: impl Into<String>) -> Self {
        self.components.insert(component.into(), html.into());
        self
    }
}

#[async_trait]
impl MarkupSource for StaticMarkup {
    async fn load_markup(&self, component: &str) -> Result<String, AssetError> {
        self.components
            .get(component)
            .cloned()
            .ok_or_else(|| AssetError::NotFound {
                component: component.to_string(),
                dir: PathBuf::from("<static>"),
            })
    }
}

/// Memoizes markup per component.
///
/// Concurrent first loads of the same component share one underlying load. A failed load is not
/// remembered, so the next caller tries again.
pub struct MarkupCache<S> {
    source: S,
    cells: Mutex<HashMap<String, Arc<OnceCell<Arc<str>>>>>,
}

impl<S: MarkupSource> MarkupCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cells: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get(&self, component: &str) -> Result<Arc<str>, AssetError> {
        let cell = {
            // The lock is only held to find the cell, never across the load.
            let mut cells = self.cells.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(cells.entry(component.to_string()).or_default())
        };

        cell.get_or_try_init(|| async {
            let html = self.source.load_markup(component).await?;
            Ok::<_, AssetError>(Arc::from(html))
        })
        .await
        .cloned()
    }
}

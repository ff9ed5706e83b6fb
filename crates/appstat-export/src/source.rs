//! Document sources
//!
//! A source exposes top-level collections, the sub-collections nested
//! under one document, and a stream of documents per collection.

use appstat_core::error::{AppstatError, Result};
use async_trait::async_trait;
use futures::stream::Stream;
use std::fmt;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tracing::debug;
use walkdir::WalkDir;

/// A document: field name to JSON value
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Location of a collection inside the store
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CollectionPath {
    /// A top-level collection
    Root(String),
    /// A sub-collection of one document
    Nested {
        collection: String,
        document: String,
        subcollection: String,
    },
}

impl CollectionPath {
    /// Name of the innermost collection, used as the CSV file stem
    pub fn name(&self) -> &str {
        match self {
            CollectionPath::Root(name) => name,
            CollectionPath::Nested { subcollection, .. } => subcollection,
        }
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionPath::Root(name) => write!(f, "{name}"),
            CollectionPath::Nested {
                collection,
                document,
                subcollection,
            } => write!(f, "{collection}/{document}/{subcollection}"),
        }
    }
}

/// Trait for document stores that can be exported
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Names of the top-level collections
    async fn collections(&self) -> Result<Vec<String>>;

    /// Names of the sub-collections under `collection/document`
    async fn subcollections(&self, collection: &str, document: &str) -> Result<Vec<String>>;

    /// Stream the documents of one collection
    fn documents(
        &self,
        path: &CollectionPath,
    ) -> Pin<Box<dyn Stream<Item = Result<Document>> + Send + '_>>;
}

/// Source backed by JSON array dumps on disk
///
/// Layout: `<root>/<collection>.json` for top-level collections and
/// `<root>/<collection>/<document>/<subcollection>.json` for nested ones.
/// Each file holds a JSON array of objects.
pub struct JsonDumpSource {
    root: PathBuf,
}

impl JsonDumpSource {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(AppstatError::Config(format!(
                "dump directory {} does not exist",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    fn file_for(&self, path: &CollectionPath) -> PathBuf {
        match path {
            CollectionPath::Root(name) => self.root.join(format!("{name}.json")),
            CollectionPath::Nested {
                collection,
                document,
                subcollection,
            } => self
                .root
                .join(collection)
                .join(document)
                .join(format!("{subcollection}.json")),
        }
    }

    /// Stems of `*.json` files (and, optionally, directory names) directly under `dir`
    async fn list(dir: PathBuf, include_dirs: bool) -> Result<Vec<String>> {
        tokio::task::spawn_blocking(move || {
            let mut names = Vec::new();
            if !dir.is_dir() {
                return names;
            }
            for entry in WalkDir::new(&dir)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                let name = if entry.file_type().is_dir() {
                    include_dirs.then(|| file_name(path)).flatten()
                } else if path.extension().and_then(|s| s.to_str()) == Some("json") {
                    path.file_stem().and_then(|s| s.to_str()).map(str::to_string)
                } else {
                    None
                };
                if let Some(name) = name {
                    if !names.contains(&name) {
                        names.push(name);
                    }
                }
            }
            names
        })
        .await
        .map_err(|e| AppstatError::Io(std::io::Error::other(e.to_string())))
    }
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().and_then(|s| s.to_str()).map(str::to_string)
}

#[async_trait]
impl DocumentSource for JsonDumpSource {
    async fn collections(&self) -> Result<Vec<String>> {
        let names = Self::list(self.root.clone(), true).await?;
        debug!("Found {} collections in {}", names.len(), self.root.display());
        Ok(names)
    }

    async fn subcollections(&self, collection: &str, document: &str) -> Result<Vec<String>> {
        Self::list(self.root.join(collection).join(document), false).await
    }

    fn documents(
        &self,
        path: &CollectionPath,
    ) -> Pin<Box<dyn Stream<Item = Result<Document>> + Send + '_>> {
        let file = self.file_for(path);
        let label = path.to_string();

        Box::pin(async_stream::try_stream! {
            // Collections that only hold nested documents have no dump of their own
            if tokio::fs::try_exists(&file).await? {
                let bytes = tokio::fs::read(&file).await?;
                let value: serde_json::Value = serde_json::from_slice(&bytes)?;
                let items = match value {
                    serde_json::Value::Array(items) => items,
                    _ => Err(AppstatError::Export(format!("{label}: expected a JSON array")))?,
                };
                for (idx, item) in items.into_iter().enumerate() {
                    match item {
                        serde_json::Value::Object(doc) => yield doc,
                        _ => Err(AppstatError::Export(format!(
                            "{label}: element {idx} is not an object"
                        )))?,
                    }
                }
            }
        })
    }
}

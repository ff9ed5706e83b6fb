//! Collection exporter
//!
//! Walks a [`DocumentSource`]: every sub-collection of the designated parent
//! documents becomes one CSV, then every other top-level collection does.
//! Files are named after the innermost collection, so a later collection
//! overwrites an earlier one of the same name. The first source error
//! aborts the export; nothing is retried.
//!
//! # Examples
//!
//! ```no_run
//! use appstat_export::{CollectionExporter, ExportPlan, JsonDumpSource};
//!
//! # async fn example() -> appstat_core::Result<()> {
//! let source = JsonDumpSource::new("dump")?;
//! let summary = CollectionExporter::new(source, "exports")
//!     .with_plan(ExportPlan::default())
//!     .run()
//!     .await?;
//! println!("wrote {} files", summary.files.len());
//! # Ok(())
//! # }
//! ```

use crate::source::{CollectionPath, Document, DocumentSource};
use crate::writer;
use appstat_core::error::Result;
use futures::TryStreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::{debug, info};

/// Which parent collection holds nested sub-collections, and under which documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPlan {
    pub parent: String,
    pub documents: Vec<String>,
}

impl Default for ExportPlan {
    fn default() -> Self {
        Self {
            parent: "Analyse".to_string(),
            documents: ["appOpenedTime", "buttonPressedTime", "infos_device", "pageOpenedTime"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl ExportPlan {
    pub fn new(parent: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            documents: Vec::new(),
        }
    }

    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.documents.push(document.into());
        self
    }
}

/// What an export produced
#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    /// Files written, in write order
    pub files: Vec<PathBuf>,
    /// Documents read across all collections
    pub documents: usize,
    /// Collections skipped because they had no documents
    pub empty: Vec<String>,
}

/// Exports every collection of a source into CSV files
pub struct CollectionExporter<S> {
    source: S,
    out_dir: PathBuf,
    plan: ExportPlan,
    show_progress: bool,
}

impl<S: DocumentSource> CollectionExporter<S> {
    pub fn new(source: S, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            out_dir: out_dir.into(),
            plan: ExportPlan::default(),
            show_progress: false,
        }
    }

    pub fn with_plan(mut self, plan: ExportPlan) -> Self {
        self.plan = plan;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Run the export
    pub async fn run(&self) -> Result<ExportSummary> {
        tokio::fs::create_dir_all(&self.out_dir).await?;

        let progress = self.show_progress.then(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.cyan} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb
        });

        let mut summary = ExportSummary::default();

        for document in &self.plan.documents {
            let nested = self
                .source
                .subcollections(&self.plan.parent, document)
                .await?;
            for subcollection in nested {
                let path = CollectionPath::Nested {
                    collection: self.plan.parent.clone(),
                    document: document.clone(),
                    subcollection,
                };
                self.export_one(&path, progress.as_ref(), &mut summary).await?;
            }
        }

        for collection in self.source.collections().await? {
            if collection == self.plan.parent {
                continue;
            }
            let path = CollectionPath::Root(collection);
            self.export_one(&path, progress.as_ref(), &mut summary).await?;
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        info!(
            files = summary.files.len(),
            documents = summary.documents,
            "Export finished"
        );
        Ok(summary)
    }

    async fn export_one(
        &self,
        path: &CollectionPath,
        progress: Option<&ProgressBar>,
        summary: &mut ExportSummary,
    ) -> Result<()> {
        if let Some(pb) = progress {
            pb.set_message(format!("Exporting {path}"));
            pb.tick();
        }

        let documents: Vec<Document> = self.source.documents(path).try_collect().await?;
        summary.documents += documents.len();

        match writer::write_collection(&self.out_dir, path.name(), &documents).await? {
            Some(file) => {
                debug!("Wrote {} documents of {} to {}", documents.len(), path, file.display());
                summary.files.push(file);
            }
            None => {
                debug!("Skipping empty collection {}", path);
                summary.empty.push(path.to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::JsonDumpSource;
    use appstat_core::error::AppstatError;
    use async_trait::async_trait;
    use futures::stream::{self, Stream};
    use std::pin::Pin;
    use tempfile::TempDir;

    async fn dump(dir: &TempDir, rel: &str, content: &str) {
        let path = dir.path().join(rel);
        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        tokio::fs::write(path, content).await.unwrap();
    }

    #[tokio::test]
    async fn test_export_dump() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        dump(&input, "users.json", r#"[{"uid": "u1", "country": "France"}, {"uid": "u2"}]"#).await;
        dump(&input, "transaction.json", "[]").await;
        dump(
            &input,
            "Analyse/appOpenedTime/appOpenedTime.json",
            r#"[{"time": "2024-03-01 08:00:00"}]"#,
        )
        .await;
        dump(&input, "Analyse/unlisted/ignored.json", r#"[{"x": 1}]"#).await;

        let source = JsonDumpSource::new(input.path()).unwrap();
        let summary = CollectionExporter::new(source, output.path())
            .run()
            .await
            .unwrap();

        assert_eq!(summary.files.len(), 2);
        assert_eq!(summary.documents, 3);
        assert_eq!(summary.empty, vec!["transaction"]);
        assert!(output.path().join("appOpenedTime.csv").exists());
        assert!(output.path().join("users.csv").exists());
        assert!(!output.path().join("ignored.csv").exists());
        assert!(!output.path().join("Analyse.csv").exists());
    }

    struct FailingSource;

    #[async_trait]
    impl DocumentSource for FailingSource {
        async fn collections(&self) -> Result<Vec<String>> {
            Ok(vec!["users".to_string(), "sessions".to_string()])
        }

        async fn subcollections(&self, _: &str, _: &str) -> Result<Vec<String>> {
            Ok(Vec::new())
        }

        fn documents(
            &self,
            path: &CollectionPath,
        ) -> Pin<Box<dyn Stream<Item = Result<Document>> + Send + '_>> {
            let items: Vec<Result<Document>> = if path.name() == "users" {
                vec![Ok(Document::new()), Err(AppstatError::Export("connection reset".into()))]
            } else {
                vec![Ok(Document::new())]
            };
            Box::pin(stream::iter(items))
        }
    }

    #[tokio::test]
    async fn test_source_error_aborts() {
        let output = TempDir::new().unwrap();
        let result = CollectionExporter::new(FailingSource, output.path())
            .with_plan(ExportPlan::new("Analyse").with_document("appOpenedTime"))
            .run()
            .await;
        assert!(matches!(result, Err(AppstatError::Export(_))));
        assert!(!output.path().join("sessions.csv").exists());
    }
}

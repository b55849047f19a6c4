use crate::aggregate::Aggregator;
use crate::config::{FileSource, PackConfig};
use crate::errors::PackError;
use crate::ignore::{load_rules, PatternWarning};
use crate::lister::{ExplicitFileList, FileLister, GitFileLister};
use crate::output::OutputSink;
use crate::reporting::RunReport;
use crate::selection::{select_from_list, select_from_walk, SelectionResult};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal;
use tracing::{debug, info};

#[derive(Debug)]
pub struct PackOutcome {
    pub selection: SelectionResult,
    /// `None` for dry runs.
    pub report: Option<RunReport>,
    /// The written artifact, for file targets.
    pub destination: Option<PathBuf>,
    pub warnings: Vec<PatternWarning>,
}

#[async_trait]
pub trait ProjectPacker {
    async fn pack(&self) -> Result<PackOutcome, PackError>;
}

pub struct BasicProjectPacker {
    config: PackConfig,
    lister: Option<Box<dyn FileLister>>,
    cancel: Arc<AtomicBool>,
}

impl BasicProjectPacker {
    pub fn new(config: PackConfig) -> Self {
        BasicProjectPacker {
            config,
            lister: None,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replaces the lister implied by `config.source`.
    pub fn with_lister(mut self, lister: Box<dyn FileLister>) -> Self {
        self.lister = Some(lister);
        self
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    async fn listed_files(&self) -> Result<Option<Vec<String>>, PackError> {
        let listed = match (&self.lister, &self.config.source) {
            (Some(lister), _) => Some(lister.list().await?),
            (None, FileSource::Walk) => None,
            (None, FileSource::Git) => Some(GitFileLister::new(&self.config.root).list().await?),
            (None, FileSource::Explicit(paths)) => {
                Some(ExplicitFileList::new(paths.clone()).list().await?)
            }
        };
        Ok(listed)
    }
}

#[async_trait]
impl ProjectPacker for BasicProjectPacker {
    async fn pack(&self) -> Result<PackOutcome, PackError> {
        let config = &self.config;
        config.validate()?;

        let ignore_file = config.resolved_ignore_file();
        let rules = load_rules(ignore_file.as_deref(), config.use_default_ignores)?;
        let warnings = rules.warnings().to_vec();
        debug!("Using {} ignore rules", rules.rules().len());

        let listed = self.listed_files().await?;

        let root = config.root.clone();
        let output = config.output.clone();
        let dry_run = config.dry_run;
        let cancel = self.cancel_flag();

        let task = tokio::task::spawn_blocking(move || -> Result<PackOutcome, PackError> {
            let selection = match listed {
                Some(paths) => select_from_list(&root, &paths, &rules),
                None => select_from_walk(&root, &rules),
            };
            info!(
                "Selected {} files ({} excluded)",
                selection.included_count(),
                selection.excluded_count()
            );

            if dry_run {
                return Ok(PackOutcome {
                    selection,
                    report: None,
                    destination: None,
                    warnings,
                });
            }
            if cancel.load(Ordering::Relaxed) {
                return Err(PackError::Cancelled("stopped before aggregation".to_owned()));
            }

            let mut sink = OutputSink::open(&output, &root)?;
            let report = Aggregator::new(&root)
                .with_cancel(cancel)
                .aggregate(&selection, sink.writer())?;
            let destination = sink.finish()?;

            Ok(PackOutcome {
                selection,
                report: Some(report),
                destination,
                warnings,
            })
        });

        task.await
            .map_err(|e| PackError::Cancelled(e.to_string()))?
    }
}

/// Runs one pack. Ctrl-C stops the run between files; file targets are then
/// left untouched.
pub async fn pack_project(config: PackConfig) -> Result<PackOutcome, PackError> {
    let packer = BasicProjectPacker::new(config);
    let cancel = packer.cancel_flag();
    let run = packer.pack();
    tokio::pin!(run);

    tokio::select! {
        result = &mut run => result,
        Ok(()) = signal::ctrl_c() => {
            info!("Interrupt received, stopping after the current file.");
            cancel.store(true, Ordering::Relaxed);
            run.await
        }
    }
}

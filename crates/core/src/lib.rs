pub mod catalog;
pub mod config;
pub mod describe;
pub mod error;
pub mod hasher;
pub mod manual;
pub mod render;

use std::fs;
use std::path::{Path, PathBuf};

use catalog::{SceneCatalog, SubmitOutcome, VerifyReport};
use config::Config;
use describe::{Describer, TemplateDescriber};
use error::{Error, Result};
use manual::{ManualLedger, Step};

/// Callback events for importing image files from disk.
pub enum ImportProgress {
    /// Starting import with total file count.
    Start { total: usize },
    /// A file was stored under `name`.
    Stored { path: PathBuf, name: String },
    /// A file's content is already in the catalog as `name`.
    Duplicate { path: PathBuf, name: String },
    /// A file was not recognized as a supported image.
    Rejected { path: PathBuf, reason: String },
    /// Import completed.
    Complete {
        stored: usize,
        duplicates: usize,
        rejected: usize,
    },
}

/// Counts reported at the end of an import.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub stored: usize,
    pub duplicates: usize,
    pub rejected: usize,
}

/// Summary of what the workbench currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkbenchStats {
    pub total_scenes: usize,
    pub total_steps: usize,
}

/// The main entry point: a scene catalog plus the manual built from it.
pub struct Workbench {
    config: Config,
    catalog: SceneCatalog,
    ledger: ManualLedger,
    describer: Box<dyn Describer>,
}

impl Workbench {
    /// Open a workbench, creating the scene directory if it does not exist.
    pub fn open(config: Config) -> Result<Self> {
        let catalog = SceneCatalog::open(&config.scene_dir(), config.id_policy)?;
        let ledger = ManualLedger::new(&config.manual_path());
        let describer = Box::new(TemplateDescriber::new(config.description_template.clone()));
        tracing::debug!(root = %config.root.display(), policy = ?config.id_policy, "opened workbench");
        Ok(Self {
            config,
            catalog,
            ledger,
            describer,
        })
    }

    /// Replace the default description generator.
    pub fn with_describer(mut self, describer: impl Describer + 'static) -> Self {
        self.describer = Box::new(describer);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ── Scenes ───────────────────────────────────────────────────────

    /// Store uploaded image bytes.
    pub fn submit_scene(&self, bytes: &[u8]) -> Result<SubmitOutcome> {
        self.catalog.submit(bytes)
    }

    /// Sorted catalog file names.
    pub fn scenes(&self) -> Result<Vec<String>> {
        self.catalog.list()
    }

    /// Path of a stored scene.
    pub fn scene_path(&self, name: &str) -> Result<PathBuf> {
        self.catalog.locate(name)
    }

    /// Read image files from disk and submit each one.
    /// Unsupported files are skipped and reported; read or write failures abort.
    pub fn import(
        &self,
        paths: &[PathBuf],
        mut progress_cb: Option<&mut dyn FnMut(ImportProgress)>,
    ) -> Result<ImportSummary> {
        if let Some(ref mut cb) = progress_cb {
            cb(ImportProgress::Start { total: paths.len() });
        }

        let mut summary = ImportSummary::default();
        for path in paths {
            let bytes = fs::read(path)?;
            let event = match self.catalog.submit(&bytes) {
                Ok(SubmitOutcome::Stored(scene)) => {
                    summary.stored += 1;
                    ImportProgress::Stored {
                        path: path.clone(),
                        name: scene.file_name(),
                    }
                }
                Ok(SubmitOutcome::Duplicate(scene)) => {
                    summary.duplicates += 1;
                    ImportProgress::Duplicate {
                        path: path.clone(),
                        name: scene.file_name(),
                    }
                }
                Err(Error::UnsupportedFormat(_)) => {
                    summary.rejected += 1;
                    let err = Error::UnsupportedFormat(Some(path.clone()));
                    tracing::warn!("{err}");
                    ImportProgress::Rejected {
                        path: path.clone(),
                        reason: err.to_string(),
                    }
                }
                Err(e) => return Err(e),
            };
            if let Some(ref mut cb) = progress_cb {
                cb(event);
            }
        }

        if let Some(ref mut cb) = progress_cb {
            cb(ImportProgress::Complete {
                stored: summary.stored,
                duplicates: summary.duplicates,
                rejected: summary.rejected,
            });
        }
        Ok(summary)
    }

    /// Re-hash content-addressed scenes.
    pub fn verify(&self) -> Result<VerifyReport> {
        self.catalog.verify()
    }

    // ── Manual ───────────────────────────────────────────────────────

    /// Current manual, in registration order.
    pub fn steps(&self) -> Result<Vec<Step>> {
        self.ledger.load()
    }

    /// Append a step and return the updated manual.
    pub fn register_step(&self, image: &str, text: &str) -> Result<Vec<Step>> {
        self.ledger.append(Step::new(image, text))
    }

    /// Clear every registered step.
    pub fn reset_manual(&self) -> Result<()> {
        self.ledger.reset()
    }

    /// Text offered for a scene before the user edits it.
    pub fn default_description(&self, image: &str) -> String {
        self.describer.describe(image)
    }

    /// Render the manual as Markdown, linking images under the scene directory.
    pub fn render_manual(&self, title: &str) -> Result<String> {
        let steps = self.ledger.load()?;
        Ok(render::render_markdown(title, &steps, self.catalog.dir()))
    }

    pub fn stats(&self) -> Result<WorkbenchStats> {
        Ok(WorkbenchStats {
            total_scenes: self.catalog.list()?.len(),
            total_steps: self.ledger.load()?.len(),
        })
    }

    pub fn manual_path(&self) -> &Path {
        self.ledger.path()
    }
}

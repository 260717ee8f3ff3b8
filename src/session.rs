//! One load → mutate → save run over the model store.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::config::ToolConfig;
use crate::error::{ModelsError, Result};
use crate::extract::{AttributeExtractor, NoopExtractor, RegexExtractor};
use crate::import::{self, BulkInput, ImportOptions, ImportSummary};
use crate::models::{self, ConsolidationReport, DeviceStore};
use crate::persist;
use crate::report::Report;

/// What a mutating run did.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Where the store was written.
    pub output: PathBuf,
    /// Brands after the run.
    pub brands: usize,
    /// Slots after the run.
    pub models: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import: Option<ImportSummary>,
    pub consolidation: ConsolidationReport,
}

/// Loaded store plus the extractor used for raw strings.
pub struct ModelsSession {
    store: DeviceStore,
    extractor: Box<dyn AttributeExtractor>,
}

impl std::fmt::Debug for ModelsSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelsSession")
            .field("brands", &self.store.brand_count())
            .field("models", &self.store.model_count())
            .finish_non_exhaustive()
    }
}

impl ModelsSession {
    pub fn new(store: DeviceStore, extractor: Box<dyn AttributeExtractor>) -> Self {
        Self { store, extractor }
    }

    /// Load the configured store and parser rules.
    ///
    /// # Errors
    ///
    /// Fails if the store or the rules file is missing or malformed.
    #[instrument(skip_all, fields(models = %config.models.display()))]
    pub fn open(config: &ToolConfig) -> Result<Self> {
        let store = persist::load_store(&config.models)?;
        let extractor = load_extractor(config.regexes.as_deref())?;
        Ok(Self::new(store, extractor))
    }

    pub fn store(&self) -> &DeviceStore {
        &self.store
    }

    /// Merge a bulk input file into the store.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing or is not valid tab-separated text.
    pub fn add_input(&mut self, input: &Path, options: ImportOptions) -> Result<ImportSummary> {
        let bulk = import::read_input(input)?;
        info!(path = %input.display(), entries = bulk.len(), "Adding models");
        Ok(import::import_into(
            &mut self.store,
            self.extractor.as_ref(),
            bulk,
            options,
        ))
    }

    /// Resolve aliases and deduplicate by name.
    ///
    /// # Errors
    ///
    /// Fails on an alias cycle.
    pub fn clean(&mut self) -> Result<ConsolidationReport> {
        let report = models::consolidate(&mut self.store)?;
        info!(
            dangling = report.dangling,
            aliased = report.dedup.aliased,
            diagnostics = report.dedup.diagnostics.len(),
            "Consolidated store"
        );
        Ok(report)
    }

    /// Write the store, sorted.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        persist::save_store(&self.store, path)
    }

    /// Build the diagnostic report from a user-agent list, or from the
    /// store's data-bearing records.
    ///
    /// # Errors
    ///
    /// Fails if the list is missing or the store holds an alias cycle.
    #[instrument(skip(self))]
    pub fn report(&mut self, user_agents: Option<&Path>) -> Result<Report> {
        match user_agents {
            Some(path) => {
                let lines = match import::read_input(path)? {
                    BulkInput::UserAgents(uas) => uas,
                    BulkInput::Rows(rows) => rows.into_iter().filter_map(|r| r.string).collect(),
                };
                Ok(Report::from_user_agents(&lines, self.extractor.as_ref()))
            }
            None => {
                let dangling = models::resolve_all(&mut self.store)?;
                debug!(dangling, "Resolved store for report");
                Ok(Report::from_store(&self.store))
            }
        }
    }

    fn summary(
        &self,
        output: &Path,
        import: Option<ImportSummary>,
        consolidation: ConsolidationReport,
    ) -> RunSummary {
        RunSummary {
            output: output.to_path_buf(),
            brands: self.store.brand_count(),
            models: self.store.model_count(),
            import,
            consolidation,
        }
    }
}

/// Parser rules from `path`, or an extractor recognizing nothing.
///
/// # Errors
///
/// Fails if the rules file is missing or holds an invalid rule.
pub fn load_extractor(path: Option<&Path>) -> Result<Box<dyn AttributeExtractor>> {
    match path {
        Some(path) => Ok(Box::new(RegexExtractor::from_file(path)?)),
        None => {
            debug!("No parser rules configured");
            Ok(Box::new(NoopExtractor))
        }
    }
}

/// Load, consolidate and save the configured store.
///
/// # Errors
///
/// Fails before writing anything if loading or consolidation fails.
pub fn run_clean(config: &ToolConfig) -> Result<RunSummary> {
    let mut session = ModelsSession::open(config)?;
    let consolidation = session.clean()?;
    session.save(&config.output)?;
    Ok(session.summary(&config.output, None, consolidation))
}

/// Import bulk input into the configured store, then consolidate and save.
///
/// # Errors
///
/// Fails before writing anything if loading, import or consolidation fails.
pub fn run_add(config: &ToolConfig, input: &Path, options: ImportOptions) -> Result<RunSummary> {
    if !input.exists() {
        return Err(ModelsError::InputNotFound {
            path: input.display().to_string(),
        });
    }
    let mut session = ModelsSession::open(config)?;
    let import = session.add_input(input, options)?;
    let consolidation = session.clean()?;
    session.save(&config.output)?;
    Ok(session.summary(&config.output, Some(import), consolidation))
}

/// Write the diagnostic report to the configured path.
///
/// # Errors
///
/// Fails if the store or list cannot be read, or the report not written.
pub fn run_report(config: &ToolConfig, user_agents: Option<&Path>) -> Result<usize> {
    let mut session = if user_agents.is_some() {
        let extractor = load_extractor(config.regexes.as_deref())?;
        ModelsSession::new(DeviceStore::new(), extractor)
    } else {
        ModelsSession::open(config)?
    };
    let report = session.report(user_agents)?;
    report.save(&config.csv)?;
    Ok(report.len())
}

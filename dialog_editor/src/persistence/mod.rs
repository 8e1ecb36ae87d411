//! Persistence Gateway - moves canonical tree documents across the boundary.
//!
//! - **Load** replaces the store's tree from a named resource, raw bytes, or
//!   the blank template. Unsaved edits need confirmation first; a parse
//!   failure leaves the store untouched.
//! - **Save** validates first. Errors refuse the save, warnings need
//!   confirmation. On success the canonical document (no editor state) is
//!   written back under the tree's name and the session becomes clean.
//! - **Export** is gated the same way but only hands back a standalone copy.
//!   It leaves the dirty flag alone, since nothing in the project was updated.
//!
//! Loads are two-phase: `fetch_*` reads and parses (the only suspension
//! point), then [`PersistenceGateway::apply`] installs the result. Every fetch
//! takes a new generation and only the newest fetch may be applied, so a
//! load started while another is in flight replaces it.

mod error;
mod ports;
mod source;

pub use error::*;
pub use ports::*;
pub use source::*;

use std::sync::atomic::{AtomicU64, Ordering};

use dialog_model::DialogTree;

use crate::store::TreeStore;

/// A parsed tree waiting to be installed.
#[derive(Debug, Clone)]
pub struct PendingLoad {
    generation: u64,
    tree: DialogTree,
    source_name: Option<String>,
}

impl PendingLoad {
    pub fn tree(&self) -> &DialogTree {
        &self.tree
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// The user kept their unsaved changes.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved { name: String },
    /// The user declined to save a tree with warnings.
    Cancelled,
}

/// A standalone canonical document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    pub file_name: String,
    pub contents: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Exported(ExportedDocument),
    Cancelled,
}

pub struct PersistenceGateway<S, C = AutoConfirm, N = LogSink> {
    source: S,
    confirm: C,
    notices: N,
    load_generation: AtomicU64,
}

impl<S> PersistenceGateway<S>
where
    S: TreeSource,
{
    /// A gateway that confirms everything and logs its notices.
    pub fn headless(source: S) -> Self {
        Self::new(source, AutoConfirm, LogSink)
    }
}

impl<S, C, N> PersistenceGateway<S, C, N>
where
    S: TreeSource,
    C: ConfirmPort,
    N: NotificationSink,
{
    pub fn new(source: S, confirm: C, notices: N) -> Self {
        Self {
            source,
            confirm,
            notices,
            load_generation: AtomicU64::new(0),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Names of every tree the source holds.
    pub async fn list_trees(&self) -> Result<Vec<String>, PersistenceError> {
        let result = self.source.list().await;
        self.surface("Listing dialog trees", result)
    }

    // ------------------------------------------------------------------
    // Load
    // ------------------------------------------------------------------

    /// Read and parse the tree stored under `name`.
    pub async fn fetch_named(&self, name: &str) -> Result<PendingLoad, PersistenceError> {
        let generation = self.begin_load();
        let result = self.read_tree(name).await;
        let tree = self.surface(&format!("Loading \"{name}\""), result)?;
        Ok(PendingLoad {
            generation,
            tree,
            source_name: Some(name.to_owned()),
        })
    }

    /// Parse an uploaded document. `source_name` is where saves will go.
    pub fn fetch_bytes(
        &self,
        bytes: &[u8],
        source_name: Option<String>,
    ) -> Result<PendingLoad, PersistenceError> {
        let generation = self.begin_load();
        let result = DialogTree::from_json(bytes).map_err(PersistenceError::from);
        let tree = self.surface("Loading uploaded file", result)?;
        Ok(PendingLoad {
            generation,
            tree,
            source_name,
        })
    }

    /// The blank one-node template.
    pub fn fetch_template(&self) -> PendingLoad {
        PendingLoad {
            generation: self.begin_load(),
            tree: DialogTree::template(),
            source_name: None,
        }
    }

    /// Install a fetched tree into the store.
    ///
    /// Fails with [`PersistenceError::Superseded`] if another fetch started
    /// after this one. Asks before discarding unsaved edits.
    pub fn apply(
        &self,
        store: &mut TreeStore,
        pending: PendingLoad,
    ) -> Result<LoadOutcome, PersistenceError> {
        let latest = self.load_generation.load(Ordering::SeqCst);
        if pending.generation != latest {
            log::debug!(
                "persistence: discarding load {} (latest is {latest})",
                pending.generation
            );
            return Err(PersistenceError::Superseded);
        }

        if store.is_dirty() && !self.confirm.confirm(&ConfirmRequest::DiscardUnsavedChanges) {
            log::info!("persistence: load cancelled, keeping unsaved changes");
            return Ok(LoadOutcome::Cancelled);
        }

        let id = pending.tree.id.clone();
        store.load_dialog_tree(pending.tree, pending.source_name);
        self.notices.notify(Notice::info(format!("Loaded \"{id}\"")));
        Ok(LoadOutcome::Loaded)
    }

    pub async fn load_named(
        &self,
        store: &mut TreeStore,
        name: &str,
    ) -> Result<LoadOutcome, PersistenceError> {
        let pending = self.fetch_named(name).await?;
        self.apply(store, pending)
    }

    pub fn load_bytes(
        &self,
        store: &mut TreeStore,
        bytes: &[u8],
        source_name: Option<String>,
    ) -> Result<LoadOutcome, PersistenceError> {
        let pending = self.fetch_bytes(bytes, source_name)?;
        self.apply(store, pending)
    }

    /// Replace the store's tree with the blank template.
    pub fn create_new_tree(&self, store: &mut TreeStore) -> Result<LoadOutcome, PersistenceError> {
        let pending = self.fetch_template();
        self.apply(store, pending)
    }

    async fn read_tree(&self, name: &str) -> Result<DialogTree, PersistenceError> {
        let bytes = self.source.read(name).await?;
        Ok(DialogTree::from_json(&bytes)?)
    }

    fn begin_load(&self) -> u64 {
        self.load_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    // ------------------------------------------------------------------
    // Save / export
    // ------------------------------------------------------------------

    /// Save under the name the tree was loaded from or last saved to.
    pub async fn save(&self, store: &mut TreeStore) -> Result<SaveOutcome, PersistenceError> {
        let Some(name) = store.source_name().map(str::to_owned) else {
            return self.surface("Saving", Err(PersistenceError::NoTarget));
        };
        self.save_as(store, &name).await
    }

    /// Save under `name` and make it the tree's name for later saves.
    pub async fn save_as(
        &self,
        store: &mut TreeStore,
        name: &str,
    ) -> Result<SaveOutcome, PersistenceError> {
        let request = |warnings: usize| ConfirmRequest::SaveWithWarnings { warnings };
        let gated = self.gate(store, request);
        let Some(contents) = self.surface(&format!("Saving \"{name}\""), gated)? else {
            log::info!("persistence: save of \"{name}\" cancelled");
            return Ok(SaveOutcome::Cancelled);
        };

        let written = self.source.write(name, contents.as_bytes()).await;
        self.surface(&format!("Saving \"{name}\""), written)?;

        store.mark_saved(name);
        self.notices.notify(Notice::info(format!("Saved \"{name}\"")));
        Ok(SaveOutcome::Saved {
            name: name.to_owned(),
        })
    }

    /// Produce a standalone canonical copy. The session stays dirty.
    pub fn export(&self, store: &TreeStore) -> Result<ExportOutcome, PersistenceError> {
        let request = |warnings: usize| ConfirmRequest::ExportWithWarnings { warnings };
        let gated = self.gate(store, request);
        let Some(contents) = self.surface("Exporting", gated)? else {
            return Ok(ExportOutcome::Cancelled);
        };

        let file_name = format!("{}.json", store.tree().id);
        log::info!("persistence: exported {file_name}");
        Ok(ExportOutcome::Exported(ExportedDocument {
            file_name,
            contents,
        }))
    }

    /// Validate the current tree and render it if allowed.
    ///
    /// `Ok(None)` means the user declined to continue past warnings.
    fn gate(
        &self,
        store: &TreeStore,
        request: impl Fn(usize) -> ConfirmRequest,
    ) -> Result<Option<String>, PersistenceError> {
        let report = store.validator().validate(store.tree());
        if report.has_errors() {
            return Err(PersistenceError::Blocked {
                issues: report.errors().cloned().collect(),
            });
        }

        let warnings = report.warning_count();
        if warnings > 0 && !self.confirm.confirm(&request(warnings)) {
            return Ok(None);
        }

        Ok(Some(store.tree().to_canonical_json()?))
    }

    /// Report a failure to the user before handing it back.
    fn surface<T>(
        &self,
        action: &str,
        result: Result<T, PersistenceError>,
    ) -> Result<T, PersistenceError> {
        if let Err(err) = &result {
            log::warn!("persistence: {action} failed: {err}");
            let mut message = format!("{action} failed: {err}");
            if let PersistenceError::Blocked { issues } = err {
                for issue in issues {
                    message.push_str("\n- ");
                    message.push_str(&issue.message);
                }
            }
            self.notices.notify(Notice::error(message));
        }
        result
    }
}

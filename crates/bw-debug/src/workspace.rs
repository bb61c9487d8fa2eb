//! Debug workspace: the per-program set of labels, breakpoints, watches and TBL mappings
//!
//! Each registry sits behind its own lock. File I/O happens with no lock held.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use bw_core::error::WorkspaceError;
use bw_core::workspace_debug;
use bw_memory::{CpuType, MemoryType};
use parking_lot::{Mutex, MutexGuard, RwLock};
use serde::{Deserialize, Serialize};

use crate::breakpoint::{Breakpoint, BreakpointManager};
use crate::label::{CodeLabel, LabelManager};
use crate::tbl::{default_text, TblConverter};
use crate::watch::WatchRegistry;

/// Persisted form of a workspace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceData {
    pub labels: Vec<CodeLabel>,
    pub breakpoints: Vec<Breakpoint>,
    pub watches: BTreeMap<CpuType, Vec<String>>,
    pub tbl_mappings: Vec<String>,
}

#[derive(Debug, Default)]
struct TblState {
    lines: Vec<String>,
    converter: Option<TblConverter>,
}

/// Debug state for one loaded program
#[derive(Debug, Default)]
pub struct DebugWorkspace {
    labels: Mutex<LabelManager>,
    breakpoints: Mutex<BreakpointManager>,
    watches: Mutex<WatchRegistry>,
    tbl: RwLock<TblState>,
}

impl DebugWorkspace {
    /// Create an empty workspace
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> MutexGuard<'_, LabelManager> {
        self.labels.lock()
    }

    pub fn breakpoints(&self) -> MutexGuard<'_, BreakpointManager> {
        self.breakpoints.lock()
    }

    pub fn watches(&self) -> MutexGuard<'_, WatchRegistry> {
        self.watches.lock()
    }

    /// Replace the TBL table; on error the previous table stays active
    pub fn load_tbl(&self, lines: Vec<String>) -> Result<(), WorkspaceError> {
        let converter = TblConverter::load(lines.as_slice())?;
        let mut tbl = self.tbl.write();
        tbl.converter = Some(converter);
        tbl.lines = lines;
        workspace_debug!("TBL mappings loaded ({} lines)", tbl.lines.len());
        Ok(())
    }

    /// Revert to default text decoding
    pub fn reset_tbl(&self) {
        *self.tbl.write() = TblState::default();
        workspace_debug!("TBL mappings reset");
    }

    pub fn has_tbl(&self) -> bool {
        self.tbl.read().converter.is_some()
    }

    /// Raw TBL lines as loaded
    pub fn tbl_mappings(&self) -> Vec<String> {
        self.tbl.read().lines.clone()
    }

    /// Decode bytes for display through the TBL table, or the default encoding
    pub fn resolve_display_text(&self, bytes: &[u8]) -> String {
        match &self.tbl.read().converter {
            Some(converter) => converter.decode(bytes),
            None => default_text(bytes),
        }
    }

    /// Drop labels and breakpoints tied to a memory space that went away
    pub fn invalidate_memory(&self, memory_type: MemoryType) {
        let labels = self.labels().invalidate(memory_type);
        let breakpoints = self.breakpoints().remove_for_memory_type(memory_type);
        workspace_debug!(
            "Invalidated {}: {} labels, {} breakpoints",
            memory_type,
            labels,
            breakpoints
        );
    }

    /// Clear all workspace state
    pub fn reset(&self) {
        self.labels().clear();
        self.breakpoints().clear();
        self.watches().clear_all();
        self.reset_tbl();
        workspace_debug!("Workspace reset");
    }

    /// Copy of the current state in persisted form
    pub fn snapshot(&self) -> WorkspaceData {
        let labels = self.labels().labels().into_iter().cloned().collect();
        let breakpoints = self.breakpoints().get_all().to_vec();
        let watches = self
            .watches()
            .managers()
            .filter(|m| !m.is_empty())
            .map(|m| (m.cpu_type(), m.entries().to_vec()))
            .collect();
        WorkspaceData {
            labels,
            breakpoints,
            watches,
            tbl_mappings: self.tbl_mappings(),
        }
    }

    /// Replace all state with `data`
    ///
    /// Everything is validated before anything is swapped in, so a rejected
    /// workspace leaves the current state untouched.
    pub fn apply(&self, data: WorkspaceData) -> Result<(), WorkspaceError> {
        let mut labels = LabelManager::new();
        for label in data.labels {
            labels.upsert(label)?;
        }

        let mut breakpoints = BreakpointManager::new();
        for bp in data.breakpoints {
            bp.validate()?;
            breakpoints.add(bp);
        }

        let tbl = if data.tbl_mappings.is_empty() {
            TblState::default()
        } else {
            TblState {
                converter: Some(TblConverter::load(data.tbl_mappings.as_slice())?),
                lines: data.tbl_mappings,
            }
        };

        *self.labels() = labels;
        *self.breakpoints() = breakpoints;
        {
            let mut watches = self.watches();
            watches.clear_all();
            for (cpu_type, entries) in data.watches {
                watches.get_watch_manager(cpu_type).add_watch(entries);
            }
        }
        *self.tbl.write() = tbl;
        Ok(())
    }

    /// Load a workspace file; a missing file yields an empty workspace
    pub fn load_from(&self, path: &Path) -> Result<(), WorkspaceError> {
        if !path.exists() {
            workspace_debug!("No workspace at {:?}, starting empty", path);
            self.reset();
            return Ok(());
        }

        let text = fs::read_to_string(path).map_err(|source| WorkspaceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let data: WorkspaceData =
            serde_json::from_str(&text).map_err(|e| WorkspaceError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        self.apply(data)?;
        tracing::info!("Loaded workspace from {:?}", path);
        Ok(())
    }

    /// Save to a workspace file, replacing it only once fully written
    pub fn save_to(&self, path: &Path) -> Result<(), WorkspaceError> {
        let text = serde_json::to_string_pretty(&self.snapshot())
            .map_err(|e| WorkspaceError::Serialize(e.to_string()))?;
        let io_err = |source| WorkspaceError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let tmp: PathBuf = path.with_extension("json.tmp");
        fs::write(&tmp, text).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;
        tracing::info!("Saved workspace to {:?}", path);
        Ok(())
    }
}

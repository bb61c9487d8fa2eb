//! Memory tools actions
//!
//! UI-agnostic logic behind the hex viewer's context actions. Dialogs and
//! the disassembly view are reached through [`EditorHost`]; no registry lock
//! is held while the host runs.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use bw_core::config::{MemoryToolsConfig, WorkspaceConfig};
use bw_core::error::{CoreError, WatchError};
use bw_core::Result;
use bw_debug::watch::watch_expressions;
use bw_debug::{Breakpoint, CodeLabel, DebugWorkspace};
use bw_memory::{
    AddressInfo, AddressResolver, ConsoleNotification, CpuType, MemoryType, NotificationHandler,
};

/// Result of an editor dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome<T> {
    Saved(T),
    Deleted,
    Cancelled,
}

/// Front end that shows editors and the debugger window
pub trait EditorHost {
    /// Edit a label on an address owned by `cpu_type`
    fn edit_label(&mut self, cpu_type: CpuType, label: CodeLabel) -> EditOutcome<CodeLabel>;

    fn edit_breakpoint(&mut self, breakpoint: Breakpoint) -> EditOutcome<Breakpoint>;

    /// Show the disassembly of `cpu_type` at a CPU-relative address
    fn open_debugger(&mut self, cpu_type: CpuType, address: u32);
}

/// Current hex view selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: u32,
    pub length: u32,
}

impl Selection {
    /// Last selected byte; an empty selection covers its start byte
    pub fn end(&self) -> u32 {
        self.start.saturating_add(self.length.max(1) - 1)
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            start: 0,
            length: 1,
        }
    }
}

/// State and actions of one memory tools view
pub struct MemoryTools {
    resolver: AddressResolver,
    workspace: Arc<DebugWorkspace>,
    memory_type: MemoryType,
    selection: Selection,
    available: Vec<MemoryType>,
    dirty: bool,
    view: MemoryToolsConfig,
    persistence: Option<WorkspaceConfig>,
    program: Option<String>,
}

impl MemoryTools {
    /// Create a view, restoring the last memory type from `config` when it is available
    pub fn new(
        resolver: AddressResolver,
        workspace: Arc<DebugWorkspace>,
        config: &MemoryToolsConfig,
    ) -> Self {
        let mut tools = Self {
            resolver,
            workspace,
            memory_type: MemoryType::NesMemory,
            selection: Selection::default(),
            available: Vec::new(),
            dirty: true,
            view: config.clone(),
            persistence: None,
            program: None,
        };
        tools.update_available_memory_types();
        if let Some(preferred) = config
            .memory_type
            .as_deref()
            .and_then(|name| name.parse::<MemoryType>().ok())
        {
            tools.set_memory_type(preferred);
        }
        tools
    }

    /// Persist the workspace per program under `config`
    pub fn with_workspace_config(mut self, config: WorkspaceConfig) -> Self {
        self.persistence = Some(config);
        self
    }

    /// Load the workspace stored for `program_name` and make it the open program
    pub fn open_program(&mut self, program_name: &str) -> Result<()> {
        if let Some(config) = &self.persistence {
            self.workspace.load_from(&config.path_for(program_name))?;
        }
        self.program = Some(program_name.to_string());
        self.dirty = true;
        Ok(())
    }

    /// Save the open program's workspace; `false` when there is nowhere to save it
    pub fn save_workspace(&self) -> Result<bool> {
        let (Some(config), Some(program)) = (&self.persistence, &self.program) else {
            return Ok(false);
        };
        self.workspace.save_to(&config.path_for(program))?;
        Ok(true)
    }

    fn autosave(&self) {
        if !self.persistence.as_ref().is_some_and(|c| c.autosave) {
            return;
        }
        if let Err(e) = self.save_workspace() {
            tracing::warn!("Workspace autosave failed: {}", e);
        }
    }

    pub fn workspace(&self) -> &Arc<DebugWorkspace> {
        &self.workspace
    }

    pub fn memory_type(&self) -> MemoryType {
        self.memory_type
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Memory types with a non-zero size in the loaded program
    pub fn available_memory_types(&self) -> &[MemoryType] {
        &self.available
    }

    /// Re-query memory sizes; keeps the current type when it is still present
    ///
    /// Returns the types that were available before and no longer are.
    pub fn update_available_memory_types(&mut self) -> Vec<MemoryType> {
        let core = self.resolver.core();
        let available: Vec<MemoryType> = MemoryType::ALL
            .into_iter()
            .filter(|&t| match core.memory_size(t) {
                Ok(size) => size > 0,
                Err(CoreError::NotInitialized) => false,
                Err(e) => {
                    tracing::warn!("Failed to query size of {}: {}", t, e);
                    false
                }
            })
            .collect();

        let removed = self
            .available
            .iter()
            .copied()
            .filter(|t| !available.contains(t))
            .collect();
        self.available = available;

        if !self.available.contains(&self.memory_type) {
            if let Some(&first) = self.available.first() {
                self.memory_type = first;
                self.selection = Selection::default();
            }
        }
        tracing::debug!(
            "{} memory types available, viewing {}",
            self.available.len(),
            self.memory_type
        );
        self.dirty = true;
        removed
    }

    /// Switch the viewed memory type; unavailable types are ignored
    pub fn set_memory_type(&mut self, memory_type: MemoryType) -> bool {
        if !self.available.contains(&memory_type) {
            return false;
        }
        if self.memory_type != memory_type {
            self.memory_type = memory_type;
            self.selection = Selection::default();
            self.dirty = true;
        }
        true
    }

    pub fn set_selection(&mut self, start: u32, length: u32) {
        self.selection = Selection { start, length };
    }

    /// Move the cursor to `address` in `memory_type`, clamped to the space
    ///
    /// Ignored when the type is not available.
    pub fn set_cursor_position(&mut self, memory_type: MemoryType, address: u32) -> Result<bool> {
        if !self.set_memory_type(memory_type) {
            return Ok(false);
        }
        let limit = self.go_to_limit()?.unwrap_or(0);
        self.selection = Selection {
            start: address.min(limit),
            length: 1,
        };
        self.dirty = true;
        Ok(true)
    }

    /// Highest address accepted by "go to address", `None` for an empty space
    pub fn go_to_limit(&self) -> Result<Option<u32>> {
        let size = self.resolver.core().memory_size(self.memory_type)?;
        Ok(size.checked_sub(1))
    }

    /// Selection as `$XX` or `$XX-$YY`
    pub fn address_range_hint(&self) -> String {
        let Selection { start, length } = self.selection;
        if length > 1 {
            format!("${:02X}-${:02X}", start, self.selection.end())
        } else {
            format!("${:02X}", start)
        }
    }

    /// Write a byte edited in the hex view back to the core
    pub fn byte_updated(&mut self, offset: u32, value: u8) -> Result<()> {
        self.resolver
            .core()
            .set_memory_value(self.memory_type, offset, value)?;
        self.dirty = true;
        Ok(())
    }

    /// Label the "edit label" action would open, or `None` when disabled
    ///
    /// Relative addresses resolve to the absolute byte currently mapped there.
    /// The existing label at that key is returned, else a blank proposal.
    pub fn edit_label_target(&self) -> Result<Option<CodeLabel>> {
        let key = self
            .resolver
            .label_address(self.memory_type, self.selection.start)?;
        let Some((address, memory_type)) = key.and_then(|k| Some((k.offset()?, k.memory_type)))
        else {
            return Ok(None);
        };

        let labels = self.workspace.labels();
        Ok(Some(
            labels
                .get(address, memory_type)
                .cloned()
                .unwrap_or_else(|| CodeLabel::new(address, memory_type)),
        ))
    }

    /// Run the label editor on the selection and apply its outcome
    ///
    /// Returns `false` when the action is disabled.
    pub fn edit_label<H: EditorHost + ?Sized>(&mut self, host: &mut H) -> Result<bool> {
        let Some(original) = self.edit_label_target()? else {
            return Ok(false);
        };
        let Some(cpu_type) = original.memory_type.to_cpu_type() else {
            return Ok(false);
        };

        match host.edit_label(cpu_type, original.clone()) {
            EditOutcome::Saved(label) => {
                let mut labels = self.workspace.labels();
                let moved = (label.address, label.memory_type)
                    != (original.address, original.memory_type);
                let previous = if moved {
                    labels.delete(original.address, original.memory_type)
                } else {
                    None
                };
                if let Err(e) = labels.upsert(label) {
                    if let Some(previous) = previous {
                        labels.upsert(previous)?;
                    }
                    return Err(e.into());
                }
            }
            EditOutcome::Deleted => {
                self.workspace
                    .labels()
                    .delete(original.address, original.memory_type);
            }
            EditOutcome::Cancelled => return Ok(true),
        }
        self.dirty = true;
        Ok(true)
    }

    pub fn can_add_watch(&self) -> bool {
        self.memory_type.supports_watch()
    }

    /// Append one byte-read watch per selected address to the owning CPU's list
    pub fn add_watch(&mut self) -> Result<usize> {
        let cpu_type = self
            .memory_type
            .to_cpu_type()
            .filter(|_| self.can_add_watch())
            .ok_or(WatchError::UnsupportedMemoryType(self.memory_type.name()))?;

        let expressions = watch_expressions(self.selection.start, self.selection.length);
        let count = expressions.len();
        self.workspace
            .watches()
            .get_watch_manager(cpu_type)
            .add_watch(expressions);
        Ok(count)
    }

    /// Breakpoint the "edit breakpoint" action would open
    ///
    /// The first registered breakpoint overlapping the selection, else a new
    /// proposal covering it.
    pub fn breakpoint_target(&self) -> Breakpoint {
        self.workspace.breakpoints().propose(
            self.memory_type,
            self.selection.start,
            self.selection.length,
        )
    }

    /// Run the breakpoint editor on the selection; returns the saved breakpoint's ID
    pub fn edit_breakpoint<H: EditorHost + ?Sized>(&mut self, host: &mut H) -> Result<Option<u32>> {
        let proposal = self.breakpoint_target();
        let id = proposal.id;

        let saved = match host.edit_breakpoint(proposal) {
            EditOutcome::Saved(bp) => Some(
                self.workspace
                    .breakpoints()
                    .commit(bp, self.selection.start..=self.selection.end())?,
            ),
            EditOutcome::Deleted => {
                if let Some(id) = id {
                    self.workspace.breakpoints().remove(id);
                }
                None
            }
            EditOutcome::Cancelled => return Ok(None),
        };
        self.dirty = true;
        Ok(saved)
    }

    /// CPU and relative address for "view in debugger", or `None` when disabled
    pub fn view_in_debugger_target(&self) -> Result<Option<(CpuType, u32)>> {
        if self.selection.length > 1 || self.memory_type.is_ppu_memory() {
            return Ok(None);
        }
        let Some(cpu_type) = self.memory_type.to_cpu_type() else {
            return Ok(None);
        };

        let address = AddressInfo::new(self.selection.start, self.memory_type);
        let relative = if self.memory_type.is_relative_memory() {
            address
        } else {
            self.resolver.relative_address(address, cpu_type)?
        };
        Ok(relative.offset().map(|offset| (cpu_type, offset)))
    }

    pub fn view_in_debugger<H: EditorHost + ?Sized>(&self, host: &mut H) -> Result<bool> {
        match self.view_in_debugger_target()? {
            Some((cpu_type, address)) => {
                host.open_debugger(cpu_type, address);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Load a TBL file; the file is read before the table lock is taken
    pub fn load_tbl(&mut self, path: &Path) -> Result<()> {
        let text = fs::read_to_string(path)?;
        let lines = text.lines().map(str::to_string).collect();
        self.workspace.load_tbl(lines)?;
        tracing::info!("Loaded TBL file {:?}", path);
        self.dirty = true;
        Ok(())
    }

    pub fn reset_tbl(&mut self) {
        self.workspace.reset_tbl();
        self.dirty = true;
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.view.bytes_per_row.max(1)
    }

    pub fn set_bytes_per_row(&mut self, bytes_per_row: u32) {
        self.view.bytes_per_row = bytes_per_row.max(1);
        self.dirty = true;
    }

    /// Number of hex rows needed for the current memory type
    pub fn row_count(&self) -> Result<u32> {
        let size = self.resolver.core().memory_size(self.memory_type)?;
        Ok(size.div_ceil(self.bytes_per_row()))
    }

    /// Text column of one hex row; rows past the end are empty
    pub fn row_text(&self, row: u32) -> Result<String> {
        let state = self.resolver.core().memory_state(self.memory_type)?;
        let per_row = self.bytes_per_row() as usize;
        let start = (row as usize).saturating_mul(per_row).min(state.len());
        let end = start.saturating_add(per_row).min(state.len());
        Ok(self.workspace.resolve_display_text(&state[start..end]))
    }

    /// View settings to persist: the creation settings with the current memory type
    pub fn view_config(&self) -> MemoryToolsConfig {
        MemoryToolsConfig {
            memory_type: Some(self.memory_type.name().to_string()),
            ..self.view.clone()
        }
    }

    /// Selected bytes decoded for the text column
    pub fn selection_text(&self) -> Result<String> {
        let state = self.resolver.core().memory_state(self.memory_type)?;
        let start = (self.selection.start as usize).min(state.len());
        let end = (self.selection.end() as usize + 1).min(state.len());
        Ok(self.workspace.resolve_display_text(&state[start..end]))
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear and return the redraw flag
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

impl NotificationHandler for MemoryTools {
    fn process_notification(&mut self, notification: ConsoleNotification) {
        match notification {
            ConsoleNotification::PpuFrameDone | ConsoleNotification::CodeBreak => {
                self.dirty = true;
            }
            ConsoleNotification::GameLoaded => {
                self.autosave();
                for memory_type in self.update_available_memory_types() {
                    self.workspace.invalidate_memory(memory_type);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bw_core::DebuggerError;
    use bw_memory::{BankTarget, BankedCore, NativeCore, SimLayout};

    #[derive(Default)]
    struct ScriptedHost {
        label: Option<EditOutcome<CodeLabel>>,
        breakpoint: Option<EditOutcome<Breakpoint>>,
        seen_label: Option<CodeLabel>,
        seen_breakpoint: Option<Breakpoint>,
        opened: Vec<(CpuType, u32)>,
    }

    impl EditorHost for ScriptedHost {
        fn edit_label(&mut self, _cpu_type: CpuType, label: CodeLabel) -> EditOutcome<CodeLabel> {
            self.seen_label = Some(label);
            self.label.take().unwrap_or(EditOutcome::Cancelled)
        }

        fn edit_breakpoint(&mut self, breakpoint: Breakpoint) -> EditOutcome<Breakpoint> {
            self.seen_breakpoint = Some(breakpoint);
            self.breakpoint.take().unwrap_or(EditOutcome::Cancelled)
        }

        fn open_debugger(&mut self, cpu_type: CpuType, address: u32) {
            self.opened.push((cpu_type, address));
        }
    }

    fn nes_tools() -> (Arc<BankedCore>, MemoryTools) {
        nes_tools_with_prg(0x8000)
    }

    fn nes_tools_with_prg(prg_size: u32) -> (Arc<BankedCore>, MemoryTools) {
        let core = Arc::new(BankedCore::new());
        core.load(SimLayout::nes(prg_size, 0x2000));
        let tools = MemoryTools::new(
            AddressResolver::new(core.clone()),
            Arc::new(DebugWorkspace::new()),
            &MemoryToolsConfig::default(),
        );
        (core, tools)
    }

    #[test]
    fn test_available_types() {
        let (_core, tools) = nes_tools();
        let available = tools.available_memory_types();
        assert!(available.contains(&MemoryType::NesMemory));
        assert!(available.contains(&MemoryType::NesPrgRom));
        assert!(!available.contains(&MemoryType::SnesMemory));
        assert!(!available.contains(&MemoryType::NesSaveRam));
    }

    #[test]
    fn test_unavailable_type_ignored() {
        let (_core, mut tools) = nes_tools();
        assert!(tools.set_memory_type(MemoryType::NesPrgRom));
        assert!(!tools.set_memory_type(MemoryType::GbPrgRom));
        assert_eq!(tools.memory_type(), MemoryType::NesPrgRom);
        assert!(!tools
            .set_cursor_position(MemoryType::SnesWorkRam, 0x10)
            .unwrap());
    }

    #[test]
    fn test_config_restores_memory_type() {
        let core = Arc::new(BankedCore::new());
        core.load(SimLayout::nes(0x8000, 0x2000));
        let config = MemoryToolsConfig {
            memory_type: Some("NesWorkRam".to_string()),
            bytes_per_row: 8,
        };
        let mut tools = MemoryTools::new(
            AddressResolver::new(core),
            Arc::new(DebugWorkspace::new()),
            &config,
        );
        assert_eq!(tools.memory_type(), MemoryType::NesWorkRam);
        assert_eq!(tools.bytes_per_row(), 8);

        tools.set_memory_type(MemoryType::NesPrgRom);
        let saved = tools.view_config();
        assert_eq!(saved.memory_type.as_deref(), Some("NesPrgRom"));
        assert_eq!(saved.bytes_per_row, 8);
    }

    #[test]
    fn test_row_text_uses_bytes_per_row() {
        let (core, mut tools) = nes_tools();
        tools.set_memory_type(MemoryType::NesWorkRam);
        for (i, b) in b"HELLO".iter().enumerate() {
            core.set_memory_value(MemoryType::NesWorkRam, 4 + i as u32, *b)
                .unwrap();
        }

        tools.set_bytes_per_row(4);
        assert_eq!(tools.row_count().unwrap(), 0x800);
        assert_eq!(tools.row_text(1).unwrap(), "HELL");
        assert_eq!(tools.row_text(2).unwrap(), "O...");
        assert_eq!(tools.row_text(0x900).unwrap(), "");

        tools.workspace().load_tbl(vec!["48=h".to_string()]).unwrap();
        assert_eq!(tools.row_text(1).unwrap(), "hELL");
    }

    #[test]
    fn test_autosave_on_game_loaded() {
        let dir = std::env::temp_dir().join(format!("bankwise-autosave-{}", std::process::id()));
        let config = WorkspaceConfig {
            directory: dir.clone(),
            autosave: true,
        };
        let (core, tools) = nes_tools();
        let mut tools = tools.with_workspace_config(config.clone());
        tools.open_program("first").unwrap();
        tools.set_memory_type(MemoryType::NesMemory);
        tools.set_selection(0x10, 1);
        tools.add_watch().unwrap();

        core.load(SimLayout::gameboy(0x8000));
        tools.process_notification(ConsoleNotification::GameLoaded);

        let saved = DebugWorkspace::new();
        saved.load_from(&config.path_for("first")).unwrap();
        assert_eq!(
            saved.watches().get(CpuType::Nes).unwrap().entries(),
            &["[$10]".to_string()]
        );

        // A program with no saved workspace opens empty
        tools.open_program("second").unwrap();
        assert!(tools.workspace().watches().get(CpuType::Nes).unwrap().is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_no_autosave_when_disabled() {
        let dir = std::env::temp_dir().join(format!("bankwise-no-autosave-{}", std::process::id()));
        let config = WorkspaceConfig {
            directory: dir.clone(),
            autosave: false,
        };
        let (_core, tools) = nes_tools();
        let mut tools = tools.with_workspace_config(config.clone());
        tools.open_program("quiet").unwrap();
        tools.process_notification(ConsoleNotification::GameLoaded);
        assert!(!config.path_for("quiet").exists());

        assert!(tools.save_workspace().unwrap());
        assert!(config.path_for("quiet").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_go_to_limit_and_cursor_clamp() {
        let (_core, mut tools) = nes_tools();
        tools.set_memory_type(MemoryType::NesPrgRom);
        assert_eq!(tools.go_to_limit().unwrap(), Some(0x7FFF));

        assert!(tools
            .set_cursor_position(MemoryType::NesPrgRom, 0x9000)
            .unwrap());
        assert_eq!(tools.selection().start, 0x7FFF);
    }

    #[test]
    fn test_address_range_hint() {
        let (_core, mut tools) = nes_tools();
        tools.set_selection(0x5, 1);
        assert_eq!(tools.address_range_hint(), "$05");
        tools.set_selection(0x8000, 0x10);
        assert_eq!(tools.address_range_hint(), "$8000-$800F");
        tools.set_selection(0x12, 0);
        assert_eq!(tools.address_range_hint(), "$12");
    }

    #[test]
    fn test_byte_updated() {
        let (core, mut tools) = nes_tools();
        tools.set_memory_type(MemoryType::NesMemory);
        tools.take_dirty();
        tools.byte_updated(0x0801, 0x42).unwrap();
        assert_eq!(core.peek(MemoryType::NesInternalRam, 1).unwrap(), 0x42);
        assert!(tools.is_dirty());
    }

    #[test]
    fn test_edit_label_on_relative_address() {
        let (_core, mut tools) = nes_tools();
        tools.set_memory_type(MemoryType::NesMemory);
        tools.set_selection(0x8010, 1);

        let mut host = ScriptedHost {
            label: Some(EditOutcome::Saved(
                CodeLabel::new(0x10, MemoryType::NesPrgRom).with_label("init"),
            )),
            ..ScriptedHost::default()
        };
        assert!(tools.edit_label(&mut host).unwrap());

        let proposed = host.seen_label.unwrap();
        assert_eq!(proposed.address, 0x10);
        assert_eq!(proposed.memory_type, MemoryType::NesPrgRom);
        assert!(proposed.is_empty());
        assert!(tools.workspace().labels().get_by_name("init").is_some());

        // Existing label is offered for editing, then deleted
        let mut host = ScriptedHost {
            label: Some(EditOutcome::Deleted),
            ..ScriptedHost::default()
        };
        tools.edit_label(&mut host).unwrap();
        assert_eq!(host.seen_label.unwrap().label, "init");
        assert_eq!(tools.workspace().labels().count(), 0);
    }

    #[test]
    fn test_edit_label_disabled() {
        let (core, mut tools) = nes_tools();
        tools.set_memory_type(MemoryType::NesMemory);
        tools.set_selection(0x8010, 1);
        core.map_window(CpuType::Nes, 4, None).unwrap();
        assert!(tools.edit_label_target().unwrap().is_none());

        tools.set_memory_type(MemoryType::NesChrRam);
        tools.set_selection(0, 1);
        let mut host = ScriptedHost::default();
        assert!(!tools.edit_label(&mut host).unwrap());
        assert!(host.seen_label.is_none());
    }

    #[test]
    fn test_edit_label_duplicate_name_rejected() {
        let (_core, mut tools) = nes_tools();
        tools
            .workspace()
            .labels()
            .upsert(CodeLabel::new(0, MemoryType::NesWorkRam).with_label("taken"))
            .unwrap();
        tools.set_memory_type(MemoryType::NesWorkRam);
        tools.set_selection(4, 1);

        let mut host = ScriptedHost {
            label: Some(EditOutcome::Saved(
                CodeLabel::new(4, MemoryType::NesWorkRam).with_label("taken"),
            )),
            ..ScriptedHost::default()
        };
        assert!(tools.edit_label(&mut host).is_err());
        assert_eq!(tools.workspace().labels().count(), 1);
    }

    #[test]
    fn test_add_watch() {
        let (_core, mut tools) = nes_tools();
        tools.set_memory_type(MemoryType::NesMemory);
        tools.set_selection(0x10, 2);
        assert!(tools.can_add_watch());
        assert_eq!(tools.add_watch().unwrap(), 2);

        let watches = tools.workspace().watches();
        assert_eq!(
            watches.get(CpuType::Nes).unwrap().entries(),
            &["[$10]".to_string(), "[$11]".to_string()]
        );
    }

    #[test]
    fn test_add_watch_disabled_on_absolute() {
        let (_core, mut tools) = nes_tools();
        tools.set_memory_type(MemoryType::NesPrgRom);
        assert!(!tools.can_add_watch());
        assert!(matches!(
            tools.add_watch(),
            Err(DebuggerError::Watch(WatchError::UnsupportedMemoryType(_)))
        ));
    }

    #[test]
    fn test_edit_breakpoint_default_and_existing() {
        let (_core, mut tools) = nes_tools();
        tools.set_memory_type(MemoryType::NesPrgRom);
        tools.set_selection(100, 0);

        let mut host = ScriptedHost::default();
        host.breakpoint = Some(EditOutcome::Saved(Breakpoint::for_selection(
            MemoryType::NesPrgRom,
            100,
            0,
        )));
        let id = tools.edit_breakpoint(&mut host).unwrap().unwrap();

        let proposal = host.seen_breakpoint.unwrap();
        assert_eq!(proposal.start_address(), 100);
        assert_eq!(proposal.end_address(), 100);
        assert!(proposal.break_on_read && proposal.break_on_write && proposal.break_on_exec);

        // A wider selection overlapping it edits the same breakpoint
        tools.set_selection(90, 20);
        let mut host = ScriptedHost {
            breakpoint: Some(EditOutcome::Deleted),
            ..ScriptedHost::default()
        };
        assert_eq!(tools.edit_breakpoint(&mut host).unwrap(), None);
        assert_eq!(host.seen_breakpoint.unwrap().id, Some(id));
        assert_eq!(tools.workspace().breakpoints().count(), 0);
    }

    #[test]
    fn test_edited_breakpoint_range_leaves_others() {
        let (_core, mut tools) = nes_tools();
        let mut wide = Breakpoint::new(MemoryType::NesWorkRam, 0, 0xFF).unwrap();
        wide.break_on_read = true;
        let wide = tools.workspace().breakpoints().add(wide);

        tools.set_memory_type(MemoryType::NesWorkRam);
        tools.set_selection(0x300, 1);
        let mut edited = Breakpoint::new(MemoryType::NesWorkRam, 0x80, 0x80).unwrap();
        edited.break_on_write = true;
        let mut host = ScriptedHost {
            breakpoint: Some(EditOutcome::Saved(edited)),
            ..ScriptedHost::default()
        };
        let id = tools.edit_breakpoint(&mut host).unwrap().unwrap();
        assert_eq!(host.seen_breakpoint.unwrap().id, None);

        let bps = tools.workspace().breakpoints();
        assert_ne!(id, wide);
        assert_eq!(bps.count(), 2);
        let kept = bps.get(wide).unwrap();
        assert_eq!(kept.range_text(), "$0000-$00FF");
        assert!(kept.break_on_read && !kept.break_on_write);
    }

    #[test]
    fn test_view_in_debugger() {
        let (_core, mut tools) = nes_tools();
        let mut host = ScriptedHost::default();

        tools.set_memory_type(MemoryType::NesPrgRom);
        tools.set_selection(0x7FFC, 1);
        assert!(tools.view_in_debugger(&mut host).unwrap());
        assert_eq!(host.opened, vec![(CpuType::Nes, 0xFFFC)]);

        tools.set_selection(0x7FFC, 2);
        assert_eq!(tools.view_in_debugger_target().unwrap(), None);

        tools.set_memory_type(MemoryType::NesMemory);
        tools.set_selection(0x1234, 1);
        assert_eq!(
            tools.view_in_debugger_target().unwrap(),
            Some((CpuType::Nes, 0x1234))
        );

        tools.set_memory_type(MemoryType::NesPaletteRam);
        tools.set_selection(0, 1);
        assert_eq!(tools.view_in_debugger_target().unwrap(), None);
    }

    #[test]
    fn test_view_in_debugger_unmapped() {
        let (core, mut tools) = nes_tools_with_prg(0x10000);
        tools.set_memory_type(MemoryType::NesPrgRom);
        // Bank 2 of 8 is not mapped at power on
        tools.set_selection(0x4000, 1);
        assert_eq!(tools.view_in_debugger_target().unwrap(), None);

        core.map_window(CpuType::Nes, 5, Some(BankTarget::new(MemoryType::NesPrgRom, 0x4000)))
            .unwrap();
        assert_eq!(
            tools.view_in_debugger_target().unwrap(),
            Some((CpuType::Nes, 0xA000))
        );
    }

    #[test]
    fn test_notifications() {
        let (core, mut tools) = nes_tools();
        tools.take_dirty();
        tools.process_notification(ConsoleNotification::CodeBreak);
        assert!(tools.take_dirty());

        tools
            .workspace()
            .labels()
            .upsert(CodeLabel::new(0, MemoryType::NesWorkRam).with_label("gone"))
            .unwrap();
        core.load(SimLayout::gameboy(0x8000));
        tools.process_notification(ConsoleNotification::GameLoaded);

        assert!(tools
            .available_memory_types()
            .contains(&MemoryType::GameboyMemory));
        assert!(tools.memory_type().to_cpu_type() == Some(CpuType::Gameboy));
        assert_eq!(tools.workspace().labels().count(), 0);
    }
}

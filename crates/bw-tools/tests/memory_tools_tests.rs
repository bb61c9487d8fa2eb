//! Memory tools against a core served from its own thread

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bw_core::config::{MemoryToolsConfig, WorkspaceConfig};
use bw_debug::{Breakpoint, CodeLabel, DebugWorkspace};
use bw_memory::{
    AddressResolver, BankTarget, BankedCore, CoreHost, CpuType, MemoryType, NativeCore, SimLayout,
};
use bw_tools::{spawn_listener, EditOutcome, EditorHost, MemoryTools};
use parking_lot::Mutex;

struct RenameHost(&'static str);

impl EditorHost for RenameHost {
    fn edit_label(&mut self, cpu_type: CpuType, label: CodeLabel) -> EditOutcome<CodeLabel> {
        assert_eq!(cpu_type, CpuType::Gameboy);
        EditOutcome::Saved(label.with_label(self.0))
    }

    fn edit_breakpoint(&mut self, mut breakpoint: Breakpoint) -> EditOutcome<Breakpoint> {
        breakpoint.break_on_read = false;
        EditOutcome::Saved(breakpoint)
    }

    fn open_debugger(&mut self, _cpu_type: CpuType, _address: u32) {}
}

fn switch_rom_bank(core: &BankedCore, bank: u32) {
    for i in 0..4 {
        core.map_window(
            CpuType::Gameboy,
            4 + i,
            Some(BankTarget::new(MemoryType::GbPrgRom, bank * 0x4000 + i as u32 * 0x1000)),
        )
        .unwrap();
    }
}

#[test]
fn test_labels_follow_bank_switches() {
    let core = Arc::new(BankedCore::new());
    core.load(SimLayout::gameboy(0x10000));
    let (host, remote) = CoreHost::spawn(core.clone(), 16).unwrap();

    let mut tools = MemoryTools::new(
        AddressResolver::new(Arc::new(remote)),
        Arc::new(DebugWorkspace::new()),
        &MemoryToolsConfig::default(),
    );
    assert!(tools.set_memory_type(MemoryType::GameboyMemory));
    tools.set_selection(0x4000, 1);

    assert!(tools.edit_label(&mut RenameHost("bank1_start")).unwrap());
    let target = tools.edit_label_target().unwrap().unwrap();
    assert_eq!(target.label, "bank1_start");
    assert_eq!((target.address, target.memory_type), (0x4000, MemoryType::GbPrgRom));

    // Same CPU address, different bank: a fresh label key
    switch_rom_bank(&core, 2);
    let target = tools.edit_label_target().unwrap().unwrap();
    assert!(target.is_empty());
    assert_eq!(target.address, 0x8000);

    tools.edit_label(&mut RenameHost("bank2_start")).unwrap();
    assert_eq!(tools.workspace().labels().count(), 2);

    host.shutdown();
    assert!(tools.edit_label_target().is_err());
}

#[test]
fn test_breakpoint_edit_through_remote_core() {
    let core = Arc::new(BankedCore::new());
    core.load(SimLayout::gameboy(0x8000));
    let (_host, remote) = CoreHost::spawn(core, 4).unwrap();

    let mut tools = MemoryTools::new(
        AddressResolver::new(Arc::new(remote)),
        Arc::new(DebugWorkspace::new()),
        &MemoryToolsConfig::default(),
    );
    tools.set_memory_type(MemoryType::GbWorkRam);
    tools.set_selection(0x10, 4);

    let first = tools.edit_breakpoint(&mut RenameHost("")).unwrap().unwrap();
    tools.set_selection(0x12, 1);
    let second = tools.edit_breakpoint(&mut RenameHost("")).unwrap().unwrap();
    assert_eq!(first, second);

    let bps = tools.workspace().breakpoints();
    let bp = bps.get(first).unwrap();
    assert_eq!(bp.range_text(), "$0010-$0013");
    assert!(!bp.break_on_read);
    assert!(bp.break_on_write);
}

#[test]
fn test_game_loaded_refreshes_from_listener() {
    let core = Arc::new(BankedCore::new());
    let notifications = core.subscribe();
    let tools = Arc::new(Mutex::new(MemoryTools::new(
        AddressResolver::new(core.clone()),
        Arc::new(DebugWorkspace::new()),
        &MemoryToolsConfig::default(),
    )));
    assert!(tools.lock().available_memory_types().is_empty());

    let listener = spawn_listener(notifications, tools.clone()).unwrap();
    core.load(SimLayout::snes(0x2_0000));

    let mut refreshed = false;
    for _ in 0..200 {
        if tools
            .lock()
            .available_memory_types()
            .contains(&MemoryType::SnesMemory)
        {
            refreshed = true;
            break;
        }
        thread::sleep(Duration::from_millis(5));
    }
    assert!(refreshed);
    assert!(core.memory_size(MemoryType::SpcRom).unwrap() > 0);

    assert_eq!(tools.lock().workspace().labels().count(), 0);

    // The listener owns a handle to the core, so it is detached rather than joined
    drop(listener);
}

#[test]
fn test_workspace_saved_under_config_directory() {
    let dir = std::env::temp_dir().join(format!("bankwise-tools-{}", std::process::id()));
    let config = WorkspaceConfig {
        directory: dir.clone(),
        autosave: true,
    };
    let path = config.path_for("Zelda: Link's Awakening");
    assert_eq!(path.file_name().unwrap(), "Zelda_ Link's Awakening.json");

    let core = Arc::new(BankedCore::new());
    core.load(SimLayout::gameboy(0x8000));
    let mut tools = MemoryTools::new(
        AddressResolver::new(core),
        Arc::new(DebugWorkspace::new()),
        &MemoryToolsConfig::default(),
    );
    tools.set_memory_type(MemoryType::GameboyMemory);
    tools.set_selection(0xC000, 2);
    tools.add_watch().unwrap();
    tools.workspace().save_to(&path).unwrap();

    let restored = DebugWorkspace::new();
    restored.load_from(&path).unwrap();
    assert_eq!(
        restored.watches().get(CpuType::Gameboy).unwrap().entries(),
        &["[$C000]".to_string(), "[$C001]".to_string()]
    );

    let _ = std::fs::remove_dir_all(&dir);
}

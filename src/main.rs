//! bankwise - debug workspace inspector
//!
//! Prints the labels, breakpoints and watches stored in a program's debug
//! workspace, and optionally decodes bytes through its TBL table.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use bw_core::config::Config;
use bw_debug::tbl::parse_hex;
use bw_debug::DebugWorkspace;

fn main() -> Result<()> {
    let config = Config::load().unwrap_or_default();
    bw_core::logging::init(&config);

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <workspace.json | program-name> [--decode HEXBYTES]", args[0]);
        eprintln!("\nProgram names are looked up in {}", config.workspace.directory.display());
        std::process::exit(1);
    }

    let path = workspace_path(&config, &args[1]);
    let workspace = DebugWorkspace::new();
    workspace
        .load_from(&path)
        .with_context(|| format!("Failed to load workspace {}", path.display()))?;

    println!("=== Debug workspace ===\n");
    println!("File: {}", path.display());

    let labels = workspace.labels();
    println!("\nLabels ({}):", labels.count());
    for label in labels.labels() {
        print!("  {:<14} ${:06X}  {}", label.memory_type.name(), label.address, label.label);
        if !label.comment.is_empty() {
            print!("  ; {}", label.comment.replace('\n', " "));
        }
        println!();
    }
    drop(labels);

    let breakpoints = workspace.breakpoints();
    println!("\nBreakpoints ({}):", breakpoints.count());
    for bp in breakpoints.get_all() {
        let flags: String = [
            (bp.break_on_read, 'R'),
            (bp.break_on_write, 'W'),
            (bp.break_on_exec, 'X'),
        ]
        .iter()
        .map(|&(on, c)| if on { c } else { '-' })
        .collect();
        print!(
            "  {:<14} {:<15} {} {}",
            bp.memory_type.name(),
            bp.range_text(),
            flags,
            if bp.enabled { "enabled" } else { "disabled" }
        );
        if let Some(condition) = &bp.condition {
            print!("  if {}", condition);
        }
        println!();
    }
    drop(breakpoints);

    let watches = workspace.watches();
    println!("\nWatches:");
    for manager in watches.managers().filter(|m| !m.is_empty()) {
        println!("  {}: {}", manager.cpu_type(), manager.entries().join(", "));
    }
    drop(watches);

    println!(
        "\nTBL: {}",
        if workspace.has_tbl() {
            format!("{} lines", workspace.tbl_mappings().len())
        } else {
            "default encoding".to_string()
        }
    );

    if let Some(pos) = args.iter().position(|a| a == "--decode") {
        let Some(hex) = args.get(pos + 1) else {
            bail!("--decode requires a hex byte string");
        };
        let digits: String = hex.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = parse_hex(&digits).with_context(|| format!("Invalid hex bytes: {hex}"))?;
        println!("\n{}", workspace.resolve_display_text(&bytes));
    }

    Ok(())
}

fn workspace_path(config: &Config, arg: &str) -> PathBuf {
    let path = PathBuf::from(arg);
    if path.extension().is_some_and(|ext| ext == "json") {
        path
    } else {
        config.workspace.path_for(arg)
    }
}

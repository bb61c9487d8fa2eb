//! Watch expression lists

use std::collections::BTreeMap;

use bw_core::error::WatchError;
use bw_core::watch_debug;
use bw_memory::CpuType;

/// Ordered watch expressions for one CPU
///
/// Expressions are stored verbatim. Duplicates are kept and syntax is only
/// checked when the expression is evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchManager {
    cpu_type: CpuType,
    entries: Vec<String>,
}

impl WatchManager {
    pub fn new(cpu_type: CpuType) -> Self {
        Self {
            cpu_type,
            entries: Vec::new(),
        }
    }

    pub fn cpu_type(&self) -> CpuType {
        self.cpu_type
    }

    /// Append expressions in the given order
    pub fn add_watch<I, S>(&mut self, expressions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let before = self.entries.len();
        self.entries.extend(expressions.into_iter().map(Into::into));
        watch_debug!(
            "Added {} watch entries for {}",
            self.entries.len() - before,
            self.cpu_type
        );
    }

    pub fn update_watch(&mut self, index: usize, expression: &str) -> Result<(), WatchError> {
        let count = self.entries.len();
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(WatchError::IndexOutOfRange { index, count })?;
        *entry = expression.to_string();
        Ok(())
    }

    pub fn remove_watch(&mut self, index: usize) -> Result<String, WatchError> {
        if index >= self.entries.len() {
            return Err(WatchError::IndexOutOfRange {
                index,
                count: self.entries.len(),
            });
        }
        Ok(self.entries.remove(index))
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// One `[$XX]` byte-read expression per address of a selection (at least one)
pub fn watch_expressions(start: u32, length: u32) -> Vec<String> {
    (0..length.max(1))
        .map(|i| format!("[${:02X}]", start.saturating_add(i)))
        .collect()
}

/// Watch managers by CPU, created on first access and kept for the process lifetime
#[derive(Debug, Default)]
pub struct WatchRegistry {
    managers: BTreeMap<CpuType, WatchManager>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The manager for a CPU, creating it if needed
    pub fn get_watch_manager(&mut self, cpu_type: CpuType) -> &mut WatchManager {
        self.managers
            .entry(cpu_type)
            .or_insert_with(|| WatchManager::new(cpu_type))
    }

    /// The manager for a CPU if one has been created
    pub fn get(&self, cpu_type: CpuType) -> Option<&WatchManager> {
        self.managers.get(&cpu_type)
    }

    pub fn managers(&self) -> impl Iterator<Item = &WatchManager> {
        self.managers.values()
    }

    /// Empty every list; managers themselves stay registered
    pub fn clear_all(&mut self) {
        for manager in self.managers.values_mut() {
            manager.clear();
        }
    }
}

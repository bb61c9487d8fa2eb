//! Code labels

use std::collections::HashMap;

use bw_core::error::LabelError;
use bw_core::label_debug;
use bw_memory::{AddressInfo, MemoryType};
use serde::{Deserialize, Serialize};

/// A user-defined name and comment attached to one absolute address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeLabel {
    pub address: u32,
    pub memory_type: MemoryType,
    /// Symbol name, may be empty for comment-only labels
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub comment: String,
}

impl CodeLabel {
    /// Blank label for an address
    pub fn new(address: u32, memory_type: MemoryType) -> Self {
        Self {
            address,
            memory_type,
            label: String::new(),
            comment: String::new(),
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = comment.to_string();
        self
    }

    pub fn address_info(&self) -> AddressInfo {
        AddressInfo::new(self.address, self.memory_type)
    }

    /// True when neither a name nor a comment is set
    pub fn is_empty(&self) -> bool {
        self.label.is_empty() && self.comment.is_empty()
    }
}

/// Label names start with a letter, `_` or `@`, then letters, digits, `_` or `@`
pub fn is_valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '@' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '@')
}

type LabelKey = (MemoryType, u32);

/// Label registry keyed by (address, memory type)
#[derive(Debug, Default)]
pub struct LabelManager {
    labels: HashMap<LabelKey, CodeLabel>,
    by_name: HashMap<String, LabelKey>,
}

impl LabelManager {
    /// Create an empty label registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Label at an exact key
    pub fn get(&self, address: u32, memory_type: MemoryType) -> Option<&CodeLabel> {
        self.labels.get(&(memory_type, address))
    }

    /// Label with the given name
    pub fn get_by_name(&self, name: &str) -> Option<&CodeLabel> {
        self.by_name.get(name).and_then(|key| self.labels.get(key))
    }

    /// Insert or replace the label at `label`'s key
    ///
    /// The new label replaces the old one as given, fields are not merged.
    /// An empty label deletes whatever was there. Returns the replaced label.
    pub fn upsert(&mut self, label: CodeLabel) -> Result<Option<CodeLabel>, LabelError> {
        if !label.memory_type.supports_labels() {
            return Err(LabelError::UnsupportedMemoryType(label.memory_type.name()));
        }
        if label.is_empty() {
            return Ok(self.delete(label.address, label.memory_type));
        }

        let key = (label.memory_type, label.address);
        if !label.label.is_empty() {
            if !is_valid_label_name(&label.label) {
                return Err(LabelError::InvalidName(label.label));
            }
            if let Some(&other) = self.by_name.get(&label.label) {
                if other != key {
                    return Err(LabelError::DuplicateName {
                        name: label.label,
                        address: other.1,
                    });
                }
            }
        }

        let previous = self.remove_key(key);
        if !label.label.is_empty() {
            self.by_name.insert(label.label.clone(), key);
        }
        label_debug!(
            "Set label {:?} at {}",
            label.label,
            label.address_info()
        );
        self.labels.insert(key, label);
        Ok(previous)
    }

    /// Remove the label at a key
    pub fn delete(&mut self, address: u32, memory_type: MemoryType) -> Option<CodeLabel> {
        let removed = self.remove_key((memory_type, address));
        if let Some(label) = &removed {
            label_debug!("Deleted label {:?} at {}", label.label, label.address_info());
        }
        removed
    }

    fn remove_key(&mut self, key: LabelKey) -> Option<CodeLabel> {
        let removed = self.labels.remove(&key)?;
        if !removed.label.is_empty() {
            self.by_name.remove(&removed.label);
        }
        Some(removed)
    }

    /// Drop every label in a memory space (e.g. when its ROM is unloaded)
    pub fn invalidate(&mut self, memory_type: MemoryType) -> usize {
        let keys: Vec<LabelKey> = self
            .labels
            .keys()
            .filter(|(t, _)| *t == memory_type)
            .copied()
            .collect();
        for key in &keys {
            self.remove_key(*key);
        }
        if !keys.is_empty() {
            label_debug!("Invalidated {} labels in {}", keys.len(), memory_type);
        }
        keys.len()
    }

    /// All labels ordered by memory type then address
    pub fn labels(&self) -> Vec<&CodeLabel> {
        let mut labels: Vec<&CodeLabel> = self.labels.values().collect();
        labels.sort_by_key(|l| (l.memory_type, l.address));
        labels
    }

    pub fn count(&self) -> usize {
        self.labels.len()
    }

    pub fn clear(&mut self) {
        self.labels.clear();
        self.by_name.clear();
        label_debug!("Cleared all labels");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_replaces() {
        let mut mgr = LabelManager::new();
        let label = CodeLabel::new(0x100, MemoryType::NesPrgRom)
            .with_label("reset")
            .with_comment("first");
        assert_eq!(mgr.upsert(label).unwrap(), None);

        let label = CodeLabel::new(0x100, MemoryType::NesPrgRom)
            .with_label("reset")
            .with_comment("second");
        let previous = mgr.upsert(label).unwrap().unwrap();
        assert_eq!(previous.comment, "first");

        assert_eq!(mgr.count(), 1);
        assert_eq!(mgr.get(0x100, MemoryType::NesPrgRom).unwrap().comment, "second");
    }

    #[test]
    fn test_key_includes_memory_type() {
        let mut mgr = LabelManager::new();
        mgr.upsert(CodeLabel::new(0x10, MemoryType::NesPrgRom).with_label("a"))
            .unwrap();
        mgr.upsert(CodeLabel::new(0x10, MemoryType::NesWorkRam).with_label("b"))
            .unwrap();
        assert_eq!(mgr.count(), 2);
        assert_eq!(mgr.get(0x10, MemoryType::NesWorkRam).unwrap().label, "b");
    }

    #[test]
    fn test_no_merge_on_upsert() {
        let mut mgr = LabelManager::new();
        mgr.upsert(
            CodeLabel::new(0, MemoryType::GbWorkRam)
                .with_label("buffer")
                .with_comment("scratch"),
        )
        .unwrap();
        mgr.upsert(CodeLabel::new(0, MemoryType::GbWorkRam).with_label("buffer"))
            .unwrap();
        assert_eq!(mgr.get(0, MemoryType::GbWorkRam).unwrap().comment, "");
    }

    #[test]
    fn test_rename_frees_old_name() {
        let mut mgr = LabelManager::new();
        mgr.upsert(CodeLabel::new(1, MemoryType::NesWorkRam).with_label("old"))
            .unwrap();
        mgr.upsert(CodeLabel::new(1, MemoryType::NesWorkRam).with_label("new"))
            .unwrap();
        assert!(mgr.get_by_name("old").is_none());
        assert_eq!(mgr.get_by_name("new").unwrap().address, 1);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut mgr = LabelManager::new();
        mgr.upsert(CodeLabel::new(1, MemoryType::NesWorkRam).with_label("dup"))
            .unwrap();
        let err = mgr
            .upsert(CodeLabel::new(2, MemoryType::NesWorkRam).with_label("dup"))
            .unwrap_err();
        assert_eq!(
            err,
            LabelError::DuplicateName {
                name: "dup".to_string(),
                address: 1
            }
        );
        assert!(mgr.get(2, MemoryType::NesWorkRam).is_none());
    }

    #[test]
    fn test_unsupported_memory_type() {
        let mut mgr = LabelManager::new();
        let err = mgr
            .upsert(CodeLabel::new(0, MemoryType::NesMemory).with_label("rel"))
            .unwrap_err();
        assert_eq!(err, LabelError::UnsupportedMemoryType("NesMemory"));
    }

    #[test]
    fn test_empty_label_deletes() {
        let mut mgr = LabelManager::new();
        mgr.upsert(CodeLabel::new(5, MemoryType::NesPrgRom).with_comment("note"))
            .unwrap();
        mgr.upsert(CodeLabel::new(5, MemoryType::NesPrgRom)).unwrap();
        assert_eq!(mgr.count(), 0);
    }

    #[test]
    fn test_invalidate_region() {
        let mut mgr = LabelManager::new();
        for i in 0..4 {
            mgr.upsert(CodeLabel::new(i, MemoryType::NesPrgRom).with_comment("x"))
                .unwrap();
        }
        mgr.upsert(CodeLabel::new(0, MemoryType::NesSaveRam).with_label("save"))
            .unwrap();

        assert_eq!(mgr.invalidate(MemoryType::NesPrgRom), 4);
        assert_eq!(mgr.count(), 1);
        assert!(mgr.get_by_name("save").is_some());
    }

    #[test]
    fn test_label_names() {
        assert!(is_valid_label_name("main_loop"));
        assert!(is_valid_label_name("@local1"));
        assert!(is_valid_label_name("_x"));
        assert!(!is_valid_label_name("1st"));
        assert!(!is_valid_label_name("has space"));
        assert!(!is_valid_label_name(""));
    }

    #[test]
    fn test_sorted_listing() {
        let mut mgr = LabelManager::new();
        mgr.upsert(CodeLabel::new(9, MemoryType::NesWorkRam).with_label("c"))
            .unwrap();
        mgr.upsert(CodeLabel::new(2, MemoryType::NesPrgRom).with_label("b"))
            .unwrap();
        mgr.upsert(CodeLabel::new(1, MemoryType::NesPrgRom).with_label("a"))
            .unwrap();
        let names: Vec<&str> = mgr.labels().iter().map(|l| l.label.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}

//! Breakpoint management for debugging

use std::ops::RangeInclusive;

use bw_core::bp_debug;
use bw_core::error::BreakpointError;
use bw_memory::{CpuType, MemoryType};
use serde::{Deserialize, Serialize};

/// Kind of memory access checked against a breakpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    /// Memory read
    Read,
    /// Memory write
    Write,
    /// Instruction fetch
    Execute,
}

/// A breakpoint over an inclusive address range in one memory space
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoint {
    /// Registry ID, assigned when the breakpoint is added
    #[serde(skip)]
    pub id: Option<u32>,
    pub memory_type: MemoryType,
    /// Owning CPU, `None` for video memory
    pub cpu_type: Option<CpuType>,
    start_address: u32,
    end_address: u32,
    pub break_on_read: bool,
    pub break_on_write: bool,
    pub break_on_exec: bool,
    /// Whether the breakpoint is enabled
    pub enabled: bool,
    /// Optional condition expression, evaluated by the core
    #[serde(default)]
    pub condition: Option<String>,
    /// Hit count (number of times breakpoint was triggered)
    #[serde(skip)]
    pub hit_count: u64,
}

impl Breakpoint {
    /// Create a breakpoint with no access kinds selected
    pub fn new(memory_type: MemoryType, start: u32, end: u32) -> Result<Self, BreakpointError> {
        if start > end {
            return Err(BreakpointError::InvalidRange { start, end });
        }
        Ok(Self {
            id: None,
            memory_type,
            cpu_type: memory_type.to_cpu_type(),
            start_address: start,
            end_address: end,
            break_on_read: false,
            break_on_write: false,
            break_on_exec: false,
            enabled: true,
            condition: None,
            hit_count: 0,
        })
    }

    /// Proposed breakpoint over a selection of `length` bytes (at least one)
    ///
    /// Breaks on read and write; also on execute when the owning CPU can
    /// fetch instructions from the space.
    pub fn for_selection(memory_type: MemoryType, start: u32, length: u32) -> Self {
        let end = start.saturating_add(length.max(1) - 1);
        Self {
            id: None,
            memory_type,
            cpu_type: memory_type.to_cpu_type(),
            start_address: start,
            end_address: end,
            break_on_read: true,
            break_on_write: true,
            break_on_exec: memory_type.is_executable(),
            enabled: true,
            condition: None,
            hit_count: 0,
        }
    }

    pub fn with_condition(mut self, condition: &str) -> Self {
        self.condition = Some(condition.to_string());
        self
    }

    pub fn start_address(&self) -> u32 {
        self.start_address
    }

    pub fn end_address(&self) -> u32 {
        self.end_address
    }

    /// Change the range, keeping `start <= end`
    pub fn set_range(&mut self, start: u32, end: u32) -> Result<(), BreakpointError> {
        if start > end {
            return Err(BreakpointError::InvalidRange { start, end });
        }
        self.start_address = start;
        self.end_address = end;
        Ok(())
    }

    /// Check the range invariant (for deserialized breakpoints)
    pub fn validate(&self) -> Result<(), BreakpointError> {
        if self.start_address > self.end_address {
            return Err(BreakpointError::InvalidRange {
                start: self.start_address,
                end: self.end_address,
            });
        }
        Ok(())
    }

    /// True when execution breaks are meaningful for this space
    pub fn is_cpu_breakpoint(&self) -> bool {
        self.memory_type.is_executable()
    }

    /// True when `[start, end]` on `memory_type` intersects this breakpoint
    pub fn overlaps(&self, start: u32, end: u32, memory_type: MemoryType) -> bool {
        self.memory_type == memory_type && start <= self.end_address && end >= self.start_address
    }

    pub fn contains(&self, memory_type: MemoryType, address: u32) -> bool {
        self.overlaps(address, address, memory_type)
    }

    pub fn breaks_on(&self, access: AccessKind) -> bool {
        match access {
            AccessKind::Read => self.break_on_read,
            AccessKind::Write => self.break_on_write,
            AccessKind::Execute => self.break_on_exec && self.is_cpu_breakpoint(),
        }
    }

    /// `$XXXX` or `$XXXX-$YYYY`
    pub fn range_text(&self) -> String {
        if self.start_address == self.end_address {
            format!("${:04X}", self.start_address)
        } else {
            format!("${:04X}-${:04X}", self.start_address, self.end_address)
        }
    }

    /// Record a hit on this breakpoint
    pub fn record_hit(&mut self) {
        self.hit_count += 1;
    }
}

/// Breakpoint manager
///
/// Breakpoints are kept in registration order. Whenever several match a
/// query, the earliest registered one wins.
#[derive(Debug, Default)]
pub struct BreakpointManager {
    breakpoints: Vec<Breakpoint>,
    next_id: u32,
}

impl BreakpointManager {
    /// Create a new breakpoint manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a breakpoint and return its new ID
    pub fn add(&mut self, mut bp: Breakpoint) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        bp.id = Some(id);
        bp_debug!(
            "Added breakpoint {} on {} {}",
            id,
            bp.memory_type,
            bp.range_text()
        );
        self.breakpoints.push(bp);
        id
    }

    /// Replace a registered breakpoint, matched by ID
    pub fn update(&mut self, bp: Breakpoint) -> Result<(), BreakpointError> {
        bp.validate()?;
        let id = bp.id.ok_or(BreakpointError::NotFound(u32::MAX))?;
        let slot = self
            .breakpoints
            .iter_mut()
            .find(|b| b.id == Some(id))
            .ok_or(BreakpointError::NotFound(id))?;
        *slot = bp;
        bp_debug!("Updated breakpoint {}", id);
        Ok(())
    }

    /// Remove a breakpoint by ID
    pub fn remove(&mut self, id: u32) -> Option<Breakpoint> {
        let index = self.breakpoints.iter().position(|b| b.id == Some(id))?;
        let bp = self.breakpoints.remove(index);
        bp_debug!("Removed breakpoint {} on {} {}", id, bp.memory_type, bp.range_text());
        Some(bp)
    }

    /// Remove a registered breakpoint
    pub fn delete(&mut self, bp: &Breakpoint) -> Option<Breakpoint> {
        bp.id.and_then(|id| self.remove(id))
    }

    /// Enable a breakpoint
    pub fn enable_breakpoint(&mut self, id: u32) -> bool {
        self.set_enabled(id, true)
    }

    /// Disable a breakpoint
    pub fn disable_breakpoint(&mut self, id: u32) -> bool {
        self.set_enabled(id, false)
    }

    fn set_enabled(&mut self, id: u32, enabled: bool) -> bool {
        match self.breakpoints.iter_mut().find(|b| b.id == Some(id)) {
            Some(bp) => {
                bp.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// First registered breakpoint overlapping `[start, end]` on `memory_type`
    pub fn get_matching_breakpoint(
        &self,
        start: u32,
        end: u32,
        memory_type: MemoryType,
    ) -> Option<&Breakpoint> {
        self.breakpoints
            .iter()
            .find(|b| b.overlaps(start, end, memory_type))
    }

    /// Breakpoint to edit for a selection: the matching one, else a new proposal
    pub fn propose(&self, memory_type: MemoryType, start: u32, length: u32) -> Breakpoint {
        let proposal = Breakpoint::for_selection(memory_type, start, length);
        self.get_matching_breakpoint(proposal.start_address, proposal.end_address, memory_type)
            .cloned()
            .unwrap_or(proposal)
    }

    /// Store an edited breakpoint and return its ID
    ///
    /// `selection` is the range the breakpoint was proposed for. A registered
    /// breakpoint is updated in place. An unregistered one whose range was not
    /// edited replaces a breakpoint that now overlaps `selection`, so two
    /// edits racing on the same selection store one breakpoint. Anything else
    /// is added as a new breakpoint.
    pub fn commit(
        &mut self,
        mut bp: Breakpoint,
        selection: RangeInclusive<u32>,
    ) -> Result<u32, BreakpointError> {
        bp.validate()?;
        if let Some(id) = bp.id {
            if self.get(id).is_some() {
                self.update(bp)?;
                return Ok(id);
            }
        }

        let untouched =
            bp.start_address == *selection.start() && bp.end_address == *selection.end();
        let existing = untouched
            .then(|| {
                self.get_matching_breakpoint(*selection.start(), *selection.end(), bp.memory_type)
            })
            .flatten()
            .and_then(|b| b.id);
        match existing {
            Some(id) => {
                bp.id = Some(id);
                self.update(bp)?;
                Ok(id)
            }
            None => Ok(self.add(bp)),
        }
    }

    /// Check an access against enabled breakpoints, recording a hit on the first match
    pub fn check(
        &mut self,
        memory_type: MemoryType,
        address: u32,
        access: AccessKind,
    ) -> Option<&mut Breakpoint> {
        let bp = self
            .breakpoints
            .iter_mut()
            .find(|b| b.enabled && b.contains(memory_type, address) && b.breaks_on(access))?;
        bp.record_hit();
        Some(bp)
    }

    /// Remove every breakpoint in a memory space
    pub fn remove_for_memory_type(&mut self, memory_type: MemoryType) -> usize {
        let before = self.breakpoints.len();
        self.breakpoints.retain(|b| b.memory_type != memory_type);
        before - self.breakpoints.len()
    }

    /// All breakpoints in registration order
    pub fn get_all(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    /// Get a breakpoint by ID
    pub fn get(&self, id: u32) -> Option<&Breakpoint> {
        self.breakpoints.iter().find(|b| b.id == Some(id))
    }

    /// Get the total number of breakpoints
    pub fn count(&self) -> usize {
        self.breakpoints.len()
    }

    /// Clear all breakpoints
    pub fn clear(&mut self) {
        self.breakpoints.clear();
        bp_debug!("Cleared all breakpoints");
    }
}

use log::warn;

use crate::allocator;
use crate::constants::*;
use crate::error::MemoryError;
use crate::memory::{PageNumber, PhysicalMemory};
use crate::process;
use crate::registry::{self, ProcNum};
use crate::translation::{self, Access, VirtualAddress};

/// How much the manager checks its callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Validation {
    /// Trust callers; bad process numbers and unmapped addresses alias into
    /// page 0 exactly as the raw arithmetic dictates
    #[default]
    Compatible,
    /// Reject out-of-range processes, missing processes and unmapped
    /// addresses with an error
    Strict,
}

/// Owns the physical store and runs every operation against it
pub struct VmManager {
    pm: PhysicalMemory,
    validation: Validation,
}

impl VmManager {
    pub fn new(validation: Validation) -> Self {
        VmManager {
            pm: PhysicalMemory::new(),
            validation,
        }
    }

    pub fn validation(&self) -> Validation {
        self.validation
    }

    pub fn memory(&self) -> &PhysicalMemory {
        &self.pm
    }

    fn strict(&self) -> bool {
        self.validation == Validation::Strict
    }

    fn check_range(&self, proc_num: ProcNum) -> Result<(), MemoryError> {
        if self.strict() && !registry::in_range(proc_num) {
            return Err(MemoryError::ProcessOutOfRange(proc_num));
        }
        Ok(())
    }

    fn check_exists(&self, proc_num: ProcNum) -> Result<(), MemoryError> {
        self.check_range(proc_num)?;
        if self.strict() && registry::lookup(&self.pm, proc_num).is_none() {
            return Err(MemoryError::NoSuchProcess(proc_num));
        }
        Ok(())
    }

    /// Create a process with a page table and `page_count` data pages
    pub fn new_process(&mut self, proc_num: ProcNum, page_count: usize) -> Result<(), MemoryError> {
        self.check_range(proc_num)?;
        if self.strict() && registry::lookup(&self.pm, proc_num).is_some() {
            return Err(MemoryError::ProcessExists(proc_num));
        }
        process::create_process(&mut self.pm, proc_num, page_count)
    }

    /// Release all pages of a process. In compatible mode a process that
    /// does not exist is skipped with a warning.
    pub fn kill_process(&mut self, proc_num: ProcNum) -> Result<(), MemoryError> {
        self.check_range(proc_num)?;
        match process::destroy_process(&mut self.pm, proc_num) {
            Ok(_) => Ok(()),
            Err(MemoryError::NoSuchProcess(_)) if !self.strict() => {
                warn!("proc {proc_num}: kill of a process with no page table ignored");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Translate a virtual address for a process into a physical address
    pub fn translate(&self, proc_num: ProcNum, vaddr: u32) -> Result<usize, MemoryError> {
        let va = VirtualAddress::from_raw(vaddr);
        if self.strict() {
            self.check_exists(proc_num)?;
            if va.page >= PT_ENTRIES || translation::page_table_entry(&self.pm, proc_num, &va) == 0 {
                return Err(MemoryError::Unmapped { proc_num, vaddr });
            }
        }
        Ok(translation::translate(&self.pm, proc_num, &va))
    }

    pub fn store(&mut self, proc_num: ProcNum, vaddr: u32, value: u8) -> Result<Access, MemoryError> {
        self.translate(proc_num, vaddr)?;
        Ok(translation::store(&mut self.pm, proc_num, vaddr, value))
    }

    pub fn load(&self, proc_num: ProcNum, vaddr: u32) -> Result<Access, MemoryError> {
        self.translate(proc_num, vaddr)?;
        Ok(translation::load(&self.pm, proc_num, vaddr))
    }

    /// Allocation state of every page tracked by the free-page map
    pub fn free_map(&self) -> Vec<bool> {
        (0..PTP_OFFSET)
            .map(|page| allocator::is_allocated(&self.pm, page as PageNumber))
            .collect()
    }

    pub fn allocated_pages(&self) -> usize {
        allocator::allocated_count(&self.pm)
    }

    pub fn is_allocated(&self, page: PageNumber) -> bool {
        allocator::is_allocated(&self.pm, page)
    }

    pub fn page_table_of(&self, proc_num: ProcNum) -> Option<PageNumber> {
        registry::lookup(&self.pm, proc_num)
    }

    /// Mapped `(virtual page, physical page)` pairs among the first
    /// `PAGE_COUNT` entries of the page table
    pub fn mappings(&self, proc_num: ProcNum) -> Result<Vec<(usize, PageNumber)>, MemoryError> {
        self.check_exists(proc_num)?;
        Ok(process::mappings(&self.pm, proc_num, PAGE_COUNT))
    }
}

impl Default for VmManager {
    fn default() -> Self {
        Self::new(Validation::default())
    }
}

use std::fmt;

use log::trace;

use crate::constants::*;
use crate::memory::{PageNumber, PhysicalMemory, address};
use crate::process::get_entry;
use crate::registry::{self, ProcNum};

/// Represents the decomposed components of a virtual address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualAddress {
    pub va: u32,
    /// Page table index
    pub page: usize,
    /// Offset within the page
    pub offset: usize,
}

impl VirtualAddress {
    pub fn from_raw(va: u32) -> Self {
        VirtualAddress {
            va,
            page: (va >> PAGE_SHIFT) as usize,
            offset: (va & OFFSET_MASK) as usize,
        }
    }
}

impl fmt::Display for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VA({}) = (page={}, offset={})", self.va, self.page, self.offset)
    }
}

/// Page table entry that `va` goes through for this process.
///
/// Nothing is checked: an empty registry slot reads page 0 as the page
/// table, and an index past the table aliases into the following page.
pub fn page_table_entry(pm: &PhysicalMemory, proc_num: ProcNum, va: &VirtualAddress) -> PageNumber {
    let page_table = registry::get_page_table(pm, proc_num);
    get_entry(pm, page_table, va.page)
}

/// Translate a virtual address for a process into a physical address.
///
/// Unmapped entries read as physical page 0, so the result then points into
/// the free-page map and registry.
pub fn translate(pm: &PhysicalMemory, proc_num: ProcNum, va: &VirtualAddress) -> usize {
    let page = page_table_entry(pm, proc_num, va);
    let pa = address(page as usize, va.offset);
    trace!("proc {proc_num}: {va} -> page {page}, PA {pa}");
    pa
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Load,
    Store,
}

/// Record of one load or store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    pub kind: AccessKind,
    pub proc_num: ProcNum,
    pub vaddr: u32,
    pub paddr: usize,
    pub value: u8,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            AccessKind::Load => "Load",
            AccessKind::Store => "Store",
        };
        // Process numbers and addresses come from signed command arguments
        write!(
            f,
            "{} proc {}: {} => {}, value={}",
            kind,
            self.proc_num as isize,
            self.vaddr as i32,
            self.paddr,
            self.value
        )
    }
}

/// Store a byte at a virtual address of a process
pub fn store(pm: &mut PhysicalMemory, proc_num: ProcNum, vaddr: u32, value: u8) -> Access {
    let paddr = translate(pm, proc_num, &VirtualAddress::from_raw(vaddr));
    pm.write(paddr, value);
    Access {
        kind: AccessKind::Store,
        proc_num,
        vaddr,
        paddr,
        value,
    }
}

/// Load the byte at a virtual address of a process
pub fn load(pm: &PhysicalMemory, proc_num: ProcNum, vaddr: u32) -> Access {
    let paddr = translate(pm, proc_num, &VirtualAddress::from_raw(vaddr));
    Access {
        kind: AccessKind::Load,
        proc_num,
        vaddr,
        paddr,
        value: pm.read(paddr),
    }
}

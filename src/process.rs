//! Page tables and process lifecycle.
//!
//! A process's page table is one physical page; entry `i` is the physical
//! page backing virtual page `i`, or 0 when unmapped.

use log::{info, warn};

use crate::allocator::{allocate_next_page, free_page};
use crate::constants::*;
use crate::error::{AllocationPurpose, MemoryError};
use crate::memory::{PageNumber, PhysicalMemory, address};
use crate::registry::{self, ProcNum};

/// Read page table entry `index` of the page table in `page_table`
#[inline]
pub fn get_entry(pm: &PhysicalMemory, page_table: PageNumber, index: usize) -> PageNumber {
    pm.read(address(page_table as usize, index))
}

#[inline]
pub fn set_entry(pm: &mut PhysicalMemory, page_table: PageNumber, index: usize, page: PageNumber) {
    pm.write(address(page_table as usize, index), page);
}

/// Allocate pages for a new process: its page table plus `page_count` data
/// pages, each zeroed before use.
///
/// Running out of pages aborts the remaining work and returns
/// [`MemoryError::OutOfMemory`]. Pages obtained before that stay allocated
/// and mapped, so the process is left smaller than requested but consistent.
pub fn create_process(
    pm: &mut PhysicalMemory,
    proc_num: ProcNum,
    page_count: usize,
) -> Result<(), MemoryError> {
    if let Some(old) = registry::lookup(pm, proc_num) {
        warn!("proc {proc_num}: replacing page table {old}, its pages stay allocated");
    }

    let page_table = allocate_next_page(pm).ok_or_else(|| {
        warn!("proc {proc_num}: no page left for page table");
        MemoryError::OutOfMemory {
            proc_num,
            purpose: AllocationPurpose::PageTable,
        }
    })?;
    pm.zero_page(page_table);
    registry::set_page_table(pm, proc_num, page_table);

    for i in 0..page_count {
        let Some(page) = allocate_next_page(pm) else {
            warn!("proc {proc_num}: out of pages after {i} of {page_count} data pages");
            return Err(MemoryError::OutOfMemory {
                proc_num,
                purpose: AllocationPurpose::DataPage,
            });
        };
        pm.zero_page(page);
        set_entry(pm, page_table, i, page);
    }

    info!("proc {proc_num}: created with page table {page_table} and {page_count} data pages");
    Ok(())
}

/// Free every data page mapped by the process, then its page table, and
/// clear its registry slot. Returns the number of pages released.
///
/// All `PT_ENTRIES` entries are walked, not only the ones filled at
/// creation. A process with no page table is left alone and reported as
/// [`MemoryError::NoSuchProcess`]; page 0 is never freed.
pub fn destroy_process(pm: &mut PhysicalMemory, proc_num: ProcNum) -> Result<usize, MemoryError> {
    let page_table = registry::lookup(pm, proc_num).ok_or(MemoryError::NoSuchProcess(proc_num))?;

    let mut freed = 0;
    for i in 0..PT_ENTRIES {
        let page = get_entry(pm, page_table, i);
        if page != 0 {
            free_page(pm, page);
            freed += 1;
        }
    }

    free_page(pm, page_table);
    registry::set_page_table(pm, proc_num, 0);

    info!("proc {proc_num}: destroyed, released {} pages", freed + 1);
    Ok(freed + 1)
}

/// Mapped entries among the first `limit` of a process's page table, as
/// `(virtual page, physical page)` pairs
pub fn mappings(pm: &PhysicalMemory, proc_num: ProcNum, limit: usize) -> Vec<(usize, PageNumber)> {
    let Some(page_table) = registry::lookup(pm, proc_num) else {
        return Vec::new();
    };
    (0..limit.min(PT_ENTRIES))
        .map(|i| (i, get_entry(pm, page_table, i)))
        .filter(|&(_, page)| page != 0)
        .collect()
}

//! Process table registry: one byte per process slot in page 0, starting at
//! `PTP_OFFSET`, holding the page number of that process's page table.
//!
//! Page 0 is never allocatable, so a slot value of 0 means the process has
//! no page table. Killing and printing check for that; translation does not,
//! so in compatible mode a load or store by such a process reads page 0 as
//! its page table.

use crate::constants::*;
use crate::memory::{PageNumber, PhysicalMemory, address};

/// Process slot number
pub type ProcNum = usize;

#[inline]
fn slot_address(proc_num: ProcNum) -> usize {
    address(0, PTP_OFFSET.wrapping_add(proc_num))
}

/// Get the page table page for a given process
pub fn get_page_table(pm: &PhysicalMemory, proc_num: ProcNum) -> PageNumber {
    pm.read(slot_address(proc_num))
}

/// Set the page table page for a given process
pub fn set_page_table(pm: &mut PhysicalMemory, proc_num: ProcNum, page: PageNumber) {
    pm.write(slot_address(proc_num), page);
}

/// Page table page of a process, or `None` if the slot is empty
pub fn lookup(pm: &PhysicalMemory, proc_num: ProcNum) -> Option<PageNumber> {
    match get_page_table(pm, proc_num) {
        0 => None,
        page => Some(page),
    }
}

pub fn in_range(proc_num: ProcNum) -> bool {
    proc_num < MAX_PROCESSES
}

use std::fmt;

use thiserror::Error;

use crate::registry::ProcNum;

/// What a failed allocation was meant to back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationPurpose {
    PageTable,
    DataPage,
}

impl fmt::Display for AllocationPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationPurpose::PageTable => write!(f, "page table"),
            AllocationPurpose::DataPage => write!(f, "data page"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// No free page was left. Work done before the failure stays in place.
    #[error("OOM: proc {proc_num}: {purpose}")]
    OutOfMemory {
        proc_num: ProcNum,
        purpose: AllocationPurpose,
    },
    #[error("proc {0}: process number out of range")]
    ProcessOutOfRange(ProcNum),
    #[error("proc {0}: no such process")]
    NoSuchProcess(ProcNum),
    #[error("proc {0}: process already exists")]
    ProcessExists(ProcNum),
    #[error("proc {proc_num}: virtual address {vaddr} is not mapped")]
    Unmapped { proc_num: ProcNum, vaddr: u32 },
}

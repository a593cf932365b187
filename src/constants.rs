use thiserror::Error;

/// Size of the simulated RAM in bytes
pub const MEM_SIZE: usize = 16384;
pub const PAGE_SIZE: usize = 256;
pub const PAGE_COUNT: usize = 64;
pub const PAGE_SHIFT: u32 = 8;

/// Offset in page 0 of the page table pointer table. Everything before it is
/// the free-page map, one byte per physical page.
pub const PTP_OFFSET: usize = 64;

/// Number of registry slots left in page 0 after the free-page map
pub const MAX_PROCESSES: usize = PAGE_SIZE - PTP_OFFSET;

/// Entries in a page table: one byte each, a full page
pub const PT_ENTRIES: usize = PAGE_SIZE;

pub const OFFSET_MASK: u32 = (PAGE_SIZE as u32) - 1;

const _: () = assert!(Geometry::DEFAULT.is_consistent());

/// Page geometry of the physical store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub mem_size: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub page_shift: u32,
    pub ptp_offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("page_size * page_count ({page_size} * {page_count}) != mem_size ({mem_size})")]
    SizeMismatch {
        page_size: usize,
        page_count: usize,
        mem_size: usize,
    },
    #[error("page_size {page_size} is not 1 << {page_shift}")]
    ShiftMismatch { page_size: usize, page_shift: u32 },
    #[error("free-page map of {ptp_offset} bytes does not fit the layout")]
    MapTooLarge { ptp_offset: usize },
}

impl Geometry {
    pub const DEFAULT: Geometry = Geometry {
        mem_size: MEM_SIZE,
        page_size: PAGE_SIZE,
        page_count: PAGE_COUNT,
        page_shift: PAGE_SHIFT,
        ptp_offset: PTP_OFFSET,
    };

    const fn is_consistent(&self) -> bool {
        self.page_size * self.page_count == self.mem_size
            && self.page_shift < usize::BITS
            && self.page_size == 1 << self.page_shift
            && self.ptp_offset <= self.page_size
            && self.ptp_offset <= self.page_count
    }

    /// Check the geometry before any command runs
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.page_size.checked_mul(self.page_count) != Some(self.mem_size) {
            return Err(GeometryError::SizeMismatch {
                page_size: self.page_size,
                page_count: self.page_count,
                mem_size: self.mem_size,
            });
        }
        if self.page_shift >= usize::BITS || self.page_size != 1 << self.page_shift {
            return Err(GeometryError::ShiftMismatch {
                page_size: self.page_size,
                page_shift: self.page_shift,
            });
        }
        // The map lives in page 0 and indexes physical pages
        if self.ptp_offset > self.page_size || self.ptp_offset > self.page_count {
            return Err(GeometryError::MapTooLarge {
                ptp_offset: self.ptp_offset,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry_is_valid() {
        assert_eq!(Geometry::DEFAULT.validate(), Ok(()));
        assert_eq!(MAX_PROCESSES, 192);
    }

    #[test]
    fn test_size_mismatch() {
        let g = Geometry {
            page_count: 63,
            ..Geometry::DEFAULT
        };
        assert!(matches!(g.validate(), Err(GeometryError::SizeMismatch { .. })));
    }

    #[test]
    fn test_shift_mismatch() {
        let g = Geometry {
            page_shift: 9,
            ..Geometry::DEFAULT
        };
        assert_eq!(
            g.validate(),
            Err(GeometryError::ShiftMismatch {
                page_size: 256,
                page_shift: 9
            })
        );
    }

    #[test]
    fn test_map_too_large() {
        let g = Geometry {
            ptp_offset: 65,
            ..Geometry::DEFAULT
        };
        assert_eq!(
            g.validate(),
            Err(GeometryError::MapTooLarge { ptp_offset: 65 })
        );
    }
}

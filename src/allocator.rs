//! Free-page allocator.
//!
//! The first `PTP_OFFSET` bytes of page 0 form the free-page map: byte `i`
//! is nonzero while physical page `i` is in use. Allocation is first-fit by
//! ascending page number.
//!
//! Page 0 holds the map itself and is reserved whatever its map byte says:
//! a stray store can clear that byte, but the page is never handed out.

use log::debug;

use crate::constants::*;
use crate::memory::{PageNumber, PhysicalMemory, address};

/// Allocate the lowest free page, or `None` if every page is taken
pub fn allocate_next_page(pm: &mut PhysicalMemory) -> Option<PageNumber> {
    let slot = (1..PTP_OFFSET).find(|&i| pm.read(address(0, i)) == 0)?;
    let page = PageNumber::try_from(slot).ok()?;
    pm.write(address(0, slot), 1);
    debug!("allocated page {page}");
    Some(page)
}

/// Mark a page free in the free-page map
pub fn free_page(pm: &mut PhysicalMemory, page: PageNumber) {
    if page == 0 {
        return;
    }
    pm.write(address(0, page as usize), 0);
    debug!("freed page {page}");
}

pub fn is_allocated(pm: &PhysicalMemory, page: PageNumber) -> bool {
    page == 0 || pm.read(address(0, page as usize)) != 0
}

/// Number of pages currently marked in use, page 0 included
pub fn allocated_count(pm: &PhysicalMemory) -> usize {
    1 + (1..PTP_OFFSET)
        .filter(|&i| pm.read(address(0, i)) != 0)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_fit_ascending() {
        let mut pm = PhysicalMemory::new();
        assert_eq!(allocate_next_page(&mut pm), Some(1));
        assert_eq!(allocate_next_page(&mut pm), Some(2));
        assert_eq!(allocate_next_page(&mut pm), Some(3));
        assert_eq!(allocated_count(&pm), 4);
    }

    #[test]
    fn test_freed_page_is_reused_first() {
        let mut pm = PhysicalMemory::new();
        for _ in 0..5 {
            allocate_next_page(&mut pm);
        }
        free_page(&mut pm, 2);
        assert!(!is_allocated(&pm, 2));
        assert_eq!(allocate_next_page(&mut pm), Some(2));
        assert_eq!(allocate_next_page(&mut pm), Some(6));
    }

    #[test]
    fn test_exhaustion() {
        let mut pm = PhysicalMemory::new();
        for expected in 1..PTP_OFFSET {
            assert_eq!(allocate_next_page(&mut pm), Some(expected as PageNumber));
        }
        assert_eq!(allocate_next_page(&mut pm), None);
        assert_eq!(allocated_count(&pm), PTP_OFFSET);

        // Exhaustion leaves the map untouched
        free_page(&mut pm, 40);
        assert_eq!(allocate_next_page(&mut pm), Some(40));
    }

    #[test]
    fn test_zero_page_reserved_after_map_byte_cleared() {
        let mut pm = PhysicalMemory::new();
        pm.write(address(0, 0), 0);

        assert!(is_allocated(&pm, 0));
        assert_eq!(allocated_count(&pm), 1);
        assert_eq!(allocate_next_page(&mut pm), Some(1));

        free_page(&mut pm, 0);
        assert!(is_allocated(&pm, 0));
    }

    #[test]
    fn test_zero_page_never_handed_out() {
        let mut pm = PhysicalMemory::new();
        assert!(is_allocated(&pm, 0));
        while let Some(page) = allocate_next_page(&mut pm) {
            assert_ne!(page, 0);
        }
    }
}

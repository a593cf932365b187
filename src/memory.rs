use crate::constants::*;

/// Physical page number. Page tables hold one byte per entry, so a page
/// number always fits in a `u8`.
pub type PageNumber = u8;

/// Convert a page,offset pair into a physical address.
///
/// `offset` is expected to be below `PAGE_SIZE`. Larger offsets are not
/// rejected: their high bits merge into the page number, so they alias into
/// a neighbouring page.
#[inline]
pub fn address(page: usize, offset: usize) -> usize {
    (page << PAGE_SHIFT) | offset
}

/// Simulated RAM
pub struct PhysicalMemory {
    data: Box<[u8]>,
}

impl PhysicalMemory {
    /// Create a zeroed store with page 0 marked allocated
    pub fn new() -> Self {
        let mut pm = PhysicalMemory {
            data: vec![0u8; MEM_SIZE].into_boxed_slice(),
        };
        pm.initialize();
        pm
    }

    /// Zero all of RAM, then mark the zero page as allocated.
    pub fn initialize(&mut self) {
        self.data.fill(0);
        self.write(address(0, 0), 1);
    }

    /// Read a byte. Addresses past the end wrap around the store.
    #[inline]
    pub fn read(&self, address: usize) -> u8 {
        self.data[address % MEM_SIZE]
    }

    /// Write a byte. Addresses past the end wrap around the store.
    #[inline]
    pub fn write(&mut self, address: usize, value: u8) {
        self.data[address % MEM_SIZE] = value;
    }

    /// Zero every byte of a physical page
    pub fn zero_page(&mut self, page: PageNumber) {
        let base = address(page as usize, 0) % MEM_SIZE;
        self.data[base..base + PAGE_SIZE].fill(0);
    }

    /// Read-only view of one physical page
    pub fn page(&self, page: PageNumber) -> &[u8] {
        let base = address(page as usize, 0) % MEM_SIZE;
        &self.data[base..base + PAGE_SIZE]
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl Default for PhysicalMemory {
    fn default() -> Self {
        Self::new()
    }
}

//! Video RAM array.

/// 32 KiB: enough for a 512x342 1-bit frame (21,888 bytes) at the largest
/// memory configuration.
pub const VRAM_SIZE: usize = 0x8000;

/// 15 address lines.
pub const ADDRESS_MASK: u16 = 0x7FFF;

/// Video RAM backing store.
#[derive(Clone)]
pub struct Vram {
    data: Vec<u8>,
}

impl Vram {
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: vec![0; VRAM_SIZE],
        }
    }

    /// Read without going through the port (debugger access, no timing).
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.data[usize::from(address & ADDRESS_MASK)]
    }

    /// Write without going through the port (test setup, no timing).
    pub fn poke(&mut self, address: u16, value: u8) {
        self.data[usize::from(address & ADDRESS_MASK)] = value;
    }

    /// Whole array, in address order.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }
}

impl Default for Vram {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Vram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vram").field("size", &self.data.len()).finish()
    }
}

//! Framebuffer window decoding.
//!
//! The framebuffer is the top 32 KiB of installed RAM. Installed RAM is
//! `128 KiB << code` for the 3-bit memory-size code, so each code claims a
//! different host window:
//!
//! | Code | RAM    | Window              |
//! |------|--------|---------------------|
//! | 0    | 128K   | $018000-$01FFFF     |
//! | 1    | 256K   | $038000-$03FFFF     |
//! | 2    | 512K   | $078000-$07FFFF     |
//! | 3    | 1M     | $0F8000-$0FFFFF     |
//! | 4    | 2M     | $1F8000-$1FFFFF     |
//! | 5    | 4M     | $3F8000-$3FFFFF     |
//! | 6    | 8M     | $7F8000-$7FFFFF     |
//! | 7    | 16M    | $FF8000-$FFFFFF     |
//!
//! Decoding compares the address above bit 15 against a per-code pattern:
//! zeros above the installed size, then `code + 2` ones selecting the top
//! window. A matching address has the window base subtracted and is halved
//! (A0 is carried by the byte strobes, not the address), giving a 14-bit
//! local word offset.

use std::fmt;

/// Host address bus width (A23-A0, A0 implied).
pub const HOST_ADDRESS_BITS: u32 = 24;

/// log2 of the framebuffer window size.
pub const WINDOW_BITS: u32 = 15;

/// Framebuffer window size in bytes.
pub const WINDOW_SIZE: u32 = 1 << WINDOW_BITS;

/// RAM size for code 0.
const BASE_RAM: u32 = 0x2_0000;

/// Largest valid memory-size code.
const MAX_CODE: u8 = 7;

/// Memory-size code outside 0-7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidMemorySize(pub u8);

impl fmt::Display for InvalidMemorySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid memory-size code {} (expected 0-{MAX_CODE})",
            self.0
        )
    }
}

impl std::error::Error for InvalidMemorySize {}

/// Static 3-bit memory-size selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemorySize(u8);

impl MemorySize {
    /// Every valid code, smallest RAM first.
    pub const ALL: [Self; 8] = [
        Self(0),
        Self(1),
        Self(2),
        Self(3),
        Self(4),
        Self(5),
        Self(6),
        Self(7),
    ];

    #[must_use]
    pub const fn code(self) -> u8 {
        self.0
    }

    /// First address past installed RAM.
    #[must_use]
    pub const fn ram_top(self) -> u32 {
        BASE_RAM << self.0
    }

    /// First host address of the framebuffer window.
    #[must_use]
    pub const fn window_base(self) -> u32 {
        self.ram_top() - WINDOW_SIZE
    }

    /// Expected value of `address >> WINDOW_BITS` for a framebuffer access.
    #[must_use]
    pub const fn select_pattern(self) -> u32 {
        (4 << self.0) - 1
    }
}

impl TryFrom<u8> for MemorySize {
    type Error = InvalidMemorySize;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        if code > MAX_CODE {
            return Err(InvalidMemorySize(code));
        }
        Ok(Self(code))
    }
}

impl fmt::Display for MemorySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kib = self.ram_top() / 1024;
        if kib >= 1024 {
            write!(f, "{}M", kib / 1024)
        } else {
            write!(f, "{kib}K")
        }
    }
}

/// Host address decoder for one memory configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramebufferWindow {
    size: MemorySize,
}

impl FramebufferWindow {
    #[must_use]
    pub const fn new(size: MemorySize) -> Self {
        Self { size }
    }

    #[must_use]
    pub const fn memory_size(&self) -> MemorySize {
        self.size
    }

    /// Does the host address fall inside the framebuffer window?
    #[must_use]
    pub const fn contains(&self, address: u32) -> bool {
        address >> HOST_ADDRESS_BITS == 0 && address >> WINDOW_BITS == self.size.select_pattern()
    }

    /// Translate a host address to a 14-bit local word offset.
    #[must_use]
    pub const fn decode(&self, address: u32) -> Option<u16> {
        if !self.contains(address) {
            return None;
        }
        Some(((address - self.size.window_base()) >> 1) as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_above_seven_are_rejected() {
        assert_eq!(MemorySize::try_from(8), Err(InvalidMemorySize(8)));
        assert_eq!(MemorySize::try_from(7).map(MemorySize::code), Ok(7));
    }

    #[test]
    fn window_bases_match_table() {
        let bases: Vec<u32> = MemorySize::ALL.iter().map(|m| m.window_base()).collect();
        assert_eq!(
            bases,
            vec![
                0x01_8000, 0x03_8000, 0x07_8000, 0x0F_8000, 0x1F_8000, 0x3F_8000, 0x7F_8000,
                0xFF_8000
            ]
        );
    }

    #[test]
    fn window_edges() {
        for size in MemorySize::ALL {
            let window = FramebufferWindow::new(size);
            let base = size.window_base();
            assert_eq!(window.decode(base), Some(0), "{size}");
            assert_eq!(window.decode(base + 1), Some(0), "{size}: A0 ignored");
            assert_eq!(window.decode(base + WINDOW_SIZE - 2), Some(0x3FFF), "{size}");
            assert_eq!(window.decode(base - 1), None, "{size}: below window");
            assert_eq!(window.decode(base + WINDOW_SIZE), None, "{size}: above window");
        }
    }

    #[test]
    fn offsets_fit_fourteen_bits() {
        let window = FramebufferWindow::new(MemorySize::ALL[2]);
        let base = MemorySize::ALL[2].window_base();
        for addr in (base..base + WINDOW_SIZE).step_by(2) {
            let offset = window.decode(addr).expect("inside window");
            assert!(offset < 0x4000);
            assert_eq!(u32::from(offset), (addr - base) / 2);
        }
    }

    #[test]
    fn windows_do_not_overlap_across_codes() {
        for a in MemorySize::ALL {
            for b in MemorySize::ALL {
                if a == b {
                    continue;
                }
                let window_b = FramebufferWindow::new(b);
                let base = a.window_base();
                for addr in [base, base + 0x1234, base + WINDOW_SIZE - 1] {
                    assert!(
                        !window_b.contains(addr),
                        "code {} window claims code {} address {addr:#08X}",
                        b.code(),
                        a.code()
                    );
                }
            }
        }
    }

    #[test]
    fn addresses_beyond_the_bus_never_match() {
        let window = FramebufferWindow::new(MemorySize::ALL[7]);
        assert!(window.contains(0xFF_8000));
        assert!(!window.contains(0x1FF_8000));
        assert!(!window.contains(0x0000_0000));
    }

    #[test]
    fn ram_size_display() {
        assert_eq!(MemorySize::ALL[0].to_string(), "128K");
        assert_eq!(MemorySize::ALL[3].to_string(), "1M");
        assert_eq!(MemorySize::ALL[7].to_string(), "16M");
    }
}

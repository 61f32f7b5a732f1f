//! Host bus signal levels.

/// One sample of the host bus.
///
/// Strobes are stored as "asserted" booleans; the physical lines are active
/// low. `write` is the inverse of the R/W line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostBusSignals {
    /// Byte address (A0 is implied by the data strobes on the real bus).
    pub address: u32,
    /// D15-D0.
    pub data: u16,
    /// Address strobe (/AS).
    pub address_strobe: bool,
    /// Upper data strobe (/UDS), D15-D8.
    pub upper_strobe: bool,
    /// Lower data strobe (/LDS), D7-D0.
    pub lower_strobe: bool,
    /// Bus cycle direction is write (R/W low).
    pub write: bool,
    /// Host clock level. Only a reference for cycle completion.
    pub bus_clock: bool,
}

impl HostBusSignals {
    /// Released bus: no strobes, read direction.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            address: 0,
            data: 0,
            address_strobe: false,
            upper_strobe: false,
            lower_strobe: false,
            write: false,
            bus_clock: false,
        }
    }

    /// Is either byte-lane strobe asserted?
    #[must_use]
    pub const fn data_strobe(&self) -> bool {
        self.upper_strobe || self.lower_strobe
    }

    /// D15-D8.
    #[must_use]
    pub const fn upper_byte(&self) -> u8 {
        (self.data >> 8) as u8
    }

    /// D7-D0.
    #[must_use]
    pub const fn lower_byte(&self) -> u8 {
        (self.data & 0xFF) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_lanes_split_data_bus() {
        let bus = HostBusSignals {
            data: 0x1234,
            ..HostBusSignals::idle()
        };
        assert_eq!(bus.upper_byte(), 0x12);
        assert_eq!(bus.lower_byte(), 0x34);
    }

    #[test]
    fn idle_has_no_strobes() {
        let bus = HostBusSignals::idle();
        assert!(!bus.address_strobe && !bus.data_strobe() && !bus.write);
        assert_eq!(bus, HostBusSignals::default());
    }
}

//! System configuration.
//!
//! Fixed at construction. The memory-size code in particular is a strap on
//! the real board, not something the host can change at run time.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use vidmem_snoop::{InvalidMemorySize, MemorySize};

/// 15.6672 MHz: 704 clocks x 370 lines at 60.15 Hz.
const DEFAULT_PIXEL_CLOCK_HZ: u64 = 15_667_200;

/// Host bus clock. Deliberately not a divisor of the pixel clock.
const DEFAULT_HOST_CLOCK_HZ: u64 = 8_000_000;

/// Wait states inserted into every host bus cycle.
///
/// Keeps data strobes asserted long enough for a write captured right at the
/// commit deadline to drain before the host starts its next cycle.
const DEFAULT_HOST_WAIT_STATES: u8 = 4;

const NS_PER_SECOND: u64 = 1_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VidMemConfig {
    /// 3-bit installed-memory code (0 = 128K ... 7 = 16M).
    pub memory_size: u8,
    pub pixel_clock_hz: u64,
    pub host_clock_hz: u64,
    /// Extra clock pairs between the data strobe and the end of each host cycle.
    pub host_wait_states: u8,
    /// Delay of the host clock's first edge, in nanoseconds. At most one
    /// host clock period.
    pub host_phase_ns: u64,
}

impl Default for VidMemConfig {
    fn default() -> Self {
        Self {
            memory_size: 2,
            pixel_clock_hz: DEFAULT_PIXEL_CLOCK_HZ,
            host_clock_hz: DEFAULT_HOST_CLOCK_HZ,
            host_wait_states: DEFAULT_HOST_WAIT_STATES,
            host_phase_ns: 0,
        }
    }
}

impl VidMemConfig {
    /// Parse a JSON configuration. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Check every field and return the decoded memory size.
    pub fn validate(&self) -> Result<MemorySize, ConfigError> {
        if self.pixel_clock_hz == 0 {
            return Err(ConfigError::ZeroClock("pixel_clock_hz"));
        }
        if self.host_clock_hz == 0 {
            return Err(ConfigError::ZeroClock("host_clock_hz"));
        }
        let limit_ns = self.host_period_ns();
        if self.host_phase_ns > limit_ns {
            return Err(ConfigError::PhaseTooLong {
                phase_ns: self.host_phase_ns,
                limit_ns,
            });
        }
        Ok(MemorySize::try_from(self.memory_size)?)
    }

    /// One host clock period, rounded down to whole nanoseconds.
    #[must_use]
    pub fn host_period_ns(&self) -> u64 {
        NS_PER_SECOND / self.host_clock_hz.max(1)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(serde_json::Error),
    MemorySize(InvalidMemorySize),
    ZeroClock(&'static str),
    PhaseTooLong { phase_ns: u64, limit_ns: u64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "cannot read config: {e}"),
            Self::Parse(e) => write!(f, "malformed config: {e}"),
            Self::MemorySize(e) => write!(f, "{e}"),
            Self::ZeroClock(field) => write!(f, "{field} must be non-zero"),
            Self::PhaseTooLong { phase_ns, limit_ns } => write!(
                f,
                "host_phase_ns {phase_ns} exceeds one host clock period ({limit_ns} ns)"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::MemorySize(e) => Some(e),
            Self::ZeroClock(_) | Self::PhaseTooLong { .. } => None,
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

impl From<InvalidMemorySize> for ConfigError {
    fn from(e: InvalidMemorySize) -> Self {
        Self::MemorySize(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = VidMemConfig::from_json("{}").expect("defaults are valid");
        assert_eq!(config, VidMemConfig::default());
        assert_eq!(config.validate().map(MemorySize::code).ok(), Some(2));
    }

    #[test]
    fn fields_override_defaults() {
        let config =
            VidMemConfig::from_json(r#"{"memory_size": 5, "host_clock_hz": 7833600}"#).expect("valid");
        assert_eq!(config.memory_size, 5);
        assert_eq!(config.host_clock_hz, 7_833_600);
        assert_eq!(config.pixel_clock_hz, DEFAULT_PIXEL_CLOCK_HZ);
    }

    #[test]
    fn invalid_memory_size_is_rejected() {
        let err = VidMemConfig::from_json(r#"{"memory_size": 9}"#).unwrap_err();
        assert!(matches!(err, ConfigError::MemorySize(InvalidMemorySize(9))));
    }

    #[test]
    fn zero_clock_is_rejected() {
        let err = VidMemConfig::from_json(r#"{"host_clock_hz": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroClock("host_clock_hz")));
    }

    #[test]
    fn phase_longer_than_a_host_period_is_rejected() {
        let err = VidMemConfig::from_json(r#"{"host_phase_ns": 18446744073709551615}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::PhaseTooLong {
                phase_ns: u64::MAX,
                limit_ns: 125
            }
        ));

        let err = VidMemConfig::from_json(r#"{"host_phase_ns": 126}"#).unwrap_err();
        assert!(matches!(err, ConfigError::PhaseTooLong { .. }));
    }

    #[test]
    fn phase_up_to_one_host_period_is_accepted() {
        let config = VidMemConfig::from_json(r#"{"host_phase_ns": 125}"#).expect("valid");
        assert_eq!(config.host_phase_ns, 125);

        let slow = VidMemConfig::from_json(r#"{"host_clock_hz": 1000000, "host_phase_ns": 999}"#)
            .expect("valid");
        assert_eq!(slow.host_period_ns(), 1000);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = VidMemConfig::from_json(r#"{"memory": 1}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}

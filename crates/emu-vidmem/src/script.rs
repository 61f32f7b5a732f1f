//! Host programs: JSON bus-operation scripts and built-in patterns.
//!
//! A script is a JSON array of operations:
//!
//! ```json
//! [
//!   {"op": "write", "address": 491520, "value": 65280},
//!   {"op": "write", "address": 491523, "value": 255, "lanes": "lower"},
//!   {"op": "abort", "address": 491524},
//!   {"op": "idle", "clocks": 20}
//! ]
//! ```

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use vidmem_snoop::MemorySize;

use crate::host::HostOp;

/// Bytes per raster line in video RAM.
const LINE_BYTES: u32 = 64;

#[derive(Debug)]
pub enum ScriptError {
    Io(io::Error),
    Parse(serde_json::Error),
    Empty,
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "cannot read script: {e}"),
            Self::Parse(e) => write!(f, "malformed script: {e}"),
            Self::Empty => write!(f, "script contains no operations"),
        }
    }
}

impl std::error::Error for ScriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Empty => None,
        }
    }
}

impl From<io::Error> for ScriptError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ScriptError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

pub fn parse_script(json: &str) -> Result<Vec<HostOp>, ScriptError> {
    let ops: Vec<HostOp> = serde_json::from_str(json)?;
    if ops.is_empty() {
        return Err(ScriptError::Empty);
    }
    Ok(ops)
}

pub fn load_script(path: &Path) -> Result<Vec<HostOp>, ScriptError> {
    let text = fs::read_to_string(path)?;
    parse_script(&text)
}

/// 8x8-pixel checkerboard over the whole visible area, written one word
/// (16 pixels) at a time.
#[must_use]
pub fn test_pattern(size: MemorySize) -> Vec<HostOp> {
    let base = size.window_base();
    let mut ops = Vec::new();
    for y in 0..crate::FB_HEIGHT {
        let value: u16 = if (y / 8) % 2 == 0 { 0xFF00 } else { 0x00FF };
        for word in 0..LINE_BYTES / 2 {
            ops.push(HostOp::write_word(base + y * LINE_BYTES + word * 2, value));
        }
    }
    ops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Lanes;

    #[test]
    fn parses_every_op_kind() {
        let ops = parse_script(
            r#"[
                {"op": "write", "address": 491520, "value": 65280},
                {"op": "write", "address": 491523, "value": 255, "lanes": "lower"},
                {"op": "read", "address": 491520},
                {"op": "abort", "address": 491524},
                {"op": "idle", "clocks": 20}
            ]"#,
        )
        .expect("valid script");
        assert_eq!(
            ops,
            vec![
                HostOp::write_word(0x07_8000, 0xFF00),
                HostOp::Write {
                    address: 0x07_8003,
                    value: 0x00FF,
                    lanes: Lanes::Lower
                },
                HostOp::Read { address: 0x07_8000 },
                HostOp::Abort { address: 0x07_8004 },
                HostOp::Idle { clocks: 20 },
            ]
        );
    }

    #[test]
    fn empty_script_is_an_error() {
        assert!(matches!(parse_script("[]"), Err(ScriptError::Empty)));
    }

    #[test]
    fn unknown_op_is_a_parse_error() {
        assert!(matches!(
            parse_script(r#"[{"op": "jump", "address": 0}]"#),
            Err(ScriptError::Parse(_))
        ));
    }

    #[test]
    fn pattern_covers_the_window() {
        let size = MemorySize::ALL[0];
        let ops = test_pattern(size);
        assert_eq!(ops.len(), 32 * crate::FB_HEIGHT as usize);
        assert_eq!(ops[0], HostOp::write_word(size.window_base(), 0xFF00));
        // Row 8 starts the second band.
        assert_eq!(
            ops[8 * 32],
            HostOp::write_word(size.window_base() + 8 * 64, 0x00FF)
        );
    }
}

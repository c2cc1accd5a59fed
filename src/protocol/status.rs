use std::fmt;
use std::str::FromStr;

use crate::core::{Error, Result};

/// Labels of the control lines, in the order the relay reports them
const LINE_TAGS: [char; 8] = ['E', 'D', 'N', 'n', 'I', 'S', 'A', 'R'];

/// Number of data lines
const DIO_WIDTH: usize = 8;

/// Snapshot of the bus lines as reported by the relay's STATUS reply
///
/// The reply looks like `E0D1N0n1I0S0A1R1` followed by eight binary digits
/// for DIO. Each flag is true when the relay reports the line as `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BusStatus {
    pub eoi: bool,
    pub dav: bool,
    pub nrfd: bool,
    pub ndac: bool,
    pub ifc: bool,
    pub srq: bool,
    pub atn: bool,
    pub ren: bool,
    /// Data lines, first reported digit in the most significant bit
    pub dio: u8,
}

impl BusStatus {
    /// Parses a status line as read from the relay
    pub fn parse(line: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(line)
            .map_err(|_| Error::status("status line is not ASCII"))?;
        text.parse()
    }
}

fn bit(c: char) -> Result<bool> {
    match c {
        '0' => Ok(false),
        '1' => Ok(true),
        other => Err(Error::status(format!("expected a binary digit, found {:?}", other))),
    }
}

impl FromStr for BusStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.trim().chars();
        let mut lines = [false; 8];

        for (slot, tag) in lines.iter_mut().zip(LINE_TAGS) {
            match chars.next() {
                Some(c) if c == tag => {}
                Some(c) => {
                    return Err(Error::status(format!("expected {:?}, found {:?}", tag, c)))
                }
                None => return Err(Error::status("status line truncated")),
            }
            let digit = chars.next().ok_or_else(|| Error::status("status line truncated"))?;
            *slot = bit(digit)?;
        }

        let mut dio = 0u8;
        for _ in 0..DIO_WIDTH {
            let digit = chars.next().ok_or_else(|| Error::status("DIO field truncated"))?;
            dio = (dio << 1) | bit(digit)? as u8;
        }

        if chars.next().is_some() {
            return Err(Error::status("trailing data after DIO field"));
        }

        let [eoi, dav, nrfd, ndac, ifc, srq, atn, ren] = lines;
        Ok(BusStatus { eoi, dav, nrfd, ndac, ifc, srq, atn, ren, dio })
    }
}

impl fmt::Display for BusStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = [
            self.eoi, self.dav, self.nrfd, self.ndac, self.ifc, self.srq, self.atn, self.ren,
        ];
        for (tag, state) in LINE_TAGS.iter().zip(lines) {
            write!(f, "{}{}", tag, state as u8)?;
        }
        write!(f, "{:08b}", self.dio)
    }
}

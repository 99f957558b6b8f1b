use crate::cmd::is_ack;
use log::debug;
use std::{borrow::Cow, mem};

/// Longest inbound line kept, longer ones are dropped up to their terminator
pub(crate) const MAX_LINE: usize = 256;

/// What a single inbound byte amounted to
#[derive(Debug, PartialEq, Eq, Clone)]
pub(crate) enum Received {
    /// no byte was available
    Nothing,
    /// byte went into the accumulator
    Pending,
    /// a line matching an acknowledgement token was completed
    Ack,
    /// any other completed line
    Line(String),
    /// a line longer than [`MAX_LINE`] ended and was thrown away
    Dropped,
}

// assembles inbound bytes into lines. both '\n' and '\r' end a line, so a
// "\r\n" terminated reply shows up as the line followed by an empty one.
// bytes are kept raw and decoded once the line is complete
#[derive(Debug, Default)]
pub(crate) struct AckTracker {
    line: Vec<u8>,
    overflow: bool,
}

impl AckTracker {
    pub fn feed(&mut self, byte: u8) -> Received {
        match byte {
            b'\n' | b'\r' => {
                let line = mem::take(&mut self.line);
                if mem::take(&mut self.overflow) {
                    debug!("dropped inbound line longer than {} bytes", MAX_LINE);
                    return Received::Dropped;
                }
                let line = String::from_utf8_lossy(&line).into_owned();
                if is_ack(&line) {
                    Received::Ack
                } else {
                    Received::Line(line)
                }
            }
            _ if self.overflow => Received::Pending,
            b => {
                if self.line.len() == MAX_LINE {
                    self.line.clear();
                    self.overflow = true;
                } else {
                    self.line.push(b);
                }
                Received::Pending
            }
        }
    }

    pub fn partial(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.line)
    }
}

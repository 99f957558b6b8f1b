#[cfg(test)]
mod tests;

pub mod map;

use std::fmt::{Display, Formatter};

/// A single outbound line of the G-code protocol
///
/// Every high level operation of [`Controller`][crate::Controller] builds one
/// of these and renders it through [`Display`]. The rendered text never
/// contains the line terminator, that is added when the line is transmitted
/// (or appended to a program).
#[derive(Debug, PartialEq, Clone)]
pub enum Command {
    /// `G28`
    Home,
    /// `G01 Z<z>`
    MoveZ(f32),
    /// `G01 X<x> Y<y>`
    MoveXY(f32, f32),
    /// `G01 F<feedrate>`
    Feedrate(u32),
    /// `M204 A<acceleration>`
    Acceleration(u32),
    /// `Position`, asks the firmware to report where the effector is
    Position,
    /// `IsDelta`, the identification line
    Identify,
    /// Caller supplied text, sent verbatim
    Raw(String),
}

// coordinates go out with two decimals, which is what the firmware side
// string conversion of a float produces as well
impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Home => write!(f, "{}", map::HOME),
            Self::MoveZ(z) => write!(f, "{} Z{:.2}", map::LINEAR_MOVE, z),
            Self::MoveXY(x, y) => write!(f, "{} X{:.2} Y{:.2}", map::LINEAR_MOVE, x, y),
            Self::Feedrate(v) => write!(f, "{} F{}", map::LINEAR_MOVE, v),
            Self::Acceleration(a) => write!(f, "{} A{}", map::SET_ACCELERATION, a),
            Self::Position => write!(f, "{}", map::POSITION),
            Self::Identify => write!(f, "{}", map::IDENTIFY),
            Self::Raw(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        Self::Raw(s.to_owned())
    }
}

impl From<String> for Command {
    fn from(s: String) -> Self {
        Self::Raw(s)
    }
}

/// Returns `true` if `line` is one of the acknowledgement tokens
///
/// The comparison is exact, `"OK"` or `" ok"` don't count.
pub fn is_ack(line: &str) -> bool {
    map::ACK.contains(&line)
}

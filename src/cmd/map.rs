//! Provides the literal words of the line protocol

macro_rules! makepl {
    ($($name:ident, $val:literal),*) => {
        $(pub const $name: &str = $val;)*
    };
}

#[rustfmt::skip]
makepl!(
    HOME, "G28",
    LINEAR_MOVE, "G01",
    SET_ACCELERATION, "M204",
    POSITION, "Position",
    IDENTIFY, "IsDelta",
    IDENTIFY_REPLY, "YesDelta"
);

/// Acknowledgement tokens, compared exactly
pub const ACK: [&str; 2] = ["Ok", "ok"];

/// Line terminator appended to every outbound line
pub const TERMINATOR: &str = "\n";

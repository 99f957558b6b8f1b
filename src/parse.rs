
use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{char, space0, space1},
    combinator::{all_consuming, map},
    number::complete::float,
    sequence::{delimited, preceded, tuple},
    Finish, IResult,
};

/// Effector position as reported by the firmware
#[derive(Debug, PartialEq, Copy, Clone, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

fn labeled<'a>(label: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, f32> {
    preceded(tuple((tag_no_case(label), space0)), float)
}

// X:100.000 Y:0.000 Z:-291.280
fn parse_labeled(s: &str) -> IResult<&str, Position> {
    map(
        tuple((
            labeled("X:"),
            preceded(space1, labeled("Y:")),
            preceded(space1, labeled("Z:")),
        )),
        |(x, y, z)| Position { x, y, z },
    )(s)
}

fn comma(s: &str) -> IResult<&str, char> {
    delimited(space0, char(','), space0)(s)
}

// 100.00,0.00,-291.28
fn parse_csv(s: &str) -> IResult<&str, Position> {
    map(
        tuple((float, preceded(comma, float), preceded(comma, float))),
        |(x, y, z)| Position { x, y, z },
    )(s)
}

/// Tries to read a position report out of an inbound line. Both the labeled
/// (`X:1 Y:2 Z:3`) and the comma separated (`1,2,3`) form are understood.
pub fn parse_position(line: &str) -> Option<Position> {
    all_consuming(delimited(space0, alt((parse_labeled, parse_csv)), space0))(line)
        .finish()
        .ok()
        .map(|(_, p)| p)
}

/// Returns `true` if `line` is the firmware's answer to the identification
pub(crate) fn is_identify_reply(line: &str) -> bool {
    line.contains(crate::cmd::map::IDENTIFY_REPLY)
}

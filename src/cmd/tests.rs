use super::{is_ack, Command};

#[test]
fn home() {
    assert_eq!(Command::Home.to_string(), "G28");
}

#[test]
fn move_z_two_decimals() {
    assert_eq!(Command::MoveZ(-320.0).to_string(), "G01 Z-320.00");
    assert_eq!(Command::MoveZ(5.127).to_string(), "G01 Z5.13");
}

#[test]
fn move_xy() {
    assert_eq!(
        Command::MoveXY(100.0, -100.5).to_string(),
        "G01 X100.00 Y-100.50"
    );
}

#[test]
fn motion_parameters() {
    assert_eq!(Command::Feedrate(500).to_string(), "G01 F500");
    assert_eq!(Command::Acceleration(1200).to_string(), "M204 A1200");
}

#[test]
fn raw_is_verbatim() {
    assert_eq!(Command::from("G01 X-100 Y-100 Z-320").to_string(), "G01 X-100 Y-100 Z-320");
    assert_eq!(Command::from(String::new()).to_string(), "");
}

#[test]
fn link_words() {
    assert_eq!(Command::Position.to_string(), "Position");
    assert_eq!(Command::Identify.to_string(), "IsDelta");
}

#[test]
fn ack_tokens() {
    assert!(is_ack("Ok"));
    assert!(is_ack("ok"));
    assert!(!is_ack("OK"));
    assert!(!is_ack("ok "));
    assert!(!is_ack(""));
}

use super::Interface;
use std::io::{ErrorKind, Read, Write};

#[test]
fn read_small_buffer() {
    let mut i = Interface::new();
    let mut buf = [0u8; 8];
    let expected = b"thisisatest";
    i.add_read(expected);
    assert_eq!(i.read(&mut buf).unwrap(), 8);
    assert_eq!(buf, expected[..8]);
    assert_eq!(i.read(&mut buf).unwrap(), expected.len() - 8);
    assert_eq!(buf[..expected.len() - 8], expected[8..]);
    assert!(i.is_empty());
}

#[test]
fn read_single_bytes() {
    let mut i = Interface::new();
    let mut buf = [0u8; 1];
    i.add_ok();
    for b in b"Ok\n" {
        assert_eq!(i.read(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], *b);
    }
    assert_eq!(i.read_count(), 3);
}

#[test]
fn read_empty_would_block() {
    let mut i = Interface::new();
    let mut buf = [0u8; 32];
    let e = i.read(&mut buf).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::WouldBlock);
}

#[test]
fn write_records_lines() {
    let mut i = Interface::new();
    i.write_all(b"G28\nG01 Z5.00\n").unwrap();
    assert_eq!(i.written_lines(), vec!["G28", "G01 Z5.00"]);
    i.clear_written();
    assert!(i.written().is_empty());
}

#[test]
fn clones_share_buffers() {
    let mut i = Interface::new();
    let mut other = i.clone();
    other.write_all(b"IsDelta\n").unwrap();
    i.add_read(b"x");
    assert_eq!(i.written(), b"IsDelta\n");
    assert_eq!(other.pending_read(), 1);
}

#[test]
fn broken_fails_both_ways() {
    let mut i = Interface::new();
    i.add_ok();
    i.set_broken(true);
    let mut buf = [0u8; 1];
    assert_eq!(i.read(&mut buf).unwrap_err().kind(), ErrorKind::BrokenPipe);
    assert_eq!(i.write(b"G28\n").unwrap_err().kind(), ErrorKind::BrokenPipe);
    i.set_broken(false);
    assert_eq!(i.read(&mut buf).unwrap(), 1);
}

#[test]
fn write_limit_cuts_writes() {
    let mut i = Interface::new();
    i.set_write_limit(Some(2));
    assert_eq!(i.write(b"G28\n").unwrap(), 2);
    assert_eq!(i.write(b"8\n").unwrap_err().kind(), ErrorKind::TimedOut);
    assert_eq!(i.written(), b"G2");
    i.set_write_limit(None);
    i.write_all(b"8\n").unwrap();
    assert_eq!(i.written(), b"G28\n");
}

#[test]
fn interrupt_once() {
    let mut i = Interface::new();
    i.add_read(b"o");
    i.interrupt_next_read();
    let mut buf = [0u8; 1];
    assert_eq!(i.read(&mut buf).unwrap_err().kind(), ErrorKind::Interrupted);
    assert_eq!(i.read(&mut buf).unwrap(), 1);
    assert_eq!(i.read_count(), 1);
}

use delta_robot_controller::{Controller, ControllerConfig, ControllerError, TickOutcome};
use delta_robot_controller_test::Interface;
use std::time::Duration;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn controller(interface: &Interface) -> Controller<Interface> {
    init();
    Controller::new(
        interface.clone(),
        ControllerConfig::default()
            .with_handshake(false)
            .with_ack_timeout(Duration::from_millis(50)),
    )
    .unwrap()
}

fn author(c: &mut Controller<Interface>, name: &str, lines: &[&str]) {
    c.begin_program(name);
    for l in lines {
        c.gcode(l).unwrap();
    }
    c.end_program();
}

// ticks until something other than Idle happens
fn tick_until_busy(c: &mut Controller<Interface>) -> TickOutcome {
    for _ in 0..16 {
        let outcome = c.tick().unwrap();
        if outcome != TickOutcome::Idle {
            return outcome;
        }
    }
    TickOutcome::Idle
}

#[test]
fn authoring_records_only() {
    let interface = Interface::new();
    let mut c = controller(&interface);
    c.begin_program("pick");
    assert!(c.is_authoring());
    c.home().unwrap();
    c.move_z(-320.0).unwrap();
    c.move_xy(-100.0, 0.0).unwrap();
    c.gcode("M84").unwrap();
    c.set_feedrate(3000).unwrap();
    c.end_program();

    assert!(!c.is_authoring());
    assert!(interface.written().is_empty());
    assert_eq!(interface.read_count(), 0);
    let p = c.program("pick").unwrap();
    assert_eq!(
        p.buffer(),
        "G28\nG01 Z-320.00\nG01 X-100.00 Y0.00\nM84\nG01 F3000\n"
    );
    assert_eq!(p.cursor(), 0);
    assert!(p.is_stopped());
}

#[test]
fn replay_three_lines() {
    let mut interface = Interface::new();
    let mut c = controller(&interface);
    author(&mut c, "p", &["G28", "G01 Z-320", "G01 X100"]);
    c.run_program("p").unwrap();
    assert!(!c.is_program_stopped("p").unwrap());

    // nothing was sent yet, so the first line goes out right away
    assert_eq!(tick_until_busy(&mut c), TickOutcome::Sent("G28".to_owned()));
    for line in ["G01 Z-320", "G01 X100"] {
        interface.add_ok();
        assert_eq!(tick_until_busy(&mut c), TickOutcome::Sent(line.to_owned()));
        assert!(!c.is_program_stopped("p").unwrap());
    }
    assert_eq!(interface.written_lines(), vec!["G28", "G01 Z-320", "G01 X100"]);

    interface.add_ok();
    assert_eq!(tick_until_busy(&mut c), TickOutcome::Finished("p".to_owned()));
    assert!(c.is_program_stopped("p").unwrap());
    assert_eq!(c.program("p").unwrap().cursor(), 0);
    assert_eq!(interface.written_lines().len(), 3);
}

#[test]
fn round_trip() {
    let mut interface = Interface::new();
    let mut c = controller(&interface);
    c.begin_program("p");
    c.home().unwrap();
    c.gcode("G01 Z5").unwrap();
    c.end_program();
    c.run_program("p").unwrap();

    tick_until_busy(&mut c);
    interface.add_ok();
    tick_until_busy(&mut c);
    interface.add_ok();
    assert_eq!(tick_until_busy(&mut c), TickOutcome::Finished("p".to_owned()));

    assert_eq!(interface.written_lines(), vec!["G28", "G01 Z5"]);
    assert!(c.is_all_stopped());
}

#[test]
fn tick_without_ack_is_idle() {
    let interface = Interface::new();
    let mut c = controller(&interface);
    author(&mut c, "p", &["G28", "G01 Z5"]);
    c.run_program("p").unwrap();
    assert_eq!(c.tick().unwrap(), TickOutcome::Sent("G28".to_owned()));
    let cursor = c.program("p").unwrap().cursor();

    for _ in 0..100 {
        assert_eq!(c.tick().unwrap(), TickOutcome::Idle);
    }
    assert_eq!(interface.written_lines(), vec!["G28"]);
    assert_eq!(c.program("p").unwrap().cursor(), cursor);
}

#[test]
fn ack_across_ticks() {
    let mut interface = Interface::new();
    let mut c = controller(&interface);
    author(&mut c, "p", &["G28", "G01 Z5"]);
    c.run_program("p").unwrap();
    c.tick().unwrap();

    interface.add_read(b"o");
    assert_eq!(c.tick().unwrap(), TickOutcome::Idle);
    interface.add_read(b"k");
    assert_eq!(c.tick().unwrap(), TickOutcome::Idle);
    assert!(!c.is_ready());
    interface.add_read(b"\n");
    // the poll comes first, so the same tick sends the next line
    assert_eq!(c.tick().unwrap(), TickOutcome::Sent("G01 Z5".to_owned()));
}

#[test]
fn blocking_ack_byte_by_byte() {
    let mut interface = Interface::new();
    let mut c = controller(&interface);
    interface.add_read(b"ok\n");
    c.gcode("G28").unwrap();
    assert_eq!(interface.read_count(), 3);
    assert!(c.is_ready());
}

#[test]
fn all_stopped() {
    let mut interface = Interface::new();
    let mut c = controller(&interface);
    assert!(c.is_all_stopped());
    author(&mut c, "a", &["G28"]);
    author(&mut c, "b", &["G28"]);
    assert!(c.is_all_stopped());

    c.run_program("b").unwrap();
    assert!(!c.is_all_stopped());
    tick_until_busy(&mut c);
    assert!(!c.is_all_stopped());
    interface.add_ok();
    assert_eq!(tick_until_busy(&mut c), TickOutcome::Finished("b".to_owned()));
    assert!(c.is_all_stopped());
}

#[test]
fn selection() {
    let interface = Interface::new();
    let mut c = controller(&interface);
    assert!(!c.is_selected_program("a"));
    c.begin_program("a");
    assert!(c.is_selected_program("a"));
    c.end_program();
    assert!(!c.is_selected_program("a"));
    assert!(c.selected_program().is_none());

    c.run_program("a").unwrap();
    assert!(c.is_selected_program("a"));
    assert!(!c.is_selected_program("b"));
}

#[test]
fn unknown_program() {
    let interface = Interface::new();
    let mut c = controller(&interface);
    author(&mut c, "a", &["G28"]);
    assert!(matches!(
        c.run_program("b"),
        Err(ControllerError::ProgramNotFound(n)) if n == "b"
    ));
    assert!(matches!(
        c.is_program_stopped("b"),
        Err(ControllerError::ProgramNotFound(_))
    ));
    assert!(c.selected_program().is_none());
}

#[test]
fn stopped_flag_is_per_program() {
    let interface = Interface::new();
    let mut c = controller(&interface);
    author(&mut c, "a", &["G28"]);
    author(&mut c, "b", &["G28"]);
    c.run_program("a").unwrap();
    assert!(!c.is_program_stopped("a").unwrap());
    assert!(c.is_program_stopped("b").unwrap());
}

#[test]
fn duplicate_names_first_wins() {
    let mut interface = Interface::new();
    let mut c = controller(&interface);
    author(&mut c, "p", &["G28"]);
    author(&mut c, "p", &["M84"]);
    assert_eq!(c.programs().len(), 2);
    assert_eq!(c.program("p").unwrap().buffer(), "G28\n");

    c.run_program("p").unwrap();
    assert_eq!(tick_until_busy(&mut c), TickOutcome::Sent("G28".to_owned()));
    interface.add_ok();
    assert_eq!(tick_until_busy(&mut c), TickOutcome::Finished("p".to_owned()));
    assert!(c.programs()[1].is_stopped());
}

#[test]
fn switching_programs_resumes() {
    let mut interface = Interface::new();
    let mut c = controller(&interface);
    author(&mut c, "a", &["G01 Z1", "G01 Z2", "G01 Z3"]);
    author(&mut c, "b", &["G28"]);

    c.run_program("a").unwrap();
    assert_eq!(tick_until_busy(&mut c), TickOutcome::Sent("G01 Z1".to_owned()));
    interface.add_ok();
    c.run_program("b").unwrap();
    assert_eq!(tick_until_busy(&mut c), TickOutcome::Sent("G28".to_owned()));
    // a was left mid run
    assert!(!c.is_all_stopped());

    interface.add_ok();
    c.run_program("a").unwrap();
    assert_eq!(tick_until_busy(&mut c), TickOutcome::Sent("G01 Z2".to_owned()));
}

#[test]
fn rerun_after_finish_starts_over() {
    let mut interface = Interface::new();
    let mut c = controller(&interface);
    author(&mut c, "p", &["G28"]);
    c.run_program("p").unwrap();
    tick_until_busy(&mut c);
    interface.add_ok();
    assert_eq!(tick_until_busy(&mut c), TickOutcome::Finished("p".to_owned()));

    c.run_program("p").unwrap();
    assert_eq!(tick_until_busy(&mut c), TickOutcome::Sent("G28".to_owned()));
    assert_eq!(interface.written_lines(), vec!["G28", "G28"]);
}

#[test]
fn empty_program_finishes_immediately() {
    let interface = Interface::new();
    let mut c = controller(&interface);
    author(&mut c, "p", &[]);
    c.run_program("p").unwrap();
    assert_eq!(c.tick().unwrap(), TickOutcome::Finished("p".to_owned()));
    assert!(interface.written().is_empty());
}

#[test]
fn live_commands_between_replays() {
    let mut interface = Interface::new();
    let mut c = controller(&interface);
    author(&mut c, "p", &["G01 Z1", "G01 Z2"]);
    interface.add_ok();
    c.home().unwrap();

    c.run_program("p").unwrap();
    assert_eq!(tick_until_busy(&mut c), TickOutcome::Sent("G01 Z1".to_owned()));
    interface.add_ok();
    assert_eq!(tick_until_busy(&mut c), TickOutcome::Sent("G01 Z2".to_owned()));
    assert_eq!(
        interface.written_lines(),
        vec!["G28", "G01 Z1", "G01 Z2"]
    );
}

use std::str::Lines;

// fewer unconsumed bytes than this and the program counts as done. the
// shortest useful line plus its terminator is 3 bytes
const MIN_REMAINING: usize = 3;

/// A named, recorded sequence of G-code lines
///
/// Programs are built with [`Controller::begin_program`][crate::Controller::begin_program]
/// and replayed one line per [`tick`][crate::Controller::tick] after
/// [`Controller::run_program`][crate::Controller::run_program]. The buffer
/// holds every recorded line followed by `'\n'`, the cursor is the byte offset
/// of the next line to replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    name: String,
    buffer: String,
    cursor: usize,
    stopped: bool,
}

// next step of a replay, computed without touching the program so a failed
// transmit leaves the cursor where it was
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Step {
    Line { text: String, next: usize },
    Exhausted,
}

impl Program {
    pub(crate) fn new(name: &str) -> Self {
        Program {
            name: name.to_owned(),
            buffer: String::new(),
            cursor: 0,
            stopped: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Iterates over all recorded lines, independent of the cursor
    pub fn lines(&self) -> Lines<'_> {
        self.buffer.lines()
    }

    pub(crate) fn append(&mut self, line: &str) {
        self.buffer.push_str(line);
        self.buffer.push('\n');
    }

    pub(crate) fn start(&mut self) {
        self.stopped = false;
    }

    pub(crate) fn peek(&self) -> Step {
        if self.buffer.len() < self.cursor + MIN_REMAINING {
            return Step::Exhausted;
        }
        let rest = &self.buffer[self.cursor..];
        match rest.find('\n') {
            Some(i) => Step::Line {
                text: rest[..i].to_owned(),
                next: self.cursor + i + 1,
            },
            None => Step::Line {
                text: rest.to_owned(),
                next: self.buffer.len(),
            },
        }
    }

    pub(crate) fn advance(&mut self, next: usize) {
        self.cursor = next.min(self.buffer.len());
    }

    // rewinds so the next run starts from the top
    pub(crate) fn finish(&mut self) {
        self.cursor = 0;
        self.stopped = true;
    }
}

/// Append-only collection of programs plus the selection
///
/// The selection is an index, resolved again on every access.
#[derive(Debug, Default)]
pub(crate) struct ProgramStore {
    programs: Vec<Program>,
    selected: Option<usize>,
}

impl ProgramStore {
    pub fn create(&mut self, name: &str) -> usize {
        self.programs.push(Program::new(name));
        self.programs.len() - 1
    }

    // first match wins, names aren't required to be unique
    pub fn find(&self, name: &str) -> Option<usize> {
        self.programs.iter().position(|p| p.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Program> {
        self.find(name).map(|i| &self.programs[i])
    }

    pub fn select(&mut self, index: Option<usize>) {
        self.selected = index.filter(|i| *i < self.programs.len());
    }

    pub fn selected(&self) -> Option<&Program> {
        self.selected.and_then(|i| self.programs.get(i))
    }

    pub fn selected_mut(&mut self) -> Option<&mut Program> {
        self.selected.and_then(|i| self.programs.get_mut(i))
    }

    pub fn program_mut(&mut self, index: usize) -> Option<&mut Program> {
        self.programs.get_mut(index)
    }

    pub fn all_stopped(&self) -> bool {
        self.programs.iter().all(|p| p.stopped)
    }

    pub fn as_slice(&self) -> &[Program] {
        &self.programs
    }
}

#![allow(dead_code)]

use std::io;
use std::io::Write;
use std::sync::{Arc, Mutex};

use forge::engine::Engine;
use forge::input::QueueSource;
use forge::stack::Cell;

/// A fresh, bootstrapped engine.
pub fn engine() -> Engine {
    let mut engine = Engine::new();
    engine.reset().expect("bootstrap failed");
    engine
}

/// Data stack contents, bottom to top.
pub fn dstack(engine: &Engine) -> Vec<Cell> {
    engine.dstack.iter().copied().collect()
}

/// Data stack contents viewed as signed cells, bottom to top.
pub fn signed(engine: &Engine) -> Vec<isize> {
    engine.dstack.iter().map(|&x| x as isize).collect()
}

/// Shared output sink for capturing engine output in tests.
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A bootstrapped engine with captured output.
pub fn engine_with_capture() -> (Engine, Capture) {
    let mut engine = engine();
    let capture = Capture::new();
    engine.set_output(Box::new(capture.clone()));
    (engine, capture)
}

/// Feed lines through the full QUIT loop and return everything written to
/// standard output.
pub fn run_lines(lines: &[&str]) -> String {
    run_lines_with_args(&["forge"], lines).1
}

/// Like `run_lines`, but with an explicit argument vector; also returns
/// the engine for post-run inspection.
pub fn run_lines_with_args(args: &[&str], lines: &[&str]) -> (Engine, String) {
    let mut engine = Engine::new();
    let capture = Capture::new();
    engine.set_output(Box::new(capture.clone()));
    engine.set_line_source(Box::new(QueueSource::new(lines.iter().copied())));
    let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    let code = engine.run(&args);
    assert_eq!(code, 0, "engine exited with {}", code);
    (engine, capture.text())
}

// main.rs - Forge Forth REPL

use std::env;
use std::io::IsTerminal;
use std::path::PathBuf;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use forge::engine::Engine;
use forge::input::LineSource;

/// Line editing with history, used when standard input is a terminal.
struct EditorSource {
    editor: DefaultEditor,
    history_file: Option<PathBuf>,
}

impl EditorSource {
    fn new() -> rustyline::Result<Self> {
        let editor = DefaultEditor::new()?;
        let history_file = dirs::home_dir().map(|mut p| {
            p.push(".forge_history");
            p
        });
        let mut source = EditorSource {
            editor,
            history_file,
        };
        if let Some(ref path) = source.history_file {
            let _ = source.editor.load_history(path);
        }
        Ok(source)
    }
}

impl LineSource for EditorSource {
    fn read_line(&mut self) -> Option<String> {
        match self.editor.readline("") {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Some(line)
            }
            Err(ReadlineError::Interrupted) => Some(String::new()),
            Err(_) => None,
        }
    }
}

impl Drop for EditorSource {
    fn drop(&mut self) {
        if let Some(ref path) = self.history_file {
            let _ = self.editor.save_history(path);
        }
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() <= 1 {
        println!("Forge Forth v{}", env!("CARGO_PKG_VERSION"));
    }

    let mut engine = Engine::new();
    if std::io::stdin().is_terminal() {
        if let Ok(editor) = EditorSource::new() {
            engine.set_line_source(Box::new(editor));
        }
    }

    let code = engine.run(&args);
    std::process::exit(code);
}

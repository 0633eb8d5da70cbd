// engine.rs - The Forth engine: primitives, inner and outer interpreter,
// compiler, and the reset/run/evaluate entry points

use std::io::{self, Read, Write};
use std::thread;
use std::time::Duration;

use time::OffsetDateTime;

use crate::bootstrap::BOOTSTRAP;
use crate::dataspace::{
    aligned, DataSpace, BASE_ADDR, CELL_SIZE, INPUT_BUFFER_ADDR, INPUT_BUFFER_SIZE, STATE_ADDR,
    TO_IN_ADDR, WORD_BUFFER_ADDR, WORD_BUFFER_SIZE,
};
use crate::dictionary::{Code, Dictionary, PrimFn, Word, Xt, F_HIDDEN, F_IMMEDIATE};
use crate::error::{Abort, Result};
use crate::input::{LineSource, StdinSource};
use crate::stack::{Cell, SCell, Stack, StackKind, FALSE, TRUE};

/// ASCII space, the default parsing delimiter.
pub const BL: u8 = b' ';

const DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Sizing knobs fixed at engine construction.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub data_space_size: usize,
    pub data_stack_depth: usize,
    pub return_stack_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_space_size: 128 * 1024,
            data_stack_depth: 256,
            return_stack_depth: 256,
        }
    }
}

/// The whole interpreter state: both stacks, the data space, the
/// dictionary, the instruction pointer of the inner interpreter, and the
/// input/output plumbing. Construct with [`Engine::new`], then call
/// [`Engine::reset`] (or [`Engine::run`], which resets first) to register
/// the primitives and evaluate the bootstrap source.
pub struct Engine {
    pub dstack: Stack,
    pub rstack: Stack,
    pub data: DataSpace,
    pub dict: Dictionary,
    /// Data-space address of the cell the inner interpreter executes next.
    next: usize,
    /// Length of the current input buffer contents.
    source_len: usize,
    /// (address, length) of each argument copied into data space.
    args: Vec<(usize, usize)>,
    arg_strings: Vec<String>,
    in_quit: bool,
    xt_exit: Xt,
    xt_lit: Xt,
    xt_does: Xt,
    xt_abort_quote: Xt,
    xt_s_quote: Xt,
    xt_dot_quote: Xt,
    line_source: Box<dyn LineSource>,
    out: Box<dyn Write>,
    key_source: Box<dyn Read>,
}

impl Engine {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Engine {
            dstack: Stack::new(config.data_stack_depth, StackKind::Data),
            rstack: Stack::new(config.return_stack_depth, StackKind::Return),
            data: DataSpace::new(config.data_space_size),
            dict: Dictionary::new(),
            next: 0,
            source_len: 0,
            args: Vec::new(),
            arg_strings: Vec::new(),
            in_quit: false,
            xt_exit: 0,
            xt_lit: 0,
            xt_does: 0,
            xt_abort_quote: 0,
            xt_s_quote: 0,
            xt_dot_quote: 0,
            line_source: Box::new(StdinSource::new()),
            out: Box::new(io::stdout()),
            key_source: Box::new(io::stdin()),
        }
    }

    pub fn set_line_source(&mut self, source: Box<dyn LineSource>) {
        self.line_source = source;
    }

    pub fn set_output(&mut self, out: Box<dyn Write>) {
        self.out = out;
    }

    pub fn set_key_source(&mut self, source: Box<dyn Read>) {
        self.key_source = source;
    }

    /// Full state reinitialization: clear the stacks, zero the data space,
    /// write the system cells, copy the argument vector, rebuild the
    /// dictionary, and re-evaluate the bootstrap source.
    pub fn reset(&mut self) -> Result<()> {
        self.dstack.clear();
        self.rstack.clear();
        self.data.reset();
        self.next = 0;
        self.source_len = 0;
        self.in_quit = false;

        self.data.set_cell(BASE_ADDR, 10, "BASE")?;
        self.data.set_cell(STATE_ADDR, FALSE, "STATE")?;
        self.data.set_cell(TO_IN_ADDR, 0, ">IN")?;

        self.args.clear();
        let strings = std::mem::take(&mut self.arg_strings);
        for s in &strings {
            let addr = self.data.here();
            for &b in s.as_bytes() {
                self.data.append_byte(b, "ARG")?;
            }
            self.args.push((addr, s.len()));
        }
        self.arg_strings = strings;
        self.data.align("ARG")?;

        self.dict.clear();
        self.register_primitives();
        for line in BOOTSTRAP {
            self.evaluate(line)?;
        }
        self.set_state(FALSE)?;
        Ok(())
    }

    /// Capture the argument vector, reset, and drive QUIT. Returns the
    /// process exit code: 0 after BYE or end-of-input, nonzero if the
    /// engine could not even come up.
    pub fn run(&mut self, args: &[String]) -> i32 {
        self.arg_strings = args.to_vec();
        let outcome = self.reset().and_then(|()| {
            let quit = self
                .dict
                .find(b"QUIT")
                .ok_or_else(|| Abort::Message("QUIT is not defined".to_string()))?;
            self.execute_xt(quit)
        });
        match outcome {
            Ok(()) | Err(Abort::Bye) => 0,
            Err(e) => {
                eprintln!("Exception: {}", e);
                -1
            }
        }
    }

    /// Interpret a source fragment, saving and restoring the current input
    /// specification around it.
    pub fn evaluate(&mut self, source: &str) -> Result<()> {
        self.evaluate_bytes(source.as_bytes())
    }

    fn evaluate_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let saved = self
            .data
            .slice(INPUT_BUFFER_ADDR, self.source_len, "EVALUATE")?
            .to_vec();
        let saved_len = self.source_len;
        let saved_to_in = self.to_in();

        self.install_source(bytes)?;
        let result = self.interpret();

        self.data.write_slice(INPUT_BUFFER_ADDR, &saved, "EVALUATE")?;
        self.source_len = saved_len;
        self.set_to_in(saved_to_in)?;
        result
    }

    // ------------------------------------------------------------------
    // System cells
    // ------------------------------------------------------------------

    // The system cells live at fixed, aligned, in-range offsets, so these
    // accessors cannot fail once the data space exists.

    fn state(&self) -> Cell {
        self.data.cell_at(STATE_ADDR, "STATE").unwrap_or(FALSE)
    }

    fn set_state(&mut self, x: Cell) -> Result<()> {
        self.data.set_cell(STATE_ADDR, x, "STATE")
    }

    fn is_compiling(&self) -> bool {
        self.state() != FALSE
    }

    fn base(&self) -> Cell {
        self.data.cell_at(BASE_ADDR, "BASE").unwrap_or(10)
    }

    fn to_in(&self) -> usize {
        self.data.cell_at(TO_IN_ADDR, ">IN").unwrap_or(0)
    }

    fn set_to_in(&mut self, n: usize) -> Result<()> {
        self.data.set_cell(TO_IN_ADDR, n as Cell, ">IN")
    }

    // ------------------------------------------------------------------
    // Stack and output shorthands
    // ------------------------------------------------------------------

    fn dpush(&mut self, x: Cell, who: &'static str) -> Result<()> {
        self.dstack.push(x, who)
    }

    fn dpop(&mut self, who: &'static str) -> Result<Cell> {
        self.dstack.pop(who)
    }

    fn emit_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.out
            .write_all(bytes)
            .and_then(|()| self.out.flush())
            .map_err(|e| Abort::Io(e.to_string()))
    }

    // ------------------------------------------------------------------
    // Inner interpreter
    // ------------------------------------------------------------------

    /// Execute one dictionary entry, dispatching on its code field.
    pub fn execute_xt(&mut self, xt: Xt) -> Result<()> {
        let (code, body, does) = {
            let word = self
                .dict
                .word(xt)
                .ok_or(Abort::InvalidAddress("EXECUTE"))?;
            (word.code, word.body, word.does)
        };
        match code {
            Code::Primitive(f) => f(self),
            Code::Colon => self.run_thread(does),
            Code::Create => self.dpush(body as Cell, "EXECUTE"),
            Code::Does => {
                self.dpush(body as Cell, "EXECUTE")?;
                self.run_thread(does)
            }
        }
    }

    /// Thread through a compiled cell sequence until the EXIT token.
    /// Reentrant: the caller's instruction pointer is saved on the return
    /// stack and restored on the way out. An abort propagates without
    /// restoring anything; the QUIT handler resets both stacks.
    fn run_thread(&mut self, start: usize) -> Result<()> {
        self.rstack.push(self.next as Cell, "EXECUTE")?;
        self.next = start;
        loop {
            let cell = self.data.cell_at(self.next, "EXECUTE")?;
            if cell == self.xt_exit as Cell {
                break;
            }
            self.next += CELL_SIZE;
            self.execute_xt(cell as Xt)?;
        }
        self.next = self.rstack.pop("EXIT")? as usize;
        Ok(())
    }

    /// Skip an inline counted string, leaving `next` on the cell after it.
    fn skip_inline_string(&mut self, count: usize) {
        self.next = aligned(self.next + 1 + count);
    }

    fn read_inline_string(&self, who: &'static str) -> Result<(usize, Vec<u8>)> {
        let count = self.data.byte_at(self.next, who)? as usize;
        let bytes = self.data.slice(self.next + 1, count, who)?.to_vec();
        Ok((count, bytes))
    }

    // ------------------------------------------------------------------
    // Outer interpreter
    // ------------------------------------------------------------------

    fn install_source(&mut self, bytes: &[u8]) -> Result<()> {
        let len = bytes.len().min(INPUT_BUFFER_SIZE);
        self.data
            .write_slice(INPUT_BUFFER_ADDR, &bytes[..len], "REFILL")?;
        self.source_len = len;
        self.set_to_in(0)
    }

    /// Replace the input buffer with the next line from the line source
    /// and push true, or push false at end-of-input.
    fn refill(&mut self) -> Result<()> {
        match self.line_source.read_line() {
            Some(line) => {
                self.install_source(line.as_bytes())?;
                self.dpush(TRUE, "REFILL")
            }
            None => self.dpush(FALSE, "REFILL"),
        }
    }

    /// Process the input buffer token by token: execute, compile, or parse
    /// as a number; abort on anything else.
    pub fn interpret(&mut self) -> Result<()> {
        loop {
            if self.to_in() >= self.source_len {
                return Ok(());
            }
            self.dpush(BL as Cell, "WORD")?;
            self.op_word()?;
            self.op_find()?;
            let flag = self.dpop("INTERPRET")?;
            if flag != FALSE {
                let xt = self.dpop("INTERPRET")? as Xt;
                if self.is_compiling() && flag != 1 {
                    self.data.append_cell(xt as Cell, ",")?;
                } else {
                    self.execute_xt(xt)?;
                }
            } else {
                let caddr = self.dpop("INTERPRET")? as usize;
                let count = self.data.byte_at(caddr, "COUNT")? as usize;
                if count == 0 {
                    return Ok(());
                }
                let token = self.data.slice(caddr + 1, count, "COUNT")?.to_vec();
                match self.parse_number(&token) {
                    Some(value) => {
                        if self.is_compiling() {
                            self.data.append_cell(self.xt_lit as Cell, "LITERAL")?;
                            self.data.append_cell(value, "LITERAL")?;
                        } else {
                            self.dpush(value, "INTERPRET")?;
                        }
                    }
                    None => {
                        return Err(Abort::UnknownWord(
                            String::from_utf8_lossy(&token).into_owned(),
                        ))
                    }
                }
            }
        }
    }

    /// Scan the input buffer for one `delim`-delimited token, skipping
    /// leading delimiters. With BL, any ASCII whitespace delimits. The
    /// token runs up to but not through the delimiter; the scan pointer
    /// consumes it. Returns (offset within buffer, length).
    fn scan_token(&mut self, delim: u8) -> Result<(usize, usize)> {
        let src = self
            .data
            .slice(INPUT_BUFFER_ADDR, self.source_len, "WORD")?
            .to_vec();
        let matches = |c: u8| {
            if delim == BL {
                c.is_ascii_whitespace()
            } else {
                c == delim
            }
        };
        let mut pos = self.to_in().min(src.len());
        while pos < src.len() && matches(src[pos]) {
            pos += 1;
        }
        let start = pos;
        while pos < src.len() && !matches(src[pos]) {
            pos += 1;
        }
        self.set_to_in(if pos < src.len() { pos + 1 } else { pos })?;
        Ok((start, pos - start))
    }

    /// Parse the next whitespace-delimited name from the input.
    fn parse_name(&mut self) -> Result<Vec<u8>> {
        let (start, len) = self.scan_token(BL)?;
        Ok(self
            .data
            .slice(INPUT_BUFFER_ADDR + start, len, "WORD")?
            .to_vec())
    }

    // ------------------------------------------------------------------
    // Number conversion
    // ------------------------------------------------------------------

    /// Accumulate digits valid in `base` onto `u0`; returns the value and
    /// the number of bytes consumed.
    fn accumulate_digits(u0: Cell, bytes: &[u8], base: Cell) -> (Cell, usize) {
        let mut value = u0;
        let mut consumed = 0;
        for &b in bytes {
            let digit = match b {
                b'0'..=b'9' => (b - b'0') as Cell,
                b'A'..=b'Z' => (b - b'A') as Cell + 10,
                b'a'..=b'z' => (b - b'a') as Cell + 10,
                _ => break,
            };
            if digit >= base {
                break;
            }
            value = value.wrapping_mul(base).wrapping_add(digit);
            consumed += 1;
        }
        (value, consumed)
    }

    /// Full-token number parse in the current BASE, with leading `-`.
    fn parse_number(&self, bytes: &[u8]) -> Option<Cell> {
        let base = self.base();
        let (negative, digits) = if bytes.starts_with(b"-") && bytes.len() > 1 {
            (true, &bytes[1..])
        } else {
            (false, bytes)
        };
        if digits.is_empty() {
            return None;
        }
        let (value, consumed) = Self::accumulate_digits(0, digits, base);
        if consumed != digits.len() {
            return None;
        }
        Some(if negative { value.wrapping_neg() } else { value })
    }

    fn format_unsigned(mut u: Cell, base: Cell) -> String {
        let base = if (2..=36).contains(&base) { base } else { 10 };
        if u == 0 {
            return "0".to_string();
        }
        let mut digits = Vec::new();
        while u > 0 {
            digits.push(DIGITS[(u % base) as usize]);
            u /= base;
        }
        digits.reverse();
        String::from_utf8(digits).unwrap_or_default()
    }

    fn format_signed(n: SCell, base: Cell) -> String {
        if n < 0 {
            format!("-{}", Self::format_unsigned(n.unsigned_abs(), base))
        } else {
            Self::format_unsigned(n as Cell, base)
        }
    }

    // ------------------------------------------------------------------
    // QUIT
    // ------------------------------------------------------------------

    fn op_quit(&mut self) -> Result<()> {
        if self.in_quit {
            return Err(Abort::Message("QUIT: nested entry".to_string()));
        }
        self.in_quit = true;
        let result = self.quit_loop();
        self.in_quit = false;
        result
    }

    /// Read a line, interpret it, report, repeat. Every abort lands here:
    /// print its message (if any), reset both stacks and STATE, continue.
    /// End-of-input emits a newline and leaves via Bye.
    fn quit_loop(&mut self) -> Result<()> {
        self.rstack.clear();
        self.set_state(FALSE)?;
        loop {
            self.refill()?;
            let more = self.dpop("REFILL")?;
            if more == FALSE {
                self.emit_bytes(b"\n")?;
                return Err(Abort::Bye);
            }
            match self.interpret() {
                Ok(()) => {}
                Err(Abort::Bye) => return Err(Abort::Bye),
                Err(abort) => {
                    let msg = abort.to_string();
                    if !msg.is_empty() {
                        let report = format!("<<< Error: {} >>>\n", msg);
                        self.emit_bytes(report.as_bytes())?;
                    }
                    self.dstack.clear();
                    self.rstack.clear();
                    self.set_state(FALSE)?;
                }
            }
            if !self.is_compiling() {
                self.emit_bytes(b"  ok\n")?;
            }
        }
    }

    // ------------------------------------------------------------------
    // Stack primitives
    // ------------------------------------------------------------------

    fn op_drop(&mut self) -> Result<()> {
        self.dpop("DROP").map(|_| ())
    }

    fn op_dup(&mut self) -> Result<()> {
        let x = self.dstack.peek("DUP")?;
        self.dpush(x, "DUP")
    }

    fn op_qdup(&mut self) -> Result<()> {
        let x = self.dstack.peek("?DUP")?;
        if x != 0 {
            self.dpush(x, "?DUP")?;
        }
        Ok(())
    }

    fn op_over(&mut self) -> Result<()> {
        let x = self.dstack.pick(1, "OVER")?;
        self.dpush(x, "OVER")
    }

    fn op_swap(&mut self) -> Result<()> {
        let b = self.dpop("SWAP")?;
        let a = self.dpop("SWAP")?;
        self.dpush(b, "SWAP")?;
        self.dpush(a, "SWAP")
    }

    fn op_rot(&mut self) -> Result<()> {
        let c = self.dpop("ROT")?;
        let b = self.dpop("ROT")?;
        let a = self.dpop("ROT")?;
        self.dpush(b, "ROT")?;
        self.dpush(c, "ROT")?;
        self.dpush(a, "ROT")
    }

    fn op_nip(&mut self) -> Result<()> {
        let b = self.dpop("NIP")?;
        let _ = self.dpop("NIP")?;
        self.dpush(b, "NIP")
    }

    fn op_tuck(&mut self) -> Result<()> {
        let b = self.dpop("TUCK")?;
        let a = self.dpop("TUCK")?;
        self.dpush(b, "TUCK")?;
        self.dpush(a, "TUCK")?;
        self.dpush(b, "TUCK")
    }

    fn op_pick(&mut self) -> Result<()> {
        let u = self.dpop("PICK")? as usize;
        let x = self.dstack.pick(u, "PICK")?;
        self.dpush(x, "PICK")
    }

    fn op_roll(&mut self) -> Result<()> {
        let u = self.dpop("ROLL")? as usize;
        if u > 0 {
            self.dstack.roll(u, "ROLL")?;
        }
        Ok(())
    }

    fn op_two_drop(&mut self) -> Result<()> {
        self.dpop("2DROP")?;
        self.dpop("2DROP").map(|_| ())
    }

    fn op_two_dup(&mut self) -> Result<()> {
        let a = self.dstack.pick(1, "2DUP")?;
        let b = self.dstack.pick(0, "2DUP")?;
        self.dpush(a, "2DUP")?;
        self.dpush(b, "2DUP")
    }

    fn op_two_over(&mut self) -> Result<()> {
        let a = self.dstack.pick(3, "2OVER")?;
        let b = self.dstack.pick(2, "2OVER")?;
        self.dpush(a, "2OVER")?;
        self.dpush(b, "2OVER")
    }

    fn op_two_swap(&mut self) -> Result<()> {
        let d = self.dpop("2SWAP")?;
        let c = self.dpop("2SWAP")?;
        let b = self.dpop("2SWAP")?;
        let a = self.dpop("2SWAP")?;
        self.dpush(c, "2SWAP")?;
        self.dpush(d, "2SWAP")?;
        self.dpush(a, "2SWAP")?;
        self.dpush(b, "2SWAP")
    }

    fn op_depth(&mut self) -> Result<()> {
        let depth = self.dstack.depth() as Cell;
        self.dpush(depth, "DEPTH")
    }

    fn op_to_r(&mut self) -> Result<()> {
        let x = self.dpop(">R")?;
        self.rstack.push(x, ">R")
    }

    fn op_r_from(&mut self) -> Result<()> {
        let x = self.rstack.pop("R>")?;
        self.dpush(x, "R>")
    }

    fn op_r_fetch(&mut self) -> Result<()> {
        let x = self.rstack.peek("R@")?;
        self.dpush(x, "R@")
    }

    fn op_two_to_r(&mut self) -> Result<()> {
        let x2 = self.dpop("2>R")?;
        let x1 = self.dpop("2>R")?;
        self.rstack.push(x1, "2>R")?;
        self.rstack.push(x2, "2>R")
    }

    fn op_two_r_from(&mut self) -> Result<()> {
        let x2 = self.rstack.pop("2R>")?;
        let x1 = self.rstack.pop("2R>")?;
        self.dpush(x1, "2R>")?;
        self.dpush(x2, "2R>")
    }

    fn op_two_r_fetch(&mut self) -> Result<()> {
        let x2 = self.rstack.pick(0, "2R@")?;
        let x1 = self.rstack.pick(1, "2R@")?;
        self.dpush(x1, "2R@")?;
        self.dpush(x2, "2R@")
    }

    // ------------------------------------------------------------------
    // Data space and memory primitives
    // ------------------------------------------------------------------

    fn op_here(&mut self) -> Result<()> {
        let here = self.data.here() as Cell;
        self.dpush(here, "HERE")
    }

    fn op_align(&mut self) -> Result<()> {
        self.data.align("ALIGN")
    }

    fn op_aligned(&mut self) -> Result<()> {
        let addr = self.dpop("ALIGNED")? as usize;
        self.dpush(aligned(addr) as Cell, "ALIGNED")
    }

    fn op_allot(&mut self) -> Result<()> {
        let n = self.dpop("ALLOT")? as SCell;
        self.data.allot(n, "ALLOT")
    }

    fn op_unused(&mut self) -> Result<()> {
        let unused = self.data.unused() as Cell;
        self.dpush(unused, "UNUSED")
    }

    fn op_comma(&mut self) -> Result<()> {
        let x = self.dpop(",")?;
        self.data.append_cell(x, ",")
    }

    fn op_c_comma(&mut self) -> Result<()> {
        let x = self.dpop("C,")?;
        self.data.append_byte(x as u8, "C,")
    }

    fn op_store(&mut self) -> Result<()> {
        let addr = self.dpop("!")? as usize;
        let x = self.dpop("!")?;
        self.data.set_cell(addr, x, "!")
    }

    fn op_fetch(&mut self) -> Result<()> {
        let addr = self.dpop("@")? as usize;
        let x = self.data.cell_at(addr, "@")?;
        self.dpush(x, "@")
    }

    fn op_c_store(&mut self) -> Result<()> {
        let addr = self.dpop("C!")? as usize;
        let x = self.dpop("C!")?;
        self.data.set_byte(addr, x as u8, "C!")
    }

    fn op_c_fetch(&mut self) -> Result<()> {
        let addr = self.dpop("C@")? as usize;
        let x = self.data.byte_at(addr, "C@")?;
        self.dpush(x as Cell, "C@")
    }

    fn op_plus_store(&mut self) -> Result<()> {
        let addr = self.dpop("+!")? as usize;
        let n = self.dpop("+!")? as SCell;
        let x = self.data.cell_at(addr, "+!")? as SCell;
        self.data.set_cell(addr, x.wrapping_add(n) as Cell, "+!")
    }

    fn op_count(&mut self) -> Result<()> {
        let addr = self.dpop("COUNT")? as usize;
        let count = self.data.byte_at(addr, "COUNT")?;
        self.dpush((addr + 1) as Cell, "COUNT")?;
        self.dpush(count as Cell, "COUNT")
    }

    fn op_cell_plus(&mut self) -> Result<()> {
        let addr = self.dpop("CELL+")?;
        self.dpush(addr.wrapping_add(CELL_SIZE), "CELL+")
    }

    fn op_cells(&mut self) -> Result<()> {
        let n = self.dpop("CELLS")?;
        self.dpush(n.wrapping_mul(CELL_SIZE), "CELLS")
    }

    fn op_char_plus(&mut self) -> Result<()> {
        let addr = self.dpop("CHAR+")?;
        self.dpush(addr.wrapping_add(1), "CHAR+")
    }

    fn op_chars(&mut self) -> Result<()> {
        let n = self.dpop("CHARS")?;
        self.dpush(n, "CHARS")
    }

    // ------------------------------------------------------------------
    // Arithmetic primitives (signed view, wrapping)
    // ------------------------------------------------------------------

    fn op_plus(&mut self) -> Result<()> {
        let b = self.dpop("+")? as SCell;
        let a = self.dpop("+")? as SCell;
        self.dpush(a.wrapping_add(b) as Cell, "+")
    }

    fn op_minus(&mut self) -> Result<()> {
        let b = self.dpop("-")? as SCell;
        let a = self.dpop("-")? as SCell;
        self.dpush(a.wrapping_sub(b) as Cell, "-")
    }

    fn op_star(&mut self) -> Result<()> {
        let b = self.dpop("*")? as SCell;
        let a = self.dpop("*")? as SCell;
        self.dpush(a.wrapping_mul(b) as Cell, "*")
    }

    fn op_slash(&mut self) -> Result<()> {
        let b = self.dpop("/")? as SCell;
        let a = self.dpop("/")? as SCell;
        if b == 0 {
            return Err(Abort::ZeroDivisor("/"));
        }
        self.dpush(a.wrapping_div(b) as Cell, "/")
    }

    fn op_slash_mod(&mut self) -> Result<()> {
        let b = self.dpop("/MOD")? as SCell;
        let a = self.dpop("/MOD")? as SCell;
        if b == 0 {
            return Err(Abort::ZeroDivisor("/MOD"));
        }
        self.dpush(a.wrapping_rem(b) as Cell, "/MOD")?;
        self.dpush(a.wrapping_div(b) as Cell, "/MOD")
    }

    fn op_negate(&mut self) -> Result<()> {
        let n = self.dpop("NEGATE")? as SCell;
        self.dpush(n.wrapping_neg() as Cell, "NEGATE")
    }

    fn op_one_plus(&mut self) -> Result<()> {
        let n = self.dpop("1+")?;
        self.dpush(n.wrapping_add(1), "1+")
    }

    fn op_one_minus(&mut self) -> Result<()> {
        let n = self.dpop("1-")?;
        self.dpush(n.wrapping_sub(1), "1-")
    }

    // ------------------------------------------------------------------
    // Bitwise and relational primitives
    // ------------------------------------------------------------------

    fn op_and(&mut self) -> Result<()> {
        let b = self.dpop("AND")?;
        let a = self.dpop("AND")?;
        self.dpush(a & b, "AND")
    }

    fn op_or(&mut self) -> Result<()> {
        let b = self.dpop("OR")?;
        let a = self.dpop("OR")?;
        self.dpush(a | b, "OR")
    }

    fn op_xor(&mut self) -> Result<()> {
        let b = self.dpop("XOR")?;
        let a = self.dpop("XOR")?;
        self.dpush(a ^ b, "XOR")
    }

    fn op_invert(&mut self) -> Result<()> {
        let x = self.dpop("INVERT")?;
        self.dpush(!x, "INVERT")
    }

    fn op_lshift(&mut self) -> Result<()> {
        let n = self.dpop("LSHIFT")?;
        let x = self.dpop("LSHIFT")?;
        let shifted = if n >= Cell::BITS as Cell { 0 } else { x << n };
        self.dpush(shifted, "LSHIFT")
    }

    fn op_rshift(&mut self) -> Result<()> {
        let n = self.dpop("RSHIFT")?;
        let x = self.dpop("RSHIFT")?;
        let shifted = if n >= Cell::BITS as Cell { 0 } else { x >> n };
        self.dpush(shifted, "RSHIFT")
    }

    fn op_two_star(&mut self) -> Result<()> {
        let x = self.dpop("2*")?;
        self.dpush(x << 1, "2*")
    }

    fn op_two_slash(&mut self) -> Result<()> {
        let x = self.dpop("2/")?;
        self.dpush(x >> 1, "2/")
    }

    fn flag(b: bool) -> Cell {
        if b {
            TRUE
        } else {
            FALSE
        }
    }

    fn op_equals(&mut self) -> Result<()> {
        let b = self.dpop("=")?;
        let a = self.dpop("=")?;
        self.dpush(Self::flag(a == b), "=")
    }

    fn op_not_equals(&mut self) -> Result<()> {
        let b = self.dpop("<>")?;
        let a = self.dpop("<>")?;
        self.dpush(Self::flag(a != b), "<>")
    }

    fn op_less(&mut self) -> Result<()> {
        let b = self.dpop("<")? as SCell;
        let a = self.dpop("<")? as SCell;
        self.dpush(Self::flag(a < b), "<")
    }

    fn op_greater(&mut self) -> Result<()> {
        let b = self.dpop(">")? as SCell;
        let a = self.dpop(">")? as SCell;
        self.dpush(Self::flag(a > b), ">")
    }

    fn op_zero_less(&mut self) -> Result<()> {
        let n = self.dpop("0<")? as SCell;
        self.dpush(Self::flag(n < 0), "0<")
    }

    fn op_zero_greater(&mut self) -> Result<()> {
        let n = self.dpop("0>")? as SCell;
        self.dpush(Self::flag(n > 0), "0>")
    }

    fn op_zero_equals(&mut self) -> Result<()> {
        let n = self.dpop("0=")?;
        self.dpush(Self::flag(n == 0), "0=")
    }

    fn op_zero_not_equals(&mut self) -> Result<()> {
        let n = self.dpop("0<>")?;
        self.dpush(Self::flag(n != 0), "0<>")
    }

    fn op_true(&mut self) -> Result<()> {
        self.dpush(TRUE, "TRUE")
    }

    fn op_false(&mut self) -> Result<()> {
        self.dpush(FALSE, "FALSE")
    }

    fn op_bl(&mut self) -> Result<()> {
        self.dpush(BL as Cell, "BL")
    }

    // ------------------------------------------------------------------
    // I/O primitives
    // ------------------------------------------------------------------

    fn op_emit(&mut self) -> Result<()> {
        let x = self.dpop("EMIT")?;
        self.emit_bytes(&[x as u8])
    }

    fn op_key(&mut self) -> Result<()> {
        let mut buffer = [0u8; 1];
        match self.key_source.read(&mut buffer) {
            Ok(0) => self.dpush(-1isize as Cell, "KEY"),
            Ok(_) => self.dpush(buffer[0] as Cell, "KEY"),
            Err(e) => Err(Abort::Io(e.to_string())),
        }
    }

    fn op_type(&mut self) -> Result<()> {
        let len = self.dpop("TYPE")? as usize;
        let addr = self.dpop("TYPE")? as usize;
        let bytes = self.data.slice(addr, len, "TYPE")?.to_vec();
        self.emit_bytes(&bytes)
    }

    fn op_cr(&mut self) -> Result<()> {
        self.emit_bytes(b"\n")
    }

    fn op_dot(&mut self) -> Result<()> {
        let n = self.dpop(".")? as SCell;
        let text = format!("{} ", Self::format_signed(n, self.base()));
        self.emit_bytes(text.as_bytes())
    }

    fn op_u_dot(&mut self) -> Result<()> {
        let u = self.dpop("U.")?;
        let text = format!("{} ", Self::format_unsigned(u, self.base()));
        self.emit_bytes(text.as_bytes())
    }

    fn op_dot_s(&mut self) -> Result<()> {
        let base = self.base();
        let mut text = format!("<{}> ", self.dstack.depth());
        for &x in self.dstack.iter() {
            text.push_str(&Self::format_signed(x as SCell, base));
            text.push(' ');
        }
        self.emit_bytes(text.as_bytes())
    }

    // ------------------------------------------------------------------
    // Environment primitives
    // ------------------------------------------------------------------

    fn op_arg_count(&mut self) -> Result<()> {
        let count = self.args.len() as Cell;
        self.dpush(count, "#ARG")
    }

    fn op_arg_at(&mut self) -> Result<()> {
        let index = self.dpop("ARG")? as usize;
        let &(addr, len) = self.args.get(index).ok_or(Abort::InvalidArgIndex)?;
        self.dpush(addr as Cell, "ARG")?;
        self.dpush(len as Cell, "ARG")
    }

    fn op_bye(&mut self) -> Result<()> {
        Err(Abort::Bye)
    }

    fn op_ms(&mut self) -> Result<()> {
        let u = self.dpop("MS")?;
        thread::sleep(Duration::from_millis(u as u64));
        Ok(())
    }

    fn push_time(&mut self, t: OffsetDateTime) -> Result<()> {
        self.dpush(t.second() as Cell, "TIME&DATE")?;
        self.dpush(t.minute() as Cell, "TIME&DATE")?;
        self.dpush(t.hour() as Cell, "TIME&DATE")?;
        self.dpush(t.day() as Cell, "TIME&DATE")?;
        self.dpush(u8::from(t.month()) as Cell, "TIME&DATE")?;
        self.dpush(t.year() as SCell as Cell, "TIME&DATE")
    }

    fn op_time_and_date(&mut self) -> Result<()> {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        self.push_time(now)
    }

    fn op_utc_time_and_date(&mut self) -> Result<()> {
        self.push_time(OffsetDateTime::now_utc())
    }

    // ------------------------------------------------------------------
    // Dictionary primitives
    // ------------------------------------------------------------------

    fn op_find(&mut self) -> Result<()> {
        let caddr = self.dpop("FIND")? as usize;
        let count = self.data.byte_at(caddr, "FIND")? as usize;
        let name = self.data.slice(caddr + 1, count, "FIND")?.to_vec();
        match self.dict.find(&name) {
            Some(xt) => {
                self.dpush(xt as Cell, "FIND")?;
                let flag = if self.dict.word(xt).map_or(false, Word::is_immediate) {
                    1
                } else {
                    TRUE
                };
                self.dpush(flag, "FIND")
            }
            None => {
                self.dpush(caddr as Cell, "FIND")?;
                self.dpush(FALSE, "FIND")
            }
        }
    }

    fn op_words(&mut self) -> Result<()> {
        let mut text = String::new();
        for name in self.dict.visible_names() {
            text.push_str(name);
            text.push(' ');
        }
        self.emit_bytes(text.as_bytes())
    }

    fn op_execute(&mut self) -> Result<()> {
        let xt = self.dpop("EXECUTE")? as Xt;
        self.execute_xt(xt)
    }

    fn op_exit(&mut self) -> Result<()> {
        // Reached only when EXIT is executed outside a colon body; inside
        // one, the inner interpreter treats its xt as the terminator.
        self.next = self.rstack.pop("EXIT")? as usize;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Parsing primitives
    // ------------------------------------------------------------------

    fn op_word(&mut self) -> Result<()> {
        let delim = self.dpop("WORD")? as u8;
        let (start, len) = self.scan_token(delim)?;
        if len >= WORD_BUFFER_SIZE {
            return Err(Abort::Message("WORD: token too long".to_string()));
        }
        let token = self
            .data
            .slice(INPUT_BUFFER_ADDR + start, len, "WORD")?
            .to_vec();
        self.data.set_byte(WORD_BUFFER_ADDR, len as u8, "WORD")?;
        self.data.write_slice(WORD_BUFFER_ADDR + 1, &token, "WORD")?;
        self.dpush(WORD_BUFFER_ADDR as Cell, "WORD")
    }

    fn op_parse(&mut self) -> Result<()> {
        let delim = self.dpop("PARSE")? as u8;
        let start = self.to_in().min(self.source_len);
        let mut pos = start;
        while pos < self.source_len {
            if self.data.byte_at(INPUT_BUFFER_ADDR + pos, "PARSE")? == delim {
                break;
            }
            pos += 1;
        }
        let len = pos - start;
        // Consume the delimiter so the scan continues past it.
        self.set_to_in(if pos < self.source_len { pos + 1 } else { pos })?;
        self.dpush((INPUT_BUFFER_ADDR + start) as Cell, "PARSE")?;
        self.dpush(len as Cell, "PARSE")
    }

    fn op_source(&mut self) -> Result<()> {
        self.dpush(INPUT_BUFFER_ADDR as Cell, "SOURCE")?;
        self.dpush(self.source_len as Cell, "SOURCE")
    }

    fn op_to_in_addr(&mut self) -> Result<()> {
        self.dpush(TO_IN_ADDR as Cell, ">IN")
    }

    fn op_base_addr(&mut self) -> Result<()> {
        self.dpush(BASE_ADDR as Cell, "BASE")
    }

    fn op_state_addr(&mut self) -> Result<()> {
        self.dpush(STATE_ADDR as Cell, "STATE")
    }

    fn op_to_unum(&mut self) -> Result<()> {
        let len = self.dpop(">UNUM")? as usize;
        let addr = self.dpop(">UNUM")? as usize;
        let u0 = self.dpop(">UNUM")?;
        let bytes = self.data.slice(addr, len, ">UNUM")?.to_vec();
        let (value, consumed) = Self::accumulate_digits(u0, &bytes, self.base());
        self.dpush(value, ">UNUM")?;
        self.dpush((addr + consumed) as Cell, ">UNUM")?;
        self.dpush((len - consumed) as Cell, ">UNUM")
    }

    fn op_to_num(&mut self) -> Result<()> {
        let len = self.dpop(">NUM")? as usize;
        let addr = self.dpop(">NUM")? as usize;
        let u0 = self.dpop(">NUM")?;
        let bytes = self.data.slice(addr, len, ">NUM")?.to_vec();
        let negative = bytes.starts_with(b"-") && bytes.len() > 1;
        let digits = if negative { &bytes[1..] } else { &bytes[..] };
        let (value, consumed) = Self::accumulate_digits(u0, digits, self.base());
        if negative && consumed == 0 {
            // A bare "-" is not a number; report nothing consumed.
            self.dpush(u0, ">NUM")?;
            self.dpush(addr as Cell, ">NUM")?;
            return self.dpush(len as Cell, ">NUM");
        }
        let skipped = if negative { 1 } else { 0 };
        let value = if negative { value.wrapping_neg() } else { value };
        self.dpush(value, ">NUM")?;
        self.dpush((addr + skipped + consumed) as Cell, ">NUM")?;
        self.dpush((len - skipped - consumed) as Cell, ">NUM")
    }

    fn op_refill(&mut self) -> Result<()> {
        self.refill()
    }

    fn op_evaluate(&mut self) -> Result<()> {
        let len = self.dpop("EVALUATE")? as usize;
        let addr = self.dpop("EVALUATE")? as usize;
        let bytes = self.data.slice(addr, len, "EVALUATE")?.to_vec();
        self.evaluate_bytes(&bytes)
    }

    // ------------------------------------------------------------------
    // Compiler primitives
    // ------------------------------------------------------------------

    fn op_create(&mut self) -> Result<()> {
        let name = self.parse_name()?;
        if name.is_empty() {
            return Err(Abort::Message("CREATE: empty name".to_string()));
        }
        self.data.align("CREATE")?;
        let here = self.data.here();
        self.dict.define(Word {
            name: String::from_utf8_lossy(&name).into_owned(),
            flags: 0,
            code: Code::Create,
            body: here,
            does: here,
        });
        Ok(())
    }

    fn op_colon(&mut self) -> Result<()> {
        self.op_create()?;
        if let Some(word) = self.dict.latest_mut() {
            word.code = Code::Colon;
            word.flags ^= F_HIDDEN;
        }
        self.set_state(TRUE)
    }

    fn op_semicolon(&mut self) -> Result<()> {
        let exit = self.xt_exit as Cell;
        self.data.append_cell(exit, ";")?;
        if let Some(word) = self.dict.latest_mut() {
            word.flags ^= F_HIDDEN;
        }
        self.set_state(FALSE)
    }

    fn op_literal(&mut self) -> Result<()> {
        let x = self.dpop("LITERAL")?;
        let lit = self.xt_lit as Cell;
        self.data.append_cell(lit, "LITERAL")?;
        self.data.append_cell(x, "LITERAL")
    }

    fn op_immediate(&mut self) -> Result<()> {
        let word = self
            .dict
            .latest_mut()
            .ok_or_else(|| Abort::Message("IMMEDIATE: empty dictionary".to_string()))?;
        word.flags ^= F_IMMEDIATE;
        Ok(())
    }

    fn op_hidden(&mut self) -> Result<()> {
        let word = self
            .dict
            .latest_mut()
            .ok_or_else(|| Abort::Message("HIDDEN: empty dictionary".to_string()))?;
        word.flags ^= F_HIDDEN;
        Ok(())
    }

    fn op_does(&mut self) -> Result<()> {
        let does = self.xt_does as Cell;
        let exit = self.xt_exit as Cell;
        self.data.append_cell(does, "DOES>")?;
        self.data.append_cell(exit, "DOES>")
    }

    fn op_left_bracket(&mut self) -> Result<()> {
        self.set_state(FALSE)
    }

    fn op_right_bracket(&mut self) -> Result<()> {
        self.set_state(TRUE)
    }

    fn op_abort(&mut self) -> Result<()> {
        Err(Abort::Message(String::new()))
    }

    /// Parse up to the closing quote and return the string.
    fn parse_quote_string(&mut self, who: &'static str) -> Result<Vec<u8>> {
        self.dpush(b'"' as Cell, who)?;
        self.op_parse()?;
        let len = self.dpop(who)? as usize;
        let addr = self.dpop(who)? as usize;
        if len >= WORD_BUFFER_SIZE {
            return Err(Abort::Message(format!("{}: string too long", who)));
        }
        Ok(self.data.slice(addr, len, who)?.to_vec())
    }

    fn compile_inline_string(&mut self, runtime: Xt, bytes: &[u8], who: &'static str) -> Result<()> {
        self.data.append_cell(runtime as Cell, who)?;
        self.data.append_byte(bytes.len() as u8, who)?;
        for &b in bytes {
            self.data.append_byte(b, who)?;
        }
        self.data.align(who)
    }

    fn op_abort_quote(&mut self) -> Result<()> {
        let message = self.parse_quote_string("ABORT\"")?;
        if self.is_compiling() {
            let runtime = self.xt_abort_quote;
            self.compile_inline_string(runtime, &message, "ABORT\"")
        } else {
            let flag = self.dpop("ABORT\"")?;
            if flag != FALSE {
                Err(Abort::Message(
                    String::from_utf8_lossy(&message).into_owned(),
                ))
            } else {
                Ok(())
            }
        }
    }

    fn op_s_quote(&mut self) -> Result<()> {
        let string = self.parse_quote_string("S\"")?;
        if self.is_compiling() {
            let runtime = self.xt_s_quote;
            self.compile_inline_string(runtime, &string, "S\"")
        } else {
            // Transient copy just past HERE; valid until the next append.
            let here = self.data.here();
            self.data.write_slice(here, &string, "S\"")?;
            self.dpush(here as Cell, "S\"")?;
            self.dpush(string.len() as Cell, "S\"")
        }
    }

    fn op_dot_quote(&mut self) -> Result<()> {
        let string = self.parse_quote_string(".\"")?;
        if self.is_compiling() {
            let runtime = self.xt_dot_quote;
            self.compile_inline_string(runtime, &string, ".\"")
        } else {
            self.emit_bytes(&string)
        }
    }

    // ------------------------------------------------------------------
    // Inner-interpreter runtime words
    // ------------------------------------------------------------------

    fn op_lit_runtime(&mut self) -> Result<()> {
        let x = self.data.cell_at(self.next, "(literal)")?;
        self.next += CELL_SIZE;
        self.dpush(x, "(literal)")
    }

    fn op_branch_runtime(&mut self) -> Result<()> {
        let target = self.data.cell_at(self.next, "(branch)")?;
        self.next = target as usize;
        Ok(())
    }

    fn op_zbranch_runtime(&mut self) -> Result<()> {
        let target = self.data.cell_at(self.next, "(0branch)")?;
        let flag = self.dpop("(0branch)")?;
        if flag == FALSE {
            self.next = target as usize;
        } else {
            self.next += CELL_SIZE;
        }
        Ok(())
    }

    /// Runtime of DOES>: rewire the most recent definition to push its
    /// data field and then run the cells that follow the DOES> site.
    fn op_does_runtime(&mut self) -> Result<()> {
        // `next` points at the EXIT compiled after (does); the runtime
        // action sequence starts at the cell after it.
        let does = self.next + CELL_SIZE;
        let word = self
            .dict
            .latest_mut()
            .ok_or_else(|| Abort::Message("DOES>: empty dictionary".to_string()))?;
        word.code = Code::Does;
        word.does = does;
        Ok(())
    }

    fn op_abort_quote_runtime(&mut self) -> Result<()> {
        let flag = self.dpop("ABORT\"")?;
        let (count, bytes) = self.read_inline_string("ABORT\"")?;
        if flag != FALSE {
            Err(Abort::Message(String::from_utf8_lossy(&bytes).into_owned()))
        } else {
            self.skip_inline_string(count);
            Ok(())
        }
    }

    fn op_s_quote_runtime(&mut self) -> Result<()> {
        let count = self.data.byte_at(self.next, "S\"")? as usize;
        let addr = self.next + 1;
        self.skip_inline_string(count);
        self.dpush(addr as Cell, "S\"")?;
        self.dpush(count as Cell, "S\"")
    }

    fn op_dot_quote_runtime(&mut self) -> Result<()> {
        let (count, bytes) = self.read_inline_string(".\"")?;
        self.skip_inline_string(count);
        self.emit_bytes(&bytes)
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    fn define_code(&mut self, name: &str, f: PrimFn) -> Xt {
        let here = self.data.here();
        self.dict.define(Word {
            name: name.to_string(),
            flags: 0,
            code: Code::Primitive(f),
            body: here,
            does: here,
        })
    }

    fn define_immediate(&mut self, name: &str, f: PrimFn) -> Xt {
        let xt = self.define_code(name, f);
        if let Some(word) = self.dict.word_mut(xt) {
            word.flags |= F_IMMEDIATE;
        }
        xt
    }

    fn register_primitives(&mut self) {
        // Words whose xts the engine itself compiles or compares against.
        self.xt_exit = self.define_code("EXIT", Engine::op_exit);
        self.xt_lit = self.define_code("(literal)", Engine::op_lit_runtime);
        self.define_code("(branch)", Engine::op_branch_runtime);
        self.define_code("(0branch)", Engine::op_zbranch_runtime);
        self.xt_does = self.define_code("(does)", Engine::op_does_runtime);
        self.xt_abort_quote = self.define_code("(abort\")", Engine::op_abort_quote_runtime);
        self.xt_s_quote = self.define_code("(s\")", Engine::op_s_quote_runtime);
        self.xt_dot_quote = self.define_code("(.\")", Engine::op_dot_quote_runtime);

        const CODE_WORDS: &[(&str, PrimFn)] = &[
            ("!", Engine::op_store),
            ("#ARG", Engine::op_arg_count),
            ("*", Engine::op_star),
            ("+", Engine::op_plus),
            ("+!", Engine::op_plus_store),
            (",", Engine::op_comma),
            ("-", Engine::op_minus),
            (".", Engine::op_dot),
            (".S", Engine::op_dot_s),
            ("/", Engine::op_slash),
            ("/MOD", Engine::op_slash_mod),
            ("0<", Engine::op_zero_less),
            ("0<>", Engine::op_zero_not_equals),
            ("0=", Engine::op_zero_equals),
            ("0>", Engine::op_zero_greater),
            ("1+", Engine::op_one_plus),
            ("1-", Engine::op_one_minus),
            ("2*", Engine::op_two_star),
            ("2/", Engine::op_two_slash),
            ("2>R", Engine::op_two_to_r),
            ("2DROP", Engine::op_two_drop),
            ("2DUP", Engine::op_two_dup),
            ("2OVER", Engine::op_two_over),
            ("2R>", Engine::op_two_r_from),
            ("2R@", Engine::op_two_r_fetch),
            ("2SWAP", Engine::op_two_swap),
            (":", Engine::op_colon),
            ("<", Engine::op_less),
            ("<>", Engine::op_not_equals),
            ("=", Engine::op_equals),
            (">", Engine::op_greater),
            (">IN", Engine::op_to_in_addr),
            (">NUM", Engine::op_to_num),
            (">R", Engine::op_to_r),
            (">UNUM", Engine::op_to_unum),
            ("?DUP", Engine::op_qdup),
            ("@", Engine::op_fetch),
            ("ABORT", Engine::op_abort),
            ("ALIGN", Engine::op_align),
            ("ALIGNED", Engine::op_aligned),
            ("ALLOT", Engine::op_allot),
            ("AND", Engine::op_and),
            ("ARG", Engine::op_arg_at),
            ("BASE", Engine::op_base_addr),
            ("BL", Engine::op_bl),
            ("BYE", Engine::op_bye),
            ("C!", Engine::op_c_store),
            ("C,", Engine::op_c_comma),
            ("C@", Engine::op_c_fetch),
            ("CELL+", Engine::op_cell_plus),
            ("CELLS", Engine::op_cells),
            ("CHAR+", Engine::op_char_plus),
            ("CHARS", Engine::op_chars),
            ("COUNT", Engine::op_count),
            ("CR", Engine::op_cr),
            ("CREATE", Engine::op_create),
            ("DEPTH", Engine::op_depth),
            ("DROP", Engine::op_drop),
            ("DUP", Engine::op_dup),
            ("EMIT", Engine::op_emit),
            ("EVALUATE", Engine::op_evaluate),
            ("EXECUTE", Engine::op_execute),
            ("FALSE", Engine::op_false),
            ("FIND", Engine::op_find),
            ("HERE", Engine::op_here),
            ("HIDDEN", Engine::op_hidden),
            ("IMMEDIATE", Engine::op_immediate),
            ("INVERT", Engine::op_invert),
            ("KEY", Engine::op_key),
            ("LSHIFT", Engine::op_lshift),
            ("MS", Engine::op_ms),
            ("NEGATE", Engine::op_negate),
            ("NIP", Engine::op_nip),
            ("OR", Engine::op_or),
            ("OVER", Engine::op_over),
            ("PARSE", Engine::op_parse),
            ("PICK", Engine::op_pick),
            ("QUIT", Engine::op_quit),
            ("R>", Engine::op_r_from),
            ("R@", Engine::op_r_fetch),
            ("REFILL", Engine::op_refill),
            ("ROLL", Engine::op_roll),
            ("ROT", Engine::op_rot),
            ("RSHIFT", Engine::op_rshift),
            ("SOURCE", Engine::op_source),
            ("STATE", Engine::op_state_addr),
            ("SWAP", Engine::op_swap),
            ("TIME&DATE", Engine::op_time_and_date),
            ("TRUE", Engine::op_true),
            ("TUCK", Engine::op_tuck),
            ("TYPE", Engine::op_type),
            ("U.", Engine::op_u_dot),
            ("UNUSED", Engine::op_unused),
            ("UTCTIME&DATE", Engine::op_utc_time_and_date),
            ("WORD", Engine::op_word),
            ("WORDS", Engine::op_words),
            ("XOR", Engine::op_xor),
            ("]", Engine::op_right_bracket),
        ];
        for &(name, f) in CODE_WORDS {
            self.define_code(name, f);
        }

        const IMMEDIATE_WORDS: &[(&str, PrimFn)] = &[
            (";", Engine::op_semicolon),
            ("[", Engine::op_left_bracket),
            ("ABORT\"", Engine::op_abort_quote),
            ("DOES>", Engine::op_does),
            ("LITERAL", Engine::op_literal),
            (".\"", Engine::op_dot_quote),
            ("S\"", Engine::op_s_quote),
        ];
        for &(name, f) in IMMEDIATE_WORDS {
            self.define_immediate(name, f);
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

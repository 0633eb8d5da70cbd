// error.rs - Abort conditions raised by runtime checks

use std::fmt;

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, Abort>;

/// Every runtime check raises one of these. An `Abort` unwinds through any
/// depth of inner-interpreter nesting back to the QUIT loop, which prints
/// the message (if non-empty), resets both stacks, and resumes.
///
/// `Bye` is not an error: it is the control transfer that ends the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Abort {
    /// Parameter stack underflow in the named word.
    StackUnderflow(&'static str),
    /// Parameter stack overflow in the named word.
    StackOverflow(&'static str),
    /// Return stack underflow in the named word.
    ReturnStackUnderflow(&'static str),
    /// Return stack overflow in the named word.
    ReturnStackOverflow(&'static str),
    /// Cell access on an address that is not a multiple of the cell size.
    UnalignedAddress(&'static str),
    /// Address outside the data space.
    InvalidAddress(&'static str),
    /// Append would run past the end of the data space.
    DataSpaceOverflow(&'static str),
    /// HERE left the data space.
    HereOutOfRange(&'static str),
    /// Division by zero in the named word.
    ZeroDivisor(&'static str),
    /// Token matched no dictionary entry and did not parse as a number.
    UnknownWord(String),
    /// ARG index at or beyond #ARG.
    InvalidArgIndex,
    /// Host I/O failure while reading or writing a stream.
    Io(String),
    /// Free-form abort message (ABORT", CREATE with no name, ...).
    /// An empty message (plain ABORT) produces no output.
    Message(String),
    /// BYE or end-of-input: leave the QUIT loop, exit code 0.
    Bye,
}

impl fmt::Display for Abort {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Abort::StackUnderflow(name) => write!(f, "{}: stack underflow", name),
            Abort::StackOverflow(name) => write!(f, "{}: stack overflow", name),
            Abort::ReturnStackUnderflow(name) => write!(f, "{}: return stack underflow", name),
            Abort::ReturnStackOverflow(name) => write!(f, "{}: return stack overflow", name),
            Abort::UnalignedAddress(name) => write!(f, "{}: unaligned address", name),
            Abort::InvalidAddress(name) => write!(f, "{}: invalid memory address", name),
            Abort::DataSpaceOverflow(name) => write!(f, "{}: data space overflow", name),
            Abort::HereOutOfRange(name) => write!(f, "{}: HERE outside data space", name),
            Abort::ZeroDivisor(name) => write!(f, "{}: zero divisor", name),
            Abort::UnknownWord(token) => write!(f, "unrecognized word: {}", token),
            Abort::InvalidArgIndex => write!(f, "ARG: invalid index"),
            Abort::Io(msg) => write!(f, "I/O error: {}", msg),
            Abort::Message(msg) => write!(f, "{}", msg),
            Abort::Bye => write!(f, "bye"),
        }
    }
}

impl std::error::Error for Abort {}

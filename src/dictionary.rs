// dictionary.rs - Word records and the append-only dictionary

use std::fmt;

use crate::engine::Engine;
use crate::error::Result;

/// Host handler implementing one primitive.
pub type PrimFn = fn(&mut Engine) -> Result<()>;

/// An execution token: a stable index into the dictionary list. Cells in
/// compiled bodies hold xts; the dictionary is append-only for the process
/// lifetime, so an xt never dangles.
pub type Xt = usize;

pub const F_IMMEDIATE: u8 = 1;
pub const F_HIDDEN: u8 = 2;

/// How a dictionary entry executes.
#[derive(Clone, Copy)]
pub enum Code {
    /// A kernel primitive; runs the host handler directly.
    Primitive(PrimFn),
    /// A colon definition; the inner interpreter threads its `does` field.
    Colon,
    /// A CREATEd word; pushes its data-field address.
    Create,
    /// A DOES>-augmented word; pushes its data-field address, then threads
    /// its `does` field.
    Does,
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Code::Primitive(_) => write!(f, "Primitive"),
            Code::Colon => write!(f, "Colon"),
            Code::Create => write!(f, "Create"),
            Code::Does => write!(f, "Does"),
        }
    }
}

/// One dictionary entry.
#[derive(Debug)]
pub struct Word {
    pub name: String,
    pub flags: u8,
    pub code: Code,
    /// Data-field address: start of the word's parameter region.
    pub body: usize,
    /// Start of the runtime cell sequence for Colon and Does words;
    /// equal to `body` otherwise.
    pub does: usize,
}

impl Word {
    pub fn is_immediate(&self) -> bool {
        self.flags & F_IMMEDIATE != 0
    }

    pub fn is_hidden(&self) -> bool {
        self.flags & F_HIDDEN != 0
    }
}

/// Two names match iff they have equal length and are byte-wise equal under
/// ASCII upcasing. Non-ASCII bytes compare as themselves.
fn names_match(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(x, y)| x.to_ascii_uppercase() == y.to_ascii_uppercase())
}

/// The append-only ordered word list, most recent last.
pub struct Dictionary {
    words: Vec<Word>,
}

impl Dictionary {
    pub fn new() -> Self {
        Dictionary { words: Vec::new() }
    }

    pub fn clear(&mut self) {
        self.words.clear();
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Append an entry and return its xt.
    pub fn define(&mut self, word: Word) -> Xt {
        self.words.push(word);
        self.words.len() - 1
    }

    pub fn word(&self, xt: Xt) -> Option<&Word> {
        self.words.get(xt)
    }

    pub fn word_mut(&mut self, xt: Xt) -> Option<&mut Word> {
        self.words.get_mut(xt)
    }

    /// The most recent entry, if any.
    pub fn latest(&self) -> Option<Xt> {
        self.words.len().checked_sub(1)
    }

    pub fn latest_mut(&mut self) -> Option<&mut Word> {
        self.words.last_mut()
    }

    /// Search newest-first, skipping hidden entries. Empty names never match.
    pub fn find(&self, name: &[u8]) -> Option<Xt> {
        if name.is_empty() {
            return None;
        }
        self.words
            .iter()
            .enumerate()
            .rev()
            .find(|(_, w)| !w.is_hidden() && names_match(w.name.as_bytes(), name))
            .map(|(xt, _)| xt)
    }

    /// Non-hidden names, newest first.
    pub fn visible_names(&self) -> impl Iterator<Item = &str> {
        self.words
            .iter()
            .rev()
            .filter(|w| !w.is_hidden())
            .map(|w| w.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Word> {
        self.words.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, flags: u8) -> Word {
        Word {
            name: name.to_string(),
            flags,
            code: Code::Create,
            body: 0,
            does: 0,
        }
    }

    #[test]
    fn search_is_case_insensitive_and_newest_first() {
        let mut dict = Dictionary::new();
        let old = dict.define(entry("greet", 0));
        let new = dict.define(entry("GREET", 0));
        assert_eq!(dict.find(b"Greet"), Some(new));
        assert_ne!(old, new);
    }

    #[test]
    fn hidden_entries_are_skipped() {
        let mut dict = Dictionary::new();
        let visible = dict.define(entry("twice", 0));
        dict.define(entry("twice", F_HIDDEN));
        assert_eq!(dict.find(b"TWICE"), Some(visible));
    }

    #[test]
    fn empty_name_never_matches() {
        let mut dict = Dictionary::new();
        dict.define(entry("", 0));
        assert_eq!(dict.find(b""), None);
    }
}

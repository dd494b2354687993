use crate::{Error, Record};

/// A forward-only reader that yields the records of a buffer line by line
///
/// Lines are split on `\n` with one trailing `\r` stripped, so unix and dos
/// line endings both work. Empty lines are skipped; they occur between
/// sections in files written by some producers. Anything else is handed to
/// [`Record::parse`] together with its 1-based line number.
///
/// ```
/// use edigeo::Lexer;
///
/// let mut lexer = Lexer::new(b"BOMT 12:EDIGEO-VEC.\n\nRTYSA03:GTS\n");
/// assert_eq!(lexer.next_record().unwrap().unwrap().name(), "BOM");
/// assert_eq!(lexer.next_record().unwrap().unwrap().name(), "RTY");
/// assert!(lexer.next_record().unwrap().is_none());
/// ```
#[derive(Debug)]
pub struct Lexer<'a> {
    data: &'a [u8],
    line: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer over the given data
    pub fn new(data: &'a [u8]) -> Self {
        Lexer { data, line: 0 }
    }

    /// The 1-based number of the most recently read line
    ///
    /// Zero until the first line has been read. Blank lines advance the
    /// count too, so reported positions match what an editor shows.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Reads the next record, or `None` once the input is exhausted
    ///
    /// Each call does a bounded amount of work (one record), so a caller
    /// can stop between calls without unwinding anything.
    pub fn next_record(&mut self) -> Result<Option<Record<'a>>, Error> {
        while !self.data.is_empty() {
            let (mut line, rest) = match self.data.iter().position(|&b| b == b'\n') {
                Some(idx) => (&self.data[..idx], &self.data[idx + 1..]),
                None => (self.data, &b""[..]),
            };
            self.data = rest;
            self.line += 1;

            if let [head @ .., b'\r'] = line {
                line = head;
            }

            if line.is_empty() {
                continue;
            }

            return Record::parse(line, self.line).map(Some);
        }

        Ok(None)
    }
}

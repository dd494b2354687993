use std::fmt;

/// An error that can occur when ingesting EDIGEO data
#[derive(Debug)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Error {
        Error(Box::new(kind))
    }

    /// Return the specific type of error
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// Returns the 1-based line number where the error occurred (if available)
    pub fn line(&self) -> Option<usize> {
        self.0.line()
    }
}

/// Specific type of error
#[derive(Debug)]
pub enum ErrorKind {
    /// An underlying IO error while reading input
    Io(std::io::Error),

    /// Input ended before the mandatory end-of-file record
    Eof,

    /// A line did not follow the fixed record layout
    MalformedRecord { line: usize, raw: String },

    /// The first record of the file was not the header record
    UnexpectedFirstRecord { line: usize, record: String },

    /// The charset record declared an unrecognized charset token
    UnknownCharset { line: usize, token: String },

    /// Expected the charset record right after the header
    ExpectedCharsetRecord { line: usize, record: String },

    /// A second charset record was encountered
    DuplicateCharset { line: usize },

    /// A block type code had no registered block constructor
    UnknownBlockType { line: usize, code: String },

    /// A block record appeared before any block was opened
    OrphanRecord { line: usize, record: String },

    /// The active block did not recognize the record
    UnexpectedRecord {
        block: String,
        line: usize,
        record: String,
    },

    /// A record appeared after the end-of-file record
    RecordAfterEndOfFile { line: usize, record: String },

    /// A field did not denote a representable integer or real
    InvalidNumber { value: String },

    /// A field did not denote a valid YYYYMMDD date
    InvalidDate { value: String },
}

impl ErrorKind {
    pub fn line(&self) -> Option<usize> {
        match *self {
            ErrorKind::MalformedRecord { line, .. } => Some(line),
            ErrorKind::UnexpectedFirstRecord { line, .. } => Some(line),
            ErrorKind::UnknownCharset { line, .. } => Some(line),
            ErrorKind::ExpectedCharsetRecord { line, .. } => Some(line),
            ErrorKind::DuplicateCharset { line } => Some(line),
            ErrorKind::UnknownBlockType { line, .. } => Some(line),
            ErrorKind::OrphanRecord { line, .. } => Some(line),
            ErrorKind::UnexpectedRecord { line, .. } => Some(line),
            ErrorKind::RecordAfterEndOfFile { line, .. } => Some(line),
            _ => None,
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self.0 {
            ErrorKind::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.0 {
            ErrorKind::Io(ref err) => write!(f, "io error: {}", err),
            ErrorKind::Eof => write!(f, "unexpected end of input before the EOM record"),
            ErrorKind::MalformedRecord { line, ref raw } => {
                write!(f, "malformed record (line: {}): {}", line, raw)
            }
            ErrorKind::UnexpectedFirstRecord { line, ref record } => write!(
                f,
                "expected the file to start with a BOM record (line: {}): {}",
                line, record
            ),
            ErrorKind::UnknownCharset { line, ref token } => {
                write!(f, "unknown charset token (line: {}): {}", line, token)
            }
            ErrorKind::ExpectedCharsetRecord { line, ref record } => write!(
                f,
                "expected a CSE record after the header (line: {}): {}",
                line, record
            ),
            ErrorKind::DuplicateCharset { line } => {
                write!(f, "charset already declared (line: {})", line)
            }
            ErrorKind::UnknownBlockType { line, ref code } => {
                write!(f, "unknown block type code (line: {}): {}", line, code)
            }
            ErrorKind::OrphanRecord { line, ref record } => write!(
                f,
                "record encountered before any block was opened (line: {}): {}",
                line, record
            ),
            ErrorKind::UnexpectedRecord {
                ref block,
                line,
                ref record,
            } => write!(
                f,
                "unexpected record in {} block (line: {}): {}",
                block, line, record
            ),
            ErrorKind::RecordAfterEndOfFile { line, ref record } => write!(
                f,
                "record encountered after the EOM record (line: {}): {}",
                line, record
            ),
            ErrorKind::InvalidNumber { ref value } => {
                write!(f, "value does not denote a number: {}", value)
            }
            ErrorKind::InvalidDate { ref value } => {
                write!(f, "value does not denote a YYYYMMDD date: {}", value)
            }
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::new(kind)
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::new(ErrorKind::Io(error))
    }
}

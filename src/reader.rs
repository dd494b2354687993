use crate::{
    Block, BlockFactory, Charset, Error, ErrorKind, Lexer, Record, StandardFactory,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitHeader,
    AwaitCharset,
    Body,
    Done,
}

/// Pull-based reader that turns a file's bytes into a sequence of blocks
///
/// A file opens with a `BOM` header record, declares its charset with a
/// `CSE` record, then alternates `RTY` type records with the records of the
/// block each one opens, and closes with an `EOM` record. The reader
/// enforces exactly that shape: any deviation fails the parse on the spot
/// and the reader yields nothing further (there is no resynchronization).
///
/// ```
/// use edigeo::BlockReader;
///
/// let data = b"BOMT 12:EDIGEO-VEC.\nCSET 03:IRV\nRTYSA03:PNO\nRIDSA08:PNO00001\nEOMT 00:\n";
/// let mut reader = BlockReader::new(data);
///
/// let block = reader.next_block().unwrap().unwrap();
/// assert_eq!(block.code(), "PNO");
/// assert_eq!(block.identifier(), Some("PNO00001"));
/// assert!(reader.next_block().unwrap().is_none());
/// ```
#[derive(Debug)]
pub struct BlockReader<'data, F> {
    lexer: Lexer<'data>,
    factory: F,
    state: State,
    failed: bool,
    charset: Charset,
    current: Option<Block<'data>>,
}

impl<'data> BlockReader<'data, StandardFactory> {
    /// Creates a reader over the given data with the standard block table
    pub fn new(data: &'data [u8]) -> Self {
        Self::with_factory(data, StandardFactory)
    }
}

impl<'data, F> BlockReader<'data, F>
where
    F: BlockFactory,
{
    /// Creates a reader that resolves `RTY` codes through the given factory
    pub fn with_factory(data: &'data [u8], factory: F) -> Self {
        BlockReader {
            lexer: Lexer::new(data),
            factory,
            state: State::AwaitHeader,
            failed: false,
            charset: Charset::default(),
            current: None,
        }
    }

    /// The charset resolved from the `CSE` record
    ///
    /// Until that record has been read this is the default ([`Charset::Latin1`]),
    /// which covers the framing records read before it.
    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// The 1-based number of the most recently consumed line
    pub fn line(&self) -> usize {
        self.lexer.line()
    }

    /// Returns the next completed block
    ///
    /// `Ok(None)` means the file ended cleanly behind its `EOM` record.
    /// Any error is fatal: the same reader returns `Ok(None)` from then on.
    pub fn next_block(&mut self) -> Result<Option<Block<'data>>, Error> {
        if self.failed {
            return Ok(None);
        }

        match self.step() {
            Err(err) => {
                self.failed = true;
                Err(err)
            }
            ok => ok,
        }
    }

    fn step(&mut self) -> Result<Option<Block<'data>>, Error> {
        loop {
            let record = match self.lexer.next_record()? {
                Some(record) => record,
                None if self.state == State::Done => return Ok(None),
                None => return Err(Error::new(ErrorKind::Eof)),
            };

            match self.state {
                State::AwaitHeader => {
                    if record.name() != "BOM" {
                        return Err(Error::new(ErrorKind::UnexpectedFirstRecord {
                            line: record.line(),
                            record: record.to_string(),
                        }));
                    }
                    if record.length() != 12 || record.values().len() != 1 {
                        return Err(malformed(&record));
                    }
                    self.state = State::AwaitCharset;
                }
                State::AwaitCharset => {
                    if record.name() != "CSE" {
                        return Err(Error::new(ErrorKind::ExpectedCharsetRecord {
                            line: record.line(),
                            record: record.to_string(),
                        }));
                    }
                    let token = match record.values() {
                        [token] => *token,
                        _ => return Err(malformed(&record)),
                    };
                    self.charset = Charset::resolve(token).ok_or_else(|| {
                        Error::new(ErrorKind::UnknownCharset {
                            line: record.line(),
                            token: String::from_utf8_lossy(token).into_owned(),
                        })
                    })?;
                    self.state = State::Body;
                }
                State::Body => match record.name() {
                    "RTY" => {
                        let code = match record.first() {
                            Some(value) if !value.is_empty() => self.charset.decode(value),
                            _ => return Err(malformed(&record)),
                        };
                        let kind = self.factory.resolve(&code).ok_or_else(|| {
                            Error::new(ErrorKind::UnknownBlockType {
                                line: record.line(),
                                code: code.clone().into_owned(),
                            })
                        })?;

                        if let Some(done) = self.current.replace(Block::new(kind, code)) {
                            return Ok(Some(done));
                        }
                    }
                    "CSE" => {
                        return Err(Error::new(ErrorKind::DuplicateCharset {
                            line: record.line(),
                        }))
                    }
                    "EOM" => {
                        if record.length() != 0 || !record.values().is_empty() {
                            return Err(malformed(&record));
                        }
                        self.state = State::Done;
                        if let Some(done) = self.current.take() {
                            return Ok(Some(done));
                        }
                    }
                    _ => match self.current.as_mut() {
                        Some(block) => block.process_record(&record, self.charset)?,
                        None => {
                            return Err(Error::new(ErrorKind::OrphanRecord {
                                line: record.line(),
                                record: record.to_string(),
                            }))
                        }
                    },
                },
                State::Done => {
                    return Err(Error::new(ErrorKind::RecordAfterEndOfFile {
                        line: record.line(),
                        record: record.to_string(),
                    }))
                }
            }
        }
    }
}

impl<'data, F> Iterator for BlockReader<'data, F>
where
    F: BlockFactory,
{
    type Item = Result<Block<'data>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_block().transpose()
    }
}

/// Parses a whole buffer into its blocks with the standard block table
///
/// ```
/// use edigeo::{parse, BlockKind};
///
/// let data = b"BOMT 12:EDIGEO-VEC.\nCSET 03:IRV\nRTYSA03:PNO\nRIDSA08:PNO00001\nEOMT 00:\n";
/// let blocks = parse(data).unwrap();
/// assert_eq!(blocks.len(), 1);
/// assert_eq!(blocks[0].kind(), BlockKind::Node);
/// ```
pub fn parse(data: &[u8]) -> Result<Vec<Block<'_>>, Error> {
    let mut reader = BlockReader::new(data);
    let mut blocks = Vec::new();
    while let Some(block) = reader.next_block()? {
        blocks.push(block);
    }
    Ok(blocks)
}

fn malformed(record: &Record) -> Error {
    Error::new(ErrorKind::MalformedRecord {
        line: record.line(),
        raw: record.to_string(),
    })
}

use std::borrow::Cow;
use std::fmt;

/// The character set declared by a support's `CSE` record
///
/// A file declares its charset exactly once, right after the `BOM` header.
/// Every textual field read afterwards is decoded through it. Field values
/// are overwhelmingly ASCII, so decoding borrows from the input buffer and
/// only allocates when an 8-bit byte shows up.
///
/// ```
/// use edigeo::Charset;
///
/// let charset = Charset::resolve(b"8859-1").unwrap();
/// assert_eq!(charset.decode(b"COMMUNE"), "COMMUNE");
/// assert_eq!(charset.decode(b"D\xe9partement"), "Département");
/// assert_eq!(charset.decode(b"\xc9VRY"), "ÉVRY");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// ISO 646 IRV: 7-bit ASCII. 8-bit bytes decode to U+FFFD.
    Irv,

    /// ISO 8859-1: every byte maps to the same code point in U+0000..=U+00FF.
    Latin1,
}

impl Charset {
    /// Resolves a `CSE` charset token to its charset
    ///
    /// Returns `None` for tokens outside the format's legal set.
    ///
    /// ```
    /// use edigeo::Charset;
    ///
    /// assert_eq!(Charset::resolve(b"IRV"), Some(Charset::Irv));
    /// assert_eq!(Charset::resolve(b"8859-1"), Some(Charset::Latin1));
    /// assert_eq!(Charset::resolve(b"UTF-8"), None);
    /// ```
    pub fn resolve(token: &[u8]) -> Option<Charset> {
        match token {
            b"IRV" => Some(Charset::Irv),
            b"8859-1" => Some(Charset::Latin1),
            _ => None,
        }
    }

    /// The token this charset is declared with
    pub fn code(&self) -> &'static str {
        match self {
            Charset::Irv => "IRV",
            Charset::Latin1 => "8859-1",
        }
    }

    /// Decodes bytes into a utf-8 compatible string -- allocating if necessary
    ///
    /// ```
    /// use edigeo::Charset;
    ///
    /// assert_eq!(Charset::Latin1.decode(b"\xe9"), "é");
    /// assert_eq!(Charset::Irv.decode(b"\xe9"), "\u{fffd}");
    /// ```
    pub fn decode<'a>(&self, data: &'a [u8]) -> Cow<'a, str> {
        match data.iter().position(|b| !b.is_ascii()) {
            None => {
                // This is safe as we just checked that the data is ascii and
                // ascii is a subset of utf8
                debug_assert!(std::str::from_utf8(data).is_ok());
                let s = unsafe { std::str::from_utf8_unchecked(data) };
                Cow::Borrowed(s)
            }
            Some(offset) => Cow::Owned(match self {
                Charset::Latin1 => latin1_create(data, offset),
                Charset::Irv => irv_create(data, offset),
            }),
        }
    }
}

/// Files open under Latin-1 until their `CSE` record says otherwise
impl Default for Charset {
    fn default() -> Self {
        Charset::Latin1
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.code())
    }
}

fn latin1_create(d: &[u8], offset: usize) -> String {
    let (upto, rest) = d.split_at(offset);

    // size estimate: all remaining bytes need a two byte sequence
    let size_estimate = offset + (d.len() - offset) * 2;
    let mut result = String::with_capacity(size_estimate);
    let head = unsafe { std::str::from_utf8_unchecked(upto) };
    result.push_str(head);

    for &c in rest {
        result.push(char::from(c));
    }

    result
}

fn irv_create(d: &[u8], offset: usize) -> String {
    let (upto, rest) = d.split_at(offset);

    // size estimate: all remaining bytes are replacement characters
    let size_estimate = offset + (d.len() - offset) * 3;
    let mut result = String::with_capacity(size_estimate);
    let head = unsafe { std::str::from_utf8_unchecked(upto) };
    result.push_str(head);

    for &c in rest {
        if c.is_ascii() {
            result.push(char::from(c));
        } else {
            result.push(char::REPLACEMENT_CHARACTER);
        }
    }

    result
}

use crate::{Charset, Date, Error, ErrorKind};
use std::borrow::Cow;
use std::fmt;

/// A single parsed line of an EDIGEO file
///
/// Lines follow a fixed layout: a three character record name, two
/// descriptor columns (value nature and format, carried by the format but
/// not interpreted here), a two digit declared payload length, a `:`
/// separator, and the payload itself. Payload fields are separated by `;`.
///
/// ```
/// use edigeo::Record;
///
/// let record = Record::parse(b"RTYSA03:GTS", 1).unwrap();
/// assert_eq!(record.name(), "RTY");
/// assert_eq!(record.length(), 3);
/// assert_eq!(record.first(), Some(&b"GTS"[..]));
/// ```
///
/// A record borrows the line it was parsed from and is meant to be consumed
/// on the spot: read the fields through the typed accessors and move on.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<'a> {
    name: &'a str,
    length: usize,
    values: Vec<&'a [u8]>,
    line: usize,
    raw: &'a [u8],
}

impl<'a> Record<'a> {
    /// Parses one non-empty line into a record
    ///
    /// `line` is the 1-based line number, carried for diagnostics. Any
    /// deviation from the fixed layout fails with
    /// [`ErrorKind::MalformedRecord`] naming the offending line.
    ///
    /// ```
    /// use edigeo::Record;
    ///
    /// assert!(Record::parse(b"CORCC21:+875297.17;+6547102.59", 9).is_ok());
    /// assert!(Record::parse(b"EOMT 00:", 42).is_ok());
    /// assert!(Record::parse(b"RTY", 1).is_err());
    /// assert!(Record::parse(b"RTYSAxx:GTS", 1).is_err());
    /// ```
    pub fn parse(raw: &'a [u8], line: usize) -> Result<Record<'a>, Error> {
        if raw.len() < 8 || raw[7] != b':' {
            return Err(malformed(raw, line));
        }

        let name = &raw[..3];
        if !name
            .iter()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        {
            return Err(malformed(raw, line));
        }

        // This is safe as we just checked that the name is ascii and ascii
        // is a subset of utf8
        debug_assert!(std::str::from_utf8(name).is_ok());
        let name = unsafe { std::str::from_utf8_unchecked(name) };

        let length = match (raw[5], raw[6]) {
            (tens @ b'0'..=b'9', ones @ b'0'..=b'9') => {
                usize::from(tens - b'0') * 10 + usize::from(ones - b'0')
            }
            _ => return Err(malformed(raw, line)),
        };

        // a record that declares a zero length carries no values, whatever
        // trails the separator
        let values = if length > 0 {
            raw[8..].split(|&b| b == b';').collect()
        } else {
            Vec::new()
        };

        Ok(Record {
            name,
            length,
            values,
            line,
            raw,
        })
    }

    /// The three character record name, e.g. `RTY` or `COR`
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// The declared payload length
    pub fn length(&self) -> usize {
        self.length
    }

    /// The 1-based line number this record was parsed from
    pub fn line(&self) -> usize {
        self.line
    }

    /// The raw payload fields, in on-file order
    pub fn values(&self) -> &[&'a [u8]] {
        &self.values
    }

    /// The raw bytes of the first field, if the record carries one
    pub fn first(&self) -> Option<&'a [u8]> {
        self.values.first().copied()
    }

    /// The first field decoded through the given charset
    ///
    /// Absence of a value is not an error.
    pub fn first_str(&self, charset: Charset) -> Option<Cow<'a, str>> {
        self.first().map(|v| charset.decode(v))
    }

    /// The first field as a base-10 integer
    ///
    /// An absent value reads as 0: count fields in this format omit their
    /// payload to mean zero. A present but non-numeric (or overflowing)
    /// value fails with [`ErrorKind::InvalidNumber`].
    ///
    /// ```
    /// use edigeo::Record;
    ///
    /// assert_eq!(Record::parse(b"PTCSN02:25", 1).unwrap().first_i64().unwrap(), 25);
    /// assert_eq!(Record::parse(b"EOMT 00:", 1).unwrap().first_i64().unwrap(), 0);
    /// assert!(Record::parse(b"PTCSN02:abc", 1).unwrap().first_i64().is_err());
    /// ```
    pub fn first_i64(&self) -> Result<i64, Error> {
        match self.first() {
            Some(value) => to_i64(value).ok_or_else(|| invalid_number(value)),
            None => Ok(0),
        }
    }

    /// The first field as a `YYYYMMDD` date
    ///
    /// `None` when the record carries no value; a present but malformed
    /// value fails with [`ErrorKind::InvalidDate`].
    pub fn first_date(&self) -> Result<Option<Date>, Error> {
        match self.first() {
            Some(value) => match Date::parse(value) {
                Ok(date) => Ok(Some(date)),
                Err(_) => Err(Error::new(ErrorKind::InvalidDate {
                    value: String::from_utf8_lossy(value).into_owned(),
                })),
            },
            None => Ok(None),
        }
    }

    /// Same as [`Record::first_str`], and additionally logs the decoded
    /// value under the given label when one is present
    pub fn first_str_logged(&self, charset: Charset, label: &str) -> Option<Cow<'a, str>> {
        let value = self.first_str(charset);
        if let Some(ref v) = value {
            log::info!("{}: {}", label, v);
        }
        value
    }

    /// Same as [`Record::first_i64`], and additionally logs the parsed
    /// value under the given label when one is present
    pub fn first_i64_logged(&self, label: &str) -> Result<i64, Error> {
        match self.first() {
            Some(_) => {
                let value = self.first_i64()?;
                log::info!("{}: {}", label, value);
                Ok(value)
            }
            None => Ok(0),
        }
    }

    /// Same as [`Record::first_date`], and additionally logs the parsed
    /// date under the given label when one is present
    pub fn first_date_logged(&self, label: &str) -> Result<Option<Date>, Error> {
        let value = self.first_date()?;
        if let Some(date) = value {
            log::info!("{}: {}", label, date);
        }
        Ok(value)
    }
}

/// Renders the raw line the record was parsed from
impl fmt::Display for Record<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.raw))
    }
}

fn malformed(raw: &[u8], line: usize) -> Error {
    Error::new(ErrorKind::MalformedRecord {
        line,
        raw: String::from_utf8_lossy(raw).into_owned(),
    })
}

pub(crate) fn invalid_number(value: &[u8]) -> Error {
    Error::new(ErrorKind::InvalidNumber {
        value: String::from_utf8_lossy(value).into_owned(),
    })
}

/// Parses a base-10 integer with an optional leading sign
pub(crate) fn to_i64(data: &[u8]) -> Option<i64> {
    let (sign, digits) = match data.split_first() {
        Some((b'-', rest)) => (-1, rest),
        Some((b'+', rest)) => (1, rest),
        _ => (1, data),
    };

    if digits.is_empty() {
        return None;
    }

    let mut result: i64 = 0;
    for &b in digits {
        if !b.is_ascii_digit() {
            return None;
        }

        result = result.checked_mul(10)?.checked_add(i64::from(b - b'0'))?;
    }

    Some(sign * result)
}

/// Parses a fixed-point real with an optional leading sign
///
/// Coordinate fields look like `+875297.17`. The integer and fraction parts
/// accumulate through checked integer arithmetic so an overlong field is
/// rejected rather than silently rounded.
pub(crate) fn to_f64(data: &[u8]) -> Option<f64> {
    let (sign, rest) = match data.split_first() {
        Some((b'-', rest)) => (-1.0, rest),
        Some((b'+', rest)) => (1.0, rest),
        _ => (1.0, data),
    };

    let (int_digits, frac_digits) = match rest.iter().position(|&b| b == b'.') {
        Some(dot) => (&rest[..dot], &rest[dot + 1..]),
        None => (rest, &b""[..]),
    };

    if int_digits.is_empty() && frac_digits.is_empty() {
        return None;
    }

    let mut int_part: i64 = 0;
    for &b in int_digits {
        if !b.is_ascii_digit() {
            return None;
        }

        int_part = int_part.checked_mul(10)?.checked_add(i64::from(b - b'0'))?;
    }

    let mut frac_part: i64 = 0;
    let mut divisor = 1.0;
    for &b in frac_digits {
        if !b.is_ascii_digit() {
            return None;
        }

        frac_part = frac_part.checked_mul(10)?.checked_add(i64::from(b - b'0'))?;
        divisor *= 10.0;
    }

    Some(sign * (int_part as f64 + frac_part as f64 / divisor))
}

use std::fmt;
use std::str::FromStr;

/// A date error.
#[derive(Debug, PartialEq, Eq)]
pub struct DateError;

impl std::error::Error for DateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl std::fmt::Display for DateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unable to decode date")
    }
}

const DAYS_PER_MONTH: [u8; 13] = [0, 31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

fn is_leap_year(year: i16) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

fn days_in_month(year: i16, month: u8) -> u8 {
    if month == 2 && is_leap_year(year) {
        29
    } else {
        DAYS_PER_MONTH[usize::from(month)]
    }
}

/// A civil calendar date without a time component
///
/// Date fields on the wire are eight ASCII digits (`YYYYMMDD`), so parsing
/// is strict: no separators, no padding variations, and the components must
/// name a day that exists in the proleptic Gregorian calendar (leap years
/// included).
///
/// ```
/// use edigeo::Date;
///
/// let date = Date::parse(b"20230115").unwrap();
/// assert_eq!(date.year(), 2023);
/// assert_eq!(date.month(), 1);
/// assert_eq!(date.day(), 15);
/// assert_eq!(date.to_string(), "2023-01-15");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    year: i16,
    month: u8,
    day: u8,
}

impl Date {
    /// Create a new date from year, month, and day parts
    ///
    /// Will return `None` if the date does not exist
    ///
    /// ```
    /// use edigeo::Date;
    /// assert_eq!(Date::from_ymd_opt(1997, 1, 5), Some(Date::from_ymd(1997, 1, 5)));
    /// assert_eq!(Date::from_ymd_opt(2024, 2, 29), Some(Date::from_ymd(2024, 2, 29)));
    /// assert!(Date::from_ymd_opt(2023, 2, 29).is_none());
    /// assert!(Date::from_ymd_opt(2023, 0, 1).is_none());
    /// assert!(Date::from_ymd_opt(2023, 13, 1).is_none());
    /// assert!(Date::from_ymd_opt(2023, 1, 0).is_none());
    /// assert!(Date::from_ymd_opt(2023, 12, 32).is_none());
    /// ```
    pub fn from_ymd_opt(year: i16, month: u8, day: u8) -> Option<Self> {
        if month == 0 || month > 12 || day == 0 || day > days_in_month(year, month) {
            return None;
        }

        Some(Date { year, month, day })
    }

    /// Create a new date from year, month, and day parts
    ///
    /// Will panic if the date does not exist.
    pub fn from_ymd(year: i16, month: u8, day: u8) -> Self {
        Self::from_ymd_opt(year, month, day).unwrap()
    }

    /// Parses the eight digit `YYYYMMDD` form and returns a new [`Date`] if
    /// valid
    ///
    /// ```
    /// use edigeo::Date;
    /// let date = Date::parse(b"19970105").unwrap();
    /// assert_eq!(date, Date::from_ymd(1997, 1, 5));
    /// assert!(Date::parse(b"1997-01-05").is_err());
    /// assert!(Date::parse(b"970105").is_err());
    /// ```
    pub fn parse<T: AsRef<[u8]>>(s: T) -> Result<Self, DateError> {
        let data = s.as_ref();
        if data.len() != 8 || !data.iter().all(u8::is_ascii_digit) {
            return Err(DateError);
        }

        // each component is at most four digits, so u16 accumulation is exact
        let num =
            |d: &[u8]| -> u16 { d.iter().fold(0, |acc, &b| acc * 10 + u16::from(b - b'0')) };
        let year = num(&data[..4]) as i16;
        let month = num(&data[4..6]) as u8;
        let day = num(&data[6..8]) as u8;
        Self::from_ymd_opt(year, month, day).ok_or(DateError)
    }

    /// Year of the date
    pub fn year(&self) -> i16 {
        self.year
    }

    /// Month of the date. Range: [1, 12]
    pub fn month(&self) -> u8 {
        self.month
    }

    /// Day of the date. Range: [1, 31]
    pub fn day(&self) -> u8 {
        self.day
    }
}

/// Formats a date in the ISO 8601 format: YYYY-MM-DD
///
/// ```
/// use edigeo::Date;
/// let date = Date::from_ymd(2002, 7, 1);
/// assert_eq!(date.to_string(), String::from("2002-07-01"));
/// ```
impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for Date {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.as_bytes())
    }
}

#[cfg(feature = "derive")]
mod datederive {
    use super::Date;
    use serde::{de, de::Visitor, Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;

    impl Serialize for Date {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(self.to_string().as_str())
        }
    }

    struct DateVisitor;

    impl<'de> Visitor<'de> for DateVisitor {
        type Value = Date;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a date")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            // accept the serialized ISO form alongside the wire form
            let data = v.as_bytes();
            let parsed = match data {
                [y @ .., b'-', m0, m1, b'-', d0, d1] if y.len() == 4 => {
                    let mut digits = [0u8; 8];
                    digits[..4].copy_from_slice(y);
                    digits[4..6].copy_from_slice(&[*m0, *m1]);
                    digits[6..8].copy_from_slice(&[*d0, *d1]);
                    Date::parse(digits)
                }
                _ => Date::parse(data),
            };

            parsed.map_err(|_e| de::Error::custom(format!("invalid date: {}", v)))
        }

        fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            self.visit_str(v.as_str())
        }
    }

    impl<'de> Deserialize<'de> for Date {
        fn deserialize<D>(deserializer: D) -> Result<Date, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_str(DateVisitor)
        }
    }
}

#[cfg(not(feature = "derive"))]
mod datederive {}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;
    use rstest::rstest;

    #[test]
    fn test_date_parse() {
        assert_eq!(Date::parse(b"20230115"), Ok(Date::from_ymd(2023, 1, 15)));
        assert_eq!(Date::parse(b"19970105"), Ok(Date::from_ymd(1997, 1, 5)));
        assert_eq!(Date::parse(b"00010101"), Ok(Date::from_ymd(1, 1, 1)));
        assert_eq!(Date::parse(b"99991231"), Ok(Date::from_ymd(9999, 12, 31)));
    }

    #[test]
    fn test_date_leap_years() {
        assert_eq!(Date::parse(b"20240229"), Ok(Date::from_ymd(2024, 2, 29)));
        assert_eq!(Date::parse(b"20000229"), Ok(Date::from_ymd(2000, 2, 29)));
        assert_eq!(Date::parse(b"20230229"), Err(DateError));
        assert_eq!(Date::parse(b"19000229"), Err(DateError));
        assert_eq!(Date::parse(b"19000228"), Ok(Date::from_ymd(1900, 2, 28)));
    }

    #[rstest]
    #[case(b"" as &[u8])]
    #[case(b"2023115")]
    #[case(b"202301150")]
    #[case(b"2023-1-15")]
    #[case(b"2023-01-15")]
    #[case(b"2023011a")]
    #[case(b"y0230115")]
    #[case(b"20230132")]
    #[case(b"20230100")]
    #[case(b"20230001")]
    #[case(b"20231301")]
    #[case(b"20230431")]
    fn test_date_parse_rejects(#[case] input: &[u8]) {
        assert_eq!(Date::parse(input), Err(DateError));
    }

    #[test]
    fn test_date_display() {
        assert_eq!(Date::from_ymd(2023, 1, 15).to_string(), "2023-01-15");
        assert_eq!(Date::from_ymd(45, 11, 3).to_string(), "0045-11-03");
    }

    #[test]
    fn test_date_from_str() {
        let date: Date = "20230115".parse().unwrap();
        assert_eq!(date, Date::from_ymd(2023, 1, 15));
        assert!("20230230".parse::<Date>().is_err());
    }

    #[test]
    fn test_date_ordering() {
        assert!(Date::from_ymd(2023, 1, 15) < Date::from_ymd(2023, 2, 1));
        assert!(Date::from_ymd(2022, 12, 31) < Date::from_ymd(2023, 1, 1));
        assert!(Date::from_ymd(2023, 1, 15) < Date::from_ymd(2023, 1, 16));
    }

    #[quickcheck]
    fn parse_format_roundtrip(year: u16, month: u8, day: u8) -> bool {
        let year = (year % 10000) as i16;
        match Date::from_ymd_opt(year, month, day) {
            Some(date) => {
                let wire = format!("{:04}{:02}{:02}", date.year(), date.month(), date.day());
                Date::parse(wire.as_bytes()) == Ok(date)
            }
            None => true,
        }
    }

    #[quickcheck]
    fn parse_never_panics(data: Vec<u8>) -> bool {
        let _ = Date::parse(&data);
        true
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_date_serde_roundtrip() {
        let date = Date::from_ymd(2023, 1, 15);
        let json = serde_json::to_string(&date).unwrap();
        assert_eq!(json, "\"2023-01-15\"");
        let back: Date = serde_json::from_str(&json).unwrap();
        assert_eq!(back, date);
        let wire: Date = serde_json::from_str("\"20230115\"").unwrap();
        assert_eq!(wire, date);
    }
}

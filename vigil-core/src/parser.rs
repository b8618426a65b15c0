//! Transport line parsing
//!
//! Turns one raw line such as `48, 2, 1, 512, 300, 1020` into a
//! [`FeatureRecord`]. Malformed, partial and header lines are expected on a
//! serial link (boot banners, lines cut by a board reset) and are rejected
//! without side effects.

use crate::constants::{
    DEFAULT_FIELD_DELIMITER, DEFAULT_HEADER_PREFIXES, PRESENCE_FIELD_INDEX, SENSOR_FIELDS,
};
use crate::errors::ParseError;
use crate::record::{FeatureRecord, Presence};

/// Parser for delimited sensor lines
///
/// ## Example
///
/// ```rust
/// use vigil_core::{Presence, SampleParser};
///
/// let parser = SampleParser::default();
/// let record = parser.parse("48, 2, 1, 512, 300, 1020").unwrap();
/// assert_eq!(record.presence, Presence::Detected);
///
/// assert!(parser.parse("48,2,1").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct SampleParser {
    delimiter: char,
    header_prefixes: Vec<String>,
}

impl Default for SampleParser {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_FIELD_DELIMITER,
            header_prefixes: DEFAULT_HEADER_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

impl SampleParser {
    /// Create a parser with the default delimiter and header prefixes
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the field delimiter
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Replace the header prefixes (matched case-insensitively)
    pub fn with_header_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header_prefixes = prefixes
            .into_iter()
            .map(|p| p.into().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        self
    }

    /// Whether the line is a column header
    pub fn is_header(&self, line: &str) -> bool {
        let line = line.trim_start().to_lowercase();
        self.header_prefixes.iter().any(|p| line.starts_with(p.as_str()))
    }

    /// Parse a line, discarding the rejection reason
    pub fn parse(&self, line: &str) -> Option<FeatureRecord> {
        self.try_parse(line).ok()
    }

    /// Parse a line into a record
    pub fn try_parse(&self, line: &str) -> Result<FeatureRecord, ParseError> {
        if line.trim().is_empty() {
            return Err(ParseError::Empty);
        }
        if self.is_header(line) {
            return Err(ParseError::Header);
        }

        let mut fields: heapless::Vec<&str, SENSOR_FIELDS> = heapless::Vec::new();
        let mut found = 0;
        for token in line.split(self.delimiter).map(str::trim).filter(|t| !t.is_empty()) {
            found += 1;
            // Keep counting past capacity so the error reports the real width
            let _ = fields.push(token);
        }

        if found == 0 {
            return Err(ParseError::Empty);
        }
        if found != SENSOR_FIELDS {
            return Err(ParseError::FieldCount {
                expected: SENSOR_FIELDS,
                found,
            });
        }

        let int = |index: usize| -> Result<i32, ParseError> {
            fields[index]
                .parse::<i32>()
                .map_err(|_| ParseError::InvalidInteger { index })
        };

        Ok(FeatureRecord {
            humidity: int(0)?,
            vibration: int(1)?,
            presence: Presence::from_token(fields[PRESENCE_FIELD_INDEX]),
            pots: [int(3)?, int(4)?, int(5)?],
        })
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::data::format::NumberFormat;
use crate::error::{DataError, Result};

/// The classic option keys accepted by [`DatasetOptions::set`].
pub const OPTION_KEYS: [&str; 6] = [
    "delimiter",
    "fmt",
    "loader",
    "added_header",
    "fillna",
    "fillna_value",
];

/// Keys accepted in addition to [`OPTION_KEYS`].
pub const EXTENDED_OPTION_KEYS: [&str; 1] = ["comments"];

// ---------------------------------------------------------------------------
// LoaderKind – which table parser backend to use
// ---------------------------------------------------------------------------

/// Numeric table backend. Both honour the same header-skip fallback and
/// fill policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoaderKind {
    /// Record-by-record parsing with the `csv` crate.
    #[default]
    Csv,
    /// Arrow's CSV reader, decoded into string batches.
    Arrow,
}

impl FromStr for LoaderKind {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "csv" => Ok(LoaderKind::Csv),
            "arrow" => Ok(LoaderKind::Arrow),
            other => Err(DataError::UnsupportedLoader(other.to_string())),
        }
    }
}

impl fmt::Display for LoaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoaderKind::Csv => write!(f, "csv"),
            LoaderKind::Arrow => write!(f, "arrow"),
        }
    }
}

// ---------------------------------------------------------------------------
// DatasetOptions
// ---------------------------------------------------------------------------

/// Load/save options for a [`crate::Dataset`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatasetOptions {
    /// Field delimiter for both reading and writing.
    #[serde(deserialize_with = "de_delimiter")]
    pub delimiter: u8,
    /// Number format used when writing.
    #[serde(deserialize_with = "de_from_str")]
    pub fmt: NumberFormat,
    #[serde(deserialize_with = "de_from_str")]
    pub loader: LoaderKind,
    /// Header of the derived (row sum) column.
    pub added_header: String,
    /// Replace missing or unparseable cells with `fillna_value`.
    pub fillna: bool,
    pub fillna_value: f64,
    /// Prefix for the header line on output; also stripped on input.
    pub comments: String,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        DatasetOptions {
            delimiter: b',',
            fmt: NumberFormat::default(),
            loader: LoaderKind::default(),
            added_header: "synthetic wave".to_string(),
            fillna: true,
            fillna_value: 0.0,
            comments: "# ".to_string(),
        }
    }
}

impl DatasetOptions {
    /// Update one option from its textual form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = |reason: String| DataError::InvalidOptionValue {
            key: key.to_string(),
            value: value.to_string(),
            reason,
        };

        match key {
            "delimiter" => self.delimiter = parse_delimiter(value).map_err(invalid)?,
            "fmt" => {
                self.fmt = value
                    .parse::<NumberFormat>()
                    .map_err(|e| invalid(e.reason))?
            }
            "loader" => self.loader = value.parse()?,
            "added_header" => self.added_header = value.to_string(),
            "fillna" => {
                self.fillna = value
                    .parse()
                    .map_err(|_| invalid("expected `true` or `false`".to_string()))?
            }
            "fillna_value" => {
                self.fillna_value = value
                    .trim()
                    .parse()
                    .map_err(|_| invalid("expected a number".to_string()))?
            }
            "comments" => self.comments = value.to_string(),
            other => return Err(DataError::InvalidOption(other.to_string())),
        }
        Ok(())
    }

    /// Apply several updates; on any failure nothing is changed.
    pub fn set_many<'a>(&mut self, updates: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<()> {
        let mut next = self.clone();
        for (key, value) in updates {
            next.set(key, value)?;
        }
        *self = next;
        Ok(())
    }

    /// Delimiter as a `char`, for joining header fields.
    pub fn delimiter_char(&self) -> char {
        self.delimiter as char
    }
}

fn parse_delimiter(value: &str) -> std::result::Result<u8, String> {
    let value = match value {
        "\\t" | "tab" => "\t",
        other => other,
    };
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() && c != '\n' && c != '\r' && c != '"' => Ok(c as u8),
        _ => Err("expected a single ASCII character".to_string()),
    }
}

fn de_delimiter<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<u8, D::Error> {
    let s = String::deserialize(de)?;
    parse_delimiter(&s).map_err(serde::de::Error::custom)
}

fn de_from_str<'de, D, T>(de: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let s = String::deserialize(de)?;
    s.parse().map_err(serde::de::Error::custom)
}

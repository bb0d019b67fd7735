//! Record kinds, periodicities and data-path codes.
//!
//! The path layer addresses a dataset by instrument path plus a short
//! data-path code combining the data kind and the periodicity, e.g. `c_m03`
//! for 3-minute bars or `j_m03` for their adjusted counterpart.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, CodecResult};

/// The physical record layout stored in a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RecordKind {
    /// `Trade` records.
    Trade = 1,
    /// `Quote` records.
    Quote = 2,
    /// `Ohlcv` records.
    Ohlcv = 3,
    /// `Scalar` records.
    Scalar = 4,
}

impl RecordKind {
    /// Returns the tag stored in file headers.
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Parses a header tag.
    pub fn from_u8(tag: u8) -> CodecResult<Self> {
        match tag {
            1 => Ok(Self::Trade),
            2 => Ok(Self::Quote),
            3 => Ok(Self::Ohlcv),
            4 => Ok(Self::Scalar),
            other => Err(CodecError::UnknownRecordKind(other)),
        }
    }

    /// Returns a lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Trade => "trade",
            Self::Quote => "quote",
            Self::Ohlcv => "ohlcv",
            Self::Scalar => "scalar",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The kind of series as addressed by the path layer.
///
/// Adjusted variants share the record layout of their raw counterpart but
/// live in a separate dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataKind {
    /// Executed trades.
    Trade,
    /// Top-of-book quotes.
    Quote,
    /// Price bars.
    Ohlcv,
    /// Price bars adjusted for splits and dividends.
    OhlcvAdjusted,
    /// Scalar series, e.g. closing prices.
    Scalar,
    /// Adjusted scalar series.
    ScalarAdjusted,
}

impl DataKind {
    /// All data kinds.
    pub const ALL: [Self; 6] = [
        Self::Trade,
        Self::Quote,
        Self::Ohlcv,
        Self::OhlcvAdjusted,
        Self::Scalar,
        Self::ScalarAdjusted,
    ];

    /// Returns the one-letter code used in data paths.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Trade => 't',
            Self::Quote => 'q',
            Self::Ohlcv => 'c',
            Self::OhlcvAdjusted => 'j',
            Self::Scalar => 's',
            Self::ScalarAdjusted => 'a',
        }
    }

    /// Parses a one-letter code.
    pub fn from_code(code: char) -> CodecResult<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.code() == code)
            .ok_or_else(|| CodecError::UnknownDataKind(code.to_string()))
    }

    /// Returns the record layout of this kind.
    #[must_use]
    pub const fn record_kind(self) -> RecordKind {
        match self {
            Self::Trade => RecordKind::Trade,
            Self::Quote => RecordKind::Quote,
            Self::Ohlcv | Self::OhlcvAdjusted => RecordKind::Ohlcv,
            Self::Scalar | Self::ScalarAdjusted => RecordKind::Scalar,
        }
    }

    /// Returns true if datasets of this kind can have the given periodicity.
    ///
    /// Trades and quotes are event series and must be aperiodic; bars must
    /// have a period; scalars may be either.
    #[must_use]
    pub fn accepts(self, periodicity: Periodicity) -> bool {
        match self {
            Self::Trade | Self::Quote => periodicity == Periodicity::Aperiodic,
            Self::Ohlcv | Self::OhlcvAdjusted => periodicity != Periodicity::Aperiodic,
            Self::Scalar | Self::ScalarAdjusted => true,
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Sampling period of a series.
///
/// Multipliers of seconds, minutes and hours must lie in `1..=99`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Periodicity {
    /// Event series without a fixed period.
    Aperiodic,
    /// N seconds.
    Second(u8),
    /// N minutes.
    Minute(u8),
    /// N hours.
    Hour(u8),
    /// One day.
    Day,
    /// One week.
    Week,
    /// One month.
    Month,
    /// One quarter.
    Quarter,
    /// One year.
    Year,
}

impl Periodicity {
    /// Returns true if the multiplier (if any) is in range.
    #[must_use]
    pub fn is_valid(self) -> bool {
        match self {
            Self::Second(n) | Self::Minute(n) | Self::Hour(n) => (1..=99).contains(&n),
            _ => true,
        }
    }

    /// Returns the three-character code used in data paths.
    #[must_use]
    pub fn code(self) -> String {
        match self {
            Self::Aperiodic => "tck".to_string(),
            Self::Second(n) => format!("s{:02}", n),
            Self::Minute(n) => format!("m{:02}", n),
            Self::Hour(n) => format!("h{:02}", n),
            Self::Day => "d01".to_string(),
            Self::Week => "w01".to_string(),
            Self::Month => "mo1".to_string(),
            Self::Quarter => "qu1".to_string(),
            Self::Year => "y01".to_string(),
        }
    }

    /// Parses a three-character code.
    pub fn from_code(code: &str) -> CodecResult<Self> {
        let invalid = || CodecError::InvalidPeriodicity(code.to_string());
        let fixed = match code {
            "tck" => Some(Self::Aperiodic),
            "d01" => Some(Self::Day),
            "w01" => Some(Self::Week),
            "mo1" => Some(Self::Month),
            "qu1" => Some(Self::Quarter),
            "y01" => Some(Self::Year),
            _ => None,
        };
        if let Some(periodicity) = fixed {
            return Ok(periodicity);
        }

        if code.len() != 3 || !code.is_ascii() {
            return Err(invalid());
        }
        let (unit, digits) = code.split_at(1);
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let n: u8 = digits.parse().map_err(|_| invalid())?;
        let periodicity = match unit {
            "s" => Self::Second(n),
            "m" => Self::Minute(n),
            "h" => Self::Hour(n),
            _ => return Err(invalid()),
        };
        if periodicity.is_valid() {
            Ok(periodicity)
        } else {
            Err(invalid())
        }
    }
}

impl fmt::Display for Periodicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

/// Short code identifying a dataset within an instrument: `{kind}_{period}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataPath {
    kind: DataKind,
    periodicity: Periodicity,
}

impl DataPath {
    /// Creates a data path, checking that the combination is allowed.
    pub fn new(kind: DataKind, periodicity: Periodicity) -> CodecResult<Self> {
        if !periodicity.is_valid() {
            return Err(CodecError::InvalidPeriodicity(periodicity.code()));
        }
        if !kind.accepts(periodicity) {
            return Err(CodecError::IncompatiblePeriodicity {
                kind: kind.code().to_string(),
                periodicity: periodicity.code(),
            });
        }
        Ok(Self { kind, periodicity })
    }

    /// Returns the data kind.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> DataKind {
        self.kind
    }

    /// Returns the periodicity.
    #[inline]
    #[must_use]
    pub const fn periodicity(&self) -> Periodicity {
        self.periodicity
    }

    /// Returns the record layout stored under this data path.
    #[inline]
    #[must_use]
    pub const fn record_kind(&self) -> RecordKind {
        self.kind.record_kind()
    }
}

impl fmt::Display for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.kind.code(), self.periodicity.code())
    }
}

impl FromStr for DataPath {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, period) = s
            .split_once('_')
            .ok_or_else(|| CodecError::invalid_data_path(s, "missing '_' separator"))?;

        let mut chars = kind.chars();
        let code = match (chars.next(), chars.next()) {
            (Some(code), None) => code,
            _ => return Err(CodecError::invalid_data_path(s, "kind must be one letter")),
        };

        let kind = DataKind::from_code(code)?;
        let periodicity = Periodicity::from_code(period)?;
        Self::new(kind, periodicity)
    }
}

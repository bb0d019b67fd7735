//! Record types and the abstractions the engine is generic over.
//!
//! Every record is a plain value with an `i64` ticks key and a fixed-width,
//! little-endian binary encoding (ticks first, then the payload fields in
//! declaration order).

use std::fmt;

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

use super::kind::RecordKind;

/// A value keyed by ticks.
pub trait Keyed: Copy {
    /// Returns the ticks key.
    fn ticks(&self) -> i64;

    /// Returns a copy of this value carrying a different ticks key.
    #[must_use]
    fn with_ticks(self, ticks: i64) -> Self;
}

/// A record that can be stored in a dataset.
pub trait Record: Keyed + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// The record kind stored in file headers.
    const KIND: RecordKind;

    /// Encoded size in bytes.
    const ENCODED_LEN: usize;

    /// Appends the encoded record to `buf`.
    fn encode<B: BufMut>(&self, buf: &mut B);

    /// Decodes a record from `buf`.
    ///
    /// The caller guarantees at least `ENCODED_LEN` remaining bytes.
    fn decode<B: Buf>(buf: &mut B) -> Self;
}

/// An executed trade.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Trade {
    /// Time key.
    pub ticks: i64,
    /// Trade price.
    pub price: f64,
    /// Traded volume.
    pub volume: f64,
}

impl Trade {
    /// Creates a new trade.
    #[must_use]
    pub const fn new(ticks: i64, price: f64, volume: f64) -> Self {
        Self {
            ticks,
            price,
            volume,
        }
    }
}

impl Keyed for Trade {
    #[inline]
    fn ticks(&self) -> i64 {
        self.ticks
    }

    #[inline]
    fn with_ticks(self, ticks: i64) -> Self {
        Self { ticks, ..self }
    }
}

impl Record for Trade {
    const KIND: RecordKind = RecordKind::Trade;
    const ENCODED_LEN: usize = 24;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_i64_le(self.ticks);
        buf.put_f64_le(self.price);
        buf.put_f64_le(self.volume);
    }

    fn decode<B: Buf>(buf: &mut B) -> Self {
        Self {
            ticks: buf.get_i64_le(),
            price: buf.get_f64_le(),
            volume: buf.get_f64_le(),
        }
    }
}

/// A top-of-book quote.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Quote {
    /// Time key.
    pub ticks: i64,
    /// Best bid price.
    pub bid: f64,
    /// Best ask price.
    pub ask: f64,
    /// Size available at the bid.
    pub bid_size: f64,
    /// Size available at the ask.
    pub ask_size: f64,
}

impl Quote {
    /// Creates a new quote.
    #[must_use]
    pub const fn new(ticks: i64, bid: f64, ask: f64, bid_size: f64, ask_size: f64) -> Self {
        Self {
            ticks,
            bid,
            ask,
            bid_size,
            ask_size,
        }
    }

    /// Returns the mid price.
    #[must_use]
    pub fn mid(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }

    /// Returns the bid/ask spread.
    #[must_use]
    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }
}

impl Keyed for Quote {
    #[inline]
    fn ticks(&self) -> i64 {
        self.ticks
    }

    #[inline]
    fn with_ticks(self, ticks: i64) -> Self {
        Self { ticks, ..self }
    }
}

impl Record for Quote {
    const KIND: RecordKind = RecordKind::Quote;
    const ENCODED_LEN: usize = 40;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_i64_le(self.ticks);
        buf.put_f64_le(self.bid);
        buf.put_f64_le(self.ask);
        buf.put_f64_le(self.bid_size);
        buf.put_f64_le(self.ask_size);
    }

    fn decode<B: Buf>(buf: &mut B) -> Self {
        Self {
            ticks: buf.get_i64_le(),
            bid: buf.get_f64_le(),
            ask: buf.get_f64_le(),
            bid_size: buf.get_f64_le(),
            ask_size: buf.get_f64_le(),
        }
    }
}

/// An open/high/low/close/volume bar, keyed by the bar's ticks.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Ohlcv {
    /// Time key.
    pub ticks: i64,
    /// Opening price.
    pub open: f64,
    /// Highest price.
    pub high: f64,
    /// Lowest price.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Volume traded during the bar.
    pub volume: f64,
}

impl Ohlcv {
    /// Creates a new bar.
    #[must_use]
    pub const fn new(ticks: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            ticks,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl Keyed for Ohlcv {
    #[inline]
    fn ticks(&self) -> i64 {
        self.ticks
    }

    #[inline]
    fn with_ticks(self, ticks: i64) -> Self {
        Self { ticks, ..self }
    }
}

impl Record for Ohlcv {
    const KIND: RecordKind = RecordKind::Ohlcv;
    const ENCODED_LEN: usize = 48;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_i64_le(self.ticks);
        buf.put_f64_le(self.open);
        buf.put_f64_le(self.high);
        buf.put_f64_le(self.low);
        buf.put_f64_le(self.close);
        buf.put_f64_le(self.volume);
    }

    fn decode<B: Buf>(buf: &mut B) -> Self {
        Self {
            ticks: buf.get_i64_le(),
            open: buf.get_f64_le(),
            high: buf.get_f64_le(),
            low: buf.get_f64_le(),
            close: buf.get_f64_le(),
            volume: buf.get_f64_le(),
        }
    }
}

/// A single scalar observation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Scalar {
    /// Time key.
    pub ticks: i64,
    /// Observed value.
    pub value: f64,
}

impl Scalar {
    /// Creates a new scalar.
    #[must_use]
    pub const fn new(ticks: i64, value: f64) -> Self {
        Self { ticks, value }
    }
}

impl Keyed for Scalar {
    #[inline]
    fn ticks(&self) -> i64 {
        self.ticks
    }

    #[inline]
    fn with_ticks(self, ticks: i64) -> Self {
        Self { ticks, ..self }
    }
}

impl Record for Scalar {
    const KIND: RecordKind = RecordKind::Scalar;
    const ENCODED_LEN: usize = 16;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_i64_le(self.ticks);
        buf.put_f64_le(self.value);
    }

    fn decode<B: Buf>(buf: &mut B) -> Self {
        Self {
            ticks: buf.get_i64_le(),
            value: buf.get_f64_le(),
        }
    }
}

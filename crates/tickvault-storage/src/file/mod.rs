//! Fixed-width dataset files.
//!
//! A dataset file is a 64-byte header followed by `count` records, each
//! encoded in exactly `Record::ENCODED_LEN` bytes:
//!
//! ```text
//! ┌──────────────┬──────────┬──────────┬─────┬──────────────┐
//! │ header (64B) │ record 0 │ record 1 │ ... │ record n - 1 │
//! └──────────────┴──────────┴──────────┴─────┴──────────────┘
//! ```
//!
//! Record `i` starts at byte `64 + i * ENCODED_LEN`, so segment reads and
//! writes are single positioned I/O calls. Inserts and deletes shift the
//! tail in bounded chunks.

mod backend;
mod header;
mod options;

pub use backend::FileBackend;
pub use header::FileHeader;
pub use options::OpenOptions;

//! RangeLink: a compact text reference to a file and a range of lines/columns.
//!
//! ```text
//! src/foo.ts#L10            one line
//! src/foo.ts#L10-L20        lines 10 through 20
//! src/foo.ts#L10C5-L10C16   columns 5 to 16 on line 10
//! src/foo.ts##L2C6-L4C10    column block, lines 2-4
//! src/foo.ts#L10~#~L~-~C~   portable: carries its own delimiters
//! ```
//!
//! The flow is selection → [`selection::normalize`] → [`encoder::encode`]
//! for producing links, and text → [`decoder::decode`] for reading them.
//! Delimiters are configurable and checked by [`delimiters::validate`].

pub mod config;
pub mod decoder;
pub mod delimiters;
pub mod diagnostics;
pub mod document;
pub mod encoder;
pub mod error;
pub mod logging;
pub mod scanner;
pub mod selection;
pub mod types;

pub use decoder::{decode, find_links};
pub use delimiters::{DelimiterConfig, RawDelimiters, validate};
pub use encoder::encode;
pub use error::Error;
pub use selection::normalize;
pub use types::{Coverage, FormattedLink, InputSelection, LinkType, ParsedLink, Position, Selection, SelectionType};

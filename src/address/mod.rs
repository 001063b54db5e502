//! Address parsing: display name, local part, domain.
//!
//! Pure string work, no DNS and no cache access. The entry points are
//! [`Address::parse`], [`Address::split`] and [`Address::parse_bytes`].

mod parse;
mod types;

pub(crate) use parse::domain_part;
pub use types::{Address, FormatError, INVALID_FORMAT};

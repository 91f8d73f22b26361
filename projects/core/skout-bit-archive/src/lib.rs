#![doc = include_str!(concat!("../", core::env!("CARGO_PKG_README")))]
#![no_std]
#![warn(missing_docs)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod codec;
pub mod error;
pub mod format;
pub mod read;

#[cfg(feature = "std")]
pub mod write;

pub use error::{CodecError, ReadError};
pub use format::{Archive, CompressionKind, Entry, Ident, TexturePalette};
pub use read::read_archive;

#[cfg(feature = "std")]
pub use write::{write_archive, WriteError};

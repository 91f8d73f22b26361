#![doc = include_str!(concat!("../", core::env!("CARGO_PKG_README")))]
#![no_std]
#![warn(missing_docs)]

#[cfg(feature = "std")]
extern crate std;

pub mod palette;
pub mod texture;

pub use palette::{palette_number_from_id, read_palette, PaletteColor, PALETTE_COLOR_COUNT};
pub use texture::{Kind, PixelSink, Texture, TextureError};

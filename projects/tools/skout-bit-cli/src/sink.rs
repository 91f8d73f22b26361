//! [`PixelSink`] backed by an [`image::RgbaImage`].

use image::{Rgba, RgbaImage};
use skout_bit_texture::{Kind, PixelSink};

/// Collects decoded pixels into an RGBA image, allocated lazily in `begin`.
#[derive(Debug, Default)]
pub struct ImageSink {
    image: Option<RgbaImage>,
}

impl ImageSink {
    /// Returns the decoded image, or [`None`] if no decode ran.
    pub fn into_image(self) -> Option<RgbaImage> {
        self.image
    }
}

impl PixelSink for ImageSink {
    fn begin(&mut self, width: u32, height: u32, _kind: Kind) {
        self.image = Some(RgbaImage::new(width, height));
    }

    fn set_pixel(&mut self, x: u32, y: u32, argb: u32) {
        if let Some(image) = &mut self.image {
            let [a, r, g, b] = argb.to_be_bytes();
            image.put_pixel(x, y, Rgba([r, g, b, a]));
        }
    }

    fn end(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_pixels_in_rgba_order() {
        let mut sink = ImageSink::default();
        sink.begin(2, 1, Kind::Argb8888);
        sink.set_pixel(0, 0, 0x80FF0000); // half-transparent red
        sink.set_pixel(1, 0, 0xFF00FF00); // opaque green
        sink.end();

        let image = sink.into_image().unwrap();
        assert_eq!(image.dimensions(), (2, 1));
        assert_eq!(image.get_pixel(0, 0).0, [0xFF, 0x00, 0x00, 0x80]);
        assert_eq!(image.get_pixel(1, 0).0, [0x00, 0xFF, 0x00, 0xFF]);
    }
}

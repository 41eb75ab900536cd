//! Immutable RGBA8 pixel buffers and nearest-neighbor resampling.

use crate::error::Error;

/// A decoded grid of RGBA pixel bytes plus dimensions.
///
/// Row-major RGBA8, not premultiplied. Instances never mutate once built;
/// [`RasterBuffer::scale`] allocates a new buffer. Share snapshots with
/// `Arc<RasterBuffer>` so a buffer is freed exactly when the last history
/// entry or live view drops it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterBuffer {
    /// Wrap raw RGBA8 bytes.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedFormat`] unless
    /// `pixels.len() == width * height * 4`.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, Error> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(Error::UnsupportedFormat(format!(
                "{width}x{height} raster needs {expected} bytes, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Take ownership of an already-decoded RGBA8 image.
    #[must_use]
    pub fn from_rgba(image: image::RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            pixels: image.into_raw(),
        }
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Whether either dimension is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Nearest-neighbor resample by independent axis factors.
    ///
    /// Output dimensions are `trunc(width * sx)` by `trunc(height * sy)`;
    /// destination pixel `(i, j)` samples source `(trunc(i / sx),
    /// trunc(j / sy))` clamped to bounds. A zero-sized result is valid.
    /// `scale(1, 1)` is a plain copy with no resampling pass.
    #[must_use]
    pub fn scale(&self, sx: f64, sy: f64) -> Self {
        if sx == 1.0 && sy == 1.0 {
            return self.clone();
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let dst_w = (f64::from(self.width) * sx).trunc().max(0.0) as u32;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let dst_h = (f64::from(self.height) * sy).trunc().max(0.0) as u32;

        let mut pixels = vec![0u8; dst_w as usize * dst_h as usize * 4];

        for j in 0..dst_h {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let sj = ((f64::from(j) / sy).trunc().max(0.0) as u32).min(self.height - 1);
            let src_row = (sj as usize * self.width as usize) * 4;
            let dst_row = (j as usize * dst_w as usize) * 4;

            for i in 0..dst_w {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let si = ((f64::from(i) / sx).trunc().max(0.0) as u32).min(self.width - 1);
                let src = src_row + si as usize * 4;
                let dst = dst_row + i as usize * 4;
                pixels[dst..dst + 4].copy_from_slice(&self.pixels[src..src + 4]);
            }
        }

        Self {
            width: dst_w,
            height: dst_h,
            pixels,
        }
    }
}

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// A rendered frame as RGBA8 pixels.
///
/// Frames read back from a [`crate::Surface`] are **premultiplied alpha**. The `premultiplied`
/// flag makes this explicit at API boundaries.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)` as stored, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Convert to straight (non-premultiplied) RGBA8, as expected by PNG encoders.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if !self.premultiplied {
            return out;
        }
        for px in out.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 {
                px[0] = 0;
                px[1] = 0;
                px[2] = 0;
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_reads_row_major_and_rejects_out_of_bounds() {
        let frame = FrameRGBA {
            width: 2,
            height: 1,
            data: vec![1, 2, 3, 4, 5, 6, 7, 8],
            premultiplied: true,
        };
        assert_eq!(frame.pixel(1, 0), Some([5, 6, 7, 8]));
        assert_eq!(frame.pixel(2, 0), None);
        assert_eq!(frame.pixel(0, 1), None);
    }

    #[test]
    fn straight_conversion_undoes_premultiplication() {
        let frame = FrameRGBA {
            width: 2,
            height: 1,
            data: vec![128, 0, 0, 128, 9, 9, 9, 0],
            premultiplied: true,
        };
        let straight = frame.to_straight_rgba8();
        assert_eq!(&straight[..4], &[255, 0, 0, 128]);
        assert_eq!(&straight[4..], &[0, 0, 0, 0]);
    }
}

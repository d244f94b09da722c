//! Frame preprocessing: noise-reducing blur and adaptive threshold

use crate::drivers::Frame;

/// Box blur radius (5x5 window)
pub const BLUR_RADIUS: u32 = 2;

/// Adaptive threshold neighborhood radius (11x11 window)
pub const THRESHOLD_RADIUS: u32 = 5;

/// Bias subtracted from the local mean before comparison
pub const THRESHOLD_BIAS: i32 = 2;

/// Summed-area table over pixel intensities, one extra row/column of
/// zeros so window sums need no bounds special-casing.
struct Integral {
    width: usize,
    sums: Vec<u64>,
}

impl Integral {
    fn new(frame: &Frame) -> Self {
        let (w, h) = (frame.width() as usize, frame.height() as usize);
        let width = w + 1;
        let mut sums = vec![0u64; width * (h + 1)];
        for y in 0..h {
            let mut row_sum = 0u64;
            for x in 0..w {
                row_sum += frame.get_pixel(x as u32, y as u32).0[0] as u64;
                sums[(y + 1) * width + (x + 1)] = sums[y * width + (x + 1)] + row_sum;
            }
        }
        Self { width, sums }
    }

    /// Mean intensity over the clamped window centered at (x, y).
    fn window_mean(&self, x: u32, y: u32, radius: u32, w: u32, h: u32) -> u32 {
        let x0 = x.saturating_sub(radius) as usize;
        let y0 = y.saturating_sub(radius) as usize;
        let x1 = ((x + radius).min(w - 1) + 1) as usize;
        let y1 = ((y + radius).min(h - 1) + 1) as usize;

        let sum = self.sums[y1 * self.width + x1] + self.sums[y0 * self.width + x0]
            - self.sums[y0 * self.width + x1]
            - self.sums[y1 * self.width + x0];
        let count = ((x1 - x0) * (y1 - y0)) as u64;
        (sum / count) as u32
    }
}

/// Box blur with a clamped square window.
pub fn box_blur(frame: &Frame, radius: u32) -> Frame {
    let (w, h) = (frame.width(), frame.height());
    let integral = Integral::new(frame);
    let mut out = Frame::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let mean = integral.window_mean(x, y, radius, w, h);
            out.put_pixel(x, y, image::Luma([mean as u8]));
        }
    }
    out
}

/// Adaptive mean threshold.
///
/// Foreground (255) where a pixel is darker than its local mean by more
/// than `bias` - grid lines are dark on a light floor, and the local
/// comparison keeps the mask robust to uneven lighting.
pub fn adaptive_threshold(frame: &Frame, radius: u32, bias: i32) -> Frame {
    let (w, h) = (frame.width(), frame.height());
    let integral = Integral::new(frame);
    let mut out = Frame::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let mean = integral.window_mean(x, y, radius, w, h) as i32;
            let pixel = frame.get_pixel(x, y).0[0] as i32;
            let value = if pixel + bias < mean { 255 } else { 0 };
            out.put_pixel(x, y, image::Luma([value]));
        }
    }
    out
}

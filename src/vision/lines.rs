//! Grid line extraction from the binary mask
//!
//! Morphological opening with a long-and-thin structuring element
//! isolates lines along one axis; connected components of the opened
//! mask become line segments via their bounding boxes.

use crate::drivers::Frame;

/// Structuring element length (25x1 horizontal, 1x25 vertical)
pub const LINE_KERNEL_LEN: u32 = 25;

/// Axis a structuring element stretches along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAxis {
    Horizontal,
    Vertical,
}

/// Axis-aligned line segment as a bounding box with exclusive ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSegment {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl LineSegment {
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    pub fn mid_x(&self) -> u32 {
        (self.x0 + self.x1) / 2
    }

    pub fn mid_y(&self) -> u32 {
        (self.y0 + self.y1) / 2
    }
}

/// Morphological opening (erosion then dilation) with a 1-D structuring
/// element of `len` pixels along `axis`. Pixels outside the frame count
/// as background during erosion.
pub fn open_1d(mask: &Frame, axis: LineAxis, len: u32) -> Frame {
    let eroded = erode_1d(mask, axis, len);
    dilate_1d(&eroded, axis, len)
}

fn element_range(center: u32, len: u32, limit: u32) -> Option<(u32, u32)> {
    let half = len / 2;
    if center < half {
        return None;
    }
    let start = center - half;
    let end = start + len;
    if end > limit {
        return None;
    }
    Some((start, end))
}

fn erode_1d(mask: &Frame, axis: LineAxis, len: u32) -> Frame {
    let (w, h) = (mask.width(), mask.height());
    let mut out = Frame::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let keep = match axis {
                LineAxis::Horizontal => element_range(x, len, w)
                    .map(|(start, end)| (start..end).all(|i| mask.get_pixel(i, y).0[0] == 255)),
                LineAxis::Vertical => element_range(y, len, h)
                    .map(|(start, end)| (start..end).all(|i| mask.get_pixel(x, i).0[0] == 255)),
            };
            if keep == Some(true) {
                out.put_pixel(x, y, image::Luma([255]));
            }
        }
    }
    out
}

fn dilate_1d(mask: &Frame, axis: LineAxis, len: u32) -> Frame {
    let (w, h) = (mask.width(), mask.height());
    let half = len / 2;
    let mut out = Frame::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let hit = match axis {
                LineAxis::Horizontal => {
                    let start = x.saturating_sub(half);
                    let end = (x + half + 1).min(w);
                    (start..end).any(|i| mask.get_pixel(i, y).0[0] == 255)
                }
                LineAxis::Vertical => {
                    let start = y.saturating_sub(half);
                    let end = (y + half + 1).min(h);
                    (start..end).any(|i| mask.get_pixel(x, i).0[0] == 255)
                }
            };
            if hit {
                out.put_pixel(x, y, image::Luma([255]));
            }
        }
    }
    out
}

/// Bounding boxes of 4-connected foreground components, keeping only
/// segments longer than `min_len` along `axis`. Components are found in
/// row-major scan order, so segment order is deterministic.
pub fn extract_segments(mask: &Frame, axis: LineAxis, min_len: u32) -> Vec<LineSegment> {
    let (w, h) = (mask.width(), mask.height());
    let mut visited = vec![false; (w * h) as usize];
    let mut segments = Vec::new();
    let index = |x: u32, y: u32| (y * w + x) as usize;

    for y in 0..h {
        for x in 0..w {
            if visited[index(x, y)] || mask.get_pixel(x, y).0[0] != 255 {
                continue;
            }

            // Flood-fill one component, tracking its bounding box
            let (mut min_x, mut min_y, mut max_x, mut max_y) = (x, y, x, y);
            let mut stack = vec![(x, y)];
            visited[index(x, y)] = true;

            while let Some((cx, cy)) = stack.pop() {
                min_x = min_x.min(cx);
                max_x = max_x.max(cx);
                min_y = min_y.min(cy);
                max_y = max_y.max(cy);

                let mut neighbors = Vec::with_capacity(4);
                if cx > 0 {
                    neighbors.push((cx - 1, cy));
                }
                if cx + 1 < w {
                    neighbors.push((cx + 1, cy));
                }
                if cy > 0 {
                    neighbors.push((cx, cy - 1));
                }
                if cy + 1 < h {
                    neighbors.push((cx, cy + 1));
                }
                for (nx, ny) in neighbors {
                    if !visited[index(nx, ny)] && mask.get_pixel(nx, ny).0[0] == 255 {
                        visited[index(nx, ny)] = true;
                        stack.push((nx, ny));
                    }
                }
            }

            let segment = LineSegment {
                x0: min_x,
                y0: min_y,
                x1: max_x + 1,
                y1: max_y + 1,
            };
            let long_enough = match axis {
                LineAxis::Horizontal => segment.width() > min_len,
                LineAxis::Vertical => segment.height() > min_len,
            };
            if long_enough {
                segments.push(segment);
            }
        }
    }

    segments
}

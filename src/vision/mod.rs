//! Vision-based grid localization
//!
//! Pure function from a captured frame to a grid cell estimate: a few
//! bounded image-processing passes, no I/O on the return path. Never
//! blocks navigation - when line detection fails the localizer falls back
//! to a synthetic uniform partition of the frame, trading accuracy for a
//! guaranteed estimate.

pub mod cells;
pub mod lines;
pub mod preprocess;

use crate::config::{DishaConfig, GridConfig, VisionConfig};
use crate::drivers::{DebugSink, Frame};
use crate::grid::GridCoordinate;
use self::cells::{Cell, PixelPoint};
use self::lines::{LineAxis, LINE_KERNEL_LEN};
use self::preprocess::{BLUR_RADIUS, THRESHOLD_BIAS, THRESHOLD_RADIUS};

/// Grid localizer
///
/// Holds no mutable state between frames; every call recomputes the cell
/// set from scratch.
pub struct GridLocalizer {
    grid: GridConfig,
    vision: VisionConfig,
    sink: Option<Box<dyn DebugSink>>,
}

impl GridLocalizer {
    pub fn new(config: &DishaConfig) -> Self {
        Self {
            grid: config.grid.clone(),
            vision: config.vision.clone(),
            sink: None,
        }
    }

    /// Attach a debug sink persisting the thresholded mask and the frame
    /// annotated with detected cell centers.
    pub fn with_debug_sink(mut self, sink: Box<dyn DebugSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Infer the grid cell under the vehicle from one camera frame.
    ///
    /// Returns the detected cell nearest the frame center, or the
    /// synthetic uniform-grid estimate when detection fails. Only a
    /// zero-sized frame yields `None`.
    pub fn locate(&mut self, frame: &Frame) -> Option<GridCoordinate> {
        if frame.width() == 0 || frame.height() == 0 {
            log::warn!("GridLocalizer: Zero-sized frame");
            return None;
        }

        match self.detect(frame) {
            Some(coordinate) => Some(coordinate),
            None => {
                let fallback = self.synthetic_estimate(frame.width(), frame.height());
                log::warn!(
                    "GridLocalizer: Detection failed, synthetic estimate {}",
                    fallback
                );
                Some(fallback)
            }
        }
    }

    fn detect(&mut self, frame: &Frame) -> Option<GridCoordinate> {
        // Frames smaller than the structuring element cannot carry lines
        if frame.width() < LINE_KERNEL_LEN || frame.height() < LINE_KERNEL_LEN {
            return None;
        }

        let blurred = preprocess::box_blur(frame, BLUR_RADIUS);
        let mask = preprocess::adaptive_threshold(&blurred, THRESHOLD_RADIUS, THRESHOLD_BIAS);
        if let Some(sink) = &mut self.sink {
            sink.save(&mask, "threshold");
        }

        let min_len = self.vision.min_line_length;
        let h_mask = lines::open_1d(&mask, LineAxis::Horizontal, LINE_KERNEL_LEN);
        let horizontal = lines::extract_segments(&h_mask, LineAxis::Horizontal, min_len);
        let v_mask = lines::open_1d(&mask, LineAxis::Vertical, LINE_KERNEL_LEN);
        let vertical = lines::extract_segments(&v_mask, LineAxis::Vertical, min_len);

        if horizontal.is_empty() || vertical.is_empty() {
            log::debug!(
                "GridLocalizer: Degenerate line set ({} horizontal, {} vertical)",
                horizontal.len(),
                vertical.len()
            );
            return None;
        }

        let raw = cells::intersections(&horizontal, &vertical);
        let points = cells::dedup(raw, &self.vision);
        let rows = cells::cluster_rows(points, self.vision.row_tolerance_px);
        let detected = cells::synthesize_cells(&rows);
        if detected.is_empty() {
            log::debug!("GridLocalizer: No complete 2x2 intersection block");
            return None;
        }

        if let Some(sink) = &mut self.sink {
            let annotated = annotate_centers(frame, &detected);
            sink.save(&annotated, "cells");
        }

        let center = PixelPoint::new(frame.width() / 2, frame.height() / 2);
        let nearest = nearest_cell(&detected, center);
        log::debug!(
            "GridLocalizer: {} cells detected, nearest local ({}, {})",
            detected.len(),
            nearest.row,
            nearest.col
        );
        Some(GridCoordinate::new(nearest.row as u32, nearest.col as u32))
    }

    /// Deterministic fallback: partition the frame into rows x cols equal
    /// cells and pick the one whose center is nearest the frame center.
    fn synthetic_estimate(&self, width: u32, height: u32) -> GridCoordinate {
        let cell_w = width as f32 / self.grid.cols as f32;
        let cell_h = height as f32 / self.grid.rows as f32;
        let center_x = width as f32 / 2.0;
        let center_y = height as f32 / 2.0;

        let mut best = GridCoordinate::new(0, 0);
        let mut best_dist = f32::INFINITY;
        for row in 0..self.grid.rows {
            for col in 0..self.grid.cols {
                let cx = (col as f32 + 0.5) * cell_w;
                let cy = (row as f32 + 0.5) * cell_h;
                let dist = (cx - center_x).powi(2) + (cy - center_y).powi(2);
                // Strict comparison: ties resolve to the first cell in
                // row-major order
                if dist < best_dist {
                    best_dist = dist;
                    best = GridCoordinate::new(row, col);
                }
            }
        }
        best
    }
}

fn nearest_cell(detected: &[Cell], center: PixelPoint) -> &Cell {
    let mut best = &detected[0];
    let mut best_dist = best.center.distance_sq(&center);
    for cell in &detected[1..] {
        let dist = cell.center.distance_sq(&center);
        if dist < best_dist {
            best_dist = dist;
            best = cell;
        }
    }
    best
}

/// Copy of the frame with a white cross drawn over each detected center
fn annotate_centers(frame: &Frame, detected: &[Cell]) -> Frame {
    let mut out = frame.clone();
    let (w, h) = (out.width(), out.height());
    for cell in detected {
        let (cx, cy) = (cell.center.x, cell.center.y);
        for d in 0..5u32 {
            let offset = d as i64 - 2;
            let x = cx as i64 + offset;
            let y = cy as i64 + offset;
            if x >= 0 && (x as u32) < w {
                out.put_pixel(x as u32, cy.min(h - 1), image::Luma([255]));
            }
            if y >= 0 && (y as u32) < h {
                out.put_pixel(cx.min(w - 1), y as u32, image::Luma([255]));
            }
        }
    }
    out
}

//! Debug overlay — a software canvas plus what to draw on it each frame.
//!
//! Nothing here touches the window, so it can be tested headless.
//!
//! ```text
//! ┌──────────────────────────────────────────────┬────┐
//! │                                              │ ▓▓ │
//! │        ●────────────●   (thumb ─ index)      │ ▓▓ │  brightness
//! │         \  skeleton                          │ ▓▓ │  bar
//! │                                              │ ░░ │
//! ├──────────────────────────────────────────────┴────┤
//! │ Brightness: 57%  Distance: 131.42                 │  status bar
//! │ LMB=index  RMB=thumb  Q/Esc=quit                  │  legend
//! └───────────────────────────────────────────────────┘
//! ```

use pinch_map::{BrightnessLevel, Point};

use crate::app::{FrameOutcome, FrameReport};
use crate::capture::Frame;
use crate::gesture::landmarks::HAND_CONNECTIONS;

// ════════════════════════════════════════════════════════════════════════════
// Colors and layout
// ════════════════════════════════════════════════════════════════════════════

const TIP_COLOR:      u32 = 0x0000FF;  // blue markers + pinch line
const BONE_COLOR:     u32 = 0xEEEEEE;
const JOINT_COLOR:    u32 = 0xFF3030;
const BAR_BG:         u32 = 0x16213E;
const BAR_FILL:       u32 = 0xFFD700;  // gold
const BAR_BORDER:     u32 = 0xEEEEEE;
const STATUS_BG:      u32 = 0x0F3460;
const STATUS_OK:      u32 = 0xEEEEEE;
const STATUS_WARN:    u32 = 0xFF9040;
const LEGEND_COLOR:   u32 = 0x888888;

const TIP_RADIUS:     isize = 6;
const PINCH_LINE_W:   usize = 3;
const JOINT_RADIUS:   isize = 3;
const STATUS_H:       usize = 40;
const BAR_W:          usize = 24;
const BAR_MARGIN:     usize = 16;
const TEXT_SCALE:     usize = 2;

// ════════════════════════════════════════════════════════════════════════════
// Canvas — packed 0x00RRGGBB framebuffer with drawing primitives
// ════════════════════════════════════════════════════════════════════════════

pub struct Canvas {
    pub width:  usize,
    pub height: usize,
    buf:        Vec<u32>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas { width, height, buf: vec![0; width * height] }
    }

    pub fn buffer(&self) -> &[u32] {
        &self.buf
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.buf[y * self.width + x])
    }

    pub fn clear(&mut self, color: u32) {
        self.buf.fill(color);
    }

    /// Nearest-neighbour scale `frame` to cover the whole canvas.
    pub fn blit_scaled(&mut self, frame: &Frame) {
        if frame.is_empty() || frame.pixels.len() < frame.width * frame.height {
            return;
        }
        for y in 0..self.height {
            let sy = y * frame.height / self.height;
            let src = &frame.pixels[sy * frame.width..(sy + 1) * frame.width];
            let dst = &mut self.buf[y * self.width..(y + 1) * self.width];
            for (x, px) in dst.iter_mut().enumerate() {
                *px = src[x * frame.width / self.width];
            }
        }
    }

    pub fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.buf[y as usize * self.width + x as usize] = color;
        }
    }

    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.height) {
            for col in x..(x + w).min(self.width) {
                self.buf[row * self.width + col] = color;
            }
        }
    }

    pub fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 { return; }
        let (x, y) = (x as isize, y as isize);
        let (r, b) = (x + w as isize - 1, y + h as isize - 1);
        for col in x..=r {
            self.set_pixel(col, y, color);
            self.set_pixel(col, b, color);
        }
        for row in y..=b {
            self.set_pixel(x, row, color);
            self.set_pixel(r, row, color);
        }
    }

    /// Filled circle.
    pub fn draw_disc(&mut self, cx: isize, cy: isize, r: isize, color: u32) {
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Bresenham line, `thickness` pixels wide (square pen).
    pub fn draw_line(
        &mut self,
        (x0, y0): (isize, isize),
        (x1, y1): (isize, isize),
        thickness: usize,
        color: u32,
    ) {
        let half = (thickness.max(1) as isize - 1) / 2;
        let extra = (thickness.max(1) as isize - 1) - half;
        let dx =  (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let (mut x, mut y, mut err) = (x0, y0, dx + dy);

        // Bounded walk; coordinates far outside the canvas just get clipped.
        let max_steps = (dx - dy).min(1 << 16);
        for _ in 0..=max_steps {
            for py in (y - half)..=(y + extra) {
                for px in (x - half)..=(x + extra) {
                    self.set_pixel(px, py, color);
                }
            }
            if x == x1 && y == y1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    /// 3×5 bitmap font, each glyph cell `scale` pixels per dot.
    pub fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32, scale: usize) {
        let scale = scale.max(1);
        let mut cx = x;
        for ch in text.chars() {
            if cx + 3 * scale > self.width { break; }
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
        }
    }
}

fn to_px(p: Point) -> (isize, isize) {
    (p.x.round() as isize, p.y.round() as isize)
}

// ════════════════════════════════════════════════════════════════════════════
// OverlayState — what to draw for one frame, in window coordinates
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct OverlayState {
    /// Thumb and index tips.
    pub tips:         Option<(Point, Point)>,
    /// Full hand skeleton, empty when the detector gives only two points.
    pub skeleton:     Vec<Point>,
    /// Level shown on the bar (the one in effect, applied or retained).
    pub bar_level:    Option<BrightnessLevel>,
    pub status:       String,
    pub status_color: u32,
    pub legend:       &'static str,
}

impl OverlayState {
    /// Build the overlay for `report`, scaling frame pixels by `(sx, sy)`.
    pub fn from_report(report: &FrameReport, (sx, sy): (f64, f64), legend: &'static str) -> Self {
        let tips = report
            .hand
            .as_ref()
            .map(|h| (h.fingers.thumb_tip.scaled(sx, sy), h.fingers.index_tip.scaled(sx, sy)));
        let skeleton = report
            .hand
            .as_ref()
            .map(|h| h.landmarks.iter().map(|p| p.scaled(sx, sy)).collect())
            .unwrap_or_default();

        let (bar_level, status, status_color) = match &report.outcome {
            FrameOutcome::Applied { level, distance } => (
                Some(*level),
                format!("Brightness: {level}  Distance: {distance:.2}"),
                STATUS_OK,
            ),
            FrameOutcome::NoHand { retained: Some(level) } => (
                Some(*level),
                format!("No hand - holding {level}"),
                STATUS_OK,
            ),
            FrameOutcome::NoHand { retained: None } => (None, "No hand".to_string(), STATUS_OK),
            FrameOutcome::SetterFailed { retained, error, .. } => (
                *retained,
                format!("Brightness not applied: {error}"),
                STATUS_WARN,
            ),
        };

        OverlayState { tips, skeleton, bar_level, status, status_color, legend }
    }
}

/// Draw the overlay on top of whatever is already on the canvas.
pub fn render_overlay(canvas: &mut Canvas, state: &OverlayState) {
    // ── Skeleton ──────────────────────────────────────────────────────────
    if state.skeleton.len() >= 21 {
        for &(a, b) in HAND_CONNECTIONS.iter() {
            canvas.draw_line(to_px(state.skeleton[a]), to_px(state.skeleton[b]), 2, BONE_COLOR);
        }
        for &p in &state.skeleton {
            let (x, y) = to_px(p);
            canvas.draw_disc(x, y, JOINT_RADIUS, JOINT_COLOR);
        }
    }

    // ── Pinch markers ─────────────────────────────────────────────────────
    if let Some((thumb, index)) = state.tips {
        let (t, i) = (to_px(thumb), to_px(index));
        canvas.draw_line(t, i, PINCH_LINE_W, TIP_COLOR);
        canvas.draw_disc(t.0, t.1, TIP_RADIUS, TIP_COLOR);
        canvas.draw_disc(i.0, i.1, TIP_RADIUS, TIP_COLOR);
    }

    // ── Brightness bar ────────────────────────────────────────────────────
    let w = canvas.width;
    let h = canvas.height;
    if w > BAR_W + BAR_MARGIN && h > STATUS_H + 2 * BAR_MARGIN {
        let bx = w - BAR_W - BAR_MARGIN;
        let by = BAR_MARGIN;
        let bh = h - STATUS_H - 2 * BAR_MARGIN;
        canvas.fill_rect(bx, by, BAR_W, bh, BAR_BG);
        if let Some(level) = state.bar_level {
            let filled = (bh as f32 * level.fraction()).round() as usize;
            canvas.fill_rect(bx, by + bh - filled, BAR_W, filled, BAR_FILL);
        }
        canvas.draw_border(bx, by, BAR_W, bh, BAR_BORDER);
    }

    // ── Status bar + legend ───────────────────────────────────────────────
    if h > STATUS_H {
        let sy = h - STATUS_H;
        canvas.fill_rect(0, sy, w, STATUS_H, STATUS_BG);
        canvas.draw_label(&state.status, 8, sy + 6, state.status_color, TEXT_SCALE);
        canvas.draw_label(state.legend, 8, sy + 26, LEGEND_COLOR, TEXT_SCALE);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{Handedness, TrackedHand};
    use pinch_map::FingerPair;

    fn report(hand: Option<TrackedHand>, outcome: FrameOutcome) -> FrameReport {
        FrameReport { frame: Frame::filled(100, 100, 0), hand, outcome }
    }

    fn hand(thumb: (f64, f64), index: (f64, f64)) -> TrackedHand {
        TrackedHand {
            handedness: Handedness::Right,
            score:      1.0,
            fingers:    FingerPair::new(thumb.into(), index.into()),
            landmarks:  Vec::new(),
        }
    }

    #[test]
    fn disc_paints_centre_not_corner() {
        let mut c = Canvas::new(20, 20);
        c.draw_disc(10, 10, 3, 0xFF);
        assert_eq!(c.pixel(10, 10), Some(0xFF));
        assert_eq!(c.pixel(13, 10), Some(0xFF));
        assert_eq!(c.pixel(13, 13), Some(0));
    }

    #[test]
    fn line_connects_endpoints() {
        let mut c = Canvas::new(50, 50);
        c.draw_line((2, 3), (40, 30), 1, 0xAB);
        assert_eq!(c.pixel(2, 3), Some(0xAB));
        assert_eq!(c.pixel(40, 30), Some(0xAB));
    }

    #[test]
    fn thick_line_is_wider() {
        let mut c = Canvas::new(20, 20);
        c.draw_line((0, 10), (19, 10), 3, 0x1);
        assert_eq!(c.pixel(5, 9), Some(0x1));
        assert_eq!(c.pixel(5, 11), Some(0x1));
        assert_eq!(c.pixel(5, 12), Some(0));
    }

    #[test]
    fn off_canvas_drawing_is_clipped() {
        let mut c = Canvas::new(10, 10);
        c.draw_disc(-50, -50, 6, 0x1);
        c.draw_line((-1000, -1000), (1000, 1000), 3, 0x2);
        c.fill_rect(8, 8, 100, 100, 0x3);
        c.draw_border(5, 5, 50, 50, 0x4);
        c.draw_label("overflowing label text", 0, 0, 0x5, 3);
        assert_eq!(c.buffer().len(), 100);
        assert_eq!(c.pixel(9, 9), Some(0x3));
    }

    #[test]
    fn blit_scales_nearest_neighbour() {
        let mut frame = Frame::filled(2, 2, 0);
        frame.pixels = vec![1, 2, 3, 4];
        let mut c = Canvas::new(4, 4);
        c.blit_scaled(&frame);
        assert_eq!(c.pixel(0, 0), Some(1));
        assert_eq!(c.pixel(3, 0), Some(2));
        assert_eq!(c.pixel(0, 3), Some(3));
        assert_eq!(c.pixel(3, 3), Some(4));
    }

    #[test]
    fn label_draws_something() {
        let mut c = Canvas::new(40, 10);
        c.draw_label("Q", 0, 0, 0x7, 1);
        assert!(c.buffer().iter().any(|&p| p == 0x7));
    }

    #[test]
    fn status_for_applied_frame() {
        let r = report(
            Some(hand((0.0, 0.0), (110.0, 0.0))),
            FrameOutcome::Applied { level: BrightnessLevel::from_percent(50.0), distance: 110.0 },
        );
        let o = OverlayState::from_report(&r, (2.0, 2.0), "");
        assert_eq!(o.status, "Brightness: 50%  Distance: 110.00");
        assert_eq!(o.bar_level.map(BrightnessLevel::percent), Some(50));
        assert_eq!(o.tips, Some((Point::new(0.0, 0.0), Point::new(220.0, 0.0))));
    }

    #[test]
    fn status_for_no_hand_keeps_bar() {
        let held = BrightnessLevel::from_percent(30.0);
        let o = OverlayState::from_report(
            &report(None, FrameOutcome::NoHand { retained: Some(held) }),
            (1.0, 1.0),
            "",
        );
        assert_eq!(o.tips, None);
        assert_eq!(o.bar_level, Some(held));
        assert!(o.status.starts_with("No hand"));
    }

    #[test]
    fn render_overlay_marks_tips() {
        let r = report(
            Some(hand((20.0, 20.0), (60.0, 20.0))),
            FrameOutcome::Applied { level: BrightnessLevel::MAX, distance: 40.0 },
        );
        let o = OverlayState::from_report(&r, (1.0, 1.0), "Q=quit");
        let mut c = Canvas::new(200, 150);
        render_overlay(&mut c, &o);
        assert_eq!(c.pixel(20, 20), Some(TIP_COLOR));
        assert_eq!(c.pixel(40, 20), Some(TIP_COLOR));
        assert_eq!(c.pixel(0, 149), Some(STATUS_BG));
    }
}

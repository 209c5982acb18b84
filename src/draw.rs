// Window + software drawing utilities.
// Visual effects provided here:
// 1) A window that shows the composited frame and reports keys and mouse.
// 2) Rectangles, discs, lines and a crosshair for the UI and hand overlays.
// 3) A tiny 5x7 bitmap font for button labels and the HUD.

use crate::error::Error;
use crate::landmarks::PointerState;
use crate::session::KeyCommand;
use crate::types::FrameBuffer;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Scale, Window, WindowOptions};

pub struct Drawer {
    window: Window, // the on-screen window you see
}

/// minifb has no true fullscreen; borderless + topmost + fit-to-screen is the
/// closest it gets.
fn window_options(fullscreen: bool) -> WindowOptions {
    if !fullscreen {
        return WindowOptions::default();
    }
    WindowOptions {
        borderless: true,
        topmost: true,
        scale: Scale::FitScreen,
        ..WindowOptions::default()
    }
}

impl Drawer {
    /// Create a window sized to the camera feed.
    pub fn new(title: &str, width: usize, height: usize, fullscreen: bool) -> Result<Self, Error> {
        let window = Window::new(title, width, height, window_options(fullscreen))
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen. Also pumps input events.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// The single-key command pressed since the last frame, if any.
    /// Held keys do not repeat.
    pub fn poll_command(&self) -> Option<KeyCommand> {
        const KEYS: [(Key, char); 5] = [
            (Key::Q, 'q'),
            (Key::U, 'u'),
            (Key::R, 'r'),
            (Key::S, 's'),
            (Key::T, 't'),
        ];
        KEYS.iter()
            .find(|(key, _)| self.window.is_key_pressed(*key, KeyRepeat::No))
            .and_then(|(_, c)| KeyCommand::from_char(*c))
    }

    /// Mouse position (None when outside the window) and button state.
    pub fn pointer(&self) -> PointerState {
        PointerState {
            pos: self.window.get_mouse_pos(MouseMode::Discard),
            left: self.window.get_mouse_down(MouseButton::Left),
            right: self.window.get_mouse_down(MouseButton::Right),
        }
    }
}

/* ---------- Software drawing: pixels, shapes, tiny bitmap font ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
pub fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Draw a thin line between (x0,y0) and (x1,y1) using Bresenham.
pub fn draw_line(fb: &mut FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
    let (mut x0, mut y0, x1, y1) = (x0, y0, x1, y1);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_pixel(fb, x0, y0, color);
        if x0 == x1 && y0 == y1 { break; }
        let e2 = 2 * err;
        if e2 >= dy { err += dy; x0 += sx; }
        if e2 <= dx { err += dx; y0 += sy; }
    }
}

/// Solid rectangle with its top-left corner at (x,y), clipped to the frame.
pub fn fill_rect(fb: &mut FrameBuffer, x: i32, y: i32, w: i32, h: i32, color: u32) {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w).min(fb.width as i32);
    let y1 = (y + h).min(fb.height as i32);
    for py in y0..y1 {
        let row = py as usize * fb.width;
        for px in x0..x1 {
            fb.pixels[row + px as usize] = color;
        }
    }
}

/// Rectangle outline `thickness` pixels wide, drawn inward from the edge.
pub fn stroke_rect(fb: &mut FrameBuffer, x: i32, y: i32, w: i32, h: i32, thickness: i32, color: u32) {
    fill_rect(fb, x, y, w, thickness, color);
    fill_rect(fb, x, y + h - thickness, w, thickness, color);
    fill_rect(fb, x, y, thickness, h, color);
    fill_rect(fb, x + w - thickness, y, thickness, h, color);
}

/// Filled disc centered at (cx,cy).
pub fn fill_circle(fb: &mut FrameBuffer, cx: i32, cy: i32, radius: i32, color: u32) {
    let r2 = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= r2 {
                put_pixel(fb, cx + dx, cy + dy, color);
            }
        }
    }
}

/// Draw a small crosshair centered at (cx,cy).
/// Visual: a "+" shape (with a tiny gap at the center).
pub fn draw_crosshair(fb: &mut FrameBuffer, cx: i32, cy: i32, size: i32, color: u32) {
    draw_line(fb, cx - size, cy, cx - 2, cy, color);
    draw_line(fb, cx + 2, cy, cx + size, cy, color);
    draw_line(fb, cx, cy - size, cx, cy - 2, color);
    draw_line(fb, cx, cy + 2, cx, cy + size, color);
    put_pixel(fb, cx, cy, color);
}

/* ---------- 5x7 bitmap font (digits, uppercase, a little punctuation) ---------- */

/// Return a 5x7 glyph bitmap.
/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    // Helper macro to define a glyph quickly
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),

        _ => None,
    }
}

/// Draw a single 5x7 character at (x,y), each font pixel `scale` screen pixels wide.
/// Visual: a glyph with a 1-cell black shadow for contrast.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32, scale: i32) {
    if let Some(rows) = glyph5x7(ch) {
        for (pass, (off, c)) in [(scale, 0x00000000), (0, color)].into_iter().enumerate() {
            // Skip the shadow when drawing black text; it would just thicken it.
            if pass == 0 && color == 0 {
                continue;
            }
            for (ry, rowbits) in rows.iter().enumerate() {
                for rx in 0..5 {
                    if (rowbits & (1 << (4 - rx))) != 0 {
                        let px = x + rx * scale + off;
                        let py = y + ry as i32 * scale + off;
                        fill_rect(fb, px, py, scale, scale, c);
                    }
                }
            }
        }
    }
}

/// Width in pixels of `text` at `scale`.
pub fn text_width_5x7(text: &str, scale: i32) -> i32 {
    text.chars().count() as i32 * 6 * scale
}

/// Draw a text string using 5x7 glyphs; 1 cell of spacing between glyphs.
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32, scale: i32) {
    let scale = scale.max(1);
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color, scale);
        x += 6 * scale; // 5 cells glyph width + 1 cell spacing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Color;

    fn black(w: usize, h: usize) -> FrameBuffer {
        FrameBuffer::filled(w, h, Color::BLACK)
    }

    #[test]
    fn test_fullscreen_window_options() {
        let plain = window_options(false);
        assert!(!plain.borderless && !plain.topmost);
        let full = window_options(true);
        assert!(full.borderless && full.topmost);
        assert!(matches!(full.scale, Scale::FitScreen));
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut fb = black(10, 10);
        fill_rect(&mut fb, -5, -5, 8, 8, 0xFF);
        assert_eq!(fb.get(0, 0), Some(0xFF));
        assert_eq!(fb.get(2, 2), Some(0xFF));
        assert_eq!(fb.get(3, 3), Some(0));
        fill_rect(&mut fb, 8, 8, 50, 50, 0xAA);
        assert_eq!(fb.get(9, 9), Some(0xAA));
    }

    #[test]
    fn test_stroke_rect_leaves_inside() {
        let mut fb = black(20, 20);
        stroke_rect(&mut fb, 2, 2, 10, 10, 2, 0xFFFFFF);
        assert_eq!(fb.get(2, 2), Some(0xFFFFFF));
        assert_eq!(fb.get(11, 11), Some(0xFFFFFF));
        assert_eq!(fb.get(3, 6), Some(0xFFFFFF));
        assert_eq!(fb.get(6, 6), Some(0));
    }

    #[test]
    fn test_fill_circle() {
        let mut fb = black(20, 20);
        fill_circle(&mut fb, 10, 10, 3, 0x123456);
        assert_eq!(fb.get(10, 13), Some(0x123456));
        assert_eq!(fb.get(13, 13), Some(0));
    }

    #[test]
    fn test_text_draws_known_glyphs_only() {
        let mut fb = black(80, 20);
        draw_text_5x7(&mut fb, 0, 0, "~", 0xFFFFFF, 1);
        assert!(fb.pixels.iter().all(|p| *p == 0));
        draw_text_5x7(&mut fb, 0, 0, "EXIT", 0xFFFFFF, 2);
        assert!(fb.pixels.iter().any(|p| *p == 0xFFFFFF));
        assert_eq!(text_width_5x7("EXIT", 2), 48);
    }
}

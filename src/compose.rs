// Builds the frame the user sees: background, controls, canvas, hand, HUD.

use image::RgbaImage;

use crate::draw::{
    draw_crosshair, draw_line, draw_text_5x7, fill_circle, fill_rect, stroke_rect, text_width_5x7,
};
use crate::gesture::{Gesture, GestureReading};
use crate::landmarks::{HAND_CONNECTIONS, KeypointSet, LANDMARK_COUNT};
use crate::session::BackgroundMode;
use crate::types::{Color, FrameBuffer};
use crate::ui::{BUTTONS, PALETTE, color_name};

const LANDMARK_COLOR: u32 = 0x00_FF_30_30;
const BONE_COLOR: u32 = 0x00_F0_F0_F0;

/// Background for this frame: the camera itself, or a blank sheet of its size.
pub fn background(mode: BackgroundMode, camera: &FrameBuffer) -> FrameBuffer {
    match mode {
        BackgroundMode::Camera => camera.clone(),
        BackgroundMode::WhiteCanvas => FrameBuffer::filled(camera.width, camera.height, Color::WHITE),
        BackgroundMode::BlackCanvas => FrameBuffer::filled(camera.width, camera.height, Color::BLACK),
    }
}

/// Palette swatches with white borders, then the labelled CLEAR/EXIT boxes.
pub fn draw_controls(fb: &mut FrameBuffer) {
    for item in &PALETTE {
        let r = item.rect;
        fill_rect(fb, r.x, r.y, r.w, r.h, item.color.to_u32());
        stroke_rect(fb, r.x, r.y, r.w, r.h, 2, Color::WHITE.to_u32());
    }
    for button in &BUTTONS {
        let r = button.rect;
        fill_rect(fb, r.x, r.y, r.w, r.h, Color::BLACK.to_u32());
        let scale = 2;
        let tx = r.x + (r.w - text_width_5x7(button.label, scale)) / 2;
        let ty = r.y + (r.h - 7 * scale) / 2;
        draw_text_5x7(fb, tx, ty, button.label, Color::WHITE.to_u32(), scale);
    }
}

/// Alpha-composite the canvas over `fb`. Pixels outside either buffer are skipped.
pub fn blend_canvas(fb: &mut FrameBuffer, canvas: &RgbaImage) {
    let w = fb.width.min(canvas.width() as usize);
    let h = fb.height.min(canvas.height() as usize);
    for y in 0..h {
        for x in 0..w {
            let src = canvas.get_pixel(x as u32, y as u32).0;
            let a = src[3] as u32;
            if a == 0 {
                continue;
            }
            let idx = y * fb.width + x;
            if a == 255 {
                fb.pixels[idx] = ((src[0] as u32) << 16) | ((src[1] as u32) << 8) | src[2] as u32;
                continue;
            }
            let dst = fb.pixels[idx];
            let mix = |s: u8, shift: u32| {
                let d = (dst >> shift) & 0xFF;
                (s as u32 * a + d * (255 - a) + 127) / 255
            };
            fb.pixels[idx] = (mix(src[0], 16) << 16) | (mix(src[1], 8) << 8) | mix(src[2], 0);
        }
    }
}

/// Skeleton and joints of the tracked hand.
pub fn draw_hand(fb: &mut FrameBuffer, keys: &KeypointSet) {
    let (w, h) = (fb.width, fb.height);
    for (a, b) in HAND_CONNECTIONS {
        let pa = keys.to_pixel(a, w, h);
        let pb = keys.to_pixel(b, w, h);
        draw_line(fb, pa.x, pa.y, pb.x, pb.y, BONE_COLOR);
    }
    for i in 0..LANDMARK_COUNT {
        let p = keys.to_pixel(i, w, h);
        fill_circle(fb, p.x, p.y, 3, LANDMARK_COLOR);
    }
}

/// Fingertip marker in the current ink color; a crosshair while selecting.
pub fn draw_anchor(fb: &mut FrameBuffer, reading: &GestureReading, ink: Color) {
    let Some(p) = reading.anchor else {
        return;
    };
    if reading.gesture == Gesture::Select {
        draw_crosshair(fb, p.x, p.y, 12, 0x00_FF_CC_33);
    } else {
        fill_circle(fb, p.x, p.y, 8, ink.to_u32());
    }
}

/// One-line status along the bottom edge.
pub fn draw_hud(fb: &mut FrameBuffer, mode: BackgroundMode, reading: &GestureReading, ink: Color, fps_text: &str) {
    let hud = format!(
        "{} | {} | {} | {} | Q QUIT  U UNDO  R REDO  S SAVE  T MODE",
        mode.as_str(),
        reading.gesture.as_str(),
        color_name(ink).unwrap_or("BLACK"),
        fps_text
    );
    let color = if mode == BackgroundMode::WhiteCanvas { 0x00_20_20_20 } else { 0x00_FF_FF_FF };
    draw_text_5x7(fb, 8, fb.height as i32 - 16, &hud, color, 1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;
    use image::Rgba;

    #[test]
    fn test_blank_backgrounds_ignore_camera() {
        let cam = FrameBuffer::filled(4, 4, Color::rgb(9, 9, 9));
        let white = background(BackgroundMode::WhiteCanvas, &cam);
        assert!(white.pixels.iter().all(|p| *p == 0x00FF_FFFF));
        let black = background(BackgroundMode::BlackCanvas, &cam);
        assert!(black.pixels.iter().all(|p| *p == 0));
        assert_eq!((black.width, black.height), (4, 4));
        assert_eq!(background(BackgroundMode::Camera, &cam), cam);
    }

    #[test]
    fn test_blend_canvas_alpha() {
        let mut fb = FrameBuffer::filled(3, 1, Color::rgb(0, 0, 200));
        let mut canvas = RgbaImage::new(3, 1);
        canvas.put_pixel(1, 0, Rgba([255, 0, 0, 255]));
        canvas.put_pixel(2, 0, Rgba([255, 0, 0, 128]));
        blend_canvas(&mut fb, &canvas);

        assert_eq!(fb.pixels[0], 0x0000_00C8);
        assert_eq!(fb.pixels[1], 0x00FF_0000);
        let half = fb.pixels[2];
        assert_eq!((half >> 16) & 0xFF, 128);
        assert_eq!(half & 0xFF, 100);
    }

    #[test]
    fn test_controls_paint_swatches() {
        let mut fb = FrameBuffer::filled(640, 480, Color::BLACK);
        draw_controls(&mut fb);
        let red = &PALETTE[2];
        let c = Point::new(red.rect.x + 25, red.rect.y + 25);
        assert_eq!(fb.get(c.x as usize, c.y as usize), Some(red.color.to_u32()));
        // Border
        assert_eq!(fb.get(red.rect.x as usize, red.rect.y as usize), Some(0x00FF_FFFF));
    }

    #[test]
    fn test_anchor_marker_uses_ink() {
        let mut fb = FrameBuffer::filled(50, 50, Color::BLACK);
        let reading = GestureReading { gesture: Gesture::Draw, anchor: Some(Point::new(25, 25)), fingers: 1 };
        draw_anchor(&mut fb, &reading, Color::rgb(0, 255, 0));
        assert_eq!(fb.get(25, 25), Some(0x0000_FF00));
    }
}

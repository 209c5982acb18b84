// Static on-screen controls: the color palette plus CLEAR and EXIT.
// Layout is fixed for the whole run; the select gesture hit-tests against it.

use crate::types::{Color, Point};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Strict containment: pixels on the border do not count.
    pub fn contains(&self, p: Point) -> bool {
        self.x < p.x && p.x < self.x + self.w && self.y < p.y && p.y < self.y + self.h
    }
}

pub struct PaletteItem {
    pub color: Color,
    pub label: &'static str,
    pub rect: Rect,
}

pub const SWATCH_SIZE: i32 = 50;
const SWATCH_GAP: i32 = 10;
const SWATCH_ORIGIN: i32 = 10;

/// Swatch i sits left-to-right along the top edge.
const fn swatch_rect(i: i32) -> Rect {
    Rect::new(i * (SWATCH_SIZE + SWATCH_GAP) + SWATCH_ORIGIN, SWATCH_ORIGIN, SWATCH_SIZE, SWATCH_SIZE)
}

pub const PALETTE: [PaletteItem; 7] = [
    PaletteItem { color: Color::rgb(148, 0, 211), label: "Violet", rect: swatch_rect(0) },
    PaletteItem { color: Color::rgb(75, 0, 130), label: "Indigo", rect: swatch_rect(1) },
    PaletteItem { color: Color::rgb(255, 0, 0), label: "Red", rect: swatch_rect(2) },
    PaletteItem { color: Color::rgb(255, 165, 0), label: "Orange", rect: swatch_rect(3) },
    PaletteItem { color: Color::rgb(255, 255, 0), label: "Yellow", rect: swatch_rect(4) },
    PaletteItem { color: Color::rgb(0, 255, 0), label: "Green", rect: swatch_rect(5) },
    PaletteItem { color: Color::rgb(0, 0, 255), label: "Blue", rect: swatch_rect(6) },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonAction {
    Clear,
    Exit,
}

pub struct Button {
    pub action: ButtonAction,
    pub label: &'static str,
    pub rect: Rect,
}

pub const BUTTONS: [Button; 2] = [
    Button { action: ButtonAction::Clear, label: "CLEAR", rect: Rect::new(10, 80, 120, 40) },
    Button { action: ButtonAction::Exit, label: "EXIT", rect: Rect::new(10, 140, 120, 40) },
];

/// Palette name for `color`, if it is one of ours.
pub fn color_name(color: Color) -> Option<&'static str> {
    PALETTE.iter().find(|item| item.color == color).map(|item| item.label)
}

/// What a select gesture landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitTarget {
    Color(Color),
    Clear,
    Exit,
}

/// First match wins: palette swatches (left to right), then CLEAR, then EXIT.
pub fn hit_test(p: Point) -> Option<HitTarget> {
    if let Some(item) = PALETTE.iter().find(|item| item.rect.contains(p)) {
        return Some(HitTarget::Color(item.color));
    }
    BUTTONS
        .iter()
        .find(|button| button.rect.contains(p))
        .map(|button| match button.action {
            ButtonAction::Clear => HitTarget::Clear,
            ButtonAction::Exit => HitTarget::Exit,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn center(r: Rect) -> Point {
        Point::new(r.x + r.w / 2, r.y + r.h / 2)
    }

    #[test]
    fn test_swatches_laid_out_left_to_right() {
        assert_eq!(PALETTE[0].rect, Rect::new(10, 10, 50, 50));
        assert_eq!(PALETTE[2].rect, Rect::new(130, 10, 50, 50));
        assert_eq!(PALETTE[6].rect, Rect::new(370, 10, 50, 50));
    }

    #[test]
    fn test_every_swatch_selects_its_color() {
        for item in &PALETTE {
            assert_eq!(hit_test(center(item.rect)), Some(HitTarget::Color(item.color)));
        }
    }

    #[test]
    fn test_red_swatch() {
        assert_eq!(color_name(PALETTE[2].color), Some("Red"));
        assert_eq!(color_name(Color::BLACK), None);
        assert_eq!(hit_test(Point::new(150, 30)), Some(HitTarget::Color(Color::rgb(255, 0, 0))));
    }

    #[test]
    fn test_boundary_is_exclusive() {
        let r = PALETTE[0].rect;
        assert_eq!(hit_test(Point::new(r.x, r.y + 5)), None);
        assert_eq!(hit_test(Point::new(r.x + r.w, r.y + 5)), None);
        assert_eq!(hit_test(Point::new(r.x + 5, r.y)), None);
        assert_eq!(hit_test(Point::new(r.x + 5, r.y + r.h)), None);
        assert!(hit_test(Point::new(r.x + 1, r.y + 1)).is_some());
        assert!(hit_test(Point::new(r.x + r.w - 1, r.y + r.h - 1)).is_some());
    }

    #[test]
    fn test_gap_between_swatches_misses() {
        // x = 65 lies between swatch 0 (10..60) and swatch 1 (70..120)
        assert_eq!(hit_test(Point::new(65, 30)), None);
    }

    #[test]
    fn test_buttons() {
        assert_eq!(hit_test(Point::new(50, 100)), Some(HitTarget::Clear));
        assert_eq!(hit_test(Point::new(50, 160)), Some(HitTarget::Exit));
        assert_eq!(hit_test(Point::new(50, 130)), None);
        assert_eq!(hit_test(Point::new(400, 300)), None);
    }
}

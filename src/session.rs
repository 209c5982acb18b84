// Per-frame decision procedure: turns a gesture reading or a key press into
// canvas edits and session-state changes. No window or camera in here, so the
// whole thing runs under unit tests.

use std::path::PathBuf;

use log::{debug, info};

use crate::canvas::{Brush, Canvas, EraseMode};
use crate::error::Error;
use crate::gesture::{Gesture, GestureReading};
use crate::types::{Color, Point};
use crate::ui::{self, HitTarget};

/// What sits underneath the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackgroundMode {
    #[default]
    Camera,
    WhiteCanvas,
    BlackCanvas,
}

impl BackgroundMode {
    /// Camera -> White -> Black -> Camera.
    pub fn next(self) -> Self {
        match self {
            Self::Camera => Self::WhiteCanvas,
            Self::WhiteCanvas => Self::BlackCanvas,
            Self::BlackCanvas => Self::Camera,
        }
    }

    /// Color an erase stroke paints in `EraseMode::Paint`.
    pub fn erase_color(self) -> Color {
        match self {
            Self::WhiteCanvas => Color::WHITE,
            _ => Color::BLACK,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Camera => "CAMERA",
            Self::WhiteCanvas => "WHITE",
            Self::BlackCanvas => "BLACK",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    pub color: Color,
    pub background: BackgroundMode,
    pub drawing: bool,
    pub last_point: Option<Point>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            background: BackgroundMode::Camera,
            drawing: false,
            last_point: None,
        }
    }
}

impl SessionState {
    /// Drop out of any in-progress stroke. No history entry.
    pub fn end_stroke(&mut self) {
        if self.drawing {
            debug!("Stroke ended");
        }
        self.drawing = false;
        self.last_point = None;
    }
}

/// Stroke widths and erase behavior, fixed for the run.
#[derive(Clone, Debug, PartialEq)]
pub struct BrushSettings {
    pub draw_thickness: u32,
    pub erase_thickness: u32,
    pub erase_mode: EraseMode,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            draw_thickness: 8,
            erase_thickness: 40,
            erase_mode: EraseMode::Paint,
        }
    }
}

/// Single-character keyboard commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyCommand {
    Quit,
    Undo,
    Redo,
    Save,
    CycleBackground,
}

impl KeyCommand {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'q' => Some(Self::Quit),
            'u' => Some(Self::Undo),
            'r' => Some(Self::Redo),
            's' => Some(Self::Save),
            't' => Some(Self::CycleBackground),
            _ => None,
        }
    }
}

/// Whether the loop should keep going after this step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Session {
    pub state: SessionState,
    pub canvas: Canvas,
    brushes: BrushSettings,
    snapshot_path: PathBuf,
}

impl Session {
    pub fn new(canvas: Canvas, brushes: BrushSettings, snapshot_path: PathBuf) -> Self {
        Self {
            state: SessionState::default(),
            canvas,
            brushes,
            snapshot_path,
        }
    }

    fn brush_for(&self, gesture: Gesture) -> Brush {
        match gesture {
            Gesture::Erase => match self.brushes.erase_mode {
                EraseMode::Paint => {
                    Brush::paint(self.state.background.erase_color(), self.brushes.erase_thickness)
                }
                EraseMode::Clear => Brush::eraser(self.brushes.erase_thickness),
            },
            _ => Brush::paint(self.state.color, self.brushes.draw_thickness),
        }
    }

    /// Apply this frame's gesture.
    pub fn apply_gesture(&mut self, reading: &GestureReading) -> Flow {
        let Some(anchor) = reading.anchor else {
            self.state.end_stroke();
            return Flow::Continue;
        };

        match reading.gesture {
            Gesture::Draw | Gesture::Erase => {
                match self.state.last_point {
                    Some(last) if self.state.drawing => {
                        let brush = self.brush_for(reading.gesture);
                        self.canvas.extend_stroke(last, anchor, brush);
                    }
                    _ => {
                        self.canvas.begin_stroke();
                        self.state.drawing = true;
                    }
                }
                self.state.last_point = Some(anchor);
                Flow::Continue
            }
            Gesture::Select => {
                self.state.end_stroke();
                self.select(anchor)
            }
            Gesture::Idle => {
                self.state.end_stroke();
                Flow::Continue
            }
        }
    }

    fn select(&mut self, anchor: Point) -> Flow {
        match ui::hit_test(anchor) {
            Some(HitTarget::Color(color)) => {
                if color != self.state.color {
                    info!("Color picked: ({}, {}, {})", color.r, color.g, color.b);
                }
                self.state.color = color;
            }
            Some(HitTarget::Clear) => self.canvas.clear(),
            Some(HitTarget::Exit) => {
                info!("Exit button selected");
                return Flow::Exit;
            }
            None => {}
        }
        Flow::Continue
    }

    /// Apply a keyboard command. Only a failed save is an error.
    pub fn apply_key(&mut self, command: KeyCommand) -> Result<Flow, Error> {
        match command {
            KeyCommand::Quit => {
                info!("Quit requested");
                return Ok(Flow::Exit);
            }
            KeyCommand::Undo => {
                if self.canvas.undo() {
                    info!("Undo (undo {}, redo {})", self.canvas.undo_len(), self.canvas.redo_len());
                }
            }
            KeyCommand::Redo => {
                if self.canvas.redo() {
                    info!("Redo (undo {}, redo {})", self.canvas.undo_len(), self.canvas.redo_len());
                }
            }
            KeyCommand::Save => self.canvas.save(&self.snapshot_path)?,
            KeyCommand::CycleBackground => {
                self.state.background = self.state.background.next();
                info!("Background: {}", self.state.background.as_str());
            }
        }
        Ok(Flow::Continue)
    }
}

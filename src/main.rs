// What you SEE:
// • Live (mirrored) camera, or a plain white/black sheet, with the palette and
//   CLEAR/EXIT boxes along the top-left.
// • Index finger up: draw. Index + middle up: select a color or press a box.
//   Open palm: erase.
// • Q quits, U undoes, R redoes, S saves drawing.png, T cycles the background.

mod camera;
mod canvas;
mod compose;
mod config;
mod detector;
mod draw;
mod error;
mod gesture;
mod landmarks;
mod session;
mod types;
mod ui;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use camera::CameraCapture;
use canvas::Canvas;
use config::{Config, DetectorConfig, DetectorKind};
use detector::{PointerSource, SubprocessDetector};
use draw::Drawer;
use error::Error;
use gesture::{Gesture, read_hand};
use landmarks::LandmarkSource;
use log::{debug, info, warn};
use session::{Flow, Session};

/// The configured hand tracker, or the mouse when it can't be started.
fn open_landmark_source(config: &DetectorConfig) -> Box<dyn LandmarkSource> {
    if config.kind == DetectorKind::Subprocess {
        match SubprocessDetector::spawn(&config.command, config.min_confidence) {
            Ok(detector) => return Box::new(detector),
            Err(e) => warn!("{e}; falling back to mouse input"),
        }
    }
    info!("Mouse input: left = draw, right = select, both = erase");
    Box::new(PointerSource::new())
}

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path)?;

    /* --- Camera + window setup --- */
    let cam_cfg = &config.camera;
    let mut cam = CameraCapture::new(cam_cfg.index, cam_cfg.width, cam_cfg.height, cam_cfg.mirror)?;
    let (w, h) = cam.resolution();
    let mut drawer = Drawer::new(&config.window.title, w as usize, h as usize, config.window.fullscreen)?;

    let mut source = open_landmark_source(&config.detector);
    info!("Landmark source: {}", source.name());

    /* --- Canvas + session state (survive every background change) --- */
    let canvas = Canvas::new(w, h, config.canvas.history_capacity);
    let mut session = Session::new(canvas, config.canvas.brushes(), config.canvas.snapshot_path.clone());

    /* --- HUD / FPS --- */
    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut hud_fps_text = String::from("FPS: 0.0");
    let mut last_gesture = Gesture::Idle;

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() {
        /* 1) Grab a fresh camera frame. The tracker always looks at the camera;
           the background mode only changes what is shown underneath. */
        let live = match cam.next_frame() {
            Ok(frame) => frame,
            Err(e) => {
                info!("Capture ended: {e}");
                break;
            }
        };

        /* 2) Find the hand and classify it. */
        source.observe_pointer(drawer.pointer());
        let keys = source.detect(&live)?;
        let reading = read_hand(keys.as_ref(), live.width, live.height);
        if reading.gesture != last_gesture {
            debug!("Gesture {} -> {} ({} fingers)", last_gesture.as_str(), reading.gesture.as_str(), reading.fingers);
            last_gesture = reading.gesture;
        }

        /* 3) Draw / erase / select. */
        if session.apply_gesture(&reading) == Flow::Exit {
            break;
        }

        /* 4) Compose: background, controls, canvas, hand, HUD. */
        let mode = session.state.background;
        let mut screen = compose::background(mode, &live);
        compose::draw_controls(&mut screen);
        compose::blend_canvas(&mut screen, session.canvas.image());
        if config.overlay.show_landmarks {
            if let Some(keys) = &keys {
                compose::draw_hand(&mut screen, keys);
            }
        }
        compose::draw_anchor(&mut screen, &reading, session.state.color);
        if config.overlay.show_hud {
            compose::draw_hud(&mut screen, mode, &reading, session.state.color, &hud_fps_text);
        }

        /* 5) Present; this also pumps keyboard and mouse events. */
        drawer.present(&screen)?;

        /* 6) Keyboard commands. */
        if let Some(command) = drawer.poll_command() {
            if session.apply_key(command)? == Flow::Exit {
                break;
            }
        }

        /* 7) FPS counter (HUD + debug log once per second) */
        frames_this_second += 1;
        let now = Instant::now();
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            let fps = frames_this_second as f32 / secs;
            debug!("FPS: {:.1}", fps);
            hud_fps_text = format!("FPS: {:.1}", fps);
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    info!("Session over");
    Ok(())
}

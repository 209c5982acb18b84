// Landmark sources: an external hand-landmark model running as a child
// process, and a mouse-driven stand-in for machines without one.
//
// Child process protocol: on startup the child prints `READY` on its own
// line. For each frame we write `width`, `height`, `channels` (u32
// little-endian each) followed by the raw RGB bytes, and read back exactly
// one JSON line:
//
//   {"hands":[{"score":0.93,"landmarks":[{"x":0.41,"y":0.62}, ...21 points]}],"error":null}

use std::io::{self, BufRead, BufReader, Write};
use std::ops::RangeInclusive;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use log::{debug, info, warn};
use serde::Deserialize;

use crate::error::Error;
use crate::gesture::Finger;
use crate::landmarks::{KeypointSet, LANDMARK_COUNT, Landmark, LandmarkSource, PointerState, index};
use crate::types::FrameBuffer;

#[derive(Deserialize, Debug)]
struct LandmarkJson {
    x: f32,
    y: f32,
}

#[derive(Deserialize, Debug)]
struct HandJson {
    #[serde(default = "full_score")]
    score: f32,
    landmarks: Vec<LandmarkJson>,
}

fn full_score() -> f32 {
    1.0
}

/// Normalized coordinates a hand may report. Fingertips near the frame edge
/// land slightly outside [0,1]; anything further (or NaN/inf) is garbage.
const COORD_RANGE: RangeInclusive<f32> = -0.5..=1.5;

fn in_range(lm: &LandmarkJson) -> bool {
    COORD_RANGE.contains(&lm.x) && COORD_RANGE.contains(&lm.y)
}

#[derive(Deserialize, Debug)]
struct DetectionResult {
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

/// Pick the first confident, well-formed hand out of one response line.
fn parse_response(line: &str, min_confidence: f32) -> Result<Option<KeypointSet>, Error> {
    let result: DetectionResult = serde_json::from_str(line.trim())
        .map_err(|e| Error::Detector(format!("Bad response {:?}: {e}", line.trim())))?;

    if let Some(error) = result.error {
        warn!("Detector reported: {error}");
        return Ok(None);
    }

    for hand in result.hands {
        if hand.score < min_confidence {
            continue;
        }
        if let Some(bad) = hand.landmarks.iter().find(|lm| !in_range(lm)) {
            warn!("Skipping hand with out-of-range landmark ({}, {})", bad.x, bad.y);
            continue;
        }
        let points: Vec<Landmark> = hand
            .landmarks
            .iter()
            .map(|lm| Landmark::new(lm.x, lm.y))
            .collect();
        match KeypointSet::from_slice(&points) {
            Some(keys) => return Ok(Some(keys)),
            None => warn!("Expected {LANDMARK_COUNT} landmarks, got {}", points.len()),
        }
    }
    Ok(None)
}

/// Hand-landmark model running in a child process.
pub struct SubprocessDetector {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    min_confidence: f32,
}

impl SubprocessDetector {
    /// Spawn `command` and wait for its READY line.
    pub fn spawn(command: &[String], min_confidence: f32) -> Result<Self, Error> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| Error::Detector("No detector command configured".into()))?;

        info!("Starting hand detector: {}", command.join(" "));
        let mut process = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| Error::Detector(format!("Spawn {program}: {e}")))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| Error::Detector("Child stdin unavailable".into()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| Error::Detector("Child stdout unavailable".into()))?;

        let mut detector = Self {
            process,
            stdin,
            stdout: BufReader::new(stdout),
            min_confidence: min_confidence.clamp(0.0, 1.0),
        };

        let ready = detector.read_line()?;
        if ready.trim() != "READY" {
            return Err(Error::Detector(format!("Expected READY, got {:?}", ready.trim())));
        }
        info!("Hand detector ready");
        Ok(detector)
    }

    fn read_line(&mut self) -> Result<String, Error> {
        let mut line = String::new();
        let n = self
            .stdout
            .read_line(&mut line)
            .map_err(|e| Error::Detector(format!("Read: {e}")))?;
        if n == 0 {
            return Err(Error::Detector("Detector closed its output".into()));
        }
        Ok(line)
    }

    fn send_frame(&mut self, frame: &FrameBuffer) -> Result<(), Error> {
        write_frame(&mut self.stdin, frame)
            .and_then(|_| self.stdin.flush())
            .map_err(|e| Error::Detector(format!("Write: {e}")))
    }
}

/// Frame header (width, height, channels as u32 LE) followed by RGB bytes.
fn write_frame<W: Write>(out: &mut W, frame: &FrameBuffer) -> io::Result<()> {
    out.write_all(&(frame.width as u32).to_le_bytes())?;
    out.write_all(&(frame.height as u32).to_le_bytes())?;
    out.write_all(&3u32.to_le_bytes())?;
    out.write_all(&frame.to_rgb_bytes())
}

impl LandmarkSource for SubprocessDetector {
    fn detect(&mut self, frame: &FrameBuffer) -> Result<Option<KeypointSet>, Error> {
        if frame.pixels.is_empty() {
            return Ok(None);
        }
        self.send_frame(frame)?;
        let line = self.read_line()?;
        let keys = parse_response(&line, self.min_confidence)?;
        if let Some(keys) = &keys {
            let tip = keys.get(index::INDEX_TIP);
            debug!("Hand detected, index tip=({:.3},{:.3})", tip.x, tip.y);
        }
        Ok(keys)
    }

    fn name(&self) -> &'static str {
        "subprocess"
    }
}

impl Drop for SubprocessDetector {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}

/// Mouse-driven stand-in for a hand model.
///
/// Left button poses an index finger (draw), right button index + middle
/// (select), both buttons an open palm (erase). The index fingertip follows
/// the cursor.
#[derive(Default)]
pub struct PointerSource {
    pointer: PointerState,
}

impl PointerSource {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Build the hand pose the pointer state stands for.
pub fn pointer_pose(pointer: PointerState, width: usize, height: usize) -> Option<KeypointSet> {
    let (px, py) = pointer.pos?;
    if width == 0 || height == 0 {
        return None;
    }
    let up: &[Finger] = match (pointer.left, pointer.right) {
        (true, true) => &Finger::ALL,
        (true, false) => &[Finger::Index],
        (false, true) => &[Finger::Index, Finger::Middle],
        (false, false) => return None,
    };

    let x = (px / width as f32).clamp(0.0, 1.0);
    let y = (py / height as f32).clamp(0.0, 1.0);
    let step = 0.05;

    // Curled by default: tips below their joints, thumb tip right of its joint.
    let mut keys = KeypointSet::new([Landmark::new(x, y); LANDMARK_COUNT]);
    for finger in Finger::ALL {
        let (tip, joint) = finger.landmarks();
        keys.set(joint, Landmark::new(x, y));
        keys.set(tip, Landmark::new(x + step, y + step));
    }
    for finger in up {
        let (tip, joint) = finger.landmarks();
        match finger {
            Finger::Thumb => keys.set(tip, Landmark::new(x - step, y)),
            Finger::Index => {
                // The fingertip is the cursor; its joint sits just below.
                keys.set(tip, Landmark::new(x, y));
                keys.set(joint, Landmark::new(x, y + step));
            }
            _ => keys.set(tip, Landmark::new(x, y - step)),
        }
    }
    Some(keys)
}

impl LandmarkSource for PointerSource {
    fn detect(&mut self, frame: &FrameBuffer) -> Result<Option<KeypointSet>, Error> {
        Ok(pointer_pose(self.pointer, frame.width, frame.height))
    }

    fn observe_pointer(&mut self, pointer: PointerState) {
        self.pointer = pointer;
    }

    fn name(&self) -> &'static str {
        "pointer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{Gesture, classify, read_hand};
    use crate::types::{Color, Point};

    fn response(n: usize, score: f32) -> String {
        let pts: Vec<String> = (0..n).map(|i| format!("{{\"x\":0.{i:02},\"y\":0.5}}")).collect();
        format!("{{\"hands\":[{{\"score\":{score},\"landmarks\":[{}]}}]}}\n", pts.join(","))
    }

    #[test]
    fn test_parse_good_response() {
        let keys = parse_response(&response(21, 0.9), 0.7).unwrap().unwrap();
        assert!((keys.get(3).x - 0.03).abs() < 1e-6);
        assert!((keys.get(20).x - 0.20).abs() < 1e-6);
    }

    #[test]
    fn test_parse_skips_weak_and_malformed_hands() {
        assert!(parse_response(&response(21, 0.5), 0.7).unwrap().is_none());
        assert!(parse_response(&response(20, 0.9), 0.7).unwrap().is_none());
        assert!(parse_response("{\"hands\":[]}", 0.7).unwrap().is_none());
    }

    #[test]
    fn test_parse_reported_error_is_no_hand() {
        let line = "{\"hands\":[],\"error\":\"model crashed\"}";
        assert!(parse_response(line, 0.7).unwrap().is_none());
    }

    #[test]
    fn test_parse_garbage_is_error() {
        assert!(matches!(parse_response("not json", 0.7), Err(Error::Detector(_))));
    }

    #[test]
    fn test_parse_skips_out_of_range_hand() {
        let mut far = response(21, 0.9).replacen("\"x\":0.00", "\"x\":1e30", 1);
        assert!(parse_response(&far, 0.7).unwrap().is_none());
        far = response(21, 0.9).replacen("\"y\":0.5", "\"y\":-3.0", 1);
        assert!(parse_response(&far, 0.7).unwrap().is_none());
    }

    #[test]
    fn test_parse_keeps_slightly_off_frame_hand() {
        let edge = response(21, 0.9).replacen("\"y\":0.5", "\"y\":1.02", 1);
        let keys = parse_response(&edge, 0.7).unwrap().unwrap();
        assert!((keys.get(0).y - 1.02).abs() < 1e-6);
    }

    #[test]
    fn test_parse_takes_first_good_hand() {
        let bad = response(21, 0.9).replacen("\"x\":0.00", "\"x\":1e30", 1);
        let good = response(21, 0.8);
        let bad_hand = &bad[10..bad.len() - 3];
        let good_hand = &good[10..good.len() - 3];
        let line = format!("{{\"hands\":[{bad_hand},{good_hand}]}}");
        let keys = parse_response(&line, 0.7).unwrap().unwrap();
        assert!((keys.get(0).x - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_frame_header_layout() {
        let frame = FrameBuffer::filled(2, 1, Color::rgb(10, 20, 30));
        let mut out = Vec::new();
        write_frame(&mut out, &frame).unwrap();
        assert_eq!(&out[0..4], &2u32.to_le_bytes());
        assert_eq!(&out[4..8], &1u32.to_le_bytes());
        assert_eq!(&out[8..12], &3u32.to_le_bytes());
        assert_eq!(&out[12..], &[10, 20, 30, 10, 20, 30]);
    }

    #[test]
    fn test_spawn_without_command_fails() {
        assert!(SubprocessDetector::spawn(&[], 0.7).is_err());
    }

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".into(), "-c".into(), script.into()]
    }

    #[cfg(unix)]
    #[test]
    fn test_subprocess_round_trip() {
        // Swallow one 2x1 frame (12 header bytes + 6 RGB), answer, then exit.
        let reply = response(21, 0.9);
        let script = format!("echo READY; head -c 18 >/dev/null; echo '{}'", reply.trim());
        let mut detector = SubprocessDetector::spawn(&sh(&script), 0.7).unwrap();

        let frame = FrameBuffer::filled(2, 1, Color::WHITE);
        let keys = detector.detect(&frame).unwrap().unwrap();
        assert!((keys.get(8).x - 0.08).abs() < 1e-6);

        // The child is gone now.
        assert!(matches!(detector.detect(&frame), Err(Error::Detector(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_spawn_rejects_missing_ready() {
        match SubprocessDetector::spawn(&sh("echo hello; sleep 5"), 0.7) {
            Err(Error::Detector(msg)) => assert!(msg.contains("READY"), "{msg}"),
            other => panic!("expected handshake error, got {:?}", other.err()),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_child_exiting_after_ready_is_error() {
        let mut detector = SubprocessDetector::spawn(&sh("echo READY"), 0.7).unwrap();
        let frame = FrameBuffer::filled(2, 1, Color::WHITE);
        assert!(matches!(detector.detect(&frame), Err(Error::Detector(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_drop_kills_child() {
        let detector = SubprocessDetector::spawn(&sh("echo READY; sleep 30"), 0.7).unwrap();
        let start = std::time::Instant::now();
        drop(detector);
        assert!(start.elapsed() < std::time::Duration::from_secs(10));
    }

    fn pointer(left: bool, right: bool) -> PointerState {
        PointerState { pos: Some((320.0, 240.0)), left, right }
    }

    #[test]
    fn test_pointer_buttons_map_to_gestures() {
        let pose = |p| pointer_pose(p, 640, 480).unwrap();
        assert_eq!(classify(&pose(pointer(true, false))), Gesture::Draw);
        assert_eq!(classify(&pose(pointer(false, true))), Gesture::Select);
        assert_eq!(classify(&pose(pointer(true, true))), Gesture::Erase);
        assert!(pointer_pose(pointer(false, false), 640, 480).is_none());
    }

    #[test]
    fn test_pointer_anchor_follows_cursor() {
        let keys = pointer_pose(pointer(true, false), 640, 480).unwrap();
        let reading = read_hand(Some(&keys), 640, 480);
        assert_eq!(reading.anchor, Some(Point::new(320, 240)));
    }

    #[test]
    fn test_pointer_source_detects_after_observe() {
        let frame = FrameBuffer::filled(640, 480, Color::BLACK);
        let mut source = PointerSource::new();
        assert!(source.detect(&frame).unwrap().is_none());
        source.observe_pointer(pointer(true, false));
        assert!(source.detect(&frame).unwrap().is_some());
        source.observe_pointer(PointerState::default());
        assert!(source.detect(&frame).unwrap().is_none());
    }
}

//! Landmark Sequence Loader
//!
//! Decodes recorded landmark frames from JSON. Two document shapes are
//! accepted:
//!
//! ```text
//! { "frames": [ { "pose": [...], "left_hand": [...], ... }, ... ] }
//! [ { "pose": [...], ... }, ... ]
//! ```
//!
//! Each point is either an `[x, y, z]` triplet (extra elements ignored) or
//! an `{ "x", "y", "z" }` object. `null` coordinates decode as NaN and are
//! rejected later by the landmark validator. Missing groups decode as empty
//! lists. A hand list that is neither empty nor complete is cleared with a
//! warning so downstream code only sees whole hands.

use std::path::Path;

use marionette_core::{LandmarkFrame, LandmarkPoint, LandmarkSequence, MarionetteError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

const FACE: &str = "face";
const POSE: &str = "pose";
const LEFT_HAND: &str = "left_hand";
const RIGHT_HAND: &str = "right_hand";

/// Reads and decodes a sequence file.
pub fn load_sequence_from_file<P: AsRef<Path>>(path: P) -> Result<LandmarkSequence> {
    let path = path.as_ref();
    log::info!("Loading landmark sequence from: {}", path.display());
    let bytes = std::fs::read(path)?;
    load_sequence_from_slice(&bytes)
}

pub fn load_sequence_from_str(json: &str) -> Result<LandmarkSequence> {
    let document: Value = serde_json::from_str(json)?;
    decode_document(&document)
}

pub fn load_sequence_from_slice(bytes: &[u8]) -> Result<LandmarkSequence> {
    let document: Value = serde_json::from_slice(bytes)?;
    decode_document(&document)
}

fn decode_document(document: &Value) -> Result<LandmarkSequence> {
    let frames = match document {
        Value::Array(frames) => frames,
        Value::Object(map) => match map.get("frames") {
            Some(Value::Array(frames)) => frames,
            Some(other) => {
                return Err(MarionetteError::MalformedSequence(format!(
                    "`frames` must be a list, found {}",
                    kind(other)
                )));
            }
            None => return Err(MarionetteError::MalformedSequence("missing `frames` key".to_string())),
        },
        other => {
            return Err(MarionetteError::MalformedSequence(format!(
                "expected a list of frames, found {}",
                kind(other)
            )));
        }
    };

    if frames.is_empty() {
        return Err(MarionetteError::EmptySequence);
    }

    let frames = frames
        .iter()
        .enumerate()
        .map(|(index, frame)| decode_frame(index, frame))
        .collect::<Result<Vec<_>>>()?;

    log::info!("Loaded {} landmark frames", frames.len());
    Ok(LandmarkSequence::new(frames))
}

fn decode_frame(index: usize, value: &Value) -> Result<LandmarkFrame> {
    let Value::Object(map) = value else {
        return Err(MarionetteError::MalformedLandmark {
            frame: index,
            key: "frame",
            index: 0,
            reason: format!("expected an object, found {}", kind(value)),
        });
    };

    let mut frame = LandmarkFrame {
        face: decode_group(index, map, FACE)?,
        pose: decode_group(index, map, POSE)?,
        left_hand: decode_group(index, map, LEFT_HAND)?,
        right_hand: decode_group(index, map, RIGHT_HAND)?,
    };

    for side in frame.enforce_hand_invariant() {
        log::warn!("Frame {index}: incomplete {side} hand discarded");
    }
    Ok(frame)
}

fn decode_group(frame: usize, map: &Map<String, Value>, key: &'static str) -> Result<Vec<LandmarkPoint>> {
    let points = match map.get(key) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(points)) => points,
        Some(other) => {
            return Err(MarionetteError::MalformedLandmark {
                frame,
                key,
                index: 0,
                reason: format!("expected a list of points, found {}", kind(other)),
            });
        }
    };

    points
        .iter()
        .enumerate()
        .map(|(index, point)| {
            LandmarkPoint::deserialize(point).map_err(|err| MarionetteError::MalformedLandmark {
                frame,
                key,
                index,
                reason: err.to_string(),
            })
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marionette_core::Side;

    fn hand_json(n: usize) -> String {
        let points = vec!["[0.5, 0.5, 0.0]"; n];
        format!("[{}]", points.join(","))
    }

    #[test]
    fn wrapped_and_bare_documents() {
        let wrapped = load_sequence_from_str(r#"{ "frames": [ { "pose": [[0.5, 0.4, 0.0]] } ] }"#).unwrap();
        let bare = load_sequence_from_str(r#"[ { "pose": [{ "x": 0.5, "y": 0.4, "z": 0.0 }] } ]"#).unwrap();
        assert_eq!(wrapped, bare);
        assert_eq!(wrapped.len(), 1);
        assert_eq!(wrapped.frames[0].pose[0], LandmarkPoint::new(0.5, 0.4, 0.0));
        assert!(wrapped.frames[0].left_hand.is_empty());
    }

    #[test]
    fn null_coordinate_is_nan() {
        let seq = load_sequence_from_str(r#"[ { "pose": [[null, 0.4, 0.0, 0.99]] } ]"#).unwrap();
        let point = seq.frames[0].pose[0];
        assert!(point.x.is_nan());
        assert!(!point.is_valid());
    }

    #[test]
    fn partial_hand_is_cleared() {
        let json = format!(
            r#"[ {{ "left_hand": {}, "right_hand": {} }} ]"#,
            hand_json(12),
            hand_json(21)
        );
        let seq = load_sequence_from_str(&json).unwrap();
        let frame = &seq.frames[0];
        assert!(frame.left_hand.is_empty());
        assert!(frame.hand(Side::Right).is_some());
    }

    #[test]
    fn short_triplet_reports_location() {
        let err = load_sequence_from_str(r#"[ {}, { "right_hand": [[0.1, 0.2]] } ]"#).unwrap_err();
        match err {
            MarionetteError::MalformedLandmark { frame, key, index, .. } => {
                assert_eq!((frame, key, index), (1, "right_hand", 0));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_sequence_is_an_error() {
        assert!(matches!(load_sequence_from_str("[]"), Err(MarionetteError::EmptySequence)));
        assert!(matches!(
            load_sequence_from_str(r#"{ "frames": [] }"#),
            Err(MarionetteError::EmptySequence)
        ));
    }

    #[test]
    fn wrong_container_is_malformed_not_empty() {
        for json in [r#"{ "take": [] }"#, r#"{ "frames": {} }"#, r#"{ "frames": null }"#, "42"] {
            match load_sequence_from_str(json) {
                Err(MarionetteError::MalformedSequence(reason)) => assert!(!reason.is_empty()),
                other => panic!("{json}: unexpected result {other:?}"),
            }
        }
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        assert!(matches!(load_sequence_from_str("{ frames"), Err(MarionetteError::Json(_))));
    }
}

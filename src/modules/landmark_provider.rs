use std::cell::Cell;
use std::path::Path;
use anyhow::Error;
use crate::config::config::DetectorConfig;
use crate::utils::coordinate::LandmarkSet;
use crate::utils::image::{convert_coordinates_to_landmarks, convert_json_track};

/// FrameSource yields decoded frames in presentation order until the video ends.
pub trait FrameSource {
    type Frame;

    fn next_frame(&mut self) -> Result<Option<Self::Frame>, Error>;
}

/// LandmarkProvider locates the face landmarks in a frame, or reports that no face is present.
pub trait LandmarkProvider {
    type Frame;

    fn detect(&self, frame: &Self::Frame) -> Result<Option<LandmarkSet>, Error>;
}

impl<P: LandmarkProvider + ?Sized> LandmarkProvider for &P {
    type Frame = P::Frame;

    fn detect(&self, frame: &Self::Frame) -> Result<Option<LandmarkSet>, Error> {
        (**self).detect(frame)
    }
}

/// A face found by an offline detector run, with its detection score.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedFace {
    pub score: f32,
    pub landmarks: LandmarkSet,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedFrame {
    pub index: usize,
    pub face: Option<RecordedFace>,
}

/// LandmarkTrack replays a per-frame landmark dump as a frame source.
#[derive(Debug, Clone)]
pub struct LandmarkTrack {
    fps: Option<f32>,
    frames: Vec<RecordedFrame>,
    cursor: usize,
}

impl LandmarkTrack {

    /// from_faces builds a track from in-memory faces, one entry per decoded frame.
    pub fn from_faces(faces: Vec<Option<RecordedFace>>) -> Self {
        let frames = faces
            .into_iter()
            .enumerate()
            .map(|(index, face)| RecordedFrame { index, face })
            .collect();
        LandmarkTrack { fps: None, frames, cursor: 0 }
    }

    /// from_json parses a landmark track.
    ///
    /// # Arguments
    /// * `json` - `{"fps": 30.0, "frames": [null, {"score": 0.9, "landmarks": [{"x": .., "y": .., "z": ..}]}]}`
    ///
    /// # Returns
    /// * `Result<LandmarkTrack>`
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        let track_file = convert_json_track(json)?;
        let mut faces: Vec<Option<RecordedFace>> = Vec::with_capacity(track_file.frames.len());
        for frame in &track_file.frames {
            let face = match frame {
                None => None,
                Some(frame) => Some(RecordedFace {
                    score: frame.score,
                    landmarks: convert_coordinates_to_landmarks(&frame.landmarks)?,
                })
            };
            faces.push(face);
        }

        let mut track = Self::from_faces(faces);
        track.fps = track_file.fps;
        Ok(track)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn fps(&self) -> Option<f32> {
        self.fps
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSource for LandmarkTrack {
    type Frame = RecordedFrame;

    fn next_frame(&mut self) -> Result<Option<Self::Frame>, Error> {
        let frame = self.frames.get(self.cursor).cloned();
        if frame.is_some() {
            self.cursor += 1;
        }
        Ok(frame)
    }
}

/// RecordedLandmarks serves the faces stored in recorded frames.
///
/// A face is accepted when its score reaches `min_detection_confidence`, or
/// `min_tracking_confidence` while the previous sampled frame had a face.
#[derive(Debug)]
pub struct RecordedLandmarks {
    config: DetectorConfig,
    tracking: Cell<bool>,
}

impl RecordedLandmarks {
    pub fn new(config: DetectorConfig) -> Self {
        RecordedLandmarks {
            config,
            tracking: Cell::new(false),
        }
    }
}

impl LandmarkProvider for RecordedLandmarks {
    type Frame = RecordedFrame;

    fn detect(&self, frame: &Self::Frame) -> Result<Option<LandmarkSet>, Error> {
        let threshold = if self.tracking.get() {
            self.config.min_tracking_confidence
        } else {
            self.config.min_detection_confidence
        };

        let landmarks = match &frame.face {
            Some(face) if face.score >= threshold => Some(face.landmarks.clone()),
            _ => None
        };
        self.tracking.set(landmarks.is_some());
        Ok(landmarks)
    }
}

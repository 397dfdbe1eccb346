use nalgebra::{Point2, Point3};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinate3D {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

/// One recorded detector output: the face score and its mesh points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceMeshFrame {
    #[serde(default = "full_score")]
    pub score: f32,
    pub landmarks: Vec<Coordinate3D>,
}

fn full_score() -> f32 {
    1.0
}

/// Per-frame landmark dump of a whole video. `null` frames had no face.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarkTrackFile {
    #[serde(default)]
    pub fps: Option<f32>,
    pub frames: Vec<Option<FaceMeshFrame>>,
}

/// LandmarkSet holds the landmarks of one face as an `(n, 3)` array of normalized x, y, z.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    points: Array2<f32>,
}

impl LandmarkSet {
    pub fn new(points: Array2<f32>) -> Result<Self> {
        if points.ncols() != 3 {
            return Err(Error::Landmark(format!(
                "landmark array must have 3 columns, got {}",
                points.ncols()
            )))
        }
        Ok(LandmarkSet { points })
    }

    pub fn len(&self) -> usize {
        self.points.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.points.nrows() == 0
    }

    pub fn points(&self) -> &Array2<f32> {
        &self.points
    }

    pub fn point(&self, index: usize) -> Option<Point3<f32>> {
        if index >= self.len() {
            return None
        }
        let row = self.points.row(index);
        Some(Point3::new(row[0], row[1], row[2]))
    }

    /// subset selects the given landmark rows, in order.
    pub fn subset(&self, indices: &[usize]) -> Result<Array2<f32>> {
        if let Some(&missing) = indices.iter().find(|&&i| i >= self.len()) {
            return Err(Error::Landmark(format!(
                "landmark {} requested but the face has only {} points",
                missing,
                self.len()
            )))
        }
        Ok(self.points.select(Axis(0), indices))
    }

    /// subset_2d projects the selected landmarks onto the image plane.
    pub fn subset_2d(&self, indices: &[usize]) -> Result<Vec<Point2<f32>>> {
        let subset = self.subset(indices)?;
        Ok(subset
            .rows()
            .into_iter()
            .map(|row| Point2::new(row[0], row[1]))
            .collect())
    }
}

use ndarray::Array2;
#[cfg(feature = "opencv")]
use opencv::core::Mat;
#[cfg(feature = "opencv")]
use opencv::imgproc::{COLOR_BGR2RGB, cvt_color};
use crate::error::{Error, Result};
use crate::utils::coordinate::{Coordinate3D, LandmarkSet, LandmarkTrackFile};

/// convert_frame_to_rgb converts a decoded BGR frame to the RGB order landmark detectors expect.
#[cfg(feature = "opencv")]
pub fn convert_frame_to_rgb(frame: &Mat) -> std::result::Result<Mat, anyhow::Error> {
    let mut rgb_frame = Mat::default();
    cvt_color(frame, &mut rgb_frame, COLOR_BGR2RGB, 0)?;
    Ok(rgb_frame)
}

pub fn convert_coordinates_to_ndarray(coordinates: &[Coordinate3D]) -> Result<Array2<f32>> {
    let mut result: Vec<f32> = Vec::with_capacity(coordinates.len() * 3);
    for coordinate in coordinates {
        result.extend_from_slice(&[coordinate.x, coordinate.y, coordinate.z]);
    }

    let arr = match Array2::from_shape_vec((coordinates.len(), 3), result) {
        Ok(arr) => arr,
        Err(e) => return Err(Error::from(e))
    };
    Ok(arr)
}

pub fn convert_coordinates_to_landmarks(coordinates: &[Coordinate3D]) -> Result<LandmarkSet> {
    LandmarkSet::new(convert_coordinates_to_ndarray(coordinates)?)
}

pub fn convert_json_track(json: &str) -> Result<LandmarkTrackFile> {
    serde_json::from_str(json).map_err(|e| Error::Landmark(format!("invalid landmark track: {e}")))
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::utils::coordinate::Coordinate3D;
    use crate::utils::image::{convert_coordinates_to_landmarks, convert_json_track};

    #[test]
    fn test_convert_coordinates_to_landmarks() {
        let coordinates = vec![
            Coordinate3D { x: 0.41, y: 0.52, z: -0.01 },
            Coordinate3D { x: 0.58, y: 0.51, z: 0.02 },
        ];
        let landmarks = convert_coordinates_to_landmarks(&coordinates).unwrap();
        assert_eq!(landmarks.len(), 2);
        let second = landmarks.point(1).unwrap();
        assert_eq!(second.x, 0.58);
        assert_eq!(second.z, 0.02);
    }

    #[test]
    fn test_convert_empty_coordinates() {
        let landmarks = convert_coordinates_to_landmarks(&[]).unwrap();
        assert!(landmarks.is_empty());
    }

    #[test]
    fn test_convert_json_track_error() {
        let result = convert_json_track(r#"{"frames": 3}"#);
        assert!(matches!(result, Err(Error::Landmark(_))));
    }
}

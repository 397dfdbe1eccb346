use nalgebra::{Point2, Vector2, Vector3};
use ndarray::Axis;
use crate::error::{Error, Result};
use crate::utils::coordinate::LandmarkSet;

/// Number of points in a MediaPipe face mesh without iris refinement.
pub const FACE_MESH_POINTS: usize = 468;

pub const LEFT_EYE: [usize; 16] = [362, 382, 381, 380, 374, 373, 390, 249, 263, 466, 388, 387, 386, 385, 384, 398];
pub const RIGHT_EYE: [usize; 16] = [33, 7, 163, 144, 145, 153, 154, 155, 133, 173, 157, 158, 159, 160, 161, 246];
pub const LIPS: [usize; 21] = [61, 146, 91, 181, 84, 17, 314, 405, 321, 375, 291, 308, 324, 318, 402, 317, 14, 87, 178, 88, 95];
pub const LEFT_EYEBROW: [usize; 5] = [276, 283, 282, 295, 285];
pub const RIGHT_EYEBROW: [usize; 5] = [46, 53, 52, 65, 55];

/// Groups with more points than this are measured through their bounding rectangle,
/// smaller groups through the distance between their end points.
const MAX_DISTANCE_GROUP: usize = 4;

/// Landmark index groups of the features the pipeline measures.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkLayout {
    pub left_eye: Vec<usize>,
    pub right_eye: Vec<usize>,
    pub lips: Vec<usize>,
    pub left_eyebrow: Vec<usize>,
    pub right_eyebrow: Vec<usize>,
}

impl LandmarkLayout {
    pub fn face_mesh() -> Self {
        LandmarkLayout {
            left_eye: LEFT_EYE.to_vec(),
            right_eye: RIGHT_EYE.to_vec(),
            lips: LIPS.to_vec(),
            left_eyebrow: LEFT_EYEBROW.to_vec(),
            right_eyebrow: RIGHT_EYEBROW.to_vec(),
        }
    }
}

impl Default for LandmarkLayout {
    fn default() -> Self {
        Self::face_mesh()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometricMetrics {
    pub left_eye_ratio: f32,
    pub right_eye_ratio: f32,
    pub lip_ratio: f32,
    pub left_brow_ratio: f32,
    pub right_brow_ratio: f32,
}

/// Rectangle of minimum area enclosing a point set. `width` is the side lying
/// closest to the image x axis, `angle` is its direction in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatedRect {
    pub center: Point2<f32>,
    pub width: f32,
    pub height: f32,
    pub angle: f32,
}

impl RotatedRect {
    pub fn aspect_ratio(&self) -> f32 {
        if self.width > 0.0 {
            self.height / self.width
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone)]
pub struct FaceHelper {
    layout: LandmarkLayout,
}

impl FaceHelper {

    /// new initializes new instance of face helper module, using the face mesh layout by default.
    pub fn new(in_layout: Option<LandmarkLayout>) -> Self {
        FaceHelper {
            layout: in_layout.unwrap_or_default(),
        }
    }

    pub fn layout(&self) -> &LandmarkLayout {
        &self.layout
    }

    /// aspect_ratio measures the openness of a landmark group.
    ///
    /// Groups of more than four points return `height / width` of the minimum-area
    /// rectangle around their convex hull (0 for a zero-width rectangle). Smaller
    /// groups return the distance between their first and last point.
    ///
    /// # Arguments
    /// * `landmarks` - &LandmarkSet
    /// * `points` - landmark indices of the group
    ///
    /// # Returns
    /// * `Result<f32>`
    pub fn aspect_ratio(&self, landmarks: &LandmarkSet, points: &[usize]) -> Result<f32> {
        let projected = landmarks.subset_2d(points)?;
        Ok(feature_ratio(&projected))
    }

    pub fn geometric_metrics(&self, landmarks: &LandmarkSet) -> Result<GeometricMetrics> {
        Ok(GeometricMetrics {
            left_eye_ratio: self.aspect_ratio(landmarks, &self.layout.left_eye)?,
            right_eye_ratio: self.aspect_ratio(landmarks, &self.layout.right_eye)?,
            lip_ratio: self.aspect_ratio(landmarks, &self.layout.lips)?,
            left_brow_ratio: self.aspect_ratio(landmarks, &self.layout.left_eyebrow)?,
            right_brow_ratio: self.aspect_ratio(landmarks, &self.layout.right_eyebrow)?,
        })
    }

    /// eye_direction returns the angle between the gaze of one eye and the camera axis.
    ///
    /// The gaze vector runs from the mean of the eye group to its middle landmark,
    /// which stands in for the pupil. Returns `None` when the two coincide.
    ///
    /// # Arguments
    /// * `landmarks` - &LandmarkSet
    /// * `eye_points` - landmark indices of the eye
    ///
    /// # Returns
    /// * `Result<Option<f32>>`
    pub fn eye_direction(&self, landmarks: &LandmarkSet, eye_points: &[usize]) -> Result<Option<f32>> {
        let eye_region = landmarks.subset(eye_points)?;
        let center = match eye_region.mean_axis(Axis(0)) {
            None => {
                return Err(Error::Landmark("eye landmark group is empty".to_string()))
            }
            Some(center) => center
        };

        let pupil_index = eye_points[eye_points.len() / 2];
        let pupil = match landmarks.point(pupil_index) {
            None => {
                return Err(Error::Landmark(format!("pupil landmark {pupil_index} is missing")))
            }
            Some(pupil) => pupil
        };

        let gaze = Vector3::new(pupil.x - center[0], pupil.y - center[1], pupil.z - center[2]);
        Ok(gaze_deviation(&gaze))
    }

    /// gaze_deviations returns the left and right eye directions.
    pub fn gaze_deviations(&self, landmarks: &LandmarkSet) -> Result<(Option<f32>, Option<f32>)> {
        let left = self.eye_direction(landmarks, &self.layout.left_eye)?;
        let right = self.eye_direction(landmarks, &self.layout.right_eye)?;
        Ok((left, right))
    }
}

impl Default for FaceHelper {
    fn default() -> Self {
        Self::new(None)
    }
}

/// gaze_deviation is the angle in `[0, π]` between `gaze` and the forward axis (0, 0, 1).
pub fn gaze_deviation(gaze: &Vector3<f32>) -> Option<f32> {
    let norm = gaze.norm();
    if norm == 0.0 || !norm.is_finite() {
        return None
    }
    let forward = Vector3::new(0.0, 0.0, 1.0);
    Some((gaze.dot(&forward) / norm).clamp(-1.0, 1.0).acos())
}

pub fn feature_ratio(points: &[Point2<f32>]) -> f32 {
    if points.len() > MAX_DISTANCE_GROUP {
        let hull = convex_hull(points);
        match min_area_rect(&hull) {
            None => 0.0,
            Some(rect) => rect.aspect_ratio()
        }
    } else {
        match (points.first(), points.last()) {
            (Some(first), Some(last)) => nalgebra::distance(first, last),
            _ => 0.0
        }
    }
}

pub fn is_blinking(eye_ratio: f32, threshold: f32) -> bool {
    eye_ratio < threshold
}

fn cross(o: &Point2<f32>, a: &Point2<f32>, b: &Point2<f32>) -> f32 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// convex_hull returns the hull vertices counter-clockwise, without collinear points.
/// Collinear input collapses to its two end points.
pub fn convex_hull(points: &[Point2<f32>]) -> Vec<Point2<f32>> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();
    if sorted.len() <= 2 {
        return sorted
    }

    let mut lower: Vec<Point2<f32>> = Vec::with_capacity(sorted.len());
    for p in &sorted {
        while lower.len() >= 2 && cross(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(*p);
    }

    let mut upper: Vec<Point2<f32>> = Vec::with_capacity(sorted.len());
    for p in sorted.iter().rev() {
        while upper.len() >= 2 && cross(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(*p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// min_area_rect fits the minimum-area enclosing rectangle of a convex hull by
/// testing every hull edge as a rectangle side.
pub fn min_area_rect(hull: &[Point2<f32>]) -> Option<RotatedRect> {
    let first = hull.first()?;
    if hull.len() == 1 {
        return Some(RotatedRect { center: *first, width: 0.0, height: 0.0, angle: 0.0 })
    }

    let mut best: Option<(f32, Vector2<f32>, Vector2<f32>, (f32, f32), (f32, f32))> = None;
    for i in 0..hull.len() {
        let edge = hull[(i + 1) % hull.len()] - hull[i];
        let length = edge.norm();
        if length == 0.0 {
            continue
        }
        let u = edge / length;
        let v = Vector2::new(-u.y, u.x);

        let mut u_range = (f32::INFINITY, f32::NEG_INFINITY);
        let mut v_range = (f32::INFINITY, f32::NEG_INFINITY);
        for p in hull {
            let pu = p.coords.dot(&u);
            let pv = p.coords.dot(&v);
            u_range = (u_range.0.min(pu), u_range.1.max(pu));
            v_range = (v_range.0.min(pv), v_range.1.max(pv));
        }

        let area = (u_range.1 - u_range.0) * (v_range.1 - v_range.0);
        if best.as_ref().map_or(true, |b| area < b.0) {
            best = Some((area, u, v, u_range, v_range));
        }
    }

    let (_, u, v, u_range, v_range) = best?;
    let center = Point2::from(u * ((u_range.0 + u_range.1) / 2.0) + v * ((v_range.0 + v_range.1) / 2.0));
    let u_extent = u_range.1 - u_range.0;
    let v_extent = v_range.1 - v_range.0;

    let (width, height, axis) = if u.x.abs() >= v.x.abs() {
        (u_extent, v_extent, u)
    } else {
        (v_extent, u_extent, v)
    };

    Some(RotatedRect {
        center,
        width,
        height,
        angle: axis.y.atan2(axis.x),
    })
}


#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_6};
    use nalgebra::{Point2, Rotation2, Vector3};
    use ndarray::Array2;
    use crate::error::Error;
    use crate::helper::face_helper::{convex_hull, feature_ratio, gaze_deviation, is_blinking, min_area_rect, FaceHelper, LandmarkLayout, FACE_MESH_POINTS, LEFT_EYE, LIPS};
    use crate::utils::coordinate::LandmarkSet;

    fn landmarks(points: &[[f32; 3]]) -> LandmarkSet {
        let flat: Vec<f32> = points.iter().flatten().copied().collect();
        LandmarkSet::new(Array2::from_shape_vec((points.len(), 3), flat).unwrap()).unwrap()
    }

    #[test]
    fn test_convex_hull_drops_interior_and_collinear_points() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 0.5),
        ];
        let hull = convex_hull(&points);
        assert_eq!(hull.len(), 4);
        assert!(!hull.contains(&Point2::new(1.0, 0.5)));
        assert!(!hull.contains(&Point2::new(1.0, 0.0)));
    }

    #[test]
    fn test_collinear_hull_keeps_end_points() {
        let points: Vec<Point2<f32>> = (0..6).map(|i| Point2::new(i as f32 * 0.1, 0.3)).collect();
        let hull = convex_hull(&points);
        assert_eq!(hull.len(), 2);
    }

    #[test]
    fn test_axis_aligned_rectangle_ratio() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        assert!((feature_ratio(&points) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_rotated_rectangle_ratio() {
        let rotation = Rotation2::new(FRAC_PI_6);
        let corners = [(-2.0, -0.5), (2.0, -0.5), (2.0, 0.5), (-2.0, 0.5), (0.0, 0.0), (1.0, 0.2)];
        let points: Vec<Point2<f32>> = corners
            .iter()
            .map(|&(x, y)| rotation * Point2::new(x, y))
            .collect();

        let rect = min_area_rect(&convex_hull(&points)).unwrap();
        assert!((rect.width - 4.0).abs() < 1e-4);
        assert!((rect.height - 1.0).abs() < 1e-4);
        assert!((feature_ratio(&points) - 0.25).abs() < 1e-4);
    }

    #[test]
    fn test_zero_width_rectangle_is_zero() {
        let vertical: Vec<Point2<f32>> = (0..5).map(|i| Point2::new(0.4, i as f32 * 0.01)).collect();
        assert_eq!(feature_ratio(&vertical), 0.0);

        let same: Vec<Point2<f32>> = vec![Point2::new(0.5, 0.5); 6];
        assert_eq!(feature_ratio(&same), 0.0);

        let horizontal: Vec<Point2<f32>> = (0..5).map(|i| Point2::new(i as f32 * 0.01, 0.4)).collect();
        assert_eq!(feature_ratio(&horizontal), 0.0);
    }

    #[test]
    fn test_small_group_uses_end_point_distance() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.5, 0.9),
            Point2::new(3.0, 4.0),
        ];
        assert!((feature_ratio(&points) - 5.0).abs() < 1e-6);

        let four = vec![
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
            Point2::new(3.0, 1.0),
            Point2::new(1.0, 2.0),
        ];
        assert!((feature_ratio(&four) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_gaze_deviation() {
        assert!(gaze_deviation(&Vector3::new(0.0, 0.0, 0.2)).unwrap().abs() < 1e-3);
        let sideways = gaze_deviation(&Vector3::new(1.0, 0.0, 0.0)).unwrap();
        assert!((sideways - FRAC_PI_2).abs() < 1e-6);
        let backwards = gaze_deviation(&Vector3::new(0.0, 0.0, -3.0)).unwrap();
        assert!((backwards - std::f32::consts::PI).abs() < 1e-6);
        assert_eq!(gaze_deviation(&Vector3::zeros()), None);
    }

    #[test]
    fn test_eye_direction_uses_middle_point_as_pupil() {
        let helper = FaceHelper::default();
        let set = landmarks(&[[0.0, 0.0, 0.0], [0.0, 0.0, 0.3], [0.0, 0.0, 0.0]]);
        let straight = helper.eye_direction(&set, &[0, 1, 2]).unwrap().unwrap();
        assert!(straight.abs() < 1e-3);

        let set = landmarks(&[[-1.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 0.0]]);
        let angle = helper.eye_direction(&set, &[0, 1, 2]).unwrap().unwrap();
        assert!((angle - FRAC_PI_2).abs() < 1e-6);

        let set = landmarks(&[[0.2, 0.2, 0.0]; 3]);
        assert_eq!(helper.eye_direction(&set, &[0, 1, 2]).unwrap(), None);
    }

    #[test]
    fn test_eye_direction_missing_landmarks() {
        let helper = FaceHelper::default();
        let set = landmarks(&[[0.0, 0.0, 0.0]; 10]);
        let result = helper.eye_direction(&set, &LEFT_EYE);
        assert!(matches!(result, Err(Error::Landmark(_))));
    }

    #[test]
    fn test_geometric_metrics_on_flat_face() {
        let helper = FaceHelper::new(None);
        let set = landmarks(&vec![[0.5, 0.5, 0.0]; FACE_MESH_POINTS]);
        let metrics = helper.geometric_metrics(&set).unwrap();
        assert_eq!(metrics.left_eye_ratio, 0.0);
        assert_eq!(metrics.lip_ratio, 0.0);
        assert_eq!(metrics.right_brow_ratio, 0.0);
    }

    #[test]
    fn test_custom_layout() {
        let layout = LandmarkLayout {
            left_eye: vec![0, 1, 2],
            right_eye: vec![0, 1, 2],
            lips: vec![0, 1, 2, 3, 4],
            left_eyebrow: vec![0, 3],
            right_eyebrow: vec![0, 4],
        };
        let helper = FaceHelper::new(Some(layout));
        let set = landmarks(&[
            [0.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [2.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 0.5, 0.0],
        ]);
        let metrics = helper.geometric_metrics(&set).unwrap();
        assert!((metrics.lip_ratio - 0.5).abs() < 1e-6);
        assert!((metrics.left_brow_ratio - 1.0).abs() < 1e-6);
        assert!((metrics.left_eye_ratio - 5f32.sqrt()).abs() < 1e-6);
        assert_eq!(LIPS.len(), 21);
    }

    #[test]
    fn test_is_blinking() {
        assert!(is_blinking(0.1, 0.2));
        assert!(!is_blinking(0.2, 0.2));
    }
}

use num_traits::Float;
use serde::{Deserialize, Serialize};

/// An axis aligned box stored as four floats.
///
/// The layout is implicit: corner format `[x1, y1, x2, y2]` or center format
/// `[cx, cy, w, h]`. The converters below change the layout in place.
pub type BBox = [f32; 4];

/// One ground truth object: a box in corner format and its class label.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Box in corner format `[x1, y1, x2, y2]`.
    pub bbox: BBox,
    /// Class index, stored as float like the rest of the label row.
    pub label: f32,
}

impl Target {
    /// Create a target from corner coordinates and a label.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, label: f32) -> Self {
        Self {
            bbox: [x1, y1, x2, y2],
            label,
        }
    }
}

/// Convert boxes from `[x1, y1, x2, y2]` to `[cx, cy, w, h]` in place.
///
/// # Example
///
/// ```
/// use yolox_transforms::boxes::xyxy2cxcywh;
///
/// let mut boxes = [[10.0, 20.0, 30.0, 60.0]];
/// xyxy2cxcywh(&mut boxes);
/// assert_eq!(boxes, [[20.0, 40.0, 20.0, 40.0]]);
/// ```
pub fn xyxy2cxcywh<T: Float>(boxes: &mut [[T; 4]]) {
    let two = T::one() + T::one();
    for b in boxes.iter_mut() {
        b[2] = b[2] - b[0];
        b[3] = b[3] - b[1];
        b[0] = b[0] + b[2] / two;
        b[1] = b[1] + b[3] / two;
    }
}

/// Convert boxes from `[x1, y1, x2, y2]` to `[x1, y1, w, h]` in place.
pub fn xyxy2xywh<T: Float>(boxes: &mut [[T; 4]]) {
    for b in boxes.iter_mut() {
        b[2] = b[2] - b[0];
        b[3] = b[3] - b[1];
    }
}

/// Convert boxes from `[cx, cy, w, h]` back to `[x1, y1, x2, y2]` in place.
pub fn cxcywh2xyxy<T: Float>(boxes: &mut [[T; 4]]) {
    let two = T::one() + T::one();
    for b in boxes.iter_mut() {
        let (w, h) = (b[2], b[3]);
        b[0] = b[0] - w / two;
        b[1] = b[1] - h / two;
        b[2] = b[0] + w;
        b[3] = b[1] + h;
    }
}

/// Thresholds used to decide whether a box survives a geometric augmentation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxCandidateParams {
    /// Minimum width and height in pixels after the transform.
    pub wh_thr: f64,
    /// Maximum aspect ratio `max(w/h, h/w)` after the transform.
    pub ar_thr: f64,
    /// Minimum ratio between the area after and the area before.
    pub area_thr: f64,
}

impl Default for BoxCandidateParams {
    fn default() -> Self {
        Self {
            wh_thr: 2.0,
            ar_thr: 20.0,
            area_thr: 0.2,
        }
    }
}

const EPS: f64 = 1e-16;

/// Decide which boxes are kept after a geometric augmentation.
///
/// `before` holds the boxes prior to the transform, already multiplied by the
/// sampled scale factor, and `after` the transformed and clipped boxes; both
/// in corner format. Boxes are paired element-wise.
///
/// A box is kept when its new width and height both exceed `wh_thr`, its area
/// ratio exceeds `area_thr` and its aspect ratio stays below `ar_thr`.
///
/// # Example
///
/// ```
/// use yolox_transforms::boxes::{box_candidates, BoxCandidateParams};
///
/// let before = [[0.0f32, 0.0, 10.0, 10.0], [0.0, 0.0, 10.0, 10.0]];
/// let after = [[0.0f32, 0.0, 10.0, 10.0], [0.0, 0.0, 1.5, 10.0]];
///
/// let keep = box_candidates(&before, &after, &BoxCandidateParams::default());
/// assert_eq!(keep, vec![true, false]);
/// ```
pub fn box_candidates<T>(
    before: &[[T; 4]],
    after: &[[T; 4]],
    params: &BoxCandidateParams,
) -> Vec<bool>
where
    T: Copy + Into<f64>,
{
    before
        .iter()
        .zip(after.iter())
        .map(|(b1, b2)| {
            let w1 = b1[2].into() - b1[0].into();
            let h1 = b1[3].into() - b1[1].into();
            let w2 = b2[2].into() - b2[0].into();
            let h2 = b2[3].into() - b2[1].into();

            let ar = (w2 / (h2 + EPS)).max(h2 / (w2 + EPS));

            w2 > params.wh_thr
                && h2 > params.wh_thr
                && w2 * h2 / (w1 * h1 + EPS) > params.area_thr
                && ar < params.ar_thr
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cxcywh_round_trip() {
        let original = [[1.0, 2.0, 5.0, 10.0], [0.5, 0.25, 100.0, 40.75]];
        let mut boxes = original;
        xyxy2cxcywh(&mut boxes);
        assert_eq!(boxes[0], [3.0, 6.0, 4.0, 8.0]);

        cxcywh2xyxy(&mut boxes);
        for (b, o) in boxes.iter().zip(original.iter()) {
            for k in 0..4 {
                assert_relative_eq!(b[k], o[k], epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn xywh_keeps_corner() {
        let mut boxes = [[4.0, 6.0, 10.0, 7.0]];
        xyxy2xywh(&mut boxes);
        assert_eq!(boxes, [[4.0, 6.0, 6.0, 1.0]]);
    }

    #[test]
    fn candidates_reject_small_boxes() {
        let params = BoxCandidateParams::default();
        let before = [[0.0f64, 0.0, 2.0, 50.0], [0.0, 0.0, 50.0, 2.0]];
        let after = before;
        assert_eq!(box_candidates(&before, &after, &params), vec![false, false]);
    }

    #[test]
    fn candidates_reject_elongated_boxes() {
        let params = BoxCandidateParams::default();
        // aspect ratio exactly 20 is rejected
        let before = [[0.0f32, 0.0, 100.0, 5.0], [0.0, 0.0, 99.0, 5.0]];
        let after = before;
        assert_eq!(box_candidates(&before, &after, &params), vec![false, true]);
    }

    #[test]
    fn candidates_reject_shrunk_area() {
        let params = BoxCandidateParams::default();
        let before = [[0.0f32, 0.0, 100.0, 100.0], [0.0, 0.0, 100.0, 100.0]];
        let after = [[0.0f32, 0.0, 40.0, 50.0], [0.0, 0.0, 45.0, 50.0]];
        // 2000 / 10000 = 0.2 is not above the threshold
        assert_eq!(box_candidates(&before, &after, &params), vec![false, true]);
    }

    #[test]
    fn params_from_json() -> Result<(), serde_json::Error> {
        let params: BoxCandidateParams = serde_json::from_str(r#"{"wh_thr": 4.0}"#)?;
        assert_eq!(params.wh_thr, 4.0);
        assert_eq!(params.ar_thr, 20.0);
        Ok(())
    }
}

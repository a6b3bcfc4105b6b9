//! Anchor point grids and the geometric pre-assignment of ground truth boxes.
//!
//! Every detection head with stride `s` predicts on a `floor(H / s) x floor(W / s)`
//! grid. The grids of all heads are flattened row major and concatenated in
//! stride order, which is the layout of the model output.
//!
//! ```
//! use yolox_transforms::anchors::{get_in_boxes_info, AnchorGrid};
//!
//! let grid = AnchorGrid::new(&[8, 16, 32], (640, 640)).unwrap();
//! assert_eq!(grid.len(), 8400);
//!
//! // one box of 32x32 pixels centered at (100, 100), one padding slot
//! let boxes = [[100.0, 100.0, 32.0, 32.0], [0.0; 4]];
//! let info = get_in_boxes_info(&grid, &boxes, 1);
//! assert_eq!(info.is_in_boxes_all.shape, [2, 8400]);
//! ```

use yolox_tensor::Tensor2;

use crate::boxes::BBox;
use crate::error::TransformError;

/// Half width of the center region, in units of the anchor stride.
pub const CENTER_RADIUS: f32 = 2.5;

/// The anchor points of all detection heads.
#[derive(Clone, Debug, PartialEq)]
pub struct AnchorGrid {
    x_shifts: Vec<f32>,
    y_shifts: Vec<f32>,
    expanded_strides: Vec<f32>,
}

impl AnchorGrid {
    /// Build the anchor grid for the given strides and `(height, width)` input size.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::InvalidConfig`] if a stride is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use yolox_transforms::anchors::AnchorGrid;
    ///
    /// let grid = AnchorGrid::new(&[2, 4], (4, 6)).unwrap();
    /// // 2x3 cells for stride 2, 1x1 for stride 4
    /// assert_eq!(grid.len(), 7);
    /// assert_eq!(grid.x_shifts(), &[0.0, 1.0, 2.0, 0.0, 1.0, 2.0, 0.0]);
    /// assert_eq!(grid.y_shifts(), &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0]);
    /// assert_eq!(grid.expanded_strides(), &[2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 4.0]);
    /// ```
    pub fn new(strides: &[u32], input_size: (usize, usize)) -> Result<Self, TransformError> {
        let (height, width) = input_size;

        let mut x_shifts = Vec::new();
        let mut y_shifts = Vec::new();
        let mut expanded_strides = Vec::new();

        for &stride in strides {
            if stride == 0 {
                return Err(TransformError::InvalidConfig(
                    "anchor strides must be positive".to_string(),
                ));
            }
            let rows = height / stride as usize;
            let cols = width / stride as usize;
            for y in 0..rows {
                for x in 0..cols {
                    x_shifts.push(x as f32);
                    y_shifts.push(y as f32);
                    expanded_strides.push(stride as f32);
                }
            }
        }

        Ok(Self {
            x_shifts,
            y_shifts,
            expanded_strides,
        })
    }

    /// Column index of every anchor within its own grid.
    pub fn x_shifts(&self) -> &[f32] {
        &self.x_shifts
    }

    /// Row index of every anchor within its own grid.
    pub fn y_shifts(&self) -> &[f32] {
        &self.y_shifts
    }

    /// Stride of the head each anchor belongs to.
    pub fn expanded_strides(&self) -> &[f32] {
        &self.expanded_strides
    }

    /// Total number of anchors over all heads.
    pub fn len(&self) -> usize {
        self.x_shifts.len()
    }

    /// Returns `true` if no head has a single cell.
    pub fn is_empty(&self) -> bool {
        self.x_shifts.is_empty()
    }

    /// Center of anchor `i` in input pixels, `(shift + 0.5) * stride`.
    pub fn center(&self, i: usize) -> (f64, f64) {
        let stride = self.expanded_strides[i] as f64;
        (
            self.x_shifts[i] as f64 * stride + 0.5 * stride,
            self.y_shifts[i] as f64 * stride + 0.5 * stride,
        )
    }
}

/// Membership of anchors in ground truth boxes, one row per box slot.
#[derive(Clone, Debug, PartialEq)]
pub struct InBoxesInfo {
    /// The anchor center lies in the box or in its center region.
    pub is_in_boxes_all: Tensor2<bool>,
    /// The anchor center lies in the box and in its center region.
    pub is_in_boxes_and_center: Tensor2<bool>,
}

/// Test every anchor center against every ground truth box.
///
/// An anchor is in a box when its center is strictly inside the box edges,
/// and in the center region when it is strictly closer than
/// `CENTER_RADIUS * stride` to the box center along both axes. Rows with
/// index `>= true_labels` are padding and stay `false`.
///
/// # Arguments
///
/// * `grid` - The anchor grid.
/// * `gt_boxes` - Box slots in center format `[cx, cy, w, h]`, padding included.
/// * `true_labels` - Number of leading slots holding real objects.
///
/// # Returns
///
/// Two `gt_boxes.len() x grid.len()` masks.
pub fn get_in_boxes_info(grid: &AnchorGrid, gt_boxes: &[BBox], true_labels: usize) -> InBoxesInfo {
    let num_gt = gt_boxes.len();
    let num_anchors = grid.len();

    let mut is_in_boxes_all = Tensor2::<bool>::zeros([num_gt, num_anchors]);
    let mut is_in_boxes_and_center = Tensor2::<bool>::zeros([num_gt, num_anchors]);

    let centers = (0..num_anchors).map(|i| grid.center(i)).collect::<Vec<_>>();

    let all_rows = is_in_boxes_all.as_slice_mut().chunks_exact_mut(num_anchors.max(1));
    let and_rows = is_in_boxes_and_center
        .as_slice_mut()
        .chunks_exact_mut(num_anchors.max(1));

    for ((gt, all_row), and_row) in gt_boxes
        .iter()
        .take(true_labels)
        .zip(all_rows)
        .zip(and_rows)
    {
        // edges are rounded to f32 like the label rows, only the deltas are f64
        let [cx, cy, w, h] = *gt;
        let (l, r) = (f64::from(cx - 0.5 * w), f64::from(cx + 0.5 * w));
        let (t, b) = (f64::from(cy - 0.5 * h), f64::from(cy + 0.5 * h));

        for (i, (&(x, y), (all, and))) in centers
            .iter()
            .zip(all_row.iter_mut().zip(and_row.iter_mut()))
            .enumerate()
        {
            let in_box = (x - l).min(y - t).min(r - x).min(b - y) > 0.0;

            let radius = CENTER_RADIUS * grid.expanded_strides[i];
            let (cl, cr) = (f64::from(cx - radius), f64::from(cx + radius));
            let (ct, cb) = (f64::from(cy - radius), f64::from(cy + radius));
            let in_center = (x - cl).min(cr - x).min(y - ct).min(cb - y) > 0.0;

            *all = in_box || in_center;
            *and = in_box && in_center;
        }
    }

    InBoxesInfo {
        is_in_boxes_all,
        is_in_boxes_and_center,
    }
}

/// Collapse a box x anchor mask into the candidate mask of the training sample.
///
/// `out[g, a] = any(mask[g, :]) && any(mask[:, a])`: the box slot matches some
/// anchor and the anchor is matched by some box. The shape is unchanged.
///
/// # Example
///
/// ```
/// use yolox_tensor::Tensor2;
/// use yolox_transforms::anchors::aggregate_candidates;
///
/// let mask = Tensor2::from_shape_vec([2, 3], vec![true, false, false, false, false, true]).unwrap();
/// let out = aggregate_candidates(&mask);
/// assert_eq!(out.as_slice(), &[true, false, true, true, false, true]);
/// ```
pub fn aggregate_candidates(mask: &Tensor2<bool>) -> Tensor2<bool> {
    let [rows, cols] = mask.shape;

    let mut row_any = vec![false; rows];
    let mut col_any = vec![false; cols];
    for r in 0..rows {
        for c in 0..cols {
            if *mask.get_unchecked([r, c]) {
                row_any[r] = true;
                col_any[c] = true;
            }
        }
    }

    Tensor2::from_shape_fn([rows, cols], |[r, c]| row_any[r] && col_any[c])
}

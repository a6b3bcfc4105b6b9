use serde::{Deserialize, Serialize};

use crate::error::TransformError;

/// Settings of the training transform.
///
/// Deserializes from the keys used by training recipes, `max_gt` and
/// `fpn_strides` are accepted as aliases.
///
/// ```
/// use yolox_transforms::config::TransformConfig;
///
/// let cfg: TransformConfig = serde_json::from_str(
///     r#"{"max_gt": 120, "fpn_strides": [8, 16, 32], "input_size": [416, 416]}"#,
/// ).unwrap();
///
/// assert_eq!(cfg.max_labels, 120);
/// assert_eq!(cfg.input_size, (416, 416));
/// assert_eq!(cfg.flip_prob, 0.5);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Capacity of the padded label tensor.
    #[serde(alias = "max_gt")]
    pub max_labels: usize,
    /// Probability of a horizontal flip.
    pub flip_prob: f64,
    /// Probability of the HSV jitter.
    pub hsv_prob: f64,
    /// Strides of the detection heads, in output order.
    #[serde(alias = "fpn_strides")]
    pub strides: Vec<u32>,
    /// Network input size as `(height, width)`, used to lay out the anchors.
    pub input_size: (usize, usize),
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            max_labels: 50,
            flip_prob: 0.5,
            hsv_prob: 1.0,
            strides: vec![8, 16, 32],
            input_size: (640, 640),
        }
    }
}

impl TransformConfig {
    /// Check that the configuration can build a transform.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::InvalidConfig`] describing the first bad field.
    pub fn validate(&self) -> Result<(), TransformError> {
        if self.max_labels == 0 {
            return Err(TransformError::InvalidConfig(
                "max_labels must be positive".to_string(),
            ));
        }
        for (name, p) in [("flip_prob", self.flip_prob), ("hsv_prob", self.hsv_prob)] {
            if !(0.0..=1.0).contains(&p) {
                return Err(TransformError::InvalidConfig(format!(
                    "{name} must be in [0, 1], got {p}"
                )));
            }
        }
        if self.strides.is_empty() || self.strides.contains(&0) {
            return Err(TransformError::InvalidConfig(format!(
                "strides must be a non-empty list of positive values, got {:?}",
                self.strides
            )));
        }
        if self.input_size.0 == 0 || self.input_size.1 == 0 {
            return Err(TransformError::InvalidConfig(format!(
                "input_size must be positive, got {:?}",
                self.input_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() -> Result<(), TransformError> {
        TransformConfig::default().validate()
    }

    #[test]
    fn rejects_bad_fields() {
        let bad = [
            TransformConfig {
                max_labels: 0,
                ..Default::default()
            },
            TransformConfig {
                flip_prob: 1.5,
                ..Default::default()
            },
            TransformConfig {
                hsv_prob: -0.1,
                ..Default::default()
            },
            TransformConfig {
                strides: vec![],
                ..Default::default()
            },
            TransformConfig {
                strides: vec![8, 0],
                ..Default::default()
            },
            TransformConfig {
                input_size: (640, 0),
                ..Default::default()
            },
        ];
        for cfg in bad.iter() {
            assert!(
                matches!(cfg.validate(), Err(TransformError::InvalidConfig(_))),
                "{cfg:?}"
            );
        }
    }

    #[test]
    fn json_round_trip() -> Result<(), serde_json::Error> {
        let cfg = TransformConfig {
            max_labels: 100,
            strides: vec![16, 32],
            ..Default::default()
        };
        let json = serde_json::to_string(&cfg)?;
        let back: TransformConfig = serde_json::from_str(&json)?;
        assert_eq!(back, cfg);

        let partial: TransformConfig = serde_json::from_str(r#"{"hsv_prob": 0.0}"#)?;
        assert_eq!(partial.hsv_prob, 0.0);
        assert_eq!(partial.max_labels, 50);
        Ok(())
    }
}

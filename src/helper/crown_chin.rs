use thiserror::Error;

use crate::config::config::{CrownChinCoefficients, EstimatorOptions};
use crate::utils::coordinate::FaceLandmark;

const DEGENERATE_EPS: f64 = 1e-9;

#[derive(Debug, Error, PartialEq)]
pub enum EstimationError {
    #[error("missing landmark: {0}")]
    MissingLandmark(&'static str),
    #[error("reference distance between the pupils is degenerate")]
    DegenerateReferenceDistance,
    #[error("eye and mouth midpoints coincide, no face axis")]
    DegenerateFaceAxis,
    #[error("face axis does not point downward in image coordinates")]
    InvertedFaceAxis,
}

/// Estimates the crown and chin points of a face from the five detector
/// landmarks. Immutable once constructed; `configure` derives a new
/// estimator rather than mutating shared coefficient state.
#[derive(Debug, Clone, Copy)]
pub struct CrownChinEstimator {
    coeffs: CrownChinCoefficients,
}

impl Default for CrownChinEstimator {
    fn default() -> Self {
        CrownChinEstimator {
            coeffs: CrownChinCoefficients::default(),
        }
    }
}

impl CrownChinEstimator {
    pub fn new(coeffs: CrownChinCoefficients) -> Self {
        CrownChinEstimator { coeffs }
    }

    pub fn coefficients(&self) -> CrownChinCoefficients {
        self.coeffs
    }

    /// configure returns a new estimator with any present option overriding
    /// the corresponding coefficient. Values are taken as-is; non-positive
    /// coefficients make downstream estimates undefined.
    pub fn configure(&self, options: &EstimatorOptions) -> Self {
        let mut coeffs = self.coeffs;
        if let Some(chin_crown) = options.chin_crown_coeff {
            coeffs.chin_crown_coeff = chin_crown;
        }
        if let Some(chin_frown) = options.chin_frown_coeff {
            coeffs.chin_frown_coeff = chin_frown;
        }
        CrownChinEstimator { coeffs }
    }

    /// estimate_crown_chin writes `crown_point` and `chin_point` into the
    /// landmark set.
    ///
    /// The inter-pupil separation is the reference distance; the unit vector
    /// from the eye midpoint toward the mouth midpoint gives the vertical
    /// face axis. The chin sits `chin_frown_coeff` reference distances below
    /// the eye line and the crown `chin_crown_coeff` reference distances
    /// above the chin. On error the landmark set is left untouched.
    ///
    /// # Arguments
    /// * `landmarks` - detector output with at least both eyes and both mouth corners
    ///
    /// # Returns
    /// * `Result<(), EstimationError>`
    pub fn estimate_crown_chin(
        &self,
        landmarks: &mut FaceLandmark,
    ) -> Result<(), EstimationError> {
        let left_eye = landmarks
            .left_eye
            .ok_or(EstimationError::MissingLandmark("left_eye"))?;
        let right_eye = landmarks
            .right_eye
            .ok_or(EstimationError::MissingLandmark("right_eye"))?;
        let left_mouth = landmarks
            .left_mouth
            .ok_or(EstimationError::MissingLandmark("left_mouth"))?;
        let right_mouth = landmarks
            .right_mouth
            .ok_or(EstimationError::MissingLandmark("right_mouth"))?;

        let reference_distance = left_eye.distance_to(&right_eye);
        if reference_distance <= DEGENERATE_EPS {
            return Err(EstimationError::DegenerateReferenceDistance);
        }

        let eye_center = left_eye.midpoint(&right_eye);
        let mouth_center = left_mouth.midpoint(&right_mouth);
        let axis = eye_center.vector_to(&mouth_center);
        let axis_norm = axis.norm();
        if axis_norm <= DEGENERATE_EPS {
            return Err(EstimationError::DegenerateFaceAxis);
        }
        let down = axis / axis_norm;
        if down.y <= 0.0 {
            // Mouth above the eyes; a valid estimate requires chin.y > crown.y
            return Err(EstimationError::InvertedFaceAxis);
        }

        let chin = eye_center.translated(down * (self.coeffs.chin_frown_coeff * reference_distance));
        let crown = chin.translated(-down * (self.coeffs.chin_crown_coeff * reference_distance));

        landmarks.chin_point = Some(chin);
        landmarks.crown_point = Some(crown);
        Ok(())
    }
}

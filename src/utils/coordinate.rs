use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate2D {
    pub x: f64,
    pub y: f64,
}

impl Coordinate2D {
    pub fn new(x: f64, y: f64) -> Self {
        Coordinate2D { x, y }
    }

    pub fn midpoint(&self, other: &Coordinate2D) -> Coordinate2D {
        Coordinate2D {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    pub fn distance_to(&self, other: &Coordinate2D) -> f64 {
        Vector2::new(other.x - self.x, other.y - self.y).norm()
    }

    pub fn vector_to(&self, other: &Coordinate2D) -> Vector2<f64> {
        Vector2::new(other.x - self.x, other.y - self.y)
    }

    pub fn translated(&self, by: Vector2<f64>) -> Coordinate2D {
        Coordinate2D {
            x: self.x + by.x,
            y: self.y + by.y,
        }
    }
}

/// Five-point landmark set produced by an external face detector, plus the
/// crown and chin points written back by the crown-chin estimator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaceLandmark {
    #[serde(default)]
    pub left_eye: Option<Coordinate2D>,
    #[serde(default)]
    pub right_eye: Option<Coordinate2D>,
    #[serde(default)]
    pub nose: Option<Coordinate2D>,
    #[serde(default)]
    pub left_mouth: Option<Coordinate2D>,
    #[serde(default)]
    pub right_mouth: Option<Coordinate2D>,
    #[serde(default)]
    pub crown_point: Option<Coordinate2D>,
    #[serde(default)]
    pub chin_point: Option<Coordinate2D>,
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("photo standard dimensions must be strictly positive")]
    NonPositiveDimension,
    #[error("ratio field out of range (0, 1]: {0}")]
    RatioOutOfRange(f64),
    #[error("canvas resolution must be strictly positive")]
    NonPositiveResolution,
    #[error("canvas border must not be negative")]
    NegativeBorder,
}

/// Target identity-photo specification: output raster size, physical print
/// size and the required placement of the face within the photo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhotoStandard {
    pub pic_width_px: u32,
    pub pic_height_px: u32,
    pub pic_width_mm: f64,
    pub pic_height_mm: f64,
    /// Required ratio of the crown-chin pixel distance to the photo height.
    pub face_height_ratio: f64,
    /// Expected horizontal position of the face axis within the photo,
    /// as a fraction of the photo width. 0.5 centers the face.
    #[serde(default = "default_face_center_ratio")]
    pub face_center_ratio: f64,
    /// Fraction of the photo height above the crown. When absent the
    /// crown-chin span is centered vertically.
    #[serde(default)]
    pub crown_offset_ratio: Option<f64>,
}

fn default_face_center_ratio() -> f64 {
    0.5
}

impl PhotoStandard {
    pub fn new(
        pic_width_px: u32,
        pic_height_px: u32,
        pic_width_mm: f64,
        pic_height_mm: f64,
        face_height_ratio: f64,
    ) -> Result<Self, ConfigError> {
        let standard = PhotoStandard {
            pic_width_px,
            pic_height_px,
            pic_width_mm,
            pic_height_mm,
            face_height_ratio,
            face_center_ratio: default_face_center_ratio(),
            crown_offset_ratio: None,
        };
        standard.validate()?;
        Ok(standard)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pic_width_px == 0
            || self.pic_height_px == 0
            || self.pic_width_mm <= 0.0
            || self.pic_height_mm <= 0.0
        {
            return Err(ConfigError::NonPositiveDimension);
        }
        for ratio in [
            Some(self.face_height_ratio),
            Some(self.face_center_ratio),
            self.crown_offset_ratio,
        ]
        .into_iter()
        .flatten()
        {
            if !(ratio > 0.0 && ratio <= 1.0) {
                return Err(ConfigError::RatioOutOfRange(ratio));
            }
        }
        Ok(())
    }

    /// Fraction of the photo height left above the crown.
    pub fn top_margin_ratio(&self) -> f64 {
        self.crown_offset_ratio
            .unwrap_or((1.0 - self.face_height_ratio) / 2.0)
    }

    /// ICAO-style 35x45mm passport photo at 300dpi, head height 34mm.
    pub fn passport_35x45() -> Self {
        PhotoStandard {
            pic_width_px: 413,
            pic_height_px: 531,
            pic_width_mm: 35.0,
            pic_height_mm: 45.0,
            face_height_ratio: 34.0 / 45.0,
            face_center_ratio: 0.5,
            crown_offset_ratio: None,
        }
    }

    /// US 2x2 inch visa photo at 300dpi, head height 30mm.
    pub fn us_2x2_inch() -> Self {
        PhotoStandard {
            pic_width_px: 600,
            pic_height_px: 600,
            pic_width_mm: 50.8,
            pic_height_mm: 50.8,
            face_height_ratio: 30.0 / 50.8,
            face_center_ratio: 0.5,
            crown_offset_ratio: None,
        }
    }
}

/// Print sheet definition: physical size, resolution and the spacing left
/// between tiled photos.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanvasDefinition {
    pub width_mm: f64,
    pub height_mm: f64,
    pub resolution_ppmm: f64,
    #[serde(default)]
    pub border_mm: f64,
}

impl CanvasDefinition {
    pub fn new(
        width_mm: f64,
        height_mm: f64,
        resolution_ppmm: f64,
    ) -> Result<Self, ConfigError> {
        let canvas = CanvasDefinition {
            width_mm,
            height_mm,
            resolution_ppmm,
            border_mm: 0.0,
        };
        canvas.validate()?;
        Ok(canvas)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width_mm <= 0.0 || self.height_mm <= 0.0 {
            return Err(ConfigError::NonPositiveDimension);
        }
        if self.resolution_ppmm <= 0.0 {
            return Err(ConfigError::NonPositiveResolution);
        }
        if self.border_mm < 0.0 {
            return Err(ConfigError::NegativeBorder);
        }
        Ok(())
    }

    /// 4R (6x4 inch) landscape print sheet at the given resolution.
    pub fn print_4r(resolution_ppmm: f64) -> Result<Self, ConfigError> {
        CanvasDefinition::new(152.4, 101.6, resolution_ppmm)
    }
}

/// Coefficients converting the inter-pupil reference distance into the
/// estimated crown-chin span and its placement below the eye line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CrownChinCoefficients {
    pub chin_crown_coeff: f64,
    pub chin_frown_coeff: f64,
}

impl Default for CrownChinCoefficients {
    fn default() -> Self {
        CrownChinCoefficients {
            chin_crown_coeff: 1.7699,
            chin_frown_coeff: 0.8945,
        }
    }
}

/// Optional overrides for the estimator coefficients. Absent fields keep
/// the current value; unknown keys in the source JSON are ignored.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct EstimatorOptions {
    #[serde(default)]
    pub chin_crown_coeff: Option<f64>,
    #[serde(default)]
    pub chin_frown_coeff: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub crown_chin: CrownChinCoefficients,
    #[serde(default = "default_background")]
    pub background: [u8; 3],
}

fn default_background() -> [u8; 3] {
    [255, 255, 255]
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            crown_chin: CrownChinCoefficients::default(),
            background: default_background(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

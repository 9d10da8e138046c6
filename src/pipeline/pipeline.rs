use anyhow::Error;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use tracing::debug;

use crate::config::config::{CanvasDefinition, EngineConfig, PhotoStandard};
use crate::helper::crown_chin::CrownChinEstimator;
use crate::helper::print_helper::PrintHelper;
use crate::utils::coordinate::FaceLandmark;

#[derive(Debug, Clone)]
pub struct PhotoPrintPipeline {
    estimator: CrownChinEstimator,
    print_helper: PrintHelper,
}

impl PhotoPrintPipeline {
    /// new initializes new instance of the pipeline
    pub fn new(estimator: CrownChinEstimator, print_helper: PrintHelper) -> Self {
        PhotoPrintPipeline {
            estimator,
            print_helper,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        PhotoPrintPipeline {
            estimator: CrownChinEstimator::new(config.crown_chin),
            print_helper: PrintHelper::new(Some(config.background)),
        }
    }

    /// create_tiled_print runs the full composition: estimates the crown and
    /// chin points, crops the source to the photo standard and tiles the
    /// result onto the print sheet. The landmark set comes back annotated
    /// with the estimated points.
    ///
    /// # Arguments
    /// * `img` - source raster
    /// * `landmarks` - detector output, annotated in place
    /// * `standard` - target photo standard
    /// * `canvas` - print sheet definition
    ///
    /// # Returns
    /// * `Result<RgbImage, Error>` - raster of the canvas pixel dimensions
    pub fn create_tiled_print(
        &self,
        img: &RgbImage,
        landmarks: &mut FaceLandmark,
        standard: &PhotoStandard,
        canvas: &CanvasDefinition,
    ) -> Result<RgbImage, Error> {
        self.estimator.estimate_crown_chin(landmarks)?;
        let crown_point = landmarks
            .crown_point
            .ok_or_else(|| Error::msg("estimator did not set the crown point"))?;
        let chin_point = landmarks
            .chin_point
            .ok_or_else(|| Error::msg("estimator did not set the chin point"))?;
        debug!(?crown_point, ?chin_point, "estimated crown and chin");

        let cropped = self
            .print_helper
            .crop_picture(img, &crown_point, &chin_point, standard)?;
        Ok(self.print_helper.tile_cropped_photo(canvas, standard, &cropped))
    }

    /// create_tiled_print_png composes the print sheet, encodes it as PNG
    /// and embeds the canvas resolution as a pHYs chunk.
    ///
    /// # Arguments
    /// * `img` - source raster
    /// * `landmarks` - detector output, annotated in place
    /// * `standard` - target photo standard
    /// * `canvas` - print sheet definition
    ///
    /// # Returns
    /// * `Result<Vec<u8>, Error>` - encoded PNG with resolution metadata
    pub fn create_tiled_print_png(
        &self,
        img: &RgbImage,
        landmarks: &mut FaceLandmark,
        standard: &PhotoStandard,
        canvas: &CanvasDefinition,
    ) -> Result<Vec<u8>, Error> {
        let sheet = self.create_tiled_print(img, landmarks, standard, canvas)?;

        let mut encoded = Vec::new();
        let encoder = PngEncoder::new(&mut encoded);
        encoder.write_image(
            sheet.as_raw(),
            sheet.width(),
            sheet.height(),
            ExtendedColorType::Rgb8,
        )?;

        Ok(crate::modules::png_resolution::set_resolution_metadata(
            &encoded,
            canvas.resolution_ppmm,
        ))
    }
}

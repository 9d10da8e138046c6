use image::imageops::{replace, resize, FilterType};
use image::{Rgb, RgbImage};
use thiserror::Error;
use tracing::debug;

use crate::config::config::{CanvasDefinition, PhotoStandard};
use crate::utils::coordinate::Coordinate2D;
use crate::utils::utils::{mm_to_px_ceil, mm_to_px_round};

const DEGENERATE_EPS: f64 = 1e-9;

#[derive(Debug, Error, PartialEq)]
pub enum CropError {
    #[error("crown and chin are vertically coincident")]
    DegenerateSpan,
}

/// Produces the standards-compliant crop of a face photo and tiles the
/// cropped photo onto a print sheet.
#[derive(Debug, Clone)]
pub struct PrintHelper {
    background: Rgb<u8>,
}

impl Default for PrintHelper {
    fn default() -> Self {
        PrintHelper::new(None)
    }
}

impl PrintHelper {
    /// new initializes a print helper. The background color fills crop
    /// padding and unused print sheet area; defaults to white.
    pub fn new(in_background: Option<[u8; 3]>) -> Self {
        let mut background = [255u8, 255u8, 255u8];
        if let Some(_in_background) = in_background {
            background = _in_background;
        }
        PrintHelper {
            background: Rgb(background),
        }
    }

    /// center_crop_estimation returns the crop window center implied by the
    /// crown-chin axis and the standard's face placement ratios.
    pub fn center_crop_estimation(
        standard: &PhotoStandard,
        crown_point: &Coordinate2D,
        chin_point: &Coordinate2D,
    ) -> Coordinate2D {
        let span = (chin_point.y - crown_point.y).abs();
        let crop_height = span / standard.face_height_ratio;
        let crop_width =
            crop_height * standard.pic_width_px as f64 / standard.pic_height_px as f64;

        let face_axis_x = (crown_point.x + chin_point.x) / 2.0;
        let center_x = face_axis_x + (0.5 - standard.face_center_ratio) * crop_width;

        let window_top = crown_point.y.min(chin_point.y) - standard.top_margin_ratio() * crop_height;
        let center_y = window_top + crop_height / 2.0;

        Coordinate2D::new(center_x, center_y)
    }

    /// crop_picture extracts the standards-compliant photo around the
    /// estimated crown and chin points.
    ///
    /// The crop window is sized so that after resampling to the standard's
    /// pixel dimensions the crown-chin span covers exactly
    /// `face_height_ratio` of the photo height. Window regions outside the
    /// source are padded with the background color so the ratio guarantee
    /// holds even for tight source images.
    ///
    /// # Arguments
    /// * `original_image` - source raster
    /// * `crown_point` - estimated crown position in source coordinates
    /// * `chin_point` - estimated chin position in source coordinates
    /// * `standard` - target photo standard
    ///
    /// # Returns
    /// * `Result<RgbImage, CropError>` - raster of exactly the standard's pixel dimensions
    pub fn crop_picture(
        &self,
        original_image: &RgbImage,
        crown_point: &Coordinate2D,
        chin_point: &Coordinate2D,
        standard: &PhotoStandard,
    ) -> Result<RgbImage, CropError> {
        let span = (chin_point.y - crown_point.y).abs();
        if span <= DEGENERATE_EPS {
            return Err(CropError::DegenerateSpan);
        }

        let crop_height = span / standard.face_height_ratio;
        let crop_width =
            crop_height * standard.pic_width_px as f64 / standard.pic_height_px as f64;
        let center = Self::center_crop_estimation(standard, crown_point, chin_point);

        let left = (center.x - crop_width / 2.0).round() as i64;
        let top = (center.y - crop_height / 2.0).round() as i64;
        let window_width = crop_width.round().max(1.0) as u32;
        let window_height = crop_height.round().max(1.0) as u32;

        debug!(
            left,
            top, window_width, window_height, "extracting crop window"
        );

        let mut window = RgbImage::from_pixel(window_width, window_height, self.background);
        replace(&mut window, original_image, -left, -top);

        Ok(resize(
            &window,
            standard.pic_width_px,
            standard.pic_height_px,
            FilterType::Lanczos3,
        ))
    }

    /// tile_cropped_photo lays as many whole copies of the cropped photo as
    /// fit onto the print sheet, row-major from the top-left corner, with
    /// `canvas.border_mm` spacing between copies. A photo larger than the
    /// canvas yields a sheet with zero copies, not an error.
    ///
    /// # Arguments
    /// * `canvas` - print sheet definition
    /// * `standard` - photo standard describing the physical photo size
    /// * `cropped_image` - output of `crop_picture`
    ///
    /// # Returns
    /// * `RgbImage` - raster of exactly the canvas pixel dimensions
    pub fn tile_cropped_photo(
        &self,
        canvas: &CanvasDefinition,
        standard: &PhotoStandard,
        cropped_image: &RgbImage,
    ) -> RgbImage {
        let canvas_width = mm_to_px_ceil(canvas.width_mm, canvas.resolution_ppmm).max(1);
        let canvas_height = mm_to_px_ceil(canvas.height_mm, canvas.resolution_ppmm).max(1);
        let tile_width = mm_to_px_round(standard.pic_width_mm, canvas.resolution_ppmm);
        let tile_height = mm_to_px_round(standard.pic_height_mm, canvas.resolution_ppmm);
        let border = mm_to_px_round(canvas.border_mm, canvas.resolution_ppmm);

        let mut sheet = RgbImage::from_pixel(canvas_width, canvas_height, self.background);
        if tile_width == 0 || tile_height == 0 {
            return sheet;
        }

        let columns = whole_copies(canvas_width, tile_width, border);
        let rows = whole_copies(canvas_height, tile_height, border);
        debug!(columns, rows, tile_width, tile_height, "tiling print sheet");
        if columns == 0 || rows == 0 {
            return sheet;
        }

        let tile = resize(cropped_image, tile_width, tile_height, FilterType::Lanczos3);
        for row in 0..rows {
            for column in 0..columns {
                let x = (column * (tile_width + border)) as i64;
                let y = (row * (tile_height + border)) as i64;
                replace(&mut sheet, &tile, x, y);
            }
        }
        sheet
    }
}

/// Number of whole tiles that fit along one axis with the given spacing.
fn whole_copies(available: u32, tile: u32, border: u32) -> u32 {
    if available < tile {
        return 0;
    }
    (available - tile) / (tile + border) + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config::{CanvasDefinition, PhotoStandard};

    fn banded_source() -> RgbImage {
        // 400x400 source split into three horizontal bands. The middle band
        // spans the crown-chin range used by the tests.
        let mut img = RgbImage::new(400, 400);
        for (_, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = if y < 100 {
                Rgb([200, 0, 0])
            } else if y < 300 {
                Rgb([0, 200, 0])
            } else {
                Rgb([0, 0, 200])
            };
        }
        img
    }

    fn half_face_standard() -> PhotoStandard {
        // 100x200 px photo, face occupies half the photo height
        PhotoStandard::new(100, 200, 20.0, 40.0, 0.5).unwrap()
    }

    #[test]
    fn test_crop_output_has_standard_dimensions() {
        let helper = PrintHelper::default();
        let cropped = helper
            .crop_picture(
                &banded_source(),
                &Coordinate2D::new(200.0, 100.0),
                &Coordinate2D::new(200.0, 300.0),
                &half_face_standard(),
            )
            .unwrap();
        assert_eq!(cropped.width(), 100);
        assert_eq!(cropped.height(), 200);
    }

    #[test]
    fn test_crop_places_span_at_required_ratio() {
        // Span 200px, ratio 0.5 -> window 400px tall starting at y=0, so the
        // source bands land at known output rows: crown at 1/4 of the photo
        // height, chin at 3/4.
        let helper = PrintHelper::default();
        let cropped = helper
            .crop_picture(
                &banded_source(),
                &Coordinate2D::new(200.0, 100.0),
                &Coordinate2D::new(200.0, 300.0),
                &half_face_standard(),
            )
            .unwrap();

        // Sample well inside each band to stay clear of resampling edges
        assert_eq!(cropped.get_pixel(50, 25), &Rgb([200, 0, 0]));
        assert_eq!(cropped.get_pixel(50, 100), &Rgb([0, 200, 0]));
        assert_eq!(cropped.get_pixel(50, 175), &Rgb([0, 0, 200]));
    }

    #[test]
    fn test_crop_window_outside_source_is_padded() {
        let source = RgbImage::from_pixel(60, 60, Rgb([0, 200, 0]));
        let helper = PrintHelper::new(Some([10, 20, 30]));
        // Span of 50px with ratio 0.5 needs a 100px window; the source is
        // only 60px tall so the window sticks out on every side.
        let cropped = helper
            .crop_picture(
                &source,
                &Coordinate2D::new(30.0, 5.0),
                &Coordinate2D::new(30.0, 55.0),
                &half_face_standard(),
            )
            .unwrap();
        assert_eq!(cropped.width(), 100);
        assert_eq!(cropped.height(), 200);
        // Corners fall outside the source and carry the background fill
        assert_eq!(cropped.get_pixel(2, 2), &Rgb([10, 20, 30]));
        assert_eq!(cropped.get_pixel(97, 197), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_degenerate_span_is_rejected() {
        let helper = PrintHelper::default();
        let result = helper.crop_picture(
            &banded_source(),
            &Coordinate2D::new(200.0, 150.0),
            &Coordinate2D::new(210.0, 150.0),
            &half_face_standard(),
        );
        assert_eq!(result, Err(CropError::DegenerateSpan));
    }

    #[test]
    fn test_center_estimation_honors_face_center_ratio() {
        let mut standard = half_face_standard();
        let crown = Coordinate2D::new(200.0, 100.0);
        let chin = Coordinate2D::new(200.0, 300.0);

        let centered = PrintHelper::center_crop_estimation(&standard, &crown, &chin);
        assert!((centered.x - 200.0).abs() < 1e-9);
        // Window top at crown - 0.25 * 400 = 0, center y at 200
        assert!((centered.y - 200.0).abs() < 1e-9);

        // Face expected at 40% from the left edge: window shifts right
        standard.face_center_ratio = 0.4;
        let shifted = PrintHelper::center_crop_estimation(&standard, &crown, &chin);
        // crop width = 400 * 100/200 = 200; shift = (0.5 - 0.4) * 200 = 20
        assert!((shifted.x - 220.0).abs() < 1e-9);
    }

    #[test]
    fn test_tile_output_has_canvas_dimensions() {
        let helper = PrintHelper::default();
        let canvas = CanvasDefinition::new(152.4, 101.6, 11.81).unwrap();
        let cropped = RgbImage::from_pixel(100, 200, Rgb([0, 200, 0]));
        let sheet = helper.tile_cropped_photo(&canvas, &half_face_standard(), &cropped);
        assert_eq!(sheet.width(), 1800);
        assert_eq!(sheet.height(), 1200);
    }

    #[test]
    fn test_tile_grid_placement() {
        let helper = PrintHelper::new(Some([255, 255, 255]));
        // 10 px/mm: canvas 1000x800 px, tile 200x400 px -> 5 columns, 2 rows
        let canvas = CanvasDefinition::new(100.0, 80.0, 10.0).unwrap();
        let cropped = RgbImage::from_pixel(100, 200, Rgb([0, 200, 0]));
        let sheet = helper.tile_cropped_photo(&canvas, &half_face_standard(), &cropped);

        assert_eq!(sheet.width(), 1000);
        assert_eq!(sheet.height(), 800);
        // Inside the first and last copies
        assert_eq!(sheet.get_pixel(10, 10), &Rgb([0, 200, 0]));
        assert_eq!(sheet.get_pixel(999, 799), &Rgb([0, 200, 0]));
    }

    #[test]
    fn test_tile_with_border_spacing() {
        let helper = PrintHelper::default();
        // 10 px/mm, 5mm border: tile 200px + 50px spacing within 1000px
        // -> floor((1000 - 200) / 250) + 1 = 4 columns
        let mut canvas = CanvasDefinition::new(100.0, 80.0, 10.0).unwrap();
        canvas.border_mm = 5.0;
        let cropped = RgbImage::from_pixel(100, 200, Rgb([0, 200, 0]));
        let sheet = helper.tile_cropped_photo(&canvas, &half_face_standard(), &cropped);

        // Gap between the first two copies is background
        assert_eq!(sheet.get_pixel(210, 10), &Rgb([255, 255, 255]));
        // Fourth column starts at x = 3 * 250 = 750
        assert_eq!(sheet.get_pixel(760, 10), &Rgb([0, 200, 0]));
        // No fifth column: 4 * 250 = 1000 is past the edge
        assert_eq!(sheet.get_pixel(999, 10), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_photo_larger_than_canvas_yields_blank_sheet() {
        let helper = PrintHelper::new(Some([255, 255, 255]));
        // Canvas smaller than a single photo tile
        let canvas = CanvasDefinition::new(10.0, 10.0, 10.0).unwrap();
        let cropped = RgbImage::from_pixel(100, 200, Rgb([0, 200, 0]));
        let sheet = helper.tile_cropped_photo(&canvas, &half_face_standard(), &cropped);

        assert_eq!(sheet.width(), 100);
        assert_eq!(sheet.height(), 100);
        for pixel in sheet.pixels() {
            assert_eq!(pixel, &Rgb([255, 255, 255]));
        }
    }

    #[test]
    fn test_whole_copies() {
        assert_eq!(whole_copies(1000, 200, 0), 5);
        assert_eq!(whole_copies(1000, 200, 50), 4);
        assert_eq!(whole_copies(199, 200, 0), 0);
        assert_eq!(whole_copies(200, 200, 0), 1);
    }
}

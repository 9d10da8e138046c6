pub mod png_resolution;

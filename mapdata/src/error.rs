use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid raster: {0}")]
    InvalidRaster(String),
    #[error("Invalid color literal: {0:?}")]
    InvalidColor(String),
}

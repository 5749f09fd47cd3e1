//! Classifying binarized 0/1 digit images with a learned row scanner

pub mod dataset;
pub mod encoder;

pub use dataset::{
    binarize, load_images, parse_images, quarter_threshold, save_images, BinaryImage, Dataset,
    Digit,
};
pub use encoder::{DigitEncoder, DigitVar, LearnedParameters};

//! Binary digit images and their text format
//!
//! A file holds images of one label. Each image is a block of equally long
//! lines of `0`/`1`, and images are separated by blank lines.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Digit {
    Zero,
    One,
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Digit::Zero => write!(f, "0"),
            Digit::One => write!(f, "1"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryImage {
    pub width: usize,
    pub height: usize,
    pixels: Vec<Vec<bool>>,
}

impl BinaryImage {
    pub fn from_rows(pixels: Vec<Vec<bool>>) -> Result<Self> {
        let height = pixels.len();
        let width = pixels.first().map_or(0, |row| row.len());
        if height == 0 || width == 0 {
            anyhow::bail!("Image must have at least one pixel");
        }
        if let Some((row, bad)) = pixels.iter().enumerate().find(|(_, r)| r.len() != width) {
            anyhow::bail!(
                "Row {} has length {}, expected {}",
                row,
                bad.len(),
                width
            );
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        self.pixels[row][col]
    }

    pub fn count_set(&self) -> usize {
        self.pixels.iter().flatten().filter(|&&p| p).count()
    }
}

impl fmt::Display for BinaryImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.pixels {
            for &pixel in row {
                write!(f, "{}", if pixel { '1' } else { '0' })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Set a pixel when its intensity reaches `threshold`
pub fn binarize(intensities: &[Vec<f64>], threshold: f64) -> Result<BinaryImage> {
    BinaryImage::from_rows(
        intensities
            .iter()
            .map(|row| row.iter().map(|&value| value >= threshold).collect())
            .collect(),
    )
}

/// A quarter of the brightest intensity in any image
pub fn quarter_threshold(images: &[Vec<Vec<f64>>]) -> f64 {
    let brightest = images
        .iter()
        .flatten()
        .flatten()
        .copied()
        .fold(0.0_f64, f64::max);
    brightest / 4.0
}

/// Parse blank-line separated images
pub fn parse_images(content: &str) -> Result<Vec<BinaryImage>> {
    let mut images = Vec::new();
    let mut block: Vec<Vec<bool>> = Vec::new();

    for (line_idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            if !block.is_empty() {
                images.push(BinaryImage::from_rows(std::mem::take(&mut block))?);
            }
            continue;
        }

        let mut row = Vec::with_capacity(line.len());
        for (col_idx, ch) in line.chars().enumerate() {
            match ch {
                '0' => row.push(false),
                '1' => row.push(true),
                _ => anyhow::bail!(
                    "Invalid character '{}' at line {}, column {}. Only '0' and '1' are allowed",
                    ch,
                    line_idx + 1,
                    col_idx + 1
                ),
            }
        }
        block.push(row);
    }
    if !block.is_empty() {
        images.push(BinaryImage::from_rows(block)?);
    }

    Ok(images)
}

pub fn load_images<P: AsRef<Path>>(path: P) -> Result<Vec<BinaryImage>> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read image file: {}", path.as_ref().display()))?;

    parse_images(&content)
        .with_context(|| format!("Failed to parse images from: {}", path.as_ref().display()))
}

pub fn save_images<P: AsRef<Path>>(images: &[BinaryImage], path: P) -> Result<()> {
    let content = images
        .iter()
        .map(|image| image.to_string())
        .collect::<Vec<_>>()
        .join("\n");

    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write images to: {}", path.as_ref().display()))?;

    Ok(())
}

/// Training images partitioned by label, all of one shape
#[derive(Debug, Clone)]
pub struct Dataset {
    pub zeros: Vec<BinaryImage>,
    pub ones: Vec<BinaryImage>,
}

impl Dataset {
    pub fn new(zeros: Vec<BinaryImage>, ones: Vec<BinaryImage>) -> Result<Self> {
        let mut shapes = zeros
            .iter()
            .chain(ones.iter())
            .map(|image| (image.height, image.width));
        if let Some(shape) = shapes.next() {
            if let Some(other) = shapes.find(|&s| s != shape) {
                anyhow::bail!(
                    "Images must share one shape, found {}x{} and {}x{}",
                    shape.0,
                    shape.1,
                    other.0,
                    other.1
                );
            }
        }
        Ok(Self { zeros, ones })
    }

    pub fn load<P: AsRef<Path>>(zeros_file: P, ones_file: P) -> Result<Self> {
        Self::new(load_images(zeros_file)?, load_images(ones_file)?)
    }

    /// `(height, width)` of every image, `None` for an empty dataset
    pub fn shape(&self) -> Option<(usize, usize)> {
        self.zeros
            .iter()
            .chain(self.ones.iter())
            .next()
            .map(|image| (image.height, image.width))
    }

    pub fn labelled(&self) -> impl Iterator<Item = (Digit, usize, &BinaryImage)> {
        let zeros = self
            .zeros
            .iter()
            .enumerate()
            .map(|(i, image)| (Digit::Zero, i, image));
        let ones = self
            .ones
            .iter()
            .enumerate()
            .map(|(i, image)| (Digit::One, i, image));
        zeros.chain(ones)
    }

    pub fn len(&self) -> usize {
        self.zeros.len() + self.ones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const TWO_IMAGES: &str = "010\n101\n010\n\n010\n010\n010\n";

    #[test]
    fn test_parse_images() {
        let images = parse_images(TWO_IMAGES).unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!((images[0].height, images[0].width), (3, 3));
        assert!(images[0].get(1, 0));
        assert!(!images[1].get(1, 0));
        assert_eq!(images[1].count_set(), 3);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_images("01\n012\n").is_err());
        assert!(parse_images("01\n0x\n").is_err());
        assert!(parse_images("").unwrap().is_empty());
    }

    #[test]
    fn test_binarize() {
        let raw = vec![
            vec![vec![0.0, 16.0], vec![3.9, 4.0]],
            vec![vec![8.0, 1.0], vec![0.0, 0.0]],
        ];
        let threshold = quarter_threshold(&raw);
        assert_eq!(threshold, 4.0);

        let image = binarize(&raw[0], threshold).unwrap();
        assert_eq!(image.to_string(), "01\n01\n");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("digits/zeros.txt");
        let images = parse_images(TWO_IMAGES).unwrap();

        save_images(&images, &path).unwrap();
        assert_eq!(load_images(&path).unwrap(), images);
    }

    #[test]
    fn test_dataset_shapes() {
        let square = parse_images("01\n10\n").unwrap();
        let wide = parse_images("011\n100\n").unwrap();
        assert!(Dataset::new(square.clone(), wide).is_err());

        let dataset = Dataset::new(square.clone(), square).unwrap();
        assert_eq!(dataset.shape(), Some((2, 2)));
        assert_eq!(dataset.len(), 2);
        let labels: Vec<Digit> = dataset.labelled().map(|(label, _, _)| label).collect();
        assert_eq!(labels, vec![Digit::Zero, Digit::One]);
    }
}

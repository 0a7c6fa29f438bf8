// ============================================================
// Layer 4 — Image Preprocessor
// ============================================================
// Turns an arbitrary captured image (any size, RGB / RGBA /
// grayscale) into the ImageTensor the classifier expects.
//
// The network only ever saw 28×28 single-channel images scaled
// to [0, 1] during training. A mismatch in shape or scale does
// not error inside the network, it just yields a meaningless
// prediction, so every caller goes through this one function.
//
// Steps (applied in order):
//   1. Resample to exactly 28×28 with a bilinear (triangle)
//      filter. Nearest-neighbour would drop thin strokes.
//   2. Collapse to one luminance channel
//   3. Cast to f32 and divide by 255
//   4. Shape as (1, 28, 28, 1)
//
// Reference: image crate docs (imageops::FilterType)

use image::{imageops::FilterType, DynamicImage};

use crate::domain::{image_tensor::ImageTensor, IMAGE_SIDE};
use crate::error::PreprocessError;

const SIDE: u32 = IMAGE_SIDE as u32;

#[derive(Debug, Clone, Copy, Default)]
pub struct ImagePreprocessor {
    invert: bool,
}

impl ImagePreprocessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map v → 1 − v after scaling.
    ///
    /// MNIST digits are light strokes on a dark background. A canvas that
    /// draws dark strokes on white needs this to match the training data.
    pub fn with_inversion(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    /// Decode an encoded image (PNG) from bytes.
    pub fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, PreprocessError> {
        Ok(image::load_from_memory(bytes)?)
    }

    pub fn normalize(&self, image: &DynamicImage) -> Result<ImageTensor, PreprocessError> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(PreprocessError::EmptyImage { width, height });
        }

        let gray = image
            .resize_exact(SIDE, SIDE, FilterType::Triangle)
            .to_luma8();

        let values: Vec<f32> = gray
            .into_raw()
            .into_iter()
            .map(|p| f32::from(p) / 255.0)
            .map(|v| if self.invert { 1.0 - v } else { v })
            .collect();

        tracing::debug!("Normalized {}x{} image to {SIDE}x{SIDE}", width, height);

        ImageTensor::from_values(values).map_err(PreprocessError::InvalidTensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IMAGE_PIXELS;
    use image::{Rgba, RgbaImage};

    fn canvas_with_stroke() -> DynamicImage {
        // White 300×300 canvas with a thick black vertical stroke
        let mut img = RgbaImage::from_pixel(300, 300, Rgba([255, 255, 255, 255]));
        for y in 40..260 {
            for x in 130..170 {
                img.put_pixel(x, y, Rgba([0, 0, 0, 255]));
            }
        }
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn test_output_shape_and_range() {
        let t = ImagePreprocessor::new().normalize(&canvas_with_stroke()).unwrap();
        assert_eq!(t.shape(), [1, 28, 28, 1]);
        assert_eq!(t.values().len(), 28 * 28);
        assert!(t.values().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_stroke_survives_downsampling() {
        let t = ImagePreprocessor::new().normalize(&canvas_with_stroke()).unwrap();
        // Centre column of the stroke should be dark, the border bright
        let centre = t.values()[14 * 28 + 14];
        let corner = t.values()[0];
        assert!(centre < 0.1, "centre = {centre}");
        assert!(corner > 0.9, "corner = {corner}");
    }

    #[test]
    fn test_uniform_gray_maps_to_scaled_value() {
        let img = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(57, 91, image::Luma([128])));
        let t = ImagePreprocessor::new().normalize(&img).unwrap();
        for v in t.values() {
            assert!((v - 128.0 / 255.0).abs() < 1.0 / 255.0 + 1e-6);
        }
    }

    #[test]
    fn test_inversion() {
        let img = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(28, 28, image::Luma([255])));
        let t = ImagePreprocessor::new().with_inversion(true).normalize(&img).unwrap();
        assert!(t.values().iter().all(|&v| v.abs() < 1e-6));
    }

    #[test]
    fn test_zero_width_is_rejected() {
        let img = DynamicImage::new_rgb8(0, 10);
        let err = ImagePreprocessor::new().normalize(&img).unwrap_err();
        assert!(matches!(err, PreprocessError::EmptyImage { width: 0, height: 10 }));
    }

    #[test]
    fn test_single_pixel_image_is_not_empty() {
        let img = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(1, 1, image::Luma([128])));
        let t = ImagePreprocessor::new().normalize(&img).unwrap();
        assert_eq!(t.values().len(), IMAGE_PIXELS);
    }

    #[test]
    fn test_tensor_rejection_keeps_its_reason() {
        let reason = ImageTensor::from_values(vec![2.0; IMAGE_PIXELS]).unwrap_err();
        let err = PreprocessError::InvalidTensor(reason);
        let text = err.to_string();
        assert!(text.contains("not a valid network input"), "{text}");
        assert!(text.contains("outside [0, 1]"), "{text}");
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let err = ImagePreprocessor::new().decode(b"not an image").unwrap_err();
        assert!(matches!(err, PreprocessError::Decode(_)));
    }
}

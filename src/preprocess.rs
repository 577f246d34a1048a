use image::{io::Reader as ImageReader, DynamicImage, GenericImageView, Rgba, RgbaImage};
use ndarray::Array4;
use std::path::Path;

use crate::error::ApiError;

const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Decodes an uploaded file, sniffing the format from its bytes.
pub fn load_image(path: &Path) -> Result<DynamicImage, ApiError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| ApiError::InvalidImage(e.to_string()))
}

/// Fits the image inside a `size` square and pads the rest with black.
pub fn letterbox(img: &DynamicImage, size: u32) -> RgbaImage {
    let (width, height) = img.dimensions();
    let (new_width, new_height) = fitted_dims(width, height, size);

    let resized = img.resize_exact(new_width, new_height, image::imageops::FilterType::Triangle);

    let mut canvas = RgbaImage::new(size, size);
    let pad_x = (size - new_width) / 2;
    let pad_y = (size - new_height) / 2;

    for (x, y, pixel) in resized.pixels() {
        canvas.put_pixel(x + pad_x, y + pad_y, Rgba([pixel[0], pixel[1], pixel[2], 255]));
    }

    canvas
}

/// Dimensions of `width x height` scaled so the longer side equals `size`.
pub fn fitted_dims(width: u32, height: u32, size: u32) -> (u32, u32) {
    let scaled = |num: u32, den: u32| {
        let side = u64::from(size) * u64::from(num) / u64::from(den.max(1));
        side.max(1).min(u64::from(size)) as u32
    };
    if width > height {
        (size, scaled(height, width))
    } else {
        (scaled(width, height), size)
    }
}

/// NCHW tensor normalized with ImageNet statistics.
pub fn to_tensor(img: &RgbaImage) -> Array4<f32> {
    let (width, height) = img.dimensions();
    let mut tensor = Array4::zeros((1, 3, height as usize, width as usize));

    for (x, y, pixel) in img.enumerate_pixels() {
        for c in 0..3 {
            let value = (pixel[c] as f32 / 255.0 - MEAN[c]) / STD[c];
            tensor[[0, c, y as usize, x as usize]] = value;
        }
    }

    tensor
}

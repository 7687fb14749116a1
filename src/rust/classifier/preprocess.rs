use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::Array4;

use super::error::ClassifierError;

/// Spatial resolution the model expects on both axes.
pub const INPUT_SIZE: u32 = 224;
/// Colour channels fed to the model (RGB).
pub const INPUT_CHANNELS: usize = 3;

/// Decodes raw upload bytes and turns them into the model's input tensor.
///
/// The image is converted to 8-bit RGB, resized to exactly
/// `INPUT_SIZE x INPUT_SIZE` with bicubic resampling (aspect ratio is not
/// preserved), scaled into `[0.0, 1.0]` and laid out as NHWC with a batch
/// dimension of one: `[1, 224, 224, 3]`.
///
/// # Errors
/// - `ValidationError` if `bytes` is empty
/// - `ImageError` if the format is unknown or the data is corrupt
pub fn preprocess(bytes: &[u8]) -> Result<Array4<f32>, ClassifierError> {
    if bytes.is_empty() {
        return Err(ClassifierError::ValidationError("Uploaded image is empty".into()));
    }

    let decoded = image::load_from_memory(bytes)?;
    log::debug!(
        "Decoded {}x{} image ({:?})",
        decoded.width(),
        decoded.height(),
        decoded.color()
    );

    Ok(to_tensor(&resize(&decoded.to_rgb8())))
}

fn resize(img: &RgbImage) -> RgbImage {
    if img.dimensions() == (INPUT_SIZE, INPUT_SIZE) {
        return img.clone();
    }
    imageops::resize(img, INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom)
}

fn to_tensor(img: &RgbImage) -> Array4<f32> {
    let (width, height) = img.dimensions();
    Array4::from_shape_fn(
        (1, height as usize, width as usize, INPUT_CHANNELS),
        |(_, y, x, c)| img.get_pixel(x as u32, y as u32)[c] as f32 / 255.0,
    )
}

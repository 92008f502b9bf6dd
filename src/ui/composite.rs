//! Rasterises what the overlay view shows into a single image.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::imageops::FilterType;
use image::{Rgba, RgbaImage};

use crate::file::decode_data_url;
use crate::model::OverlayInput;
use crate::ui::components::overlay_view::{BlendIntensity, OverlayView};

#[derive(Debug, thiserror::Error)]
pub enum CompositeError {
    #[error("no result is displayed")]
    NoData,

    #[error("the original image is not a base64 data URL")]
    InvalidDataUrl,

    #[error("the heatmap is not valid base64: {0}")]
    InvalidHeatmap(#[from] base64::DecodeError),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Multiplies the heatmap into the original at `intensity`, like
/// `mix-blend-mode: multiply` with the heatmap's opacity set to `intensity`.
///
/// The heatmap is stretched to the original's size. Without a heatmap the original is
/// returned unchanged.
pub fn composite(input: &OverlayInput, intensity: BlendIntensity) -> Result<RgbaImage, CompositeError> {
    let (_, original_bytes) = decode_data_url(&input.original_image).ok_or(CompositeError::InvalidDataUrl)?;
    let mut base = image::load_from_memory(&original_bytes)?.to_rgba8();

    let Some(heatmap) = input.heatmap.as_deref().filter(|h| !h.is_empty()) else {
        return Ok(base);
    };

    let heatmap = image::load_from_memory(&STANDARD.decode(heatmap)?)?.to_rgba8();
    let heatmap = image::imageops::resize(&heatmap, base.width(), base.height(), FilterType::Triangle);

    for (pixel, overlay) in base.pixels_mut().zip(heatmap.pixels()) {
        *pixel = blend_multiply(*pixel, *overlay, intensity.value());
    }

    Ok(base)
}

fn blend_multiply(base: Rgba<u8>, overlay: Rgba<u8>, opacity: f64) -> Rgba<u8> {
    let alpha = opacity * f64::from(overlay[3]) / 255.0;
    let mut out = base;
    for channel in 0..3 {
        let b = f64::from(base[channel]);
        let multiplied = b * f64::from(overlay[channel]) / 255.0;
        out[channel] = (b * (1.0 - alpha) + multiplied * alpha).round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// Writes the overlay view's current composite to `path`. The format follows the
/// extension.
pub fn save_composite(view: &OverlayView, path: &Path) -> Result<(), CompositeError> {
    let input = view.data().ok_or(CompositeError::NoData)?;
    composite(input, view.intensity())?.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::ImageFormat;

    use super::*;
    use crate::file::data_url;

    fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba(color));
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    fn input(heatmap: Option<Vec<u8>>) -> OverlayInput {
        OverlayInput {
            original_image: data_url("image/png", &png(4, 4, [200, 100, 50, 255])),
            heatmap: heatmap.map(|h| STANDARD.encode(h)),
        }
    }

    #[test]
    fn without_heatmap_the_original_is_returned() {
        let out = composite(&input(None), BlendIntensity::default()).unwrap();
        assert_eq!(out.dimensions(), (4, 4));
        assert_eq!(*out.get_pixel(0, 0), Rgba([200, 100, 50, 255]));
    }

    #[test]
    fn multiply_blend_scales_with_intensity() {
        let heatmap = Some(png(2, 2, [0, 255, 128, 255]));

        let full = composite(&input(heatmap.clone()), BlendIntensity::new(1.0)).unwrap();
        assert_eq!(full.dimensions(), (4, 4));
        assert_eq!(*full.get_pixel(3, 3), Rgba([0, 100, 25, 255]));

        let none = composite(&input(heatmap.clone()), BlendIntensity::new(0.0)).unwrap();
        assert_eq!(*none.get_pixel(1, 2), Rgba([200, 100, 50, 255]));

        let half = composite(&input(heatmap), BlendIntensity::new(0.5)).unwrap();
        assert_eq!(*half.get_pixel(0, 0), Rgba([100, 100, 38, 255]));
    }

    #[test]
    fn broken_inputs_are_reported() {
        let bad_url = OverlayInput {
            original_image: "blob:abc".to_string(),
            heatmap: None,
        };
        assert!(matches!(composite(&bad_url, BlendIntensity::default()), Err(CompositeError::InvalidDataUrl)));

        let mut bad_heatmap = input(None);
        bad_heatmap.heatmap = Some("not base64!".to_string());
        assert!(matches!(
            composite(&bad_heatmap, BlendIntensity::default()),
            Err(CompositeError::InvalidHeatmap(_))
        ));
    }

    #[test]
    fn saving_needs_data() {
        let view = OverlayView::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nothing.png");
        assert!(matches!(save_composite(&view, &path), Err(CompositeError::NoData)));
        assert!(!path.exists());
    }
}

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, ImageOutputFormat};

use crate::config::UploadSettings;
use crate::error::AppError;

pub const ALLOWED_CONTENT_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];

const JPEG_QUALITY: u8 = 85;

/// An uploaded image that passed validation and is ready to forward.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub data: Vec<u8>,
    pub content_type: &'static str,
    pub file_name: Option<String>,
}

/// Checks the declared type first, then the size, then the bytes themselves.
pub fn validate(
    declared_type: Option<&str>,
    file_name: Option<String>,
    data: &[u8],
    settings: &UploadSettings,
) -> Result<ImageUpload, AppError> {
    let declared = declared_type
        .map(|t| t.trim().to_ascii_lowercase())
        .unwrap_or_default();
    if declared.is_empty() {
        return Err(AppError::UnsupportedMediaType("(none)".to_string()));
    }
    if !ALLOWED_CONTENT_TYPES.contains(&declared.as_str()) {
        return Err(AppError::UnsupportedMediaType(declared));
    }
    let expected = if declared == "image/png" {
        ImageFormat::Png
    } else {
        ImageFormat::Jpeg
    };

    if data.is_empty() {
        return Err(AppError::MissingFile);
    }
    if data.len() > settings.max_bytes {
        return Err(AppError::PayloadTooLarge {
            limit: settings.max_bytes,
        });
    }

    let sniffed =
        image::guess_format(data).map_err(|e| AppError::InvalidImage(e.to_string()))?;
    if sniffed != expected {
        return Err(AppError::InvalidImage(format!(
            "declared {} but content is {:?}",
            declared, sniffed
        )));
    }

    let img = image::load_from_memory_with_format(data, sniffed)
        .map_err(|e| AppError::InvalidImage(e.to_string()))?;

    if img.width() <= settings.max_dimension && img.height() <= settings.max_dimension {
        return Ok(ImageUpload {
            data: data.to_vec(),
            content_type: mime_for(sniffed),
            file_name,
        });
    }

    tracing::debug!(
        width = img.width(),
        height = img.height(),
        max = settings.max_dimension,
        "Downscaling oversized image"
    );

    let resized = img.thumbnail(settings.max_dimension, settings.max_dimension);
    let jpeg = encode_jpeg(&resized)?;

    Ok(ImageUpload {
        data: jpeg,
        content_type: "image/jpeg",
        file_name,
    })
}

fn encode_jpeg(img: &DynamicImage) -> Result<Vec<u8>, AppError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut out = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut out), ImageOutputFormat::Jpeg(JPEG_QUALITY))
        .map_err(|e| AppError::Internal(format!("re-encoding image: {}", e)))?;
    Ok(out)
}

fn mime_for(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "image/png",
        _ => "image/jpeg",
    }
}

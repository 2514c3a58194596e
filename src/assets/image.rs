use anyhow::Context;
use serde::Serialize;

use crate::{
    foundation::error::{FxgError, FxgResult},
    foundation::math::premultiply_channel,
};

/// Image container formats that can be embedded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MimeType {
    /// `image/png`.
    Png,
    /// `image/gif`.
    Gif,
    /// `image/jpeg`.
    Jpeg,
}

impl MimeType {
    /// MIME string.
    pub fn as_str(self) -> &'static str {
        match self {
            MimeType::Png => "image/png",
            MimeType::Gif => "image/gif",
            MimeType::Jpeg => "image/jpeg",
        }
    }

    fn format(self) -> ::image::ImageFormat {
        match self {
            MimeType::Png => ::image::ImageFormat::Png,
            MimeType::Gif => ::image::ImageFormat::Gif,
            MimeType::Jpeg => ::image::ImageFormat::Jpeg,
        }
    }
}

/// Guess the MIME type from the file extension (case-insensitive).
pub fn guess_mime_type(source: &str) -> Option<MimeType> {
    let lower = source.to_ascii_lowercase();
    if lower.ends_with(".png") {
        Some(MimeType::Png)
    } else if lower.ends_with(".gif") {
        Some(MimeType::Gif)
    } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        Some(MimeType::Jpeg)
    } else {
        None
    }
}

/// Unwrap a bitmap `source` attribute.
///
/// Accepts plain locators and the `@Embed('locator')` form. Returns `None` when the source
/// is absent or blank.
pub fn parse_source(source: Option<&str>) -> Option<String> {
    let mut s = source?.trim();

    if let Some(rest) = s.strip_prefix("@Embed(") {
        s = rest.trim();
        if let Some(rest) = s.strip_suffix(')') {
            s = rest.trim();
        }
        if s.len() >= 2 && s.starts_with('\'') && s.ends_with('\'') {
            s = s[1..s.len() - 1].trim();
        }
    }

    (!s.is_empty()).then(|| s.to_owned())
}

/// Bitmap payload as the target format stores it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BitmapData {
    /// Original JPEG bytes.
    Jpeg {
        /// Encoded bytes.
        bytes: Vec<u8>,
    },
    /// Lossless pixels, 4 bytes per pixel: alpha, then premultiplied red, green, blue.
    Lossless {
        /// Pixel rows, top to bottom.
        argb_premultiplied: Vec<u8>,
    },
}

/// Result of decoding a bitmap source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// Payload to embed.
    pub data: BitmapData,
}

/// Turns encoded image bytes into an embeddable bitmap.
pub trait BitmapDecoder {
    /// Decode `bytes`, which were guessed to be of type `mime`.
    fn decode(&self, bytes: &[u8], mime: MimeType) -> FxgResult<DecodedImage>;
}

/// [`BitmapDecoder`] backed by the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageBitmapDecoder;

impl BitmapDecoder for ImageBitmapDecoder {
    fn decode(&self, bytes: &[u8], mime: MimeType) -> FxgResult<DecodedImage> {
        let dyn_img = ::image::load_from_memory_with_format(bytes, mime.format())
            .with_context(|| format!("decode {} image", mime.as_str()))
            .map_err(|e| FxgError::image(format!("{e:#}")))?;

        let width = dyn_img.width();
        let height = dyn_img.height();

        let data = match mime {
            MimeType::Jpeg => BitmapData::Jpeg {
                bytes: bytes.to_vec(),
            },
            MimeType::Png | MimeType::Gif => BitmapData::Lossless {
                argb_premultiplied: premultiplied_argb(&dyn_img.to_rgba8().into_raw()),
            },
        };

        Ok(DecodedImage {
            width,
            height,
            data,
        })
    }
}

fn premultiplied_argb(rgba: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; rgba.len()];
    for (src, dst) in rgba.chunks_exact(4).zip(out.chunks_exact_mut(4)) {
        let a = src[3];
        dst[0] = a;
        if a == 0 {
            continue;
        }
        dst[1] = premultiply_channel(src[0], a);
        dst[2] = premultiply_channel(src[1], a);
        dst[3] = premultiply_channel(src[2], a);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/assets/image.rs"]
mod tests;

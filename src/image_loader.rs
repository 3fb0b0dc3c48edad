//! # Logo Image Loading
//!
//! Reads the header logo from a file path, a data URI or raw base64 and
//! prepares it for PDF embedding. JPEG bytes are embedded as-is (DCTDecode);
//! PNG is decoded to RGB with a separate alpha plane for the soft mask.

use std::io::Cursor;

use base64::Engine;

use crate::error::SinkError;

/// A decoded image ready for embedding.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixels: Pixels,
    pub width_px: u32,
    pub height_px: u32,
}

impl LoadedImage {
    /// Drawn height when scaled to `width`, keeping the aspect ratio.
    pub fn height_for_width(&self, width: f64) -> f64 {
        if self.width_px == 0 {
            return 0.0;
        }
        width * self.height_px as f64 / self.width_px as f64
    }
}

#[derive(Debug, Clone)]
pub enum Pixels {
    Jpeg { data: Vec<u8>, gray: bool },
    /// `rgb` is width * height * 3 bytes; `alpha` is present only when some
    /// pixel is not fully opaque.
    Rgb { rgb: Vec<u8>, alpha: Option<Vec<u8>> },
}

enum Source<'a> {
    DataUri(&'a str),
    Path(&'a str),
    Base64(&'a str),
}

impl<'a> Source<'a> {
    fn classify(src: &'a str) -> Self {
        if src.starts_with("data:image/") {
            Source::DataUri(src)
        } else if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") {
            Source::Path(src)
        } else if src.contains('.') && !src.contains('=') && src.len() < 256 {
            // Plain relative file names like "logo.png"; base64 never has dots.
            Source::Path(src)
        } else {
            Source::Base64(src)
        }
    }

    fn read(&self) -> Result<Vec<u8>, SinkError> {
        match self {
            Source::DataUri(uri) => {
                let (_, payload) = uri
                    .split_once(',')
                    .ok_or_else(|| SinkError::Image("invalid data URI: missing comma".into()))?;
                decode_base64(payload)
            }
            Source::Path(path) => std::fs::read(path)
                .map_err(|e| SinkError::Image(format!("failed to read '{}': {}", path, e))),
            Source::Base64(data) => decode_base64(data),
        }
    }
}

fn decode_base64(input: &str) -> Result<Vec<u8>, SinkError> {
    base64::engine::general_purpose::STANDARD
        .decode(input.trim())
        .map_err(|e| SinkError::Image(format!("base64 decode error: {}", e)))
}

/// Load and decode the image named by `src`.
pub fn load_image(src: &str) -> Result<LoadedImage, SinkError> {
    let bytes = Source::classify(src).read()?;
    decode(&bytes)
}

fn decode(data: &[u8]) -> Result<LoadedImage, SinkError> {
    if data.starts_with(&[0xFF, 0xD8]) {
        decode_jpeg(data)
    } else if data.starts_with(&[0x89, b'P', b'N', b'G']) {
        decode_png(data)
    } else {
        Err(SinkError::Image(
            "unsupported image format (expected JPEG or PNG)".into(),
        ))
    }
}

fn reader(data: &[u8]) -> Result<image::io::Reader<Cursor<&[u8]>>, SinkError> {
    image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| SinkError::Image(format!("format detection failed: {}", e)))
}

fn decode_jpeg(data: &[u8]) -> Result<LoadedImage, SinkError> {
    let (width, height) = reader(data)?
        .into_dimensions()
        .map_err(|e| SinkError::Image(format!("failed to read JPEG dimensions: {}", e)))?;

    Ok(LoadedImage {
        pixels: Pixels::Jpeg {
            data: data.to_vec(),
            gray: jpeg_component_count(data) == Some(1),
        },
        width_px: width,
        height_px: height,
    })
}

/// Walk the JPEG markers up to the first SOF segment and read its
/// component count.
fn jpeg_component_count(data: &[u8]) -> Option<u8> {
    let mut i = 2;
    while i + 3 < data.len() && data[i] == 0xFF {
        let marker = data[i + 1];
        if matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF) {
            return data.get(i + 9).copied();
        }
        let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        i += 2 + seg_len;
    }
    None
}

fn decode_png(data: &[u8]) -> Result<LoadedImage, SinkError> {
    let rgba = reader(data)?
        .decode()
        .map_err(|e| SinkError::Image(format!("failed to decode PNG: {}", e)))?
        .to_rgba8();

    let (width, height) = rgba.dimensions();
    let pixel_count = (width * height) as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    for px in rgba.pixels() {
        rgb.extend_from_slice(&px.0[..3]);
        alpha.push(px.0[3]);
    }
    let opaque = alpha.iter().all(|&a| a == 255);

    Ok(LoadedImage {
        pixels: Pixels::Rgb {
            rgb,
            alpha: if opaque { None } else { Some(alpha) },
        },
        width_px: width,
        height_px: height,
    })
}

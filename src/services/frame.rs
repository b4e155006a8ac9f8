use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::GenericImageView;

use crate::error::FrameError;

/// A decoded camera frame, validated as an image before it reaches a classifier.
#[derive(Debug, Clone)]
pub struct Frame {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decodes a transport frame payload.
///
/// Browsers send `canvas.toDataURL()` output, so a `data:image/jpeg;base64,`
/// prefix is stripped when present. Bare base64 is accepted too.
pub fn decode_frame(payload: &str) -> Result<Frame, FrameError> {
    let encoded = match payload.split_once(',') {
        Some((_, data)) => data,
        None => payload,
    }
    .trim();

    if encoded.is_empty() {
        return Err(FrameError::Empty);
    }

    let bytes = STANDARD.decode(encoded)?;
    let img = image::load_from_memory(&bytes)?;

    Ok(Frame {
        width: img.width(),
        height: img.height(),
        bytes,
    })
}

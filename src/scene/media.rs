//! Opaque media payloads: images, audio tracks and videos.
//!
//! Decoding is left to the viewer; this module only reads bytes, detects formats and
//! base64-encodes payloads into their defining commands.

use std::io::Cursor;
use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{SceneError, SceneResult};
use crate::script::codec::encode_bytes;
use crate::script::command::{Command, DefineAudioTrack, DefineImage, DefineVideo};

fn extension_of(path: &Path) -> SceneResult<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| {
            SceneError::validation(format!(
                "cannot infer a media type from '{}'",
                path.display()
            ))
        })
}

fn read_file(path: &Path, kind: &str) -> SceneResult<Vec<u8>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read {kind} '{}'", path.display()))?;
    if bytes.is_empty() {
        return Err(SceneError::validation(format!(
            "{kind} '{}' is empty",
            path.display()
        )));
    }
    Ok(bytes)
}

#[derive(Clone, Debug, PartialEq)]
/// Encoded image (PNG, JPEG, ...) used as a texture or 2D blit.
pub struct Image {
    pub(crate) image_id: String,
    ext: String,
    data: Vec<u8>,
}

impl Image {
    /// Encoded image bytes; the format is detected from the content.
    pub fn from_bytes(image_id: impl Into<String>, data: Vec<u8>) -> SceneResult<Self> {
        let format = image::guess_format(&data)
            .map_err(|e| SceneError::validation(format!("unrecognized image data: {e}")))?;
        let ext = format
            .extensions_str()
            .first()
            .copied()
            .unwrap_or("png")
            .to_string();
        Ok(Self {
            image_id: image_id.into(),
            ext,
            data,
        })
    }

    /// Read an image file.
    pub fn load(image_id: impl Into<String>, path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        Self::from_bytes(image_id, read_file(path, "image")?)
    }

    /// Encode straight RGBA8 pixels as PNG.
    pub fn from_rgba8(
        image_id: impl Into<String>,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> SceneResult<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(SceneError::shape_mismatch(
                "rgba8 image bytes",
                expected,
                pixels.len(),
            ));
        }
        let img = image::RgbaImage::from_raw(width, height, pixels)
            .ok_or_else(|| SceneError::validation("rgba8 buffer does not match image size"))?;
        let mut data = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut data), image::ImageFormat::Png)
            .context("encode png")?;
        Ok(Self {
            image_id: image_id.into(),
            ext: "png".to_string(),
            data,
        })
    }

    /// Identifier.
    pub fn image_id(&self) -> &str {
        &self.image_id
    }

    /// File extension of the encoded payload.
    pub fn ext(&self) -> &str {
        &self.ext
    }

    /// Encoded bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn to_command(&self) -> Command {
        Command::DefineImage(DefineImage {
            image_id: self.image_id.clone(),
            kind: self.ext.clone(),
            data: encode_bytes(&self.data),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Kind of time-based media.
pub enum MediaKind {
    /// Audio track.
    Audio,
    /// Video.
    Video,
}

#[derive(Clone, Debug, PartialEq)]
/// Audio track or video; the bytes are passed through untouched.
pub struct MediaTrack {
    pub(crate) media_id: String,
    kind: MediaKind,
    ext: String,
    data: Vec<u8>,
}

impl MediaTrack {
    /// Wrap already-encoded bytes with their file extension.
    pub fn from_bytes(
        media_id: impl Into<String>,
        kind: MediaKind,
        ext: impl Into<String>,
        data: Vec<u8>,
    ) -> SceneResult<Self> {
        let ext = ext.into().trim_start_matches('.').to_ascii_lowercase();
        if ext.is_empty() {
            return Err(SceneError::validation("media extension must be non-empty"));
        }
        if data.is_empty() {
            return Err(SceneError::validation("media payload must be non-empty"));
        }
        Ok(Self {
            media_id: media_id.into(),
            kind,
            ext,
            data,
        })
    }

    /// Read an audio or video file; the extension names the container.
    pub fn load(
        media_id: impl Into<String>,
        kind: MediaKind,
        path: impl AsRef<Path>,
    ) -> SceneResult<Self> {
        let path = path.as_ref();
        let label = match kind {
            MediaKind::Audio => "audio track",
            MediaKind::Video => "video",
        };
        let ext = extension_of(path)?;
        Self::from_bytes(media_id, kind, ext, read_file(path, label)?)
    }

    /// Identifier.
    pub fn media_id(&self) -> &str {
        &self.media_id
    }

    /// Audio or video.
    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Container extension.
    pub fn ext(&self) -> &str {
        &self.ext
    }

    pub(crate) fn to_command(&self) -> Command {
        let data = encode_bytes(&self.data);
        match self.kind {
            MediaKind::Audio => Command::DefineAudioTrack(DefineAudioTrack {
                audio_id: self.media_id.clone(),
                kind: self.ext.clone(),
                data,
            }),
            MediaKind::Video => Command::DefineVideo(DefineVideo {
                video_id: self.media_id.clone(),
                kind: self.ext.clone(),
                data,
            }),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/media.rs"]
mod tests;

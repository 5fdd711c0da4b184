//! Binary buffer encoding used inside the scene script.
//!
//! A matrix of `rows x cols` little-endian values is zlib-compressed, followed by a five byte
//! trailer (`u32` row count, `u8` column count, both little-endian) and finally base64 encoded.

use std::io::{Read as _, Write as _};

use anyhow::Context as _;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::foundation::error::{SceneError, SceneResult};

const TRAILER_LEN: usize = 5;

/// Scalar types that can be packed into a script buffer.
pub trait BufferElement: Copy + Send + Sync {
    /// Size in bytes of one value.
    const SIZE: usize;

    /// Append the little-endian bytes of `self`.
    fn write_le(self, out: &mut Vec<u8>);

    /// Read one value from exactly [`Self::SIZE`] little-endian bytes.
    fn read_le(bytes: &[u8]) -> Self;
}

macro_rules! buffer_element {
    ($ty:ty) => {
        impl BufferElement for $ty {
            const SIZE: usize = std::mem::size_of::<$ty>();

            fn write_le(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }

            fn read_le(bytes: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(bytes);
                <$ty>::from_le_bytes(raw)
            }
        }
    };
}

buffer_element!(f32);
buffer_element!(i16);
buffer_element!(u16);
buffer_element!(u32);

/// Encode `values` as a `rows x cols` matrix.
pub fn encode_matrix<T: BufferElement>(values: &[T], cols: usize) -> SceneResult<String> {
    if cols == 0 || cols > usize::from(u8::MAX) {
        return Err(SceneError::out_of_range(format!(
            "buffer column count {cols} must be in 1..=255"
        )));
    }
    if values.len() % cols != 0 {
        return Err(SceneError::validation(format!(
            "buffer length {} is not a multiple of {cols} columns",
            values.len()
        )));
    }
    let rows = u32::try_from(values.len() / cols)
        .map_err(|_| SceneError::out_of_range("buffer has more than u32::MAX rows"))?;

    let mut raw = Vec::with_capacity(values.len() * T::SIZE);
    for &v in values {
        v.write_le(&mut raw);
    }
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw).context("compress script buffer")?;
    let mut packed = encoder.finish().context("finish script buffer compression")?;
    packed.extend_from_slice(&rows.to_le_bytes());
    packed.push(cols as u8);
    Ok(STANDARD.encode(packed))
}

/// Decode a matrix produced by [`encode_matrix`]: `(values, rows, cols)`.
pub fn decode_matrix<T: BufferElement>(encoded: &str) -> SceneResult<(Vec<T>, usize, usize)> {
    let packed = STANDARD
        .decode(encoded)
        .map_err(|e| SceneError::serde(format!("buffer is not valid base64: {e}")))?;
    if packed.len() < TRAILER_LEN {
        return Err(SceneError::serde("buffer is shorter than its shape trailer"));
    }
    let (body, trailer) = packed.split_at(packed.len() - TRAILER_LEN);
    let rows = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]) as usize;
    let cols = usize::from(trailer[4]);

    let mut raw = Vec::new();
    ZlibDecoder::new(body)
        .read_to_end(&mut raw)
        .map_err(|e| SceneError::serde(format!("buffer is not valid zlib data: {e}")))?;
    if raw.len() != rows * cols * T::SIZE {
        return Err(SceneError::serde(format!(
            "buffer holds {} bytes, shape {rows}x{cols} needs {}",
            raw.len(),
            rows * cols * T::SIZE
        )));
    }
    let values = raw.chunks_exact(T::SIZE).map(T::read_le).collect();
    Ok((values, rows, cols))
}

/// Plain base64 of an opaque payload (images, audio, video).
pub fn encode_bytes(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Inverse of [`encode_bytes`].
pub fn decode_bytes(encoded: &str) -> SceneResult<Vec<u8>> {
    STANDARD
        .decode(encoded)
        .map_err(|e| SceneError::serde(format!("payload is not valid base64: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/script/codec.rs"]
mod tests;

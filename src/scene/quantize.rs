//! Keyframe selection and delta quantization for mesh update streams.
//!
//! Each base mesh's updates are walked in `frame_index` order against an explicit
//! [`KeyframeState`]. An update becomes a delta when its difference from the active keyframe fits
//! the representable span (`QUANTIZATION_BINS * threshold`); otherwise it becomes the next
//! keyframe. Deltas are always taken against a keyframe, never against another delta.

use std::fmt;

use crate::foundation::error::{SceneError, SceneResult};
use crate::geometry::vertex_buffer::VertexBuffer;
use crate::scene::mesh_update::{MeshUpdate, span_of};

/// Number of quantization bins; the representable span of a delta is this many error thresholds.
pub const QUANTIZATION_BINS: f32 = 65535.0;

/// Options of a quantization pass.
#[derive(Clone, Debug, PartialEq)]
pub struct QuantizeOpts {
    /// Error budget as a fraction of the base mesh's coefficient range (`<= 0` disables it).
    pub relative_error_threshold: f32,
    /// Error budget in raw units (`<= 0` disables it).
    pub absolute_error_threshold: f32,
    /// Restrict the pass to one base mesh.
    pub base_mesh_id: Option<String>,
    /// Encode each delta over its own span instead of the full representable span.
    pub per_frame_range: bool,
    /// Deltas allowed against one keyframe before a new keyframe is forced.
    pub max_deltas_per_keyframe: usize,
}

impl Default for QuantizeOpts {
    fn default() -> Self {
        Self {
            relative_error_threshold: 1e-5,
            absolute_error_threshold: 0.0,
            base_mesh_id: None,
            per_frame_range: true,
            max_deltas_per_keyframe: 255,
        }
    }
}

impl QuantizeOpts {
    /// Absolute threshold only.
    pub fn absolute(threshold: f32) -> Self {
        Self {
            relative_error_threshold: 0.0,
            absolute_error_threshold: threshold,
            ..Self::default()
        }
    }

    /// Relative threshold only.
    pub fn relative(threshold: f32) -> Self {
        Self {
            relative_error_threshold: threshold,
            absolute_error_threshold: 0.0,
            ..Self::default()
        }
    }

    /// Only quantize updates of `base_mesh_id`.
    pub fn base_mesh(mut self, base_mesh_id: impl Into<String>) -> Self {
        self.base_mesh_id = Some(base_mesh_id.into());
        self
    }

    /// Toggle per-frame ranges.
    pub fn per_frame_range(mut self, value: bool) -> Self {
        self.per_frame_range = value;
        self
    }

    /// Cap on the deltas chained to one keyframe.
    pub fn max_deltas_per_keyframe(mut self, value: usize) -> Self {
        self.max_deltas_per_keyframe = value;
        self
    }

    /// Widest delta span that can be encoded within the error budget, given the base mesh's
    /// coefficient range. When both thresholds are active the tighter one wins.
    pub fn representable_range(&self, mesh_range: f32) -> SceneResult<f32> {
        let relative = self.relative_error_threshold > 0.0;
        let absolute = self.absolute_error_threshold > 0.0;
        let absolute_range = QUANTIZATION_BINS * self.absolute_error_threshold;
        let relative_range = QUANTIZATION_BINS * self.relative_error_threshold * mesh_range;
        match (relative, absolute) {
            (true, true) => Ok(absolute_range.min(relative_range)),
            (true, false) => Ok(relative_range),
            (false, true) => Ok(absolute_range),
            (false, false) => Err(SceneError::validation(
                "one of the quantization thresholds must be > 0",
            )),
        }
    }
}

/// Outcome of quantizing one base mesh's stream.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct QuantizationInfo {
    /// Updates kept at full precision.
    pub keyframe_count: u32,
    /// Estimated encoded size relative to sending every update at full precision.
    pub estimated_size_ratio: f32,
    /// Mean worst-case quantization error over the deltas.
    pub mean_error: f32,
    /// Largest worst-case quantization error over the deltas.
    pub max_error: f32,
}

impl fmt::Display for QuantizationInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "QuantizationInfo(keyframe_count={}, estimated_size_ratio={}, mean_error={}, max_error={})",
            self.keyframe_count, self.estimated_size_ratio, self.mean_error, self.max_error
        )
    }
}

/// Reference point of one base mesh's stream.
#[derive(Clone, Debug, PartialEq)]
pub enum KeyframeState {
    /// No update seen yet.
    NoKeyframe,
    /// Deltas are encoded against this keyframe.
    HasKeyframe {
        /// `frame_index` of the keyframe update.
        frame_index: u32,
        /// Its full-precision buffer.
        buffer: VertexBuffer,
        /// Deltas encoded against it so far.
        deltas: usize,
    },
}

/// Result of feeding one update to [`KeyframeState::accept`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Assignment {
    /// The update is (or became) a keyframe.
    Keyframe,
    /// The update is a delta with the given worst-case error.
    Delta {
        /// `span / QUANTIZATION_BINS` of the encoded interval.
        error: f32,
    },
}

impl KeyframeState {
    /// Assign `update` as a keyframe or a delta, quantizing it in the latter case.
    ///
    /// `update` must not already be quantized.
    pub fn accept(
        &mut self,
        update: &mut MeshUpdate,
        representable_range: f32,
        opts: &QuantizeOpts,
    ) -> SceneResult<Assignment> {
        let keyframe = match self {
            KeyframeState::NoKeyframe => None,
            KeyframeState::HasKeyframe {
                frame_index,
                buffer,
                deltas,
            } => Some((*frame_index, buffer, deltas)),
        };

        if let Some((keyframe_index, buffer, deltas)) = keyframe
            && buffer.same_columns(update.vertex_buffer())
            && *deltas < opts.max_deltas_per_keyframe
        {
            let (min, max) = span_of(&update.delta(buffer)?);
            let span = max - min;
            if span <= representable_range {
                let range = (!opts.per_frame_range).then_some(representable_range);
                update.quantize(keyframe_index, buffer, range)?;
                *deltas += 1;
                let encoded = if opts.per_frame_range {
                    span
                } else {
                    representable_range
                };
                return Ok(Assignment::Delta {
                    error: encoded / QUANTIZATION_BINS,
                });
            }
        }

        *self = KeyframeState::HasKeyframe {
            frame_index: update.frame_index(),
            buffer: update.vertex_buffer().clone(),
            deltas: 0,
        };
        Ok(Assignment::Keyframe)
    }
}

fn estimate_size_ratio(keyframes: usize, updates: usize, per_frame_range: bool) -> f32 {
    if updates == 0 {
        return 1.0;
    }
    let keyframe_size = keyframes as f32 * 4.0;
    let mut delta_size = (updates - keyframes) as f32 * 2.0;
    if !per_frame_range {
        delta_size *= 0.75;
    }
    (keyframe_size + delta_size) / (updates as f32 * 4.0)
}

/// Check that every update of one stream has the same row count.
pub(crate) fn validate_stream(base_mesh_id: &str, updates: &[&mut MeshUpdate]) -> SceneResult<()> {
    let Some(first) = updates.first() else {
        return Ok(());
    };
    for update in updates.iter().skip(1) {
        if update.rows() != first.rows() {
            return Err(SceneError::shape_mismatch(
                format!(
                    "update '{}' (frame {}) of mesh '{base_mesh_id}'",
                    update.mesh_id(),
                    update.frame_index()
                ),
                first.rows(),
                update.rows(),
            ));
        }
    }
    Ok(())
}

/// Quantize one base mesh's updates, which must be unquantized and in chronological order.
#[tracing::instrument(skip(updates, opts), fields(updates = updates.len()))]
pub(crate) fn quantize_stream(
    base_mesh_id: &str,
    updates: &mut [&mut MeshUpdate],
    representable_range: f32,
    opts: &QuantizeOpts,
) -> SceneResult<QuantizationInfo> {
    let mut state = KeyframeState::NoKeyframe;
    let mut keyframes = 0usize;
    let mut error_sum = 0.0f32;
    let mut max_error = 0.0f32;
    for update in updates.iter_mut() {
        match state.accept(update, representable_range, opts)? {
            Assignment::Keyframe => keyframes += 1,
            Assignment::Delta { error } => {
                error_sum += error;
                max_error = max_error.max(error);
            }
        }
    }

    let deltas = updates.len() - keyframes;
    let info = QuantizationInfo {
        keyframe_count: keyframes as u32,
        estimated_size_ratio: estimate_size_ratio(keyframes, updates.len(), opts.per_frame_range),
        mean_error: if deltas > 0 {
            error_sum / deltas as f32
        } else {
            0.0
        },
        max_error,
    };
    tracing::debug!(
        base_mesh_id,
        keyframes = info.keyframe_count,
        ratio = info.estimated_size_ratio,
        max_error = info.max_error,
        "quantized update stream"
    );
    Ok(info)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/quantize.rs"]
mod tests;

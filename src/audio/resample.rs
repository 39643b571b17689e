use crate::{JarvisError, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::debug;

const CHUNK_FRAMES: usize = 1024;

/// Convert a mono capture to `target_rate` for recognition
pub fn to_rate(samples: &[f32], source_rate: u32, target_rate: u32) -> Result<Vec<f32>> {
    if source_rate == 0 || target_rate == 0 {
        return Err(JarvisError::ConfigError(
            "Sample rates must be greater than 0".into(),
        ));
    }
    if source_rate == target_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let ratio = target_rate as f64 / source_rate as f64;
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, CHUNK_FRAMES, 1)
        .map_err(|e| JarvisError::TranscriptionError(format!("Failed to create resampler: {}", e)))?;

    let mut output = Vec::with_capacity((samples.len() as f64 * ratio * 1.1) as usize);
    for chunk in samples.chunks(CHUNK_FRAMES) {
        // SincFixedIn wants full chunks; the tail is zero padded
        let mut block = vec![0.0f32; CHUNK_FRAMES];
        block[..chunk.len()].copy_from_slice(chunk);

        let processed = resampler
            .process(&[block], None)
            .map_err(|e| JarvisError::TranscriptionError(format!("Resampling failed: {}", e)))?;

        let produced = &processed[0];
        let keep = if chunk.len() < CHUNK_FRAMES {
            ((chunk.len() as f64) * ratio).ceil() as usize
        } else {
            produced.len()
        };
        output.extend_from_slice(&produced[..keep.min(produced.len())]);
    }

    debug!(
        "Resampled {} samples at {}Hz -> {} samples at {}Hz",
        samples.len(),
        source_rate,
        output.len(),
        target_rate
    );
    Ok(output)
}

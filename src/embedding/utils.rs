use std::io;
use std::path::Path;
use tokenizers::{Tokenizer, TruncationParams};

/// Files a BERT model directory must contain.
pub const REQUIRED_MODEL_FILES: [&str; 3] = ["config.json", "model.safetensors", "tokenizer.json"];

/// Returns the first required file missing from `model_dir`, if any.
pub fn missing_model_file(model_dir: &Path) -> Option<&'static str> {
    REQUIRED_MODEL_FILES
        .into_iter()
        .find(|name| !model_dir.join(name).exists())
}

/// Loads `tokenizer.json` from a model directory with truncation at `max_len` tokens.
///
/// Cross-encoders and BERT encoders have a fixed position-embedding table; longer inputs must be
/// cut rather than rejected.
pub fn load_tokenizer_with_truncation(model_dir: &Path, max_len: usize) -> io::Result<Tokenizer> {
    let mut tokenizer =
        Tokenizer::from_file(model_dir.join("tokenizer.json")).map_err(io::Error::other)?;

    let truncation = TruncationParams {
        max_length: max_len,
        ..Default::default()
    };

    tokenizer
        .with_truncation(Some(truncation))
        .map_err(|e| io::Error::other(format!("Failed to configure truncation: {}", e)))?;

    Ok(tokenizer)
}

/// Scales `vector` to unit length in place (zero vectors are left as is).
pub fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

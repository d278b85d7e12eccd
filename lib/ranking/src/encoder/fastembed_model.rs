//! fastembed-backed encoder
//!
//! Runs sentence-transformer models locally through ONNX. The model is
//! downloaded into `<cache_dir>/models` on first use.

use super::TextEncoder;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use parking_lot::Mutex;
use shopkeeper_core::{Error, Result, Vector};
use std::path::PathBuf;

/// Wrapper around fastembed's `TextEmbedding`.
/// fastembed's `embed()` takes `&mut self`, hence the mutex.
pub struct FastEmbedEncoder {
    model: Mutex<TextEmbedding>,
    model_name: String,
    dimensions: usize,
}

impl FastEmbedEncoder {
    /// Load `model_name`, downloading it into `cache_dir` if needed.
    pub fn new(model_name: &str, cache_dir: PathBuf) -> Result<Self> {
        let model_enum = parse_model_name(model_name)?;

        let models_dir = cache_dir.join("models");
        std::fs::create_dir_all(&models_dir)?;

        let options = InitOptions::new(model_enum)
            .with_cache_dir(models_dir)
            .with_show_download_progress(true);

        let mut model = TextEmbedding::try_new(options)
            .map_err(|e| Error::Encoder(format!("model initialization failed: {}", e)))?;

        let dimensions = detect_dimensions(&mut model)?;
        tracing::info!(model = model_name, dimensions, "Embedding model loaded");

        Ok(Self {
            model: Mutex::new(model),
            model_name: model_name.to_string(),
            dimensions,
        })
    }
}

impl TextEncoder for FastEmbedEncoder {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn encode(&self, text: &str) -> Result<Vector> {
        let embeddings = self
            .model
            .lock()
            .embed(vec![text], None)
            .map_err(|e| Error::Encoder(e.to_string()))?;

        embeddings
            .into_iter()
            .next()
            .map(Vector::new)
            .ok_or_else(|| Error::Encoder("no embedding returned".to_string()))
    }

    fn encode_many(&self, texts: &[String]) -> Result<Vec<Vector>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = self
            .model
            .lock()
            .embed(texts.to_vec(), None)
            .map_err(|e| Error::Encoder(e.to_string()))?;

        if embeddings.len() != texts.len() {
            return Err(Error::Encoder(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }
        Ok(embeddings.into_iter().map(Vector::new).collect())
    }
}

fn parse_model_name(name: &str) -> Result<EmbeddingModel> {
    match name.to_lowercase().as_str() {
        "all-minilm-l6-v2" => Ok(EmbeddingModel::AllMiniLML6V2),
        "all-minilm-l6-v2-q" => Ok(EmbeddingModel::AllMiniLML6V2Q),
        "bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
        "bge-small-en-v1.5-q" => Ok(EmbeddingModel::BGESmallENV15Q),
        "bge-base-en-v1.5" => Ok(EmbeddingModel::BGEBaseENV15),
        "bge-base-en-v1.5-q" => Ok(EmbeddingModel::BGEBaseENV15Q),
        _ => Err(Error::Encoder(format!(
            "unknown model: {}. Supported models: all-MiniLM-L6-v2, bge-small-en-v1.5, bge-base-en-v1.5 (add -q suffix for quantized)",
            name
        ))),
    }
}

fn detect_dimensions(model: &mut TextEmbedding) -> Result<usize> {
    let sample = model
        .embed(vec!["test"], None)
        .map_err(|e| Error::Encoder(format!("failed to detect dimensions: {}", e)))?;

    sample
        .first()
        .map(Vec::len)
        .ok_or_else(|| Error::Encoder("model returned no embedding".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_model_rejected() {
        let dir = std::env::temp_dir().join("shopkeeper-embed-invalid");
        let result = FastEmbedEncoder::new("nonexistent-model", dir);
        assert!(matches!(result, Err(Error::Encoder(_))));
    }

    // Requires model download - run with --ignored
    #[test]
    #[ignore = "requires model download"]
    fn test_minilm_dimensions() {
        let dir = std::env::temp_dir().join("shopkeeper-embed-minilm");
        let encoder = FastEmbedEncoder::new("all-MiniLM-L6-v2", dir).unwrap();
        assert_eq!(encoder.dimensions(), 384);
        assert_eq!(encoder.encode("summer wedding").unwrap().dim(), 384);
    }
}

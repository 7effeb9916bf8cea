//! # Encoder collaborator
//!
//! The text-to-vector encoder behind the [`Encoder`] trait. The ranker treats
//! it as an opaque `encode(text) -> vector` function; the production
//! implementation is a Candle BERT sentence-embedding model
//! (all-MiniLM-L6-v2, 384-d) fetched from the Hugging Face Hub and run on CPU.
//!
//! Query vectors must match the catalog's dimensionality; the ranker checks
//! this at the call site and reports [`EncodeError::DimensionMismatch`].

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config, DTYPE};
use hf_hub::{Repo, RepoType, api::sync::Api};
use std::fmt::Display;
use tokenizers::Tokenizer;
use tracing::info;

use crate::error::EncodeError;

const MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";
const MODEL_REVISION: &str = "main";

/// Narrow contract for the text-to-vector collaborator.
pub trait Encoder {
    fn encode(&self, text: &str) -> Result<Vec<f32>, EncodeError>;
}

fn inference(err: impl Display) -> EncodeError {
    EncodeError::Inference(err.to_string())
}

/// Sentence-embedding model running locally via Candle.
pub struct BertEncoder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dimension: usize,
}

impl BertEncoder {
    /// Load the model from the Hugging Face Hub (cached locally after the
    /// first download).
    pub fn load() -> Result<Self, EncodeError> {
        let device = Device::Cpu;

        let repo = Repo::with_revision(
            MODEL_ID.to_string(),
            RepoType::Model,
            MODEL_REVISION.to_string(),
        );
        let api = Api::new().map_err(inference)?;
        let api_repo = api.repo(repo);

        let config_filename = api_repo.get("config.json").map_err(inference)?;
        let tokenizer_filename = api_repo.get("tokenizer.json").map_err(inference)?;
        let weights_filename = api_repo.get("model.safetensors").map_err(inference)?;

        let config = std::fs::read_to_string(config_filename).map_err(inference)?;
        let config: Config = serde_json::from_str(&config).map_err(inference)?;
        let dimension = config.hidden_size;

        let tokenizer = Tokenizer::from_file(tokenizer_filename).map_err(inference)?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_filename], DTYPE, &device)
                .map_err(inference)?
        };
        let model = BertModel::load(vb, &config).map_err(inference)?;

        info!("sentence embedding model loaded ({MODEL_ID}, {dimension}-d)");
        Ok(Self {
            model,
            tokenizer,
            device,
            dimension,
        })
    }

    /// Dimensionality of the vectors this encoder produces.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Mean pooling over token embeddings, weighted by the attention mask.
    fn mean_pooling(
        &self,
        embeddings: &Tensor,
        attention_mask: &[u32],
    ) -> Result<Tensor, EncodeError> {
        // embeddings: [1, seq_len, hidden]; mask broadcast to [1, seq_len, 1]
        let mask = Tensor::new(attention_mask, &self.device)
            .and_then(|t| t.to_dtype(DType::F32))
            .and_then(|t| t.unsqueeze(0))
            .and_then(|t| t.unsqueeze(2))
            .map_err(inference)?;

        let sum = embeddings
            .broadcast_mul(&mask)
            .and_then(|t| t.sum(1))
            .map_err(inference)?;
        let count = mask
            .sum(1)
            .and_then(|t| t.clamp(1f32, f32::INFINITY))
            .map_err(inference)?;

        sum.broadcast_div(&count)
            .and_then(|t| t.squeeze(0))
            .map_err(inference)
    }

    fn l2_normalize(&self, tensor: &Tensor) -> Result<Tensor, EncodeError> {
        let norm = tensor
            .sqr()
            .and_then(|t| t.sum_all())
            .and_then(|t| t.sqrt())
            .map_err(inference)?;
        tensor.broadcast_div(&norm).map_err(inference)
    }
}

impl Encoder for BertEncoder {
    /// Embed text into a normalized dense vector. Input past the tokenizer's
    /// 512-token window is truncated.
    fn encode(&self, text: &str) -> Result<Vec<f32>, EncodeError> {
        let tokens = self.tokenizer.encode(text, true).map_err(inference)?;

        let token_ids = Tensor::new(tokens.get_ids(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(inference)?;
        let token_type_ids = Tensor::new(tokens.get_type_ids(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(inference)?;

        let output = self
            .model
            .forward(&token_ids, &token_type_ids, None)
            .map_err(inference)?;

        let embedding = self.mean_pooling(&output, tokens.get_attention_mask())?;
        let embedding = self.l2_normalize(&embedding)?;
        embedding.to_vec1::<f32>().map_err(inference)
    }
}

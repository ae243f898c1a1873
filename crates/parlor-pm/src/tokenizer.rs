//! Token counting for assembled prompts.
//!
//! [`Tokenizer`] is the seam the prompt builder counts through. The
//! production implementation is [`BpeTokenizer`], backed by `tiktoken-rs`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tiktoken_rs::CoreBPE;
use tracing::debug;

use crate::error::PmError;

/// Splits text into language-model token ids.
pub trait Tokenizer: Send + Sync {
    /// Encode `text` into token ids.
    fn encode(&self, text: &str) -> Vec<u32>;

    /// Number of tokens in `text`.
    fn count(&self, text: &str) -> usize {
        self.encode(text).len()
    }
}

/// BPE vocabularies understood by [`BpeTokenizer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// GPT-3 family vocabulary.
    #[default]
    R50k,
    P50k,
    Cl100k,
    O200k,
}

impl Encoding {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::R50k => "r50k",
            Self::P50k => "p50k",
            Self::Cl100k => "cl100k",
            Self::O200k => "o200k",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = PmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "r50k" | "r50k_base" => Ok(Self::R50k),
            "p50k" | "p50k_base" => Ok(Self::P50k),
            "cl100k" | "cl100k_base" => Ok(Self::Cl100k),
            "o200k" | "o200k_base" => Ok(Self::O200k),
            other => Err(PmError::UnknownEncoding(other.to_owned())),
        }
    }
}

/// A [`Tokenizer`] over one of the bundled tiktoken vocabularies.
pub struct BpeTokenizer {
    encoding: Encoding,
    bpe: CoreBPE,
}

impl BpeTokenizer {
    /// Load the vocabulary for `encoding`.
    ///
    /// # Errors
    ///
    /// Returns `PmError::Tokenizer` if the vocabulary cannot be built.
    pub fn new(encoding: Encoding) -> Result<Self, PmError> {
        let bpe = match encoding {
            Encoding::R50k => tiktoken_rs::r50k_base(),
            Encoding::P50k => tiktoken_rs::p50k_base(),
            Encoding::Cl100k => tiktoken_rs::cl100k_base(),
            Encoding::O200k => tiktoken_rs::o200k_base(),
        }
        .map_err(|e| PmError::Tokenizer(format!("{encoding}: {e}")))?;
        debug!(%encoding, "loaded bpe vocabulary");

        Ok(Self { encoding, bpe })
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }
}

impl fmt::Debug for BpeTokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BpeTokenizer")
            .field("encoding", &self.encoding)
            .finish_non_exhaustive()
    }
}

impl Tokenizer for BpeTokenizer {
    fn encode(&self, text: &str) -> Vec<u32> {
        self.bpe.encode_ordinary(text)
    }
}

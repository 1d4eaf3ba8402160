//! Token counting using tiktoken.
//!
//! Chunk files are consumed by a model whose tokenizer is known ahead of
//! time, so estimates use the same BPE encoding. `cl100k_base` is the
//! default; `o200k_base` is available for newer consumers.
//!
//! Estimates are a pure function of the serialized bytes: a record is
//! serialized to its compact output form and that string is counted.

use std::str::FromStr;
use std::sync::OnceLock;

use serde::Serialize;
use tiktoken_rs::{CoreBPE, cl100k_base, o200k_base};

/// BPE encodings a downstream consumer may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TokenEncoding {
    #[default]
    Cl100kBase,
    O200kBase,
}

impl TokenEncoding {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cl100kBase => "cl100k_base",
            Self::O200kBase => "o200k_base",
        }
    }

    /// Parse an encoding name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cl100k_base" | "cl100k" => Some(Self::Cl100kBase),
            "o200k_base" | "o200k" => Some(Self::O200kBase),
            _ => None,
        }
    }
}

impl FromStr for TokenEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown token encoding: {s}"))
    }
}

impl std::fmt::Display for TokenEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The tiktoken encoders are expensive to initialize (they load vocabulary
/// data), so each is created once and shared by every `TokenCounter`.
static CL100K: OnceLock<Option<CoreBPE>> = OnceLock::new();
static O200K: OnceLock<Option<CoreBPE>> = OnceLock::new();

fn get_encoder(encoding: TokenEncoding) -> Option<&'static CoreBPE> {
    match encoding {
        TokenEncoding::Cl100kBase => CL100K
            .get_or_init(|| loaded(encoding, cl100k_base()))
            .as_ref(),
        TokenEncoding::O200kBase => O200K
            .get_or_init(|| loaded(encoding, o200k_base()))
            .as_ref(),
    }
}

/// Runs inside `get_or_init`, so a failure is reported once per encoding.
fn loaded<E: std::fmt::Display>(
    encoding: TokenEncoding,
    result: Result<CoreBPE, E>,
) -> Option<CoreBPE> {
    match result {
        Ok(bpe) => Some(bpe),
        Err(err) => {
            tracing::error!(
                encoding = encoding.as_str(),
                "Failed to initialize tiktoken encoder: {err}. Falling back to byte-length estimates."
            );
            None
        }
    }
}

/// Thread-safe token counter over a shared tiktoken encoder.
///
/// Falls back to byte length if the encoder cannot be initialized, which
/// over-estimates and therefore keeps chunks under budget.
///
/// # Example
///
/// ```
/// use repomerge_context::TokenCounter;
///
/// let counter = TokenCounter::new();
/// let tokens = counter.count_str("Hello, world!");
/// assert!(tokens > 0);
/// ```
#[derive(Clone, Copy)]
pub struct TokenCounter {
    encoding: TokenEncoding,
    encoder: Option<&'static CoreBPE>,
}

impl std::fmt::Debug for TokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCounter")
            .field("encoding", &self.encoding)
            .field("encoder", &self.encoder.as_ref().map(|_| "<CoreBPE>"))
            .finish()
    }
}

impl TokenCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::with_encoding(TokenEncoding::default())
    }

    #[must_use]
    pub fn with_encoding(encoding: TokenEncoding) -> Self {
        Self {
            encoding,
            encoder: get_encoder(encoding),
        }
    }

    #[must_use]
    pub const fn encoding(&self) -> TokenEncoding {
        self.encoding
    }

    /// Counts the number of tokens in a string.
    #[must_use]
    pub fn count_str(&self, text: &str) -> u32 {
        let len = match self.encoder {
            Some(encoder) => encoder.encode_ordinary(text).len(),
            None => text.len(),
        };

        u32::try_from(len).unwrap_or(u32::MAX)
    }

    /// Estimated cost of `item` in its compact JSON output form.
    ///
    /// This is the same serialization chunk files are written with, so the
    /// sum of estimates in a chunk is what the consumer will see.
    #[must_use]
    pub fn estimate<T: Serialize + ?Sized>(&self, item: &T) -> u32 {
        match serde_json::to_string(item) {
            Ok(serialized) => self.count_str(&serialized),
            Err(e) => {
                tracing::warn!("Failed to serialize item for token estimate: {e}");
                0
            }
        }
    }
}

impl Default for TokenCounter {
    fn default() -> Self {
        Self::new()
    }
}

//! Token estimation and token-bounded packing.
//!
//! # Architecture
//!
//! ```text
//! TokenCounter (tiktoken, shared encoder per encoding)
//! └── estimate(item) = count_str(compact JSON of item)
//!
//! ChunkPacker (greedy, single pass)
//! └── Chunk<T> { items, token_count }
//! ```

mod packer;
mod token_counter;

pub use packer::{ChunkPacker, pack, pack_by};
pub use token_counter::{TokenCounter, TokenEncoding};

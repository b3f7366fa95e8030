//! Parameter codec subsystem.
//!
//! # Data Flow
//! ```text
//! Encode: Params → params.rs (flatten / bind) → grammar segment → cipher.rs (optional)
//! Decode: cipher.rs (optional) → grammar segment → params.rs (pair / bind) → Params
//! ```
//!
//! # Design Decisions
//! - Pure functions only; caching lives in `cache`
//! - Scalars are kept in string form end to end
//! - Path grammars percent-encode values (segment.rs); the query grammar
//!   uses form encoding at the call site

pub mod cipher;
pub mod params;
pub mod segment;

pub use cipher::Cipher;
pub use params::{bind, bindable_names, flatten, merge_addition, pair, ParamMap, Params, Scalar};
pub use segment::{join_escaped, split_unescaped};

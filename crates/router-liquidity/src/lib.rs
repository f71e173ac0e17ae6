//! Per-denom liquidity index for candidate route search.
//!
//! The index maps every observed denom to the pools containing it, sorted by
//! liquidity, plus the canonical orderbook shortcut for each counter-denom.
//! It is built in full from one block's pool snapshot and published as one
//! immutable unit through [`PublishedIndex`]. Readers hold an `Arc` to the
//! snapshot they loaded, so a rebuild never changes what an in-flight search
//! sees.

pub mod index;
pub mod published;

pub use index::{BuildError, BuildReport, DenomData, DenomLiquidityIndex, SkipReason, SkippedPool};
pub use published::{IndexSnapshot, PublishedIndex};

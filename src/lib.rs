//! # STPD - Compressed DNA Index
//!
//! STPD locates every occurrence of a pattern in a DNA text using space that
//! grows with the text's repetitiveness rather than its length. It samples a
//! suffix tree path decomposition: a small set of text positions, sorted by
//! the colex order of the prefixes they end, is enough to find one
//! occurrence, and the rest follow through the phi function.
//!
//! ## Architecture
//!
//! The crate is organized into these main modules:
//!
//! - [`succinct`] - Bit vectors, packed integers and Elias-Fano dictionaries
//! - [`text`] - Text oracles (2-bit packed or RLZ) answering LCP/LCS queries
//! - [`index`] - Sample array, phi backends, the index itself and its file format
//! - [`utils`] - Little-endian encoding and progress reporting
//!
//! ## Quick Start
//!
//! ```ignore
//! use stpd::index::{BuildInputs, IndexConfig, StpdIndex};
//! use std::path::Path;
//!
//! // Build from `chr21.fa` and its `.pa`, `.rbwt` and `.colex_m` files
//! let config = IndexConfig::default();
//! let inputs = BuildInputs::from_base(Path::new("chr21.fa"), config.sampling);
//! let index = StpdIndex::build(&inputs, &config).unwrap();
//! index.store(Path::new("chr21.stpd")).unwrap();
//!
//! let index = StpdIndex::load(Path::new("chr21.stpd")).unwrap();
//! for pos in index.locate(b"GATTACA") {
//!     println!("{}", pos);
//! }
//! ```
//!
//! ## Structures
//!
//! 1. **Oracle** - random access to the text without storing it in plain form
//! 2. **Sample array** - binary search narrowed by symbol buckets or by an
//!    Elias-Fano dictionary of packed windows
//! 3. **Phi** - run-length compressed colex successor, as a run table over a
//!    sparse or dense dictionary, an interleaved dictionary, or a move table

pub mod index;
pub mod succinct;
pub mod text;
pub mod utils;

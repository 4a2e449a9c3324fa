//! VITS text-to-speech engine implementation.
//!
//! This module runs offline VITS voices exported for ONNX Runtime. A voice is
//! a model plus a token table, and either a lexicon or an espeak-ng data
//! directory that turns text into model tokens.
//!
//! # Voice Directory Layout
//!
//! ```text
//! vits-zh-aishell3/
//! ├── model.onnx     # VITS graph with sample_rate / n_speakers / add_blank metadata
//! ├── tokens.txt     # `symbol id` per line
//! └── lexicon.txt    # `word tok1 tok2 ...` per line
//!
//! vits-piper-en_US-amy/
//! ├── model.onnx     # metadata carries the espeak-ng `voice`
//! ├── tokens.txt
//! └── espeak-ng-data/
//! ```
//!
//! # Model Inputs
//!
//! | Input | Type | Notes |
//! |---|---|---|
//! | `x` | int64 `[1, N]` | token ids |
//! | `x_length` | int64 `[1]` | `N` |
//! | `noise_scale` | float `[1]` | default 0.667 |
//! | `length_scale` | float `[1]` | configured scale divided by speed |
//! | `noise_scale_w` | float `[1]` | default 0.8 |
//! | `sid` | int64 `[1]` | multi-speaker voices only |
//!
//! The ONNX parts need the `vits` feature; the text front ends are always built.

#[cfg(feature = "vits")]
pub mod engine;
pub mod lexicon;
pub mod metadata;
#[cfg(feature = "vits")]
pub mod model;
pub mod params;
pub mod phonemizer;
pub mod tokens;

#[cfg(feature = "vits")]
pub use engine::VitsEngine;
pub use metadata::VitsMetadata;

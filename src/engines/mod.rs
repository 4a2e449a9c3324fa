//! Speech synthesis engines.
//!
//! This module contains implementations of text-to-speech engines.
//!
//! # Available Engines
//!
//! Enable engines via Cargo features:
//! - `vits` - VITS voices (ONNX format; lexicon or espeak-ng front end)
//!
//! The text front ends of the VITS engine (token table, lexicon, espeak-ng
//! phonemization, model metadata parsing) do not depend on ONNX Runtime and
//! are always compiled.

pub mod vits;

//! # ChurnWise Core
//!
//! Pure logic for ChurnWise: tokenization, the document term index, BM25
//! retrieval, feature alignment, classifier artifacts, and aggregation over
//! the customer dataset.
//!
//! This crate contains no tokio, axum, or filesystem I/O. Callers load
//! documents, tables, and model JSON themselves and hand the parsed values
//! to the functions here.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | Documents and their persisted record form |
//! | [`tokenize`] | Shared tokenizer for indexing and queries |
//! | [`index`] | Term-frequency index over a fixed corpus |
//! | [`retrieve`] | Top-1 BM25 retrieval |
//! | [`features`] | Lenient feature alignment |
//! | [`classifier`] | Model artifact contract and prediction |
//! | [`table`] | In-memory tabular dataset |
//! | [`aggregate`] | Dashboard statistics |
//! | [`error`] | Typed errors |

pub mod aggregate;
pub mod classifier;
pub mod error;
pub mod features;
pub mod index;
pub mod models;
pub mod retrieve;
pub mod table;
pub mod tokenize;

pub use error::{CoreError, Result};

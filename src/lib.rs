//! # ChurnWise
//!
//! HTTP backend for customer churn insights.
//!
//! ChurnWise loads a customer dataset, a trained churn classifier, and a
//! small chat corpus once at startup, then serves predictions, customer
//! lookups, dashboard statistics, and single best-match BM25 chat answers
//! over a JSON API and a CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌────────────────┐
//! │ customers.csv│   │ model.json   │   │ documents.json │
//! └──────┬───────┘   └──────┬───────┘   └───────┬────────┘
//!        └──────────────────┼───────────────────┘
//!                           ▼
//!                    ┌────────────┐
//!                    │ AppContext │  (built once, shared via Arc)
//!                    └─────┬──────┘
//!                ┌─────────┴─────────┐
//!                ▼                   ▼
//!           ┌─────────┐        ┌──────────┐
//!           │   CLI   │        │   HTTP   │
//!           └─────────┘        └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`data`] | Loading the CSV, corpus, and model files |
//! | [`context`] | Startup-built application context |
//! | [`auth`] | Flat-file credential store |
//! | [`chat`] | Retrieval-backed chat answers |
//! | [`predict`] | Feature alignment and prediction |
//! | [`profile`] | Customer record lookup |
//! | [`dashboard`] | Aggregate statistics |
//! | [`server`] | HTTP server |
//! | [`sources`] | Input load status report |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`error`] | Service error type |

pub mod auth;
pub mod chat;
pub mod config;
pub mod context;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod logging;
pub mod predict;
pub mod profile;
pub mod server;
pub mod sources;

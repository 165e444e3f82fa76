#![deny(missing_docs)]

//! Core library for the CareerLens job-seeker service.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and adapters.
pub mod embedding;
/// AI mock interviews.
pub mod interview;
/// Job-board search, normalization, and salary helpers.
pub mod jobs;
/// Chat-completion client and prompt templates.
pub mod llm;
/// Structured logging and tracing setup.
pub mod logging;
/// Resume-to-job and recruiter-side scoring.
pub mod matching;
/// Model Context Protocol server implementation.
pub mod mcp;
/// Platform counters.
pub mod metrics;
/// Qdrant vector store integration.
pub mod qdrant;
/// Resume text extraction and LLM analysis.
pub mod resume;
/// Orchestration shared by every surface.
pub mod service;
/// SQLite persistence for profiles, postings, matches, and interviews.
pub mod store;
/// Resume tailoring for matched jobs.
pub mod tailoring;
/// Token accounting and vendor rate limiting.
pub mod usage;

pub(crate) mod text;

//! Model Context Protocol (MCP) integration for CareerLens.
//!
//! This module wires the career service into an MCP server so agent hosts can analyse resumes,
//! match jobs, run mock interviews, and tailor resumes over stdio. The surface area consists of:
//!
//! - Tools: `analyze-resume`, `match-jobs`, `list-matches`, `start-interview`,
//!   `answer-interview`, `tailor-resume`, and `usage`.
//! - Resources: `mcp://health` and `mcp://search-modes`.
//!
//! Handlers, schemas, and formatting helpers are kept in focused submodules to make tests and
//! reviews small and targeted.

mod format;
pub mod handlers;
mod registry;
mod schemas;
mod server;

pub use server::CareerLensMcpServer;

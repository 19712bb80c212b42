//! MCP (Model Context Protocol) server module.
//!
//! Exposes the endpoint outline to AI agents and editors as JSON-RPC 2.0
//! tools over STDIO.

pub mod server;
pub mod tools;
pub mod types;

pub mod error;
pub mod mcp_api;
pub mod redis;
pub mod web_search;

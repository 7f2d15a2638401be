pub mod markdown;
pub mod mcp;

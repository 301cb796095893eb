pub mod config;
pub mod error;
pub mod llm;
pub mod prompt;
pub mod quota;
pub mod server;
pub mod store;
pub mod transform;
pub mod validate;

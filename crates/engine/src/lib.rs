//! Async deck building over embedding, vector search and text generation
//! services.

pub mod agent;
pub mod config;
pub mod error;
pub mod http;
pub mod identity;
pub mod local;
pub mod pipeline;
pub mod prompts;
pub mod retrieval;
pub mod services;
pub mod synergy;

pub use config::*;
pub use error::*;
pub use http::*;
pub use identity::*;
pub use local::*;
pub use pipeline::*;
pub use retrieval::*;
pub use services::*;
pub use synergy::*;

//! Wisdom extraction for the Mindforest garden.
//!
//! Renders a reflection conversation into a prompt, sends it to an LLM
//! backend, and parses the JSON reply into an
//! [`ExtractedWisdom`](mindforest_types::ExtractedWisdom). Replies with
//! missing fields are repaired with fixed defaults; transport failures,
//! timeouts and rate limiting surface as [`ExtractError`] and create
//! nothing.
//!
//! - [`config`] -- environment-based backend settings
//! - [`prompt`] -- embedded `minijinja` templates
//! - [`backend`] -- enum-dispatched HTTP backends and the factory
//! - [`parse`] -- tolerant reply parsing with defaults

pub mod backend;
pub mod config;
pub mod error;
pub mod parse;
pub mod prompt;

pub use backend::{Extractor, ExtractorBackend, OpenAiBackend, ProxyBackend, create_extractor};
pub use config::{BackendType, ExtractorConfig};
pub use error::ExtractError;
pub use parse::{DEFAULT_INSIGHT, DEFAULT_SITUATION, DEFAULT_TITLE, parse_wisdom};
pub use prompt::{PromptEngine, RenderedPrompt};

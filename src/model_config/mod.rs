//! Model configuration for TurboPech
//!
//! Available models, the active model, and the generation parameters sent
//! with each chat request.

pub mod parameters;
pub mod store;

pub use parameters::{
    parse_max_tokens, parse_penalty, parse_temperature, parse_top_p, GenerationParameters,
    ParameterUpdate, Tone, MAX_TOKENS_PRESETS, TEMPERATURE_PRESETS,
};
pub use store::{ModelInfoError, ModelStore};

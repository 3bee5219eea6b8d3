//! Generation parameters and response tones
//!
//! [`GenerationParameters`] is plain data: the store merges updates into it
//! without checking ranges. Range checks live in the `parse_*` helpers used
//! by the command layer and in config validation.

use crate::error::{Result, TurboPechError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Temperature presets offered by the chat view
pub const TEMPERATURE_PRESETS: [f64; 4] = [0.3, 0.5, 0.7, 0.9];

/// Maximum-length presets offered by the chat view
pub const MAX_TOKENS_PRESETS: [u32; 4] = [500, 1000, 2000, 4000];

/// Named preset that prefixes outgoing user text with an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    /// No prefix
    #[default]
    Default,
    /// Pedagogical answers
    Teacher,
    /// Very simple explanations
    Simple,
    /// Thorough explanations
    Detailed,
}

impl Tone {
    /// Every tone, in menu order
    pub const ALL: [Tone; 4] = [Tone::Default, Tone::Teacher, Tone::Simple, Tone::Detailed];

    /// Parse a tone from its name (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use turbopech::model_config::Tone;
    ///
    /// assert_eq!(Tone::parse_str("Teacher").unwrap(), Tone::Teacher);
    /// assert!(Tone::parse_str("pirate").is_err());
    /// ```
    pub fn parse_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "default" | "standard" => Ok(Self::Default),
            "teacher" => Ok(Self::Teacher),
            "simple" => Ok(Self::Simple),
            "detailed" => Ok(Self::Detailed),
            other => Err(TurboPechError::InvalidInput(format!(
                "Unknown tone: {}. Must be one of: default, teacher, simple, detailed",
                other
            ))
            .into()),
        }
    }

    /// Instruction prepended to the user's message
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Default => "",
            Self::Teacher => "Answer like a patient teacher: ",
            Self::Simple => "Explain very simply, as if to a 10-year-old: ",
            Self::Detailed => "Give a detailed, in-depth explanation: ",
        }
    }

    /// Menu label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Default => "Standard",
            Self::Teacher => "Teacher",
            Self::Simple => "Simplified",
            Self::Detailed => "Detailed",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Teacher => write!(f, "teacher"),
            Self::Simple => write!(f, "simple"),
            Self::Detailed => write!(f, "detailed"),
        }
    }
}

/// Sampling parameters sent with every chat request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParameters {
    /// Creativity, 0..=1
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Upper bound on generated tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Nucleus sampling threshold, 0..=1
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    /// 0..=2
    #[serde(default)]
    pub frequency_penalty: f64,
    /// 0..=2
    #[serde(default)]
    pub presence_penalty: f64,
    /// Prefix preset applied to outgoing user messages
    #[serde(default)]
    pub tone: Tone,
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_top_p() -> f64 {
    0.9
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            tone: Tone::Default,
        }
    }
}

impl GenerationParameters {
    /// Shallow-merge the fields present in `update`
    ///
    /// Values are taken as-is; nothing is clamped or rejected.
    pub fn merge(&mut self, update: ParameterUpdate) {
        if let Some(temperature) = update.temperature {
            self.temperature = temperature;
        }
        if let Some(max_tokens) = update.max_tokens {
            self.max_tokens = max_tokens;
        }
        if let Some(top_p) = update.top_p {
            self.top_p = top_p;
        }
        if let Some(frequency_penalty) = update.frequency_penalty {
            self.frequency_penalty = frequency_penalty;
        }
        if let Some(presence_penalty) = update.presence_penalty {
            self.presence_penalty = presence_penalty;
        }
        if let Some(tone) = update.tone {
            self.tone = tone;
        }
    }

    /// Check every value against the widget ranges
    ///
    /// # Errors
    ///
    /// Returns a description of the first out-of-range value
    pub fn check_ranges(&self) -> std::result::Result<(), String> {
        check_range("temperature", self.temperature, 0.0, 1.0)?;
        check_range("top_p", self.top_p, 0.0, 1.0)?;
        check_range("frequency_penalty", self.frequency_penalty, 0.0, 2.0)?;
        check_range("presence_penalty", self.presence_penalty, 0.0, 2.0)?;
        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn check_range(name: &str, value: f64, min: f64, max: f64) -> std::result::Result<(), String> {
    if !value.is_finite() || value < min || value > max {
        return Err(format!(
            "{} must be between {} and {}, got {}",
            name, min, max, value
        ));
    }
    Ok(())
}

/// Partial parameter set; `None` fields are left untouched by a merge
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterUpdate {
    /// New temperature
    pub temperature: Option<f64>,
    /// New max tokens
    pub max_tokens: Option<u32>,
    /// New top_p
    pub top_p: Option<f64>,
    /// New frequency penalty
    pub frequency_penalty: Option<f64>,
    /// New presence penalty
    pub presence_penalty: Option<f64>,
    /// New tone
    pub tone: Option<Tone>,
}

impl ParameterUpdate {
    /// Update only the temperature
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Update only max tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Update only top_p
    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Update only the frequency penalty
    pub fn with_frequency_penalty(mut self, penalty: f64) -> Self {
        self.frequency_penalty = Some(penalty);
        self
    }

    /// Update only the presence penalty
    pub fn with_presence_penalty(mut self, penalty: f64) -> Self {
        self.presence_penalty = Some(penalty);
        self
    }

    /// Update only the tone
    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = Some(tone);
        self
    }
}

fn parse_bounded(name: &str, input: &str, min: f64, max: f64) -> Result<f64> {
    let value: f64 = input.trim().parse().map_err(|_| {
        TurboPechError::InvalidInput(format!("{} must be a number, got '{}'", name, input))
    })?;
    check_range(name, value, min, max).map_err(TurboPechError::InvalidInput)?;
    Ok(value)
}

/// Parse a temperature (slider range 0..=1)
pub fn parse_temperature(input: &str) -> Result<f64> {
    parse_bounded("temperature", input, 0.0, 1.0)
}

/// Parse a top_p value (slider range 0..=1)
pub fn parse_top_p(input: &str) -> Result<f64> {
    parse_bounded("top_p", input, 0.0, 1.0)
}

/// Parse a frequency or presence penalty (slider range 0..=2)
pub fn parse_penalty(name: &str, input: &str) -> Result<f64> {
    parse_bounded(name, input, 0.0, 2.0)
}

/// Parse a max-tokens value; only the chat presets are accepted
///
/// # Examples
///
/// ```
/// use turbopech::model_config::parse_max_tokens;
///
/// assert_eq!(parse_max_tokens("1000").unwrap(), 1000);
/// assert!(parse_max_tokens("1234").is_err());
/// ```
pub fn parse_max_tokens(input: &str) -> Result<u32> {
    let value: u32 = input.trim().parse().map_err(|_| {
        TurboPechError::InvalidInput(format!("max_tokens must be an integer, got '{}'", input))
    })?;
    if !MAX_TOKENS_PRESETS.contains(&value) {
        return Err(TurboPechError::InvalidInput(format!(
            "max_tokens must be one of {:?}, got {}",
            MAX_TOKENS_PRESETS, value
        ))
        .into());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters() {
        let params = GenerationParameters::default();
        assert_eq!(params.temperature, 0.7);
        assert_eq!(params.max_tokens, 2000);
        assert_eq!(params.top_p, 0.9);
        assert_eq!(params.frequency_penalty, 0.0);
        assert_eq!(params.presence_penalty, 0.0);
        assert_eq!(params.tone, Tone::Default);
    }

    #[test]
    fn test_merge_only_touches_given_fields() {
        let mut params = GenerationParameters::default();
        params.merge(
            ParameterUpdate::default()
                .with_temperature(0.3)
                .with_tone(Tone::Simple),
        );
        assert_eq!(params.temperature, 0.3);
        assert_eq!(params.tone, Tone::Simple);
        assert_eq!(params.max_tokens, 2000);
        assert_eq!(params.top_p, 0.9);
    }

    #[test]
    fn test_merge_accepts_out_of_range_values() {
        let mut params = GenerationParameters::default();
        params.merge(
            ParameterUpdate::default()
                .with_temperature(5.0)
                .with_presence_penalty(-3.0),
        );
        assert_eq!(params.temperature, 5.0);
        assert_eq!(params.presence_penalty, -3.0);
        assert!(params.check_ranges().is_err());
    }

    #[test]
    fn test_tone_prompts() {
        assert_eq!(Tone::Default.prompt(), "");
        assert!(Tone::Teacher.prompt().ends_with(": "));
        assert!(Tone::Simple.prompt().contains("10-year-old"));
        assert!(!Tone::Detailed.prompt().is_empty());
    }

    #[test]
    fn test_tone_round_trips_through_display() {
        for tone in Tone::ALL {
            assert_eq!(Tone::parse_str(&tone.to_string()).unwrap(), tone);
        }
    }

    #[test]
    fn test_tone_serializes_lowercase() {
        let yaml = serde_yaml::to_string(&Tone::Detailed).unwrap();
        assert!(yaml.contains("detailed"));
    }

    #[test]
    fn test_parse_temperature_bounds() {
        assert_eq!(parse_temperature("0.55").unwrap(), 0.55);
        assert!(parse_temperature("1.01").is_err());
        assert!(parse_temperature("-0.1").is_err());
        assert!(parse_temperature("warm").is_err());
        assert!(parse_temperature("NaN").is_err());
    }

    #[test]
    fn test_parse_penalty_bounds() {
        assert_eq!(parse_penalty("frequency_penalty", "2").unwrap(), 2.0);
        assert!(parse_penalty("presence_penalty", "2.5").is_err());
    }

    #[test]
    fn test_parse_max_tokens_presets_only() {
        for preset in MAX_TOKENS_PRESETS {
            assert_eq!(parse_max_tokens(&preset.to_string()).unwrap(), preset);
        }
        assert!(parse_max_tokens("0").is_err());
        assert!(parse_max_tokens("lots").is_err());
    }
}

//! Pricing and context-window limits for chat/embedding models.
//!
//! The table is loaded once with the rest of the configuration and passed
//! by reference to whatever needs it.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tiktoken_rs::CoreBPE;

use crate::error::{Error, Result};

static O200K_BASE: OnceCell<CoreBPE> = OnceCell::new();

/// Prices are USD per million tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub input_per_million: f64,
    pub output_per_million: f64,
    #[serde(default)]
    pub context_window: Option<u64>,
}

impl ModelSpec {
    const fn new(input: f64, output: f64, context_window: Option<u64>) -> Self {
        Self { input_per_million: input, output_per_million: output, context_window }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelTable {
    models: BTreeMap<String, ModelSpec>,
}

impl ModelTable {
    pub fn new(models: BTreeMap<String, ModelSpec>) -> Self {
        Self { models }
    }

    pub fn get(&self, model: &str) -> Result<&ModelSpec> {
        self.models.get(model).ok_or_else(|| Error::UnknownModel(model.to_string()))
    }

    /// Dollar cost of one call.
    pub fn estimate_cost(&self, model: &str, input_tokens: u64, output_tokens: u64) -> Result<f64> {
        let spec = self.get(model)?;
        let input = input_tokens as f64 / 1_000_000.0 * spec.input_per_million;
        let output = output_tokens as f64 / 1_000_000.0 * spec.output_per_million;
        Ok(input + output)
    }

    /// Price a whole conversation: system, developer and user turns count
    /// as input, assistant turns as output.
    pub fn conversation_cost(&self, model: &str, messages: &[Message]) -> Result<f64> {
        let mut input = String::new();
        let mut output = String::new();
        for message in messages {
            let side = if message.role.is_input() { &mut input } else { &mut output };
            side.push(' ');
            side.push_str(&message.content);
        }
        self.estimate_cost(model, count_tokens(&input)?, count_tokens(&output)?)
    }

    /// `true` when `tokens` fits the model's context window.
    pub fn check_token_limit(&self, model: &str, tokens: u64) -> Result<bool> {
        Ok(tokens <= self.context_window(model)?)
    }

    pub fn ensure_within_limit(&self, model: &str, tokens: u64) -> Result<()> {
        let limit = self.context_window(model)?;
        if tokens > limit {
            return Err(Error::TokenLimitExceeded { model: model.to_string(), tokens, limit });
        }
        Ok(())
    }

    fn context_window(&self, model: &str) -> Result<u64> {
        self.get(model)?
            .context_window
            .ok_or_else(|| Error::UnknownModel(format!("{model} (no context window configured)")))
    }
}

impl Default for ModelTable {
    fn default() -> Self {
        let entries = [
            ("gpt-5.1", ModelSpec::new(1.25, 10.00, Some(400_000))),
            ("gpt-5", ModelSpec::new(1.25, 10.00, Some(400_000))),
            ("gpt-5-chat", ModelSpec::new(1.25, 10.00, None)),
            ("gpt-5.1-codex", ModelSpec::new(1.25, 10.00, None)),
            ("gpt-5-codex", ModelSpec::new(1.25, 10.00, None)),
            ("gpt-5-mini", ModelSpec::new(0.25, 2.00, Some(400_000))),
            ("gpt-5-nano", ModelSpec::new(0.05, 0.40, Some(400_000))),
            ("gpt-5-pro", ModelSpec::new(15.00, 120.00, Some(400_000))),
            ("gpt-4.1", ModelSpec::new(2.00, 8.00, Some(1_000_000))),
            ("gpt-4.1-mini", ModelSpec::new(0.40, 1.60, Some(1_000_000))),
            ("gpt-4.1-nano", ModelSpec::new(0.10, 0.40, Some(1_000_000))),
            ("gpt-4o", ModelSpec::new(2.50, 10.00, Some(128_000))),
            ("gpt-4o-mini", ModelSpec::new(0.15, 0.60, Some(128_000))),
        ];
        Self::new(entries.into_iter().map(|(name, spec)| (name.to_string(), spec)).collect())
    }
}

/// Exact token count under the `o200k_base` encoding used by the GPT-4o
/// and GPT-5 families.
pub fn count_tokens(text: &str) -> Result<u64> {
    let bpe = O200K_BASE.get_or_try_init(|| {
        tiktoken_rs::o200k_base().map_err(|e| Error::Operation(format!("loading o200k_base encoding: {e}")))
    })?;
    Ok(bpe.encode_ordinary(text).len() as u64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Developer,
    User,
    Assistant,
}

impl Role {
    fn is_input(self) -> bool {
        !matches!(self, Role::Assistant)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_combines_input_and_output() {
        let table = ModelTable::default();
        let cost = table.estimate_cost("gpt-4o-mini", 1_000_000, 500_000).unwrap();
        assert!((cost - 0.45).abs() < 1e-9, "got {cost}");
    }

    #[test]
    fn unknown_model_is_rejected() {
        let table = ModelTable::default();
        assert!(matches!(table.estimate_cost("davinci", 1, 1), Err(Error::UnknownModel(_))));
        assert!(matches!(table.check_token_limit("davinci", 1), Err(Error::UnknownModel(_))));
    }

    #[test]
    fn token_limit_boundaries() {
        let table = ModelTable::default();
        assert!(table.check_token_limit("gpt-4o", 128_000).unwrap());
        assert!(!table.check_token_limit("gpt-4o", 128_001).unwrap());
        match table.ensure_within_limit("gpt-4o", 200_000) {
            Err(Error::TokenLimitExceeded { limit, tokens, .. }) => {
                assert_eq!(limit, 128_000);
                assert_eq!(tokens, 200_000);
            }
            other => panic!("expected limit error, got {other:?}"),
        }
    }

    #[test]
    fn models_without_window_cannot_be_checked() {
        let table = ModelTable::default();
        assert!(table.estimate_cost("gpt-5-codex", 10, 10).is_ok());
        assert!(table.check_token_limit("gpt-5-codex", 10).is_err());
    }

    #[test]
    fn tokens_are_counted_with_o200k_base() {
        assert_eq!(count_tokens("").unwrap(), 0);
        assert_eq!(count_tokens("hello world").unwrap(), 2);
        assert_eq!(count_tokens("hello world hello world").unwrap(), 4);
        // special-token markup is plain text here
        assert!(count_tokens("<|endoftext|>").unwrap() > 1);
    }

    #[test]
    fn conversation_cost_splits_by_role() {
        let table = ModelTable::default();
        let messages = vec![
            Message::new(Role::System, "hello world"),
            Message::new(Role::User, "hello world"),
            Message::new(Role::Assistant, "hello world hello world"),
        ];
        let cost = table.conversation_cost("gpt-4.1-nano", &messages).unwrap();
        let input = count_tokens(" hello world hello world").unwrap();
        let output = count_tokens(" hello world hello world").unwrap();
        assert_eq!(input, 4);
        let expected = table.estimate_cost("gpt-4.1-nano", input, output).unwrap();
        assert!((cost - expected).abs() < 1e-12, "got {cost}, expected {expected}");

        assert_eq!(table.conversation_cost("gpt-4o", &[]).unwrap(), 0.0);
        assert!(matches!(table.conversation_cost("davinci", &messages), Err(Error::UnknownModel(_))));
    }

    #[test]
    fn roles_deserialize_from_chat_json() {
        let message: Message = serde_json::from_str(r#"{"role":"developer","content":"be terse"}"#).unwrap();
        assert_eq!(message, Message::new(Role::Developer, "be terse"));
    }
}

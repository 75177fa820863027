//! Lenient decoding of the classification model's output
//!
//! The fine-tuned model emits Python-literal style lists such as
//! `[{'topic': 'Кредиты', 'sentiment': 'negative'}]`, because its training
//! data was written that way. This shim replaces every single quote with a
//! double quote and parses the result as JSON.
//!
//! Known limitation: the substitution is blind. A literal apostrophe inside a
//! topic string (`'Children's deposit'`) turns into a stray `"` and the
//! attempt fails to decode, which costs one retry. This is accepted; the shim
//! is specific to this model and is not part of the JSON contract.

use serde_json::Value;

/// Decode model output, tolerating single-quoted strings
pub fn decode_lenient(content: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(&content.replace('\'', "\""))
}

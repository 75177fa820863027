//! Chat request construction

use bankrev_common::config::InferenceConfig;
use bankrev_common::Taxonomy;

use super::inference_client::{ChatMessage, ChatRequest};

/// Appended to the user message for Qwen3 models to disable the thinking
/// phase, which would otherwise eat the token budget
pub const NO_THINK_SUFFIX: &str = " /no_think";

pub fn supports_no_think(model: &str) -> bool {
    model.contains("qwen3")
}

/// System prompt listing the allowed topics and the answer format
pub fn build_system_prompt(taxonomy: &Taxonomy) -> String {
    let mut prompt = String::from(
        "Ты анализируешь отзывы клиентов банка. Определи, о каких продуктах и услугах \
         банка идёт речь в отзыве, и тональность отзыва по каждому из них.\n\nТемы:\n",
    );

    for topic in taxonomy.topics() {
        prompt.push_str("- ");
        prompt.push_str(&topic.name);
        if !topic.subtopics.is_empty() {
            prompt.push_str(" (");
            prompt.push_str(&topic.subtopics.join("; "));
            prompt.push(')');
        }
        prompt.push('\n');
    }

    prompt.push_str(
        "\nОтветь только списком объектов вида {'topic': '<тема>', 'sentiment': \
         '<positive|negative|neutral>'}. Если отзыв не относится ни к одной теме, ответь [].",
    );
    prompt
}

/// Fixed part of every classification request
#[derive(Debug, Clone)]
pub struct RequestTemplate {
    model: String,
    system_prompt: String,
    temperature: f32,
    max_tokens: u32,
    no_think: bool,
}

impl RequestTemplate {
    pub fn new(config: &InferenceConfig, system_prompt: String) -> Self {
        Self {
            no_think: supports_no_think(&config.model),
            model: config.model.clone(),
            system_prompt,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    pub fn from_taxonomy(config: &InferenceConfig, taxonomy: &Taxonomy) -> Self {
        Self::new(config, build_system_prompt(taxonomy))
    }

    pub fn build(&self, review_text: &str) -> ChatRequest {
        let user = if self.no_think {
            format!("{review_text}{NO_THINK_SUFFIX}")
        } else {
            review_text.to_string()
        };

        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(self.system_prompt.clone()),
                ChatMessage::user(user),
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

//! Prompt rendering via `minijinja`.
//!
//! The extraction prompt is small and fixed, so its templates are compiled
//! into the binary rather than loaded from disk.

use minijinja::{Environment, context};
use serde::Serialize;

use mindforest_types::{Message, MessageRole};

use crate::error::ExtractError;

const SYSTEM_TEMPLATE: &str = "\
You output only valid JSON with no other commentary. Write in the same \
language the user wrote in.";

const USER_TEMPLATE: &str = "\
Below is a conversation between a stressed user and a mindfulness guide.
Distill it into a piece of wisdom. Reply with strict JSON containing exactly these three string fields:
- title: a short, poetic title of two to six words that names the lesson learned (for example \"Calm Within the Storm\").
- insight: the philosophy or practice drawn from the experience, in two or three sentences.
- summary: one sentence describing the difficult situation that started it.

Conversation:
{% for line in lines %}{{ line.speaker }}: {{ line.text }}
{% endfor %}";

/// The complete rendered prompt ready to send to a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    /// System message constraining the output format.
    pub system: String,
    /// User message carrying the instructions and transcript.
    pub user: String,
}

#[derive(Serialize)]
struct TranscriptLine<'a> {
    speaker: &'static str,
    text: &'a str,
}

const fn speaker(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "User",
        MessageRole::Model => "Guide",
    }
}

/// Holds the compiled extraction templates.
#[derive(Debug)]
pub struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    /// Compile the embedded templates.
    pub fn new() -> Result<Self, ExtractError> {
        let mut env = Environment::new();
        env.add_template("system", SYSTEM_TEMPLATE)
            .map_err(|e| ExtractError::Template(format!("failed to add system template: {e}")))?;
        env.add_template("user", USER_TEMPLATE)
            .map_err(|e| ExtractError::Template(format!("failed to add user template: {e}")))?;
        Ok(Self { env })
    }

    /// Render the prompt for one conversation.
    pub fn render(&self, messages: &[Message]) -> Result<RenderedPrompt, ExtractError> {
        let lines: Vec<TranscriptLine<'_>> = messages
            .iter()
            .map(|m| TranscriptLine {
                speaker: speaker(m.role),
                text: m.text.trim(),
            })
            .collect();

        let system = self.render_one("system", context! {})?;
        let user = self.render_one("user", context! { lines => lines })?;
        Ok(RenderedPrompt { system, user })
    }

    fn render_one(&self, name: &str, ctx: minijinja::Value) -> Result<String, ExtractError> {
        self.env
            .get_template(name)
            .map_err(|e| ExtractError::Template(format!("missing {name} template: {e}")))?
            .render(ctx)
            .map_err(|e| ExtractError::Template(format!("{name} render failed: {e}")))
    }
}

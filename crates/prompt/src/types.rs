//! Prompt types for the grounded answering service.

use serde::{Deserialize, Serialize};

/// Identifier of the prompt used to synthesize grounded answers.
pub const ANSWER_PROMPT_ID: &str = "answer.grounded";

/// A prompt definition, either built in or loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// System instructions sent alongside every rendering of `template`
    pub system: String,

    /// Handlebars template for the first generation attempt.
    /// Variables: `question`, `sources`.
    pub template: String,

    /// Handlebars template for the length retry.
    /// Variables: `prompt` (the rendered first prompt), `minWords`.
    #[serde(rename = "retryTemplate")]
    pub retry_template: String,
}

impl PromptDefinition {
    /// The built-in grounded answer prompt.
    pub fn builtin_answer() -> Self {
        Self {
            id: ANSWER_PROMPT_ID.to_string(),
            title: "Grounded answer with abstention".to_string(),
            api_version: "1.0".to_string(),
            system: [
                "You answer questions using ONLY the provided sources.",
                "Rules:",
                "1) If the sources do not contain the answer, output exactly: ABSTAIN",
                "2) Write a complete answer in 2-4 sentences.",
                "3) Prefer copying key terms exactly as written in sources.",
                "4) Do NOT answer with only a single word or only an acronym.",
            ]
            .join("\n"),
            template: "QUESTION: {{question}}\n\nSOURCES:\n{{sources}}\n\nANSWER:".to_string(),
            retry_template: "{{prompt}}\n\nYour previous answer was too short.\n\
                             Rewrite the answer with at least {{minWords}} words, still using ONLY sources.\n\
                             ANSWER:"
                .to_string(),
        }
    }
}

/// A rendered prompt, ready to send to a generation backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltPrompt {
    pub system: Option<String>,
    pub user: String,

    /// Definition the prompt was rendered from
    pub prompt_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_definition_deserialization() {
        let yaml = r#"
id: answer.grounded
title: Custom grounded prompt
apiVersion: "1.0"
system: "Only use the sources."
template: "Q: {{question}}\n{{sources}}"
retryTemplate: "{{prompt}} (at least {{minWords}} words)"
"#;

        let def: PromptDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.id, "answer.grounded");
        assert_eq!(def.system, "Only use the sources.");
        assert!(def.retry_template.contains("{{minWords}}"));
    }

    #[test]
    fn test_builtin_answer_rules() {
        let def = PromptDefinition::builtin_answer();
        assert_eq!(def.id, ANSWER_PROMPT_ID);
        assert!(def.system.contains("output exactly: ABSTAIN"));
        assert!(def.system.contains("2-4 sentences"));
        assert!(def.system.contains("only an acronym"));
        assert!(def.template.contains("{{question}}"));
        assert!(def.template.contains("{{sources}}"));
    }
}

//! Prompt templating for the three generation endpoints.
//!
//! Each `PromptKind` carries a fixed system context. The user's topic is
//! passed through untouched; only structured assignment briefs are
//! rendered from a template.

use crate::error::PromptError;
use crate::generation::GenerationRequest;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::LazyLock;

const ASSIGNMENT_CONTEXT: &str = "You are an academic writing assistant. \
Write a detailed, well-structured, plagiarism-free assignment for a college student. \
Format the output in Markdown: begin with a single '# ' title line, then use '## ' for \
each section: Introduction (about 300 words), Literature Review (about 500 words), \
Main Body (1800+ words, split into '### ' subsections), Conclusion (about 400 words) \
and References (8-10 entries in APA style). Use '* ' for bullet points. \
Keep the tone formal and academic and support points with real examples.";

const LONG_ANSWER_CONTEXT: &str = "You are an academic expert. \
Write a 300-500 word explanation using clear structure, real examples, and formal language. \
Use '## ' headings to organise the answer and keep it easy to follow for a student.";

const SHORT_ANSWER_CONTEXT: &str =
    "Answer the question in 2-3 sentences using simple, clear, formal language.";

/// The kind of answer being generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromptKind {
    /// A long, sectioned academic assignment.
    Assignment,
    /// A 300-500 word explanation.
    LongAnswer,
    /// A 2-3 sentence answer.
    ShortAnswer,
}

impl PromptKind {
    /// Returns the kebab-case identifier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assignment => "assignment",
            Self::LongAnswer => "long-answer",
            Self::ShortAnswer => "short-answer",
        }
    }

    /// The system context for this kind.
    #[must_use]
    pub fn context(&self) -> &'static str {
        match self {
            Self::Assignment => ASSIGNMENT_CONTEXT,
            Self::LongAnswer => LONG_ANSWER_CONTEXT,
            Self::ShortAnswer => SHORT_ANSWER_CONTEXT,
        }
    }
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds a request for `kind`, passing `topic` through as the prompt.
///
/// # Errors
///
/// Returns `PromptError::EmptyPrompt` for a blank topic.
pub fn build(kind: PromptKind, topic: &str) -> Result<GenerationRequest, PromptError> {
    GenerationRequest::new(topic, kind.context())
}

/// Subject, topic and academic level for a structured assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentBrief {
    /// Academic subject, e.g. "Environmental Science".
    pub subject: String,
    /// The assignment topic.
    pub topic: String,
    /// Student level, e.g. "Undergraduate".
    pub level: String,
}

impl AssignmentBrief {
    /// Subject-specific material the assignment should lean on.
    #[must_use]
    pub fn emphasis(&self) -> Vec<&'static str> {
        let mut emphasis = Vec::new();
        if self.subject.contains("Science") {
            emphasis.push("data/diagrams");
        }
        if self.subject.contains("Arts") {
            emphasis.push("theoretical frameworks");
        }
        if self.subject.contains("Commerce") {
            emphasis.push("market analysis/case studies");
        }
        emphasis
    }
}

/// Renders the structured prompt and professor context for a brief.
///
/// # Errors
///
/// Returns `PromptError::MissingVariable` if subject, topic or level is
/// blank.
pub fn build_brief(brief: &AssignmentBrief) -> Result<GenerationRequest, PromptError> {
    let emphasis = match brief.emphasis().as_slice() {
        [] => String::new(),
        items => format!(", drawing on {}", items.join(", ")),
    };

    let variables = HashMap::from([
        ("subject", brief.subject.trim()),
        ("topic", brief.topic.trim()),
        ("level", brief.level.trim()),
        ("emphasis", emphasis.as_str()),
    ]);

    let prompt = BRIEF_PROMPT.render(&variables)?;
    let context = BRIEF_CONTEXT.render(&variables)?;
    GenerationRequest::new(prompt, context)
}

static BRIEF_PROMPT: LazyLock<PromptTemplate> = LazyLock::new(|| {
    PromptTemplate::new(
        "assignment_brief",
        "Write a plagiarism-free academic assignment on: \"{{topic}}\"\n\
         Subject: {{subject}}\n\
         Level: {{level}}\n\
         \n\
         Structure:\n\
         1. Introduction (300 words)\n\
         2. Literature Review (500 words)\n\
         3. Main Body (1800+ words)\n\
         4. Conclusion (400 words)\n\
         5. References (APA, 8-10 entries)\n\
         \n\
         Use a formal tone and real examples{{emphasis}}.",
    )
    .with_variable("topic", VariableDefinition::required("Assignment topic"))
    .with_variable("subject", VariableDefinition::required("Academic subject"))
    .with_variable("level", VariableDefinition::required("Student level"))
    .with_variable(
        "emphasis",
        VariableDefinition::optional("Subject-specific material").with_default(""),
    )
});

static BRIEF_CONTEXT: LazyLock<PromptTemplate> = LazyLock::new(|| {
    PromptTemplate::new(
        "assignment_brief_context",
        "You are a {{subject}} professor with 15+ years of experience. \
         Generate 2500-3000 words of in-depth, structured content for {{level}} students \
         with 100% academic integrity. Format the output in Markdown: a single '# ' title \
         line, '## ' for each section, '### ' for subsections and '* ' for bullet points.",
    )
    .with_variable("subject", VariableDefinition::required("Academic subject"))
    .with_variable("level", VariableDefinition::required("Student level"))
});

/// Definition of a template variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDefinition {
    /// Description of what this variable is for.
    pub description: String,
    /// Whether this variable must be supplied and non-blank.
    pub required: bool,
    /// Value used when the variable is not supplied.
    pub default: Option<String>,
}

impl VariableDefinition {
    /// Creates a required variable definition.
    #[must_use]
    pub fn required(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            required: true,
            default: None,
        }
    }

    /// Creates an optional variable definition.
    #[must_use]
    pub fn optional(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            required: false,
            default: None,
        }
    }

    /// Sets a default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// A prompt template with `{{variable}}` placeholders.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    name: String,
    content: String,
    variables: BTreeMap<String, VariableDefinition>,
}

impl PromptTemplate {
    /// Creates a new prompt template.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            variables: BTreeMap::new(),
        }
    }

    /// Adds a variable definition.
    #[must_use]
    pub fn with_variable(
        mut self,
        name: impl Into<String>,
        definition: VariableDefinition,
    ) -> Self {
        self.variables.insert(name.into(), definition);
        self
    }

    /// Renders the template.
    ///
    /// Declared variables are validated first. Each `{{name}}` in the
    /// template is then replaced once, left to right, by its supplied value
    /// or its default; inserted values are never expanded again.
    ///
    /// # Errors
    ///
    /// Returns `PromptError::MissingVariable` for the first required
    /// variable (in name order) that is absent or blank.
    pub fn render(&self, variables: &HashMap<&str, &str>) -> Result<String, PromptError> {
        if let Some((name, _)) = self.variables.iter().find(|(name, def)| {
            def.required
                && variables
                    .get(name.as_str())
                    .is_none_or(|value| value.trim().is_empty())
        }) {
            return Err(PromptError::MissingVariable {
                template: self.name.clone(),
                variable: name.clone(),
            });
        }

        let mut result = String::with_capacity(self.content.len());
        let mut rest = self.content.as_str();
        while let Some(open) = rest.find("{{") {
            result.push_str(&rest[..open]);
            let after = &rest[open + 2..];
            let Some(close) = after.find("}}") else {
                rest = &rest[open..];
                break;
            };
            let token = &rest[open..open + close + 4];
            match self.value(&after[..close], variables) {
                Some(value) => result.push_str(value),
                None => result.push_str(token),
            }
            rest = &after[close + 2..];
        }
        result.push_str(rest);

        Ok(result)
    }

    /// The supplied value for `name`, else its declared default.
    fn value<'a>(&'a self, name: &str, variables: &HashMap<&str, &'a str>) -> Option<&'a str> {
        variables
            .get(name)
            .copied()
            .or_else(|| self.variables.get(name)?.default.as_deref())
    }
}

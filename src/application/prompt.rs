use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;

use crate::domain::DomainError;

pub const STANDALONE_QUESTION_TEMPLATE: &str = "Given a question and the conversation history, \
convert the question to a standalone question. You can use the conversation history as \
a resource as well.
question: {{ question }}
conversation history: {{ conversation_history }}
standalone question: ";

pub const ANSWER_TEMPLATE: &str = "You are a friendly and enthusiastic expert who can answer a given \
question about Cloud Native Spring based on the context provided. \
Try to find the answer in the context as it is the primary source of knowledge. \
You could also use the conversation history if you cannot find the answer in the context. \
If you really don't know the answer, say \"I'm sorry, I don't know the answer to that.\" \
Don't try to make up an answer. \
Be friendly and make the response conversational and relatively short.
context: {{ context }}
conversation history: {{ conversation_history }}
question: {{ question }}
answer: ";

const TEMPLATE_NAME: &str = "prompt";

/// A Jinja prompt rendered with minijinja.
///
/// Undefined variables are an error at render time. Substituted values are
/// output as-is and never evaluated as template syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
}

impl PromptTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Parses the template and checks it references exactly `variables`.
    pub fn with_variables(
        source: impl Into<String>,
        variables: &[&str],
    ) -> Result<Self, DomainError> {
        let template = Self::new(source);
        let used = template.variables()?;

        if let Some(missing) = variables
            .iter()
            .find(|name| !used.iter().any(|u| u == *name))
        {
            return Err(DomainError::internal(format!(
                "prompt template does not use {{{{ {missing} }}}}"
            )));
        }

        if let Some(unknown) = used.iter().find(|u| !variables.contains(&u.as_str())) {
            return Err(DomainError::internal(format!(
                "prompt template uses unknown variable {unknown}"
            )));
        }

        Ok(template)
    }

    /// Top-level variables the template reads.
    pub fn variables(&self) -> Result<Vec<String>, DomainError> {
        let env = environment();
        let template = env
            .template_from_named_str(TEMPLATE_NAME, &self.source)
            .map_err(template_error)?;

        let mut names: Vec<String> = template.undeclared_variables(false).into_iter().collect();
        names.sort();
        Ok(names)
    }

    pub fn render<S: Serialize>(&self, ctx: S) -> Result<String, DomainError> {
        let env = environment();
        let template = env
            .template_from_named_str(TEMPLATE_NAME, &self.source)
            .map_err(template_error)?;

        template.render(ctx).map_err(template_error)
    }
}

fn environment<'source>() -> Environment<'source> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_keep_trailing_newline(true);
    env
}

fn template_error(e: minijinja::Error) -> DomainError {
    DomainError::internal(format!("prompt template error: {e}"))
}

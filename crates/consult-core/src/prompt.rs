//! Prompt Templates
//!
//! Static or parametrized text generators offered alongside the tools.
//! Templates hold no state; rendering is a pure function of the arguments.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{ConsultError, Result};
use crate::message::Message;

/// Argument accepted by a prompt template
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PromptArgument {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub required: bool,
}

impl PromptArgument {
    pub fn required(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: false,
        }
    }
}

/// Prompt template descriptor
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PromptDefinition {
    pub name: String,
    pub description: String,
    pub arguments: Vec<PromptArgument>,
}

/// Arguments passed to [`PromptTemplate::render`]
pub type PromptArgs = HashMap<String, String>;

/// Implement to add a prompt template
pub trait PromptTemplate: Send + Sync {
    fn definition(&self) -> PromptDefinition;

    fn render(&self, args: &PromptArgs) -> Result<Vec<Message>>;

    /// Check that every required argument is present and non-empty
    fn validate(&self, args: &PromptArgs) -> Result<()> {
        for arg in self.definition().arguments.iter().filter(|a| a.required) {
            if args.get(&arg.name).is_none_or(String::is_empty) {
                return Err(ConsultError::PromptValidation(format!(
                    "Missing required argument: {}",
                    arg.name
                )));
            }
        }
        Ok(())
    }
}

/// Optional, non-empty argument lookup
pub fn arg<'a>(args: &'a PromptArgs, name: &str) -> Option<&'a str> {
    args.get(name).map(String::as_str).filter(|s| !s.is_empty())
}

/// Registry for prompt templates
#[derive(Default)]
pub struct PromptRegistry {
    prompts: HashMap<String, Arc<dyn PromptTemplate>>,
}

impl PromptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<P: PromptTemplate + 'static>(&mut self, prompt: P) {
        let definition = prompt.definition();
        self.prompts.insert(definition.name, Arc::new(prompt));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn PromptTemplate>> {
        self.prompts.get(name).cloned()
    }

    /// Validate and render a template by name
    pub fn render(&self, name: &str, args: &PromptArgs) -> Result<Vec<Message>> {
        let prompt = self
            .get(name)
            .ok_or_else(|| ConsultError::PromptNotFound(name.to_string()))?;
        prompt.validate(args)?;
        prompt.render(args)
    }

    /// All definitions, sorted by name
    pub fn definitions(&self) -> Vec<PromptDefinition> {
        let mut defs: Vec<_> = self.prompts.values().map(|p| p.definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}

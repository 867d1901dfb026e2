//! Prompt Templates
//!
//! Text generators that guide clients through the consult tools.

use consult_core::{
    prompt::{arg, PromptArgs, PromptArgument, PromptDefinition, PromptTemplate},
    Message, PromptRegistry, Result,
};

const WORKFLOW_GUIDE: &str = r"# Ollama Consultation Workflow Guide

## Recommended Workflow (Fast Results)
1. **List Models**: Use `list_ollama_models` to see available Ollama models
2. **Single Consultation**: Pick one model and use `consult_ollama` for quick results
3. **Save if Helpful**: Use `remember_consult` to store valuable insights

## Alternative Workflow (Better Results, Slower)
1. **List Models**: Use `list_ollama_models` to see available options
2. **Compare Models**: Use `compare_ollama_models` for diverse perspectives (takes ~2x longer)
3. **Save Insights**: Use `remember_consult` to store the best insights

## Tips for Best Results
- **Model Selection**: Try different models for varied perspectives
- **Clear Prompts**: Be specific about what alternative viewpoint you want
- **System Prompts**: Use system_prompt for additional context/instructions
- **Comparison**: Use comparison when you need multiple angles on a topic
- **Memory**: Save consultations that provide unique or valuable insights

## Available Tools
- `list_ollama_models`: Discover available models
- `consult_ollama`: Quick consultation with single model
- `compare_ollama_models`: Compare multiple models (better but slower)
- `remember_consult`: Store valuable consultation results";

const COMPARISON_CHECKLIST: &str = "

Provide a balanced analysis considering:
- Different approaches or viewpoints
- Strengths and limitations of each perspective
- Practical implications or considerations

Structure your response to highlight key differences and similarities.";

/// Registry holding all four templates
pub fn default_prompts() -> PromptRegistry {
    let mut registry = PromptRegistry::new();
    registry.register(ConsultationWorkflow);
    registry.register(ConsultationPrompt);
    registry.register(ComparisonPrompt);
    registry.register(MemoryPrompt);
    registry
}

fn with_context(mut text: String, context: Option<&str>) -> String {
    if let Some(context) = context {
        text.push_str("\n\nContext: ");
        text.push_str(context);
    }
    text
}

/// Static workflow guide
pub struct ConsultationWorkflow;

impl PromptTemplate for ConsultationWorkflow {
    fn definition(&self) -> PromptDefinition {
        PromptDefinition {
            name: "consultation_workflow".into(),
            description: "Guide for the recommended Ollama consultation workflow.".into(),
            arguments: vec![],
        }
    }

    fn render(&self, _args: &PromptArgs) -> Result<Vec<Message>> {
        Ok(vec![Message::user(WORKFLOW_GUIDE)])
    }
}

pub struct ConsultationPrompt;

impl PromptTemplate for ConsultationPrompt {
    fn definition(&self) -> PromptDefinition {
        PromptDefinition {
            name: "consultation_prompt".into(),
            description: "Template for effective Ollama consultations.".into(),
            arguments: vec![
                PromptArgument::required("topic", "The main topic or question to consult about"),
                PromptArgument::optional(
                    "desired_perspective",
                    "What kind of viewpoint to request (e.g., \"critical analysis\", \"practical considerations\")",
                ),
                PromptArgument::optional("context", "Additional context or background information"),
            ],
        }
    }

    fn render(&self, args: &PromptArgs) -> Result<Vec<Message>> {
        let topic = arg(args, "topic").unwrap_or_default();
        let perspective = arg(args, "desired_perspective").unwrap_or("alternative viewpoint");

        let mut text = with_context(
            format!("Please provide a {perspective} on: {topic}"),
            arg(args, "context"),
        );
        text.push_str("\n\nKeep your response concise but insightful (3-4 sentences).");

        Ok(vec![Message::user(text)])
    }
}

pub struct ComparisonPrompt;

impl PromptTemplate for ComparisonPrompt {
    fn definition(&self) -> PromptDefinition {
        PromptDefinition {
            name: "comparison_prompt".into(),
            description: "Template for comparing multiple Ollama models.".into(),
            arguments: vec![
                PromptArgument::required("topic", "The topic to compare across models"),
                PromptArgument::optional(
                    "aspect_to_compare",
                    "What aspect to focus the comparison on",
                ),
                PromptArgument::optional("context", "Additional context for the comparison"),
            ],
        }
    }

    fn render(&self, args: &PromptArgs) -> Result<Vec<Message>> {
        let topic = arg(args, "topic").unwrap_or_default();
        let aspect = arg(args, "aspect_to_compare").unwrap_or("different perspectives");

        let mut text = with_context(
            format!("Compare {aspect} on the topic: {topic}"),
            arg(args, "context"),
        );
        text.push_str(COMPARISON_CHECKLIST);

        Ok(vec![Message::user(text)])
    }
}

pub struct MemoryPrompt;

impl PromptTemplate for MemoryPrompt {
    fn definition(&self) -> PromptDefinition {
        PromptDefinition {
            name: "memory_prompt".into(),
            description: "Template for documenting consultation results in memory.".into(),
            arguments: vec![
                PromptArgument::required("consultation_topic", "What the consultation was about"),
                PromptArgument::required(
                    "key_insights",
                    "The main insights or valuable points from the consultation",
                ),
                PromptArgument::optional("model_used", "Which Ollama model provided the insights"),
            ],
        }
    }

    fn render(&self, args: &PromptArgs) -> Result<Vec<Message>> {
        let topic = arg(args, "consultation_topic").unwrap_or_default();
        let insights = arg(args, "key_insights").unwrap_or_default();
        let model = arg(args, "model_used");

        let mut summary = format!("Consultation on: {topic}\n\nKey Insights:\n{insights}");
        if let Some(model) = model {
            summary.push_str(&format!("\n\nModel Used: {model}"));
        }
        summary.push_str("\n\nStored for future reference and analysis.");

        let text = format!(
            r#"# Memory Storage Guide

## Consultation Summary
{summary}

## Storage Instructions
Use the `remember_consult` tool with these parameters:
- **prompt**: "{topic}"
- **response**: "{insights}"
- **model**: "{model}"
- **key**: Optional descriptive key for easy retrieval

This will save the consultation for future reference and help build a knowledge base of valuable insights."#,
            model = model.unwrap_or("unknown"),
        );

        Ok(vec![Message::user(text)])
    }
}

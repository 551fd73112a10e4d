//! Prompt text and response schema for research generation.
//!
//! The schema constrains the model to the brief/table/code triple so the
//! normalizer receives a predictable shape. Schema types use the Gemini
//! REST `Schema` enum names (`OBJECT`, `ARRAY`, `STRING`).

use serde_json::{Value, json};

/// Build the research prompt for a topic.
pub fn research_prompt(topic: &str) -> String {
    format!(
        "As an expert research scientist, generate a comprehensive analysis of the topic: \"{topic}\".\n\
         Your response must be a JSON object that strictly adheres to the provided schema.\n\
         - The research brief should be a well-structured summary, using markdown for formatting (e.g. ## for headings, * for bullet points).\n\
         - The comparison table must contain at least 3 distinct entries.\n\
         - The notebook code must be a single block of Python code ready to be placed in a Jupyter cell.\n\
         IMPORTANT: Only output the raw JSON object, with no additional text or markdown formatting before or after it."
    )
}

/// The strict response schema sent as `generationConfig.responseSchema`.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "researchBrief": {
                "type": "STRING",
                "description": "A detailed summary and brief on the research topic, formatted with markdown-style headings and paragraphs. Explain the core concepts, importance, and recent advancements."
            },
            "comparisonTable": {
                "type": "ARRAY",
                "description": "A comparison of at least 3-5 different papers or methodologies related to the topic.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "paper": { "type": "STRING", "description": "The title of the research paper or name of the method." },
                        "methodology": { "type": "STRING", "description": "A concise summary of the methodology used." },
                        "dataset": { "type": "STRING", "description": "The dataset(s) used for evaluation." },
                        "keyFinding": { "type": "STRING", "description": "The single most important finding or result of the paper/method." }
                    },
                    "required": ["paper", "methodology", "dataset", "keyFinding"]
                }
            },
            "notebookCode": {
                "type": "STRING",
                "description": "A complete Python code for a Jupyter notebook that provides a baseline experiment for the research topic. It should be fully functional, including necessary imports (e.g., tensorflow or torch), a sample model architecture, placeholder data loading functions, and a basic training and evaluation loop. The code should be well-commented."
            }
        },
        "required": ["researchBrief", "comparisonTable", "notebookCode"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_topic() {
        let prompt = research_prompt("Graph Neural Networks for drug discovery");
        assert!(prompt.contains("\"Graph Neural Networks for drug discovery\""));
        assert!(prompt.contains("raw JSON object"));
    }

    #[test]
    fn test_schema_requires_the_triple() {
        let schema = response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(required, ["researchBrief", "comparisonTable", "notebookCode"]);
        assert_eq!(schema["properties"]["comparisonTable"]["type"], "ARRAY");
    }
}

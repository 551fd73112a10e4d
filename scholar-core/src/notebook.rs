//! Jupyter notebook (`.ipynb`) serialization.
//!
//! Builds a three-cell baseline notebook around a block of generated Python
//! code: a markdown introduction, the code itself, and a markdown
//! next-steps checklist. Targets nbformat 4.5 with a Python 3 kernelspec
//! so the file opens unmodified in Jupyter and Colab.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A minimal nbformat 4 document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    pub cells: Vec<Cell>,
    pub metadata: NotebookMetadata,
    pub nbformat: u32,
    pub nbformat_minor: u32,
}

/// One notebook cell. Serialized internally tagged on `cell_type`, so the
/// on-disk shape matches what Jupyter itself writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
pub enum Cell {
    Markdown {
        metadata: Map<String, Value>,
        source: Vec<String>,
    },
    Code {
        execution_count: Option<u32>,
        metadata: Map<String, Value>,
        outputs: Vec<Value>,
        source: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotebookMetadata {
    pub kernelspec: KernelSpec,
    pub language_info: LanguageInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelSpec {
    pub display_name: String,
    pub language: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub name: String,
    pub version: String,
}

const INTRO_SOURCE: [&str; 3] = [
    "# Auto-Generated Research Baseline Notebook\n\n",
    "This notebook provides a starting point for experimentation based on the research topic. ",
    "It includes a basic model architecture and placeholder functions for the training pipeline.",
];

const NEXT_STEPS_SOURCE: [&str; 5] = [
    "## Next Steps\n\n",
    "1.  **Load Data:** Implement the `load_dataset` function to load your specific dataset.\n",
    "2.  **Customize Model:** Adjust the model architecture in the provided class to better suit your needs.\n",
    "3.  **Train Model:** Run the training loop and monitor the performance.\n",
    "4.  **Evaluate:** Use the evaluation function to test your model's performance on a test set.",
];

impl Notebook {
    /// Build the baseline notebook around a block of Python code.
    ///
    /// The code is split into newline-inclusive source lines, so joining
    /// the source list reproduces the input byte for byte. An empty input
    /// yields an empty source list.
    pub fn baseline(python_code: &str) -> Self {
        let code_source = python_code
            .split_inclusive('\n')
            .map(str::to_string)
            .collect();

        Notebook {
            cells: vec![
                Cell::Markdown {
                    metadata: Map::new(),
                    source: INTRO_SOURCE.iter().map(|s| s.to_string()).collect(),
                },
                Cell::Code {
                    execution_count: None,
                    metadata: Map::new(),
                    outputs: Vec::new(),
                    source: code_source,
                },
                Cell::Markdown {
                    metadata: Map::new(),
                    source: NEXT_STEPS_SOURCE.iter().map(|s| s.to_string()).collect(),
                },
            ],
            metadata: NotebookMetadata {
                kernelspec: KernelSpec {
                    display_name: "Python 3".to_string(),
                    language: "python".to_string(),
                    name: "python3".to_string(),
                },
                language_info: LanguageInfo {
                    name: "python".to_string(),
                    version: "3.9.12".to_string(),
                },
            },
            nbformat: 4,
            nbformat_minor: 5,
        }
    }

    /// Serialize to pretty-printed JSON bytes, ready to write to disk.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    /// The code cell's source joined back into a single string, when the
    /// notebook has one.
    pub fn code(&self) -> Option<String> {
        self.cells.iter().find_map(|cell| match cell {
            Cell::Code { source, .. } => Some(source.concat()),
            Cell::Markdown { .. } => None,
        })
    }
}

/// Derive a download filename from a research topic: lowercased, with
/// every non-alphanumeric run of characters mapped to underscores, and
/// truncated to 50 characters before the `_baseline.ipynb` suffix.
pub fn notebook_filename(topic: &str) -> String {
    let stem: String = topic
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .take(50)
        .collect();
    format!("{stem}_baseline.ipynb")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_baseline_has_three_cells() {
        let nb = Notebook::baseline("import torch\n");
        assert_eq!(nb.cells.len(), 3);
        assert!(matches!(nb.cells[0], Cell::Markdown { .. }));
        assert!(matches!(nb.cells[1], Cell::Code { .. }));
        assert!(matches!(nb.cells[2], Cell::Markdown { .. }));
        assert_eq!(nb.nbformat, 4);
        assert_eq!(nb.nbformat_minor, 5);
    }

    #[test]
    fn test_code_round_trips_exactly() {
        let code = "import torch\nimport numpy as np\n\nprint('hi')";
        let nb = Notebook::baseline(code);
        assert_eq!(nb.code().unwrap(), code);
    }

    #[test]
    fn test_trailing_newline_preserved() {
        let code = "x = 1\n";
        let nb = Notebook::baseline(code);
        assert_eq!(nb.code().unwrap(), code);
    }

    #[test]
    fn test_empty_code_yields_empty_source() {
        let nb = Notebook::baseline("");
        match &nb.cells[1] {
            Cell::Code { source, .. } => assert!(source.is_empty()),
            other => panic!("Expected a code cell, got {:?}", other),
        }
    }

    #[test]
    fn test_source_lines_keep_newlines() {
        let nb = Notebook::baseline("a = 1\nb = 2");
        match &nb.cells[1] {
            Cell::Code { source, .. } => {
                assert_eq!(source, &["a = 1\n", "b = 2"]);
            }
            other => panic!("Expected a code cell, got {:?}", other),
        }
    }

    #[test]
    fn test_serialized_shape_matches_nbformat() {
        let nb = Notebook::baseline("pass");
        let json: serde_json::Value =
            serde_json::from_slice(&nb.to_bytes().unwrap()).unwrap();

        assert_eq!(json["cells"][0]["cell_type"], "markdown");
        assert_eq!(json["cells"][1]["cell_type"], "code");
        assert_eq!(json["cells"][1]["execution_count"], serde_json::Value::Null);
        assert_eq!(json["cells"][1]["outputs"], serde_json::json!([]));
        assert_eq!(json["metadata"]["kernelspec"]["display_name"], "Python 3");
        assert_eq!(json["metadata"]["kernelspec"]["name"], "python3");
        assert_eq!(json["metadata"]["language_info"]["version"], "3.9.12");
    }

    #[test]
    fn test_deserializes_back() {
        let nb = Notebook::baseline("x = 1\n");
        let bytes = nb.to_bytes().unwrap();
        let back: Notebook = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, nb);
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let a = Notebook::baseline("x = 1\n").to_bytes().unwrap();
        let b = Notebook::baseline("x = 1\n").to_bytes().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_filename_sanitizes_topic() {
        assert_eq!(
            notebook_filename("Graph Neural Networks"),
            "graph_neural_networks_baseline.ipynb"
        );
        assert_eq!(notebook_filename("RLHF: a survey!"), "rlhf__a_survey__baseline.ipynb");
    }

    #[test]
    fn test_filename_truncates_long_topics() {
        let topic = "a".repeat(80);
        let name = notebook_filename(&topic);
        assert_eq!(name, format!("{}_baseline.ipynb", "a".repeat(50)));
    }
}

//! Response normalization — reshapes loosely-structured AI output into the
//! canonical `ResearchResult`.
//!
//! The upstream schema has drifted across prompt versions: flat per-paper
//! records, aspect/value pair lists, and rows already keyed by `aspect`.
//! Each historical shape gets its own adapter; all of them produce
//! rectangular rows (identical key sets), filling absent cells with `"N/A"`.
//!
//! Models also occasionally wrap their JSON in commentary or a fenced code
//! block despite instructions, so structural parsing is preceded by a
//! pattern search for the first well-formed JSON object.

use crate::error::NormalizeError;
use crate::types::{ComparisonRow, NA, ResearchResult};
use serde_json::Value;

/// Normalize a raw provider payload into a canonical `ResearchResult`.
pub fn normalize(raw: &str) -> Result<ResearchResult, NormalizeError> {
    let value = extract_json(raw)?;
    normalize_value(&value)
}

/// Extract the first well-formed JSON object from raw model output.
///
/// Tries, in order: the content of any fenced code block, the first
/// balanced `{...}` span, and finally the greedy first-`{`-to-last-`}`
/// slice. Fails with `Malformed` when none parses to an object.
pub fn extract_json(raw: &str) -> Result<Value, NormalizeError> {
    for block in fenced_blocks(raw) {
        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(block.trim()) {
            return Ok(value);
        }
    }

    if let Some(span) = balanced_object_span(raw)
        && let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(span)
    {
        return Ok(value);
    }

    if let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}'))
        && start < end
        && let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(&raw[start..=end])
    {
        return Ok(value);
    }

    Err(NormalizeError::Malformed {
        detail: "no parseable JSON object in response".to_string(),
    })
}

/// Normalize an already-parsed JSON value.
pub fn normalize_value(value: &Value) -> Result<ResearchResult, NormalizeError> {
    let research_brief = require_string(value, "researchBrief")?;
    let notebook_code = require_string(value, "notebookCode")?;
    let (paper_keys, comparison_table) = normalize_table(value)?;

    Ok(ResearchResult {
        research_brief,
        comparison_table,
        paper_keys,
        notebook_code,
    })
}

/// The contents of every ```-fenced block, in document order.
/// The info string on the fence line (e.g. `json`) is skipped.
fn fenced_blocks(raw: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = raw;
    while let Some(open) = rest.find("```") {
        let after_open = &rest[open + 3..];
        let content_start = after_open
            .find('\n')
            .map(|i| i + 1)
            .unwrap_or(after_open.len());
        let content = &after_open[content_start..];
        match content.find("```") {
            Some(close) => {
                blocks.push(&content[..close]);
                rest = &content[close + 3..];
            }
            None => break,
        }
    }
    blocks
}

/// Slice from the first `{` to its matching `}`, tracking brace depth and
/// skipping string literals (a brief may well contain braces).
fn balanced_object_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in raw.as_bytes().iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

fn require_string(value: &Value, field: &str) -> Result<String, NormalizeError> {
    match value.get(field) {
        None | Some(Value::Null) => Err(NormalizeError::MissingField {
            field: field.to_string(),
        }),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(NormalizeError::NotAString {
            field: field.to_string(),
        }),
    }
}

/// Render a cell value as display text. Upstream cells should be strings;
/// scalar drift (numbers, booleans) is stringified rather than rejected.
fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn string_array(value: Option<&Value>) -> Option<Vec<String>> {
    let items = value?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
    )
}

/// Detect the upstream table shape and dispatch to its adapter.
fn normalize_table(
    value: &Value,
) -> Result<(Vec<String>, Vec<ComparisonRow>), NormalizeError> {
    let declared_keys = string_array(value.get("paperKeys"));

    if let Some(papers) = value.get("papers").and_then(Value::as_array) {
        return Ok(from_paper_records(papers, declared_keys));
    }

    let table = value
        .get("comparisonTable")
        .ok_or_else(|| NormalizeError::MissingField {
            field: "comparisonTable".to_string(),
        })?;
    let rows = table
        .as_array()
        .ok_or_else(|| NormalizeError::UnknownTableShape {
            message: "'comparisonTable' is not an array".to_string(),
        })?;

    if rows.is_empty() {
        return Ok((declared_keys.unwrap_or_default(), Vec::new()));
    }

    if rows.iter().any(|r| r.get("aspect").is_some()) {
        Ok(from_aspect_rows(rows, declared_keys))
    } else if rows
        .iter()
        .all(|r| r.get("paper").is_some_and(Value::is_string))
    {
        Ok(from_flat_rows(rows))
    } else {
        Err(NormalizeError::UnknownTableShape {
            message: "rows carry neither an 'aspect' nor a 'paper' key".to_string(),
        })
    }
}

/// Adapter: rows already keyed by `aspect` (the canonical shape, possibly
/// ragged). Derives column order from `paperKeys` when declared, otherwise
/// from first occurrence across rows, then rectangularizes.
fn from_aspect_rows(
    rows: &[Value],
    declared_keys: Option<Vec<String>>,
) -> (Vec<String>, Vec<ComparisonRow>) {
    let mut keys = declared_keys.unwrap_or_default();
    for row in rows {
        if let Some(obj) = row.as_object() {
            for key in obj.keys() {
                if key != "aspect" && !keys.iter().any(|k| k == key) {
                    keys.push(key.clone());
                }
            }
        }
    }

    let mut out = Vec::with_capacity(rows.len());
    for raw_row in rows {
        let Some(obj) = raw_row.as_object() else {
            continue;
        };
        let aspect = obj
            .get("aspect")
            .map(cell_text)
            .unwrap_or_else(|| NA.to_string());
        let mut row = ComparisonRow::new(aspect);
        for key in &keys {
            let cell = obj
                .get(key)
                .map(cell_text)
                .unwrap_or_else(|| NA.to_string());
            row.set(key.clone(), cell);
        }
        out.push(row);
    }
    (keys, out)
}

/// Adapter: the flat Gemini schema, one record per paper with fixed
/// semantic fields. Pivoted so papers become columns and the remaining
/// fields become aspect rows, with headers humanized (`keyFinding` ->
/// `Key Finding`).
fn from_flat_rows(rows: &[Value]) -> (Vec<String>, Vec<ComparisonRow>) {
    let mut keys: Vec<String> = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut records: Vec<(String, &serde_json::Map<String, Value>)> = Vec::new();

    for row in rows {
        let Some(obj) = row.as_object() else {
            continue;
        };
        let Some(paper) = obj.get("paper").and_then(Value::as_str) else {
            continue;
        };
        if !keys.iter().any(|k| k == paper) {
            keys.push(paper.to_string());
        }
        records.push((paper.to_string(), obj));
        for key in obj.keys() {
            if key != "paper" && !fields.iter().any(|f| f == key) {
                fields.push(key.clone());
            }
        }
    }

    let mut out = Vec::with_capacity(fields.len());
    for field in &fields {
        let mut row = ComparisonRow::new(format_header(field));
        for key in &keys {
            let cell = records
                .iter()
                .find(|(paper, _)| paper == key)
                .and_then(|(_, obj)| obj.get(field))
                .map(cell_text)
                .unwrap_or_else(|| NA.to_string());
            row.set(key.clone(), cell);
        }
        out.push(row);
    }
    (keys, out)
}

/// Adapter: paper records carrying arbitrary `{aspect, value}` pair lists.
/// Row order is the first-occurrence order of aspect names across papers;
/// a paper with zero entries still contributes an all-`"N/A"` column.
fn from_paper_records(
    papers: &[Value],
    declared_keys: Option<Vec<String>>,
) -> (Vec<String>, Vec<ComparisonRow>) {
    let mut keys = declared_keys.unwrap_or_default();
    let mut records: Vec<(String, Vec<&Value>)> = Vec::new();

    for paper in papers {
        let Some(obj) = paper.as_object() else {
            continue;
        };
        let Some(key) = ["key", "name", "paper"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(Value::as_str))
        else {
            continue;
        };
        if !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
        }
        let entries = obj
            .get("comparisons")
            .or_else(|| obj.get("aspects"))
            .and_then(Value::as_array)
            .map(|a| a.iter().collect())
            .unwrap_or_default();
        records.push((key.to_string(), entries));
    }

    let mut aspects: Vec<String> = Vec::new();
    for (_, entries) in &records {
        for entry in entries {
            if let Some(aspect) = entry.get("aspect").and_then(Value::as_str)
                && !aspects.iter().any(|a| a == aspect)
            {
                aspects.push(aspect.to_string());
            }
        }
    }

    let mut out = Vec::with_capacity(aspects.len());
    for aspect in &aspects {
        let mut row = ComparisonRow::new(aspect.clone());
        for key in &keys {
            let cell = records
                .iter()
                .find(|(k, _)| k == key)
                .and_then(|(_, entries)| {
                    entries.iter().find(|e| {
                        e.get("aspect").and_then(Value::as_str) == Some(aspect.as_str())
                    })
                })
                .and_then(|e| e.get("value"))
                .map(cell_text)
                .unwrap_or_else(|| NA.to_string());
            row.set(key.clone(), cell);
        }
        out.push(row);
    }
    (keys, out)
}

/// Humanize a camelCase field name for display (`keyFinding` -> `Key Finding`),
/// matching how historical frontends rendered flat-schema headers.
fn format_header(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, ch) in key.chars().enumerate() {
        if i == 0 {
            out.extend(ch.to_uppercase());
        } else {
            if ch.is_uppercase() {
                out.push(' ');
            }
            out.push(ch);
        }
    }
    out
}

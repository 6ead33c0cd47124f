//! Best-effort repair of structured oracle output.
//!
//! Models wrap JSON in code fences, preface it with prose, or leave
//! trailing commas. Repair is applied in stages, parsing after each one;
//! a payload that survives none of them yields `None` and the caller
//! falls back to an empty extraction.

/// Attempts to parse `raw` as a JSON object, repairing common model
/// formatting mistakes along the way.
pub fn parse_object(raw: &str) -> Option<serde_json::Value> {
    let candidate = strip_fences(raw);

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(candidate) {
        if value.is_object() {
            return Some(value);
        }
    }

    // Slice from the first '{' to the last '}' to drop prose wrappers.
    let sliced = slice_outermost_object(candidate)?;
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(sliced) {
        if value.is_object() {
            return Some(value);
        }
    }

    let trimmed = trim_trailing_commas(sliced);
    match serde_json::from_str::<serde_json::Value>(&trimmed) {
        Ok(value) if value.is_object() => Some(value),
        _ => None,
    }
}

/// Strips a leading ```` ```json ```` (or bare ```` ``` ````) fence and a
/// trailing fence.
fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    for prefix in ["```json", "```JSON", "```"] {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = rest;
            break;
        }
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

fn slice_outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Removes commas immediately preceding a closing brace or bracket.
/// Quote-aware so commas inside string values survive.
fn trim_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for ch in text.chars() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            '}' | ']' => {
                while out.ends_with(|c: char| c.is_whitespace()) {
                    out.pop();
                }
                if out.ends_with(',') {
                    out.pop();
                }
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clean_json() {
        let value = parse_object(r#"{"budget": {"raw_answer": "500"}}"#).unwrap();
        assert!(value.get("budget").is_some());
    }

    #[test]
    fn strips_json_code_fence() {
        let raw = "```json\n{\"budget\": {\"confidence\": 0.75}}\n```";
        let value = parse_object(raw).unwrap();
        assert_eq!(
            value.pointer("/budget/confidence").and_then(|v| v.as_f64()),
            Some(0.75)
        );
    }

    #[test]
    fn slices_object_out_of_prose() {
        let raw = "Here is the extracted data:\n{\"goal\": {\"raw_answer\": \"growth\"}}\nHope that helps!";
        let value = parse_object(raw).unwrap();
        assert!(value.get("goal").is_some());
    }

    #[test]
    fn trims_trailing_commas() {
        let raw = r#"{"a": {"raw_answer": "x",}, "b": [1, 2,],}"#;
        let value = parse_object(raw).unwrap();
        assert_eq!(value.pointer("/b/1").and_then(|v| v.as_i64()), Some(2));
    }

    #[test]
    fn preserves_commas_and_braces_inside_strings() {
        let raw = r#"{"note": {"raw_answer": "spends $1,000, sometimes {more},"}}"#;
        let value = parse_object(raw).unwrap();
        assert_eq!(
            value.pointer("/note/raw_answer").and_then(|v| v.as_str()),
            Some("spends $1,000, sometimes {more},")
        );
    }

    #[test]
    fn hopeless_input_yields_none() {
        assert!(parse_object("no json here at all").is_none());
        assert!(parse_object("").is_none());
        assert!(parse_object("[1, 2, 3]").is_none());
    }
}

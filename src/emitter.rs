//! Phase 3: Serializer
//!
//! Renders a value tree back to YAML. Output is block style with sorted
//! mapping keys (so equal trees serialize identically), with optional flow
//! compaction for small all-scalar collections. Quoting decisions lean on
//! the schema resolver: any string the resolver would read back as
//! something else gets double quotes.

use crate::schema;
use crate::value::{Mapping, Value};

/// Serialization options.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Spaces per nesting level for mapping children.
    pub indent_size: usize,
    /// Render short all-scalar sequences as `[a, b]`.
    pub compact_sequences: bool,
    /// Render small all-scalar mappings as `{a: 1}`.
    pub compact_mappings: bool,
    /// Maximum rendered width for a compacted collection.
    pub flow_threshold: usize,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            indent_size: 2,
            compact_sequences: false,
            compact_mappings: false,
            flow_threshold: 60,
        }
    }
}

/// Serialize with default options. The result ends with exactly one LF.
pub fn emit(value: &Value) -> String {
    emit_with(value, &EmitOptions::default())
}

/// Serialize with explicit options. The result ends with exactly one LF.
pub fn emit_with(value: &Value, options: &EmitOptions) -> String {
    let mut out = render_node(value, 0, options);
    out.push('\n');
    out
}

/// Render a value in block layout at the given column. The first line is
/// not padded (the caller is mid-line or at the margin); continuation lines
/// are padded to `col`.
fn render_node(value: &Value, col: usize, options: &EmitOptions) -> String {
    if let Some(inline) = render_inline(value, options) {
        return inline;
    }
    match value {
        Value::Sequence(seq) => render_block_sequence(seq, col, options),
        Value::Mapping(map) => render_block_mapping(map, col, options),
        // Scalars always render inline.
        _ => scalar_text(value, false),
    }
}

fn render_block_sequence(seq: &[Value], col: usize, options: &EmitOptions) -> String {
    let pad = " ".repeat(col);
    let lines: Vec<String> = seq
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let prefix = if i == 0 { "" } else { pad.as_str() };
            // Continuation lines of the item align under its content, two
            // columns past the dash.
            format!("{}- {}", prefix, render_node(item, col + 2, options))
        })
        .collect();
    lines.join("\n")
}

fn render_block_mapping(map: &Mapping, col: usize, options: &EmitOptions) -> String {
    let pad = " ".repeat(col);
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let lines: Vec<String> = entries
        .iter()
        .enumerate()
        .map(|(i, (key, value))| {
            let prefix = if i == 0 { "" } else { pad.as_str() };
            let key_text = string_text(key, false);
            match render_inline(value, options) {
                Some(inline) => format!("{}{}: {}", prefix, key_text, inline),
                None => {
                    let child_col = col + options.indent_size;
                    format!(
                        "{}{}:\n{}{}",
                        prefix,
                        key_text,
                        " ".repeat(child_col),
                        render_node(value, child_col, options)
                    )
                }
            }
        })
        .collect();
    lines.join("\n")
}

/// Render a value on a single line if its shape allows: scalars always,
/// empty collections as `[]`/`{}`, and small all-scalar collections when
/// the matching compaction option is on and the result fits the threshold.
fn render_inline(value: &Value, options: &EmitOptions) -> Option<String> {
    match value {
        Value::Sequence(seq) => {
            if seq.is_empty() {
                return Some("[]".to_string());
            }
            if !options.compact_sequences || !seq.iter().all(is_scalar) {
                return None;
            }
            let items: Vec<String> = seq.iter().map(|v| scalar_text(v, true)).collect();
            let text = format!("[{}]", items.join(", "));
            (text.len() <= options.flow_threshold).then_some(text)
        }
        Value::Mapping(map) => {
            if map.is_empty() {
                return Some("{}".to_string());
            }
            if !options.compact_mappings || map.len() > 4 || !map.values().all(is_scalar) {
                return None;
            }
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let items: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("{}: {}", string_text(k, true), scalar_text(v, true)))
                .collect();
            let text = format!("{{{}}}", items.join(", "));
            (text.len() <= options.flow_threshold).then_some(text)
        }
        _ => Some(scalar_text(value, false)),
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Sequence(_) | Value::Mapping(_))
}

fn scalar_text(value: &Value, in_flow: bool) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) => "false".to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(f) => float_text(*f),
        Value::String(s) => string_text(s, in_flow),
        // Only reachable for empty collections, which render as flow.
        Value::Sequence(_) => "[]".to_string(),
        Value::Mapping(_) => "{}".to_string(),
    }
}

fn float_text(f: f64) -> String {
    if f.is_nan() {
        return ".nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { ".inf" } else { "-.inf" }.to_string();
    }
    let text = format!("{}", f);
    if text.contains('.') || text.contains('e') || text.contains('E') {
        text
    } else {
        // Keep the value a float on re-parse.
        format!("{}.0", text)
    }
}

fn string_text(s: &str, in_flow: bool) -> String {
    if needs_quoting(s, in_flow) {
        quote(s)
    } else {
        s.to_string()
    }
}

/// Bytes that cannot begin an unquoted scalar.
const INDICATORS: &[u8] = b"-?:,[]{}#&*!|>'\"%@` \n\r\t\\";

/// A string must be quoted when emitting it bare would change its meaning
/// or its bytes on re-parse.
fn needs_quoting(s: &str, in_flow: bool) -> bool {
    if s.is_empty() {
        return true;
    }
    // Anything the schema would read back as null/bool/number.
    if !matches!(schema::classify(s), Value::String(_)) {
        return true;
    }
    if is_schema_keyword(s) {
        return true;
    }
    // Bare `...` at the margin would read back as a document-end marker.
    if s == "..." {
        return true;
    }
    if INDICATORS.contains(&s.as_bytes()[0]) {
        return true;
    }
    if s.ends_with(' ') {
        return true;
    }
    if s
        .bytes()
        .any(|b| b < 0x20 || b == 0x7f || b == b':' || b == b'#')
    {
        return true;
    }
    // Flow collections additionally reserve their separators.
    if in_flow
        && s.bytes()
            .any(|b| matches!(b, b',' | b'[' | b']' | b'{' | b'}'))
    {
        return true;
    }
    false
}

/// Keywords from the wider YAML schemas, quoted defensively even though
/// this resolver reads them as strings.
fn is_schema_keyword(s: &str) -> bool {
    s == "~"
        || ["null", "true", "false", "yes", "no", "on", "off"]
            .iter()
            .any(|kw| s.eq_ignore_ascii_case(kw))
}

/// Double-quote a string, escaping control bytes so the result survives a
/// re-parse byte for byte.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02X}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

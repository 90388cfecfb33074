//! YAML request parser.
//!
//! Requests have a YAML-text constructor for diagnostic and scripting use:
//! mapping keys become interned identifiers, integers and booleans become
//! their scalar tags, everything else becomes a string. Block and flow
//! styles are both accepted; anchors and aliases are not.

use indexmap::IndexMap;
use tracing::warn;

use crate::parser::ParseError;
use crate::protocol::value::Value;
use crate::uid::Uid;

/// Parses YAML text into an owned value tree. Any malformed input fails
/// with a [`ParseError`]; no partial tree is ever returned.
pub fn parse_value(text: &str) -> Result<Value, ParseError> {
    let mut parser = tree_sitter::Parser::new();
    let language = tree_sitter_yaml::LANGUAGE;
    parser.set_language(&language.into()).map_err(|e| {
        warn!("Failed to set YAML language for tree-sitter: {}", e);
        ParseError::TreeSitter(e.to_string())
    })?;

    let tree = parser.parse(text, None).ok_or_else(|| {
        warn!("Failed to parse YAML request text");
        ParseError::ParseFailed("Failed to parse YAML".to_string())
    })?;

    let root = tree.root_node();
    if root.has_error() {
        return Err(ParseError::ParseFailed(format!(
            "YAML syntax error near byte {}",
            first_error_offset(root)
        )));
    }

    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if child.kind() == "document" {
            return convert_document(child, text);
        }
    }

    // An empty stream is a null request.
    Ok(Value::Null)
}

fn first_error_offset(root: tree_sitter::Node) -> usize {
    let mut cursor = root.walk();
    let mut offset = root.start_byte();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            offset = node.start_byte();
            break;
        }
        if cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return offset;
            }
        }
    }
    offset
}

fn convert_document(node: tree_sitter::Node, content: &str) -> Result<Value, ParseError> {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if matches!(child.kind(), "block_node" | "flow_node") {
            return convert_node(child, content);
        }
    }
    Ok(Value::Null)
}

/// Converts a `block_node`/`flow_node` wrapper to a value.
fn convert_node(node: tree_sitter::Node, content: &str) -> Result<Value, ParseError> {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "block_mapping" | "flow_mapping" => return convert_mapping(child, content),
            "block_sequence" => return convert_block_sequence(child, content),
            "flow_sequence" => return convert_flow_sequence(child, content),
            "plain_scalar" => return Ok(convert_plain_scalar(child, content)),
            "single_quote_scalar" => {
                return Ok(Value::String(unquote_single(raw_text(child, content))));
            }
            "double_quote_scalar" => {
                return Ok(Value::String(unquote_double(raw_text(child, content))));
            }
            "block_scalar" => return Ok(Value::String(block_scalar_text(child, content))),
            "alias" => {
                return Err(ParseError::Unsupported("YAML aliases".to_string()));
            }
            "anchor" | "tag" | "comment" => continue,
            _ => continue,
        }
    }
    Ok(Value::Null)
}

fn convert_mapping(node: tree_sitter::Node, content: &str) -> Result<Value, ParseError> {
    let mut entries = IndexMap::new();
    let mut cursor = node.walk();

    for child in node.children(&mut cursor) {
        if !matches!(child.kind(), "block_mapping_pair" | "flow_pair") {
            continue;
        }

        let Some(key_node) = child.child_by_field_name("key") else {
            continue;
        };
        let key = Uid::intern(&mapping_key_text(key_node, content)?);

        let value = match child.child_by_field_name("value") {
            Some(value_node) => convert_node(value_node, content)?,
            None => Value::Null,
        };

        entries.insert(key, value);
    }

    Ok(Value::Dictionary(entries))
}

fn convert_block_sequence(node: tree_sitter::Node, content: &str) -> Result<Value, ParseError> {
    let mut items = Vec::new();
    let mut cursor = node.walk();

    for child in node.children(&mut cursor) {
        if child.kind() != "block_sequence_item" {
            continue;
        }
        let mut item = Value::Null;
        let mut item_cursor = child.walk();
        for grandchild in child.children(&mut item_cursor) {
            if matches!(grandchild.kind(), "block_node" | "flow_node") {
                item = convert_node(grandchild, content)?;
                break;
            }
        }
        items.push(item);
    }

    Ok(Value::Array(items))
}

fn convert_flow_sequence(node: tree_sitter::Node, content: &str) -> Result<Value, ParseError> {
    let mut items = Vec::new();
    let mut cursor = node.walk();

    for child in node.children(&mut cursor) {
        match child.kind() {
            "flow_node" => items.push(convert_node(child, content)?),
            // `[key: value]` is a single-pair mapping element.
            "flow_pair" => {
                let mut entries = IndexMap::new();
                if let Some(key_node) = child.child_by_field_name("key") {
                    let key = Uid::intern(&mapping_key_text(key_node, content)?);
                    let value = match child.child_by_field_name("value") {
                        Some(value_node) => convert_node(value_node, content)?,
                        None => Value::Null,
                    };
                    entries.insert(key, value);
                }
                items.push(Value::Dictionary(entries));
            }
            _ => {}
        }
    }

    Ok(Value::Array(items))
}

/// A plain scalar carries its concrete type as a child node.
fn convert_plain_scalar(node: tree_sitter::Node, content: &str) -> Value {
    let Some(scalar) = node.child(0) else {
        return Value::String(raw_text(node, content).to_string());
    };

    let text = raw_text(scalar, content);
    match scalar.kind() {
        "integer_scalar" => text
            .parse::<i64>()
            .map(Value::Int64)
            .unwrap_or_else(|_| Value::String(text.to_string())),
        "float_scalar" => text
            .parse::<f64>()
            .map(Value::Double)
            .unwrap_or_else(|_| Value::String(text.to_string())),
        "boolean_scalar" => Value::Bool(text.eq_ignore_ascii_case("true")),
        "null_scalar" => Value::Null,
        _ => Value::String(text.to_string()),
    }
}

/// Extracts the string content of a mapping key node.
fn mapping_key_text(node: tree_sitter::Node, content: &str) -> Result<String, ParseError> {
    match convert_node(node, content)? {
        Value::String(key) => Ok(key),
        // Non-string scalar keys keep their source spelling.
        Value::Null | Value::Bool(_) | Value::Int64(_) | Value::Double(_) => {
            Ok(raw_text(node, content).trim().to_string())
        }
        _ => Err(ParseError::Unsupported(
            "non-scalar mapping key".to_string(),
        )),
    }
}

fn raw_text<'a>(node: tree_sitter::Node, content: &'a str) -> &'a str {
    &content[node.byte_range()]
}

// Exactly one delimiter comes off each end: trimming greedily would eat
// an escaped quote at the scalar boundary.
fn unquote_single(text: &str) -> String {
    text.strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .unwrap_or(text)
        .replace("''", "'")
}

fn unquote_double(text: &str) -> String {
    let inner = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Literal interpretation of a `|`/`>` block scalar: header line dropped,
/// common indentation stripped.
fn block_scalar_text(node: tree_sitter::Node, content: &str) -> String {
    let text = raw_text(node, content);
    let mut lines = text.lines();
    lines.next(); // the |/> header

    let body: Vec<&str> = lines.collect();
    // YAML indentation is ASCII spaces only; other whitespace is content.
    let indent = body
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches(' ').len())
        .min()
        .unwrap_or(0);

    body.iter()
        .map(|line| line.get(indent..).unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n")
}

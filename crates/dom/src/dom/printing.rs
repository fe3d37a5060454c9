use core::fmt;

use super::{Document, DomNode, NodeKey, NodeKind};

use serde_json::{Map, Value, json};

// -----------------------
// Module-scope helpers
// -----------------------

fn flush_text(children: &mut Vec<Value>, text_buf: &mut String) {
    if !text_buf.trim().is_empty() {
        children.push(json!({ "type": "text", "text": text_buf.clone() }));
    }
    text_buf.clear();
}

fn push_non_null(children: &mut Vec<Value>, value: Value) {
    if !value.is_null() {
        children.push(value);
    }
}

fn coalesce_children(dom: &Document, id: NodeKey) -> Vec<Value> {
    let mut children: Vec<Value> = Vec::new();
    let mut text_buf = String::new();
    for child in dom.children(id) {
        if let Some(NodeKind::Text { text }) = dom.node(child).map(|node| &node.kind) {
            text_buf.push_str(text);
            continue;
        }
        flush_text(&mut children, &mut text_buf);
        push_non_null(&mut children, node_to_json(dom, child));
    }
    flush_text(&mut children, &mut text_buf);
    children
}

/// Attributes sorted by name, with the serialized inline style folded in.
fn sorted_attrs(node: &DomNode) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = node.attrs.iter().cloned().collect();
    if !node.style.is_empty() {
        pairs.push((String::from("style"), node.style.to_css_text()));
    }
    pairs.sort_by(|left, right| left.0.cmp(&right.0));
    pairs
}

fn node_to_json(dom: &Document, id: NodeKey) -> Value {
    let Some(node) = dom.node(id) else {
        return Value::Null;
    };
    match &node.kind {
        NodeKind::Document => json!({ "type": "document", "children": coalesce_children(dom, id) }),
        NodeKind::Element { tag } => {
            let mut attrs_obj = Map::new();
            for (name, value) in sorted_attrs(node) {
                attrs_obj.insert(name, Value::String(value));
            }
            json!({
                "type": "element",
                "tag": tag,
                "attrs": Value::Object(attrs_obj),
                "children": coalesce_children(dom, id),
            })
        }
        NodeKind::Text { text } => {
            if text.trim().is_empty() {
                Value::Null
            } else {
                json!({ "type": "text", "text": text })
            }
        }
        NodeKind::Comment { .. } => Value::Null,
    }
}

fn write_indent(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_str("  ")?;
    }
    Ok(())
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for character in text.chars() {
        match character {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(character),
        }
    }
    out
}

fn fmt_node(dom: &Document, id: NodeKey, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    let Some(node) = dom.node(id) else {
        return Ok(());
    };
    match &node.kind {
        NodeKind::Document => {
            write_indent(f, depth)?;
            writeln!(f, "#document")?;
            for child in dom.children(id) {
                fmt_node(dom, child, f, depth + 1)?;
            }
        }
        NodeKind::Element { tag } => {
            write_indent(f, depth)?;
            write!(f, "<{tag}")?;
            for (name, value) in sorted_attrs(node) {
                write!(f, " {}=\"{}\"", name, escape_text(&value))?;
            }
            writeln!(f, ">")?;
            for child in dom.children(id) {
                fmt_node(dom, child, f, depth + 1)?;
            }
            write_indent(f, depth)?;
            writeln!(f, "</{tag}>")?;
        }
        NodeKind::Text { text } => {
            // Skip pure-whitespace text nodes in the printer for cleaner output
            if text.chars().all(char::is_whitespace) {
                return Ok(());
            }
            write_indent(f, depth)?;
            writeln!(f, "\"{}\"", escape_text(text))?;
        }
        NodeKind::Comment { text } => {
            write_indent(f, depth)?;
            writeln!(f, "<!--{}-->", escape_text(text))?;
        }
    }
    Ok(())
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DOM")?;
        fmt_node(self, self.root(), f, 0)
    }
}

impl Document {
    /// Deterministic JSON snapshot of the whole document.
    /// Schema:
    /// - Document: { "type":"document", "children":[ ... ] }
    /// - Element: { "type":"element", "tag": "div", "attrs": {..}, "children":[ ... ] }
    /// - Text: { "type":"text", "text":"..." }
    ///
    /// Comments and whitespace-only text are omitted.
    pub fn to_json_value(&self) -> Value {
        node_to_json(self, self.root())
    }

    /// Pretty JSON string for snapshots and test comparisons.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string_pretty(&self.to_json_value()).unwrap_or_else(|_| String::from("{}"))
    }
}

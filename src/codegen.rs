//! React component generation from node metadata
//!
//! Produces a single function component with inline styles. Children are
//! absolutely positioned relative to their parent's bounding box.

use crate::client::models::{Bounds, NodeMetadata};
use crate::client::CodeResult;

/// Nesting below this depth is dropped
const MAX_DEPTH: usize = 8;

/// Generate a React component for `node`
pub fn generate_react(node: &NodeMetadata) -> CodeResult {
    let component_name = component_name(&node.name);

    let mut body = String::new();
    render_node(node, None, 2, 0, &mut body);

    let code = format!(
        "export function {}() {{\n  return (\n{}  );\n}}\n",
        component_name, body
    );

    CodeResult {
        node_id: node.id.clone(),
        component_name,
        framework: "react".to_string(),
        code,
    }
}

/// PascalCase identifier derived from a node name
pub fn component_name(name: &str) -> String {
    let mut ident: String = name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();

    if ident.is_empty() {
        ident = "FigmaNode".to_string();
    } else if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert_str(0, "Node");
    }
    ident
}

fn render_node(
    node: &NodeMetadata,
    parent: Option<&Bounds>,
    indent: usize,
    depth: usize,
    out: &mut String,
) {
    // The requested root renders even when hidden in the design
    if (depth > 0 && !node.visible) || depth > MAX_DEPTH {
        return;
    }

    let pad = "  ".repeat(indent);
    let tag = if node.node_type == "TEXT" { "p" } else { "div" };
    let style = style_props(node, parent);
    let style_attr = if style.is_empty() {
        String::new()
    } else {
        format!(" style={{{{ {} }}}}", style.join(", "))
    };

    out.push_str(&format!(
        "{}<{} data-figma-id=\"{}\"{}>",
        pad, tag, node.id, style_attr
    ));

    if let Some(text) = node.text.as_deref() {
        // A JSON string is also a valid JS string literal
        let literal = serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string());
        out.push_str(&format!("{{{}}}</{}>\n", literal, tag));
        return;
    }

    let children: Vec<&NodeMetadata> = node.children.iter().filter(|c| c.visible).collect();
    if children.is_empty() || depth == MAX_DEPTH {
        out.push_str(&format!("</{}>\n", tag));
        return;
    }

    out.push('\n');
    for child in children {
        render_node(child, node.bounds.as_ref(), indent + 1, depth + 1, out);
    }
    out.push_str(&format!("{}</{}>\n", pad, tag));
}

fn style_props(node: &NodeMetadata, parent: Option<&Bounds>) -> Vec<String> {
    let mut props = Vec::new();

    match (node.bounds.as_ref(), parent) {
        (Some(b), Some(p)) => {
            props.push("position: \"absolute\"".to_string());
            props.push(format!("left: {}", number(b.x - p.x)));
            props.push(format!("top: {}", number(b.y - p.y)));
        }
        (Some(_), None) if !node.children.is_empty() => {
            props.push("position: \"relative\"".to_string());
        }
        _ => {}
    }

    if let Some(b) = node.bounds.as_ref() {
        props.push(format!("width: {}", number(b.width)));
        props.push(format!("height: {}", number(b.height)));
    }

    if let Some(fill) = node.fills.first() {
        let key = if node.node_type == "TEXT" {
            "color"
        } else {
            "backgroundColor"
        };
        props.push(format!("{}: \"{}\"", key, fill.color));
        if fill.opacity < 1.0 {
            props.push(format!("opacity: {}", number(fill.opacity)));
        }
    }

    if node.node_type == "ELLIPSE" {
        props.push("borderRadius: \"50%\"".to_string());
    } else if let Some(radius) = node.corner_radius.filter(|r| *r > 0.0) {
        props.push(format!("borderRadius: {}", number(radius)));
    }

    if let Some(font) = node.font.as_ref() {
        let family = serde_json::to_string(&font.family).unwrap_or_else(|_| "\"\"".to_string());
        props.push(format!("fontFamily: {}", family));
        props.push(format!("fontSize: {}", number(font.size)));
        if font.weight != 400 {
            props.push(format!("fontWeight: {}", font.weight));
        }
    }

    props
}

/// Integers print without a fraction, everything else to two decimals
fn number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}

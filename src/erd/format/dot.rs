//! Graphviz DOT format output for ERD diagrams.

use crate::erd::classify::EdgeSpec;
use crate::erd::format::DiagramStyle;
use crate::schema::{Attribute, Entity, TypeRegistry};

/// Generate the DOT document for the given nodes and edges.
///
/// Statement order follows the input order exactly, so the same input
/// always produces the same bytes.
pub fn to_dot(
    nodes: &[&Entity],
    edges: &[EdgeSpec],
    columns: bool,
    style: &DiagramStyle,
    registry: &TypeRegistry,
) -> String {
    let mut output = String::new();

    // Header
    output.push_str(&format!("digraph {} {{\n", escape_dot_id(&style.graph_name)));
    output.push_str(&format!(
        "  graph [pad=\"{}\", nodesep=\"{}\", ranksep=\"{}\", overlap=\"{}\"];\n",
        style.pad, style.node_sep, style.rank_sep, style.overlap
    ));
    output.push_str(&format!(
        "  edge [concentrate=true, color=\"{}\", penwidth={}];\n",
        escape_quoted(&style.color),
        style.line_width
    ));
    output.push_str(&format!("  node [fontsize={}];\n", style.font_size));
    if !columns {
        output.push_str("  esep=1;\n");
    }
    output.push_str(&format!("  rankdir={};\n", style.direction));

    if !nodes.is_empty() {
        output.push('\n');
    }

    // Generate each entity as an HTML-like table label
    for entity in nodes {
        output.push_str(&format!(
            "  \"{}\" [shape=none, margin=0, label=<{}>];\n",
            escape_quoted(&entity.name),
            generate_entity_label(entity, columns, style, registry)
        ));
    }

    if !edges.is_empty() {
        output.push('\n');
    }

    let arrow_size = format_arrow_size(style.arrow_size);
    for edge in edges {
        let (tail, tail_shape, head, head_shape) = match edge {
            EdgeSpec::Link {
                tail,
                tail_shape,
                head,
                head_shape,
            } => (tail, tail_shape.as_str(), head, head_shape.as_str()),
            EdgeSpec::Loop { node, shape } => (node, shape.as_str(), node, "none"),
        };
        output.push_str(&format!(
            "  \"{}\" -> \"{}\" [arrowtail={}, arrowhead={}, dir=both, arrowsize={}];\n",
            escape_quoted(tail),
            escape_quoted(head),
            tail_shape,
            head_shape,
            arrow_size
        ));
    }

    output.push_str("}\n");
    output
}

/// Generate HTML-like table label for an entity
fn generate_entity_label(
    entity: &Entity,
    columns: bool,
    style: &DiagramStyle,
    registry: &TypeRegistry,
) -> String {
    let mut html = String::new();

    html.push_str("<table border=\"0\" cellborder=\"1\" cellspacing=\"0\" cellpadding=\"4\">");
    html.push_str(&format!(
        "<tr><td bgcolor=\"{}\">{}</td></tr>",
        escape_html(&style.header_color),
        escape_html(&entity.name)
    ));

    if columns {
        for (port, attr) in entity.attributes.iter().enumerate() {
            html.push_str(&format!(
                "<tr><td port=\"{}\" align=\"left\">{}: {}</td></tr>",
                port,
                attribute_name(attr),
                escape_html(registry.label(&attr.ty))
            ));
        }
    }

    html.push_str("</table>");
    html
}

/// Primary keys are underlined, foreign-key references italic
fn attribute_name(attr: &Attribute) -> String {
    let name = escape_html(&attr.name);
    if attr.is_primary_key {
        format!("<u>{}</u>", name)
    } else if attr.is_foreign_key() {
        format!("<i>{}</i>", name)
    } else {
        name
    }
}

/// Escape a string for use in DOT HTML labels
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Escape a string for use inside a double-quoted DOT ID
fn escape_quoted(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Two decimals when that is exact, otherwise the full value
fn format_arrow_size(size: f64) -> String {
    let hundredths = (size * 100.0).round();
    if (hundredths / 100.0 - size).abs() < 1e-9 {
        format!("{:.2}", size)
    } else {
        format!("{}", size)
    }
}

const DOT_KEYWORDS: [&str; 6] = ["node", "edge", "graph", "digraph", "subgraph", "strict"];

/// Escape a string for use as a DOT ID, quoting anything that is not a
/// plain identifier. Keywords match case-insensitively in Graphviz.
fn escape_dot_id(s: &str) -> String {
    let is_identifier = s
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !DOT_KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(s));

    if is_identifier {
        s.to_string()
    } else {
        format!("\"{}\"", escape_quoted(s))
    }
}

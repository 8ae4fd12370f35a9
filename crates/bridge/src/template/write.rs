//! Template XML writer.

use quick_xml::escape::escape;

use super::{Component, Field, Node};

pub(super) fn write_document(root: &Component) -> String {
    let mut out = String::new();
    write_component(&mut out, root, 0);
    out
}

fn write_component(out: &mut String, component: &Component, depth: usize) {
    indent(out, depth);
    out.push_str(&format!(
        "<component id=\"{}\" name=\"{}\"",
        escape(component.id.as_str()),
        escape(component.name.as_str())
    ));

    if component.children.is_empty() {
        out.push_str("/>\n");
        return;
    }

    out.push_str(">\n");
    for child in &component.children {
        match child {
            Node::Component(c) => write_component(out, c, depth + 1),
            Node::Field(f) => write_field(out, f, depth + 1),
            Node::Comment(text) => {
                indent(out, depth + 1);
                out.push_str(&format!("<!--{text}-->\n"));
            }
        }
    }
    indent(out, depth);
    out.push_str("</component>\n");
}

fn write_field(out: &mut String, field: &Field, depth: usize) {
    indent(out, depth);
    out.push_str(&format!(
        "<{} name=\"{}\" value=\"{}\"/>\n",
        field.kind,
        escape(field.name.as_str()),
        escape(field.value.as_str())
    ));
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
}

//! Template XML reader.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::{Component, Field, FieldKind, Node, Template};
use crate::common::BridgeError;

/// An element whose end tag has not been seen yet.
enum Open {
    Component(Component),
    Field(Field),
}

pub(super) fn parse_document(text: &str) -> Result<Template, BridgeError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Open> = Vec::new();
    let mut root: Option<Component> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            BridgeError::TemplateSyntax(format!(
                "at byte {}: {e}",
                reader.error_position()
            ))
        })?;

        match event {
            Event::Start(start) => {
                let open = open_element(&start)?;
                stack.push(open);
            }
            Event::Empty(start) => {
                let open = open_element(&start)?;
                close_element(open, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let Some(open) = stack.pop() else {
                    return Err(syntax("end tag without a matching start tag"));
                };
                close_element(open, &mut stack, &mut root)?;
            }
            Event::Comment(comment) => {
                if let Some(Open::Component(parent)) = stack.last_mut() {
                    let body = String::from_utf8_lossy(&comment).into_owned();
                    parent.children.push(Node::Comment(body));
                }
            }
            Event::Text(_) | Event::CData(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    if !stack.is_empty() {
        return Err(syntax("document ended inside an open element"));
    }

    let root = root.ok_or(BridgeError::EmptyTemplate)?;
    tracing::debug!(root = %root.id, "template parsed");
    Template::new(root)
}

fn open_element(start: &BytesStart<'_>) -> Result<Open, BridgeError> {
    let tag = start.name();
    let kind = match tag.as_ref() {
        b"component" => None,
        b"param" => Some(FieldKind::Param),
        b"stat" => Some(FieldKind::Stat),
        other => {
            return Err(syntax(&format!(
                "unknown element <{}>",
                String::from_utf8_lossy(other)
            )));
        }
    };

    let mut id = String::new();
    let mut name = String::new();
    let mut value = String::new();

    for attr in start.attributes() {
        let attr = attr.map_err(|e| syntax(&e.to_string()))?;
        let text = attr
            .unescape_value()
            .map_err(|e| syntax(&e.to_string()))?
            .into_owned();
        match attr.key.as_ref() {
            b"id" => id = text,
            b"name" => name = text,
            b"value" => value = text,
            _ => {}
        }
    }

    Ok(match kind {
        None => Open::Component(Component::new(id, name)),
        Some(kind) => Open::Field(Field::new(kind, name, value)),
    })
}

fn close_element(
    open: Open,
    stack: &mut [Open],
    root: &mut Option<Component>,
) -> Result<(), BridgeError> {
    let node = match open {
        Open::Component(c) => Node::Component(c),
        Open::Field(f) => Node::Field(f),
    };

    match stack.last_mut() {
        Some(Open::Component(parent)) => {
            parent.children.push(node);
            Ok(())
        }
        Some(Open::Field(field)) => Err(syntax(&format!(
            "<{}> '{}' cannot contain child elements",
            field.kind, field.name
        ))),
        None => match node {
            Node::Component(c) if root.is_none() => {
                *root = Some(c);
                Ok(())
            }
            Node::Component(_) => Err(syntax("more than one root element")),
            _ => Err(syntax("the root element must be a component")),
        },
    }
}

fn syntax(reason: &str) -> BridgeError {
    BridgeError::TemplateSyntax(reason.to_owned())
}

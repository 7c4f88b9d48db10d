//! GraphML reader for game knowledge graphs.
//!
//! Recognized data keys are `type` and `description` on nodes and `label`
//! on edges; anything else is ignored. All nodes are added before any edge,
//! so node order is declaration order followed by undeclared edge endpoints.

use std::collections::HashMap;
use std::fmt::Display;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use super::{KnowledgeGraph, NodeAttributes};
use crate::error::{KgError, Result};

/// Element currently collecting `<data>` children.
enum Open {
    Node { id: String, attributes: NodeAttributes },
    Edge { source: String, target: String, label: Option<String> },
}

/// Read a GraphML file from disk.
///
/// # Errors
/// Returns an error if the file cannot be read or is not valid GraphML.
pub fn read_file(path: &Path) -> Result<KnowledgeGraph> {
    let content = std::fs::read_to_string(path)?;
    parse_str(&content, &path.display().to_string())
}

/// Parse GraphML text. `source` names the input in error messages.
///
/// # Errors
/// Returns [`KgError::GraphParse`] on malformed XML or when a node or edge
/// lacks its identifying attributes.
pub fn parse_str(content: &str, source: &str) -> Result<KnowledgeGraph> {
    let mut reader = Reader::from_str(content);
    let mut buf = Vec::new();

    let mut keys: HashMap<String, String> = HashMap::new();
    let mut nodes: Vec<(String, NodeAttributes)> = Vec::new();
    let mut edges: Vec<(String, String, String)> = Vec::new();
    let mut open: Option<Open> = None;
    let mut data_key: Option<String> = None;
    let mut data_text = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"key" => register_key(&e, &mut keys, source)?,
                b"node" => {
                    open = Some(Open::Node {
                        id: required_attr(&e, b"id", source)?,
                        attributes: NodeAttributes::default(),
                    });
                }
                b"edge" => {
                    open = Some(Open::Edge {
                        source: required_attr(&e, b"source", source)?,
                        target: required_attr(&e, b"target", source)?,
                        label: None,
                    });
                }
                b"data" => {
                    data_key = attr(&e, b"key", source)?;
                    data_text.clear();
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"key" => register_key(&e, &mut keys, source)?,
                b"node" => nodes.push((required_attr(&e, b"id", source)?, NodeAttributes::default())),
                b"edge" => edges.push((
                    required_attr(&e, b"source", source)?,
                    required_attr(&e, b"target", source)?,
                    String::new(),
                )),
                _ => {}
            },
            Ok(Event::Text(t)) => {
                if data_key.is_some() {
                    let text = t.unescape().map_err(|err| parse_error(source, err))?;
                    data_text.push_str(&text);
                }
            }
            Ok(Event::CData(t)) => {
                if data_key.is_some() {
                    data_text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"data" => {
                    // Empty data leaves the attribute absent, same as `<data/>`.
                    if let Some(key) = data_key.take().filter(|_| !data_text.is_empty()) {
                        let name = keys.get(&key).map_or(key.as_str(), String::as_str);
                        assign(open.as_mut(), name, std::mem::take(&mut data_text));
                    }
                }
                b"node" => {
                    if let Some(Open::Node { id, attributes }) = open.take() {
                        nodes.push((id, attributes));
                    }
                }
                b"edge" => {
                    if let Some(Open::Edge { source: from, target, label }) = open.take() {
                        edges.push((from, target, label.unwrap_or_default()));
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(parse_error(source, e)),
        }
        buf.clear();
    }

    let mut graph = KnowledgeGraph::new();
    for (id, attributes) in nodes {
        graph.add_node(&id, attributes);
    }
    for (from, target, label) in edges {
        graph.add_edge(&from, &target, label);
    }

    debug!(
        source,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Parsed GraphML"
    );
    Ok(graph)
}

fn assign(open: Option<&mut Open>, name: &str, value: String) {
    match (open, name) {
        (Some(Open::Node { attributes, .. }), "type") => attributes.kind = Some(value),
        (Some(Open::Node { attributes, .. }), "description") => {
            attributes.description = Some(value);
        }
        (Some(Open::Edge { label, .. }), "label") => *label = Some(value),
        _ => {}
    }
}

fn register_key(e: &BytesStart<'_>, keys: &mut HashMap<String, String>, source: &str) -> Result<()> {
    let id = required_attr(e, b"id", source)?;
    let name = attr(e, b"attr.name", source)?.unwrap_or_else(|| id.clone());
    keys.insert(id, name);
    Ok(())
}

fn attr(e: &BytesStart<'_>, key: &[u8], source: &str) -> Result<Option<String>> {
    for attribute in e.attributes() {
        let attribute = attribute.map_err(|err| parse_error(source, err))?;
        if attribute.key.as_ref() == key {
            let value = attribute
                .unescape_value()
                .map_err(|err| parse_error(source, err))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn required_attr(e: &BytesStart<'_>, key: &[u8], source: &str) -> Result<String> {
    attr(e, key, source)?.ok_or_else(|| KgError::GraphParse {
        path: source.to_string(),
        reason: format!(
            "<{}> element missing '{}' attribute",
            String::from_utf8_lossy(e.local_name().as_ref()),
            String::from_utf8_lossy(key)
        ),
    })
}

fn parse_error(source: &str, err: impl Display) -> KgError {
    KgError::GraphParse {
        path: source.to_string(),
        reason: err.to_string(),
    }
}

//! Clipboard export and import. An import is validated in full before it
//! may replace anything.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use super::error::ImportError;
use super::model::GraphModel;
use super::schema::SCHEMA_VERSION;
use super::types::{StoredAnnotation, StoredFloatingImage, StoredGraph, StoredLink, StoredNode};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
	pub version: u32,
	pub timestamp: String,
	pub nodes: Vec<StoredNode>,
	pub links: Vec<StoredLink>,
	pub floating_images: Vec<StoredFloatingImage>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub annotations: Vec<StoredAnnotation>,
}

fn timestamp(now_ms: f64) -> String {
	DateTime::<Utc>::from_timestamp_millis(now_ms as i64)
		.unwrap_or_default()
		.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn export_payload(model: &GraphModel, now_ms: f64) -> ExportPayload {
	let saved = model.save();
	ExportPayload {
		version: SCHEMA_VERSION,
		timestamp: timestamp(now_ms),
		nodes: saved.nodes,
		links: saved.links,
		floating_images: saved.floating_images,
		annotations: saved.annotations,
	}
}

pub fn export_json(model: &GraphModel, now_ms: f64) -> Result<String, serde_json::Error> {
	serde_json::to_string_pretty(&export_payload(model, now_ms))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImportSummary {
	pub nodes: usize,
	pub links: usize,
	pub floating_images: usize,
	pub annotations: usize,
}

impl ImportSummary {
	pub fn of(graph: &StoredGraph) -> Self {
		Self {
			nodes: graph.nodes.len(),
			links: graph.links.len(),
			floating_images: graph.floating_images.len(),
			annotations: graph.annotations.len(),
		}
	}

	pub fn confirmation(&self) -> String {
		format!(
			"Import {} nodes, {} links, {} floating images and {} annotations? \
			 This replaces the current network.",
			self.nodes, self.links, self.floating_images, self.annotations
		)
	}
}

fn section<T: DeserializeOwned>(
	root: &serde_json::Map<String, Value>,
	key: &'static str,
	required: bool,
) -> Result<Vec<T>, ImportError> {
	let entries = match root.get(key) {
		None | Some(Value::Null) if required => return Err(ImportError::MissingNodes),
		None | Some(Value::Null) => return Ok(Vec::new()),
		Some(Value::Array(entries)) => entries,
		Some(_) => return Err(ImportError::NotAnArray(key)),
	};
	entries
		.iter()
		.enumerate()
		.map(|(index, entry)| {
			T::deserialize(entry).map_err(|source| ImportError::Entry {
				section: key,
				index,
				source,
			})
		})
		.collect()
}

/// Parse and validate clipboard text into a document ready to load.
pub fn parse_import(text: &str) -> Result<StoredGraph, ImportError> {
	let value: Value = serde_json::from_str(text)?;
	let Value::Object(root) = value else {
		return Err(ImportError::MissingNodes);
	};
	let nodes: Vec<StoredNode> = section(&root, "nodes", true)?;
	let links = section(&root, "links", false)?;
	let floating_images = section(&root, "floatingImages", false)?;
	let annotations = section(&root, "annotations", false)?;
	if let Some(index) = nodes.iter().position(|n| n.id.is_empty() && n.uuid.is_none()) {
		return Err(ImportError::Entry {
			section: "nodes",
			index,
			source: serde::de::Error::missing_field("id"),
		});
	}
	Ok(StoredGraph {
		nodes,
		links,
		floating_images,
		annotations,
		..StoredGraph::default()
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::network_graph::host::DocumentKind;
	use crate::components::network_graph::model::Node;
	use pretty_assertions::assert_eq;

	#[test]
	fn export_is_pretty_json_with_a_timestamp() {
		let mut model = GraphModel::default();
		model
			.add_node(Node::document(
				"Actor.a",
				"A",
				"a.png",
				DocumentKind::Actor,
				true,
				(1.0, 2.0),
			))
			.unwrap();
		let text = export_json(&model, 1_700_000_000_123.0).unwrap();
		assert!(text.contains("\n  \"version\": 2"));
		let payload: ExportPayload = serde_json::from_str(&text).unwrap();
		assert_eq!(payload.timestamp, "2023-11-14T22:13:20.123Z");
		assert_eq!(payload.nodes.len(), 1);
		assert!(payload.floating_images.is_empty());

		let back = parse_import(&text).unwrap();
		assert_eq!(back.nodes, model.save().nodes);
	}

	#[test]
	fn nodes_must_be_present_and_an_array() {
		assert!(matches!(parse_import(r#"{"links":[]}"#), Err(ImportError::MissingNodes)));
		assert!(matches!(
			parse_import(r#"{"nodes":{"a":1}}"#),
			Err(ImportError::NotAnArray("nodes"))
		));
		assert!(matches!(
			parse_import(r#"{"nodes":[],"links":"x"}"#),
			Err(ImportError::NotAnArray("links"))
		));
		assert!(matches!(parse_import("[1, 2"), Err(ImportError::Json(_))));
	}

	#[test]
	fn bad_entries_name_their_position() {
		let text = r#"{"nodes":[{"id":"a"},{"id":"b","nodeSize":"big"}]}"#;
		match parse_import(text) {
			Err(ImportError::Entry { section, index, .. }) => {
				assert_eq!((section, index), ("nodes", 1));
			}
			other => panic!("unexpected {other:?}"),
		}
	}

	#[test]
	fn summary_counts_every_section() {
		let text = r#"{
			"nodes":[{"id":"a"},{"id":"b"},{"id":"c"}],
			"links":[{"source":"a","target":"b","label":""},{"source":"b","target":"c","label":"x"}],
			"floatingImages":[{"href":"m.webp"}]
		}"#;
		let summary = ImportSummary::of(&parse_import(text).unwrap());
		assert_eq!(
			summary,
			ImportSummary {
				nodes: 3,
				links: 2,
				floating_images: 1,
				annotations: 0
			}
		);
		assert!(summary.confirmation().starts_with("Import 3 nodes, 2 links, 1 floating images"));
	}
}

//! Drag-and-drop payloads: host documents become nodes, tiles and raw image
//! paths become floating images.

use serde::Deserialize;

use super::error::DropError;
use super::host::{DocumentKind, Host, MYSTERY_IMAGE, Viewer};
use super::model::{GraphModel, Node};
use super::visibility::UNKNOWN_NAME;

const IMAGE_EXTENSIONS: [&str; 5] = [".png", ".jpg", ".jpeg", ".webp", ".svg"];

#[derive(Debug, Deserialize)]
struct Texture {
	#[serde(default)]
	src: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Payload {
	#[serde(rename = "type", default)]
	kind: String,
	#[serde(default)]
	uuid: Option<String>,
	#[serde(default)]
	texture: Option<Texture>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DropRequest {
	Document { kind: DocumentKind, uuid: String },
	/// Tile texture or a raw image path.
	Image { href: String },
}

pub fn is_image_path(text: &str) -> bool {
	let lower = text.trim().to_ascii_lowercase();
	IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Interpret the `text/plain` drag data.
pub fn parse_drop(text: &str) -> Result<DropRequest, DropError> {
	let text = text.trim();
	if !text.starts_with('{') && is_image_path(text) {
		return Ok(DropRequest::Image {
			href: text.to_string(),
		});
	}
	let payload: Payload = serde_json::from_str(text)?;
	if payload.kind == "Tile" {
		return payload
			.texture
			.and_then(|t| t.src)
			.filter(|src| !src.is_empty())
			.map(|href| DropRequest::Image { href })
			.ok_or(DropError::UnsupportedKind(payload.kind));
	}
	let kind = DocumentKind::parse(&payload.kind);
	if !kind.is_droppable() {
		return Err(DropError::UnsupportedKind(payload.kind));
	}
	let uuid = payload
		.uuid
		.filter(|u| !u.is_empty())
		.ok_or(DropError::MissingUuid)?;
	Ok(DropRequest::Document { kind, uuid })
}

/// Resolve a dropped document into a new node at `position`. Viewers without
/// observe permission get an anonymous placeholder.
pub fn node_for_document(
	host: &dyn Host,
	viewer: &Viewer,
	model: &GraphModel,
	uuid: &str,
	position: (f64, f64),
) -> Result<Node, DropError> {
	let doc = host
		.resolve_by_identifier(uuid)
		.ok_or_else(|| DropError::DocumentNotFound(uuid.to_string()))?;
	if model.contains_uuid(&doc.uuid) || model.node(&doc.uuid).is_some() {
		return Err(DropError::AlreadyPresent(doc.name));
	}
	if host.check_observe_permission(&doc, viewer) {
		let img = doc.display_image();
		Ok(Node::document(doc.uuid, doc.name, img, doc.kind, true, position))
	} else {
		Ok(Node::document(
			doc.uuid,
			UNKNOWN_NAME,
			MYSTERY_IMAGE,
			DocumentKind::Unknown,
			false,
			position,
		))
	}
}

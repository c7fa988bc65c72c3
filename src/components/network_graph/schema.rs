//! Versioned defaults for the persisted document. Every optional stored field
//! is resolved here, once, on the way into the live model; the `store_*`
//! functions are the exact inverse and always write every field.

use std::f64::consts::PI;

use log::debug;

use super::host::{DocumentKind, MYSTERY_IMAGE};
use super::model::{Node, NodeKind, NodeShape, TooltipStyle};
use super::overlay::{
	Animation, Annotation, Border, BorderStyle, FloatingImage, ImageFilter, Shadow,
	IMAGE_DEFAULT_SIZE, IMAGE_MIN_SIZE,
};
use super::types::{StoredAnnotation, StoredFloatingImage, StoredGraph, StoredNode};

/// Documents written before the version field existed.
pub const LEGACY_VERSION: u32 = 1;
pub const SCHEMA_VERSION: u32 = 2;

pub const NODE_SIZE: f64 = 30.0;
pub const NODE_SIZE_PRESETS: [f64; 5] = [20.0, 30.0, 40.0, 50.0, 70.0];
pub const DOCUMENT_NODE_COLOR: &str = "#69b3a2";
pub const EMPTY_NODE_COLOR: &str = "#cccccc";
pub const EMPTY_TEXT_COLOR: &str = "#444444";
pub const DEFAULT_LINK_LABEL: &str = "Connected";

pub const TOOLTIP_BACKGROUND: &str = "#333333";
pub const TOOLTIP_COLOR: &str = "#ffffff";
pub const TOOLTIP_BORDER: &str = "#000000";
pub const TOOLTIP_RADIUS: f64 = 4.0;
pub const TOOLTIP_FONT_SIZE: f64 = 12.0;

/// Radius of the ring unplaced nodes are laid out on.
const SEED_RADIUS: f64 = 100.0;

/// Bring an older or inconsistent document up to the current version.
pub fn migrate(mut raw: StoredGraph) -> StoredGraph {
	if raw.version < SCHEMA_VERSION {
		debug!(
			"Network Widget | migrating document from v{} to v{}",
			raw.version, SCHEMA_VERSION
		);
	}
	if raw.linking_mode && raw.annotation_mode {
		raw.annotation_mode = false;
	}
	let selection_valid = raw.linking_mode
		&& raw
			.selected_node_id
			.as_ref()
			.is_some_and(|id| raw.nodes.iter().any(|n| &n.id == id));
	if !selection_valid {
		raw.selected_node_id = None;
	}
	raw.version = SCHEMA_VERSION;
	raw
}

fn finite(value: Option<f64>) -> Option<f64> {
	value.filter(|v| v.is_finite())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
	value.as_deref().filter(|s| !s.is_empty())
}

/// Default position for a node with none stored: evenly spaced on a ring
/// around the viewport centre.
pub fn seed_position(index: usize, total: usize, (cx, cy): (f64, f64)) -> (f64, f64) {
	let angle = index as f64 * 2.0 * PI / total.max(1) as f64;
	(cx + SEED_RADIUS * angle.cos(), cy + SEED_RADIUS * angle.sin())
}

pub fn load_node(stored: &StoredNode, index: usize, total: usize, center: (f64, f64)) -> Node {
	let kind = match stored.kind.as_deref() {
		Some("Empty") => NodeKind::Empty,
		Some(raw) if !raw.is_empty() => NodeKind::Document(DocumentKind::parse(raw)),
		_ => NodeKind::Document(DocumentKind::Actor),
	};
	let uuid = non_empty(&stored.uuid).unwrap_or(&stored.id).to_string();
	let id = if stored.id.is_empty() {
		uuid.clone()
	} else {
		stored.id.clone()
	};
	let name = stored.name.clone().unwrap_or_default();
	let seeded = seed_position(index, total, center);
	let x = finite(stored.x).unwrap_or(seeded.0);
	let y = finite(stored.y).unwrap_or(seeded.1);
	let size = finite(stored.node_size)
		.filter(|s| *s > 0.0)
		.unwrap_or(NODE_SIZE);
	let defaults = TooltipStyle::default();
	let tooltip = TooltipStyle {
		background: stored.tooltip_bg.clone().unwrap_or(defaults.background),
		color: stored.tooltip_color.clone().unwrap_or(defaults.color),
		border: stored.tooltip_border.clone().unwrap_or(defaults.border),
		radius: finite(stored.tooltip_radius).unwrap_or(defaults.radius),
		font_size: finite(stored.tooltip_font_size).unwrap_or(defaults.font_size),
	};

	let mut node = match kind {
		NodeKind::Empty => {
			let label = non_empty(&stored.label).unwrap_or(&name).to_string();
			Node::empty(id.clone(), label, (x, y))
		}
		NodeKind::Document(kind) => Node::document(
			uuid.clone(),
			name.clone(),
			stored.img.clone().unwrap_or_else(|| MYSTERY_IMAGE.to_string()),
			kind,
			stored.can_observe.unwrap_or(true),
			(x, y),
		),
	};
	node.id = id;
	node.uuid = uuid;
	node.name = name;
	node.custom_name = stored.custom_name.clone().unwrap_or_default();
	node.custom_tooltip = stored.custom_tooltip.clone().unwrap_or_default();
	node.shape = stored
		.node_shape
		.as_deref()
		.map(NodeShape::parse)
		.unwrap_or_default();
	node.size = size;
	node.tooltip = tooltip;
	if let Some(color) = non_empty(&stored.node_color) {
		node.color = color.to_string();
	}
	if node.is_empty_kind() {
		if let Some(color) = non_empty(&stored.text_color) {
			node.text_color = Some(color.to_string());
		}
	} else {
		node.hidden_from_players = stored.hidden_from_players.unwrap_or(false);
		node.label = stored.label.clone();
		node.text_color = stored.text_color.clone();
	}
	node
}

pub fn store_node(node: &Node) -> StoredNode {
	StoredNode {
		id: node.id.clone(),
		uuid: Some(node.uuid.clone()),
		name: Some(node.name.clone()),
		img: Some(node.img.clone()),
		kind: Some(node.kind.as_str().to_string()),
		can_observe: Some(node.can_observe),
		hidden_from_players: Some(node.hidden_from_players),
		custom_name: Some(node.custom_name.clone()),
		node_color: Some(node.color.clone()),
		node_shape: Some(node.shape.as_str().to_string()),
		node_size: Some(node.size),
		custom_tooltip: Some(node.custom_tooltip.clone()),
		x: Some(node.x),
		y: Some(node.y),
		label: node.label.clone(),
		text_color: node.text_color.clone(),
		tooltip_bg: Some(node.tooltip.background.clone()),
		tooltip_color: Some(node.tooltip.color.clone()),
		tooltip_border: Some(node.tooltip.border.clone()),
		tooltip_radius: Some(node.tooltip.radius),
		tooltip_font_size: Some(node.tooltip.font_size),
	}
}

pub fn load_annotation(stored: &StoredAnnotation, index: usize) -> Annotation {
	Annotation {
		id: stored
			.id
			.clone()
			.unwrap_or_else(|| format!("annotation-{index}")),
		x: finite(stored.x).unwrap_or(0.0),
		y: finite(stored.y).unwrap_or(0.0),
		dx: finite(stored.dx).unwrap_or(0.0),
		dy: finite(stored.dy).unwrap_or(0.0),
		title: stored.title.clone().unwrap_or_default(),
		label: stored.label.clone().unwrap_or_default(),
	}
}

pub fn store_annotation(annotation: &Annotation) -> StoredAnnotation {
	StoredAnnotation {
		id: Some(annotation.id.clone()),
		x: Some(annotation.x),
		y: Some(annotation.y),
		dx: Some(annotation.dx),
		dy: Some(annotation.dy),
		title: Some(annotation.title.clone()),
		label: Some(annotation.label.clone()),
	}
}

pub fn load_floating_image(stored: &StoredFloatingImage, index: usize) -> FloatingImage {
	let border = Border::default();
	let shadow = Shadow::default();
	let dimension = |v: Option<f64>| {
		finite(v)
			.filter(|v| *v > 0.0)
			.map_or(IMAGE_DEFAULT_SIZE, |v| v.max(IMAGE_MIN_SIZE))
	};
	FloatingImage {
		id: stored
			.id
			.clone()
			.unwrap_or_else(|| format!("floating-img-{index}")),
		href: stored.href.clone(),
		x: finite(stored.x).unwrap_or(0.0),
		y: finite(stored.y).unwrap_or(0.0),
		width: dimension(stored.width),
		height: dimension(stored.height),
		filter: stored
			.filter
			.as_deref()
			.map(ImageFilter::parse)
			.unwrap_or_default(),
		animation: stored
			.animation
			.as_deref()
			.map(Animation::parse)
			.unwrap_or_default(),
		linked_uuid: stored.linked_uuid.clone().unwrap_or_default(),
		rotation: finite(stored.rotation).unwrap_or(0.0),
		opacity: finite(stored.opacity).unwrap_or(100.0).clamp(0.0, 100.0),
		z_index: stored.z_index.unwrap_or(index as i64),
		locked: stored.locked.unwrap_or(false),
		border: Border {
			color: stored.border_color.clone().unwrap_or(border.color),
			width: finite(stored.border_width).unwrap_or(border.width).max(0.0),
			style: stored
				.border_style
				.as_deref()
				.map(BorderStyle::parse)
				.unwrap_or(border.style),
		},
		shadow: Shadow {
			enabled: stored.shadow_enabled.unwrap_or(shadow.enabled),
			color: stored.shadow_color.clone().unwrap_or(shadow.color),
			blur: finite(stored.shadow_blur).unwrap_or(shadow.blur),
			offset_x: finite(stored.shadow_offset_x).unwrap_or(shadow.offset_x),
			offset_y: finite(stored.shadow_offset_y).unwrap_or(shadow.offset_y),
		},
	}
}

pub fn store_floating_image(image: &FloatingImage) -> StoredFloatingImage {
	StoredFloatingImage {
		id: Some(image.id.clone()),
		href: image.href.clone(),
		x: Some(image.x),
		y: Some(image.y),
		width: Some(image.width),
		height: Some(image.height),
		filter: Some(image.filter.css().unwrap_or("").to_string()),
		animation: Some(image.animation.as_str().to_string()),
		linked_uuid: Some(image.linked_uuid.clone()),
		rotation: Some(image.rotation),
		opacity: Some(image.opacity),
		z_index: Some(image.z_index),
		locked: Some(image.locked),
		border_color: Some(image.border.color.clone()),
		border_width: Some(image.border.width),
		border_style: Some(image.border.style.as_str().to_string()),
		shadow_enabled: Some(image.shadow.enabled),
		shadow_color: Some(image.shadow.color.clone()),
		shadow_blur: Some(image.shadow.blur),
		shadow_offset_x: Some(image.shadow.offset_x),
		shadow_offset_y: Some(image.shadow.offset_y),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::network_graph::model::GraphModel;
	use crate::components::network_graph::types::StoredLink;
	use pretty_assertions::assert_eq;

	fn complete_document() -> StoredGraph {
		let actor = StoredNode {
			id: "Actor.abc".into(),
			uuid: Some("Actor.abc".into()),
			name: Some("Mira".into()),
			img: Some("mira.webp".into()),
			kind: Some("Actor".into()),
			can_observe: Some(true),
			hidden_from_players: Some(true),
			custom_name: Some("The Broker".into()),
			node_color: Some("#123456".into()),
			node_shape: Some("star".into()),
			node_size: Some(40.0),
			custom_tooltip: Some("Knows things".into()),
			x: Some(10.5),
			y: Some(-3.0),
			label: None,
			text_color: None,
			tooltip_bg: Some("#000000".into()),
			tooltip_color: Some("#eeeeee".into()),
			tooltip_border: Some("#ff0000".into()),
			tooltip_radius: Some(6.0),
			tooltip_font_size: Some(14.0),
		};
		let empty = StoredNode {
			id: "empty-1-0".into(),
			uuid: Some("empty-1-0".into()),
			name: Some("Docks".into()),
			img: Some(String::new()),
			kind: Some("Empty".into()),
			can_observe: Some(true),
			hidden_from_players: Some(false),
			custom_name: Some(String::new()),
			node_color: Some(EMPTY_NODE_COLOR.into()),
			node_shape: Some("square".into()),
			node_size: Some(30.0),
			custom_tooltip: Some(String::new()),
			x: Some(200.0),
			y: Some(150.0),
			label: Some("The Docks".into()),
			text_color: Some("#222222".into()),
			tooltip_bg: Some(TOOLTIP_BACKGROUND.into()),
			tooltip_color: Some(TOOLTIP_COLOR.into()),
			tooltip_border: Some(TOOLTIP_BORDER.into()),
			tooltip_radius: Some(TOOLTIP_RADIUS),
			tooltip_font_size: Some(TOOLTIP_FONT_SIZE),
		};
		StoredGraph {
			version: SCHEMA_VERSION,
			nodes: vec![actor, empty],
			links: vec![StoredLink {
				source: "Actor.abc".into(),
				target: "empty-1-0".into(),
				label: "smuggles through".into(),
			}],
			annotations: vec![StoredAnnotation {
				id: Some("note-1".into()),
				x: Some(1.0),
				y: Some(2.0),
				dx: Some(30.0),
				dy: Some(-20.0),
				title: Some("Harbour".into()),
				label: Some("Watch the tides".into()),
			}],
			floating_images: vec![StoredFloatingImage {
				id: Some("floating-img-1".into()),
				href: "maps/harbour.webp".into(),
				x: Some(-50.0),
				y: Some(-50.0),
				width: Some(300.0),
				height: Some(200.0),
				filter: Some("sepia(1)".into()),
				animation: Some("pulse".into()),
				linked_uuid: Some("Scene.xyz".into()),
				rotation: Some(15.0),
				opacity: Some(80.0),
				z_index: Some(-2),
				locked: Some(true),
				border_color: Some("#8b4513".into()),
				border_width: Some(3.0),
				border_style: Some("dashed".into()),
				shadow_enabled: Some(true),
				shadow_color: Some("#000000".into()),
				shadow_blur: Some(8.0),
				shadow_offset_x: Some(4.0),
				shadow_offset_y: Some(6.0),
			}],
			..StoredGraph::default()
		}
	}

	#[test]
	fn field_complete_documents_round_trip() {
		let raw = complete_document();
		let (model, report) = GraphModel::load(&raw, (400.0, 300.0));
		assert_eq!(report.dropped_links, vec![]);
		assert_eq!(model.save(), raw);
	}

	#[test]
	fn json_round_trip_preserves_the_document() {
		let raw = complete_document();
		let text = serde_json::to_string(&raw).unwrap();
		let back: StoredGraph = serde_json::from_str(&text).unwrap();
		let (model, _) = GraphModel::load(&back, (0.0, 0.0));
		assert_eq!(model.save(), raw);
	}

	#[test]
	fn sparse_legacy_nodes_get_documented_defaults() {
		let stored = StoredNode {
			id: "Item.1".into(),
			name: Some("Sword".into()),
			node_shape: Some("hexagon".into()),
			node_size: Some(0.0),
			..Default::default()
		};
		let node = load_node(&stored, 1, 4, (400.0, 300.0));
		assert_eq!(node.uuid, "Item.1");
		assert_eq!(node.kind, NodeKind::Document(DocumentKind::Actor));
		assert_eq!(node.shape, NodeShape::Circle);
		assert_eq!(node.size, NODE_SIZE);
		assert_eq!(node.color, DOCUMENT_NODE_COLOR);
		assert!(node.can_observe);
		assert!(!node.hidden_from_players);
		assert_eq!(node.img, MYSTERY_IMAGE);
		assert_eq!(node.tooltip, TooltipStyle::default());
		assert!((node.x - 400.0).abs() < 1e-9);
		assert!((node.y - 400.0).abs() < 1e-9);
	}

	#[test]
	fn empty_nodes_force_their_fixed_fields() {
		let stored = StoredNode {
			id: "empty-9".into(),
			name: Some("Camp".into()),
			kind: Some("Empty".into()),
			img: Some("leftover.png".into()),
			can_observe: Some(false),
			hidden_from_players: Some(true),
			..Default::default()
		};
		let node = load_node(&stored, 0, 1, (0.0, 0.0));
		assert_eq!(node.id, "empty-9");
		assert!(node.is_empty_kind());
		assert_eq!(node.img, "");
		assert!(node.can_observe);
		assert!(!node.hidden_from_players);
		assert_eq!(node.label.as_deref(), Some("Camp"));
		assert_eq!(node.color, EMPTY_NODE_COLOR);
		assert_eq!(node.text_color.as_deref(), Some(EMPTY_TEXT_COLOR));
	}

	#[test]
	fn migration_enforces_mode_exclusivity_and_valid_selection() {
		let raw = StoredGraph {
			version: LEGACY_VERSION,
			nodes: vec![StoredNode {
				id: "a".into(),
				..Default::default()
			}],
			linking_mode: true,
			annotation_mode: true,
			selected_node_id: Some("ghost".into()),
			..Default::default()
		};
		let migrated = migrate(raw);
		assert_eq!(migrated.version, SCHEMA_VERSION);
		assert!(migrated.linking_mode);
		assert!(!migrated.annotation_mode);
		assert_eq!(migrated.selected_node_id, None);

		let raw = StoredGraph {
			nodes: migrated.nodes.clone(),
			selected_node_id: Some("a".into()),
			..Default::default()
		};
		assert_eq!(migrate(raw).selected_node_id, None);
	}

	#[test]
	fn sparse_floating_images_fill_defaults() {
		let stored = StoredFloatingImage {
			href: "a.png".into(),
			width: Some(5.0),
			opacity: Some(-10.0),
			filter: Some("blur(3px)".into()),
			..Default::default()
		};
		let image = load_floating_image(&stored, 3);
		assert_eq!(image.id, "floating-img-3");
		assert_eq!(image.width, IMAGE_MIN_SIZE);
		assert_eq!(image.height, IMAGE_DEFAULT_SIZE);
		assert_eq!(image.opacity, 0.0);
		assert_eq!(image.z_index, 3);
		assert_eq!(image.filter, ImageFilter::Blur);
		assert_eq!(image.animation, Animation::None);
		assert_eq!(image.shadow, Shadow::default());
	}
}

//! What a viewer is allowed to see of a node. Rendering asks these functions
//! and never re-derives the rules.

use super::model::Node;

pub const HIDDEN_NAME: &str = "?????";
pub const UNKNOWN_NAME: &str = "Unknown";

#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
	pub color: &'static str,
	pub width: f64,
}

/// Placeholder drawn instead of the node image.
#[derive(Clone, Debug, PartialEq)]
pub struct Mask {
	pub glyph: &'static str,
	pub background: &'static str,
	pub font_size: f64,
}

pub fn should_show_content(node: &Node, is_gm: bool) -> bool {
	if is_gm {
		node.can_observe
	} else {
		node.can_observe && !node.hidden_from_players
	}
}

fn own_name(node: &Node) -> &str {
	if node.custom_name.is_empty() {
		&node.name
	} else {
		&node.custom_name
	}
}

pub fn display_name(node: &Node, is_gm: bool) -> &str {
	if is_gm {
		own_name(node)
	} else if node.hidden_from_players {
		HIDDEN_NAME
	} else if !node.can_observe {
		UNKNOWN_NAME
	} else {
		own_name(node)
	}
}

/// Text under (or inside) the node. Label-only nodes always show their label.
pub fn label_text(node: &Node, is_gm: bool) -> &str {
	if node.is_empty_kind() {
		node.label.as_deref().filter(|l| !l.is_empty()).unwrap_or(&node.name)
	} else {
		display_name(node, is_gm)
	}
}

pub fn tooltip(node: &Node, is_gm: bool) -> &str {
	if node.custom_tooltip.is_empty() {
		display_name(node, is_gm)
	} else {
		&node.custom_tooltip
	}
}

pub fn fill_color(node: &Node, is_gm: bool) -> &str {
	if should_show_content(node, is_gm) {
		&node.color
	} else {
		"#000000"
	}
}

/// GMs see a red aura on nodes hidden from players.
pub fn stroke(node: &Node, is_gm: bool) -> Stroke {
	if is_gm && node.hidden_from_players {
		Stroke {
			color: "#ff0000",
			width: 4.0,
		}
	} else {
		Stroke {
			color: "#333",
			width: 2.0,
		}
	}
}

/// `None` when the real content is shown.
pub fn mask(node: &Node, is_gm: bool) -> Option<Mask> {
	if should_show_content(node, is_gm) {
		return None;
	}
	Some(if !is_gm && node.hidden_from_players {
		Mask {
			glyph: "?????",
			background: "#000000",
			font_size: (node.size * 0.6).max(12.0),
		}
	} else {
		Mask {
			glyph: "?",
			background: "#666",
			font_size: (node.size * 0.8).max(16.0),
		}
	})
}

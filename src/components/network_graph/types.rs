//! Persisted shape of a network widget, as stored in the host document's
//! extension data. Every field a legacy document may omit is optional here;
//! defaults are filled in once by [`super::schema`] at the load boundary.

use serde::{Deserialize, Serialize};

use super::schema::{LEGACY_VERSION, SCHEMA_VERSION};

fn legacy_version() -> u32 {
	LEGACY_VERSION
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredGraph {
	#[serde(default = "legacy_version")]
	pub version: u32,
	#[serde(default)]
	pub nodes: Vec<StoredNode>,
	#[serde(default)]
	pub links: Vec<StoredLink>,
	#[serde(default)]
	pub annotations: Vec<StoredAnnotation>,
	#[serde(default)]
	pub floating_images: Vec<StoredFloatingImage>,
	#[serde(default)]
	pub linking_mode: bool,
	#[serde(default)]
	pub annotation_mode: bool,
	#[serde(default)]
	pub selected_node_id: Option<String>,
	#[serde(default)]
	pub nodes_locked: bool,
}

impl Default for StoredGraph {
	fn default() -> Self {
		Self {
			version: SCHEMA_VERSION,
			nodes: Vec::new(),
			links: Vec::new(),
			annotations: Vec::new(),
			floating_images: Vec::new(),
			linking_mode: false,
			annotation_mode: false,
			selected_node_id: None,
			nodes_locked: false,
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredNode {
	#[serde(default)]
	pub id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub uuid: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub img: Option<String>,
	#[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub can_observe: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub hidden_from_players: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub custom_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub node_color: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub node_shape: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub node_size: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub custom_tooltip: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub x: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub y: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub text_color: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tooltip_bg: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tooltip_color: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tooltip_border: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tooltip_radius: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tooltip_font_size: Option<f64>,
}

/// Link endpoints are bare node ids in the stored form.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredLink {
	pub source: String,
	pub target: String,
	#[serde(default)]
	pub label: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredAnnotation {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub x: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub y: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub dx: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub dy: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFloatingImage {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	#[serde(default)]
	pub href: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub x: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub y: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub width: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub height: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub filter: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub animation: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub linked_uuid: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub rotation: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub opacity: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub z_index: Option<i64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub locked: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub border_color: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub border_width: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub border_style: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub shadow_enabled: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub shadow_color: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub shadow_blur: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub shadow_offset_x: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub shadow_offset_y: Option<f64>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn legacy_document_without_version_reads_as_v1() {
		let raw = r#"{"nodes":[],"links":[]}"#;
		let graph: StoredGraph = serde_json::from_str(raw).unwrap();
		assert_eq!(graph.version, LEGACY_VERSION);
		assert!(graph.floating_images.is_empty());
		assert_eq!(graph.selected_node_id, None);
	}

	#[test]
	fn field_names_follow_the_persisted_camel_case_shape() {
		let image = StoredFloatingImage {
			id: Some("img".into()),
			href: "a.png".into(),
			z_index: Some(3),
			linked_uuid: Some(String::new()),
			shadow_offset_x: Some(5.0),
			..Default::default()
		};
		let value = serde_json::to_value(&image).unwrap();
		assert_eq!(value["zIndex"], 3);
		assert_eq!(value["linkedUuid"], "");
		assert_eq!(value["shadowOffsetX"], 5.0);
		assert!(value.get("rotation").is_none());

		let node = StoredNode {
			id: "n".into(),
			kind: Some("Empty".into()),
			tooltip_font_size: Some(12.0),
			..Default::default()
		};
		let value = serde_json::to_value(&node).unwrap();
		assert_eq!(value["type"], "Empty");
		assert_eq!(value["tooltipFontSize"], 12.0);
	}
}

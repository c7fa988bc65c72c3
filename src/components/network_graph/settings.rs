use log::warn;
use serde::{Deserialize, Serialize};

use super::persistence::Store;

pub const SETTINGS_KEY: &str = "network-widget.colors";

/// Per-client colour settings, all CSS colour strings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColorSettings {
	pub background: String,
	pub link_color: String,
	pub node_label_color: String,
	pub link_label_outline: String,
}

impl Default for ColorSettings {
	fn default() -> Self {
		Self {
			background: "#f9f9f9".into(),
			link_color: "#666".into(),
			node_label_color: "#333".into(),
			link_label_outline: "#fff".into(),
		}
	}
}

impl ColorSettings {
	/// Missing or unreadable settings fall back to the defaults.
	pub fn load(store: &dyn Store) -> Self {
		match store.get(SETTINGS_KEY) {
			Ok(Some(text)) => serde_json::from_str(&text).unwrap_or_else(|e| {
				warn!("Network Widget | ignoring malformed colour settings: {e}");
				Self::default()
			}),
			Ok(None) => Self::default(),
			Err(e) => {
				warn!("Network Widget | colour settings unavailable: {e}");
				Self::default()
			}
		}
	}
}

//! Key/value storage the widget document lives in. There is no merge logic
//! here: a write replaces the whole document.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, info};

use super::error::StoreError;
use super::types::StoredGraph;

pub trait Store {
	fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
	fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
	fn remove(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
	entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

impl Store for MemoryStore {
	fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
		Ok(self.entries.borrow().get(key).cloned())
	}

	fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
		self.entries
			.borrow_mut()
			.insert(key.to_string(), value.to_string());
		Ok(())
	}

	fn remove(&self, key: &str) -> Result<(), StoreError> {
		self.entries.borrow_mut().remove(key);
		Ok(())
	}
}

/// Browser `localStorage`.
pub struct LocalStorageStore {
	storage: web_sys::Storage,
}

impl LocalStorageStore {
	pub fn open() -> Result<Self, StoreError> {
		let window =
			web_sys::window().ok_or_else(|| StoreError::Unavailable("no window".into()))?;
		let storage = window
			.local_storage()
			.map_err(|e| StoreError::Unavailable(format!("{e:?}")))?
			.ok_or_else(|| StoreError::Unavailable("localStorage disabled".into()))?;
		Ok(Self { storage })
	}
}

impl Store for LocalStorageStore {
	fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
		self.storage
			.get_item(key)
			.map_err(|e| StoreError::Unavailable(format!("{e:?}")))
	}

	fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
		self.storage
			.set_item(key, value)
			.map_err(|e| StoreError::Unavailable(format!("{e:?}")))
	}

	fn remove(&self, key: &str) -> Result<(), StoreError> {
		self.storage
			.remove_item(key)
			.map_err(|e| StoreError::Unavailable(format!("{e:?}")))
	}
}

/// One widget's document inside a host document's extension data.
#[derive(Clone)]
pub struct WidgetDocument {
	store: Rc<dyn Store>,
	key: String,
}

impl WidgetDocument {
	pub fn new(store: Rc<dyn Store>, document_id: &str, widget_id: &str) -> Self {
		Self {
			store,
			key: format!("flags.network-widget.{document_id}.{widget_id}"),
		}
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	pub fn get(&self) -> Result<Option<StoredGraph>, StoreError> {
		match self.store.get(&self.key)? {
			Some(text) => Ok(Some(serde_json::from_str(&text)?)),
			None => {
				debug!("Network Widget | no stored document at {}", self.key);
				Ok(None)
			}
		}
	}

	pub fn set(&self, graph: &StoredGraph) -> Result<(), StoreError> {
		let text = serde_json::to_string(graph)?;
		self.store.set(&self.key, &text)?;
		info!(
			"Network Widget | saved {} nodes, {} links to {}",
			graph.nodes.len(),
			graph.links.len(),
			self.key
		);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::network_graph::types::StoredNode;
	use pretty_assertions::assert_eq;

	#[test]
	fn documents_are_keyed_by_host_document_and_widget() {
		let store: Rc<dyn Store> = Rc::new(MemoryStore::new());
		let doc = WidgetDocument::new(store.clone(), "JournalEntry.x1", "w7");
		assert_eq!(doc.key(), "flags.network-widget.JournalEntry.x1.w7");
		assert!(doc.get().unwrap().is_none());

		let graph = StoredGraph {
			nodes: vec![StoredNode {
				id: "a".into(),
				..Default::default()
			}],
			linking_mode: true,
			selected_node_id: Some("a".into()),
			..Default::default()
		};
		doc.set(&graph).unwrap();
		assert_eq!(doc.get().unwrap(), Some(graph));

		let other = WidgetDocument::new(store, "JournalEntry.x1", "w8");
		assert!(other.get().unwrap().is_none());
	}

	#[test]
	fn corrupt_documents_surface_as_json_errors() {
		let store = Rc::new(MemoryStore::new());
		store
			.set("flags.network-widget.d.w", "{not json")
			.unwrap();
		let doc = WidgetDocument::new(store, "d", "w");
		assert!(matches!(doc.get(), Err(StoreError::Json(_))));
	}
}

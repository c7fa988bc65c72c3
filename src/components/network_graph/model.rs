use std::collections::HashMap;

use log::{info, warn};

use super::error::GraphError;
use super::host::DocumentKind;
use super::overlay::{Annotation, FloatingImage};
use super::schema;
use super::types::{StoredGraph, StoredLink};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NodeShape {
	#[default]
	Circle,
	Square,
	Diamond,
	Star,
}

impl NodeShape {
	pub const ALL: [NodeShape; 4] = [Self::Circle, Self::Square, Self::Diamond, Self::Star];

	/// Unrecognized shapes fall back to a circle.
	pub fn parse(raw: &str) -> Self {
		match raw {
			"square" => Self::Square,
			"diamond" => Self::Diamond,
			"star" => Self::Star,
			_ => Self::Circle,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Circle => "circle",
			Self::Square => "square",
			Self::Diamond => "diamond",
			Self::Star => "star",
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
	/// Label-only node with no backing document.
	Empty,
	Document(DocumentKind),
}

impl NodeKind {
	pub fn as_str(&self) -> &str {
		match self {
			Self::Empty => "Empty",
			Self::Document(kind) => kind.as_str(),
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct TooltipStyle {
	pub background: String,
	pub color: String,
	pub border: String,
	pub radius: f64,
	pub font_size: f64,
}

impl Default for TooltipStyle {
	fn default() -> Self {
		Self {
			background: schema::TOOLTIP_BACKGROUND.into(),
			color: schema::TOOLTIP_COLOR.into(),
			border: schema::TOOLTIP_BORDER.into(),
			radius: schema::TOOLTIP_RADIUS,
			font_size: schema::TOOLTIP_FONT_SIZE,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub id: String,
	pub uuid: String,
	pub name: String,
	pub img: String,
	pub kind: NodeKind,
	pub can_observe: bool,
	pub hidden_from_players: bool,
	pub custom_name: String,
	pub custom_tooltip: String,
	pub color: String,
	pub shape: NodeShape,
	pub size: f64,
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	/// Fixed position while dragged; the simulation does not move a pinned node.
	pub pin: Option<(f64, f64)>,
	pub label: Option<String>,
	pub text_color: Option<String>,
	pub tooltip: TooltipStyle,
}

impl Node {
	pub fn document(
		uuid: impl Into<String>,
		name: impl Into<String>,
		img: impl Into<String>,
		kind: DocumentKind,
		can_observe: bool,
		(x, y): (f64, f64),
	) -> Self {
		let uuid = uuid.into();
		Self {
			id: uuid.clone(),
			uuid,
			name: name.into(),
			img: img.into(),
			kind: NodeKind::Document(kind),
			can_observe,
			hidden_from_players: false,
			custom_name: String::new(),
			custom_tooltip: String::new(),
			color: schema::DOCUMENT_NODE_COLOR.into(),
			shape: NodeShape::Circle,
			size: schema::NODE_SIZE,
			x,
			y,
			vx: 0.0,
			vy: 0.0,
			pin: None,
			label: None,
			text_color: None,
			tooltip: TooltipStyle::default(),
		}
	}

	pub fn empty(id: impl Into<String>, label: impl Into<String>, (x, y): (f64, f64)) -> Self {
		let id = id.into();
		let label = label.into();
		Self {
			uuid: id.clone(),
			id,
			name: label.clone(),
			img: String::new(),
			kind: NodeKind::Empty,
			can_observe: true,
			hidden_from_players: false,
			custom_name: String::new(),
			custom_tooltip: String::new(),
			color: schema::EMPTY_NODE_COLOR.into(),
			shape: NodeShape::Circle,
			size: schema::NODE_SIZE,
			x,
			y,
			vx: 0.0,
			vy: 0.0,
			pin: None,
			label: Some(label),
			text_color: Some(schema::EMPTY_TEXT_COLOR.into()),
			tooltip: TooltipStyle::default(),
		}
	}

	pub fn is_empty_kind(&self) -> bool {
		self.kind == NodeKind::Empty
	}

	pub fn default_color(&self) -> &'static str {
		if self.is_empty_kind() {
			schema::EMPTY_NODE_COLOR
		} else {
			schema::DOCUMENT_NODE_COLOR
		}
	}
}

/// Live link form: endpoints are indices into the node array.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
	pub source: usize,
	pub target: usize,
	pub label: String,
}

/// Unordered node pair identifying a link; `(a, b)` and `(b, a)` are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkKey(String, String);

impl LinkKey {
	pub fn new(a: &str, b: &str) -> Self {
		if a <= b {
			Self(a.to_string(), b.to_string())
		} else {
			Self(b.to_string(), a.to_string())
		}
	}

	pub fn ends(&self) -> (&str, &str) {
		(&self.0, &self.1)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum LinkToggle {
	Created { label: String },
	Removed { label: String },
	Cancelled,
}

/// Field-by-field node edit; `None` leaves the field untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeStylePatch {
	pub hidden_from_players: Option<bool>,
	pub custom_name: Option<String>,
	pub custom_tooltip: Option<String>,
	pub color: Option<String>,
	pub shape: Option<NodeShape>,
	pub size: Option<f64>,
	pub img: Option<String>,
	pub label: Option<String>,
	pub text_color: Option<String>,
	pub tooltip: Option<TooltipStyle>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadReport {
	pub dropped_links: Vec<StoredLink>,
	pub duplicate_nodes: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct GraphModel {
	pub(super) nodes: Vec<Node>,
	pub(super) links: Vec<Link>,
	pub(super) annotations: Vec<Annotation>,
	pub(super) floating_images: Vec<FloatingImage>,
	pub(super) nodes_locked: bool,
	index: HashMap<String, usize>,
}

fn assign_changed<T: PartialEq>(slot: &mut T, value: Option<T>) -> bool {
	match value {
		Some(value) if *slot != value => {
			*slot = value;
			true
		}
		_ => false,
	}
}

impl GraphModel {
	/// Build the live model from its persisted form. Links whose endpoints do
	/// not resolve are dropped and reported; so are self links and repeated
	/// pairs. Later nodes repeating an earlier id are dropped.
	pub fn load(raw: &StoredGraph, center: (f64, f64)) -> (Self, LoadReport) {
		let raw = schema::migrate(raw.clone());
		let mut model = Self {
			nodes_locked: raw.nodes_locked,
			..Self::default()
		};
		let mut report = LoadReport::default();
		let total = raw.nodes.len();

		for (i, stored) in raw.nodes.iter().enumerate() {
			let node = schema::load_node(stored, i, total, center);
			if model.index.contains_key(&node.id) {
				warn!("Network Widget | dropping repeated node id {}", node.id);
				report.duplicate_nodes.push(node.id);
				continue;
			}
			model.index.insert(node.id.clone(), model.nodes.len());
			model.nodes.push(node);
		}

		for stored in &raw.links {
			let ends = (model.index.get(&stored.source), model.index.get(&stored.target));
			match ends {
				(Some(&source), Some(&target))
					if source != target && model.link_between(source, target).is_none() =>
				{
					model.links.push(Link {
						source,
						target,
						label: stored.label.clone(),
					});
				}
				_ => {
					warn!(
						"Network Widget | dropping link {} -> {} (unresolved or repeated)",
						stored.source, stored.target
					);
					report.dropped_links.push(stored.clone());
				}
			}
		}

		model.annotations = raw
			.annotations
			.iter()
			.enumerate()
			.map(|(i, a)| schema::load_annotation(a, i))
			.collect();
		model.floating_images = raw
			.floating_images
			.iter()
			.enumerate()
			.map(|(i, img)| schema::load_floating_image(img, i))
			.collect();

		info!(
			"Network Widget | loaded {} nodes, {} links, {} annotations, {} images",
			model.nodes.len(),
			model.links.len(),
			model.annotations.len(),
			model.floating_images.len()
		);
		(model, report)
	}

	/// Project back to the persisted form. Interaction flags are left at their
	/// defaults; the widget state overlays them.
	pub fn save(&self) -> StoredGraph {
		StoredGraph {
			nodes: self.nodes.iter().map(schema::store_node).collect(),
			links: self
				.links
				.iter()
				.map(|link| StoredLink {
					source: self.nodes[link.source].id.clone(),
					target: self.nodes[link.target].id.clone(),
					label: link.label.clone(),
				})
				.collect(),
			annotations: self.annotations.iter().map(schema::store_annotation).collect(),
			floating_images: self
				.floating_images
				.iter()
				.map(schema::store_floating_image)
				.collect(),
			nodes_locked: self.nodes_locked,
			..StoredGraph::default()
		}
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn links(&self) -> &[Link] {
		&self.links
	}

	pub fn nodes_locked(&self) -> bool {
		self.nodes_locked
	}

	pub fn set_nodes_locked(&mut self, locked: bool) {
		self.nodes_locked = locked;
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.floating_images.is_empty() && self.annotations.is_empty()
	}

	/// Nodes and links borrowed together for a physics step.
	pub fn physics_parts(&mut self) -> (&mut [Node], &[Link]) {
		(&mut self.nodes, &self.links)
	}

	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	pub fn node(&self, id: &str) -> Option<&Node> {
		self.index_of(id).map(|i| &self.nodes[i])
	}

	pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
		self.index_of(id).map(move |i| &mut self.nodes[i])
	}

	pub fn contains_uuid(&self, uuid: &str) -> bool {
		self.nodes.iter().any(|n| n.uuid == uuid)
	}

	pub fn link_key(&self, link: &Link) -> LinkKey {
		LinkKey::new(&self.nodes[link.source].id, &self.nodes[link.target].id)
	}

	fn link_between(&self, a: usize, b: usize) -> Option<usize> {
		self.links.iter().position(|l| {
			(l.source == a && l.target == b) || (l.source == b && l.target == a)
		})
	}

	pub fn find_link(&self, a: &str, b: &str) -> Option<&Link> {
		let (a, b) = (self.index_of(a)?, self.index_of(b)?);
		self.link_between(a, b).map(|i| &self.links[i])
	}

	pub fn add_node(&mut self, node: Node) -> Result<usize, GraphError> {
		if self.index.contains_key(&node.id) {
			return Err(GraphError::DuplicateNode(node.name));
		}
		let idx = self.nodes.len();
		self.index.insert(node.id.clone(), idx);
		self.nodes.push(node);
		Ok(idx)
	}

	/// Remove a node and every link touching it.
	pub fn remove_node(&mut self, id: &str) -> Result<Node, GraphError> {
		let idx = self
			.index_of(id)
			.ok_or_else(|| GraphError::UnknownNode(id.to_string()))?;
		self.links.retain(|l| l.source != idx && l.target != idx);
		for link in &mut self.links {
			if link.source > idx {
				link.source -= 1;
			}
			if link.target > idx {
				link.target -= 1;
			}
		}
		let node = self.nodes.remove(idx);
		self.reindex();
		Ok(node)
	}

	fn reindex(&mut self) {
		self.index = self
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.clone(), i))
			.collect();
	}

	/// Remove the link between `a` and `b` if there is one, otherwise ask for a
	/// label and create it. A cancelled prompt leaves the model untouched.
	pub fn toggle_link(
		&mut self,
		a: &str,
		b: &str,
		label_prompt: impl FnOnce() -> Option<String>,
	) -> Result<LinkToggle, GraphError> {
		let ia = self
			.index_of(a)
			.ok_or_else(|| GraphError::UnknownNode(a.to_string()))?;
		let ib = self
			.index_of(b)
			.ok_or_else(|| GraphError::UnknownNode(b.to_string()))?;
		if ia == ib {
			return Err(GraphError::SelfLink);
		}

		if let Some(existing) = self.link_between(ia, ib) {
			let removed = self.links.remove(existing);
			return Ok(LinkToggle::Removed {
				label: removed.label,
			});
		}

		let Some(label) = label_prompt() else {
			return Ok(LinkToggle::Cancelled);
		};
		let label = match label.trim() {
			"" => schema::DEFAULT_LINK_LABEL.to_string(),
			trimmed => trimmed.to_string(),
		};
		self.links.push(Link {
			source: ia,
			target: ib,
			label: label.clone(),
		});
		Ok(LinkToggle::Created { label })
	}

	pub fn set_link_label(&mut self, key: &LinkKey, label: String) -> Result<bool, GraphError> {
		let idx = self.link_index(key)?;
		Ok(assign_changed(&mut self.links[idx].label, Some(label)))
	}

	pub fn remove_link(&mut self, key: &LinkKey) -> Result<Link, GraphError> {
		let idx = self.link_index(key)?;
		Ok(self.links.remove(idx))
	}

	fn link_index(&self, key: &LinkKey) -> Result<usize, GraphError> {
		let (a, b) = key.ends();
		let unknown = || GraphError::UnknownLink(a.to_string(), b.to_string());
		let (ia, ib) = (
			self.index_of(a).ok_or_else(unknown)?,
			self.index_of(b).ok_or_else(unknown)?,
		);
		self.link_between(ia, ib).ok_or_else(unknown)
	}

	/// Apply a style patch; returns whether anything actually changed.
	pub fn set_node_style(&mut self, id: &str, patch: NodeStylePatch) -> Result<bool, GraphError> {
		let node = self
			.node_mut(id)
			.ok_or_else(|| GraphError::UnknownNode(id.to_string()))?;
		let size = patch.size.filter(|s| s.is_finite() && *s > 0.0);
		let label = patch.label.filter(|l| !l.is_empty()).map(Some);

		let mut changed = false;
		changed |= assign_changed(&mut node.hidden_from_players, patch.hidden_from_players);
		changed |= assign_changed(&mut node.custom_name, patch.custom_name);
		changed |= assign_changed(&mut node.custom_tooltip, patch.custom_tooltip);
		changed |= assign_changed(&mut node.color, patch.color);
		changed |= assign_changed(&mut node.shape, patch.shape);
		changed |= assign_changed(&mut node.size, size);
		changed |= assign_changed(&mut node.img, patch.img);
		changed |= assign_changed(&mut node.tooltip, patch.tooltip);
		if node.is_empty_kind() {
			changed |= assign_changed(&mut node.label, label);
			changed |= assign_changed(&mut node.text_color, patch.text_color.map(Some));
		}
		Ok(changed)
	}

	/// Back to default appearance: visible, no custom name or tooltip, default
	/// colour, circle, default size.
	pub fn reset_node_style(&mut self, id: &str) -> Result<bool, GraphError> {
		let color = self
			.node(id)
			.ok_or_else(|| GraphError::UnknownNode(id.to_string()))?
			.default_color();
		self.set_node_style(
			id,
			NodeStylePatch {
				hidden_from_players: Some(false),
				custom_name: Some(String::new()),
				custom_tooltip: Some(String::new()),
				color: Some(color.to_string()),
				shape: Some(NodeShape::Circle),
				size: Some(schema::NODE_SIZE),
				..NodeStylePatch::default()
			},
		)
	}

	/// Nodes, links and annotations go; floating images stay.
	pub fn clear(&mut self) {
		self.nodes.clear();
		self.links.clear();
		self.annotations.clear();
		self.index.clear();
	}

	/// Swap in a fully validated model in one step.
	pub fn replace_with(&mut self, other: GraphModel) {
		*self = other;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::network_graph::types::StoredNode;
	use pretty_assertions::assert_eq;

	fn doc(id: &str, x: f64) -> Node {
		Node::document(id, id.to_uppercase(), "a.png", DocumentKind::Actor, true, (x, 0.0))
	}

	fn model_with(ids: &[&str]) -> GraphModel {
		let mut model = GraphModel::default();
		for (i, id) in ids.iter().enumerate() {
			model.add_node(doc(id, i as f64 * 50.0)).unwrap();
		}
		model
	}

	#[test]
	fn toggle_link_is_symmetric_and_idempotent() {
		let mut model = model_with(&["a", "b"]);
		let created = model.toggle_link("a", "b", || Some("ally".into())).unwrap();
		assert_eq!(created, LinkToggle::Created { label: "ally".into() });
		assert!(model.find_link("b", "a").is_some());

		let removed = model.toggle_link("b", "a", || Some("ally".into())).unwrap();
		assert_eq!(removed, LinkToggle::Removed { label: "ally".into() });
		assert!(model.links().is_empty());
	}

	#[test]
	fn cancelled_label_prompt_creates_nothing() {
		let mut model = model_with(&["a", "b"]);
		assert_eq!(model.toggle_link("a", "b", || None).unwrap(), LinkToggle::Cancelled);
		assert!(model.links().is_empty());
	}

	#[test]
	fn blank_label_becomes_connected() {
		let mut model = model_with(&["a", "b"]);
		model.toggle_link("a", "b", || Some("  ".into())).unwrap();
		assert_eq!(model.links()[0].label, "Connected");
	}

	#[test]
	fn self_links_and_unknown_nodes_are_rejected() {
		let mut model = model_with(&["a"]);
		assert!(matches!(
			model.toggle_link("a", "a", || Some("x".into())),
			Err(GraphError::SelfLink)
		));
		assert!(matches!(
			model.toggle_link("a", "zz", || Some("x".into())),
			Err(GraphError::UnknownNode(id)) if id == "zz"
		));
	}

	#[test]
	fn removing_a_node_prunes_incident_links_and_reindexes() {
		let mut model = model_with(&["a", "b", "c", "d"]);
		for (x, y) in [("a", "b"), ("b", "c"), ("c", "d"), ("a", "d")] {
			model.toggle_link(x, y, || Some("r".into())).unwrap();
		}
		model.remove_node("b").unwrap();

		assert_eq!(model.nodes().len(), 3);
		assert_eq!(model.links().len(), 2);
		for link in model.links() {
			assert!(link.source < 3 && link.target < 3);
			let key = model.link_key(link);
			assert_ne!(key.ends().0, "b");
			assert_ne!(key.ends().1, "b");
		}
		assert!(model.find_link("c", "d").is_some());
		assert!(model.find_link("a", "d").is_some());
		assert_eq!(model.node("d").map(|n| n.x), Some(150.0));
	}

	#[test]
	fn duplicate_nodes_are_refused() {
		let mut model = model_with(&["a"]);
		assert!(matches!(
			model.add_node(doc("a", 0.0)),
			Err(GraphError::DuplicateNode(_))
		));
	}

	#[test]
	fn style_patch_reports_only_real_changes() {
		let mut model = model_with(&["a"]);
		let unchanged = NodeStylePatch {
			color: Some(schema::DOCUMENT_NODE_COLOR.into()),
			shape: Some(NodeShape::Circle),
			size: Some(schema::NODE_SIZE),
			..Default::default()
		};
		assert!(!model.set_node_style("a", unchanged).unwrap());

		let patch = NodeStylePatch {
			shape: Some(NodeShape::Star),
			size: Some(-4.0),
			..Default::default()
		};
		assert!(model.set_node_style("a", patch).unwrap());
		let node = model.node("a").unwrap();
		assert_eq!(node.shape, NodeShape::Star);
		assert_eq!(node.size, schema::NODE_SIZE);

		assert!(model.reset_node_style("a").unwrap());
		assert_eq!(model.node("a").unwrap().shape, NodeShape::Circle);
	}

	#[test]
	fn label_and_text_colour_only_apply_to_empty_nodes() {
		let mut model = model_with(&["a"]);
		model.add_node(Node::empty("e", "Tavern", (0.0, 0.0))).unwrap();
		let patch = NodeStylePatch {
			label: Some("Inn".into()),
			text_color: Some("#ff0000".into()),
			..Default::default()
		};
		assert!(!model.set_node_style("a", patch.clone()).unwrap());
		assert!(model.set_node_style("e", patch).unwrap());
		let empty = model.node("e").unwrap();
		assert_eq!(empty.label.as_deref(), Some("Inn"));
		assert_eq!(empty.text_color.as_deref(), Some("#ff0000"));
	}

	#[test]
	fn load_drops_dangling_and_repeated_links() {
		let raw = StoredGraph {
			nodes: vec![
				StoredNode {
					id: "a".into(),
					..Default::default()
				},
				StoredNode {
					id: "b".into(),
					..Default::default()
				},
			],
			links: vec![
				StoredLink {
					source: "a".into(),
					target: "b".into(),
					label: "kin".into(),
				},
				StoredLink {
					source: "b".into(),
					target: "a".into(),
					label: "again".into(),
				},
				StoredLink {
					source: "a".into(),
					target: "ghost".into(),
					label: String::new(),
				},
			],
			..Default::default()
		};
		let (model, report) = GraphModel::load(&raw, (400.0, 300.0));
		assert_eq!(model.links().len(), 1);
		assert_eq!(model.links()[0].label, "kin");
		assert_eq!(report.dropped_links.len(), 2);
		assert_eq!(model.save().links.len(), 1);
	}
}

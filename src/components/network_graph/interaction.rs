//! Pointer gestures and the GM's interaction mode.

use super::model::{Node, NodeShape, NodeStylePatch, TooltipStyle};
use super::overlay::{Animation, Border, Corner, FloatingImage, ImageFilter, ImagePatch, Shadow};

/// Screen pixels a press may travel and still count as a click.
pub const CLICK_TOLERANCE: f64 = 3.0;

/// Linking and annotation arrange are exclusive, so they share one enum.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum InteractionMode {
	#[default]
	Idle,
	Linking {
		selected: Option<String>,
	},
	AnnotationArrange,
}

/// Result of clicking a node while linking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkClick {
	Selected(String),
	Deselected(String),
	/// Second node picked; the selection is already cleared.
	Pair(String, String),
	NotLinking,
}

impl InteractionMode {
	/// Persisted flags back to a mode. Linking wins if both are set.
	pub fn from_flags(linking: bool, annotation: bool, selected: Option<String>) -> Self {
		if linking {
			Self::Linking { selected }
		} else if annotation {
			Self::AnnotationArrange
		} else {
			Self::Idle
		}
	}

	/// `(linkingMode, annotationMode, selectedNodeId)`
	pub fn flags(&self) -> (bool, bool, Option<String>) {
		match self {
			Self::Idle => (false, false, None),
			Self::Linking { selected } => (true, false, selected.clone()),
			Self::AnnotationArrange => (false, true, None),
		}
	}

	pub fn is_linking(&self) -> bool {
		matches!(self, Self::Linking { .. })
	}

	pub fn is_arranging(&self) -> bool {
		matches!(self, Self::AnnotationArrange)
	}

	pub fn selected(&self) -> Option<&str> {
		match self {
			Self::Linking { selected } => selected.as_deref(),
			_ => None,
		}
	}

	/// Returns whether linking is now on. Leaving linking drops the selection.
	pub fn toggle_linking(&mut self) -> bool {
		*self = if self.is_linking() {
			Self::Idle
		} else {
			Self::Linking { selected: None }
		};
		self.is_linking()
	}

	pub fn toggle_annotation_arrange(&mut self) -> bool {
		*self = if self.is_arranging() {
			Self::Idle
		} else {
			Self::AnnotationArrange
		};
		self.is_arranging()
	}

	pub fn click_node(&mut self, id: &str) -> LinkClick {
		let Self::Linking { selected } = self else {
			return LinkClick::NotLinking;
		};
		match selected.take() {
			None => {
				*selected = Some(id.to_string());
				LinkClick::Selected(id.to_string())
			}
			Some(first) if first == id => LinkClick::Deselected(first),
			Some(first) => LinkClick::Pair(first, id.to_string()),
		}
	}

	/// Forget a selection that points at a node that no longer exists.
	pub fn forget_node(&mut self, id: &str) {
		if let Self::Linking { selected } = self {
			if selected.as_deref() == Some(id) {
				*selected = None;
			}
		}
	}

	pub fn instructions(&self, is_gm: bool) -> &'static str {
		match self {
			Self::AnnotationArrange => {
				"Annotation Arrange Mode: Click annotations to edit. Drag annotations to reposition. Right-click to delete."
			}
			Self::Linking { .. } => {
				"Linking Mode: Click two nodes to create/remove links between them. Use mouse wheel to zoom."
			}
			Self::Idle if is_gm => {
				"Drag actors, items, journals, scenes, or roll tables here to add them to the network. Click \"Link Mode\" and click two nodes to create/remove links. Click link labels to edit relationship types. Right-click a node or image to edit it. Use mouse wheel to zoom."
			}
			Self::Idle => {
				"View relationships between documents in this network diagram. Use mouse wheel to zoom. Click nodes to open their sheets."
			}
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragTarget {
	Node(String),
	Image(String),
	Handle(String, Corner),
	Annotation(String),
}

impl DragTarget {
	/// Id of the entity whose visual must not be rebuilt mid-drag.
	pub fn entity_id(&self) -> &str {
		match self {
			Self::Node(id) | Self::Image(id) | Self::Handle(id, _) | Self::Annotation(id) => id,
		}
	}
}

/// A press on a draggable element. It is a click until the pointer moves
/// past [`CLICK_TOLERANCE`].
#[derive(Clone, Debug, PartialEq)]
pub struct Drag {
	pub target: DragTarget,
	pub start_screen: (f64, f64),
	/// Element origin in world space when the press began.
	pub origin: (f64, f64),
	/// Last world-space pointer position, for incremental resizes.
	pub last_world: (f64, f64),
	pub start_world: (f64, f64),
	pub moved: bool,
}

impl Drag {
	pub fn new(
		target: DragTarget,
		screen: (f64, f64),
		world: (f64, f64),
		origin: (f64, f64),
	) -> Self {
		Self {
			target,
			start_screen: screen,
			origin,
			last_world: world,
			start_world: world,
			moved: false,
		}
	}

	/// Record a pointer move. Returns true once this press has become a drag.
	pub fn update(&mut self, screen: (f64, f64)) -> bool {
		if !self.moved {
			let (dx, dy) = (screen.0 - self.start_screen.0, screen.1 - self.start_screen.1);
			self.moved = dx * dx + dy * dy > CLICK_TOLERANCE * CLICK_TOLERANCE;
		}
		self.moved
	}

	/// Element origin following the pointer.
	pub fn follow(&self, world: (f64, f64)) -> (f64, f64) {
		(
			self.origin.0 + world.0 - self.start_world.0,
			self.origin.1 + world.1 - self.start_world.1,
		)
	}

	/// World delta since the previous call.
	pub fn step(&mut self, world: (f64, f64)) -> (f64, f64) {
		let delta = (world.0 - self.last_world.0, world.1 - self.last_world.1);
		self.last_world = world;
		delta
	}
}

/// What the link label prompt answer means.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkLabelAnswer {
	Cancel,
	/// Blank answer: ask whether to remove the link.
	ConfirmRemoval,
	Set(String),
}

impl LinkLabelAnswer {
	pub fn from_prompt(answer: Option<String>) -> Self {
		match answer {
			None => Self::Cancel,
			Some(text) if text.trim().is_empty() => Self::ConfirmRemoval,
			Some(text) => Self::Set(text.trim().to_string()),
		}
	}
}

/// Node editor contents. Built from a node, edited as strings, and turned
/// back into a patch that only names fields that differ.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeForm {
	pub hidden_from_players: bool,
	pub custom_name: String,
	pub text_color: String,
	pub color: String,
	pub shape: NodeShape,
	pub size: String,
	pub custom_tooltip: String,
	pub tooltip: TooltipStyle,
	pub img: String,
	pub label: String,
}

impl NodeForm {
	pub fn from_node(node: &Node) -> Self {
		Self {
			hidden_from_players: node.hidden_from_players,
			custom_name: node.custom_name.clone(),
			text_color: node.text_color.clone().unwrap_or_default(),
			color: node.color.clone(),
			shape: node.shape,
			size: node.size.to_string(),
			custom_tooltip: node.custom_tooltip.clone(),
			tooltip: node.tooltip.clone(),
			img: node.img.clone(),
			label: node.label.clone().unwrap_or_default(),
		}
	}

	pub fn to_patch(&self, node: &Node) -> NodeStylePatch {
		fn differs<T: PartialEq + Clone>(new: &T, old: &T) -> Option<T> {
			(new != old).then(|| new.clone())
		}
		let size = self
			.size
			.trim()
			.parse::<f64>()
			.ok()
			.filter(|s| s.is_finite() && *s > 0.0);
		let label_only = node.is_empty_kind();
		NodeStylePatch {
			hidden_from_players: (!label_only)
				.then(|| differs(&self.hidden_from_players, &node.hidden_from_players))
				.flatten(),
			custom_name: differs(&self.custom_name.trim().to_string(), &node.custom_name),
			custom_tooltip: differs(&self.custom_tooltip.trim().to_string(), &node.custom_tooltip),
			color: differs(&self.color, &node.color),
			shape: differs(&self.shape, &node.shape),
			size: size.and_then(|s| differs(&s, &node.size)),
			img: (!label_only)
				.then(|| differs(&self.img.trim().to_string(), &node.img))
				.flatten(),
			label: label_only
				.then(|| {
					let label = self.label.trim().to_string();
					(!label.is_empty())
						.then(|| differs(&Some(label), &node.label).flatten())
						.flatten()
				})
				.flatten(),
			text_color: label_only
				.then(|| differs(&Some(self.text_color.clone()), &node.text_color).flatten())
				.flatten(),
			tooltip: differs(&self.tooltip, &node.tooltip),
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImageForm {
	pub width: String,
	pub filter: ImageFilter,
	pub animation: Animation,
	pub linked_uuid: String,
	pub rotation: String,
	pub opacity: String,
	pub locked: bool,
	pub border: Border,
	pub shadow: Shadow,
}

impl ImageForm {
	pub fn from_image(image: &FloatingImage) -> Self {
		Self {
			width: image.width.to_string(),
			filter: image.filter,
			animation: image.animation,
			linked_uuid: image.linked_uuid.clone(),
			rotation: image.rotation.to_string(),
			opacity: image.opacity.to_string(),
			locked: image.locked,
			border: image.border.clone(),
			shadow: image.shadow.clone(),
		}
	}

	/// Unparseable numbers leave their field untouched.
	pub fn to_patch(&self) -> ImagePatch {
		let number = |raw: &str| raw.trim().parse::<f64>().ok().filter(|v| v.is_finite());
		ImagePatch {
			width: number(&self.width),
			filter: Some(self.filter),
			animation: Some(self.animation),
			linked_uuid: Some(self.linked_uuid.trim().to_string()),
			rotation: number(&self.rotation),
			opacity: number(&self.opacity),
			locked: Some(self.locked),
			border: Some(self.border.clone()),
			shadow: Some(self.shadow.clone()),
		}
	}
}

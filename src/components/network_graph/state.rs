use std::rc::Rc;
use std::sync::{Arc, Mutex};

use log::{error, info, warn};

use super::drop::{self, DropRequest};
use super::error::{DropError, GraphError, ImportError};
use super::host::{DocumentKind, Host, Viewer};
use super::interaction::{
	CLICK_TOLERANCE, Drag, DragTarget, ImageForm, InteractionMode, LinkClick, LinkLabelAnswer,
	NodeForm,
};
use super::layout::{ForceParams, Simulation};
use super::model::{GraphModel, LinkKey, LinkToggle, Node, NodeKind, TooltipStyle};
use super::overlay::Annotation;
use super::persistence::{Store, WidgetDocument};
use super::scene::{DiffStats, Scene, SceneContext};
use super::settings::ColorSettings;
use super::transfer::{self, ImportSummary};
use super::types::StoredGraph;
use super::viewport::{Clock, Transform, Viewport, ZoomCache};
use super::visibility;

pub type SharedZoomCache = Arc<Mutex<ZoomCache>>;

/// Width changes at or below this many units are ignored.
const RESIZE_THRESHOLD: f64 = 10.0;

#[derive(Clone, Debug, PartialEq)]
pub struct WidgetConfig {
	pub document_id: String,
	pub widget_id: String,
	pub viewer: Viewer,
	pub width: f64,
	pub height: f64,
}

/// Collaborators the widget is handed rather than reaching for globals.
#[derive(Clone)]
pub struct Services {
	pub host: Rc<dyn Host>,
	pub store: Rc<dyn Store>,
	pub clock: Rc<dyn Clock>,
	pub zoom_cache: SharedZoomCache,
}

#[derive(Clone, Debug, PartialEq)]
enum Gesture {
	Idle,
	Press { drag: Drag, draggable: bool },
	Label { key: LinkKey, start: (f64, f64) },
	Pan { start: (f64, f64), moved: bool },
}

/// What a right click landed on; the UI opens the matching editor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContextTarget {
	Node(String),
	Image(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
	Preserve,
	Reset,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TooltipView {
	pub text: String,
	pub style: TooltipStyle,
	pub x: f64,
	pub y: f64,
}

pub struct NetworkState {
	pub widget_id: String,
	pub viewer: Viewer,
	pub model: GraphModel,
	pub mode: InteractionMode,
	pub simulation: Simulation,
	pub viewport: Viewport,
	pub scene: Scene,
	pub settings: ColorSettings,
	pub selected_image: Option<String>,
	hover: Option<String>,
	gesture: Gesture,
	host: Rc<dyn Host>,
	clock: Rc<dyn Clock>,
	zoom_cache: SharedZoomCache,
	document: WidgetDocument,
	next_id: u64,
	closed: bool,
}

impl NetworkState {
	pub fn open(config: WidgetConfig, services: Services) -> Self {
		let document = WidgetDocument::new(
			Rc::clone(&services.store),
			&config.document_id,
			&config.widget_id,
		);
		let raw = match document.get() {
			Ok(raw) => raw.unwrap_or_default(),
			Err(e) => {
				error!("Network Widget | could not read {}: {e}", document.key());
				services
					.host
					.notify_error("The saved network could not be read; starting empty.");
				StoredGraph::default()
			}
		};

		let mut viewport = Viewport::new(config.width, config.height);
		let (model, _) = GraphModel::load(&raw, viewport.center());
		let raw = super::schema::migrate(raw);
		let mode = InteractionMode::from_flags(
			raw.linking_mode,
			raw.annotation_mode,
			raw.selected_node_id,
		);
		if let Some(t) = services
			.zoom_cache
			.lock()
			.ok()
			.and_then(|mut cache| cache.take(&config.widget_id, services.clock.now_ms()))
		{
			viewport.apply_transform(t);
		}

		info!(
			"Network Widget | opened {} for {}",
			config.widget_id,
			if config.viewer.is_gm { "GM" } else { "player" }
		);
		let mut state = Self {
			widget_id: config.widget_id,
			viewer: config.viewer,
			simulation: Simulation::new(ForceParams::default(), viewport.center()),
			settings: ColorSettings::load(services.store.as_ref()),
			model,
			mode,
			viewport,
			scene: Scene::default(),
			selected_image: None,
			hover: None,
			gesture: Gesture::Idle,
			host: services.host,
			clock: services.clock,
			zoom_cache: services.zoom_cache,
			document,
			next_id: 0,
			closed: false,
		};
		state.rerender(View::Preserve);
		state
	}

	pub fn is_gm(&self) -> bool {
		self.viewer.is_gm
	}

	pub fn is_closed(&self) -> bool {
		self.closed
	}

	pub fn now_ms(&self) -> f64 {
		self.clock.now_ms()
	}

	fn next_id(&mut self, prefix: &str) -> String {
		self.next_id += 1;
		format!("{prefix}-{}-{}", self.clock.now_ms() as u64, self.next_id)
	}

	fn remember_transform(&self) {
		if let Ok(mut cache) = self.zoom_cache.lock() {
			cache.put(
				&self.widget_id,
				self.viewport.current_transform(),
				self.clock.now_ms(),
			);
		}
	}

	/// Document as it would be persisted right now.
	pub fn stored(&self) -> StoredGraph {
		let (linking_mode, annotation_mode, selected_node_id) = self.mode.flags();
		StoredGraph {
			linking_mode,
			annotation_mode,
			selected_node_id,
			..self.model.save()
		}
	}

	pub fn persist(&mut self) {
		self.remember_transform();
		if let Err(e) = self.document.set(&self.stored()) {
			error!("Network Widget | save failed: {e}");
			self.host
				.notify_error(&format!("Could not save the network: {e}"));
		}
	}

	fn dragging(&self) -> Option<&str> {
		match &self.gesture {
			Gesture::Press {
				drag,
				draggable: true,
			} if drag.moved => Some(drag.target.entity_id()),
			_ => None,
		}
	}

	/// Reconcile the scene with the model, keeping the current pan and zoom
	/// unless asked to reset it.
	pub fn rerender(&mut self, view: View) -> DiffStats {
		let transform = self.viewport.current_transform();
		let selected_node = self.mode.selected().map(str::to_string);
		let dragging = self.dragging().map(str::to_string);
		let ctx = SceneContext {
			is_gm: self.viewer.is_gm,
			selected_node: selected_node.as_deref(),
			selected_image: self.selected_image.as_deref(),
			annotations_draggable: self.viewer.is_gm && self.mode.is_arranging(),
			settings: &self.settings,
			dragging: dragging.as_deref(),
		};
		let stats = self.scene.reconcile(&self.model, &ctx);
		if !stats.is_noop() {
			self.simulation.restart();
		}
		match view {
			View::Preserve => self.viewport.apply_transform(transform),
			View::Reset => self.viewport.apply_transform(Transform::IDENTITY),
		}
		stats
	}

	fn commit(&mut self) {
		self.persist();
		self.rerender(View::Preserve);
	}

	/// One animation frame of physics. Locked nodes do not move.
	pub fn tick(&mut self) -> bool {
		if self.closed || self.model.nodes_locked() {
			return false;
		}
		let (nodes, links) = self.model.physics_parts();
		let moved = self.simulation.tick(nodes, links);
		if moved {
			self.scene.sync_positions(&self.model);
		}
		moved
	}

	/// The canvas always follows the new size; the layout only recentres on
	/// a real width change.
	pub fn resize(&mut self, width: f64, height: f64) {
		let previous = self.viewport.width;
		self.viewport.resize(width, height);
		if (width - previous).abs() <= RESIZE_THRESHOLD {
			return;
		}
		self.simulation.set_center(self.viewport.center());
		self.simulation.restart();
	}

	/// Stop the layout and keep the view for a quick reopen.
	pub fn close(&mut self) {
		if self.closed {
			return;
		}
		self.simulation.stop();
		self.remember_transform();
		self.closed = true;
		info!("Network Widget | closed {}", self.widget_id);
	}

	pub fn instructions(&self) -> &'static str {
		self.mode.instructions(self.viewer.is_gm)
	}

	pub fn tooltip(&self) -> Option<TooltipView> {
		let id = self.hover.as_deref()?;
		let visual = self.scene.nodes.get(id)?;
		let (x, y) = self
			.viewport
			.current_transform()
			.to_screen(visual.x, visual.y - visual.size);
		Some(TooltipView {
			text: visual.tooltip.clone(),
			style: visual.tooltip_style.clone(),
			x,
			y,
		})
	}

	// Pointer input, in canvas pixels.

	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		let world = self.viewport.to_world(sx, sy);
		let gm = self.viewer.is_gm;
		let press = |target: DragTarget, origin: (f64, f64), draggable: bool| Gesture::Press {
			drag: Drag::new(target, (sx, sy), world, origin),
			draggable,
		};

		let handle = self
			.scene
			.handle_at(world.0, world.1)
			.filter(|_| gm)
			.map(|(id, corner)| (id.to_string(), corner));
		if let Some((id, corner)) = handle {
			self.gesture = press(DragTarget::Handle(id, corner), world, true);
			return;
		}
		if gm && self.mode.is_arranging() {
			let hit = self.scene.annotation_at(world.0, world.1).map(str::to_string);
			if let Some(a) = hit.and_then(|id| self.model.annotation(&id).cloned()) {
				self.gesture = press(DragTarget::Annotation(a.id), (a.x, a.y), true);
				return;
			}
		}
		let node = self
			.scene
			.node_at(world.0, world.1)
			.and_then(|id| self.model.node(id));
		if let Some(node) = node {
			let draggable = gm && !self.model.nodes_locked();
			self.gesture = press(DragTarget::Node(node.id.clone()), (node.x, node.y), draggable);
			return;
		}
		if let Some(key) = self.scene.link_label_at(world.0, world.1) {
			self.gesture = Gesture::Label {
				key: key.clone(),
				start: (sx, sy),
			};
			return;
		}
		if let Some(image) = self.model.floating_image_at(world.0, world.1) {
			let draggable = gm && !image.locked;
			let target = DragTarget::Image(image.id.clone());
			self.gesture = press(target, (image.x, image.y), draggable);
			return;
		}
		if self.viewport.begin_pan(sx, sy) {
			self.gesture = Gesture::Pan {
				start: (sx, sy),
				moved: false,
			};
		}
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		let world = self.viewport.to_world(sx, sy);
		match std::mem::replace(&mut self.gesture, Gesture::Idle) {
			Gesture::Press {
				mut drag,
				draggable,
			} => {
				let was_moving = drag.moved;
				if drag.update((sx, sy)) && draggable {
					if !was_moving {
						self.begin_drag(&drag.target);
					}
					self.drag_to(&mut drag, world);
				}
				self.gesture = Gesture::Press { drag, draggable };
			}
			label @ Gesture::Label { .. } => self.gesture = label,
			Gesture::Pan { start, moved } => {
				self.viewport.pan_to(sx, sy);
				let (dx, dy) = (sx - start.0, sy - start.1);
				self.gesture = Gesture::Pan {
					start,
					moved: moved || dx * dx + dy * dy > CLICK_TOLERANCE * CLICK_TOLERANCE,
				};
			}
			Gesture::Idle => {
				self.hover = self.scene.node_at(world.0, world.1).map(str::to_string);
			}
		}
	}

	fn begin_drag(&mut self, target: &DragTarget) {
		self.viewport.panning_enabled = false;
		self.hover = None;
		if let DragTarget::Node(id) = target {
			let alpha_target = self.simulation.params.drag_alpha_target;
			self.simulation.set_alpha_target(alpha_target);
			if let Some(node) = self.model.node_mut(id) {
				node.pin = Some((node.x, node.y));
			}
		}
	}

	fn drag_to(&mut self, drag: &mut Drag, world: (f64, f64)) {
		let delta = drag.step(world);
		let result = match &drag.target {
			DragTarget::Node(id) => {
				let (x, y) = drag.follow(world);
				if let Some(node) = self.model.node_mut(id) {
					node.pin = Some((x, y));
					node.x = x;
					node.y = y;
				}
				self.scene.sync_positions(&self.model);
				Ok(())
			}
			DragTarget::Image(id) => self.model.move_floating_image(id, drag.follow(world)),
			DragTarget::Handle(id, corner) => self.model.resize_floating_image(id, *corner, delta),
			DragTarget::Annotation(id) => {
				let r = self.model.move_annotation(id, drag.follow(world));
				if let Some(a) = self.model.annotation(id) {
					self.scene.move_annotation(id, a.note_position());
				}
				r
			}
		};
		if let DragTarget::Image(id) | DragTarget::Handle(id, _) = &drag.target {
			if let Some(image) = self.model.floating_image(id) {
				self.scene.move_image(id, image);
			}
		}
		if let Err(e) = result {
			warn!("Network Widget | drag target vanished: {e}");
		}
	}

	fn end_drag(&mut self, target: &DragTarget) {
		if let DragTarget::Node(id) = target {
			self.simulation.set_alpha_target(0.0);
			if let Some(node) = self.model.node_mut(id) {
				if let Some((x, y)) = node.pin.take() {
					node.x = x;
					node.y = y;
				}
			}
		}
		self.viewport.panning_enabled = true;
		self.persist();
		self.rerender(View::Preserve);
	}

	pub fn pointer_up(&mut self, sx: f64, sy: f64) {
		match std::mem::replace(&mut self.gesture, Gesture::Idle) {
			Gesture::Press { drag, draggable } if drag.moved => {
				if draggable {
					self.end_drag(&drag.target);
				}
			}
			Gesture::Press { drag, .. } => self.click(&drag.target),
			Gesture::Label { key, start } => {
				let (dx, dy) = (sx - start.0, sy - start.1);
				if dx * dx + dy * dy <= CLICK_TOLERANCE * CLICK_TOLERANCE {
					self.edit_link_label(&key);
				}
			}
			Gesture::Pan { moved, .. } => {
				self.viewport.end_pan();
				if !moved && self.selected_image.take().is_some() {
					self.rerender(View::Preserve);
				}
			}
			Gesture::Idle => {}
		}
	}

	/// Pointer left the canvas: finish whatever was in progress.
	pub fn pointer_leave(&mut self) {
		match std::mem::replace(&mut self.gesture, Gesture::Idle) {
			Gesture::Press {
				drag,
				draggable: true,
			} if drag.moved => self.end_drag(&drag.target),
			Gesture::Pan { .. } => self.viewport.end_pan(),
			_ => {}
		}
		self.hover = None;
	}

	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		self.viewport.zoom_about(sx, sy, factor);
	}

	fn click(&mut self, target: &DragTarget) {
		match target {
			DragTarget::Node(id) => self.click_node(id),
			DragTarget::Image(id) => self.click_image(id),
			DragTarget::Annotation(id) => self.edit_annotation(id),
			DragTarget::Handle(..) => {}
		}
	}

	pub fn context_menu(&mut self, sx: f64, sy: f64) -> Option<ContextTarget> {
		if !self.viewer.is_gm {
			return None;
		}
		let (wx, wy) = self.viewport.to_world(sx, sy);
		if self.mode.is_arranging() {
			if let Some(id) = self.scene.annotation_at(wx, wy).map(str::to_string) {
				self.delete_annotation(&id);
				return None;
			}
		}
		if let Some(id) = self.scene.node_at(wx, wy) {
			return Some(ContextTarget::Node(id.to_string()));
		}
		self.model
			.floating_image_at(wx, wy)
			.map(|img| ContextTarget::Image(img.id.clone()))
	}

	fn display_name(&self, id: &str) -> String {
		self.model
			.node(id)
			.map(|n| visibility::display_name(n, self.viewer.is_gm).to_string())
			.unwrap_or_else(|| id.to_string())
	}

	pub fn click_node(&mut self, id: &str) {
		if !self.viewer.is_gm || !self.mode.is_linking() {
			if self.model.node(id).is_some_and(|n| !n.is_empty_kind()) {
				self.open_node(id);
			}
			return;
		}
		match self.mode.click_node(id) {
			LinkClick::Selected(id) => {
				let name = self.display_name(&id);
				self.host
					.notify_info(&format!("Selected {name}. Click another node to link/unlink."));
			}
			LinkClick::Deselected(_) => self.host.notify_info("Node deselected."),
			LinkClick::Pair(a, b) => {
				if let Err(e) = self.toggle_link(&a, &b) {
					warn!("Network Widget | link toggle failed: {e}");
					self.host.notify_warn(&e.to_string());
				}
			}
			LinkClick::NotLinking => return,
		}
		self.commit();
	}

	pub fn toggle_link(&mut self, a: &str, b: &str) -> Result<LinkToggle, GraphError> {
		let (name_a, name_b) = (self.display_name(a), self.display_name(b));
		let host = Rc::clone(&self.host);
		let message = format!("Relationship between {name_a} and {name_b}:");
		let outcome = self
			.model
			.toggle_link(a, b, || host.prompt_text(&message, ""))?;
		match &outcome {
			LinkToggle::Created { label } => {
				info!("Network Widget | linked {a} and {b} ({label})");
				host.notify_info(&format!("Linked {name_a} and {name_b} as \"{label}\"."));
			}
			LinkToggle::Removed { .. } => {
				info!("Network Widget | unlinked {a} and {b}");
				host.notify_info(&format!("Removed link between {name_a} and {name_b}."));
			}
			LinkToggle::Cancelled => {}
		}
		Ok(outcome)
	}

	pub fn open_node(&mut self, id: &str) {
		let Some(node) = self.model.node(id) else {
			return;
		};
		if node.is_empty_kind() {
			return;
		}
		if !visibility::should_show_content(node, self.viewer.is_gm) {
			warn!("Network Widget | {} may not open {id}", self.viewer.user_id);
			self.host
				.notify_warn("You don't have permission to view this document.");
			return;
		}
		self.host.open_document_view(&node.uuid, &node_document_kind(node));
	}

	pub fn edit_link_label(&mut self, key: &LinkKey) {
		if !self.viewer.is_gm {
			return;
		}
		let Some(current) = self
			.model
			.find_link(key.ends().0, key.ends().1)
			.map(|l| l.label.clone())
		else {
			return;
		};
		let (a, b) = (self.display_name(key.ends().0), self.display_name(key.ends().1));
		let answer = self
			.host
			.prompt_text(&format!("Relationship between {a} and {b}:"), &current);
		let changed = match LinkLabelAnswer::from_prompt(answer) {
			LinkLabelAnswer::Cancel => false,
			LinkLabelAnswer::ConfirmRemoval => {
				self.host
					.prompt_confirm(&format!("Remove the link between {a} and {b}?"))
					&& self.model.remove_link(key).is_ok()
			}
			LinkLabelAnswer::Set(label) => self.model.set_link_label(key, label).unwrap_or(false),
		};
		if changed {
			self.commit();
		}
	}

	pub fn apply_node_form(&mut self, id: &str, form: &NodeForm) -> Result<bool, GraphError> {
		let node = self
			.model
			.node(id)
			.ok_or_else(|| GraphError::UnknownNode(id.to_string()))?;
		let patch = form.to_patch(node);
		let changed = self.model.set_node_style(id, patch)?;
		if changed {
			self.commit();
		}
		Ok(changed)
	}

	pub fn reset_node(&mut self, id: &str) -> Result<bool, GraphError> {
		let name = self.display_name(id);
		if !self
			.host
			.prompt_confirm(&format!("Reset {name} to its default appearance?"))
		{
			return Ok(false);
		}
		let changed = self.model.reset_node_style(id)?;
		if changed {
			self.commit();
		}
		Ok(changed)
	}

	pub fn remove_node(&mut self, id: &str) -> Result<bool, GraphError> {
		let name = self.display_name(id);
		if !self
			.host
			.prompt_confirm(&format!("Remove {name} from the network?"))
		{
			return Ok(false);
		}
		self.model.remove_node(id)?;
		self.mode.forget_node(id);
		if self.hover.as_deref() == Some(id) {
			self.hover = None;
		}
		self.host
			.notify_info(&format!("Removed {name} from the network."));
		self.commit();
		Ok(true)
	}

	pub fn click_image(&mut self, id: &str) {
		let Some(image) = self.model.floating_image(id) else {
			return;
		};
		if !image.linked_uuid.is_empty() {
			match self.host.resolve_by_identifier(&image.linked_uuid) {
				Some(doc) => self.host.open_document_view(&doc.uuid, &doc.kind),
				None => self
					.host
					.notify_warn("Linked document not found or cannot be opened."),
			}
			return;
		}
		if self.viewer.is_gm {
			self.selected_image = Some(id.to_string());
			self.rerender(View::Preserve);
		}
	}

	pub fn apply_image_form(&mut self, id: &str, form: &ImageForm) -> Result<bool, GraphError> {
		let changed = self.model.set_floating_image_style(id, form.to_patch())?;
		if changed {
			self.commit();
		}
		Ok(changed)
	}

	pub fn delete_image(&mut self, id: &str) -> Result<(), GraphError> {
		self.model.remove_floating_image(id)?;
		if self.selected_image.as_deref() == Some(id) {
			self.selected_image = None;
		}
		self.commit();
		Ok(())
	}

	pub fn send_image_to_front(&mut self, id: &str) -> Result<(), GraphError> {
		self.model.send_to_front(id)?;
		self.commit();
		Ok(())
	}

	pub fn send_image_to_back(&mut self, id: &str) -> Result<(), GraphError> {
		self.model.send_to_back(id)?;
		self.commit();
		Ok(())
	}

	pub fn toggle_image_lock(&mut self, id: &str) -> Result<bool, GraphError> {
		let locked = self.model.toggle_image_lock(id)?;
		self.host.notify_info(if locked {
			"Image locked."
		} else {
			"Image unlocked."
		});
		self.commit();
		Ok(locked)
	}

	// Toolbar commands.

	pub fn toggle_linking(&mut self) {
		if !self.viewer.is_gm {
			return;
		}
		let on = self.mode.toggle_linking();
		info!("Network Widget | linking mode {}", if on { "on" } else { "off" });
		self.host.notify_info(if on {
			"Linking mode enabled. Click two nodes to link/unlink them."
		} else {
			"Linking mode disabled."
		});
		self.commit();
	}

	pub fn toggle_annotation_arrange(&mut self) {
		if !self.viewer.is_gm {
			return;
		}
		let on = self.mode.toggle_annotation_arrange();
		info!(
			"Network Widget | annotation arrange mode {}",
			if on { "on" } else { "off" }
		);
		self.commit();
	}

	pub fn toggle_nodes_locked(&mut self) {
		if !self.viewer.is_gm {
			return;
		}
		let locked = !self.model.nodes_locked();
		self.model.set_nodes_locked(locked);
		if !locked {
			self.simulation.restart();
		}
		self.host.notify_info(if locked {
			"Nodes locked in place."
		} else {
			"Nodes unlocked."
		});
		self.persist();
	}

	pub fn add_empty_node(&mut self) -> Option<String> {
		if !self.viewer.is_gm {
			return None;
		}
		let label = self
			.host
			.prompt_text("Label for the new node:", "")
			.map(|l| l.trim().to_string())
			.filter(|l| !l.is_empty())?;
		let id = self.next_id("empty");
		let node = Node::empty(id.clone(), label.clone(), self.viewport.world_center());
		if let Err(e) = self.model.add_node(node) {
			self.host.notify_warn(&e.to_string());
			return None;
		}
		self.host
			.notify_info(&format!("Added \"{label}\" to the network."));
		self.commit();
		Some(id)
	}

	pub fn create_annotation(&mut self) -> Option<String> {
		if !self.viewer.is_gm {
			return None;
		}
		let title = self.host.prompt_text("Annotation title:", "")?;
		let label = self.host.prompt_text("Annotation description:", "")?;
		let (title, label) = (title.trim().to_string(), label.trim().to_string());
		if title.is_empty() && label.is_empty() {
			return None;
		}
		let id = self.next_id("annotation");
		self.model.add_annotation(Annotation::new(
			id.clone(),
			self.viewport.world_center(),
			title,
			label,
		));
		self.commit();
		Some(id)
	}

	pub fn edit_annotation(&mut self, id: &str) {
		let Some(current) = self.model.annotation(id).cloned() else {
			return;
		};
		let Some(title) = self.host.prompt_text("Annotation title:", &current.title) else {
			return;
		};
		let Some(label) = self
			.host
			.prompt_text("Annotation description:", &current.label)
		else {
			return;
		};
		let changed = self
			.model
			.set_annotation_text(id, title.trim().to_string(), label.trim().to_string())
			.unwrap_or(false);
		if changed {
			self.commit();
		}
	}

	pub fn delete_annotation(&mut self, id: &str) {
		if !self.host.prompt_confirm("Delete this annotation?") {
			return;
		}
		if self.model.remove_annotation(id).is_ok() {
			self.commit();
		}
	}

	pub fn clear_all(&mut self) -> bool {
		if !self.viewer.is_gm
			|| !self
				.host
				.prompt_confirm("Remove every node, link and annotation from this network?")
		{
			return false;
		}
		self.model.clear();
		if self.mode.is_linking() {
			self.mode = InteractionMode::Linking { selected: None };
		}
		self.hover = None;
		self.persist();
		self.rerender(View::Reset);
		self.host.notify_info("Network cleared.");
		true
	}

	pub fn reset_zoom(&mut self) {
		let circles: Vec<_> = self
			.model
			.nodes()
			.iter()
			.map(|n| (n.x, n.y, n.size))
			.collect();
		self.viewport.reset_to_fit(circles);
	}

	pub fn export_json(&self) -> Result<String, serde_json::Error> {
		transfer::export_json(&self.model, self.clock.now_ms())
	}

	/// Validate the whole payload, confirm, then replace the model in one
	/// step. Any failure leaves the current network untouched.
	pub fn import_json(&mut self, text: &str) -> Result<ImportSummary, ImportError> {
		let graph = transfer::parse_import(text)?;
		let summary = ImportSummary::of(&graph);
		if !self.host.prompt_confirm(&summary.confirmation()) {
			return Err(ImportError::Declined);
		}
		let (model, report) = GraphModel::load(&graph, self.viewport.center());
		if !report.dropped_links.is_empty() {
			warn!(
				"Network Widget | import dropped {} unresolved links",
				report.dropped_links.len()
			);
		}
		let locked = self.model.nodes_locked();
		self.model.replace_with(model);
		self.model.set_nodes_locked(locked);
		if self.mode.is_linking() {
			self.mode = InteractionMode::Linking { selected: None };
		}
		self.selected_image = None;
		self.hover = None;
		self.commit();
		info!(
			"Network Widget | imported {} nodes, {} links",
			summary.nodes, summary.links
		);
		self.host.notify_info(&format!(
			"Imported {} nodes, {} links and {} floating images.",
			summary.nodes, summary.links, summary.floating_images
		));
		Ok(summary)
	}

	/// Handle `text/plain` drag data dropped at a canvas point.
	pub fn drop_data(&mut self, text: &str, sx: f64, sy: f64) -> Result<(), DropError> {
		if !self.viewer.is_gm {
			return Ok(());
		}
		let world = self.viewport.to_world(sx, sy);
		match drop::parse_drop(text) {
			Ok(DropRequest::Image { href }) => {
				let id = self.next_id("floating-img");
				self.model.add_floating_image(id.clone(), href, world);
				self.selected_image = Some(id);
				self.commit();
				Ok(())
			}
			Ok(DropRequest::Document { uuid, .. }) => {
				let node = drop::node_for_document(
					self.host.as_ref(),
					&self.viewer,
					&self.model,
					&uuid,
					world,
				)
				.inspect_err(|e| self.report_drop_error(e))?;
				let name = node.name.clone();
				if let Err(e) = self.model.add_node(node) {
					let e = DropError::AlreadyPresent(e.to_string());
					self.report_drop_error(&e);
					return Err(e);
				}
				self.host
					.notify_info(&format!("Added {name} to the network."));
				self.commit();
				Ok(())
			}
			Err(e) => {
				self.report_drop_error(&e);
				Err(e)
			}
		}
	}

	fn report_drop_error(&self, e: &DropError) {
		warn!("Network Widget | drop ignored: {e}");
		match e {
			DropError::Unparseable(_) | DropError::MissingUuid => {}
			DropError::UnsupportedKind(_) => self.host.notify_warn(
				"Only Actor, Item, JournalEntry, JournalEntryPage, RollTable, Scene can be dropped \
				 onto the network.",
			),
			DropError::DocumentNotFound(_) => self
				.host
				.notify_error("Could not find the dropped document."),
			DropError::AlreadyPresent(_) => self.host.notify_warn(&e.to_string()),
		}
	}
}

fn node_document_kind(node: &Node) -> DocumentKind {
	match &node.kind {
		NodeKind::Document(kind) => kind.clone(),
		NodeKind::Empty => DocumentKind::Unknown,
	}
}

//! Retained, keyed description of everything drawn on the canvas. Each
//! re-render reconciles the scene against the model (enter, update, exit by
//! entity id) so visuals that did not change are left alone; physics ticks
//! only move positions.

use std::f64::consts::PI;
use std::hash::Hash;

use indexmap::IndexMap;

use super::model::{GraphModel, LinkKey, Node, NodeShape, TooltipStyle};
use super::overlay::{Animation, Border, Corner, FloatingImage};
use super::settings::ColorSettings;
use super::visibility::{self, Mask, Stroke};

pub const HANDLE_SIZE: f64 = 10.0;
pub const LINK_WIDTH: f64 = 2.0;
pub const LINK_LABEL_FONT: f64 = 12.0;
pub const HIGHLIGHT_COLOR: &str = "#ff6b6b";
const HIGHLIGHT_IMAGE_FILTER: &str = "brightness(0.7) sepia(1) hue-rotate(-30deg) saturate(6)";

#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
	Circle { r: f64 },
	/// Axis aligned square centred on the origin.
	Square { half: f64 },
	Polygon(Vec<(f64, f64)>),
}

/// Ten points alternating outer and inner radius, first point straight up.
pub fn star_points(outer: f64) -> Vec<(f64, f64)> {
	let inner = outer * 0.4;
	(0..10)
		.map(|i| {
			let r = if i % 2 == 0 { outer } else { inner };
			let angle = i as f64 * PI / 5.0 - PI / 2.0;
			(r * angle.cos(), r * angle.sin())
		})
		.collect()
}

pub fn outline(shape: NodeShape, r: f64) -> Geometry {
	match shape {
		NodeShape::Circle => Geometry::Circle { r },
		NodeShape::Square => Geometry::Square { half: r },
		NodeShape::Diamond => Geometry::Polygon(vec![(0.0, -r), (r, 0.0), (0.0, r), (-r, 0.0)]),
		NodeShape::Star => Geometry::Polygon(star_points(r)),
	}
}

/// Side of the square the node image is drawn into.
pub fn image_size(shape: NodeShape, size: f64) -> f64 {
	match shape {
		NodeShape::Star => size * 1.5,
		NodeShape::Diamond | NodeShape::Circle | NodeShape::Square => size * 1.8,
	}
}

pub fn clip_id(node_id: &str, shape: NodeShape) -> String {
	format!("node-clip-{node_id}-{}", shape.as_str())
}

/// Colour filter and drop shadow composed into one CSS filter chain.
pub fn combined_filter(image: &FloatingImage) -> Option<String> {
	let shadow = image.shadow.enabled.then(|| {
		format!(
			"drop-shadow({}px {}px {}px {})",
			image.shadow.offset_x, image.shadow.offset_y, image.shadow.blur, image.shadow.color
		)
	});
	let parts: Vec<String> = image
		.filter
		.css()
		.map(str::to_string)
		.into_iter()
		.chain(shadow)
		.collect();
	(!parts.is_empty()).then(|| parts.join(" "))
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeImage {
	pub href: String,
	pub size: f64,
	pub clip_id: String,
	pub clip: Geometry,
	pub filter: Option<&'static str>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Label {
	pub text: String,
	pub dy: f64,
	pub font_size: f64,
	pub color: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeVisual {
	pub x: f64,
	pub y: f64,
	pub size: f64,
	pub outline: Geometry,
	pub fill: String,
	pub stroke: Stroke,
	pub image: Option<NodeImage>,
	/// Placeholder disc and glyph shown instead of the image.
	pub mask: Option<(Mask, f64)>,
	pub label: Label,
	pub tooltip: String,
	pub tooltip_style: TooltipStyle,
	pub highlighted: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinkVisual {
	pub from: (f64, f64),
	pub to: (f64, f64),
	pub label: String,
	/// GM-only placeholder text for an unlabelled link.
	pub placeholder: bool,
	pub color: String,
	pub outline: String,
	pub clickable: bool,
}

impl LinkVisual {
	pub fn midpoint(&self) -> (f64, f64) {
		((self.from.0 + self.to.0) / 2.0, (self.from.1 + self.to.1) / 2.0)
	}

	/// Approximate world-space box of the midpoint label.
	pub fn label_box(&self) -> (f64, f64, f64, f64) {
		let (mx, my) = self.midpoint();
		let half = self.label.chars().count() as f64 * LINK_LABEL_FONT * 0.3 + 4.0;
		(mx - half, my - 5.0 - LINK_LABEL_FONT, mx + half, my - 5.0 + 4.0)
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Handle {
	pub corner: Corner,
	pub x: f64,
	pub y: f64,
}

impl Handle {
	pub fn contains(&self, wx: f64, wy: f64) -> bool {
		(wx - self.x).abs() <= HANDLE_SIZE / 2.0 && (wy - self.y).abs() <= HANDLE_SIZE / 2.0
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImageVisual {
	pub href: String,
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
	pub rotation: f64,
	/// 0..=1
	pub opacity: f64,
	pub filter: Option<String>,
	pub border: Option<Border>,
	pub animation: Animation,
	pub handles: Vec<Handle>,
	pub selected: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationVisual {
	pub x: f64,
	pub y: f64,
	pub title: String,
	pub label: String,
	pub draggable: bool,
}

/// What the current render is for.
#[derive(Clone, Debug)]
pub struct SceneContext<'a> {
	pub is_gm: bool,
	pub selected_node: Option<&'a str>,
	pub selected_image: Option<&'a str>,
	pub annotations_draggable: bool,
	pub settings: &'a ColorSettings,
	/// Entity being dragged; its visual is left as it is.
	pub dragging: Option<&'a str>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiffStats {
	pub entered: usize,
	pub updated: usize,
	pub unchanged: usize,
	pub exited: usize,
}

impl DiffStats {
	pub fn is_noop(&self) -> bool {
		self.entered == 0 && self.updated == 0 && self.exited == 0
	}
}

fn reconcile_layer<K, V>(
	layer: &mut IndexMap<K, V>,
	fresh: impl IntoIterator<Item = (K, V)>,
	held: impl Fn(&K) -> bool,
	stats: &mut DiffStats,
) where
	K: Hash + Eq,
	V: PartialEq,
{
	let mut next = IndexMap::with_capacity(layer.len());
	for (key, visual) in fresh {
		match layer.swap_remove(&key) {
			None => {
				stats.entered += 1;
				next.insert(key, visual);
			}
			Some(old) if held(&key) || old == visual => {
				stats.unchanged += 1;
				next.insert(key, old);
			}
			Some(_) => {
				stats.updated += 1;
				next.insert(key, visual);
			}
		}
	}
	stats.exited += layer.len();
	*layer = next;
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
	pub nodes: IndexMap<String, NodeVisual>,
	pub links: IndexMap<LinkKey, LinkVisual>,
	/// Bottom to top.
	pub images: IndexMap<String, ImageVisual>,
	pub annotations: IndexMap<String, AnnotationVisual>,
}

impl Scene {
	pub fn reconcile(&mut self, model: &GraphModel, ctx: &SceneContext<'_>) -> DiffStats {
		let mut stats = DiffStats::default();
		let held = |key: &String| ctx.dragging == Some(key.as_str());

		let images = model
			.images_by_z()
			.into_iter()
			.map(|img| (img.id.clone(), image_visual(img, ctx)));
		reconcile_layer(&mut self.images, images, held, &mut stats);

		let links = model.links().iter().map(|link| {
			let (s, t) = (&model.nodes()[link.source], &model.nodes()[link.target]);
			let placeholder = link.label.is_empty() && ctx.is_gm;
			let visual = LinkVisual {
				from: (s.x, s.y),
				to: (t.x, t.y),
				label: if placeholder {
					"Click to label".to_string()
				} else {
					link.label.clone()
				},
				placeholder,
				color: ctx.settings.link_color.clone(),
				outline: ctx.settings.link_label_outline.clone(),
				clickable: ctx.is_gm,
			};
			(model.link_key(link), visual)
		});
		reconcile_layer(&mut self.links, links, |_| false, &mut stats);

		let nodes = model
			.nodes()
			.iter()
			.map(|node| (node.id.clone(), node_visual(node, ctx)));
		reconcile_layer(&mut self.nodes, nodes, held, &mut stats);

		let annotations = model.annotations().iter().map(|a| {
			let (x, y) = a.note_position();
			let visual = AnnotationVisual {
				x,
				y,
				title: a.title.clone(),
				label: a.label.clone(),
				draggable: ctx.annotations_draggable,
			};
			(a.id.clone(), visual)
		});
		reconcile_layer(&mut self.annotations, annotations, held, &mut stats);

		stats
	}

	/// Copy node positions and link endpoints from the model. This is all a
	/// physics tick touches.
	pub fn sync_positions(&mut self, model: &GraphModel) {
		for node in model.nodes() {
			if let Some(visual) = self.nodes.get_mut(&node.id) {
				visual.x = node.x;
				visual.y = node.y;
			}
		}
		for link in model.links() {
			if let Some(visual) = self.links.get_mut(&model.link_key(link)) {
				let (s, t) = (&model.nodes()[link.source], &model.nodes()[link.target]);
				visual.from = (s.x, s.y);
				visual.to = (t.x, t.y);
			}
		}
	}

	/// Move a dragged image's visual without a full reconcile.
	pub fn move_image(&mut self, id: &str, image: &FloatingImage) {
		if let Some(visual) = self.images.get_mut(id) {
			visual.x = image.x;
			visual.y = image.y;
			visual.width = image.width;
			visual.height = image.height;
			if !visual.handles.is_empty() {
				visual.handles = handles(image);
			}
		}
	}

	pub fn move_annotation(&mut self, id: &str, (x, y): (f64, f64)) {
		if let Some(visual) = self.annotations.get_mut(id) {
			visual.x = x;
			visual.y = y;
		}
	}

	/// Topmost node whose shape radius covers the world point.
	pub fn node_at(&self, wx: f64, wy: f64) -> Option<&str> {
		self.nodes
			.iter()
			.rev()
			.find(|(_, v)| (v.x - wx).powi(2) + (v.y - wy).powi(2) <= v.size * v.size)
			.map(|(id, _)| id.as_str())
	}

	pub fn link_label_at(&self, wx: f64, wy: f64) -> Option<&LinkKey> {
		self.links
			.iter()
			.rev()
			.filter(|(_, v)| v.clickable && !v.label.is_empty())
			.find(|(_, v)| {
				let (x0, y0, x1, y1) = v.label_box();
				(x0..=x1).contains(&wx) && (y0..=y1).contains(&wy)
			})
			.map(|(key, _)| key)
	}

	pub fn handle_at(&self, wx: f64, wy: f64) -> Option<(&str, Corner)> {
		self.images.iter().rev().find_map(|(id, v)| {
			v.handles
				.iter()
				.find(|h| h.contains(wx, wy))
				.map(|h| (id.as_str(), h.corner))
		})
	}

	/// Annotation whose title or label line is under the world point.
	pub fn annotation_at(&self, wx: f64, wy: f64) -> Option<&str> {
		self.annotations
			.iter()
			.rev()
			.find(|(_, v)| {
				let width = v.title.chars().count().max(v.label.chars().count()) as f64 * 7.0;
				(v.x..=v.x + width.max(20.0)).contains(&wx)
					&& (v.y - 16.0..=v.y + 20.0).contains(&wy)
			})
			.map(|(id, _)| id.as_str())
	}
}

fn handles(image: &FloatingImage) -> Vec<Handle> {
	Corner::ALL
		.into_iter()
		.map(|corner| {
			let (x, y) = image.corner(corner);
			Handle { corner, x, y }
		})
		.collect()
}

fn image_visual(image: &FloatingImage, ctx: &SceneContext<'_>) -> ImageVisual {
	let selected = ctx.is_gm && ctx.selected_image == Some(image.id.as_str());
	ImageVisual {
		href: image.href.clone(),
		x: image.x,
		y: image.y,
		width: image.width,
		height: image.height,
		rotation: image.rotation,
		opacity: image.opacity / 100.0,
		filter: combined_filter(image),
		border: (image.border.width > 0.0).then(|| image.border.clone()),
		animation: image.animation,
		handles: if selected && !image.locked {
			handles(image)
		} else {
			Vec::new()
		},
		selected,
	}
}

fn node_visual(node: &Node, ctx: &SceneContext<'_>) -> NodeVisual {
	let is_gm = ctx.is_gm;
	let highlighted = ctx.selected_node == Some(node.id.as_str());
	let mut fill = visibility::fill_color(node, is_gm).to_string();
	let mut stroke = visibility::stroke(node, is_gm);
	if highlighted {
		if node.is_empty_kind() {
			fill = HIGHLIGHT_COLOR.to_string();
			stroke = Stroke {
				color: "#a10000",
				width: 5.0,
			};
		} else {
			stroke = Stroke {
				color: HIGHLIGHT_COLOR,
				width: 4.0,
			};
		}
	}

	let side = image_size(node.shape, node.size);
	let mask = visibility::mask(node, is_gm);
	let shows_image = !node.is_empty_kind() && mask.is_none() && !node.img.is_empty();
	let image = shows_image.then(|| NodeImage {
		href: node.img.clone(),
		size: side,
		clip_id: clip_id(&node.id, node.shape),
		clip: outline(node.shape, side / 2.0),
		filter: highlighted.then_some(HIGHLIGHT_IMAGE_FILTER),
	});

	let label = if node.is_empty_kind() {
		Label {
			text: visibility::label_text(node, is_gm).to_string(),
			dy: 4.0,
			font_size: 16.0,
			color: node
				.text_color
				.clone()
				.unwrap_or_else(|| ctx.settings.node_label_color.clone()),
		}
	} else {
		Label {
			text: visibility::label_text(node, is_gm).to_string(),
			dy: node.size + 15.0,
			font_size: 12.0,
			color: ctx.settings.node_label_color.clone(),
		}
	};

	NodeVisual {
		x: node.x,
		y: node.y,
		size: node.size,
		outline: outline(node.shape, node.size),
		fill,
		stroke,
		image,
		mask: mask.map(|m| (m, side / 2.0)),
		label,
		tooltip: visibility::tooltip(node, is_gm).to_string(),
		tooltip_style: node.tooltip.clone(),
		highlighted,
	}
}

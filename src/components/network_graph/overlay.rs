//! Layers that live beside the graph topology: floating images underneath
//! the nodes and free text annotations above them.

use std::f64::consts::PI;

use super::error::GraphError;
use super::model::GraphModel;

pub const IMAGE_DEFAULT_SIZE: f64 = 100.0;
pub const IMAGE_MIN_SIZE: f64 = 20.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImageFilter {
	#[default]
	None,
	Grayscale,
	Sepia,
	Blur,
	Brighten,
	HighContrast,
	Invert,
}

impl ImageFilter {
	pub const ALL: [ImageFilter; 7] = [
		Self::None,
		Self::Grayscale,
		Self::Sepia,
		Self::Blur,
		Self::Brighten,
		Self::HighContrast,
		Self::Invert,
	];

	/// Stored as the CSS filter function it applies.
	pub fn parse(raw: &str) -> Self {
		Self::ALL
			.into_iter()
			.find(|f| f.css() == Some(raw))
			.unwrap_or_default()
	}

	pub fn css(self) -> Option<&'static str> {
		match self {
			Self::None => None,
			Self::Grayscale => Some("grayscale(1)"),
			Self::Sepia => Some("sepia(1)"),
			Self::Blur => Some("blur(3px)"),
			Self::Brighten => Some("brightness(1.5)"),
			Self::HighContrast => Some("contrast(2)"),
			Self::Invert => Some("invert(1)"),
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Self::None => "None",
			Self::Grayscale => "Grayscale",
			Self::Sepia => "Sepia",
			Self::Blur => "Blur",
			Self::Brighten => "Brighten",
			Self::HighContrast => "High Contrast",
			Self::Invert => "Invert",
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Animation {
	#[default]
	None,
	Fade,
	Pulse,
	Spin,
}

/// Per-frame adjustments an animation applies on top of the image's own
/// opacity, scale and rotation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationFrame {
	pub opacity: f64,
	pub scale: f64,
	pub rotation: f64,
}

impl Animation {
	pub const ALL: [Animation; 4] = [Self::None, Self::Fade, Self::Pulse, Self::Spin];

	pub fn parse(raw: &str) -> Self {
		match raw {
			"fade" => Self::Fade,
			"pulse" => Self::Pulse,
			"spin" => Self::Spin,
			_ => Self::None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::None => "",
			Self::Fade => "fade",
			Self::Pulse => "pulse",
			Self::Spin => "spin",
		}
	}

	/// Sample the animation at `t_ms` milliseconds.
	pub fn sample(self, t_ms: f64) -> AnimationFrame {
		let still = AnimationFrame {
			opacity: 1.0,
			scale: 1.0,
			rotation: 0.0,
		};
		match self {
			Self::None => still,
			// 0.4..=1.0 over a two second period
			Self::Fade => AnimationFrame {
				opacity: 0.7 + 0.3 * (2.0 * PI * t_ms / 2000.0).cos(),
				..still
			},
			Self::Pulse => AnimationFrame {
				scale: 1.0 + 0.05 * (2.0 * PI * t_ms / 1500.0).sin(),
				..still
			},
			Self::Spin => AnimationFrame {
				rotation: 360.0 * (t_ms.rem_euclid(4000.0) / 4000.0),
				..still
			},
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BorderStyle {
	#[default]
	Solid,
	Dashed,
	Dotted,
}

impl BorderStyle {
	pub fn parse(raw: &str) -> Self {
		match raw {
			"dashed" => Self::Dashed,
			"dotted" => Self::Dotted,
			_ => Self::Solid,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Solid => "solid",
			Self::Dashed => "dashed",
			Self::Dotted => "dotted",
		}
	}

	/// Canvas dash pattern for a stroke of `width`.
	pub fn dash(self, width: f64) -> Vec<f64> {
		match self {
			Self::Solid => Vec::new(),
			Self::Dashed => vec![width * 3.0, width * 2.0],
			Self::Dotted => vec![width, width],
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Border {
	pub color: String,
	pub width: f64,
	pub style: BorderStyle,
}

impl Default for Border {
	fn default() -> Self {
		Self {
			color: "#000000".into(),
			width: 0.0,
			style: BorderStyle::Solid,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Shadow {
	pub enabled: bool,
	pub color: String,
	pub blur: f64,
	pub offset_x: f64,
	pub offset_y: f64,
}

impl Default for Shadow {
	fn default() -> Self {
		Self {
			enabled: false,
			color: "#000000".into(),
			blur: 10.0,
			offset_x: 5.0,
			offset_y: 5.0,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct FloatingImage {
	pub id: String,
	pub href: String,
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
	pub filter: ImageFilter,
	pub animation: Animation,
	pub linked_uuid: String,
	/// Degrees, about the image centre.
	pub rotation: f64,
	/// Percent, 0..=100.
	pub opacity: f64,
	pub z_index: i64,
	pub locked: bool,
	pub border: Border,
	pub shadow: Shadow,
}

impl FloatingImage {
	pub fn new(id: impl Into<String>, href: impl Into<String>, x: f64, y: f64) -> Self {
		Self {
			id: id.into(),
			href: href.into(),
			x,
			y,
			width: IMAGE_DEFAULT_SIZE,
			height: IMAGE_DEFAULT_SIZE,
			filter: ImageFilter::None,
			animation: Animation::None,
			linked_uuid: String::new(),
			rotation: 0.0,
			opacity: 100.0,
			z_index: 0,
			locked: false,
			border: Border::default(),
			shadow: Shadow::default(),
		}
	}

	pub fn center(&self) -> (f64, f64) {
		(self.x + self.width / 2.0, self.y + self.height / 2.0)
	}

	/// Hit test in world coordinates, honouring rotation.
	pub fn contains(&self, wx: f64, wy: f64) -> bool {
		let (cx, cy) = self.center();
		let theta = -self.rotation.to_radians();
		let (dx, dy) = (wx - cx, wy - cy);
		let (lx, ly) = (
			dx * theta.cos() - dy * theta.sin(),
			dx * theta.sin() + dy * theta.cos(),
		);
		lx.abs() <= self.width / 2.0 && ly.abs() <= self.height / 2.0
	}

	pub fn corner(&self, corner: Corner) -> (f64, f64) {
		match corner {
			Corner::NorthWest => (self.x, self.y),
			Corner::NorthEast => (self.x + self.width, self.y),
			Corner::SouthEast => (self.x + self.width, self.y + self.height),
			Corner::SouthWest => (self.x, self.y + self.height),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Corner {
	NorthWest,
	NorthEast,
	SouthEast,
	SouthWest,
}

impl Corner {
	pub const ALL: [Corner; 4] = [
		Self::NorthWest,
		Self::NorthEast,
		Self::SouthEast,
		Self::SouthWest,
	];

	pub fn cursor(self) -> &'static str {
		match self {
			Self::NorthWest | Self::SouthEast => "nwse-resize",
			Self::NorthEast | Self::SouthWest => "nesw-resize",
		}
	}
}

/// Edit form result for a floating image. `width` rescales height with the
/// current aspect ratio.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImagePatch {
	pub width: Option<f64>,
	pub filter: Option<ImageFilter>,
	pub animation: Option<Animation>,
	pub linked_uuid: Option<String>,
	pub rotation: Option<f64>,
	pub opacity: Option<f64>,
	pub locked: Option<bool>,
	pub border: Option<Border>,
	pub shadow: Option<Shadow>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
	pub id: String,
	pub x: f64,
	pub y: f64,
	pub dx: f64,
	pub dy: f64,
	pub title: String,
	pub label: String,
}

impl Annotation {
	pub fn new(id: impl Into<String>, (x, y): (f64, f64), title: String, label: String) -> Self {
		Self {
			id: id.into(),
			x,
			y,
			dx: 0.0,
			dy: 0.0,
			title,
			label,
		}
	}

	/// Where the note is drawn: the anchor plus its offset.
	pub fn note_position(&self) -> (f64, f64) {
		(self.x + self.dx, self.y + self.dy)
	}
}

fn set_if_changed<T: PartialEq>(slot: &mut T, value: Option<T>) -> bool {
	match value {
		Some(value) if *slot != value => {
			*slot = value;
			true
		}
		_ => false,
	}
}

impl GraphModel {
	pub fn floating_images(&self) -> &[FloatingImage] {
		&self.floating_images
	}

	pub fn floating_image(&self, id: &str) -> Option<&FloatingImage> {
		self.floating_images.iter().find(|img| img.id == id)
	}

	fn floating_image_mut(&mut self, id: &str) -> Result<&mut FloatingImage, GraphError> {
		self.floating_images
			.iter_mut()
			.find(|img| img.id == id)
			.ok_or_else(|| GraphError::UnknownImage(id.to_string()))
	}

	/// Images bottom to top. Ties keep insertion order.
	pub fn images_by_z(&self) -> Vec<&FloatingImage> {
		let mut images: Vec<_> = self.floating_images.iter().collect();
		images.sort_by_key(|img| img.z_index);
		images
	}

	fn max_z(&self) -> Option<i64> {
		self.floating_images.iter().map(|img| img.z_index).max()
	}

	fn min_z(&self) -> Option<i64> {
		self.floating_images.iter().map(|img| img.z_index).min()
	}

	/// Add a default sized image centred on `(x, y)`, stacked above the rest.
	pub fn add_floating_image(
		&mut self,
		id: String,
		href: String,
		(x, y): (f64, f64),
	) -> &FloatingImage {
		let mut image = FloatingImage::new(
			id,
			href,
			x - IMAGE_DEFAULT_SIZE / 2.0,
			y - IMAGE_DEFAULT_SIZE / 2.0,
		);
		image.z_index = self.max_z().map_or(0, |z| z + 1);
		self.floating_images.push(image);
		&self.floating_images[self.floating_images.len() - 1]
	}

	pub fn remove_floating_image(&mut self, id: &str) -> Result<FloatingImage, GraphError> {
		let idx = self
			.floating_images
			.iter()
			.position(|img| img.id == id)
			.ok_or_else(|| GraphError::UnknownImage(id.to_string()))?;
		Ok(self.floating_images.remove(idx))
	}

	pub fn move_floating_image(&mut self, id: &str, (x, y): (f64, f64)) -> Result<(), GraphError> {
		let image = self.floating_image_mut(id)?;
		image.x = x;
		image.y = y;
		Ok(())
	}

	/// Drag `corner` by `(dx, dy)`. The opposite corner stays put and neither
	/// side shrinks below the minimum size.
	pub fn resize_floating_image(
		&mut self,
		id: &str,
		corner: Corner,
		(dx, dy): (f64, f64),
	) -> Result<(), GraphError> {
		let image = self.floating_image_mut(id)?;
		let (right, bottom) = (image.x + image.width, image.y + image.height);
		match corner {
			Corner::NorthWest | Corner::SouthWest => {
				image.width = (image.width - dx).max(IMAGE_MIN_SIZE);
				image.x = right - image.width;
			}
			Corner::NorthEast | Corner::SouthEast => {
				image.width = (image.width + dx).max(IMAGE_MIN_SIZE);
			}
		}
		match corner {
			Corner::NorthWest | Corner::NorthEast => {
				image.height = (image.height - dy).max(IMAGE_MIN_SIZE);
				image.y = bottom - image.height;
			}
			Corner::SouthWest | Corner::SouthEast => {
				image.height = (image.height + dy).max(IMAGE_MIN_SIZE);
			}
		}
		Ok(())
	}

	pub fn set_floating_image_style(
		&mut self,
		id: &str,
		patch: ImagePatch,
	) -> Result<bool, GraphError> {
		let image = self.floating_image_mut(id)?;
		let mut changed = false;
		if let Some(width) = patch.width.filter(|w| w.is_finite()) {
			let width = width.max(IMAGE_MIN_SIZE);
			if width != image.width {
				let aspect = image.width / image.height;
				image.width = width;
				image.height = (width / aspect).round().max(IMAGE_MIN_SIZE);
				changed = true;
			}
		}
		changed |= set_if_changed(&mut image.filter, patch.filter);
		changed |= set_if_changed(&mut image.animation, patch.animation);
		changed |= set_if_changed(&mut image.linked_uuid, patch.linked_uuid);
		changed |= set_if_changed(&mut image.rotation, patch.rotation.map(|r| r.rem_euclid(360.0)));
		changed |= set_if_changed(&mut image.opacity, patch.opacity.map(|o| o.clamp(0.0, 100.0)));
		changed |= set_if_changed(&mut image.locked, patch.locked);
		changed |= set_if_changed(&mut image.border, patch.border);
		changed |= set_if_changed(&mut image.shadow, patch.shadow);
		Ok(changed)
	}

	pub fn send_to_front(&mut self, id: &str) -> Result<(), GraphError> {
		let top = self.max_z().unwrap_or(0);
		self.floating_image_mut(id)?.z_index = top + 1;
		Ok(())
	}

	pub fn send_to_back(&mut self, id: &str) -> Result<(), GraphError> {
		let bottom = self.min_z().unwrap_or(0);
		self.floating_image_mut(id)?.z_index = bottom - 1;
		Ok(())
	}

	/// Flip the lock and return the new state.
	pub fn toggle_image_lock(&mut self, id: &str) -> Result<bool, GraphError> {
		let image = self.floating_image_mut(id)?;
		image.locked = !image.locked;
		Ok(image.locked)
	}

	/// Topmost image under the world point.
	pub fn floating_image_at(&self, wx: f64, wy: f64) -> Option<&FloatingImage> {
		self.images_by_z()
			.into_iter()
			.rev()
			.find(|img| img.contains(wx, wy))
	}

	pub fn annotations(&self) -> &[Annotation] {
		&self.annotations
	}

	pub fn annotation(&self, id: &str) -> Option<&Annotation> {
		self.annotations.iter().find(|a| a.id == id)
	}

	fn annotation_mut(&mut self, id: &str) -> Result<&mut Annotation, GraphError> {
		self.annotations
			.iter_mut()
			.find(|a| a.id == id)
			.ok_or_else(|| GraphError::UnknownAnnotation(id.to_string()))
	}

	pub fn add_annotation(&mut self, annotation: Annotation) {
		self.annotations.push(annotation);
	}

	pub fn remove_annotation(&mut self, id: &str) -> Result<Annotation, GraphError> {
		let idx = self
			.annotations
			.iter()
			.position(|a| a.id == id)
			.ok_or_else(|| GraphError::UnknownAnnotation(id.to_string()))?;
		Ok(self.annotations.remove(idx))
	}

	pub fn move_annotation(&mut self, id: &str, (x, y): (f64, f64)) -> Result<(), GraphError> {
		let annotation = self.annotation_mut(id)?;
		annotation.x = x;
		annotation.y = y;
		Ok(())
	}

	pub fn set_annotation_text(
		&mut self,
		id: &str,
		title: String,
		label: String,
	) -> Result<bool, GraphError> {
		let annotation = self.annotation_mut(id)?;
		let changed = set_if_changed(&mut annotation.title, Some(title));
		Ok(set_if_changed(&mut annotation.label, Some(label)) || changed)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	fn model_with_images(zs: &[i64]) -> GraphModel {
		let mut model = GraphModel::default();
		for (i, z) in zs.iter().enumerate() {
			let mut image = FloatingImage::new(format!("img-{i}"), "a.png", 0.0, 0.0);
			image.z_index = *z;
			model.floating_images.push(image);
		}
		model
	}

	fn order(model: &GraphModel) -> Vec<&str> {
		model.images_by_z().iter().map(|img| img.id.as_str()).collect()
	}

	#[test]
	fn images_sort_by_z_then_insertion() {
		let model = model_with_images(&[3, 1, 3, 0]);
		assert_eq!(order(&model), ["img-3", "img-1", "img-0", "img-2"]);
	}

	#[test]
	fn front_and_back_move_strictly_past_the_extremes() {
		let mut model = model_with_images(&[0, 5, 2]);
		model.send_to_back("img-1").unwrap();
		assert_eq!(model.floating_image("img-1").unwrap().z_index, -1);
		assert_eq!(order(&model)[0], "img-1");

		model.send_to_front("img-1").unwrap();
		assert_eq!(model.floating_image("img-1").unwrap().z_index, 3);
		assert_eq!(order(&model).last(), Some(&"img-1"));
	}

	#[test]
	fn new_images_stack_on_top_and_centre_on_the_drop_point() {
		let mut model = model_with_images(&[4]);
		let added = model
			.add_floating_image("new".into(), "b.webp".into(), (200.0, 100.0))
			.clone();
		assert_eq!(added.z_index, 5);
		assert_eq!((added.x, added.y), (150.0, 50.0));
		assert_eq!(added.center(), (200.0, 100.0));
	}

	#[test]
	fn resize_respects_minimum_and_anchors_the_opposite_corner() {
		let mut model = model_with_images(&[0]);
		model
			.resize_floating_image("img-0", Corner::NorthWest, (500.0, 10.0))
			.unwrap();
		let image = model.floating_image("img-0").unwrap();
		assert_eq!(image.width, IMAGE_MIN_SIZE);
		assert_eq!(image.height, 90.0);
		assert_eq!(image.corner(Corner::SouthEast), (100.0, 100.0));

		model
			.resize_floating_image("img-0", Corner::SouthEast, (30.0, 30.0))
			.unwrap();
		let image = model.floating_image("img-0").unwrap();
		assert_eq!((image.width, image.height), (50.0, 120.0));
	}

	#[test]
	fn width_edit_keeps_aspect_ratio_and_clamps_opacity() {
		let mut model = model_with_images(&[0]);
		model
			.resize_floating_image("img-0", Corner::SouthEast, (100.0, 0.0))
			.unwrap();
		let changed = model
			.set_floating_image_style(
				"img-0",
				ImagePatch {
					width: Some(100.0),
					opacity: Some(250.0),
					..Default::default()
				},
			)
			.unwrap();
		assert!(changed);
		let image = model.floating_image("img-0").unwrap();
		assert_eq!((image.width, image.height), (100.0, 50.0));
		assert_eq!(image.opacity, 100.0);

		let unchanged = ImagePatch {
			width: Some(100.0),
			filter: Some(ImageFilter::None),
			..Default::default()
		};
		assert!(!model.set_floating_image_style("img-0", unchanged).unwrap());
	}

	#[test]
	fn rotated_hit_test() {
		let mut image = FloatingImage::new("i", "a.png", 0.0, 0.0);
		image.width = 200.0;
		image.height = 20.0;
		assert!(image.contains(190.0, 10.0));
		image.rotation = 90.0;
		assert!(!image.contains(190.0, 10.0));
		assert!(image.contains(100.0, 90.0));
	}

	#[test]
	fn filters_parse_from_their_css() {
		for filter in ImageFilter::ALL {
			assert_eq!(ImageFilter::parse(filter.css().unwrap_or("")), filter);
		}
		assert_eq!(ImageFilter::parse("hue-rotate(9deg)"), ImageFilter::None);
	}

	#[test]
	fn animation_samples_stay_in_range() {
		for t in (0..8000).step_by(125) {
			let t = t as f64;
			let fade = Animation::Fade.sample(t);
			assert!((0.4 - 1e-9..=1.0 + 1e-9).contains(&fade.opacity));
			let pulse = Animation::Pulse.sample(t);
			assert!((0.95 - 1e-9..=1.05 + 1e-9).contains(&pulse.scale));
			let spin = Animation::Spin.sample(t);
			assert!((0.0..360.0).contains(&spin.rotation));
		}
		assert_eq!(Animation::Spin.sample(1000.0).rotation, 90.0);
		assert_eq!(Animation::None.sample(1234.0).opacity, 1.0);
	}

	#[test]
	fn annotation_edits_report_changes() {
		let mut model = GraphModel::default();
		model.add_annotation(Annotation::new("a", (1.0, 2.0), "Keep".into(), String::new()));
		assert!(!model
			.set_annotation_text("a", "Keep".into(), String::new())
			.unwrap());
		assert!(model
			.set_annotation_text("a", "Keep".into(), "north wall".into())
			.unwrap());
		model.move_annotation("a", (10.0, 20.0)).unwrap();
		assert_eq!(model.annotation("a").unwrap().note_position(), (10.0, 20.0));
		assert!(matches!(
			model.remove_annotation("zz"),
			Err(GraphError::UnknownAnnotation(_))
		));
	}
}

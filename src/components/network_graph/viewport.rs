//! Pan/zoom transform for the graph layer and the short-lived cache that
//! carries it across a widget re-activation.

use std::collections::HashMap;

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 4.0;
pub const FIT_PADDING: f64 = 50.0;
pub const ZOOM_CACHE_TTL_MS: f64 = 5000.0;

/// `screen = world * k + (x, y)`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for Transform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

impl Transform {
	pub const IDENTITY: Transform = Transform {
		x: 0.0,
		y: 0.0,
		k: 1.0,
	};

	pub fn to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	pub fn to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
		(wx * self.k + self.x, wy * self.k + self.y)
	}
}

/// World-space bounds of a set of circles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	pub min_x: f64,
	pub min_y: f64,
	pub max_x: f64,
	pub max_y: f64,
}

impl Bounds {
	/// `None` for an empty set.
	pub fn of_circles(circles: impl IntoIterator<Item = (f64, f64, f64)>) -> Option<Self> {
		circles.into_iter().fold(None, |acc, (x, y, r)| {
			let b = Bounds {
				min_x: x - r,
				min_y: y - r,
				max_x: x + r,
				max_y: y + r,
			};
			Some(match acc {
				None => b,
				Some(a) => Bounds {
					min_x: a.min_x.min(b.min_x),
					min_y: a.min_y.min(b.min_y),
					max_x: a.max_x.max(b.max_x),
					max_y: a.max_y.max(b.max_y),
				},
			})
		})
	}

	pub fn width(&self) -> f64 {
		self.max_x - self.min_x
	}

	pub fn height(&self) -> f64 {
		self.max_y - self.min_y
	}
}

/// Largest scale no greater than 1 at which the padded box fits the
/// viewport, with the box centred. The wheel's scale range does not apply:
/// a very wide graph fits below `MIN_SCALE`.
pub fn fit_bounds(bounds: Bounds, (width, height): (f64, f64), padding: f64) -> Transform {
	let (w, h) = (
		bounds.width() + 2.0 * padding,
		bounds.height() + 2.0 * padding,
	);
	let k = (width / w).min(height / h).min(1.0);
	Transform {
		x: (width - w * k) / 2.0 - bounds.min_x * k + padding * k,
		y: (height - h * k) / 2.0 - bounds.min_y * k + padding * k,
		k,
	}
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug)]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
	transform: Transform,
	pub pan: PanState,
	/// Off while something is being dragged.
	pub panning_enabled: bool,
}

impl Viewport {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			width,
			height,
			transform: Transform::IDENTITY,
			pan: PanState::default(),
			panning_enabled: true,
		}
	}

	pub fn current_transform(&self) -> Transform {
		self.transform
	}

	/// Apply a transform as given. Only wheel zoom is held to
	/// `MIN_SCALE..=MAX_SCALE`; a degenerate transform resets to identity.
	pub fn apply_transform(&mut self, t: Transform) {
		let usable = t.x.is_finite() && t.y.is_finite() && t.k.is_finite() && t.k > 0.0;
		self.transform = if usable { t } else { Transform::IDENTITY };
	}

	pub fn center(&self) -> (f64, f64) {
		(self.width / 2.0, self.height / 2.0)
	}

	/// World point currently under the viewport centre.
	pub fn world_center(&self) -> (f64, f64) {
		let (cx, cy) = self.center();
		self.transform.to_world(cx, cy)
	}

	pub fn to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
		self.transform.to_world(sx, sy)
	}

	/// Zoom by `factor` keeping the screen point `(sx, sy)` fixed.
	pub fn zoom_about(&mut self, sx: f64, sy: f64, factor: f64) {
		let t = self.transform;
		let k = (t.k * factor).clamp(MIN_SCALE, MAX_SCALE);
		let ratio = k / t.k;
		self.transform = Transform {
			x: sx - (sx - t.x) * ratio,
			y: sy - (sy - t.y) * ratio,
			k,
		};
	}

	pub fn begin_pan(&mut self, sx: f64, sy: f64) -> bool {
		if !self.panning_enabled {
			return false;
		}
		self.pan = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
		true
	}

	pub fn pan_to(&mut self, sx: f64, sy: f64) {
		if !self.pan.active {
			return;
		}
		self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
		self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
	}

	pub fn end_pan(&mut self) {
		self.pan.active = false;
	}

	/// Fit the given circles; an empty set resets to identity.
	pub fn reset_to_fit(&mut self, circles: impl IntoIterator<Item = (f64, f64, f64)>) {
		let fitted = Bounds::of_circles(circles)
			.map(|b| fit_bounds(b, (self.width, self.height), FIT_PADDING))
			.unwrap_or(Transform::IDENTITY);
		self.apply_transform(fitted);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

/// Milliseconds since some fixed origin.
pub trait Clock {
	fn now_ms(&self) -> f64;
}

/// Per widget transforms that outlive a widget for a few seconds.
#[derive(Debug)]
pub struct ZoomCache {
	ttl_ms: f64,
	entries: HashMap<String, (Transform, f64)>,
}

impl Default for ZoomCache {
	fn default() -> Self {
		Self::new(ZOOM_CACHE_TTL_MS)
	}
}

impl ZoomCache {
	pub fn new(ttl_ms: f64) -> Self {
		Self {
			ttl_ms,
			entries: HashMap::new(),
		}
	}

	pub fn put(&mut self, key: &str, transform: Transform, now_ms: f64) {
		self.entries.insert(key.to_string(), (transform, now_ms));
	}

	/// Stale entries read as absent and are evicted.
	pub fn get(&mut self, key: &str, now_ms: f64) -> Option<Transform> {
		let &(transform, stored_at) = self.entries.get(key)?;
		if now_ms - stored_at > self.ttl_ms {
			self.entries.remove(key);
			return None;
		}
		Some(transform)
	}

	/// Read and forget an entry; a cached transform is applied at most once.
	pub fn take(&mut self, key: &str, now_ms: f64) -> Option<Transform> {
		let found = self.get(key, now_ms);
		self.entries.remove(key);
		found
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	fn close(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-9
	}

	#[test]
	fn fit_scales_down_and_centres_large_content() {
		let bounds = Bounds {
			min_x: -500.0,
			min_y: 0.0,
			max_x: 1500.0,
			max_y: 400.0,
		};
		let t = fit_bounds(bounds, (800.0, 600.0), FIT_PADDING);
		assert!(t.k <= 1.0);
		let (left, top) = t.to_screen(bounds.min_x - FIT_PADDING, bounds.min_y - FIT_PADDING);
		let (right, bottom) = t.to_screen(bounds.max_x + FIT_PADDING, bounds.max_y + FIT_PADDING);
		assert!(left >= -1e-9 && right <= 800.0 + 1e-9);
		assert!(top >= -1e-9 && bottom <= 600.0 + 1e-9);
		assert!(close(left, 800.0 - right));
		assert!(close(top, 600.0 - bottom));
		assert!(close(t.k, 800.0 / 2100.0));
	}

	#[test]
	fn fit_never_zooms_in_past_one() {
		let bounds = Bounds::of_circles([(0.0, 0.0, 30.0), (60.0, 0.0, 30.0)]).unwrap();
		let t = fit_bounds(bounds, (800.0, 600.0), FIT_PADDING);
		assert_eq!(t.k, 1.0);
		let (cx, cy) = t.to_screen(30.0, 0.0);
		assert!(close(cx, 400.0) && close(cy, 300.0));
	}

	#[test]
	fn empty_fit_resets_to_identity() {
		let mut viewport = Viewport::new(800.0, 600.0);
		viewport.zoom_about(10.0, 10.0, 2.0);
		viewport.reset_to_fit([]);
		assert_eq!(viewport.current_transform(), Transform::IDENTITY);
	}

	#[test]
	fn zoom_keeps_the_anchor_point_and_clamps() {
		let mut viewport = Viewport::new(800.0, 600.0);
		let before = viewport.to_world(200.0, 150.0);
		viewport.zoom_about(200.0, 150.0, 1.1);
		let after = viewport.to_world(200.0, 150.0);
		assert!(close(before.0, after.0) && close(before.1, after.1));

		for _ in 0..100 {
			viewport.zoom_about(0.0, 0.0, 1.5);
		}
		assert_eq!(viewport.current_transform().k, MAX_SCALE);
		for _ in 0..100 {
			viewport.zoom_about(0.0, 0.0, 0.5);
		}
		assert_eq!(viewport.current_transform().k, MIN_SCALE);
		viewport.apply_transform(Transform {
			x: 0.0,
			y: 0.0,
			k: 0.0,
		});
		assert_eq!(viewport.current_transform(), Transform::IDENTITY);
	}

	#[test]
	fn fit_goes_below_the_wheel_range_for_huge_graphs() {
		let mut viewport = Viewport::new(800.0, 600.0);
		viewport.reset_to_fit([(-10_000.0, 0.0, 30.0), (10_000.0, 0.0, 30.0)]);
		let t = viewport.current_transform();
		assert!(t.k < MIN_SCALE);
		let (left, _) = t.to_screen(-10_030.0, 0.0);
		let (right, _) = t.to_screen(10_030.0, 0.0);
		assert!(left >= 0.0 && right <= 800.0);
	}

	#[test]
	fn panning_is_refused_while_disabled() {
		let mut viewport = Viewport::new(800.0, 600.0);
		viewport.panning_enabled = false;
		assert!(!viewport.begin_pan(0.0, 0.0));
		viewport.pan_to(50.0, 50.0);
		assert_eq!(viewport.current_transform(), Transform::IDENTITY);

		viewport.panning_enabled = true;
		assert!(viewport.begin_pan(0.0, 0.0));
		viewport.pan_to(50.0, -20.0);
		viewport.end_pan();
		viewport.pan_to(500.0, 500.0);
		let t = viewport.current_transform();
		assert_eq!((t.x, t.y), (50.0, -20.0));
	}

	#[test]
	fn zoom_cache_expires_after_ttl() {
		let mut cache = ZoomCache::default();
		let t = Transform {
			x: 12.0,
			y: -4.0,
			k: 2.0,
		};
		cache.put("w1", t, 1_000.0);
		assert_eq!(cache.get("w1", 5_999.0), Some(t));
		assert_eq!(cache.get("w2", 5_999.0), None);
		assert_eq!(cache.get("w1", 6_001.0), None);
		assert_eq!(cache.len(), 0);

		cache.put("w1", t, 10_000.0);
		assert_eq!(cache.take("w1", 10_500.0), Some(t));
		assert_eq!(cache.take("w1", 10_600.0), None);
	}
}

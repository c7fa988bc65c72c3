use std::collections::HashMap;
use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use super::scene::{
	AnnotationVisual, Geometry, HANDLE_SIZE, ImageVisual, LINK_LABEL_FONT, LINK_WIDTH, NodeVisual,
	Scene,
};
use super::state::NetworkState;

const SELECTION_COLOR: &str = "#4a90e2";

/// Decoded images by href. Elements are created on first use and drawn once
/// the browser has finished loading them.
#[derive(Default)]
pub struct ImageCache {
	images: HashMap<String, HtmlImageElement>,
}

impl ImageCache {
	fn get(&mut self, href: &str) -> Option<&HtmlImageElement> {
		if !self.images.contains_key(href) {
			let img = HtmlImageElement::new().ok()?;
			img.set_src(href);
			self.images.insert(href.to_string(), img);
		}
		self.images
			.get(href)
			.filter(|img| img.complete() && img.natural_width() > 0)
	}
}

fn set_dash(ctx: &CanvasRenderingContext2d, pattern: &[f64]) {
	let array = js_sys::Array::new();
	for v in pattern {
		array.push(&JsValue::from_f64(*v));
	}
	let _ = ctx.set_line_dash(&array);
}

pub fn render(
	state: &NetworkState,
	ctx: &CanvasRenderingContext2d,
	images: &mut ImageCache,
	now_ms: f64,
) {
	let t = state.viewport.current_transform();
	ctx.set_fill_style_str(&state.settings.background);
	ctx.fill_rect(0.0, 0.0, state.viewport.width, state.viewport.height);
	ctx.save();
	let _ = ctx.translate(t.x, t.y);
	let _ = ctx.scale(t.k, t.k);
	let scene = &state.scene;
	draw_images(scene, ctx, images, now_ms, t.k);
	draw_links(scene, ctx);
	draw_nodes(scene, ctx, images);
	draw_annotations(scene, ctx, t.k);
	ctx.restore();
}

fn draw_images(
	scene: &Scene,
	ctx: &CanvasRenderingContext2d,
	images: &mut ImageCache,
	now_ms: f64,
	k: f64,
) {
	for visual in scene.images.values() {
		draw_image(visual, ctx, images, now_ms, k);
		ctx.set_fill_style_str(SELECTION_COLOR);
		let side = HANDLE_SIZE / k.max(0.5);
		for h in &visual.handles {
			ctx.fill_rect(h.x - side / 2.0, h.y - side / 2.0, side, side);
		}
	}
}

fn draw_image(
	v: &ImageVisual,
	ctx: &CanvasRenderingContext2d,
	images: &mut ImageCache,
	now_ms: f64,
	k: f64,
) {
	let frame = v.animation.sample(now_ms);
	let (hw, hh) = (v.width / 2.0, v.height / 2.0);
	ctx.save();
	let _ = ctx.translate(v.x + hw, v.y + hh);
	let _ = ctx.rotate((v.rotation + frame.rotation).to_radians());
	let _ = ctx.scale(frame.scale, frame.scale);
	ctx.set_global_alpha(v.opacity * frame.opacity);

	if let Some(img) = images.get(&v.href) {
		ctx.set_filter(v.filter.as_deref().unwrap_or("none"));
		let _ =
			ctx.draw_image_with_html_image_element_and_dw_and_dh(img, -hw, -hh, v.width, v.height);
		ctx.set_filter("none");
	}
	if let Some(border) = &v.border {
		ctx.set_stroke_style_str(&border.color);
		ctx.set_line_width(border.width);
		set_dash(ctx, &border.style.dash(border.width));
		ctx.stroke_rect(-hw, -hh, v.width, v.height);
		set_dash(ctx, &[]);
	}
	if v.selected {
		ctx.set_global_alpha(1.0);
		ctx.set_stroke_style_str(SELECTION_COLOR);
		ctx.set_line_width(2.0 / k);
		set_dash(ctx, &[6.0 / k, 4.0 / k]);
		ctx.stroke_rect(-hw, -hh, v.width, v.height);
		set_dash(ctx, &[]);
	}
	ctx.restore();
}

fn draw_links(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	ctx.set_line_width(LINK_WIDTH);
	for link in scene.links.values() {
		ctx.set_stroke_style_str(&link.color);
		ctx.begin_path();
		ctx.move_to(link.from.0, link.from.1);
		ctx.line_to(link.to.0, link.to.1);
		ctx.stroke();
	}

	ctx.set_text_align("center");
	ctx.set_line_join("round");
	for link in scene.links.values().filter(|l| !l.label.is_empty()) {
		let (mx, my) = link.midpoint();
		let style = if link.placeholder { "italic " } else { "" };
		ctx.set_font(&format!("{style}{LINK_LABEL_FONT}px sans-serif"));
		ctx.set_stroke_style_str(&link.outline);
		ctx.set_line_width(3.0);
		let _ = ctx.stroke_text(&link.label, mx, my - 5.0);
		ctx.set_fill_style_str(if link.placeholder { "#999" } else { &link.color });
		let _ = ctx.fill_text(&link.label, mx, my - 5.0);
	}
}

fn trace(ctx: &CanvasRenderingContext2d, geometry: &Geometry, x: f64, y: f64) {
	ctx.begin_path();
	match geometry {
		Geometry::Circle { r } => {
			let _ = ctx.arc(x, y, *r, 0.0, 2.0 * PI);
		}
		Geometry::Square { half } => ctx.rect(x - half, y - half, half * 2.0, half * 2.0),
		Geometry::Polygon(points) => {
			for (i, (px, py)) in points.iter().enumerate() {
				if i == 0 {
					ctx.move_to(x + px, y + py);
				} else {
					ctx.line_to(x + px, y + py);
				}
			}
			ctx.close_path();
		}
	}
}

fn draw_nodes(scene: &Scene, ctx: &CanvasRenderingContext2d, images: &mut ImageCache) {
	for node in scene.nodes.values() {
		draw_node(node, ctx, images);
	}
}

fn draw_node(n: &NodeVisual, ctx: &CanvasRenderingContext2d, images: &mut ImageCache) {
	trace(ctx, &n.outline, n.x, n.y);
	ctx.set_fill_style_str(&n.fill);
	ctx.fill();
	ctx.set_stroke_style_str(n.stroke.color);
	ctx.set_line_width(n.stroke.width);
	ctx.stroke();

	if let Some(image) = &n.image {
		if let Some(img) = images.get(&image.href) {
			ctx.save();
			trace(ctx, &image.clip, n.x, n.y);
			ctx.clip();
			if let Some(filter) = image.filter {
				ctx.set_filter(filter);
			}
			let half = image.size / 2.0;
			let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
				img,
				n.x - half,
				n.y - half,
				image.size,
				image.size,
			);
			ctx.restore();
		}
	}

	if let Some((mask, r)) = &n.mask {
		ctx.begin_path();
		let _ = ctx.arc(n.x, n.y, *r, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(mask.background);
		ctx.fill();
		ctx.set_fill_style_str("#ffffff");
		ctx.set_font(&format!("bold {}px sans-serif", mask.font_size));
		ctx.set_text_align("center");
		ctx.set_text_baseline("middle");
		let _ = ctx.fill_text(mask.glyph, n.x, n.y);
		ctx.set_text_baseline("alphabetic");
	}

	if !n.label.text.is_empty() {
		ctx.set_fill_style_str(&n.label.color);
		ctx.set_font(&format!("{}px sans-serif", n.label.font_size));
		ctx.set_text_align("center");
		let _ = ctx.fill_text(&n.label.text, n.x, n.y + n.label.dy);
	}
}

fn draw_annotations(scene: &Scene, ctx: &CanvasRenderingContext2d, k: f64) {
	ctx.set_text_align("left");
	for a in scene.annotations.values() {
		draw_annotation(a, ctx, k);
	}
}

fn draw_annotation(a: &AnnotationVisual, ctx: &CanvasRenderingContext2d, k: f64) {
	ctx.set_fill_style_str("#222");
	ctx.set_font("bold 14px sans-serif");
	let _ = ctx.fill_text(&a.title, a.x, a.y);
	ctx.set_font("12px sans-serif");
	let _ = ctx.fill_text(&a.label, a.x, a.y + 16.0);
	if a.draggable {
		let width = a.title.chars().count().max(a.label.chars().count()) as f64 * 7.0;
		ctx.set_stroke_style_str(SELECTION_COLOR);
		ctx.set_line_width(1.0 / k);
		set_dash(ctx, &[4.0 / k, 3.0 / k]);
		ctx.stroke_rect(a.x - 4.0, a.y - 18.0, width.max(20.0) + 8.0, 40.0);
		set_dash(ctx, &[]);
	}
}

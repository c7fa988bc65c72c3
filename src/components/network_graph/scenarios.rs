//! End-to-end behaviour driven through the widget state the way the canvas
//! drives it: pointer events in screen space, host prompts answered by the
//! fake host.

use pretty_assertions::assert_eq;

use super::host::{DocumentKind, Viewer};
use super::model::{LinkToggle, Node, NodeShape};
use super::state::{NetworkState, View};
use super::testing::Harness;
use super::visibility::Mask;

fn node(id: &str, at: (f64, f64)) -> Node {
	Node::document(id, id, format!("{id}.webp"), DocumentKind::Actor, true, at)
}

fn click(state: &mut NetworkState, (x, y): (f64, f64)) {
	state.pointer_down(x, y);
	state.pointer_up(x, y);
}

fn mask_of(state: &NetworkState, id: &str) -> Option<Mask> {
	state.scene.nodes[id].mask.as_ref().map(|(mask, _)| mask.clone())
}

#[test]
fn linking_two_nodes_by_clicking_them() {
	let h = Harness::new();
	let mut state = h.open(Viewer::gm("gm"));
	state.model.add_node(node("A", (400.0, 300.0))).unwrap();
	let mut b = node("B", (450.0, 300.0));
	b.shape = NodeShape::Star;
	state.model.add_node(b).unwrap();
	state.rerender(View::Preserve);

	state.toggle_linking();
	click(&mut state, (400.0, 300.0));
	assert_eq!(state.mode.selected(), Some("A"));
	h.host.answer_prompt(Some("ally"));
	click(&mut state, (450.0, 300.0));

	assert_eq!(state.model.links().len(), 1);
	assert_eq!(state.model.find_link("B", "A").unwrap().label, "ally");
	assert_eq!(state.mode.selected(), None);
	assert_eq!(h.open(Viewer::gm("gm")).model.links().len(), 1);

	assert_eq!(
		state.toggle_link("A", "B").unwrap(),
		LinkToggle::Removed {
			label: "ally".into()
		}
	);
	assert!(state.model.links().is_empty());
}

#[test]
fn masked_nodes_depend_on_role_and_flags() {
	let h = Harness::new();
	let mut gm = h.open(Viewer::gm("gm"));
	let mut secret = node("Actor.x", (100.0, 100.0));
	secret.can_observe = false;
	gm.model.add_node(secret).unwrap();
	gm.persist();
	gm.rerender(View::Preserve);

	let mask = mask_of(&gm, "Actor.x").unwrap();
	assert_eq!((mask.glyph, mask.background), ("?", "#666"));
	let player = h.open(Viewer::player("p1"));
	let mask = mask_of(&player, "Actor.x").unwrap();
	assert_eq!((mask.glyph, mask.background), ("?", "#666"));

	let x = gm.model.node_mut("Actor.x").unwrap();
	x.can_observe = true;
	x.hidden_from_players = true;
	gm.persist();
	gm.rerender(View::Preserve);

	assert_eq!(mask_of(&gm, "Actor.x"), None);
	assert_eq!(gm.scene.nodes["Actor.x"].stroke.color, "#ff0000");
	let player = h.open(Viewer::player("p1"));
	let mask = mask_of(&player, "Actor.x").unwrap();
	assert_eq!((mask.glyph, mask.background), ("?????", "#000000"));
	assert_eq!(player.scene.nodes["Actor.x"].stroke.color, "#333");
}

#[test]
fn import_replaces_the_whole_network() {
	let h = Harness::new();
	let mut state = h.open(Viewer::gm("gm"));
	state.model.add_node(node("Actor.old", (0.0, 0.0))).unwrap();
	state.persist();

	let payload = r#"{
		"version": 2,
		"timestamp": "2024-01-01T00:00:00.000Z",
		"nodes": [
			{"id": "Actor.a", "uuid": "Actor.a", "name": "A", "x": 10, "y": 10},
			{"id": "Item.b", "uuid": "Item.b", "name": "B", "type": "Item"},
			{"id": "empty-1", "name": "Harbour", "type": "Empty", "label": "Harbour"}
		],
		"links": [
			{"source": "Actor.a", "target": "Item.b", "label": "owns"},
			{"source": "Item.b", "target": "empty-1", "label": ""}
		],
		"floatingImages": [{"id": "floating-img-1", "href": "maps/harbour.webp", "x": 0, "y": 0}]
	}"#;

	h.host.answer_confirm(false);
	assert!(state.import_json(payload).is_err());
	assert!(state.model.node("Actor.old").is_some());

	h.host.answer_confirm(true);
	let summary = state.import_json(payload).unwrap();
	assert_eq!((summary.nodes, summary.links, summary.floating_images), (3, 2, 1));
	assert_eq!(state.model.nodes().len(), 3);
	assert_eq!(state.model.links().len(), 2);
	assert_eq!(state.model.floating_images().len(), 1);
	assert!(state.model.node("Actor.old").is_none());

	let reopened = h.open(Viewer::gm("gm"));
	assert_eq!(reopened.stored().nodes.len(), 3);
	assert!(reopened.model.node("Actor.old").is_none());
}

#[test]
fn malformed_imports_leave_the_network_alone() {
	let h = Harness::new();
	let mut state = h.open(Viewer::gm("gm"));
	state.model.add_node(node("Actor.old", (0.0, 0.0))).unwrap();
	let before = state.stored();

	assert!(state.import_json(r#"{"nodes": "nope"}"#).is_err());
	assert!(state.import_json(r#"{"nodes": [{"id": "a", "x": "left"}]}"#).is_err());
	assert_eq!(state.stored(), before);
}

#[test]
fn a_dragged_node_is_saved_where_it_was_released() {
	let h = Harness::new();
	let mut state = h.open(Viewer::gm("gm"));
	state.model.add_node(node("A", (400.0, 300.0))).unwrap();
	state.model.add_node(node("B", (600.0, 300.0))).unwrap();
	state.model.toggle_link("A", "B", || Some("rivals".into())).unwrap();
	state.rerender(View::Preserve);
	for _ in 0..20 {
		state.tick();
	}

	let a = state.model.node("A").unwrap();
	let (x0, y0) = (a.x, a.y);
	state.pointer_down(x0, y0);
	state.pointer_move(x0 + 50.0, y0);
	assert!(state.model.node("A").unwrap().pin.is_some());
	assert!(!state.viewport.panning_enabled);
	state.pointer_move(x0 + 100.0, y0);
	state.pointer_up(x0 + 100.0, y0);

	let released = state.model.node("A").unwrap();
	assert_eq!(released.pin, None);
	assert!(state.viewport.panning_enabled);
	let release = (released.x, released.y);
	assert!((release.0 - (x0 + 100.0)).abs() < 1e-9);

	for _ in 0..20 {
		state.tick();
	}
	let saved = h.open(Viewer::gm("gm"));
	let stored = saved.model.node("A").unwrap();
	assert_eq!((stored.x, stored.y), release);
}

#[test]
fn reset_zoom_brings_a_spread_out_network_back_into_view() {
	let h = Harness::new();
	let mut state = h.open(Viewer::gm("gm"));
	for (i, at) in [(-900.0, -400.0), (1700.0, 200.0), (300.0, 1300.0), (50.0, 60.0)]
		.into_iter()
		.enumerate()
	{
		state.model.add_node(node(&format!("Actor.{i}"), at)).unwrap();
	}
	state.model.set_nodes_locked(true);
	state.rerender(View::Preserve);

	state.wheel(100.0, 100.0, -1.0);
	state.wheel(100.0, 100.0, -1.0);
	state.pointer_down(700.0, 500.0);
	state.pointer_move(760.0, 540.0);
	state.pointer_up(760.0, 540.0);
	state.reset_zoom();

	let t = state.viewport.current_transform();
	assert!(t.k <= 1.0);
	for n in state.model.nodes() {
		let (left, top) = t.to_screen(n.x - n.size, n.y - n.size);
		let (right, bottom) = t.to_screen(n.x + n.size, n.y + n.size);
		assert!(left >= 0.0 && right <= 800.0, "{} is off screen horizontally", n.id);
		assert!(top >= 0.0 && bottom <= 600.0, "{} is off screen vertically", n.id);
	}

	state.rerender(View::Preserve);
	assert_eq!(state.viewport.current_transform(), t);
}

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, error, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, DragEvent, HtmlCanvasElement, MouseEvent, WheelEvent, Window,
};

use super::browser::{self, BrowserClock};
use super::error::{GraphError, ImportError};
use super::host::{Host, Viewer};
use super::interaction::{ImageForm, NodeForm};
use super::model::NodeShape;
use super::overlay::{Animation, BorderStyle, ImageFilter};
use super::persistence::Store;
use super::render::{self, ImageCache};
use super::schema::NODE_SIZE_PRESETS;
use super::state::{
	ContextTarget, NetworkState, Services, SharedZoomCache, TooltipView, WidgetConfig,
};
use super::viewport::ZoomCache;
use super::visibility;

type SharedState = Rc<RefCell<Option<NetworkState>>>;

#[derive(Clone, Debug, PartialEq)]
enum UiCommand {
	ToggleLinking,
	ToggleArrange,
	CreateAnnotation,
	AddEmptyNode,
	ToggleLock,
	ClearAll,
	ResetZoom,
	Export,
	Import,
	SaveNode(String, NodeForm),
	ResetNode(String),
	OpenNode(String),
	RemoveNode(String),
	SaveImage(String, ImageForm),
	DeleteImage(String),
	ImageToFront(String),
	ImageToBack(String),
	ToggleImageLock(String),
}

#[derive(Clone, Debug, PartialEq)]
struct NodeEditor {
	id: String,
	title: String,
	label_only: bool,
	form: NodeForm,
}

/// Reactive mirror of the parts of the widget state the DOM shows.
#[derive(Clone, Copy)]
struct UiSignals {
	linking: RwSignal<bool>,
	arranging: RwSignal<bool>,
	locked: RwSignal<bool>,
	instructions: RwSignal<&'static str>,
	tooltip: RwSignal<Option<TooltipView>>,
	node_editor: RwSignal<Option<NodeEditor>>,
	image_editor: RwSignal<Option<(String, ImageForm)>>,
	failure: RwSignal<Option<String>>,
}

fn set_if_changed<T: PartialEq + Send + Sync + 'static>(signal: RwSignal<T>, value: T) {
	if signal.with_untracked(|current| *current != value) {
		signal.set(value);
	}
}

impl UiSignals {
	fn new() -> Self {
		Self {
			linking: RwSignal::new(false),
			arranging: RwSignal::new(false),
			locked: RwSignal::new(false),
			instructions: RwSignal::new(""),
			tooltip: RwSignal::new(None),
			node_editor: RwSignal::new(None),
			image_editor: RwSignal::new(None),
			failure: RwSignal::new(None),
		}
	}

	fn publish(&self, state: &NetworkState) {
		set_if_changed(self.linking, state.mode.is_linking());
		set_if_changed(self.arranging, state.mode.is_arranging());
		set_if_changed(self.locked, state.model.nodes_locked());
		set_if_changed(self.instructions, state.instructions());
		set_if_changed(self.tooltip, state.tooltip());
	}

	fn edit_node(&self, edit: impl FnOnce(&mut NodeForm)) {
		self.node_editor.update_untracked(|editor| {
			if let Some(editor) = editor {
				edit(&mut editor.form);
			}
		});
	}

	fn edit_image(&self, edit: impl FnOnce(&mut ImageForm)) {
		self.image_editor.update_untracked(|editor| {
			if let Some((_, form)) = editor {
				edit(form);
			}
		});
	}
}

/// Cells shared between the widget and its own browser callbacks. The frame
/// callback is stored in `frame` and captures this loop, so the cycle only
/// ends in [`FrameLoop::teardown`].
struct FrameLoop<C> {
	state: SharedState,
	frame: Rc<RefCell<Option<C>>>,
	resize: Rc<RefCell<Option<C>>>,
}

impl<C> Clone for FrameLoop<C> {
	fn clone(&self) -> Self {
		Self {
			state: Rc::clone(&self.state),
			frame: Rc::clone(&self.frame),
			resize: Rc::clone(&self.resize),
		}
	}
}

impl<C> FrameLoop<C> {
	fn new(state: SharedState) -> Self {
		Self {
			state,
			frame: Rc::new(RefCell::new(None)),
			resize: Rc::new(RefCell::new(None)),
		}
	}

	/// Close and release the widget state and hand back both callbacks for
	/// the caller to unregister and drop.
	fn teardown(&self) -> (Option<C>, Option<C>) {
		if let Some(mut s) = self.state.borrow_mut().take() {
			s.close();
		}
		(self.frame.borrow_mut().take(), self.resize.borrow_mut().take())
	}
}

fn measure(canvas: &HtmlCanvasElement, width: Option<f64>, height: Option<f64>) -> (f64, f64) {
	(
		width.unwrap_or_else(|| {
			canvas
				.parent_element()
				.map(|p| p.client_width() as f64)
				.unwrap_or(800.0)
		}),
		height.unwrap_or_else(|| {
			canvas
				.parent_element()
				.map(|p| p.client_height() as f64)
				.unwrap_or(600.0)
		}),
	)
}

fn canvas_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn export(state: &SharedState, host: &Rc<dyn Host>) {
	let Some(json) = state.borrow().as_ref().map(NetworkState::export_json) else {
		return;
	};
	let text = match json {
		Ok(text) => text,
		Err(e) => {
			error!("Network Widget | export failed: {e}");
			host.notify_error(&format!("Could not export the network: {e}"));
			return;
		}
	};
	let host = Rc::clone(host);
	spawn_local(async move {
		match browser::write_clipboard(&text).await {
			Ok(()) => host.notify_info("Network data copied to clipboard."),
			Err(e) => {
				error!("Network Widget | clipboard write failed: {e}");
				host.notify_error(&format!("Could not copy to the clipboard: {e}"));
			}
		}
	});
}

fn import(state: SharedState, host: Rc<dyn Host>, ui: UiSignals) {
	spawn_local(async move {
		let text = match browser::read_clipboard().await {
			Ok(text) => text,
			Err(e) => {
				error!("Network Widget | clipboard read failed: {e}");
				host.notify_error(&format!("Could not read the clipboard: {e}"));
				return;
			}
		};
		if let Some(ref mut s) = *state.borrow_mut() {
			match s.import_json(&text) {
				Ok(_) => ui.publish(s),
				Err(ImportError::Declined) => info!("Network Widget | import declined"),
				Err(e) => {
					error!("Network Widget | import rejected: {e}");
					host.notify_error(&format!("Import failed: {e}"));
				}
			}
		}
	});
}

fn run_command(state: &SharedState, host: &Rc<dyn Host>, ui: UiSignals, command: UiCommand) {
	match command {
		UiCommand::Export => return export(state, host),
		UiCommand::Import => return import(Rc::clone(state), Rc::clone(host), ui),
		_ => {}
	}
	let mut guard = state.borrow_mut();
	let Some(s) = guard.as_mut() else {
		return;
	};
	let outcome: Result<(), GraphError> = match command {
		UiCommand::ToggleLinking => {
			s.toggle_linking();
			Ok(())
		}
		UiCommand::ToggleArrange => {
			s.toggle_annotation_arrange();
			Ok(())
		}
		UiCommand::CreateAnnotation => {
			s.create_annotation();
			Ok(())
		}
		UiCommand::AddEmptyNode => {
			s.add_empty_node();
			Ok(())
		}
		UiCommand::ToggleLock => {
			s.toggle_nodes_locked();
			Ok(())
		}
		UiCommand::ClearAll => {
			if s.clear_all() {
				ui.node_editor.set(None);
				ui.image_editor.set(None);
			}
			Ok(())
		}
		UiCommand::ResetZoom => {
			s.reset_zoom();
			Ok(())
		}
		UiCommand::SaveNode(id, form) => s.apply_node_form(&id, &form).map(|_| ()),
		UiCommand::ResetNode(id) => s.reset_node(&id).map(|_| ()),
		UiCommand::OpenNode(id) => {
			s.open_node(&id);
			Ok(())
		}
		UiCommand::RemoveNode(id) => s.remove_node(&id).map(|_| ()),
		UiCommand::SaveImage(id, form) => s.apply_image_form(&id, &form).map(|_| ()),
		UiCommand::DeleteImage(id) => s.delete_image(&id),
		UiCommand::ImageToFront(id) => s.send_image_to_front(&id),
		UiCommand::ImageToBack(id) => s.send_image_to_back(&id),
		UiCommand::ToggleImageLock(id) => s.toggle_image_lock(&id).map(|_| ()),
		UiCommand::Export | UiCommand::Import => Ok(()),
	};
	if let Err(e) = outcome {
		warn!("Network Widget | {e}");
		host.notify_warn(&e.to_string());
	}
	ui.publish(s);
}

fn open_editor(state: &NetworkState, target: ContextTarget, ui: UiSignals) {
	match target {
		ContextTarget::Node(id) => {
			let Some(node) = state.model.node(&id) else {
				return;
			};
			ui.image_editor.set(None);
			ui.node_editor.set(Some(NodeEditor {
				title: visibility::display_name(node, true).to_string(),
				label_only: node.is_empty_kind(),
				form: NodeForm::from_node(node),
				id,
			}));
		}
		ContextTarget::Image(id) => {
			let Some(image) = state.model.floating_image(&id) else {
				return;
			};
			ui.node_editor.set(None);
			ui.image_editor.set(Some((id, ImageForm::from_image(image))));
		}
	}
}

/// One network widget: a canvas with the force layout, its toolbar and the
/// node and image editors.
#[component]
pub fn NetworkWidget(
	#[prop(into)] document_id: String,
	#[prop(into)] widget_id: String,
	viewer: Viewer,
	host: Rc<dyn Host>,
	store: Rc<dyn Store>,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let ui = UiSignals::new();
	let pending = RwSignal::new(None::<UiCommand>);
	let zoom_cache: SharedZoomCache = use_context::<SharedZoomCache>()
		.unwrap_or_else(|| Arc::new(Mutex::new(ZoomCache::default())));
	let is_gm = viewer.is_gm;

	let state: SharedState = Rc::new(RefCell::new(None));
	let frames: FrameLoop<Closure<dyn FnMut()>> = FrameLoop::new(state.clone());
	let alive = Arc::new(AtomicBool::new(true));
	let (state_init, frames_init, alive_init, host_init) =
		(state.clone(), frames.clone(), alive.clone(), host.clone());

	on_cleanup(move || alive.store(false, Ordering::Relaxed));

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if state_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let (w, h) = measure(&canvas, width, height);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok());
		let Some(ctx) = ctx else {
			error!("Network Widget | 2d canvas context unavailable");
			ui.failure
				.set(Some("The network canvas could not be created in this browser.".into()));
			return;
		};

		let s = NetworkState::open(
			WidgetConfig {
				document_id: document_id.clone(),
				widget_id: widget_id.clone(),
				viewer: viewer.clone(),
				width: w,
				height: h,
			},
			Services {
				host: host_init.clone(),
				store: store.clone(),
				clock: Rc::new(BrowserClock),
				zoom_cache: zoom_cache.clone(),
			},
		);
		ui.publish(&s);
		*state_init.borrow_mut() = Some(s);

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*frames_init.resize.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = measure(&canvas_resize, width, height);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *frames_init.resize.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (frames_anim, alive_anim) = (frames_init.clone(), alive_init.clone());
		let mut images = ImageCache::default();
		*frames_init.frame.borrow_mut() = Some(Closure::new(move || {
			let window: Option<Window> = web_sys::window();
			if !alive_anim.load(Ordering::Relaxed) {
				let (frame, resize) = frames_anim.teardown();
				if let (Some(window), Some(cb)) = (&window, resize.as_ref()) {
					let _ = window
						.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
				}
				// This closure is still running; free it once the frame returns.
				if let Some(frame) = frame {
					spawn_local(async move { drop(frame) });
				}
				return;
			}
			if let Some(ref mut s) = *frames_anim.state.borrow_mut() {
				s.tick();
				render::render(s, &ctx, &mut images, s.now_ms());
				ui.publish(s);
			}
			if let (Some(window), Some(cb)) = (window, frames_anim.frame.borrow().as_ref()) {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *frames_init.frame.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let (state_cmd, host_cmd) = (state.clone(), host.clone());
	Effect::new(move |_| {
		let Some(command) = pending.get() else {
			return;
		};
		pending.set(None);
		run_command(&state_cmd, &host_cmd, ui, command);
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pointer_down(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.pointer_move(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.pointer_up(x, y);
			ui.publish(s);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.pointer_leave();
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.wheel(x, y, ev.delta_y());
		}
	};

	let state_cm = state.clone();
	let on_contextmenu = move |ev: MouseEvent| {
		ev.prevent_default();
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_cm.borrow_mut() {
			if let Some(target) = s.context_menu(x, y) {
				open_editor(s, target, ui);
			}
		}
	};

	let state_dr = state.clone();
	let on_drop = move |ev: DragEvent| {
		ev.prevent_default();
		let Some(text) = ev.data_transfer().and_then(|dt| dt.get_data("text/plain").ok()) else {
			return;
		};
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_dr.borrow_mut() {
			if let Err(e) = s.drop_data(&text, x, y) {
				debug!("Network Widget | drop not applied: {e}");
			}
		}
	};

	let command = move |c: UiCommand| move |_: MouseEvent| pending.set(Some(c.clone()));
	let toolbar = is_gm.then(|| {
		view! {
			<div class="network-toolbar">
				<button class:active=move || ui.linking.get() on:click=command(UiCommand::ToggleLinking)>
					{move || if ui.linking.get() { "Exit Link Mode" } else { "Link Mode" }}
				</button>
				<button class:active=move || ui.arranging.get() on:click=command(UiCommand::ToggleArrange)>
					"Annotation Arrange"
				</button>
				<button on:click=command(UiCommand::CreateAnnotation)>"Create Annotation"</button>
				<button on:click=command(UiCommand::AddEmptyNode)>"Add Empty Node"</button>
				<button class:active=move || ui.locked.get() on:click=command(UiCommand::ToggleLock)>
					{move || if ui.locked.get() { "Unlock Nodes" } else { "Lock Nodes" }}
				</button>
				<button on:click=command(UiCommand::ClearAll)>"Clear All"</button>
				<button on:click=command(UiCommand::Export)>"Export"</button>
				<button on:click=command(UiCommand::Import)>"Import"</button>
			</div>
		}
	});

	view! {
		<div class="network-widget">
			{toolbar}
			<div class="network-toolbar network-toolbar-view">
				<button on:click=command(UiCommand::ResetZoom)>"Reset Zoom"</button>
			</div>
			<p class="network-instructions">{move || ui.instructions.get()}</p>
			{move || ui.failure.get().map(|message| view! { <p class="network-error">{message}</p> })}
			<div class="network-stage">
				<canvas
					node_ref=canvas_ref
					class="network-canvas"
					on:mousedown=on_mousedown
					on:mousemove=on_mousemove
					on:mouseup=on_mouseup
					on:mouseleave=on_mouseleave
					on:wheel=on_wheel
					on:contextmenu=on_contextmenu
					on:dragover=|ev: DragEvent| ev.prevent_default()
					on:drop=on_drop
					style="display: block; cursor: grab;"
				/>
				{move || ui.tooltip.get().map(tooltip_view)}
				{move || ui.node_editor.get().map(|editor| node_editor_view(editor, ui, pending))}
				{move || ui.image_editor.get().map(|(id, form)| image_editor_view(id, form, ui, pending))}
			</div>
		</div>
	}
}

fn tooltip_view(t: TooltipView) -> impl IntoView {
	let style = format!(
		"left: {}px; top: {}px; background: {}; color: {}; border: 1px solid {}; border-radius: {}px; font-size: {}px;",
		t.x, t.y, t.style.background, t.style.color, t.style.border, t.style.radius, t.style.font_size
	);
	view! { <div class="network-tooltip" style=style>{t.text}</div> }
}

fn node_editor_view(editor: NodeEditor, ui: UiSignals, pending: RwSignal<Option<UiCommand>>) -> impl IntoView {
	let NodeEditor {
		id,
		title,
		label_only,
		form,
	} = editor;
	let submit = {
		let id = id.clone();
		move |command: fn(String) -> UiCommand| {
			let id = id.clone();
			move |_: MouseEvent| {
				ui.node_editor.set(None);
				pending.set(Some(command(id.clone())));
			}
		}
	};
	let save = {
		let id = id.clone();
		move |_: MouseEvent| {
			if let Some(editor) = ui.node_editor.get_untracked() {
				pending.set(Some(UiCommand::SaveNode(id.clone(), editor.form)));
			}
			ui.node_editor.set(None);
		}
	};
	let shapes = NodeShape::ALL
		.into_iter()
		.map(|shape| view! { <option value=shape.as_str() selected={shape == form.shape}>{shape.as_str()}</option> })
		.collect_view();
	let presets = NODE_SIZE_PRESETS
		.into_iter()
		.map(|size| view! { <option value=size.to_string() /> })
		.collect_view();
	let text_fields = if label_only {
		view! {
			<label>"Label"
				<input type="text" prop:value=form.label.clone()
					on:input=move |ev| ui.edit_node(|f| f.label = event_target_value(&ev)) />
			</label>
			<label>"Text colour"
				<input type="color" prop:value=form.text_color.clone()
					on:input=move |ev| ui.edit_node(|f| f.text_color = event_target_value(&ev)) />
			</label>
		}
		.into_any()
	} else {
		view! {
			<label>
				<input type="checkbox" prop:checked=form.hidden_from_players
					on:change=move |ev| ui.edit_node(|f| f.hidden_from_players = event_target_checked(&ev)) />
				"Hidden from players"
			</label>
			<label>"Image URL"
				<input type="text" prop:value=form.img.clone()
					on:input=move |ev| ui.edit_node(|f| f.img = event_target_value(&ev)) />
			</label>
		}
		.into_any()
	};

	view! {
		<div class="network-editor">
			<h3>{title}</h3>
			{text_fields}
			<label>"Custom name"
				<input type="text" prop:value=form.custom_name.clone()
					on:input=move |ev| ui.edit_node(|f| f.custom_name = event_target_value(&ev)) />
			</label>
			<label>"Colour"
				<input type="color" prop:value=form.color.clone()
					on:input=move |ev| ui.edit_node(|f| f.color = event_target_value(&ev)) />
			</label>
			<label>"Shape"
				<select on:change=move |ev| ui.edit_node(|f| f.shape = NodeShape::parse(&event_target_value(&ev)))>
					{shapes}
				</select>
			</label>
			<label>"Size"
				<input type="number" min="1" list="network-node-sizes" prop:value=form.size.clone()
					on:input=move |ev| ui.edit_node(|f| f.size = event_target_value(&ev)) />
				<datalist id="network-node-sizes">{presets}</datalist>
			</label>
			<label>"Tooltip"
				<input type="text" prop:value=form.custom_tooltip.clone()
					on:input=move |ev| ui.edit_node(|f| f.custom_tooltip = event_target_value(&ev)) />
			</label>
			<fieldset>
				<legend>"Tooltip style"</legend>
				<input type="color" prop:value=form.tooltip.background.clone()
					on:input=move |ev| ui.edit_node(|f| f.tooltip.background = event_target_value(&ev)) />
				<input type="color" prop:value=form.tooltip.color.clone()
					on:input=move |ev| ui.edit_node(|f| f.tooltip.color = event_target_value(&ev)) />
				<input type="color" prop:value=form.tooltip.border.clone()
					on:input=move |ev| ui.edit_node(|f| f.tooltip.border = event_target_value(&ev)) />
				<input type="number" min="0" prop:value=form.tooltip.radius.to_string()
					on:input=move |ev| {
						let radius = event_target_value(&ev).parse().ok();
						ui.edit_node(|f| f.tooltip.radius = radius.unwrap_or(f.tooltip.radius))
					} />
				<input type="number" min="6" prop:value=form.tooltip.font_size.to_string()
					on:input=move |ev| {
						let size = event_target_value(&ev).parse().ok();
						ui.edit_node(|f| f.tooltip.font_size = size.unwrap_or(f.tooltip.font_size))
					} />
			</fieldset>
			<div class="network-editor-actions">
				<button on:click=save>"Save"</button>
				<button on:click=submit(UiCommand::OpenNode)>"Open"</button>
				<button on:click=submit(UiCommand::ResetNode)>"Reset to default"</button>
				<button on:click=submit(UiCommand::RemoveNode)>"Remove from network"</button>
				<button on:click=move |_| ui.node_editor.set(None)>"Cancel"</button>
			</div>
		</div>
	}
}

fn image_editor_view(
	id: String,
	form: ImageForm,
	ui: UiSignals,
	pending: RwSignal<Option<UiCommand>>,
) -> impl IntoView {
	let submit = {
		let id = id.clone();
		move |command: fn(String) -> UiCommand| {
			let id = id.clone();
			move |_: MouseEvent| {
				ui.image_editor.set(None);
				pending.set(Some(command(id.clone())));
			}
		}
	};
	let save = {
		let id = id.clone();
		move |_: MouseEvent| {
			if let Some((_, form)) = ui.image_editor.get_untracked() {
				pending.set(Some(UiCommand::SaveImage(id.clone(), form)));
			}
			ui.image_editor.set(None);
		}
	};
	let number = |raw: String| raw.trim().parse::<f64>().ok();
	let filters = ImageFilter::ALL
		.into_iter()
		.map(|f| view! { <option value=f.label() selected={f == form.filter}>{f.label()}</option> })
		.collect_view();
	let animations = Animation::ALL
		.into_iter()
		.map(|a| {
			let name = if a == Animation::None { "none" } else { a.as_str() };
			view! { <option value=a.as_str() selected={a == form.animation}>{name}</option> }
		})
		.collect_view();
	let borders = [BorderStyle::Solid, BorderStyle::Dashed, BorderStyle::Dotted]
		.into_iter()
		.map(|b| view! { <option value=b.as_str() selected={b == form.border.style}>{b.as_str()}</option> })
		.collect_view();

	view! {
		<div class="network-editor">
			<h3>"Floating image"</h3>
			<label>"Width"
				<input type="number" min="20" prop:value=form.width.clone()
					on:input=move |ev| ui.edit_image(|f| f.width = event_target_value(&ev)) />
			</label>
			<label>"Filter"
				<select on:change=move |ev| {
					let label = event_target_value(&ev);
					ui.edit_image(|f| {
						f.filter = ImageFilter::ALL.into_iter().find(|x| x.label() == label).unwrap_or_default()
					})
				}>{filters}</select>
			</label>
			<label>"Animation"
				<select on:change=move |ev| ui.edit_image(|f| f.animation = Animation::parse(&event_target_value(&ev)))>
					{animations}
				</select>
			</label>
			<label>"Rotation"
				<input type="number" prop:value=form.rotation.clone()
					on:input=move |ev| ui.edit_image(|f| f.rotation = event_target_value(&ev)) />
			</label>
			<label>"Opacity"
				<input type="range" min="0" max="100" prop:value=form.opacity.clone()
					on:input=move |ev| ui.edit_image(|f| f.opacity = event_target_value(&ev)) />
			</label>
			<fieldset>
				<legend>"Border"</legend>
				<input type="color" prop:value=form.border.color.clone()
					on:input=move |ev| ui.edit_image(|f| f.border.color = event_target_value(&ev)) />
				<input type="number" min="0" prop:value=form.border.width.to_string()
					on:input=move |ev| {
						let width = number(event_target_value(&ev));
						ui.edit_image(|f| f.border.width = width.unwrap_or(f.border.width))
					} />
				<select on:change=move |ev| ui.edit_image(|f| f.border.style = BorderStyle::parse(&event_target_value(&ev)))>
					{borders}
				</select>
			</fieldset>
			<fieldset>
				<legend>"Shadow"</legend>
				<input type="checkbox" prop:checked=form.shadow.enabled
					on:change=move |ev| ui.edit_image(|f| f.shadow.enabled = event_target_checked(&ev)) />
				<input type="color" prop:value=form.shadow.color.clone()
					on:input=move |ev| ui.edit_image(|f| f.shadow.color = event_target_value(&ev)) />
				<input type="number" min="0" prop:value=form.shadow.blur.to_string()
					on:input=move |ev| {
						let blur = number(event_target_value(&ev));
						ui.edit_image(|f| f.shadow.blur = blur.unwrap_or(f.shadow.blur))
					} />
				<input type="number" prop:value=form.shadow.offset_x.to_string()
					on:input=move |ev| {
						let x = number(event_target_value(&ev));
						ui.edit_image(|f| f.shadow.offset_x = x.unwrap_or(f.shadow.offset_x))
					} />
				<input type="number" prop:value=form.shadow.offset_y.to_string()
					on:input=move |ev| {
						let y = number(event_target_value(&ev));
						ui.edit_image(|f| f.shadow.offset_y = y.unwrap_or(f.shadow.offset_y))
					} />
			</fieldset>
			<label>"Linked document"
				<input type="text" prop:value=form.linked_uuid.clone()
					on:input=move |ev| ui.edit_image(|f| f.linked_uuid = event_target_value(&ev)) />
			</label>
			<label>
				<input type="checkbox" prop:checked=form.locked
					on:change=move |ev| ui.edit_image(|f| f.locked = event_target_checked(&ev)) />
				"Locked"
			</label>
			<div class="network-editor-actions">
				<button on:click=save>"Save"</button>
				<button on:click=submit(UiCommand::ImageToFront)>"Bring to front"</button>
				<button on:click=submit(UiCommand::ImageToBack)>"Send to back"</button>
				<button on:click=submit(UiCommand::ToggleImageLock)>"Toggle lock"</button>
				<button on:click=submit(UiCommand::DeleteImage)>"Delete"</button>
				<button on:click=move |_| ui.image_editor.set(None)>"Cancel"</button>
			</div>
		</div>
	}
}

use std::rc::Rc;

use leptos::prelude::*;
use log::warn;

use crate::components::network_graph::{
	BrowserHost, DocumentInfo, DocumentKind, Host, LocalStorageStore, MemoryStore, NetworkWidget,
	Store, Toast, Viewer,
};

/// Sample catalogue the demo host resolves drops against.
fn sample_documents() -> Vec<DocumentInfo> {
	let doc = |uuid: &str, name: &str, kind: DocumentKind, img: Option<&str>| DocumentInfo {
		uuid: uuid.to_string(),
		name: name.to_string(),
		kind,
		img: img.map(str::to_string),
		thumb: None,
	};
	vec![
		doc("Actor.aldric", "Aldric Vane", DocumentKind::Actor, Some("icons/svg/mystery-man.svg")),
		doc("Actor.mirel", "Mirel the Grey", DocumentKind::Actor, None),
		doc("Item.sigil", "Broken Sigil", DocumentKind::Item, None),
		doc("JournalEntry.harbour", "Harbour District", DocumentKind::JournalEntry, None),
		doc("RollTable.rumours", "Tavern Rumours", DocumentKind::RollTable, None),
	]
}

/// Drag payload in the shape the host emits for its sidebar entries.
fn drag_payload(doc: &DocumentInfo) -> String {
	serde_json::json!({ "type": doc.kind.as_str(), "uuid": doc.uuid }).to_string()
}

fn open_store() -> Rc<dyn Store> {
	match LocalStorageStore::open() {
		Ok(store) => Rc::new(store),
		Err(e) => {
			warn!(
				"Network Widget | local storage unavailable, changes will not survive a reload: {e}"
			);
			Rc::new(MemoryStore::new())
		}
	}
}

#[component]
fn Palette() -> impl IntoView {
	let tile = serde_json::json!({
		"type": "Tile",
		"texture": { "src": "icons/svg/castle.svg" }
	})
	.to_string();
	let entries = sample_documents()
		.into_iter()
		.map(|doc| {
			let payload = drag_payload(&doc);
			let label = format!("{} ({})", doc.name, doc.kind);
			entry(label, payload)
		})
		.collect_view();

	view! {
		<aside class="palette">
			<h2>"Documents"</h2>
			<ul>
				{entries}
				{entry("Castle tile".to_string(), tile)}
			</ul>
		</aside>
	}
}

fn entry(label: String, payload: String) -> impl IntoView {
	view! {
		<li
			draggable="true"
			on:dragstart=move |ev: web_sys::DragEvent| {
				if let Some(data) = ev.data_transfer() {
					let _ = data.set_data("text/plain", &payload);
				}
			}
		>
			{label}
		</li>
	}
}

/// Demo page hosting a single network widget. `gm` picks the viewer role.
#[component]
pub fn Home(#[prop(default = true)] gm: bool) -> impl IntoView {
	let toasts = RwSignal::new(Vec::<Toast>::new());
	// Aldric is only observable by the GM.
	let host: Rc<dyn Host> = Rc::new(BrowserHost::new(
		sample_documents(),
		["Actor.aldric".to_string()],
		toasts,
	));
	let viewer = if gm { Viewer::gm("gm") } else { Viewer::player("player-1") };

	view! {
		<div class="network-page">
			<header>
				<h1>"Relationship Network"</h1>
				<nav>
					<a href="/">"GM view"</a>
					" | "
					<a href="/player">"Player view"</a>
				</nav>
			</header>
			<div class="network-layout">
				{gm.then(|| view! { <Palette /> })}
				<NetworkWidget
					document_id="JournalEntry.demo"
					widget_id="network-1"
					viewer=viewer
					host=host
					store=open_store()
				/>
			</div>
			<ul class="toasts">
				<For
					each=move || toasts.get()
					key=|toast| toast.id
					children=move |toast: Toast| {
						let id = toast.id;
						view! {
							<li
								class=toast.level.class()
								on:click=move |_| toasts.update(|all| all.retain(|t| t.id != id))
							>
								{toast.message}
							</li>
						}
					}
				/>
			</ul>
		</div>
	}
}

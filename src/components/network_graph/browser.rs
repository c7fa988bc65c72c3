//! Browser side of the host collaborators: window dialogs, toast
//! notifications, the wall clock and the async clipboard.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};

use js_sys::{Array, Function, Promise, Reflect};
use leptos::prelude::*;
use log::{error, info, warn};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use super::error::ClipboardError;
use super::host::{DocumentInfo, DocumentKind, Host, Viewer};
use super::viewport::Clock;

/// Toasts kept on screen at once.
const TOAST_LIMIT: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastLevel {
	Info,
	Warn,
	Error,
}

impl ToastLevel {
	pub fn class(self) -> &'static str {
		match self {
			Self::Info => "toast toast-info",
			Self::Warn => "toast toast-warn",
			Self::Error => "toast toast-error",
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
	pub id: u64,
	pub level: ToastLevel,
	pub message: String,
}

/// Host backed by an in-page document catalogue.
pub struct BrowserHost {
	documents: HashMap<String, DocumentInfo>,
	/// Documents only a GM may observe.
	restricted: HashSet<String>,
	toasts: RwSignal<Vec<Toast>>,
	next_toast: Cell<u64>,
}

impl BrowserHost {
	pub fn new(
		documents: impl IntoIterator<Item = DocumentInfo>,
		restricted: impl IntoIterator<Item = String>,
		toasts: RwSignal<Vec<Toast>>,
	) -> Self {
		Self {
			documents: documents
				.into_iter()
				.map(|doc| (doc.uuid.clone(), doc))
				.collect(),
			restricted: restricted.into_iter().collect(),
			toasts,
			next_toast: Cell::new(0),
		}
	}

	fn toast(&self, level: ToastLevel, message: &str) {
		let id = self.next_toast.get() + 1;
		self.next_toast.set(id);
		self.toasts.update(|toasts| {
			toasts.push(Toast {
				id,
				level,
				message: message.to_string(),
			});
			let overflow = toasts.len().saturating_sub(TOAST_LIMIT);
			toasts.drain(..overflow);
		});
	}
}

impl Host for BrowserHost {
	fn resolve_by_identifier(&self, id: &str) -> Option<DocumentInfo> {
		self.documents.get(id).cloned()
	}

	fn check_observe_permission(&self, doc: &DocumentInfo, viewer: &Viewer) -> bool {
		viewer.is_gm || !self.restricted.contains(&doc.uuid)
	}

	fn open_document_view(&self, id: &str, kind: &DocumentKind) {
		let name = self
			.documents
			.get(id)
			.map(|doc| doc.name.as_str())
			.unwrap_or(id);
		info!("Network Widget | opening {kind} sheet {id}");
		self.toast(ToastLevel::Info, &format!("Opened the {kind} sheet for {name}."));
	}

	fn prompt_text(&self, message: &str, default: &str) -> Option<String> {
		web_sys::window()?
			.prompt_with_message_and_default(message, default)
			.ok()
			.flatten()
	}

	fn prompt_confirm(&self, message: &str) -> bool {
		web_sys::window()
			.and_then(|w| w.confirm_with_message(message).ok())
			.unwrap_or(false)
	}

	fn notify_info(&self, message: &str) {
		info!("Network Widget | {message}");
		self.toast(ToastLevel::Info, message);
	}

	fn notify_warn(&self, message: &str) {
		warn!("Network Widget | {message}");
		self.toast(ToastLevel::Warn, message);
	}

	fn notify_error(&self, message: &str) {
		error!("Network Widget | {message}");
		self.toast(ToastLevel::Error, message);
	}
}

pub struct BrowserClock;

impl Clock for BrowserClock {
	fn now_ms(&self) -> f64 {
		js_sys::Date::now()
	}
}

fn rejected(e: JsValue) -> ClipboardError {
	ClipboardError::Rejected(e.as_string().unwrap_or_else(|| format!("{e:?}")))
}

/// `navigator.clipboard` is missing outside secure contexts, so it is looked
/// up dynamically.
async fn call_clipboard(method: &str, args: &Array) -> Result<JsValue, ClipboardError> {
	let window = web_sys::window().ok_or(ClipboardError::Unavailable)?;
	let clipboard = Reflect::get(&window.navigator(), &JsValue::from_str("clipboard"))
		.map_err(|_| ClipboardError::Unavailable)?;
	if clipboard.is_undefined() || clipboard.is_null() {
		return Err(ClipboardError::Unavailable);
	}
	let function: Function = Reflect::get(&clipboard, &JsValue::from_str(method))
		.map_err(|_| ClipboardError::Unavailable)?
		.dyn_into()
		.map_err(|_| ClipboardError::Unavailable)?;
	let promise: Promise = function
		.apply(&clipboard, args)
		.map_err(rejected)?
		.dyn_into()
		.map_err(rejected)?;
	JsFuture::from(promise).await.map_err(rejected)
}

pub async fn write_clipboard(text: &str) -> Result<(), ClipboardError> {
	call_clipboard("writeText", &Array::of1(&JsValue::from_str(text)))
		.await
		.map(|_| ())
}

pub async fn read_clipboard() -> Result<String, ClipboardError> {
	call_clipboard("readText", &Array::new())
		.await?
		.as_string()
		.ok_or_else(|| ClipboardError::Rejected("clipboard did not hold text".into()))
}

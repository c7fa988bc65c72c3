//! Test doubles for the host, the clock and storage.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use super::host::{DocumentInfo, DocumentKind, Host, Viewer};
use super::persistence::MemoryStore;
use super::state::{NetworkState, Services, SharedZoomCache, WidgetConfig};
use super::viewport::{Clock, ZoomCache};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
	Info(String),
	Warn(String),
	Error(String),
}

#[derive(Default)]
pub struct FakeHost {
	pub documents: HashMap<String, DocumentInfo>,
	/// Documents only a GM may observe.
	pub restricted: HashSet<String>,
	pub prompt_answers: RefCell<VecDeque<Option<String>>>,
	pub confirm_answers: RefCell<VecDeque<bool>>,
	pub opened: RefCell<Vec<(String, DocumentKind)>>,
	pub notices: RefCell<Vec<Notice>>,
}

impl FakeHost {
	pub fn with_sample_documents() -> Self {
		let mut host = Self::default();
		let docs = [
			("Actor.mira", "Mira", DocumentKind::Actor, Some("mira.webp"), None),
			("Actor.secret", "Shadow Broker", DocumentKind::Actor, None, None),
			("Item.sword", "Sword", DocumentKind::Item, None, None),
			("Scene.keep", "Keep", DocumentKind::Scene, None, Some("keep-thumb.webp")),
			(
				"JournalEntry.j.JournalEntryPage.p",
				"Rumours",
				DocumentKind::JournalEntryPage,
				None,
				Some("journal.webp"),
			),
		];
		for (uuid, name, kind, img, thumb) in docs {
			host.documents.insert(
				uuid.to_string(),
				DocumentInfo {
					uuid: uuid.to_string(),
					name: name.to_string(),
					kind,
					img: img.map(str::to_string),
					thumb: thumb.map(str::to_string),
				},
			);
		}
		host.restricted.insert("Actor.secret".into());
		host
	}

	pub fn answer_prompt(&self, answer: Option<&str>) {
		self.prompt_answers
			.borrow_mut()
			.push_back(answer.map(str::to_string));
	}

	pub fn answer_confirm(&self, answer: bool) {
		self.confirm_answers.borrow_mut().push_back(answer);
	}

	pub fn last_notice(&self) -> Option<Notice> {
		self.notices.borrow().last().cloned()
	}
}

impl Host for FakeHost {
	fn resolve_by_identifier(&self, id: &str) -> Option<DocumentInfo> {
		self.documents.get(id).cloned()
	}

	fn check_observe_permission(&self, doc: &DocumentInfo, viewer: &Viewer) -> bool {
		viewer.is_gm || !self.restricted.contains(&doc.uuid)
	}

	fn open_document_view(&self, id: &str, kind: &DocumentKind) {
		self.opened.borrow_mut().push((id.to_string(), kind.clone()));
	}

	/// Unscripted prompts are cancelled.
	fn prompt_text(&self, _message: &str, _default: &str) -> Option<String> {
		self.prompt_answers.borrow_mut().pop_front().flatten()
	}

	fn prompt_confirm(&self, _message: &str) -> bool {
		self.confirm_answers.borrow_mut().pop_front().unwrap_or(false)
	}

	fn notify_info(&self, message: &str) {
		self.notices.borrow_mut().push(Notice::Info(message.into()));
	}

	fn notify_warn(&self, message: &str) {
		self.notices.borrow_mut().push(Notice::Warn(message.into()));
	}

	fn notify_error(&self, message: &str) {
		self.notices.borrow_mut().push(Notice::Error(message.into()));
	}
}

#[derive(Debug, Default)]
pub struct ManualClock {
	now: Cell<f64>,
}

impl ManualClock {
	pub fn at(ms: f64) -> Self {
		Self { now: Cell::new(ms) }
	}

	pub fn advance(&self, ms: f64) {
		self.now.set(self.now.get() + ms);
	}
}

impl Clock for ManualClock {
	fn now_ms(&self) -> f64 {
		self.now.get()
	}
}

/// One widget document shared by every state opened from it, 800x600.
pub struct Harness {
	pub host: Rc<FakeHost>,
	pub store: Rc<MemoryStore>,
	pub clock: Rc<ManualClock>,
	pub cache: SharedZoomCache,
}

impl Harness {
	pub fn new() -> Self {
		Self {
			host: Rc::new(FakeHost::with_sample_documents()),
			store: Rc::new(MemoryStore::new()),
			clock: Rc::new(ManualClock::at(1_000.0)),
			cache: Arc::new(Mutex::new(ZoomCache::default())),
		}
	}

	pub fn open(&self, viewer: Viewer) -> NetworkState {
		NetworkState::open(
			WidgetConfig {
				document_id: "JournalEntry.j".into(),
				widget_id: "w1".into(),
				viewer,
				width: 800.0,
				height: 600.0,
			},
			Services {
				host: self.host.clone(),
				store: self.store.clone(),
				clock: self.clock.clone(),
				zoom_cache: self.cache.clone(),
			},
		)
	}
}

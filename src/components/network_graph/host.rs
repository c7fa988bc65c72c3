//! The host application the widget is embedded in. Document lookup,
//! permission checks, document sheets, prompts and notifications all belong
//! to the host; the widget only talks to it through [`Host`].

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DocumentKind {
	Actor,
	Item,
	JournalEntry,
	JournalEntryPage,
	RollTable,
	Scene,
	Unknown,
	Other(String),
}

impl DocumentKind {
	/// Kinds the widget accepts as node drops.
	pub const DROPPABLE: [DocumentKind; 6] = [
		DocumentKind::Actor,
		DocumentKind::Item,
		DocumentKind::JournalEntry,
		DocumentKind::JournalEntryPage,
		DocumentKind::RollTable,
		DocumentKind::Scene,
	];

	pub fn parse(raw: &str) -> Self {
		match raw {
			"Actor" => Self::Actor,
			"Item" => Self::Item,
			"JournalEntry" => Self::JournalEntry,
			"JournalEntryPage" => Self::JournalEntryPage,
			"RollTable" => Self::RollTable,
			"Scene" => Self::Scene,
			"Unknown" => Self::Unknown,
			other => Self::Other(other.to_string()),
		}
	}

	pub fn as_str(&self) -> &str {
		match self {
			Self::Actor => "Actor",
			Self::Item => "Item",
			Self::JournalEntry => "JournalEntry",
			Self::JournalEntryPage => "JournalEntryPage",
			Self::RollTable => "RollTable",
			Self::Scene => "Scene",
			Self::Unknown => "Unknown",
			Self::Other(raw) => raw,
		}
	}

	pub fn is_droppable(&self) -> bool {
		Self::DROPPABLE.contains(self)
	}

	/// Image used when the document itself has none.
	pub fn fallback_image(&self) -> &'static str {
		match self {
			Self::Item => "icons/svg/item-bag.svg",
			Self::JournalEntry => "icons/sundries/books/book-backed-silver-gold.webp",
			Self::JournalEntryPage => "icons/sundries/scrolls/scroll-bound-black-tan.webp",
			Self::RollTable => "icons/svg/d20-black.svg",
			Self::Scene => "icons/svg/compass.svg",
			_ => MYSTERY_IMAGE,
		}
	}
}

impl fmt::Display for DocumentKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

pub const MYSTERY_IMAGE: &str = "icons/svg/mystery-man.svg";

/// What the host reports about a document.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentInfo {
	pub uuid: String,
	pub name: String,
	pub kind: DocumentKind,
	pub img: Option<String>,
	/// Scene thumbnail, or the parent journal's image for journal pages.
	pub thumb: Option<String>,
}

impl DocumentInfo {
	/// Image shown on a node for this document.
	pub fn display_image(&self) -> String {
		let own = match self.kind {
			DocumentKind::JournalEntry => None,
			DocumentKind::JournalEntryPage | DocumentKind::Scene => self.thumb.as_deref(),
			_ => self.img.as_deref(),
		};
		own.filter(|s| !s.is_empty())
			.unwrap_or(self.kind.fallback_image())
			.to_string()
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Viewer {
	pub user_id: String,
	pub is_gm: bool,
}

impl Viewer {
	pub fn gm(user_id: impl Into<String>) -> Self {
		Self {
			user_id: user_id.into(),
			is_gm: true,
		}
	}

	pub fn player(user_id: impl Into<String>) -> Self {
		Self {
			user_id: user_id.into(),
			is_gm: false,
		}
	}
}

pub trait Host {
	fn resolve_by_identifier(&self, id: &str) -> Option<DocumentInfo>;
	fn check_observe_permission(&self, doc: &DocumentInfo, viewer: &Viewer) -> bool;
	fn open_document_view(&self, id: &str, kind: &DocumentKind);
	/// `None` when the user cancelled.
	fn prompt_text(&self, message: &str, default: &str) -> Option<String>;
	fn prompt_confirm(&self, message: &str) -> bool;
	fn notify_info(&self, message: &str);
	fn notify_warn(&self, message: &str);
	fn notify_error(&self, message: &str);
}

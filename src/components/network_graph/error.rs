use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
	#[error("no node with id `{0}` on the graph")]
	UnknownNode(String),
	#[error("`{0}` is already on the graph")]
	DuplicateNode(String),
	#[error("a node cannot be linked to itself")]
	SelfLink,
	#[error("no link between `{0}` and `{1}`")]
	UnknownLink(String, String),
	#[error("no floating image with id `{0}`")]
	UnknownImage(String),
	#[error("no annotation with id `{0}`")]
	UnknownAnnotation(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
	#[error("stored document is not valid JSON: {0}")]
	Json(#[from] serde_json::Error),
	#[error("storage unavailable: {0}")]
	Unavailable(String),
}

#[derive(Debug, Error)]
pub enum DropError {
	#[error("drop data is not valid JSON: {0}")]
	Unparseable(#[from] serde_json::Error),
	#[error("`{0}` cannot be dropped onto the network")]
	UnsupportedKind(String),
	#[error("drop data names no document")]
	MissingUuid,
	#[error("could not find the dropped document `{0}`")]
	DocumentNotFound(String),
	#[error("{0} is already in the network")]
	AlreadyPresent(String),
}

#[derive(Debug, Error)]
pub enum ImportError {
	#[error("clipboard does not contain valid JSON: {0}")]
	Json(#[from] serde_json::Error),
	#[error("import data has no `nodes` array")]
	MissingNodes,
	#[error("`{0}` must be an array")]
	NotAnArray(&'static str),
	#[error("invalid {section} entry #{index}: {source}")]
	Entry {
		section: &'static str,
		index: usize,
		#[source]
		source: serde_json::Error,
	},
	#[error("import cancelled")]
	Declined,
}

#[derive(Debug, Error)]
pub enum ClipboardError {
	#[error("clipboard is not available in this browser")]
	Unavailable,
	#[error("clipboard access was rejected: {0}")]
	Rejected(String),
}

mod browser;
mod component;
mod drop;
mod error;
mod host;
mod interaction;
mod layout;
mod model;
mod overlay;
mod persistence;
mod render;
mod scene;
mod schema;
mod settings;
mod state;
mod transfer;
mod types;
mod viewport;
mod visibility;

#[cfg(test)]
mod scenarios;
#[cfg(test)]
mod testing;

pub use browser::{BrowserHost, Toast, ToastLevel};
pub use component::NetworkWidget;
pub use host::{DocumentInfo, DocumentKind, Host, Viewer};
pub use persistence::{LocalStorageStore, MemoryStore, Store};
pub use state::SharedZoomCache;
pub use viewport::ZoomCache;

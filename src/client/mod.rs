//! Catalog Client
//!
//! Terminal counterpart of the web UI in `web/dist`. A [`CatalogView`] owns the
//! book list, the input draft and the edit target, and talks to the service through
//! any [`CatalogApi`]. Every mutation is followed by a full re-fetch of the list;
//! failures are logged and swallowed, so a failed refresh simply leaves stale data.
//!
//! # Usage
//!
//! ```rust,ignore
//! use catalog::client::{CatalogView, HttpCatalog};
//!
//! let mut view = CatalogView::new(HttpCatalog::new("http://127.0.0.1:8080"));
//! view.mount().await;
//! println!("{}", catalog::client::render_table(view.books()));
//! ```

mod http;
mod view;

pub use http::{CatalogApi, HttpCatalog};
pub use view::{CatalogView, render_table};

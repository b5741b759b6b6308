//! Support for library configuration options

use std::sync::{Arc, Mutex};
use std::time::Duration;

use once_cell::sync::Lazy;

/// The product name the [`Client`](crate::client::Client) sends as its `User-Agent`.
/// Feel free to override it when initing this library.
pub static PRODUCT_NAME: Lazy<Arc<Mutex<String>>> =
    Lazy::new(|| Arc::new(Mutex::new("Corkboard".to_string())));

/// How often a [`Client`](crate::client::Client) subscription polls the backend for a fresh document.
/// Feel free to override it when initing this library.
pub static SYNC_POLL_PERIOD: Lazy<Arc<Mutex<Duration>>> =
    Lazy::new(|| Arc::new(Mutex::new(Duration::from_secs(2))));

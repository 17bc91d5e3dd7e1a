//! Cart persistence seam.
//!
//! Browsers keep the cart in local storage; tests and native callers keep it
//! wherever they like. The cart only ever sees an opaque string, so a backend
//! is a pair of `load`/`save` operations over the serialized item list.

/// Storage backend for the serialized cart.
pub trait CartStorage {
    /// Returns the previously saved payload, or `None` if nothing was saved.
    fn load(&self) -> Option<String>;

    /// Persists the payload, replacing whatever was there before.
    fn save(&mut self, payload: &str);
}

/// In-memory backend.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    payload: Option<String>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeds the backend, e.g. with a payload from a previous session.
    #[must_use]
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            payload: Some(payload.into()),
        }
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self) -> Option<String> {
        self.payload.clone()
    }

    fn save(&mut self, payload: &str) {
        self.payload = Some(payload.to_owned());
    }
}

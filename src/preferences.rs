//! Persisted player preferences (currently just the mute flag).

use crate::core::constants::MUTED_KEY;
use crate::store::KeyValueStore;
use tracing::warn;

pub struct Preferences {
    muted: bool,
    store: Box<dyn KeyValueStore>,
}

impl Preferences {
    /// Anything other than a stored `"true"` means sound is on.
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let muted = match store.get(MUTED_KEY) {
            Ok(Some(raw)) => match raw.trim() {
                "true" => true,
                "false" => false,
                other => {
                    warn!(value = other, "unrecognized mute flag, defaulting to sound on");
                    false
                }
            },
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "could not read mute flag");
                false
            }
        };
        Self { muted, store }
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    /// Flip and persist the mute flag. Returns the new value.
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        let value = if self.muted { "true" } else { "false" };
        if let Err(e) = self.store.set(MUTED_KEY, value) {
            warn!(error = %e, "failed to save mute flag");
        }
        self.muted
    }
}

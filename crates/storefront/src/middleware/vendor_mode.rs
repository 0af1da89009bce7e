//! Vendor-mode extractor backed by the HTTP session.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use tracing::warn;

use crate::models::session_keys;
use crate::state::AppState;
use crate::vendor_mode::{SessionStorage, VendorMode};

/// The vendor-mode value held in the session, with pending changes.
#[derive(Debug, Default)]
pub struct SessionVendorSlot {
    value: Option<String>,
    dirty: bool,
}

impl SessionVendorSlot {
    /// Read the stored value.
    pub async fn load(session: &Session) -> Self {
        let value = session
            .get::<String>(session_keys::VENDOR_MODE)
            .await
            .ok()
            .flatten();
        Self {
            value,
            dirty: false,
        }
    }

    /// Write back a changed value.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn save(self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        if !self.dirty {
            return Ok(());
        }
        match self.value {
            Some(value) => session.insert(session_keys::VENDOR_MODE, value).await,
            None => session
                .remove::<String>(session_keys::VENDOR_MODE)
                .await
                .map(|_| ()),
        }
    }
}

impl SessionStorage for SessionVendorSlot {
    fn get(&self, key: &str) -> Option<String> {
        (key == session_keys::VENDOR_MODE)
            .then(|| self.value.clone())
            .flatten()
    }

    fn set(&mut self, key: &str, value: &str) {
        if key == session_keys::VENDOR_MODE && self.value.as_deref() != Some(value) {
            self.value = Some(value.to_string());
            self.dirty = true;
        }
    }

    fn remove(&mut self, key: &str) {
        if key == session_keys::VENDOR_MODE && self.value.is_some() {
            self.value = None;
            self.dirty = true;
        }
    }
}

/// Vendor mode evaluated for the current request.
///
/// A `vendor` parameter on the request URL is persisted to the session.
#[derive(Debug, Clone, Copy)]
pub struct CurrentVendorMode(pub VendorMode);

impl FromRequestParts<AppState> for CurrentVendorMode {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>().cloned() else {
            return Ok(Self(VendorMode::default()));
        };

        let base = &state.config().base_url;
        let path = parts.uri.path_and_query().map_or("/", |pq| pq.as_str());
        let location = base.join(path).unwrap_or_else(|_| base.clone());

        let mut slot = SessionVendorSlot::load(&session).await;
        let mode = VendorMode::load(&location, &mut slot);
        if let Err(e) = slot.save(&session).await {
            warn!(error = %e, "Failed to persist vendor mode");
        }

        Ok(Self(mode))
    }
}

/// Switch vendor mode on or off for this session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_vendor_mode(
    session: &Session,
    enabled: bool,
) -> Result<VendorMode, tower_sessions::session::Error> {
    let mut slot = SessionVendorSlot::load(session).await;
    let mut mode = VendorMode::default();
    if enabled {
        mode.enable(&mut slot);
    } else {
        mode.disable(&mut slot);
    }
    slot.save(session).await?;
    Ok(mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_tracks_changes() {
        let mut slot = SessionVendorSlot::default();
        slot.remove(session_keys::VENDOR_MODE);
        assert!(!slot.dirty);

        slot.set(session_keys::VENDOR_MODE, "1");
        assert!(slot.dirty);
        assert_eq!(slot.get(session_keys::VENDOR_MODE).as_deref(), Some("1"));
        assert_eq!(slot.get("other"), None);
    }

    #[test]
    fn test_unchanged_value_is_not_dirty() {
        let mut slot = SessionVendorSlot {
            value: Some("1".to_string()),
            dirty: false,
        };
        slot.set(session_keys::VENDOR_MODE, "1");
        assert!(!slot.dirty);
    }
}

//! Vendor-mode flag.
//!
//! Vendor mode only decides whether vendor controls are rendered; the
//! backend still checks every vendor operation. The flag is switched on by a
//! `vendor=1` location parameter (in the query string or in the query part of
//! a hash route) or explicitly, and persists in session storage until
//! disabled.

use std::collections::HashMap;

use url::Url;

/// Location parameter that switches vendor mode.
pub const VENDOR_PARAM: &str = "vendor";

/// Session storage key for the persisted value.
pub const VENDOR_MODE_KEY: &str = "vendorMode";

const ENABLED_VALUE: &str = "1";

/// Minimal key/value session storage.
pub trait SessionStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

impl SessionStorage for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        HashMap::remove(self, key);
    }
}

/// Read a parameter from the query string, then from a hash route's query.
///
/// `https://store.example/?vendor=1` and
/// `https://store.example/#/deals?vendor=1` both yield `Some("1")`.
#[must_use]
pub fn param_from_location(location: &Url, name: &str) -> Option<String> {
    if let Some(value) = find_param(location.query(), name) {
        return Some(value);
    }

    let fragment = location.fragment()?;
    let (_, query) = fragment.split_once('?')?;
    find_param(Some(query), name)
}

fn find_param(query: Option<&str>, name: &str) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Whether vendor controls are shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VendorMode {
    enabled: bool,
}

impl VendorMode {
    /// Evaluate the flag for `location`, persisting a location value.
    pub fn load(location: &Url, storage: &mut impl SessionStorage) -> Self {
        let mut mode = Self::default();
        mode.on_navigate(location, storage);
        mode
    }

    /// Re-evaluate after navigation, including hash changes.
    pub fn on_navigate(&mut self, location: &Url, storage: &mut impl SessionStorage) {
        let value = match param_from_location(location, VENDOR_PARAM) {
            Some(value) => {
                storage.set(VENDOR_MODE_KEY, &value);
                Some(value)
            }
            None => storage.get(VENDOR_MODE_KEY),
        };
        self.enabled = value.as_deref() == Some(ENABLED_VALUE);
    }

    pub fn enable(&mut self, storage: &mut impl SessionStorage) {
        storage.set(VENDOR_MODE_KEY, ENABLED_VALUE);
        self.enabled = true;
    }

    pub fn disable(&mut self, storage: &mut impl SessionStorage) {
        storage.remove(VENDOR_MODE_KEY);
        self.enabled = false;
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }
}

//! Configuration Port

use serde::de::DeserializeOwned;

/// Keyed configuration reads
///
/// Keys are dotted paths into the configuration tree, e.g.
/// `"session.ttl_secs"`.
pub trait ConfigProvider: Send + Sync {
    /// Raw value at `key`
    fn get_value(&self, key: &str) -> Option<serde_json::Value>;
}

/// Typed reads over any [`ConfigProvider`]
pub trait ConfigProviderExt {
    /// Value at `key` deserialized as `T`; `None` if absent or mistyped
    fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T>;
}

impl<C: ConfigProvider + ?Sized> ConfigProviderExt for C {
    fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_value(key)
            .and_then(|value| serde_json::from_value(value).ok())
    }
}

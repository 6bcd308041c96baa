//! Construction surface for [`MeteredCache`].
//!
//! The builder owns every configuration knob the decorator accepts: the
//! optional cache name, static custom tags, and whether disposing the
//! decorator also drops the wrapped cache. `try_build` validates the
//! configuration, reserves the cache name on the registry, and registers
//! both observable instruments, failing fast with [`ConfigError`] on any
//! misconfiguration.
//!
//! ## Example
//!
//! ```ignore
//! let registry = Arc::new(MeterRegistry::new());
//! let cache = MeteredCacheBuilder::new()
//!     .name("users")
//!     .tag("region", "eu-west-1")
//!     .try_build(inner, registry.clone())?;
//! ```

use std::sync::Arc;

use crate::decorator::{MeterCore, MeteredCache};
use crate::error::ConfigError;
use crate::publisher;
use crate::tags::{CACHE_NAME_KEY, REASON_KEY, RESULT_KEY, TagSet};
use crate::traits::{ObservableRegistry, ObservedCache};

/// Configuration builder for a [`MeteredCache`].
#[derive(Debug, Clone, Default)]
pub struct MeteredCacheBuilder {
    name: Option<String>,
    tags: Vec<(String, String)>,
    dispose_inner: bool,
}

impl MeteredCacheBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cache name.
    ///
    /// Emitted as the `cache.name` tag on every reading and reserved as a
    /// uniqueness key on the target registry.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add one static custom tag to every reading.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }

    /// Add several static custom tags.
    pub fn tags<I, S, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        self.tags
            .extend(tags.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Drop the wrapped cache when the decorator is disposed.
    ///
    /// Off by default: the wrapped cache then lives until the decorator
    /// value itself is dropped. For an `Arc`-shared cache this only ever
    /// releases the decorator's own handle.
    pub fn dispose_inner(mut self, dispose_inner: bool) -> Self {
        self.dispose_inner = dispose_inner;
        self
    }

    /// Validate the configured name and custom tags.
    pub fn validate_tags(&self) -> Result<(), ConfigError> {
        if let Some(name) = &self.name {
            if name.is_empty() {
                return Err(ConfigError::new("cache name must not be empty"));
            }
        }
        for (index, (key, _)) in self.tags.iter().enumerate() {
            if key.is_empty() {
                return Err(ConfigError::new("custom tag key must not be empty"));
            }
            if key == CACHE_NAME_KEY || key == RESULT_KEY || key == REASON_KEY {
                return Err(ConfigError::new(format!(
                    "custom tag key `{key}` is reserved"
                )));
            }
            if self.tags[..index].iter().any(|(seen, _)| seen == key) {
                return Err(ConfigError::new(format!(
                    "custom tag key `{key}` given more than once"
                )));
            }
        }
        Ok(())
    }

    /// Build the decorator around `inner`, registering its instruments on
    /// `registry`.
    ///
    /// Fails with [`ConfigError`] when the configuration is invalid or the
    /// cache name is already registered against this registry.
    pub fn try_build<C, K, V>(
        self,
        inner: C,
        registry: Arc<dyn ObservableRegistry>,
    ) -> Result<MeteredCache<C, K, V>, ConfigError>
    where
        C: ObservedCache<K, V>,
        K: 'static,
        V: 'static,
    {
        self.validate_tags()?;

        if let Some(name) = &self.name {
            if !registry.reserve_scope(name) {
                return Err(ConfigError::new(format!(
                    "cache name `{name}` already registered on this registry"
                )));
            }
        }

        let tags = TagSet::new(self.name.as_deref(), &self.tags);
        let core = Arc::new(MeterCore::new(tags));
        let instruments = publisher::register_instruments(registry.as_ref(), &core);

        Ok(MeteredCache::from_parts(
            inner,
            core,
            registry,
            instruments,
            self.name,
            self.dispose_inner,
        ))
    }
}

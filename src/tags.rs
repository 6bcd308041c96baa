//! Dimensional tags attached to metric readings.
//!
//! The base tag set (cache name plus configured custom tags) is composed
//! once at decorator construction and never mutated afterwards. Every
//! reading extends the base with exactly one dynamic dimension into a
//! freshly allocated vector, so concurrent polls never share a mutable
//! tag container.

/// Tag key carrying the configured cache name.
pub const CACHE_NAME_KEY: &str = "cache.name";

/// Dynamic tag key on lookup readings.
pub const RESULT_KEY: &str = "result";

/// Dynamic tag key on eviction readings.
pub const REASON_KEY: &str = "reason";

/// `result` tag value for a lookup that found the key.
pub const RESULT_HIT: &str = "hit";

/// `result` tag value for a lookup that did not find the key.
pub const RESULT_MISS: &str = "miss";

/// A single dimensional key/value pair on a metric reading.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Immutable base tags for one cache instance.
#[derive(Debug, Clone, Default)]
pub struct TagSet {
    base: Vec<Tag>,
}

impl TagSet {
    /// Compose the base tag set from the cache name and custom tags.
    ///
    /// The cache name tag, when present, sorts first so readings group
    /// predictably in backend output.
    pub fn new(cache_name: Option<&str>, custom: &[(String, String)]) -> Self {
        let mut base = Vec::with_capacity(custom.len() + usize::from(cache_name.is_some()));
        if let Some(name) = cache_name {
            base.push(Tag::new(CACHE_NAME_KEY, name));
        }
        for (key, value) in custom {
            base.push(Tag::new(key.clone(), value.clone()));
        }
        Self { base }
    }

    /// The base tags, without any dynamic dimension.
    #[inline]
    pub fn base(&self) -> &[Tag] {
        &self.base
    }

    /// Build the tag vector for one reading: base tags plus exactly one
    /// dynamic dimension.
    ///
    /// Returns an independent, freshly allocated vector on every call.
    pub fn compose(&self, key: &str, value: &str) -> Vec<Tag> {
        let mut tags = Vec::with_capacity(self.base.len() + 1);
        tags.extend(self.base.iter().cloned());
        tags.push(Tag::new(key, value));
        tags
    }
}

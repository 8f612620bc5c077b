//! Builder for configuring a [`ContentProcessor`].

use std::time::Duration;

use crate::cache::{DEFAULT_CAPACITY, DEFAULT_TTL, ResultCache};
use crate::error::{Result, RichContentError};
use crate::processor::ContentProcessor;

/// Builder for configuring a [`ContentProcessor`](crate::ContentProcessor).
///
/// Provides a fluent API for setting the result cache's capacity and entry
/// lifetime.
///
/// # Example
///
/// ```
/// use rich_content::ContentProcessorBuilder;
/// use std::time::Duration;
///
/// let processor = ContentProcessorBuilder::new()
///     .cache_capacity(200)
///     .cache_ttl(Duration::from_secs(60))
///     .build()
///     .unwrap();
/// assert_eq!(processor.cache().capacity(), 200);
/// ```
#[derive(Debug, Clone)]
pub struct ContentProcessorBuilder {
    cache_capacity: usize,
    cache_ttl: Duration,
}

impl ContentProcessorBuilder {
    /// Create a new builder with sensible defaults.
    ///
    /// Defaults: cache capacity 50, cache TTL 5 minutes.
    pub fn new() -> Self {
        Self {
            cache_capacity: DEFAULT_CAPACITY,
            cache_ttl: DEFAULT_TTL,
        }
    }

    /// Maximum number of cached results.
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Time after which a cached result is treated as absent.
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Consume the builder and create a [`ContentProcessor`].
    ///
    /// Fails with [`RichContentError::Config`] if the cache capacity or TTL
    /// is zero.
    pub fn build(self) -> Result<ContentProcessor> {
        Ok(ContentProcessor::with_cache(self.build_cache()?))
    }

    pub(crate) fn build_cache(self) -> Result<ResultCache> {
        if self.cache_capacity == 0 {
            return Err(RichContentError::Config(
                "cache capacity must be at least 1".into(),
            ));
        }
        if self.cache_ttl.is_zero() {
            return Err(RichContentError::Config(
                "cache TTL must be non-zero".into(),
            ));
        }
        Ok(ResultCache::new(self.cache_capacity, self.cache_ttl))
    }
}

impl Default for ContentProcessorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

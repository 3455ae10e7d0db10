mod metric_cache;
pub use metric_cache::*;

#[cfg(test)]
mod metric_cache_test;

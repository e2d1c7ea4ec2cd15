//! Size Estimation Module
//!
//! Approximates how many bytes a value occupies, for memory-budget accounting.
//! Estimators report `None` when they cannot size a value; the store then
//! charges `DEFAULT_ENTRY_SIZE` instead of failing the write.

use serde::Serialize;

/// Size charged for a value whose estimator gave up.
pub const DEFAULT_ENTRY_SIZE: usize = 1024;

// == Size Estimator Trait ==
/// Computes an approximate byte size for a value.
pub trait SizeEstimator<V>: Send + Sync {
    /// Returns the estimated size, or `None` if the value cannot be sized.
    fn estimate(&self, value: &V) -> Option<usize>;
}

impl<V, F> SizeEstimator<V> for F
where
    F: Fn(&V) -> Option<usize> + Send + Sync,
{
    fn estimate(&self, value: &V) -> Option<usize> {
        self(value)
    }
}

// == JSON Size ==
/// Sizes a value by the length of its JSON encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSize;

impl<V: Serialize> SizeEstimator<V> for JsonSize {
    fn estimate(&self, value: &V) -> Option<usize> {
        serde_json::to_vec(value).ok().map(|bytes| bytes.len())
    }
}

// == Fixed Size ==
/// Charges every value the same number of bytes.
#[derive(Debug, Clone, Copy)]
pub struct FixedSize(pub usize);

impl<V> SizeEstimator<V> for FixedSize {
    fn estimate(&self, _value: &V) -> Option<usize> {
        Some(self.0)
    }
}

/// Runs `estimator`, falling back to `DEFAULT_ENTRY_SIZE` when it cannot size
/// the value.
pub fn estimate_or_default<V>(estimator: &dyn SizeEstimator<V>, key: &str, value: &V) -> usize {
    match estimator.estimate(value) {
        Some(size) => size,
        None => {
            tracing::debug!(
                "Size estimation failed for key '{}', charging {} bytes",
                key,
                DEFAULT_ENTRY_SIZE
            );
            DEFAULT_ENTRY_SIZE
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use serde::Serializer;

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("cannot serialize"))
        }
    }

    #[test]
    fn test_json_size_of_string() {
        // Quotes are part of the encoding.
        assert_eq!(JsonSize.estimate(&"abc".to_string()), Some(5));
    }

    #[test]
    fn test_json_size_of_number() {
        assert_eq!(JsonSize.estimate(&12345u32), Some(5));
    }

    #[test]
    fn test_json_size_failure() {
        assert_eq!(JsonSize.estimate(&Unserializable), None);
    }

    #[test]
    fn test_fallback_on_failure() {
        let size = estimate_or_default(&JsonSize, "k", &Unserializable);
        assert_eq!(size, DEFAULT_ENTRY_SIZE);
    }

    #[test]
    fn test_closure_estimator() {
        let by_len = |v: &Vec<u8>| Some(v.len());
        assert_eq!(estimate_or_default(&by_len, "k", &vec![0u8; 64]), 64);
    }

    #[test]
    fn test_fixed_size() {
        assert_eq!(FixedSize(10).estimate(&"anything"), Some(10));
    }
}

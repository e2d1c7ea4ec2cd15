//! Eviction Policy Module
//!
//! Each policy is a total order over entries, from "evict first" to "evict
//! last". Rankings are deterministic for a given snapshot: equal primary keys
//! fall back to the store-assigned sequence number, then to the key itself.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cache::CacheEntry;
use crate::error::CacheError;

// == Eviction Policy ==
/// Strategy used to pick victims when a ceiling would be breached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// Least recently used: oldest `last_accessed_at` first
    #[default]
    Lru,
    /// Least frequently used: lowest `access_count` first
    Lfu,
    /// First in, first out: oldest `created_at` first
    Fifo,
    /// Soonest to expire: lowest `created_at + ttl` first
    Ttl,
}

impl EvictionPolicy {
    pub const ALL: [EvictionPolicy; 4] = [
        EvictionPolicy::Lru,
        EvictionPolicy::Lfu,
        EvictionPolicy::Fifo,
        EvictionPolicy::Ttl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EvictionPolicy::Lru => "lru",
            EvictionPolicy::Lfu => "lfu",
            EvictionPolicy::Fifo => "fifo",
            EvictionPolicy::Ttl => "ttl",
        }
    }

    /// Primary ordering key paired with its sequence tie-breaker.
    fn sort_key<V>(&self, entry: &CacheEntry<V>) -> (u64, u64) {
        match self {
            EvictionPolicy::Lru => (entry.last_accessed_at, entry.access_seq),
            EvictionPolicy::Lfu => (entry.access_count, entry.insert_seq),
            EvictionPolicy::Fifo => (entry.created_at, entry.insert_seq),
            EvictionPolicy::Ttl => (entry.expires_at(), entry.insert_seq),
        }
    }

    // == Rank ==
    /// Orders every entry from first to last eviction candidate.
    fn rank<'a, V: 'a>(&self, entries: impl IntoIterator<Item = &'a CacheEntry<V>>) -> Vec<String> {
        let mut ranked: Vec<((u64, u64), &str)> = entries
            .into_iter()
            .map(|entry| (self.sort_key(entry), entry.key.as_str()))
            .collect();
        ranked.sort_unstable();

        ranked.into_iter().map(|(_, key)| key.to_string()).collect()
    }

    // == Select For Eviction ==
    /// Returns up to `count` keys in eviction order. The store walks this
    /// list when a write would breach a ceiling.
    pub fn select_for_eviction<'a, V: 'a>(
        &self,
        entries: impl IntoIterator<Item = &'a CacheEntry<V>>,
        count: usize,
    ) -> Vec<String> {
        let mut ranked = self.rank(entries);
        ranked.truncate(count);
        ranked
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvictionPolicy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(EvictionPolicy::Lru),
            "lfu" => Ok(EvictionPolicy::Lfu),
            "fifo" => Ok(EvictionPolicy::Fifo),
            "ttl" | "ttl-order" => Ok(EvictionPolicy::Ttl),
            other => Err(CacheError::InvalidConfig(format!(
                "unknown eviction policy '{}' (expected lru, lfu, fifo or ttl)",
                other
            ))),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn entry(key: &str, created_at: u64, seq: u64, ttl_ms: u64) -> CacheEntry<()> {
        CacheEntry::new(key.to_string(), (), Duration::from_millis(ttl_ms), 1, created_at, seq)
    }

    fn sample() -> Vec<CacheEntry<()>> {
        let mut a = entry("a", 100, 0, 5_000);
        let b = entry("b", 200, 1, 1_000);
        let mut c = entry("c", 300, 2, 3_000);

        a.record_access(400, 3);
        a.record_access(500, 4);
        c.record_access(450, 5);

        vec![a, b, c]
    }

    #[test]
    fn test_lru_order() {
        let entries = sample();
        // b never read (200), c read at 450, a read at 500
        assert_eq!(EvictionPolicy::Lru.rank(&entries), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_lfu_order() {
        let entries = sample();
        // b: 0 reads, c: 1, a: 2
        assert_eq!(EvictionPolicy::Lfu.rank(&entries), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_fifo_order_ignores_access() {
        let entries = sample();
        assert_eq!(EvictionPolicy::Fifo.rank(&entries), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_ttl_order() {
        let entries = sample();
        // expires: a 5100, b 1200, c 3300
        assert_eq!(EvictionPolicy::Ttl.rank(&entries), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_ties_broken_by_sequence() {
        // Same timestamp, inserted z then y
        let entries = vec![entry("z", 100, 0, 1_000), entry("y", 100, 1, 1_000)];

        for policy in EvictionPolicy::ALL {
            assert_eq!(policy.rank(&entries), vec!["z", "y"], "policy {}", policy);
        }
    }

    #[test]
    fn test_full_ties_broken_by_key() {
        let entries = vec![entry("m", 100, 7, 1_000), entry("k", 100, 7, 1_000)];
        assert_eq!(EvictionPolicy::Fifo.rank(&entries), vec!["k", "m"]);
    }

    #[test]
    fn test_select_for_eviction_truncates() {
        let entries = sample();
        assert_eq!(EvictionPolicy::Fifo.select_for_eviction(&entries, 2), vec!["a", "b"]);
        assert_eq!(EvictionPolicy::Fifo.select_for_eviction(&entries, 10).len(), 3);
        assert!(EvictionPolicy::Fifo.select_for_eviction(&entries, 0).is_empty());
    }

    #[test]
    fn test_selection_is_deterministic() {
        let entries = sample();
        let mut reversed = sample();
        reversed.reverse();

        for policy in EvictionPolicy::ALL {
            assert_eq!(policy.rank(&entries), policy.rank(&reversed));
        }
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!("LRU".parse::<EvictionPolicy>().unwrap(), EvictionPolicy::Lru);
        assert_eq!("lfu".parse::<EvictionPolicy>().unwrap(), EvictionPolicy::Lfu);
        assert_eq!(" fifo ".parse::<EvictionPolicy>().unwrap(), EvictionPolicy::Fifo);
        assert_eq!("ttl-order".parse::<EvictionPolicy>().unwrap(), EvictionPolicy::Ttl);
        assert!(matches!(
            "random".parse::<EvictionPolicy>(),
            Err(CacheError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_policy_serde() {
        assert_eq!(serde_json::to_string(&EvictionPolicy::Fifo).unwrap(), "\"fifo\"");
        let parsed: EvictionPolicy = serde_json::from_str("\"ttl\"").unwrap();
        assert_eq!(parsed, EvictionPolicy::Ttl);
        assert!(serde_json::from_str::<EvictionPolicy>("\"random\"").is_err());
    }
}

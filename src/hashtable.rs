//! Growable chained hash table keyed through [`crate::hashing`].
//!
//! Buckets are sized to a prime capacity and collisions are resolved by
//! chaining with no bound on chain length. Each chain entry is one combined
//! `(hash, key, value)` record, so a lookup that matches a hash still
//! verifies the key before returning. The table never rehashes in place:
//! when it gets tight a new table is built at the next viable prime and
//! every entry migrates, all or nothing.
//!
//! Inserting into a tight table is an error, never a silent degradation;
//! callers check [`ChainTable::has_headroom`] and grow first.

use std::borrow::Cow;

use tracing::debug;

use crate::error::{GraphError, Result};
use crate::hashing::{next_viable_prime, prime_capacity_for, super_fast_hash};

/// Key types usable with [`ChainTable`]. Keys are hashed through their
/// byte representation and compared by equality on collision.
pub trait TableKey: Eq + Clone {
    fn key_bytes(&self) -> Cow<'_, [u8]>;
}

impl TableKey for u64 {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Owned(self.to_ne_bytes().to_vec())
    }
}

impl TableKey for String {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

#[derive(Debug, Clone)]
struct ChainEntry<K, V> {
    hash: u64,
    key: K,
    value: V,
}

/// Prime-sized, chained, grow-by-rebuild hash table.
#[derive(Debug, Clone)]
pub struct ChainTable<K: TableKey, V> {
    buckets: Vec<Vec<ChainEntry<K, V>>>,
    modulo: u64,
    count: usize,
}

impl<K: TableKey, V> ChainTable<K, V> {
    /// Build a table able to hold at least `expected` entries. The actual
    /// capacity is the prime selected by
    /// [`prime_capacity_for`](crate::hashing::prime_capacity_for).
    pub fn with_expected_capacity(expected: usize) -> Self {
        Self::with_prime(prime_capacity_for(expected))
    }

    fn with_prime(prime: usize) -> Self {
        let mut buckets = Vec::with_capacity(prime);
        buckets.resize_with(prime, Vec::new);
        Self {
            buckets,
            modulo: prime as u64,
            count: 0,
        }
    }

    /// Bucket capacity; also the modulus applied to hashes.
    pub fn capacity(&self) -> usize {
        self.modulo as usize
    }

    /// Number of entries currently stored.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Reports whether another insert is safe. The table is tight when
    /// free capacity drops below 10 entries or to 10% of capacity or less.
    pub fn has_headroom(&self) -> bool {
        let room = self.capacity() - self.count;
        let tithe = self.capacity() / 10;
        room >= 10 && room > tithe
    }

    fn hash_of(key: &K) -> u64 {
        super_fast_hash(&key.key_bytes())
    }

    fn bucket_of(&self, hash: u64) -> usize {
        (hash % self.modulo) as usize
    }

    /// Insert a key/value pair.
    ///
    /// Tri-state outcome: `Ok` on success, `CapacityExceeded` when the
    /// table is tight and must be grown first, `InvalidArgument` when the
    /// key is already present.
    pub fn insert(&mut self, key: K, value: V) -> Result<()> {
        if !self.has_headroom() {
            return Err(GraphError::CapacityExceeded(format!(
                "hash table is tight ({} of {}); grow before inserting",
                self.count,
                self.capacity()
            )));
        }
        let hash = Self::hash_of(&key);
        let bucket = self.bucket_of(hash);
        if self.buckets[bucket]
            .iter()
            .any(|e| e.hash == hash && e.key == key)
        {
            return Err(GraphError::InvalidArgument(
                "key already present in hash table".into(),
            ));
        }
        self.buckets[bucket].push(ChainEntry { hash, key, value });
        self.count += 1;
        Ok(())
    }

    /// Look up the value stored for `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        let hash = Self::hash_of(key);
        self.buckets[self.bucket_of(hash)]
            .iter()
            .find(|e| e.hash == hash && e.key == *key)
            .map(|e| &e.value)
    }

    /// Mutable variant of [`get`](Self::get).
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let hash = Self::hash_of(key);
        let bucket = self.bucket_of(hash);
        self.buckets[bucket]
            .iter_mut()
            .find(|e| e.hash == hash && e.key == *key)
            .map(|e| &mut e.value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Remove the entry for `key`, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let hash = Self::hash_of(key);
        let bucket = self.bucket_of(hash);
        let chain = &mut self.buckets[bucket];
        let pos = chain.iter().position(|e| e.hash == hash && e.key == *key)?;
        let entry = chain.remove(pos);
        self.count -= 1;
        Some(entry.value)
    }

    /// Build a replacement table at the next viable prime capacity and
    /// migrate every entry into it, consuming this one.
    pub fn grow(self) -> Self {
        let next_prime = next_viable_prime(self.capacity());
        debug!(
            from = self.capacity(),
            to = next_prime,
            entries = self.count,
            "growing hash table"
        );
        let mut next = Self::with_prime(next_prime);
        for chain in self.buckets {
            for entry in chain {
                let bucket = next.bucket_of(entry.hash);
                next.buckets[bucket].push(entry);
                next.count += 1;
            }
        }
        next
    }

    /// Replace this table with its grown successor.
    pub fn grow_in_place(&mut self) {
        let old = std::mem::replace(self, Self::with_prime(3));
        *self = old.grow();
    }

    /// Iterate over all entries in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.buckets
            .iter()
            .flatten()
            .map(|e| (&e.key, &e.value))
    }

    /// Mutable iteration over the stored values.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.buckets
            .iter_mut()
            .flatten()
            .map(|e| &mut e.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_until_removed() {
        let mut table: ChainTable<String, u32> = ChainTable::with_expected_capacity(45);
        table.insert("alpha".to_string(), 1).unwrap();
        table.insert("beta".to_string(), 2).unwrap();
        assert_eq!(table.get(&"alpha".to_string()), Some(&1));
        assert_eq!(table.get(&"beta".to_string()), Some(&2));
        assert_eq!(table.remove(&"alpha".to_string()), Some(1));
        assert_eq!(table.get(&"alpha".to_string()), None);
        assert_eq!(table.count(), 1);
    }

    #[test]
    fn expected_capacity_45_selects_prime_89() {
        let table: ChainTable<u64, ()> = ChainTable::with_expected_capacity(45);
        assert_eq!(table.capacity(), 89);
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let mut table: ChainTable<u64, u32> = ChainTable::with_expected_capacity(20);
        table.insert(7, 1).unwrap();
        assert!(matches!(
            table.insert(7, 2),
            Err(GraphError::InvalidArgument(_))
        ));
        assert_eq!(table.get(&7), Some(&1));
        assert_eq!(table.count(), 1);
    }

    #[test]
    fn tightness_thresholds_match_capacity_rule() {
        // capacity 89: room must stay >= 10 and above 10% (8 entries)
        let mut table: ChainTable<u64, u64> = ChainTable::with_expected_capacity(45);
        for i in 0..5 {
            table.insert(i, i).unwrap();
        }
        assert!(table.has_headroom());
        for i in 5..80 {
            table.insert(i, i).unwrap();
        }
        assert!(!table.has_headroom());
        assert!(matches!(
            table.insert(80, 80),
            Err(GraphError::CapacityExceeded(_))
        ));
        table.grow_in_place();
        table.insert(80, 80).unwrap();
        assert_eq!(table.count(), 81);
    }

    #[test]
    fn growth_preserves_every_entry() {
        let mut table: ChainTable<u64, u64> = ChainTable::with_expected_capacity(10);
        let mut inserted = 0u64;
        for key in 0..500u64 {
            if !table.has_headroom() {
                table.grow_in_place();
            }
            table.insert(key, key * 3).unwrap();
            inserted += 1;
        }
        assert_eq!(table.count(), inserted as usize);
        for key in 0..500u64 {
            assert_eq!(table.get(&key), Some(&(key * 3)));
        }
        // removals keep the count honest after growth
        for key in 0..100u64 {
            assert_eq!(table.remove(&key), Some(key * 3));
        }
        assert_eq!(table.count(), 400);
        assert_eq!(table.get(&42), None);
    }
}

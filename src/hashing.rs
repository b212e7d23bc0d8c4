//! Hash function and prime-capacity helpers backing [`crate::hashtable`].
//!
//! The byte hash is a port of SuperFastHash
//! (<http://www.azillionmonkeys.com/qed/hash.html>), widened to 64 bits.
//! The prime helpers deliberately over-shoot: growth steps roughly double
//! the previous capacity so rehashing stays rare, at the cost of memory.

/// Hash arbitrary bytes. Empty input hashes to 0.
pub fn super_fast_hash(data: &[u8]) -> u64 {
    if data.is_empty() {
        return 0;
    }
    let mut hash = data.len() as u64;
    let rem = data.len() & 3;

    let mut chunks = data.chunks_exact(4);
    for chunk in &mut chunks {
        let lo = u16::from_le_bytes([chunk[0], chunk[1]]) as u64;
        let hi = u16::from_le_bytes([chunk[2], chunk[3]]) as u64;
        hash = hash.wrapping_add(lo);
        let tmp = (hi << 11) ^ hash;
        hash = (hash << 16) ^ tmp;
        hash = hash.wrapping_add(hash >> 11);
    }

    let tail = chunks.remainder();
    match rem {
        3 => {
            let lo = u16::from_le_bytes([tail[0], tail[1]]) as u64;
            hash = hash.wrapping_add(lo);
            hash ^= hash << 16;
            hash ^= ((tail[2] as i8 as i64) as u64) << 18;
            hash = hash.wrapping_add(hash >> 11);
        }
        2 => {
            let lo = u16::from_le_bytes([tail[0], tail[1]]) as u64;
            hash = hash.wrapping_add(lo);
            hash ^= hash << 11;
            hash = hash.wrapping_add(hash >> 17);
        }
        1 => {
            hash = hash.wrapping_add((tail[0] as i8 as i64) as u64);
            hash ^= hash << 10;
            hash = hash.wrapping_add(hash >> 1);
        }
        _ => {}
    }

    // Final avalanche.
    hash ^= hash << 3;
    hash = hash.wrapping_add(hash >> 5);
    hash ^= hash << 4;
    hash = hash.wrapping_add(hash >> 17);
    hash ^= hash << 25;
    hash.wrapping_add(hash >> 6)
}

/// Largest prime strictly below `limit`, found by a Sieve of Eratosthenes.
/// Returns 0 when no prime exists in range.
pub fn max_eratosthenes_prime(limit: usize) -> usize {
    if limit < 3 {
        return 0;
    }
    let mut sieve = vec![true; limit];
    sieve[0] = false;
    sieve[1] = false;
    let mut i = 2;
    while i * i < limit {
        if sieve[i] {
            let mut j = i * i;
            while j < limit {
                sieve[j] = false;
                j += i;
            }
        }
        i += 1;
    }
    sieve.iter().rposition(|&p| p).unwrap_or(0)
}

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

/// Next viable prime after `p`: the smallest prime at or above `2p + 1`.
///
/// This is an approximate, loosely bounded step. Each application roughly
/// doubles the capacity, which bounds how often a table has to rehash.
pub fn next_viable_prime(p: usize) -> usize {
    let mut candidate = 2 * p + 1;
    while !is_prime(candidate) {
        candidate += 1;
    }
    candidate
}

/// Prime capacity for an expected entry count: locate the largest prime
/// below the expectation, then step through viable primes until the
/// result meets the target.
pub fn prime_capacity_for(expected: usize) -> usize {
    let mut capacity = max_eratosthenes_prime(expected.max(3));
    loop {
        capacity = next_viable_prime(capacity);
        if capacity >= expected {
            return capacity;
        }
    }
}

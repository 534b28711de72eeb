//! Seeded, reproducible shuffling. The same items and seed always produce
//! the same order, on any machine, in any run. Nothing here reads the clock
//! or an OS random source; time enters only through the seed string, usually
//! a month bucket from [`bucket_seed`].

use chrono::NaiveDate;

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a hash of `seed`'s UTF-8 bytes.
pub fn seed_hash(seed: &str) -> u32 {
    seed.bytes().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Integer finalizer: xorshifts interleaved with odd-constant multiplies.
pub fn mix(mut x: u32) -> u32 {
    x ^= x >> 16;
    x = x.wrapping_mul(0x7feb_352d);
    x ^= x >> 15;
    x = x.wrapping_mul(0x846c_a68b);
    x ^= x >> 16;
    x
}

/// Shuffles `items` in place with a Fisher–Yates pass driven by `seed`.
pub fn shuffle_in_place<T>(items: &mut [T], seed: &str) {
    let hash = seed_hash(seed);
    for i in (1..items.len()).rev() {
        let j = mix(hash.wrapping_add(i as u32)) as usize % (i + 1);
        items.swap(i, j);
    }
}

/// Returns a permutation of `items` determined entirely by `seed`.
pub fn seeded_shuffle<T>(items: impl IntoIterator<Item = T>, seed: &str) -> Vec<T> {
    let mut items: Vec<T> = items.into_iter().collect();
    shuffle_in_place(&mut items, seed);
    items
}

/// The month bucket (`YYYY-MM`) that a date falls in.
pub fn time_bucket(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Seed for rotating a category's featured posts: stable for a whole month,
/// different for each category.
pub fn bucket_seed(bucket: &str, category: &str) -> String {
    format!("{}:{}", bucket, category)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_seed_hash_known_values() {
        // Reference FNV-1a values.
        assert_eq!(seed_hash(""), 0x811c_9dc5);
        assert_eq!(seed_hash("a"), 0xe40c_292c);
        assert_ne!(seed_hash("ab"), seed_hash("ba"));
    }

    #[test]
    fn test_shuffle_is_repeatable() {
        let first = seeded_shuffle(vec![1, 2, 3, 4, 5], "2024-05:amor");
        let second = seeded_shuffle(vec![1, 2, 3, 4, 5], "2024-05:amor");
        assert_eq!(first, second);

        let june = seeded_shuffle(vec![1, 2, 3, 4, 5], "2024-06:amor");
        assert_eq!(june, seeded_shuffle(vec![1, 2, 3, 4, 5], "2024-06:amor"));
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        for seed in ["", "2024-05:amor", "2024-06:amor", "x", "ñ"] {
            for len in 0..12 {
                let items: Vec<usize> = (0..len).collect();
                let mut shuffled = seeded_shuffle(items.clone(), seed);
                shuffled.sort_unstable();
                assert_eq!(shuffled, items);
            }
        }
    }

    #[test]
    fn test_seeds_produce_different_orders() {
        let items: Vec<u32> = (0..20).collect();
        let seeds = ["2024-01:amor", "2024-02:amor", "2024-03:amor"];
        let orders: std::collections::HashSet<Vec<u32>> = seeds
            .iter()
            .map(|seed| seeded_shuffle(items.clone(), seed))
            .collect();
        assert!(orders.len() > 1);
    }

    #[test]
    fn test_buckets() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        assert_eq!(time_bucket(date), "2024-05");
        assert_eq!(bucket_seed(&time_bucket(date), "amor"), "2024-05:amor");
    }
}

//! # Generated Identifiers
//!
//! Drugs get a random numeric id and orders a random suffix, both drawn
//! from `1000..=999999`. Collisions are possible, so inserts retry up to
//! [`MAX_ID_ATTEMPTS`] times on a unique violation.

use rand::Rng;
use rxpro_core::{MAX_GENERATED_ID, MIN_GENERATED_ID};

/// Attempts before giving up on a free random id.
pub const MAX_ID_ATTEMPTS: u32 = 16;

/// A random id in `1000..=999999`.
pub fn random_id() -> i64 {
    rand::thread_rng().gen_range(MIN_GENERATED_ID..=MAX_GENERATED_ID)
}

/// Order id for a customer: `{customer}_O{number}`.
pub fn order_id(customer: &str) -> String {
    format!("{}_O{}", customer, random_id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_id_range() {
        for _ in 0..1000 {
            let id = random_id();
            assert!((MIN_GENERATED_ID..=MAX_GENERATED_ID).contains(&id));
        }
    }

    #[test]
    fn test_order_id_format() {
        let id = order_id("asha");
        let suffix = id.strip_prefix("asha_O").unwrap();
        let n: i64 = suffix.parse().unwrap();
        assert!((MIN_GENERATED_ID..=MAX_GENERATED_ID).contains(&n));
    }
}

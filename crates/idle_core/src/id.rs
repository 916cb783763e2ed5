//! Deterministic id generation. UUIDs come from the injected rng so a
//! seeded run reproduces the same item ids every time.

use rand::Rng;
use uuid::Uuid;

pub fn generate_uuid(rng: &mut impl Rng) -> Uuid {
    let bytes: [u8; 16] = rng.gen();
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn same_seed_same_uuid() {
        let mut a = ChaCha8Rng::seed_from_u64(7);
        let mut b = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(generate_uuid(&mut a), generate_uuid(&mut b));
    }

    #[test]
    fn sequential_uuids_differ() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_ne!(generate_uuid(&mut rng), generate_uuid(&mut rng));
    }
}

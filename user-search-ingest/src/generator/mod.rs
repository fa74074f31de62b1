//! Synthetic user record generator.
//!
//! Produces a lazy, finite, pull-based sequence of independently generated
//! records. Nothing is materialized up front; each call to `next` builds one
//! record.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;
use uuid::Builder;

use user_search_shared::UserRecord;

/// Log progress every this many generated records.
const PROGRESS_INTERVAL: usize = 50_000;

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David",
    "Elizabeth", "William", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
    "Charles", "Karen", "Amara", "Kenji", "Sofia", "Mateo", "Aisha", "Lucas", "Ingrid", "Ravi",
    "Chloe", "Omar", "Yuki", "Elena",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Okafor", "Tanaka", "Rossi", "Silva", "Khan", "Novak", "Larsen",
    "Patel", "Dubois", "Haddad", "Sato", "Petrova",
];

const EMAIL_DOMAINS: &[&str] = &[
    "example.com",
    "example.org",
    "example.net",
    "mail.test",
    "inbox.test",
];

const COUNTRIES: &[&str] = &[
    "Argentina", "Australia", "Brazil", "Canada", "Chad", "Chile", "Denmark", "Egypt", "France",
    "Germany", "Ghana", "India", "Indonesia", "Italy", "Japan", "Kenya", "Mexico", "Morocco",
    "Netherlands", "New Zealand", "Nigeria", "Norway", "Peru", "Poland", "Portugal",
    "South Africa", "South Korea", "Spain", "Sweden", "Turkey", "United Kingdom",
    "United States",
];

fn pick<'a, R: Rng>(rng: &mut R, values: &[&'a str]) -> &'a str {
    values[rng.gen_range(0..values.len())]
}

/// Generate one record from the given random source.
pub fn generate_record<R: Rng>(rng: &mut R) -> UserRecord {
    let user_id = Builder::from_random_bytes(rng.gen()).into_uuid();
    let first = pick(rng, FIRST_NAMES);
    let last = pick(rng, LAST_NAMES);
    let email = format!(
        "{}.{}{}@{}",
        first.to_lowercase(),
        last.to_lowercase(),
        rng.gen_range(1..1000),
        pick(rng, EMAIL_DOMAINS)
    );

    UserRecord {
        user_id: user_id.to_string(),
        name: format!("{} {}", first, last),
        email,
        country: pick(rng, COUNTRIES).to_string(),
    }
}

/// Lazy stream of `count` synthetic records.
///
/// Single-pass: once exhausted it stays exhausted.
pub struct SyntheticRecords<R = StdRng> {
    rng: R,
    remaining: usize,
    generated: usize,
}

impl<R: Rng> SyntheticRecords<R> {
    /// Generate `count` records from the given random source.
    pub fn with_rng(count: usize, rng: R) -> Self {
        Self {
            rng,
            remaining: count,
            generated: 0,
        }
    }
}

impl SyntheticRecords<StdRng> {
    /// Reproducible stream for a fixed seed.
    pub fn seeded(count: usize, seed: u64) -> Self {
        Self::with_rng(count, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Iterator for SyntheticRecords<R> {
    type Item = UserRecord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        if self.generated > 0 && self.generated % PROGRESS_INTERVAL == 0 {
            info!(generated = self.generated, "Generated records");
        }

        self.remaining -= 1;
        self.generated += 1;
        Some(generate_record(&mut self.rng))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<R: Rng> ExactSizeIterator for SyntheticRecords<R> {}

/// Lazy stream of `count` synthetic records seeded from OS entropy.
pub fn generate_data_stream(count: usize) -> SyntheticRecords<StdRng> {
    info!(count = count, "Starting to generate records");
    SyntheticRecords::with_rng(count, StdRng::from_entropy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use uuid::Uuid;

    #[test]
    fn test_generates_exact_count() {
        let stream = generate_data_stream(250);
        assert_eq!(stream.len(), 250);
        assert_eq!(stream.count(), 250);

        assert_eq!(generate_data_stream(0).next(), None);
    }

    #[test]
    fn test_records_are_complete() {
        for record in SyntheticRecords::seeded(200, 7) {
            assert!(record.blank_field().is_none(), "{:?}", record);
            assert!(record.email.contains('@'));
            assert_eq!(record.name.split(' ').count(), 2);

            let id = Uuid::parse_str(&record.user_id).unwrap();
            assert_eq!(id.get_version_num(), 4);
        }
    }

    #[test]
    fn test_user_ids_are_unique() {
        let ids: HashSet<String> = SyntheticRecords::seeded(5_000, 11)
            .map(|record| record.user_id)
            .collect();
        assert_eq!(ids.len(), 5_000);
    }

    #[test]
    fn test_seeded_streams_are_reproducible() {
        let a: Vec<UserRecord> = SyntheticRecords::seeded(20, 42).collect();
        let b: Vec<UserRecord> = SyntheticRecords::seeded(20, 42).collect();
        let c: Vec<UserRecord> = SyntheticRecords::seeded(20, 43).collect();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_stream_is_single_pass() {
        let mut stream = SyntheticRecords::seeded(2, 1);
        assert!(stream.next().is_some());
        assert!(stream.next().is_some());
        assert!(stream.next().is_none());
        assert!(stream.next().is_none());
        assert_eq!(stream.len(), 0);
    }
}

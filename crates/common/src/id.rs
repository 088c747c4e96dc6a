//! ID generation utilities.

use rand::Rng;
use ulid::Ulid;

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based primary key.
    ///
    /// ULIDs are lexicographically sortable, so ordering by id roughly
    /// follows insertion order.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Random numeric suffix (below one billion) for stored file names.
    #[must_use]
    pub fn generate_suffix(&self) -> u32 {
        rand::thread_rng().gen_range(0..1_000_000_000)
    }
}

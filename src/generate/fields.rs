//! Random type-tree generation.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use crate::generate::{random_lowercase, GeneratorConfig};
use crate::schema::{Field, NestedKind, ScalarKind, MAP_KEY_NAME, MAP_VALUE_NAME};

/// Unique-suffix counter for synthesized field names.
///
/// Clones share the same counter, so every generator created from one
/// session (on any thread) hands out distinct suffixes.
#[derive(Debug, Clone, Default)]
pub struct NameSession {
    counter: Arc<AtomicUsize>,
}

impl NameSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next suffix; the first one issued is 1.
    pub fn next_suffix(&self) -> usize {
        self.counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Number of suffixes issued so far.
    pub fn issued(&self) -> usize {
        self.counter.load(Ordering::Relaxed)
    }
}

/// Kind picked for one node before its children exist.
#[derive(Debug, Clone, Copy)]
enum KindChoice {
    Scalar(ScalarKind),
    Nested(NestedKind),
}

/// Generates random, well-formed type trees.
///
/// Every node's kind is picked by first choosing between the scalar and the
/// nested pool with equal odds, then uniformly within the pool. Nodes at
/// `max_depth` only draw from the scalar pool, so generation always
/// terminates.
///
/// # Example
///
/// ```
/// use colwrite::generate::{FieldGenerator, GeneratorConfig, NameSession};
///
/// let mut generator = FieldGenerator::new(GeneratorConfig::default(), NameSession::new(), 42);
/// let field = generator.generate();
/// assert!(field.validate().is_ok());
/// ```
pub struct FieldGenerator {
    config: GeneratorConfig,
    session: NameSession,
    rng: StdRng,
}

impl FieldGenerator {
    pub fn new(config: GeneratorConfig, session: NameSession, seed: u64) -> Self {
        Self {
            config,
            session,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate a root field with the configured default nullability.
    pub fn generate(&mut self) -> Field {
        self.generate_at(0)
    }

    /// Generate a field whose parent sits at `depth` (0 for a root).
    pub fn generate_at(&mut self, depth: usize) -> Field {
        let nullable = self.config.default_nullable;
        let field = self.field_at(depth, None, nullable);
        debug_assert!(
            field.validate().is_ok(),
            "generated an invalid type tree: {}",
            field
        );
        field
    }

    fn field_at(&mut self, depth: usize, name: Option<&str>, nullable: bool) -> Field {
        let level = depth + 1;
        let choice = self.choose_kind(level);
        let default_nullable = self.config.default_nullable;

        let field = match choice {
            KindChoice::Scalar(kind) => Field::scalar(self.name_or_synthetic(name), kind, nullable),
            KindChoice::Nested(NestedKind::List) => {
                let item = self.field_at(level, None, default_nullable);
                Field::list(self.name_or_synthetic(name), nullable, item)
            }
            KindChoice::Nested(NestedKind::Struct) => {
                let wanted = self.rng.gen_range(1..=3);
                let mut names = HashSet::new();
                let mut children = Vec::with_capacity(wanted);
                for _ in 0..wanted {
                    let child = self.field_at(level, None, default_nullable);
                    // colliding siblings are discarded, the first always survives
                    if names.insert(child.name.clone()) {
                        children.push(child);
                    }
                }
                Field::structure(self.name_or_synthetic(name), nullable, children)
            }
            KindChoice::Nested(NestedKind::Map) => {
                let key = self.field_at(level, Some(MAP_KEY_NAME), false);
                let value = self.field_at(level, Some(MAP_VALUE_NAME), default_nullable);
                Field::map(self.name_or_synthetic(name), nullable, key, value)
            }
        };

        trace!(
            depth = level,
            field = %field.name,
            kind = field.type_name(),
            nullable,
            "Generated field"
        );
        field
    }

    fn choose_kind(&mut self, level: usize) -> KindChoice {
        if level < self.config.max_depth && self.rng.gen_bool(0.5) {
            let pool = self.config.nested_pool();
            KindChoice::Nested(pool[self.rng.gen_range(0..pool.len())])
        } else {
            let pool = self.config.scalar_pool();
            KindChoice::Scalar(pool[self.rng.gen_range(0..pool.len())])
        }
    }

    fn name_or_synthetic(&mut self, name: Option<&str>) -> String {
        match name {
            Some(name) => name.to_string(),
            None => {
                let prefix = random_lowercase(&mut self.rng, 5, 10);
                format!("{}{}", prefix, self.session.next_suffix())
            }
        }
    }
}

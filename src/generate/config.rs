//! Generator configuration.

use crate::schema::{NestedKind, ScalarKind};

/// Configuration shared by the type-tree and value generators.
///
/// # Example
///
/// ```
/// use colwrite::generate::GeneratorConfig;
/// use colwrite::schema::NestedKind;
///
/// let config = GeneratorConfig::default()
///     .with_max_depth(3)
///     .with_nested_kinds(vec![NestedKind::List, NestedKind::Struct]);
/// assert_eq!(config.max_depth, 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Nesting bound. Fields at this level are always scalar.
    pub max_depth: usize,
    /// Nullability of generated fields other than map keys.
    pub default_nullable: bool,
    /// Upper bound of a randomly chosen count; the lower bound is 1.
    pub max_count: usize,
    /// A nullable position is null with probability `1 / null_one_in`.
    pub null_one_in: u32,
    /// Scalar kinds the type generator may choose. Empty means all.
    pub scalar_kinds: Vec<ScalarKind>,
    /// Nested kinds the type generator may choose. Empty means all.
    pub nested_kinds: Vec<NestedKind>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            default_nullable: true,
            max_count: 5,
            null_one_in: 6,
            scalar_kinds: ScalarKind::ALL.to_vec(),
            nested_kinds: NestedKind::ALL.to_vec(),
        }
    }
}

impl GeneratorConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_default_nullable(mut self, nullable: bool) -> Self {
        self.default_nullable = nullable;
        self
    }

    /// Set the upper bound of random counts (clamped to at least 1).
    pub fn with_max_count(mut self, max_count: usize) -> Self {
        self.max_count = max_count.max(1);
        self
    }

    /// Set the null odds (clamped to at least 1, which makes every nullable
    /// position null).
    pub fn with_null_one_in(mut self, one_in: u32) -> Self {
        self.null_one_in = one_in.max(1);
        self
    }

    pub fn with_scalar_kinds(mut self, kinds: Vec<ScalarKind>) -> Self {
        self.scalar_kinds = kinds;
        self
    }

    pub fn with_nested_kinds(mut self, kinds: Vec<NestedKind>) -> Self {
        self.nested_kinds = kinds;
        self
    }

    /// Restrict generation to scalar fields.
    pub fn scalars_only(mut self) -> Self {
        self.max_depth = 1;
        self
    }

    /// Scalar kinds to choose from, falling back to all when empty.
    pub(crate) fn scalar_pool(&self) -> &[ScalarKind] {
        if self.scalar_kinds.is_empty() {
            &ScalarKind::ALL
        } else {
            &self.scalar_kinds
        }
    }

    /// Nested kinds to choose from, falling back to all when empty.
    pub(crate) fn nested_pool(&self) -> &[NestedKind] {
        if self.nested_kinds.is_empty() {
            &NestedKind::ALL
        } else {
            &self.nested_kinds
        }
    }
}

//! Round-trip harness.
//!
//! A round trip populates a source vector for a field, decodes every source
//! position, writes it into a freshly allocated destination through the
//! type-directed writer and compares the two vectors. Failures come back as
//! [`RoundTripError`] values carrying renderings of both sides; nothing
//! panics, so one failing case never aborts a property run.
//!
//! # Example
//!
//! ```
//! use colwrite::harness::RoundTripHarness;
//! use colwrite::schema::{Field, ScalarKind};
//!
//! let field = Field::list("l", true, Field::scalar("x", ScalarKind::Int32, true));
//! let harness = RoundTripHarness::default();
//! assert!(harness.check(&field, 42).is_ok());
//! ```

use proptest::prelude::{any, Strategy};
use tracing::{debug, error};

use crate::column::ColumnVector;
use crate::convert::render;
use crate::error::{Diagnostic, RoundTripError, WriteError};
use crate::generate::{FieldGenerator, GeneratorConfig, NameSession, ValueGenerator};
use crate::resolver::{ColumnarResolver, FieldResolver};
use crate::schema::{Field, FieldKind};
use crate::writer::{set_complex_value, set_value};

/// Runs round trips with a fixed configuration and resolver.
#[derive(Debug, Clone)]
pub struct RoundTripHarness<R = ColumnarResolver> {
    config: GeneratorConfig,
    resolver: R,
}

impl Default for RoundTripHarness<ColumnarResolver> {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

impl RoundTripHarness<ColumnarResolver> {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            resolver: ColumnarResolver,
        }
    }
}

impl<R: FieldResolver> RoundTripHarness<R> {
    /// Use a custom resolver.
    pub fn with_resolver(config: GeneratorConfig, resolver: R) -> Self {
        Self { config, resolver }
    }

    /// Populate a source for `field` from `seed` and round trip it.
    pub fn check(&self, field: &Field, seed: u64) -> Result<(), RoundTripError> {
        if let Err(e) = field.validate() {
            return Err(generation_failure(field, e.to_string()));
        }
        let source = ValueGenerator::new(self.config.clone(), seed)
            .generate_values(field)
            .map_err(|e| generation_failure(field, e.to_string()))?;
        self.round_trip(field, &source).map(|_| ())
    }

    /// Copy `source` into a new vector of `field` and compare.
    ///
    /// Returns the destination when it equals the source.
    pub fn round_trip(
        &self,
        field: &Field,
        source: &ColumnVector,
    ) -> Result<ColumnVector, RoundTripError> {
        let value_count = source.value_count();
        let mut destination = ColumnVector::new(field);

        for position in 0..value_count {
            if let Err(cause) = self.copy_position(field, source, &mut destination, position) {
                let diagnostic = diagnose(field, source, &destination);
                error!(
                    field = %field,
                    position,
                    error = %cause,
                    schema = %diagnostic.schema,
                    source = %diagnostic.source,
                    destination = %diagnostic.destination,
                    "Round trip write failed"
                );
                return Err(RoundTripError::Write {
                    position,
                    cause,
                    diagnostic,
                });
            }
        }
        destination.set_value_count(value_count);

        if source.equals(&destination) {
            debug!(field = %field, value_count, "Round trip matched");
            Ok(destination)
        } else {
            let diagnostic = diagnose(field, source, &destination);
            error!(
                field = %field,
                schema = %diagnostic.schema,
                source = %diagnostic.source,
                destination = %diagnostic.destination,
                "Round trip did not match"
            );
            Err(RoundTripError::Mismatch { diagnostic })
        }
    }

    fn copy_position(
        &self,
        field: &Field,
        source: &ColumnVector,
        destination: &mut ColumnVector,
        position: usize,
    ) -> Result<(), WriteError> {
        let decoded = source.get_object(position)?;
        let value = match field.kind {
            FieldKind::Map(_) => self.resolver.resolve_field(field, &decoded)?,
            _ => decoded,
        };
        if field.is_complex() {
            set_complex_value(destination, position, &self.resolver, &value)
        } else {
            set_value(destination, position, &value)
        }
    }
}

fn generation_failure(field: &Field, message: String) -> RoundTripError {
    let diagnostic = Diagnostic {
        schema: format!("{:#}", field.to_json_value()),
        ..Diagnostic::default()
    };
    error!(field = %field, error = %message, "Source generation failed");
    RoundTripError::Generation {
        message,
        diagnostic,
    }
}

fn diagnose(field: &Field, source: &ColumnVector, destination: &ColumnVector) -> Diagnostic {
    Diagnostic {
        schema: format!("{:#}", field.to_json_value()),
        source: render(source),
        destination: render(destination),
    }
}

/// Round trip `field` with default settings, reporting only success.
///
/// Failures are logged with full diagnostics before `false` is returned.
pub fn round_trip_holds(field: &Field, seed: u64) -> bool {
    RoundTripHarness::default().check(field, seed).is_ok()
}

/// Proptest strategy producing generated fields.
///
/// Each case draws a seed and builds a fresh [`FieldGenerator`] on the shared
/// `session`, so names stay unique across the whole run.
pub fn field_strategy(
    session: NameSession,
    config: GeneratorConfig,
) -> impl Strategy<Value = Field> {
    any::<u64>().prop_map(move |seed| {
        FieldGenerator::new(config.clone(), session.clone(), seed).generate()
    })
}

/// Proptest strategy producing a generated field and a value seed.
pub fn case_strategy(
    session: NameSession,
    config: GeneratorConfig,
) -> impl Strategy<Value = (Field, u64)> {
    (field_strategy(session, config), any::<u64>())
}

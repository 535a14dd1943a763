//! Per-run session and the choice binding primitive.

use crate::alternatives::Alternatives;
use indexmap::IndexSet;
use std::sync::Arc;
use tracing::{trace, warn};
use variant_core::{ChoicePoint, Combination, Schema, VariantError, VariantResult};

/// State of a single execution of the test body.
///
/// A session is created fresh for every run. Its cursor starts at zero and
/// advances once per choice point visited, nested points included.
#[derive(Debug)]
pub struct Session {
    cursor: usize,
    mode: Mode,
    selections: Vec<String>,
    mismatch: Option<VariantError>,
}

#[derive(Debug)]
enum Mode {
    /// Records every point it visits, always taking alternative 0
    Discovery { schema: Schema },
    /// Follows one combination over a frozen schema
    Replay {
        schema: Arc<Schema>,
        combination: Combination,
        name: String,
    },
}

impl Mode {
    fn resolve(&mut self, cursor: usize, names: &[String]) -> VariantResult<Option<(usize, String)>> {
        match self {
            Mode::Discovery { schema } => {
                if cursor == schema.len() {
                    schema.record(ChoicePoint::new(names.iter().cloned()));
                }
                Ok(schema
                    .get(cursor)
                    .and_then(|point| point.name(0))
                    .map(|name| (0, name.to_string())))
            }
            Mode::Replay {
                schema,
                combination,
                name,
            } => {
                let point = schema.get(cursor).ok_or_else(|| VariantError::StructuralMismatch {
                    run: name.clone(),
                    cursor,
                    reason: format!("choice point not present in schema of {} points", schema.len()),
                })?;

                if !point.same_names(names) {
                    return Err(VariantError::StructuralMismatch {
                        run: name.clone(),
                        cursor,
                        reason: format!(
                            "alternatives {:?} differ from discovered {:?}",
                            names,
                            point.names()
                        ),
                    });
                }

                if point.is_empty() {
                    return Ok(None);
                }

                let index = combination.get(cursor).unwrap_or(0);
                let selected = point.name(index).ok_or(VariantError::CombinationOutOfRange {
                    cursor,
                    index,
                    arity: point.arity(),
                })?;

                Ok(Some((index, selected.to_string())))
            }
        }
    }
}

impl Session {
    pub(crate) fn discovery() -> Self {
        Self::with_mode(Mode::Discovery {
            schema: Schema::new(),
        })
    }

    pub(crate) fn replay(schema: Arc<Schema>, combination: Combination, name: String) -> Self {
        Self::with_mode(Mode::Replay {
            schema,
            combination,
            name,
        })
    }

    fn with_mode(mode: Mode) -> Self {
        Self {
            cursor: 0,
            mode,
            selections: Vec::new(),
            mismatch: None,
        }
    }

    /// Offer named alternatives and invoke the selected one.
    ///
    /// The discovery run records the names and takes the first alternative;
    /// replay runs take the alternative their combination selects. The
    /// cursor slot is claimed before the action runs, so choice points
    /// nested inside the action get the following positions.
    ///
    /// Returns the selected index, or `None` for an empty set or after a
    /// structural mismatch in this run.
    pub fn choose(&mut self, alternatives: Alternatives<'_>) -> Option<usize> {
        let names: Vec<String> = alternatives.names().map(str::to_string).collect();
        let selected = self.bind(&names)?;
        if let Some(action) = alternatives.into_action(selected) {
            action(self);
        }
        Some(selected)
    }

    /// Offer named alternatives without actions, returning the selected index.
    ///
    /// Shares cursor and schema handling with [`Session::choose`], for bodies
    /// that `match` on the selection instead of passing closures.
    ///
    /// Repeated names collapse to their first occurrence, as they do in
    /// [`Alternatives`].
    pub fn pick<S: AsRef<str>>(&mut self, names: &[S]) -> Option<usize> {
        let names: IndexSet<String> = names.iter().map(|n| n.as_ref().to_string()).collect();
        let names: Vec<String> = names.into_iter().collect();
        self.bind(&names)
    }

    fn bind(&mut self, names: &[String]) -> Option<usize> {
        let cursor = self.cursor;
        self.cursor += 1;

        if self.mismatch.is_some() {
            return None;
        }

        match self.mode.resolve(cursor, names) {
            Ok(Some((index, name))) => {
                trace!(cursor, index, alternative = %name, "choice point bound");
                self.selections.push(name);
                Some(index)
            }
            Ok(None) => None,
            Err(err) => {
                warn!(cursor, error = %err, "replay diverged from schema");
                self.mismatch = Some(err);
                None
            }
        }
    }

    /// Position of the next choice point in this run
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Check if this is the discovery run
    #[must_use]
    pub fn is_discovery(&self) -> bool {
        matches!(self.mode, Mode::Discovery { .. })
    }

    /// Combination followed by this run (`None` during discovery)
    #[must_use]
    pub fn combination(&self) -> Option<&Combination> {
        match &self.mode {
            Mode::Discovery { .. } => None,
            Mode::Replay { combination, .. } => Some(combination),
        }
    }

    /// Alternative names selected so far, in visit order
    #[must_use]
    pub fn selections(&self) -> &[String] {
        &self.selections
    }

    /// Close the discovery run, yielding the recorded schema.
    ///
    /// Replay sessions only borrow a frozen schema and yield `None`.
    pub(crate) fn into_schema(self) -> Option<Schema> {
        match self.mode {
            Mode::Discovery { schema } => Some(schema),
            Mode::Replay { .. } => None,
        }
    }

    /// Close a replay run, checking it visited exactly the schema's points
    pub(crate) fn finish(self) -> VariantResult<()> {
        if let Some(err) = self.mismatch {
            return Err(err);
        }

        match &self.mode {
            Mode::Replay { schema, name, .. } if self.cursor != schema.len() => {
                Err(VariantError::StructuralMismatch {
                    run: name.clone(),
                    cursor: self.cursor,
                    reason: format!(
                        "visited {} choice points, schema has {}",
                        self.cursor,
                        schema.len()
                    ),
                })
            }
            _ => Ok(()),
        }
    }
}

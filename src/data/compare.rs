use super::model::{parse_numeric, Dataset, NumericSet};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Tunables for a comparison run. The rounding tolerance is the only knob:
/// both numeric sets and all membership tests use the same decimal count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompareOptions {
    /// Fractional digits values are rounded to before membership testing.
    pub decimals: u32,
}

impl Default for CompareOptions {
    fn default() -> Self {
        CompareOptions { decimals: 2 }
    }
}

// ---------------------------------------------------------------------------
// Annotated output
// ---------------------------------------------------------------------------

/// One cell of an annotated dataset: the untouched original value plus the
/// orphan marker. `flagged` is true iff the value parses as a number and its
/// rounded form is missing from the other dataset's numeric set.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedCell {
    pub value: String,
    pub flagged: bool,
}

/// A dataset plus one flag per cell. Same shape, same values, same order as
/// the input it was derived from; only the decoration is new.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedDataset {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<AnnotatedCell>>,
}

impl AnnotatedDataset {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of flagged cells, for the UI status line.
    pub fn flagged_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.iter())
            .filter(|cell| cell.flagged)
            .count()
    }
}

/// Both directions of one comparison run.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// First input, flagged against the second input's numbers.
    pub first: AnnotatedDataset,
    /// Second input, flagged against the first input's numbers.
    pub second: AnnotatedDataset,
    pub options: CompareOptions,
}

// ---------------------------------------------------------------------------
// Annotation
// ---------------------------------------------------------------------------

/// Annotate one dataset against the *other* dataset's numeric set.
///
/// Per cell, in row-major order:
/// * blank/whitespace-only → unflagged, value kept as-is
/// * not numeric-parseable → unflagged, value kept as-is (no coercion)
/// * numeric → flagged iff the rounded value is absent from `other`
pub fn annotate(dataset: &Dataset, other: &NumericSet) -> AnnotatedDataset {
    let rows = dataset
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| {
                    let flagged = match parse_numeric(cell) {
                        Some(value) => !other.contains(value),
                        None => false,
                    };
                    AnnotatedCell {
                        value: cell.clone(),
                        flagged,
                    }
                })
                .collect()
        })
        .collect();

    AnnotatedDataset {
        name: dataset.name.clone(),
        columns: dataset.columns.clone(),
        rows,
    }
}

/// Run the full two-way comparison: extract both numeric sets, then annotate
/// each dataset against the other's set. Single pass per direction, no state
/// shared between runs.
pub fn compare(first: &Dataset, second: &Dataset, options: CompareOptions) -> Comparison {
    let first_values = NumericSet::from_dataset(first, options.decimals);
    let second_values = NumericSet::from_dataset(second, options.decimals);

    Comparison {
        first: annotate(first, &second_values),
        second: annotate(second, &first_values),
        options,
    }
}

//! Field and category selection.
//!
//! Walks a table's fields in metadata order, asking which categories to
//! query and which fields to return as output columns.

use crate::api::{Categories, QueryParameters, TableMetadata, DATE_KEY, SELECT_KEY};
use crate::console::Console;
use crate::error::Result;

/// Geography dimension, selected separately through the resolver.
pub const GEOGRAPHY_FIELD: &str = "GEOGRAPHY";

/// Frequency dimension, implicit for census tables.
pub const FREQ_FIELD: &str = "FREQ";

/// Measures dimension. Never an output column.
pub const MEASURES_FIELD: &str = "MEASURES";

/// First output column of every query.
pub const GEOGRAPHY_CODE_COLUMN: &str = "GEOGRAPHY_CODE";

/// Last output column of every query.
pub const OBS_VALUE_COLUMN: &str = "OBS_VALUE";

/// Category used when the user accepts the default.
pub const DEFAULT_CATEGORY: &str = "0";

/// Data vintage requested.
pub const DEFAULT_DATE: &str = "latest";

/// Returns true for fields that are never prompted for.
pub fn is_implicit(field: &str) -> bool {
    field == GEOGRAPHY_FIELD || field == FREQ_FIELD
}

/// Output columns between the fixed geography-code and value markers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectList(Vec<String>);

impl SelectList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an output column. `MEASURES` is ignored.
    pub fn push(&mut self, field: impl Into<String>) {
        let field = field.into();
        if field != MEASURES_FIELD {
            self.0.push(field);
        }
    }

    /// Returns the `select` parameter value.
    pub fn to_value(&self) -> String {
        std::iter::once(GEOGRAPHY_CODE_COLUMN)
            .chain(self.0.iter().map(String::as_str))
            .chain(std::iter::once(OBS_VALUE_COLUMN))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// The user's choice for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelection {
    pub categories: String,
    pub include: bool,
}

/// Asks for a yes/no answer. Only `y` means yes.
pub fn confirm<C: Console>(console: &mut C, message: &str) -> Result<bool> {
    Ok(console.prompt(message)?.trim() == "y")
}

/// Prompts for the categories of one field.
///
/// Non-empty input is always included as an output column; empty input
/// selects the default category and asks whether to include the field.
pub fn select_categories<C: Console>(
    field: &str,
    categories: &Categories,
    console: &mut C,
) -> Result<FieldSelection> {
    console.show(&format!("{field}:"));
    for (code, label) in categories {
        console.show(&format!("  {code} ({label})"));
    }

    let input = console.prompt(&format!(
        "Select categories (default {DEFAULT_CATEGORY}): "
    ))?;
    let input = input.trim();

    if input.is_empty() {
        let include = confirm(console, "include in output (y/n, default=n)? ")?;
        Ok(FieldSelection {
            categories: DEFAULT_CATEGORY.to_string(),
            include,
        })
    } else {
        Ok(FieldSelection {
            categories: input.to_string(),
            include: true,
        })
    }
}

/// Builds the query parameters for every explicit field of `metadata`.
///
/// `date` and `select` come first; `select` is filled in once all fields
/// have been walked.
pub fn enumerate_fields<C: Console>(
    metadata: &TableMetadata,
    console: &mut C,
) -> Result<QueryParameters> {
    let mut params = QueryParameters::new();
    params.insert(DATE_KEY, DEFAULT_DATE);
    params.insert(SELECT_KEY, GEOGRAPHY_CODE_COLUMN);

    let mut select = SelectList::new();
    for (field, categories) in &metadata.fields {
        if is_implicit(field) {
            continue;
        }

        let selection = select_categories(field, categories, console)?;
        params.insert(field.as_str(), selection.categories);
        if selection.include {
            select.push(field.as_str());
        }
    }

    params.insert(SELECT_KEY, select.to_value());
    Ok(params)
}

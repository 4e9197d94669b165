//! Header reconciliation and synonym resolution.
//!
//! Spreadsheets name the same column in different ways ("Assigned To",
//! "assignee", ...). This module decides which names mean the same thing and
//! guarantees every batch has an assignee column and a status column. It never
//! fails: missing data resolves to empty or default values.

use super::raw::RawRow;
use crate::status::NOT_STARTED;

pub const ASSIGNEE_COLUMN: &str = "Assigned To";
pub const STATUS_COLUMN: &str = "Status";

/// Assignee column names in lookup priority order.
pub const ASSIGNEE_ALIASES: [&str; 5] = [
    "Assigned To",
    "assignee",
    "Assignee",
    "assigned_to",
    "assigned to",
];

const STATUS_ALIASES: [&str; 2] = ["Status", "status"];

pub fn is_assignee_alias(name: &str) -> bool {
    let name = name.trim();
    ASSIGNEE_ALIASES
        .iter()
        .any(|alias| alias.eq_ignore_ascii_case(name))
}

pub fn is_status_column(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case(STATUS_COLUMN)
}

/// Columns the task record owns directly and never copies into its extension fields.
pub fn is_system_field(name: &str) -> bool {
    let name = name.trim();
    is_status_column(name)
        || is_assignee_alias(name)
        || ["id", "createdAt", "projectId"]
            .iter()
            .any(|field| field.eq_ignore_ascii_case(name))
}

/// Canonical header list for a batch.
///
/// Trims names, drops blanks and duplicates (first seen wins), keeps only the
/// first of several assignee aliases or status spellings, then appends
/// `Assigned To` and `Status` when the source had none.
pub fn canonical_headers<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::with_capacity(raw.len() + 2);
    let mut has_assignee = false;
    let mut has_status = false;

    for header in raw {
        let header = header.as_ref().trim();
        if header.is_empty() || headers.iter().any(|h| h == header) {
            continue;
        }
        if is_assignee_alias(header) {
            if has_assignee {
                continue;
            }
            has_assignee = true;
        } else if is_status_column(header) {
            if has_status {
                continue;
            }
            has_status = true;
        }
        headers.push(header.to_string());
    }

    if !has_assignee {
        headers.push(ASSIGNEE_COLUMN.to_string());
    }
    if !has_status {
        headers.push(STATUS_COLUMN.to_string());
    }
    headers
}

fn first_non_blank<'a, I>(row: &RawRow, names: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .filter_map(|name| row.get(name))
        .map(|value| value.to_string().trim().to_string())
        .find(|value| !value.is_empty())
}

/// The row's assignee: the first non-empty of the aliases in priority order,
/// then any other spelling of them, else the empty string.
pub fn resolve_assignee(row: &RawRow) -> String {
    first_non_blank(row, ASSIGNEE_ALIASES)
        .or_else(|| {
            let other: Vec<&str> = row
                .cells()
                .map(|(key, _)| key)
                .filter(|key| is_assignee_alias(key))
                .collect();
            first_non_blank(row, other)
        })
        .unwrap_or_default()
}

/// The row's status: `Status`, then `status`, then any other casing, else `Not Started`.
pub fn resolve_status(row: &RawRow) -> String {
    first_non_blank(row, STATUS_ALIASES)
        .or_else(|| {
            let other: Vec<&str> = row
                .cells()
                .map(|(key, _)| key)
                .filter(|key| is_status_column(key))
                .collect();
            first_non_blank(row, other)
        })
        .unwrap_or_else(|| NOT_STARTED.to_string())
}

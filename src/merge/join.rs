use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};
use crate::{MergeError, MergeResult, Table};

// Household key shared by every survey module after renaming.
pub const JOIN_KEYS: [&str; 4] = ["id_conglomerado", "id_vivienda", "id_hogar", "ubigeo"];

pub const LEFT_SUFFIX: &str = "_x";
pub const RIGHT_SUFFIX: &str = "_y";

// How key cells are compared across the two tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum KeyMatch {
    // Byte-for-byte text equality
    Exact,
    // Text equality after trimming surrounding whitespace
    #[default]
    Trimmed,
    // Trimmed, and numeric text compared by value ("007" == "7.0" == "7")
    Numeric,
}

impl KeyMatch {
    // Comparable form of a key cell, or `None` for a missing value.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let value = match self {
            KeyMatch::Exact => raw,
            KeyMatch::Trimmed | KeyMatch::Numeric => raw.trim(),
        };
        if value.is_empty() {
            return None;
        }

        match self {
            KeyMatch::Numeric => Some(canonical_number(value).unwrap_or_else(|| value.to_string())),
            _ => Some(value.to_string()),
        }
    }
}

fn canonical_number(value: &str) -> Option<String> {
    if let Ok(n) = value.parse::<i64>() {
        return Some(n.to_string());
    }
    let n = value.parse::<f64>().ok().filter(|n| n.is_finite())?;
    // integral floats below 2^53 are exact
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        Some((n as i64).to_string())
    } else {
        Some(n.to_string())
    }
}

fn key_indices(table: &Table, keys: &[&str]) -> Result<Vec<usize>, Vec<String>> {
    let mut indices = Vec::with_capacity(keys.len());
    let mut missing = Vec::new();
    for key in keys {
        match table.column_index(key) {
            Some(idx) => indices.push(idx),
            None => missing.push(key.to_string()),
        }
    }
    if missing.is_empty() { Ok(indices) } else { Err(missing) }
}

fn row_key(row: &[String], key_idx: &[usize], key_match: KeyMatch) -> Option<Vec<String>> {
    key_idx
        .iter()
        .map(|&idx| key_match.normalize(&row[idx]))
        .collect()
}

// Left columns, then right non-key columns. Rows in left order; repeated keys
// give the cross product; a missing key component never matches.
pub fn inner_join(
    left: &Table,
    right: &Table,
    keys: &[&str],
    key_match: KeyMatch,
) -> MergeResult<Table> {
    let (left_keys, right_keys) = match (key_indices(left, keys), key_indices(right, keys)) {
        (Ok(l), Ok(r)) => (l, r),
        (l, r) => {
            let mut problems = Vec::new();
            if let Err(missing) = l {
                problems.push(format!("left table lacks key column(s) {}", missing.join(", ")));
            }
            if let Err(missing) = r {
                problems.push(format!("right table lacks key column(s) {}", missing.join(", ")));
            }
            return Err(MergeError::Schema(problems.join("; ")));
        }
    };

    let left_payload: Vec<usize> = (0..left.column_count())
        .filter(|idx| !left_keys.contains(idx))
        .collect();
    let right_payload: Vec<usize> = (0..right.column_count())
        .filter(|idx| !right_keys.contains(idx))
        .collect();

    let left_labels: Vec<&str> = left_payload.iter().map(|&i| left.columns()[i].as_str()).collect();
    let right_labels: Vec<&str> = right_payload.iter().map(|&i| right.columns()[i].as_str()).collect();

    // (label, produced by suffixing)
    let mut labelled: Vec<(String, bool)> = left
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, label)| {
            if left_payload.contains(&idx) && right_labels.contains(&label.as_str()) {
                (format!("{}{}", label, LEFT_SUFFIX), true)
            } else {
                (label.clone(), false)
            }
        })
        .collect();
    labelled.extend(right_labels.iter().map(|label| {
        if left_labels.contains(label) {
            (format!("{}{}", label, RIGHT_SUFFIX), true)
        } else {
            (label.to_string(), false)
        }
    }));

    // a suffixed label must not land on a label that already exists
    for (label, suffixed) in &labelled {
        if *suffixed && labelled.iter().filter(|(other, _)| other == label).count() > 1 {
            return Err(MergeError::Schema(format!(
                "suffixing shared column labels produces duplicate column {}",
                label
            )));
        }
    }
    let columns: Vec<String> = labelled.into_iter().map(|(label, _)| label).collect();

    let mut index: FnvHashMap<Vec<String>, Vec<usize>> = FnvHashMap::default();
    for (row_idx, row) in right.rows().iter().enumerate() {
        if let Some(key) = row_key(row, &right_keys, key_match) {
            index.entry(key).or_default().push(row_idx);
        }
    }

    let mut joined = Table::new(columns);
    for row in left.rows() {
        let Some(key) = row_key(row, &left_keys, key_match) else {
            continue;
        };
        let Some(matches) = index.get(&key) else {
            continue;
        };
        for &right_idx in matches {
            let right_row = &right.rows()[right_idx];
            let mut out = row.clone();
            out.extend(right_payload.iter().map(|&i| right_row[i].clone()));
            joined.push_row(out)?;
        }
    }

    Ok(joined)
}

// Number of distinct key tuples that occur more than once in `table`.
pub fn duplicate_keys(table: &Table, keys: &[&str], key_match: KeyMatch) -> MergeResult<usize> {
    let key_idx = key_indices(table, keys).map_err(|missing| {
        MergeError::Schema(format!("table lacks key column(s) {}", missing.join(", ")))
    })?;

    let mut counts: FnvHashMap<Vec<String>, usize> = FnvHashMap::default();
    for row in table.rows() {
        if let Some(key) = row_key(row, &key_idx, key_match) {
            *counts.entry(key).or_insert(0) += 1;
        }
    }
    Ok(counts.values().filter(|&&n| n > 1).count())
}

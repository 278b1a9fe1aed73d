// Terminal preview of a merged output file: first rows plus value counts of one column.
use crate::etl::CSVParser;
use crate::{MergeError, MergeResult, Table};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;

pub const DEFAULT_PREVIEW_COLUMN: &str = "nivel_educativo_actual";
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone)]
pub struct Preview {
    pub head: Table,
    pub total_rows: usize,
    pub column: String,
    pub counts: Vec<(String, usize)>,
}

pub fn preview<P: AsRef<Path>>(path: P, head: usize, column: &str) -> MergeResult<Preview> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => MergeError::NotFound(path.display().to_string()),
        _ => MergeError::Decode(format!("Failed to open {}: {}", path.display(), e)),
    })?;

    let table = CSVParser::new()
        .with_encoding("utf-8")?
        .parse_table(BufReader::new(file))?;
    let values = table.column_values(column).ok_or_else(|| {
        MergeError::Schema(format!("{} has no column named {}", path.display(), column))
    })?;

    // empty cells are missing values and are not counted
    let mut tally: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values.into_iter().filter(|v| !v.is_empty()) {
        *tally.entry(value).or_insert(0) += 1;
    }
    let mut counts: Vec<(String, usize)> = tally
        .into_iter()
        .map(|(value, count)| (value.to_string(), count))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    Ok(Preview {
        head: table.head(head),
        total_rows: table.row_count(),
        column: column.to_string(),
        counts,
    })
}

impl Preview {
    pub fn render(&self) -> String {
        let columns = self.head.columns();
        let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
        for row in self.head.rows() {
            for (idx, cell) in row.iter().enumerate() {
                widths[idx] = widths[idx].max(cell.chars().count());
            }
        }

        let format_row = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{:<width$}", cell, width = width))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        let mut out = String::new();
        out.push_str(&format!(
            "Preview ({} of {} rows):\n",
            self.head.row_count(),
            self.total_rows
        ));
        out.push_str(&format_row(columns));
        out.push('\n');
        out.push_str(&widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-"));
        out.push('\n');
        for row in self.head.rows() {
            out.push_str(&format_row(row));
            out.push('\n');
        }

        out.push_str(&format!("\nValue counts for {}:\n", self.column));
        for (value, count) in &self.counts {
            out.push_str(&format!("  {}: {}\n", value, count));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_merged(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("base_limpia_enaho.csv");
        std::fs::write(
            &path,
            "id_hogar,nivel_educativo_actual\n1,Primaria\n2,Secundaria\n3,Primaria\n4,\n5,Básica\n",
        )
        .unwrap();
        path
    }

    #[test]
    fn test_value_counts_sorted() {
        let temp_dir = tempdir().unwrap();
        let path = write_merged(temp_dir.path());

        let preview = preview(&path, 2, DEFAULT_PREVIEW_COLUMN).unwrap();
        assert_eq!(preview.total_rows, 5);
        assert_eq!(preview.head.row_count(), 2);
        assert_eq!(
            preview.counts,
            vec![
                ("Primaria".to_string(), 2),
                ("Básica".to_string(), 1),
                ("Secundaria".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_render_contains_rows_and_counts() {
        let temp_dir = tempdir().unwrap();
        let path = write_merged(temp_dir.path());

        let rendered = preview(&path, 1, DEFAULT_PREVIEW_COLUMN).unwrap().render();
        assert!(rendered.starts_with("Preview (1 of 5 rows):\n"));
        assert!(rendered.contains("id_hogar | nivel_educativo_actual\n"));
        assert!(rendered.contains("1        | Primaria\n"));
        assert!(rendered.contains("  Primaria: 2\n"));
    }

    #[test]
    fn test_unknown_column_and_missing_file() {
        let temp_dir = tempdir().unwrap();
        let path = write_merged(temp_dir.path());

        let err = preview(&path, 5, "sexo").unwrap_err();
        assert!(matches!(err, MergeError::Schema(_)));

        let err = preview(temp_dir.path().join("none.csv"), 5, DEFAULT_PREVIEW_COLUMN).unwrap_err();
        assert!(matches!(err, MergeError::NotFound(_)));
    }
}

use crate::config::MergeConfig;
use crate::etl::{ETLLoader, RenameMapping};
use crate::merge::join::{duplicate_keys, inner_join, KeyMatch, JOIN_KEYS};
use crate::{MergeError, MergeResult, Table};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeReport {
    pub output_path: String,
    pub left_rows: usize,
    pub right_rows: usize,
    pub rows: usize,
    pub columns: usize,
    pub left_duplicate_keys: usize,
    pub right_duplicate_keys: usize,
    pub load_ms: f64,
    pub join_ms: f64,
    pub write_ms: f64,
}

impl MergeReport {
    pub fn summary_line(&self) -> String {
        format!(
            "✅ Merged file saved to {} with {} rows and {} columns.",
            self.output_path, self.rows, self.columns
        )
    }

    pub fn to_json(&self) -> MergeResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| MergeError::Write(format!("Failed to serialize report: {}", e)))
    }
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub table: Table,
    pub rows: usize,
    pub columns: usize,
    pub report: MergeReport,
}

// Merges two extracts with the default loader and key matching.
pub fn combine_and_save<P: AsRef<Path>, Q: AsRef<Path>, R: AsRef<Path>>(
    path_a: P,
    path_b: Q,
    output_path: R,
    mapping_a: &RenameMapping,
    mapping_b: &RenameMapping,
    row_cap: usize,
) -> MergeResult<MergeOutcome> {
    Merger::new().combine_and_save(path_a, path_b, output_path, mapping_a, mapping_b, row_cap)
}

#[derive(Debug, Clone)]
pub struct Merger {
    loader: ETLLoader,
    key_match: KeyMatch,
    parallel_loads: bool,
}

impl Merger {
    pub fn new() -> Self {
        Self {
            loader: ETLLoader::new(),
            key_match: KeyMatch::default(),
            parallel_loads: false,
        }
    }

    pub fn from_config(config: &MergeConfig) -> MergeResult<Self> {
        Ok(Self {
            loader: ETLLoader::from_config(&config.etl)?,
            key_match: config.merge.key_match,
            parallel_loads: config.etl.parallel_loads,
        })
    }

    pub fn with_loader(mut self, loader: ETLLoader) -> Self {
        self.loader = loader;
        self
    }

    pub fn with_key_match(mut self, key_match: KeyMatch) -> Self {
        self.key_match = key_match;
        self
    }

    pub fn with_parallel_loads(mut self, parallel_loads: bool) -> Self {
        self.parallel_loads = parallel_loads;
        self
    }

    // Loads both extracts, inner-joins them on JOIN_KEYS and writes the
    // result to `output_path`. Nothing is written unless every step succeeds.
    pub fn combine_and_save<P: AsRef<Path>, Q: AsRef<Path>, R: AsRef<Path>>(
        &self,
        path_a: P,
        path_b: Q,
        output_path: R,
        mapping_a: &RenameMapping,
        mapping_b: &RenameMapping,
        row_cap: usize,
    ) -> MergeResult<MergeOutcome> {
        let (path_a, path_b, output_path) = (path_a.as_ref(), path_b.as_ref(), output_path.as_ref());

        for (path, mapping) in [(path_a, mapping_a), (path_b, mapping_b)] {
            let missing = mapping.missing_keys(&JOIN_KEYS);
            if !missing.is_empty() {
                tracing::warn!(path = %path.display(), ?missing, "rename mapping does not produce every join key");
            }
        }

        let start = Instant::now();
        let (left, right) = if self.parallel_loads {
            rayon::join(
                || self.loader.load_and_rename(path_a, mapping_a, row_cap),
                || self.loader.load_and_rename(path_b, mapping_b, row_cap),
            )
        } else {
            (
                self.loader.load_and_rename(path_a, mapping_a, row_cap),
                self.loader.load_and_rename(path_b, mapping_b, row_cap),
            )
        };
        let (left, right) = (left?, right?);
        let load_ms = elapsed_ms(start);

        let start = Instant::now();
        let joined = inner_join(&left, &right, &JOIN_KEYS, self.key_match)?;
        let left_duplicate_keys = duplicate_keys(&left, &JOIN_KEYS, self.key_match)?;
        let right_duplicate_keys = duplicate_keys(&right, &JOIN_KEYS, self.key_match)?;
        if left_duplicate_keys + right_duplicate_keys > 0 {
            tracing::warn!(
                left = left_duplicate_keys,
                right = right_duplicate_keys,
                "repeated household keys, joined rows include their cross product"
            );
        }
        let join_ms = elapsed_ms(start);

        let start = Instant::now();
        write_csv(&joined, output_path)?;
        let write_ms = elapsed_ms(start);

        let report = MergeReport {
            output_path: output_path.display().to_string(),
            left_rows: left.row_count(),
            right_rows: right.row_count(),
            rows: joined.row_count(),
            columns: joined.column_count(),
            left_duplicate_keys,
            right_duplicate_keys,
            load_ms,
            join_ms,
            write_ms,
        };
        tracing::info!(
            output = %report.output_path,
            rows = report.rows,
            columns = report.columns,
            "merged extracts"
        );

        Ok(MergeOutcome {
            rows: report.rows,
            columns: report.columns,
            table: joined,
            report,
        })
    }
}

impl Default for Merger {
    fn default() -> Self {
        Self::new()
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

// Writes `table` as UTF-8 CSV with a header row. The data goes to a
// temporary file in the target directory which then replaces `output_path`.
pub fn write_csv(table: &Table, output_path: &Path) -> MergeResult<()> {
    let parent = match output_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    if !parent.is_dir() {
        return Err(MergeError::Write(format!(
            "Output directory does not exist: {}",
            parent.display()
        )));
    }

    // tempfile defaults to 0600; a fresh output gets 0666 minus the umask, like fs::write
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let mut temp = builder.tempfile_in(parent).map_err(|e| write_error(output_path, e))?;
    // an overwritten output keeps its mode
    if let Ok(existing) = std::fs::metadata(output_path) {
        temp.as_file()
            .set_permissions(existing.permissions())
            .map_err(|e| write_error(output_path, e))?;
    }
    {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(&mut temp);
        writer.write_record(table.columns()).map_err(|e| write_error(output_path, e))?;
        for row in table.rows() {
            writer.write_record(row).map_err(|e| write_error(output_path, e))?;
        }
        writer.flush().map_err(|e| write_error(output_path, e))?;
    }
    temp.as_file_mut().sync_all().map_err(|e| write_error(output_path, e))?;
    temp.persist(output_path).map_err(|e| write_error(output_path, e.error))?;

    Ok(())
}

fn write_error(path: &Path, e: impl std::fmt::Display) -> MergeError {
    MergeError::Write(format!("Failed to write {}: {}", path.display(), e))
}

use crate::config::EtlConfig;
use crate::etl::csv_parser::{CSVParser, DEFAULT_ENCODING};
use crate::etl::mappings::RenameMapping;
use crate::{MergeError, MergeResult, Table};
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;

pub const DEFAULT_ROW_CAP: usize = 100;

// Loads one survey extract with the default delimiter and encoding.
pub fn load_and_rename<P: AsRef<Path>>(
    path: P,
    mapping: &RenameMapping,
    row_cap: usize,
) -> MergeResult<Table> {
    ETLLoader::new().load_and_rename(path, mapping, row_cap)
}

#[derive(Debug, Clone)]
pub struct ETLLoader {
    delimiter: u8,
    encoding: String,
}

impl ETLLoader {
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            encoding: DEFAULT_ENCODING.to_string(),
        }
    }

    pub fn from_config(config: &EtlConfig) -> MergeResult<Self> {
        if !config.delimiter.is_ascii() {
            return Err(MergeError::Config(format!(
                "Delimiter must be a single ASCII character, got {:?}",
                config.delimiter
            )));
        }
        Ok(Self {
            delimiter: config.delimiter as u8,
            encoding: config.encoding.clone(),
        })
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    // Reads the first `row_cap` rows of `path` and relabels the columns
    // listed in `mapping`. Key columns are not checked here.
    pub fn load_and_rename<P: AsRef<Path>>(
        &self,
        path: P,
        mapping: &RenameMapping,
        row_cap: usize,
    ) -> MergeResult<Table> {
        let path = path.as_ref();
        if row_cap == 0 {
            return Err(MergeError::Config("Row cap must be a positive integer".to_string()));
        }

        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => MergeError::NotFound(path.display().to_string()),
            _ => MergeError::Decode(format!("Failed to open {}: {}", path.display(), e)),
        })?;

        let parser = CSVParser::new()
            .with_delimiter(self.delimiter)
            .with_encoding(&self.encoding)?
            .with_row_cap(row_cap);
        let mut table = parser.parse_table(BufReader::new(file)).map_err(|e| match e {
            MergeError::Decode(msg) => MergeError::Decode(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;

        let renamed = table.rename_columns(mapping);
        tracing::debug!(
            path = %path.display(),
            encoding = parser.encoding_name(),
            rows = table.row_count(),
            columns = table.column_count(),
            renamed,
            "loaded extract"
        );

        Ok(table)
    }
}

impl Default for ETLLoader {
    fn default() -> Self {
        Self::new()
    }
}

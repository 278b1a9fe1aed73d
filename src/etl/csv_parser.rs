use csv::ByteRecord;
use encoding_rs::Encoding;
use std::io::Read;
use crate::{MergeError, MergeResult, Table};

// encoding_rs resolves this label to windows-1252
pub const DEFAULT_ENCODING: &str = "latin1";

pub struct CSVParser {
    delimiter: u8,
    encoding: &'static Encoding,
    row_cap: Option<usize>,
}

pub fn resolve_encoding(label: &str) -> MergeResult<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| MergeError::Config(format!("Unknown text encoding: {}", label)))
}

impl CSVParser {
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            encoding: encoding_rs::WINDOWS_1252,
            row_cap: None,
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_encoding(mut self, label: &str) -> MergeResult<Self> {
        self.encoding = resolve_encoding(label)?;
        Ok(self)
    }

    pub fn with_row_cap(mut self, row_cap: usize) -> Self {
        self.row_cap = Some(row_cap);
        self
    }

    pub fn encoding_name(&self) -> &'static str {
        self.encoding.name()
    }

    // header plus at most row_cap data rows, in file order
    pub fn parse_table<R: Read>(&self, reader: R) -> MergeResult<Table> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let header = csv_reader
            .byte_headers()
            .map_err(|e| MergeError::Decode(format!("CSV header error: {}", e)))?
            .clone();
        let columns = self.decode_record(&header, 1)?;
        let mut table = Table::new(columns);

        let mut record = ByteRecord::new();
        let mut line = 1;
        while self.row_cap.is_none_or(|cap| table.row_count() < cap) {
            let more = csv_reader.read_byte_record(&mut record).map_err(|e| {
                MergeError::Decode(format!("CSV parsing error after line {}: {}", line, e))
            })?;
            if !more {
                break;
            }
            line += 1;
            if record.len() > table.column_count() {
                return Err(MergeError::Decode(format!(
                    "line {} has {} fields but the header has {}",
                    line,
                    record.len(),
                    table.column_count()
                )));
            }
            // short rows are padded with missing values
            let mut row = self.decode_record(&record, line)?;
            row.resize(table.column_count(), String::new());
            table.push_row(row)?;
        }

        Ok(table)
    }

    fn decode_record(&self, record: &ByteRecord, line: usize) -> MergeResult<Vec<String>> {
        record
            .iter()
            .map(|field| {
                self.encoding
                    .decode_without_bom_handling_and_without_replacement(field)
                    .map(|text| text.into_owned())
                    .ok_or_else(|| {
                        MergeError::Decode(format!(
                            "line {} is not valid {} text",
                            line,
                            self.encoding.name()
                        ))
                    })
            })
            .collect()
    }
}

impl Default for CSVParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin1_fields_are_decoded() {
        // "Educación" and "Año" encoded as ISO-8859-1
        let bytes: &[u8] = b"conglome,nivel,a\xf1o\n1,Educaci\xf3n,2024\n";
        let table = CSVParser::new().parse_table(bytes).unwrap();

        assert_eq!(table.columns(), &["conglome", "nivel", "año"]);
        assert_eq!(table.value(0, "nivel"), Some("Educación"));
    }

    #[test]
    fn test_row_cap_takes_prefix() {
        let mut data = String::from("id,value\n");
        for i in 0..10 {
            data.push_str(&format!("{},v{}\n", i, i));
        }

        let table = CSVParser::new().with_row_cap(4).parse_table(data.as_bytes()).unwrap();
        assert_eq!(table.row_count(), 4);
        assert_eq!(table.column_values("id").unwrap(), vec!["0", "1", "2", "3"]);

        let table = CSVParser::new().with_row_cap(50).parse_table(data.as_bytes()).unwrap();
        assert_eq!(table.row_count(), 10);
    }

    #[test]
    fn test_rows_past_cap_are_not_parsed() {
        let bytes: &[u8] = b"id,value\n1,a\n2,b,extra\n";
        let table = CSVParser::new().with_row_cap(1).parse_table(bytes).unwrap();
        assert_eq!(table.row_count(), 1);

        let err = CSVParser::new().parse_table(bytes).unwrap_err();
        assert!(matches!(err, MergeError::Decode(ref msg) if msg.contains("line 3 has 3 fields")));
    }

    #[test]
    fn test_short_rows_padded_with_missing_values() {
        let bytes: &[u8] = b"conglome,vivienda,hogar,ubigeo,p100,p101\n1,1,11,150101,1\n2,1,11,150101,1,3\n";
        let table = CSVParser::new().parse_table(bytes).unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.value(0, "p100"), Some("1"));
        assert_eq!(table.value(0, "p101"), Some(""));
        assert_eq!(table.value(1, "p101"), Some("3"));
    }

    #[test]
    fn test_strict_encoding_rejects_invalid_bytes() {
        let bytes: &[u8] = b"id,nivel\n1,Educaci\xf3n\n";
        let parser = CSVParser::new().with_encoding("utf-8").unwrap();
        let err = parser.parse_table(bytes).unwrap_err();
        assert!(matches!(err, MergeError::Decode(ref msg) if msg.contains("line 2")));
    }

    #[test]
    fn test_unknown_encoding_label() {
        let err = CSVParser::new().with_encoding("klingon").err().unwrap();
        assert!(matches!(err, MergeError::Config(_)));
        assert_eq!(resolve_encoding("latin1").unwrap().name(), "windows-1252");
    }

    #[test]
    fn test_custom_delimiter() {
        let bytes: &[u8] = b"name;age;city\nAlice;25;Lima\nBob;30;Cusco\n";
        let table = CSVParser::new().with_delimiter(b';').parse_table(bytes).unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.value(0, "name"), Some("Alice"));
        assert_eq!(table.value(1, "city"), Some("Cusco"));
    }

    #[test]
    fn test_header_only_file() {
        let table = CSVParser::new().parse_table(&b"a,b,c\n"[..]).unwrap();
        assert_eq!(table.column_count(), 3);
        assert!(table.is_empty());
    }
}

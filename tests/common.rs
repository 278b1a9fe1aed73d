// Common test utilities for integration tests
#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

pub const UBIGEO: &str = "150101";

pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

// Encodes text as ISO-8859-1, the way the survey extracts ship
pub fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).expect("character outside Latin-1"))
        .collect()
}

fn write_latin1(temp_dir: &TempDir, filename: &str, lines: &[String]) -> PathBuf {
    let path = temp_dir.path().join(filename);
    let mut file = File::create(&path).expect("Failed to create CSV file");
    for line in lines {
        file.write_all(&latin1(line)).expect("Failed to write CSV data");
        file.write_all(b"\n").expect("Failed to write CSV data");
    }
    path
}

// Module 100 extract: key columns, p100..p110 and one unmapped column.
// p100 carries "a<conglome>" so joined rows can be traced back to their source.
pub fn create_module_100(temp_dir: &TempDir, filename: &str, keys: impl IntoIterator<Item = u32>) -> PathBuf {
    let mut lines = vec![module_header("p1")];
    for key in keys {
        let mut fields = vec![
            key.to_string(),
            key.to_string(),
            "11".to_string(),
            UBIGEO.to_string(),
            format!("a{}", key),
            "Educación básica".to_string(),
        ];
        fields.extend((2..=10).map(|q| format!("{}", (key + q) % 3)));
        lines.push(fields.join(","));
    }
    write_latin1(temp_dir, filename, &lines)
}

// Module 200 extract with the same key layout; p200 carries "b<conglome>".
pub fn create_module_200(temp_dir: &TempDir, filename: &str, keys: impl IntoIterator<Item = u32>) -> PathBuf {
    let mut lines = vec![module_header("p2")];
    for key in keys {
        let mut fields = vec![
            key.to_string(),
            key.to_string(),
            "11".to_string(),
            UBIGEO.to_string(),
            format!("b{}", key),
            "Seguro Integral de Salud".to_string(),
        ];
        fields.extend((2..=10).map(|q| format!("{}", key * q)));
        lines.push(fields.join(","));
    }
    write_latin1(temp_dir, filename, &lines)
}

// Writes raw lines as-is (already comma separated), Latin-1 encoded
pub fn create_raw_csv(temp_dir: &TempDir, filename: &str, lines: &[&str]) -> PathBuf {
    let lines: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
    write_latin1(temp_dir, filename, &lines)
}

fn module_header(prefix: &str) -> String {
    let mut columns = vec![
        "conglome".to_string(),
        "vivienda".to_string(),
        "hogar".to_string(),
        "ubigeo".to_string(),
    ];
    columns.extend((0..=10).map(|q| format!("{}{:02}", prefix, q)));
    columns.join(",")
}

pub fn read_output(path: &PathBuf) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).expect("Failed to open output");
    let header = reader
        .headers()
        .expect("Failed to read header")
        .iter()
        .map(String::from)
        .collect();
    let rows = reader
        .records()
        .map(|r| r.expect("Failed to read record").iter().map(String::from).collect())
        .collect();
    (header, rows)
}

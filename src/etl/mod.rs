pub mod csv_parser;
pub mod loader;
pub mod mappings;

pub use csv_parser::CSVParser;
pub use loader::{load_and_rename, ETLLoader, DEFAULT_ROW_CAP};
pub use mappings::{MappingVersion, ModuleMappings, RenameMapping};

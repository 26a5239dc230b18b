//! Data loading utilities
//!
//! Local files only; fetching remote archives is left to the caller.

use crate::error::{CatalogError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// File formats recognised by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Tsv,
    Parquet,
    Json,
    JsonLines,
}

impl FileFormat {
    /// Detect the format from a path's extension, defaulting to CSV
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "tsv" => FileFormat::Tsv,
            "parquet" | "pq" => FileFormat::Parquet,
            "json" => FileFormat::Json,
            "jsonl" | "ndjson" => FileFormat::JsonLines,
            _ => FileFormat::Csv,
        }
    }
}

/// Data loader for various file formats
#[derive(Debug, Clone)]
pub struct DataLoader {
    /// Rows sampled for CSV schema inference
    infer_schema_length: Option<usize>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            infer_schema_length: Some(100),
        }
    }

    /// Set the number of rows used for schema inference; `None` reads all
    pub fn with_infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_length = rows;
        self
    }

    /// Load a delimited text file with a header row
    pub fn load_csv(&self, path: impl AsRef<Path>, delimiter: u8) -> Result<DataFrame> {
        let file = open(path.as_ref())?;
        let parse_opts = CsvParseOptions::default().with_separator(delimiter);

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| CatalogError::DataError(e.to_string()))
    }

    /// Load a Parquet file
    pub fn load_parquet(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let file = open(path.as_ref())?;
        ParquetReader::new(file)
            .finish()
            .map_err(|e| CatalogError::DataError(e.to_string()))
    }

    /// Load a JSON array or line-delimited JSON file
    pub fn load_json(&self, path: impl AsRef<Path>, format: JsonFormat) -> Result<DataFrame> {
        let file = open(path.as_ref())?;
        JsonReader::new(file)
            .with_json_format(format)
            .finish()
            .map_err(|e| CatalogError::DataError(e.to_string()))
    }

    /// Detect file format from extension and load
    pub fn load_auto(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let df = match FileFormat::from_path(path) {
            FileFormat::Csv => self.load_csv(path, b',')?,
            FileFormat::Tsv => self.load_csv(path, b'\t')?,
            FileFormat::Parquet => self.load_parquet(path)?,
            FileFormat::Json => self.load_json(path, JsonFormat::Json)?,
            FileFormat::JsonLines => self.load_json(path, JsonFormat::JsonLines)?,
        };
        tracing::debug!(path = %path.display(), rows = df.height(), columns = df.width(), "loaded data");
        Ok(df)
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path)
        .map_err(|e| CatalogError::DataError(format!("{}: {}", path.display(), e)))
}

/// Writers matching [`DataLoader`]'s formats
pub struct DataSaver;

impl DataSaver {
    /// Save to CSV
    pub fn save_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        CsvWriter::new(&mut file)
            .finish(df)
            .map_err(|e| CatalogError::DataError(e.to_string()))
    }

    /// Save to Parquet
    pub fn save_parquet(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        ParquetWriter::new(file)
            .finish(df)
            .map_err(|e| CatalogError::DataError(e.to_string()))?;
        Ok(())
    }

    /// Save in the format implied by the extension; JSON is written line-delimited
    pub fn save_auto(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        match FileFormat::from_path(path) {
            FileFormat::Parquet => Self::save_parquet(df, path),
            FileFormat::Json | FileFormat::JsonLines => {
                let mut file = File::create(path)?;
                JsonWriter::new(&mut file)
                    .with_json_format(JsonFormat::JsonLines)
                    .finish(df)
                    .map_err(|e| CatalogError::DataError(e.to_string()))
            }
            FileFormat::Csv | FileFormat::Tsv => Self::save_csv(df, path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_path(Path::new("items.CSV")), FileFormat::Csv);
        assert_eq!(FileFormat::from_path(Path::new("items.pq")), FileFormat::Parquet);
        assert_eq!(FileFormat::from_path(Path::new("items.jsonl")), FileFormat::JsonLines);
        assert_eq!(FileFormat::from_path(Path::new("items")), FileFormat::Csv);
    }

    #[test]
    fn test_load_csv_with_list_literals() {
        let mut file = tempfile::NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(file, "id,tags").unwrap();
        writeln!(file, "1,\"['a', 'b']\"").unwrap();
        writeln!(file, "2,\"[]\"").unwrap();
        file.flush().unwrap();

        let df = DataLoader::new().load_auto(file.path()).unwrap();
        assert_eq!(df.shape(), (2, 2));
        let tags = df.column("tags").unwrap().str().unwrap().get(0).map(str::to_string);
        assert_eq!(tags.as_deref(), Some("['a', 'b']"));
    }

    #[test]
    fn test_missing_file() {
        assert!(DataLoader::new().load_auto("/nonexistent/items.csv").is_err());
    }
}

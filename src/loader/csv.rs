use crate::loader::TableLoader;
use crate::table::{Column, ColumnData, Table};
use anyhow::Context;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Rows inspected when inferring column types.
const INFER_SCHEMA_ROWS: usize = 100;

/// Reads a headered CSV file.
///
/// Columns with a numeric dtype become numeric columns with nulls as NaN;
/// every other column is read as text with nulls as missing cells.
#[derive(Debug, Clone)]
pub struct CsvLoader {
    path: PathBuf,
}

impl CsvLoader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl TableLoader for CsvLoader {
    fn load(&self) -> anyhow::Result<Table> {
        let file = File::open(&self.path)
            .with_context(|| format!("cannot open {}", self.path.display()))?;
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .into_reader_with_file_handle(file)
            .finish()
            .with_context(|| format!("cannot parse {}", self.path.display()))?;

        let columns = df
            .get_columns()
            .iter()
            .map(|column| convert_column(column.as_materialized_series()))
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Table::new(columns)?)
    }
}

fn convert_column(series: &Series) -> anyhow::Result<Column> {
    let name = series.name().to_string();
    let data = if series.dtype().is_primitive_numeric() {
        let casted = series.cast(&DataType::Float64)?;
        ColumnData::Numeric(
            casted
                .f64()?
                .into_iter()
                .map(|v| v.unwrap_or(f64::NAN))
                .collect(),
        )
    } else {
        let casted = series.cast(&DataType::String)?;
        ColumnData::Categorical(
            casted
                .str()?
                .into_iter()
                .map(|v| v.map(str::to_string))
                .collect(),
        )
    };
    Ok(Column::new(name, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;
    use std::io::Write;

    #[test]
    fn test_load_csv() {
        let path = std::env::temp_dir().join("party_analysis_loader_test.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "party_id,party,country,lrgen").unwrap();
        writeln!(file, "1,KOK,fin,7.1").unwrap();
        writeln!(file, "2,,fin,").unwrap();
        drop(file);

        let table = CsvLoader::new(&path).load().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(table.shape(), (2, 4));
        assert!(table.column("party_id").unwrap().is_numeric());
        assert!(!table.column("party").unwrap().is_numeric());
        assert_eq!(table.row(0)[1], Cell::from("KOK"));
        assert_eq!(table.missing_count(), 2);
    }

    #[test]
    fn test_missing_file() {
        assert!(CsvLoader::new("/nonexistent/parties.csv").load().is_err());
    }
}

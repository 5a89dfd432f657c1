//! Sources of the raw survey table.
//!
//! The analysis itself never reads files; it receives a [`Table`] from a
//! [`TableLoader`]. Tests and embedding code use [`InMemoryLoader`], the
//! command-line driver reads CSV through polars (feature `polars`).

use crate::table::Table;

#[cfg(feature = "polars")]
mod csv;

#[cfg(feature = "polars")]
pub use csv::CsvLoader;

pub trait TableLoader {
    fn load(&self) -> anyhow::Result<Table>;
}

/// Hands out copies of a table built elsewhere.
#[derive(Debug, Clone)]
pub struct InMemoryLoader {
    table: Table,
}

impl InMemoryLoader {
    pub fn new(table: Table) -> Self {
        Self { table }
    }
}

impl From<Table> for InMemoryLoader {
    fn from(table: Table) -> Self {
        Self::new(table)
    }
}

impl TableLoader for InMemoryLoader {
    fn load(&self) -> anyhow::Result<Table> {
        Ok(self.table.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    #[test]
    fn test_in_memory_loader() {
        let table = Table::new(vec![
            Column::numeric("lrgen", vec![1.0, 2.0]),
            Column::categorical("country", vec![Some("fin"), None]),
        ])
        .unwrap();
        let loader = InMemoryLoader::from(table.clone());
        assert_eq!(loader.load().unwrap(), table);
        assert_eq!(loader.load().unwrap(), table);
    }

    #[test]
    fn test_loader_as_trait_object() {
        let loaders: Vec<Box<dyn TableLoader>> = vec![Box::new(InMemoryLoader::new(
            Table::new(vec![Column::numeric("a", vec![0.0])]).unwrap(),
        ))];
        assert_eq!(loaders[0].load().unwrap().shape(), (1, 1));
    }
}

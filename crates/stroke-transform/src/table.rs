//! Clean table storage.

use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, PolarsResult, Series};
use stroke_model::{CleanType, CleanValue, ID_COLUMN};

/// Typed cells of one clean column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Int(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    fn with_capacity(kind: CleanType, rows: usize) -> Self {
        match kind {
            CleanType::Int => Self::Int(Vec::with_capacity(rows)),
            CleanType::Float => Self::Float(Vec::with_capacity(rows)),
            CleanType::Text => Self::Text(Vec::with_capacity(rows)),
        }
    }

    /// Appends a cell. A value of the wrong type is stored as null.
    fn push(&mut self, value: Option<CleanValue>) {
        match self {
            Self::Int(cells) => cells.push(value.and_then(|v| v.as_i64())),
            Self::Float(cells) => cells.push(value.and_then(|v| v.as_f64())),
            Self::Text(cells) => cells.push(match value {
                Some(CleanValue::Text(text)) => Some(text),
                _ => None,
            }),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Int(cells) => cells.len(),
            Self::Float(cells) => cells.len(),
            Self::Text(cells) => cells.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, row: usize) -> Option<CleanValue> {
        match self {
            Self::Int(cells) => cells.get(row).copied().flatten().map(CleanValue::Int),
            Self::Float(cells) => cells.get(row).copied().flatten().map(CleanValue::Float),
            Self::Text(cells) => cells
                .get(row)
                .cloned()
                .flatten()
                .map(CleanValue::Text),
        }
    }

    pub fn null_count(&self) -> usize {
        match self {
            Self::Int(cells) => cells.iter().filter(|c| c.is_none()).count(),
            Self::Float(cells) => cells.iter().filter(|c| c.is_none()).count(),
            Self::Text(cells) => cells.iter().filter(|c| c.is_none()).count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleanColumn {
    pub name: String,
    pub data: ColumnData,
}

/// The normalized table: `id` plus one column per catalog field, in
/// declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanTable {
    ids: Vec<i64>,
    columns: Vec<CleanColumn>,
}

impl CleanTable {
    pub(crate) fn with_schema<'a>(
        fields: impl IntoIterator<Item = (&'a str, CleanType)>,
        rows: usize,
    ) -> Self {
        let columns = fields
            .into_iter()
            .map(|(name, kind)| CleanColumn {
                name: name.to_string(),
                data: ColumnData::with_capacity(kind, rows),
            })
            .collect();
        Self {
            ids: Vec::with_capacity(rows),
            columns,
        }
    }

    /// Appends one row; `values` is indexed like the columns.
    pub(crate) fn push_row(&mut self, id: i64, values: Vec<Option<CleanValue>>) {
        self.ids.push(id);
        for (column, value) in self.columns.iter_mut().zip(values) {
            column.data.push(value);
        }
    }

    pub fn height(&self) -> usize {
        self.ids.len()
    }

    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    pub fn columns(&self) -> &[CleanColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&CleanColumn> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn value(&self, row: usize, name: &str) -> Option<CleanValue> {
        self.column(name).and_then(|column| column.data.get(row))
    }

    /// Column names in output order, `id` first.
    pub fn column_names(&self) -> Vec<&str> {
        std::iter::once(ID_COLUMN)
            .chain(self.columns.iter().map(|column| column.name.as_str()))
            .collect()
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.columns.len() + 1);
        columns.push(Series::new(ID_COLUMN.into(), self.ids.as_slice()).into_column());
        for column in &self.columns {
            let name = column.name.as_str().into();
            let series = match &column.data {
                ColumnData::Int(cells) => Series::new(name, cells.as_slice()),
                ColumnData::Float(cells) => Series::new(name, cells.as_slice()),
                ColumnData::Text(cells) => Series::new(name, cells.as_slice()),
            };
            columns.push(series.into_column());
        }
        DataFrame::new(columns)
    }
}

#[cfg(test)]
mod tests {
    use polars::prelude::{AnyValue, DataType};

    use super::*;

    fn table() -> CleanTable {
        let mut table = CleanTable::with_schema(
            [
                ("stroke_team", CleanType::Text),
                ("male", CleanType::Int),
                ("age", CleanType::Float),
            ],
            2,
        );
        table.push_row(
            1,
            vec![
                Some(CleanValue::Text("Team A".to_string())),
                Some(CleanValue::Int(1)),
                Some(CleanValue::Float(87.5)),
            ],
        );
        table.push_row(2, vec![None, Some(CleanValue::Int(0)), None]);
        table
    }

    #[test]
    fn values_by_name() {
        let table = table();
        assert_eq!(table.height(), 2);
        assert_eq!(table.value(0, "male"), Some(CleanValue::Int(1)));
        assert_eq!(table.value(1, "age"), None);
        assert_eq!(table.column("stroke_team").unwrap().data.null_count(), 1);
        assert_eq!(table.column_names(), vec!["id", "stroke_team", "male", "age"]);
    }

    #[test]
    fn wrong_type_is_stored_as_null() {
        let mut table = CleanTable::with_schema([("male", CleanType::Int)], 1);
        table.push_row(1, vec![Some(CleanValue::Text("Y".to_string()))]);
        assert_eq!(table.value(0, "male"), None);
    }

    #[test]
    fn dataframe_keeps_order_and_types() {
        let df = table().to_dataframe().unwrap();
        let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["id", "stroke_team", "male", "age"]);
        assert_eq!(df.column("id").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("male").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("age").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("stroke_team").unwrap().dtype(), &DataType::String);
        assert!(matches!(
            df.column("age").unwrap().get(1).unwrap(),
            AnyValue::Null
        ));
    }
}

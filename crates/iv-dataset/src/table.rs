//! Generic named-column table handed over by the ingestion layer.
//!
//! Each column is an ordered sequence of samples; missing cells are NaN.
//! Several headers may belong to the same role (one per measured set).

use std::path::Path;

use indexmap::IndexMap;

use crate::error::{DatasetError, DatasetResult};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    columns: IndexMap<String, Vec<f64>>,
}

impl RawTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> DatasetResult<Self> {
        self.push_column(name, values)?;
        Ok(self)
    }

    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> DatasetResult<()> {
        let name = name.into();
        if self.columns.contains_key(&name) {
            return Err(DatasetError::DuplicateColumn { name });
        }
        self.columns.insert(name, values);
        Ok(())
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> + Clone {
        self.columns.keys().map(String::as_str)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Parse comma- or tab-delimited text with a single header line.
    ///
    /// The delimiter is taken from the header line when not given (tab wins
    /// over comma). Empty cells become NaN. Repeated headers get a `.N`
    /// suffix so every column stays addressable.
    pub fn from_delimited(text: &str, delimiter: Option<char>) -> DatasetResult<Self> {
        let mut lines = text
            .trim_start_matches('\u{feff}')
            .lines()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty());

        let (_, header_line) = lines.next().ok_or_else(|| DatasetError::Empty {
            what: "no header line".to_string(),
        })?;
        let delimiter = delimiter.unwrap_or(if header_line.contains('\t') { '\t' } else { ',' });

        let mut names: Vec<String> = Vec::new();
        for raw in header_line.split(delimiter) {
            let base = raw.trim().trim_matches('"').to_string();
            let mut name = base.clone();
            let mut n = 1;
            while names.contains(&name) {
                name = format!("{base}.{n}");
                n += 1;
            }
            names.push(name);
        }

        let mut data: Vec<Vec<f64>> = vec![Vec::new(); names.len()];
        for (line_no, line) in lines {
            let cells: Vec<&str> = line.split(delimiter).collect();
            for (col, values) in data.iter_mut().enumerate() {
                let cell = cells.get(col).map(|c| c.trim().trim_matches('"')).unwrap_or("");
                let value = if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
                    f64::NAN
                } else {
                    cell.parse::<f64>().map_err(|_| DatasetError::Parse {
                        line: line_no + 1,
                        column: col + 1,
                        text: cell.to_string(),
                    })?
                };
                values.push(value);
            }
        }

        Ok(Self {
            columns: names.into_iter().zip(data).collect(),
        })
    }

    pub fn read_delimited(path: &Path) -> DatasetResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_delimited(&text, None)
    }
}

impl FromIterator<(String, Vec<f64>)> for RawTable {
    fn from_iter<I: IntoIterator<Item = (String, Vec<f64>)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_csv_with_blank_cells() {
        let text = "Vg,Id,Vd\n0,1e-9,1\n1,2e-9,\n";
        let table = RawTable::from_delimited(text, None).unwrap();
        assert_eq!(table.headers().collect::<Vec<_>>(), vec!["Vg", "Id", "Vd"]);
        assert_eq!(table.column("Id").unwrap(), &[1e-9, 2e-9]);
        assert!(table.column("Vd").unwrap()[1].is_nan());
    }

    #[test]
    fn detects_tabs_and_renames_repeated_headers() {
        let text = "GateV\tDrainI\tGateV\n0\t1\t0\n";
        let table = RawTable::from_delimited(text, None).unwrap();
        let headers: Vec<_> = table.headers().collect();
        assert_eq!(headers, vec!["GateV", "DrainI", "GateV.1"]);
    }

    #[test]
    fn reports_bad_cells_with_position() {
        let err = RawTable::from_delimited("a,b\n1,x\n", None).unwrap_err();
        match err {
            DatasetError::Parse { line, column, text } => {
                assert_eq!((line, column), (2, 2));
                assert_eq!(text, "x");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_push() {
        let table = RawTable::new().with_column("a", vec![1.0]).unwrap();
        assert!(table.with_column("a", vec![2.0]).is_err());
    }
}

use std::cmp::Ordering;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// A CSV table kept as text. Cells are never reformatted, so a table that is read and
/// written back unchanged produces the same bytes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ResultTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn read_csv(path: &Path) -> csv::Result<Self> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut table = Self::new(headers);
        for record in reader.records() {
            let record = record?;
            table.push_row(record.iter().map(str::to_string).collect());
        }
        Ok(table)
    }

    pub fn write_csv(&self, path: &Path) -> csv::Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Appends a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }

    fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.headers.len() - 1
    }

    /// Sets every cell of `name` to `value`, adding the column if needed.
    pub fn fill_column(&mut self, name: &str, value: &str) {
        let idx = self.ensure_column(name);
        for row in &mut self.rows {
            row[idx] = value.to_string();
        }
    }

    /// Writes `f(source cell)` into `target` for every row. Returns `false` when `source`
    /// does not exist.
    pub fn map_column(&mut self, source: &str, target: &str, f: impl Fn(&str) -> String) -> bool {
        let Some(src) = self.column_index(source) else {
            return false;
        };
        let dst = self.ensure_column(target);
        for row in &mut self.rows {
            row[dst] = f(&row[src]);
        }
        true
    }

    /// Stable numeric sort on `column`. Cells that do not parse as numbers go last in
    /// either direction. Returns `false` when the column does not exist.
    pub fn sort_numeric(&mut self, column: &str, direction: SortDirection) -> bool {
        let Some(idx) = self.column_index(column) else {
            return false;
        };
        self.rows.sort_by(|a, b| {
            let x = a[idx].trim().parse::<f64>().ok().filter(|v| !v.is_nan());
            let y = b[idx].trim().parse::<f64>().ok().filter(|v| !v.is_nan());
            match (x, y) {
                (Some(x), Some(y)) => {
                    let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
                    match direction {
                        SortDirection::Ascending => ord,
                        SortDirection::Descending => ord.reverse(),
                    }
                }
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        });
        true
    }

    /// Stacks tables in order. Columns are the union of all headers in first-seen order;
    /// cells missing from a table are left empty.
    pub fn concat(tables: Vec<ResultTable>) -> ResultTable {
        let mut headers: Vec<String> = Vec::new();
        for table in &tables {
            for h in &table.headers {
                if !headers.contains(h) {
                    headers.push(h.clone());
                }
            }
        }

        let mut out = ResultTable::new(headers);
        for table in tables {
            let mapping: Vec<usize> = table
                .headers
                .iter()
                .filter_map(|h| out.column_index(h))
                .collect();
            for row in table.rows {
                let mut merged = vec![String::new(); out.headers.len()];
                for (cell, &dst) in row.into_iter().zip(&mapping) {
                    merged[dst] = cell;
                }
                out.rows.push(merged);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn table(headers: &[&str], rows: &[&[&str]]) -> ResultTable {
        let mut t = ResultTable::new(headers.iter().map(|s| s.to_string()).collect());
        for r in rows {
            t.push_row(r.iter().map(|s| s.to_string()).collect());
        }
        t
    }

    #[test]
    fn numeric_sort_orders_descending_with_unparsable_last() {
        let mut t = table(&["iptm"], &[&["0.5"], &["n/a"], &["0.91"], &["10"]]);
        assert!(t.sort_numeric("iptm", SortDirection::Descending));
        assert_eq!(t.column("iptm").unwrap(), vec!["10", "0.91", "0.5", "n/a"]);
    }

    #[test]
    fn numeric_sort_is_stable_for_ties() {
        let mut t = table(&["Rank", "id"], &[&["2", "a"], &["1", "b"], &["2", "c"]]);
        t.sort_numeric("Rank", SortDirection::Ascending);
        assert_eq!(t.column("id").unwrap(), vec!["b", "a", "c"]);
    }

    #[test]
    fn sort_on_missing_column_is_reported() {
        let mut t = table(&["a"], &[&["1"]]);
        assert!(!t.sort_numeric("b", SortDirection::Ascending));
    }

    #[test]
    fn map_column_can_create_target() {
        let mut t = table(&["filename"], &[&["x.pdb"]]);
        assert!(t.map_column("filename", "Pdb Path", |v| format!("out/{v}")));
        assert_eq!(t.headers(), &["filename".to_string(), "Pdb Path".to_string()]);
        assert_eq!(t.column("Pdb Path").unwrap(), vec!["out/x.pdb"]);
        assert!(!t.map_column("absent", "Pdb Path", |v| v.to_string()));
    }

    #[test]
    fn concat_unions_headers() {
        let a = table(&["x", "name"], &[&["1", "a"]]);
        let b = table(&["name", "y"], &[&["b", "2"]]);
        let merged = ResultTable::concat(vec![a, b]);
        assert_eq!(merged.headers(), &["x", "name", "y"].map(String::from));
        assert_eq!(merged.rows()[0], vec!["1", "a", ""]);
        assert_eq!(merged.rows()[1], vec!["", "b", "2"]);
    }

    #[test]
    fn csv_round_trip_preserves_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metrics.csv");
        let content = "Rank,Pdb Path,plddt\n1,\"a,b.pdb\",91.50\n2,c.pdb,88\n";
        fs::write(&path, content).unwrap();

        let t = ResultTable::read_csv(&path).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.column("Pdb Path").unwrap(), vec!["a,b.pdb", "c.pdb"]);

        let out = dir.path().join("copy.csv");
        t.write_csv(&out).unwrap();
        assert_eq!(fs::read_to_string(out).unwrap(), content);
    }
}

/// Read-only tabular price data fetched from the spreadsheet store.
///
/// Tables are re-fetched per request; nothing here caches or invalidates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PriceTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl PriceTable {
    /// Build a table from raw sheet values, first row as headers. Fully
    /// empty rows and fully empty unnamed columns are dropped, the way the
    /// price list renders after trailing-cell padding.
    pub fn from_values(values: Vec<Vec<String>>) -> Self {
        let mut iter = values.into_iter();
        let Some(header) = iter.next() else {
            return Self::default();
        };

        let mut rows: Vec<Vec<String>> = iter
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .collect();

        // Pad ragged rows so column addressing stays positional.
        for row in &mut rows {
            row.resize(header.len(), String::new());
        }

        let keep: Vec<usize> = (0..header.len())
            .filter(|&index| {
                !header[index].trim().is_empty()
                    || rows.iter().any(|row| !row[index].trim().is_empty())
            })
            .collect();

        let columns = keep.iter().map(|&index| header[index].trim().to_owned()).collect();
        let rows = rows
            .into_iter()
            .map(|row| keep.iter().map(|&index| row[index].clone()).collect())
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn select(&self) -> Selection<'_> {
        Selection { table: self, indices: (0..self.rows.len()).collect() }
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    fn cell(&self, row: usize, column: usize) -> &str {
        self.rows[row].get(column).map(String::as_str).unwrap_or("")
    }
}

/// One row of a [`PriceTable`], addressed by column name.
#[derive(Clone, Copy, Debug)]
pub struct RowView<'a> {
    table: &'a PriceTable,
    row: usize,
}

impl<'a> RowView<'a> {
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let index = self.table.column_index(column)?;
        Some(self.table.cell(self.row, index).trim())
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        parse_number(self.get(column)?)
    }
}

/// A filtered view over table rows. Methods narrow the selection; the
/// original ordering of the sheet is preserved throughout.
#[derive(Clone, Debug)]
pub struct Selection<'a> {
    table: &'a PriceTable,
    indices: Vec<usize>,
}

impl<'a> Selection<'a> {
    pub fn eq(mut self, column: &str, value: &str) -> Self {
        let Some(index) = self.table.column_index(column) else {
            self.indices.clear();
            return self;
        };
        self.indices.retain(|&row| self.table.cell(row, index).trim() == value.trim());
        self
    }

    /// Keep rows whose numeric `column` is at least `threshold`, then
    /// restrict to the rows at the minimum satisfying value. This is the
    /// common "smallest tier that covers the request" lookup.
    pub fn at_least(mut self, column: &str, threshold: f64) -> Self {
        let Some(index) = self.table.column_index(column) else {
            self.indices.clear();
            return self;
        };

        let mut satisfying: Vec<(usize, f64)> = self
            .indices
            .iter()
            .filter_map(|&row| {
                let value = parse_number(self.table.cell(row, index))?;
                (value >= threshold).then_some((row, value))
            })
            .collect();

        let minimum = satisfying.iter().map(|&(_, value)| value).fold(f64::INFINITY, f64::min);
        satisfying.retain(|&(_, value)| value == minimum);
        self.indices = satisfying.into_iter().map(|(row, _)| row).collect();
        self
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = RowView<'a>> + '_ {
        let table = self.table;
        self.indices.iter().map(move |&row| RowView { table, row })
    }

    pub fn values(&self, column: &str) -> Vec<&'a str> {
        self.rows().filter_map(|row| row.get(column)).collect()
    }

    pub fn first(&self) -> Option<RowView<'a>> {
        self.indices.first().map(|&row| RowView { table: self.table, row })
    }

    pub fn min_by_number(&self, column: &str) -> Option<RowView<'a>> {
        self.extremum_by_number(column, |candidate, best| candidate < best)
    }

    pub fn max_by_number(&self, column: &str) -> Option<RowView<'a>> {
        self.extremum_by_number(column, |candidate, best| candidate > best)
    }

    fn extremum_by_number(
        &self,
        column: &str,
        better: impl Fn(f64, f64) -> bool,
    ) -> Option<RowView<'a>> {
        let mut best: Option<(RowView<'a>, f64)> = None;
        for row in self.rows() {
            let Some(value) = row.number(column) else { continue };
            match &best {
                Some((_, current)) if !better(value, *current) => {}
                _ => best = Some((row, value)),
            }
        }
        best.map(|(row, _)| row)
    }
}

fn parse_number(cell: &str) -> Option<f64> {
    let cleaned = cell.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

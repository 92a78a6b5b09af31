use serde::Serialize;

/// A single spreadsheet cell as handed over by the readers.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    /// Blank cell or missing trailing value.
    #[default]
    Empty,
    /// Plain text.
    Text(String),
    /// Numeric cell; integers are stored as floats as spreadsheets do.
    Number(f64),
    /// Boolean cell.
    Bool(bool),
}

impl CellValue {
    /// Builds a text cell, mapping blank strings to [`CellValue::Empty`].
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Renders the cell the way a spreadsheet user reads it. Integral numbers
    /// carry no fractional part, so `11999990000.0` renders as `11999990000`.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(value) => value.clone(),
            CellValue::Number(value) => value.to_string(),
            CellValue::Bool(value) => value.to_string(),
        }
    }

    /// Reads the cell as an outcome flag value.
    ///
    /// Numbers pass through and boolean cells become 1/0. Text is only ever
    /// parsed as a number (a comma is accepted as decimal separator), so
    /// `"TRUE"` typed into a text cell is `None`, as are blanks and NaN.
    pub fn as_flag(&self) -> Option<f64> {
        let value = match self {
            CellValue::Empty => return None,
            CellValue::Number(value) => *value,
            CellValue::Bool(value) => f64::from(u8::from(*value)),
            CellValue::Text(text) => text.trim().replace(',', ".").parse::<f64>().ok()?,
        };
        if value.is_nan() { None } else { Some(value) }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::text(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<usize> for CellValue {
    fn from(value: usize) -> Self {
        CellValue::Number(value as f64)
    }
}

/// A header row plus data rows. Every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Creates an empty table with the given header.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(row);
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first column named exactly `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Position of the first column matching any of the candidates, tried in
    /// the order given.
    pub fn find_column(&self, candidates: &[&str]) -> Option<usize> {
        candidates
            .iter()
            .find_map(|candidate| self.column_index(candidate))
    }

    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&EMPTY)
    }

    /// Trims and lower-cases every column name.
    pub fn normalize_headers(&mut self) {
        for column in &mut self.columns {
            *column = column.trim().to_lowercase();
        }
    }
}

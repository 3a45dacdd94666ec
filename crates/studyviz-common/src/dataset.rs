//! Study metadata table and the spreadsheet/CSV loader that produces it

use crate::{Result, StudyVizError};
use calamine::{open_workbook_auto, Data, Reader};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Well-known column headers of the study metadata sheet
pub mod columns {
    pub const STUDY_TYPE: &str = "Study type";
    pub const PSYCHEDELIC: &str = "Psychedelic";
    pub const YEAR: &str = "Year";
}

/// A single cell of the input table
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Cell {
    /// Empty cells and blank strings carry no value
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Value of the cell as a category label, `None` when missing
    pub fn as_category(&self) -> Option<String> {
        if self.is_missing() {
            return None;
        }
        match self {
            Cell::Text(s) => Some(s.trim().to_string()),
            other => Some(other.to_string()),
        }
    }

    /// Value of the cell as a calendar year, `Ok(None)` when missing
    pub fn as_year(&self) -> std::result::Result<Option<i32>, String> {
        if self.is_missing() {
            return Ok(None);
        }
        match self {
            Cell::Int(i) => i32::try_from(*i)
                .map(Some)
                .map_err(|_| format!("year {} is out of range", i)),
            Cell::Float(f) => integral_year(*f).map(Some),
            Cell::Text(s) => {
                let s = s.trim();
                if let Ok(year) = s.parse::<i32>() {
                    return Ok(Some(year));
                }
                match s.parse::<f64>() {
                    Ok(f) => integral_year(f).map(Some),
                    Err(_) => Err(format!("expected an integer year, found '{}'", s)),
                }
            }
            other => Err(format!("expected an integer year, found '{}'", other)),
        }
    }

    /// Interpret a raw CSV field
    pub fn from_csv_field(field: &str) -> Self {
        let trimmed = field.trim();
        if trimmed.is_empty() {
            Cell::Empty
        } else if let Ok(i) = trimmed.parse::<i64>() {
            Cell::Int(i)
        } else if let Ok(f) = trimmed.parse::<f64>() {
            Cell::Float(f)
        } else {
            Cell::Text(field.to_string())
        }
    }
}

fn integral_year(value: f64) -> std::result::Result<i32, String> {
    if value.is_finite()
        && value.fract() == 0.0
        && value >= i32::MIN as f64
        && value <= i32::MAX as f64
    {
        Ok(value as i32)
    } else {
        Err(format!("expected an integer year, found '{}'", value))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Int(i) => write!(f, "{}", i),
            Cell::Float(v) => write!(f, "{}", v),
            Cell::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<i32> for Cell {
    fn from(value: i32) -> Self {
        Cell::Int(value as i64)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

impl From<&Data> for Cell {
    fn from(value: &Data) -> Self {
        match value {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Int(i) => Cell::Int(*i),
            Data::Float(f) => Cell::Float(*f),
            Data::Bool(b) => Cell::Bool(*b),
            other => Cell::Text(other.to_string()),
        }
    }
}

/// One complete row of the study metadata table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyRecord {
    pub study_type: String,
    pub psychedelic: String,
    pub year: i32,
}

/// The loaded input table: a header plus rows of cells, read-only after loading
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Dataset {
    /// Build a dataset, padding short rows with empty cells and dropping
    /// cells beyond the header width
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// A dataset with no columns and no rows
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by its (trimmed) header text
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.trim() == name)
            .ok_or_else(|| StudyVizError::missing_column(name, &self.columns))
    }

    /// Cells of one column, in row order
    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &Cell> + '_> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    /// A categorical column, `None` where the cell is missing
    pub fn category_column(&self, name: &str) -> Result<Vec<Option<String>>> {
        Ok(self.column(name)?.map(Cell::as_category).collect())
    }

    /// An integer year column, `None` where the cell is missing.
    ///
    /// Row numbers in errors count the header as row 1.
    pub fn year_column(&self, name: &str) -> Result<Vec<Option<i32>>> {
        self.column(name)?
            .enumerate()
            .map(|(i, cell)| {
                cell.as_year()
                    .map_err(|msg| StudyVizError::invalid_value(name, i + 2, msg))
            })
            .collect()
    }

    /// Rows where study type, psychedelic and year are all present
    pub fn records(&self) -> Result<Vec<StudyRecord>> {
        let study_types = self.category_column(columns::STUDY_TYPE)?;
        let psychedelics = self.category_column(columns::PSYCHEDELIC)?;
        let years = self.year_column(columns::YEAR)?;

        Ok(study_types
            .into_iter()
            .zip(psychedelics)
            .zip(years)
            .filter_map(|((study_type, psychedelic), year)| {
                Some(StudyRecord {
                    study_type: study_type?,
                    psychedelic: psychedelic?,
                    year: year?,
                })
            })
            .collect())
    }
}

/// Supported input table formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Spreadsheet,
    Csv,
}

impl InputFormat {
    /// Detect the format from the file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "xla" | "ods" => Some(Self::Spreadsheet),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// Loads the study metadata table from disk
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    path: PathBuf,
    sheet: Option<String>,
}

impl DatasetLoader {
    /// Create a loader for the given file, reading the first sheet
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sheet: None,
        }
    }

    /// Read the named sheet instead of the first one
    pub fn with_sheet(mut self, sheet: Option<String>) -> Self {
        self.sheet = sheet;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the table. Every failure is reported as a `DataLoad` error.
    pub fn load(&self) -> Result<Dataset> {
        let format = InputFormat::from_path(&self.path).ok_or_else(|| {
            StudyVizError::data_load(&self.path, "unsupported input format")
        })?;

        debug!(path = %self.path.display(), ?format, "Loading input table");
        let dataset = match format {
            InputFormat::Spreadsheet => self.load_spreadsheet()?,
            InputFormat::Csv => self.load_csv()?,
        };

        info!(
            path = %self.path.display(),
            rows = dataset.len(),
            columns = dataset.columns().len(),
            "Loaded input table"
        );
        Ok(dataset)
    }

    fn load_spreadsheet(&self) -> Result<Dataset> {
        let mut workbook = open_workbook_auto(&self.path).map_err(|e| {
            StudyVizError::data_load_with_source(&self.path, "failed to open workbook", e)
        })?;

        let range = match &self.sheet {
            Some(name) => workbook.worksheet_range(name).map_err(|e| {
                StudyVizError::data_load_with_source(
                    &self.path,
                    format!("failed to read sheet '{}'", name),
                    e,
                )
            })?,
            None => workbook
                .worksheet_range_at(0)
                .ok_or_else(|| StudyVizError::data_load(&self.path, "workbook has no sheets"))?
                .map_err(|e| {
                    StudyVizError::data_load_with_source(&self.path, "failed to read first sheet", e)
                })?,
        };

        let mut rows = range.rows();
        let header = rows
            .next()
            .ok_or_else(|| StudyVizError::data_load(&self.path, "no header row"))?;
        let columns = header
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();
        let rows = rows
            .map(|row| row.iter().map(Cell::from).collect())
            .collect();

        Ok(Dataset::new(columns, rows))
    }

    fn load_csv(&self) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| StudyVizError::data_load_with_source(&self.path, "failed to open CSV", e))?;

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| {
                StudyVizError::data_load_with_source(&self.path, "failed to read CSV header", e)
            })?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if columns.iter().all(|c| c.is_empty()) {
            return Err(StudyVizError::data_load(&self.path, "no header row"));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| {
                StudyVizError::data_load_with_source(&self.path, "malformed CSV record", e)
            })?;
            rows.push(record.iter().map(Cell::from_csv_field).collect());
        }

        Ok(Dataset::new(columns, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample() -> Dataset {
        Dataset::new(
            vec!["Study type".into(), "Psychedelic".into(), "Year".into()],
            vec![
                vec!["Trial".into(), "Psilocybin".into(), Cell::Float(2001.0)],
                vec!["Case report".into(), Cell::Empty, Cell::Int(2005)],
                vec!["Trial".into(), "LSD".into(), "2001".into()],
            ],
        )
    }

    fn csv_file(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file
    }

    #[test]
    fn test_cell_missing() {
        assert!(Cell::Empty.is_missing());
        assert!(Cell::from("   ").is_missing());
        assert!(Cell::Float(f64::NAN).is_missing());
        assert!(!Cell::from("LSD").is_missing());
        assert!(!Cell::Int(0).is_missing());
    }

    #[test]
    fn test_cell_as_category() {
        assert_eq!(Cell::from("  Trial ").as_category(), Some("Trial".to_string()));
        assert_eq!(Cell::Float(3.0).as_category(), Some("3".to_string()));
        assert_eq!(Cell::Int(7).as_category(), Some("7".to_string()));
        assert_eq!(Cell::Empty.as_category(), None);
    }

    #[test]
    fn test_cell_as_year() {
        assert_eq!(Cell::Int(2001).as_year(), Ok(Some(2001)));
        assert_eq!(Cell::Float(2005.0).as_year(), Ok(Some(2005)));
        assert_eq!(Cell::from(" 1999 ").as_year(), Ok(Some(1999)));
        assert_eq!(Cell::from("2010.0").as_year(), Ok(Some(2010)));
        assert_eq!(Cell::Empty.as_year(), Ok(None));

        assert!(Cell::Float(2001.5).as_year().is_err());
        assert!(Cell::from("unknown").as_year().is_err());
        assert!(Cell::Bool(true).as_year().is_err());
        assert!(Cell::Int(i64::MAX).as_year().is_err());
    }

    #[test]
    fn test_cell_from_csv_field() {
        assert_eq!(Cell::from_csv_field(""), Cell::Empty);
        assert_eq!(Cell::from_csv_field("2001"), Cell::Int(2001));
        assert_eq!(Cell::from_csv_field("2.5"), Cell::Float(2.5));
        assert_eq!(Cell::from_csv_field("LSD"), Cell::from("LSD"));
    }

    #[test]
    fn test_dataset_pads_short_rows() {
        let dataset = Dataset::new(
            vec!["A".into(), "B".into()],
            vec![vec!["x".into()], vec!["y".into(), "z".into(), "extra".into()]],
        );
        assert_eq!(dataset.rows()[0], vec![Cell::from("x"), Cell::Empty]);
        assert_eq!(dataset.rows()[1], vec![Cell::from("y"), Cell::from("z")]);
    }

    #[test]
    fn test_category_column() {
        let dataset = sample();
        let psychedelics = dataset.category_column("Psychedelic").unwrap();
        assert_eq!(
            psychedelics,
            vec![Some("Psilocybin".to_string()), None, Some("LSD".to_string())]
        );
    }

    #[test]
    fn test_year_column_coerces_values() {
        let dataset = sample();
        assert_eq!(
            dataset.year_column("Year").unwrap(),
            vec![Some(2001), Some(2005), Some(2001)]
        );
    }

    #[test]
    fn test_year_column_reports_row() {
        let dataset = Dataset::new(
            vec!["Year".into()],
            vec![vec![Cell::Int(2001)], vec!["soon".into()]],
        );
        match dataset.year_column("Year").unwrap_err() {
            StudyVizError::InvalidValue { column, row, .. } => {
                assert_eq!(column, "Year");
                assert_eq!(row, 3);
            }
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_column() {
        let dataset = sample();
        let err = dataset.category_column("Outcome").unwrap_err();
        assert!(matches!(err, StudyVizError::MissingColumn { ref column, .. } if column == "Outcome"));
    }

    #[test]
    fn test_records_skip_incomplete_rows() {
        let records = sample().records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            StudyRecord {
                study_type: "Trial".into(),
                psychedelic: "Psilocybin".into(),
                year: 2001,
            }
        );
        assert_eq!(records[1].psychedelic, "LSD");
    }

    #[test]
    fn test_input_format_detection() {
        assert_eq!(InputFormat::from_path(Path::new("a.xlsx")), Some(InputFormat::Spreadsheet));
        assert_eq!(InputFormat::from_path(Path::new("a.XLS")), Some(InputFormat::Spreadsheet));
        assert_eq!(InputFormat::from_path(Path::new("a.ods")), Some(InputFormat::Spreadsheet));
        assert_eq!(InputFormat::from_path(Path::new("a.csv")), Some(InputFormat::Csv));
        assert_eq!(InputFormat::from_path(Path::new("a.txt")), None);
        assert_eq!(InputFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_load_csv() {
        let file = csv_file("Study type,Psychedelic,Year\nTrial,LSD,2001\nCase report,Psilocybin\n");
        let dataset = DatasetLoader::new(file.path()).load().unwrap();

        assert_eq!(dataset.columns(), ["Study type", "Psychedelic", "Year"]);
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.rows()[1][2], Cell::Empty);
    }

    #[test]
    fn test_load_missing_file() {
        let err = DatasetLoader::new("/nonexistent/Key_results_output_1.2.xlsx")
            .load()
            .unwrap_err();
        assert!(err.is_data_load());
    }

    #[test]
    fn test_load_unsupported_format() {
        let err = DatasetLoader::new("notes.txt").load().unwrap_err();
        assert!(err.is_data_load());
        assert!(err.to_string().contains("unsupported input format"));
    }

    #[test]
    fn test_load_malformed_workbook() {
        let mut file = tempfile::Builder::new()
            .suffix(".xlsx")
            .tempfile()
            .unwrap();
        file.write_all(b"this is not a zip archive").unwrap();

        let err = DatasetLoader::new(file.path()).load().unwrap_err();
        assert!(err.is_data_load());
    }
}

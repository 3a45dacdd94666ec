//! Test utilities and shared fixtures for the studyviz workspace.
//!
//! Compiled for this crate's own tests and, through the `testing` feature,
//! for the tests of the other crates.

use crate::dataset::{columns, Cell, Dataset};

/// Dataset fixtures shaped like the study metadata sheet
pub mod study_fixtures {
    use super::*;

    /// Build a dataset with the three chart columns from (study type, psychedelic, year) rows
    pub fn study_dataset(rows: &[(&str, &str, i32)]) -> Dataset {
        Dataset::new(
            vec![
                "Author".to_string(),
                columns::STUDY_TYPE.to_string(),
                columns::PSYCHEDELIC.to_string(),
                columns::YEAR.to_string(),
            ],
            rows.iter()
                .enumerate()
                .map(|(i, (study_type, psychedelic, year))| {
                    vec![
                        Cell::Text(format!("Author {}", i + 1)),
                        Cell::from(*study_type),
                        Cell::from(*psychedelic),
                        Cell::Float(*year as f64),
                    ]
                })
                .collect(),
        )
    }

    /// A small but realistic sample of the study sheet
    pub fn sample_study_dataset() -> Dataset {
        study_dataset(&[
            ("Case report", "Psilocybin", 2015),
            ("Case series", "LSD", 2018),
            ("Case report", "Psilocybin", 2019),
            ("Survey", "Psilocybin", 2019),
            ("Case report", "Ayahuasca", 2020),
            ("Clinical trial", "MDMA", 2021),
            ("Case report", "LSD", 2021),
            ("Survey", "Ketamine", 2022),
        ])
    }

    /// Render a dataset as CSV text (header first)
    pub fn to_csv(dataset: &Dataset) -> String {
        let mut out = dataset.columns().join(",");
        out.push('\n');
        for row in dataset.rows() {
            let line: Vec<String> = row.iter().map(Cell::to_string).collect();
            out.push_str(&line.join(","));
            out.push('\n');
        }
        out
    }
}

// BSD 3-Clause License
//
// Copyright (c) 2025, BlackPortal ○
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this
//    list of conditions and the following disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice,
//    this list of conditions and the following disclaimer in the documentation
//    and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its
//    contributors may be used to endorse or promote products derived from
//    this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
// FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
// DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
// CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
// OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use log::debug;
use ndarray::{Array1, Array2};

use super::{DataLoader, Dataset};
use crate::errors::CsvError;

/// Loads a CSV file without a header row. The last column is the target.
pub struct CsvLoader;

/// Loads a CSV file whose first row holds column names. The last column is the target.
pub struct CsvHeadersLoader;

/// Maps the distinct strings of one column to 0, 1, 2, ... in first-seen order.
/// Blank cells share one code of their own.
#[derive(Default)]
struct LabelEncoder {
    codes: HashMap<Option<String>, f64>,
}

impl LabelEncoder {
    fn encode(&mut self, value: &str) -> f64 {
        let key = if value.is_empty() { None } else { Some(value.to_string()) };
        let next_id = self.codes.len() as f64;
        *self.codes.entry(key).or_insert(next_id)
    }
}

fn is_numeric_column(rows: &[Vec<String>], col: usize) -> bool {
    rows.iter().all(|row| row[col].is_empty() || row[col].parse::<f64>().is_ok())
}

fn parse_numeric(value: &str, row: usize) -> Result<f64, CsvError> {
    if value.is_empty() {
        return Ok(0.0);
    }
    value.parse::<f64>().map_err(|e| CsvError::InvalidNumeric {
        value: value.to_string(),
        row,
        source: e,
    })
}

fn load_csv_common<P: AsRef<Path>>(path: P, has_headers: bool) -> Result<Dataset, CsvError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut rdr =
        csv::ReaderBuilder::new().has_headers(has_headers).flexible(true).from_reader(file);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let row: Vec<String> = record.iter().map(|s| s.trim().to_string()).collect();
        if let Some(first) = rows.first() {
            if row.len() != first.len() {
                return Err(CsvError::InconsistentColumns {
                    row: i + 1,
                    actual: row.len(),
                    expected: first.len(),
                });
            }
        }
        rows.push(row);
    }

    let n_rows = rows.len();
    let n_cols = rows.first().map(Vec::len).ok_or(CsvError::EmptyFile)?;
    if n_cols < 2 {
        return Err(CsvError::InsufficientColumns);
    }

    // Non-numeric columns, target included, are label encoded
    let numeric: Vec<bool> = (0..n_cols).map(|col| is_numeric_column(&rows, col)).collect();
    let mut encoders: Vec<LabelEncoder> = (0..n_cols).map(|_| LabelEncoder::default()).collect();

    let mut feature_data: Vec<f64> = Vec::with_capacity(n_rows * (n_cols - 1));
    let mut target_data: Vec<f64> = Vec::with_capacity(n_rows);
    for (i, row) in rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            let encoded = if numeric[col] {
                parse_numeric(value, i + 1)?
            } else {
                encoders[col].encode(value)
            };
            if col == n_cols - 1 {
                target_data.push(encoded);
            } else {
                feature_data.push(encoded);
            }
        }
    }

    debug!(
        "Loaded {} rows with {} features from {:?} ({} encoded columns)",
        n_rows,
        n_cols - 1,
        path,
        numeric.iter().filter(|&&n| !n).count()
    );

    let features = Array2::from_shape_vec((n_rows, n_cols - 1), feature_data)?;
    let targets = Array1::from_vec(target_data);

    Ok(Dataset { features, targets })
}

impl DataLoader for CsvLoader {
    type Error = CsvError;

    fn load<P: AsRef<Path>>(path: P) -> Result<Dataset, Self::Error> {
        load_csv_common(path, false)
    }
}

impl DataLoader for CsvHeadersLoader {
    type Error = CsvError;

    fn load<P: AsRef<Path>>(path: P) -> Result<Dataset, Self::Error> {
        load_csv_common(path, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::load_data;
    use ndarray::array;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes()).expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_load_numeric_no_headers() {
        let temp_file = create_temp_csv("1.0,2.0\n3.0,4.0\n5.0,6.0\n");

        let data = load_data::<CsvLoader, _>(temp_file.path()).expect("Failed to load CSV");

        assert_eq!(data.features(), &array![[1.0], [3.0], [5.0]], "Features do not match");
        assert_eq!(data.targets(), &array![2.0, 4.0, 6.0], "Targets do not match");
    }

    #[test]
    fn test_load_iris_style_string_labels() {
        let csv_content = "sepal_length,sepal_width,species\n\
                           5.1,3.5,setosa\n\
                           7.0,3.2,versicolor\n\
                           6.3,3.3,virginica\n\
                           4.9,3.0,setosa\n";
        let temp_file = create_temp_csv(csv_content);

        let data = load_data::<CsvHeadersLoader, _>(temp_file.path()).expect("Failed to load CSV");

        assert_eq!(data.n_samples(), 4);
        assert_eq!(data.n_features(), 2);
        assert_eq!(data.targets(), &array![0.0, 1.0, 2.0, 0.0], "Targets do not match");
    }

    #[test]
    fn test_load_categorical_feature_with_missing_value() {
        let temp_file = create_temp_csv("1.0,male,0\n2.0,,1\n3.0,female,0\n");

        let data = load_data::<CsvLoader, _>(temp_file.path()).expect("Failed to load CSV");

        assert_eq!(data.features(), &array![[1.0, 0.0], [2.0, 1.0], [3.0, 2.0]]);
        assert_eq!(data.targets(), &array![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_blank_cells_do_not_collide_with_literal_missing() {
        let temp_file = create_temp_csv("1.0,missing,0\n2.0,,1\n3.0,missing,0\n4.0,,1\n");

        let data = load_data::<CsvLoader, _>(temp_file.path()).expect("Failed to load CSV");

        assert_eq!(data.features(), &array![[1.0, 0.0], [2.0, 1.0], [3.0, 0.0], [4.0, 1.0]]);
    }

    #[test]
    fn test_load_missing_numeric_value() {
        let temp_file = create_temp_csv("1.0,,0\n2.0,4.0,1\n");

        let data = load_data::<CsvLoader, _>(temp_file.path()).expect("Failed to load CSV");

        assert_eq!(data.features(), &array![[1.0, 0.0], [2.0, 4.0]]);
    }

    #[test]
    fn test_load_empty_file() {
        let temp_file = create_temp_csv("");

        let result = load_data::<CsvLoader, _>(temp_file.path());
        assert!(matches!(result, Err(CsvError::EmptyFile)));
    }

    #[test]
    fn test_load_single_column() {
        let temp_file = create_temp_csv("1.0\n2.0\n3.0\n");

        let result = load_data::<CsvLoader, _>(temp_file.path());
        assert!(matches!(result, Err(CsvError::InsufficientColumns)));
    }

    #[test]
    fn test_load_inconsistent_columns() {
        let temp_file = create_temp_csv("1.0,male,0\n2.0,female,1,extra\n");

        let result = load_data::<CsvLoader, _>(temp_file.path());
        assert!(
            matches!(result, Err(CsvError::InconsistentColumns { row, actual, expected }) if row == 2 && actual == 4 && expected == 3)
        );
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = load_data::<CsvLoader, _>("nonexistent.csv");
        assert!(matches!(result, Err(CsvError::FileOpen(_))));
    }
}

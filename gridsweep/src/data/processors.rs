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

use std::fs;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use log::{debug, error, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use reqwest::blocking::get;

use crate::errors::{CsvError, DataError, SplitError};

/// Where a raw CSV dataset comes from.
#[derive(Debug, Clone)]
pub enum DatasetSource {
    Url(String),
    Path(PathBuf),
}

/// Configuration for turning one raw CSV dataset into train/test files.
#[derive(Debug, Clone)]
pub struct CsvDatasetConfig {
    source: DatasetSource,
    has_headers: bool,
    train_ratio: f64,
    seed: u64,
    output_dir: PathBuf,
}

impl CsvDatasetConfig {
    pub fn new(source: DatasetSource) -> Self {
        CsvDatasetConfig {
            source,
            has_headers: false,
            train_ratio: 0.7,
            seed: 42,
            output_dir: PathBuf::from("."),
        }
    }

    pub fn from_url(url: &str) -> Self {
        Self::new(DatasetSource::Url(url.to_string()))
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(DatasetSource::Path(path.into()))
    }

    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    pub fn with_train_ratio(mut self, ratio: f64) -> Self {
        self.train_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    pub fn train_path(&self) -> PathBuf {
        self.output_dir.join("train_data.csv")
    }

    pub fn test_path(&self) -> PathBuf {
        self.output_dir.join("test_data.csv")
    }
}

fn read_source(source: &DatasetSource) -> Result<String, DataError> {
    match source {
        DatasetSource::Url(url) => {
            debug!("Downloading data from {}", url);
            let response = get(url)?.error_for_status()?;
            Ok(response.text()?)
        }
        DatasetSource::Path(path) => {
            debug!("Reading data from {:?}", path);
            Ok(fs::read_to_string(path)?)
        }
    }
}

fn write_rows(
    path: &Path,
    header: Option<&StringRecord>,
    rows: &[StringRecord],
) -> Result<(), DataError> {
    let mut writer = WriterBuilder::new().from_path(path).map_err(CsvError::from)?;
    if let Some(header) = header {
        writer.write_record(header).map_err(CsvError::from)?;
    }
    for row in rows {
        writer.write_record(row).map_err(CsvError::from)?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads a CSV dataset, shuffles it with the configured seed and writes
/// `train_data.csv` and `test_data.csv` into the output directory.
///
/// Returns the number of rows written to each file as `(train, test)`. The
/// header row, when present, is copied into both files.
pub fn prepare_split_files(config: &CsvDatasetConfig) -> Result<(usize, usize), DataError> {
    info!("Preparing train/test files with config: {:?}", config);

    fs::create_dir_all(&config.output_dir)?;
    let text = read_source(&config.source)?;

    let mut rdr = ReaderBuilder::new().has_headers(config.has_headers).from_reader(text.as_bytes());
    let header = if config.has_headers {
        Some(rdr.headers().map_err(CsvError::from)?.clone())
    } else {
        None
    };

    let mut rows: Vec<StringRecord> = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        match result {
            Ok(record) => rows.push(record),
            Err(e) => {
                error!("Failed to read CSV record at row {}: {:?}", i, e);
                return Err(CsvError::from(e).into());
            }
        }
    }
    if rows.is_empty() {
        return Err(CsvError::EmptyFile.into());
    }
    debug!("Parsed {} rows", rows.len());

    let mut rng = StdRng::seed_from_u64(config.seed);
    rows.shuffle(&mut rng);
    let total_rows = rows.len();
    let train_size = (total_rows as f64 * config.train_ratio).round() as usize;
    if train_size == 0 || train_size == total_rows {
        return Err(SplitError::InsufficientSamples { required: 2, actual: total_rows }.into());
    }
    let (train_rows, test_rows) = rows.split_at(train_size);
    debug!("Split data: train_size={}, test_size={}", train_size, test_rows.len());

    write_rows(&config.train_path(), header.as_ref(), train_rows)?;
    write_rows(&config.test_path(), header.as_ref(), test_rows)?;

    info!("Wrote {:?} and {:?}", config.train_path(), config.test_path());
    Ok((train_size, total_rows - train_size))
}

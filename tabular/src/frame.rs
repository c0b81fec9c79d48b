use std::collections::HashSet;
use std::fmt::Write as _;

use ndarray::Array2;

use crate::error::{Result, TabularError};

/// A single column of cells, either numeric (with explicit missing
/// markers) or text.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<Option<f64>>),
    Text(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Numeric(_))
    }

    fn retain_rows(&mut self, keep: &[bool]) {
        match self {
            Column::Numeric(v) => {
                let mut it = keep.iter();
                v.retain(|_| *it.next().unwrap());
            }
            Column::Text(v) => {
                let mut it = keep.iter();
                v.retain(|_| *it.next().unwrap());
            }
        }
    }
}

/// A column-major table with named, type-tagged columns.
///
/// Invariant: every column has the same length, and column names are
/// unique. Rows are addressed by their contiguous index.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    names: Vec<String>,
    cols: Vec<Column>,
}

impl Frame {
    /// Builds a frame from parallel name and column vectors.
    ///
    /// # Panics
    /// - if `names` and `cols` differ in length
    /// - if any two columns differ in length
    /// - if a column name repeats
    pub fn new(names: Vec<String>, cols: Vec<Column>) -> Self {
        assert_eq!(names.len(), cols.len(), "one name per column");
        if let Some(first) = cols.first() {
            let h = first.len();
            assert!(
                cols.iter().all(|c| c.len() == h),
                "all columns must have the same length"
            );
        }
        let unique: HashSet<&str> = names.iter().map(String::as_str).collect();
        assert_eq!(unique.len(), names.len(), "column names must be unique");
        Self { names, cols }
    }

    pub fn height(&self) -> usize {
        self.cols.first().map_or(0, Column::len)
    }

    pub fn width(&self) -> usize {
        self.cols.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        let idx = self.position(name)?;
        Some(&self.cols[idx])
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub(crate) fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        let idx = self.position(name)?;
        Some(&mut self.cols[idx])
    }

    /// Names of all text columns, in frame order.
    pub fn text_columns(&self) -> Vec<String> {
        self.names
            .iter()
            .zip(&self.cols)
            .filter(|(_, c)| !c.is_numeric())
            .map(|(n, _)| n.clone())
            .collect()
    }

    /// Removes the named column.
    pub fn drop_column(&mut self, name: &str) -> Result<Column> {
        let idx = self.position(name).ok_or_else(|| TabularError::MissingColumn {
            name: name.to_string(),
        })?;
        self.names.remove(idx);
        Ok(self.cols.remove(idx))
    }

    /// Drops every row whose value in `name` is missing. Returns the
    /// number of rows removed.
    pub fn drop_rows_missing(&mut self, name: &str) -> Result<usize> {
        let keep: Vec<bool> = match self.column(name) {
            Some(Column::Numeric(v)) => v.iter().map(Option::is_some).collect(),
            Some(Column::Text(v)) => v.iter().map(|s| !s.is_empty()).collect(),
            None => {
                return Err(TabularError::MissingColumn {
                    name: name.to_string(),
                });
            }
        };
        let before = self.height();
        self.retain_rows(&keep);
        Ok(before - self.height())
    }

    /// Drops exact-duplicate rows, keeping the first occurrence.
    /// Returns the number of rows removed.
    pub fn dedup_rows(&mut self) -> usize {
        let mut seen = HashSet::with_capacity(self.height());
        let keep: Vec<bool> = (0..self.height())
            .map(|row| seen.insert(self.row_key(row)))
            .collect();
        let before = self.height();
        self.retain_rows(&keep);
        before - self.height()
    }

    /// Fills remaining missing numeric cells with the per-column median.
    /// Returns the number of cells filled. Columns with no observed
    /// values are left untouched.
    pub fn fill_missing_with_median(&mut self) -> usize {
        let mut filled = 0;
        for col in &mut self.cols {
            let Column::Numeric(values) = col else {
                continue;
            };
            let mut observed: Vec<f64> = values.iter().filter_map(|v| *v).collect();
            if observed.is_empty() || observed.len() == values.len() {
                continue;
            }
            observed.sort_by(|a, b| a.total_cmp(b));
            let mid = observed.len() / 2;
            let median = if observed.len() % 2 == 1 {
                observed[mid]
            } else {
                (observed[mid - 1] + observed[mid]) / 2.0
            };
            for v in values.iter_mut().filter(|v| v.is_none()) {
                *v = Some(median);
                filled += 1;
            }
        }
        filled
    }

    /// Splits off the target column, returning the remaining feature
    /// frame and the target as a dense vector.
    ///
    /// # Errors
    /// Fails if the target column is absent, not numeric, or still
    /// contains missing values.
    pub fn split_target(mut self, target: &str) -> Result<(Frame, Vec<f64>)> {
        let col = self.drop_column(target)?;
        let Column::Numeric(values) = col else {
            return Err(TabularError::NotNumeric {
                column: target.to_string(),
            });
        };
        let mut y = Vec::with_capacity(values.len());
        for (row, v) in values.iter().enumerate() {
            match v {
                Some(v) => y.push(*v),
                None => {
                    return Err(TabularError::MissingValue {
                        column: target.to_string(),
                        row,
                    });
                }
            }
        }
        Ok((self, y))
    }

    /// Exports the frame as a dense row-major matrix. Every column must
    /// be numeric and fully observed.
    pub fn to_matrix(&self) -> Result<Array2<f64>> {
        if self.height() == 0 {
            return Err(TabularError::EmptyFrame);
        }
        let (h, w) = (self.height(), self.width());
        let mut data = Vec::with_capacity(h * w);
        for row in 0..h {
            for (name, col) in self.names.iter().zip(&self.cols) {
                match col {
                    Column::Numeric(v) => match v[row] {
                        Some(x) => data.push(x),
                        None => {
                            return Err(TabularError::MissingValue {
                                column: name.clone(),
                                row,
                            });
                        }
                    },
                    Column::Text(_) => {
                        return Err(TabularError::NotNumeric {
                            column: name.clone(),
                        });
                    }
                }
            }
        }
        Ok(Array2::from_shape_vec((h, w), data).expect("shape matches construction"))
    }

    /// Stacks frames row-wise. All frames must share the same column
    /// names, order, and column types.
    pub fn concat(frames: Vec<Frame>) -> Result<Frame> {
        let mut iter = frames.into_iter();
        let mut base = iter.next().ok_or(TabularError::EmptyFrame)?;
        for frame in iter {
            if frame.names != base.names {
                return Err(TabularError::SchemaMismatch {
                    expected: base.names.clone(),
                    got: frame.names.clone(),
                });
            }
            for (dst, src) in base.cols.iter_mut().zip(frame.cols) {
                match (dst, src) {
                    (Column::Numeric(d), Column::Numeric(s)) => d.extend(s),
                    (Column::Text(d), Column::Text(s)) => d.extend(s),
                    _ => {
                        return Err(TabularError::SchemaMismatch {
                            expected: base.names.clone(),
                            got: frame.names.clone(),
                        });
                    }
                }
            }
        }
        Ok(base)
    }

    fn retain_rows(&mut self, keep: &[bool]) {
        for col in &mut self.cols {
            col.retain_rows(keep);
        }
    }

    /// Canonical representation of one row, used for duplicate
    /// detection. Missing markers and float bit patterns are kept
    /// distinct from any text cell.
    fn row_key(&self, row: usize) -> String {
        let mut key = String::new();
        for col in &self.cols {
            match col {
                Column::Numeric(v) => match v[row] {
                    Some(x) => {
                        let _ = write!(key, "n{:016x}\x1f", x.to_bits());
                    }
                    None => key.push_str("m\x1f"),
                },
                Column::Text(v) => {
                    let _ = write!(key, "t{}\x1f", v[row]);
                }
            }
        }
        key
    }
}

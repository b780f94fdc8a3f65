//! Plain text tables in the layout the Atlas CLI family prints.
//!
//! Columns are left aligned and separated by at least [`COLUMN_GAP`] spaces. The last column is
//! not padded so lines carry no trailing whitespace.
use std::{fmt::Display, iter};

const COLUMN_GAP: usize = 4;

pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A column name and how to get the cell for an item.
pub type TableColumn<S, T> = (S, fn(&T) -> String);

impl Table {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    /// Build a table with one row per item.
    ///
    /// # Arguments
    ///
    /// * `iter` - The items to render, one row each, in iteration order.
    /// * `columns` - The header of each column and the function producing its cell.
    pub fn from_iter<'a, S, Iter, Item>(iter: Iter, columns: &[TableColumn<S, Item>]) -> Self
    where
        S: Display,
        Iter: IntoIterator<Item = &'a Item>,
        Item: 'a,
    {
        let header = columns.iter().map(|(name, _)| name.to_string()).collect();
        let rows = iter
            .into_iter()
            .map(|item| columns.iter().map(|(_, f)| f(item)).collect())
            .collect();

        Self::new(header, rows)
    }

    fn lines(&self) -> impl Iterator<Item = &Vec<String>> {
        iter::once(&self.header).chain(self.rows.iter())
    }

    /// Widest cell of each column, header included, counted in characters.
    fn column_widths(&self) -> Vec<usize> {
        let mut widths = vec![0; self.header.len()];
        for line in self.lines() {
            for (width, cell) in widths.iter_mut().zip(line) {
                *width = (*width).max(cell.chars().count());
            }
        }
        widths
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let widths = self.column_widths();

        for (index, line) in self.lines().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }

            let last = line.len().saturating_sub(1);
            for (column, (cell, width)) in line.iter().zip(&widths).enumerate() {
                if column == last {
                    write!(f, "{cell}")?;
                } else {
                    write!(f, "{cell:<width$}", width = width + COLUMN_GAP)?;
                }
            }
        }

        Ok(())
    }
}

//! Table rendering utilities for CLI outputs.

use unicode_width::UnicodeWidthStr;

use crate::utils::formatting::strip_ansi;

pub struct Column {
    pub header: String,
    pub width: usize,
}

impl Column {
    pub fn new(header: &str, width: usize) -> Self {
        Self {
            header: header.to_string(),
            width,
        }
    }
}

pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

fn pad(cell: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(strip_ansi(cell).as_str());
    if w >= width {
        cell.to_string()
    } else {
        format!("{}{}", cell, " ".repeat(width - w))
    }
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        // Header
        for col in &self.columns {
            out.push_str(&pad(&col.header, col.width));
            out.push(' ');
        }
        out.push('\n');

        // Rows
        for row in &self.rows {
            for (i, col) in self.columns.iter().enumerate() {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                out.push_str(&pad(cell, col.width));
                out.push(' ');
            }
            out.push('\n');
        }

        out
    }
}

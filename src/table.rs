//! Table model filled from recognized tokens.
//!
//! A table starts from its headers: one header line, and one line per
//! header in the other direction. Data lines are then appended from token
//! indices, each token going to the single column fully containing it.

use std::fmt;
use std::ops::Index;
use crate::bbox::BBox;
use crate::error::{Result, TableError};
use crate::headers::HeaderMatch;
use crate::record::{RecognitionRecord, Token};
use crate::rows::IndexGroup;

/// What a word, cell or line holds.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CellType {
    Header,
    Package,
    Address,
    Weight,
    Int,
    Str,
    Unknown,
}

/// Whether the headers name the columns (header row on top) or the rows
/// (header column on the left).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum HeaderLayout {
    #[default]
    Columns,
    Rows,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Word {
    pub kind: CellType,
    pub bbox: BBox,
    pub value: String,
    pub score: f32,
}

impl Word {
    fn from_token(t: &Token) -> Self {
        Self{kind: CellType::Unknown, bbox: t.bbox, value: t.text.clone(), score: t.conf}
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub kind: CellType,
    pub bbox: BBox,
    /// Display name of header cells.
    pub value: Option<String>,
    /// Mean recognition confidence of the words.
    pub score: f32,
    words: Vec<Word>,
}

impl Cell {
    pub fn header(hdr: &HeaderMatch) -> Self {
        let word = match hdr.found() {
            Some(found) => Word{kind: CellType::Header, bbox: found.bbox, value: found.text.clone(),
                                score: found.conf},
            None => Word{kind: CellType::Header, bbox: hdr.bbox().copied().unwrap_or_default(),
                         value: String::new(), score: 0.},
        };
        Self{kind: CellType::Header, bbox: hdr.bbox().copied().unwrap_or_default(),
             value: Some(hdr.name.clone()), score: word.score, words: vec![word]}
    }

    pub fn from_token(t: &Token) -> Self {
        Self{kind: CellType::Unknown, bbox: t.bbox, value: None, score: t.conf,
             words: vec![Word::from_token(t)]}
    }

    /// Adds a word, keeping words ordered by their left edge.
    pub fn add_word(&mut self, t: &Token) {
        let word = Word::from_token(t);
        self.bbox.union(&word.bbox);
        let i = self.words.iter().position(|w| w.bbox.left > word.bbox.left).unwrap_or(self.words.len());
        self.words.insert(i, word);
        self.score = self.words.iter().map(|w| w.score).sum::<f32>() / self.words.len() as f32;
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (CellType::Header, Some(value)) = (self.kind, &self.value) {
            return write!(f, "{}", value);
        }
        for (i, w) in self.words.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(&w.value)?;
        }
        Ok(())
    }
}

/// A row or a column. Slots may be empty.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    pub is_row: bool,
    pub kind: CellType,
    pub bbox: BBox,
    pub cells: Vec<Option<Cell>>,
}

impl Line {
    pub fn new(is_row: bool, kind: CellType, cells: Vec<Option<Cell>>) -> Self {
        let mut bbox = BBox::empty();
        for c in cells.iter().flatten() {
            bbox.union(&c.bbox);
        }
        Self{is_row, kind, bbox, cells}
    }

    pub fn get_csv_string(&self, separator: &str) -> String {
        let fields: Vec<String> = self.cells.iter()
            .map(|c| c.as_ref().map(|c| c.to_string()).unwrap_or_default())
            .collect();
        fields.join(separator)
    }
}

pub struct Table {
    pub bbox: BBox,
    rows: Vec<Line>,
    columns: Vec<Line>,
}

impl Table {
    pub fn new(headers: &[HeaderMatch], layout: HeaderLayout) -> Self {
        let mut table = Self{bbox: BBox::empty(), rows: Vec::new(), columns: Vec::new()};
        if headers.is_empty() {
            tracing::info!("no headers given, empty table created");
            return table;
        }

        let cells: Vec<Cell> = headers.iter().map(Cell::header).collect();
        let singles = cells.iter().map(|c| vec![Some(c.clone())]);
        let header_line = match layout {
            HeaderLayout::Columns => {
                table.columns = singles.map(|c| Line::new(false, CellType::Unknown, c)).collect();
                let line = Line::new(true, CellType::Header, cells.into_iter().map(Some).collect());
                table.rows.push(line);
                &table.rows[0]
            },
            HeaderLayout::Rows => {
                table.rows = singles.map(|c| Line::new(true, CellType::Unknown, c)).collect();
                let line = Line::new(false, CellType::Header, cells.into_iter().map(Some).collect());
                table.columns.push(line);
                &table.columns[0]
            },
        };
        let header_bbox = header_line.bbox;
        table.bbox.union(&header_bbox);
        table
    }

    pub fn nb_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn nb_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Line] {
        &self.rows
    }

    pub fn columns(&self) -> &[Line] {
        &self.columns
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row)?.cells.get(column)?.as_ref()
    }

    fn containing_columns(&self, bbox: &BBox) -> Vec<usize> {
        self.columns.iter().enumerate()
            .filter(|(_, col)| col.bbox.contains_horizontally(bbox))
            .map(|(i, _)| i)
            .collect()
    }

    /// Textual tokens below the header row, paired with every column that
    /// fully contains them horizontally.
    pub fn search_rec_in_headed_columns(&self, record: &RecognitionRecord) -> Vec<IndexGroup> {
        let header_bottom = match self.rows.first() {
            Some(row) => row.bbox.bottom,
            None => return Vec::new(),
        };

        let mut groups = Vec::new();
        for (i, t) in record.tokens().iter().enumerate() {
            if t.bbox.top < header_bottom || !t.has_text() {
                continue;
            }
            for col in self.containing_columns(&t.bbox) {
                groups.push((col, vec![i]));
            }
        }
        groups
    }

    /// Appends a data row built from the given tokens. Tokens outside
    /// every column are dropped. Returns whether a row was added, which
    /// needs at least one placed token.
    pub fn add_new_line_from_idx_rec(&mut self, record: &RecognitionRecord, indices: &[usize],
                                     is_row: bool) -> Result<bool> {
        if !is_row {
            return Err(TableError::Unimplemented("adding a column from recognized tokens"));
        }

        let mut cells: Vec<Option<Cell>> = vec![None; self.nb_columns()];
        let mut at_least_one = false;
        for &i in indices {
            let t = &record[i];
            let cols = self.containing_columns(&t.bbox);
            match cols.as_slice() {
                [] => tracing::debug!(index = i, text = %t.text, "token outside of the columns"),
                [col] => match &mut cells[*col] {
                    Some(cell) => {
                        tracing::debug!(text = %t.text, cell = %cell, "position already found in cell");
                        cell.add_word(t);
                    },
                    slot => {
                        *slot = Some(Cell::from_token(t));
                        at_least_one = true;
                    },
                },
                _ => tracing::error!(index = i, text = %t.text, ?cols, "token contained in several columns"),
            }
        }

        if at_least_one {
            self.rows.push(Line::new(true, CellType::Package, cells));
        }
        Ok(at_least_one)
    }

    /// One line per row, each ended by a newline.
    pub fn get_csv_string(&self, separator: &str) -> String {
        let mut s = String::new();
        for row in &self.rows {
            s.push_str(&row.get_csv_string(separator));
            s.push('\n');
        }
        s
    }
}

impl Index<(usize, usize)> for Table {
    type Output = Option<Cell>;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.rows[index.0].cells[index.1]
    }
}

#[cfg(test)]
use crate::headers::search_headers;
#[cfg(test)]
use crate::record::LineId;
#[cfg(test)]
use crate::testutil::{slip_config, slip_page, word};

#[cfg(test)]
fn slip_table(margin: i32) -> (RecognitionRecord, Table) {
    let rec = slip_page();
    let headers = search_headers(&rec, &slip_config(Some(margin)), true);
    (rec, Table::new(&headers, HeaderLayout::Columns))
}

#[test]
fn test_table_from_headers() {
    let (_, table) = slip_table(10);
    assert_eq!(table.nb_rows(), 1);
    assert_eq!(table.nb_columns(), 5);
    assert_eq!(table.rows()[0].kind, CellType::Header);
    assert_eq!(table.bbox, BBox::from_tblr(200, 229, 100, 2469));
    assert_eq!(table.columns()[1].bbox, BBox::from_tblr(200, 229, 400, 790));

    let hdr = table[(0, 2)].as_ref().unwrap();
    assert_eq!(hdr.to_string(), "poids");
    assert_eq!(hdr.words()[0].value, "Poids");
    assert_eq!(table.get_csv_string(";"), "date;ville;poids;colis;total\n");
}

#[test]
fn test_table_rows_layout() {
    let rec = slip_page();
    let headers = search_headers(&rec, &slip_config(None), false);
    let table = Table::new(&headers, HeaderLayout::Rows);
    assert_eq!(table.nb_rows(), 5);
    assert_eq!(table.nb_columns(), 1);
    assert!(!table.columns()[0].is_row);
    assert_eq!(table.cell(3, 0).unwrap().to_string(), "colis");
    assert_eq!(table.get_csv_string(","), "date\nville\npoids\ncolis\ntotal\n");
}

#[test]
fn test_empty_table() {
    let table = Table::new(&[], HeaderLayout::Columns);
    assert_eq!(table.nb_rows(), 0);
    assert!(table.bbox.is_empty());
    assert!(table.search_rec_in_headed_columns(&slip_page()).is_empty());
    assert_eq!(table.get_csv_string(";"), "");
}

#[test]
fn test_search_rec_in_headed_columns() {
    let (rec, table) = slip_table(10);
    let groups = table.search_rec_in_headed_columns(&rec);
    // header bottom is 229, data tokens start at index 6
    let expected: Vec<IndexGroup> = vec![
        (0, vec![6]), (1, vec![7]), (2, vec![8]), (2, vec![9]), (3, vec![10]), (4, vec![11]),
        (0, vec![12]), (1, vec![13]), (3, vec![14]),
    ];
    assert_eq!(groups, expected);
}

#[test]
fn test_add_row() {
    let (rec, mut table) = slip_table(10);
    // words given right to left still read left to right
    assert!(table.add_new_line_from_idx_rec(&rec, &[11, 10, 9, 8, 7, 6], true).unwrap());
    assert_eq!(table.nb_rows(), 2);
    let row = &table.rows()[1];
    assert_eq!(row.kind, CellType::Package);
    assert_eq!(row.bbox, BBox::from_tblr(300, 329, 100, 1559));
    let weight = table.cell(1, 2).unwrap();
    assert_eq!(weight.to_string(), "12,5 kg");
    assert_eq!(weight.bbox, BBox::from_tblr(300, 329, 820, 919));

    assert!(table.add_new_line_from_idx_rec(&rec, &[12, 13, 14], true).unwrap());
    assert_eq!(table[(2, 2)], None);
    assert_eq!(table.get_csv_string(";"),
               "date;ville;poids;colis;total\n12/03;Paris;12,5 kg;3;45\n13/03;Lyon;;7;\n");
}

#[test]
fn test_add_row_nothing_placed() {
    let l = LineId::new(1, 9, 1, 1);
    let mut tokens = slip_page().tokens().to_vec();
    // right of the page margin, under no header
    tokens.push(word(l, 2475, 600, 4, 30, "x"));
    let rec = RecognitionRecord::new(tokens);
    let headers = search_headers(&rec, &slip_config(Some(10)), true);
    let mut table = Table::new(&headers, HeaderLayout::Columns);
    assert!(!table.add_new_line_from_idx_rec(&rec, &[15], true).unwrap());
    assert!(!table.add_new_line_from_idx_rec(&rec, &[], true).unwrap());
    assert_eq!(table.nb_rows(), 1);
}

#[test]
fn test_add_row_ambiguous_column() {
    let l = LineId::new(1, 9, 1, 1);
    let mut tokens = slip_page().tokens().to_vec();
    tokens.push(word(l, 401, 600, 4, 30, "x"));
    let rec = RecognitionRecord::new(tokens);
    let cfg = slip_config(Some(-5));
    let headers = search_headers(&rec, &cfg, true);
    let mut table = Table::new(&headers, HeaderLayout::Columns);
    // "date" reaches 405 and "ville" starts at 400
    assert_eq!(table.search_rec_in_headed_columns(&rec).iter().filter(|(_, idx)| idx == &[15]).count(), 2);
    assert!(!table.add_new_line_from_idx_rec(&rec, &[15], true).unwrap());
    assert!(table.add_new_line_from_idx_rec(&rec, &[15, 12], true).unwrap());
    assert_eq!(table.rows()[1].get_csv_string(";"), "13/03;;;;");
}

#[test]
fn test_add_column_unimplemented() {
    let (rec, mut table) = slip_table(10);
    match table.add_new_line_from_idx_rec(&rec, &[6], false) {
        Err(TableError::Unimplemented(_)) => (),
        other => panic!("unexpected result {:?}", other),
    }
    assert_eq!(table.nb_rows(), 1);
}

#[test]
fn test_cell_score() {
    let (rec, mut table) = slip_table(10);
    table.add_new_line_from_idx_rec(&rec, &[8, 9], true).unwrap();
    assert_eq!(table.cell(1, 2).unwrap().score, 90.);
    assert_eq!(table.cell(1, 2).unwrap().words().len(), 2);
}

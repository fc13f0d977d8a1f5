use std::io::BufRead;
use std::ops::Index;
use std::str::FromStr;
use crate::bbox::{BBox, BoxFormat};
use crate::error::{Result, TableError};

/// Hierarchy depth of word-level tokens in Tesseract output.
pub const WORD_LEVEL: i32 = 5;

/// Identity of a logical text line: (page, block, paragraph, line).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct LineId {
    pub page: i32,
    pub block: i32,
    pub par: i32,
    pub line: i32,
}

impl LineId {
    pub fn new(page: i32, block: i32, par: i32, line: i32) -> Self {
        Self{page, block, par, line}
    }
}

/// One recognized unit. Its box is derived once from the Tesseract
/// left/top/width/height quadruple when the token is created.
#[derive(Clone, Debug)]
pub struct Token {
    pub level: i32,
    pub page_num: i32,
    pub block_num: i32,
    pub par_num: i32,
    pub line_num: i32,
    pub word_num: i32,
    pub bbox: BBox,
    pub conf: f32,
    pub text: String,
}

impl Token {
    pub fn line_id(&self) -> LineId {
        LineId::new(self.page_num, self.block_num, self.par_num, self.line_num)
    }

    pub fn is_word(&self) -> bool {
        self.level >= WORD_LEVEL
    }

    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Column arrays as handed over by an OCR engine binding.
#[derive(Clone, Debug, Default)]
pub struct RecognitionColumns {
    pub level: Vec<i32>,
    pub page_num: Vec<i32>,
    pub block_num: Vec<i32>,
    pub par_num: Vec<i32>,
    pub line_num: Vec<i32>,
    pub word_num: Vec<i32>,
    pub left: Vec<i32>,
    pub top: Vec<i32>,
    pub width: Vec<i32>,
    pub height: Vec<i32>,
    pub conf: Vec<f32>,
    pub text: Vec<String>,
}

/// Immutable recognition output of one or more pages. Token indices are
/// stable for the record's lifetime.
#[derive(Clone, Debug, Default)]
pub struct RecognitionRecord {
    tokens: Vec<Token>,
}

impl RecognitionRecord {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self{tokens}
    }

    pub fn from_columns(columns: RecognitionColumns) -> Result<Self> {
        let n = columns.text.len();
        let lengths = [
            ("level", columns.level.len()),
            ("page_num", columns.page_num.len()),
            ("block_num", columns.block_num.len()),
            ("par_num", columns.par_num.len()),
            ("line_num", columns.line_num.len()),
            ("word_num", columns.word_num.len()),
            ("left", columns.left.len()),
            ("top", columns.top.len()),
            ("width", columns.width.len()),
            ("height", columns.height.len()),
            ("conf", columns.conf.len()),
        ];
        for (name, len) in lengths {
            if len != n {
                return Err(TableError::InvalidArgument(
                    format!("column {} has {} values, text has {}", name, len, n)));
            }
        }

        let mut tokens = Vec::with_capacity(n);
        for (i, text) in columns.text.into_iter().enumerate() {
            let bbox = BBox::build(BoxFormat::TupleLtwh,
                                   Some([columns.left[i], columns.top[i],
                                         columns.width[i], columns.height[i]]),
                                   None)?;
            tokens.push(Token{
                level: columns.level[i],
                page_num: columns.page_num[i],
                block_num: columns.block_num[i],
                par_num: columns.par_num[i],
                line_num: columns.line_num[i],
                word_num: columns.word_num[i],
                bbox,
                conf: columns.conf[i],
                text,
            });
        }
        Ok(Self{tokens})
    }

    /// Reads Tesseract's TSV output. The first line is the column header.
    pub fn from_tsv<R: BufRead>(reader: R) -> Result<Self> {
        let mut tokens = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if i == 0 || line.trim().is_empty() {
                continue;
            }
            tokens.push(parse_tsv_line(&line, i + 1)?);
        }
        Ok(Self{tokens})
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Splits a multi-page record into one record per `page_num`, in
    /// order of first appearance.
    pub fn split_pages(&self) -> Vec<(i32, RecognitionRecord)> {
        let mut pages: Vec<(i32, RecognitionRecord)> = Vec::new();
        for t in &self.tokens {
            match pages.iter_mut().find(|(p, _)| *p == t.page_num) {
                Some((_, page)) => page.tokens.push(t.clone()),
                None => pages.push((t.page_num, Self{tokens: vec![t.clone()]})),
            }
        }
        pages
    }
}

impl Index<usize> for RecognitionRecord {
    type Output = Token;

    fn index(&self, index: usize) -> &Self::Output {
        &self.tokens[index]
    }
}

fn parse_field<T: FromStr>(fields: &[&str], i: usize, name: &str, line: usize) -> Result<T> {
    let raw = fields.get(i).ok_or_else(|| TableError::MalformedRecord{
        line, reason: format!("missing field {}", name),
    })?;
    raw.trim().parse::<T>().map_err(|_| TableError::MalformedRecord{
        line, reason: format!("invalid {} value {:?}", name, raw),
    })
}

fn parse_tsv_line(line: &str, lineno: usize) -> Result<Token> {
    let fields: Vec<&str> = line.split('\t').collect();
    let values = [
        parse_field::<i32>(&fields, 6, "left", lineno)?,
        parse_field::<i32>(&fields, 7, "top", lineno)?,
        parse_field::<i32>(&fields, 8, "width", lineno)?,
        parse_field::<i32>(&fields, 9, "height", lineno)?,
    ];
    Ok(Token{
        level: parse_field(&fields, 0, "level", lineno)?,
        page_num: parse_field(&fields, 1, "page_num", lineno)?,
        block_num: parse_field(&fields, 2, "block_num", lineno)?,
        par_num: parse_field(&fields, 3, "par_num", lineno)?,
        line_num: parse_field(&fields, 4, "line_num", lineno)?,
        word_num: parse_field(&fields, 5, "word_num", lineno)?,
        bbox: BBox::build(BoxFormat::TupleLtwh, Some(values), None)?,
        conf: parse_field(&fields, 10, "conf", lineno)?,
        // Non-word levels carry no text column at all.
        text: fields.get(11).map(|t| t.trim_end_matches('\r').to_string()).unwrap_or_default(),
    })
}

#[cfg(test)]
const TEST_TSV: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t2480\t3508\t-1\t
4\t1\t1\t1\t1\t0\t100\t200\t400\t30\t-1\t
5\t1\t1\t1\t1\t1\t100\t200\t120\t30\t91.5\tVille
5\t1\t1\t1\t1\t2\t300\t202\t200\t28\t88\tPoids
";

#[test]
fn test_from_tsv() {
    let rec = RecognitionRecord::from_tsv(TEST_TSV.as_bytes()).unwrap();
    assert_eq!(rec.len(), 4);
    assert_eq!(rec[0].bbox, BBox::from_tblr(0, 3507, 0, 2479));
    assert_eq!(rec[0].text, "");
    assert!(!rec[1].is_word());
    assert!(rec[2].is_word());
    assert_eq!(rec[2].bbox, BBox::from_tblr(200, 229, 100, 219));
    assert_eq!(rec[2].conf, 91.5);
    assert_eq!(rec[3].text, "Poids");
    assert_eq!(rec[3].line_id(), LineId::new(1, 1, 1, 1));
}

#[test]
fn test_from_tsv_malformed() {
    let tsv = "level\tpage_num\n5\t1\t1\t1\t1\t1\tx\t0\t1\t1\t90\tfoo\n";
    match RecognitionRecord::from_tsv(tsv.as_bytes()) {
        Err(TableError::MalformedRecord{line, ..}) => assert_eq!(line, 2),
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_from_columns() {
    let columns = RecognitionColumns{
        level: vec![5, 5],
        page_num: vec![1, 1],
        block_num: vec![1, 1],
        par_num: vec![1, 1],
        line_num: vec![1, 2],
        word_num: vec![1, 1],
        left: vec![10, 10],
        top: vec![20, 60],
        width: vec![30, 30],
        height: vec![10, 10],
        conf: vec![90., 80.],
        text: vec!["a".to_string(), "b".to_string()],
    };
    let rec = RecognitionRecord::from_columns(columns.clone()).unwrap();
    assert_eq!(rec.len(), 2);
    assert_eq!(rec[1].bbox, BBox::from_tblr(60, 69, 10, 39));

    let mut broken = columns;
    broken.conf.pop();
    assert!(matches!(RecognitionRecord::from_columns(broken), Err(TableError::InvalidArgument(_))));
}

#[test]
fn test_split_pages() {
    let tsv = format!("{}{}", TEST_TSV,
                      "1\t2\t0\t0\t0\t0\t0\t0\t2480\t3508\t-1\t\n5\t2\t1\t1\t1\t1\t10\t10\t10\t10\t90\tx\n");
    let rec = RecognitionRecord::from_tsv(tsv.as_bytes()).unwrap();
    let pages = rec.split_pages();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].0, 1);
    assert_eq!(pages[0].1.len(), 4);
    assert_eq!(pages[1].0, 2);
    assert_eq!(pages[1].1.len(), 2);
    assert_eq!(pages[1].1[1].text, "x");
}

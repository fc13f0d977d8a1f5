use crate::bbox::BBox;
use crate::config::{ConfigHeader, PageConfig};
use crate::record::{LineId, RecognitionRecord, Token};

pub fn token(level: i32, line: LineId, left: i32, top: i32, width: i32, height: i32, text: &str) -> Token {
    Token{
        level,
        page_num: line.page,
        block_num: line.block,
        par_num: line.par,
        line_num: line.line,
        word_num: 0,
        bbox: BBox::from_ltwh(left, top, width, height),
        conf: 90.,
        text: text.to_string(),
    }
}

pub fn word(line: LineId, left: i32, top: i32, width: i32, height: i32, text: &str) -> Token {
    token(5, line, left, top, width, height, text)
}

pub fn page_token() -> Token {
    token(1, LineId::new(1, 0, 0, 0), 0, 0, 2480, 3508, "")
}

/// A delivery slip: five headers on one text line, then two data rows.
///
/// ```text
///  idx  text     left..right   top..bottom
///   1   Date      100..179     200..229
///   2   Ville     400..499
///   3   Poids     800..899
///   4   Colis    1100..1189
///   5   Total    1500..1599
///   6   12/03     100..189     300..329
///   7   Paris     420..509
///   8   12,5      820..879
///   9   kg        890..919
///  10   3        1120..1139
///  11   45       1520..1559
///  12   13/03     100..189     400..429
///  13   Lyon      420..499
///  14   7        1120..1139
/// ```
pub fn slip_page() -> RecognitionRecord {
    let hdr = LineId::new(1, 2, 1, 1);
    let row1 = LineId::new(1, 3, 1, 1);
    let row2 = LineId::new(1, 3, 1, 2);
    RecognitionRecord::new(vec![
        page_token(),
        word(hdr, 100, 200, 80, 30, "Date"),
        word(hdr, 400, 200, 100, 30, "Ville"),
        word(hdr, 800, 200, 100, 30, "Poids"),
        word(hdr, 1100, 200, 90, 30, "Colis"),
        word(hdr, 1500, 200, 100, 30, "Total"),
        word(row1, 100, 300, 90, 30, "12/03"),
        word(row1, 420, 300, 90, 30, "Paris"),
        word(row1, 820, 300, 60, 30, "12,5"),
        word(row1, 890, 300, 30, 30, "kg"),
        word(row1, 1120, 300, 20, 30, "3"),
        word(row1, 1520, 300, 40, 30, "45"),
        word(row2, 100, 400, 90, 30, "13/03"),
        word(row2, 420, 400, 80, 30, "Lyon"),
        word(row2, 1120, 400, 20, 30, "7"),
    ])
}

pub fn slip_config(next_header_margin: Option<i32>) -> PageConfig {
    let headers = [("date", "DATE"), ("ville", "Ville"), ("poids", "poids*"), ("colis", "colis"), ("total", "total")]
        .iter()
        .map(|(id, search)| ConfigHeader::new(id, search, -1).unwrap())
        .collect();
    let mut cfg = PageConfig::new(headers);
    cfg.next_header_margin = next_header_margin;
    cfg.min_pixels_for_a_line = 100;
    cfg
}

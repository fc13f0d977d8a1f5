//! Header detection.
//!
//! Headers are first searched on the text line most of their search
//! texts were recognized on. Headers that line does not provide are then
//! taken from a horizontal pixel band shared by most textual matches.

use crate::bbox::BBox;
use crate::config::{ConfigHeader, PageConfig};
use crate::record::{LineId, RecognitionRecord};
use crate::resize::resize_headers;
use crate::rows::{count_objects_by_rows, get_best_count, get_min_max_line_idx, is_same_line,
                  Counter, IndexGroup};

/// Lead the best voted line needs over the runner-up.
pub const MIN_DIFF_FOUND_IN_LINES: i64 = 5;

/// Fraction of the header count a pixel row needs to be part of the
/// header band.
pub const RATIO_HDR_NB: f64 = 0.25;

#[derive(Clone, Debug, PartialEq)]
pub struct FoundHeader {
    pub rec_index: usize,
    pub bbox: BBox,
    pub conf: f32,
    pub text: String,
}

impl FoundHeader {
    fn from_record(record: &RecognitionRecord, rec_index: usize) -> Self {
        let t = &record[rec_index];
        Self{rec_index, bbox: t.bbox, conf: t.conf, text: t.text.clone()}
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum HeaderLocation {
    Unresolved,
    Found(FoundHeader),
    // Placed from a neighbour and the configured length, no token behind it.
    Synthesized(BBox),
}

#[derive(Clone, Debug, PartialEq)]
pub struct HeaderMatch {
    pub name: String,
    pub cfg_index: usize,
    pub location: HeaderLocation,
}

impl HeaderMatch {
    pub fn unresolved(name: &str, cfg_index: usize) -> Self {
        Self{name: name.to_string(), cfg_index, location: HeaderLocation::Unresolved}
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self.location, HeaderLocation::Unresolved)
    }

    pub fn bbox(&self) -> Option<&BBox> {
        match &self.location {
            HeaderLocation::Unresolved => None,
            HeaderLocation::Found(found) => Some(&found.bbox),
            HeaderLocation::Synthesized(bbox) => Some(bbox),
        }
    }

    pub fn bbox_mut(&mut self) -> Option<&mut BBox> {
        match &mut self.location {
            HeaderLocation::Unresolved => None,
            HeaderLocation::Found(found) => Some(&mut found.bbox),
            HeaderLocation::Synthesized(bbox) => Some(bbox),
        }
    }

    pub fn found(&self) -> Option<&FoundHeader> {
        match &self.location {
            HeaderLocation::Found(found) => Some(found),
            _ => None,
        }
    }
}

/// Tokens whose lower-cased text matches each header, and the lines those
/// matches vote for.
pub fn match_header_texts(record: &RecognitionRecord, headers: &[ConfigHeader]) -> (Vec<IndexGroup>, Counter<LineId>) {
    let lower_texts: Vec<String> = record.tokens().iter().map(|t| t.text.to_lowercase()).collect();
    let mut groups = Vec::with_capacity(headers.len());
    let mut line_cnt = Counter::new();
    for (cfg_index, hdr) in headers.iter().enumerate() {
        let mut indices = Vec::new();
        for (i, text) in lower_texts.iter().enumerate() {
            if hdr.pattern().is_match(text) {
                indices.push(i);
                line_cnt.add(record[i].line_id(), 1);
            }
        }
        tracing::debug!(header = %hdr.search_text, is_prefix = hdr.pattern().is_prefix(), cfg_index, ?indices,
                        "header recognised");
        groups.push((cfg_index, indices));
    }
    (groups, line_cnt)
}

/// Resolves headers on `line`. A header takes its first textual match on
/// that line, or else the first word of the line starting with its
/// search text. Headers still missing are then taken from
/// [`find_headers_by_position`].
///
/// Returns the headers and whether all of them were resolved.
pub fn find_headers_in_line(headers: &[ConfigHeader], record: &RecognitionRecord,
                            groups: &[IndexGroup], line: &LineId) -> (Vec<HeaderMatch>, bool) {
    let mut result = Vec::with_capacity(headers.len());
    let mut is_complete = true;

    let (mut scan_start, scan_end) = match get_min_max_line_idx(record, line) {
        Some((min, max)) => (min, max + 1),
        None => (0, 0),
    };

    for (hdr, (cfg_index, indices)) in headers.iter().zip(groups) {
        let mut m = HeaderMatch::unresolved(&hdr.id, *cfg_index);

        let found = indices.iter().copied().find(|&i| is_same_line(record, i, line)).or_else(|| {
            (scan_start..scan_end).find(|&i| {
                let t = &record[i];
                t.is_word() && t.text.to_lowercase().starts_with(hdr.pattern().prefix())
            })
        });

        match found {
            Some(i) => {
                m.location = HeaderLocation::Found(FoundHeader::from_record(record, i));
                // The next headers are further along the line.
                if i == scan_start {
                    scan_start += 1;
                }
            },
            None => is_complete = false,
        }
        result.push(m);
    }

    if !is_complete {
        let by_position = find_headers_by_position(headers, record, groups);
        is_complete = true;
        for (m, pos) in result.iter_mut().zip(by_position) {
            if m.is_resolved() {
                continue;
            }
            if pos.is_resolved() {
                m.location = pos.location;
            } else {
                is_complete = false;
            }
        }
    }

    (result, is_complete)
}

/// Resolves headers from the pixel band most of the textual matches
/// share. An empty result means no such band exists.
pub fn find_headers_by_position(headers: &[ConfigHeader], record: &RecognitionRecord,
                                groups: &[IndexGroup]) -> Vec<HeaderMatch> {
    let min_hdr_nb = (RATIO_HDR_NB * headers.len() as f64) as i64;
    let horizontal_cnt = count_objects_by_rows(record, groups, false);

    let mut band: Option<(i32, i32)> = None;
    for (&y, &n) in horizontal_cnt.iter() {
        if n < min_hdr_nb {
            continue;
        }
        band = match band {
            None => Some((y, y)),
            Some((min, max)) => Some((min.min(y), max.max(y))),
        };
    }

    let (mut band_min, mut band_max) = match band {
        Some(band) => band,
        None => {
            tracing::warn!("no headers found");
            return Vec::new();
        },
    };

    // Extend to the rows connected to the main ones.
    while horizontal_cnt.contains(&(band_min - 1)) {
        band_min -= 1;
    }
    while horizontal_cnt.contains(&(band_max + 1)) {
        band_max += 1;
    }
    tracing::debug!(band_min, band_max, "headers band");

    headers.iter().zip(groups).map(|(hdr, (cfg_index, indices))| {
        let mut m = HeaderMatch::unresolved(&hdr.id, *cfg_index);
        let found = indices.iter().copied().find(|&i| {
            let b = &record[i].bbox;
            (band_min <= b.top && b.top <= band_max) || (b.top < band_min && band_min <= b.bottom)
        });
        if let Some(i) = found {
            m.location = HeaderLocation::Found(FoundHeader::from_record(record, i));
        }
        m
    }).collect()
}

/// Locates the configured headers on a page. An empty list means no
/// header could be found at all and the page should be skipped.
///
/// With `resize_hdr`, and a configured `next_header_margin`, the boxes are
/// widened to the column extents they head.
pub fn search_headers(record: &RecognitionRecord, config: &PageConfig, resize_hdr: bool) -> Vec<HeaderMatch> {
    let (groups, line_cnt) = match_header_texts(record, &config.headers);
    tracing::debug!(lines = line_cnt.len(), "headers text found on lines");

    if line_cnt.is_empty() {
        return Vec::new();
    }

    let mut headers = match get_best_count(&line_cnt, MIN_DIFF_FOUND_IN_LINES) {
        Some(line) => {
            let (headers, is_complete) = find_headers_in_line(&config.headers, record, &groups, &line);
            if !is_complete {
                tracing::debug!(?line, "some headers are missing on the headers line");
            }
            headers
        },
        None => find_headers_by_position(&config.headers, record, &groups),
    };

    if resize_hdr && !headers.is_empty() {
        if let Some(margin) = config.next_header_margin {
            resize_headers(&mut headers, record, &config.headers, margin);
        }
    }

    headers
}

#[cfg(test)]
use crate::testutil::{page_token, slip_config, slip_page, word};

#[cfg(test)]
fn greek_config() -> PageConfig {
    let headers = ["alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta"].iter()
        .map(|s| ConfigHeader::new(s, s, -1).unwrap())
        .collect();
    PageConfig::new(headers)
}

// Six headers on one line, "eta" recognised slightly lower on a line of
// its own.
#[cfg(test)]
fn greek_page() -> RecognitionRecord {
    let l = LineId::new(1, 1, 1, 1);
    let m = LineId::new(1, 1, 2, 1);
    RecognitionRecord::new(vec![
        page_token(),
        word(l, 100, 100, 80, 30, "alpha"),
        word(l, 300, 100, 80, 30, "beta"),
        word(l, 500, 100, 80, 30, "gamma"),
        word(l, 700, 100, 80, 30, "delta"),
        word(l, 900, 100, 80, 30, "epsilon"),
        word(l, 1100, 100, 80, 30, "zeta"),
        word(m, 1300, 105, 60, 30, "eta"),
        word(LineId::new(1, 2, 1, 1), 1300, 400, 60, 30, "12"),
    ])
}

#[test]
fn test_single_line_headers() {
    let rec = slip_page();
    let cfg = slip_config(None);
    let (groups, line_cnt) = match_header_texts(&rec, &cfg.headers);
    let line = get_best_count(&line_cnt, MIN_DIFF_FOUND_IN_LINES).unwrap();
    assert_eq!(line, LineId::new(1, 2, 1, 1));

    let (headers, is_complete) = find_headers_in_line(&cfg.headers, &rec, &groups, &line);
    assert!(is_complete);
    let names: Vec<&str> = headers.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(names, vec!["date", "ville", "poids", "colis", "total"]);
    let indices: Vec<usize> = headers.iter().map(|h| h.found().unwrap().rec_index).collect();
    assert_eq!(indices, vec![1, 2, 3, 4, 5]);
    assert_eq!(headers[1].bbox(), Some(&BBox::from_tblr(200, 229, 400, 499)));
    assert_eq!(headers[1].found().unwrap().text, "Ville");
    assert_eq!(headers[4].cfg_index, 4);

    assert_eq!(search_headers(&rec, &cfg, false), headers);
}

#[test]
fn test_search_headers_idempotent() {
    let rec = slip_page();
    let cfg = slip_config(Some(10));
    assert_eq!(search_headers(&rec, &cfg, true), search_headers(&rec, &cfg, true));
    assert_eq!(search_headers(&rec, &cfg, false), search_headers(&rec, &cfg, false));
}

#[test]
fn test_line_scan_by_prefix() {
    // "Poids" recognised as "Poidsbrut" escapes an exact "poids" search
    // but is still found by scanning the headers line.
    let hdr = LineId::new(1, 2, 1, 1);
    let mut tokens = slip_page().tokens().to_vec();
    tokens[3] = word(hdr, 800, 200, 100, 30, "Poidsbrut");
    let rec = RecognitionRecord::new(tokens);
    let mut cfg = slip_config(None);
    cfg.headers[2] = ConfigHeader::new("poids", "poids", -1).unwrap();
    // add a fifth vote on the line
    cfg.headers.push(ConfigHeader::new("date2", "date", -1).unwrap());

    let headers = search_headers(&rec, &cfg, false);
    assert_eq!(headers[2].found().unwrap().rec_index, 3);
    assert_eq!(headers[2].found().unwrap().text, "Poidsbrut");
}

#[test]
fn test_missing_header_from_band() {
    let rec = greek_page();
    let cfg = greek_config();
    let (groups, line_cnt) = match_header_texts(&rec, &cfg.headers);
    assert_eq!(line_cnt.get(&LineId::new(1, 1, 1, 1)), 6);
    assert_eq!(line_cnt.get(&LineId::new(1, 1, 2, 1)), 1);

    let line = get_best_count(&line_cnt, MIN_DIFF_FOUND_IN_LINES).unwrap();
    let (headers, is_complete) = find_headers_in_line(&cfg.headers, &rec, &groups, &line);
    assert!(is_complete);
    assert_eq!(headers[6].name, "eta");
    assert_eq!(headers[6].found().unwrap().rec_index, 7);
    assert_eq!(headers[6].bbox(), Some(&BBox::from_tblr(105, 134, 1300, 1359)));
    assert!(headers.iter().all(|h| h.is_resolved()));
}

#[test]
fn test_headers_by_position() {
    let rec = greek_page();
    let cfg = greek_config();
    let (groups, _) = match_header_texts(&rec, &cfg.headers);
    let headers = find_headers_by_position(&cfg.headers, &rec, &groups);
    assert_eq!(headers.len(), 7);
    assert!(headers.iter().all(|h| h.is_resolved()));
    assert_eq!(headers[0].found().unwrap().rec_index, 1);
}

#[test]
fn test_no_headers_band() {
    // Eight headers need two votes per pixel row, a single match has one.
    let names = ["a", "b", "c", "d", "e", "f", "g", "h"];
    let headers: Vec<ConfigHeader> = names.iter().map(|s| ConfigHeader::new(s, s, -1).unwrap()).collect();
    let rec = RecognitionRecord::new(vec![page_token(), word(LineId::new(1, 1, 1, 1), 10, 10, 10, 10, "a")]);
    let (groups, _) = match_header_texts(&rec, &headers);
    assert!(find_headers_by_position(&headers, &rec, &groups).is_empty());
    assert!(search_headers(&rec, &PageConfig::new(headers), true).is_empty());
}

#[test]
fn test_no_text_match() {
    let rec = RecognitionRecord::new(vec![page_token(), word(LineId::new(1, 1, 1, 1), 10, 10, 10, 10, "xyz")]);
    assert!(search_headers(&rec, &slip_config(Some(10)), true).is_empty());
}

#[test]
fn test_unresolved_header_stays_unresolved() {
    let rec = slip_page();
    let mut cfg = slip_config(None);
    cfg.headers.push(ConfigHeader::new("missing", "nowhere", -1).unwrap());
    let headers = search_headers(&rec, &cfg, false);
    assert_eq!(headers.len(), 6);
    assert!(!headers[5].is_resolved());
    assert_eq!(headers[5].bbox(), None);
    assert!(headers[..5].iter().all(|h| h.is_resolved()));
}

#[test]
fn test_headers_band_extension() {
    // Eight headers need two votes per pixel row. Only rows 100..119 get
    // them, "c" and "d" hang below through contiguous single vote rows.
    let names = ["a", "b", "c", "d", "e", "f", "g", "h"];
    let headers: Vec<ConfigHeader> = names.iter().map(|s| ConfigHeader::new(s, s, -1).unwrap()).collect();
    let rec = RecognitionRecord::new(vec![
        page_token(),
        word(LineId::new(1, 1, 1, 1), 100, 100, 50, 20, "a"),
        word(LineId::new(1, 2, 1, 1), 200, 100, 50, 20, "b"),
        word(LineId::new(1, 3, 1, 1), 300, 118, 50, 33, "c"),
        word(LineId::new(1, 4, 1, 1), 400, 151, 50, 5, "d"),
    ]);
    let (groups, _) = match_header_texts(&rec, &headers);
    let found = find_headers_by_position(&headers, &rec, &groups);
    let resolved: Vec<bool> = found.iter().map(|h| h.is_resolved()).collect();
    assert_eq!(resolved, vec![true, true, true, true, false, false, false, false]);
    assert_eq!(found[3].found().unwrap().rec_index, 4);

    // one vote per line, no dominant line
    assert_eq!(search_headers(&rec, &PageConfig::new(headers), false), found);
}

use std::fs;
use std::path::Path;
use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use crate::error::{Result, TableError};

/// Marker ending a search text that turns it into a prefix match.
pub const WILDCARD: char = '*';

/// Header search text, compiled once. `abc` matches exactly `abc`,
/// `abc*` matches anything starting with `abc`.
#[derive(Clone, Debug)]
pub struct SearchPattern {
    prefix: String,
    is_prefix: bool,
    re: Regex,
}

impl SearchPattern {
    pub fn new(search_text: &str) -> Result<Self> {
        let (prefix, is_prefix) = match search_text.strip_suffix(WILDCARD) {
            Some(prefix) => (prefix, true),
            None => (search_text, false),
        };
        let re = if is_prefix {
            Regex::new(&format!("^{}", regex::escape(prefix)))?
        } else {
            Regex::new(&format!("^{}$", regex::escape(prefix)))?
        };
        Ok(Self{prefix: prefix.to_string(), is_prefix, re})
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.re.is_match(text)
    }

    /// The search text without its wildcard marker.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_prefix(&self) -> bool {
        self.is_prefix
    }
}

/// Exact match, or prefix match when `search_text` ends with `*`.
pub fn is_simple_reg_ex_ok(search_text: &str, text: &str) -> Result<bool> {
    Ok(SearchPattern::new(search_text)?.is_match(text))
}

fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    match serde_json::Value::deserialize(d)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("expected a string or a number, got {}", other))),
    }
}

fn unknown_length() -> i32 {
    -1
}

#[derive(Deserialize)]
struct RawConfigHeader {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
    search_text: String,
    #[serde(default = "unknown_length")]
    length: i32,
}

/// A header as configured for a document type.
#[derive(Clone, Debug, Deserialize)]
#[serde(try_from = "RawConfigHeader")]
pub struct ConfigHeader {
    pub id: String,
    /// Lower-cased match key.
    pub search_text: String,
    /// Expected width in pixels, -1 when unknown.
    pub length: i32,
    pattern: SearchPattern,
}

impl ConfigHeader {
    pub fn new(id: &str, search_text: &str, length: i32) -> Result<Self> {
        let search_text = search_text.to_lowercase();
        let pattern = SearchPattern::new(&search_text)?;
        Ok(Self{id: id.to_string(), search_text, length, pattern})
    }

    pub fn pattern(&self) -> &SearchPattern {
        &self.pattern
    }

    pub fn has_length(&self) -> bool {
        self.length != -1
    }
}

impl TryFrom<RawConfigHeader> for ConfigHeader {
    type Error = TableError;

    fn try_from(raw: RawConfigHeader) -> Result<Self> {
        Self::new(&raw.id, &raw.search_text, raw.length)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

fn default_min_pixels_for_a_line() -> i64 {
    1
}

/// Per document type settings.
#[derive(Clone, Debug, Deserialize)]
pub struct PageConfig {
    pub headers: Vec<ConfigHeader>,
    /// Gap kept between a header and the next one when resizing. Negative
    /// values let headers overlap. Resizing is off when absent.
    #[serde(default)]
    pub next_header_margin: Option<i32>,
    /// Width-weighted count a pixel row needs to belong to a table row.
    #[serde(default = "default_min_pixels_for_a_line")]
    pub min_pixels_for_a_line: i64,
    #[serde(default)]
    pub orientation: Option<Orientation>,
}

impl PageConfig {
    pub fn new(headers: Vec<ConfigHeader>) -> Self {
        Self{headers, next_header_margin: None,
             min_pixels_for_a_line: default_min_pixels_for_a_line(), orientation: None}
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }
}

#[test]
fn test_config_header() {
    let hdr = ConfigHeader::new("3", "VILLE", 12).unwrap();
    assert_eq!(hdr.id, "3");
    assert_eq!(hdr.search_text, "ville");
    assert_eq!(hdr.length, 12);
    assert!(hdr.has_length());
    assert!(hdr.pattern().is_match("ville"));
    assert!(!hdr.pattern().is_match("VILLE"));
}

#[test]
fn test_reg_ex() {
    let cases = [("toto", [true, false, false]), ("toto*", [true, true, false])];
    for (search, expected) in cases {
        for (text, exp) in ["toto", "totokk", "tata"].iter().zip(expected) {
            assert_eq!(is_simple_reg_ex_ok(search, text).unwrap(), exp, "{} / {}", search, text);
        }
    }
}

#[test]
fn test_reg_ex_escapes_metacharacters() {
    assert!(is_simple_reg_ex_ok("n.", "n.").unwrap());
    assert!(!is_simple_reg_ex_ok("n.", "no").unwrap());
    assert!(is_simple_reg_ex_ok("(kg)*", "(kg)brut").unwrap());
    let p = SearchPattern::new("poids*").unwrap();
    assert_eq!(p.prefix(), "poids");
    assert!(p.is_prefix());
}

#[test]
fn test_page_config_from_json() {
    let cfg = PageConfig::from_json_str(r#"{
        "headers": [
            {"id": "city", "search_text": "VILLE", "length": 120},
            {"id": 7, "search_text": "Poids*"}
        ],
        "next_header_margin": -4,
        "min_pixels_for_a_line": 1000,
        "orientation": "landscape"
    }"#).unwrap();
    assert_eq!(cfg.headers.len(), 2);
    assert_eq!(cfg.headers[0].search_text, "ville");
    assert_eq!(cfg.headers[1].id, "7");
    assert_eq!(cfg.headers[1].length, -1);
    assert!(cfg.headers[1].pattern().is_match("poidsbrut"));
    assert_eq!(cfg.next_header_margin, Some(-4));
    assert_eq!(cfg.min_pixels_for_a_line, 1000);
    assert_eq!(cfg.orientation, Some(Orientation::Landscape));

    let minimal = PageConfig::from_json_str(r#"{"headers": []}"#).unwrap();
    assert_eq!(minimal.next_header_margin, None);
    assert_eq!(minimal.min_pixels_for_a_line, 1);

    assert!(matches!(PageConfig::from_json_str("{}"), Err(TableError::Config(_))));
}

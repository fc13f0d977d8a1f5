use std::collections::BTreeMap;
use std::collections::btree_map;
use crate::record::{LineId, RecognitionRecord};

/// Token indices grouped under a tag (a configuration index or a column
/// index). Only the indices take part in the histograms.
pub type IndexGroup = (usize, Vec<usize>);

/// Occurrence counter with ordered keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Counter<K: Ord> {
    counts: BTreeMap<K, i64>,
}

impl<K: Ord> Counter<K> {
    pub fn new() -> Self {
        Self{counts: BTreeMap::new()}
    }

    pub fn add(&mut self, key: K, n: i64) {
        *self.counts.entry(key).or_insert(0) += n;
    }

    pub fn get(&self, key: &K) -> i64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.counts.contains_key(key)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, K, i64> {
        self.counts.iter()
    }

    /// Entries by decreasing count; equal counts keep ascending key order.
    pub fn most_common(&self) -> Vec<(&K, i64)> {
        let mut entries: Vec<(&K, i64)> = self.counts.iter().map(|(k, c)| (k, *c)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }
}

impl<K: Ord> Default for Counter<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord> FromIterator<(K, i64)> for Counter<K> {
    fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
        let mut counter = Self::new();
        for (k, n) in iter {
            counter.add(k, n);
        }
        counter
    }
}

pub fn get_line_tuple_from_index(record: &RecognitionRecord, index: usize) -> LineId {
    record[index].line_id()
}

pub fn is_same_line(record: &RecognitionRecord, index: usize, line: &LineId) -> bool {
    get_line_tuple_from_index(record, index) == *line
}

/// Lowest and highest index of word-level tokens lying on `line`.
///
/// This is recognition order, not geometric order: the first index is
/// not necessarily the leftmost word.
pub fn get_min_max_line_idx(record: &RecognitionRecord, line: &LineId) -> Option<(usize, usize)> {
    let mut min_max: Option<(usize, usize)> = None;
    for (i, t) in record.tokens().iter().enumerate() {
        if !t.is_word() || t.line_id() != *line {
            continue;
        }
        min_max = match min_max {
            None => Some((i, i)),
            Some((min, _)) => Some((min, i)),
        };
    }
    min_max
}

/// The most frequent key, provided its lead over the runner-up is at
/// least `min_diff`. A lone key must itself reach `min_diff`.
pub fn get_best_count<K: Ord + Clone>(counter: &Counter<K>, min_diff: i64) -> Option<K> {
    let common = counter.most_common();
    match common.as_slice() {
        [] => None,
        [(k, c)] => if *c >= min_diff {Some((*k).clone())} else {None},
        [(k0, c0), (_, c1), ..] => if *c0 >= *c1 + min_diff {Some((*k0).clone())} else {None},
    }
}

/// Histogram of the selected tokens by pixel row. Every row a token
/// covers gets one vote, or the token's width when `use_size` is set.
pub fn count_objects_by_rows(record: &RecognitionRecord, groups: &[IndexGroup], use_size: bool) -> Counter<i32> {
    let mut counter = Counter::new();
    for (_, indices) in groups {
        for &i in indices {
            let b = &record[i].bbox;
            let n = if use_size {b.horizontal_span() as i64} else {1};
            for y in b.top..=b.bottom {
                counter.add(y, n);
            }
        }
    }
    tracing::trace!(rows = counter.len(), "horizontal count of selected objects");
    counter
}

/// Bands of contiguous pixel rows whose width-weighted count reaches
/// `threshold`, as sorted `(begin, end)` pairs. A one pixel gap starts
/// a new band. No qualifying row gives no band.
pub fn get_rows_from_selected_rec(record: &RecognitionRecord, groups: &[IndexGroup], threshold: i64) -> Vec<(i32, i32)> {
    let counter = count_objects_by_rows(record, groups, true);
    let mut bands: Vec<(i32, i32)> = Vec::new();
    for (&y, &n) in counter.iter() {
        if n < threshold {
            continue;
        }
        match bands.last_mut() {
            Some((_, end)) if *end + 1 == y => *end = y,
            _ => bands.push((y, y)),
        }
    }
    tracing::debug!(?bands, threshold, "row bands");
    bands
}

#[cfg(test)]
fn test_token(level: i32, line: LineId, bbox: crate::bbox::BBox, text: &str) -> crate::record::Token {
    crate::record::Token{
        level,
        page_num: line.page,
        block_num: line.block,
        par_num: line.par,
        line_num: line.line,
        word_num: 1,
        bbox,
        conf: 90.,
        text: text.to_string(),
    }
}

#[cfg(test)]
fn test_lines_record() -> RecognitionRecord {
    use crate::bbox::BBox;
    let l1 = LineId::new(1, 1, 1, 1);
    let l2 = LineId::new(1, 1, 1, 2);
    RecognitionRecord::new(vec![
        test_token(1, LineId::new(1, 0, 0, 0), BBox::from_tblr(0, 999, 0, 999), ""),
        test_token(4, l1, BBox::from_tblr(10, 20, 10, 200), ""),
        test_token(5, l1, BBox::from_tblr(10, 20, 10, 50), "a"),
        test_token(5, l2, BBox::from_tblr(30, 40, 10, 50), "b"),
        test_token(5, l1, BBox::from_tblr(10, 20, 60, 90), "c"),
        test_token(5, l1, BBox::from_tblr(10, 20, 100, 200), "d"),
    ])
}

#[test]
fn test_lines() {
    let rec = test_lines_record();
    let l1 = LineId::new(1, 1, 1, 1);
    assert_eq!(get_line_tuple_from_index(&rec, 2), l1);
    assert!(is_same_line(&rec, 4, &l1));
    assert!(!is_same_line(&rec, 3, &l1));
    // the line-level token at index 1 is not a word
    assert_eq!(get_min_max_line_idx(&rec, &l1), Some((2, 5)));
    assert_eq!(get_min_max_line_idx(&rec, &LineId::new(1, 1, 1, 2)), Some((3, 3)));
    assert_eq!(get_min_max_line_idx(&rec, &LineId::new(2, 1, 1, 1)), None);
}

#[test]
fn test_best_count() {
    let counter: Counter<&str> = [("red", 5), ("blue", 2), ("green", 3)].into_iter().collect();
    assert_eq!(get_best_count(&counter, 2), Some("red"));
    assert_eq!(get_best_count(&counter, 3), None);

    let single: Counter<&str> = [("red", 5)].into_iter().collect();
    assert_eq!(get_best_count(&single, 5), Some("red"));
    assert_eq!(get_best_count(&single, 6), None);

    assert_eq!(get_best_count(&Counter::<&str>::new(), 0), None);
}

#[test]
fn test_count_objects_by_rows() {
    let rec = test_lines_record();
    let groups = vec![(0, vec![2, 3]), (1, vec![4])];
    let unweighted = count_objects_by_rows(&rec, &groups, false);
    assert_eq!(unweighted.get(&15), 2);
    assert_eq!(unweighted.get(&35), 1);
    assert_eq!(unweighted.get(&25), 0);
    assert_eq!(unweighted.len(), 11 + 11);

    let weighted = count_objects_by_rows(&rec, &groups, true);
    assert_eq!(weighted.get(&10), 41 + 31);
    assert_eq!(weighted.get(&40), 41);
}

#[test]
fn test_rows_from_selected_rec() {
    use crate::bbox::BBox;
    let l = LineId::new(1, 1, 1, 1);
    let rec = RecognitionRecord::new(vec![
        test_token(5, l, BBox::from_tblr(322, 363, 0, 1999), "a"),
        test_token(5, l, BBox::from_tblr(407, 434, 0, 1499), "b"),
        test_token(5, l, BBox::from_tblr(500, 520, 0, 99), "noise"),
        test_token(5, l, BBox::from_tblr(564, 567, 0, 1199), "c"),
        test_token(5, l, BBox::from_tblr(568, 568, 0, 9), "gap"),
        test_token(5, l, BBox::from_tblr(569, 624, 0, 1199), "d"),
    ]);
    let groups: Vec<IndexGroup> = (0..rec.len()).map(|i| (0, vec![i])).collect();
    let bands = get_rows_from_selected_rec(&rec, &groups, 1000);
    assert_eq!(bands, vec![(322, 363), (407, 434), (564, 567), (569, 624)]);

    assert!(get_rows_from_selected_rec(&rec, &groups, 1_000_000).is_empty());
    assert!(get_rows_from_selected_rec(&rec, &[], 1).is_empty());
}

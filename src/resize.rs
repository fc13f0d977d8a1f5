use crate::bbox::BBox;
use crate::config::ConfigHeader;
use crate::headers::{FoundHeader, HeaderLocation, HeaderMatch};
use crate::record::RecognitionRecord;

/// Widens header boxes to the columns they head.
///
/// Each header extends up to the next header's left edge minus `margin`
/// (a negative margin makes neighbours overlap), the last one up to the
/// page's right edge minus `margin`. Boxes only grow here. An unresolved
/// header followed by a resolved one is placed in front of it when its
/// length is configured. Finally, headers with a configured length get
/// their width brought back near that length.
pub fn resize_headers(headers: &mut [HeaderMatch], record: &RecognitionRecord,
                      cfg_headers: &[ConfigHeader], margin: i32) {
    let n = headers.len();
    if n == 0 {
        return;
    }

    for i in 0..n - 1 {
        let next = match headers[i + 1].bbox() {
            Some(b) => *b,
            None => continue,
        };
        let HeaderMatch{name, cfg_index, location} = &mut headers[i];
        match location {
            HeaderLocation::Found(FoundHeader{bbox, ..}) | HeaderLocation::Synthesized(bbox) => {
                tracing::debug!(%name, begin = bbox.left, next_begin = next.left,
                                length = next.left.saturating_sub(bbox.left), "resize from next header");
                let right = bbox.right.max(next.left.saturating_sub(margin));
                bbox.set_right(right);
            },
            HeaderLocation::Unresolved => {
                let length = match cfg_headers.get(*cfg_index) {
                    Some(cfg) if cfg.has_length() => cfg.length,
                    _ => continue,
                };
                let b = BBox::from_tblr(next.top, next.bottom, next.left.saturating_sub(length),
                                        next.left.saturating_sub(margin));
                tracing::debug!(%name, bbox = %b, "new box");
                *location = HeaderLocation::Synthesized(b);
            },
        }
    }

    let page_right = record.get(0).map(|t| t.bbox.right);
    if let (Some(page_right), Some(b)) = (page_right, headers[n - 1].bbox_mut()) {
        let right = b.right.max(page_right.saturating_sub(margin));
        b.set_right(right);
    }

    for m in headers.iter_mut() {
        let length = match cfg_headers.get(m.cfg_index) {
            Some(cfg) if cfg.has_length() => cfg.length,
            _ => continue,
        };
        if let Some(b) = m.bbox_mut() {
            let min_right = b.left.saturating_add(length).saturating_add(1);
            if min_right > b.right || b.left.saturating_add(length).saturating_add(10) < b.right {
                b.set_right(min_right);
            }
        }
    }
}

#[cfg(test)]
use crate::headers::search_headers;
#[cfg(test)]
use crate::testutil::{slip_config, slip_page};

#[cfg(test)]
fn rights(headers: &[HeaderMatch]) -> Vec<Option<i32>> {
    headers.iter().map(|h| h.bbox().map(|b| b.right)).collect()
}

#[test]
fn test_resize_to_next_header() {
    let rec = slip_page();
    let cfg = slip_config(Some(10));
    let headers = search_headers(&rec, &cfg, true);
    assert_eq!(rights(&headers), vec![Some(390), Some(790), Some(1090), Some(1490), Some(2469)]);
    // only the right edge moves
    assert_eq!(headers[0].bbox(), Some(&BBox::from_tblr(200, 229, 100, 390)));

    // no margin configured, no resizing
    let headers = search_headers(&rec, &slip_config(None), true);
    assert_eq!(rights(&headers), vec![Some(179), Some(499), Some(899), Some(1189), Some(1599)]);
}

#[test]
fn test_resize_negative_margin() {
    let rec = slip_page();
    let cfg = slip_config(None);
    let mut headers = search_headers(&rec, &cfg, false);
    resize_headers(&mut headers, &rec, &cfg.headers, -5);
    assert_eq!(rights(&headers), vec![Some(405), Some(805), Some(1105), Some(1505), Some(2484)]);
}

#[test]
fn test_resize_never_shrinks() {
    let rec = slip_page();
    let cfg = slip_config(None);
    let mut headers = search_headers(&rec, &cfg, false);
    // a margin wider than the gaps
    resize_headers(&mut headers, &rec, &cfg.headers, 400);
    assert_eq!(rights(&headers), vec![Some(179), Some(499), Some(899), Some(1189), Some(2079)]);
}

#[test]
fn test_synthesized_header() {
    let rec = slip_page();
    let mut cfg = slip_config(None);
    cfg.headers[1] = ConfigHeader::new("ville", "ville", 200).unwrap();
    let mut headers = search_headers(&rec, &cfg, false);
    headers[1].location = HeaderLocation::Unresolved;

    resize_headers(&mut headers, &rec, &cfg.headers, 10);
    // placed in front of "poids", then brought to its configured length
    assert_eq!(headers[1].location, HeaderLocation::Synthesized(BBox::from_tblr(200, 229, 600, 801)));
    // "date" has no resolved successor
    assert_eq!(headers[0].bbox(), Some(&BBox::from_tblr(200, 229, 100, 179)));
}

#[test]
fn test_unresolved_without_length() {
    let rec = slip_page();
    let cfg = slip_config(None);
    let mut headers = search_headers(&rec, &cfg, false);
    headers[1].location = HeaderLocation::Unresolved;
    headers[4].location = HeaderLocation::Unresolved;

    resize_headers(&mut headers, &rec, &cfg.headers, 10);
    assert_eq!(rights(&headers), vec![Some(179), None, Some(1090), Some(1189), None]);
}

#[test]
fn test_resize_from_configured_length() {
    let rec = slip_page();
    let mut cfg = slip_config(Some(10));
    cfg.headers[2] = ConfigHeader::new("poids", "poids*", 100).unwrap();
    cfg.headers[3] = ConfigHeader::new("colis", "colis", 385).unwrap();
    let headers = search_headers(&rec, &cfg, true);
    // too wide, cut back
    assert_eq!(headers[2].bbox().unwrap().right, 901);
    // within the tolerance, kept
    assert_eq!(headers[3].bbox().unwrap().right, 1490);
}

#[test]
fn test_resize_extreme_values() {
    let rec = slip_page();
    let mut cfg = slip_config(None);
    let mut headers = search_headers(&rec, &cfg, false);
    resize_headers(&mut headers, &rec, &cfg.headers, i32::MIN);
    assert!(rights(&headers).iter().all(|r| *r == Some(i32::MAX)));

    cfg.headers[2] = ConfigHeader::new("poids", "poids*", i32::MAX).unwrap();
    let mut headers = search_headers(&rec, &cfg, false);
    resize_headers(&mut headers, &rec, &cfg.headers, i32::MAX);
    assert_eq!(rights(&headers), vec![Some(179), Some(499), Some(i32::MAX), Some(1189), Some(1599)]);
}

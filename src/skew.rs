use crate::config::PageConfig;
use crate::headers::search_headers;
use crate::record::RecognitionRecord;

/// Rotation, in degrees, under which a page is considered straight.
pub const ROTATION_THRESHOLD: f64 = 0.5;

/// Page skew estimated from the headers line, in degrees.
///
/// The first and the last resolved headers are taken as anchors. Positive
/// angles mean the line goes down to the right. Without two distinct
/// anchors the page is assumed straight.
pub fn get_angle_from_headers_line(record: &RecognitionRecord, config: &PageConfig) -> f64 {
    let headers = search_headers(record, config, false);
    let left = headers.iter().find_map(|h| h.bbox());
    let right = headers.iter().rev().find_map(|h| h.bbox());

    match (left, right) {
        (Some(l), Some(r)) if r.left > l.left => {
            let dy = (r.top - l.top) as f64;
            let dx = (r.left - l.left) as f64;
            dy.atan2(dx).to_degrees()
        },
        _ => 0.,
    }
}

#[cfg(test)]
use crate::record::LineId;
#[cfg(test)]
use crate::testutil::{page_token, slip_config, slip_page, word};

#[cfg(test)]
fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
}

#[test]
fn test_straight_page() {
    assert_close(get_angle_from_headers_line(&slip_page(), &slip_config(Some(10))), 0.);
}

#[test]
fn test_tilted_headers() {
    let l = LineId::new(1, 1, 1, 1);
    let rec = RecognitionRecord::new(vec![
        page_token(),
        word(l, 100, 200, 80, 30, "Date"),
        word(l, 400, 210, 100, 30, "Ville"),
        word(l, 800, 220, 100, 30, "Poids"),
        word(l, 1100, 230, 90, 30, "Colis"),
        word(l, 1500, 240, 100, 30, "Total"),
    ]);
    let angle = get_angle_from_headers_line(&rec, &slip_config(None));
    assert_close(angle, (40f64).atan2(1400.).to_degrees());
    assert!(angle > ROTATION_THRESHOLD);
}

#[test]
fn test_no_anchor() {
    let rec = RecognitionRecord::new(vec![page_token()]);
    assert_close(get_angle_from_headers_line(&rec, &slip_config(None)), 0.);
}

use crate::config::PageConfig;
use crate::error::Result;
use crate::headers::search_headers;
use crate::record::RecognitionRecord;
use crate::rows::get_rows_from_selected_rec;
use crate::skew::{get_angle_from_headers_line, ROTATION_THRESHOLD};
use crate::table::{HeaderLayout, Table};

/// Builds the table of a single page. `None` means no header was found
/// and the page holds no table.
pub fn analyze_page(record: &RecognitionRecord, config: &PageConfig) -> Result<Option<Table>> {
    let headers = search_headers(record, config, true);
    if headers.is_empty() {
        tracing::info!("no headers found, page skipped");
        return Ok(None);
    }
    let resolved = headers.iter().filter(|h| h.is_resolved()).count();
    tracing::debug!(resolved, total = headers.len(), "headers found");

    let mut table = Table::new(&headers, HeaderLayout::Columns);
    let in_columns = table.search_rec_in_headed_columns(record);
    let bands = get_rows_from_selected_rec(record, &in_columns, config.min_pixels_for_a_line);

    for (top, bottom) in bands {
        let indices: Vec<usize> = record.tokens().iter().enumerate()
            .filter(|(_, t)| t.is_word() && t.has_text() && t.bbox.top >= top && t.bbox.bottom <= bottom)
            .map(|(i, _)| i)
            .collect();
        tracing::debug!(top, bottom, ?indices, "row");
        table.add_new_line_from_idx_rec(record, &indices, true)?;
    }

    tracing::info!(rows = table.nb_rows().saturating_sub(1), columns = table.nb_columns(), "table extracted");
    Ok(Some(table))
}

/// Skew of a single page in degrees, see [`get_angle_from_headers_line`].
pub fn estimate_page_skew(record: &RecognitionRecord, config: &PageConfig) -> f64 {
    let angle = get_angle_from_headers_line(record, config);
    if angle.abs() > ROTATION_THRESHOLD {
        tracing::info!(angle, "page needs rotation");
    }
    angle
}

#[cfg(test)]
use crate::testutil::{page_token, slip_config, slip_page};

#[test]
fn test_analyze_page() {
    let table = analyze_page(&slip_page(), &slip_config(Some(10))).unwrap().unwrap();
    assert_eq!(table.nb_rows(), 3);
    assert_eq!(table.get_csv_string(";"),
               "date;ville;poids;colis;total\n12/03;Paris;12,5 kg;3;45\n13/03;Lyon;;7;\n");
}

#[test]
fn test_analyze_page_without_headers() {
    let rec = RecognitionRecord::new(vec![page_token()]);
    assert!(analyze_page(&rec, &slip_config(Some(10))).unwrap().is_none());
}

#[test]
fn test_analyze_page_sparse_rows() {
    // The data rows only gather 330 and 190 width-weighted votes.
    let mut cfg = slip_config(Some(10));
    cfg.min_pixels_for_a_line = 1000;
    let table = analyze_page(&slip_page(), &cfg).unwrap().unwrap();
    assert_eq!(table.nb_rows(), 1);
}

#[test]
fn test_estimate_page_skew() {
    assert_eq!(estimate_page_skew(&slip_page(), &slip_config(None)), 0.);
}

use extract_ocr_page_tables::config::PageConfig;
use extract_ocr_page_tables::error::TableError;
use extract_ocr_page_tables::page::{analyze_page, estimate_page_skew};
use extract_ocr_page_tables::record::RecognitionRecord;

const CONFIG: &str = r#"{
    "headers": [
        {"id": "date", "search_text": "DATE"},
        {"id": "ville", "search_text": "Ville"},
        {"id": "poids", "search_text": "poids*"},
        {"id": "colis", "search_text": "colis"},
        {"id": "total", "search_text": "total", "length": -1}
    ],
    "next_header_margin": 10,
    "min_pixels_for_a_line": 100
}"#;

// (level, page, block, par, line, left, top, width, height, text)
const TOKENS: &[(i32, i32, i32, i32, i32, i32, i32, i32, i32, &str)] = &[
    (1, 1, 0, 0, 0, 0, 0, 2480, 3508, ""),
    (2, 1, 1, 0, 0, 100, 200, 1500, 30, ""),
    (4, 1, 1, 1, 1, 100, 200, 1500, 30, ""),
    (5, 1, 1, 1, 1, 100, 200, 80, 30, "Date"),
    (5, 1, 1, 1, 1, 400, 200, 100, 30, "Ville"),
    (5, 1, 1, 1, 1, 800, 200, 100, 30, "Poids"),
    (5, 1, 1, 1, 1, 1100, 200, 90, 30, "Colis"),
    (5, 1, 1, 1, 1, 1500, 200, 100, 30, "Total"),
    (4, 1, 2, 1, 1, 100, 300, 1460, 30, ""),
    (5, 1, 2, 1, 1, 100, 300, 90, 30, "12/03"),
    (5, 1, 2, 1, 1, 420, 300, 90, 30, "Paris"),
    (5, 1, 2, 1, 1, 820, 300, 60, 30, "12,5"),
    (5, 1, 2, 1, 1, 890, 300, 30, 30, "kg"),
    (5, 1, 2, 1, 1, 1120, 300, 20, 30, "3"),
    (5, 1, 2, 1, 1, 1520, 300, 40, 30, "45"),
    (5, 1, 2, 1, 2, 100, 400, 90, 30, "13/03"),
    (5, 1, 2, 1, 2, 420, 400, 80, 30, "Lyon"),
    (5, 1, 2, 1, 2, 1120, 400, 20, 30, "7"),
    (5, 1, 2, 1, 2, 1300, 400, 20, 30, " "),
    (1, 2, 0, 0, 0, 0, 0, 2480, 3508, ""),
    (5, 2, 1, 1, 1, 100, 100, 200, 30, "Bonjour"),
];

fn tsv() -> String {
    let mut s = String::from("level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext\n");
    for (level, page, block, par, line, left, top, width, height, text) in TOKENS {
        let conf = if *level == 5 {"91.2"} else {"-1"};
        s.push_str(&format!("{}\t{}\t{}\t{}\t{}\t1\t{}\t{}\t{}\t{}\t{}\t{}\r\n",
                            level, page, block, par, line, left, top, width, height, conf, text));
    }
    s
}

#[test]
fn test_multi_page_record() {
    let record = RecognitionRecord::from_tsv(tsv().as_bytes()).unwrap();
    let config = PageConfig::from_json_str(CONFIG).unwrap();
    let pages = record.split_pages();
    assert_eq!(pages.iter().map(|(n, _)| *n).collect::<Vec<_>>(), vec![1, 2]);

    let table = analyze_page(&pages[0].1, &config).unwrap().unwrap();
    assert_eq!(table.nb_columns(), 5);
    assert_eq!(table.get_csv_string(";"),
               "date;ville;poids;colis;total\n12/03;Paris;12,5 kg;3;45\n13/03;Lyon;;7;\n");
    assert_eq!(table.get_csv_string("|").lines().nth(2), Some("13/03|Lyon||7|"));

    assert!(analyze_page(&pages[1].1, &config).unwrap().is_none());
}

#[test]
fn test_page_skew() {
    let record = RecognitionRecord::from_tsv(tsv().as_bytes()).unwrap();
    let config = PageConfig::from_json_str(CONFIG).unwrap();
    let pages = record.split_pages();
    assert_eq!(estimate_page_skew(&pages[0].1, &config), 0.);
    assert_eq!(estimate_page_skew(&pages[1].1, &config), 0.);
}

#[test]
fn test_missing_config_file() {
    match PageConfig::from_path("/nonexistent/page-config.json") {
        Err(TableError::Io(_)) => (),
        other => panic!("unexpected result {:?}", other.map(|c| c.headers.len())),
    }
}

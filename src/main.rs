use std::fs::File;
use std::io::BufReader;
use std::path;
use std::process;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use extract_ocr_page_tables::config::PageConfig;
use extract_ocr_page_tables::error::Result;
use extract_ocr_page_tables::page::{analyze_page, estimate_page_skew};
use extract_ocr_page_tables::record::RecognitionRecord;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(name = "tsv-file", index(1), required = true)]
    tsv_file: path::PathBuf,
    #[arg(name = "config", long, short, required = true)]
    config: path::PathBuf,
    #[arg(name = "delimiter", long, short, default_value = ";")]
    delimiter: String,
    #[arg(name = "skew", long, short)]
    skew: bool,
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = PageConfig::from_path(&cli.config)?;
    let record = RecognitionRecord::from_tsv(BufReader::new(File::open(&cli.tsv_file)?))?;
    tracing::info!(tokens = record.len(), headers = config.headers.len(),
                   orientation = ?config.orientation, "inputs loaded");

    for (page_num, page) in record.split_pages() {
        let _span = tracing::info_span!("page", page_num).entered();
        if cli.skew {
            println!("SKEW {} {:.3}", page_num, estimate_page_skew(&page, &config));
        }
        match analyze_page(&page, &config)? {
            Some(table) => {
                println!("BEGINPAGE {}", page_num);
                print!("{}", table.get_csv_string(&cli.delimiter));
                println!("ENDPAGE");
            },
            None => eprintln!("page {}: no headers found, skipped", page_num),
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

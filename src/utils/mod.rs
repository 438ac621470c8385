pub mod output;

pub use output::{pretty_entities, write_extraction, write_summary, EXTRACTION_FILE_NAME, SUMMARY_FILE_NAME};

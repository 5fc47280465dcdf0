// Pipeline ingestion: raw tabular lead data as read from the input file

pub mod raw_table;

pub use raw_table::RawLeadTable;

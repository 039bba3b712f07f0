pub mod customer_csv_file;

pub use customer_csv_file::CustomerCsvFileSource;

mod source;

pub use source::CsvSource;

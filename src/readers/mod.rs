pub mod archive_reader;
pub mod raw_reader;

pub use archive_reader::{is_zip_archive, ArchiveReader};
pub use raw_reader::RawReader;

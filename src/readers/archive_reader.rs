use crate::error::{PipelineError, Result};
use crate::models::RawRecord;
use crate::readers::RawReader;
use crate::utils::constants::DEFAULT_ZIP_MEMBER;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::TempDir;
use tracing::debug;
use zip::ZipArchive;

/// Reads the hourly CSV straight out of the published dataset archive.
pub struct ArchiveReader {
    member: String,
    use_mmap: bool,
}

impl ArchiveReader {
    pub fn new() -> Self {
        Self {
            member: DEFAULT_ZIP_MEMBER.to_string(),
            use_mmap: false,
        }
    }

    pub fn with_member(mut self, member: impl Into<String>) -> Self {
        self.member = member.into();
        self
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    /// Name of the archive entry that will be read. Matches the exact member name or
    /// any entry whose final path component equals it.
    pub fn find_member(&self, zip_path: &Path) -> Result<String> {
        let archive = ZipArchive::new(File::open(zip_path)?)?;
        let suffix = format!("/{}", self.member);

        let found = archive
            .file_names()
            .find(|name| *name == self.member || name.ends_with(&suffix))
            .map(str::to_string);

        found.ok_or_else(|| {
            PipelineError::MissingData(format!(
                "'{}' not found in archive '{}'",
                self.member,
                zip_path.display()
            ))
        })
    }

    pub fn read_archive(&self, zip_path: &Path) -> Result<Vec<RawRecord>> {
        let member = self.find_member(zip_path)?;
        let mut archive = ZipArchive::new(File::open(zip_path)?)?;
        let mut entry = archive.by_name(&member)?;

        // Extracted copy lives only as long as the read
        let temp_dir = TempDir::new()?;
        let dest_path = temp_dir.path().join(&self.member);
        {
            let mut writer = BufWriter::new(File::create(&dest_path)?);
            std::io::copy(&mut entry, &mut writer)?;
            writer.flush()?;
        }
        debug!("Extracted {} to {}", member, dest_path.display());

        RawReader::new()
            .with_mmap(self.use_mmap)
            .read_path(&dest_path)
    }
}

impl Default for ArchiveReader {
    fn default() -> Self {
        Self::new()
    }
}

/// True when the path looks like a zip archive rather than a bare CSV.
pub fn is_zip_archive(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("zip"))
        .unwrap_or(false)
}

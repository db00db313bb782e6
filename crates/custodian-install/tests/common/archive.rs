//! In-memory release archives

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Builds a zip with one top-level directory
pub struct ArchiveBuilder {
    top_level: String,
    files: Vec<(String, Vec<u8>)>,
    directory_entry: bool,
}

impl ArchiveBuilder {
    pub fn new(top_level: &str) -> Self {
        Self {
            top_level: top_level.to_string(),
            files: Vec::new(),
            directory_entry: true,
        }
    }

    /// Add a file below the top-level directory
    pub fn file(mut self, path: &str, content: impl AsRef<[u8]>) -> Self {
        self.files.push((path.to_string(), content.as_ref().to_vec()));
        self
    }

    /// Add a `manifest.json` reporting `version`
    pub fn manifest(self, name: &str, version: &str) -> Self {
        let manifest = format!(r#"{{"domain": "foo", "name": "{}", "version": "{}"}}"#, name, version);
        self.file("manifest.json", manifest)
    }

    /// Leave out the explicit directory entry, as some zip tools do
    pub fn without_directory_entry(mut self) -> Self {
        self.directory_entry = false;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        if self.directory_entry {
            writer
                .add_directory(format!("{}/", self.top_level), options)
                .unwrap();
        }

        for (path, content) in &self.files {
            writer
                .start_file(format!("{}/{}", self.top_level, path), options)
                .unwrap();
            writer.write_all(content).unwrap();
        }

        writer.finish().unwrap().into_inner()
    }
}

/// Archive of `foo` at `version`, with a manifest and one module
pub fn component_archive(version: &str) -> Vec<u8> {
    ArchiveBuilder::new(&format!("foo-{}", version))
        .manifest("Foo", version)
        .file("__init__.py", "VERSION = 1\n")
        .file("translations/en.json", "{}")
        .build()
}

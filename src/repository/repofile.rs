// src/repository/repofile.rs

//! Package manager repository file
//!
//! INI text with one section per repository and raw `key=value` lines:
//!
//! ```text
//! [example-11-baseos-rpms]
//! name=Example OS BaseOS
//! baseurl=https://cdn.example.com/content/dist/example11/$releasever/x86_64/baseos/os
//! enabled=1
//! ...
//! ```

use crate::error::{Error, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Comment written at the top of every generated file
const HEADER: &str = "# Certificate-based repositories managed by entitled\n\
                      # Changes are overwritten on the next refresh\n";

/// One `[id]` section with its keys in insertion order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSection {
    pub id: String,
    entries: Vec<(String, String)>,
}

impl RepoSection {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entries: Vec::new(),
        }
    }

    /// Set a key, replacing its value in place when already present
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// An ordered collection of repository sections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoFile {
    sections: Vec<RepoSection>,
}

impl RepoFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sections(&self) -> &[RepoSection] {
        &self.sections
    }

    pub fn section(&self, id: &str) -> Option<&RepoSection> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Add a section; one with the same id is replaced where it stands
    pub fn add_section(&mut self, section: RepoSection) {
        match self.sections.iter_mut().find(|s| s.id == section.id) {
            Some(existing) => {
                warn!("Repository '{}' defined twice, keeping the later definition", section.id);
                *existing = section;
            }
            None => self.sections.push(section),
        }
    }

    /// Render as INI text
    pub fn render(&self) -> String {
        let mut out = String::from(HEADER);
        for section in &self.sections {
            let _ = write!(out, "\n[{}]\n", section.id);
            for (key, value) in section.entries() {
                let _ = writeln!(out, "{key}={value}");
            }
        }
        out
    }

    /// Parse INI text
    ///
    /// Comments (`#`, `;`) and blank lines are ignored. Keys before the
    /// first section header are rejected.
    pub fn parse(text: &str) -> Result<Self> {
        let mut file = Self::new();
        let mut current: Option<RepoSection> = None;

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(id) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                if let Some(section) = current.take() {
                    file.add_section(section);
                }
                current = Some(RepoSection::new(id.trim()));
                continue;
            }

            let (key, value) = line.split_once('=').ok_or_else(|| {
                Error::ParseError(format!("Line {}: expected key=value", index + 1))
            })?;
            let section = current.as_mut().ok_or_else(|| {
                Error::ParseError(format!("Line {}: key outside of a section", index + 1))
            })?;
            section.set(key.trim(), value.trim());
        }

        if let Some(section) = current {
            file.add_section(section);
        }
        Ok(file)
    }

    /// Overwrite `path` with the rendered file
    ///
    /// The write replaces the whole file but is not atomic.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    Error::WriteError(format!("Failed to create directory {}: {e}", parent.display()))
                })?;
            }
        }

        fs::write(path, self.render())
            .map_err(|e| Error::WriteError(format!("Failed to write {}: {e}", path.display())))?;

        info!(
            "Wrote {} repositories to {}",
            self.sections.len(),
            path.display()
        );
        Ok(())
    }

    /// Read and parse an existing file
    pub fn read(path: &Path) -> Result<Self> {
        debug!("Reading repository file {}", path.display());
        let text = fs::read_to_string(path)
            .map_err(|e| Error::IoError(format!("Failed to read {}: {e}", path.display())))?;
        Self::parse(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_set_replaces_in_place() {
        let mut section = RepoSection::new("baseos");
        section.set("name", "BaseOS");
        section.set("enabled", "1");
        section.set("name", "Renamed");

        let entries: Vec<_> = section.entries().collect();
        assert_eq!(entries, vec![("name", "Renamed"), ("enabled", "1")]);
    }

    #[test]
    fn test_render_empty() {
        let file = RepoFile::new();
        assert_eq!(file.render(), HEADER);
        assert!(RepoFile::parse(&file.render()).unwrap().is_empty());
    }

    #[test]
    fn test_render_sections() {
        let mut file = RepoFile::new();
        let mut section = RepoSection::new("baseos");
        section.set("name", "BaseOS");
        section.set("enabled", "1");
        file.add_section(section);

        let rendered = file.render();
        assert!(rendered.ends_with("\n[baseos]\nname=BaseOS\nenabled=1\n"));
    }

    #[test]
    fn test_add_section_replaces_duplicate_in_place() {
        let mut file = RepoFile::new();
        file.add_section(RepoSection::new("a"));
        file.add_section(RepoSection::new("b"));
        let mut replacement = RepoSection::new("a");
        replacement.set("name", "second");
        file.add_section(replacement);

        let ids: Vec<&str> = file.sections().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(file.section("a").unwrap().get("name"), Some("second"));
    }

    #[test]
    fn test_parse() {
        let text = "# comment\n\n[one]\nname = One\nbaseurl=https://x/$releasever\n; note\n[two]\nenabled=0\n";
        let file = RepoFile::parse(text).unwrap();
        assert_eq!(file.sections().len(), 2);
        assert_eq!(file.section("one").unwrap().get("name"), Some("One"));
        assert_eq!(file.section("one").unwrap().get("baseurl"), Some("https://x/$releasever"));
        assert_eq!(file.section("two").unwrap().get("enabled"), Some("0"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(RepoFile::parse("name=orphan\n").is_err());
        assert!(RepoFile::parse("[a]\nnot a pair\n").is_err());
    }

    #[test]
    fn test_write_unwritable_destination() {
        let temp_dir = tempfile::tempdir().unwrap();
        // Destination is an existing directory
        let result = RepoFile::new().write(temp_dir.path());
        assert!(matches!(result, Err(Error::WriteError(_))));
    }

    #[test]
    fn test_write_creates_parent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("yum.repos.d/entitled.repo");
        RepoFile::new().write(&path).unwrap();
        assert_eq!(RepoFile::read(&path).unwrap(), RepoFile::new());
    }
}

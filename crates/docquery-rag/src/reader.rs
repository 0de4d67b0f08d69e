//! Directory reader for source documents

use chrono::{DateTime, Local};
use pulldown_cmark::{Event, Parser, TagEnd};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use docquery_core::{Document, Error, Result};

/// Size and content hash of one source file, used to detect a stale index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFingerprint {
    pub path: String,
    pub size: u64,
    pub md5: String,
}

/// Reads every file of a directory into [`Document`]s
#[derive(Debug, Clone)]
pub struct SimpleDirectoryReader {
    input_dir: PathBuf,
    recursive: bool,
    exclude_hidden: bool,
    required_exts: Option<Vec<String>>,
}

impl SimpleDirectoryReader {
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            recursive: false,
            exclude_hidden: true,
            required_exts: None,
        }
    }

    /// Descend into subdirectories
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Only read files with one of these extensions (with or without the leading dot)
    pub fn required_exts<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.required_exts = Some(
            exts.into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
        );
        self
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    /// List the files that would be loaded, sorted by path
    pub fn list_files(&self) -> Result<Vec<PathBuf>> {
        if !self.input_dir.is_dir() {
            return Err(Error::DocumentIndexer(format!(
                "Directory {} does not exist",
                self.input_dir.display()
            )));
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let exclude_hidden = self.exclude_hidden;

        let mut files = Vec::new();
        let walker = WalkDir::new(&self.input_dir)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !(exclude_hidden && is_hidden(entry)));

        for entry in walker {
            let entry = entry.map_err(|e| Error::DocumentIndexer(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            if !self.extension_allowed(entry.path()) {
                continue;
            }
            files.push(entry.into_path());
        }

        if files.is_empty() {
            return Err(Error::DocumentIndexer(format!(
                "No files found in {}",
                self.input_dir.display()
            )));
        }

        Ok(files)
    }

    /// Read all files into documents
    pub fn load_data(&self) -> Result<Vec<Document>> {
        let files = self.list_files()?;
        let mut documents = Vec::with_capacity(files.len());

        for path in files {
            let bytes = fs::read(&path)?;
            let text = extract_text(&path, &bytes);
            let fs_meta = fs::metadata(&path)?;

            let last_modified = fs_meta
                .modified()
                .ok()
                .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d").to_string());

            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();

            let file_path = path.to_string_lossy().to_string();

            documents.push(Document {
                id: file_path.clone(),
                text,
                metadata: json!({
                    "file_path": file_path,
                    "file_name": file_name,
                    "file_type": file_type(&path),
                    "file_size": fs_meta.len(),
                    "last_modified_date": last_modified,
                }),
            });
        }

        tracing::info!(
            dir = %self.input_dir.display(),
            documents = documents.len(),
            "loaded source documents"
        );
        Ok(documents)
    }

    /// Fingerprint the files that would be loaded, without extracting text
    pub fn fingerprint(&self) -> Result<Vec<SourceFingerprint>> {
        self.list_files()?
            .into_iter()
            .map(|path| -> Result<SourceFingerprint> {
                let bytes = fs::read(&path)?;
                let relative = path.strip_prefix(&self.input_dir).unwrap_or(&path);
                Ok(SourceFingerprint {
                    path: relative.to_string_lossy().replace('\\', "/"),
                    size: bytes.len() as u64,
                    md5: format!("{:x}", md5::compute(&bytes)),
                })
            })
            .collect()
    }

    fn extension_allowed(&self, path: &Path) -> bool {
        match &self.required_exts {
            None => true,
            Some(exts) => extension(path).is_some_and(|ext| exts.contains(&ext)),
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|s| s.starts_with('.'))
}

fn extension(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_lowercase())
}

fn file_type(path: &Path) -> &'static str {
    match extension(path).as_deref() {
        Some("md") | Some("markdown") => "text/markdown",
        Some("html") | Some("htm") => "text/html",
        Some("txt") => "text/plain",
        Some("json") => "application/json",
        Some("csv") => "text/csv",
        _ => "application/octet-stream",
    }
}

/// Plain text of a file, based on its extension
fn extract_text(path: &Path, bytes: &[u8]) -> String {
    let raw = String::from_utf8_lossy(bytes);
    match extension(path).as_deref() {
        Some("md") | Some("markdown") => markdown_to_text(&raw),
        Some("html") | Some("htm") => html_to_text(&raw),
        _ => raw.into_owned(),
    }
}

fn markdown_to_text(markdown: &str) -> String {
    let mut text = String::new();

    for event in Parser::new(markdown) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak => text.push('\n'),
            Event::End(TagEnd::Paragraph)
            | Event::End(TagEnd::Heading(_))
            | Event::End(TagEnd::CodeBlock) => text.push_str("\n\n"),
            Event::End(TagEnd::Item) => text.push('\n'),
            _ => {}
        }
    }

    text.trim().to_string()
}

fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let words: Vec<&str> = match Selector::parse("body") {
        Ok(selector) => match document.select(&selector).next() {
            Some(body) => body.text().flat_map(str::split_whitespace).collect(),
            None => document.root_element().text().flat_map(str::split_whitespace).collect(),
        },
        Err(_) => document.root_element().text().flat_map(str::split_whitespace).collect(),
    };

    words.join(" ")
}

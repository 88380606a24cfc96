//! Newline-separated list persistence (favorites, last query).

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::StoreError;

pub trait LineStore: Send + Sync + Debug {
    /// Load all non-blank lines, trimmed. A missing backing file is an empty list.
    fn load(&self) -> Result<Vec<String>, StoreError>;

    fn save(&self, lines: &[String]) -> Result<(), StoreError>;

    /// First stored line, or an empty string.
    fn load_single(&self) -> Result<String, StoreError> {
        Ok(self.load()?.into_iter().next().unwrap_or_default())
    }

    fn save_single(&self, value: &str) -> Result<(), StoreError> {
        self.save(&[value.to_string()])
    }
}

#[derive(Debug, Clone)]
pub struct FileLineStore {
    path: PathBuf,
}

impl FileLineStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LineStore for FileLineStore {
    fn load(&self) -> Result<Vec<String>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents =
            std::fs::read_to_string(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        Ok(parse_lines(&contents))
    }

    fn save(&self, lines: &[String]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let mut contents = String::new();
        for line in lines {
            contents.push_str(line);
            contents.push('\n');
        }
        std::fs::write(&self.path, contents).map_err(|e| StoreError::io(&self.path, e))
    }
}

fn parse_lines(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Default)]
pub struct MemoryLineStore {
    lines: Mutex<Vec<String>>,
}

impl MemoryLineStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            lines: Mutex::new(lines.into_iter().map(str::to_string).collect()),
        }
    }
}

impl LineStore for MemoryLineStore {
    fn load(&self) -> Result<Vec<String>, StoreError> {
        Ok(parse_lines(&self.lines.lock().join("\n")))
    }

    fn save(&self, lines: &[String]) -> Result<(), StoreError> {
        *self.lines.lock() = lines.to_vec();
        Ok(())
    }
}

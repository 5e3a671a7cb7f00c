//! Label graph for a main source file and its includes.
//!
//! Definition and usage sites are stored as packed integers, file index in
//! the high bits and line number in the low 24 bits.  The graph is built
//! from scratch by the workspace scanner and published as a snapshot, so
//! query methods never see a partially built map.

use std::collections::{HashMap,HashSet,BTreeMap};
use std::path::{Path,PathBuf};

/// Pack a file index and line number into one identifier.
pub fn make_id(file_id: usize, line_number: usize) -> u32 {
    ((file_id as u32) << 24) | (line_number as u32 & 0xFFFFFF)
}

/// Line number encoded in an identifier.
pub fn line_number(id: u32) -> usize {
    (id & 0xFFFFFF) as usize
}

/// File index encoded in an identifier.
pub fn file_id(id: u32) -> usize {
    (id >> 24) as usize
}

/// The main file is always file index 0.
pub fn is_from_main_file(id: u32) -> bool {
    id <= 0xFFFFFF
}

/// An include directive that could not be resolved to a file.
#[derive(Debug,Clone,PartialEq)]
pub struct UnresolvedInclude {
    pub include_filename: String,
    /// path that was tried
    pub path: PathBuf,
    pub source_filename: String,
    pub line_number: usize
}

/// Multimaps from label text to definition and usage sites.  Keys are
/// fully qualified, a local label `.x` under global `F` is stored as `F.x`.
pub struct LabelGraph {
    files: Vec<PathBuf>,
    def_at: HashMap<String,HashSet<u32>>,
    proto_def_at: HashMap<String,HashSet<u32>>,
    used_at: HashMap<String,HashSet<u32>>,
    pub undefined_includes: Vec<UnresolvedInclude>
}

impl LabelGraph {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            def_at: HashMap::new(),
            proto_def_at: HashMap::new(),
            used_at: HashMap::new(),
            undefined_includes: Vec::new()
        }
    }
    /// Register a file and get its index.  The main file must be added
    /// first so that it lands at index 0.
    pub fn add_file(&mut self, path: &Path) -> usize {
        self.files.push(path.to_path_buf());
        self.files.len() - 1
    }
    pub fn file(&self, file_id: usize) -> Option<&PathBuf> {
        self.files.get(file_id)
    }
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
    pub fn add_def(&mut self, label: &str, id: u32) {
        self.def_at.entry(label.to_string()).or_insert_with(HashSet::new).insert(id);
    }
    /// A PROTO definition, kept apart so it does not clash with a
    /// like-named PROC.
    pub fn add_proto_def(&mut self, label: &str, id: u32) {
        self.proto_def_at.entry(label.to_string()).or_insert_with(HashSet::new).insert(id);
    }
    pub fn add_usage(&mut self, label: &str, id: u32) {
        self.used_at.entry(label.to_string()).or_insert_with(HashSet::new).insert(id);
    }
    pub fn has_label(&self, label: &str) -> bool {
        self.def_at.contains_key(label) || self.proto_def_at.contains_key(label)
    }
    pub fn has_label_clash(&self, label: &str) -> bool {
        match self.def_at.get(label) {
            Some(ids) => ids.len() > 1,
            None => false
        }
    }
    /// Sorted identifiers of every definition of this label.
    pub fn def_linenumbers(&self, label: &str) -> Vec<u32> {
        let mut ans: Vec<u32> = match self.def_at.get(label) {
            Some(ids) => ids.iter().copied().collect(),
            None => Vec::new()
        };
        ans.sort();
        ans
    }
    /// Sorted identifiers of every usage of this label.
    pub fn usage_linenumbers(&self, label: &str) -> Vec<u32> {
        let mut ans: Vec<u32> = match self.used_at.get(label) {
            Some(ids) => ids.iter().copied().collect(),
            None => Vec::new()
        };
        ans.sort();
        ans
    }
    /// Labels with two or more definition sites, with their sorted sites.
    pub fn clashes(&self) -> BTreeMap<String,Vec<u32>> {
        let mut ans = BTreeMap::new();
        for (label,ids) in &self.def_at {
            if ids.len() > 1 {
                let mut sorted: Vec<u32> = ids.iter().copied().collect();
                sorted.sort();
                ans.insert(label.clone(),sorted);
            }
        }
        ans
    }
    /// Labels used but never defined, with their sorted usage sites.
    pub fn undefined(&self) -> BTreeMap<String,Vec<u32>> {
        let mut ans = BTreeMap::new();
        for (label,ids) in &self.used_at {
            if !self.def_at.contains_key(label) && !self.proto_def_at.contains_key(label) {
                let mut sorted: Vec<u32> = ids.iter().copied().collect();
                sorted.sort();
                ans.insert(label.clone(),sorted);
            }
        }
        ans
    }
    pub fn label_count(&self) -> usize {
        self.def_at.len() + self.proto_def_at.len()
    }
}

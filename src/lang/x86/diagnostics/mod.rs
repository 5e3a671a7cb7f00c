//! x86 diagnostics module.
//!
//! Turns label graph results for a main document and its includes into
//! `lsp_types::Diagnostic` values keyed by file.  Severities come from the
//! settings; a flag set to ignore suppresses that class entirely.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use lsp_types as lsp;
use lsp_types::{Diagnostic,DiagnosticSeverity};
use labels::LabelGraph;
use workspace::WorkspaceScanner;
use super::handbook::mnemonics::MnemonicStore;
use super::settings::Settings;
use super::tokenizer;
use crate::STDRESULT;

pub mod labels;
pub mod workspace;

pub fn basic_diag(range: lsp::Range, mess: &str, severity: DiagnosticSeverity) -> Diagnostic {
    Diagnostic {
        range,
        severity: Some(severity),
        code: None,
        code_description: None,
        source: None,
        message: mess.to_string(),
        related_information: None,
        tags: None,
        data: None
    }
}

/// Cache of file lines used while mapping graph identifiers back to ranges.
struct LineCache {
    lines: HashMap<usize,Vec<String>>
}

impl LineCache {
    fn new() -> Self {
        Self { lines: HashMap::new() }
    }
    fn line(&mut self, graph: &LabelGraph, id: u32) -> Option<String> {
        let fid = labels::file_id(id);
        if !self.lines.contains_key(&fid) {
            let path = graph.file(fid)?;
            let txt = std::fs::read_to_string(path).ok()?;
            self.lines.insert(fid,txt.lines().map(|s| s.to_string()).collect());
        }
        self.lines.get(&fid)?.get(labels::line_number(id)).cloned()
    }
}

/// Range of the keyword matching `label` on the identified line, or the
/// whole line when it cannot be found.  Local keys match on their `.x` tail.
fn label_range(cache: &mut LineCache, graph: &LabelGraph, id: u32, label: &str) -> lsp::Range {
    let row = labels::line_number(id) as u32;
    let line = match cache.line(graph,id) {
        Some(l) => l,
        None => return lsp::Range::new(lsp::Position::new(row,0),lsp::Position::new(row,0))
    };
    for span in tokenizer::split_into_keyword_pos(&line) {
        let word = tokenizer::keyword(span,&line);
        if word == label || (word.starts_with('.') && label.ends_with(word)) {
            return lsp::Range::new(
                lsp::Position::new(row,span.0 as u32),
                lsp::Position::new(row,span.1 as u32));
        }
    }
    lsp::Range::new(lsp::Position::new(row,0),lsp::Position::new(row,line.len() as u32))
}

/// Produces label diagnostics for a main file and its includes.
pub struct Analyzer {
    config: Settings,
    store: Arc<MnemonicStore>,
    /// map from file path display string to its diagnostics
    diagnostic_set: HashMap<String,Vec<Diagnostic>>
}

impl Analyzer {
    pub fn new(config: Settings) -> Self {
        let store = Arc::new(MnemonicStore::new(config.flavor));
        Self {
            config,
            store,
            diagnostic_set: HashMap::new()
        }
    }
    pub fn update_config(&mut self, json_str: &str) -> STDRESULT {
        let config = super::settings::parse(json_str)?;
        if config.flavor != self.config.flavor {
            self.store = Arc::new(MnemonicStore::new(config.flavor));
        }
        self.config = config;
        Ok(())
    }
    pub fn get_store(&self) -> Arc<MnemonicStore> {
        Arc::clone(&self.store)
    }
    fn push(&mut self, file: String, diag: Diagnostic) {
        match self.diagnostic_set.get_mut(&file) {
            Some(v) => v.push(diag),
            None => {
                self.diagnostic_set.insert(file,vec![diag]);
            }
        }
    }
    /// Scan the main file and its includes, then compute label clash,
    /// undefined label, and unresolved include diagnostics.
    pub fn analyze(&mut self, main: &Path) -> STDRESULT {
        self.diagnostic_set = HashMap::new();
        let mut scanner = WorkspaceScanner::new(Arc::clone(&self.store),self.config.flavor);
        scanner.set_max_files(self.config.workspace.max_files.max(0) as usize);
        let graph = scanner.build(main);
        let mut cache = LineCache::new();
        if let Some(severity) = self.config.flag.label_clashes {
            for (label,ids) in graph.clashes() {
                for id in ids {
                    let rng = label_range(&mut cache,&graph,id,&label);
                    let file = match graph.file(labels::file_id(id)) {
                        Some(p) => p.display().to_string(),
                        None => continue
                    };
                    self.push(file,basic_diag(rng,&format!("label `{}` is defined more than once",label),severity));
                }
            }
        }
        if let Some(severity) = self.config.flag.undefined_labels {
            for (label,ids) in graph.undefined() {
                for id in ids {
                    let rng = label_range(&mut cache,&graph,id,&label);
                    let file = match graph.file(labels::file_id(id)) {
                        Some(p) => p.display().to_string(),
                        None => continue
                    };
                    self.push(file,basic_diag(rng,&format!("label `{}` is never defined",label),severity));
                }
            }
        }
        if let Some(severity) = self.config.flag.unresolved_includes {
            for inc in graph.undefined_includes.clone() {
                let row = inc.line_number as u32;
                let rng = lsp::Range::new(lsp::Position::new(row,0),lsp::Position::new(row,0));
                self.push(inc.source_filename.clone(),
                    basic_diag(rng,&format!("cannot resolve include `{}`",inc.include_filename),severity));
            }
        }
        Ok(())
    }
    pub fn get_diags(&self, path: &Path) -> Vec<Diagnostic> {
        if let Some(diags) = self.diagnostic_set.get(&path.display().to_string()) {
            return diags.clone();
        }
        Vec::new()
    }
    pub fn err_warn_info_counts(&self) -> [usize;3] {
        let mut err = 0;
        let mut warn = 0;
        let mut info = 0;
        for diag in self.diagnostic_set.values() {
            for item in diag {
                match item.severity {
                    Some(DiagnosticSeverity::ERROR) => err += 1,
                    Some(DiagnosticSeverity::WARNING) => warn += 1,
                    Some(DiagnosticSeverity::INFORMATION) => info += 1,
                    _ => {}
                }
            }
        }
        [err,warn,info]
    }
}

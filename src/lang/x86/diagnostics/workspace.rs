//! Workspace scanning and label graph rebuilds.
//!
//! The scanner walks a main file and every file reachable through include
//! directives, building a fresh `LabelGraph`.  The engine wraps the scanner
//! for live use: rebuilds run on a worker thread, at most one in flight,
//! requests arriving meanwhile coalesce into a single followup pass.  The
//! finished graph is published by swapping an `Arc`, so readers always see
//! a coherent snapshot.

use std::collections::HashSet;
use std::path::{Path,PathBuf};
use std::sync::{Arc,Mutex};
use log::{trace,debug,info,warn,error};
use super::labels::{self,LabelGraph,UnresolvedInclude};
use super::super::handbook::mnemonics::MnemonicStore;
use super::super::settings::Settings;
use super::super::tokenizer;
use super::super::{AssemblerFlavor,AsmTokenType,RCH};

/// Strip the `[..]`, `".."`, or `'..'` wrapping from an include filename.
fn strip_include_filename(raw: &str) -> String {
    let t = raw.trim();
    if t.len() >= 2 &&
        ((t.starts_with('[') && t.ends_with(']')) ||
         (t.starts_with('"') && t.ends_with('"')) ||
         (t.starts_with('\'') && t.ends_with('\''))) {
        t[1..t.len()-1].trim().to_string()
    } else {
        t.to_string()
    }
}

/// Qualify a local label with the enclosing global label.
fn qualify(label: &str, curr_global: &Option<String>) -> String {
    if label.starts_with('.') {
        match curr_global {
            Some(g) => format!("{}{}",g,label),
            None => label.to_string()
        }
    } else {
        label.to_string()
    }
}

/// Buffer all workspace sources matching `**/*.{asm,s,inc}` under `dir`,
/// case insensitively, up to `max_files`.
pub fn gather_docs(dir: &Path, max_files: usize) -> Vec<PathBuf> {
    let mut ans = Vec::new();
    let opt = glob::MatchOptions {
        case_sensitive: false,
        require_literal_leading_dot: false,
        require_literal_separator: false
    };
    debug!("scanning {}",dir.display());
    for ext in ["asm","s","inc"] {
        let patt = dir.join("**").join(format!("*.{}",ext));
        let globable = match patt.as_os_str().to_str() {
            Some(g) => g.to_string(),
            None => {
                warn!("directory {} could not be globbed",dir.display());
                return ans;
            }
        };
        if let Ok(paths) = glob::glob_with(&globable,opt) {
            for entry in paths {
                if let Ok(path) = entry {
                    if ans.len() >= max_files {
                        warn!("workspace scan stopped at {} files",max_files);
                        return ans;
                    }
                    trace!("{}",path.display());
                    ans.push(path);
                }
            }
        }
    }
    info!("there were {} sources in the workspace",ans.len());
    ans
}

/// Builds a label graph from a main file, following includes.
#[derive(Clone)]
pub struct WorkspaceScanner {
    store: Arc<MnemonicStore>,
    flavor: AssemblerFlavor,
    max_files: usize
}

impl WorkspaceScanner {
    pub fn new(store: Arc<MnemonicStore>, flavor: AssemblerFlavor) -> Self {
        Self { store, flavor, max_files: 1000 }
    }
    /// Cap on the number of files one build will scan.
    pub fn set_max_files(&mut self, max_files: usize) {
        self.max_files = max_files;
    }
    /// Scan the main file and everything it includes into a fresh graph.
    /// Missing includes are recorded, never fatal; a visited set guards
    /// against include cycles.
    pub fn build(&self, main: &Path) -> LabelGraph {
        let mut graph = LabelGraph::new();
        let mut visited: HashSet<PathBuf> = HashSet::new();
        self.scan_file(&mut graph,main,&mut visited);
        info!("label graph has {} files and {} labels",graph.files().len(),graph.label_count());
        graph
    }
    /// If this line is an include directive, return the stripped filename
    /// and the path to try, resolved against the including file's directory.
    fn include_target(&self, line: &str, from: &Path) -> Option<(String,PathBuf)> {
        let cut = match tokenizer::get_remark_pos(line) {
            Some((b,_)) => &line[..b],
            None => line
        };
        let pos = tokenizer::split_into_keyword_pos(cut);
        // the directive may lead the line or follow a label; INCLUDELIB
        // names a library, not a source file, and is left to the tokenizer
        for span in pos.iter().take(2) {
            let word = tokenizer::keyword(*span,cut).to_ascii_uppercase();
            if matches!(word.as_str(),"INCLUDE" | "%INCLUDE") {
                let raw = cut[span.1..].trim();
                if raw.len() == 0 {
                    return None;
                }
                let name = strip_include_filename(raw);
                let dir = from.parent().unwrap_or(Path::new("."));
                let target = dir.join(&name);
                return Some((name,target));
            }
        }
        None
    }
    fn scan_file(&self, graph: &mut LabelGraph, path: &Path, visited: &mut HashSet<PathBuf>) {
        let canon = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if !visited.insert(canon) {
            debug!("skipping already visited {}",path.display());
            return;
        }
        if graph.files().len() >= self.max_files {
            warn!("scan stopped at {} files, skipping {}",self.max_files,path.display());
            return;
        }
        let txt = match std::fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) => {
                error!("could not read {}: {}",path.display(),e);
                return;
            }
        };
        let file_id = graph.add_file(path);
        let mut curr_global: Option<String> = None;
        let mut pending: Vec<PathBuf> = Vec::new();
        for (row,line) in txt.lines().enumerate() {
            let id = labels::make_id(file_id,row);
            if let Some((name,target)) = self.include_target(line,path) {
                if target.is_file() {
                    pending.push(target);
                } else {
                    warn!("cannot resolve include `{}` at {}:{}",name,path.display(),row);
                    graph.undefined_includes.push(UnresolvedInclude {
                        include_filename: name,
                        path: target,
                        source_filename: path.display().to_string(),
                        line_number: row
                    });
                }
                continue;
            }
            let tokens = tokenizer::classify(line,&self.store,self.flavor);
            for (span,typ) in &tokens {
                let word = tokenizer::keyword(*span,line);
                match typ {
                    AsmTokenType::LabelDef => {
                        let key = qualify(word,&curr_global);
                        trace!("label def `{}` at {}:{}",key,path.display(),row);
                        graph.add_def(&key,id);
                        if !word.starts_with('.') {
                            curr_global = Some(word.to_string());
                        }
                    },
                    AsmTokenType::LabelDefProto => {
                        graph.add_proto_def(&qualify(word,&curr_global),id);
                    },
                    AsmTokenType::Label => {
                        graph.add_usage(&qualify(word,&curr_global),id);
                    },
                    _ => {}
                }
            }
            // EXTRN name:type, EXTERN name, GLOBAL name, PUBLIC name all
            // declare the name
            for k in 1..tokens.len() {
                let prev = tokenizer::keyword(tokens[k-1].0,line).to_ascii_uppercase();
                if matches!(prev.as_str(),"EXTRN" | "EXTERN" | "GLOBAL" | "PUBLIC") {
                    let word = tokenizer::keyword(tokens[k].0,line);
                    if word.len() > 0 {
                        graph.add_def(&qualify(word,&curr_global),id);
                    }
                }
            }
        }
        for target in pending {
            self.scan_file(graph,&target,visited);
        }
    }
}

struct RebuildFlags {
    running: bool,
    queued: bool
}

type Observer = Box<dyn Fn(&LabelGraph) + Send>;

/// Live label graph for one main file.  Queries read the last published
/// snapshot; `request_rebuild` runs the scanner off thread with coalescing.
pub struct LabelGraphEngine {
    scanner: WorkspaceScanner,
    main: PathBuf,
    live: bool,
    snapshot: Arc<Mutex<Arc<LabelGraph>>>,
    flags: Arc<Mutex<RebuildFlags>>,
    observers: Arc<Mutex<Vec<Observer>>>
}

impl LabelGraphEngine {
    pub fn new(store: Arc<MnemonicStore>, config: &Settings, main: &Path) -> Self {
        let mut scanner = WorkspaceScanner::new(store,config.flavor);
        scanner.set_max_files(config.workspace.max_files.max(0) as usize);
        Self {
            scanner,
            main: main.to_path_buf(),
            live: config.workspace.live,
            snapshot: Arc::new(Mutex::new(Arc::new(LabelGraph::new()))),
            flags: Arc::new(Mutex::new(RebuildFlags { running: false, queued: false })),
            observers: Arc::new(Mutex::new(Vec::new()))
        }
    }
    /// Last published graph.  Never a partial build.
    pub fn snapshot(&self) -> Arc<LabelGraph> {
        Arc::clone(&self.snapshot.lock().expect(RCH))
    }
    /// Register a callback to run after each rebuild completes.  Callbacks
    /// run on the rebuild thread and should not block.
    pub fn add_observer<F: Fn(&LabelGraph) + Send + 'static>(&self, f: F) {
        self.observers.lock().expect(RCH).push(Box::new(f));
    }
    fn publish(snapshot: &Mutex<Arc<LabelGraph>>, observers: &Mutex<Vec<Observer>>, fresh: LabelGraph) {
        let fresh = Arc::new(fresh);
        *snapshot.lock().expect(RCH) = Arc::clone(&fresh);
        for obs in observers.lock().expect(RCH).iter() {
            obs(&fresh);
        }
    }
    /// Rebuild on the calling thread and publish.
    pub fn rebuild_now(&self) {
        let fresh = self.scanner.build(&self.main);
        Self::publish(&self.snapshot,&self.observers,fresh);
    }
    /// Rebuild on a worker thread.  If a rebuild is already in flight the
    /// request coalesces: exactly one more pass runs after the current one.
    /// Does nothing when live analysis is switched off.
    pub fn request_rebuild(&self) {
        if !self.live {
            debug!("live analysis is off, ignoring rebuild request");
            return;
        }
        {
            let mut flags = self.flags.lock().expect(RCH);
            if flags.running {
                flags.queued = true;
                debug!("rebuild queued behind the one in flight");
                return;
            }
            flags.running = true;
        }
        let scanner = self.scanner.clone();
        let main = self.main.clone();
        let snapshot = Arc::clone(&self.snapshot);
        let flags = Arc::clone(&self.flags);
        let observers = Arc::clone(&self.observers);
        std::thread::spawn(move || {
            loop {
                let fresh = scanner.build(&main);
                Self::publish(&snapshot,&observers,fresh);
                let mut f = flags.lock().expect(RCH);
                if f.queued {
                    f.queued = false;
                } else {
                    f.running = false;
                    break;
                }
            }
        });
    }
}

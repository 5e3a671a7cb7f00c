//! Parse settings string sent by any client.
//!
//! The server will check for specific keys that may affect its operation.
//! The settings structure can then be used by the various modules.

use std::collections::HashSet;
use serde_json;
use crate::DYNERR;
use crate::lang::{Error,update_json_bool,update_json_i64,update_json_severity};
use lsp_types::DiagnosticSeverity;
use super::{Arch,AssemblerFlavor};

#[derive(Clone)]
pub struct Flag {
    pub label_clashes: Option<DiagnosticSeverity>,
    pub undefined_labels: Option<DiagnosticSeverity>,
    pub unresolved_includes: Option<DiagnosticSeverity>
}
#[derive(Clone)]
pub struct Workspace {
    pub max_files: i64,
    pub live: bool
}
#[derive(Clone)]
pub struct Settings {
    pub flavor: AssemblerFlavor,
    pub archs: HashSet<Arch>,
    pub flag: Flag,
    pub workspace: Workspace
}

impl Settings {
    pub fn new() -> Self {
        Self {
            flavor: AssemblerFlavor::Nasm,
            archs: HashSet::from([Arch::I8086,Arch::I186,Arch::I286,Arch::I386,Arch::I486,
                Arch::Pent,Arch::P6,Arch::X64,Arch::Fpu,Arch::Mmx,
                Arch::Sse,Arch::Sse2,Arch::Sse3,Arch::Sse41,Arch::Sse42,
                Arch::Avx,Arch::Avx2]),
            flag : Flag {
                label_clashes: Some(DiagnosticSeverity::ERROR),
                undefined_labels: Some(DiagnosticSeverity::WARNING),
                unresolved_includes: Some(DiagnosticSeverity::WARNING)
            },
            workspace : Workspace {
                max_files: 1000,
                live: true
            }
        }
    }
}

pub fn parse(json: &str) -> Result<Settings,DYNERR> {
    let mut ans = Settings::new();
    match serde_json::from_str::<serde_json::Value>(json) {
        Ok(root) => if let Some(obj) = root.as_object() {
            for (key,val) in obj {
                match key.as_str() {
                    "flavor" => {
                        match val.as_str() {
                            Some("NASM") => ans.flavor = AssemblerFlavor::Nasm,
                            Some("MASM") => ans.flavor = AssemblerFlavor::Masm,
                            Some("AT&T") => ans.flavor = AssemblerFlavor::Att,
                            _ => ans.flavor = AssemblerFlavor::Nasm
                        }
                    },
                    "architectures" => {
                        if let Some(list) = val.as_array() {
                            let mut archs = HashSet::new();
                            for item in list {
                                if let Some(s) = item.as_str() {
                                    let arch = Arch::parse(s);
                                    if arch != Arch::None {
                                        archs.insert(arch);
                                    }
                                }
                            }
                            if archs.len() > 0 {
                                ans.archs = archs;
                            }
                        }
                    },
                    "flag" => {
                        update_json_severity(val,"labelClashes",&mut ans.flag.label_clashes);
                        update_json_severity(val,"undefinedLabels",&mut ans.flag.undefined_labels);
                        update_json_severity(val,"unresolvedIncludes",&mut ans.flag.unresolved_includes);
                    },
                    "workspace" => {
                        update_json_i64(val,"maxFiles",&mut ans.workspace.max_files);
                        update_json_bool(val,"live",&mut ans.workspace.live);
                    },
                    _ => {}
                }
            }
        },
        Err(_) => return Err(Box::new(Error::BadData))
    }
    Ok(ans)
}

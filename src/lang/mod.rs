//! # Language Module
//!
//! Shared pieces used by the language submodules: the error enum, and the
//! helpers that pull typed values out of client settings JSON.
//! Language specific operations are in the submodules.

pub mod x86;

use thiserror::Error;
use lsp_types::DiagnosticSeverity;

#[derive(Error,Debug)]
pub enum Error {
    #[error("Syntax error")]
    Syntax,
    #[error("Tokenization error")]
    Tokenization,
    #[error("Bad data")]
    BadData,
    #[error("File not found")]
    FileNotFound
}

/// If `maybe_obj` is an object with a boolean at `key`, update `curr`.
pub fn update_json_bool(maybe_obj: &serde_json::Value, key: &str, curr: &mut bool) {
    if let Some(obj) = maybe_obj.as_object() {
        if let Some(val) = obj.get(key) {
            if let Some(b) = val.as_bool() {
                *curr = b;
            }
        }
    }
}

/// If `maybe_obj` is an object with an integer at `key`, update `curr`.
pub fn update_json_i64(maybe_obj: &serde_json::Value, key: &str, curr: &mut i64) {
    if let Some(obj) = maybe_obj.as_object() {
        if let Some(val) = obj.get(key) {
            if let Some(i) = val.as_i64() {
                *curr = i;
            }
        }
    }
}

/// If `maybe_obj` is an object with a severity string at `key`, update `curr`.
/// Recognized strings are "error", "warning", "info", "hint", and "ignore",
/// the last of which maps to `None`.
pub fn update_json_severity(maybe_obj: &serde_json::Value, key: &str, curr: &mut Option<DiagnosticSeverity>) {
    if let Some(obj) = maybe_obj.as_object() {
        if let Some(val) = obj.get(key) {
            match val.as_str() {
                Some("error") => *curr = Some(DiagnosticSeverity::ERROR),
                Some("warning") => *curr = Some(DiagnosticSeverity::WARNING),
                Some("info") => *curr = Some(DiagnosticSeverity::INFORMATION),
                Some("hint") => *curr = Some(DiagnosticSeverity::HINT),
                Some("ignore") => *curr = None,
                _ => {}
            }
        }
    }
}

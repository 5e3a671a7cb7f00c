//! # `x86kit` main library
//!
//! This library analyzes x86/x64 assembly source.  It does not assemble;
//! it answers the questions an editor or language server asks about code:
//! where the keywords are, what kind of keyword each one is, whether the
//! operands of an instruction fit one of its signatures, and where labels
//! are defined and used across a source tree.
//!
//! ## Architecture
//!
//! Everything lives under `lang::x86` and is built from plain data passed
//! explicitly; there are no globals.  The main layers:
//! * `lang::x86::tokenizer` splits a line into keyword spans and classifies them
//! * `lang::x86::operands` parses a line into label/mnemonic/operands/remark
//!   and classifies each operand (register, immediate, memory)
//! * `lang::x86::handbook` holds the mnemonic store: per-mnemonic signatures,
//!   architectures, and documentation, loaded from TSV data
//! * `lang::x86::signature` matches typed operands against signatures and
//!   filters candidate signatures for signature help
//! * `lang::x86::diagnostics` builds the workspace label graph and reports
//!   clashes, undefined labels, and unresolved includes as LSP diagnostics
//!
//! ## Assembler flavors
//!
//! NASM and MASM syntax are handled directly; AT&T syntax is handled by
//! reversing operand order and accepting `%`/`$` prefixes.  The flavor is
//! part of `lang::x86::settings::Settings`, which callers pass down.

pub mod lang;

type DYNERR = Box<dyn std::error::Error>;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

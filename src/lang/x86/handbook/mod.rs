//! Instruction handbook: per-mnemonic signatures, architectures, and
//! documentation, loaded from tab separated data.

pub mod mnemonics;

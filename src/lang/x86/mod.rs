//! # x86 Assembly Analysis
//!
//! Submodules provide the layers of analysis: `tokenizer` finds and
//! classifies keywords, `operands` parses instruction lines, `handbook`
//! stores mnemonic signatures, `signature` matches operands against them,
//! and `diagnostics` maintains the workspace label graph.
//!
//! Types shared by more than one layer are defined here.

pub mod settings;
pub mod registers;
pub mod tokenizer;
pub mod operands;
pub mod signature;
pub mod handbook;
pub mod diagnostics;

#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::fmt;
use log::debug;

const RCH: &str = "unreachable was reached";

/// Assembler dialect being analyzed.  AT&T differs structurally (operand
/// order, `%` and `$` prefixes); NASM and MASM differ mainly in directives.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum AssemblerFlavor {
    Nasm,
    Masm,
    Att
}

impl fmt::Display for AssemblerFlavor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Nasm => write!(f,"NASM"),
            Self::Masm => write!(f,"MASM"),
            Self::Att => write!(f,"AT&T")
        }
    }
}

/// Classification of a keyword span produced by the tokenizer.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum AsmTokenType {
    Mnemonic,
    Jump,
    Register,
    Directive,
    Misc,
    Constant,
    Label,
    LabelDef,
    /// label definition that may coexist with a like-named PROC
    LabelDefProto,
    Remark,
    Unknown
}

/// Instruction set extensions and processor generations.  Used to gate
/// signatures on the architectures a user has switched on.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,PartialOrd,Ord)]
pub enum Arch {
    None,
    I8086, I186, I286, I386, I486, Pent, P6,
    X64,
    Fpu, Mmx,
    Sse, Sse2, Sse3, Ssse3, Sse41, Sse42, Sse4A,
    Avx, Avx2,
    Avx512F, Avx512Cd, Avx512Er, Avx512Pf, Avx512Bw, Avx512Dq, Avx512Vl,
    Avx512Ifma, Avx512Vbmi, Avx512Vnni, Avx512Bitalg, Avx512Vpopcntdq,
    Adx, Aes, Bmi1, Bmi2, F16C, Fma, Invpcid, Lzcnt, Mpx,
    Pclmulqdq, Prfchw, Rdpid, Rdrand, Rdseed, Rtm, Sha, Sgx, Vmx,
    Amd, Cyrix, Undoc
}

impl Arch {
    /// Parse one architecture token as found in the signature data,
    /// e.g. "486", "SSE4.1", "AVX512_VL".  Unknown tokens come back as
    /// `None` (the variant) and are logged.
    pub fn parse(token: &str) -> Self {
        let t = token.trim().to_uppercase().replace("_","");
        match t.as_str() {
            "" | "NONE" => Self::None,
            "8086" => Self::I8086,
            "186" => Self::I186,
            "286" => Self::I286,
            "386" => Self::I386,
            "486" => Self::I486,
            "PENT" => Self::Pent,
            "P6" => Self::P6,
            "X64" | "X86-64" | "X86_64" => Self::X64,
            "FPU" | "X87" => Self::Fpu,
            "MMX" => Self::Mmx,
            "SSE" => Self::Sse,
            "SSE2" => Self::Sse2,
            "SSE3" => Self::Sse3,
            "SSSE3" => Self::Ssse3,
            "SSE4.1" | "SSE41" => Self::Sse41,
            "SSE4.2" | "SSE42" => Self::Sse42,
            "SSE4A" => Self::Sse4A,
            "AVX" => Self::Avx,
            "AVX2" => Self::Avx2,
            "AVX512" | "AVX512F" => Self::Avx512F,
            "AVX512CD" => Self::Avx512Cd,
            "AVX512ER" => Self::Avx512Er,
            "AVX512PF" => Self::Avx512Pf,
            "AVX512BW" => Self::Avx512Bw,
            "AVX512DQ" => Self::Avx512Dq,
            "AVX512VL" => Self::Avx512Vl,
            "AVX512IFMA" => Self::Avx512Ifma,
            "AVX512VBMI" => Self::Avx512Vbmi,
            "AVX512VNNI" => Self::Avx512Vnni,
            "AVX512BITALG" => Self::Avx512Bitalg,
            "AVX512VPOPCNTDQ" => Self::Avx512Vpopcntdq,
            "ADX" => Self::Adx,
            "AES" => Self::Aes,
            "BMI1" => Self::Bmi1,
            "BMI2" => Self::Bmi2,
            "F16C" => Self::F16C,
            "FMA" => Self::Fma,
            "INVPCID" => Self::Invpcid,
            "LZCNT" => Self::Lzcnt,
            "MPX" | "BND" => Self::Mpx,
            "PCLMULQDQ" => Self::Pclmulqdq,
            "PRFCHW" => Self::Prfchw,
            "RDPID" => Self::Rdpid,
            "RDRAND" => Self::Rdrand,
            "RDSEED" => Self::Rdseed,
            "RTM" => Self::Rtm,
            "SHA" => Self::Sha,
            "SGX" => Self::Sgx,
            "VMX" => Self::Vmx,
            "AMD" => Self::Amd,
            "CYRIX" => Self::Cyrix,
            "UNDOC" => Self::Undoc,
            _ => {
                debug!("unknown architecture token `{}`",token);
                Self::None
            }
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::None => write!(f,"NONE"),
            Self::I8086 => write!(f,"8086"),
            Self::I186 => write!(f,"186"),
            Self::I286 => write!(f,"286"),
            Self::I386 => write!(f,"386"),
            Self::I486 => write!(f,"486"),
            Self::Pent => write!(f,"PENT"),
            Self::P6 => write!(f,"P6"),
            Self::X64 => write!(f,"X64"),
            Self::Fpu => write!(f,"FPU"),
            Self::Mmx => write!(f,"MMX"),
            Self::Sse => write!(f,"SSE"),
            Self::Sse2 => write!(f,"SSE2"),
            Self::Sse3 => write!(f,"SSE3"),
            Self::Ssse3 => write!(f,"SSSE3"),
            Self::Sse41 => write!(f,"SSE4.1"),
            Self::Sse42 => write!(f,"SSE4.2"),
            Self::Sse4A => write!(f,"SSE4A"),
            Self::Avx => write!(f,"AVX"),
            Self::Avx2 => write!(f,"AVX2"),
            Self::Avx512F => write!(f,"AVX512F"),
            Self::Avx512Cd => write!(f,"AVX512CD"),
            Self::Avx512Er => write!(f,"AVX512ER"),
            Self::Avx512Pf => write!(f,"AVX512PF"),
            Self::Avx512Bw => write!(f,"AVX512BW"),
            Self::Avx512Dq => write!(f,"AVX512DQ"),
            Self::Avx512Vl => write!(f,"AVX512VL"),
            Self::Avx512Ifma => write!(f,"AVX512IFMA"),
            Self::Avx512Vbmi => write!(f,"AVX512VBMI"),
            Self::Avx512Vnni => write!(f,"AVX512VNNI"),
            Self::Avx512Bitalg => write!(f,"AVX512BITALG"),
            Self::Avx512Vpopcntdq => write!(f,"AVX512VPOPCNTDQ"),
            Self::Adx => write!(f,"ADX"),
            Self::Aes => write!(f,"AES"),
            Self::Bmi1 => write!(f,"BMI1"),
            Self::Bmi2 => write!(f,"BMI2"),
            Self::F16C => write!(f,"F16C"),
            Self::Fma => write!(f,"FMA"),
            Self::Invpcid => write!(f,"INVPCID"),
            Self::Lzcnt => write!(f,"LZCNT"),
            Self::Mpx => write!(f,"MPX"),
            Self::Pclmulqdq => write!(f,"PCLMULQDQ"),
            Self::Prfchw => write!(f,"PRFCHW"),
            Self::Rdpid => write!(f,"RDPID"),
            Self::Rdrand => write!(f,"RDRAND"),
            Self::Rdseed => write!(f,"RDSEED"),
            Self::Rtm => write!(f,"RTM"),
            Self::Sha => write!(f,"SHA"),
            Self::Sgx => write!(f,"SGX"),
            Self::Vmx => write!(f,"VMX"),
            Self::Amd => write!(f,"AMD"),
            Self::Cyrix => write!(f,"CYRIX"),
            Self::Undoc => write!(f,"UNDOC")
        }
    }
}

/// Parse a comma separated architecture list, e.g. the third column of a
/// signature row.  Unknown tokens are dropped.
pub fn parse_arch_list(list: &str) -> HashSet<Arch> {
    let mut ans = HashSet::new();
    for token in list.split(',') {
        if token.trim().len() > 0 {
            ans.insert(Arch::parse(token));
        }
    }
    ans
}

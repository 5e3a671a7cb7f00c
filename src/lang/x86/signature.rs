//! Instruction signature model.
//!
//! A signature is an ordered list of operand positions, each position a set
//! of acceptable operand categories, plus the set of architectures the
//! form exists on.  Signatures come out of the mnemonic store and are
//! matched here against the typed operands of a source line, both for
//! diagnostics and to narrow the candidate list for signature help.

use std::collections::HashSet;
use std::fmt;
use log::warn;
use super::operands::Operand;
use super::registers::{self,RegisterClass};
use super::{parse_arch_list,Arch};

/// Closed vocabulary of operand categories appearing in signature data.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash)]
pub enum OperandCategory {
    None,
    Unknown,
    // memory operands
    Mem, M8, M16, M32, M64, M80, M128, M256, M512,
    // register operands by width
    R8, R16, R32, R64,
    // specific registers
    RegAl, RegAx, RegEax, RegRax,
    RegCl, RegCx, RegEcx, RegRcx,
    RegDx, RegEdx,
    RegCs, RegDs, RegEs, RegSs, RegFs, RegGs,
    Zero,
    Unity,
    Imm, Imm8, Imm16, Imm32, Imm64,
    Rel8, Rel16, Rel32, Rel64,
    ImmImm, Imm16Imm, ImmImm16, Imm32Imm, ImmImm32,
    Near, Far, Short,
    // FPU
    Fpu0, FpuReg,
    M2Byte, M14Byte, M28Byte, M94Byte, M108Byte, M512Byte,
    // SIMD
    K, Z, Sae, Er,
    Vm32X, Vm64X, Vm32Y, Vm64Y, Vm32Z, Vm64Z,
    RegXmm0, MmxReg, XmmReg, YmmReg, ZmmReg,
    BndReg,
    M32Bcst, M64Bcst,
    MemOffset,
    SegReg, DebugReg,
    Cr0, Cr1, Cr2, Cr3, Cr4, Cr5, Cr6, Cr7, Cr8
}

impl OperandCategory {
    /// Brief description for signature help.
    pub fn doc(&self) -> String {
        match self {
            Self::Mem => "memory operand".to_string(),
            Self::M8 => "8-bits memory operand".to_string(),
            Self::M16 => "16-bits memory operand".to_string(),
            Self::M32 => "32-bits memory operand".to_string(),
            Self::M64 => "64-bits memory operand".to_string(),
            Self::M80 => "80-bits memory operand".to_string(),
            Self::M128 => "128-bits memory operand".to_string(),
            Self::M256 => "256-bits memory operand".to_string(),
            Self::M512 => "512-bits memory operand".to_string(),
            Self::R8 => "8-bits register".to_string(),
            Self::R16 => "16-bits register".to_string(),
            Self::R32 => "32-bits register".to_string(),
            Self::R64 => "64-bits register".to_string(),
            Self::RegAl => "AL register".to_string(),
            Self::RegAx => "AX register".to_string(),
            Self::RegEax => "EAX register".to_string(),
            Self::RegRax => "RAX register".to_string(),
            Self::RegCl => "CL register".to_string(),
            Self::RegCx => "CX register".to_string(),
            Self::RegEcx => "ECX register".to_string(),
            Self::RegRcx => "RCX register".to_string(),
            Self::RegDx => "DX register".to_string(),
            Self::RegEdx => "EDX register".to_string(),
            Self::RegCs => "CS register".to_string(),
            Self::RegDs => "DS register".to_string(),
            Self::RegEs => "ES register".to_string(),
            Self::RegSs => "SS register".to_string(),
            Self::RegFs => "FS register".to_string(),
            Self::RegGs => "GS register".to_string(),
            Self::Imm => "immediate constant".to_string(),
            Self::Imm8 => "8-bits immediate constant".to_string(),
            Self::Imm16 => "16-bits immediate constant".to_string(),
            Self::Imm32 => "32-bits immediate constant".to_string(),
            Self::Imm64 => "64-bits immediate constant".to_string(),
            Self::ImmImm | Self::Imm16Imm | Self::ImmImm16 | Self::Imm32Imm | Self::ImmImm32 => "immediate constants".to_string(),
            Self::Near => "near ptr".to_string(),
            Self::Far => "far ptr".to_string(),
            Self::Short => "short ptr".to_string(),
            Self::Unity => "immediate value 1".to_string(),
            Self::Zero => "immediate value 0".to_string(),
            Self::Sae => "Optional Suppress All Exceptions {SAE}".to_string(),
            Self::Er => "Optional Rounding Mode {RN-SAE}/{RU-SAE}/{RD-SAE}/{RZ-SAE}".to_string(),
            Self::Z => "Optional Zero Mask {Z}".to_string(),
            Self::RegXmm0 => "XMM0 register".to_string(),
            Self::XmmReg => "xmm register".to_string(),
            Self::YmmReg => "ymm register".to_string(),
            Self::ZmmReg => "zmm register".to_string(),
            Self::K => "mask register".to_string(),
            Self::M32Bcst => "vector broadcasted from a 32-bit memory location".to_string(),
            Self::M64Bcst => "vector broadcasted from a 64-bit memory location".to_string(),
            Self::MemOffset => "memory offset".to_string(),
            Self::SegReg => "segment register".to_string(),
            Self::DebugReg => "debug register".to_string(),
            Self::Fpu0 => "ST(0) register".to_string(),
            Self::FpuReg => "floating point register".to_string(),
            Self::MmxReg => "mmx register".to_string(),
            Self::BndReg => "bound register".to_string(),
            _ => format!("{}",self)
        }
    }
}

impl fmt::Display for OperandCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::None => write!(f,"NONE"),
            Self::Unknown => write!(f,"UNKNOWN"),
            Self::Mem => write!(f,"MEM"),
            Self::M8 => write!(f,"M8"),
            Self::M16 => write!(f,"M16"),
            Self::M32 => write!(f,"M32"),
            Self::M64 => write!(f,"M64"),
            Self::M80 => write!(f,"M80"),
            Self::M128 => write!(f,"M128"),
            Self::M256 => write!(f,"M256"),
            Self::M512 => write!(f,"M512"),
            Self::R8 => write!(f,"R8"),
            Self::R16 => write!(f,"R16"),
            Self::R32 => write!(f,"R32"),
            Self::R64 => write!(f,"R64"),
            Self::RegAl => write!(f,"AL"),
            Self::RegAx => write!(f,"AX"),
            Self::RegEax => write!(f,"EAX"),
            Self::RegRax => write!(f,"RAX"),
            Self::RegCl => write!(f,"CL"),
            Self::RegCx => write!(f,"CX"),
            Self::RegEcx => write!(f,"ECX"),
            Self::RegRcx => write!(f,"RCX"),
            Self::RegDx => write!(f,"DX"),
            Self::RegEdx => write!(f,"EDX"),
            Self::RegCs => write!(f,"CS"),
            Self::RegDs => write!(f,"DS"),
            Self::RegEs => write!(f,"ES"),
            Self::RegSs => write!(f,"SS"),
            Self::RegFs => write!(f,"FS"),
            Self::RegGs => write!(f,"GS"),
            Self::Zero => write!(f,"0"),
            Self::Unity => write!(f,"1"),
            Self::Imm => write!(f,"IMM"),
            Self::Imm8 => write!(f,"IMM8"),
            Self::Imm16 => write!(f,"IMM16"),
            Self::Imm32 => write!(f,"IMM32"),
            Self::Imm64 => write!(f,"IMM64"),
            Self::Rel8 => write!(f,"REL8"),
            Self::Rel16 => write!(f,"REL16"),
            Self::Rel32 => write!(f,"REL32"),
            Self::Rel64 => write!(f,"REL64"),
            Self::ImmImm => write!(f,"imm:imm"),
            Self::Imm16Imm => write!(f,"imm16:imm"),
            Self::ImmImm16 => write!(f,"imm:imm16"),
            Self::Imm32Imm => write!(f,"imm32:imm"),
            Self::ImmImm32 => write!(f,"imm:imm32"),
            Self::Near => write!(f,"near"),
            Self::Far => write!(f,"far"),
            Self::Short => write!(f,"short"),
            Self::Fpu0 => write!(f,"ST(0)"),
            Self::FpuReg => write!(f,"fpureg"),
            Self::M2Byte => write!(f,"M2BYTE"),
            Self::M14Byte => write!(f,"M14BYTE"),
            Self::M28Byte => write!(f,"M28BYTE"),
            Self::M94Byte => write!(f,"M94BYTE"),
            Self::M108Byte => write!(f,"M108BYTE"),
            Self::M512Byte => write!(f,"M512BYTE"),
            Self::K => write!(f,"K"),
            Self::Z => write!(f,"z"),
            Self::Sae => write!(f,"{{SAE}}"),
            Self::Er => write!(f,"er"),
            Self::Vm32X => write!(f,"xmem32"),
            Self::Vm64X => write!(f,"xmem64"),
            Self::Vm32Y => write!(f,"ymem32"),
            Self::Vm64Y => write!(f,"ymem64"),
            Self::Vm32Z => write!(f,"zmem32"),
            Self::Vm64Z => write!(f,"zmem64"),
            Self::RegXmm0 => write!(f,"XMM0"),
            Self::MmxReg => write!(f,"MM"),
            Self::XmmReg => write!(f,"XMM"),
            Self::YmmReg => write!(f,"YMM"),
            Self::ZmmReg => write!(f,"ZMM"),
            Self::BndReg => write!(f,"BND"),
            Self::M32Bcst => write!(f,"M32bcst"),
            Self::M64Bcst => write!(f,"M64bcst"),
            Self::MemOffset => write!(f,"mem_offs"),
            Self::SegReg => write!(f,"segment register"),
            Self::DebugReg => write!(f,"debug register"),
            Self::Cr0 => write!(f,"CR0"),
            Self::Cr1 => write!(f,"CR1"),
            Self::Cr2 => write!(f,"CR2"),
            Self::Cr3 => write!(f,"CR3"),
            Self::Cr4 => write!(f,"CR4"),
            Self::Cr5 => write!(f,"CR5"),
            Self::Cr6 => write!(f,"CR6"),
            Self::Cr7 => write!(f,"CR7"),
            Self::Cr8 => write!(f,"CR8")
        }
    }
}

/// Map one operand token from the signature data to its category set,
/// e.g. `R/M32` becomes `[R32, M32]` and `XMM/M128{K}{Z}` becomes
/// `[XMMREG, M128, K, Z]`.  Unknown tokens map to `[UNKNOWN]` with a warn.
pub fn parse_operand_spec(token: &str) -> Vec<OperandCategory> {
    use OperandCategory::*;
    match token.trim().to_uppercase().as_str() {
        "M" | "MEM" | "MIB" => vec![Mem],
        "M8" => vec![M8],
        "M16" => vec![M16],
        "M32" => vec![M32],
        "M32{K}" => vec![M32,K],
        "M64" => vec![M64],
        "M64{K}" => vec![M64,K],
        "M80" => vec![M80],
        "M128" => vec![M128],
        "M128{K}" => vec![M128,K],
        "M256" => vec![M256],
        "M256{K}" => vec![M256,K],
        "M512" => vec![M512],
        "M512{K}" => vec![M512,K],
        "M16&16" | "M16&32" | "M16&64" | "M32&32" => vec![Mem],
        "M16:16" | "M16:32" | "M16:64" => vec![Mem],
        "PTR16:16" | "PTR16:32" | "PTR16:64" => vec![Imm],
        "R8" => vec![R8],
        "R16" => vec![R16],
        "R32" => vec![R32],
        "R64" => vec![R64],
        "R16/R32/R64" => vec![R16,R32,R64],
        "R32/64" => vec![R32,R64],
        "REG" => vec![R32],
        "AL" => vec![RegAl],
        "AX" => vec![RegAx],
        "EAX" => vec![RegEax],
        "RAX" => vec![RegRax],
        "CL" => vec![RegCl],
        "CX" => vec![RegCx],
        "ECX" => vec![RegEcx],
        "RCX" => vec![RegRcx],
        "DX" => vec![RegDx],
        "EDX" => vec![RegEdx],
        "CS" => vec![RegCs],
        "DS" => vec![RegDs],
        "ES" => vec![RegEs],
        "SS" => vec![RegSs],
        "FS" => vec![RegFs],
        "GS" => vec![RegGs],
        "REG_SREG" | "SREG" => vec![SegReg],
        "CR0-CR7" | "CR0\u{2013}CR7" => vec![Cr0,Cr1,Cr2,Cr3,Cr4,Cr5,Cr6,Cr7],
        "CR8" => vec![Cr8],
        "REG_DREG" | "DR0-DR7" | "DR0\u{2013}DR7" => vec![DebugReg],
        "R/M8" | "REG/M8" => vec![R8,M8],
        "R/M16" | "REG/M16" | "R16/M16" => vec![R16,M16],
        "R/M32" | "REG/M32" | "R32/M32" => vec![R32,M32],
        "R/M64" | "R64/M64" => vec![R64,M64],
        "R/M32{ER}" => vec![R32,M32,Er],
        "R/M64{ER}" => vec![R64,M64,Er],
        "R32/M16" => vec![R32,M16],
        "R64/M16" => vec![R64,M16],
        "R32/M8" => vec![R32,M8],
        "R16/R32/M16" => vec![R16,R32,M16],
        "0" => vec![Zero],
        "1" => vec![Unity],
        "MOFFS8" => vec![Imm8],
        "MOFFS16" => vec![Imm16],
        "MOFFS32" => vec![Imm32],
        "MOFFS64" => vec![Imm64],
        "REL8" => vec![Imm8],
        "REL16" => vec![Imm16],
        "REL32" => vec![Imm32],
        "REL64" => vec![Imm64],
        "IMM" => vec![Imm],
        "IMM8" => vec![Imm8],
        "IMM16" => vec![Imm16],
        "IMM32" => vec![Imm32],
        "IMM64" => vec![Imm64],
        "IMM:IMM" => vec![ImmImm],
        "IMM16:IMM" => vec![Imm16Imm],
        "IMM:IMM16" => vec![ImmImm16],
        "IMM32:IMM" => vec![Imm32Imm],
        "IMM:IMM32" => vec![ImmImm32],
        "ST(I)" | "ST" => vec![FpuReg],
        "ST(0)" => vec![Fpu0],
        "M32FP" => vec![M32,FpuReg],
        "M64FP" => vec![M64,FpuReg],
        "M80FP" => vec![M80,FpuReg],
        "M16INT" => vec![M16],
        "M32INT" => vec![M32],
        "M64INT" => vec![M64],
        "M14/28BYTE" => vec![M14Byte,M28Byte],
        "M94/108BYTE" => vec![M94Byte,M108Byte],
        "M2BYTE" => vec![M2Byte],
        "M512BYTE" => vec![M512Byte],
        "M80BCD" | "M80DEC" => vec![M80],
        "MM" => vec![MmxReg],
        "MM/M32" => vec![MmxReg,M32],
        "MM/M64" | "MM/MEM" => vec![MmxReg,M64],
        "Z" => vec![Z],
        "K" | "K+1" | "K{K}" => vec![K],
        "SAE" => vec![Sae],
        "ER" => vec![Er],
        "K/M8" => vec![K,M8],
        "K/M16" => vec![K,M16],
        "K/M32" => vec![K,M32],
        "K/M64" => vec![K,M64],
        "VM32X" => vec![Vm32X],
        "VM64X" => vec![Vm64X],
        "VM32Y" => vec![Vm32Y],
        "VM64Y" => vec![Vm64Y],
        "VM32Z" => vec![Vm32Z],
        "VM64Z" => vec![Vm64Z],
        "VM32X{K}" => vec![Vm32X,K],
        "VM64X{K}" => vec![Vm64X,K],
        "VM32Y{K}" => vec![Vm32Y,K],
        "VM64Y{K}" => vec![Vm64Y,K],
        "VM32Z{K}" => vec![Vm32Z,K],
        "VM64Z{K}" => vec![Vm64Z,K],
        "XMM" => vec![XmmReg],
        "XMM_ZERO" => vec![RegXmm0],
        "XMM{K}" => vec![XmmReg,K],
        "XMM{K}{Z}" => vec![XmmReg,K,Z],
        "XMM/M8" => vec![XmmReg,M8],
        "XMM/M16" | "XMM/M16{K}{Z}" => vec![XmmReg,M16],
        "XMM/M32" | "XMM/M32{K}{Z}" => vec![XmmReg,M32,K,Z],
        "XMM/M32{ER}" => vec![XmmReg,M32,Er],
        "XMM/M32{SAE}" => vec![XmmReg,M32,Sae],
        "XMM/M64" => vec![XmmReg,M64],
        "XMM/M64{K}{Z}" => vec![XmmReg,M64,K,Z],
        "XMM/M64{ER}" => vec![XmmReg,M64,Er],
        "XMM/M64{SAE}" => vec![XmmReg,M64,Sae],
        "XMM/M64/M32BCST" => vec![XmmReg,M64,M32Bcst],
        "XMM/M128" => vec![XmmReg,M128],
        "XMM/M128{K}{Z}" => vec![XmmReg,M128,K,Z],
        "XMM/M128/M32BCST" => vec![XmmReg,M128,M32Bcst],
        "XMM/M128/M64BCST" => vec![XmmReg,M128,M64Bcst],
        "YMM" => vec![YmmReg],
        "YMM{K}" => vec![YmmReg,K],
        "YMM{K}{Z}" => vec![YmmReg,K,Z],
        "YMM/M256" => vec![YmmReg,M256],
        "YMM/M256{SAE}" => vec![YmmReg,M256,Sae],
        "YMM/M256{K}{Z}" => vec![YmmReg,M256,K,Z],
        "YMM/M256/M32BCST" => vec![YmmReg,M256,M32Bcst],
        "YMM/M256/M32BCST{ER}" => vec![YmmReg,M256,M32Bcst,Er],
        "YMM/M256/M32BCST{SAE}" => vec![YmmReg,M256,M32Bcst,Sae],
        "YMM/M256/M64BCST" => vec![YmmReg,M256,M64Bcst],
        "ZMM" => vec![ZmmReg],
        "ZMM{K}" => vec![ZmmReg,K],
        "ZMM{K}{Z}" => vec![ZmmReg,K,Z],
        "ZMM{SAE}" => vec![ZmmReg,Sae],
        "ZMM/M512" => vec![ZmmReg,M512,K,Z],
        "ZMM/M512{K}{Z}" => vec![ZmmReg,K,Z],
        "ZMM/M512/M32BCST" => vec![ZmmReg,M512,M32Bcst],
        "ZMM/M512/M32BCST{ER}" => vec![ZmmReg,M512,M32Bcst,Er],
        "ZMM/M512/M32BCST{SAE}" => vec![ZmmReg,M512,M32Bcst,Sae],
        "ZMM/M512/M64BCST" => vec![ZmmReg,M512,M64Bcst],
        "ZMM/M512/M64BCST{ER}" => vec![ZmmReg,M512,M64Bcst,Er],
        "ZMM/M512/M64BCST{SAE}" => vec![ZmmReg,M512,M64Bcst,Sae],
        "NEAR" => vec![Near],
        "FAR" => vec![Far],
        "SHORT" => vec![Short],
        "MEM_OFFS" => vec![MemOffset],
        "BND" => vec![BndReg],
        "BND/M64" => vec![BndReg,M64],
        "BND/M128" => vec![BndReg,M128],
        "NONE" => vec![None],
        other => {
            warn!("unknown operand spec `{}`",other);
            vec![Unknown]
        }
    }
}

/// Whether a typed operand is acceptable for one category.  `UNKNOWN`
/// accepts anything; `Z`, `ER`, and `SAE` are decoration qualifiers and
/// never accept a positional operand.
pub fn category_allows(cat: OperandCategory, op: &Operand) -> bool {
    use OperandCategory::*;
    match cat {
        Unknown => true,
        Mem => op.is_mem(),
        M8 => op.is_mem() && op.n_bits == 8,
        M16 => op.is_mem() && op.n_bits == 16,
        M32 => op.is_mem() && op.n_bits == 32,
        M64 => op.is_mem() && op.n_bits == 64,
        M80 => op.is_mem() && op.n_bits == 80,
        M128 => op.is_mem() && op.n_bits == 128,
        M256 => op.is_mem() && op.n_bits == 256,
        M512 => op.is_mem() && op.n_bits == 512,
        R8 => op.is_reg() && op.n_bits == 8,
        R16 => op.is_reg() && op.n_bits == 16,
        R32 => op.is_reg() && op.n_bits == 32,
        R64 => op.is_reg() && op.n_bits == 64,
        RegAl => op.reg_name() == Some("AL"),
        RegAx => op.reg_name() == Some("AX"),
        RegEax => op.reg_name() == Some("EAX"),
        RegRax => op.reg_name() == Some("RAX"),
        RegCl => op.reg_name() == Some("CL"),
        RegCx => op.reg_name() == Some("CX"),
        RegEcx => op.reg_name() == Some("ECX"),
        RegRcx => op.reg_name() == Some("RCX"),
        RegDx => op.reg_name() == Some("DX"),
        RegEdx => op.reg_name() == Some("EDX"),
        RegXmm0 => op.reg_name() == Some("XMM0"),
        RegCs => op.reg_name() == Some("CS"),
        RegDs => op.reg_name() == Some("DS"),
        RegEs => op.reg_name() == Some("ES"),
        RegSs => op.reg_name() == Some("SS"),
        RegFs => op.reg_name() == Some("FS"),
        RegGs => op.reg_name() == Some("GS"),
        Imm => op.is_imm(),
        Imm8 | Rel8 => op.is_imm() && op.n_bits == 8,
        Imm16 | Rel16 => op.is_imm() && op.n_bits == 16,
        Imm32 | Rel32 => op.is_imm() && op.n_bits == 32,
        Imm64 | Rel64 => op.is_imm() && op.n_bits == 64,
        ImmImm | Imm16Imm | ImmImm16 | Imm32Imm | ImmImm32 => true,
        Near | Far | Short => op.is_imm(),
        Unity => op.imm_value() == Some(1),
        Zero => op.imm_value() == Some(0),
        Z | Er | Sae => false,
        K => reg_class_is(op,RegisterClass::Opmask),
        MmxReg => reg_class_is(op,RegisterClass::Mmx),
        XmmReg => reg_class_is(op,RegisterClass::Xmm),
        YmmReg => reg_class_is(op,RegisterClass::Ymm),
        ZmmReg => reg_class_is(op,RegisterClass::Zmm),
        Fpu0 => op.reg_name() == Some("ST0") || op.reg_name() == Some("ST(0)"),
        FpuReg => reg_class_is(op,RegisterClass::Fpu),
        M2Byte | M14Byte | M28Byte | M94Byte | M108Byte | M512Byte => op.is_mem(),
        Vm32X | Vm64X | Vm32Y | Vm64Y | Vm32Z | Vm64Z => op.is_mem(),
        M32Bcst => op.is_mem() && op.n_bits == 32,
        M64Bcst => op.is_mem() && op.n_bits == 64,
        MemOffset => op.is_imm(),
        SegReg => reg_class_is(op,RegisterClass::Segment),
        DebugReg => reg_class_is(op,RegisterClass::Debug),
        BndReg => reg_class_is(op,RegisterClass::Bound),
        Cr0 => op.reg_name() == Some("CR0"),
        Cr1 => op.reg_name() == Some("CR1"),
        Cr2 => op.reg_name() == Some("CR2"),
        Cr3 => op.reg_name() == Some("CR3"),
        Cr4 => op.reg_name() == Some("CR4"),
        Cr5 => op.reg_name() == Some("CR5"),
        Cr6 => op.reg_name() == Some("CR6"),
        Cr7 => op.reg_name() == Some("CR7"),
        Cr8 => op.reg_name() == Some("CR8"),
        None => {
            warn!("operand checked against NONE category");
            true
        }
    }
}

fn reg_class_is(op: &Operand, class: RegisterClass) -> bool {
    match op.reg_name() {
        Some(name) => registers::class(name) == Some(class),
        _ => false
    }
}

/// One signature of one mnemonic: ordered operand category sets, the
/// architectures the form exists on, and its documentation.
#[derive(Debug,Clone,PartialEq)]
pub struct SignatureElement {
    pub mnemonic: String,
    pub operands: Vec<Vec<OperandCategory>>,
    pub operand_strs: Vec<String>,
    pub archs: HashSet<Arch>,
    /// human readable form from the signature data, e.g. "MOV reg/mem, reg"
    pub label: String,
    pub doc: String
}

impl SignatureElement {
    /// Build from the TSV columns.  The operand column splits on `,` for
    /// positions and on `|` for alternatives within a position; `NONE` and
    /// empty positions are dropped.  When `att` is set the operand order is
    /// reversed here, at construction time.
    pub fn new(mnemonic: &str, operands_str: &str, arch_str: &str, doc: &str, att: bool) -> Self {
        let mut operands: Vec<Vec<OperandCategory>> = Vec::new();
        let mut operand_strs: Vec<String> = Vec::new();
        for op_str in operands_str.split(',') {
            let op_str = op_str.trim();
            if op_str.len() == 0 {
                continue;
            }
            let mut set: Vec<OperandCategory> = Vec::new();
            for alt in op_str.split('|') {
                for cat in parse_operand_spec(alt) {
                    if cat != OperandCategory::None && cat != OperandCategory::Unknown {
                        set.push(cat);
                    }
                }
            }
            if set.len() > 0 {
                operands.push(set);
                operand_strs.push(op_str.to_string());
            }
        }
        if att {
            operands.reverse();
            operand_strs.reverse();
        }
        Self {
            mnemonic: mnemonic.to_uppercase(),
            operands,
            operand_strs,
            archs: parse_arch_list(arch_str),
            label: String::new(),
            doc: doc.to_string()
        }
    }
    /// Whether the operand fits position `pos`: any category in the
    /// position's set may accept it.
    pub fn is_allowed_operand(&self, op: &Operand, pos: usize) -> bool {
        if pos >= self.operands.len() {
            return false;
        }
        self.operands[pos].iter().any(|cat| category_allows(*cat,op))
    }
    /// Whether a width keyword such as `DWORD` may precede position `pos`.
    pub fn is_allowed_misc(&self, misc: &str, pos: usize) -> bool {
        use OperandCategory::*;
        if pos >= self.operands.len() {
            return false;
        }
        let set = &self.operands[pos];
        let widths: &[OperandCategory] = match misc {
            "PTR" => &[Mem,M16,M32,M64,M128,M256,M512],
            "BYTE" | "SBYTE" => &[M8],
            "WORD" | "SWORD" => &[M16],
            "DWORD" | "SDWORD" | "REAL4" => &[M32],
            "QWORD" | "MMWORD" | "REAL8" => &[M64],
            "TWORD" | "TBYTE" | "REAL10" => &[M80],
            "XMMWORD" | "OWORD" => &[M128],
            "YMMWORD" | "YWORD" => &[M256],
            "ZWORD" => &[M512],
            _ => return false
        };
        widths.iter().any(|w| set.contains(w))
    }
    /// Arch gate: at least one of the signature's architectures must be
    /// selected.
    pub fn is_allowed_arch(&self, selected: &HashSet<Arch>) -> bool {
        self.archs.iter().any(|a| selected.contains(a))
    }
    /// Per position documentation, alternatives joined with " or ".
    pub fn make_doc(&self) -> Vec<String> {
        self.operands.iter().map(|set| {
            set.iter().map(|cat| cat.doc()).collect::<Vec<String>>().join(" or ")
        }).collect()
    }
}

impl fmt::Display for SignatureElement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.label.len() > 0 {
            write!(f,"{}",self.label)
        } else if self.operand_strs.len() == 0 {
            write!(f,"{}",self.mnemonic)
        } else {
            write!(f,"{} {}",self.mnemonic,self.operand_strs.join(", "))
        }
    }
}

/// Narrow candidate signatures for the signature help popup.  A candidate
/// survives when its arch set intersects the selection and every typed
/// operand (holes are skipped) is allowed at its position.  Candidate order
/// is preserved.
pub fn constrain_signatures<'a>(
    candidates: &'a [SignatureElement],
    operands: &[Option<Operand>],
    selected_archs: &HashSet<Arch>
) -> Vec<&'a SignatureElement> {
    let mut ans = Vec::new();
    for sig in candidates {
        if !sig.is_allowed_arch(selected_archs) {
            continue;
        }
        let mut allowed = true;
        for (i,op) in operands.iter().enumerate() {
            if let Some(op) = op {
                if !sig.is_allowed_operand(op,i) {
                    allowed = false;
                    break;
                }
            }
        }
        if allowed {
            ans.push(sig);
        }
    }
    ans
}

/// Active parameter for signature help: the number of commas typed so far,
/// capped at the last parameter of the signature.
pub fn active_parameter(args_so_far: &str, sig: &SignatureElement) -> usize {
    let n_commas = args_so_far.matches(',').count();
    if sig.operands.len() == 0 {
        0
    } else {
        n_commas.min(sig.operands.len() - 1)
    }
}

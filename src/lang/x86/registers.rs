//! Register names, widths, and classes.
//!
//! Lookups take upper case names.  AT&T sources prefix registers with `%`;
//! callers strip the prefix before asking.

use std::fmt;

#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash)]
pub enum RegisterClass {
    GeneralPurpose,
    Segment,
    Control,
    Debug,
    Bound,
    Fpu,
    Mmx,
    Xmm,
    Ymm,
    Zmm,
    Opmask
}

impl fmt::Display for RegisterClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::GeneralPurpose => write!(f,"general purpose register"),
            Self::Segment => write!(f,"segment register"),
            Self::Control => write!(f,"control register"),
            Self::Debug => write!(f,"debug register"),
            Self::Bound => write!(f,"bound register"),
            Self::Fpu => write!(f,"floating point register"),
            Self::Mmx => write!(f,"MMX register"),
            Self::Xmm => write!(f,"XMM register"),
            Self::Ymm => write!(f,"YMM register"),
            Self::Zmm => write!(f,"ZMM register"),
            Self::Opmask => write!(f,"opmask register")
        }
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct RegisterInfo {
    pub class: RegisterClass,
    pub n_bits: usize
}

/// Look up a register by its upper case name.  Returns `None` for anything
/// that is not a register.
pub fn parse(name: &str) -> Option<RegisterInfo> {
    use RegisterClass::*;
    match name {
        "AL"|"BL"|"CL"|"DL"|"AH"|"BH"|"CH"|"DH"|"SPL"|"BPL"|"SIL"|"DIL" =>
            return Some(RegisterInfo { class: GeneralPurpose, n_bits: 8 }),
        "AX"|"BX"|"CX"|"DX"|"SP"|"BP"|"SI"|"DI" =>
            return Some(RegisterInfo { class: GeneralPurpose, n_bits: 16 }),
        "EAX"|"EBX"|"ECX"|"EDX"|"ESP"|"EBP"|"ESI"|"EDI" =>
            return Some(RegisterInfo { class: GeneralPurpose, n_bits: 32 }),
        "RAX"|"RBX"|"RCX"|"RDX"|"RSP"|"RBP"|"RSI"|"RDI" =>
            return Some(RegisterInfo { class: GeneralPurpose, n_bits: 64 }),
        "CS"|"DS"|"ES"|"SS"|"FS"|"GS" =>
            return Some(RegisterInfo { class: Segment, n_bits: 16 }),
        _ => {}
    }
    // numbered families
    if let Some(tail) = name.strip_prefix("R") {
        // R8..R15 and the B/W/D subregisters
        let (digits,n_bits) = match tail.strip_suffix('B') {
            Some(d) => (d,8),
            None => match tail.strip_suffix('W') {
                Some(d) => (d,16),
                None => match tail.strip_suffix('D') {
                    Some(d) => (d,32),
                    None => (tail,64)
                }
            }
        };
        if let Ok(n) = digits.parse::<usize>() {
            if n >= 8 && n <= 15 {
                return Some(RegisterInfo { class: GeneralPurpose, n_bits });
            }
        }
    }
    for (prefix,class,n_bits,count) in [
        ("CR",Control,32,9usize),
        ("DR",Debug,32,8),
        ("BND",Bound,128,4),
        ("ST",Fpu,80,8),
        ("MM",Mmx,64,8),
        ("XMM",Xmm,128,32),
        ("YMM",Ymm,256,32),
        ("ZMM",Zmm,512,32),
        ("K",Opmask,64,8)
    ] {
        if let Some(digits) = name.strip_prefix(prefix) {
            if let Ok(n) = digits.parse::<usize>() {
                if digits.len() <= 2 && !digits.starts_with('0') || digits == "0" {
                    if n < count {
                        return Some(RegisterInfo { class, n_bits });
                    }
                }
            }
        }
    }
    // FPU stack notation ST(0)..ST(7)
    if name.len() == 5 && name.starts_with("ST(") && name.ends_with(')') {
        if let Ok(n) = name[3..4].parse::<usize>() {
            if n < 8 {
                return Some(RegisterInfo { class: Fpu, n_bits: 80 });
            }
        }
    }
    None
}

pub fn is_register(name: &str) -> bool {
    parse(name).is_some()
}

/// Register width in bits, 0 if not a register.
pub fn n_bits(name: &str) -> usize {
    match parse(name) {
        Some(info) => info.n_bits,
        None => 0
    }
}

/// True when the name is a general purpose register of the given width.
pub fn is_gp_register(name: &str, n_bits: usize) -> bool {
    match parse(name) {
        Some(info) => info.class == RegisterClass::GeneralPurpose && info.n_bits == n_bits,
        None => false
    }
}

pub fn class(name: &str) -> Option<RegisterClass> {
    parse(name).map(|info| info.class)
}

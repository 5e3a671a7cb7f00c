//! Line and operand parsing.
//!
//! `parse_line` carves a source line into label, mnemonic, argument strings,
//! and remark.  `Operand::new` classifies one argument as register,
//! immediate, or memory, trying them in that order; whatever fits none of
//! them is kept as `Unknown` rather than rejected.

use log::warn;
use super::handbook::mnemonics::MnemonicStore;
use super::{registers,tokenizer,AssemblerFlavor};

/// memory operand of the form `[base + index*scale + displacement]`
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct MemOperand {
    pub base: Option<String>,
    pub index: Option<String>,
    pub scale: i64,
    pub displacement: i64
}

#[derive(Debug,Clone,PartialEq,Eq)]
pub enum OperandKind {
    Reg(String),
    Imm(u64),
    Mem(MemOperand),
    Unknown
}

/// One classified operand.  `n_bits` is the register width, the immediate
/// storage need, or the memory access width; 0 when unknown.
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct Operand {
    text: String,
    pub kind: OperandKind,
    pub n_bits: usize
}

impl Operand {
    /// Classify one operand string.  EVEX decorations such as `{K1}`, `{Z}`,
    /// `{ER}`, `{SAE}`, and `{1TO8}` are stripped first.  For AT&T sources
    /// the `%` register and `$` immediate prefixes are accepted.
    pub fn new(token: &str, flavor: AssemblerFlavor) -> Self {
        let mut t = token.trim().to_uppercase();
        for decoration in ["{K0}","{K1}","{K2}","{K3}","{K4}","{K5}","{K6}","{K7}",
                           "{Z}","{ER}","{SAE}","{1TO4}","{1TO8}","{1TO16}"] {
            t = t.replace(decoration,"");
        }
        let bare = if flavor == AssemblerFlavor::Att {
            t.trim_start_matches(['%','$']).to_string()
        } else {
            t.clone()
        };
        if let Some(info) = registers::parse(&bare) {
            return Self { text: token.to_string(), kind: OperandKind::Reg(bare), n_bits: info.n_bits };
        }
        if let Some((value,n_bits)) = tokenizer::parse_constant(&bare) {
            return Self { text: token.to_string(), kind: OperandKind::Imm(value), n_bits };
        }
        if let Some((mem,n_bits)) = parse_mem_operand(&t) {
            return Self { text: token.to_string(), kind: OperandKind::Mem(mem), n_bits };
        }
        Self { text: token.to_string(), kind: OperandKind::Unknown, n_bits: 0 }
    }
    pub fn is_reg(&self) -> bool {
        matches!(self.kind,OperandKind::Reg(_))
    }
    pub fn is_imm(&self) -> bool {
        matches!(self.kind,OperandKind::Imm(_))
    }
    pub fn is_mem(&self) -> bool {
        matches!(self.kind,OperandKind::Mem(_))
    }
    /// Register name if this operand is a register.
    pub fn reg_name(&self) -> Option<&str> {
        match &self.kind {
            OperandKind::Reg(name) => Some(name),
            _ => None
        }
    }
    pub fn imm_value(&self) -> Option<u64> {
        match &self.kind {
            OperandKind::Imm(v) => Some(*v),
            _ => None
        }
    }
    /// Sign extend an immediate to the given width.  Anything else is left
    /// alone with a warning.
    pub fn sign_extend(&mut self, n_bits: usize) {
        match self.kind {
            OperandKind::Imm(ref mut v) => {
                if n_bits > self.n_bits {
                    let sign_bit = (*v >> (self.n_bits - 1)) & 1 == 1;
                    if sign_bit {
                        for bit in self.n_bits..n_bits {
                            *v |= 1u64 << bit;
                        }
                    }
                    self.n_bits = n_bits;
                }
            },
            _ => warn!("can only sign extend an immediate")
        }
    }
    /// Zero extend an immediate to the given width.
    pub fn zero_extend(&mut self, n_bits: usize) {
        match self.kind {
            OperandKind::Imm(_) => {
                if n_bits > self.n_bits {
                    self.n_bits = n_bits;
                }
            },
            _ => warn!("can only zero extend an immediate")
        }
    }
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f,"{}",self.text)
    }
}

/// Memory access width in bits as fixed by a width keyword prefix such as
/// `DWORD PTR`.  Defaults to 32 when no keyword fixes it.
pub fn get_n_bits_mem_operand(token: &str) -> usize {
    let s = token.trim_start().to_uppercase();
    for (prefix,n_bits) in [
        ("SBYTE",8usize),("BYTE",8),
        ("SWORD",16),
        ("SDWORD",32),("DWORD",32),
        ("QWORD",64),("TWORD",80),
        ("DQWORD",128),("OWORD",128),("XMMWORD",128),("XWORD",128),
        ("YMMWORD",256),("YWORD",256),
        ("ZMMWORD",512),("ZWORD",512),
        ("WORD",16)
    ] {
        if s.starts_with(prefix) {
            return n_bits;
        }
    }
    32
}

/// Parse a memory operand.  Everything between `[` and `]` is split on `+`
/// after folding `-` into a negative displacement flag; constants become the
/// displacement (a second constant is an error), the first register the
/// base, the second the index, and `reg*scale` fixes index and scale.
/// Scale must be 0, 1, 2, 4, or 8 and base and index must agree in width.
pub fn parse_mem_operand(token: &str) -> Option<(MemOperand,usize)> {
    if token.len() < 3 {
        return None;
    }
    let n_bits = get_n_bits_mem_operand(token);

    // select everything between the last [ and the last ]
    let begin = match token.rfind('[') {
        Some(i) => i + 1,
        None => token.len()
    };
    if begin >= token.len() {
        return None;
    }
    let end = match token[begin..].rfind(']') {
        Some(i) => begin + i,
        None => token.len()
    };
    let mut inner = token[begin..end].trim().to_string();
    if inner.len() == 0 {
        return None;
    }

    let negative_displacement = inner.contains('-');
    if negative_displacement {
        inner = inner.replace('-',"+");
    }
    let inner = inner.trim_start_matches('+').trim().to_uppercase();

    let mut base: Option<String> = None;
    let mut index: Option<String> = None;
    let mut scale: i64 = 0;
    let mut displacement: i64 = 0;
    let mut found_displacement = false;

    for part in inner.split('+') {
        let y = part.trim();
        if let Some((value,_)) = tokenizer::parse_constant(y) {
            if found_displacement {
                // a second displacement is an error
                return None;
            }
            found_displacement = true;
            displacement = if negative_displacement { -(value as i64) } else { value as i64 };
        } else {
            if registers::is_register(y) {
                if base.is_none() {
                    base = Some(y.to_string());
                } else {
                    index = Some(y.to_string());
                    scale = 1;
                }
            }
            if let Some((z0,z1)) = y.split_once('*') {
                let z0 = z0.trim();
                let z1 = z1.trim();
                if registers::is_register(z0) {
                    index = Some(z0.to_string());
                    scale = parse_scale(z1);
                } else if registers::is_register(z1) {
                    index = Some(z1.to_string());
                    scale = parse_scale(z0);
                }
            }
        }
    }
    if scale == -1 {
        return None;
    }
    if let (Some(b),Some(i)) = (&base,&index) {
        if registers::n_bits(b) != registers::n_bits(i) {
            return None;
        }
    }
    Some((MemOperand { base, index, scale, displacement },n_bits))
}

fn parse_scale(s: &str) -> i64 {
    match s {
        "0" => 0,
        "1" => 1,
        "2" => 2,
        "4" => 4,
        "8" => 8,
        _ => -1
    }
}

/// Result of `parse_line`: what was found, as strings (upper case for the
/// code part), plus the label span in the original line.
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct ParsedLine {
    pub label: Option<String>,
    pub label_pos: Option<(usize,usize)>,
    pub mnemonic: Option<String>,
    pub args: Vec<String>,
    pub remark: Option<String>
}

/// Parse one source line into label, mnemonic, arguments, and remark.  The
/// first keyword of the code part must be a known mnemonic or the line is
/// treated as having none; arguments split on `,` and are trimmed.
pub fn parse_line(line: &str, store: &MnemonicStore) -> ParsedLine {
    let mut ans = ParsedLine { label: None, label_pos: None, mnemonic: None, args: Vec::new(), remark: None };
    if line.len() == 0 {
        return ans;
    }
    let mut code_begin = 0;
    if let Some((b,e)) = tokenizer::get_label_def_pos(line) {
        ans.label = Some(line[b..e].to_string());
        ans.label_pos = Some((b,e));
        code_begin = e + 1; // skip the colon
        if line.len() > code_begin && line.as_bytes()[code_begin] == b':' {
            code_begin += 1; // and a second colon
        }
    }
    let mut code_end = line.len();
    if let Some((b,e)) = tokenizer::get_remark_pos(line) {
        ans.remark = Some(line[b..e].to_string());
        code_end = b;
    }
    if code_begin >= code_end {
        return ans;
    }
    let code = line[code_begin..code_end].trim().to_uppercase();
    if code.len() == 0 {
        return ans;
    }
    let (b,e) = tokenizer::get_keyword_pos(0,&code);
    let first = &code[b..e];
    if first.len() == 0 || !store.is_mnemonic(first) {
        return ans;
    }
    ans.mnemonic = Some(first.to_string());
    let args_str = code[e..].trim();
    if args_str.len() > 0 {
        ans.args = args_str.split(',').map(|s| s.trim().to_string()).collect();
    }
    ans
}

/// Build typed operands from argument strings.  The last argument is the
/// one still being typed at the cursor and is skipped; empty arguments
/// yield `None` placeholders.  For AT&T sources the kept operands come out
/// in reversed order.
pub fn make_operands(args: &[String], flavor: AssemblerFlavor) -> Vec<Option<Operand>> {
    if args.len() <= 1 {
        return Vec::new();
    }
    let mut ans = Vec::new();
    for arg in args.iter().take(args.len() - 1) {
        if arg.len() == 0 {
            ans.push(None);
        } else {
            ans.push(Some(Operand::new(arg,flavor)));
        }
    }
    if flavor == AssemblerFlavor::Att {
        ans.reverse();
    }
    ans
}

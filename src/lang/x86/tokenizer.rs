//! Keyword scanner for assembly source lines.
//!
//! A line is split into keyword spans without any grammar; separators and
//! remark characters drive everything.  Spans are `(begin,end,is_label_def)`
//! with half open byte offsets into the line.  Classification of the spans
//! into token types is done against the mnemonic store with one word of
//! lookahead and lookback for the cases the dictionary cannot settle.
//!
//! All structural characters are ASCII, so spans always fall on character
//! boundaries even when remarks carry multibyte text.

use log::trace;
use super::handbook::mnemonics::MnemonicStore;
use super::{registers,AssemblerFlavor,AsmTokenType};

/// span of one keyword: begin offset, end offset, label definition flag
pub type KeywordSpan = (usize,usize,bool);

pub fn is_remark_char(c: u8) -> bool {
    c == b'#' || c == b';'
}

pub fn is_separator_char(c: u8) -> bool {
    c.is_ascii_whitespace() || matches!(c, b',' | b'[' | b']' | b'(' | b')' | b'+' | b'-' | b'*' | b'{' | b'}' | b':')
}

/// Slice the keyword out of the line.
pub fn keyword<'a>(span: KeywordSpan, line: &'a str) -> &'a str {
    &line[span.0..span.1]
}

/// Split a line into keyword spans.  A remark char outside a string literal
/// turns the rest of the line into a single remark span.  A `:` closing the
/// first keyword on the line marks that keyword as a label definition.
/// Double quoted strings are kept as one keyword, quotes included.
pub fn split_into_keyword_pos(line: &str) -> Vec<KeywordSpan> {
    let mut list: Vec<KeywordSpan> = Vec::new();
    let buf = line.as_bytes();
    let n = buf.len();
    let mut keyword_begin = 0;
    let mut in_string_def = false;
    let mut is_first_keyword = true;

    for i in 0..n {
        let c = buf[i];
        if in_string_def {
            if c == b'"' {
                in_string_def = false;
                if keyword_begin < i {
                    list.push((keyword_begin,i+1,false));
                    is_first_keyword = false;
                }
                keyword_begin = i + 1;
            }
        } else if is_remark_char(c) {
            if keyword_begin < i {
                list.push((keyword_begin,i,false));
            }
            list.push((i,n,false));
            return list;
        } else if c == b'"' {
            if keyword_begin < i {
                list.push((keyword_begin,i,false));
                is_first_keyword = false;
            }
            in_string_def = true;
            keyword_begin = i;
        } else if is_separator_char(c) {
            if keyword_begin < i {
                let is_label = c == b':' && is_first_keyword;
                list.push((keyword_begin,i,is_label));
                is_first_keyword = false;
            }
            keyword_begin = i + 1;
        }
    }
    if keyword_begin < n {
        list.push((keyword_begin,n,false));
    }
    list
}

/// Offset range of the remark on this line, if any.  String literals hide
/// remark characters.
pub fn get_remark_pos(line: &str) -> Option<(usize,usize)> {
    let buf = line.as_bytes();
    let mut in_string_def = false;
    for i in 0..buf.len() {
        if buf[i] == b'"' {
            in_string_def = !in_string_def;
        } else if !in_string_def && is_remark_char(buf[i]) {
            return Some((i,buf.len()));
        }
    }
    None
}

fn get_label_def_pos_regular(line: &str) -> Option<(usize,usize)> {
    let buf = line.as_bytes();
    let n = buf.len();
    let mut i = 0;
    while i < n {
        let c = buf[i];
        if is_remark_char(c) {
            return None;
        }
        if !c.is_ascii_whitespace() {
            break;
        }
        i += 1;
    }
    if i >= n {
        return None;
    }
    let begin = i;
    while i < n {
        let c = buf[i];
        if c == b':' {
            return if i == begin { None } else { Some((begin,i)) };
        } else if is_remark_char(c) {
            return None;
        } else if is_separator_char(c) {
            // labels can only be the first keyword on a line
            break;
        }
        i += 1;
    }
    None
}

fn get_label_def_pos_masm(line: &str) -> Option<(usize,usize)> {
    let trimmed = line.trim_start();
    let leading = line.len() - trimmed.len();
    let upper = trimmed.to_uppercase();
    let displacement = if upper.starts_with("EXTRN") {
        5
    } else if upper.starts_with("EXTERN") {
        6
    } else {
        return None;
    };
    match get_label_def_pos_regular(&trimmed[displacement..]) {
        Some((b,e)) => Some((b + displacement + leading, e + displacement + leading)),
        None => None
    }
}

/// Offset range of a label definition on this line.  The regular `name:`
/// form is tried first, then the MASM `EXTRN name:` form.
pub fn get_label_def_pos(line: &str) -> Option<(usize,usize)> {
    match get_label_def_pos_regular(line) {
        Some(pos) => Some(pos),
        None => get_label_def_pos_masm(line)
    }
}

/// Number of bits needed to store the value, rounded up to 8, 16, 32, 64.
pub fn n_bits_storage_needed(v: u64) -> usize {
    if v & 0xFFFFFFFFFFFFFF00 == 0 {
        8
    } else if v & 0xFFFFFFFFFFFF0000 == 0 {
        16
    } else if v & 0xFFFFFFFF00000000 == 0 {
        32
    } else {
        64
    }
}

/// Parse a numeric constant in any of the assembler notations:
/// hex `0x12`/`12h`/`0h12`/`$012`, binary `0b1010`/`1010b`/`0y..`/`..y`,
/// octal `0o17`/`17q`/`17o`, decimal `0d18`/bare digits.  Underscores and
/// dots among the digits are ignored.  Returns the value and its storage
/// need in bits.
pub fn parse_constant(token: &str) -> Option<(u64,usize)> {
    let t = token.to_uppercase();
    let (digits,radix) = if t.len() > 1 && t.ends_with('H') {
        (t[..t.len()-1].to_string(),16)
    } else if t.starts_with("0H") || t.starts_with("0X") || t.starts_with("$0") {
        (t[2..].to_string(),16)
    } else if t.starts_with("0B") || t.starts_with("0Y") {
        (t[2..].to_string(),2)
    } else if t.len() > 1 && (t.ends_with('B') || t.ends_with('Y')) {
        (t[..t.len()-1].to_string(),2)
    } else if t.starts_with("0O") || t.starts_with("0Q") {
        (t[2..].to_string(),8)
    } else if t.len() > 1 && (t.ends_with('Q') || t.ends_with('O')) {
        (t[..t.len()-1].to_string(),8)
    } else if t.starts_with("0D") {
        (t[2..].to_string(),10)
    } else {
        (t.clone(),10)
    };
    let digits = digits.replace("_","").replace(".","");
    if digits.len() == 0 {
        return None;
    }
    match u64::from_str_radix(&digits,radix) {
        Ok(v) => Some((v,n_bits_storage_needed(v))),
        Err(_) => None
    }
}

/// Find the keyword around position `pos`.  A position just past a keyword
/// still finds it; the result is empty (`pos..pos`) only with separators on
/// both sides.
pub fn get_keyword_pos(pos: usize, line: &str) -> (usize,usize) {
    let buf = line.as_bytes();
    let n = buf.len();
    let mut begin = pos.min(n);
    while begin > 0 && !is_separator_char(buf[begin-1]) && !is_remark_char(buf[begin-1]) {
        begin -= 1;
    }
    let mut end = pos.min(n);
    while end < n && !is_separator_char(buf[end]) && !is_remark_char(buf[end]) {
        end += 1;
    }
    (begin,end)
}

/// The keyword preceding the one starting at `begin`, or empty when there
/// is none.
pub fn get_previous_keyword(begin: usize, line: &str) -> String {
    let buf = line.as_bytes();
    if begin == 0 {
        return String::new();
    }
    let mut end = begin.min(buf.len());
    while end > 0 && is_separator_char(buf[end-1]) {
        end -= 1;
    }
    if end == 0 {
        return String::new();
    }
    let mut start = end;
    while start > 0 && !is_separator_char(buf[start-1]) && !is_remark_char(buf[start-1]) {
        start -= 1;
    }
    line[start..end].to_string()
}

/// Directive names shared by the supported assemblers, plus the MASM set
/// the heuristics key on.
pub fn is_directive(upper: &str) -> bool {
    matches!(upper,
        "PROC" | "ENDP" | "EQU" | "LABEL" | "PROTO" | "ALIAS" | "INCLUDE" | "INCLUDELIB" |
        "SECTION" | "SEGMENT" | "ENDS" | "GLOBAL" | "EXTERN" | "EXTRN" | "PUBLIC" |
        "ORG" | "ALIGN" | "BITS" | "USE16" | "USE32" | "DEFAULT" | "STRUC" | "ENDSTRUC" |
        "DB" | "DW" | "DD" | "DQ" | "DT" | "DO" | "DY" | "DZ" |
        "RESB" | "RESW" | "RESD" | "RESQ" | "TIMES" | "END" | "MODEL" | "TITLE" |
        "MACRO" | "ENDM" | "IF" | "ELSE" | "ENDIF" | "%DEFINE" | "%MACRO" | "%ENDMACRO" |
        "%INCLUDE" | "%IF" | "%ELSE" | "%ENDIF")
}

/// Width and pointer keywords that can appear before a memory operand or a
/// jump target.
pub fn is_width_keyword(upper: &str) -> bool {
    matches!(upper,
        "PTR" | "BYTE" | "SBYTE" | "WORD" | "SWORD" | "DWORD" | "SDWORD" |
        "QWORD" | "TWORD" | "DQWORD" | "OWORD" | "XMMWORD" | "XWORD" |
        "YMMWORD" | "YWORD" | "ZMMWORD" | "ZWORD" | "SHORT" | "NEAR" | "FAR")
}

/// Split a line and classify every keyword span.  The dictionary is the
/// mnemonic store; what it cannot settle is resolved with one word of
/// lookahead (`PROC`/`EQU`/`LABEL`/`PROTO` make the previous word a label
/// definition) and lookback (`ALIAS` makes the next word a label
/// definition, `INCLUDE` makes it a filename).  A jump mnemonic consumes an
/// optional width keyword, an optional `PTR`, and then tags its target as a
/// label use.
pub fn classify(line: &str, store: &MnemonicStore, flavor: AssemblerFlavor) -> Vec<(KeywordSpan,AsmTokenType)> {
    // ascii case fold keeps byte offsets aligned with the original line
    let upper = line.to_ascii_uppercase();
    let pos = split_into_keyword_pos(&upper);
    let mut ans: Vec<(KeywordSpan,AsmTokenType)> = Vec::new();
    let n = pos.len();
    let mut k = 0;
    while k < n {
        let word = keyword(pos[k],&upper);
        let first_char = word.as_bytes().first().copied().unwrap_or(b' ');
        if is_remark_char(first_char) {
            ans.push((pos[k],AsmTokenType::Remark));
            k += 1;
            continue;
        }
        if pos[k].2 {
            // special MASM anonymous label, leave it untyped
            if word != "@@" {
                ans.push((pos[k],AsmTokenType::LabelDef));
            }
            k += 1;
            continue;
        }
        let reg_name = if flavor == AssemblerFlavor::Att {
            word.strip_prefix('%').unwrap_or(word)
        } else {
            word
        };
        if store.is_jump(word) {
            ans.push((pos[k],AsmTokenType::Jump));
            k += 1;
            if k == n {
                break;
            }
            let mut target = keyword(pos[k],&upper);
            if matches!(target, "SHORT" | "NEAR" | "WORD" | "DWORD" | "QWORD") {
                ans.push((pos[k],AsmTokenType::Misc));
                k += 1;
                if k == n {
                    break;
                }
                target = keyword(pos[k],&upper);
                if target == "PTR" {
                    ans.push((pos[k],AsmTokenType::Misc));
                    k += 1;
                    if k == n {
                        break;
                    }
                    target = keyword(pos[k],&upper);
                }
            }
            if registers::is_register(target) {
                ans.push((pos[k],AsmTokenType::Register));
            } else if !matches!(target, "$" | "@B" | "@F") {
                ans.push((pos[k],AsmTokenType::Label));
            }
            k += 1;
            continue;
        }
        if store.is_mnemonic(word) {
            ans.push((pos[k],AsmTokenType::Mnemonic));
        } else if registers::is_register(reg_name) {
            ans.push((pos[k],AsmTokenType::Register));
        } else if is_directive(word) {
            ans.push((pos[k],AsmTokenType::Directive));
        } else if is_width_keyword(word) {
            ans.push((pos[k],AsmTokenType::Misc));
        } else if parse_constant(word).is_some() {
            ans.push((pos[k],AsmTokenType::Constant));
        } else if word.starts_with('"') && word.ends_with('"') && word.len() > 1 {
            ans.push((pos[k],AsmTokenType::Constant));
        } else if flavor == AssemblerFlavor::Att && word.starts_with('$') && parse_constant(&word[1..]).is_some() {
            ans.push((pos[k],AsmTokenType::Constant));
        } else {
            let mut settled = false;
            // one word lookahead
            if k + 1 < n {
                match keyword(pos[k+1],&upper) {
                    "PROC" | "EQU" | "LABEL" => {
                        ans.push((pos[k],AsmTokenType::LabelDef));
                        ans.push((pos[k+1],AsmTokenType::Directive));
                        k += 1;
                        settled = true;
                    },
                    "PROTO" => {
                        // may coexist with a like-named PROC
                        ans.push((pos[k],AsmTokenType::LabelDefProto));
                        ans.push((pos[k+1],AsmTokenType::Directive));
                        k += 1;
                        settled = true;
                    },
                    _ => {}
                }
            }
            // one word lookback
            if !settled && k > 0 {
                match keyword(pos[k-1],&upper) {
                    "ALIAS" => {
                        ans.push((pos[k],AsmTokenType::LabelDef));
                        settled = true;
                    },
                    "INCLUDE" | "%INCLUDE" | "INCLUDELIB" => {
                        ans.push((pos[k],AsmTokenType::Misc));
                        settled = true;
                    },
                    _ => {}
                }
            }
            if !settled {
                trace!("cannot classify `{}`",word);
                ans.push((pos[k],AsmTokenType::Unknown));
            }
        }
        k += 1;
    }
    ans
}

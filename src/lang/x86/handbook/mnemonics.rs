//! The mnemonic store.
//!
//! Data rows are tab separated.  A 4 column row is a general description,
//! `{marker, mnemonic, description, html reference}`; a 5 or 6 column row is
//! one signature, `{mnemonic, operands, architectures, label, doc}` with an
//! obsolete sixth column ignored.  Rows starting with `;` are remarks.
//!
//! A default dataset is compiled in; external files can be layered on top
//! with `load_regular_data` (generated tables, first description wins) and
//! `load_handcrafted_data` (corrections, they always win).

use std::collections::{HashMap,HashSet};
use log::{error,warn};
use crate::STDRESULT;
use super::super::signature::SignatureElement;
use super::super::{Arch,AssemblerFlavor};

const TSV_STR: &str = include_str!("x86.tsv");

/// Conditional jumps and the other mnemonics whose operand is a code label.
const JUMP_MNEMONICS: [&str;40] = [
    "JMP","CALL",
    "JA","JAE","JB","JBE","JC","JE","JG","JGE","JL","JLE","JNA","JNAE",
    "JNB","JNBE","JNC","JNE","JNG","JNGE","JNL","JNLE","JNO","JNP","JNS",
    "JNZ","JO","JP","JPE","JPO","JS","JZ","JCXZ","JECXZ","JRCXZ",
    "LOOP","LOOPE","LOOPNE","LOOPNZ","LOOPZ"
];

pub struct MnemonicStore {
    signatures: HashMap<String,Vec<SignatureElement>>,
    arch: HashMap<String,HashSet<Arch>>,
    html_ref: HashMap<String,String>,
    description: HashMap<String,String>,
    att: bool
}

impl MnemonicStore {
    /// Store with the compiled-in dataset.  For AT&T sources the operand
    /// order of every signature is reversed as it is stored.
    pub fn new(flavor: AssemblerFlavor) -> Self {
        let mut ans = Self::empty(flavor);
        ans.load_str(TSV_STR,false);
        ans.fill_arch();
        ans
    }
    /// Store with no data at all, mostly for tests.
    pub fn empty(flavor: AssemblerFlavor) -> Self {
        Self {
            signatures: HashMap::new(),
            arch: HashMap::new(),
            html_ref: HashMap::new(),
            description: HashMap::new(),
            att: flavor == AssemblerFlavor::Att
        }
    }
    /// Add a signature.  An equal signature (same operands and archs) is
    /// removed first; returns whether that happened.
    fn add(&mut self, elem: SignatureElement) -> bool {
        let list = self.signatures.entry(elem.mnemonic.clone()).or_insert_with(Vec::new);
        let mut overwritten = false;
        if let Some(i) = list.iter().position(|e| e.operand_strs == elem.operand_strs && e.archs == elem.archs) {
            list.remove(i);
            overwritten = true;
        }
        list.push(elem);
        overwritten
    }
    /// Recompute each mnemonic's architecture set as the union over its
    /// signatures, excluding NONE.
    fn fill_arch(&mut self) {
        for (mnemonic,list) in &self.signatures {
            let mut archs: HashSet<Arch> = HashSet::new();
            for sig in list {
                for arch in &sig.archs {
                    if *arch != Arch::None {
                        archs.insert(*arch);
                    }
                }
            }
            self.arch.insert(mnemonic.clone(),archs);
        }
    }
    fn load_str(&mut self, txt: &str, handcrafted: bool) {
        for line in txt.lines() {
            if line.len() == 0 || line.starts_with(';') {
                continue;
            }
            let columns: Vec<&str> = line.split('\t').collect();
            match columns.len() {
                4 => {
                    let mnemonic = columns[1].trim().to_uppercase();
                    if mnemonic.len() == 0 {
                        warn!("missing mnemonic in line `{}`",line);
                        continue;
                    }
                    if handcrafted {
                        self.description.insert(mnemonic.clone(),columns[2].to_string());
                        self.html_ref.insert(mnemonic,columns[3].to_string());
                    } else {
                        // defined in multiple files: data from the first file wins
                        self.description.entry(mnemonic.clone()).or_insert_with(|| columns[2].to_string());
                        self.html_ref.entry(mnemonic).or_insert_with(|| columns[3].to_string());
                    }
                },
                5 | 6 => {
                    let mnemonic = columns[0].trim().to_uppercase();
                    if mnemonic.len() == 0 {
                        warn!("missing mnemonic in line `{}`",line);
                        continue;
                    }
                    let mut elem = SignatureElement::new(&mnemonic,columns[1],columns[2],columns[4],self.att);
                    elem.label = columns[3].to_string();
                    if self.add(elem) && !handcrafted {
                        warn!("signature already exists in line `{}`",line);
                    }
                },
                _ => {
                    warn!("funky line `{}`",line)
                }
            }
        }
    }
    /// Layer a generated signature file over the store.  A missing file is
    /// logged and the store is left as it was.
    pub fn load_regular_data(&mut self, path: &str) -> STDRESULT {
        match std::fs::read_to_string(path) {
            Ok(txt) => {
                self.load_str(&txt,false);
                self.fill_arch();
                Ok(())
            },
            Err(e) => {
                error!("could not read signature data `{}`",path);
                Err(Box::new(e))
            }
        }
    }
    /// Layer a handcrafted correction file over the store; its rows always
    /// win.  A missing file is logged and the store is left as it was.
    pub fn load_handcrafted_data(&mut self, path: &str) -> STDRESULT {
        match std::fs::read_to_string(path) {
            Ok(txt) => {
                self.load_str(&txt,true);
                self.fill_arch();
                Ok(())
            },
            Err(e) => {
                error!("could not read handcrafted data `{}`",path);
                Err(Box::new(e))
            }
        }
    }
    pub fn has_element(&self, mnemonic: &str) -> bool {
        self.signatures.contains_key(mnemonic)
    }
    pub fn is_mnemonic(&self, keyword: &str) -> bool {
        self.signatures.contains_key(keyword) || JUMP_MNEMONICS.contains(&keyword)
    }
    pub fn is_jump(&self, keyword: &str) -> bool {
        JUMP_MNEMONICS.contains(&keyword)
    }
    pub fn get_signatures(&self, mnemonic: &str) -> &[SignatureElement] {
        match self.signatures.get(mnemonic) {
            Some(list) => list,
            None => &[]
        }
    }
    pub fn get_arch(&self, mnemonic: &str) -> HashSet<Arch> {
        match self.arch.get(mnemonic) {
            Some(set) => set.clone(),
            None => HashSet::new()
        }
    }
    pub fn get_description(&self, mnemonic: &str) -> String {
        match self.description.get(mnemonic) {
            Some(d) => d.clone(),
            None => String::new()
        }
    }
    pub fn get_html_ref(&self, mnemonic: &str) -> String {
        match self.html_ref.get(mnemonic) {
            Some(url) => url.clone(),
            None => String::new()
        }
    }
    /// All known mnemonics, for completion lists.  Order is unspecified.
    pub fn mnemonics(&self) -> impl Iterator<Item = &String> {
        self.signatures.keys()
    }
}

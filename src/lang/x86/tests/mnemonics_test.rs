//! Test of the mnemonic store and its layered data files.

use std::io::Write;
use super::super::handbook::mnemonics::MnemonicStore;
use super::super::{Arch,AssemblerFlavor};

fn write_data(dir: &tempfile::TempDir, name: &str, rows: &[&str]) -> String {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("could not create data file");
    for row in rows {
        writeln!(file,"{}",row).expect("could not write data file");
    }
    path.to_str().expect("bad path").to_string()
}

mod builtin_data {
    use super::{MnemonicStore,Arch,AssemblerFlavor};
    #[test]
    fn common_mnemonics_present() {
        let store = MnemonicStore::new(AssemblerFlavor::Nasm);
        assert!(store.is_mnemonic("MOV"));
        assert!(store.is_mnemonic("VADDPS"));
        assert!(store.has_element("ADD"));
        assert!(store.get_signatures("MOV").len() > 0);
    }
    #[test]
    fn jumps_are_mnemonics_without_signatures() {
        let store = MnemonicStore::new(AssemblerFlavor::Nasm);
        assert!(store.is_jump("JNZ"));
        assert!(store.is_mnemonic("LOOPNE"));
        assert!(!store.is_jump("MOV"));
    }
    #[test]
    fn descriptions_and_references() {
        let store = MnemonicStore::new(AssemblerFlavor::Nasm);
        assert!(store.get_description("MOV").contains("Move"));
        assert!(store.get_html_ref("MOV").starts_with("https://"));
        assert_eq!(store.get_description("NO_SUCH"),String::new());
    }
    #[test]
    fn arch_union_excludes_none() {
        let store = MnemonicStore::new(AssemblerFlavor::Nasm);
        let archs = store.get_arch("MOV");
        assert!(archs.contains(&Arch::I8086));
        assert!(archs.contains(&Arch::X64));
        assert!(!archs.contains(&Arch::None));
    }
}

mod loading {
    use super::{write_data,MnemonicStore,AssemblerFlavor};
    #[test]
    fn five_and_six_column_rows() {
        let dir = tempfile::tempdir().expect("no temp dir");
        let path = write_data(&dir,"x.tsv",&[
            "; a remark row",
            "FROB\tR/M32,R32\t386\tFROB reg/mem32, reg32\tFrobnicate",
            "FROB\tR/M32,IMM8\t386\tFROB reg/mem32, imm8\tFrobnicate by imm8\tobsolete",
        ]);
        let mut store = MnemonicStore::empty(AssemblerFlavor::Nasm);
        store.load_regular_data(&path).expect("load failed");
        assert_eq!(store.get_signatures("FROB").len(),2);
    }
    #[test]
    fn duplicate_signature_is_replaced_not_doubled() {
        let dir = tempfile::tempdir().expect("no temp dir");
        let path = write_data(&dir,"x.tsv",&[
            "FROB\tR/M32,R32\t386\tFROB a\tfirst",
            "FROB\tR/M32,R32\t386\tFROB b\tsecond",
        ]);
        let mut store = MnemonicStore::empty(AssemblerFlavor::Nasm);
        store.load_regular_data(&path).expect("load failed");
        let sigs = store.get_signatures("FROB");
        assert_eq!(sigs.len(),1);
        assert_eq!(sigs[0].doc,"second");
    }
    #[test]
    fn funky_rows_are_skipped() {
        let dir = tempfile::tempdir().expect("no temp dir");
        let path = write_data(&dir,"x.tsv",&[
            "FROB\tonly three\tcolumns",
            "FROB\tR/M32,R32\t386\tFROB\tok",
        ]);
        let mut store = MnemonicStore::empty(AssemblerFlavor::Nasm);
        store.load_regular_data(&path).expect("load failed");
        assert_eq!(store.get_signatures("FROB").len(),1);
    }
    #[test]
    fn missing_file_leaves_store_usable() {
        let mut store = MnemonicStore::new(AssemblerFlavor::Nasm);
        assert!(store.load_regular_data("/no/such/file.tsv").is_err());
        assert!(store.is_mnemonic("MOV"));
    }
}

mod layering {
    use super::{write_data,MnemonicStore,AssemblerFlavor};
    #[test]
    fn regular_description_first_wins() {
        let dir = tempfile::tempdir().expect("no temp dir");
        let first = write_data(&dir,"a.tsv",&["-\tFROB\tfirst words\thttps://a"]);
        let second = write_data(&dir,"b.tsv",&["-\tFROB\tsecond words\thttps://b"]);
        let mut store = MnemonicStore::empty(AssemblerFlavor::Nasm);
        store.load_regular_data(&first).expect("load failed");
        store.load_regular_data(&second).expect("load failed");
        assert_eq!(store.get_description("FROB"),"first words");
        assert_eq!(store.get_html_ref("FROB"),"https://a");
    }
    #[test]
    fn handcrafted_description_overrides() {
        let dir = tempfile::tempdir().expect("no temp dir");
        let regular = write_data(&dir,"a.tsv",&["-\tFROB\tgenerated words\thttps://a"]);
        let fixes = write_data(&dir,"b.tsv",&["-\tFROB\tcorrected words\thttps://b"]);
        let mut store = MnemonicStore::empty(AssemblerFlavor::Nasm);
        store.load_regular_data(&regular).expect("load failed");
        store.load_handcrafted_data(&fixes).expect("load failed");
        assert_eq!(store.get_description("FROB"),"corrected words");
        assert_eq!(store.get_html_ref("FROB"),"https://b");
    }
}

mod att_mode {
    use super::{MnemonicStore,AssemblerFlavor};
    use super::super::super::operands::Operand;
    #[test]
    fn signatures_store_reversed_operands() {
        let store = MnemonicStore::new(AssemblerFlavor::Att);
        // MOV reg/mem8, imm8 becomes imm first in AT&T order
        let imm = Operand::new("$4",AssemblerFlavor::Att);
        let found = store.get_signatures("MOV").iter()
            .any(|sig| sig.operands.len() == 2 && sig.is_allowed_operand(&imm,0));
        assert!(found);
    }
}

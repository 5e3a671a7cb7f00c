//! Test of signature parsing, matching, and constraining.

use super::super::signature::SignatureElement;
use super::super::operands::Operand;
use super::super::AssemblerFlavor;

fn op(token: &str) -> Operand {
    Operand::new(token,AssemblerFlavor::Nasm)
}

fn sig(mnemonic: &str, operands: &str, archs: &str) -> SignatureElement {
    SignatureElement::new(mnemonic,operands,archs,"",false)
}

mod spec_parsing {
    use super::super::super::signature::parse_operand_spec;
    use super::super::super::signature::OperandCategory::*;
    #[test]
    fn reg_or_mem() {
        assert_eq!(parse_operand_spec("R/M32"),vec![R32,M32]);
        assert_eq!(parse_operand_spec("r/m8"),vec![R8,M8]);
    }
    #[test]
    fn simd_with_qualifiers() {
        assert_eq!(parse_operand_spec("XMM/M128{K}{Z}"),vec![XmmReg,M128,K,Z]);
        assert_eq!(parse_operand_spec("ZMM/M512/M32BCST{ER}"),vec![ZmmReg,M512,M32Bcst,Er]);
    }
    #[test]
    fn named_registers() {
        assert_eq!(parse_operand_spec("AL"),vec![RegAl]);
        assert_eq!(parse_operand_spec("CR0-CR7"),vec![Cr0,Cr1,Cr2,Cr3,Cr4,Cr5,Cr6,Cr7]);
    }
    #[test]
    fn relative_targets_are_immediates() {
        assert_eq!(parse_operand_spec("REL8"),vec![Imm8]);
        assert_eq!(parse_operand_spec("REL32"),vec![Imm32]);
    }
    #[test]
    fn unknown_is_logged_not_fatal() {
        assert_eq!(parse_operand_spec("NO_SUCH_SPEC"),vec![Unknown]);
    }
}

mod category_checks {
    use super::op;
    use super::super::super::signature::category_allows;
    use super::super::super::signature::OperandCategory::*;
    #[test]
    fn register_widths() {
        assert!(category_allows(R32,&op("EAX")));
        assert!(!category_allows(R32,&op("AX")));
        assert!(!category_allows(R32,&op("2")));
    }
    #[test]
    fn named_register() {
        assert!(category_allows(RegAl,&op("AL")));
        assert!(!category_allows(RegAl,&op("AH")));
    }
    #[test]
    fn memory_widths() {
        assert!(category_allows(M32,&op("[EAX]")));
        assert!(category_allows(M8,&op("BYTE [SI]")));
        assert!(!category_allows(M8,&op("[EAX]")));
    }
    #[test]
    fn immediates() {
        assert!(category_allows(Imm8,&op("2")));
        assert!(category_allows(Imm32,&op("0x12345678")));
        assert!(!category_allows(Imm8,&op("0x12345678")));
    }
    #[test]
    fn unity_and_zero() {
        assert!(category_allows(Unity,&op("1")));
        assert!(!category_allows(Unity,&op("2")));
        assert!(category_allows(Zero,&op("0")));
    }
    #[test]
    fn qualifiers_never_match_positionally() {
        assert!(!category_allows(Z,&op("EAX")));
        assert!(!category_allows(Er,&op("2")));
        assert!(!category_allows(Sae,&op("[EAX]")));
    }
    #[test]
    fn simd_register_classes() {
        assert!(category_allows(XmmReg,&op("XMM5")));
        assert!(!category_allows(XmmReg,&op("YMM5")));
        assert!(category_allows(K,&op("K3")));
    }
    #[test]
    fn unknown_accepts_anything() {
        assert!(category_allows(Unknown,&op("whatever")));
    }
}

mod elements {
    use super::{op,sig};
    use super::super::super::signature::SignatureElement;
    #[test]
    fn positions_and_alternatives() {
        let s = sig("MOV","R/M32,R32","386");
        assert_eq!(s.operands.len(),2);
        assert!(s.is_allowed_operand(&op("EAX"),0));
        assert!(s.is_allowed_operand(&op("[EBX]"),0));
        assert!(!s.is_allowed_operand(&op("2"),0));
        assert!(s.is_allowed_operand(&op("ECX"),1));
        assert!(!s.is_allowed_operand(&op("[EBX]"),1));
    }
    #[test]
    fn position_out_of_range() {
        let s = sig("MOV","R/M32,R32","386");
        assert!(!s.is_allowed_operand(&op("EAX"),2));
    }
    #[test]
    fn none_positions_are_dropped() {
        let s = sig("RET","NONE","8086");
        assert_eq!(s.operands.len(),0);
    }
    #[test]
    fn att_reverses_at_construction() {
        let s = SignatureElement::new("MOV","R/M32,IMM8","386","",true);
        assert!(s.is_allowed_operand(&op("2"),0));
        assert!(s.is_allowed_operand(&op("EAX"),1));
    }
    #[test]
    fn width_keyword_gate() {
        let s = sig("MOV","R/M32,R32","386");
        assert!(s.is_allowed_misc("DWORD",0));
        assert!(s.is_allowed_misc("PTR",0));
        assert!(!s.is_allowed_misc("BYTE",0));
        assert!(!s.is_allowed_misc("DWORD",1));
    }
    #[test]
    fn per_position_docs() {
        let s = sig("MOV","R/M32,R32","386");
        let docs = s.make_doc();
        assert_eq!(docs.len(),2);
        assert_eq!(docs[0],"32-bits register or 32-bits memory operand");
    }
}

mod constraining {
    use std::collections::HashSet;
    use super::{op,sig};
    use super::super::super::Arch;
    use super::super::super::signature::{constrain_signatures,active_parameter};
    #[test]
    fn operand_filter_preserves_order() {
        let candidates = vec![
            sig("ADD","R/M32,R32","386"),
            sig("ADD","R/M32,IMM32","386"),
        ];
        let selected = HashSet::from([Arch::I386]);
        let typed = vec![Some(op("EAX"))];
        let survivors = constrain_signatures(&candidates,&typed,&selected);
        assert_eq!(survivors.len(),2);
        let typed = vec![Some(op("EAX")),Some(op("0x12345678"))];
        let survivors = constrain_signatures(&candidates,&typed,&selected);
        assert_eq!(survivors.len(),1);
        assert_eq!(survivors[0].operand_strs[1],"IMM32");
    }
    #[test]
    fn holes_are_skipped() {
        let candidates = vec![sig("ADD","R/M32,IMM32","386")];
        let selected = HashSet::from([Arch::I386]);
        let typed = vec![None,Some(op("0x12345678"))];
        assert_eq!(constrain_signatures(&candidates,&typed,&selected).len(),1);
    }
    #[test]
    fn arch_gate() {
        let candidates = vec![sig("ADD","R/M64,R64","X64")];
        let typed: Vec<Option<super::super::super::operands::Operand>> = Vec::new();
        assert_eq!(constrain_signatures(&candidates,&typed,&HashSet::from([Arch::I386])).len(),0);
        assert_eq!(constrain_signatures(&candidates,&typed,&HashSet::from([Arch::X64])).len(),1);
    }
    #[test]
    fn active_parameter_caps_at_last() {
        let s = sig("ADD","R/M32,IMM32","386");
        assert_eq!(active_parameter("EAX",&s),0);
        assert_eq!(active_parameter("EAX, 2",&s),1);
        assert_eq!(active_parameter("EAX, 2, 3,",&s),1);
        let empty = sig("RET","NONE","8086");
        assert_eq!(active_parameter("",&empty),0);
    }
}

//! Test of line parsing and operand classification.

use super::super::operands::{Operand,MemOperand,parse_mem_operand,get_n_bits_mem_operand};
use super::super::AssemblerFlavor;

fn nasm(token: &str) -> Operand {
    Operand::new(token,AssemblerFlavor::Nasm)
}

fn mem(token: &str) -> (MemOperand,usize) {
    parse_mem_operand(&token.to_uppercase()).expect("expected a memory operand")
}

mod registers {
    use super::nasm;
    use super::super::super::AssemblerFlavor;
    use super::super::super::operands::Operand;
    #[test]
    fn plain() {
        let op = nasm("eax");
        assert!(op.is_reg());
        assert_eq!(op.reg_name(),Some("EAX"));
        assert_eq!(op.n_bits,32);
    }
    #[test]
    fn simd_with_decorations() {
        let op = nasm("zmm1{k1}{z}");
        assert!(op.is_reg());
        assert_eq!(op.reg_name(),Some("ZMM1"));
        assert_eq!(op.n_bits,512);
    }
    #[test]
    fn att_prefix() {
        let op = Operand::new("%xmm3",AssemblerFlavor::Att);
        assert_eq!(op.reg_name(),Some("XMM3"));
        assert_eq!(op.n_bits,128);
    }
}

mod immediates {
    use super::nasm;
    #[test]
    fn widths() {
        assert_eq!(nasm("2").imm_value(),Some(2));
        assert_eq!(nasm("2").n_bits,8);
        assert_eq!(nasm("0x12345678").n_bits,32);
    }
    #[test]
    fn sign_extend() {
        let mut op = nasm("0xFF");
        op.sign_extend(16);
        assert_eq!(op.imm_value(),Some(0xFFFF));
        assert_eq!(op.n_bits,16);
    }
    #[test]
    fn zero_extend() {
        let mut op = nasm("0xFF");
        op.zero_extend(16);
        assert_eq!(op.imm_value(),Some(0xFF));
        assert_eq!(op.n_bits,16);
    }
}

mod memory {
    use super::{mem,nasm};
    use super::super::super::operands::OperandKind;
    #[test]
    fn width_keywords() {
        use super::get_n_bits_mem_operand;
        assert_eq!(get_n_bits_mem_operand("BYTE [SI]"),8);
        assert_eq!(get_n_bits_mem_operand("WORD [SI]"),16);
        assert_eq!(get_n_bits_mem_operand("QWORD [RAX]"),64);
        assert_eq!(get_n_bits_mem_operand("ZMMWORD [RAX]"),512);
        // no width keyword defaults to 32
        assert_eq!(get_n_bits_mem_operand("[RAX]"),32);
        assert_eq!(get_n_bits_mem_operand("PTR [RAX]"),32);
    }
    #[test]
    fn base_only() {
        let (m,n_bits) = mem("[eax]");
        assert_eq!(m.base,Some("EAX".to_string()));
        assert_eq!(m.index,None);
        assert_eq!(m.scale,0);
        assert_eq!(n_bits,32);
    }
    #[test]
    fn base_index_scale_displacement() {
        let (m,_) = mem("dword ptr [ebx+ecx*4+8]");
        assert_eq!(m.base,Some("EBX".to_string()));
        assert_eq!(m.index,Some("ECX".to_string()));
        assert_eq!(m.scale,4);
        assert_eq!(m.displacement,8);
    }
    #[test]
    fn second_register_is_index() {
        let (m,_) = mem("[rax+rbx]");
        assert_eq!(m.base,Some("RAX".to_string()));
        assert_eq!(m.index,Some("RBX".to_string()));
        assert_eq!(m.scale,1);
    }
    #[test]
    fn negative_displacement() {
        let (m,n_bits) = mem("byte [si-2]");
        assert_eq!(m.base,Some("SI".to_string()));
        assert_eq!(m.displacement,-2);
        assert_eq!(n_bits,8);
    }
    #[test]
    fn scale_before_register() {
        let (m,_) = mem("[4*ecx]");
        assert_eq!(m.base,None);
        assert_eq!(m.index,Some("ECX".to_string()));
        assert_eq!(m.scale,4);
    }
    #[test]
    fn mixed_widths_rejected() {
        assert_eq!(super::super::super::operands::parse_mem_operand("[EAX+RBX]"),None);
    }
    #[test]
    fn bad_scale_rejected() {
        assert_eq!(super::super::super::operands::parse_mem_operand("[EBX+ECX*3]"),None);
    }
    #[test]
    fn two_displacements_rejected() {
        assert_eq!(super::super::super::operands::parse_mem_operand("[EBX+2+4]"),None);
    }
    #[test]
    fn unparseable_operand_is_unknown() {
        let op = nasm("[eax+rbx]");
        assert_eq!(op.kind,OperandKind::Unknown);
        assert_eq!(op.n_bits,0);
    }
}

mod lines {
    use super::super::super::operands::parse_line;
    use super::super::super::handbook::mnemonics::MnemonicStore;
    use super::super::super::AssemblerFlavor;
    #[test]
    fn full_line() {
        let store = MnemonicStore::new(AssemblerFlavor::Nasm);
        let parsed = parse_line("start: mov eax, 2 ; init",&store);
        assert_eq!(parsed.label,Some("start".to_string()));
        assert_eq!(parsed.label_pos,Some((0,5)));
        assert_eq!(parsed.mnemonic,Some("MOV".to_string()));
        assert_eq!(parsed.args,vec!["EAX".to_string(),"2".to_string()]);
        assert_eq!(parsed.remark,Some("; init".to_string()));
    }
    #[test]
    fn double_colon_label() {
        let store = MnemonicStore::new(AssemblerFlavor::Nasm);
        let parsed = parse_line("fin:: ret",&store);
        assert_eq!(parsed.label,Some("fin".to_string()));
        assert_eq!(parsed.mnemonic,Some("RET".to_string()));
    }
    #[test]
    fn unknown_mnemonic_gives_nothing() {
        let store = MnemonicStore::new(AssemblerFlavor::Nasm);
        let parsed = parse_line("frobnicate eax, 2",&store);
        assert_eq!(parsed.mnemonic,None);
        assert_eq!(parsed.args.len(),0);
    }
    #[test]
    fn remark_only() {
        let store = MnemonicStore::new(AssemblerFlavor::Nasm);
        let parsed = parse_line("; just a note",&store);
        assert_eq!(parsed.mnemonic,None);
        assert_eq!(parsed.remark,Some("; just a note".to_string()));
    }
}

mod operand_lists {
    use super::super::super::operands::make_operands;
    use super::super::super::AssemblerFlavor;
    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }
    #[test]
    fn last_argument_is_in_progress() {
        let ops = make_operands(&args(&["EAX","2"]),AssemblerFlavor::Nasm);
        assert_eq!(ops.len(),1);
        assert_eq!(ops[0].as_ref().unwrap().reg_name(),Some("EAX"));
    }
    #[test]
    fn trailing_comma_keeps_both() {
        let ops = make_operands(&args(&["EAX","2",""]),AssemblerFlavor::Nasm);
        assert_eq!(ops.len(),2);
        assert_eq!(ops[1].as_ref().unwrap().imm_value(),Some(2));
    }
    #[test]
    fn empty_argument_is_a_hole() {
        let ops = make_operands(&args(&["","2",""]),AssemblerFlavor::Nasm);
        assert_eq!(ops.len(),2);
        assert!(ops[0].is_none());
    }
    #[test]
    fn single_argument_gives_nothing() {
        assert_eq!(make_operands(&args(&["EAX"]),AssemblerFlavor::Nasm).len(),0);
        assert_eq!(make_operands(&args(&[]),AssemblerFlavor::Nasm).len(),0);
    }
    #[test]
    fn att_reverses_after_dropping() {
        let ops = make_operands(&args(&["%EAX","%EBX",""]),AssemblerFlavor::Att);
        assert_eq!(ops.len(),2);
        assert_eq!(ops[0].as_ref().unwrap().reg_name(),Some("EBX"));
        assert_eq!(ops[1].as_ref().unwrap().reg_name(),Some("EAX"));
    }
}

//! Tests of the x86 analysis layers, leaf first: tokenizer, operand
//! parser, signature matching, mnemonic store, label graph.

mod operands_test;
mod signature_test;
mod mnemonics_test;

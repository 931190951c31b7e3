pub mod bnf_input;
pub mod cpu;
pub mod tables;

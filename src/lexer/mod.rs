pub mod cpu;
pub mod tables;

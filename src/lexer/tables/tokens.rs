// src/lexer/tables/tokens.rs

// sentinels used in the dense exported tables
pub const INVALID_TOKEN: u32 = u32::MAX;
pub const INVALID_STATE: u32 = u32::MAX;

//! Calling convention names, indexed by the numeric code stored on a function.

use ahash::AHashMap as HashMap;
use once_cell::sync::Lazy;

/// Returned for any code outside the table.
pub const UNKNOWN_CALLING_CONVENTION: &str = "UnknownCallConv";

/// Calling convention names in code order (0x00..=0x19).
pub static CALLING_CONVENTIONS: [&str; 26] = [
    "NEAR_C",
    "FAR_C",
    "NEAR_PASCAL",
    "FAR_PASCAL",
    "NEAR_FAST",
    "FAR_FAST",
    "SKIPPED",
    "NEAR_STD",
    "FAR_STD",
    "NEAR_SYS",
    "FAR_SYS",
    "THISCALL",
    "MIPSCALL",
    "GENERIC",
    "ALPHACALL",
    "PPCCALL",
    "SHCALL",
    "ARMCALL",
    "AM33CALL",
    "TRICALL",
    "SH5CALL",
    "M32RCALL",
    "CLRCALL",
    "INLINE",
    "NEAR_VECTOR",
    "RESERVED",
];

static CODES_BY_NAME: Lazy<HashMap<&'static str, i32>> = Lazy::new(|| {
    CALLING_CONVENTIONS
        .iter()
        .enumerate()
        .map(|(code, name)| (*name, code as i32))
        .collect()
});

/// Name for a calling convention code.
pub fn calling_convention_name(code: i32) -> &'static str {
    usize::try_from(code)
        .ok()
        .and_then(|i| CALLING_CONVENTIONS.get(i))
        .copied()
        .unwrap_or(UNKNOWN_CALLING_CONVENTION)
}

/// Code for a calling convention name, as reported by symbol loaders.
pub fn calling_convention_code(name: &str) -> Option<i32> {
    CODES_BY_NAME.get(name).copied()
}

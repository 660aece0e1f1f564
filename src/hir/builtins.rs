//! The predefined-name fallback scope.
//!
//! Consulted last by the resolver. A user definition with one of these
//! names is a reserved-identifier error.

/// Predefined functions, sorted for binary search.
const PREDEFINED_FUNCTIONS: &[&str] = &[
    "char2int",
    "decvalue",
    "encvalue",
    "float2int",
    "int2char",
    "int2float",
    "int2oct",
    "int2str",
    "ischosen",
    "ispresent",
    "isvalue",
    "lengthof",
    "log2str",
    "oct2int",
    "regexp",
    "replace",
    "rnd",
    "sizeof",
    "str2int",
    "substr",
];

/// The canonical spelling of `name` when it is predefined.
pub fn builtin(name: &str) -> Option<&'static str> {
    PREDEFINED_FUNCTIONS
        .binary_search(&name)
        .ok()
        .map(|index| PREDEFINED_FUNCTIONS[index])
}

pub fn is_builtin(name: &str) -> bool {
    builtin(name).is_some()
}

pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    PREDEFINED_FUNCTIONS.iter().copied()
}

use std::sync::OnceLock;

use rustc_hash::FxHashMap;

use super::{Function, NamedConstant};

/// Accepted alternate spellings, keyed by lowercase name
const ALIASES: &[(&str, Function)] = &[
    ("ln", Function::Log),
    ("arcsin", Function::Asin),
    ("arccos", Function::Acos),
    ("arctan", Function::Atan),
];

/// Known misspellings corrected to canonical names
const MISSPELLINGS: &[(&str, Function)] = &[
    ("sine", Function::Sin),
    ("cosine", Function::Cos),
    ("tangent", Function::Tan),
    ("sqroot", Function::Sqrt),
    ("squareroot", Function::Sqrt),
    ("logarithm", Function::Log),
    ("exponential", Function::Exp),
];

/// Static registry storing every accepted function spelling
static FUNCTIONS: OnceLock<FxHashMap<&'static str, Function>> = OnceLock::new();

fn init_functions() -> FxHashMap<&'static str, Function> {
    let capacity = Function::ALL.len() + ALIASES.len() + MISSPELLINGS.len();
    let mut map = FxHashMap::with_capacity_and_hasher(capacity, Default::default());
    for func in Function::ALL {
        map.insert(func.name(), func);
    }
    for &(name, func) in ALIASES.iter().chain(MISSPELLINGS) {
        map.insert(name, func);
    }
    map
}

/// Look up a function by any accepted spelling - case-insensitive
pub(crate) fn lookup_function(name: &str) -> Option<Function> {
    let map = FUNCTIONS.get_or_init(init_functions);
    map.get(name).copied().or_else(|| {
        let lower = name.to_ascii_lowercase();
        map.get(lower.as_str()).copied()
    })
}

/// Look up a named constant. `pi` is case-insensitive; `e` must be lowercase so that
/// an upper-case `E` stays available as a symbol name.
pub(crate) fn lookup_constant(name: &str) -> Option<NamedConstant> {
    match name {
        "e" => Some(NamedConstant::E),
        "π" => Some(NamedConstant::Pi),
        _ if name.eq_ignore_ascii_case("pi") => Some(NamedConstant::Pi),
        _ => None,
    }
}

/// Names that cannot be used as the integration variable
pub(crate) fn is_reserved_name(name: &str) -> bool {
    lookup_function(name).is_some()
        || lookup_constant(name).is_some()
        || name.eq_ignore_ascii_case("abs")
}

/// All names the lexer may split a letter run into, longest first
pub(crate) fn splittable_names() -> &'static [&'static str] {
    static NAMES: OnceLock<Vec<&'static str>> = OnceLock::new();
    NAMES.get_or_init(|| {
        let mut names: Vec<&'static str> = FUNCTIONS
            .get_or_init(init_functions)
            .keys()
            .copied()
            .collect();
        names.push("pi");
        names.push("e");
        names.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        names
    })
}

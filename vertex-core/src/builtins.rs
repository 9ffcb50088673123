//! Runtime support for generated Python programs.
//!
//! This module describes the helper functions the code generator may
//! prepend to its output and the Python names a Vertex identifier must
//! not take, because the generated code relies on them.

/// Kind of helper, used by the generator to record which ones it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HelperKind {
    /// Integer division truncating toward zero.
    TruncatingDiv,
}

/// Metadata about a single helper function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeHelper {
    /// Python-level function name.
    pub name: &'static str,
    pub kind: HelperKind,
    /// Python definition, ending with a newline.
    pub definition: &'static str,
}

/// Prefix shared by every helper name. Vertex identifiers starting with
/// it are rejected so they can never shadow a helper.
pub const HELPER_PREFIX: &str = "_vx_";

/// Python's `//` floors toward negative infinity; Vertex `int / int`
/// truncates toward zero, so the quotient is computed on magnitudes.
pub const TRUNCATING_DIV: RuntimeHelper = RuntimeHelper {
    name: "_vx_div",
    kind: HelperKind::TruncatingDiv,
    definition: "def _vx_div(a, b):\n    q = abs(a) // abs(b)\n    return q if (a < 0) == (b < 0) else -q\n",
};

/// Every helper, in the order the generator emits the ones it uses.
pub const HELPERS: &[RuntimeHelper] = &[TRUNCATING_DIV];

impl HelperKind {
    pub fn helper(self) -> &'static RuntimeHelper {
        match self {
            HelperKind::TruncatingDiv => &TRUNCATING_DIV,
        }
    }
}

/// Python keywords that are not already Vertex keywords.
const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "except", "finally", "from", "global", "import", "in",
    "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try", "with", "yield",
];

/// Names Python refuses as assignment targets although they are not
/// keywords.
const PYTHON_CONSTANTS: &[&str] = &["__debug__"];

/// Python builtins referenced by generated code.
const PYTHON_BUILTINS_USED: &[&str] = &["print", "str", "abs"];

/// Returns true if a Vertex identifier cannot be emitted as-is.
pub fn is_reserved_name(name: &str) -> bool {
    name.starts_with(HELPER_PREFIX)
        || PYTHON_KEYWORDS.contains(&name)
        || PYTHON_CONSTANTS.contains(&name)
        || PYTHON_BUILTINS_USED.contains(&name)
}

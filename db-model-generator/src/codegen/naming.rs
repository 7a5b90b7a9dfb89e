//! Naming utilities for code generation

use heck::ToPascalCase;

/// Convert a table name to a class name (PascalCase)
pub fn to_class_name(table_name: &str) -> String {
    table_name.to_pascal_case()
}

/// Convert a table name to a form class name, e.g. "users" -> "UsersForm"
pub fn to_form_class_name(table_name: &str) -> String {
    format!("{}Form", to_class_name(table_name))
}

/// Human-readable label for a column, e.g. "email_address" -> "Email Address"
///
/// Underscores become spaces, then every letter after a non-letter is
/// uppercased and the rest lowercased. Case changes inside a word do not start
/// a new word, so "createdAt" becomes "Createdat".
pub fn to_label(column_name: &str) -> String {
    let mut label = String::with_capacity(column_name.len());
    let mut after_letter = false;
    for ch in column_name.chars().map(|c| if c == '_' { ' ' } else { c }) {
        if after_letter {
            label.extend(ch.to_lowercase());
        } else {
            label.extend(ch.to_uppercase());
        }
        after_letter = ch.is_alphabetic();
    }
    label
}

/// Check if a name is a Python reserved keyword
pub fn is_python_keyword(name: &str) -> bool {
    matches!(
        name,
        "False"
            | "None"
            | "True"
            | "and"
            | "as"
            | "assert"
            | "async"
            | "await"
            | "break"
            | "class"
            | "continue"
            | "def"
            | "del"
            | "elif"
            | "else"
            | "except"
            | "finally"
            | "for"
            | "from"
            | "global"
            | "if"
            | "import"
            | "in"
            | "is"
            | "lambda"
            | "nonlocal"
            | "not"
            | "or"
            | "pass"
            | "raise"
            | "return"
            | "try"
            | "while"
            | "with"
            | "yield"
    )
}

/// Attribute name for a column; keywords get a trailing underscore
pub fn escape_attribute_name(name: &str) -> String {
    if is_python_keyword(name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

/// Escape text for a single-quoted Python string literal
pub fn escape_single_quoted(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Escape text for a double-quoted Python string literal
pub fn escape_double_quoted(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

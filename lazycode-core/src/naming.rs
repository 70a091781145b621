//! Identifier style conversion.
//!
//! Inputs are expected in `lower_with_underscore` form, which is how
//! generators usually spell the names they derive from their own data.

/// Target style for [`format_ident`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentStyle {
    /// `HelloWorld`
    UpperCamelCase,
    /// `helloWorld`
    LowerCamelCase,
    /// `hello_world`
    LowerUnderscoreCase,
    /// `HELLO_WORLD`
    UpperUnderscoreCase,
}

/// Convert an underscore separated identifier to the given style.
///
/// Empty segments (leading, trailing or doubled underscores) are kept
/// by the underscore styles and dropped by the camel case styles.
pub fn format_ident(input: &str, style: IdentStyle) -> String {
    let parts = input.split('_');
    match style {
        IdentStyle::UpperCamelCase => parts.map(capitalize).collect(),
        IdentStyle::LowerCamelCase => {
            let mut words = parts.filter(|p| !p.is_empty());
            let first = words.next().map(str::to_lowercase).unwrap_or_default();
            words.fold(first, |mut acc, word| {
                acc.push_str(&capitalize(word));
                acc
            })
        }
        IdentStyle::LowerUnderscoreCase => parts
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("_"),
        IdentStyle::UpperUnderscoreCase => parts
            .map(str::to_uppercase)
            .collect::<Vec<_>>()
            .join("_"),
    }
}

/// Replace every character that cannot appear in a C-like identifier with `_`.
pub fn sanitize_ident(input: &str) -> String {
    input
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
    }
}

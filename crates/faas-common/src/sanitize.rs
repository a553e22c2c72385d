//! Transport-safe identifier sanitization.
//!
//! Dataset keys, column names and configuration list entries travel to the
//! remote service as plain ASCII. Accented and other non-ASCII characters are
//! transliterated to their closest ASCII equivalent.

use deunicode::deunicode_char;

/// Transliterate a string to ASCII.
///
/// ASCII characters pass through unchanged. Every other character is replaced
/// by its ASCII transliteration; a character without one is kept as-is.
///
/// # Examples
///
/// ```
/// use faas_common::sanitize_identifier;
///
/// assert_eq!(sanitize_identifier("preço"), "preco");
/// assert_eq!(sanitize_identifier("São Paulo"), "Sao Paulo");
/// assert_eq!(sanitize_identifier("sales_2020"), "sales_2020");
/// ```
pub fn sanitize_identifier(text: &str) -> String {
    if text.is_ascii() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii() {
            out.push(ch);
            continue;
        }
        match deunicode_char(ch) {
            Some(ascii) => out.push_str(ascii),
            None => out.push(ch),
        }
    }
    out
}

/// Sanitize every entry of a list of identifiers.
pub fn sanitize_all<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| sanitize_identifier(item.as_ref()))
        .collect()
}

/// Turn an identifier-style field name into a column header.
///
/// A space is inserted before every uppercase letter that follows a
/// non-whitespace character, the first character is uppercased, and the
/// result is trimmed. Strings that are already spaced pass through apart
/// from the leading capital, so formatting is idempotent.
///
/// ```
/// use rex_docs::title::format_title;
///
/// assert_eq!(format_title("propertyAddress"), "Property Address");
/// assert_eq!(format_title("noi"), "Noi");
/// ```
pub fn format_title(identifier: &str) -> String {
    let mut spaced = String::with_capacity(identifier.len() + 8);
    let mut prev: Option<char> = None;

    for c in identifier.chars() {
        if c.is_uppercase()
            && let Some(p) = prev
            && !p.is_whitespace()
        {
            spaced.push(' ');
        }
        spaced.push(c);
        prev = Some(c);
    }

    let trimmed = spaced.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

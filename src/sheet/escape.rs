/// Replace the five predefined XML entities with the characters they stand for.
///
/// `&amp;` is replaced last so an escaped entity such as `&amp;lt;` comes out
/// as the literal text `&lt;` rather than `<`.
pub fn unescape_xml(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }

    value
        .replace("&apos;", "'")
        .replace("&quot;", "\"")
        .replace("&gt;", ">")
        .replace("&lt;", "<")
        .replace("&amp;", "&")
}

/// Lower-cases a header cell, turns punctuation into spaces, and collapses whitespace so
/// "Employee Code *" and "employee_code" compare equal.
pub(crate) fn normalize_header(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let spaced: String = cleaned
        .chars()
        .map(|ch| if ch.is_alphanumeric() { ch } else { ' ' })
        .collect();
    let collapsed = spaced.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}

//! Naming-convention translation.
//!
//! The native system names members with lowercase words joined by `_`
//! (properties and signals may use `-`); the host convention is lower
//! camelCase. Translation is purely lexical and round-trips for names of
//! lowercase words joined by the native separator.

/// Replace the native system's `-` separator with `_`.
#[must_use]
pub fn hyphen_to_snake(name: &str) -> String {
    name.replace('-', "_")
}

/// `snake_case` to lower `camelCase`: separators removed, the following
/// character uppercased, leading character lowercased.
#[must_use]
pub fn snake_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.push(ch.to_ascii_uppercase());
            upper_next = false;
        } else if out.is_empty() {
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Lower `camelCase` to `snake_case`: an underscore lands between each
/// lowercase-to-uppercase boundary, then everything is lowercased.
#[must_use]
pub fn camel_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for ch in name.chars() {
        if ch.is_ascii_uppercase() && prev_lower {
            out.push('_');
        }
        prev_lower = ch.is_ascii_lowercase();
        out.push(ch.to_ascii_lowercase());
    }
    out
}

/// Native member name to the host convention.
#[must_use]
pub fn to_host_name(native: &str) -> String {
    snake_to_camel(&hyphen_to_snake(native))
}

/// Host member name to the native convention. Descriptor lookups treat
/// `-` and `_` as equal, so `_` is always produced here.
#[must_use]
pub fn to_native_name(host: &str) -> String {
    camel_to_snake(host)
}

/// Strip a `::detail` suffix from a signal name, if present. The detail
/// participates in connection, not in resolution.
#[must_use]
pub fn strip_detail(signal: &str) -> &str {
    match signal.rfind("::") {
        Some(at) => &signal[..at],
        None => signal,
    }
}

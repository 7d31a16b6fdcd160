//! Completing the partial addresses agents tend to type

/// Schemes written without `//`
const OPAQUE_SCHEMES: &[&str] = &["about:", "data:", "blob:", "javascript:", "view-source:"];

/// Hosts served over plain http by default
const LOOPBACK_HOSTS: &[&str] = &["localhost", "127.0.0.1"];

/// Turn a typed address into a loadable URL.
///
/// Addresses with a scheme and relative paths pass through. Loopback hosts
/// get `http://`, dotted hosts get `https://` and a bare word such as
/// `github` becomes `https://www.github.com`.
pub fn complete_url(input: &str) -> String {
    let input = input.trim();

    if has_scheme(input) || input.starts_with(['/', '.']) {
        return input.to_string();
    }

    let host_len = input.find(['/', ':', '?', '#']).unwrap_or(input.len());
    let (host, rest) = input.split_at(host_len);

    if LOOPBACK_HOSTS.contains(&host) {
        format!("http://{}", input)
    } else if host.contains('.') {
        format!("https://{}", input)
    } else {
        format!("https://www.{}.com{}", host, rest)
    }
}

fn has_scheme(input: &str) -> bool {
    if OPAQUE_SCHEMES.iter().any(|scheme| input.starts_with(scheme)) {
        return true;
    }

    match input.find("://") {
        Some(end) if end > 0 => input[..end]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')),
        _ => false,
    }
}

//! Port specification expansion.
//!
//! Turns a textual port spec ("80", "80,443,8080", "1-1024") into the concrete
//! list of ports to scan. The grammar is deliberately lenient: invalid tokens
//! in a comma list are skipped rather than failing the whole spec, and
//! duplicates are kept as written.

/// Lowest valid port number.
pub const PORT_MIN: u32 = 1;
/// Highest valid port number.
pub const PORT_MAX: u32 = 65535;

/// Expand a port specification into an ordered list of ports.
///
/// Supported forms:
/// - single port: `"80"`
/// - comma list: `"80,443,8080"` (invalid tokens silently skipped)
/// - inclusive range: `"1-1024"` (both bounds required, start <= end)
///
/// The comma form is checked before the range form, so a spec containing both
/// separators is treated as a comma list.
///
/// Returns an empty vector if the spec is invalid; callers treat that as a
/// configuration error.
pub fn expand(spec: &str) -> Vec<u16> {
    let spec = spec.trim();

    if !spec.contains('-') && !spec.contains(',') {
        return match spec.parse::<u32>() {
            Ok(p) if (PORT_MIN..=PORT_MAX).contains(&p) => vec![p as u16],
            _ => Vec::new(),
        };
    }

    if spec.contains(',') {
        return spec
            .split(',')
            .filter_map(|token| token.trim().parse::<u32>().ok())
            .filter(|p| (PORT_MIN..=PORT_MAX).contains(p))
            .map(|p| p as u16)
            .collect();
    }

    let bounds: Vec<&str> = spec.split('-').collect();
    if bounds.len() != 2 {
        return Vec::new();
    }

    let start = bounds[0].trim().parse::<u32>();
    let end = bounds[1].trim().parse::<u32>();

    match (start, end) {
        (Ok(start), Ok(end)) if start >= PORT_MIN && end <= PORT_MAX && start <= end => {
            (start..=end).map(|p| p as u16).collect()
        }
        _ => Vec::new(),
    }
}

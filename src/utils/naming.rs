/// Extensions eligible for WebP substitution and post-upload compression.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpeg", "jpg", "webp"];

/// Build a stored name of the form `{now_millis}_{stamp}_{original}`.
///
/// If the candidate already exists an incrementing disambiguator is inserted
/// directly after the timestamp (`{now_millis}2_...`, `{now_millis}3_...`)
/// until `exists` reports a free name. The check runs on every attempt:
/// rapid uploads can share a millisecond timestamp.
pub fn generate_stored_name(
    original: &str,
    now_millis: i64,
    stamp: &str,
    exists: impl Fn(&str) -> bool,
) -> String {
    let mut name = format!("{}_{}_{}", now_millis, stamp, original);
    let mut attempt: u64 = 1;
    while exists(&name) {
        attempt += 1;
        name = format!("{}{}_{}_{}", now_millis, attempt, stamp, original);
    }
    name
}

/// Replace the final extension segment (after the last `.`) with `webp`.
/// A name without a dot is returned unchanged.
pub fn rewrite_extension_to_webp(stored: &str) -> String {
    match stored.rfind('.') {
        Some(idx) => format!("{}.webp", &stored[..idx]),
        None => stored.to_string(),
    }
}

/// Recover the human-readable original name from a stored name.
///
/// Splits on the first occurrence of the literal `_{stamp}_` marker and
/// returns the portion after it. Names without the marker (files not
/// produced by this naming scheme) come back unchanged.
pub fn decode_original_name<'a>(stored: &'a str, stamp: &str) -> &'a str {
    let marker = format!("_{}_", stamp);
    match stored.find(&marker) {
        Some(idx) => &stored[idx + marker.len()..],
        None => stored,
    }
}

/// Whether the final extension is one of the supported image formats.
/// The comparison is case-sensitive, matching the upload wire contract.
pub fn has_image_extension(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((_, ext)) => IMAGE_EXTENSIONS.contains(&ext),
        None => false,
    }
}

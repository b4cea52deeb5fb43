//! Version compatibility between generated artifacts and this runtime

/// The runtime version baked into generated artifacts.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Whether an artifact generated with `generated` may run against this
/// runtime. Major versions must match; while the major version is 0 the
/// minor version must match as well.
pub fn version_compatible(generated: &str) -> bool {
    let parse = |v: &str| {
        let mut parts = v.split('.');
        let major: u32 = parts.next()?.parse().ok()?;
        let minor: u32 = parts.next()?.parse().ok()?;
        Some((major, minor))
    };
    match (parse(generated), parse(VERSION)) {
        (Some((gmaj, gmin)), Some((maj, min))) => gmaj == maj && (maj != 0 || gmin == min),
        _ => false,
    }
}

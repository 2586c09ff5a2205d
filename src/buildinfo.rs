/// Build metadata captured at compile time.
///
/// Mirrors what the `/build` endpoint and the startup banner report. Returns
/// `None` when the package metadata was not baked in (a non-cargo build).
pub fn build_info() -> Option<String> {
    let name = option_env!("CARGO_PKG_NAME")?;
    let version = option_env!("CARGO_PKG_VERSION")?;

    let mut out = format!("{name} {version}\n");
    if let Some(desc) = option_env!("CARGO_PKG_DESCRIPTION") {
        if !desc.is_empty() {
            out.push_str(desc);
            out.push('\n');
        }
    }
    // Populated by CI; absent in local builds.
    if let Some(hash) = option_env!("NETDIAG_GIT_HASH") {
        out.push_str("commit ");
        out.push_str(hash);
        out.push('\n');
    }
    Some(out)
}

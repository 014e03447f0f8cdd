/// Compile-time build metadata embedded by `build.rs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildMetadata {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub git_status: &'static str,
    pub timestamp: &'static str,
    pub target: &'static str,
    pub profile: &'static str,
    pub rustc: &'static str,
}

impl BuildMetadata {
    /// One-line summary for `version` output.
    pub fn summary(&self) -> String {
        let dirty = if self.git_status == "dirty" { "+dirty" } else { "" };
        format!(
            "beige_ledger {} ({}{}, {} {}, built {})",
            self.version, self.git_hash, dirty, self.target, self.profile, self.timestamp
        )
    }
}

pub fn current() -> BuildMetadata {
    BuildMetadata {
        version: env!("CARGO_PKG_VERSION"),
        git_hash: option_env!("BEIGE_LEDGER_BUILD_HASH").unwrap_or("unknown"),
        git_status: option_env!("BEIGE_LEDGER_BUILD_STATUS").unwrap_or("unknown"),
        timestamp: option_env!("BEIGE_LEDGER_BUILD_TIMESTAMP").unwrap_or("unknown"),
        target: option_env!("BEIGE_LEDGER_BUILD_TARGET").unwrap_or("unknown"),
        profile: option_env!("BEIGE_LEDGER_BUILD_PROFILE").unwrap_or("unknown"),
        rustc: option_env!("BEIGE_LEDGER_BUILD_RUSTC").unwrap_or("unknown"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_names_the_crate_version() {
        let meta = current();
        assert!(meta.summary().starts_with(&format!("beige_ledger {}", env!("CARGO_PKG_VERSION"))));
    }
}

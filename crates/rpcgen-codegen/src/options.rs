//! Per-target generation switches.

use serde::{Deserialize, Serialize};

/// Which blocks a generated unit contains.
///
/// Flags a target does not understand are ignored; `package` only matters
/// for Go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    pub include_server: bool,
    pub include_client: bool,
    pub omit_server_request_validation: bool,
    pub omit_client_request_validation: bool,
    pub omit_client_default_transport: bool,
    /// Go package clause. Defaults to `rpc`.
    pub package: Option<String>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            include_server: true,
            include_client: true,
            omit_server_request_validation: false,
            omit_client_request_validation: false,
            omit_client_default_transport: false,
            package: None,
        }
    }
}

impl GenerateOptions {
    /// Types only: no server, no client.
    pub fn types_only() -> Self {
        Self {
            include_server: false,
            include_client: false,
            ..Self::default()
        }
    }

    pub fn validates_on_server(&self) -> bool {
        self.include_server && !self.omit_server_request_validation
    }

    pub fn validates_on_client(&self) -> bool {
        self.include_client && !self.omit_client_request_validation
    }

    /// The validation block is emitted only when some side uses it.
    pub fn needs_validation(&self) -> bool {
        self.validates_on_server() || self.validates_on_client()
    }

    pub fn default_transport(&self) -> bool {
        self.include_client && !self.omit_client_default_transport
    }

    pub fn package_name(&self) -> &str {
        self.package.as_deref().unwrap_or("rpc")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_follows_included_sides() {
        let options = GenerateOptions {
            include_client: false,
            omit_server_request_validation: true,
            ..GenerateOptions::default()
        };
        assert!(!options.validates_on_server());
        assert!(!options.validates_on_client());
        assert!(!options.needs_validation());

        assert!(GenerateOptions::default().needs_validation());
        assert!(!GenerateOptions::types_only().needs_validation());
    }

    #[test]
    fn default_package_is_rpc() {
        assert_eq!(GenerateOptions::default().package_name(), "rpc");
    }
}

use std::{fmt::Display, str::FromStr};

use clap::ValueEnum;
use serde::Serialize;

/// MongoDB service a profile connects to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, ValueEnum)]
pub enum Service {
    #[default]
    #[value(name = "cloud")]
    #[serde(rename = "cloud")]
    Cloud,
    #[value(name = "cloudgov")]
    #[serde(rename = "cloudgov")]
    CloudGov,
    #[value(name = "cloud-manager")]
    #[serde(rename = "cloud-manager")]
    CloudManager,
    #[value(name = "ops-manager")]
    #[serde(rename = "ops-manager")]
    OpsManager,
}

impl Service {
    pub const ALL: [Service; 4] = [
        Service::Cloud,
        Service::CloudGov,
        Service::CloudManager,
        Service::OpsManager,
    ];

    pub const NAMES: [&'static str; 4] = ["cloud", "cloudgov", "cloud-manager", "ops-manager"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Cloud => "cloud",
            Service::CloudGov => "cloudgov",
            Service::CloudManager => "cloud-manager",
            Service::OpsManager => "ops-manager",
        }
    }

    /// Ops Manager is self-hosted, so a base URL is needed to reach it.
    pub fn requires_base_url(&self) -> bool {
        matches!(self, Service::OpsManager)
    }
}

impl Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Service::ALL
            .into_iter()
            .find(|service| service.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "'{s}' is not a supported service, use one of: {}",
                    Service::NAMES.join(", ")
                )
            })
    }
}

/// Output formats a profile can default to.
pub const OUTPUT_FORMATS: [&str; 2] = ["plaintext", "json"];

//! Property schema for profiles.
//!
//! Every setting the tool knows about is a variant of [`Property`]. The schema decides
//! where a property lives (inside a profile or at the top of the file), whether it is a
//! secret, whether `config set` may change it and how its raw value is validated.

use std::{fmt::Display, str::FromStr};

use serde::Serialize;
use url::Url;

use crate::{
    config::ConfigError,
    models::{OUTPUT_FORMATS, Service},
};

/// Length of a MongoDB ObjectID in its hex representation.
const OBJECT_ID_LEN: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Property {
    Service,
    PublicApiKey,
    PrivateApiKey,
    AccessToken,
    RefreshToken,
    OpsManagerUrl,
    OpsManagerCaCertificate,
    OpsManagerSkipVerify,
    ProjectId,
    OrgId,
    Output,
    MongoshPath,
    SkipUpdateCheck,
    TelemetryEnabled,
}

/// Where a property is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Profile,
    Global,
}

/// How the raw value of a property is validated and converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Text,
    Path,
    Url,
    ObjectId,
    Bool,
    Choice(&'static [&'static str]),
}

impl Property {
    pub const ALL: [Property; 14] = [
        Property::Service,
        Property::PublicApiKey,
        Property::PrivateApiKey,
        Property::AccessToken,
        Property::RefreshToken,
        Property::OpsManagerUrl,
        Property::OpsManagerCaCertificate,
        Property::OpsManagerSkipVerify,
        Property::ProjectId,
        Property::OrgId,
        Property::Output,
        Property::MongoshPath,
        Property::SkipUpdateCheck,
        Property::TelemetryEnabled,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Property::Service => "service",
            Property::PublicApiKey => "public_api_key",
            Property::PrivateApiKey => "private_api_key",
            Property::AccessToken => "access_token",
            Property::RefreshToken => "refresh_token",
            Property::OpsManagerUrl => "ops_manager_url",
            Property::OpsManagerCaCertificate => "ops_manager_ca_certificate",
            Property::OpsManagerSkipVerify => "ops_manager_skip_verify",
            Property::ProjectId => "project_id",
            Property::OrgId => "org_id",
            Property::Output => "output",
            Property::MongoshPath => "mongosh_path",
            Property::SkipUpdateCheck => "skip_update_check",
            Property::TelemetryEnabled => "telemetry_enabled",
        }
    }

    pub fn scope(self) -> Scope {
        match self {
            Property::MongoshPath | Property::SkipUpdateCheck | Property::TelemetryEnabled => {
                Scope::Global
            }
            _ => Scope::Profile,
        }
    }

    /// Secret properties go to the OS credential store when it is available.
    pub fn is_secure(self) -> bool {
        matches!(
            self,
            Property::PublicApiKey
                | Property::PrivateApiKey
                | Property::AccessToken
                | Property::RefreshToken
        )
    }

    /// Tokens are written by the login flow, never by hand.
    pub fn is_settable(self) -> bool {
        !matches!(self, Property::AccessToken | Property::RefreshToken)
    }

    pub fn is_boolean(self) -> bool {
        matches!(
            self,
            Property::OpsManagerSkipVerify | Property::SkipUpdateCheck | Property::TelemetryEnabled
        )
    }

    pub fn kind(self) -> PropertyKind {
        let name = self.name();

        if self.is_boolean() {
            PropertyKind::Bool
        } else if name.ends_with("_url") {
            PropertyKind::Url
        } else if name.ends_with("_id") {
            PropertyKind::ObjectId
        } else {
            match self {
                Property::Service => PropertyKind::Choice(&Service::NAMES),
                Property::Output => PropertyKind::Choice(&OUTPUT_FORMATS),
                Property::MongoshPath | Property::OpsManagerCaCertificate => PropertyKind::Path,
                _ => PropertyKind::Text,
            }
        }
    }

    /// Properties accepted by `config set`, in display order.
    pub fn settable() -> impl Iterator<Item = Property> {
        Property::ALL.into_iter().filter(|p| p.is_settable())
    }

    /// Look up a property by its stored name.
    pub fn from_name(name: &str) -> Option<Property> {
        Property::ALL.into_iter().find(|p| p.name() == name)
    }
}

impl Display for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses a property name given on the command line.
///
/// Unknown names are rejected with the allow-list, known names `config set` does not accept
/// with [`ConfigError::PropertyNotSettable`].
impl FromStr for Property {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Property::from_name(s) {
            Some(property) if property.is_settable() => Ok(property),
            Some(property) => Err(ConfigError::PropertyNotSettable(property.name().to_string())),
            None => Err(ConfigError::InvalidProperty {
                name: s.to_string(),
                allowed: Property::settable()
                    .map(Property::name)
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }
}

/// A stored property value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Bool(bool),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            Value::Bool(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::String(s) if s.is_empty())
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

/// Validate the raw value of a property and convert it into its stored form.
pub fn validate_value(property: Property, raw: &str) -> Result<Value, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        property: property.name().to_string(),
        reason,
    };

    match property.kind() {
        PropertyKind::Bool => parse_bool(raw)
            .map(Value::Bool)
            .ok_or_else(|| invalid(format!("'{raw}' is not a valid boolean"))),
        PropertyKind::Url => validate_url(raw).map(|_| Value::from(raw)).map_err(invalid),
        PropertyKind::ObjectId => validate_optional_object_id(raw)
            .map(|_| Value::from(raw))
            .map_err(invalid),
        PropertyKind::Choice(choices) => {
            if choices.contains(&raw) {
                Ok(Value::from(raw))
            } else {
                Err(invalid(format!(
                    "'{raw}' is not one of: {}",
                    choices.join(", ")
                )))
            }
        }
        PropertyKind::Text | PropertyKind::Path => Ok(Value::from(raw)),
    }
}

/// Parse a boolean the way the Atlas CLI family does: `true/t/yes/y/1` and `false/f/no/n/0`.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// An absolute http(s) URL with a host.
pub fn validate_url(raw: &str) -> Result<(), String> {
    let not_valid = || format!("'{raw}' is not a valid URL");

    let url = Url::parse(raw).map_err(|_| not_valid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(not_valid());
    }

    Ok(())
}

/// Empty, or a 24 character hex ObjectID.
pub fn validate_optional_object_id(raw: &str) -> Result<(), String> {
    if raw.is_empty() {
        return Ok(());
    }

    if raw.len() == OBJECT_ID_LEN && raw.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(format!("the provided value '{raw}' is not a valid ID"))
    }
}

use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Endpoint layout of the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiProfile {
    /// ConceptNet 5.4 style API, everything under `/data/{version}`
    #[default]
    Legacy,
    /// ConceptNet 5.8 style API served from the root
    Current,
}

impl ApiProfile {
    pub fn default_host(self) -> &'static str {
        match self {
            ApiProfile::Legacy => "conceptnet5.media.mit.edu",
            ApiProfile::Current => "api.conceptnet.io",
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            ApiProfile::Legacy => 80,
            ApiProfile::Current => 443,
        }
    }

    pub fn default_api_version(self) -> &'static str {
        match self {
            ApiProfile::Legacy => "5.4",
            ApiProfile::Current => "5.8.1",
        }
    }

    pub fn default_scheme(self) -> Scheme {
        match self {
            ApiProfile::Legacy => Scheme::Http,
            ApiProfile::Current => Scheme::Https,
        }
    }

    pub fn default_filter_policy(self) -> FilterPolicy {
        match self {
            ApiProfile::Legacy => FilterPolicy::Strict,
            ApiProfile::Current => FilterPolicy::Lenient,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Http => f.write_str("http"),
            Scheme::Https => f.write_str("https"),
        }
    }
}

/// How the `filter` option of association queries is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterPolicy {
    /// Filter must contain a concept URI
    Strict,
    /// Filter is forwarded as given
    Lenient,
}

/// Connection settings of a client. Immutable once built.
///
/// Every field falls back to its own default when it is missing or falsy
/// (empty string, zero port), independently of the other fields. Defaults
/// come from the selected [`ApiProfile`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ConfigOverrides")]
pub struct ClientConfig {
    host: String,
    port: u16,
    api_version: String,
    scheme: Scheme,
    profile: ApiProfile,
    filter_policy: FilterPolicy,
}

impl ClientConfig {
    /// Build a legacy-profile config, defaulting whatever is `None` or falsy.
    pub fn new(host: Option<&str>, port: Option<u16>, api_version: Option<&str>) -> Self {
        ConfigOverrides {
            host: host.map(str::to_string),
            port,
            api_version: api_version.map(str::to_string),
            ..Default::default()
        }
        .build()
    }

    /// Default settings of a profile
    pub fn for_profile(profile: ApiProfile) -> Self {
        ConfigOverrides::default().profile(profile).build()
    }

    pub fn builder() -> ConfigOverrides {
        ConfigOverrides::default()
    }

    pub fn load(path: &str) -> anyhow::Result<Self> {
        Ok(ConfigOverrides::load(path)?.build())
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn profile(&self) -> ApiProfile {
        self.profile
    }

    pub fn filter_policy(&self) -> FilterPolicy {
        self.filter_policy
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_profile(ApiProfile::default())
    }
}

/// Partially specified settings, as read from a config file or assembled
/// by a caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigOverrides {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default, deserialize_with = "port_from_number_or_string")]
    pub port: Option<u16>,
    #[serde(default, alias = "version")]
    pub api_version: Option<String>,
    #[serde(default)]
    pub scheme: Option<Scheme>,
    #[serde(default)]
    pub profile: Option<ApiProfile>,
    #[serde(default)]
    pub filter_policy: Option<FilterPolicy>,
}

impl ConfigOverrides {
    /// Read overrides from a JSON file without applying defaults yet
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path))?;
        let overrides: ConfigOverrides = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path))?;
        Ok(overrides)
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    pub fn scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = Some(scheme);
        self
    }

    pub fn profile(mut self, profile: ApiProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn filter_policy(mut self, policy: FilterPolicy) -> Self {
        self.filter_policy = Some(policy);
        self
    }

    /// Layer `other` on top of `self`; fields set in `other` win.
    pub fn merge(self, other: ConfigOverrides) -> Self {
        Self {
            host: other.host.or(self.host),
            port: other.port.or(self.port),
            api_version: other.api_version.or(self.api_version),
            scheme: other.scheme.or(self.scheme),
            profile: other.profile.or(self.profile),
            filter_policy: other.filter_policy.or(self.filter_policy),
        }
    }

    pub fn build(self) -> ClientConfig {
        let profile = self.profile.unwrap_or_default();
        ClientConfig {
            host: self
                .host
                .filter(|h| !h.is_empty())
                .unwrap_or_else(|| profile.default_host().to_string()),
            port: self
                .port
                .filter(|&p| p != 0)
                .unwrap_or_else(|| profile.default_port()),
            api_version: self
                .api_version
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| profile.default_api_version().to_string()),
            scheme: self.scheme.unwrap_or_else(|| profile.default_scheme()),
            profile,
            filter_policy: self
                .filter_policy
                .unwrap_or_else(|| profile.default_filter_policy()),
        }
    }
}

impl From<ConfigOverrides> for ClientConfig {
    fn from(overrides: ConfigOverrides) -> Self {
        overrides.build()
    }
}

fn port_from_number_or_string<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Option::<Port>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Port::Number(p)) => Ok(Some(p)),
        Some(Port::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Port::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid port: {}", s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.host(), "conceptnet5.media.mit.edu");
        assert_eq!(config.port(), 80);
        assert_eq!(config.api_version(), "5.4");
        assert_eq!(config.scheme(), Scheme::Http);
        assert_eq!(config.filter_policy(), FilterPolicy::Strict);
    }

    #[test]
    fn test_explicit_values_round_trip() {
        let config = ClientConfig::new(Some("10.0.0.1"), Some(1234), Some("5.3"));
        assert_eq!(config.host(), "10.0.0.1");
        assert_eq!(config.port(), 1234);
        assert_eq!(config.api_version(), "5.3");
    }

    #[test]
    fn test_fields_default_independently() {
        let config = ClientConfig::new(None, None, Some("5.3"));
        assert_eq!(config.host(), "conceptnet5.media.mit.edu");
        assert_eq!(config.port(), 80);
        assert_eq!(config.api_version(), "5.3");

        let config = ClientConfig::new(Some(""), Some(0), None);
        assert_eq!(config.host(), "conceptnet5.media.mit.edu");
        assert_eq!(config.port(), 80);
        assert_eq!(config.api_version(), "5.4");

        let config = ClientConfig::new(None, Some(8084), None);
        assert_eq!(config.host(), "conceptnet5.media.mit.edu");
        assert_eq!(config.port(), 8084);
    }

    #[test]
    fn test_current_profile_defaults() {
        let config = ClientConfig::for_profile(ApiProfile::Current);
        assert_eq!(config.host(), "api.conceptnet.io");
        assert_eq!(config.port(), 443);
        assert_eq!(config.api_version(), "5.8.1");
        assert_eq!(config.scheme(), Scheme::Https);
        assert_eq!(config.filter_policy(), FilterPolicy::Lenient);

        let strict = ClientConfig::builder()
            .profile(ApiProfile::Current)
            .filter_policy(FilterPolicy::Strict)
            .build();
        assert_eq!(strict.filter_policy(), FilterPolicy::Strict);
        assert_eq!(strict.host(), "api.conceptnet.io");
    }

    #[test]
    fn test_deserialize_from_json() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"host": "localhost", "port": "8084", "version": "5.5"}"#)
                .unwrap();
        assert_eq!(config.host(), "localhost");
        assert_eq!(config.port(), 8084);
        assert_eq!(config.api_version(), "5.5");
        assert_eq!(config.profile(), ApiProfile::Legacy);

        let config: ClientConfig =
            serde_json::from_str(r#"{"host": "", "port": null, "profile": "current"}"#).unwrap();
        assert_eq!(config.host(), "api.conceptnet.io");
        assert_eq!(config.port(), 443);
    }

    #[test]
    fn test_merge_prefers_later_values() {
        let base = ConfigOverrides::default().host("a.example").port(81);
        let merged = base.merge(ConfigOverrides::default().port(82)).build();
        assert_eq!(merged.host(), "a.example");
        assert_eq!(merged.port(), 82);
        assert_eq!(merged.api_version(), "5.4");

        // A later profile still changes the defaults of unset fields
        let merged = ConfigOverrides::default()
            .port(81)
            .merge(ConfigOverrides::default().profile(ApiProfile::Current))
            .build();
        assert_eq!(merged.host(), "api.conceptnet.io");
        assert_eq!(merged.port(), 81);
    }
}

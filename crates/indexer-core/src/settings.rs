//! Settings domain types, layered loading and validation.
//!
//! Settings are read from `appsettings.json`, then
//! `appsettings.{environment}.json`, then environment variables, with later
//! sources overriding earlier ones. Keys match case-insensitively; nested
//! keys in environment variables are separated by `__` (e.g.
//! `ServiceDiscovery__ServerAddress`).

use std::fmt;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat, Source};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Base settings file name.
pub const SETTINGS_FILE: &str = "appsettings.json";

/// Environment used when none is specified.
pub const DEFAULT_ENVIRONMENT: &str = "Production";

/// Separator for nested keys in environment variable names.
const ENV_NESTING_SEPARATOR: &str = "__";

const SERVICE_DISCOVERY: &str = "ServiceDiscovery";
const SERVICE_TAGS: &str = "ServiceTags";
const SECURITY_TOKEN: &str = "SecurityToken";
const LEGACY_SECURITY_TOKEN: &str = "SecureToken";

/// Recognised top-level keys in their canonical case.
const TOP_LEVEL_KEYS: &[&str] = &[
    "AzureSearchServiceName",
    "AzureSearchIndexName",
    "AzureSearchApiKey",
    SECURITY_TOKEN,
    LEGACY_SECURITY_TOKEN,
    "OAuthAuthority",
    "OAuthAudience",
    SERVICE_DISCOVERY,
];

const SERVICE_DISCOVERY_KEYS: &[&str] = &[
    "ServerAddress",
    "ServiceId",
    "ServiceName",
    "ServiceAddress",
    "ServicePort",
    SERVICE_TAGS,
];

/// Application settings.
///
/// All fields are optional; blank values are treated the same as missing ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct IndexerSettings {
    /// Name of the Azure Cognitive Search service (`<name>.search.windows.net`).
    pub azure_search_service_name: Option<String>,

    /// Name of the index holding documents.
    pub azure_search_index_name: Option<String>,

    /// Admin API key for the search service.
    pub azure_search_api_key: Option<String>,

    /// Static token accepted via `Authorization: SecureToken <token>`.
    #[serde(alias = "SecureToken")]
    pub security_token: Option<String>,

    /// OAuth/OIDC authority used to validate bearer tokens.
    #[serde(rename = "OAuthAuthority")]
    pub oauth_authority: Option<String>,

    /// Expected `aud` claim of bearer tokens.
    #[serde(rename = "OAuthAudience")]
    pub oauth_audience: Option<String>,

    /// Service discovery registration.
    pub service_discovery: Option<ServiceDiscoverySettings>,
}

/// Registration details for the service discovery agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServiceDiscoverySettings {
    /// Base address of the discovery agent, e.g. `http://localhost:8500`.
    pub server_address: Option<String>,
    pub service_id: Option<String>,
    pub service_name: Option<String>,
    /// Address other services should use to reach this one.
    pub service_address: Option<String>,
    #[serde(deserialize_with = "port_from_number_or_string")]
    pub service_port: Option<u16>,
    pub service_tags: Vec<String>,
}

impl ServiceDiscoverySettings {
    /// The discovery agent address, if registration is configured.
    pub fn server_address(&self) -> Option<&str> {
        non_blank(self.server_address.as_ref())
    }
}

impl IndexerSettings {
    /// Search service name, if set.
    pub fn service_name(&self) -> Option<&str> {
        non_blank(self.azure_search_service_name.as_ref())
    }

    /// Index name, if set.
    pub fn index_name(&self) -> Option<&str> {
        non_blank(self.azure_search_index_name.as_ref())
    }

    /// Search service API key, if set.
    pub fn api_key(&self) -> Option<&str> {
        non_blank(self.azure_search_api_key.as_ref())
    }

    /// Static security token, if set.
    pub fn security_token(&self) -> Option<&str> {
        non_blank(self.security_token.as_ref())
    }

    /// OAuth authority, if set.
    pub fn oauth_authority(&self) -> Option<&str> {
        non_blank(self.oauth_authority.as_ref())
    }

    /// OAuth audience, if set.
    pub fn oauth_audience(&self) -> Option<&str> {
        non_blank(self.oauth_audience.as_ref())
    }

    /// Whether the search service is configured well enough to be called.
    ///
    /// Uploads and deletes are silently skipped when this is `false`.
    pub fn is_search_index_enabled(&self) -> bool {
        self.service_name().is_some() && self.api_key().is_some()
    }

    /// Whether any authentication scheme is configured.
    pub fn is_auth_enabled(&self) -> bool {
        self.security_token().is_some() || self.oauth_authority().is_some()
    }

    /// Load settings from `dir` for the given environment, then apply
    /// overrides from the process environment.
    pub fn load(dir: &Path, environment: &str) -> Result<Self, SettingsError> {
        Self::load_with_env(dir, environment, std::env::vars())
    }

    /// Load settings using an explicit set of environment variables.
    pub fn load_with_env(
        dir: &Path,
        environment: &str,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();

        for path in settings_files(dir, environment) {
            tracing::debug!(target: "indexer.settings", path = %path.display(), "Reading settings file");
            let file = File::from(path).format(FileFormat::Json).required(false);
            builder = builder.add_source(canonical_layer(file)?);
        }

        let env = Environment::default()
            .separator(ENV_NESTING_SEPARATOR)
            .source(Some(vars.into_iter().collect::<config::Map<String, String>>()));
        builder = builder.add_source(canonical_layer(env)?);

        Ok(builder.build()?.try_deserialize()?)
    }
}

/// Settings files in the order they are applied.
fn settings_files(dir: &Path, environment: &str) -> Vec<PathBuf> {
    let mut files = vec![dir.join(SETTINGS_FILE)];
    if !environment.trim().is_empty() {
        files.push(dir.join(format!("appsettings.{}.json", environment.trim())));
    }
    files
}

/// Collect one source on its own and rename its keys to their canonical case.
///
/// Each layer is normalised before merging so that differently cased keys
/// from different sources override each other instead of coexisting.
fn canonical_layer<S>(source: S) -> Result<Config, SettingsError>
where
    S: Source + Send + Sync + 'static,
{
    let raw: Value = Config::builder()
        .add_source(source)
        .build()?
        .try_deserialize()?;
    Ok(Config::try_from(&Value::Object(canonical_keys(raw)))?)
}

/// Keep recognised keys only, in canonical case. `SecureToken` folds into
/// `SecurityToken`; the canonical key wins when both are set.
fn canonical_keys(raw: Value) -> Map<String, Value> {
    let mut layer = Map::new();
    let Value::Object(entries) = raw else {
        return layer;
    };

    for (key, value) in entries {
        let Some(name) = canonical_key(TOP_LEVEL_KEYS, &key) else {
            continue;
        };
        let value = match (name, value) {
            (SERVICE_DISCOVERY, Value::Object(nested)) => Value::Object(canonical_discovery(nested)),
            (SERVICE_DISCOVERY, _) => continue,
            (_, value) => value,
        };
        layer.insert(name.to_string(), value);
    }

    if let Some(legacy) = layer.remove(LEGACY_SECURITY_TOKEN) {
        layer.entry(SECURITY_TOKEN).or_insert(legacy);
    }
    layer
}

fn canonical_discovery(entries: Map<String, Value>) -> Map<String, Value> {
    entries
        .into_iter()
        .filter_map(|(key, value)| {
            let name = canonical_key(SERVICE_DISCOVERY_KEYS, &key)?;
            let value = if name == SERVICE_TAGS {
                tag_list(value)
            } else {
                value
            };
            Some((name.to_string(), value))
        })
        .collect()
}

fn canonical_key(known: &[&'static str], key: &str) -> Option<&'static str> {
    known.iter().copied().find(|k| k.eq_ignore_ascii_case(key))
}

/// Tags set from the environment arrive indexed (`ServiceTags__0`) or as a
/// comma separated string.
fn tag_list(value: Value) -> Value {
    match value {
        Value::Object(indexed) => {
            let mut tags: Vec<(usize, Value)> = indexed
                .into_iter()
                .filter_map(|(index, tag)| Some((index.parse().ok()?, tag)))
                .collect();
            tags.sort_by_key(|(index, _)| *index);
            Value::Array(tags.into_iter().map(|(_, tag)| tag).collect())
        }
        Value::String(list) => Value::Array(
            list.split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(|tag| Value::String(tag.to_string()))
                .collect(),
        ),
        other => other,
    }
}

fn port_from_number_or_string<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPort {
        Number(u16),
        Text(String),
    }

    match Option::<RawPort>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawPort::Number(port)) => Ok(Some(port)),
        Some(RawPort::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawPort::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid port: {text}"))),
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// Settings loading and validation errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Missing setting: {0}")]
    Missing(SettingKey),

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: String, message: String },
}

/// Settings keys referenced by validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    AzureSearchIndexName,
    OAuthAuthority,
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AzureSearchIndexName => f.write_str("AzureSearchIndexName"),
            Self::OAuthAuthority => f.write_str("OAuthAuthority"),
        }
    }
}

/// Validate settings before the service starts.
pub fn validate_settings(settings: &IndexerSettings) -> Result<(), SettingsError> {
    if settings.is_search_index_enabled() && settings.index_name().is_none() {
        return Err(SettingsError::Missing(SettingKey::AzureSearchIndexName));
    }

    if settings.oauth_audience().is_some() && settings.oauth_authority().is_none() {
        return Err(SettingsError::Missing(SettingKey::OAuthAuthority));
    }

    if let Some(authority) = settings.oauth_authority() {
        if !(authority.starts_with("https://") || authority.starts_with("http://")) {
            return Err(SettingsError::Invalid {
                key: SettingKey::OAuthAuthority.to_string(),
                message: format!("expected an http(s) URL, got '{authority}'"),
            });
        }
    }

    if let Some(discovery) = &settings.service_discovery {
        if let Some(address) = discovery.server_address() {
            if !(address.starts_with("https://") || address.starts_with("http://")) {
                return Err(SettingsError::Invalid {
                    key: "ServiceDiscovery.ServerAddress".to_string(),
                    message: format!("expected an http(s) URL, got '{address}'"),
                });
            }
        }
    }

    Ok(())
}

//! Sample configuration loaded from a `config.properties` file.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ConfigError;

/// Base URL of the Syncplicity API gateway.
pub const DEFAULT_BASE_API_ENDPOINT: &str = "https://api.syncplicity.com/";

/// Password assigned to users created by the provisioning sample.
pub const SIMPLE_PASSWORD: &str = "123123aA";

/// Prefix of the group name used by the provisioning sample.
pub const GROUP_NAME_PREFIX: &str = "SampleAppGroup-";

/// `key=value`, `key: value` or `key value`. Separators escaped with `\`
/// belong to the key.
static PROPERTY_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*((?:\\.|[^=:\s\\])+)\s*[=:]?\s*(.*)$").expect("Invalid property line regex")
});

/// Key/value pairs parsed from a Java-style properties file.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    values: HashMap<String, String>,
}

impl Properties {
    /// Parse properties text. Blank lines and lines starting with `#` or `!`
    /// are ignored, a trailing `\` continues the entry on the next line and
    /// backslash escapes are resolved in keys and values.
    pub fn parse(content: &str) -> Self {
        let values = logical_lines(content)
            .iter()
            .filter_map(|line| PROPERTY_LINE_REGEX.captures(line))
            .map(|captures| (unescape(&captures[1]), unescape(&captures[2])))
            .collect();

        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Property value with the committed placeholder collapsed to empty.
    fn value_without_placeholder(&self, key: &str, placeholder: &str) -> String {
        match self.get(key) {
            Some(value) if value != placeholder => value.to_string(),
            _ => String::new(),
        }
    }
}

/// Settings for the sample application.
#[derive(Debug, Clone)]
pub struct Config {
    /// Application key allocated by the developer portal.
    pub app_key: String,
    /// Application secret allocated by the developer portal.
    pub app_secret: String,
    /// Per-user admin token configured in the Syncplicity admin console.
    pub admin_token: String,
    /// Owner email of the sandbox account.
    pub owner_email: String,
    /// Use a machine token for storage vault calls.
    pub machine_token_auth_enabled: bool,
    pub machine_token: String,
    pub storage_token: String,
    /// Local file uploaded by the content sample, if any.
    pub upload_file_path: Option<PathBuf>,
    /// Gateway base URL, always ending with `/`.
    pub base_api_endpoint: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_key: String::new(),
            app_secret: String::new(),
            admin_token: String::new(),
            owner_email: String::new(),
            machine_token_auth_enabled: false,
            machine_token: String::new(),
            storage_token: String::new(),
            upload_file_path: None,
            base_api_endpoint: DEFAULT_BASE_API_ENDPOINT.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a properties file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(Self::from_properties(&Properties::parse(&content)))
    }

    pub fn from_properties(props: &Properties) -> Self {
        let upload_file_path = props
            .value_without_placeholder("uploadFilePath", "<Upload File Path>")
            .trim()
            .to_string();

        let base_api_endpoint = props
            .get("baseApiEndpoint")
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BASE_API_ENDPOINT);

        Self {
            app_key: props.value_without_placeholder("appKey", "<App Key>"),
            app_secret: props.value_without_placeholder("appSecret", "<App Secret>"),
            admin_token: props.value_without_placeholder("syncplicityAdminToken", "<Admin Token>"),
            owner_email: props.value_without_placeholder("ownerEmail", "<Owner Email>"),
            machine_token_auth_enabled: props
                .get("machineTokenAuthenticationEnabled")
                .map(parse_flag)
                .unwrap_or(false),
            machine_token: props
                .value_without_placeholder("syncplicityMachineToken", "<Machine Token>"),
            storage_token: props
                .value_without_placeholder("syncplicityStorageToken", "<Storage Token>"),
            upload_file_path: (!upload_file_path.is_empty()).then(|| PathBuf::from(upload_file_path)),
            base_api_endpoint: normalize_base_url(base_api_endpoint),
        }
    }

    /// Check that every required setting is present, collecting all violations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        let mut require = |value: &str, key: &str| {
            if value.trim().is_empty() {
                errors.push(format!("{} is not specified", key));
            }
        };

        require(&self.app_key, "appKey");
        require(&self.app_secret, "appSecret");
        require(&self.admin_token, "syncplicityAdminToken");
        require(&self.owner_email, "ownerEmail");

        if self.machine_token_auth_enabled {
            require(&self.machine_token, "syncplicityMachineToken");
            require(&self.storage_token, "syncplicityStorageToken");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// URL for obtaining an OAuth token.
    pub fn oauth_token_url(&self) -> String {
        self.api_url("oauth/token")
    }

    /// URL for explicitly invalidating the current OAuth token.
    pub fn oauth_revoke_token_url(&self) -> String {
        self.api_url("oauth/revoke")
    }

    /// Join a service path onto the gateway base URL.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_api_endpoint, path.trim_start_matches('/'))
    }
}

/// Join continuation lines and drop comments and blank lines.
fn logical_lines(content: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending: Option<String> = None;

    for raw in content.lines() {
        let line = raw.trim_start();
        let mut current = match pending.take() {
            Some(mut joined) => {
                joined.push_str(line);
                joined
            }
            None if line.is_empty() || line.starts_with('#') || line.starts_with('!') => continue,
            None => line.to_string(),
        };

        if ends_with_line_continuation(&current) {
            current.pop();
            pending = Some(current);
        } else {
            lines.push(current);
        }
    }
    lines.extend(pending);
    lines
}

/// An odd number of trailing backslashes escapes the line break.
fn ends_with_line_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn unescape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => result.push('\t'),
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('f') => result.push('\u{0c}'),
            Some('u') => {
                let hex: String = chars.clone().take(4).collect();
                let decoded = (hex.len() == 4 && hex.chars().all(|c| c.is_ascii_hexdigit()))
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match decoded {
                    Some(decoded) => {
                        result.push(decoded);
                        chars.nth(3);
                    }
                    None => result.push('u'),
                }
            }
            Some(other) => result.push(other),
            None => {}
        }
    }
    result
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1")
}

fn normalize_base_url(url: &str) -> String {
    format!("{}/", url.trim_end_matches('/'))
}

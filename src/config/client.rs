use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_HOST;
use crate::constants::DEFAULT_PORT;
use crate::Error;
use crate::Result;

/// Header flavour used to carry the ACL token
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TokenKind {
    /// `X-Consul-Token: <token>`
    XConsulToken,
    /// `Authorization: Bearer <token>`
    Bearer,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    pub kind: TokenKind,
    pub value: String,
}

/// Consul agent connection parameters
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClientConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// ACL token, none for anonymous access
    #[serde(default)]
    pub token: Option<TokenConfig>,

    /// Datacenter passed as `dc` query parameter on transactions
    #[serde(default)]
    pub datacenter: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            token: None,
            datacenter: None,
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "client.host must not be empty".into(),
            )));
        }
        if let Some(token) = &self.token {
            if token.value.is_empty() {
                return Err(Error::Config(ConfigError::Message(
                    "client.token.value must not be empty".into(),
                )));
            }
        }
        Ok(())
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}

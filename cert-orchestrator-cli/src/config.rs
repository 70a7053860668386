//! 配置文件
//!
//! ```toml
//! project = "site"
//! stack = "prod"
//!
//! [aws]
//! region = "us-east-1"
//!
//! [dns]
//! provider = "cloudflare"
//! zone_id = "023e105f4ecef8ad9ca31a8372d0c353"
//!
//! [[certificates]]
//! name = "site"
//! domain_name = "example.com"
//! alternative_names = ["www.example.com"]
//! ```
//!
//! Credentials may be left out of the file and taken from the environment
//! (`AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, `AWS_SESSION_TOKEN`,
//! `AWS_REGION`, `CLOUDFLARE_API_TOKEN`).

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use cert_orchestrator_provider::{AwsConfig, DEFAULT_RECORD_TTL, DnsAdapterConfig};
use serde::Deserialize;

/// A value that is never printed.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub project: String,
    #[serde(default = "default_stack")]
    pub stack: String,
    /// Relative paths are resolved against the config file's directory.
    #[serde(default)]
    pub state_file: Option<PathBuf>,
    /// Without this section certificates come from the in-process manager.
    #[serde(default)]
    pub aws: Option<AwsSection>,
    pub dns: DnsSection,
    #[serde(default)]
    pub certificates: Vec<CertificateEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AwsSection {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub access_key_id: Option<String>,
    #[serde(default)]
    pub secret_access_key: Option<Secret>,
    #[serde(default)]
    pub session_token: Option<Secret>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum DnsSection {
    Cloudflare {
        #[serde(default)]
        api_token: Option<Secret>,
        #[serde(default)]
        zone_id: Option<String>,
        #[serde(default = "default_ttl")]
        ttl: u32,
    },
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CertificateEntry {
    /// Component name; unique within the file.
    pub name: String,
    pub domain_name: String,
    #[serde(default)]
    pub alternative_names: Option<Vec<String>>,
}

fn default_stack() -> String {
    "dev".to_string()
}

fn default_ttl() -> u32 {
    DEFAULT_RECORD_TTL
}

/// `explicit`, else `<config dir>/cert-orchestrator/config.toml`.
pub fn resolve_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| match dirs::config_dir() {
        Some(dir) => dir.join("cert-orchestrator").join("config.toml"),
        None => PathBuf::from("cert-orchestrator.toml"),
    })
}

/// First non-empty value among the file and the environment.
fn pick(
    file: Option<String>,
    env: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<String> {
    file.filter(|v| !v.is_empty())
        .or_else(|| env(key).filter(|v| !v.is_empty()))
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.project.trim().is_empty() {
            bail!("project must not be empty");
        }
        if self.stack.trim().is_empty() {
            bail!("stack must not be empty");
        }
        if self.certificates.is_empty() {
            bail!("no [[certificates]] declared");
        }

        let mut names = HashSet::new();
        for cert in &self.certificates {
            if cert.name.trim().is_empty() {
                bail!("certificate name must not be empty");
            }
            if cert.domain_name.trim().is_empty() {
                bail!("certificate {:?}: domain_name must not be empty", cert.name);
            }
            if !names.insert(cert.name.as_str()) {
                bail!("certificate {:?} is declared twice", cert.name);
            }
        }
        Ok(())
    }

    /// Where the engine keeps resource state for this project and stack.
    pub fn state_path(&self, config_path: &Path) -> PathBuf {
        let base = config_path.parent().unwrap_or_else(|| Path::new(""));
        match &self.state_file {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => base.join(path),
            None => base.join(format!("{}-{}.state.json", self.project, self.stack)),
        }
    }

    /// `None` when the file has no `[aws]` section.
    pub fn aws_config(&self, env: &impl Fn(&str) -> Option<String>) -> Result<Option<AwsConfig>> {
        let Some(aws) = &self.aws else {
            return Ok(None);
        };

        let region = pick(aws.region.clone(), env, "AWS_REGION")
            .context("aws.region is not set and AWS_REGION is empty")?;
        let access_key_id = pick(aws.access_key_id.clone(), env, "AWS_ACCESS_KEY_ID")
            .context("aws.access_key_id is not set and AWS_ACCESS_KEY_ID is empty")?;
        let secret_access_key = pick(
            aws.secret_access_key.clone().map(|s| s.0),
            env,
            "AWS_SECRET_ACCESS_KEY",
        )
        .context("aws.secret_access_key is not set and AWS_SECRET_ACCESS_KEY is empty")?;
        let session_token = pick(
            aws.session_token.clone().map(|s| s.0),
            env,
            "AWS_SESSION_TOKEN",
        );

        Ok(Some(AwsConfig {
            region,
            access_key_id,
            secret_access_key,
            session_token,
        }))
    }

    pub fn dns_adapter(&self, env: &impl Fn(&str) -> Option<String>) -> Result<DnsAdapterConfig> {
        match &self.dns {
            DnsSection::Cloudflare {
                api_token,
                zone_id,
                ttl,
            } => {
                let api_token = pick(
                    api_token.clone().map(|s| s.0),
                    env,
                    "CLOUDFLARE_API_TOKEN",
                )
                .context("dns.api_token is not set and CLOUDFLARE_API_TOKEN is empty")?;
                Ok(DnsAdapterConfig::Cloudflare {
                    api_token,
                    zone_id: zone_id.clone(),
                    ttl: *ttl,
                })
            }
            DnsSection::Memory => Ok(DnsAdapterConfig::Memory),
        }
    }
}

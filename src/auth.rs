use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

pub const TOKEN_ENV: &str = "TUBEDIT_TOKEN";

/// Opaque capability token. The core never inspects it and never prints it;
/// Debug deliberately shows a placeholder.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Resolution order: explicit flag, then token file, then environment.
pub fn resolve_token(flag: Option<&str>, token_file: Option<&Path>) -> Result<AccessToken> {
    if let Some(raw) = flag {
        return from_raw(raw);
    }
    if let Some(path) = token_file {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading token file {}", path.display()))?;
        return from_raw(raw.trim());
    }
    if let Ok(raw) = std::env::var(TOKEN_ENV) {
        return from_raw(raw.trim());
    }
    bail!("no access token; pass --token, --token-file, or set {TOKEN_ENV}");
}

fn from_raw(raw: &str) -> Result<AccessToken> {
    if raw.is_empty() {
        bail!("access token is empty");
    }
    Ok(AccessToken(raw.to_string()))
}

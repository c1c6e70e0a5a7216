//! Secret reference resolver.
//!
//! Credential values in `config.toml` (install salt, site id, tokens) may
//! point at secrets stored outside the file:
//!
//! - `pass::path/in/store` runs `pass show path/in/store` and takes the first line
//! - `env::VAR_NAME` reads `$VAR_NAME`
//! - anything else is used as-is

/// Resolves a value that may contain a secret reference prefix.
pub fn resolve(value: &str) -> Result<String, String> {
    if let Some(path) = value.strip_prefix("pass::") {
        from_pass(path)
    } else if let Some(var) = value.strip_prefix("env::") {
        from_env(var)
    } else {
        Ok(value.to_string())
    }
}

/// Resolves an optional config field, naming it in the error.
///
/// Values that resolve to blank text are treated as unset.
pub fn resolve_field(field: &str, value: Option<&str>) -> Result<Option<String>, String> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let resolved = resolve(raw).map_err(|e| format!("failed to resolve {}: {}", field, e))?;
    let trimmed = resolved.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

fn from_pass(path: &str) -> Result<String, String> {
    let output = std::process::Command::new("pass")
        .arg("show")
        .arg(path)
        .output()
        .map_err(|e| format!("failed to run `pass show {}`: {}", path, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "`pass show {}` failed (exit {}): {}",
            path,
            output.status,
            stderr.trim()
        ));
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(str::to_string)
        .ok_or_else(|| format!("`pass show {}` produced no output", path))
}

fn from_env(var: &str) -> Result<String, String> {
    std::env::var(var).map_err(|_| format!("environment variable `{}` is not set", var))
}

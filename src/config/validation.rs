use anyhow::{anyhow, Result};
use url::Url;

use super::Settings;

fn validate_http_url(name: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).map_err(|e| anyhow!("{} '{}' is not a valid URL: {}", name, value, e))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(anyhow!("{} must use http or https, got '{}'", name, other)),
    }
}

pub fn validate_settings(settings: &Settings) -> Result<()> {
    if let Some(url) = &settings.provider.url {
        validate_http_url("provider.url", url)?;
    }
    validate_http_url("explorer.api_url", &settings.explorer.api_url)?;
    validate_http_url("explorer.web_url", &settings.explorer.web_url)?;

    if settings.provider.poll_interval_ms == 0 {
        return Err(anyhow!("provider.poll_interval_ms must be greater than 0"));
    }
    if settings.provider.request_timeout_secs == 0 {
        return Err(anyhow!("provider.request_timeout_secs must be greater than 0"));
    }
    if !settings.storage.in_memory && settings.storage.path.trim().is_empty() {
        return Err(anyhow!("storage.path must be set unless storage.in_memory is true"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_settings(&Settings::defaults()).is_ok());
    }

    #[test]
    fn test_rejects_bad_provider_url() {
        let mut settings = Settings::defaults();
        settings.provider.url = Some("localhost:8545".to_string());
        assert!(validate_settings(&settings).is_err());

        settings.provider.url = Some("ws://localhost:8546".to_string());
        assert!(validate_settings(&settings).is_err());

        settings.provider.url = Some("http://localhost:8545".to_string());
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_rejects_zero_interval() {
        let mut settings = Settings::defaults();
        settings.provider.poll_interval_ms = 0;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_rejects_empty_storage_path() {
        let mut settings = Settings::defaults();
        settings.storage.path = " ".to_string();
        assert!(validate_settings(&settings).is_err());

        settings.storage.in_memory = true;
        assert!(validate_settings(&settings).is_ok());
    }
}

use crate::utils::error::{PollenError, Result};
use scraper::Selector;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(PollenError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(PollenError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(PollenError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(PollenError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// Accepts `host:port` and the bare `:port` shorthand.
pub fn validate_listen_addr(field_name: &str, addr: &str) -> Result<()> {
    let invalid = |reason: &str| PollenError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: addr.to_string(),
        reason: reason.to_string(),
    };

    let (_, port) = addr
        .rsplit_once(':')
        .ok_or_else(|| invalid("Address must be in host:port or :port form"))?;
    port.parse::<u16>()
        .map_err(|_| invalid("Port must be a number between 0 and 65535"))?;
    Ok(())
}

/// Go-style `:8080` means every interface.
pub fn normalize_listen_addr(addr: &str) -> String {
    if addr.starts_with(':') {
        format!("0.0.0.0{}", addr)
    } else {
        addr.to_string()
    }
}

pub fn validate_selector(field_name: &str, selector: &str) -> Result<()> {
    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| PollenError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: selector.to_string(),
            reason: format!("Invalid CSS selector: {:?}", e),
        })
}

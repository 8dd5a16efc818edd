//! Server Configuration

/// Default listen address (the original service listened on 5000)
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

/// Settings read from the environment at start
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Address to listen on
    pub bind_addr: String,

    /// Return raw processor messages in 500 bodies instead of a generic one
    pub expose_processor_errors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.into(),
            expose_processor_errors: false,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.into());
        let expose_processor_errors = std::env::var("EXPOSE_PROCESSOR_ERRORS")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        Self {
            bind_addr,
            expose_processor_errors,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "0.0.0.0:5000");
        assert!(!config.expose_processor_errors);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" 1 "));
        assert!(parse_flag("YES"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }
}

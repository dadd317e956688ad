use cx_domain::config::{Config, ConfigSeverity};
use cx_domain::protocol::ProtocolVersion;

#[test]
fn default_sweep_interval_is_ten_seconds() {
    let config = Config::default();
    assert_eq!(config.sessions.expiry_interval_secs, 10);
}

#[test]
fn default_lifetime_is_five_minutes() {
    let config = Config::default();
    assert_eq!(config.sessions.max_session_lifetime_secs, 300);
}

#[test]
fn default_key_size_is_2048() {
    let config = Config::default();
    assert_eq!(config.crypto.key_size, 2048);
    assert_eq!(config.crypto.system_parameters().unwrap().lstatzk, 128);
}

#[test]
fn empty_file_parses_to_defaults() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config.sessions.min_protocol_version, ProtocolVersion::new(2, 4));
    assert_eq!(config.sessions.max_protocol_version, ProtocolVersion::new(2, 4));
    assert!(config.validate().is_empty());
}

#[test]
fn sections_parse() {
    let toml_str = r#"
[sessions]
expiry_interval_secs = 5
max_session_lifetime_secs = 60
max_protocol_version = "2.5"

[crypto]
key_size = 4096

[observability]
log_filter = "debug"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.sessions.expiry_interval_secs, 5);
    assert_eq!(config.sessions.max_session_lifetime_secs, 60);
    assert_eq!(config.sessions.max_protocol_version, ProtocolVersion::new(2, 5));
    assert_eq!(config.crypto.key_size, 4096);
    assert_eq!(config.observability.log_filter, "debug");
    assert!(config.validate().is_empty());
}

#[test]
fn malformed_version_is_a_parse_error() {
    let toml_str = r#"
[sessions]
min_protocol_version = "latest"
"#;
    assert!(toml::from_str::<Config>(toml_str).is_err());
}

#[test]
fn validate_flags_bad_values() {
    let mut config = Config::default();
    config.sessions.expiry_interval_secs = 0;
    config.sessions.min_protocol_version = ProtocolVersion::new(3, 0);
    config.crypto.key_size = 512;

    let issues = config.validate();
    let errors: Vec<_> = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .map(|i| i.field.as_str())
        .collect();
    assert!(errors.contains(&"sessions.expiry_interval_secs"));
    assert!(errors.contains(&"sessions.min_protocol_version"));
    assert!(errors.contains(&"crypto.key_size"));
}

#[test]
fn short_lifetime_is_a_warning() {
    let mut config = Config::default();
    config.sessions.max_session_lifetime_secs = 5;
    let issues = config.validate();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity, ConfigSeverity::Warning);
}

#[test]
fn lifetime_above_one_year_is_an_error() {
    let mut config = Config::default();
    config.sessions.max_session_lifetime_secs = 10u64.pow(16);
    let issues = config.validate();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity, ConfigSeverity::Error);
    assert_eq!(issues[0].field, "sessions.max_session_lifetime_secs");
}

#[test]
fn unknown_key_size_lists_supported_sizes() {
    let mut config = Config::default();
    config.crypto.key_size = 3072;
    let issues = config.validate();
    assert_eq!(issues.len(), 1);
    assert!(issues[0].message.contains("1024, 2048, 4096"));
}

use sf_domain::config::{Config, ConfigSeverity};

#[test]
fn default_host_is_localhost() {
    let config = Config::default();
    assert_eq!(config.server.host, "127.0.0.1");
}

#[test]
fn explicit_zero_host_parses() {
    let toml_str = r#"
[server]
host = "0.0.0.0"
port = 8090
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.host, "0.0.0.0");
}

#[test]
fn default_cors_allows_only_localhost() {
    let config = Config::default();
    assert!(!config.server.cors.allowed_origins.is_empty());
    assert!(config
        .server
        .cors
        .allowed_origins
        .contains(&"http://localhost:*".to_string()));
}

#[test]
fn empty_toml_yields_full_defaults() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config.quota.default_daily_limit, 5);
    assert_eq!(config.quota.default_monthly_limit, 50);
    assert_eq!(config.quota.premium_daily_limit, 50);
    assert_eq!(config.quota.premium_monthly_limit, 500);
    assert_eq!(config.context.chunk_size, 1000);
    assert_eq!(config.context.chunk_overlap, 200);
    assert!((config.context.similarity_threshold - 0.7).abs() < f64::EPSILON);
    assert_eq!(config.context.max_sources, 3);
    assert_eq!(config.context.max_inspiration_scripts, 4);
    assert_eq!(config.llm.default_model, "gpt-4.1");
    assert_eq!(config.channel.max_file_size, 10 * 1024 * 1024);
}

#[test]
fn quota_limits_parse_from_toml() {
    let toml_str = r#"
[quota]
default_daily_limit = 10
premium_monthly_limit = 1000
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.quota.default_daily_limit, 10);
    assert_eq!(config.quota.default_monthly_limit, 50);
    assert_eq!(config.quota.premium_monthly_limit, 1000);
}

#[test]
fn validate_flags_bad_overlap_as_error() {
    let mut config = Config::default();
    config.context.chunk_overlap = config.context.chunk_size;
    let issues = config.validate();
    assert!(issues
        .iter()
        .any(|i| i.severity == ConfigSeverity::Error && i.field == "context.chunk_overlap"));
}

#[test]
fn validate_flags_out_of_range_threshold() {
    let mut config = Config::default();
    config.context.similarity_threshold = 1.5;
    let issues = config.validate();
    assert!(issues
        .iter()
        .any(|i| i.field == "context.similarity_threshold"));
}

#[test]
fn validate_warns_on_missing_verify_token() {
    let config = Config::default();
    let issues = config.validate();
    assert!(issues
        .iter()
        .any(|i| i.severity == ConfigSeverity::Warning && i.field == "channel.verify_token"));
}

#[test]
fn validate_passes_on_sane_config() {
    let mut config = Config::default();
    config.channel.verify_token = Some("tok".into());
    let issues = config.validate();
    assert!(!issues.iter().any(|i| i.severity == ConfigSeverity::Error));
}

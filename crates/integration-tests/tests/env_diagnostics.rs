//! Tests for the configuration diagnostics surface.

use std::net::{IpAddr, Ipv4Addr};

use secrecy::SecretString;

use itadaki_web::config::{
    AppConfig, AuthConfig, DominoConfig, ENV_SCHEMA, NOT_CONFIGURED, Trust, mask_secret,
};

fn config(api_key: &str) -> AppConfig {
    AppConfig {
        database_url: SecretString::from("postgres://localhost/itadaki"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 3000,
        base_url: "http://localhost:3000".to_owned(),
        session_secret: SecretString::from("0123456789abcdef0123456789abcdef"),
        runtime_env: "production".to_owned(),
        domino: DominoConfig {
            api_url: Some("https://api.domino.example".to_owned()),
            api_key: Some(SecretString::from(api_key)),
            public_api_url: Some("https://api.domino.example/public".to_owned()),
            public_api_key: None,
        },
        auth: AuthConfig { verify_url: None },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 1.0,
    }
}

#[test]
fn test_documented_masking_scenario() {
    let diagnostics = config("sk_live_abcdef123456").diagnostics();
    assert_eq!(diagnostics.server["DOMINO_API_KEY"], "sk_live_...");
}

#[test]
fn test_env_check_payload_shape() {
    let diagnostics = config("sk_live_abcdef123456").diagnostics();
    #[allow(clippy::unwrap_used)]
    let json = serde_json::to_value(&diagnostics).unwrap();

    assert_eq!(json["server"]["DOMINO_API_URL"], "https://api.domino.example");
    assert_eq!(json["server"]["DOMINO_API_KEY"], "sk_live_...");
    assert_eq!(json["server"]["NODE_ENV"], "production");
    assert_eq!(
        json["client"]["NEXT_PUBLIC_DOMINO_API_URL"],
        "https://api.domino.example/public"
    );
    assert_eq!(json["client"]["NEXT_PUBLIC_DOMINO_API_KEY"], NOT_CONFIGURED);
}

#[test]
fn test_masking_bounds_for_arbitrary_secrets() {
    for secret in ["", "a", "abcdefg", "abcdefgh", "abcdefghi", "秘密の鍵です長いよ"] {
        let masked = mask_secret(Some(&SecretString::from(secret)));
        assert!(masked.ends_with("..."));
        let prefix: String = masked.chars().rev().skip(3).collect();
        assert!(prefix.chars().count() <= 8, "prefix too long for {secret:?}");
    }
}

#[test]
fn test_full_secret_never_leaks_through_diagnostics() {
    let secret = "sk_live_abcdef123456";
    let diagnostics = config(secret).diagnostics();
    for value in diagnostics
        .server
        .values()
        .chain(diagnostics.client.values())
    {
        assert!(!value.contains(secret));
    }
}

#[test]
fn test_diagnostics_is_idempotent() {
    let subject = config("sk_live_abcdef123456");
    assert_eq!(subject.diagnostics(), subject.diagnostics());
}

#[test]
fn test_schema_declares_trust_and_secret_tags() {
    let server: Vec<_> = ENV_SCHEMA
        .iter()
        .filter(|key| key.trust == Trust::Server)
        .map(|key| key.name)
        .collect();
    assert_eq!(server, vec!["DOMINO_API_URL", "DOMINO_API_KEY", "NODE_ENV"]);

    for key in ENV_SCHEMA {
        if key.name.ends_with("API_KEY") {
            assert!(key.secret, "{} must be tagged secret", key.name);
        }
    }
}

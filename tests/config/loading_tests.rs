// Provider file loading: defaults, interpolation, parse errors and
// switching the active provider.

use postcraft::config::{
    ConfigError, EnvFile, ProviderCategory, ProviderKind, load_env_file, load_providers,
    set_active_provider,
};
use serial_test::serial;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_text(dir: &Path, content: &str) {
    fs::write(dir.join("text_providers.yaml"), content).expect("Failed to write text config");
}

#[test]
fn missing_files_fall_back_to_defaults() {
    let dir = tempdir().expect("tempdir");

    let text = load_providers(dir.path(), ProviderCategory::Text).expect("text defaults");
    assert_eq!(text.active_provider, "google_gemini");
    let active = text.active().expect("active");
    assert_eq!(active.kind(), ProviderKind::GoogleGemini);
    assert_eq!(active.model.as_deref(), Some("gemini-2.0-flash-exp"));
    assert_eq!(active.max_output_tokens, Some(8000));

    let image = load_providers(dir.path(), ProviderCategory::Image).expect("image defaults");
    assert_eq!(image.active_provider, "google_genai");
    assert_eq!(
        image.active().expect("active").model.as_deref(),
        Some("gemini-2.0-flash-exp-image-generation")
    );
}

#[test]
fn empty_file_has_no_providers() {
    let dir = tempdir().expect("tempdir");
    write_text(dir.path(), "   \n");

    let file = load_providers(dir.path(), ProviderCategory::Text).expect("load");
    assert_eq!(file.active_provider, "google_gemini");
    assert!(file.providers.is_empty());
    assert!(matches!(
        file.active(),
        Err(ConfigError::NoProvidersConfigured { .. })
    ));
}

#[test]
fn invalid_yaml_is_a_parse_error() {
    let dir = tempdir().expect("tempdir");
    write_text(dir.path(), "providers: [unclosed");

    let result = load_providers(dir.path(), ProviderCategory::Text);
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

#[test]
fn keeps_declaration_order_and_extra_keys() {
    let dir = tempdir().expect("tempdir");
    write_text(
        dir.path(),
        r#"
active_provider: zeta
providers:
  zeta:
    type: OpenAI
    api_key: sk-zeta
    model: gpt-4o
    temperature: 0.7
    supports_images: false
    response_format: b64_json
  alpha:
    type: gemini
    api_key: g-alpha
    high_concurrency: true
"#,
    );

    let file = load_providers(dir.path(), ProviderCategory::Text).expect("load");
    assert_eq!(file.names(), vec!["zeta", "alpha"]);

    let zeta = file.get("zeta").expect("zeta");
    assert_eq!(zeta.kind(), ProviderKind::OpenAiCompatible);
    assert_eq!(zeta.temperature, Some(0.7));
    assert!(!zeta.supports_images);
    assert_eq!(zeta.extra_str("response_format"), Some("b64_json"));

    let alpha = file.get("alpha").expect("alpha");
    assert!(alpha.is_gemini());
    assert!(alpha.supports_images);
    assert!(alpha.high_concurrency);
}

#[test]
#[serial]
fn interpolates_environment_references() {
    // SAFETY: serialized with other env-mutating tests
    unsafe {
        std::env::set_var("POSTCRAFT_TEST_KEY", "sk-from-env");
        std::env::set_var("POSTCRAFT_TEST_HOST", "proxy.local");
        std::env::remove_var("POSTCRAFT_TEST_UNSET");
    }
    let dir = tempdir().expect("tempdir");
    write_text(
        dir.path(),
        r#"
active_provider: proxy
providers:
  proxy:
    type: openai_compatible
    api_key: ${POSTCRAFT_TEST_KEY}
    base_url: https://${POSTCRAFT_TEST_HOST}/api
  unset:
    type: openai_compatible
    api_key: ${POSTCRAFT_TEST_UNSET}
"#,
    );

    let file = load_providers(dir.path(), ProviderCategory::Text).expect("load");
    let proxy = file.get("proxy").expect("proxy");
    assert_eq!(proxy.api_key.as_deref(), Some("sk-from-env"));
    assert_eq!(proxy.base_url.as_deref(), Some("https://proxy.local/api"));

    let unset = file.get("unset").expect("unset");
    assert!(unset.api_key.is_none());
    assert!(matches!(
        unset.require_api_key(),
        Err(ConfigError::MissingApiKey { .. })
    ));

    unsafe {
        std::env::remove_var("POSTCRAFT_TEST_KEY");
        std::env::remove_var("POSTCRAFT_TEST_HOST");
    }
}

#[test]
#[serial]
fn switching_active_provider_keeps_references() {
    unsafe {
        std::env::set_var("POSTCRAFT_SWITCH_KEY", "secret-value-123");
    }
    let dir = tempdir().expect("tempdir");
    write_text(
        dir.path(),
        r#"
active_provider: first
providers:
  first:
    type: openai_compatible
    api_key: ${POSTCRAFT_SWITCH_KEY}
  second:
    type: google_gemini
    api_key: ${POSTCRAFT_SWITCH_KEY}
"#,
    );

    let updated =
        set_active_provider(dir.path(), ProviderCategory::Text, "second").expect("switch");
    assert_eq!(updated.active_provider, "second");
    assert_eq!(
        updated.active().expect("active").api_key.as_deref(),
        Some("secret-value-123")
    );

    let raw = fs::read_to_string(dir.path().join("text_providers.yaml")).expect("read back");
    assert!(raw.contains("${POSTCRAFT_SWITCH_KEY}"));
    assert!(!raw.contains("secret-value-123"));
    assert!(raw.contains("active_provider: second"));

    unsafe {
        std::env::remove_var("POSTCRAFT_SWITCH_KEY");
    }
}

#[test]
fn switching_to_unknown_provider_fails() {
    let dir = tempdir().expect("tempdir");
    write_text(
        dir.path(),
        "active_provider: a\nproviders:\n  a:\n    type: openai\n",
    );

    let result = set_active_provider(dir.path(), ProviderCategory::Text, "missing");
    assert!(matches!(result, Err(ConfigError::UnknownProvider { .. })));

    let file = load_providers(dir.path(), ProviderCategory::Text).expect("unchanged");
    assert_eq!(file.active_provider, "a");
}

#[test]
fn switching_without_file_writes_defaults() {
    let dir = tempdir().expect("tempdir");

    let updated =
        set_active_provider(dir.path(), ProviderCategory::Image, "google_genai").expect("switch");
    assert_eq!(updated.active_provider, "google_genai");
    assert!(dir.path().join("image_providers.yaml").exists());
}

#[test]
#[serial]
fn env_file_fills_only_unset_variables() {
    unsafe {
        std::env::set_var("POSTCRAFT_ENV_KEEP", "from-shell");
        std::env::remove_var("POSTCRAFT_ENV_FILL");
    }
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join(".env");
    fs::write(
        &path,
        "POSTCRAFT_ENV_KEEP=from-file\nPOSTCRAFT_ENV_FILL=from-file\nRUST_LOG_TEST=debug\n",
    )
    .expect("write env");

    assert_eq!(load_env_file(&path), EnvFile::Loaded);
    assert_eq!(std::env::var("POSTCRAFT_ENV_KEEP").as_deref(), Ok("from-shell"));
    assert_eq!(std::env::var("POSTCRAFT_ENV_FILL").as_deref(), Ok("from-file"));
    assert_eq!(load_env_file(&dir.path().join("absent.env")), EnvFile::Missing);

    unsafe {
        std::env::remove_var("POSTCRAFT_ENV_KEEP");
        std::env::remove_var("POSTCRAFT_ENV_FILL");
        std::env::remove_var("RUST_LOG_TEST");
    }
}

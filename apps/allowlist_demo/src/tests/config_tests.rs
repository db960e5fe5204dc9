use super::{apply_env, apply_file, Settings};

use std::{
    collections::HashMap,
    env, fs,
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("allowlist_demo_{name}_{suffix}.toml"));
    fs::write(&path, contents).expect("write settings");
    path
}

#[test]
fn defaults_use_compiled_in_deployment() {
    let settings = Settings::default();
    assert_eq!(settings.required_chain_id, 4);
    assert!(settings.contract_address.starts_with("0x"));
    assert_eq!(settings.log_filter, "info");
}

#[test]
fn missing_file_keeps_defaults() {
    let mut settings = Settings::default();
    apply_file(&mut settings, Path::new("/nonexistent/allowlist.toml")).expect("missing ok");
    assert_eq!(settings, Settings::default());
}

#[test]
fn file_values_override_defaults() {
    let path = temp_file(
        "override",
        "contract_address = \"0x1234\"\nrequired_chain_id = 5\n",
    );
    let mut settings = Settings::default();
    apply_file(&mut settings, &path).expect("apply");

    assert_eq!(settings.contract_address, "0x1234");
    assert_eq!(settings.required_chain_id, 5);
    assert_eq!(settings.log_filter, "info");
    fs::remove_file(path).expect("cleanup");
}

#[test]
fn unreadable_settings_path_is_an_error() {
    let mut settings = Settings::default();
    let err = apply_file(&mut settings, &env::temp_dir()).expect_err("directory is not a file");
    assert!(err.to_string().contains("failed to read settings file"));
    assert_eq!(settings, Settings::default());
}

#[test]
fn malformed_file_is_an_error() {
    let path = temp_file("malformed", "required_chain_id = \"five\"\n");
    let mut settings = Settings::default();
    let err = apply_file(&mut settings, &path).expect_err("malformed");
    assert!(err.to_string().contains("failed to parse settings file"));
    fs::remove_file(path).expect("cleanup");
}

#[test]
fn env_overrides_and_ignores_unparsable_chain_id() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("APP__CONTRACT_ADDRESS", "0xbeef"),
        ("APP__REQUIRED_CHAIN_ID", "not-a-number"),
        ("RUST_LOG", "debug"),
        ("APP__LOG_FILTER", "client_core=trace"),
    ]);
    let mut settings = Settings::default();
    apply_env(&mut settings, |key| vars.get(key).map(|v| v.to_string()));

    assert_eq!(settings.contract_address, "0xbeef");
    assert_eq!(settings.required_chain_id, 4);
    assert_eq!(settings.log_filter, "client_core=trace");
}

#[test]
fn env_chain_id_is_trimmed() {
    let mut settings = Settings::default();
    apply_env(&mut settings, |key| {
        (key == "APP__REQUIRED_CHAIN_ID").then(|| " 11155111 ".to_string())
    });
    assert_eq!(settings.required_chain_id, 11155111);
}

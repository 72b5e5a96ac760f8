use assert_cmd::Command;

#[test]
fn check_config_succeeds_with_defaults() {
    Command::cargo_bin("mehfil")
        .unwrap()
        .arg("check-config")
        .env_remove("MEHFIL_ENV")
        .assert()
        .success();
}

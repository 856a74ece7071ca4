use assert_cmd::Command;
use predicates::prelude::*;

fn buildenv() -> Command {
    let mut cmd = Command::cargo_bin("buildenv").unwrap();
    cmd.env_remove("BUILDENV_REGISTRY");
    cmd
}

#[test]
fn test_invalid_image_name_aborts_before_any_build() {
    // カタログ外のイメージ名はDockerに触る前に致命エラーになる
    buildenv()
        .arg("myregistry:5000")
        .arg("debian:11")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid image name debian:11"));
}

#[test]
fn test_registry_argument_is_required() {
    buildenv()
        .assert()
        .failure()
        .stderr(predicate::str::contains("REGISTRY"));
}

#[test]
fn test_help_shows_arguments() {
    buildenv()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("REGISTRY"))
        .stdout(predicate::str::contains("IMAGE"))
        .stdout(predicate::str::contains("--no-push"))
        .stdout(predicate::str::contains("--no-cache"));
}

//! CLI subprocess integration tests.
//!
//! These tests invoke the `msuite` binary with a cleared environment and
//! verify exit codes, stdout content, and JSON output.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn msuite_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_msuite"));
    let _ = cmd.env_clear();
    cmd
}

fn run(cmd: &mut Command) -> Output {
    cmd.output().expect("msuite should start")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("fixture should be written");
    path
}

const SUITE: &str = "\
[suite nightly]
tags = opt
defaults = base
packages = core

[defaults base]
prefix = /opt/{suite}
action = fetch {package}

[packagelist core]
zlib = 1.2.8
curl = 7.40.0

[package zlib]
url = http://zlib.net/zlib-{version}.tar.gz

[package curl version < 7.30]
flavor = old

[package curl version >= 7.30]
depends = zlib version >= 1.2
flavor = new
action = configure --prefix={prefix}/curl
";

#[test]
fn help_lists_subcommands() {
    let output = run(msuite_bin().arg("--help"));
    assert!(output.status.success(), "msuite --help must exit 0");
    let text = stdout(&output);
    for command in ["resolve", "compose", "env"] {
        assert!(text.contains(command), "help must list '{command}': {text}");
    }
}

#[test]
fn resolve_prints_json_records() {
    let dir = tempfile::tempdir().expect("tempdir");
    let suite = write(dir.path(), "suite.cfg", SUITE);

    let output = run(msuite_bin().args(["resolve", "nightly"]).arg(&suite).arg("--json"));
    assert!(output.status.success(), "resolve must exit 0: {output:?}");

    let records: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("stdout should be JSON");
    assert_eq!(records[0]["package"], "zlib");
    assert_eq!(
        records[0]["params"]["url"],
        "http://zlib.net/zlib-1.2.8.tar.gz"
    );
    assert_eq!(records[1]["params"]["flavor"], "new");
    assert_eq!(
        records[1]["actions"],
        serde_json::json!(["fetch curl", "configure --prefix=/opt/nightly/curl"])
    );
}

#[test]
fn resolve_plan_lists_packages() {
    let dir = tempfile::tempdir().expect("tempdir");
    let suite = write(dir.path(), "suite.cfg", SUITE);

    let output = run(msuite_bin().args(["resolve", "nightly"]).arg(&suite));
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("+ zlib 1.2.8"), "{text}");
    assert!(text.contains("+ curl 7.40.0"), "{text}");
    assert!(text.contains("2 package(s) resolved."), "{text}");
}

#[test]
fn later_files_override_earlier_ones() {
    let dir = tempfile::tempdir().expect("tempdir");
    let suite = write(dir.path(), "suite.cfg", SUITE);
    let site = write(dir.path(), "site.cfg", "[packagelist core]\ncurl = 7.20.0\n");

    let output = run(msuite_bin()
        .args(["resolve", "nightly"])
        .arg(&suite)
        .arg(&site)
        .arg("--json"));
    assert!(output.status.success());
    let records: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("JSON");
    assert_eq!(records[1]["params"]["flavor"], "old");
}

#[test]
fn resolve_failure_exits_nonzero() {
    let dir = tempfile::tempdir().expect("tempdir");
    let suite = write(dir.path(), "suite.cfg", SUITE);

    let output = run(msuite_bin().args(["resolve", "weekly"]).arg(&suite));
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("suite weekly"), "{stderr}");
}

#[test]
fn pass_budget_is_read_from_the_environment() {
    let dir = tempfile::tempdir().expect("tempdir");
    let suite = write(
        dir.path(),
        "suite.cfg",
        &SUITE.replace("prefix = /opt/{suite}", "prefix = /opt/{a}\na = {b}\nb = {suite}"),
    );

    let output = run(msuite_bin()
        .env("MSUITE_MAX_PASSES", "1")
        .args(["resolve", "nightly"])
        .arg(&suite));
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("did not converge"), "{stderr}");
}

#[test]
fn zero_pass_budget_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let suite = write(dir.path(), "suite.cfg", SUITE);

    let output = run(msuite_bin()
        .args(["resolve", "nightly", "--max-passes", "0"])
        .arg(&suite));
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--max-passes"), "{stderr}");

    let output = run(msuite_bin()
        .env("MSUITE_MAX_PASSES", "0")
        .args(["resolve", "nightly"])
        .arg(&suite));
    assert!(!output.status.success());
}

#[test]
fn compose_prints_flattened_environments() {
    let dir = tempfile::tempdir().expect("tempdir");
    let graph = write(
        dir.path(),
        "graph.json",
        r#"{"packages": [
            {"name": "app", "env": {"PATH": "/app/bin"}, "depends": ["lib"]},
            {"name": "lib", "env": {"PATH": "/lib/bin", "CC": "gcc"}}
        ]}"#,
    );

    let output = run(msuite_bin()
        .args(["compose", "--json", "--path-separator", ";"])
        .arg(&graph));
    assert!(output.status.success(), "compose must exit 0: {output:?}");
    let composed: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("JSON");
    assert_eq!(composed[0]["name"], "lib");
    assert_eq!(composed[1]["name"], "app");
    assert_eq!(composed[1]["env"]["PATH"], "/lib/bin;/app/bin");
    assert_eq!(composed[1]["env"]["CC"], "gcc");
}

#[test]
fn compose_reports_cycles() {
    let dir = tempfile::tempdir().expect("tempdir");
    let graph = write(
        dir.path(),
        "graph.json",
        r#"{"packages": [
            {"name": "a", "depends": ["b"]},
            {"name": "b", "depends": ["a"]}
        ]}"#,
    );

    let output = run(msuite_bin().arg("compose").arg(&graph));
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cyclic dependency: a -> b -> a"), "{stderr}");
}

#[test]
fn env_renders_sh_exports_over_user_environment() {
    let dir = tempfile::tempdir().expect("tempdir");
    let first = write(dir.path(), "a.json", r#"{"PATH": "/sw/a/bin", "CC": "gcc"}"#);
    let second = write(dir.path(), "b.json", r#"{"PATH": ["/sw/b/bin"], "CC": "icc"}"#);

    let output = run(msuite_bin()
        .env("PATH", "/usr/bin")
        .env("https_proxy", "http://proxy:8080")
        .arg("env")
        .arg(&first)
        .arg(&second));
    assert!(output.status.success(), "env must exit 0: {output:?}");
    assert_eq!(
        stdout(&output),
        "export CC=\"gcc\"\n\
         export PATH=\"/sw/b/bin:/sw/a/bin:/usr/bin\"\n\
         export https_proxy=\"http://proxy:8080\"\n"
    );
}

#[test]
fn env_renders_csh_without_proxies_when_disabled() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = write(dir.path(), "a.json", r#"{"LD_LIBRARY_PATH": "/sw/lib"}"#);

    let output = run(msuite_bin()
        .env("http_proxy", "http://proxy:3128")
        .args(["env", "--shell", "tcsh", "--no-proxy-passthrough"])
        .arg(&file));
    assert!(output.status.success());
    assert_eq!(stdout(&output), "setenv LD_LIBRARY_PATH \"/sw/lib\"\n");
}

#[test]
fn env_rejects_nested_mapping_outside_env() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = write(dir.path(), "a.json", r#"{"OPTS": {"PATH": "/d"}}"#);

    let output = run(msuite_bin().arg("env").arg(&file));
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("\"OPTS\""), "{stderr}");
}

#[test]
fn env_rejects_unknown_shell() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = write(dir.path(), "a.json", "{}");

    let output = run(msuite_bin().args(["env", "--shell", "fish"]).arg(&file));
    assert!(!output.status.success());
}

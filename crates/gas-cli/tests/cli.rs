//! Integration tests for the `gas` binary.

use std::fs;
use std::path::Path;

use assert_cmd::cargo;
use predicates::prelude::*;
use tempfile::TempDir;

fn gas(cwd: &Path) -> assert_cmd::Command {
    let mut cmd = cargo::cargo_bin_cmd!("gas");
    cmd.current_dir(cwd).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn write_resource(container: &Path, dir: &str, deps: &[&str], index: &str) {
    let root = container.join(dir);
    fs::create_dir_all(root.join("src")).unwrap();
    let deps = deps
        .iter()
        .map(|d| format!("\"{d}\": \"workspace:*\""))
        .collect::<Vec<_>>()
        .join(", ");
    fs::write(
        root.join("package.json"),
        format!("{{ \"name\": \"{dir}\", \"dependencies\": {{ {deps} }} }}"),
    )
    .unwrap();
    fs::write(root.join("src").join("_core.base.kv.index.ts"), index).unwrap();
}

/// `gas/core-base-kv` and `gas/core-base-api`, the API depending on the KV.
fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let container = temp.path().join("gas");
    write_resource(
        &container,
        "core-base-kv",
        &[],
        "import { cloudflareKv } from \"@gasoline-dev/resources\";\n\
         export const coreBaseKv = cloudflareKv({ name: \"CORE_BASE_KV\" } as const);\n",
    );
    write_resource(
        &container,
        "core-base-api",
        &["core-base-kv"],
        "import { cloudflareWorker } from \"@gasoline-dev/resources\";\n\
         import { coreBaseKv } from \"core-base-kv\";\n\
         export const coreBaseApi = cloudflareWorker({\n  name: \"CORE_BASE_API\",\n  kv: [{ binding: coreBaseKv.name }],\n});\n",
    );
    temp
}

// ── surface ───────────────────────────────────────────────────────────────────

#[test]
fn help_lists_subcommands() {
    let temp = TempDir::new().unwrap();
    gas(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("graph"))
        .stdout(predicate::str::contains("script"));
}

#[test]
fn version_flag() {
    let temp = TempDir::new().unwrap();
    gas(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_subcommand_is_a_usage_error() {
    let temp = TempDir::new().unwrap();
    gas(temp.path()).arg("deploy").assert().code(2);
}

#[test]
fn completions_for_bash() {
    let temp = TempDir::new().unwrap();
    gas(temp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gas"));
}

// ── graph / script ────────────────────────────────────────────────────────────

#[test]
fn graph_as_json_puts_dependencies_in_layer_zero() {
    let temp = project();
    let output = gas(temp.path())
        .args(["graph", "--output-format", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let layout: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(layout["layers"][0][0], "CORE_BASE_KV");
    assert_eq!(layout["layers"][1][0], "CORE_BASE_API");
    assert_eq!(layout["roots"][0], "CORE_BASE_API");
}

#[test]
fn script_needs_no_runtime() {
    let temp = project();
    fs::write(
        temp.path().join(".gas.toml"),
        "[evaluator]\nprogram = \"gas-test-no-such-runtime\"\n",
    )
    .unwrap();

    gas(temp.path())
        .arg("script")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "import {\n  cloudflareKv,\n  cloudflareWorker,\n} from \"@gasoline-dev/resources\";",
        ))
        .stdout(predicate::str::contains("resourceNameToConfig[\"CORE_BASE_API\"] = coreBaseApi;"))
        .stdout(predicate::str::contains("as const").not());
}

#[test]
fn dir_flag_selects_the_container() {
    let temp = project();
    fs::rename(temp.path().join("gas"), temp.path().join("infra")).unwrap();

    gas(temp.path())
        .args(["--dir", "infra", "graph", "--output-format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CORE_BASE_KV"));
}

#[test]
fn project_file_selects_the_container() {
    let temp = project();
    fs::rename(temp.path().join("gas"), temp.path().join("resources")).unwrap();
    fs::write(
        temp.path().join("gas.config.json"),
        r#"{ "resourceContainerDirPath": "./resources" }"#,
    )
    .unwrap();

    gas(temp.path())
        .args(["graph", "--output-format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CORE_BASE_API"));
}

#[test]
fn missing_container_exits_with_not_found() {
    let temp = TempDir::new().unwrap();
    gas(temp.path())
        .arg("graph")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Resource container not found"))
        .stderr(predicate::str::contains("--dir"));
}

#[test]
fn resource_without_index_file_exits_with_not_found() {
    let temp = project();
    fs::remove_file(
        temp.path()
            .join("gas/core-base-kv/src/_core.base.kv.index.ts"),
    )
    .unwrap();

    gas(temp.path())
        .arg("graph")
        .assert()
        .code(3)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("core-base-kv"))
        .stderr(predicate::str::contains("No index file"));
}

#[test]
fn dependency_cycle_is_a_user_error() {
    let temp = TempDir::new().unwrap();
    let container = temp.path().join("gas");
    write_resource(&container, "a", &["b"], "");
    write_resource(&container, "b", &["a"], "");

    gas(temp.path())
        .arg("graph")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("dependency cycle"));
}

// ── resolve ───────────────────────────────────────────────────────────────────

#[test]
fn resolve_without_runtime_exits_with_not_found() {
    let temp = project();
    gas(temp.path())
        .args(["resolve"])
        .env("GAS__EVALUATOR__PROGRAM", "gas-test-no-such-runtime")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("gas-test-no-such-runtime"));
}

#[cfg(unix)]
#[test]
fn resolve_prints_typed_configs_as_json() {
    let temp = project();
    fs::write(
        temp.path().join(".gas.toml"),
        r#"[evaluator]
program = "sh"
args = ["-c", "cat >/dev/null; echo '{\"CORE_BASE_KV\":{\"type\":\"cloudflare-kv\",\"name\":\"CORE_BASE_KV\"},\"CORE_BASE_API\":{\"type\":\"cloudflare-worker\",\"name\":\"CORE_BASE_API\",\"kv\":[{\"binding\":\"CORE_BASE_KV\"}]}}'"]
"#,
    )
    .unwrap();

    let output = gas(temp.path())
        .args(["resolve", "--format", "json"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let resolution: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(resolution["configs"]["CORE_BASE_KV"]["type"], "cloudflare-kv");
    assert_eq!(
        resolution["configs"]["CORE_BASE_API"]["kv"][0]["binding"],
        "CORE_BASE_KV"
    );
    assert_eq!(resolution["issues"], serde_json::json!([]));
}

#[cfg(unix)]
#[test]
fn resolve_failure_shows_runtime_output() {
    let temp = project();
    fs::write(
        temp.path().join(".gas.toml"),
        "[evaluator]\nprogram = \"sh\"\nargs = [\"-c\", \"cat >/dev/null; echo 'SyntaxError: boom' >&2; exit 1\"]\n",
    )
    .unwrap();

    gas(temp.path())
        .arg("resolve")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("SyntaxError: boom"));
}

// ── init / config ─────────────────────────────────────────────────────────────

#[test]
fn init_writes_local_config_once() {
    let temp = TempDir::new().unwrap();

    gas(temp.path()).arg("init").assert().success();
    let written = fs::read_to_string(temp.path().join(".gas.toml")).unwrap();
    assert!(written.contains("container_dir = \"./gas\""));

    fs::write(temp.path().join(".gas.toml"), "# edited\n").unwrap();
    gas(temp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("--force"));
    assert_eq!(
        fs::read_to_string(temp.path().join(".gas.toml")).unwrap(),
        "# edited\n"
    );
}

#[test]
fn config_get_honours_environment() {
    let temp = TempDir::new().unwrap();
    gas(temp.path())
        .args(["config", "get", "evaluator.program"])
        .env("GAS__EVALUATOR__PROGRAM", "bun")
        .assert()
        .success()
        .stdout("bun\n");
}

#[test]
fn config_get_unknown_key_is_a_user_error() {
    let temp = TempDir::new().unwrap();
    gas(temp.path())
        .args(["config", "get", "nope.nope"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown config key"));
}

#[test]
fn malformed_config_file_exits_with_configuration_error() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(".gas.toml"), "[evaluator\n").unwrap();

    gas(temp.path())
        .args(["config", "list"])
        .assert()
        .code(4);
}

//! Integration tests for top-level CLI behavior.

use std::path::Path;
use std::process::Command;

const SERVICE: &str = r"
interface ResponseData<T> {
  code: number;
  msg: string;
  data: T;
}

interface User {
  name: string;
  age: number;
}

class Request {
  get<T>(url: string) {
    return this.fetch<T>(url);
  }
  fetch<T, R = ResponseData<T>>(url: string): Promise<R> {
    return fetch(url).then((res) => res.json());
  }
}

const http = new Request();

export class UserService {
  current() {
    return http.get<User>('/api/user');
  }
  roles() {
    return http.get<string[]>('/api/roles');
  }
}
";

fn run_shapemock(dir: &Path, args: &[&str]) -> std::process::Output {
    let bin = env!("CARGO_BIN_EXE_shapemock");
    Command::new(bin)
        .args(args)
        .current_dir(dir)
        .env_remove("SHAPEMOCK_CONFIG")
        .output()
        .expect("failed to run shapemock binary")
}

fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("src")).unwrap();
    std::fs::write(dir.path().join("src/user.ts"), SERVICE).unwrap();
    dir
}

#[test]
fn help_lists_subcommands() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_shapemock(dir.path(), &["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("serve"));
    assert!(stdout.contains("generate"));
    assert!(stdout.contains("diff"));
}

#[test]
fn generate_writes_structure_and_mocks() {
    let dir = project();
    let output = run_shapemock(dir.path(), &["generate"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("Added (2):"));
    assert!(stdout.contains("/api/user"));

    let mocks: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("mock/mock.json")).unwrap()).unwrap();
    let records = mocks.as_array().unwrap();
    assert_eq!(records.len(), 2);
    let user = records.iter().find(|r| r["url"] == "/api/user").unwrap();
    assert!(user["response"]["msg"].is_string());
    assert!(user["response"]["code"].is_number());
    assert!(user["response"]["data"]["name"].is_string());
    assert!(user["response"]["data"]["age"].is_number());
    assert!(dir.path().join("mock/structure.json").exists());
}

#[test]
fn second_generate_reports_no_changes() {
    let dir = project();
    assert!(run_shapemock(dir.path(), &["generate"]).status.success());
    let first = std::fs::read_to_string(dir.path().join("mock/mock.json")).unwrap();

    let output = run_shapemock(dir.path(), &["generate"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("No endpoint changes."));
    assert_eq!(std::fs::read_to_string(dir.path().join("mock/mock.json")).unwrap(), first);
}

#[test]
fn diff_reports_edits_without_writing() {
    let dir = project();
    assert!(run_shapemock(dir.path(), &["generate"]).status.success());
    let before = std::fs::read_to_string(dir.path().join("mock/structure.json")).unwrap();

    let edited = SERVICE.replace("age: number;", "age: number;\n  email: string;");
    std::fs::write(dir.path().join("src/user.ts"), edited).unwrap();

    let output = run_shapemock(dir.path(), &["diff"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("Changed (1):"));
    assert!(stdout.contains("/api/user"));
    assert_eq!(std::fs::read_to_string(dir.path().join("mock/structure.json")).unwrap(), before);
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = project();
    let output = run_shapemock(dir.path(), &["generate", "--config", "nope.yaml"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("config error"));
}

#[test]
fn config_file_selects_classes() {
    let dir = project();
    std::fs::write(dir.path().join("shapemock.yaml"), "includes: Order\n").unwrap();
    let output = run_shapemock(dir.path(), &["generate"]);
    assert!(output.status.success());
    let mocks = std::fs::read_to_string(dir.path().join("mock/mock.json")).unwrap();
    assert!(!mocks.contains("/api/user"));
}

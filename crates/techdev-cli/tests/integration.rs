#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PASSWORD: &str = "Passw0rd1";
const TOKEN: &str = "lead-token-0123456789abc";

fn techdev(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("techdev").unwrap();
    cmd.current_dir(dir.path())
        .env("TECHDEV_ROOT", dir.path())
        .env_remove("TECHDEV_USER")
        .env_remove("TECHDEV_PASSWORD")
        .env_remove("TECHDEV_LEAD_TOKEN");
    cmd
}

fn as_user(dir: &TempDir, user: &str) -> Command {
    let mut cmd = techdev(dir);
    cmd.args(["--user", user, "--password", PASSWORD]);
    cmd
}

/// Initialize with cheap hashing so tests stay fast.
fn init_project(dir: &TempDir) {
    techdev(dir).arg("init").assert().success();
    std::fs::write(
        dir.path().join(".techdev/config.yaml"),
        "version: 1\nhashing:\n  memory_kib: 8\n  iterations: 1\n  parallelism: 1\n",
    )
    .unwrap();
}

fn register(dir: &TempDir, user: &str) {
    techdev(dir)
        .args(["register", user, "--password", PASSWORD])
        .assert()
        .success();
}

fn json_of(cmd: &mut Command) -> serde_json::Value {
    let out = cmd.arg("--json").assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).unwrap()
}

// ---------------------------------------------------------------------------
// init / config
// ---------------------------------------------------------------------------

#[test]
fn init_creates_config() {
    let dir = TempDir::new().unwrap();
    techdev(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("created: .techdev/config.yaml"));
    assert!(dir.path().join(".techdev/config.yaml").exists());
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    techdev(&dir).arg("init").assert().success();
    techdev(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("exists:"));
}

#[test]
fn config_validate_flags_zero_capacity() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    techdev(&dir).args(["config", "validate"]).assert().success();

    std::fs::write(
        dir.path().join(".techdev/config.yaml"),
        "roster:\n  max_members: 0\n",
    )
    .unwrap();
    techdev(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("max_members"));
}

// ---------------------------------------------------------------------------
// register / login
// ---------------------------------------------------------------------------

#[test]
fn register_then_login() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "alice@x.com");

    as_user(&dir, "alice@x.com")
        .arg("login")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as alice@x.com (Unassigned)"));
}

#[test]
fn duplicate_registration_fails() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "alice@x.com");
    techdev(&dir)
        .args(["register", "alice@x.com", "--password", "Other0pass"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already registered"));
}

#[test]
fn weak_password_is_rejected() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    techdev(&dir)
        .args(["register", "bob", "--password", "short1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("weak password"));
}

#[test]
fn wrong_password_fails() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "alice");
    techdev(&dir)
        .args(["login", "--user", "alice", "--password", "Wrong0pass"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid credentials"));
}

#[test]
fn missing_credentials_are_reported() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    techdev(&dir)
        .arg("whoami")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--user"));
}

// ---------------------------------------------------------------------------
// roles and teams
// ---------------------------------------------------------------------------

#[test]
fn intern_builds_team_and_lead_sees_it() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "alice@x.com");
    register(&dir, "lead@x.com");

    as_user(&dir, "alice@x.com")
        .args(["role", "intern"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Developer Intern"));
    as_user(&dir, "alice@x.com")
        .args(["team", "add", "Bo", "bo99"])
        .assert()
        .success();
    as_user(&dir, "alice@x.com")
        .args(["team", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("@bo99"));

    as_user(&dir, "lead@x.com")
        .args(["role", "tech-lead", "--token", TOKEN])
        .assert()
        .success()
        .stdout(predicate::str::contains("tech_lead_verified"));

    let teams = json_of(as_user(&dir, "lead@x.com").arg("teams"));
    let teams = teams.as_array().unwrap();
    assert_eq!(teams.len(), 1);
    assert_eq!(teams[0]["leader"], "alice@x.com");
    assert_eq!(teams[0]["member_count"], 1);
    assert_eq!(teams[0]["available_slots"], 4);
}

#[test]
fn intern_cannot_list_all_teams() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "alice");
    as_user(&dir, "alice").args(["role", "intern"]).assert().success();
    as_user(&dir, "alice")
        .arg("teams")
        .assert()
        .failure()
        .stderr(predicate::str::contains("forbidden"));
}

#[test]
fn weak_token_is_rejected() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "lead");
    as_user(&dir, "lead")
        .args(["role", "tech-lead", "--token", "short"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("weak tech lead token"));
}

#[test]
fn sixth_member_is_rejected() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "alice");
    as_user(&dir, "alice").args(["role", "intern"]).assert().success();
    for i in 1..=5 {
        let name = format!("M{i}");
        let handle = format!("m{i}");
        as_user(&dir, "alice")
            .args(["team", "add", name.as_str(), handle.as_str()])
            .assert()
            .success();
    }
    as_user(&dir, "alice")
        .args(["team", "add", "Extra", "extra"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("team is full"));
}

#[test]
fn remove_member_by_position() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "alice");
    as_user(&dir, "alice").args(["role", "intern"]).assert().success();
    for h in ["a", "b", "c"] {
        as_user(&dir, "alice")
            .args(["team", "add", h, h])
            .assert()
            .success();
    }
    as_user(&dir, "alice")
        .args(["team", "remove", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("@b"));
    as_user(&dir, "alice")
        .args(["team", "remove", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no member at position 3"));
}

#[test]
fn stats_for_verified_lead() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "alice");
    register(&dir, "lead");
    as_user(&dir, "alice").args(["role", "intern"]).assert().success();
    as_user(&dir, "alice")
        .args(["team", "add", "Bo", "bo"])
        .assert()
        .success();
    as_user(&dir, "lead")
        .args(["role", "tech-lead", "--token", TOKEN])
        .assert()
        .success();

    let stats = json_of(as_user(&dir, "lead").arg("stats"));
    assert_eq!(stats["total_users"], 2);
    assert_eq!(stats["total_teams"], 1);
    // 30 for roles, 40 for the staffed team, 15 for one lead in two users
    assert_eq!(stats["platform_health_score"], 85.0);
}

#[test]
fn token_generate_prints_valid_token() {
    let dir = TempDir::new().unwrap();
    let out = json_of(techdev(&dir).args(["token", "generate"]));
    assert_eq!(out["token"].as_str().unwrap().len(), 32);
}

// ---------------------------------------------------------------------------
// standups
// ---------------------------------------------------------------------------

#[test]
fn standup_add_and_list() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "alice");
    as_user(&dir, "alice")
        .args([
            "standup",
            "add",
            "--student-id",
            "S-7",
            "--tasks",
            "built roster",
            "--learned",
            "serde aliases",
        ])
        .assert()
        .success();
    as_user(&dir, "alice")
        .args(["standup", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("built roster"));
}

// ---------------------------------------------------------------------------
// shell
// ---------------------------------------------------------------------------

#[test]
fn shell_rate_limits_repeated_failures() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "alice");

    let script = format!(
        "login alice Wrong0pass\nlogin alice Wrong0pass\nlogin alice Wrong0pass\nlogin alice {PASSWORD}\nquit\n"
    );
    techdev(&dir)
        .arg("shell")
        .write_stdin(script)
        .assert()
        .success()
        .stderr(predicate::str::contains("too many failed attempts"))
        .stdout(predicate::str::contains("Logged in").not());
}

#[test]
fn shell_session_flow() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let script = format!(
        "register alice {PASSWORD}\nlogin alice {PASSWORD}\nintern\ngo team\nadd Bo Lee bo99\nteam\ngo teams\nwhoami\n"
    );
    techdev(&dir)
        .arg("shell")
        .write_stdin(script)
        .assert()
        .success()
        .stdout(predicate::str::contains("Page: team_management"))
        .stdout(predicate::str::contains("Bo Lee"))
        .stderr(predicate::str::contains("forbidden"));
}

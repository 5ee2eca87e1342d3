use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;
use tempfile::TempDir;

const REGISTRY: &str = r#"{
  "coauthors": {
    "jd": { "name": "Jane Doe", "email": "jane@x.com" },
    "ab": { "name": "Amy Brown", "email": "amy@example.com" }
  }
}
"#;

/// Isolated home, authors file and (optionally) git repository.
struct TestEnv {
    tmp: TempDir,
    home: PathBuf,
    authors: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let home = tmp.path().join("home");
        fs::create_dir_all(&home).expect("create isolated home");
        fs::write(home.join(".gitconfig"), "").expect("empty global config");
        let authors = home.join(".git-coauthors");
        Self { tmp, home, authors }
    }

    fn with_registry(self) -> Self {
        fs::write(&self.authors, REGISTRY).expect("seed authors");
        self
    }

    fn repo(&self) -> PathBuf {
        self.tmp.path().join("repo")
    }

    fn cmd(&self, bin: &str) -> Command {
        let mut cmd = match bin {
            "mob" => cargo_bin_cmd!("mob"),
            "solo" => cargo_bin_cmd!("solo"),
            "add-author" => cargo_bin_cmd!("add-author"),
            other => panic!("unknown binary {other}"),
        };
        cmd.env("HOME", &self.home)
            .env("GIT_CONFIG_GLOBAL", self.home.join(".gitconfig"))
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .env("GITMOB_COAUTHORS_PATH", &self.authors)
            .env_remove("GITMOB_MESSAGE_PATH")
            .env_remove("GITMOB_LOG");
        if self.repo().exists() {
            cmd.current_dir(self.repo());
        } else {
            cmd.current_dir(self.tmp.path());
        }
        cmd
    }

    fn git(&self, args: &[&str]) -> std::process::Output {
        StdCommand::new("git")
            .args(args)
            .current_dir(self.repo())
            .env("HOME", &self.home)
            .env("GIT_CONFIG_GLOBAL", self.home.join(".gitconfig"))
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .output()
            .expect("run git")
    }

    /// Creates a repository with a local user; `false` if git is unavailable.
    fn init_repo(&self) -> bool {
        if which::which("git").is_err() {
            eprintln!("git not found; skipping");
            return false;
        }
        fs::create_dir_all(self.repo()).expect("create repo dir");
        assert!(self.git(&["init", "-q"]).status.success());
        assert!(self.git(&["config", "user.name", "Me Myself"]).status.success());
        assert!(self.git(&["config", "user.email", "me@example.com"]).status.success());
        true
    }

    fn active(&self) -> Vec<String> {
        let out = self.git(&["config", "--get-all", "git-mob.co-author"]);
        String::from_utf8_lossy(&out.stdout)
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn template(&self) -> PathBuf {
        self.repo().join(".git").join(".gitmessage")
    }
}

fn trailer_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .filter(|l| l.starts_with("Co-authored-by:"))
        .map(str::to_string)
        .collect()
}

#[test]
fn version_flags() {
    let env = TestEnv::new();
    for flag in ["-v", "--version"] {
        env.cmd("mob")
            .arg(flag)
            .assert()
            .success()
            .stdout(contains(env!("CARGO_PKG_VERSION")));
    }
}

#[test]
fn help_mentions_initials() {
    let env = TestEnv::new();
    env.cmd("mob").arg("--help").assert().success().stdout(contains("INITIALS"));
    env.cmd("add-author").arg("-h").assert().success().stdout(contains("<INITIALS>"));
}

#[test]
fn add_author_writes_registry() {
    let env = TestEnv::new();
    env.cmd("add-author")
        .args(["jd", "Jane Doe", "jane@x.com"])
        .assert()
        .success()
        .stdout(contains("Jane Doe has been added to the .git-coauthors file"));

    let body = fs::read_to_string(&env.authors).expect("authors written");
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid json");
    assert_eq!(json["coauthors"]["jd"]["email"], "jane@x.com");
}

#[test]
fn add_author_rejects_bad_email() {
    let env = TestEnv::new().with_registry();
    env.cmd("add-author")
        .args(["zz", "Zed", "not-an-email"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("invalid email format"));

    assert_eq!(fs::read_to_string(&env.authors).unwrap(), REGISTRY);
}

#[test]
fn list_prints_registry() {
    let env = TestEnv::new().with_registry();
    env.cmd("mob")
        .arg("--list")
        .assert()
        .success()
        .stdout(contains("Amy Brown <amy@example.com>"))
        .stdout(contains("jd  Jane Doe <jane@x.com>"));
}

#[test]
fn list_without_registry_fails() {
    let env = TestEnv::new();
    env.cmd("mob")
        .arg("--list")
        .assert()
        .failure()
        .stderr(contains("authors file not found"));
}

#[test]
fn mob_then_solo_in_repository() {
    let env = TestEnv::new().with_registry();
    if !env.init_repo() {
        return;
    }

    env.cmd("mob")
        .arg("jd")
        .assert()
        .success()
        .stdout(contains("Me Myself <me@example.com>"))
        .stdout(contains("Jane Doe <jane@x.com>"));
    assert_eq!(env.active(), vec!["Jane Doe <jane@x.com>"]);
    assert_eq!(
        trailer_lines(&env.template()),
        vec!["Co-authored-by: Jane Doe <jane@x.com>"]
    );
    let template = String::from_utf8_lossy(&env.git(&["config", "commit.template"]).stdout)
        .trim()
        .to_string();
    assert!(template.ends_with(".gitmessage"));

    env.cmd("mob")
        .args(["ab", "jd"])
        .assert()
        .success();
    assert_eq!(
        env.active(),
        vec!["Amy Brown <amy@example.com>", "Jane Doe <jane@x.com>"]
    );
    assert_eq!(trailer_lines(&env.template()).len(), 2);

    env.cmd("mob")
        .arg("--print")
        .assert()
        .success()
        .stdout(contains("Co-authored-by: Amy Brown <amy@example.com>"));

    env.cmd("solo").assert().success();
    assert!(env.active().is_empty());
    assert!(trailer_lines(&env.template()).is_empty());
}

#[test]
fn unknown_initials_leave_state_alone() {
    let env = TestEnv::new().with_registry();
    if !env.init_repo() {
        return;
    }
    env.cmd("mob").arg("jd").assert().success();
    let before = fs::read_to_string(env.template()).expect("template");

    env.cmd("mob")
        .arg("zz")
        .assert()
        .failure()
        .code(1)
        .stderr(contains("\"zz\" not found"));

    assert_eq!(env.active(), vec!["Jane Doe <jane@x.com>"]);
    assert_eq!(fs::read_to_string(env.template()).unwrap(), before);
}

#[test]
fn add_author_rejects_bad_names() {
    let env = TestEnv::new().with_registry();
    for name in ["", "Jane\nDoe", "Jane <jd>"] {
        env.cmd("add-author")
            .args(["xx", name, "x@example.com"])
            .assert()
            .failure()
            .code(1)
            .stderr(contains("invalid co-author name"));
    }

    assert_eq!(fs::read_to_string(&env.authors).unwrap(), REGISTRY);
}

#[test]
fn mob_works_under_translated_git() {
    let env = TestEnv::new().with_registry();
    if !env.init_repo() {
        return;
    }

    for _ in 0..2 {
        env.cmd("mob")
            .arg("jd")
            .env("LANGUAGE", "de")
            .env("LC_ALL", "de_DE.UTF-8")
            .env("LANG", "de_DE.UTF-8")
            .assert()
            .success();
        assert_eq!(env.active(), vec!["Jane Doe <jane@x.com>"]);

        env.cmd("solo")
            .env("LANGUAGE", "de")
            .env("LC_ALL", "de_DE.UTF-8")
            .assert()
            .success();
        assert!(env.active().is_empty());
    }
}

#[test]
fn commands_without_registry_need_no_home() {
    let env = TestEnv::new();
    if !env.init_repo() {
        return;
    }
    let homeless = |bin: &str| {
        let mut cmd = env.cmd(bin);
        cmd.env_remove("HOME")
            .env_remove("USERPROFILE")
            .env_remove("GITMOB_COAUTHORS_PATH");
        cmd
    };

    homeless("mob")
        .assert()
        .success()
        .stdout(contains("Me Myself <me@example.com>"));
    homeless("mob").arg("--print").assert().success();
    homeless("solo").assert().success();

    homeless("mob")
        .arg("jd")
        .assert()
        .failure()
        .code(1)
        .stderr(contains("GITMOB_COAUTHORS_PATH"));
    homeless("add-author")
        .args(["jd", "Jane Doe", "jane@x.com"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("cannot locate a home directory"));
}

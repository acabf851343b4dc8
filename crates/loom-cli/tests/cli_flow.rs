use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use loom_core::{archive, find_lockwise_files, hash_passphrase, Layout, VerifyKeyStore};
use tempfile::TempDir;

const PASSPHRASE: &str = "correct horse battery staple";
const KEY4_BYTES: &[u8] = b"SQLite format 3\0key4 contents";
const LOGINS_JSON: &[u8] = br#"{"logins":[]}"#;

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_loom"))
}

struct Sandbox {
    _dir: TempDir,
    // Canonical so relative paths resolved from a child's cwd line up.
    root: PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().canonicalize().expect("canonicalize tempdir");
        fs::create_dir_all(root.join("home")).expect("create home");
        fs::create_dir_all(root.join("config")).expect("create config");
        Self { _dir: dir, root }
    }

    fn home(&self) -> PathBuf {
        self.root.join("home")
    }

    fn remote(&self) -> PathBuf {
        self.root.join("remote.git")
    }

    fn layout(&self) -> Layout {
        Layout::new(self.home(), self.remote().to_string_lossy().to_string())
    }

    fn profile_dir(&self) -> PathBuf {
        self.home().join(".mozilla/firefox/abcd1234.default")
    }

    fn write_profile(&self) {
        let profile = self.profile_dir();
        fs::create_dir_all(&profile).expect("create profile");
        fs::write(profile.join("key4.db"), KEY4_BYTES).expect("write key4.db");
        fs::write(profile.join("logins.json"), LOGINS_JSON).expect("write logins.json");
    }

    /// Archive the profile through the library, as a previous backup would.
    fn seed_archive(&self) {
        let layout = self.layout();
        let (encrypt_key, verify_key) = hash_passphrase(PASSPHRASE);
        VerifyKeyStore::new(layout.verify_key_path())
            .save(&verify_key)
            .expect("save verify key");
        let sources =
            find_lockwise_files(&layout.firefox_dir, &layout.profile_pattern).expect("discover");
        assert_eq!(sources.len(), 2);
        for source in &sources {
            archive(source, &layout.repo_root, &layout.home, &encrypt_key)
                .expect("archive")
                .expect("source under home");
        }
    }

    fn command(&self, passphrase: Option<&str>) -> Command {
        let mut cmd = Command::new(bin());
        cmd.env_clear()
            .env("PATH", std::env::var_os("PATH").unwrap_or_default())
            .env("HOME", self.home())
            .env("USER", "alice")
            .env("XDG_CONFIG_HOME", self.root.join("config"))
            .env("LOOM_REMOTE", self.remote())
            .env("GIT_AUTHOR_NAME", "Loom Test")
            .env("GIT_AUTHOR_EMAIL", "loom@example.com")
            .env("GIT_COMMITTER_NAME", "Loom Test")
            .env("GIT_COMMITTER_EMAIL", "loom@example.com")
            .env("GIT_CONFIG_NOSYSTEM", "1");
        if let Some(passphrase) = passphrase {
            cmd.env("LOOM_PASSPHRASE", passphrase);
        }
        cmd
    }

    fn init_remote(&self) {
        fs::create_dir_all(self.remote()).expect("create remote");
        git(&self.remote(), &["init", "--bare", "--quiet"]);
    }

    fn run(&self, args: &[&str], passphrase: Option<&str>) -> Output {
        self.command(passphrase)
            .args(args)
            .output()
            .expect("run loom")
    }
}

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .expect("run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_help_aliases_print_usage() {
    let sandbox = Sandbox::new();
    for alias in ["help", "--help", "-help", "-h"] {
        let output = sandbox.run(&[alias], None);
        assert!(output.status.success(), "alias {} failed", alias);
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("loom restore <path>"), "alias {}", alias);
    }
}

#[test]
fn test_unknown_argument_fails() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["frobnicate"], None);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("Unknown argument: frobnicate"));
    assert!(err.contains("Usage:"));
}

#[test]
fn test_bare_double_dash_is_unknown() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["--"], Some(PASSPHRASE));

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Unknown argument: --"));
    assert!(!sandbox.layout().repo_root.exists());
}

#[test]
fn test_restore_without_path_fails() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["restore"], Some(PASSPHRASE));

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("restore requires a <path> argument"));
}

#[test]
fn test_restore_unrecognized_path_fails_before_prompting() {
    let sandbox = Sandbox::new();
    sandbox.write_profile();

    let output = sandbox.run(&["restore", "/etc/passwd"], None);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("is not a recognized Lockwise file"));
    assert!(err.contains("key4.db"));
    assert!(!err.contains("no TTY"));
}

#[test]
fn test_restore_decrypts_to_stdout() {
    let sandbox = Sandbox::new();
    sandbox.write_profile();
    sandbox.seed_archive();

    // Sources change after the backup; restore must return the archived bytes.
    fs::write(sandbox.profile_dir().join("key4.db"), b"clobbered").expect("clobber");
    fs::write(sandbox.profile_dir().join("logins.json"), b"clobbered").expect("clobber");

    let key4 = sandbox.profile_dir().join("key4.db");
    let output = sandbox.run(&["restore", &key4.to_string_lossy()], Some(PASSPHRASE));
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(output.stdout, KEY4_BYTES);

    let logins = sandbox.profile_dir().join("logins.json");
    let output = sandbox.run(&["restore", &logins.to_string_lossy()], Some(PASSPHRASE));
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(output.stdout, LOGINS_JSON);
}

#[test]
fn test_restore_accepts_relative_path() {
    let sandbox = Sandbox::new();
    sandbox.write_profile();
    sandbox.seed_archive();

    let output = sandbox
        .command(Some(PASSPHRASE))
        .current_dir(sandbox.home())
        .args(["restore", "./.mozilla/firefox/abcd1234.default/key4.db"])
        .output()
        .expect("run loom");

    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(output.stdout, KEY4_BYTES);
}

#[test]
fn test_restore_wrong_passphrase_fails() {
    let sandbox = Sandbox::new();
    sandbox.write_profile();
    sandbox.seed_archive();

    let key4 = sandbox.profile_dir().join("key4.db");
    let output = sandbox.run(&["restore", &key4.to_string_lossy()], Some("wrong"));

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_restore_without_backup_reports_missing_verify_key() {
    let sandbox = Sandbox::new();
    sandbox.write_profile();

    let key4 = sandbox.profile_dir().join("key4.db");
    let output = sandbox.run(&["restore", &key4.to_string_lossy()], Some(PASSPHRASE));

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("No verify key found"));
}

#[test]
fn test_restore_without_passphrase_source_fails() {
    let sandbox = Sandbox::new();
    sandbox.write_profile();
    sandbox.seed_archive();

    let key4 = sandbox.profile_dir().join("key4.db");
    let output = sandbox.run(&["restore", &key4.to_string_lossy()], None);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("LOOM_PASSPHRASE"));
}

#[test]
fn test_backup_pushes_encrypted_mirror() {
    if !git_available() {
        return;
    }
    let sandbox = Sandbox::new();
    sandbox.write_profile();
    sandbox.init_remote();

    let output = sandbox.run(&[], Some(PASSPHRASE));
    assert!(output.status.success(), "{}", stderr(&output));

    let layout = sandbox.layout();
    let mirrored_key4 = layout
        .repo_root
        .join(".mozilla/firefox/abcd1234.default/key4.db");
    let mirrored_logins = layout
        .repo_root
        .join(".mozilla/firefox/abcd1234.default/logins.json");
    assert_ne!(fs::read(&mirrored_key4).expect("read mirror"), KEY4_BYTES);
    assert_eq!(fs::read(&mirrored_logins).expect("read mirror"), LOGINS_JSON);
    assert!(layout.verify_key_path().is_file());

    let tracked = git(&sandbox.remote(), &["ls-tree", "-r", "--name-only", "master"]);
    assert!(tracked.lines().any(|l| l == ".gitignore"));
    assert!(tracked
        .lines()
        .any(|l| l == ".mozilla/firefox/abcd1234.default/key4.db"));
    assert!(!tracked.lines().any(|l| l == ".loom-verify.key"));

    let subject = git(&sandbox.remote(), &["log", "-1", "--format=%s", "master"]);
    assert!(subject.starts_with(":new: "));

    // A second run with the same passphrase restores what was pushed.
    let key4 = sandbox.profile_dir().join("key4.db");
    let output = sandbox.run(&["restore", &key4.to_string_lossy()], Some(PASSPHRASE));
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(output.stdout, KEY4_BYTES);
}

#[test]
fn test_backup_with_mismatched_passphrase_fails() {
    if !git_available() {
        return;
    }
    let sandbox = Sandbox::new();
    sandbox.write_profile();
    sandbox.init_remote();

    let output = sandbox.run(&[], Some(PASSPHRASE));
    assert!(output.status.success(), "{}", stderr(&output));

    let output = sandbox.run(&[], Some("different"));
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_backup_without_sources_still_pushes_gitignore() {
    if !git_available() {
        return;
    }
    let sandbox = Sandbox::new();
    sandbox.init_remote();

    let output = sandbox.run(&[], Some(PASSPHRASE));
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Backed up 0 files"));

    // Piped stderr carries the warning without color codes.
    let err = stderr(&output);
    assert!(err.contains("no Lockwise files found"), "{}", err);
    assert!(!err.contains('\u{1b}'), "{:?}", err);

    let tracked = git(&sandbox.remote(), &["ls-tree", "-r", "--name-only", "master"]);
    assert_eq!(tracked.lines().collect::<Vec<_>>(), vec![".gitignore"]);
}

#[test]
fn test_backup_fails_when_every_source_is_outside_home() {
    if !git_available() {
        return;
    }
    let sandbox = Sandbox::new();
    sandbox.init_remote();

    let outside = sandbox.root.join("outside/firefox");
    let profile = outside.join("abcd1234.default");
    fs::create_dir_all(&profile).expect("create outside profile");
    fs::write(profile.join("key4.db"), KEY4_BYTES).expect("write key4.db");
    fs::write(profile.join("logins.json"), LOGINS_JSON).expect("write logins.json");

    let config_path = sandbox.root.join("outside.toml");
    fs::write(
        &config_path,
        format!("[firefox]\nprofiles_dir = \"{}\"\n", outside.display()),
    )
    .expect("write config");

    let output = sandbox
        .command(Some(PASSPHRASE))
        .env("LOOM_CONFIG", &config_path)
        .output()
        .expect("run loom");

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("None of the Lockwise files are under"), "{}", err);
    assert!(err.contains("is not under home directory"), "{}", err);
    assert!(!sandbox
        .layout()
        .repo_root
        .join(".mozilla/firefox/abcd1234.default/key4.db")
        .exists());
}

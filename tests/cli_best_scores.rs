use assert_cmd::Command;
use reflex::high_score::{HighScoreStore, SqliteHighScoreStore};
use reflex::Mode;
use tempfile::TempDir;

fn reflex(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("reflex").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env("XDG_DATA_HOME", home.path().join(".local").join("share"));
    cmd
}

fn db_path(home: &TempDir) -> std::path::PathBuf {
    home.path()
        .join(".local")
        .join("state")
        .join("reflex")
        .join("scores.db")
}

#[test]
fn show_best_defaults_to_zero() {
    let home = tempfile::tempdir().unwrap();
    reflex(&home)
        .arg("--show-best")
        .assert()
        .success()
        .stdout("30s: 0\n60s: 0\n");
}

#[test]
fn show_best_reads_stored_records() {
    let home = tempfile::tempdir().unwrap();
    {
        let mut store = SqliteHighScoreStore::open(db_path(&home)).unwrap();
        store.set_if_greater(Mode::SixtySecond, 17).unwrap();
    }

    reflex(&home)
        .arg("--show-best")
        .assert()
        .success()
        .stdout("30s: 0\n60s: 17\n");
}

#[test]
fn reset_best_clears_only_that_mode() {
    let home = tempfile::tempdir().unwrap();
    {
        let mut store = SqliteHighScoreStore::open(db_path(&home)).unwrap();
        store.set_if_greater(Mode::ThirtySecond, 9).unwrap();
        store.set_if_greater(Mode::SixtySecond, 12).unwrap();
    }

    reflex(&home).args(["--reset-best", "30"]).assert().success();

    let store = SqliteHighScoreStore::open(db_path(&home)).unwrap();
    assert_eq!(store.get(Mode::ThirtySecond).unwrap(), 0);
    assert_eq!(store.get(Mode::SixtySecond).unwrap(), 12);
}

#[test]
fn rejects_oversized_ring_from_config_file() {
    let home = tempfile::tempdir().unwrap();
    let config_dir = home.path().join(".config").join("reflex");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.json"), r#"{ "target_count": 40 }"#).unwrap();

    reflex(&home).arg("--show-best").assert().failure();

    // a flag within range overrides the file
    reflex(&home)
        .args(["-t", "12", "--show-best"])
        .assert()
        .success();
}

#[test]
fn rejects_single_target_ring() {
    let home = tempfile::tempdir().unwrap();
    reflex(&home).args(["-t", "1", "--show-best"]).assert().failure();
}

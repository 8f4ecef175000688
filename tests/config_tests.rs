//! Configuration loading tests.

use storebatch::config::Config;

fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storebatch.toml");
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn minimal_file_fills_in_defaults() {
    let (_dir, path) = write_config("[job]\nchunk_size = 100\n");

    let config = Config::load(&path).unwrap();

    assert_eq!(config.job.chunk_size, 100);
    assert_eq!(config.job.write_attempts, 3);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.database.pool_size, 5);
}

#[test]
fn malformed_toml_is_rejected() {
    let (_dir, path) = write_config("job = {chunk_size =");

    assert!(Config::load(&path).is_err());
}

#[test]
fn missing_file_is_an_error() {
    assert!(Config::load("/definitely/not/here.toml").is_err());
}

#[test]
fn zero_write_attempts_are_rejected() {
    let (_dir, path) = write_config("[job]\nwrite_attempts = 0\n");

    let err = Config::load(&path).unwrap_err();
    assert!(err.to_string().contains("write_attempts"));
}

#[test]
fn database_url_env_var_takes_precedence() {
    let (_dir, path) = write_config("[database]\nurl = \"from-file.db\"\n");

    std::env::set_var("DATABASE_URL", "from-env.db");
    let config = Config::load(&path).unwrap();
    std::env::remove_var("DATABASE_URL");

    assert_eq!(config.database.url, "from-env.db");
}

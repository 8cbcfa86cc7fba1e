#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use tempfile::TempDir;

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../docs/fixtures")
        .canonicalize()
        .expect("fixtures present")
}

pub fn fixture(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

/// A fresh database in a temp dir with catalogs from the fixtures.
pub struct Sandbox {
    pub dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn database(&self) -> PathBuf {
        self.dir.path().join("game.db")
    }

    pub fn cmd(&self) -> Command {
        command_with(&self.database())
    }

    /// Like [`Sandbox::cmd`] but reading catalogs from `data_dir`.
    pub fn cmd_with_data_dir(&self, data_dir: &Path) -> Command {
        command_with_data_dir(&self.database(), data_dir)
    }

    /// `init` with one player owning one planet; both get id 1.
    pub fn seeded() -> Self {
        let sandbox = Self::new();
        sandbox
            .cmd()
            .args(["init", "--player", "Ava", "--planet", "Coruscant"])
            .assert()
            .success();
        sandbox
    }
}

pub fn command_with(database: &Path) -> Command {
    command_with_data_dir(database, &fixtures_dir())
}

pub fn command_with_data_dir(database: &Path, data_dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("imperium-cli");
    cmd.env_remove("IMPERIUM_DATABASE")
        .env_remove("IMPERIUM_DATA_DIR")
        .env("RUST_LOG", "error")
        .arg("--data-dir")
        .arg(data_dir)
        .arg("--database")
        .arg(database);
    cmd
}

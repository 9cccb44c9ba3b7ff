#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use taskd::config::StorageConfig;
use taskd::storage::Storage;
use taskd::TaskService;
use tempfile::TempDir;

/// Scratch directory holding a data directory and optional config
pub struct TestData {
    dir: TempDir,
}

impl TestData {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create tempdir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn storage(&self) -> Storage {
        Storage::new(self.data_dir(), &StorageConfig::default())
    }

    pub fn service(&self) -> TaskService {
        TaskService::open(&self.storage(), 2000)
    }

    pub fn write_data_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.data_dir().join(name);
        fs::create_dir_all(self.data_dir()).expect("create data dir");
        fs::write(&path, contents).expect("write data file");
        path
    }

    pub fn read_data_json(&self, name: &str) -> Value {
        let raw = fs::read_to_string(self.data_dir().join(name)).expect("read data file");
        serde_json::from_str(&raw).expect("data file is JSON")
    }

    pub fn ids_in(&self, name: &str) -> Vec<u64> {
        self.read_data_json(name)
            .as_array()
            .expect("collection is an array")
            .iter()
            .map(|record| record["id"].as_u64().expect("numeric id"))
            .collect()
    }

    /// `taskd` binary running in the scratch root against its data dir
    pub fn taskd(&self) -> Command {
        let mut cmd = Command::cargo_bin("taskd").expect("binary");
        cmd.current_dir(self.root())
            .env_remove("TASKD_CONFIG")
            .env_remove("TASKD_DATA_DIR")
            .env("RUST_LOG", "off")
            .arg("--data-dir")
            .arg(self.data_dir());
        cmd
    }
}

pub fn task_json(id: u64, title: &str) -> Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "description": format!("{title} description"),
        "completed": false,
    })
}

pub fn deleted_json(id: u64, title: &str, timestamp: &str) -> Value {
    let mut record = task_json(id, title);
    record["deletion_timestamp"] = Value::String(timestamp.to_string());
    record
}

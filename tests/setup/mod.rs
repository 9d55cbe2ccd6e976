#![allow(dead_code)]

use assert_cmd::Command;
use mockito::{Mock, Server, ServerGuard};
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

pub fn setup_test_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// Binary pointed at a plugins directory inside `dir`
pub fn get_bin(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pyarchinit-installer").expect("Failed to find binary");
    cmd.env_remove("QGIS_CUSTOM_CONFIG_PATH")
        .env_remove("RUST_LOG")
        .arg("--plugins-dir")
        .arg(plugins_dir(dir));
    cmd
}

pub fn plugins_dir(dir: &TempDir) -> PathBuf {
    dir.path().join("plugins")
}

pub fn create_installation(dir: &TempDir, folder: &str, version: &str) -> PathBuf {
    let plugin_dir = plugins_dir(dir).join(folder);
    fs::create_dir_all(&plugin_dir).expect("Failed to create plugin dir");
    fs::write(
        plugin_dir.join("metadata.txt"),
        format!("[general]\nname=pyArchInit\nversion={}\n", version),
    )
    .expect("Failed to write metadata.txt");
    fs::write(plugin_dir.join("old_module.py"), "# old\n").expect("Failed to write module");
    plugin_dir
}

pub fn folder_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("Failed to read dir")
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

/// Zip shaped like a GitHub branch archive, everything under `root/`
pub fn branch_archive(root: &str, version: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    writer
        .add_directory(format!("{}/", root), options)
        .expect("Failed to add root folder");
    writer
        .start_file(format!("{}/__init__.py", root), options)
        .expect("Failed to start file");
    writer
        .write_all(b"def classFactory(iface): pass\n")
        .expect("Failed to write file");
    writer
        .start_file(format!("{}/metadata.txt", root), options)
        .expect("Failed to start file");
    writer
        .write_all(format!("[general]\nname=pyArchInit\nversion={}\n", version).as_bytes())
        .expect("Failed to write file");
    writer.finish().expect("Failed to finish zip").into_inner()
}

/// Path GitHub serves the branch archive under
pub fn archive_path(git_ref: &str) -> String {
    format!("/pyarchinit/pyarchinit/archive/refs/heads/{}.zip", git_ref)
}

/// Serves `body` with `status` for the archive of `git_ref`, keep the server alive while in use
pub fn archive_server(git_ref: &str, status: usize, body: Vec<u8>) -> (ServerGuard, Mock) {
    let mut server = Server::new();
    let mock = server
        .mock("GET", archive_path(git_ref).as_str())
        .with_status(status)
        .with_header("content-type", "application/zip")
        .with_body(body)
        .create();
    (server, mock)
}

/// A base URL nothing listens on
pub const UNREACHABLE_BASE_URL: &str = "http://127.0.0.1:1";

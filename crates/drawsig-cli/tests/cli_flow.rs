//! cli_flow.rs
//!
//! Drives the `drawsig` binary through sign / verify / edit / unlock on a copy
//! of `tests/fixtures/bracket.json` in a temp directory.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

const GOLDEN_DIGEST: &str = "0f29e5fca71a309d0f44e8379dac83379b0d5fc504acc95e757f41130caaa40d";

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("bracket.json")
}

fn workspace() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let drawing = dir.path().join("bracket.json");
    fs::copy(fixture(), &drawing).unwrap();
    (dir, drawing)
}

fn drawsig() -> Command {
    let mut cmd = Command::cargo_bin("drawsig").unwrap();
    cmd.env_remove("DRAWSIG_SECRET_SUFFIX").env_remove("RUST_LOG");
    cmd
}

fn json(cmd: &mut Command) -> (bool, Value) {
    let out = cmd.arg("--json").output().unwrap();
    let v = serde_json::from_slice(&out.stdout).unwrap_or(Value::Null);
    (out.status.success(), v)
}

fn sign(drawing: &Path, extra: &[&str]) -> (bool, Value) {
    json(
        drawsig()
            .arg("sign")
            .arg(drawing)
            .args(["--username", "alice", "--full-name", "Alice Liddell"])
            .args(extra),
    )
}

fn verify(drawing: &Path, extra: &[&str]) -> (bool, Value) {
    json(drawsig().arg("verify").arg(drawing).args(extra))
}

#[test]
fn digest_matches_golden_value() {
    let (_dir, drawing) = workspace();
    let (ok, v) = json(drawsig().arg("digest").arg(&drawing));
    assert!(ok);
    assert_eq!(v["digest"], GOLDEN_DIGEST);
    assert_eq!(v["newline"], "lf");
}

#[test]
fn sign_verify_tamper_cycle() {
    let (dir, drawing) = workspace();

    let (ok, v) = sign(&drawing, &[]);
    assert!(ok, "sign failed: {v}");
    assert_eq!(v["method"], "hmac-sha256");
    assert_eq!(v["digest"], GOLDEN_DIGEST);
    assert_eq!(v["locked"], true);
    assert!(dir.path().join("bracket.json.props.json").exists());

    let (ok, v) = verify(&drawing, &[]);
    assert!(ok);
    assert_eq!(v["reason"], "Valid");
    assert_eq!(v["signer_name"], "Alice Liddell");

    drawsig()
        .arg("edit")
        .arg(&drawing)
        .args(["--property", "Revision Number=B"])
        .assert()
        .failure();
    let (ok, v) = verify(&drawing, &[]);
    assert!(ok, "refused edit must not change the drawing: {v}");

    let (ok, _) = json(
        drawsig()
            .arg("edit")
            .arg(&drawing)
            .args(["--property", "Revision Number=B", "--force"]),
    );
    assert!(ok);

    let (ok, v) = verify(&drawing, &[]);
    assert!(!ok);
    assert_eq!(v["reason"], "ContentTampered");
    assert_eq!(v["signer_username"], "alice");
}

#[test]
fn resign_requires_force() {
    let (_dir, drawing) = workspace();
    assert!(sign(&drawing, &["--no-lock"]).0);
    assert!(!sign(&drawing, &[]).0);

    let (ok, v) = sign(&drawing, &["--force"]);
    assert!(ok);
    assert_eq!(v["replaced"], true);
}

#[test]
fn unlock_allows_editing() {
    let (_dir, drawing) = workspace();
    assert!(sign(&drawing, &[]).0);

    let (_, status) = json(drawsig().arg("status").arg(&drawing));
    assert_eq!(status["status"], "Signed");
    assert_eq!(status["locked"], true);

    let (ok, v) = json(drawsig().arg("unlock").arg(&drawing));
    assert!(ok);
    assert_eq!(v["was_locked"], true);

    let (ok, v) = json(
        drawsig()
            .arg("edit")
            .arg(&drawing)
            .args(["--field", "PartName=Bracket v2"]),
    );
    assert!(ok);
    assert_eq!(v["fields_changed"], 1);
    assert_eq!(v["forced"], false);

    let (_, status) = json(drawsig().arg("status").arg(&drawing));
    assert_eq!(status["locked"], false);
    assert_eq!(status["status"], "Signed");
}

#[test]
fn edit_counts_only_changed_properties() {
    let (_dir, drawing) = workspace();
    let (ok, v) = json(drawsig().arg("edit").arg(&drawing).args([
        "--property",
        "Revision Number=A",
        "--property",
        "Description=v2",
        "--property",
        "Description=v3",
    ]));
    assert!(ok, "edit failed: {v}");
    assert_eq!(v["properties_changed"], 1);

    let saved: Value = serde_json::from_str(&fs::read_to_string(&drawing).unwrap()).unwrap();
    assert_eq!(saved["properties"]["Description"], "v3");
}

#[test]
fn unsigned_drawing_does_not_verify() {
    let (_dir, drawing) = workspace();
    let (ok, v) = verify(&drawing, &[]);
    assert!(!ok);
    assert_eq!(v["reason"], "NoSignature");
}

#[test]
fn secret_suffix_must_match() {
    let (_dir, drawing) = workspace();
    assert!(sign(&drawing, &["--secret-suffix", "site-a"]).0);
    assert!(verify(&drawing, &["--secret-suffix", "site-a"]).0);

    let (ok, v) = verify(&drawing, &["--secret-suffix", "site-b"]);
    assert!(!ok);
    assert_eq!(v["reason"], "InvalidSignature");
}

#[test]
fn certificate_signature_with_pinned_key() {
    let (dir, drawing) = workspace();
    let private = dir.path().join("alice.pem");
    let public = dir.path().join("alice.pub.pem");

    let (ok, keygen) = json(
        drawsig()
            .arg("keygen")
            .arg("--out")
            .arg(&private)
            .arg("--public")
            .arg(&public),
    );
    assert!(ok);

    let (ok, v) = sign(&drawing, &["--key", private.to_str().unwrap()]);
    assert!(ok, "sign failed: {v}");
    assert_eq!(v["method"], "rsa-sha256");
    assert_eq!(v["key_ref"], keygen["fingerprint"]);

    let (ok, v) = verify(&drawing, &[]);
    assert!(!ok);
    assert_eq!(v["reason"], "InvalidSignature");

    let (ok, v) = verify(&drawing, &["--trust", public.to_str().unwrap()]);
    assert!(ok, "verify failed: {v}");
    assert_eq!(v["method"], "rsa-sha256");
}

#[test]
fn bad_newline_mode_is_rejected() {
    let (_dir, drawing) = workspace();
    drawsig()
        .args(["--newline", "cr", "digest"])
        .arg(&drawing)
        .assert()
        .failure();
}

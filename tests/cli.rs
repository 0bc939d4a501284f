use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;

fn inmovia(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("inmovia").unwrap();
    cmd.env_remove("INMOVIA_DATA_DIR")
        .env("NO_COLOR", "1")
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

fn create(data_dir: &Path, collection: &str, json: &str) -> Value {
    let output = inmovia(data_dir)
        .args(["--json", "create", collection, json])
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn create_get_list_delete() {
    let dir = tempfile::tempdir().unwrap();
    let ana = create(dir.path(), "contacts", r#"{"nombre": "Ana", "apellido": "Gomez"}"#);
    let id = ana["id"].as_str().unwrap().to_string();

    inmovia(dir.path())
        .args(["get", "contacts", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ana").and(predicate::str::contains(id.as_str())));

    inmovia(dir.path())
        .args(["list", "contacts"])
        .assert()
        .success()
        .stdout(predicate::str::contains(id.as_str()));

    inmovia(dir.path())
        .args(["delete", "contacts", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted"));

    inmovia(dir.path())
        .args(["--json", "list", "contacts"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("[]"));
}

#[test]
fn list_filters_by_field() {
    let dir = tempfile::tempdir().unwrap();
    create(dir.path(), "users", r#"{"name": "Marta", "role": "admin"}"#);
    create(dir.path(), "users", r#"{"name": "Pablo", "role": "agente"}"#);

    let output = inmovia(dir.path())
        .args(["--json", "list", "users", "--where", "role=agente"])
        .output()
        .unwrap();
    let listed: Value = serde_json::from_slice(&output.stdout).unwrap();
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["name"], "Pablo");
}

#[test]
fn update_merges_signature() {
    let dir = tempfile::tempdir().unwrap();
    let doc = create(
        dir.path(),
        "documents",
        r#"{"name": "Arras.pdf", "signature": {"enabled": true, "provider": "signaturit"}}"#,
    );
    assert_eq!(doc["signature"]["status"], "PENDIENTE");
    let id = doc["id"].as_str().unwrap();

    let output = inmovia(dir.path())
        .args(["--json", "update", "documents", id, r#"{"signature": {"status": "FIRMADO"}}"#])
        .output()
        .unwrap();
    let updated: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(updated["signature"]["status"], "FIRMADO");
    assert_eq!(updated["signature"]["provider"], "signaturit");
}

#[test]
fn corrupt_collection_fails_with_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("contacts.json"), "{not json").unwrap();

    inmovia(dir.path())
        .args(["list", "contacts"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to read collection 'contacts'"));

    inmovia(dir.path())
        .args(["doctor"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("contacts"));
}

#[test]
fn loosely_typed_records_list_as_written() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("agenda.json"),
        r#"[{"id": "e1", "title": null, "date": "2030-06-10T10:00"}, {"id": "e2", "title": "visita"}]"#,
    )
    .unwrap();

    let output = inmovia(dir.path())
        .args(["--json", "list", "agenda"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let listed: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listed[0]["title"], Value::Null);
    assert_eq!(listed[0]["date"], "2030-06-10T10:00");
    assert_eq!(listed[1]["title"], "visita");
}

#[test]
fn invalid_input_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    inmovia(dir.path())
        .args(["create", "contacts", "[1]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid record"));

    inmovia(dir.path())
        .args(["list", "../etc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid collection name"));
}

#[test]
fn config_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    inmovia(dir.path())
        .args(["config", "pretty", "false"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pretty set to false"));

    inmovia(dir.path())
        .args(["config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pretty = false").and(predicate::str::contains("id-strategy = uuid")));

    create(dir.path(), "contacts", r#"{"nombre": "Ana"}"#);
    let text = std::fs::read_to_string(dir.path().join("contacts.json")).unwrap();
    assert!(!text.contains('\n'));

    inmovia(dir.path())
        .args(["config", "colour", "blue"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Unknown config key"));
}

#[test]
fn collections_doctor_and_migrate() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("documents.json"),
        r#"[{"id": "d1", "name": "viejo.pdf"}, {"name": "sin id"}]"#,
    )
    .unwrap();

    inmovia(dir.path())
        .args(["collections"])
        .assert()
        .success()
        .stdout("documents\n");

    inmovia(dir.path())
        .args(["doctor", "documents"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Assigned ids to 1 record(s)"));

    inmovia(dir.path())
        .args(["migrate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("documents: 2 record(s) rewritten."));

    let docs: Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("documents.json")).unwrap())
            .unwrap();
    assert_eq!(docs[0]["signature"]["status"], "NO_SOLICITADA");
}

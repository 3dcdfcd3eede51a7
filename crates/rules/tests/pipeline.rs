//! End-to-end: rule documents in, artifact and index out.

use chrono::{TimeZone, Utc};
use hunter_core::{CollisionPolicy, Config, RegistryRule};
use hunter_rules::{codec, Diagnostic, RuleCompiler};
use tempfile::TempDir;

const T1: &str = r#"
Rules:
  - Author: First
    Description: T1
    Category: Test
    Root: "HKEY_LOCAL_MACHINE\\Software"
    Glob: "Foo\\{Bar,Baz}"
"#;

const T2: &str = r#"
Rules:
  - Author: Second
    Description: T2
    Category: Test
    Root: "SOFTWARE"
    Glob: "Foo\\{Bar,Baz}"
"#;

fn write_rules(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn unlisted_root_passes_through_without_colliding() {
    let dir = TempDir::new().unwrap();
    let mut compiler = RuleCompiler::default();
    compiler.load_rules(&write_rules(&dir, "t1.yaml", T1)).unwrap();
    compiler.load_rules(&write_rules(&dir, "t2.yaml", T2)).unwrap();

    let rules = compiler.rules();
    assert_eq!(rules.len(), 4);

    let roots: Vec<_> = rules.iter().map(|r| r.root.as_str()).collect();
    assert_eq!(
        roots,
        vec![
            "HKEY_LOCAL_MACHINE\\Software",
            "HKEY_LOCAL_MACHINE\\Software",
            "SOFTWARE",
            "SOFTWARE",
        ]
    );
    let globs: Vec<_> = rules.iter().map(|r| r.glob.as_str()).collect();
    assert_eq!(globs, vec!["Foo\\Bar", "Foo\\Baz", "Foo\\Bar", "Foo\\Baz"]);

    // Only the unsupported root is reported; nothing collides.
    assert_eq!(compiler.diagnostics().len(), 1);
    assert!(matches!(
        compiler.diagnostics()[0],
        Diagnostic::UnsupportedRoot { .. }
    ));
    assert_eq!(
        compiler.diagnostics()[0].to_string(),
        "Rule T2 uses an unsupported Root: SOFTWARE"
    );
    assert!(compiler.diagnostics()[0].file().ends_with("t2.yaml"));
}

#[test]
fn allow_listed_case_variant_collides() {
    let t3 = T2
        .replace("\"SOFTWARE\"", "\"hkey_local_machine/SOFTWARE\"")
        .replace("T2", "T3");

    for policy in [CollisionPolicy::KeepBoth, CollisionPolicy::DropLater] {
        let mut compiler = RuleCompiler::new(Config {
            collision_policy: policy,
            ..Config::default()
        });
        compiler.load_str(T1, "t1.yaml").unwrap();
        compiler.load_str(&t3, "t3.yaml").unwrap();

        let collisions: Vec<_> = compiler
            .diagnostics()
            .iter()
            .filter(|d| matches!(d, Diagnostic::GlobCollision { .. }))
            .collect();
        assert_eq!(collisions.len(), 2, "one per expanded glob ({})", policy);
        assert!(collisions[0].to_string().contains("Rule T3 by Second"));
        assert!(collisions[0].to_string().contains("as rule T1 by First"));

        let expected = match policy {
            CollisionPolicy::KeepBoth => 4,
            CollisionPolicy::DropLater => 2,
        };
        assert_eq!(compiler.rules().len(), expected);
    }
}

#[test]
fn compiled_artifact_and_index_agree() {
    let dir = TempDir::new().unwrap();
    let mut compiler = RuleCompiler::default();
    compiler.load_str(T1, "t1.yaml").unwrap();

    let time = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
    let artifact = compiler.compile_at(time).unwrap();
    assert!(artifact.contains("Generated on 2026-10-16T12:00:00Z from 2 glob rules"));

    let doc: serde_yaml::Value = serde_yaml::from_str(&artifact).unwrap();
    let blob = doc["parameters"]
        .as_sequence()
        .unwrap()
        .iter()
        .find(|p| p["name"].as_str() == Some("RulesBlob"))
        .and_then(|p| p["default"].as_str())
        .unwrap();
    let embedded: Vec<RegistryRule> =
        serde_json::from_slice(&codec::decompress(blob).unwrap()).unwrap();

    let index_path = dir.path().join("index.json");
    compiler.write_index(&index_path).unwrap();
    let indexed: Vec<RegistryRule> =
        serde_json::from_slice(&std::fs::read(&index_path).unwrap()).unwrap();

    assert_eq!(embedded, indexed);
    assert_eq!(embedded, compiler.rules());
}

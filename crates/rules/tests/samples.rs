//! Integration tests over the sample corpus in `data/`.

use std::path::PathBuf;

use hunter_core::{Config, RegistryRule, RuleFile};
use hunter_rules::{codec, verify_recmd, RecmdConverter, RuleCompiler};

/// Integration tests run from the crate directory, so we go up two levels.
fn data_dir() -> PathBuf {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest.join("../../data")
}

fn rule_files() -> Vec<PathBuf> {
    vec![
        data_dir().join("rules/persistence.yaml"),
        data_dir().join("rules/system.yaml"),
    ]
}

fn load_samples() -> RuleCompiler {
    let mut compiler = RuleCompiler::default();
    for path in rule_files() {
        compiler
            .load_rules(&path)
            .unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e));
    }
    compiler
}

#[test]
fn sample_rules_load_cleanly() {
    let compiler = load_samples();

    assert_eq!(compiler.rules().len(), 11);
    assert_eq!(compiler.queries().len(), 1);
    assert!(compiler.diagnostics().is_empty(), "{:?}", compiler.diagnostics());
    assert_eq!(
        compiler.build_categories(),
        vec!["ASEP", "Installed Software", "System Info", "Users"]
    );

    let winlogon: Vec<_> = compiler
        .rules()
        .iter()
        .filter(|r| r.description == "Winlogon Shell")
        .collect();
    assert_eq!(winlogon.len(), 2);
    assert_eq!(winlogon[0].root, "HKEY_LOCAL_MACHINE\\Software");
    assert_eq!(
        winlogon[1].glob,
        "Microsoft\\Windows NT\\CurrentVersion\\Winlogon\\Userinit"
    );
}

#[test]
fn sample_artifact_embeds_every_rule() {
    let compiler = load_samples();
    let text = compiler.compile().unwrap();

    let doc: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
    let export = doc["export"].as_str().unwrap();
    assert!(export.contains("LET FormatRunKey(Data)"));

    let parameters = doc["parameters"].as_sequence().unwrap();
    let choices = parameters
        .iter()
        .find(|p| p["name"].as_str() == Some("Categories"))
        .and_then(|p| p["choices"].as_sequence())
        .unwrap();
    assert!(choices.iter().any(|c| c.as_str() == Some("Installed Software")));
    let rules_blob = parameters
        .iter()
        .find(|p| p["name"].as_str() == Some("RulesBlob"))
        .and_then(|p| p["default"].as_str())
        .unwrap();
    let rules: Vec<RegistryRule> =
        serde_json::from_slice(&codec::decompress(rules_blob).unwrap()).unwrap();
    assert_eq!(rules, compiler.rules());
}

#[test]
fn sample_batches_convert_with_rejections() {
    let mut converter = RecmdConverter::new();
    for name in ["Autoruns.reb", "SystemInfo.reb"] {
        converter.load_file(&data_dir().join("recmd").join(name)).unwrap();
    }

    assert_eq!(converter.rules().len(), 7);
    let rejected: Vec<_> = converter
        .errors()
        .iter()
        .map(|e| e.description.as_str())
        .collect();
    assert_eq!(rejected, vec!["Logged On Users", "Last Logon SID"]);

    let shutdown = converter
        .rules()
        .iter()
        .find(|r| r.description == "Last Shutdown Time")
        .unwrap();
    assert_eq!(shutdown.details.as_deref(), Some("Filetime(value=Data.Value)"));

    let dhcp = converter
        .rules()
        .iter()
        .find(|r| r.description == "DHCP Address")
        .unwrap();
    assert_eq!(
        dhcp.glob,
        "ControlSet001\\Services\\Tcpip\\Parameters\\Interfaces\\?GUID?\\DhcpIPAddress"
    );

    // The dump is itself a loadable rule file.
    let dumped: RuleFile = serde_yaml::from_str(&converter.dump().unwrap()).unwrap();
    let mut compiler = RuleCompiler::default();
    compiler.merge(dumped, "converted.yaml");
    assert_eq!(compiler.rules().len(), 7);
}

#[test]
fn sample_coverage_report() {
    let report = verify_recmd(
        &data_dir().join("recmd"),
        &rule_files(),
        &data_dir().join("recmd/mapping.yaml"),
        Config::default(),
    )
    .unwrap();

    assert_eq!(report.converted, 7);
    assert_eq!(report.implemented, 3);
    assert_eq!(report.excepted, 2);

    let missing: Vec<_> = report
        .unimplemented
        .iter()
        .map(|r| r.description.as_str())
        .collect();
    assert_eq!(missing, vec!["Last Shutdown Time", "DHCP Address"]);
}

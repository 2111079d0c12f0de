//! End-to-end runs of the pipeline: in-memory sources, project files on
//! disk, and classpath stubs.

use ktlst::config::{ConfigError, ProjectConfig};
use ktlst::driver::{DriverOptions, SourceText, attribute_project, attribute_sources, read_sources};
use ktlst::reporter::Reporter;
use ktlst::{CancellationToken, SymbolKind};
use std::fs;
use tempfile::TempDir;

fn sources(texts: &[(&str, &str)]) -> Vec<SourceText> {
    texts
        .iter()
        .map(|(name, text)| SourceText::new(*name, *text))
        .collect()
}

#[test]
fn test_units_see_each_other() {
    let sources = sources(&[
        ("Model.kt", "package model\n\nclass User {\n    val name : String ? = null\n}\n"),
        (
            "Main.kt",
            "import model.User\n\nfun greet ( user : User ) = user . name ?: \"anonymous\"\n",
        ),
    ]);
    let options = DriverOptions {
        check_round_trip: true,
        ..DriverOptions::default()
    };
    let run = attribute_sources(&sources, &options, None).unwrap();
    assert!(run.round_trip_failures.is_empty());
    assert_eq!(run.diagnostics().count(), 0);

    let main = &run.units[1];
    assert_eq!(main.file_name(), "Main.kt");
    let name = main.accesses_named("name").next().unwrap();
    assert_eq!(name.resolved_owner(), Some("model.User"));
    assert_eq!(name.resolved_type.to_string(), "kotlin.String?");
}

#[test]
fn test_thread_count_does_not_change_results() {
    let texts: Vec<String> = (0..12)
        .map(|i| format!("class C{i} {{\n    val v = {i}\n}}\nval x{i} = C{i} ( ) . v\n"))
        .collect();
    let sources: Vec<SourceText> = texts
        .iter()
        .enumerate()
        .map(|(i, text)| SourceText::new(format!("C{i}.kt"), text.as_str()))
        .collect();

    let single = DriverOptions {
        threads: 1,
        ..DriverOptions::default()
    };
    let many = DriverOptions {
        threads: 4,
        ..DriverOptions::default()
    };
    let a = attribute_sources(&sources, &single, None).unwrap();
    let b = attribute_sources(&sources, &many, None).unwrap();
    for (left, right) in a.units.iter().zip(&b.units) {
        assert_eq!(left.file_name(), right.file_name());
        let left_types: Vec<String> = left.variables().iter().map(|v| v.ty.to_string()).collect();
        let right_types: Vec<String> = right.variables().iter().map(|v| v.ty.to_string()).collect();
        assert_eq!(left_types, right_types);
    }
}

#[test]
fn test_cancelled_run_is_an_error() {
    let sources = sources(&[("A.kt", "val a = 1\n")]);
    let token = CancellationToken::new();
    token.cancel();
    let err = attribute_sources(&sources, &DriverOptions::default(), Some(&token)).unwrap_err();
    assert!(err.to_string().contains("cancelled"), "{err}");
}

#[test]
fn test_classpath_stub_file() {
    let dir = TempDir::new().unwrap();
    let stub = dir.path().join("okio.json");
    fs::write(
        &stub,
        r#"{
  "origin": "platform",
  "classes": [{
    "name": "okio.Buffer",
    "supertypes": ["java.lang.Object"],
    "members": [
      { "name": "getSize", "type": "kotlin.Long", "nullability": "notNull" },
      { "name": "readUtf8", "type": "kotlin.String" }
    ]
  }]
}"#,
    )
    .unwrap();

    let sources = sources(&[(
        "Io.kt",
        "import okio.Buffer\n\nfun f ( b : Buffer ) = b . size\n",
    )]);
    let options = DriverOptions {
        classpath: vec![stub],
        ..DriverOptions::default()
    };
    let run = attribute_sources(&sources, &options, None).unwrap();
    let unit = &run.units[0];
    assert!(unit.diagnostics().is_empty(), "{:?}", unit.diagnostics());
    let size = unit.accesses_named("size").next().unwrap();
    assert!(size.is_synthetic());
    assert!(size.is_platform_type);
    assert_eq!(size.symbol(), SymbolKind::Method);
    assert_eq!(size.resolved_owner(), Some("okio.Buffer"));
}

#[test]
fn test_missing_classpath_entry_reported() {
    let options = DriverOptions {
        classpath: vec!["/nonexistent/stubs.json".into()],
        ..DriverOptions::default()
    };
    let err = attribute_sources(&sources(&[("A.kt", "")]), &options, None).unwrap_err();
    assert!(
        format!("{err:#}").contains("failed to load classpath entry /nonexistent/stubs.json"),
        "{err:#}"
    );
}

#[test]
fn test_project_config_on_disk() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("src")).unwrap();
    fs::write(
        dir.path().join("src/Main.kt"),
        "val pattern = java.util.regex.Pattern.compile(\".*\")\nval i = Int.MIN_VALUE\n",
    )
    .unwrap();
    let config = dir.path().join("ktlst.json");
    fs::write(
        &config,
        r#"{ "sources": ["src/Main.kt"], "checkRoundTrip": true, "threads": 2 }"#,
    )
    .unwrap();

    let run = attribute_project(&config, &DriverOptions::default()).unwrap();
    assert!(run.round_trip_failures.is_empty());
    let unit = &run.units[0];
    assert_eq!(
        unit.variable("pattern").unwrap().ty.to_string(),
        "java.util.regex.Pattern"
    );
    assert_eq!(unit.variable("i").unwrap().ty.to_string(), "kotlin.Int");
}

#[test]
fn test_invalid_project_config() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("ktlst.json");
    fs::write(&config, "{ \"sources\": 3 }").unwrap();
    let err = ProjectConfig::load(&config).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));

    let missing = ProjectConfig::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(missing, ConfigError::Read { .. }));
}

#[test]
fn test_read_sources_reports_missing_file() {
    let err = read_sources(&["/nonexistent/A.kt".into()]).unwrap_err();
    assert!(err.to_string().contains("failed to read /nonexistent/A.kt"));
}

#[test]
fn test_dump_lines() {
    let text = "val i = Int.MIN_VALUE\nval p = java.util.regex.Pattern.compile(\".*\")\n";
    let sources = sources(&[("Dump.kt", text)]);
    let run = attribute_sources(&sources, &DriverOptions::default(), None).unwrap();
    let mut reporter = Reporter::new(false);
    reporter.add_source("Dump.kt", text);
    let lines = reporter.dump_unit(&run.units[0]);
    assert_eq!(
        lines,
        vec![
            "1:13 MIN_VALUE : kotlin.Int owner=kotlin.Int$Companion",
            "2:14 util : <unknown> owner=<none>",
            "2:19 regex : <unknown> owner=<none>",
            "2:25 Pattern : java.util.regex.Pattern owner=<none> [platform]",
            "2:33 compile : java.util.regex.Pattern owner=java.util.regex.Pattern [platform]",
        ]
    );
}

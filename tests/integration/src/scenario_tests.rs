//! End-to-end relocation scenarios
//!
//! These exercise the full flow across crates: config loading -> embed
//! phase 1 -> restart -> phase 2 -> un-embed, with the subprocess-backed host.

use std::fs;

use pretty_assertions::assert_eq;
use relocate_core::{
    CommandHost, Gated, OperatorGate, OperatorIdentity, PackageLayout, RelocateConfig,
    RelocationController, ResumeOutcome,
};
use relocate_fs::NormalizedPath;
use relocate_test_utils::manifest::{UNRELATED, manifest_json};
use relocate_test_utils::project::{DESTINATION, TestProject};
use relocate_test_utils::{TEST_HOST, TEST_IDENTITY, TEST_USER};
use tempfile::TempDir;

/// Controller as a fresh process would build it, with the test identity.
fn open(project: &TestProject) -> RelocationController<CommandHost> {
    let root = NormalizedPath::new(project.root());
    let config = RelocateConfig::load(&root).unwrap();
    let layout = config.layout(&root).unwrap();
    let host = CommandHost::new(config.hooks.clone(), root.clone(), &layout.manifest);
    let gate = OperatorGate::for_identity(
        config.operator.identity.clone(),
        OperatorIdentity::new(TEST_HOST, TEST_USER),
    );
    RelocationController::new(&config, &root, gate, host).unwrap()
}

fn two_packages(project: &TestProject) -> (String, String) {
    let foo = project.add_package(
        "foo",
        &[
            ("package.json", r#"{"name": "de.codesmile.foo"}"#),
            ("package.json.meta", "guid: 10"),
            ("README.md", "# foo"),
            ("Runtime/Foo.cs", "class Foo {}"),
            ("Runtime.meta", "guid: 11"),
            ("Samples~/Demo.cs", "class Demo {}"),
        ],
    );
    let bar = project.add_package(
        "bar",
        &[
            ("package.json", r#"{"name": "de.codesmile.bar"}"#),
            ("Editor/BarWindow.cs", "class BarWindow {}"),
            ("Editor/BarWindow.cs.meta", "guid: 20"),
        ],
    );
    (foo, bar)
}

#[test]
fn full_round_trip_restores_original_manifest() {
    let project = TestProject::new();
    let (foo, bar) = two_packages(&project);
    let original = manifest_json(
        UNRELATED,
        &[("de.codesmile.foo", foo.as_str()), ("de.codesmile.bar", bar.as_str())],
    );
    project.write_manifest(&original);
    project.write_config(TEST_IDENTITY);

    // Phase 1
    assert_eq!(
        open(&project).start_embed().unwrap(),
        Gated::Done(vec![foo.clone(), bar.clone()])
    );
    let session = fs::read_to_string(project.state_dir().join("session.toml")).unwrap();
    let session: toml::Value = toml::from_str(&session).unwrap();
    assert_eq!(session["flags"]["continue_embed"].as_bool(), Some(true));

    // Phase 2 after the host reloaded
    let ResumeOutcome::Embedded(packages) = open(&project).resume_embed_if_pending().unwrap() else {
        panic!("expected phase 2 to run");
    };
    assert_eq!(packages[0].entries, vec!["package.json", "README.md", "Runtime"]);
    assert_eq!(packages[1].entries, vec!["package.json", "Editor"]);
    assert!(!project.state_dir().join("session.toml").exists());

    project.assert_exists(&format!("{DESTINATION}/foo/package.json.meta"));
    project.assert_exists(&format!("{DESTINATION}/foo/Runtime.meta"));
    project.assert_missing(&format!("{DESTINATION}/foo/Samples~"));
    project.assert_exists(&format!("{DESTINATION}/bar/Editor/BarWindow.cs.meta"));
    assert_eq!(open(&project).status().unwrap().layout, PackageLayout::Embedded);

    // A later start has nothing to do
    assert_eq!(
        open(&project).resume_embed_if_pending().unwrap(),
        ResumeOutcome::NotPending
    );

    // Un-embed
    assert_eq!(open(&project).un_embed().unwrap(), Gated::Done(()));
    assert_eq!(project.read_manifest(), original);
    assert_eq!(fs::read_dir(project.destination_root()).unwrap().count(), 0);
    assert_eq!(open(&project).status().unwrap().layout, PackageLayout::Linked);

    // The sources were never touched
    assert!(project.packages_dir().join("de.codesmile.foo/Samples~/Demo.cs").exists());
}

#[test]
fn crlf_manifest_keeps_its_line_endings() {
    let project = TestProject::new();
    let (foo, _) = two_packages(&project);
    let original = format!(
        "{{\r\n  \"dependencies\": {{\r\n    \"com.unity.ugui\": \"1.0.0\",\r\n    \"de.codesmile.foo\": \"file:{foo}\",\r\n    \"com.unity.timeline\": \"1.7.6\"\r\n  }}\r\n}}\r\n"
    );
    project.write_manifest(&original);
    project.write_config(TEST_IDENTITY);

    open(&project).start_embed().unwrap();
    assert_eq!(
        project.read_manifest(),
        "{\r\n  \"dependencies\": {\r\n    \"com.unity.ugui\": \"1.0.0\",\r\n    \"com.unity.timeline\": \"1.7.6\"\r\n  }\r\n}\r\n"
    );

    open(&project).resume_embed_if_pending().unwrap();
    open(&project).un_embed().unwrap();
    assert_eq!(project.read_manifest(), original);
}

#[test]
fn json_config_is_accepted() {
    let project = TestProject::new();
    let (foo, _) = two_packages(&project);
    project.write_manifest(&manifest_json(&[], &[("de.codesmile.foo", foo.as_str())]));

    let config = serde_config_json(&project);
    fs::create_dir_all(project.root().join(".relocate")).unwrap();
    fs::write(project.root().join(".relocate/config.json"), config).unwrap();

    open(&project).start_embed().unwrap();
    open(&project).resume_embed_if_pending().unwrap();
    project.assert_exists(&format!("{DESTINATION}/foo/package.json"));
}

fn serde_config_json(project: &TestProject) -> String {
    let prefix = project.source_prefix();
    let state = project.state_dir().to_string_lossy().replace('\\', "/");
    let identity = TEST_IDENTITY.replace('\\', "\\\\");
    format!(
        r#"{{
  "packages": {{ "destination": "{DESTINATION}", "source_prefix": "{prefix}" }},
  "operator": {{ "identity": "{identity}" }},
  "state": {{ "dir": "{state}" }}
}}"#
    )
}

#[test]
fn saved_config_loads_back() {
    let temp = TempDir::new().unwrap();
    let root = NormalizedPath::new(temp.path());
    let mut config = RelocateConfig::with_identity(TEST_IDENTITY);
    config.state.dir = Some("/var/tmp/relocate-state".to_string());

    config.save(&root).unwrap();
    let loaded = RelocateConfig::load(&root).unwrap();

    assert_eq!(loaded, config);
    assert_eq!(loaded.packages.source_prefix, "P:/");
}

#[test]
fn default_prefix_maps_drive_paths() {
    let temp = TempDir::new().unwrap();
    let root = NormalizedPath::new(temp.path());
    let mut config = RelocateConfig::with_identity(TEST_IDENTITY);
    config.state.dir = Some(temp.path().join("state").to_string_lossy().to_string());
    let layout = config.layout(&root).unwrap();
    let host = CommandHost::new(Vec::new(), root.clone(), &layout.manifest);
    let gate = OperatorGate::for_identity(TEST_IDENTITY, OperatorIdentity::new(TEST_HOST, TEST_USER));
    let controller = RelocationController::new(&config, &root, gate, host).unwrap();

    let destination = controller.destination_for("P:/de.codesmile.foo").unwrap();

    assert_eq!(
        destination,
        root.join("Assets/CodeSmile/Packages").join("de.codesmile.foo")
    );
}

#[cfg(unix)]
#[test]
fn import_hook_receives_destination() {
    let project = TestProject::new();
    let (foo, _) = two_packages(&project);
    project.write_manifest(&manifest_json(UNRELATED, &[("de.codesmile.foo", foo.as_str())]));
    project.write_config_with(
        TEST_IDENTITY,
        "\n[[hooks]]\nevent = \"import\"\ncommand = \"sh\"\nargs = ['-c', 'echo \"$IMPORT_PATH\" >> imports.log']\n",
    );

    open(&project).start_embed().unwrap();
    open(&project).resume_embed_if_pending().unwrap();

    let log = fs::read_to_string(project.root().join("imports.log")).unwrap();
    assert_eq!(log, format!("{DESTINATION}\n"));
}

#[cfg(unix)]
#[test]
fn failing_hook_aborts_embed_after_scheduling() {
    let project = TestProject::new();
    let (foo, _) = two_packages(&project);
    project.write_manifest(&manifest_json(UNRELATED, &[("de.codesmile.foo", foo.as_str())]));
    project.write_config_with(
        TEST_IDENTITY,
        "\n[[hooks]]\nevent = \"resolve\"\ncommand = \"sh\"\nargs = ['-c', 'echo nope >&2; exit 3']\n",
    );

    let err = open(&project).start_embed().unwrap_err();

    assert!(err.to_string().contains("nope"));
    assert!(open(&project).resume_state().unwrap().pending);
}

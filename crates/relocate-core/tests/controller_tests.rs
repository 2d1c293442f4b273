//! Controller workflow tests against a temporary project and a recording host.

use std::cell::RefCell;
use std::fs;

use pretty_assertions::assert_eq;
use relocate_core::{
    Error, Gated, Host, OperatorGate, OperatorIdentity, PackageLayout, RelocateConfig,
    RelocationController, ResumeOutcome, Result,
};
use relocate_fs::NormalizedPath;
use relocate_test_utils::manifest::{UNRELATED, manifest_json};
use relocate_test_utils::project::{DESTINATION, TestProject};
use relocate_test_utils::{TEST_HOST, TEST_IDENTITY, TEST_USER};
use tempfile::TempDir;

/// Host that records every request instead of running anything
#[derive(Default)]
struct RecordingHost {
    calls: RefCell<Vec<String>>,
}

impl RecordingHost {
    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl Host for RecordingHost {
    fn resolve_dependencies(&self) -> Result<()> {
        self.calls.borrow_mut().push("resolve".into());
        Ok(())
    }

    fn request_reload(&self) -> Result<()> {
        self.calls.borrow_mut().push("reload".into());
        Ok(())
    }

    fn import_path(&self, relative_path: &str) -> Result<()> {
        self.calls.borrow_mut().push(format!("import {relative_path}"));
        Ok(())
    }
}

fn controller_as(project: &TestProject, user: &str) -> RelocationController<RecordingHost> {
    let root = NormalizedPath::new(project.root());
    let config = RelocateConfig::load(&root).unwrap();
    let gate = OperatorGate::for_identity(
        config.operator.identity.clone(),
        OperatorIdentity::new(TEST_HOST, user),
    );
    RelocationController::new(&config, &root, gate, RecordingHost::default()).unwrap()
}

fn controller(project: &TestProject) -> RelocationController<RecordingHost> {
    controller_as(project, TEST_USER)
}

/// Project with packages `foo` and `bar` linked from the manifest.
fn linked_project() -> (TestProject, String, String) {
    let project = TestProject::new();
    let foo = project.add_package(
        "foo",
        &[
            ("package.json", r#"{"name": "de.codesmile.foo"}"#),
            ("package.json.meta", "guid: 1"),
            ("Editor/Tool.cs", "class Tool {}"),
            ("Editor.meta", "guid: 2"),
            ("Tests/ToolTests.cs", "class ToolTests {}"),
        ],
    );
    let bar = project.add_package(
        "bar",
        &[
            ("package.json", r#"{"name": "de.codesmile.bar"}"#),
            ("Runtime/Bar.cs", "class Bar {}"),
        ],
    );
    project.write_manifest(&manifest_json(
        UNRELATED,
        &[("de.codesmile.foo", foo.as_str()), ("de.codesmile.bar", bar.as_str())],
    ));
    project.write_config(TEST_IDENTITY);
    (project, foo, bar)
}

#[test]
fn start_embed_extracts_packages_and_schedules_resume() {
    let (project, foo, bar) = linked_project();
    let original = project.read_manifest();
    let controller = controller(&project);

    let paths = controller.start_embed().unwrap();

    assert_eq!(paths, Gated::Done(vec![foo.clone(), bar.clone()]));
    assert_eq!(fs::read_to_string(project.backup_path()).unwrap(), original);
    let reduced: String = original
        .lines()
        .filter(|line| !line.contains("de.codesmile."))
        .map(|line| format!("{line}\n"))
        .collect();
    assert_eq!(project.read_manifest(), reduced);

    let ledger = fs::read_to_string(project.state_dir().join("package-paths.txt")).unwrap();
    assert_eq!(ledger, format!("{foo}\n{bar}\n"));
    assert!(controller.resume_state().unwrap().pending);
    assert_eq!(controller.host().calls(), vec!["resolve", "reload"]);
}

#[test]
fn resume_copies_allowlisted_entries_with_sidecars() {
    let (project, _, _) = linked_project();
    controller(&project).start_embed().unwrap();

    // Fresh controller, as after the host restarted
    let controller = controller(&project);
    let outcome = controller.resume_embed_if_pending().unwrap();

    let ResumeOutcome::Embedded(packages) = outcome else {
        panic!("expected packages to be embedded");
    };
    assert_eq!(packages.len(), 2);
    assert_eq!(packages[0].entries, vec!["package.json", "Editor"]);
    assert_eq!(packages[1].entries, vec!["package.json", "Runtime"]);

    project.assert_exists(&format!("{DESTINATION}/foo/package.json"));
    project.assert_exists(&format!("{DESTINATION}/foo/package.json.meta"));
    project.assert_exists(&format!("{DESTINATION}/foo/Editor/Tool.cs"));
    project.assert_exists(&format!("{DESTINATION}/foo/Editor.meta"));
    project.assert_missing(&format!("{DESTINATION}/foo/Tests"));
    project.assert_exists(&format!("{DESTINATION}/bar/Runtime/Bar.cs"));

    assert!(!controller.resume_state().unwrap().pending);
    assert_eq!(controller.host().calls(), vec![format!("import {DESTINATION}")]);
}

#[test]
fn resume_runs_once() {
    let (project, _, _) = linked_project();
    controller(&project).start_embed().unwrap();

    let controller = controller(&project);
    assert!(matches!(
        controller.resume_embed_if_pending().unwrap(),
        ResumeOutcome::Embedded(_)
    ));
    assert_eq!(
        controller.resume_embed_if_pending().unwrap(),
        ResumeOutcome::NotPending
    );
    assert_eq!(controller.host().calls().len(), 1);
}

#[test]
fn resume_without_flag_does_nothing() {
    let (project, _, _) = linked_project();
    let controller = controller(&project);

    assert_eq!(
        controller.resume_embed_if_pending().unwrap(),
        ResumeOutcome::NotPending
    );
    assert!(controller.host().calls().is_empty());
    assert!(!project.destination_root().exists());
}

#[test]
fn failed_copy_leaves_flag_cleared() {
    let (project, foo, _) = linked_project();
    controller(&project).start_embed().unwrap();
    fs::remove_dir_all(&foo).unwrap();

    let controller = controller(&project);
    let err = controller.resume_embed_if_pending().unwrap_err();

    assert!(matches!(err, Error::PackageSourceMissing { .. }));
    assert!(!controller.resume_state().unwrap().pending);
    assert_eq!(
        controller.resume_embed_if_pending().unwrap(),
        ResumeOutcome::NotPending
    );
}

#[test]
fn un_embed_restores_manifest_and_empties_destination() {
    let (project, _, _) = linked_project();
    let original = project.read_manifest();
    controller(&project).start_embed().unwrap();
    controller(&project).resume_embed_if_pending().unwrap();
    fs::write(project.destination_root().with_extension("meta"), "guid: 3").unwrap();

    let controller = controller(&project);
    assert_eq!(controller.un_embed().unwrap(), Gated::Done(()));

    assert_eq!(project.read_manifest(), original);
    assert!(!project.backup_path().exists());
    assert!(project.destination_root().is_dir());
    assert_eq!(fs::read_dir(project.destination_root()).unwrap().count(), 0);
    assert!(!project.destination_root().with_extension("meta").exists());
    assert_eq!(
        controller.host().calls(),
        vec![format!("import {DESTINATION}"), "resolve".into(), "reload".into()]
    );
}

#[test]
fn un_embed_without_backup_fails_after_clearing_destination() {
    let (project, _, _) = linked_project();
    let original = project.read_manifest();
    let controller = controller(&project);

    let err = controller.un_embed().unwrap_err();

    assert!(matches!(err, Error::BackupMissing { .. }));
    assert_eq!(project.read_manifest(), original);
    assert!(project.destination_root().is_dir());
    assert!(controller.host().calls().is_empty());
}

#[test]
fn second_embed_refuses_to_overwrite_backup() {
    let (project, _, _) = linked_project();
    let original = project.read_manifest();
    controller(&project).start_embed().unwrap();
    let reduced = project.read_manifest();

    let err = controller(&project).start_embed().unwrap_err();

    assert!(matches!(err, Error::BackupExists { .. }));
    assert_eq!(fs::read_to_string(project.backup_path()).unwrap(), original);
    assert_eq!(project.read_manifest(), reduced);
}

#[test]
fn unauthorized_operator_changes_nothing() {
    let (project, _, _) = linked_project();
    let original = project.read_manifest();
    let controller = controller_as(&project, "someone-else");

    let outcome = controller.start_embed().unwrap();
    assert_eq!(
        outcome,
        Gated::Unauthorized {
            identity: format!("{TEST_HOST}\\someone-else"),
        }
    );
    assert!(matches!(controller.un_embed().unwrap(), Gated::Unauthorized { .. }));

    assert_eq!(project.read_manifest(), original);
    assert!(!project.backup_path().exists());
    assert!(!project.state_dir().join("package-paths.txt").exists());
    assert!(!controller.resume_state().unwrap().pending);
    assert!(!project.destination_root().exists());
    assert!(controller.host().calls().is_empty());
}

#[test]
fn unmappable_package_path_fails_before_touching_anything() {
    let project = TestProject::new();
    let original = "\"de.codesmile.foo\": \"file:/elsewhere/de.codesmile.foo\"\n";
    project.write_manifest(original);
    project.write_config(TEST_IDENTITY);
    let controller = controller(&project);

    let err = controller.start_embed().unwrap_err();

    assert!(matches!(err, Error::InvalidPackagePath { .. }));
    assert_eq!(project.read_manifest(), original);
    assert!(!project.backup_path().exists());
    assert!(!project.state_dir().join("package-paths.txt").exists());
    assert!(!controller.resume_state().unwrap().pending);
    assert!(controller.host().calls().is_empty());

    // Nothing to undo: the same call fails the same way instead of on the backup guard
    let err = controller.start_embed().unwrap_err();
    assert!(matches!(err, Error::InvalidPackagePath { .. }));
}

#[test]
fn default_config_embeds_nested_drive_path_under_its_basename() {
    let temp = TempDir::new().unwrap();
    let root = NormalizedPath::new(temp.path().join("project"));
    let manifest = temp.path().join("project/Packages/manifest.json");
    let original = concat!(
        "\"com.unity.ugui\": \"1.0.0\",\n",
        "\"dep-a\": \"file:P:/pkgs/de.codesmile.foo\",\n",
        "\"com.unity.timeline\": \"1.7.6\"\n",
    );
    fs::create_dir_all(manifest.parent().unwrap()).unwrap();
    fs::write(&manifest, original).unwrap();

    let mut config = RelocateConfig::with_identity(TEST_IDENTITY);
    config.state.dir = Some(temp.path().join("state").to_string_lossy().to_string());
    let gate = OperatorGate::for_identity(TEST_IDENTITY, OperatorIdentity::new(TEST_HOST, TEST_USER));
    let controller = RelocationController::new(&config, &root, gate, RecordingHost::default()).unwrap();

    let paths = controller.start_embed().unwrap();

    assert_eq!(paths, Gated::Done(vec!["P:/pkgs/de.codesmile.foo".to_string()]));
    assert_eq!(
        fs::read_to_string(&manifest).unwrap(),
        "\"com.unity.ugui\": \"1.0.0\",\n\"com.unity.timeline\": \"1.7.6\"\n"
    );
    assert_eq!(
        fs::read_to_string(temp.path().join("project/Packages/manifest.json.backup")).unwrap(),
        original
    );
    assert_eq!(
        fs::read_to_string(temp.path().join("state/package-paths.txt")).unwrap(),
        "P:/pkgs/de.codesmile.foo\n"
    );
    assert_eq!(
        controller.destination_for("P:/pkgs/de.codesmile.foo").unwrap(),
        root.join("Assets/CodeSmile/Packages/de.codesmile.foo")
    );
}

#[test]
fn status_tracks_each_stage() {
    let (project, foo, bar) = linked_project();

    let status = controller(&project).status().unwrap();
    assert_eq!(status.layout, PackageLayout::Linked);
    assert!(status.ledger.is_empty());

    controller(&project).start_embed().unwrap();
    let status = controller(&project).status().unwrap();
    assert_eq!(status.layout, PackageLayout::EmbedPending);
    assert_eq!(status.ledger, vec![foo, bar]);
    assert!(status.backup_present);

    controller(&project).resume_embed_if_pending().unwrap();
    let status = controller(&project).status().unwrap();
    assert_eq!(status.layout, PackageLayout::Embedded);
    assert_eq!(status.embedded, vec!["bar", "foo"]);

    controller(&project).un_embed().unwrap();
    let status = controller(&project).status().unwrap();
    assert_eq!(status.layout, PackageLayout::Linked);
    assert!(status.embedded.is_empty());
}

#[test]
fn status_io_errors_name_the_destination() {
    let (project, _, _) = linked_project();
    let destination = project.destination_root();
    fs::create_dir_all(destination.parent().unwrap()).unwrap();
    fs::write(&destination, "not a directory").unwrap();

    let err = controller(&project).status().unwrap_err();

    assert_eq!(err.kind(), relocate_core::ErrorKind::Io);
    assert!(err.to_string().contains(DESTINATION), "got: {err}");
}

#[test]
fn discard_clears_pending_flag_only() {
    let (project, _, _) = linked_project();
    controller(&project).start_embed().unwrap();
    let controller = controller(&project);

    assert!(controller.discard_pending().unwrap());
    assert!(!controller.discard_pending().unwrap());
    assert_eq!(
        controller.resume_embed_if_pending().unwrap(),
        ResumeOutcome::NotPending
    );
    assert!(project.backup_path().exists());
    assert!(project.state_dir().join("package-paths.txt").exists());
}

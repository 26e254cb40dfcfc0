//! Integration test: the built-in catalogue end-to-end via Engine.
//!
//! Fixtures are built in temporary folders; the network is replaced with
//! `FakeHttp` and the Library Manager index is preloaded.

use ardlint_core::capabilities::FakeHttp;
use ardlint_core::data::{LibraryIndex, SharedLibraryIndex};
use ardlint_core::{
    discover, Capabilities, Engine, Level, LibraryManagerMode, ModeSettings, OsFilesystem,
    Outcome, Project, ProjectType, Report,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const LIBRARY_URL: &str = "https://example.com/servo";

const SERVO_PROPERTIES: &str = "\
name=Servo
version=1.0.0
author=Jane Doe
maintainer=Jane Doe <jane@example.com>
sentence=Controls hobby servo motors.
paragraph=Supports up to twelve motors on most boards.
category=Device Control
url=https://example.com/servo
architectures=avr
";

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn engine(settings: ModeSettings, indexed: &[&str]) -> Engine {
    engine_with_http(settings, indexed, FakeHttp::new().status(LIBRARY_URL, 200))
}

fn engine_with_http(settings: ModeSettings, indexed: &[&str], http: FakeHttp) -> Engine {
    let capabilities = Capabilities::default().with_http(http);
    Engine::builder()
        .rules(ardlint_rules::all_rules())
        .capabilities(capabilities)
        .settings(settings)
        .library_index(SharedLibraryIndex::preloaded(LibraryIndex::from_names(
            indexed.iter().copied(),
        )))
        .build()
        .expect("catalogue should build")
}

fn servo_library(tmp: &TempDir, properties: &str) -> PathBuf {
    let root = tmp.path().join("Servo");
    write(&root.join("library.properties"), properties);
    write(&root.join("src/Servo.h"), "#include <Arduino.h>\n");
    write(&root.join("src/Servo.cpp"), "#include \"Servo.h\"\n");
    write(&root.join("examples/Sweep/Sweep.ino"), "#include <Servo.h>\n");
    write(&root.join("README.md"), "# Servo\n");
    write(&root.join("LICENSE"), "MIT\n");
    root
}

fn outcomes(report: &Report) -> Vec<(&'static str, Outcome, String)> {
    report.projects[0]
        .records
        .iter()
        .map(|r| (r.id, r.outcome, r.detail.clone()))
        .collect()
}

#[test]
fn clean_indexed_library_passes() {
    let tmp = TempDir::new().unwrap();
    let root = servo_library(&tmp, SERVO_PROPERTIES);
    let settings = ModeSettings {
        library_manager: Some(LibraryManagerMode::Update),
        ..ModeSettings::default()
    };

    let report = engine(settings, &["Servo"]).run(&[Project::root(root, ProjectType::Library)]);

    let unexpected: Vec<_> = outcomes(&report)
        .into_iter()
        .filter(|(_, outcome, _)| !matches!(outcome, Outcome::Pass | Outcome::Skip))
        .collect();
    assert!(unexpected.is_empty(), "unexpected outcomes: {unexpected:#?}");

    let project = &report.projects[0];
    assert_eq!(project.record("LP017").unwrap().outcome, Outcome::Pass);
    assert!(project.record("LP016").is_none(), "submission rule runs in update mode");
    assert_eq!(project.record("LP021").unwrap().outcome, Outcome::Skip);
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn invalid_library_properties_stops_field_rules() {
    let tmp = TempDir::new().unwrap();
    let root = servo_library(&tmp, "name=Servo\nthis line has no separator\n");

    let report =
        engine(ModeSettings::default(), &["Servo"]).run(&[Project::root(root, ProjectType::Library)]);
    let project = &report.projects[0];

    let format = project.record("LP005").unwrap();
    assert_eq!(format.outcome, Outcome::Fail);
    assert!(format.detail.contains("line 2"), "{}", format.detail);

    let field_rules: Vec<_> = project
        .records
        .iter()
        .filter(|r| r.category == "library.properties" && r.id > "LP005")
        .collect();
    assert!(!field_rules.is_empty());
    for record in field_rules {
        assert_eq!(record.outcome, Outcome::NotRun, "{}", record.id);
    }
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn sketch_file_target_lints_its_folder() {
    let tmp = TempDir::new().unwrap();
    let main = tmp.path().join("Foo/Foo.ino");
    write(&main, "void setup() {}\nvoid loop() {}\n");

    let projects = discover(&OsFilesystem, &[main], ProjectType::All, true).unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].path(), tmp.path().join("Foo"));
    assert_eq!(projects[0].project_type(), ProjectType::Sketch);

    let report = engine(ModeSettings::default(), &[]).run(&projects);
    let project = &report.projects[0];
    assert_eq!(project.record("SS001").unwrap().outcome, Outcome::Pass);
    assert!(project.record("LS001").is_none());
    assert_eq!(report.exit_code(), 0);
}

#[cfg(unix)]
#[test]
fn symlink_cycle_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("Cycle");
    fs::create_dir_all(root.join("examples")).unwrap();
    std::os::unix::fs::symlink("..", root.join("examples/UpGoer1")).unwrap();
    std::os::unix::fs::symlink("..", root.join("examples/UpGoer2")).unwrap();

    let err = discover(&OsFilesystem, &[root], ProjectType::All, true).unwrap_err();
    assert!(
        matches!(err, ardlint_core::DiscoveryError::SymlinkDepthExceeded { .. }),
        "{err}"
    );
}

#[test]
fn invalid_package_index_json() {
    let tmp = TempDir::new().unwrap();
    let index = tmp.path().join("package_foo_index.json");
    write(&index, "{ \"packages\": [");

    let projects = discover(&OsFilesystem, &[index], ProjectType::All, true).unwrap();
    assert_eq!(projects[0].project_type(), ProjectType::PackageIndex);

    let report = engine(ModeSettings::default(), &[]).run(&projects);
    let project = &report.projects[0];
    assert_eq!(project.record("IS001").unwrap().outcome, Outcome::Pass);
    assert_eq!(project.record("IS002").unwrap().outcome, Outcome::Pass);
    assert!(project.record("IS003").is_none());

    let json = project.record("IF001").unwrap();
    let format = project.record("IF002").unwrap();
    assert_eq!(json.outcome, Outcome::Fail);
    assert_eq!(format.outcome, Outcome::Fail);
    assert!(!format.detail.is_empty());
    assert_eq!(project.record("IP001").unwrap().outcome, Outcome::NotRun);
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn package_index_platform_checks() {
    let tmp = TempDir::new().unwrap();
    let index = tmp.path().join("package_foo_index.json");
    write(
        &index,
        r#"{
  "packages": [
    {
      "name": "foo",
      "maintainer": "Foo",
      "websiteURL": "https://example.com",
      "email": "foo@example.com",
      "help": { "online": "https://example.com/help" },
      "platforms": [
        { "name": "Foo AVR", "architecture": "avr", "version": "1.0.0", "category": "Contributed",
          "url": "https://example.com/avr-1.0.0.tar.bz2", "archiveFileName": "avr-1.0.0.tar.bz2",
          "checksum": "SHA-256:00", "size": "1", "boards": [], "toolsDependencies": [] },
        { "name": "Foo AVR", "architecture": "avr", "version": "latest", "category": "Contributed",
          "url": "not a url", "archiveFileName": "avr.tar.bz2",
          "checksum": "SHA-256:00", "size": "1", "boards": [], "toolsDependencies": [] }
      ],
      "tools": []
    },
    {
      "name": "foo",
      "maintainer": "Foo",
      "websiteURL": "https://example.com",
      "email": "foo@example.com",
      "help": { "online": "https://example.com/help" },
      "platforms": [],
      "tools": []
    }
  ]
}"#,
    );

    let report =
        engine(ModeSettings::default(), &[]).run(&[Project::root(index, ProjectType::PackageIndex)]);
    let project = &report.projects[0];

    assert_eq!(project.record("IF001").unwrap().outcome, Outcome::Pass);
    assert_eq!(project.record("IF002").unwrap().outcome, Outcome::Pass);
    assert_eq!(project.record("IP001").unwrap().detail, "foo");
    assert_eq!(project.record("IP002").unwrap().detail, "foo:avr@latest");
    assert_eq!(project.record("IP003").unwrap().detail, "foo:avr@latest");
}

#[test]
fn dependency_missing_from_index() {
    let tmp = TempDir::new().unwrap();
    let properties = format!("{SERVO_PROPERTIES}depends=NotIndexed\n");
    let root = servo_library(&tmp, &properties);

    let report =
        engine(ModeSettings::default(), &["Servo"]).run(&[Project::root(root, ProjectType::Library)]);
    let project = &report.projects[0];

    let depends = project.record("LP048").unwrap();
    assert_eq!(depends.outcome, Outcome::Fail);
    assert_eq!(depends.detail, "NotIndexed");
    assert_eq!(project.record("LP047").unwrap().outcome, Outcome::Pass);
    assert_eq!(project.record("LP049").unwrap().outcome, Outcome::Pass);
    assert_eq!(project.record("LP006").unwrap().outcome, Outcome::Pass);
}

#[test]
fn dead_library_url_is_a_warning() {
    let tmp = TempDir::new().unwrap();
    let root = servo_library(&tmp, SERVO_PROPERTIES);
    let http = FakeHttp::new().status(LIBRARY_URL, 404);

    let report = engine_with_http(ModeSettings::default(), &["Servo"], http)
        .run(&[Project::root(root, ProjectType::Library)]);
    let dead = report.projects[0].record("LP042").unwrap();

    assert_eq!(dead.outcome, Outcome::Fail);
    assert_eq!(dead.detail, "404 Not Found");
    assert_eq!(dead.level(), Level::Warning);
    assert!(dead.message.ends_with("404 Not Found"), "{}", dead.message);
}

#[test]
fn unreachable_library_url_fails_with_the_error() {
    let tmp = TempDir::new().unwrap();
    let properties = SERVO_PROPERTIES.replace(LIBRARY_URL, "https://unreachable.invalid/servo");
    let root = servo_library(&tmp, &properties);

    let report = engine(ModeSettings::default(), &["Servo"])
        .run(&[Project::root(root, ProjectType::Library)]);
    let dead = report.projects[0].record("LP042").unwrap();

    assert_eq!(dead.outcome, Outcome::Fail);
    assert_eq!(dead.detail, "no route to https://unreachable.invalid/servo");
    assert_eq!(dead.level(), Level::Warning);
    assert_eq!(report.projects[0].record("LP041").unwrap().outcome, Outcome::Pass);
}

#[test]
fn platform_configuration_files() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("avr");
    write(&root.join("boards.txt"), "uno.name=Arduino Uno\n");
    write(&root.join("programmers.txt"), "broken\n");

    let report =
        engine(ModeSettings::default(), &[]).run(&[Project::root(root, ProjectType::Platform)]);
    let project = &report.projects[0];

    assert_eq!(project.record("PS001").unwrap().outcome, Outcome::Pass);
    assert_eq!(project.record("PF001").unwrap().outcome, Outcome::Pass);
    assert_eq!(project.record("PF002").unwrap().outcome, Outcome::Skip);
    assert_eq!(project.record("PF003").unwrap().outcome, Outcome::Fail);
    assert_eq!(project.record("PD001").unwrap().outcome, Outcome::Fail);
    assert!(project.record("PD002").is_none());
}

#[test]
fn report_ids_follow_catalogue_order() {
    let tmp = TempDir::new().unwrap();
    let root = servo_library(&tmp, SERVO_PROPERTIES);

    let report =
        engine(ModeSettings::default(), &["Servo"]).run(&[Project::root(root, ProjectType::Library)]);

    let catalogue: Vec<_> = ardlint_rules::descriptors().map(|d| d.id).collect();
    let mut position = 0;
    for record in &report.projects[0].records {
        let found = catalogue[position..]
            .iter()
            .position(|id| *id == record.id)
            .unwrap_or_else(|| panic!("{} out of order", record.id));
        position += found + 1;
    }
}

#[test]
fn reruns_produce_identical_reports() {
    let tmp = TempDir::new().unwrap();
    servo_library(&tmp, SERVO_PROPERTIES);
    let targets = [tmp.path().to_path_buf()];

    let run = || {
        let projects = discover(&OsFilesystem, &targets, ProjectType::All, true).unwrap();
        engine(ModeSettings::default(), &["Servo"])
            .run(&projects)
            .to_json(true)
            .to_string()
    };
    assert_eq!(run(), run());
}

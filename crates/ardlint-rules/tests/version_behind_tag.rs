//! Integration test: the library.properties version against git tags (LP021).

use ardlint_core::capabilities::FakeHttp;
use ardlint_core::{Capabilities, Engine, Outcome, Project, ProjectType};
use git2::{Oid, Repository, Signature};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const RULE: &str = "LP021";

fn library(version: &str) -> (TempDir, Repository) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(root.join("src/Foo.h"), "").unwrap();
    fs::write(
        root.join("library.properties"),
        format!(
            "name=Foo\nversion={version}\nauthor=Foo\nmaintainer=Foo\nsentence=Foo.\n\
             paragraph=Bar.\ncategory=Other\nurl=https://example.com\narchitectures=*\n"
        ),
    )
    .unwrap();
    let repo = Repository::init(root).unwrap();
    (tmp, repo)
}

fn commit(repo: &Repository) -> Oid {
    let sig = Signature::now("Test", "test@example.com").unwrap();
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"], git2::IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<_> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, "commit", &tree, &parents)
        .unwrap()
}

fn tag(repo: &Repository, name: &str, annotated: bool) {
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    if annotated {
        let sig = Signature::now("Test", "test@example.com").unwrap();
        repo.tag(name, head.as_object(), &sig, name, false).unwrap();
    } else {
        repo.tag_lightweight(name, head.as_object(), false).unwrap();
    }
}

fn outcome(path: &Path) -> (Outcome, String) {
    let engine = Engine::builder()
        .rules(ardlint_rules::all_rules())
        .capabilities(
            Capabilities::default().with_http(FakeHttp::new().status("https://example.com", 200)),
        )
        .build()
        .unwrap();
    let report = engine.run(&[Project::root(path, ProjectType::Library)]);
    let record = report.projects[0].record(RULE).unwrap();
    (record.outcome, record.detail.clone())
}

#[test]
fn no_tags_pass() {
    let (tmp, repo) = library("1.0.0");
    commit(&repo);
    assert_eq!(outcome(tmp.path()).0, Outcome::Pass);
}

#[test]
fn not_a_repository_is_skipped() {
    let (tmp, _repo) = library("1.0.0");
    fs::remove_dir_all(tmp.path().join(".git")).unwrap();
    assert_eq!(outcome(tmp.path()).0, Outcome::Skip);
}

#[test]
fn greater_annotated_tag_fails() {
    let (tmp, repo) = library("1.0.0");
    commit(&repo);
    tag(&repo, "1.0.1", true);
    assert_eq!(
        outcome(tmp.path()),
        (Outcome::Fail, "1.0.1 vs 1.0.0".to_string())
    );
}

#[test]
fn greater_lightweight_tag_fails() {
    let (tmp, repo) = library("1.0.0");
    commit(&repo);
    tag(&repo, "1.0.1", false);
    assert_eq!(outcome(tmp.path()).0, Outcome::Fail);
}

#[test]
fn equal_or_lower_tag_passes() {
    for tag_name in ["1.0.0", "0.1.0"] {
        let (tmp, repo) = library("1.0.0");
        commit(&repo);
        tag(&repo, tag_name, true);
        assert_eq!(outcome(tmp.path()).0, Outcome::Pass, "{tag_name}");
    }
}

#[test]
fn unparsable_tag_is_ignored() {
    let (tmp, repo) = library("1.0.0");
    commit(&repo);
    tag(&repo, "foo", true);
    assert_eq!(outcome(tmp.path()).0, Outcome::Pass);
}

#[test]
fn v_prefix_is_stripped() {
    let (tmp, repo) = library("1.0.0");
    commit(&repo);
    tag(&repo, "v1.1.0", false);
    assert_eq!(
        outcome(tmp.path()),
        (Outcome::Fail, "1.1.0 vs 1.0.0".to_string())
    );
}

#[test]
fn greater_prerelease_tag_is_ignored() {
    let (tmp, repo) = library("1.0.0");
    commit(&repo);
    tag(&repo, "1.0.0", true);
    commit(&repo);
    tag(&repo, "1.1.0-rc1", true);
    assert_eq!(outcome(tmp.path()).0, Outcome::Pass);
}

#[test]
fn relaxed_manifest_version_is_compared() {
    let (tmp, repo) = library("1.1");
    commit(&repo);
    tag(&repo, "1.1.0", false);
    assert_eq!(outcome(tmp.path()).0, Outcome::Pass);
}

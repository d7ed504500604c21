use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use sdm_core::manifest::Manifest;
use sdm_git::GitSource;
use sdm_resolver::{RefKind, Resolver, RevisionSource, SourceError};
use tempfile::TempDir;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args([
            "-c",
            "user.name=sdm",
            "-c",
            "user.email=sdm@example.com",
            "-c",
            "commit.gpgsign=false",
            "-c",
            "tag.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A repository with:
/// - a first commit without a manifest
/// - annotated tag `v1.0.0` and lightweight tag `1.1.0` on commits carrying `Sdm.toml`
/// - branch `main` one commit past `1.1.0`
struct Fixture {
    dir: TempDir,
    bare_commit: String,
    v1_0: String,
    v1_1: String,
    head: String,
}

impl Fixture {
    fn new(manifest: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path();
        git(path, &["init", "--quiet"]);
        git(path, &["symbolic-ref", "HEAD", "refs/heads/main"]);

        std::fs::write(path.join("README"), "lib\n").unwrap();
        git(path, &["add", "README"]);
        git(path, &["commit", "--quiet", "-m", "initial"]);
        let bare_commit = git(path, &["rev-parse", "HEAD"]);

        std::fs::write(path.join("Sdm.toml"), manifest).unwrap();
        git(path, &["add", "Sdm.toml"]);
        git(path, &["commit", "--quiet", "-m", "add manifest"]);
        git(path, &["tag", "-a", "v1.0.0", "-m", "release 1.0.0"]);
        let v1_0 = git(path, &["rev-parse", "HEAD"]);

        std::fs::write(path.join("lib.txt"), "1.1\n").unwrap();
        git(path, &["add", "lib.txt"]);
        git(path, &["commit", "--quiet", "-m", "1.1"]);
        git(path, &["tag", "1.1.0"]);
        let v1_1 = git(path, &["rev-parse", "HEAD"]);

        std::fs::write(path.join("lib.txt"), "next\n").unwrap();
        git(path, &["commit", "--quiet", "-am", "next"]);
        let head = git(path, &["rev-parse", "HEAD"]);

        Self {
            dir,
            bare_commit,
            v1_0,
            v1_1,
            head,
        }
    }

    fn location(&self) -> String {
        self.dir.path().display().to_string()
    }
}

const LIB_MANIFEST: &str = "[package]\nname = \"lib\"\n";

#[tokio::test]
async fn lists_tags_and_branches() {
    if !git_available() {
        return;
    }
    let repo = Fixture::new(LIB_MANIFEST);
    let refs = GitSource::default()
        .list_revisions(&repo.location())
        .await
        .unwrap();

    let find = |name: &str, kind: RefKind| {
        refs.iter()
            .find(|r| r.name == name && r.kind == kind)
            .map(|r| r.commit.clone())
    };
    assert_eq!(find("main", RefKind::Branch), Some(repo.head.clone()));
    // Annotated tags resolve to the commit, not the tag object
    assert_eq!(find("v1.0.0", RefKind::Tag), Some(repo.v1_0.clone()));
    assert_eq!(find("1.1.0", RefKind::Tag), Some(repo.v1_1.clone()));
}

#[tokio::test]
async fn reads_manifest_at_revision() {
    if !git_available() {
        return;
    }
    let repo = Fixture::new(LIB_MANIFEST);
    let source = GitSource::default();

    let bytes = source
        .checkout_manifest(&repo.location(), &repo.v1_0)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(Manifest::from_slice(&bytes).unwrap().package_name(), "lib");

    // Second read reuses the clone
    assert!(source
        .checkout_manifest(&repo.location(), &repo.head)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn missing_manifest_is_none() {
    if !git_available() {
        return;
    }
    let repo = Fixture::new(LIB_MANIFEST);
    let manifest = GitSource::default()
        .checkout_manifest(&repo.location(), &repo.bare_commit)
        .await
        .unwrap();
    assert_eq!(manifest, None);
}

#[tokio::test]
async fn unknown_revision() {
    if !git_available() {
        return;
    }
    let repo = Fixture::new(LIB_MANIFEST);
    let err = GitSource::default()
        .checkout_manifest(&repo.location(), "0123456789abcdef0123456789abcdef01234567")
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::RevisionNotFound { .. }), "{err:?}");
}

#[tokio::test]
async fn missing_repository_is_unreachable() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    let location = dir.path().join("nope").display().to_string();
    let source = GitSource::default();

    let err = source.list_revisions(&location).await.unwrap_err();
    assert!(matches!(err, SourceError::RepositoryUnreachable { .. }), "{err:?}");

    let err = source.checkout_manifest(&location, "abc").await.unwrap_err();
    assert!(matches!(err, SourceError::RepositoryUnreachable { .. }), "{err:?}");
}

#[tokio::test]
async fn relative_locations_use_base_dir() {
    if !git_available() {
        return;
    }
    let repo = Fixture::new(LIB_MANIFEST);
    let base = repo.dir.path().parent().unwrap().to_path_buf();
    let name = repo.dir.path().file_name().unwrap().to_string_lossy().to_string();

    let refs = GitSource::default()
        .with_base_dir(base)
        .list_revisions(&name)
        .await
        .unwrap();
    assert!(refs.iter().any(|r| r.name == "v1.0.0"));
}

#[tokio::test]
async fn installs_working_tree() {
    if !git_available() {
        return;
    }
    let repo = Fixture::new(LIB_MANIFEST);
    let out = TempDir::new().unwrap();
    let dest = out.path().join("checkouts").join("lib");
    let source = GitSource::default();

    source
        .install_into(&repo.location(), &repo.v1_1, &dest)
        .await
        .unwrap();
    assert_eq!(std::fs::read_to_string(dest.join("lib.txt")).unwrap(), "1.1\n");

    // Reinstalling at another revision replaces the tree
    source
        .install_into(&repo.location(), &repo.v1_0, &dest)
        .await
        .unwrap();
    assert!(dest.join("Sdm.toml").is_file());
    assert!(!dest.join("lib.txt").exists());
}

#[tokio::test]
async fn resolves_against_real_repositories() {
    if !git_available() {
        return;
    }
    let repo = Fixture::new(LIB_MANIFEST);
    let root = Manifest::from_str(&format!(
        "[package]\nname = \"app\"\n\n[[dependencies]]\nname = \"lib\"\ngit = \"{}\"\nversion = {{ up-to-next-major = \"1.0.0\" }}\n",
        repo.location().replace('\\', "\\\\")
    ))
    .unwrap();

    let resolution = Resolver::new(Arc::new(GitSource::default()))
        .resolve(&root)
        .await
        .unwrap();
    let node = resolution.graph.get("lib").unwrap();
    assert_eq!(node.revision, repo.v1_1);
    assert_eq!(node.version.as_ref().map(ToString::to_string).as_deref(), Some("1.1.0"));
}

/// A revision or location that git could parse as `--upload-pack` must never
/// reach a git command line.
#[tokio::test]
async fn option_like_arguments_are_refused() {
    if !git_available() {
        return;
    }
    let repo = Fixture::new(LIB_MANIFEST);
    let scratch = TempDir::new().unwrap();
    let marker = scratch.path().join("ran");
    let injected = format!("--upload-pack=touch {}; git-upload-pack", marker.display());
    let source = GitSource::default();

    let err = source
        .checkout_manifest(&repo.location(), &injected)
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::RevisionNotFound { .. }), "{err:?}");

    let err = source.list_revisions(&injected).await.unwrap_err();
    assert!(matches!(err, SourceError::RepositoryUnreachable { .. }), "{err:?}");

    let err = source.checkout_manifest(&injected, &repo.head).await.unwrap_err();
    assert!(matches!(err, SourceError::RepositoryUnreachable { .. }), "{err:?}");

    let dest = scratch.path().join("checkouts").join("lib");
    assert!(source
        .install_into(&repo.location(), &injected, &dest)
        .await
        .is_err());
    assert!(source
        .install_into(&injected, &repo.head, &dest)
        .await
        .is_err());

    assert!(!marker.exists());
}

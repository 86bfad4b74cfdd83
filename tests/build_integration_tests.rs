use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use refgen::{DiskSink, ReferenceBuilder, ResolvedConfig, build_in_memory};
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

/// Creates a distribution root containing the given (empty) module files.
fn dist_tree(files: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for file in files {
        let path = dir.path().join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "\"\"\"Module docstring.\"\"\"\n").unwrap();
    }
    dir
}

fn config(root: &Path, package: &str, out: &str) -> ResolvedConfig {
    ResolvedConfig {
        dist_root: root.to_path_buf(),
        module_root: root.join(package),
        out_dir: root.join(out),
        ..Default::default()
    }
}

/// Builds onto disk and returns the out dir.
fn build_to_disk(config: &ResolvedConfig) -> PathBuf {
    let mut sink = DiskSink::new(&config.out_dir);
    if let Some(manifest) = &config.edit_manifest {
        sink = sink.with_manifest(manifest);
    }
    ReferenceBuilder::new(config).build(&mut sink).unwrap();
    config.out_dir.clone()
}

/// Reads every file under `dir`, keyed by relative path.
fn read_tree(dir: &Path) -> BTreeMap<PathBuf, String> {
    fn walk(base: &Path, dir: &Path, out: &mut BTreeMap<PathBuf, String>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(base, &path, out);
            } else {
                let relative = path.strip_prefix(base).unwrap().to_path_buf();
                out.insert(relative, fs::read_to_string(&path).unwrap());
            }
        }
    }
    let mut out = BTreeMap::new();
    walk(dir, dir, &mut out);
    out
}

#[derive(Debug, PartialEq)]
struct NavEntry {
    depth: usize,
    label: String,
    link: Option<String>,
}

/// Parses a literate nav document the way a Markdown nav plugin would.
fn parse_nav(markdown: &str) -> Vec<NavEntry> {
    let mut entries = Vec::new();
    let mut depth = 0;
    let mut current: Option<NavEntry> = None;

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::List(_)) => {
                entries.extend(current.take());
                depth += 1;
            }
            Event::End(TagEnd::List(_)) => depth -= 1,
            Event::Start(Tag::Item) => {
                current = Some(NavEntry {
                    depth,
                    label: String::new(),
                    link: None,
                })
            }
            Event::End(TagEnd::Item) => entries.extend(current.take()),
            Event::Start(Tag::Link { dest_url, .. }) => {
                if let Some(entry) = current.as_mut() {
                    entry.link = Some(dest_url.to_string());
                }
            }
            Event::Text(text) => {
                if let Some(entry) = current.as_mut() {
                    entry.label.push_str(&text);
                }
            }
            _ => {}
        }
    }
    entries
}

fn entry(depth: usize, label: &str, link: Option<&str>) -> NavEntry {
    NavEntry {
        depth,
        label: label.to_string(),
        link: link.map(str::to_string),
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_package_with_init_module_and_main() {
    let tree = dist_tree(&["a/__init__.py", "a/b.py", "a/__main__.py"]);
    let out = build_to_disk(&config(tree.path(), "a", "docs/reference"));

    let files = read_tree(&out);
    let paths: Vec<_> = files.keys().cloned().collect();
    assert_eq!(
        paths,
        vec![
            PathBuf::from("SUMMARY.md"),
            PathBuf::from("a/b.md"),
            PathBuf::from("a/index.md"),
        ]
    );
    assert_eq!(files[Path::new("a/index.md")], "::: a\n");
    assert_eq!(files[Path::new("a/b.md")], "::: a.b\n");

    let nav = parse_nav(&files[Path::new("SUMMARY.md")]);
    assert_eq!(
        nav,
        vec![
            entry(1, "a", Some("a/index.md")),
            entry(2, "b", Some("a/b.md")),
        ]
    );
}

#[test]
fn test_nested_packages_nav_structure() {
    let tree = dist_tree(&[
        "rustfst/__init__.py",
        "rustfst/algorithms/__init__.py",
        "rustfst/algorithms/compose.py",
        "rustfst/algorithms/determinize.py",
        "rustfst/fst/vector_fst.py",
        "rustfst/_private/util.py",
        "rustfst/weight.py",
    ]);
    let out = build_to_disk(&config(tree.path(), "rustfst", "site/reference"));
    let summary = fs::read_to_string(out.join("SUMMARY.md")).unwrap();

    assert_eq!(
        parse_nav(&summary),
        vec![
            entry(1, "rustfst", Some("rustfst/index.md")),
            entry(2, "_private", None),
            entry(3, "util", Some("rustfst/_private/util.md")),
            entry(2, "algorithms", Some("rustfst/algorithms/index.md")),
            entry(3, "compose", Some("rustfst/algorithms/compose.md")),
            entry(3, "determinize", Some("rustfst/algorithms/determinize.md")),
            entry(2, "fst", None),
            entry(3, "vector_fst", Some("rustfst/fst/vector_fst.md")),
            entry(2, "weight", Some("rustfst/weight.md")),
        ]
    );
    assert_eq!(
        fs::read_to_string(out.join("rustfst/fst/vector_fst.md")).unwrap(),
        "::: rustfst.fst.vector_fst\n"
    );
}

#[test]
fn test_every_nav_link_resolves_to_a_stub() {
    let tree = dist_tree(&[
        "pkg/__init__.py",
        "pkg/__main__.py",
        "pkg/cli/__init__.py",
        "pkg/cli/__main__.py",
        "pkg/cli/args.py",
        "pkg/core.py",
    ]);
    let out = build_to_disk(&config(tree.path(), "pkg", "docs/reference"));
    let files = read_tree(&out);
    let nav = parse_nav(&files[Path::new("SUMMARY.md")]);

    let links: Vec<_> = nav.iter().filter_map(|e| e.link.clone()).collect();
    assert_eq!(links.len(), 4);
    for link in &links {
        assert!(files.contains_key(Path::new(link)), "dangling link {link}");
    }
    // Every stub except the index itself is linked exactly once.
    assert_eq!(files.len(), links.len() + 1);
}

#[test]
fn test_disk_builds_are_byte_identical() {
    let tree = dist_tree(&[
        "pkg/__init__.py",
        "pkg/z.py",
        "pkg/a.b/c.py",
        "pkg/a/__init__.py",
        "pkg/a/b.py",
    ]);
    let first = build_to_disk(&config(tree.path(), "pkg", "out-1"));
    let second = build_to_disk(&config(tree.path(), "pkg", "out-2"));
    assert_eq!(read_tree(&first), read_tree(&second));

    // Component-wise order: `a/` entries precede `a.b/` entries.
    let summary = fs::read_to_string(first.join("SUMMARY.md")).unwrap();
    let a = summary.find("[a](pkg/a/index.md)").unwrap();
    let a_dot_b = summary.find("* a.b").unwrap();
    assert!(a < a_dot_b);
}

#[test]
fn test_memory_and_disk_agree() {
    let tree = dist_tree(&["pkg/__init__.py", "pkg/x.py", "pkg/y/z.py"]);
    let config = config(tree.path(), "pkg", "docs/reference");
    let (sink, _) = build_in_memory(&config).unwrap();
    let out = build_to_disk(&config);
    assert_eq!(sink.files(), &read_tree(&out));
}

#[test]
fn test_edit_manifest_links_stubs_to_sources() {
    let tree = dist_tree(&["pkg/__init__.py", "pkg/x.py", "pkg/__main__.py"]);
    let mut config = config(tree.path(), "pkg", "docs/reference");
    config.edit_manifest = Some(tree.path().join("edit_paths.json"));
    build_to_disk(&config);

    let json = fs::read_to_string(tree.path().join("edit_paths.json")).unwrap();
    let manifest: BTreeMap<String, String> = serde_json::from_str(&json).unwrap();
    assert_eq!(manifest.len(), 2);
    assert!(manifest["pkg/index.md"].ends_with("pkg/__init__.py"));
    assert!(manifest["pkg/x.md"].ends_with("pkg/x.py"));
    assert!(manifest.values().all(|source| !source.starts_with("//")));
}

#[test]
fn test_rebuild_after_rename_drops_old_page() {
    let tree = dist_tree(&["pkg/__init__.py", "pkg/before.py"]);
    let config = config(tree.path(), "pkg", "docs/reference");
    let out = build_to_disk(&config);
    assert!(out.join("pkg/before.md").exists());

    fs::rename(tree.path().join("pkg/before.py"), tree.path().join("pkg/after.py")).unwrap();
    build_to_disk(&config);

    let files = read_tree(&out);
    let paths: Vec<_> = files.keys().cloned().collect();
    assert_eq!(
        paths,
        vec![
            PathBuf::from("SUMMARY.md"),
            PathBuf::from("pkg/after.md"),
            PathBuf::from("pkg/index.md"),
        ]
    );
    assert!(refgen::check(&config).unwrap().is_empty());
}

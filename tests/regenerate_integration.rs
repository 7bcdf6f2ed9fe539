//! Integration tests for the full scan-and-regenerate pass.
//!
//! These tests run `generate` against temporary site trees and check:
//! - Idempotence (pages identical across runs apart from the generated-at line)
//! - Preservation of the hand-edited info section
//! - Listing, next-id and fallback behavior

use std::fs;
use std::path::{Path, PathBuf};

use interim_pages::core::SiteConfig;
use interim_pages::generate_cmd::{InfoStatus, generate};
use interim_pages::page::{GENERATED_AT_PREFIX, extract_region};
use tempfile::TempDir;

fn add_build(site: &Path, id: &str, files: &[(&str, usize)]) -> PathBuf {
    let dir = site.join("builds").join(id);
    fs::create_dir_all(&dir).unwrap();
    for (name, size) in files {
        fs::write(dir.join(name), vec![7u8; *size]).unwrap();
    }
    dir
}

fn page_of(site: &Path, id: &str) -> String {
    fs::read_to_string(site.join("builds").join(id).join("index.html")).unwrap()
}

/// Drop the generated-at line, the only part allowed to differ between runs.
fn without_timestamp(page: &str) -> String {
    page.lines()
        .filter(|l| !l.starts_with(GENERATED_AT_PREFIX))
        .collect::<Vec<_>>()
        .join("\n")
}

fn info_region(config: &SiteConfig, page: &str) -> String {
    extract_region(page, &config.info_start_marker, &config.info_end_marker)
        .expect("page should have a usable info region")
        .to_string()
}

fn set_info(config: &SiteConfig, page_path: &Path, region: &str) {
    let page = fs::read_to_string(page_path).unwrap();
    let old = info_region(config, &page);
    let start = format!("{}{}{}", config.info_start_marker, old, config.info_end_marker);
    let new = format!("{}{}{}", config.info_start_marker, region, config.info_end_marker);
    fs::write(page_path, page.replace(&start, &new)).unwrap();
}

#[test]
fn test_rerun_is_idempotent_except_timestamp() {
    let temp = TempDir::new().unwrap();
    add_build(temp.path(), "00001", &[("a.jar", 100), ("b.jar", 2048)]);
    add_build(temp.path(), "00002", &[]);
    let config = SiteConfig::new(temp.path());

    generate(&config, "2026-01-15T12:00:00Z").unwrap();
    let first1 = page_of(temp.path(), "00001");
    let first2 = page_of(temp.path(), "00002");
    let index1 = fs::read_to_string(temp.path().join("index.html")).unwrap();

    generate(&config, "2026-01-15T13:00:00Z").unwrap();
    let second1 = page_of(temp.path(), "00001");
    let second2 = page_of(temp.path(), "00002");
    let index2 = fs::read_to_string(temp.path().join("index.html")).unwrap();

    assert_ne!(first1, second1, "timestamp notice should change");
    assert_eq!(without_timestamp(&first1), without_timestamp(&second1));
    assert_eq!(without_timestamp(&first2), without_timestamp(&second2));
    assert_eq!(index1, index2, "index has no timestamp and must be byte-identical");
}

#[test]
fn test_info_region_preserved_across_runs() {
    let regions = [
        "",
        "\nSingle line of notes\n",
        "\nChangelog:\n  - fixed <b>crash</b> & \"hang\"\n  - it's faster\n\n\n",
        "<script>alert('still yours')</script>",
        "\n\t  trailing whitespace   \n",
    ];

    for region in regions {
        let temp = TempDir::new().unwrap();
        let dir = add_build(temp.path(), "00001", &[("mod.jar", 10)]);
        let config = SiteConfig::new(temp.path());

        generate(&config, "T0").unwrap();
        set_info(&config, &dir.join("index.html"), region);

        for run in 1..=3 {
            let report = generate(&config, &format!("T{run}")).unwrap();
            assert_eq!(report.results[0].info, Some(InfoStatus::Preserved));
            let page = page_of(temp.path(), "00001");
            assert_eq!(info_region(&config, &page), region, "run {run} lost the info region");
        }
    }
}

#[test]
fn test_info_preserved_when_artifacts_change() {
    let temp = TempDir::new().unwrap();
    let dir = add_build(temp.path(), "00003", &[("old.jar", 5)]);
    let config = SiteConfig::new(temp.path());

    generate(&config, "T0").unwrap();
    set_info(&config, &dir.join("index.html"), "\nHotfix build\n");

    fs::remove_file(dir.join("old.jar")).unwrap();
    fs::write(dir.join("new.jar"), vec![0u8; 3000]).unwrap();
    generate(&config, "T1").unwrap();

    let page = page_of(temp.path(), "00003");
    assert_eq!(info_region(&config, &page), "\nHotfix build\n");
    assert!(page.contains("new.jar"));
    assert!(page.contains("2.9 KB"));
    assert!(!page.contains("old.jar"));
}

#[test]
fn test_listing_sorted_with_sizes() {
    let temp = TempDir::new().unwrap();
    add_build(temp.path(), "00001", &[("b.jar", 2048), ("a.jar", 100), ("readme.txt", 1)]);

    let report = generate(&SiteConfig::new(temp.path()), "T").unwrap();
    assert_eq!(report.results[0].files, Some(2));

    let page = page_of(temp.path(), "00001");
    let a = page.find(">a.jar<").unwrap();
    let b = page.find(">b.jar<").unwrap();
    assert!(a < b, "files must be sorted by name");
    assert!(page.contains("100.0 B"));
    assert!(page.contains("2.0 KB"));
    assert!(!page.contains("readme.txt"));
}

#[test]
fn test_missing_markers_fall_back_to_placeholder() {
    let temp = TempDir::new().unwrap();
    let dir = add_build(temp.path(), "00001", &[]);
    fs::write(dir.join("index.html"), "<html><body>hand written, no markers</body></html>").unwrap();
    let config = SiteConfig::new(temp.path());

    let report = generate(&config, "T").unwrap();
    assert!(report.is_success());
    assert_eq!(report.results[0].info, Some(InfoStatus::Fallback));
    let page = page_of(temp.path(), "00001");
    assert_eq!(info_region(&config, &page), format!("\n{}\n", config.default_info));
}

#[test]
fn test_duplicate_markers_fall_back_to_placeholder() {
    let temp = TempDir::new().unwrap();
    let dir = add_build(temp.path(), "00001", &[]);
    let config = SiteConfig::new(temp.path());
    let s = &config.info_start_marker;
    let e = &config.info_end_marker;
    fs::write(dir.join("index.html"), format!("{s}one{e}\n{s}two{e}")).unwrap();

    let report = generate(&config, "T").unwrap();
    assert_eq!(report.results[0].info, Some(InfoStatus::Fallback));
    assert!(page_of(temp.path(), "00001").contains(&config.default_info));
}

#[test]
fn test_empty_build_directory_renders() {
    let temp = TempDir::new().unwrap();
    add_build(temp.path(), "00001", &[]);

    let report = generate(&SiteConfig::new(temp.path()), "T").unwrap();
    assert!(report.is_success());
    let page = page_of(temp.path(), "00001");
    assert!(page.contains("Files (0)"));
    assert!(page.contains("No artifact files found"));
}

#[test]
fn test_next_build_id() {
    let temp = TempDir::new().unwrap();
    let config = SiteConfig::new(temp.path());
    assert_eq!(generate(&config, "T").unwrap().next_build_id.to_string(), "00001");

    for id in ["00001", "00002", "00005"] {
        add_build(temp.path(), id, &[]);
    }
    assert_eq!(generate(&config, "T").unwrap().next_build_id.to_string(), "00006");

    let temp = TempDir::new().unwrap();
    add_build(temp.path(), "00099", &[]);
    let report = generate(&SiteConfig::new(temp.path()), "T").unwrap();
    assert_eq!(report.next_build_id.to_string(), "00100");
}

#[test]
fn test_custom_width_and_markers() {
    let temp = TempDir::new().unwrap();
    add_build(temp.path(), "007", &[("x.zip", 1)]);
    add_build(temp.path(), "00001", &[]);
    let mut config = SiteConfig::new(temp.path())
        .with_id_width(3)
        .with_artifact_extensions(["zip"]);
    config.info_start_marker = "<!-- NOTES -->".to_string();
    config.info_end_marker = "<!-- /NOTES -->".to_string();

    let report = generate(&config, "T").unwrap();
    let ids: Vec<String> = report.builds.iter().map(|i| i.to_string()).collect();
    assert_eq!(ids, vec!["007"]);
    assert_eq!(report.next_build_id.to_string(), "008");

    let page = page_of(temp.path(), "007");
    assert!(page.contains("<!-- NOTES -->"));
    assert!(page.contains("x.zip"));
}

#[cfg(unix)]
#[test]
fn test_unwritable_build_is_reported_and_others_continue() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let locked = add_build(temp.path(), "00001", &[("a.jar", 1)]);
    add_build(temp.path(), "00002", &[("b.jar", 1)]);
    let config = SiteConfig::new(temp.path());
    generate(&config, "T0").unwrap();
    let before = page_of(temp.path(), "00001");

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();
    // Privileged users ignore directory permissions; nothing to observe then.
    let canary = locked.join(".canary");
    if fs::write(&canary, b"x").is_ok() {
        fs::remove_file(&canary).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let report = generate(&config, "T1").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(report.failures, 1);
    assert_eq!(report.exit_code(), 1);
    let failed = report.results.iter().find(|r| r.id.to_string() == "00001").unwrap();
    assert!(!failed.ok);
    assert!(failed.error.as_deref().unwrap().contains("00001"));
    let ok = report.results.iter().find(|r| r.id.to_string() == "00002").unwrap();
    assert!(ok.ok);

    assert_eq!(page_of(temp.path(), "00001"), before, "failed page must keep its last good state");
    assert!(page_of(temp.path(), "00002").contains("Generated at T1"));
}

#[cfg(unix)]
#[test]
fn test_unreadable_build_is_skipped_and_left_out_of_index() {
    use std::os::unix::fs::PermissionsExt;

    use interim_pages::generate_cmd::render_summary;

    let temp = TempDir::new().unwrap();
    let locked = add_build(temp.path(), "00001", &[("a.jar", 1)]);
    add_build(temp.path(), "00002", &[("b.jar", 1)]);
    add_build(temp.path(), "00003", &[]);
    let config = SiteConfig::new(temp.path());

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    // Privileged users can still list the directory; nothing to observe then.
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let report = generate(&config, "T").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(report.builds_found, 3);
    assert_eq!(report.failures, 1);
    assert_eq!(report.exit_code(), 1);
    assert!(render_summary(&report).contains("FAIL 00001: failed to read build 00001"));

    assert!(page_of(temp.path(), "00002").contains("b.jar"));
    assert!(page_of(temp.path(), "00003").contains("Files (0)"));
    assert!(!locked.join("index.html").exists());

    let index = fs::read_to_string(temp.path().join("index.html")).unwrap();
    assert!(index.contains("Build #00002"));
    assert!(index.contains("Build #00003"));
    assert!(!index.contains("Build #00001"));
}

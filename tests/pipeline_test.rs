use anyhow::Result;
use family_tree::config::MatchMode;
use family_tree::hierarchy::DanglingParentPolicy;
use family_tree::{Config, FamilyTreeError, Pipeline, Variant};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const TREE_CSV: &str = "Name,Parent,Date of Birth,Email\n\
                        Bob,Alice,1975-06-01,bob@example.com\n\
                        Alice,,1950-01-01,alice@example.com\n\
                        Carol,Alice,1970-03-01,\n\
                        Dora,Carol,1995-12-24,dora@example.com\n";

const LISTING_CSV: &str = "Name,Hierarchy Level,Date of Birth,Alive\n\
                           Grace,grandparent,1930-02-02,no\n\
                           Hana,parent,1960-01-01,yes\n\
                           Henry,parent,1962-05-05,yes\n\
                           Ivy,grandchild,1990-07-07,yes\n";

fn config_for(dir: &Path, csv: &str) -> Result<Config> {
    let input = dir.join("input.csv");
    fs::write(&input, csv)?;
    let mut config = Config::default();
    config.input.path = input;
    config.output.dir = dir.join("out");
    Ok(config)
}

#[test]
fn tree_run_writes_graph_and_numbered_csv() -> Result<()> {
    let dir = tempdir()?;
    let config = config_for(dir.path(), TREE_CSV)?;

    let result = Pipeline::run_tree(&config)?;

    assert_eq!(result.variant, Variant::Tree);
    assert_eq!(result.total_records, 4);
    assert_eq!(result.level_count, 3);
    assert!(result.warnings.is_empty());
    assert_eq!(result.output_files.len(), 2);

    let html = fs::read_to_string(config.output.html_path())?;
    assert!(html.contains("new vis.Network"));
    assert!(html.contains(&result.input_digest));

    let csv = fs::read_to_string(config.output.csv_path())?;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Name,Parent,Date of Birth,Email,Level,Level Number,Overall Number",
            "Alice,,1950-01-01,alice@example.com,0,1,1",
            "Carol,Alice,1970-03-01,,1,1,2",
            "Bob,Alice,1975-06-01,bob@example.com,1,2,3",
            "Dora,Carol,1995-12-24,dora@example.com,2,1,4",
        ]
    );
    Ok(())
}

#[test]
fn tree_run_is_idempotent() -> Result<()> {
    let dir = tempdir()?;
    let config = config_for(dir.path(), TREE_CSV)?;

    let first = Pipeline::run_tree(&config)?;
    let csv_first = fs::read(config.output.csv_path())?;
    let html_first = fs::read(config.output.html_path())?;

    let second = Pipeline::run_tree(&config)?;
    let csv_second = fs::read(config.output.csv_path())?;
    let html_second = fs::read(config.output.html_path())?;

    assert_eq!(first.input_digest, second.input_digest);
    assert_eq!(csv_first, csv_second);
    assert_eq!(html_first, html_second);
    Ok(())
}

#[test]
fn missing_input_creates_no_outputs() -> Result<()> {
    let dir = tempdir()?;
    let mut config = Config::default();
    config.input.path = dir.path().join("absent.csv");
    config.output.dir = dir.path().join("out");

    let err = Pipeline::run_tree(&config).unwrap_err();
    assert!(matches!(err, FamilyTreeError::InputNotFound { .. }));
    assert!(err.to_string().contains("absent.csv"));

    let err = Pipeline::run_listing(&config).unwrap_err();
    assert!(matches!(err, FamilyTreeError::InputNotFound { .. }));

    assert!(!config.output.dir.exists());
    Ok(())
}

#[test]
fn dangling_parent_fails_before_writing() -> Result<()> {
    let dir = tempdir()?;
    let csv = "Name,Parent,Date of Birth\nAlice,,1950-01-01\nBob,Nobody,1975-06-01\n";
    let config = config_for(dir.path(), csv)?;

    let err = Pipeline::run_tree(&config).unwrap_err();
    assert!(matches!(err, FamilyTreeError::DanglingParent(_)));
    assert!(err.to_string().contains("Nobody"));
    assert!(!config.output.html_path().exists());
    assert!(!config.output.csv_path().exists());
    Ok(())
}

#[test]
fn dangling_parent_as_root_is_reported() -> Result<()> {
    let dir = tempdir()?;
    let csv = "Name,Parent,Date of Birth\nAlice,,1950-01-01\nBob,Nobody,1975-06-01\n";
    let mut config = config_for(dir.path(), csv)?;
    config.tree.dangling_parents = DanglingParentPolicy::Root;

    let result = Pipeline::run_tree(&config)?;
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("Nobody"));

    let csv = fs::read_to_string(config.output.csv_path())?;
    assert!(csv.contains("Bob,Nobody,1975-06-01,0,2,2"));
    assert!(!csv.contains(",-1,"));
    Ok(())
}

#[test]
fn failed_run_keeps_previous_report() -> Result<()> {
    let dir = tempdir()?;
    let config = config_for(dir.path(), TREE_CSV)?;
    Pipeline::run_tree(&config)?;
    let before = fs::read(config.output.html_path())?;

    fs::write(
        &config.input.path,
        "Name,Parent,Date of Birth\nAlice,Bob,1950-01-01\nBob,Alice,1975-06-01\n",
    )?;
    let err = Pipeline::run_tree(&config).unwrap_err();
    assert!(matches!(err, FamilyTreeError::Cycle(_)));

    assert_eq!(fs::read(config.output.html_path())?, before);
    Ok(())
}

#[test]
fn listing_run_writes_grouped_page() -> Result<()> {
    let dir = tempdir()?;
    let mut config = config_for(dir.path(), LISTING_CSV)?;
    config.listing.match_mode = MatchMode::Substring;
    config.listing.timezone = "Europe/Berlin".to_string();

    let result = Pipeline::run_listing(&config)?;
    assert_eq!(result.variant, Variant::Listing);
    assert_eq!(result.level_count, 3);
    assert_eq!(result.output_files, vec![config.output.html_path()]);
    assert!(!config.output.csv_path().exists());

    let html = fs::read_to_string(config.output.html_path())?;
    let grandparent = html.find("Grandparent (1)").expect("grandparent group");
    let parent = html.find("Parent (2)").expect("parent group");
    let grandchild = html.find("Grandchild (1)").expect("grandchild group");
    assert!(grandparent < parent && parent < grandchild);

    assert!(html.contains("1. Grace (DOB: 1930-02-02) †"));
    assert!(html.contains("2. Hana (DOB: 1960-01-01)"));
    assert!(html.contains("3. Henry (DOB: 1962-05-05)"));
    assert!(html.contains(r#"data-match-mode="substring""#));
    assert!(html.contains("Generated on "));
    assert!(html.contains("CET") || html.contains("CEST"));
    Ok(())
}

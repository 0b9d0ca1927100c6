use assert_cmd::prelude::*;
use serde::Deserialize;
use std::{fs, path::Path, process::Command};

#[derive(Deserialize)]
struct Summary {
    recipes_added: usize,
    recipes_skipped: usize,
    library_added: usize,
    library_skipped: usize,
    library_overwritten: usize,
    library_copied: usize,
}

#[derive(Deserialize)]
struct Stats {
    og: f64,
    fg: f64,
    abv: f64,
    ibu: f64,
    color_srm: f64,
}

fn bin_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("brewbook-cli").expect("brewbook-cli built");
    cmd.current_dir(dir);
    cmd
}

fn last_json_line(stdout: &[u8]) -> String {
    String::from_utf8_lossy(stdout)
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .expect("have output line")
        .to_string()
}

fn sample_recipe_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<RECIPES>
  <RECIPE>
    <NAME>Test Pale</NAME>
    <BREWER>CI</BREWER>
    <TYPE>All Grain</TYPE>
    <BATCH_SIZE>20</BATCH_SIZE>
    <BOIL_TIME>60</BOIL_TIME>
    <EFFICIENCY>75</EFFICIENCY>
    <FERMENTABLES>
      <FERMENTABLE>
        <NAME>Pale Malt</NAME>
        <TYPE>Grain</TYPE>
        <AMOUNT>5</AMOUNT>
        <POTENTIAL>1.037</POTENTIAL>
        <COLOR>2</COLOR>
      </FERMENTABLE>
    </FERMENTABLES>
    <HOPS>
      <HOP>
        <NAME>Cascade</NAME>
        <AMOUNT>0.030</AMOUNT>
        <ALPHA>5.5</ALPHA>
        <USE>Boil</USE>
        <TIME>60</TIME>
      </HOP>
    </HOPS>
    <YEASTS>
      <YEAST>
        <NAME>US-05</NAME>
        <TYPE>Ale</TYPE>
        <FORM>Dry</FORM>
        <ATTENUATION>75</ATTENUATION>
      </YEAST>
    </YEASTS>
  </RECIPE>
</RECIPES>"#
}

fn global_hop_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<HOPS>
  <HOP>
    <NAME>Saaz</NAME>
    <AMOUNT>0.1</AMOUNT>
    <ALPHA>3.8</ALPHA>
  </HOP>
</HOPS>"#
}

#[test]
fn import_commits_then_skips_duplicate_recipe() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let xml = tmp.path().join("pale.xml");
    fs::write(&xml, sample_recipe_xml()).unwrap();
    let dataset = tmp.path().join("dataset.json");

    let assert = bin_cmd(tmp.path())
        .args(["import", "--file"])
        .arg(&xml)
        .args(["--dataset"])
        .arg(&dataset)
        .assert()
        .success();
    let rep: Summary =
        serde_json::from_str(&last_json_line(&assert.get_output().stdout)).expect("json summary");
    assert_eq!(rep.recipes_added, 1);
    assert_eq!(rep.recipes_skipped, 0);
    // Pale Malt, Cascade and US-05 synthesized during linking
    assert_eq!(rep.library_added, 0);

    let saved = fs::read_to_string(&dataset).unwrap();
    assert!(saved.contains("Test Pale"));
    assert!(saved.contains("Cascade"));

    // re-import: the duplicate recipe is skipped silently
    let assert = bin_cmd(tmp.path())
        .args(["import", "--file"])
        .arg(&xml)
        .args(["--dataset"])
        .arg(&dataset)
        .assert()
        .success();
    let rep: Summary =
        serde_json::from_str(&last_json_line(&assert.get_output().stdout)).expect("json summary");
    assert_eq!(rep.recipes_added, 0);
    assert_eq!(rep.recipes_skipped, 1);
}

#[test]
fn conflict_policy_copy_disambiguates_names() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let xml = tmp.path().join("hops.xml");
    fs::write(&xml, global_hop_xml()).unwrap();
    let dataset = tmp.path().join("dataset.json");

    let assert = bin_cmd(tmp.path())
        .args(["import", "--file"])
        .arg(&xml)
        .args(["--dataset"])
        .arg(&dataset)
        .assert()
        .success();
    let rep: Summary =
        serde_json::from_str(&last_json_line(&assert.get_output().stdout)).unwrap();
    assert_eq!(rep.library_added, 1);

    for expected_copies in [1usize, 2] {
        let assert = bin_cmd(tmp.path())
            .args(["import", "--file"])
            .arg(&xml)
            .args(["--dataset"])
            .arg(&dataset)
            .args(["--on-conflict", "copy"])
            .assert()
            .success();
        let rep: Summary =
            serde_json::from_str(&last_json_line(&assert.get_output().stdout)).unwrap();
        assert_eq!(rep.library_copied, 1, "copy pass {expected_copies}");
    }

    let saved = fs::read_to_string(&dataset).unwrap();
    assert!(saved.contains("Saaz (2)"));
    assert!(saved.contains("Saaz (3)"));
}

#[test]
fn conflict_policy_overwrite_keeps_single_entry() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let xml = tmp.path().join("hops.xml");
    fs::write(&xml, global_hop_xml()).unwrap();
    let dataset = tmp.path().join("dataset.json");

    bin_cmd(tmp.path())
        .args(["import", "--file"])
        .arg(&xml)
        .args(["--dataset"])
        .arg(&dataset)
        .assert()
        .success();
    let assert = bin_cmd(tmp.path())
        .args(["import", "--file"])
        .arg(&xml)
        .args(["--dataset"])
        .arg(&dataset)
        .args(["--on-conflict", "overwrite"])
        .assert()
        .success();
    let rep: Summary = serde_json::from_str(&last_json_line(&assert.get_output().stdout)).unwrap();
    assert_eq!(rep.library_overwritten, 1);

    let saved = fs::read_to_string(&dataset).unwrap();
    assert_eq!(saved.matches("Saaz").count(), 1);
}

#[test]
fn empty_import_is_reported_not_silent() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let xml = tmp.path().join("foreign.xml");
    fs::write(&xml, "<catalog><entry>nope</entry></catalog>").unwrap();
    let dataset = tmp.path().join("dataset.json");

    bin_cmd(tmp.path())
        .args(["import", "--file"])
        .arg(&xml)
        .args(["--dataset"])
        .arg(&dataset)
        .assert()
        .failure()
        .stderr(predicates::str::contains("nothing to import"));
    assert!(!dataset.exists());
}

#[test]
fn stats_match_the_reference_formulas() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let xml = tmp.path().join("pale.xml");
    fs::write(&xml, sample_recipe_xml()).unwrap();

    let assert = bin_cmd(tmp.path())
        .args(["stats", "--file"])
        .arg(&xml)
        .args(["--format", "json"])
        .assert()
        .success();
    let stats: Stats =
        serde_json::from_str(&last_json_line(&assert.get_output().stdout)).expect("stats json");

    let expected_og = 1.0 + (5.0 * (1.037 - 1.0) * 1000.0 * 8.3454 * 0.75 / 20.0) / 1000.0;
    assert!((stats.og - expected_og).abs() < 1e-9);
    let expected_fg = 1.0 + (expected_og - 1.0) * 0.25;
    assert!((stats.fg - expected_fg).abs() < 1e-9);
    assert!((stats.abv - (expected_og - expected_fg) * 131.25).abs() < 1e-9);
    assert!(stats.ibu > 0.0);
    assert!(stats.color_srm > 0.0);
}

#[test]
fn bottled_stats_add_priming_correction() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let xml = tmp.path().join("pale.xml");
    fs::write(&xml, sample_recipe_xml()).unwrap();

    let plain = bin_cmd(tmp.path())
        .args(["stats", "--file"])
        .arg(&xml)
        .args(["--format", "json"])
        .assert()
        .success();
    let plain: Stats = serde_json::from_str(&last_json_line(&plain.get_output().stdout)).unwrap();

    let bottled = bin_cmd(tmp.path())
        .args(["stats", "--file"])
        .arg(&xml)
        .args(["--format", "json", "--bottled"])
        .args(["--sugar", "120", "--volume", "20"])
        .assert()
        .success();
    let bottled: Stats =
        serde_json::from_str(&last_json_line(&bottled.get_output().stdout)).unwrap();

    assert!((bottled.abv - plain.abv - 120.0 / 20.0 * 0.05).abs() < 1e-9);
}

#[test]
fn prime_reference_dose() {
    let tmp = tempfile::tempdir().expect("tempdir");
    bin_cmd(tmp.path())
        .args(["prime", "--volumes", "2.4", "--temp", "20", "--batch", "20"])
        .assert()
        .success()
        .stdout(predicates::str::contains("124 g"));
}

#[test]
fn export_then_stats_round_trips() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let xml = tmp.path().join("pale.xml");
    fs::write(&xml, sample_recipe_xml()).unwrap();
    let dataset = tmp.path().join("dataset.json");

    bin_cmd(tmp.path())
        .args(["import", "--file"])
        .arg(&xml)
        .args(["--dataset"])
        .arg(&dataset)
        .assert()
        .success();

    let exported = tmp.path().join("exported.xml");
    bin_cmd(tmp.path())
        .args(["export", "--dataset"])
        .arg(&dataset)
        .args(["--recipe", "Test Pale", "--out"])
        .arg(&exported)
        .assert()
        .success();

    let original = bin_cmd(tmp.path())
        .args(["stats", "--file"])
        .arg(&xml)
        .args(["--format", "json"])
        .assert()
        .success();
    let round_tripped = bin_cmd(tmp.path())
        .args(["stats", "--file"])
        .arg(&exported)
        .args(["--format", "json"])
        .assert()
        .success();

    let a: Stats = serde_json::from_str(&last_json_line(&original.get_output().stdout)).unwrap();
    let b: Stats =
        serde_json::from_str(&last_json_line(&round_tripped.get_output().stdout)).unwrap();
    assert!((a.og - b.og).abs() < 1e-6);
    assert!((a.abv - b.abv).abs() < 1e-6);
    assert_eq!(a.ibu, b.ibu);
}

#[test]
fn backup_and_restore_reproduce_the_dataset() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let xml = tmp.path().join("pale.xml");
    fs::write(&xml, sample_recipe_xml()).unwrap();
    let dataset = tmp.path().join("dataset.json");

    bin_cmd(tmp.path())
        .args(["import", "--file"])
        .arg(&xml)
        .args(["--dataset"])
        .arg(&dataset)
        .assert()
        .success();

    let backup = tmp.path().join("backup.json");
    bin_cmd(tmp.path())
        .args(["backup", "--dataset"])
        .arg(&dataset)
        .args(["--out"])
        .arg(&backup)
        .assert()
        .success();

    let restored = tmp.path().join("restored.json");
    bin_cmd(tmp.path())
        .args(["restore", "--backup"])
        .arg(&backup)
        .args(["--out"])
        .arg(&restored)
        .assert()
        .success();

    let a: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&dataset).unwrap()).unwrap();
    let b: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&restored).unwrap()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn scan_writes_summary_csv() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let dir = tmp.path().join("recipes");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("pale.xml"), sample_recipe_xml()).unwrap();

    let out_csv = tmp.path().join("summary.csv");
    bin_cmd(tmp.path())
        .args(["scan", "--root"])
        .arg(&dir)
        .args(["--out-csv"])
        .arg(&out_csv)
        .assert()
        .success();

    let text = fs::read_to_string(&out_csv).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next().unwrap(), "name,style,batch_l,og,fg,abv,ibu,srm");
    assert!(lines.next().unwrap().starts_with("Test Pale,"));
}

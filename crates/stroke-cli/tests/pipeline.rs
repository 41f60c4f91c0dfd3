//! End-to-end runs over small registry extracts on disk.

use std::fs;
use std::path::{Path, PathBuf};

use stroke_cli::pipeline::{CheckOptions, check_pipeline, load_run_catalog, run_pipeline};
use stroke_model::{CheckKind, MappingIssueKind, RunOptions, RunReport};
use tempfile::TempDir;

const CATALOG: &str = r#"
[catalog]
name = "pipeline"
schema_version = 1

[shape]
columns = 4

[[fields]]
name = "male"
rule = { kind = "binary", source = "S1Gender", positive = ["M"], negative = ["F"] }

[[fields]]
name = "arrive_by_ambulance"
rule = { kind = "binary", source = "S1ArriveByAmbulance", positive = ["Y"], negative = ["N"] }

[[fields]]
name = "ambulance_on_scene_time"
rule = { kind = "duration", source = "AmbulanceOnSceneMinutes", only_when = "arrive_by_ambulance" }

[[fields]]
name = "loc"
rule = { kind = "ordinal", source = "Loc", values = [0, 1] }

[[implications]]
name = "no-ambulance-no-ambulance-times"
when = "arrive_by_ambulance"
equals = 0
null_fields = ["ambulance_on_scene_time"]
"#;

const HEADER: &str = "S1Gender,S1ArriveByAmbulance,AmbulanceOnSceneMinutes,Loc\n";

struct Fixture {
    dir: TempDir,
    catalog: PathBuf,
    raw: PathBuf,
}

impl Fixture {
    fn new(rows: &str) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let catalog = dir.path().join("catalog.toml");
        let raw = dir.path().join("raw.csv");
        fs::write(&catalog, CATALOG).expect("write catalog");
        fs::write(&raw, format!("{HEADER}{rows}")).expect("write raw");
        Self { dir, catalog, raw }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn check_options(&self, clean: PathBuf) -> CheckOptions {
        CheckOptions {
            raw_path: self.raw.clone(),
            clean_path: clean,
            catalog_path: Some(self.catalog.clone()),
            ..CheckOptions::default()
        }
    }

    fn options(&self) -> RunOptions {
        RunOptions {
            raw_path: self.raw.clone(),
            output_path: Some(self.path("out/clean.csv")),
            report_path: Some(self.path("out/report.json")),
            catalog_path: Some(self.catalog.clone()),
            ..RunOptions::default()
        }
    }
}

const GOOD_ROWS: &str = "M,Y,12,0\nF,N,,1\nM,N,40,1\nF,Y,3,0\n";

fn read_report(path: &Path) -> RunReport {
    let text = fs::read_to_string(path).expect("read report");
    serde_json::from_str(&text).expect("parse report")
}

#[test]
fn clean_run_writes_table_and_report() {
    let fixture = Fixture::new(GOOD_ROWS);
    let outcome = run_pipeline(&fixture.options()).expect("run");

    assert!(!outcome.failed, "{:?}", outcome.report.validation);
    assert_eq!(outcome.written, Some(fixture.path("out/clean.csv")));
    assert_eq!(outcome.report.stats.gated_total(), 1);
    assert_eq!(outcome.report.clean_rows, 4);

    let csv = fs::read_to_string(fixture.path("out/clean.csv")).expect("read clean");
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("id,male,arrive_by_ambulance,ambulance_on_scene_time,loc")
    );
    assert_eq!(lines.next(), Some("1,1,1,12,0"));
    assert_eq!(lines.next(), Some("2,0,0,,1"));
    assert_eq!(lines.next(), Some("3,1,0,,1"));

    let report = read_report(&fixture.path("out/report.json"));
    assert_eq!(report.catalog, "pipeline");
    assert_eq!(report.catalog_sha256.len(), 64);
    assert_eq!(report.output_path, Some(fixture.path("out/clean.csv")));
    assert!(report.mapping.is_empty());
    assert_eq!(report.stats.rows, 4);
    assert_eq!(report.stats.gated.get("ambulance_on_scene_time"), Some(&1));
}

#[test]
fn mapping_issue_blocks_output() {
    let fixture = Fixture::new("M,Y,12,0\nX,N,,1\nF,Y,3,1\n");
    let outcome = run_pipeline(&fixture.options()).expect("run");

    assert!(outcome.failed);
    assert!(outcome.written.is_none());
    assert!(!fixture.path("out/clean.csv").exists());

    let report = read_report(&fixture.path("out/report.json"));
    assert_eq!(report.mapping.len(), 1);
    let issue = &report.mapping.issues[0];
    assert_eq!(issue.row, 2);
    assert_eq!(issue.field, "male");
    assert_eq!(issue.kind, MappingIssueKind::UnexpectedCode);
    assert!(report.output_path.is_none());
}

#[test]
fn keep_going_writes_despite_errors() {
    let fixture = Fixture::new("M,Y,12,0\nX,N,,1\nF,Y,3,1\n");
    let options = RunOptions {
        keep_going: true,
        ..fixture.options()
    };
    let outcome = run_pipeline(&options).expect("run");
    assert!(outcome.failed);
    assert!(fixture.path("out/clean.csv").exists());
}

#[test]
fn dry_run_writes_nothing_but_the_report() {
    let fixture = Fixture::new(GOOD_ROWS);
    let options = RunOptions {
        dry_run: true,
        ..fixture.options()
    };
    let outcome = run_pipeline(&options).expect("run");
    assert!(!outcome.failed);
    assert!(outcome.written.is_none());
    assert!(!fixture.path("out/clean.csv").exists());
    assert!(fixture.path("out/report.json").exists());
}

#[test]
fn strict_run_fails_on_warnings() {
    // loc never reaches 0, so range closure only warns.
    let fixture = Fixture::new("M,Y,12,1\nF,N,,1\n");
    let lenient = run_pipeline(&fixture.options()).expect("run");
    assert!(!lenient.failed);
    assert!(lenient.report.validation.warning_count() > 0);

    let options = RunOptions {
        strict: true,
        output_path: Some(fixture.path("strict/clean.csv")),
        ..fixture.options()
    };
    let strict = run_pipeline(&options).expect("run");
    assert!(strict.failed);
    assert!(!fixture.path("strict/clean.csv").exists());
}

#[test]
fn shape_mismatch_aborts_the_run() {
    let fixture = Fixture::new(GOOD_ROWS);
    let options = RunOptions {
        expected_rows: Some(10),
        ..fixture.options()
    };
    let error = run_pipeline(&options).expect_err("shape mismatch");
    assert!(format!("{error:#}").contains("shape"));
    assert!(!fixture.path("out/report.json").exists());
}

#[test]
fn missing_source_column_aborts_the_run() {
    let dir = TempDir::new().expect("tempdir");
    let catalog = dir.path().join("catalog.toml");
    let raw = dir.path().join("raw.csv");
    fs::write(&catalog, CATALOG).expect("write catalog");
    fs::write(&raw, "S1Gender,S1ArriveByAmbulance,OnScene,Loc\nM,Y,1,0\n").expect("write raw");
    let options = RunOptions {
        raw_path: raw,
        catalog_path: Some(catalog),
        dry_run: true,
        ..RunOptions::default()
    };
    let error = run_pipeline(&options).expect_err("missing column");
    assert!(format!("{error:#}").contains("AmbulanceOnSceneMinutes"));
}

#[test]
fn check_accepts_a_written_table() {
    let fixture = Fixture::new(GOOD_ROWS);
    let outcome = run_pipeline(&fixture.options()).expect("run");
    let written = outcome.written.expect("written");

    let report = check_pipeline(&fixture.check_options(written)).expect("check");
    assert!(!report.has_errors(), "{:?}", report.failures().collect::<Vec<_>>());
    assert!(
        report
            .checks
            .iter()
            .any(|c| c.check == CheckKind::Implication && c.passed())
    );
}

#[test]
fn check_catches_a_tampered_table() {
    let fixture = Fixture::new(GOOD_ROWS);
    let tampered = fixture.path("tampered.csv");
    fs::write(
        &tampered,
        "id,male,arrive_by_ambulance,ambulance_on_scene_time,loc\n\
         1,1,1,12,0\n2,0,0,,1\n3,1,0,40,1\n4,1,1,3,0\n",
    )
    .expect("write tampered");

    let report = check_pipeline(&fixture.check_options(tampered)).expect("check");
    let failed: Vec<(CheckKind, Option<&str>)> = report
        .failures()
        .map(|c| (c.check, c.field.as_deref()))
        .collect();
    assert!(failed.contains(&(CheckKind::FrequencyConservation, Some("male"))));
    assert!(failed.contains(&(CheckKind::Implication, Some("arrive_by_ambulance"))));
}

#[test]
fn check_rejects_a_raw_table_of_the_wrong_shape() {
    let fixture = Fixture::new(GOOD_ROWS);
    let narrow_raw = fixture.path("narrow.csv");
    let clean = fixture.path("narrow_clean.csv");
    fs::write(&narrow_raw, "S1Gender\nM\nF\n").expect("write raw");
    fs::write(&clean, "id,male\n1,1\n2,0\n").expect("write clean");

    let options = CheckOptions {
        raw_path: narrow_raw,
        ..fixture.check_options(clean)
    };
    let error = check_pipeline(&options).expect_err("shape mismatch");
    assert!(format!("{error:#}").contains("does not match expected *x4"));
}

#[test]
fn check_honours_expected_row_override() {
    let fixture = Fixture::new(GOOD_ROWS);
    let written = run_pipeline(&fixture.options())
        .expect("run")
        .written
        .expect("written");
    let options = CheckOptions {
        expected_rows: Some(5),
        ..fixture.check_options(written)
    };
    assert!(check_pipeline(&options).is_err());
}

#[test]
fn default_catalog_loads() {
    let catalog = load_run_catalog(None).expect("default catalog");
    assert_eq!(catalog.name(), "ssnap-v2");
}

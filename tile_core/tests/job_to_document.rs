//! End-to-end: job parameters through estimate, job file and method statement.

use tile_core::calculations::{estimate_traced, Material};
use tile_core::coverage::EstimateSettings;
use tile_core::file_io::{load_job, save_job, save_settings, load_settings, write_document};
use tile_core::formulas::{Formula, FormulaTracker};
use tile_core::job::{JobDetails, JobFile, JobSpec, JobSpecInput};
use tile_core::materials::{AdhesiveType, GroutType, Substrate, TileSize};
use tile_core::pdf::{render_method_statement, DocumentOptions};
use tile_core::{estimate, estimate_with, render};

use tempfile::TempDir;

fn kitchen(ufh: bool) -> JobSpec {
    JobSpec::new(
        20.0,
        TileSize::T300x300,
        Substrate::Concrete,
        ufh,
        AdhesiveType::C2TeS1,
        GroutType::Cg2Wa,
    )
    .unwrap()
}

#[test]
fn test_reference_job_quantities() {
    let bill = estimate(&kitchen(false));
    assert!((bill.adhesive_kg - 106.0).abs() < 1e-9);
    assert_eq!(bill.levelling_compound_kg, 0.0);
    assert!(bill.assumptions.is_empty());
}

#[test]
fn test_ufh_only_adds_levelling() {
    let without = estimate(&kitchen(false));
    let with = estimate(&kitchen(true));

    assert!(with.levelling_compound_kg > 0.0);
    assert_eq!(with.adhesive_kg, without.adhesive_kg);
    assert_eq!(with.grout_kg, without.grout_kg);
    assert_eq!(with.primer_litres, without.primer_litres);
}

#[test]
fn test_zero_area_never_reaches_the_estimator() {
    let input = JobSpecInput { area_m2: 0.0, ..JobSpecInput::default() };
    let err = input.validate().unwrap_err();
    assert!(err.is_invalid_input());
    assert_eq!(err.error_code(), "INVALID_INPUT");
}

#[test]
fn test_job_json_accepts_flexible_shape() {
    let json = r#"{
        "area_m2": 12.0,
        "tile": "600x1200",
        "substrate": "anhydrite-screed",
        "underfloor_heating": true,
        "adhesive": "GEL",
        "grout": "RG"
    }"#;
    let spec: JobSpec = serde_json::from_str(json).unwrap();
    assert_eq!(spec.tile_thickness_mm(), 9.0);

    let bill = estimate(&spec);
    assert!(bill.needs_levelling());
    // Gel has no large format yield in the table
    assert!(!bill.assumptions.is_empty());
}

#[test]
fn test_job_json_accepts_labels_and_custom_tiles() {
    let json = r#"{
        "area_m2": 12.0,
        "tile": "250x400",
        "substrate": "Anhydrite screed",
        "underfloor_heating": true,
        "adhesive": "H40 (Kerakoll)",
        "grout": "epoxy"
    }"#;
    let spec: JobSpec = serde_json::from_str(json).unwrap();
    assert_eq!(spec.tile(), TileSize::Custom { width_mm: 250.0, height_mm: 400.0 });
    assert_eq!(spec.substrate(), Substrate::AnhydriteScreed);
    assert_eq!(spec.adhesive(), AdhesiveType::Gel);
    assert_eq!(spec.grout(), GroutType::EpoxyRg);

    // Written back with canonical codes
    let written = serde_json::to_value(&spec).unwrap();
    assert_eq!(written["tile"], "250x400");
    assert_eq!(written["substrate"], "anhydrite-screed");
    assert_eq!(written["adhesive"], "GEL");
}

#[test]
fn test_job_file_with_unknown_substrate_is_invalid_input() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lounge.tij");
    std::fs::write(
        &path,
        r#"{
            "meta": {"version": "0.1.0", "created": "2026-03-02T08:30:00Z", "modified": "2026-03-02T08:30:00Z"},
            "details": {"project": "3 Orchard Close"},
            "spec": {"area_m2": 18.0, "tile": "600x600", "substrate": "carpet"}
        }"#,
    )
    .unwrap();

    let job = load_job(&path).unwrap();
    assert_eq!(job.details.project, "3 Orchard Close");
    let err = job.spec().unwrap_err();
    assert_eq!(err.error_code(), "UNKNOWN_OPTION");
    assert!(err.is_invalid_input());
    assert!(err.to_string().contains("carpet"));
}

#[test]
fn test_invalid_job_json_rejected() {
    let json = r#"{ "area_m2": -4.0, "tile": "300x300", "substrate": "concrete",
        "underfloor_heating": false, "adhesive": "C2TE-S1", "grout": "CG2WA" }"#;
    assert!(serde_json::from_str::<JobSpec>(json).is_err());
}

#[test]
fn test_settings_file_changes_estimate() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "[rates]\nufh_levelling_allowance_mm = 5.0\n").unwrap();

    let settings = load_settings(&path).unwrap();
    let default_bill = estimate(&kitchen(true));
    let custom_bill = estimate_with(&kitchen(true), &settings);
    assert!(custom_bill.levelling_compound_kg > default_bill.levelling_compound_kg);

    // Saving and reloading preserves the override
    let copy = dir.path().join("copy.toml");
    save_settings(&settings, &copy).unwrap();
    assert_eq!(load_settings(&copy).unwrap(), settings);
}

#[test]
fn test_job_file_roundtrip_then_estimate() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hallway.tij");

    let spec = kitchen(true);
    let details = JobDetails {
        project: "22 Station Road".to_string(),
        room: "GF hallway".to_string(),
        ..JobDetails::default()
    };
    save_job(&JobFile::new(&spec, details), &path).unwrap();

    let loaded = load_job(&path).unwrap();
    assert_eq!(estimate(&loaded.spec().unwrap()), estimate(&spec));
    assert_eq!(loaded.details.room, "GF hallway");
}

#[test]
fn test_render_and_write_document() {
    let dir = TempDir::new().unwrap();
    let spec = kitchen(false);
    let payload = render(&spec, &estimate(&spec)).unwrap();

    assert!(payload.bytes.starts_with(b"%PDF"));
    assert_eq!(payload.mime_type, "application/pdf");

    let path = dir.path().join(&payload.file_name);
    write_document(&payload, &path).unwrap();
    assert_eq!(std::fs::read(&path).unwrap().len(), payload.len());
}

#[test]
fn test_render_with_traced_formulas() {
    let spec = JobSpec::new(
        35.0,
        TileSize::T600x1200,
        Substrate::ExistingTile,
        true,
        AdhesiveType::C2TeS2,
        GroutType::EpoxyRg,
    )
    .unwrap();

    let mut tracker = FormulaTracker::new();
    let bill = estimate_traced(&spec, &EstimateSettings::default(), &mut tracker);
    assert!(tracker.unique_formulas().contains(&Formula::GroutMass));

    let options = DocumentOptions {
        formulas: Some(tracker),
        ..DocumentOptions::default()
    };
    let details = JobDetails {
        project: "Unit 4, Riverside Works".to_string(),
        notes: "Tile over existing quarry tiles\nCheck door thresholds".to_string(),
        attachments: vec!["floor-plan.pdf".to_string()],
        ..JobDetails::default()
    };
    let payload = render_method_statement(&spec, &bill, &details, &options).unwrap();
    assert!(payload.bytes.starts_with(b"%PDF"));

    let plan = bill.purchase_plan(&options.packs);
    assert!(plan.packs_of(Material::LevellingCompound) > 0);
}

#[test]
fn test_over_long_details_rejected_before_render() {
    let spec = kitchen(false);
    let details = JobDetails {
        notes: "x".repeat(5000),
        ..JobDetails::default()
    };
    let err = render_method_statement(&spec, &estimate(&spec), &details, &DocumentOptions::default())
        .unwrap_err();
    assert!(err.is_invalid_input());
}

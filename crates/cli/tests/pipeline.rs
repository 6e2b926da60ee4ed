//! Full pipeline over a fixture study tree: scan, build matrices, reconcile,
//! and read the report back.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use scantrack_cli::commands;
use scantrack_cli::config::StudyConfig;
use scantrack_model::{Cell, ColumnId, Status, WideTable};
use tempfile::TempDir;

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"").unwrap();
}

fn build_fixture() -> (TempDir, StudyConfig) {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let bids = root.join("mri/newborn/bids");
    let derivatives = root.join("mri/newborn/derivatives");

    // sub-1001: scanned everything, anatomical + functional volume + DWI
    // processed.
    touch(&bids.join("sub-1001/ses-newborn/anat/sub-1001_ses-newborn_T1w.nii.gz"));
    touch(&bids.join("sub-1001/ses-newborn/func/sub-1001_ses-newborn_task-rest_bold.nii.gz"));
    touch(&bids.join("sub-1001/ses-newborn/dwi/sub-1001_ses-newborn_dwi.nii.gz"));
    touch(&derivatives.join("Nibabies/sub-1001/ses-newborn/anat/seg.nii.gz"));
    touch(&derivatives.join("Nibabies/sub-1001/ses-newborn/func/sub-1001_boldref.nii.gz"));
    let run = derivatives.join("Nibabies/sub-1001/ses-newborn/log/20240302-143055_run");
    fs::create_dir_all(&run).unwrap();
    fs::write(
        run.join("pipeline.toml"),
        "[workflow]\nsurface_recon_method = \"mcribs\"\n",
    )
    .unwrap();
    touch(&derivatives.join("Diffusion/sub-1001/tracts.tck"));

    // sub-1002: enrolled, never scanned.
    fs::create_dir_all(bids.join("sub-1002/ses-newborn")).unwrap();

    let csv_dir = root.join("csv");
    fs::create_dir_all(&csv_dir).unwrap();
    fs::write(
        csv_dir.join("export.csv"),
        "study_id,neonatal_status_v2,neonatal_notscan_v2,infant_sex,child_sex\n\
         1001,1,,Female,\n\
         1002,2,3,Male,\n\
         9999,1,,Female,\n",
    )
    .unwrap();
    fs::write(
        csv_dir.join("dictionary.csv"),
        "Variable / Field Name,\"Choices, Calculations, OR Slider Labels\"\n\
         neonatal_status_v2,\"1, Completed | 2, Withdrawn\"\n\
         neonatal_notscan_v2,\"3, Family declined\"\n",
    )
    .unwrap();

    let config_text = format!(
        r#"
[project]
name = "BABIES"
id_pattern = '1\d{{3}}'

[[project.visits]]
key = "newborn"
label = "Newborn"
status_field = "neonatal_status_v2"
reason_field = "neonatal_notscan_v2"

[paths]
data_root = "{data_root}"
csv_dir = "{csv_dir}"
report_dir = "{report_dir}"

[clinical]
export = "{export}"
dictionary = "{dictionary}"
id_column = "study_id"
sex_primary = "infant_sex"
sex_secondary = "child_sex"
"#,
        data_root = root.join("mri").display(),
        csv_dir = csv_dir.display(),
        report_dir = root.join("reports").display(),
        export = csv_dir.join("export.csv").display(),
        dictionary = csv_dir.join("dictionary.csv").display(),
    );
    let config_path = root.join("scantrack.toml");
    fs::write(&config_path, config_text).unwrap();
    let config = StudyConfig::load(&config_path).unwrap();
    (temp, config)
}

#[test]
fn full_pipeline_produces_a_categorical_report() {
    let (_temp, config) = build_fixture();

    commands::run_acquisition(&config, "newborn").unwrap();
    commands::run_derivatives(&config, "newborn").unwrap();
    commands::run_reconcile(&config).unwrap();

    let table = WideTable::from_csv(&config.report_csv()).unwrap();
    let get = |subject: &str, col: ColumnId| table.get(subject, &col).cloned().unwrap();

    // sub-1001: partial acquisition (no T2w), pipeline ran.
    assert_eq!(
        get("sub-1001", ColumnId::acquired("Newborn", "Anatomical")),
        Cell::Status(Status::Acquired)
    );
    assert_eq!(
        get("sub-1001", ColumnId::acquired("Newborn", "T2w")),
        Cell::Status(Status::NotAcquired)
    );
    assert_eq!(
        get("sub-1001", ColumnId::acquired("Newborn", "Functional")),
        Cell::Status(Status::Acquired)
    );
    // "Completed" reads back as its status token.
    assert_eq!(
        get("sub-1001", ColumnId::acquired("Newborn", "Status")),
        Cell::Status(Status::Completed)
    );
    assert_eq!(
        get("sub-1001", ColumnId::acquired("Newborn", "Reason Not-Acquired")),
        Cell::Status(Status::Unknown)
    );
    assert_eq!(
        get("sub-1001", ColumnId::processed("Newborn", "Anatomical")),
        Cell::Status(Status::Processed)
    );
    assert_eq!(
        get("sub-1001", ColumnId::processed("Newborn", "Surface-Recon-Method")),
        Cell::Text("mcribs".into())
    );
    assert_eq!(
        get("sub-1001", ColumnId::processed("Newborn", "Date-Processed")),
        Cell::Text("2024-03-02".into())
    );
    assert_eq!(
        get("sub-1001", ColumnId::processed("Newborn", "Functional-Volume")),
        Cell::Status(Status::Processed)
    );
    assert_eq!(
        get("sub-1001", ColumnId::processed("Newborn", "Functional-Surface")),
        Cell::Status(Status::NotProcessed)
    );
    assert_eq!(
        get("sub-1001", ColumnId::processed("Newborn", "DWI")),
        Cell::Status(Status::Processed)
    );
    // Absent derivative categories default to Not Processed for acquired
    // anatomy.
    assert_eq!(
        get("sub-1001", ColumnId::processed("Newborn", "Precomputed")),
        Cell::Status(Status::NotProcessed)
    );

    // sub-1002: nothing acquired; the definitive survey labels survive.
    assert_eq!(
        get("sub-1002", ColumnId::acquired("Newborn", "Anatomical")),
        Cell::Status(Status::NotAcquired)
    );
    assert_eq!(
        get("sub-1002", ColumnId::acquired("Newborn", "Status")),
        Cell::Text("Withdrawn".into())
    );
    assert_eq!(
        get("sub-1002", ColumnId::acquired("Newborn", "Reason Not-Acquired")),
        Cell::Text("Family declined".into())
    );
    assert_eq!(
        get("sub-1002", ColumnId::processed("Newborn", "Anatomical")),
        Cell::Status(Status::NotApplicable)
    );

    // Sex column leads the report; the filtered 9999 record is gone.
    assert_eq!(table.columns()[0].field, "Biological Sex");
    assert_eq!(
        get("sub-1001", ColumnId::acquired("Newborn", "Biological Sex")),
        Cell::Text("Female".into())
    );
    assert!(table.subjects().all(|subject| !subject.contains("9999")));

    // Reconciling the saved report again changes nothing.
    let layout = config.layout().unwrap();
    let again = scantrack_reconcile::reconcile(&table, &layout);
    assert_eq!(again.table, table);
}

use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use scantrack_clinical::ClinicalSource;
use scantrack_matrix::{AcquisitionBuilder, DerivativeBuilder, SupplementalSource};
use scantrack_model::{Cell, Frame, Stage, Status, WideTable};
use scantrack_reconcile::{merge_sources, reconcile, VisitSources};

use crate::config::{StudyConfig, VisitConfig};

pub fn run_acquisition(config: &StudyConfig, visit_key: &str) -> Result<()> {
    let visit = config.visit(visit_key)?;
    let spinner = step_spinner(format!(
        "Documenting acquired scans for {} {}",
        config.project.name, visit.label
    ));

    let builder = AcquisitionBuilder::with_extras(
        config.bids_path(visit),
        visit.to_visit(),
        &config.extra_modalities(),
    )?;
    let frame = builder.build()?;
    let out = config.acquisition_csv(visit);
    frame.to_csv(&out)
        .with_context(|| format!("saving {}", out.display()))?;

    spinner.finish_and_clear();
    println!(
        "{} acquisition matrix for {} subjects -> {}",
        style("Saved").green().bold(),
        frame.len(),
        out.display()
    );
    Ok(())
}

pub fn run_derivatives(config: &StudyConfig, visit_key: &str) -> Result<()> {
    let visit = config.visit(visit_key)?;
    let spinner = step_spinner(format!(
        "Documenting pipeline outputs for {} {}",
        config.project.name, visit.label
    ));

    let mut builder = DerivativeBuilder::new(config.derivative_paths(visit), visit.to_visit());
    if let Some(supplemental) = &config.supplemental {
        builder = builder
            .with_supplemental(SupplementalSource::new(&supplemental.path, &supplemental.visit));
    }
    let frame = builder.build()?;
    let out = config.derivatives_csv(visit);
    frame.to_csv(&out)
        .with_context(|| format!("saving {}", out.display()))?;

    spinner.finish_and_clear();
    println!(
        "{} derivative matrix for {} subjects -> {}",
        style("Saved").green().bold(),
        frame.len(),
        out.display()
    );
    Ok(())
}

pub fn run_reconcile(config: &StudyConfig) -> Result<()> {
    let layout = config.layout()?;
    let spinner = step_spinner(format!("Reconciling {} status table", config.project.name));

    let mut sources = Vec::new();
    for visit in &config.project.visits {
        let acquisition_csv = config.acquisition_csv(visit);
        let acquisition = Frame::from_csv(&acquisition_csv).with_context(|| {
            format!(
                "loading {} (run `scantrack acquisition --visit {}` first)",
                acquisition_csv.display(),
                visit.key
            )
        })?;
        let derivatives_csv = config.derivatives_csv(visit);
        let derivatives = Frame::from_csv(&derivatives_csv).with_context(|| {
            format!(
                "loading {} (run `scantrack derivatives --visit {}` first)",
                derivatives_csv.display(),
                visit.key
            )
        })?;
        sources.push(VisitSources {
            visit: visit.to_visit(),
            acquisition,
            derivatives,
        });
    }

    let clinical = ClinicalSource {
        export: config.clinical.export.clone(),
        dictionary: config.clinical.dictionary.clone(),
        spec: config.export_spec(),
    }
    .load()
    .context("loading clinical status export")?;

    let snapshot = merge_sources(&sources, &clinical);
    let result = reconcile(&snapshot, &layout);
    result.audit.log_warnings();

    let out = config.report_csv();
    result
        .table
        .to_csv(&out)
        .with_context(|| format!("saving {}", out.display()))?;

    spinner.finish_and_clear();
    println!(
        "{} reconciled status table for {} subjects -> {}",
        style("Saved").green().bold(),
        result.table.len(),
        out.display()
    );
    if !result.audit.is_clean() {
        let leftover: usize = result
            .audit
            .unset_cells
            .values()
            .chain(result.audit.boolean_cells.values())
            .chain(result.audit.missing_records.values())
            .sum();
        println!(
            "{} {} cell(s) could not be classified; see warnings above",
            style("Note").yellow().bold(),
            leftover
        );
    }
    Ok(())
}

pub fn run_all(config: &StudyConfig) -> Result<()> {
    for visit in &config.project.visits {
        run_acquisition(config, &visit.key)?;
        run_derivatives(config, &visit.key)?;
    }
    run_reconcile(config)
}

pub fn run_summary(config: &StudyConfig) -> Result<()> {
    let report = config.report_csv();
    let table = WideTable::from_csv(&report)
        .with_context(|| format!("loading {} (run `scantrack reconcile` first)", report.display()))?;

    println!(
        "{} {} subjects in {}",
        style(&config.project.name).cyan().bold(),
        table.len(),
        report.display()
    );
    for visit in &config.project.visits {
        println!("{}", style(&visit.label).bold());
        print_block(&table, visit, Stage::Acquired, Status::Acquired);
        print_block(&table, visit, Stage::Processed, Status::Processed);
    }
    Ok(())
}

fn print_block(table: &WideTable, visit: &VisitConfig, stage: Stage, counted: Status) {
    for column in table.columns() {
        if column.stage != stage || column.visit != visit.label {
            continue;
        }
        let count = table
            .subjects()
            .filter(|subject| {
                table.get(subject, column) == Some(&Cell::Status(counted))
            })
            .count();
        println!(
            "  {:<22} {:>4} {}",
            column.field,
            count,
            counted.as_str().to_lowercase()
        );
    }
}

fn step_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

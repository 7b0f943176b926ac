// src/pipeline/mod.rs
use crate::config::Options;
use crate::cost::aggregate;
use crate::io::unload;
use crate::model::{MappingResult, OverrideSpec, OverrideSpecRaw, VmSize, VmSpecRaw};
use crate::overrides::dedupe;
use crate::project::{project, ProjectionContext};
use crate::rates::{RateCalc, RateError};
use crate::storage::{map_storage, UnknownOsDisk};
use crate::validate::{validate_override_spec, validate_vm_spec};
use std::fmt;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("mapping cancelled")]
    Cancelled,
    #[error("no VM specifications to map")]
    NoInput,
    #[error("no Azure VM SKUs available for the selected series and region")]
    EmptyCatalog,
    #[error("rate card has no meters")]
    EmptyRateCard,
    #[error(transparent)]
    UnknownOsDisk(#[from] UnknownOsDisk),
    #[error(transparent)]
    Rate(#[from] RateError),
}

/// Shared stop switch, checked once before each stage.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), PipelineError> {
        if self.is_cancelled() {
            Err(PipelineError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ValidateOverrides,
    Validate,
    MapStorage,
    Project,
    Estimate,
    Dedupe,
    Render,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::ValidateOverrides => "validating override specifications",
            Stage::Validate => "validating VM specifications",
            Stage::MapStorage => "mapping storage to managed disks",
            Stage::Project => "mapping VM specifications to Azure VM SKUs",
            Stage::Estimate => "estimating monthly cost",
            Stage::Dedupe => "building override list",
            Stage::Render => "rendering output",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageReport {
    pub stage: Stage,
    pub done: usize,
    pub total: usize,
}

/// Optional sink for progress reports, one per completed stage.
#[derive(Debug, Clone, Default)]
pub struct Progress(Option<UnboundedSender<StageReport>>);

impl Progress {
    pub fn new(tx: UnboundedSender<StageReport>) -> Self {
        Self(Some(tx))
    }

    pub fn silent() -> Self {
        Self(None)
    }

    fn report(&self, stage: Stage, done: usize, total: usize) {
        if let Some(tx) = &self.0 {
            // receiver gone means nobody is listening any more
            let _ = tx.send(StageReport { stage, done, total });
        }
    }
}

/// Everything a mapping run needs, fully materialized.
#[derive(Debug)]
pub struct PipelineInput {
    pub options: Options,
    /// Pricing region, e.g. `US West`.
    pub region: String,
    pub currency: String,
    pub vm_specs: Vec<VmSpecRaw>,
    pub override_specs: Option<Vec<OverrideSpecRaw>>,
    /// Already filtered to the included series.
    pub catalog: Vec<VmSize>,
    pub rates: RateCalc,
}

#[derive(Debug)]
pub struct PipelineOutput {
    pub results: Vec<MappingResult>,
    pub validated_overrides: Option<Vec<OverrideSpec>>,
    pub generated_overrides: Vec<OverrideSpec>,
    pub mapping_sheet: Vec<Vec<String>>,
    pub override_sheet: Vec<Vec<String>>,
    pub validated_override_sheet: Option<Vec<Vec<String>>>,
}

impl PipelineOutput {
    pub fn mapped_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.projected.vm_size.is_some())
            .count()
    }
}

/// Validate, map, price and dedupe one batch. Nothing is returned on
/// cancellation or on a fatal error.
#[tracing::instrument(level = "info", skip_all, fields(vms = input.vm_specs.len(), region = %input.region))]
pub fn run(
    input: &PipelineInput,
    progress: &Progress,
    cancel: &CancelFlag,
) -> Result<PipelineOutput, PipelineError> {
    let opts = &input.options;
    if input.vm_specs.is_empty() {
        return Err(PipelineError::NoInput);
    }
    if input.catalog.is_empty() {
        return Err(PipelineError::EmptyCatalog);
    }
    if input.rates.is_empty() {
        return Err(PipelineError::EmptyRateCard);
    }
    let in_gb = opts.memory_unit.is_gb();

    // ─── 1) validate override sheet ──────────────────────────────────
    let validated_overrides = match &input.override_specs {
        Some(rows) => {
            cancel.check()?;
            let total = rows.len();
            let specs: Vec<OverrideSpec> = rows
                .iter()
                .cloned()
                .map(|raw| {
                    validate_override_spec(raw, in_gb, &opts.windows_keywords, &opts.linux_keywords)
                })
                .collect();
            let invalid = specs.iter().filter(|s| !s.is_valid).count();
            if invalid > 0 {
                warn!(invalid, total, "override rows failed validation and are ignored");
            }
            progress.report(Stage::ValidateOverrides, total, total);
            Some(specs)
        }
        None => None,
    };

    // ─── 2) validate VM specs ────────────────────────────────────────
    cancel.check()?;
    let total = input.vm_specs.len();
    let mut results: Vec<MappingResult> = input
        .vm_specs
        .iter()
        .cloned()
        .map(|raw| {
            MappingResult::new(validate_vm_spec(
                raw,
                in_gb,
                &opts.windows_keywords,
                &opts.linux_keywords,
            ))
        })
        .collect();
    let valid = results.iter().filter(|r| r.spec.is_valid).count();
    info!(valid, invalid = total - valid, "validated VM specs");
    progress.report(Stage::Validate, total, total);

    // ─── 3) storage ──────────────────────────────────────────────────
    cancel.check()?;
    for r in results.iter_mut().filter(|r| r.spec.is_valid) {
        map_storage(r, &opts.os_disk_ssd, &opts.os_disk_hdd)?;
    }
    progress.report(Stage::MapStorage, total, total);

    // ─── 4) project ──────────────────────────────────────────────────
    cancel.check()?;
    let ctx = ProjectionContext {
        region: &input.region,
        catalog: &input.catalog,
        rates: &input.rates,
        core_coefficient: opts.core_coefficient,
        memory_coefficient: opts.memory_coefficient,
    };
    let overrides = validated_overrides.as_deref();
    for r in results.iter_mut().filter(|r| r.spec.is_valid) {
        project(r, &ctx, overrides);
    }
    progress.report(Stage::Project, total, total);

    // ─── 5) estimate ─────────────────────────────────────────────────
    cancel.check()?;
    for r in results.iter_mut().filter(|r| r.spec.is_valid) {
        aggregate(r, &input.region, &input.rates, opts.hours_per_month)?;
    }
    progress.report(Stage::Estimate, total, total);

    // ─── 6) dedupe ───────────────────────────────────────────────────
    cancel.check()?;
    let generated_overrides = dedupe(&results, &ctx);
    progress.report(Stage::Dedupe, generated_overrides.len(), generated_overrides.len());

    // ─── 7) render ───────────────────────────────────────────────────
    cancel.check()?;
    let unit = opts.memory_unit;
    let mut mapping_sheet = Vec::with_capacity(results.len() + 1);
    mapping_sheet.push(unload::mapping_header(unit, &input.currency));
    mapping_sheet.extend(results.iter().map(|r| unload::mapping_row(r, unit)));

    let mut override_sheet = Vec::with_capacity(generated_overrides.len() + 1);
    override_sheet.push(unload::unique_overrides_header(unit));
    override_sheet.extend(
        generated_overrides
            .iter()
            .map(|o| unload::unique_override_row(o, unit)),
    );

    let validated_override_sheet = validated_overrides.as_ref().map(|specs| {
        let mut sheet = Vec::with_capacity(specs.len() + 1);
        sheet.push(unload::validated_overrides_header(unit));
        sheet.extend(specs.iter().map(|o| unload::validated_override_row(o, unit)));
        sheet
    });
    progress.report(Stage::Render, 1, 1);

    let output = PipelineOutput {
        results,
        validated_overrides,
        generated_overrides,
        mapping_sheet,
        override_sheet,
        validated_override_sheet,
    };
    info!(
        mapped = output.mapped_count(),
        unique = output.generated_overrides.len(),
        "mapping complete"
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Meter, VmField};
    use std::collections::BTreeMap;
    use tokio::sync::mpsc;

    fn raw(cells: [&str; 11]) -> VmSpecRaw {
        let mut raw = VmSpecRaw::default();
        for (f, c) in VmField::DEFAULT_SEQUENCE.iter().zip(cells) {
            raw.set(*f, c.to_string());
        }
        raw
    }

    fn input() -> PipelineInput {
        let meter = |category: &str, sub: &str, name: &str, rate: f64| Meter {
            category: category.into(),
            subcategory: sub.into(),
            name: name.into(),
            region: "US West".into(),
            rates: BTreeMap::from([("0".to_string(), rate)]),
            ..Meter::default()
        };
        PipelineInput {
            options: Options::default(),
            region: "US West".into(),
            currency: "USD".into(),
            vm_specs: vec![
                raw(["a", "Linux", "2", "4", "", "", "", "", "100", "", ""]),
                raw(["", "Linux", "2", "4", "", "", "", "", "", "", ""]),
            ],
            override_specs: None,
            catalog: vec![VmSize {
                name: "Standard_D2_v2".into(),
                number_of_cores: 2,
                os_disk_size_in_mb: 0,
                resource_disk_size_in_mb: 0,
                memory_in_mb: 7168.0,
                max_data_disk_count: 8,
            }],
            rates: RateCalc::new(vec![
                meter("Virtual Machines", "Standard_D2_v2 VM", "Compute Hours", 0.1),
                meter("Storage", "Locally Redundant", "Standard Managed Disk/S4 (Units)", 1.5),
            ]),
        }
    }

    #[test]
    fn runs_all_stages_and_reports_progress() -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let out = run(&input(), &Progress::new(tx), &CancelFlag::new())?;
        assert_eq!(out.results.len(), 2);
        assert_eq!(out.mapped_count(), 1);
        assert_eq!(out.mapping_sheet.len(), 3);
        assert_eq!(out.mapping_sheet[1][13], "Standard_D2_v2");
        assert_eq!(out.mapping_sheet[1][19], "75.9");
        assert_eq!(out.mapping_sheet[2][11], "No");
        assert_eq!(out.override_sheet.len(), 2);
        assert!(out.validated_override_sheet.is_none());

        let mut stages = Vec::new();
        while let Ok(report) = rx.try_recv() {
            stages.push(report.stage);
        }
        assert_eq!(
            stages,
            vec![
                Stage::Validate,
                Stage::MapStorage,
                Stage::Project,
                Stage::Estimate,
                Stage::Dedupe,
                Stage::Render,
            ]
        );
        Ok(())
    }

    #[test]
    fn reports_once_per_stage_regardless_of_batch_size() -> anyhow::Result<()> {
        let mut input = input();
        let row = input.vm_specs[0].clone();
        input.vm_specs = vec![row; 50];
        input.override_specs = Some(Vec::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        run(&input, &Progress::new(tx), &CancelFlag::new())?;

        let mut reports = Vec::new();
        while let Ok(report) = rx.try_recv() {
            reports.push(report);
        }
        assert_eq!(reports.len(), 7);
        assert_eq!(reports[0].stage, Stage::ValidateOverrides);
        assert_eq!(
            reports[1],
            StageReport {
                stage: Stage::Validate,
                done: 50,
                total: 50
            }
        );
        Ok(())
    }

    #[test]
    fn cancelled_run_returns_nothing() {
        let cancel = CancelFlag::new();
        cancel.cancel();
        let err = run(&input(), &Progress::silent(), &cancel).unwrap_err();
        assert!(matches!(err, PipelineError::Cancelled));
    }

    #[test]
    fn fatal_preconditions() {
        let mut empty = input();
        empty.vm_specs.clear();
        assert!(matches!(
            run(&empty, &Progress::silent(), &CancelFlag::new()),
            Err(PipelineError::NoInput)
        ));

        let mut no_catalog = input();
        no_catalog.catalog.clear();
        assert!(matches!(
            run(&no_catalog, &Progress::silent(), &CancelFlag::new()),
            Err(PipelineError::EmptyCatalog)
        ));

        let mut bad_disk = input();
        bad_disk.options.os_disk_hdd = "S99".into();
        assert!(matches!(
            run(&bad_disk, &Progress::silent(), &CancelFlag::new()),
            Err(PipelineError::UnknownOsDisk(_))
        ));
    }

    #[test]
    fn unpriced_disk_aborts_the_batch() {
        let mut input = input();
        input.vm_specs[0].hdd_storage_gb = "100".into();
        let err = run(&input, &Progress::silent(), &CancelFlag::new()).unwrap_err();
        assert!(matches!(err, PipelineError::Rate(_)));
    }
}

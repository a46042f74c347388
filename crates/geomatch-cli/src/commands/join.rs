use crate::cli::JoinArgs;
use crate::io::{self, JoinLayout};
use crate::output::OutputWriter;
use crate::output_types::JoinOutput;
use crate::progress;
use anyhow::{bail, Result};
use geomatch_core::config::{parse_policy, CliConfigOverrides, LayeredConfig};
use geomatch_core::engine;
use geomatch_core::index::SpatialIndex;
use geomatch_core::store::{ColumnSpec, RecordStore};

pub fn execute(args: JoinArgs, output: &OutputWriter) -> Result<()> {
    let delimiter = io::delimiter_byte(args.delimiter)?;

    // Layered configuration: defaults < file < environment < CLI
    let mut config = LayeredConfig::with_defaults();
    if let Some(path) = &args.config {
        config = config.load_from_file(path)?;
    }
    let mode = args.mode.as_deref().map(parse_policy).transpose()?;
    let config = config.load_from_env().apply_cli_overrides(CliConfigOverrides {
        northing_column: args.northing_column.clone(),
        easting_column: args.easting_column.clone(),
        distance: args.distance,
        mode,
    });

    // Per-layer column names, with the layer-specific flags on top
    let source_spec = ColumnSpec::new(
        args.source_northing_column.unwrap_or_else(|| config.northing_column.value.clone()),
        args.source_easting_column.unwrap_or_else(|| config.easting_column.value.clone()),
    );
    let target_spec = ColumnSpec::new(
        args.target_northing_column.unwrap_or_else(|| config.northing_column.value.clone()),
        args.target_easting_column.unwrap_or_else(|| config.easting_column.value.clone()),
    );

    // All configuration problems surface before any file is touched
    let match_config = config.into_match_config()?;

    if !output.is_json() {
        output.section("Join");
        output.kv("Source", args.source.display());
        output.kv("Target", args.target.display());
        output.kv("Distance", match_config.threshold);
        output.kv("Mode", match_config.policy);
    }

    let source_table = io::read_table(&args.source, delimiter)?;
    let target_table = io::read_table(&args.target, delimiter)?;

    let source_columns = source_spec.resolve(&source_table.header)?;
    let target_columns = target_spec.resolve(&target_table.header)?;

    let layout = JoinLayout::new(
        &target_table.header,
        target_columns,
        &source_table.header,
        source_columns,
        args.key.as_deref(),
    );
    if let Some(key) = &args.key {
        if layout.appended_columns() == 0 {
            bail!("Key '{}' does not match any column of {}", key, args.source.display());
        }
    }

    let sources = RecordStore::load(source_table.rows, source_columns);
    let targets = RecordStore::load(target_table.rows, target_columns);

    if sources.skipped() > 0 {
        output.warning(format!("Skipped {} malformed source row(s)", sources.skipped()));
    }
    if targets.skipped() > 0 {
        output.warning(format!("Skipped {} malformed target row(s)", targets.skipped()));
    }

    if !output.is_json() {
        output.info(format!("Indexing {} source entries...", sources.len()));
    }
    let index = SpatialIndex::build(&sources);

    let bar = progress::create_progress_bar(targets.len() as u64, "Matching target entries");
    let report = engine::match_all_with_progress(&targets, &index, &match_config, |done, _| {
        bar.set_position(done as u64);
    })?;
    progress::finish_success(
        &bar,
        &format!("Matched {} of {} targets", report.stats.matched_targets, report.stats.targets),
    );

    io::write_results(&args.output, delimiter, &layout, &targets, &sources, &report.results)?;

    if output.is_json() {
        output.result(JoinOutput {
            output_path: args.output.display().to_string(),
            source_rows: sources.len(),
            source_skipped: sources.skipped(),
            target_rows: targets.len(),
            target_skipped: targets.skipped(),
            stats: report.stats,
        })?;
    } else {
        output.section("Summary");
        output.kv(
            "Source rows",
            format!("{} loaded, {} skipped", sources.len(), sources.skipped()),
        );
        output.kv(
            "Target rows",
            format!("{} loaded, {} skipped", targets.len(), targets.skipped()),
        );
        output.kv("Matched targets", report.stats.matched_targets);
        output.kv("Unmatched targets", report.stats.unmatched_targets);
        output.kv("Pairs written", report.stats.pairs);
        output.success(format!("Results written to {}", args.output.display()));
    }

    Ok(())
}

//! `shapemock generate` command.

use crate::cli::SourceArgs;
use crate::context::ServiceContext;
use crate::pipeline::Pipeline;
use crate::structure::diff::format_diff;

/// Execute the `generate` command.
///
/// Runs one incremental pass and writes `structure.json` and `mock.json`,
/// even when `--no-mock-file` or `mockFile: false` is set.
///
/// # Errors
///
/// Returns an error string if options, scanning or writing fail.
pub fn run(ctx: ServiceContext, source: &SourceArgs) -> Result<(), String> {
    let mut options = super::load_options(ctx.fs.as_ref(), source)?;
    options.mock_file = true;

    let mut pipeline = Pipeline::new(ctx, options).map_err(|e| e.to_string())?;
    let report = pipeline.refresh().map_err(|e| e.to_string())?;

    print!("{}", format_diff(&report.diff));
    println!(
        "{} endpoint(s), {} mock record(s) in {}",
        pipeline.structure().len(),
        pipeline.mocks().len(),
        pipeline.mock_dir().display(),
    );
    Ok(())
}

//! `shapemock diff` command.

use crate::cli::SourceArgs;
use crate::context::ServiceContext;
use crate::pipeline::Pipeline;
use crate::structure::diff::format_diff;

/// Execute the `diff` command.
///
/// Compares the current sources with the persisted `structure.json` and
/// prints added, changed and removed URLs. Nothing is written.
///
/// # Errors
///
/// Returns an error string if options or scanning fail.
pub fn run(ctx: ServiceContext, source: &SourceArgs) -> Result<(), String> {
    let mut options = super::load_options(ctx.fs.as_ref(), source)?;
    options.mock_file = true;

    let pipeline = Pipeline::new(ctx, options).map_err(|e| e.to_string())?;
    let diff = pipeline.preview().map_err(|e| e.to_string())?;
    print!("{}", format_diff(&diff));
    Ok(())
}

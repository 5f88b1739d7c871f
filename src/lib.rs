// THEORY:
// This file is the main entry point for the `emissive_mask` library crate.
// Each binary under `src/bin/` is a one-shot filter (load texture, classify
// every pixel, optionally blur, write the mask). They all share the single
// pipeline exported here and differ only in the `Variant` they hand to it.
//
// The per-pixel logic lives in `core_modules` (pixel heuristics and the five
// classification policies), the file I/O in `core_modules::image_helper`, and
// the orchestration in `pipeline`.

pub mod core_modules;
pub mod error;
pub mod pipeline;

pub use error::{EmissiveError, Result};
pub use pipeline::{
    report_outcome, run_variant, run_variant_in, EmissivePipeline, PipelineConfig, Report, Variant,
};

/// Initializes the `env_logger` backend for the binaries.
///
/// Defaults to `info`; `RUST_LOG` overrides it as usual.
pub fn init_logger() {
    use std::io::Write;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            writeln!(
                buf,
                "[{style}{}{style:#} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

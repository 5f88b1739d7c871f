// THEORY:
// The `pipeline` module is the top-level API. Every mask filter has the same
// three stages (load, classify, blur+save); the only things that change between
// them are the file paths, the blur sigma and the classification policy. Those
// are bundled into a `Variant`, and one `EmissivePipeline` runs any of them.
//
// The two file-bound stages run on tokio's blocking pool so the async caller is
// never stalled by decode or encode. Classification happens in between on the
// buffer the loader handed over, in place. Nothing is written until the whole
// mask has been computed.

use crate::core_modules::image_helper::image_helper::{self, RawImage};
use crate::core_modules::policy::{
    classify_buffer, EmissivePolicy, IcePolicy, MaskStats, MythicPolicy, VoidLumaPolicy,
    VoidNeonPolicy, VoidVibrantPolicy,
};
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Where a filter reads from, where it writes to, and how much it blurs.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// `None` skips the blur stage entirely.
    pub blur_sigma: Option<f32>,
}

impl PipelineConfig {
    /// Resolves both paths against `root`. Absolute paths are left alone.
    pub fn with_root(self, root: &Path) -> Self {
        Self {
            input_path: root.join(self.input_path),
            output_path: root.join(self.output_path),
            ..self
        }
    }
}

/// The five shipped mask filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Ice,
    Mythic,
    VoidV1,
    VoidV5,
    VoidV10,
}

impl Variant {
    pub const ALL: [Variant; 5] = [
        Variant::Ice,
        Variant::Mythic,
        Variant::VoidV1,
        Variant::VoidV5,
        Variant::VoidV10,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Variant::Ice => "ice",
            Variant::Mythic => "mythic",
            Variant::VoidV1 => "void-v1",
            Variant::VoidV5 => "void-v5",
            Variant::VoidV10 => "void-v10",
        }
    }

    /// Paths are relative to the working directory the binary is started from.
    pub fn config(&self) -> PipelineConfig {
        let (input, output, blur_sigma) = match self {
            Variant::Ice => ("Emissive/texture.jpg", "Emissive/emissive-ice.png", None),
            Variant::Mythic => (
                "Emissive/texture.jpeg",
                "Emissive/emissive-mythic.png",
                Some(3.0),
            ),
            Variant::VoidV1 => ("Emissive/texture.png", "Emissive/emissive-void.png", Some(0.5)),
            Variant::VoidV5 => ("Emissive/texture.png", "Emissive/emissive-void.png", None),
            Variant::VoidV10 => ("Emissive/texture.png", "Emissive/emissive-void.png", Some(1.0)),
        };
        PipelineConfig {
            input_path: PathBuf::from(input),
            output_path: PathBuf::from(output),
            blur_sigma,
        }
    }

    pub fn policy(&self) -> Box<dyn EmissivePolicy + Send + Sync> {
        match self {
            Variant::Ice => Box::new(IcePolicy::default()),
            Variant::Mythic => Box::new(MythicPolicy::default()),
            Variant::VoidV1 => Box::new(VoidNeonPolicy::default()),
            Variant::VoidV5 => Box::new(VoidVibrantPolicy::default()),
            Variant::VoidV10 => Box::new(VoidLumaPolicy::default()),
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub output_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub stats: MaskStats,
}

/// One configured load → classify → blur → save pass.
pub struct EmissivePipeline {
    config: PipelineConfig,
    policy: Box<dyn EmissivePolicy + Send + Sync>,
}

impl EmissivePipeline {
    pub fn new(config: PipelineConfig, policy: Box<dyn EmissivePolicy + Send + Sync>) -> Self {
        Self { config, policy }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub async fn run(&self) -> Result<Report> {
        // Stage 1: Load
        let input_path = self.config.input_path.clone();
        let mut raw = tokio::task::spawn_blocking(move || image_helper::load(&input_path)).await??;
        log::info!(
            "loaded {} ({}x{})",
            self.config.input_path.display(),
            raw.width,
            raw.height
        );

        // Stage 2: Classify
        let stats = classify_buffer(&mut raw.buffer, self.policy.as_ref())?;
        log::debug!(
            "{} of {} pixels emissive ({:.2}%)",
            stats.emissive_pixels,
            stats.total_pixels,
            stats.coverage() * 100.0
        );

        // Stage 3: Blur and save
        let (width, height) = (raw.width, raw.height);
        let output_path = self.config.output_path.clone();
        let blur_sigma = self.config.blur_sigma;
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mask: RawImage = match blur_sigma {
                Some(sigma) => image_helper::blur(raw, sigma)?,
                None => raw,
            };
            image_helper::save(&output_path, &mask)
        })
        .await??;

        Ok(Report {
            output_path: self.config.output_path.clone(),
            width,
            height,
            stats,
        })
    }
}

/// Entry point shared by the binaries: runs `variant` against the working directory.
pub async fn run_variant(variant: Variant) {
    run_variant_in(variant, Path::new("")).await;
}

/// Runs `variant` with its paths resolved under `root` and returns the logged outcome.
///
/// Failures are logged, never propagated: a missing texture or a broken file
/// ends the run but the process still exits cleanly.
pub async fn run_variant_in(variant: Variant, root: &Path) -> String {
    let pipeline = EmissivePipeline::new(variant.config().with_root(root), variant.policy());
    log::info!(
        "running {} mask filter on {}",
        variant.name(),
        pipeline.config().input_path.display()
    );

    report_outcome(variant, pipeline.run().await)
}

/// Logs the result of a run at the matching level and returns the message.
pub fn report_outcome(variant: Variant, outcome: Result<Report>) -> String {
    match outcome {
        Ok(report) => {
            let message = format!(
                "wrote {} ({}x{}, {:.2}% emissive)",
                report.output_path.display(),
                report.width,
                report.height,
                report.stats.coverage() * 100.0
            );
            log::info!("{message}");
            message
        }
        Err(err) if err.is_missing_input() => {
            let message = format!("{} mask skipped: {err}", variant.name());
            log::warn!("{message}");
            message
        }
        Err(err) => {
            let message = format!("{} mask failed: {:#}", variant.name(), anyhow::Error::from(err));
            log::error!("{message}");
            message
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::image_helper::image_helper::{load, save};
    use crate::error::EmissiveError;

    fn write_texture(path: &Path, width: u32, height: u32, pixels: &[[u8; 3]]) {
        let mut buffer = Vec::with_capacity((width * height * 3) as usize);
        for index in 0..(width * height) as usize {
            buffer.extend_from_slice(&pixels[index % pixels.len()]);
        }
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        save(path, &RawImage::new(width, height, buffer).unwrap()).unwrap();
    }

    #[test]
    fn variant_configs_match_file_table() {
        let ice = Variant::Ice.config();
        assert_eq!(ice.input_path, PathBuf::from("Emissive/texture.jpg"));
        assert_eq!(ice.output_path, PathBuf::from("Emissive/emissive-ice.png"));
        assert_eq!(ice.blur_sigma, None);

        let mythic = Variant::Mythic.config();
        assert_eq!(mythic.input_path, PathBuf::from("Emissive/texture.jpeg"));
        assert_eq!(mythic.blur_sigma, Some(3.0));

        assert_eq!(Variant::VoidV1.config().blur_sigma, Some(0.5));
        assert_eq!(Variant::VoidV5.config().blur_sigma, None);
        assert_eq!(Variant::VoidV10.config().blur_sigma, Some(1.0));
        for variant in [Variant::VoidV1, Variant::VoidV5, Variant::VoidV10] {
            let config = variant.config();
            assert_eq!(config.input_path, PathBuf::from("Emissive/texture.png"));
            assert_eq!(config.output_path, PathBuf::from("Emissive/emissive-void.png"));
        }
    }

    #[test]
    fn with_root_rebases_both_paths() {
        let config = Variant::Ice.config().with_root(Path::new("/tmp/work"));
        assert_eq!(config.input_path, PathBuf::from("/tmp/work/Emissive/texture.jpg"));
        assert_eq!(config.output_path, PathBuf::from("/tmp/work/Emissive/emissive-ice.png"));
        assert_eq!(config.blur_sigma, None);
    }

    #[tokio::test]
    async fn missing_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        for variant in Variant::ALL {
            let config = variant.config().with_root(dir.path());
            let pipeline = EmissivePipeline::new(config.clone(), variant.policy());

            let err = pipeline.run().await.unwrap_err();

            assert!(err.is_missing_input());
            assert!(err.to_string().contains(&config.input_path.display().to_string()));
            assert!(!config.output_path.exists());
        }
    }

    #[tokio::test]
    async fn ice_mask_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            input_path: dir.path().join("Emissive/texture.png"),
            output_path: dir.path().join("Emissive/emissive-ice.png"),
            blur_sigma: None,
        };
        write_texture(&config.input_path, 4, 2, &[[255, 255, 255], [40, 80, 120]]);

        let report = EmissivePipeline::new(config.clone(), Variant::Ice.policy())
            .run()
            .await
            .unwrap();

        assert_eq!((report.width, report.height), (4, 2));
        assert_eq!(report.stats.total_pixels, 8);
        assert_eq!(report.stats.emissive_pixels, 4);

        let mask = load(&config.output_path).unwrap();
        assert_eq!(mask.buffer.len(), 4 * 2 * 3);
        for (index, triple) in mask.buffer.chunks_exact(3).enumerate() {
            let expected: &[u8] = if index % 2 == 0 { &[0, 191, 255] } else { &[0, 0, 0] };
            assert_eq!(triple, expected);
        }
    }

    #[tokio::test]
    async fn luma_mask_is_blurred_at_source_size() {
        let dir = tempfile::tempdir().unwrap();
        let config = Variant::VoidV10.config().with_root(dir.path());
        write_texture(&config.input_path, 16, 9, &[[30, 30, 30]]);
        let mut texture = load(&config.input_path).unwrap();
        let center = ((4 * 16 + 8) * 3) as usize;
        texture.buffer[center..center + 3].copy_from_slice(&[250, 250, 250]);
        save(&config.input_path, &texture).unwrap();

        let report = EmissivePipeline::new(config.clone(), Variant::VoidV10.policy())
            .run()
            .await
            .unwrap();
        assert_eq!(report.stats.emissive_pixels, 1);

        let mask = load(&config.output_path).unwrap();
        assert_eq!((mask.width, mask.height), (16, 9));
        assert!(mask.buffer[center] < 250);
        assert!(mask.buffer[center + 3] > 0);
        assert_eq!(&mask.buffer[0..3], &[0, 0, 0]);
    }

    #[tokio::test]
    async fn rerun_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let config = Variant::Mythic.config().with_root(dir.path());
        let palette = [[100, 80, 100], [0, 100, 255], [128, 128, 128], [20, 220, 250]];
        write_texture(&config.input_path, 12, 10, &palette);
        let pipeline = EmissivePipeline::new(config.clone(), Variant::Mythic.policy());

        pipeline.run().await.unwrap();
        let first = std::fs::read(&config.output_path).unwrap();
        pipeline.run().await.unwrap();
        let second = std::fs::read(&config.output_path).unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn undecodable_input_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let config = Variant::VoidV5.config().with_root(dir.path());
        std::fs::create_dir_all(config.input_path.parent().unwrap()).unwrap();
        std::fs::write(&config.input_path, b"definitely not a png").unwrap();

        let err = EmissivePipeline::new(config.clone(), Variant::VoidV5.policy())
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, EmissiveError::Decode { .. }));
        assert!(!config.output_path.exists());
    }

    #[tokio::test]
    async fn run_variant_names_missing_texture() {
        let dir = tempfile::tempdir().unwrap();
        for variant in Variant::ALL {
            let config = variant.config().with_root(dir.path());

            let message = run_variant_in(variant, dir.path()).await;

            assert!(message.contains(variant.name()));
            assert!(message.contains(&config.input_path.display().to_string()));
            assert!(!config.output_path.exists());
        }
    }

    #[tokio::test]
    async fn run_variant_reports_written_mask() {
        let dir = tempfile::tempdir().unwrap();
        let config = Variant::VoidV5.config().with_root(dir.path());
        write_texture(&config.input_path, 3, 3, &[[100, 50, 160], [10, 10, 10]]);

        let message = run_variant_in(Variant::VoidV5, dir.path()).await;

        assert!(message.starts_with("wrote "));
        assert!(message.contains(&config.output_path.display().to_string()));
        assert!(message.contains("3x3"));
        assert_eq!(load(&config.output_path).unwrap().buffer.len(), 3 * 3 * 3);
    }

    #[test]
    fn report_outcome_renders_error_chain() {
        let err = EmissiveError::Decode {
            path: PathBuf::from("Emissive/texture.png"),
            source: image::ImageError::IoError(std::io::Error::other("truncated stream")),
        };

        let message = report_outcome(Variant::VoidV10, Err(err));

        assert!(message.starts_with("void-v10 mask failed"));
        assert!(message.contains("Emissive/texture.png"));
        assert!(message.contains("truncated stream"));
    }
}

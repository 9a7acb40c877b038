//! GPU parameters and installed-font detection

use async_trait::async_trait;

use super::{SignalProbe, require};
use crate::collector::environment::{Capability, Environment, GpuInfo};
use crate::collector::signal::ProbeUnavailable;

/// Generic families a candidate font is measured against
pub const FONT_BASELINES: [&str; 3] = ["monospace", "serif", "sans-serif"];

/// 宽字符与窄字符混合，不同字体的宽度差异更明显
const FONT_SAMPLE_TEXT: &str = "mmmmmmmmmmlli";

const FONT_CANDIDATES: &[&str] = &[
    "Arial",
    "Arial Black",
    "Calibri",
    "Cambria",
    "Comic Sans MS",
    "Consolas",
    "Courier New",
    "DejaVu Sans",
    "Fira Code",
    "Georgia",
    "Helvetica",
    "Helvetica Neue",
    "Impact",
    "Liberation Serif",
    "Lucida Console",
    "Menlo",
    "Microsoft YaHei",
    "Noto Sans",
    "PingFang SC",
    "Roboto",
    "Segoe UI",
    "SimSun",
    "Tahoma",
    "Times New Roman",
    "Trebuchet MS",
    "Ubuntu",
    "Verdana",
];

pub struct GpuProbe;

#[async_trait]
impl SignalProbe for GpuProbe {
    type Output = GpuInfo;

    fn name(&self) -> &'static str {
        "gpu"
    }

    async fn read(&self, env: &dyn Environment) -> Result<GpuInfo, ProbeUnavailable> {
        require(env, Capability::Gpu, "GPU context")?;
        env.gpu()
            .ok_or_else(|| ProbeUnavailable::failed("GPU context could not be created"))
    }
}

/// Installed fonts, detected by offscreen text measurement
pub struct FontProbe {
    candidates: Vec<String>,
}

impl Default for FontProbe {
    fn default() -> Self {
        Self::with_candidates(FONT_CANDIDATES.iter().map(|f| f.to_string()).collect())
    }
}

impl FontProbe {
    pub fn with_candidates(candidates: Vec<String>) -> Self {
        Self { candidates }
    }

    /// A font is installed iff its measurement differs from the bare
    /// baseline for at least one generic family
    fn is_installed(env: &dyn Environment, font: &str, baselines: &[(&str, f64)]) -> bool {
        baselines.iter().any(|(generic, baseline_width)| {
            env.measure_text(&format!("'{}', {}", font, generic), FONT_SAMPLE_TEXT)
                .is_some_and(|width| (width - baseline_width).abs() > f64::EPSILON)
        })
    }
}

#[async_trait]
impl SignalProbe for FontProbe {
    type Output = Vec<String>;

    fn name(&self) -> &'static str {
        "fonts"
    }

    async fn read(&self, env: &dyn Environment) -> Result<Vec<String>, ProbeUnavailable> {
        require(env, Capability::FontMeasurement, "text measurement")?;

        let baselines: Vec<(&str, f64)> = FONT_BASELINES
            .iter()
            .filter_map(|generic| {
                env.measure_text(generic, FONT_SAMPLE_TEXT)
                    .map(|width| (*generic, width))
            })
            .collect();
        if baselines.is_empty() {
            return Err(ProbeUnavailable::failed("baseline fonts could not be measured"));
        }

        Ok(self
            .candidates
            .iter()
            .filter(|font| Self::is_installed(env, font, &baselines))
            .cloned()
            .collect())
    }
}

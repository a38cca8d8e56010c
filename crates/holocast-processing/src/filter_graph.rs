//! Filter-graph construction: maps base dimensions and hologram settings
//! to the ordered stage pipeline the compositor executes.
//!
//! The builder is a pure function. Stage order is fixed: scale, tint,
//! transparency, glow, scanlines, flicker, composite. Reordering changes
//! the visual result, so each optional stage re-points the running label
//! instead of branching the chain (the glow split being the one
//! deliberate fork, merged immediately).

use holocast_core::models::HologramSettings;
use serde::Serialize;
use thiserror::Error;

/// ffmpeg stream selector for the base video input.
pub const BASE_INPUT_LABEL: &str = "0:v";
/// ffmpeg stream selector for the overlay media input.
pub const OVERLAY_INPUT_LABEL: &str = "1:v";

/// Label of the composed output stream, mapped by the compositor.
pub const FINAL_OUTPUT_LABEL: &str = "vout";

/// Blue tint bias coefficients (red/green down, blue up).
const TINT_RED_MIDTONES: f64 = -0.3;
const TINT_GREEN_MIDTONES: f64 = -0.2;
const TINT_BLUE_MIDTONES: f64 = 0.5;

/// Flicker attenuates alpha by at most this factor at full intensity.
const FLICKER_ALPHA_WEIGHT: f64 = 0.3;

const MIN_GLOW_RADIUS: u32 = 2;
const MIN_SCANLINE_SPACING: u32 = 2;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Base video dimensions must be positive (got {width}x{height})")]
    NonPositiveBase { width: u32, height: u32 },

    #[error(
        "Overlay size {size} yields a {width}x{height}px overlay; both dimensions must be at least 1px"
    )]
    DegenerateOverlay { width: u32, height: u32, size: f64 },
}

/// A single transform in the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FilterOp {
    /// Resize the overlay to its computed pixel dimensions.
    Scale { width: u32, height: u32 },
    /// Shift color balance midtones toward blue.
    ColorBalance { rm: f64, gm: f64, bm: f64 },
    /// Force an alpha channel and multiply it uniformly.
    Transparency { alpha: f64 },
    /// Fork the stream into a halo source and a sharp pass-through.
    Split,
    /// Blur the halo source.
    BoxBlur { radius: u32 },
    /// Merge the sharp branch back on top of the blurred halo.
    Merge,
    /// Horizontal translucent cyan lines at a fixed spacing.
    DrawGrid { spacing: u32 },
    /// Constant alpha attenuation; RGB channels untouched.
    FlickerAlpha { alpha: f64 },
    /// Place the finished overlay onto the base video for its whole duration.
    Composite { x: u32, y: u32 },
}

/// Format a coefficient the way ffmpeg expects: plain decimal, no
/// exponent, trailing zeros trimmed. Deterministic for equal inputs.
fn fmt_coeff(value: f64) -> String {
    let rendered = format!("{:.6}", value);
    let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

impl FilterOp {
    /// Render the ffmpeg filter expression (without stream labels).
    pub fn render(&self) -> String {
        match self {
            FilterOp::Scale { width, height } => format!("scale={}:{}", width, height),
            FilterOp::ColorBalance { rm, gm, bm } => format!(
                "colorbalance=rm={}:gm={}:bm={}",
                fmt_coeff(*rm),
                fmt_coeff(*gm),
                fmt_coeff(*bm)
            ),
            FilterOp::Transparency { alpha } => {
                format!("format=rgba,colorchannelmixer=aa={}", fmt_coeff(*alpha))
            }
            FilterOp::Split => "split".to_string(),
            FilterOp::BoxBlur { radius } => format!("boxblur={}:1", radius),
            FilterOp::Merge => "overlay".to_string(),
            FilterOp::DrawGrid { spacing } => {
                format!("drawgrid=w=iw:h={}:t=1:c=cyan@0.3", spacing)
            }
            FilterOp::FlickerAlpha { alpha } => {
                format!("colorchannelmixer=aa={}", fmt_coeff(*alpha))
            }
            FilterOp::Composite { x, y } => format!("overlay={}:{}:enable='gte(t,0)'", x, y),
        }
    }
}

/// One element of the pipeline: named inputs, the operation, named outputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterStage {
    pub inputs: Vec<String>,
    pub op: FilterOp,
    pub outputs: Vec<String>,
}

impl FilterStage {
    fn new(inputs: &[&str], op: FilterOp, outputs: &[&str]) -> Self {
        FilterStage {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            op,
            outputs: outputs.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn render(&self) -> String {
        let mut rendered = String::new();
        for input in &self.inputs {
            rendered.push('[');
            rendered.push_str(input);
            rendered.push(']');
        }
        rendered.push_str(&self.op.render());
        for output in &self.outputs {
            rendered.push('[');
            rendered.push_str(output);
            rendered.push(']');
        }
        rendered
    }
}

/// The built pipeline plus the computed overlay geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterGraph {
    pub stages: Vec<FilterStage>,
    pub final_label: String,
    pub overlay_width: u32,
    pub overlay_height: u32,
    pub overlay_x: u32,
    pub overlay_y: u32,
}

impl FilterGraph {
    /// Render the `filter_complex` argument for ffmpeg.
    pub fn to_filter_complex(&self) -> String {
        self.stages
            .iter()
            .map(FilterStage::render)
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Build the hologram filter pipeline for the given base dimensions and
/// validated settings. Deterministic: identical inputs yield an identical
/// graph. Fails before any external process is involved when the computed
/// overlay would be degenerate.
pub fn build_filter_graph(
    base_width: u32,
    base_height: u32,
    settings: &HologramSettings,
) -> Result<FilterGraph, GraphError> {
    if base_width == 0 || base_height == 0 {
        return Err(GraphError::NonPositiveBase {
            width: base_width,
            height: base_height,
        });
    }

    let overlay_width = (base_width as f64 * settings.size).floor() as u32;
    let overlay_height = (base_height as f64 * settings.size).floor() as u32;
    if overlay_width == 0 || overlay_height == 0 {
        return Err(GraphError::DegenerateOverlay {
            width: overlay_width,
            height: overlay_height,
            size: settings.size,
        });
    }

    // Anchor the overlay inside the frame; the clamp guards against float
    // fuzz at position 1.0.
    let max_x = base_width - overlay_width;
    let max_y = base_height - overlay_height;
    let overlay_x = ((max_x as f64 * settings.position_x).floor() as u32).min(max_x);
    let overlay_y = ((max_y as f64 * settings.position_y).floor() as u32).min(max_y);

    let mut stages = Vec::new();
    let mut current = "scaled";

    stages.push(FilterStage::new(
        &[OVERLAY_INPUT_LABEL],
        FilterOp::Scale {
            width: overlay_width,
            height: overlay_height,
        },
        &[current],
    ));

    if settings.blue_tint {
        stages.push(FilterStage::new(
            &[current],
            FilterOp::ColorBalance {
                rm: TINT_RED_MIDTONES,
                gm: TINT_GREEN_MIDTONES,
                bm: TINT_BLUE_MIDTONES,
            },
            &["tinted"],
        ));
        current = "tinted";
    }

    // Always emitted, even at alpha 1.0: downstream stages rely on the
    // stream carrying an alpha channel.
    stages.push(FilterStage::new(
        &[current],
        FilterOp::Transparency {
            alpha: settings.transparency,
        },
        &["translucent"],
    ));
    current = "translucent";

    if settings.glow_intensity > 0.0 {
        let radius = ((settings.glow_intensity * 10.0).round() as u32).max(MIN_GLOW_RADIUS);
        stages.push(FilterStage::new(
            &[current],
            FilterOp::Split,
            &["halo_src", "sharp"],
        ));
        stages.push(FilterStage::new(
            &["halo_src"],
            FilterOp::BoxBlur { radius },
            &["halo"],
        ));
        // Sharp branch on top of the blurred halo: soft rim, crisp center.
        stages.push(FilterStage::new(
            &["halo", "sharp"],
            FilterOp::Merge,
            &["haloed"],
        ));
        current = "haloed";
    }

    if settings.scanlines {
        let spacing = (overlay_height / 100).max(MIN_SCANLINE_SPACING);
        stages.push(FilterStage::new(
            &[current],
            FilterOp::DrawGrid { spacing },
            &["scanlined"],
        ));
        current = "scanlined";
    }

    if settings.flicker_intensity > 0.0 {
        let alpha = 1.0 - settings.flicker_intensity * FLICKER_ALPHA_WEIGHT;
        stages.push(FilterStage::new(
            &[current],
            FilterOp::FlickerAlpha { alpha },
            &["flickered"],
        ));
        current = "flickered";
    }

    stages.push(FilterStage::new(
        &[BASE_INPUT_LABEL, current],
        FilterOp::Composite {
            x: overlay_x,
            y: overlay_y,
        },
        &[FINAL_OUTPUT_LABEL],
    ));

    Ok(FilterGraph {
        stages,
        final_label: FINAL_OUTPUT_LABEL.to_string(),
        overlay_width,
        overlay_height,
        overlay_x,
        overlay_y,
    })
}

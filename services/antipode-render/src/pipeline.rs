//! Acquire, match, render and encode one snapshot.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use geo_common::{GeoResult, GridSampleSet, LineGeometry};
use ingestion::{GeometrySource, GridSource};
use metrics::{counter, histogram};
use rayon::prelude::*;
use renderer::png::encode_raster;
use renderer::{composite, OverlayRenderer, OverlayResult, OverlayStyle, RasterProjector};
use symmetry::AntipodeMatcher;
use tracing::{debug, info, instrument, warn};

use crate::config::RenderConfig;
use crate::payload::{png_data_url, RenderPayload};

/// Composition root: sources in, [`RenderPayload`] out.
pub struct RenderPipeline {
    config: RenderConfig,
    grid: Arc<dyn GridSource>,
    geometry: Option<Arc<dyn GeometrySource>>,
    matcher: AntipodeMatcher,
    projector: RasterProjector,
    style: OverlayStyle,
}

impl RenderPipeline {
    /// `geometry` of `None` renders without coastlines.
    pub fn new(
        config: RenderConfig,
        grid: Arc<dyn GridSource>,
        geometry: Option<Arc<dyn GeometrySource>>,
    ) -> Result<Self> {
        config.validate()?;
        let matcher = AntipodeMatcher::new(config.match_config())?;
        let projector = config.layers.iter().fold(
            RasterProjector::new(config.width, config.height)?.with_interpolation(config.interpolation),
            |p, layer| p.with_scale(layer.variable.clone(), layer.scale),
        );
        let style = config.overlay_style()?;
        let geometry = geometry.filter(|_| config.coastline_style.enabled);

        Ok(Self {
            config,
            grid,
            geometry,
            matcher,
            projector,
            style,
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    #[instrument(skip(self), fields(width = self.config.width, height = self.config.height))]
    pub async fn run(&self) -> GeoResult<RenderPayload> {
        let set = self.grid.acquire().await?;
        let lines = self.load_geometry().await;
        self.render(&set, &lines)
    }

    /// Coastline failures degrade to an image without coastlines.
    async fn load_geometry(&self) -> Arc<Vec<LineGeometry>> {
        let Some(source) = &self.geometry else {
            return Arc::default();
        };
        match source.geometry().await {
            Ok(lines) => lines,
            Err(e) => {
                warn!(error = %e, "Coastlines unavailable, rendering without overlay");
                counter!("coastline_failures_total").increment(1);
                Arc::default()
            }
        }
    }

    /// Match once, then project, composite and encode each layer in parallel.
    pub fn render(&self, set: &GridSampleSet, lines: &[LineGeometry]) -> GeoResult<RenderPayload> {
        let report = self.matcher.find_matches(set)?;
        counter!("antipode_matches_total").increment(report.len() as u64);
        counter!("antipode_pairs_compared_total").increment(report.compared as u64);

        let overlay = OverlayRenderer::new(*self.projector.projection()).render(lines);
        counter!("overlay_lines_skipped_total").increment(overlay.skipped as u64);

        let rasters = self
            .config
            .layers
            .par_iter()
            .map(|layer| {
                self.render_layer(set, &layer.variable, &overlay)
                    .map(|url| (layer.variable.clone(), url))
            })
            .collect::<GeoResult<BTreeMap<_, _>>>()?;

        info!(
            timestamp = %set.timestamp(),
            samples = set.len(),
            matches = report.len(),
            unpaired = report.unpaired,
            near_zero_skipped = report.near_zero_skipped,
            missing_value_skipped = report.missing_value_skipped,
            overlay_paths = overlay.paths.len(),
            layers = rasters.len(),
            "Render complete"
        );

        Ok(RenderPayload {
            timestamp: set.timestamp().to_string(),
            matches: report.pairs,
            rasters,
        })
    }

    fn render_layer(&self, set: &GridSampleSet, variable: &str, overlay: &OverlayResult) -> GeoResult<String> {
        let start = Instant::now();

        let mut raster = self.projector.project(set, variable)?;
        composite(&mut raster, overlay, &self.style)?;
        let png = encode_raster(&raster)?;

        let elapsed = start.elapsed();
        histogram!("raster_render_seconds", "variable" => variable.to_string()).record(elapsed.as_secs_f64());
        debug!(
            variable = variable,
            bytes = png.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Encoded layer"
        );

        Ok(png_data_url(&png))
    }
}

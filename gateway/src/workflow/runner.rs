use crate::workflow::config::GatewayConfig;
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use viewpointcore::generation::{GenerationClient, ImageService};
use viewpointcore::map::MapViewport;
use viewpointcore::model::{ArrowSelection, GenerationRequest, GenerationResult, InlineImage, LatLng};
use viewpointcore::preview::PreviewScene;

const OFFLINE_CANVAS: (f64, f64) = (800.0, 600.0);

/// One viewpoint described on the command line.
#[derive(Clone, Debug)]
pub struct OfflineRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub bearing: f64,
    pub length: f64,
    pub zoom: f64,
    pub prompt: Option<String>,
}

pub struct OfflineOutcome {
    pub result: GenerationResult,
    pub image_path: PathBuf,
}

/// Generates a single image without the HTTP layer and writes it to disk.
pub struct Runner<S> {
    config: GatewayConfig,
    client: Arc<GenerationClient<S>>,
}

impl<S: ImageService> Runner<S> {
    pub fn new(config: GatewayConfig, client: Arc<GenerationClient<S>>) -> Self {
        Self { config, client }
    }

    pub fn build_request(&self, offline: &OfflineRequest) -> anyhow::Result<(GenerationRequest, String)> {
        let origin = LatLng::new(offline.latitude, offline.longitude);
        let viewport = MapViewport::new(origin, offline.zoom, OFFLINE_CANVAS.0, OFFLINE_CANVAS.1);
        let selection = ArrowSelection::new(origin, offline.bearing, offline.length);
        let preview = PreviewScene::from_viewport(&viewport, Some(&selection))
            .render_data_url()
            .context("rendering offline map preview")?;

        let request = GenerationRequest {
            prompt: offline.prompt.clone(),
            arrow: Some(selection),
            map: viewport.snapshot(&self.config.style),
        };
        Ok((request, preview))
    }

    pub async fn execute(
        &self,
        offline: &OfflineRequest,
        output_stem: &Path,
    ) -> anyhow::Result<OfflineOutcome> {
        let (request, preview) = self.build_request(offline)?;
        let result = self
            .client
            .generate(&request, Some(&preview))
            .await
            .context("generating offline image")?;

        let image = InlineImage::from_data_url(&result.generated_image)
            .context("generated image is not a base64 data URL")?;
        let bytes = image
            .decode()
            .context("decoding generated image payload")?;
        let image_path = output_stem.with_extension(extension_for(&image.mime_type));
        if let Some(parent) = image_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&image_path, bytes)
            .with_context(|| format!("writing {}", image_path.display()))?;

        Ok(OfflineOutcome { result, image_path })
    }
}

fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        _ => "bin",
    }
}

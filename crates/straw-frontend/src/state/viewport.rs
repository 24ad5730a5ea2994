//! Viewport rendering state

use std::sync::Arc;

use parking_lot::Mutex;

use straw_core::{CaptureRequest, PartLibrary, SceneSubgraph, SnapshotImage};
use straw_renderer::{CaptureError, Renderer, RendererConfig};

/// Render texture for viewport
struct RenderTexture {
    #[allow(dead_code)]
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    egui_texture_id: egui::TextureId,
    width: u32,
    height: u32,
}

/// What a snapshot was taken for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePurpose {
    /// Shown in the order summary
    Review,
    /// Saved as PNG
    Download,
}

/// A finished capture
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    pub request: CaptureRequest,
    pub purpose: CapturePurpose,
    /// `None` when the capture failed
    pub image: Option<SnapshotImage>,
}

/// Viewport rendering state
pub struct ViewportState {
    pub renderer: Renderer,
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
    render_texture: Option<RenderTexture>,
    capture_purpose: Option<CapturePurpose>,
}

impl ViewportState {
    /// Create a new viewport state
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        format: wgpu::TextureFormat,
    ) -> Self {
        let renderer = Renderer::new(&device, &queue, format, 800, 600, RendererConfig::new());
        Self {
            renderer,
            device,
            queue,
            render_texture: None,
            capture_purpose: None,
        }
    }

    /// Ensure the render texture matches the requested size
    pub fn ensure_texture(
        &mut self,
        width: u32,
        height: u32,
        egui_renderer: &mut egui_wgpu::Renderer,
    ) -> egui::TextureId {
        let width = width.max(1);
        let height = height.max(1);

        if let Some(rt) = &self.render_texture {
            if rt.width == width && rt.height == height {
                return rt.egui_texture_id;
            }
        }

        // Free old texture if exists
        if let Some(old) = self.render_texture.take() {
            egui_renderer.free_texture(&old.egui_texture_id);
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Viewport Render Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.renderer.format(),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Register with egui
        let egui_texture_id =
            egui_renderer.register_native_texture(&self.device, &view, wgpu::FilterMode::Linear);

        self.renderer.resize(&self.device, width, height);

        self.render_texture = Some(RenderTexture {
            texture,
            view,
            egui_texture_id,
            width,
            height,
        });

        egui_texture_id
    }

    /// Render the 3D scene to the texture
    pub fn render(&mut self) {
        let Some(ref rt) = self.render_texture else {
            return;
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Viewport Render Encoder"),
            });

        self.renderer.render(&mut encoder, &rt.view, &self.queue);

        self.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Replace the displayed straw
    pub fn set_scene(&mut self, subgraph: Option<&SceneSubgraph>, library: &PartLibrary) {
        self.renderer.set_scene(&self.device, subgraph, library);
    }

    /// Start a snapshot capture
    pub fn capture(
        &mut self,
        request: CaptureRequest,
        purpose: CapturePurpose,
    ) -> Result<(), CaptureError> {
        self.renderer
            .capture_snapshot(&self.device, &self.queue, request)?;
        self.capture_purpose = Some(purpose);
        Ok(())
    }

    /// Check the pending capture
    pub fn poll_capture(&mut self) -> Option<CaptureOutcome> {
        let (request, image) = self.renderer.poll_capture(&self.device)?;
        let purpose = self.capture_purpose.take().unwrap_or(CapturePurpose::Review);
        Some(CaptureOutcome {
            request,
            purpose,
            image,
        })
    }
}

pub type SharedViewportState = Arc<Mutex<ViewportState>>;

use std::sync::Arc;

use winit::window::Window;

use crate::{
    data_structures::texture,
    error::ContextError,
    resources::ledger::ResourceLedger,
    settings::Settings,
};

/// Device, queue and the ledger every wrapper created from them reports to.
///
/// Cloning is cheap: wgpu handles are internally reference counted.
#[derive(Debug, Clone)]
pub struct Gpu {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub(crate) ledger: Arc<ResourceLedger>,
}

impl Gpu {
    /// A device without any surface, for offscreen work and tests.
    pub async fn headless() -> Result<Self, ContextError> {
        let instance = wgpu::Instance::default();
        let (gpu, _) = Self::request(&instance, None).await?;
        Ok(gpu)
    }

    async fn request(
        instance: &wgpu::Instance,
        compatible_surface: Option<&wgpu::Surface<'_>>,
    ) -> Result<(Self, wgpu::Adapter), ContextError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface,
                force_fallback_adapter: false,
            })
            .await?;
        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("voxel-ngin device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                ..Default::default()
            })
            .await?;

        let gpu = Self {
            device,
            queue,
            ledger: ResourceLedger::new(),
        };
        Ok((gpu, adapter))
    }

    pub fn ledger(&self) -> &Arc<ResourceLedger> {
        &self.ledger
    }
}

/// Pick the first non-sRGB format the surface supports, else `fallback`.
///
/// Clear colour and fragment output are written to the screen as given,
/// without gamma encoding.
pub fn output_format(
    supported: &[wgpu::TextureFormat],
    fallback: wgpu::TextureFormat,
) -> wgpu::TextureFormat {
    supported
        .iter()
        .copied()
        .find(|format| !format.is_srgb())
        .unwrap_or(fallback)
}

/// Window, surface and GPU state for the running application.
#[derive(Debug)]
pub struct Context {
    pub(crate) depth_texture: texture::Texture,
    pub surface: wgpu::Surface<'static>,
    pub gpu: Gpu,
    pub config: wgpu::SurfaceConfiguration,
    pub clear_colour: wgpu::Color,
    // Last, so it outlives the surface created from it.
    pub(crate) window: Arc<Window>,
}

impl Context {
    pub async fn new(window: Arc<Window>, settings: &Settings) -> Result<Self, ContextError> {
        let size = window.inner_size();

        log::info!("wgpu setup");
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window.clone())?;
        let (gpu, adapter) = Gpu::request(&instance, Some(&surface)).await?;

        let mut config = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .ok_or(ContextError::UnsupportedSurface)?;
        let surface_caps = surface.get_capabilities(&adapter);
        config.format = output_format(&surface_caps.formats, config.format);
        surface.configure(&gpu.device, &config);

        let depth_texture = texture::Texture::create_depth_texture(
            &gpu.device,
            [config.width, config.height],
            "depth_texture",
        );

        Ok(Self {
            depth_texture,
            surface,
            gpu,
            config,
            clear_colour: settings.clear_colour,
            window,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_texture.view
    }

    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Reconfigure the surface and depth buffer. Zero-sized requests are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.gpu.device, &self.config);
        self.depth_texture = texture::Texture::create_depth_texture(
            &self.gpu.device,
            [width, height],
            "depth_texture",
        );
        true
    }
}

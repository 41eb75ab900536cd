//! The single image texture bound to the viewer pipeline.

use crate::raster::RasterBuffer;

/// Owns one RGBA8 2D texture. Until the first upload (and after a reset) it
/// holds a 1x1 placeholder and reports not-ready, which gates the image
/// draw pass. Dropping the wrapper releases the native handle.
pub struct ImageTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
    ready: bool,
}

impl ImageTexture {
    /// Create the placeholder texture.
    #[must_use]
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let (texture, view) = allocate(device, 1, 1);
        queue.write_texture(
            texture.as_image_copy(),
            &[0, 0, 0, 0],
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4),
                rows_per_image: Some(1),
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        Self {
            texture,
            view,
            width: 1,
            height: 1,
            ready: false,
        }
    }

    /// Upload new pixels, or reset to the placeholder on `None`.
    ///
    /// The texture is reallocated only when the dimensions change; a
    /// same-size raster is written in place. An empty raster resets like
    /// `None` since zero-sized textures cannot exist.
    pub fn update(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, raster: Option<&RasterBuffer>) {
        let Some(raster) = raster.filter(|r| !r.is_empty()) else {
            *self = Self::new(device, queue);
            return;
        };

        let (width, height) = (raster.width(), raster.height());
        if (width, height) != (self.width, self.height) {
            let (texture, view) = allocate(device, width, height);
            self.texture = texture;
            self.view = view;
            self.width = width;
            self.height = height;
        }
        queue.write_texture(
            self.texture.as_image_copy(),
            raster.pixels(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.ready = true;
    }

    /// Whether real image pixels are resident.
    #[must_use]
    pub const fn ready(&self) -> bool {
        self.ready
    }

    #[must_use]
    pub const fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    #[must_use]
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

fn allocate(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("image"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

//! Per-frame drawing: background clear plus the conditional image pass.

use tracing::warn;

use crate::color::Palette;
use crate::gpu::context::GpuContext;
use crate::gpu::pipeline::{ViewUniforms, ViewerPipeline};
use crate::gpu::plane::Plane;
use crate::gpu::texture::ImageTexture;
use crate::viewport::Viewport;

/// Uniform values for the current transform state.
///
/// Offsets are truncated toward zero here; the sampling math downstream
/// assumes whole-pixel offsets.
#[must_use]
pub fn view_uniforms(viewport: &Viewport, palette: &Palette) -> ViewUniforms {
    let (canvas_w, canvas_h) = viewport.container();
    let (img_w, img_h) = viewport.image().unwrap_or((0, 0));
    let (x, y) = viewport.offset();

    #[allow(clippy::cast_precision_loss)]
    ViewUniforms {
        canvas: [canvas_w as f32, canvas_h as f32],
        offset: [x.trunc(), y.trunc()],
        size: [img_w as f32, img_h as f32],
        scale: viewport.scale(),
        _pad: 0.0,
        grid0: palette.grid0,
        grid1: palette.grid1,
    }
}

/// Draw one frame of the current state.
///
/// Clears to the background color, then issues the image pass when an
/// image is loaded, its texture is resident, and the pipeline linked.
/// Surface loss reconfigures and skips the frame; the next state change
/// repaints.
pub fn draw_frame(
    ctx: &GpuContext,
    pipeline: &ViewerPipeline,
    plane: &Plane,
    texture: &ImageTexture,
    viewport: &Viewport,
    palette: &Palette,
) {
    let frame = match ctx.acquire() {
        Ok(frame) => frame,
        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
            ctx.reconfigure();
            return;
        }
        Err(err) => {
            warn!(%err, "skipping frame");
            return;
        }
    };
    let view = frame
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());

    pipeline.write_uniforms(ctx.queue(), &view_uniforms(viewport, palette));

    let [r, g, b, a] = palette.background;
    let mut encoder = ctx
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame encoder"),
        });
    {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("viewer pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: f64::from(r),
                        g: f64::from(g),
                        b: f64::from(b),
                        a: f64::from(a),
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if viewport.image().is_some() && texture.ready() {
            pipeline.draw(&mut rpass, plane);
        }
    }
    ctx.queue().submit([encoder.finish()]);
    frame.present();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{BLACK, WHITE};

    fn palette() -> Palette {
        Palette {
            background: WHITE,
            grid0: WHITE,
            grid1: BLACK,
        }
    }

    #[test]
    fn uniforms_truncate_the_offset() {
        let mut vp = Viewport::new();
        vp.set_container(801, 601);
        vp.set_image(Some((100, 100)));
        // fitted at scale 1: centered offset (350.5, 250.5)
        let u = view_uniforms(&vp, &palette());
        assert_eq!(u.offset, [350.0, 250.0]);
        assert_eq!(u.canvas, [801.0, 601.0]);
        assert_eq!(u.size, [100.0, 100.0]);
        assert!((u.scale - 1.0).abs() < 1e-6);
    }

    #[test]
    fn uniforms_without_image_have_zero_size() {
        let mut vp = Viewport::new();
        vp.set_container(800, 600);
        let u = view_uniforms(&vp, &palette());
        assert_eq!(u.size, [0.0, 0.0]);
        assert_eq!(u.grid1, BLACK);
    }
}

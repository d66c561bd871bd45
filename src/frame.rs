use std::ops::Range;

use crate::{
    geometry::VertexArray,
    shader::{self, BuildFailure, Program, ProgramSource},
};

pub const BLACK: wgpu::Color = wgpu::Color {
    r: 0.,
    g: 0.,
    b: 0.,
    a: 1.,
};

#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub topology: wgpu::PrimitiveTopology,
    pub vertices: Range<u32>,
    pub instances: Range<u32>,
}

/// Everything one frame does, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub clear: wgpu::Color,
    pub draws: Vec<DrawCall>,
}

impl FramePlan {
    /// Clear to black, then draw `vertex_count` vertices once.
    pub fn single(topology: wgpu::PrimitiveTopology, vertex_count: u32) -> Self {
        Self {
            clear: BLACK,
            draws: vec![DrawCall {
                topology,
                vertices: 0..vertex_count,
                instances: 0..1,
            }],
        }
    }
}

/// The resources set up once and read by every frame.
#[derive(Debug)]
pub struct RenderState {
    vertex_array: VertexArray,
    program: Program,
}
impl RenderState {
    /// Uploads the triangle and builds its program for `format` targets.
    pub async fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
    ) -> Result<Self, BuildFailure> {
        let vertex_array = VertexArray::triangle(device);
        let program = shader::compile_and_link(
            device,
            ProgramSource::triangle(),
            vertex_array.layout(),
            format,
        )
        .await?;
        Ok(Self {
            vertex_array,
            program,
        })
    }

    pub fn plan(&self) -> FramePlan {
        FramePlan::single(self.program.topology(), self.vertex_array.vertex_count())
    }

    /// Records one frame into `encoder`, targeting `view`.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let plan = self.plan();
        let background = wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(plan.clear),
                store: wgpu::StoreOp::Store,
            },
        };
        let desc = wgpu::RenderPassDescriptor {
            label: Some("frame"),
            color_attachments: &[Some(background)],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        };
        let mut pass = encoder.begin_render_pass(&desc);
        self.program.bind(&mut pass);
        self.vertex_array.bind(&mut pass);
        for draw in plan.draws {
            pass.draw(draw.vertices, draw.instances);
        }
        // ending the pass releases the pipeline and vertex bindings
        drop(pass);
    }
}

/// Something that can put a planned frame on screen.
pub trait Render {
    fn plan(&self) -> FramePlan;
    fn render(&mut self) -> anyhow::Result<()>;
}

/// Drives frames until a close request arrives.
#[derive(Debug, Clone, Default)]
pub struct FrameLoop {
    should_close: bool,
    frames: u64,
}
impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_close(&mut self) {
        tracing::info!(frames = self.frames, "close requested");
        self.should_close = true;
    }

    pub fn should_close(&self) -> bool {
        self.should_close
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Runs one iteration. Returns `false` once the loop should stop.
    pub fn step(&mut self, renderer: &mut impl Render) -> anyhow::Result<bool> {
        if self.should_close {
            return Ok(false);
        }
        renderer.render()?;
        self.frames += 1;
        tracing::trace!(frame = self.frames, "frame presented");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::TRIANGLE;

    #[derive(Debug, Default)]
    struct Recorder {
        draws: Vec<DrawCall>,
        clears: Vec<wgpu::Color>,
    }
    impl Render for Recorder {
        fn plan(&self) -> FramePlan {
            FramePlan::single(wgpu::PrimitiveTopology::TriangleList, TRIANGLE.len() as u32)
        }
        fn render(&mut self) -> anyhow::Result<()> {
            let plan = self.plan();
            self.clears.push(plan.clear);
            self.draws.extend(plan.draws);
            Ok(())
        }
    }

    #[test]
    fn test_one_iteration_draws_once() {
        let mut frame_loop = FrameLoop::new();
        let mut recorder = Recorder::default();
        assert!(frame_loop.step(&mut recorder).unwrap());
        assert_eq!(frame_loop.frames(), 1);
        assert_eq!(recorder.clears, vec![BLACK]);
        assert_eq!(recorder.draws.len(), 1);
        let draw = &recorder.draws[0];
        assert_eq!(draw.topology, wgpu::PrimitiveTopology::TriangleList);
        assert_eq!(draw.vertices.len(), 3);
    }

    #[test]
    fn test_close_stops_loop() {
        let mut frame_loop = FrameLoop::new();
        let mut recorder = Recorder::default();
        assert!(frame_loop.step(&mut recorder).unwrap());
        frame_loop.request_close();
        assert!(frame_loop.should_close());
        assert!(!frame_loop.step(&mut recorder).unwrap());
        assert_eq!(frame_loop.frames(), 1);
        assert_eq!(recorder.draws.len(), 1);
    }

    #[tokio::test]
    async fn test_render_state_plan() {
        let Some((device, _queue)) = crate::gpu::headless().await else {
            println!("no adapter");
            return;
        };
        let state = RenderState::new(&device, wgpu::TextureFormat::Rgba8Unorm)
            .await
            .unwrap();
        let plan = state.plan();
        assert_eq!(plan.clear, BLACK);
        assert_eq!(
            plan.draws,
            vec![DrawCall {
                topology: wgpu::PrimitiveTopology::TriangleList,
                vertices: 0..3,
                instances: 0..1,
            }]
        );
    }

    const SIZE: u32 = 64;

    fn render_offscreen(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        state: &RenderState,
    ) -> Vec<u8> {
        let extent = wgpu::Extent3d {
            width: SIZE,
            height: SIZE,
            depth_or_array_layers: 1,
        };
        let desc = wgpu::TextureDescriptor {
            label: Some("offscreen"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        };
        let texture = device.create_texture(&desc);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let desc = wgpu::BufferDescriptor {
            label: Some("readback"),
            size: (SIZE * SIZE * 4) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        };
        let readback = device.create_buffer(&desc);
        let mut encoder =
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        state.encode(&mut encoder, &view);
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &readback,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(SIZE * 4),
                    rows_per_image: Some(SIZE),
                },
            },
            extent,
        );
        queue.submit([encoder.finish()]);
        let slice = readback.slice(..);
        slice.map_async(wgpu::MapMode::Read, |res| res.unwrap());
        device.poll(wgpu::Maintain::Wait);
        let pixels = slice.get_mapped_range().to_vec();
        readback.unmap();
        pixels
    }

    fn pixel(pixels: &[u8], x: u32, y: u32) -> [u8; 4] {
        let i = ((y * SIZE + x) * 4) as usize;
        [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
    }

    #[tokio::test]
    async fn test_frame_pixels() {
        let Some((device, queue)) = crate::gpu::headless().await else {
            println!("no adapter");
            return;
        };
        let state = RenderState::new(&device, wgpu::TextureFormat::Rgba8Unorm)
            .await
            .unwrap();
        let pixels = render_offscreen(&device, &queue, &state);
        // red with the literal zero alpha
        assert_eq!(pixel(&pixels, SIZE / 2, SIZE / 2), [255, 0, 0, 0]);
        // the 0.4 scale keeps the corners clear
        assert_eq!(pixel(&pixels, 0, 0), [0, 0, 0, 255]);
        assert_eq!(pixel(&pixels, SIZE - 1, SIZE - 1), [0, 0, 0, 255]);
    }

    #[tokio::test]
    async fn test_setup_twice() {
        let Some((device, queue)) = crate::gpu::headless().await else {
            println!("no adapter");
            return;
        };
        let format = wgpu::TextureFormat::Rgba8Unorm;
        let first = RenderState::new(&device, format).await.unwrap();
        let second = RenderState::new(&device, format).await.unwrap();
        let a = render_offscreen(&device, &queue, &first);
        let b = render_offscreen(&device, &queue, &second);
        assert_eq!(a, b);
        drop(second);
        let again = render_offscreen(&device, &queue, &first);
        assert_eq!(a, again);
    }
}

use std::fmt;

pub const VERTEX_SHADER: &str = include_str!("vertex.wgsl");
pub const FRAGMENT_SHADER: &str = include_str!("fragment.wgsl");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Vertex,
    Fragment,
}
impl StageKind {
    pub fn stages(self) -> wgpu::ShaderStages {
        match self {
            StageKind::Vertex => wgpu::ShaderStages::VERTEX,
            StageKind::Fragment => wgpu::ShaderStages::FRAGMENT,
        }
    }
    /// Numeric kind used to key diagnostics.
    pub fn code(self) -> u32 {
        self.stages().bits()
    }
    pub fn entry_point(self) -> &'static str {
        match self {
            StageKind::Vertex => "vs_main",
            StageKind::Fragment => "fs_main",
        }
    }
    fn label(self) -> &'static str {
        match self {
            StageKind::Vertex => "vertex stage",
            StageKind::Fragment => "fragment stage",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Compile(StageKind),
    Link,
    Validate,
}
impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Compile(kind) => write!(f, "compiling the '{}' shader", kind.code()),
            Phase::Link => write!(f, "linking program"),
            Phase::Validate => write!(f, "validating program"),
        }
    }
}

/// One problem found while building a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub phase: Phase,
    pub log: String,
}
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error {}: '{}'", self.phase, self.log)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("shader program build failed ({} diagnostics)", .diagnostics.len())]
pub struct BuildFailure {
    pub diagnostics: Vec<Diagnostic>,
}
impl BuildFailure {
    pub fn phase(&self, phase: Phase) -> Option<&Diagnostic> {
        self.diagnostics.iter().find(|d| d.phase == phase)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProgramSource<'a> {
    pub vertex: &'a str,
    pub fragment: &'a str,
}
impl ProgramSource<'static> {
    pub fn triangle() -> Self {
        Self {
            vertex: VERTEX_SHADER,
            fragment: FRAGMENT_SHADER,
        }
    }
}

/// A linked render pipeline.
#[derive(Debug)]
pub struct Program {
    pipeline: wgpu::RenderPipeline,
    topology: wgpu::PrimitiveTopology,
}
impl Program {
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
    }

    pub fn topology(&self) -> wgpu::PrimitiveTopology {
        self.topology
    }
}

/// Compiles both stages and links them into a [`Program`].
///
/// Every diagnostic is logged as soon as it is produced. A stage that fails
/// to compile is left out of the link; when the vertex stage is missing the
/// link is not attempted. Any diagnostic turns the result into a
/// [`BuildFailure`] so the caller never binds a broken program.
pub async fn compile_and_link(
    device: &wgpu::Device,
    source: ProgramSource<'_>,
    vertex_layout: wgpu::VertexBufferLayout<'_>,
    format: wgpu::TextureFormat,
) -> Result<Program, BuildFailure> {
    let mut diagnostics = vec![];
    let mut report = |diagnostic: Diagnostic| {
        tracing::error!("{diagnostic}");
        diagnostics.push(diagnostic);
    };

    let vertex = compile(device, StageKind::Vertex, source.vertex)
        .await
        .map_err(&mut report)
        .ok();
    let fragment = compile(device, StageKind::Fragment, source.fragment)
        .await
        .map_err(&mut report)
        .ok();

    let Some(vertex) = vertex else {
        report(Diagnostic {
            phase: Phase::Link,
            log: "no compiled vertex stage to attach".into(),
        });
        return Err(BuildFailure { diagnostics });
    };

    let topology = wgpu::PrimitiveTopology::TriangleList;
    let desc = wgpu::PipelineLayoutDescriptor {
        label: Some("program"),
        bind_group_layouts: &[],
        push_constant_ranges: &[],
    };
    let layout = device.create_pipeline_layout(&desc);
    let targets = [Some(wgpu::ColorTargetState {
        format,
        blend: Some(wgpu::BlendState::REPLACE),
        write_mask: wgpu::ColorWrites::ALL,
    })];
    let fragment = fragment.as_ref().map(|module| wgpu::FragmentState {
        module,
        entry_point: StageKind::Fragment.entry_point(),
        compilation_options: Default::default(),
        targets: &targets,
    });
    let desc = wgpu::RenderPipelineDescriptor {
        label: Some("program"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &vertex,
            entry_point: StageKind::Vertex.entry_point(),
            compilation_options: Default::default(),
            buffers: &[vertex_layout],
        },
        primitive: wgpu::PrimitiveState {
            topology,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment,
        multiview: None,
        cache: None,
    };
    // scopes pop in reverse: validation errors belong to the link, allocation
    // errors to the validation pass
    device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let pipeline = device.create_render_pipeline(&desc);
    let link = device.pop_error_scope().await;
    let validate = device.pop_error_scope().await;
    if let Some(err) = link {
        report(Diagnostic {
            phase: Phase::Link,
            log: err.to_string(),
        });
    }
    if let Some(err) = validate {
        report(Diagnostic {
            phase: Phase::Validate,
            log: err.to_string(),
        });
    }

    if !diagnostics.is_empty() {
        return Err(BuildFailure { diagnostics });
    }
    tracing::info!("shader program linked");
    Ok(Program { pipeline, topology })
}

async fn compile(
    device: &wgpu::Device,
    kind: StageKind,
    source: &str,
) -> Result<wgpu::ShaderModule, Diagnostic> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let desc = wgpu::ShaderModuleDescriptor {
        label: Some(kind.label()),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    };
    let module = device.create_shader_module(desc);
    match device.pop_error_scope().await {
        None => Ok(module),
        Some(err) => Err(Diagnostic {
            phase: Phase::Compile(kind),
            log: err.to_string(),
        }),
    }
}

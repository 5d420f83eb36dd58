//! The two bundled benchmarks: buffer uploads and batches of draw calls.

use serde::{Deserialize, Serialize};

use crate::{
    BenchError,
    config::{BenchmarkConfiguration, BenchmarkKind},
    context::{
        BufferHandle, BufferTarget, GraphicsContext, PrimitiveKind, ProgramHandle, ShaderStage,
        UsageHint,
    },
    runner::Benchmark,
};

const POSITION_ATTRIBUTE: &str = "position";
const POSITION_COMPONENTS: u32 = 2;

/// One small triangle, as `(x, y)` pairs.
pub const TRIANGLE_VERTICES: [f32; 6] = [-0.01, -0.01, 0.01, -0.01, 0.0, 0.01];

const DEFAULT_VERTEX_SHADER: &str = "
    attribute vec2 position;
    void main() {
      gl_Position = vec4(position, 0.0, 1.0);
    }
";

const DEFAULT_FRAGMENT_SHADER: &str = "
    void main() {
      gl_FragColor = vec4(1.0);
    }
";

/// Whether a timed upload waits for the device to go idle before the clock stops.
///
/// Held by the benchmark for its whole lifetime, so every configuration of a
/// sweep is measured the same way.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadBarrier {
    /// Time only the upload call.
    None,
    /// Time the upload plus a wait for the device to retire it.
    AwaitIdle,
}

/// Uploads a freshly allocated, zero-filled block into a fresh buffer per trial.
#[derive(Clone, Debug)]
pub struct BufferUploadBenchmark {
    barrier: UploadBarrier,
    usage: UsageHint,
}

impl BufferUploadBenchmark {
    pub fn new(barrier: UploadBarrier) -> Self {
        Self {
            barrier,
            usage: UsageHint::StaticDraw,
        }
    }

    pub fn barrier(&self) -> UploadBarrier {
        self.barrier
    }
}

impl Default for BufferUploadBenchmark {
    fn default() -> Self {
        Self::new(UploadBarrier::AwaitIdle)
    }
}

#[derive(Debug)]
pub struct UploadTrial {
    buffer: BufferHandle,
    data: Vec<u8>,
}

impl UploadTrial {
    pub fn buffer(&self) -> BufferHandle {
        self.buffer
    }
}

impl<C: GraphicsContext + ?Sized> Benchmark<C> for BufferUploadBenchmark {
    type Trial = UploadTrial;

    fn kind(&self) -> BenchmarkKind {
        BenchmarkKind::BufferUpload
    }

    fn prepare_trial(
        &mut self,
        ctx: &mut C,
        config: &BenchmarkConfiguration,
    ) -> Result<UploadTrial, BenchError> {
        let BenchmarkConfiguration::BufferUpload { bytes } = *config else {
            return Err(BenchError::invalid_input(format!(
                "buffer upload cannot run {config}"
            )));
        };
        let data = vec![0u8; bytes];
        let buffer = ctx.create_buffer()?;
        ctx.bind_buffer(BufferTarget::Array, Some(buffer))?;
        Ok(UploadTrial { buffer, data })
    }

    fn execute(&mut self, ctx: &mut C, trial: &mut UploadTrial) -> Result<(), BenchError> {
        ctx.upload_data(BufferTarget::Array, &trial.data, self.usage)?;
        if self.barrier == UploadBarrier::AwaitIdle {
            ctx.await_idle()?;
        }
        Ok(())
    }

    fn finish_trial(&mut self, ctx: &mut C, trial: UploadTrial) -> Result<(), BenchError> {
        ctx.bind_buffer(BufferTarget::Array, None)?;
        ctx.delete_buffer(trial.buffer)
    }
}

/// Vertex and fragment sources for the draw-call program.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

impl Default for ShaderSources {
    fn default() -> Self {
        Self {
            vertex: DEFAULT_VERTEX_SHADER.to_string(),
            fragment: DEFAULT_FRAGMENT_SHADER.to_string(),
        }
    }
}

/// Issues a batch of single-triangle draws per trial and waits for them to retire.
///
/// The program is compiled and linked on first use and reused afterwards;
/// the vertex buffer and bindings are rebuilt for every configuration since
/// a reset clears them.
#[derive(Clone, Debug)]
pub struct DrawCallBenchmark {
    sources: ShaderSources,
    vertices: Vec<f32>,
    program: Option<ProgramHandle>,
}

impl DrawCallBenchmark {
    pub fn new(sources: ShaderSources) -> Self {
        Self {
            sources,
            vertices: TRIANGLE_VERTICES.to_vec(),
            program: None,
        }
    }

    pub fn program(&self) -> Option<ProgramHandle> {
        self.program
    }

    fn vertex_count(&self) -> u32 {
        (self.vertices.len() / POSITION_COMPONENTS as usize) as u32
    }

    fn ensure_program<C: GraphicsContext + ?Sized>(
        &mut self,
        ctx: &mut C,
    ) -> Result<ProgramHandle, BenchError> {
        if let Some(program) = self.program {
            return Ok(program);
        }
        let vertex = ctx.create_shader(ShaderStage::Vertex)?;
        ctx.compile_shader(vertex, &self.sources.vertex)?;
        let fragment = ctx.create_shader(ShaderStage::Fragment)?;
        ctx.compile_shader(fragment, &self.sources.fragment)?;
        let program = ctx.create_program()?;
        ctx.attach_shader(program, vertex)?;
        ctx.attach_shader(program, fragment)?;
        ctx.link_program(program)?;
        self.program = Some(program);
        Ok(program)
    }
}

impl Default for DrawCallBenchmark {
    fn default() -> Self {
        Self::new(ShaderSources::default())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct DrawTrial {
    calls: usize,
}

impl<C: GraphicsContext + ?Sized> Benchmark<C> for DrawCallBenchmark {
    type Trial = DrawTrial;

    fn kind(&self) -> BenchmarkKind {
        BenchmarkKind::DrawCalls
    }

    fn setup(&mut self, ctx: &mut C, config: &BenchmarkConfiguration) -> Result<(), BenchError> {
        if let BenchmarkConfiguration::DrawCalls { calls_per_trial: 0 } = config {
            return Err(BenchError::invalid_input("draw batch must hold at least one call"));
        }
        let program = self.ensure_program(ctx)?;
        let bytes: Vec<u8> = self.vertices.iter().flat_map(|v| v.to_le_bytes()).collect();
        let buffer = ctx.create_buffer()?;
        ctx.bind_buffer(BufferTarget::Array, Some(buffer))?;
        ctx.upload_data(BufferTarget::Array, &bytes, UsageHint::StaticDraw)?;
        ctx.use_program(Some(program))?;
        ctx.enable_vertex_attribute(program, POSITION_ATTRIBUTE, POSITION_COMPONENTS)
    }

    fn prepare_trial(
        &mut self,
        _ctx: &mut C,
        config: &BenchmarkConfiguration,
    ) -> Result<DrawTrial, BenchError> {
        match *config {
            BenchmarkConfiguration::DrawCalls { calls_per_trial } => Ok(DrawTrial {
                calls: calls_per_trial,
            }),
            _ => Err(BenchError::invalid_input(format!(
                "draw calls cannot run {config}"
            ))),
        }
    }

    fn execute(&mut self, ctx: &mut C, trial: &mut DrawTrial) -> Result<(), BenchError> {
        let vertex_count = self.vertex_count();
        for _ in 0..trial.calls {
            ctx.draw_batch(PrimitiveKind::Triangles, vertex_count)?;
        }
        ctx.await_idle()
    }
}

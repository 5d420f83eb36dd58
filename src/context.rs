//! Capability contract the harness requires from a graphics context.
//!
//! The harness drives a single context from a single thread. Acquiring the
//! context (window, surface, device) happens outside this crate; everything
//! the measurement loop touches goes through [`GraphicsContext`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::BenchError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BufferHandle(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShaderHandle(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProgramHandle(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BufferTarget {
    Array,
    ElementArray,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UsageHint {
    StaticDraw,
    DynamicDraw,
    StreamDraw,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Points,
    Lines,
    Triangles,
}

impl PrimitiveKind {
    /// Vertices consumed by one primitive.
    pub fn vertices_per_primitive(self) -> u32 {
        match self {
            PrimitiveKind::Points => 1,
            PrimitiveKind::Lines => 2,
            PrimitiveKind::Triangles => 3,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// Operations a graphics context must offer to be benchmarked.
///
/// Calls are issued strictly sequentially. Implementations report creation,
/// compilation and out-of-memory failures as [`BenchError::ResourceCreation`],
/// misuse of bound state as [`BenchError::InvalidOperation`], and a lost
/// device as [`BenchError::ContextUnavailable`].
pub trait GraphicsContext {
    /// Whether the underlying device has been lost and the context is unusable.
    fn is_context_lost(&self) -> bool;

    fn create_buffer(&mut self) -> Result<BufferHandle, BenchError>;
    fn delete_buffer(&mut self, buffer: BufferHandle) -> Result<(), BenchError>;
    fn bind_buffer(
        &mut self,
        target: BufferTarget,
        buffer: Option<BufferHandle>,
    ) -> Result<(), BenchError>;
    /// Replaces the storage of the buffer bound to `target` with `data`.
    fn upload_data(
        &mut self,
        target: BufferTarget,
        data: &[u8],
        usage: UsageHint,
    ) -> Result<(), BenchError>;

    fn create_shader(&mut self, stage: ShaderStage) -> Result<ShaderHandle, BenchError>;
    fn compile_shader(&mut self, shader: ShaderHandle, source: &str) -> Result<(), BenchError>;
    fn create_program(&mut self) -> Result<ProgramHandle, BenchError>;
    fn attach_shader(
        &mut self,
        program: ProgramHandle,
        shader: ShaderHandle,
    ) -> Result<(), BenchError>;
    fn link_program(&mut self, program: ProgramHandle) -> Result<(), BenchError>;
    fn use_program(&mut self, program: Option<ProgramHandle>) -> Result<(), BenchError>;
    /// Points the named vertex attribute of `program` at the bound array buffer
    /// as tightly packed `f32` tuples of `components` values.
    fn enable_vertex_attribute(
        &mut self,
        program: ProgramHandle,
        name: &str,
        components: u32,
    ) -> Result<(), BenchError>;

    /// Submits one draw. Submission may be queued; see [`GraphicsContext::await_idle`].
    fn draw_batch(
        &mut self,
        primitive: PrimitiveKind,
        vertex_count: u32,
    ) -> Result<(), BenchError>;
    /// Blocks until all previously submitted work has retired.
    fn await_idle(&mut self) -> Result<(), BenchError>;
    /// Unbinds buffers, programs, textures and framebuffers and clears color and depth.
    fn reset_state(&mut self) -> Result<(), BenchError>;
}

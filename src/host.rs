//! In-process reference implementation of [`GraphicsContext`].
//!
//! Buffers live in heap memory and uploads are real copies, so a sweep over a
//! [`HostContext`] measures allocator and memcpy cost. Draws are queued on
//! submission and retired by [`GraphicsContext::await_idle`], which walks the
//! bound vertex data the way a device would consume it. The context is also
//! the test double for the harness: see [`HostContext::faults_mut`].

use ahash::AHashMap;
use tracing::debug;

use crate::{
    BenchError,
    context::{
        BufferHandle, BufferTarget, GraphicsContext, PrimitiveKind, ProgramHandle, ShaderHandle,
        ShaderStage, UsageHint,
    },
    fault_injection::{FaultPlan, FaultPoint},
};

const DEFAULT_MAX_BUFFER_BYTES: usize = 256 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct HostContextOptions {
    /// Largest single buffer store; larger uploads fail as out of memory.
    pub max_buffer_bytes: usize,
}

impl Default for HostContextOptions {
    fn default() -> Self {
        Self {
            max_buffer_bytes: DEFAULT_MAX_BUFFER_BYTES,
        }
    }
}

/// Running counters of everything the context has been asked to do.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HostStats {
    pub buffers_created: u64,
    pub buffers_deleted: u64,
    pub uploads: u64,
    pub bytes_uploaded: u64,
    pub programs_linked: u64,
    pub draws_submitted: u64,
    pub draws_retired: u64,
    pub idle_waits: u64,
    pub resets: u64,
    pub clears: u64,
    pub vertex_checksum: f64,
}

#[derive(Clone, Debug)]
struct HostShader {
    stage: ShaderStage,
    compiled: bool,
    attributes: Vec<String>,
}

#[derive(Clone, Copy, Debug)]
struct VertexAttribute {
    buffer: BufferHandle,
    components: u32,
}

#[derive(Clone, Debug, Default)]
struct HostProgram {
    shaders: Vec<ShaderHandle>,
    linked: bool,
    attributes: Vec<String>,
    enabled: Option<VertexAttribute>,
}

#[derive(Clone, Copy, Debug)]
struct PendingDraw {
    attribute: VertexAttribute,
    vertex_count: u32,
}

pub struct HostContext {
    options: HostContextOptions,
    next_handle: u64,
    buffers: AHashMap<BufferHandle, Vec<u8>>,
    shaders: AHashMap<ShaderHandle, HostShader>,
    programs: AHashMap<ProgramHandle, HostProgram>,
    array_binding: Option<BufferHandle>,
    element_binding: Option<BufferHandle>,
    current_program: Option<ProgramHandle>,
    pending: Vec<PendingDraw>,
    stats: HostStats,
    faults: FaultPlan,
    lost: bool,
}

impl HostContext {
    pub fn new() -> Self {
        Self::with_options(HostContextOptions::default())
    }

    /// Opens a context, rejecting options no device could satisfy.
    pub fn open(options: HostContextOptions) -> Result<Self, BenchError> {
        if options.max_buffer_bytes == 0 {
            return Err(BenchError::context_unavailable(
                "host context cannot allocate any buffer storage",
            ));
        }
        Ok(Self::with_options(options))
    }

    fn with_options(options: HostContextOptions) -> Self {
        Self {
            options,
            next_handle: 1,
            buffers: AHashMap::new(),
            shaders: AHashMap::new(),
            programs: AHashMap::new(),
            array_binding: None,
            element_binding: None,
            current_program: None,
            pending: Vec::new(),
            stats: HostStats::default(),
            faults: FaultPlan::new(),
            lost: false,
        }
    }

    pub fn stats(&self) -> &HostStats {
        &self.stats
    }

    pub fn faults_mut(&mut self) -> &mut FaultPlan {
        &mut self.faults
    }

    pub fn lose_context(&mut self) {
        self.lost = true;
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn buffer_len(&self, buffer: BufferHandle) -> Option<usize> {
        self.buffers.get(&buffer).map(Vec::len)
    }

    pub fn bound_buffer(&self, target: BufferTarget) -> Option<BufferHandle> {
        match target {
            BufferTarget::Array => self.array_binding,
            BufferTarget::ElementArray => self.element_binding,
        }
    }

    pub fn current_program(&self) -> Option<ProgramHandle> {
        self.current_program
    }

    pub fn pending_draws(&self) -> usize {
        self.pending.len()
    }

    fn ensure_live(&mut self) -> Result<(), BenchError> {
        if self.lost {
            return Err(BenchError::context_unavailable("host context lost"));
        }
        if let Err(err) = self.faults.check(FaultPoint::ContextLoss) {
            self.lost = true;
            return Err(err);
        }
        Ok(())
    }

    fn allocate_handle(&mut self) -> u64 {
        let id = self.next_handle;
        self.next_handle += 1;
        id
    }

    fn binding_mut(&mut self, target: BufferTarget) -> &mut Option<BufferHandle> {
        match target {
            BufferTarget::Array => &mut self.array_binding,
            BufferTarget::ElementArray => &mut self.element_binding,
        }
    }

    fn retire_pending(&mut self) {
        for draw in self.pending.drain(..) {
            let floats = draw.vertex_count as usize * draw.attribute.components as usize;
            if let Some(data) = self.buffers.get(&draw.attribute.buffer) {
                self.stats.vertex_checksum += data
                    .chunks_exact(4)
                    .take(floats)
                    .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64)
                    .sum::<f64>();
            }
            self.stats.draws_retired += 1;
        }
    }
}

impl Default for HostContext {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsContext for HostContext {
    fn is_context_lost(&self) -> bool {
        self.lost
    }

    fn create_buffer(&mut self) -> Result<BufferHandle, BenchError> {
        self.ensure_live()?;
        self.faults.check(FaultPoint::CreateBuffer)?;
        let handle = BufferHandle(self.allocate_handle());
        self.buffers.insert(handle, Vec::new());
        self.stats.buffers_created += 1;
        Ok(handle)
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) -> Result<(), BenchError> {
        self.ensure_live()?;
        if self.buffers.remove(&buffer).is_none() {
            return Err(BenchError::invalid_operation(format!(
                "delete of unknown buffer {}",
                buffer.0
            )));
        }
        if self.array_binding == Some(buffer) {
            self.array_binding = None;
        }
        if self.element_binding == Some(buffer) {
            self.element_binding = None;
        }
        self.stats.buffers_deleted += 1;
        Ok(())
    }

    fn bind_buffer(
        &mut self,
        target: BufferTarget,
        buffer: Option<BufferHandle>,
    ) -> Result<(), BenchError> {
        self.ensure_live()?;
        if let Some(handle) = buffer {
            if !self.buffers.contains_key(&handle) {
                return Err(BenchError::invalid_operation(format!(
                    "bind of unknown buffer {}",
                    handle.0
                )));
            }
        }
        *self.binding_mut(target) = buffer;
        Ok(())
    }

    fn upload_data(
        &mut self,
        target: BufferTarget,
        data: &[u8],
        _usage: UsageHint,
    ) -> Result<(), BenchError> {
        self.ensure_live()?;
        let handle = self
            .bound_buffer(target)
            .ok_or_else(|| BenchError::invalid_operation(format!("no buffer bound to {target:?}")))?;
        self.faults.check(FaultPoint::UploadData)?;
        if data.len() > self.options.max_buffer_bytes {
            return Err(BenchError::resource(format!(
                "out of memory: {} bytes exceeds buffer limit of {} bytes",
                data.len(),
                self.options.max_buffer_bytes
            )));
        }
        let store = self
            .buffers
            .get_mut(&handle)
            .ok_or_else(|| BenchError::invalid_operation(format!("bound buffer {} missing", handle.0)))?;
        *store = data.to_vec();
        self.stats.uploads += 1;
        self.stats.bytes_uploaded += data.len() as u64;
        Ok(())
    }

    fn create_shader(&mut self, stage: ShaderStage) -> Result<ShaderHandle, BenchError> {
        self.ensure_live()?;
        let handle = ShaderHandle(self.allocate_handle());
        self.shaders.insert(
            handle,
            HostShader {
                stage,
                compiled: false,
                attributes: Vec::new(),
            },
        );
        Ok(handle)
    }

    fn compile_shader(&mut self, shader: ShaderHandle, source: &str) -> Result<(), BenchError> {
        self.ensure_live()?;
        self.faults.check(FaultPoint::CompileShader)?;
        let entry = self
            .shaders
            .get_mut(&shader)
            .ok_or_else(|| BenchError::invalid_operation(format!("unknown shader {}", shader.0)))?;
        if source.trim().is_empty() || !source.contains("main") {
            entry.compiled = false;
            return Err(BenchError::resource(format!(
                "{} shader {} failed to compile: missing entry point",
                entry.stage, shader.0
            )));
        }
        entry.compiled = true;
        entry.attributes = declared_attributes(source);
        Ok(())
    }

    fn create_program(&mut self) -> Result<ProgramHandle, BenchError> {
        self.ensure_live()?;
        let handle = ProgramHandle(self.allocate_handle());
        self.programs.insert(handle, HostProgram::default());
        Ok(handle)
    }

    fn attach_shader(
        &mut self,
        program: ProgramHandle,
        shader: ShaderHandle,
    ) -> Result<(), BenchError> {
        self.ensure_live()?;
        if !self.shaders.contains_key(&shader) {
            return Err(BenchError::invalid_operation(format!(
                "unknown shader {}",
                shader.0
            )));
        }
        let entry = self
            .programs
            .get_mut(&program)
            .ok_or_else(|| BenchError::invalid_operation(format!("unknown program {}", program.0)))?;
        if !entry.shaders.contains(&shader) {
            entry.shaders.push(shader);
        }
        Ok(())
    }

    fn link_program(&mut self, program: ProgramHandle) -> Result<(), BenchError> {
        self.ensure_live()?;
        self.faults.check(FaultPoint::LinkProgram)?;
        let shaders = self
            .programs
            .get(&program)
            .map(|p| p.shaders.clone())
            .ok_or_else(|| BenchError::invalid_operation(format!("unknown program {}", program.0)))?;
        let mut has_vertex = false;
        let mut has_fragment = false;
        let mut attributes = Vec::new();
        for handle in &shaders {
            let Some(shader) = self.shaders.get(handle) else {
                continue;
            };
            if !shader.compiled {
                return Err(BenchError::resource(format!(
                    "program {} failed to link: {} shader {} is not compiled",
                    program.0, shader.stage, handle.0
                )));
            }
            match shader.stage {
                ShaderStage::Vertex => {
                    has_vertex = true;
                    attributes.extend(shader.attributes.iter().cloned());
                }
                ShaderStage::Fragment => has_fragment = true,
            }
        }
        if !has_vertex || !has_fragment {
            return Err(BenchError::resource(format!(
                "program {} failed to link: needs a vertex and a fragment shader",
                program.0
            )));
        }
        if let Some(entry) = self.programs.get_mut(&program) {
            entry.linked = true;
            entry.attributes = attributes;
        }
        self.stats.programs_linked += 1;
        Ok(())
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) -> Result<(), BenchError> {
        self.ensure_live()?;
        if let Some(handle) = program {
            match self.programs.get(&handle) {
                Some(entry) if entry.linked => {}
                Some(_) => {
                    return Err(BenchError::invalid_operation(format!(
                        "program {} is not linked",
                        handle.0
                    )));
                }
                None => {
                    return Err(BenchError::invalid_operation(format!(
                        "unknown program {}",
                        handle.0
                    )));
                }
            }
        }
        self.current_program = program;
        Ok(())
    }

    fn enable_vertex_attribute(
        &mut self,
        program: ProgramHandle,
        name: &str,
        components: u32,
    ) -> Result<(), BenchError> {
        self.ensure_live()?;
        if !(1..=4).contains(&components) {
            return Err(BenchError::invalid_operation(format!(
                "attribute {name} cannot have {components} components"
            )));
        }
        let buffer = self
            .array_binding
            .ok_or_else(|| BenchError::invalid_operation("no array buffer bound"))?;
        let entry = self
            .programs
            .get_mut(&program)
            .ok_or_else(|| BenchError::invalid_operation(format!("unknown program {}", program.0)))?;
        if !entry.attributes.iter().any(|a| a == name) {
            return Err(BenchError::invalid_operation(format!(
                "program {} has no attribute {name}",
                program.0
            )));
        }
        entry.enabled = Some(VertexAttribute { buffer, components });
        Ok(())
    }

    fn draw_batch(
        &mut self,
        primitive: PrimitiveKind,
        vertex_count: u32,
    ) -> Result<(), BenchError> {
        self.ensure_live()?;
        self.faults.check(FaultPoint::DrawBatch)?;
        let program = self
            .current_program
            .ok_or_else(|| BenchError::invalid_operation("draw without a program in use"))?;
        let attribute = self
            .programs
            .get(&program)
            .and_then(|p| p.enabled)
            .ok_or_else(|| BenchError::invalid_operation("draw without an enabled attribute"))?;
        let available = self
            .buffers
            .get(&attribute.buffer)
            .map(Vec::len)
            .ok_or_else(|| BenchError::invalid_operation("attribute buffer was deleted"))?;
        let needed = vertex_count as usize * attribute.components as usize * 4;
        if needed > available {
            return Err(BenchError::invalid_operation(format!(
                "{primitive:?} draw of {vertex_count} vertices reads {needed} bytes from a {available} byte buffer"
            )));
        }
        self.pending.push(PendingDraw {
            attribute,
            vertex_count,
        });
        self.stats.draws_submitted += 1;
        Ok(())
    }

    fn await_idle(&mut self) -> Result<(), BenchError> {
        self.ensure_live()?;
        self.faults.check(FaultPoint::AwaitIdle)?;
        self.retire_pending();
        self.stats.idle_waits += 1;
        Ok(())
    }

    fn reset_state(&mut self) -> Result<(), BenchError> {
        self.ensure_live()?;
        self.faults.check(FaultPoint::ResetState)?;
        self.retire_pending();
        self.array_binding = None;
        self.element_binding = None;
        self.current_program = None;
        for program in self.programs.values_mut() {
            program.enabled = None;
        }
        let freed = self.buffers.len() as u64;
        self.buffers.clear();
        self.stats.buffers_deleted += freed;
        self.stats.clears += 1;
        self.stats.resets += 1;
        debug!(freed_buffers = freed, "host context reset");
        Ok(())
    }
}

/// Names of vertex inputs declared with `attribute` or `in` qualifiers.
fn declared_attributes(source: &str) -> Vec<String> {
    source
        .lines()
        .filter_map(|line| {
            let mut tokens = line.split_whitespace();
            match tokens.next() {
                Some("attribute") | Some("in") => {}
                _ => return None,
            }
            let _ty = tokens.next()?;
            let name = tokens.next()?.trim_end_matches(';');
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::declared_attributes;

    #[test]
    fn test_declared_attributes_handles_both_qualifiers() {
        let src = "attribute vec2 position;\nin vec3 normal;\nuniform mat4 mvp;\nvoid main() {}";
        assert_eq!(declared_attributes(src), vec!["position", "normal"]);
    }
}

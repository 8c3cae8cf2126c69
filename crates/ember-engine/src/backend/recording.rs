//! In-memory backend that records every call and resource lifetime.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use anyhow::{bail, Result};

use crate::coords::ViewportSize;
use crate::device::{DeviceStatus, PresentOutcome, RenderError, SurfaceStatus};
use crate::texture::DecodedImage;

use super::{BindStep, BufferDesc, GpuBackend, PipelineDesc};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) enum ResourceKind {
    Backbuffer,
    Depth,
    Buffer,
    Texture,
    Pipeline,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Create { kind: ResourceKind, id: u64 },
    Release { kind: ResourceKind, id: u64 },
    ResizeSurface(ViewportSize),
    Write { id: u64, len: usize },
    Acquire,
    Bind(Vec<&'static str>),
    Draw { vertex_count: u32, first_vertex: u32 },
    Present,
}

struct Journal {
    next_id: u64,
    calls: Vec<Call>,
    status: DeviceStatus,
    acquire_script: VecDeque<SurfaceStatus>,
    present_script: VecDeque<Result<PresentOutcome, String>>,
    fail_resize: bool,
    contents: HashMap<u64, Vec<u8>>,
}

/// Shared view of the journal; stays valid after the backend moves into a context.
#[derive(Clone)]
pub(crate) struct Recorder(Rc<RefCell<Journal>>);

impl Recorder {
    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.0.borrow_mut().calls.clear();
    }

    pub fn set_status(&self, status: DeviceStatus) {
        self.0.borrow_mut().status = status;
    }

    pub fn push_acquire(&self, status: SurfaceStatus) {
        self.0.borrow_mut().acquire_script.push_back(status);
    }

    pub fn push_present(&self, outcome: Result<PresentOutcome, String>) {
        self.0.borrow_mut().present_script.push_back(outcome);
    }

    pub fn fail_resize(&self, fail: bool) {
        self.0.borrow_mut().fail_resize = fail;
    }

    /// Last bytes written to the buffer with `id`.
    pub fn contents(&self, id: u64) -> Vec<u8> {
        self.0.borrow().contents.get(&id).cloned().unwrap_or_default()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.0.borrow().calls.iter().filter(|c| pred(c)).count()
    }

    /// Resources created and not yet released.
    pub fn live(&self) -> Vec<(ResourceKind, u64)> {
        let journal = self.0.borrow();
        let mut live = Vec::new();
        for call in &journal.calls {
            match call {
                Call::Create { kind, id } => live.push((*kind, *id)),
                Call::Release { id, .. } => live.retain(|(_, l)| l != id),
                _ => {}
            }
        }
        live
    }

    fn push(&self, call: Call) {
        self.0.borrow_mut().calls.push(call);
    }

    fn create(&self, kind: ResourceKind) -> Resource {
        let id = {
            let mut journal = self.0.borrow_mut();
            journal.next_id += 1;
            journal.next_id
        };
        self.push(Call::Create { kind, id });
        Resource {
            kind,
            id,
            recorder: self.clone(),
        }
    }
}

/// Stand-in GPU object. Dropping it records the release.
pub(crate) struct Resource {
    kind: ResourceKind,
    id: u64,
    recorder: Recorder,
}

impl Resource {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for Resource {
    fn drop(&mut self) {
        self.recorder.push(Call::Release {
            kind: self.kind,
            id: self.id,
        });
    }
}

pub(crate) struct RecordingBackend {
    recorder: Recorder,
    frame_open: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        let journal = Journal {
            next_id: 0,
            calls: Vec::new(),
            status: DeviceStatus::Ok,
            acquire_script: VecDeque::new(),
            present_script: VecDeque::new(),
            fail_resize: false,
            contents: HashMap::new(),
        };
        Self {
            recorder: Recorder(Rc::new(RefCell::new(journal))),
            frame_open: false,
        }
    }

    pub fn recorder(&self) -> Recorder {
        self.recorder.clone()
    }

    pub fn set_status(&self, status: DeviceStatus) {
        self.recorder.set_status(status);
    }
}

impl GpuBackend for RecordingBackend {
    type BackbufferView = Resource;
    type DepthView = Resource;
    type Buffer = Resource;
    type Texture = Resource;
    type Pipeline = Resource;

    fn describe(&self) -> String {
        "recording backend".to_string()
    }

    fn resize_surface(&mut self, size: ViewportSize) -> Result<()> {
        assert!(size.is_presentable(), "zero-sized surface resize");
        if self.recorder.0.borrow().fail_resize {
            bail!("surface refused {size}");
        }
        self.recorder.push(Call::ResizeSurface(size));
        Ok(())
    }

    fn create_backbuffer_view(&mut self, _size: ViewportSize) -> Result<Resource> {
        Ok(self.recorder.create(ResourceKind::Backbuffer))
    }

    fn create_depth_view(&mut self, _size: ViewportSize) -> Result<Resource> {
        Ok(self.recorder.create(ResourceKind::Depth))
    }

    fn create_buffer(&mut self, _desc: BufferDesc) -> Result<Resource> {
        Ok(self.recorder.create(ResourceKind::Buffer))
    }

    fn write_buffer(&mut self, buffer: &Resource, bytes: &[u8]) -> Result<()> {
        self.recorder.push(Call::Write {
            id: buffer.id,
            len: bytes.len(),
        });
        self.recorder
            .0
            .borrow_mut()
            .contents
            .insert(buffer.id, bytes.to_vec());
        Ok(())
    }

    fn create_texture(&mut self, _label: &'static str, image: &DecodedImage) -> Result<Resource> {
        assert_eq!(image.pixels.len(), (image.width * image.height * 4) as usize);
        Ok(self.recorder.create(ResourceKind::Texture))
    }

    fn create_pipeline(&mut self, _desc: &PipelineDesc<'_, Self>) -> Result<Resource> {
        Ok(self.recorder.create(ResourceKind::Pipeline))
    }

    fn acquire(&mut self, _backbuffer: &Resource) -> Result<SurfaceStatus, RenderError> {
        self.recorder.push(Call::Acquire);
        let status = self
            .recorder
            .0
            .borrow_mut()
            .acquire_script
            .pop_front()
            .unwrap_or(SurfaceStatus::Ready);
        self.frame_open = status == SurfaceStatus::Ready;
        Ok(status)
    }

    fn bind(&mut self, steps: &[BindStep<'_, Self>]) -> Result<()> {
        assert!(self.frame_open, "bind outside an acquired frame");
        self.recorder
            .push(Call::Bind(steps.iter().map(BindStep::name).collect()));
        Ok(())
    }

    fn draw(&mut self, vertex_count: u32, first_vertex: u32) {
        assert!(self.frame_open, "draw outside an acquired frame");
        self.recorder.push(Call::Draw {
            vertex_count,
            first_vertex,
        });
    }

    fn present(&mut self) -> Result<PresentOutcome, RenderError> {
        assert!(self.frame_open, "present without an acquired frame");
        self.frame_open = false;
        self.recorder.push(Call::Present);
        match self.recorder.0.borrow_mut().present_script.pop_front() {
            None => Ok(PresentOutcome::Presented),
            Some(Ok(outcome)) => Ok(outcome),
            Some(Err(reason)) => Err(RenderError::PresentFailed(reason)),
        }
    }

    fn device_status(&self) -> DeviceStatus {
        self.recorder.0.borrow().status.clone()
    }
}

//! Serving a native core from its own thread
//!
//! [`CoreHost`] owns a [`NativeCore`] on a dedicated thread. [`RemoteCore`]
//! forwards each query over a bounded channel and blocks for the reply, so
//! every call still observes the mapping state at the moment it is served.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use bw_core::error::CoreError;
use crossbeam::channel::{self, Receiver, Sender};

use crate::address::AddressInfo;
use crate::memory_type::{CpuType, MemoryType};
use crate::native::NativeCore;

type Reply<T> = Sender<Result<T, CoreError>>;

enum CoreRequest {
    Absolute(AddressInfo, Reply<AddressInfo>),
    Relative(AddressInfo, CpuType, Reply<AddressInfo>),
    Size(MemoryType, Reply<u32>),
    SetValue(MemoryType, u32, u8, Reply<()>),
    State(MemoryType, Reply<Vec<u8>>),
    SetState(MemoryType, Vec<u8>, Reply<()>),
    Shutdown,
}

/// Thread serving requests against a native core
pub struct CoreHost {
    sender: Sender<CoreRequest>,
    handle: Option<JoinHandle<()>>,
}

impl CoreHost {
    /// Spawn the host thread; `capacity` bounds the number of queued requests
    pub fn spawn(core: Arc<dyn NativeCore>, capacity: usize) -> std::io::Result<(Self, RemoteCore)> {
        let (sender, receiver) = channel::bounded(capacity.max(1));
        let handle = thread::Builder::new()
            .name("bw-core-host".to_string())
            .spawn(move || Self::serve(core, receiver))?;
        tracing::debug!("Core host thread started");
        Ok((
            Self {
                sender: sender.clone(),
                handle: Some(handle),
            },
            RemoteCore { sender },
        ))
    }

    fn serve(core: Arc<dyn NativeCore>, receiver: Receiver<CoreRequest>) {
        // A failed reply send means the caller gave up waiting; nothing to do
        for request in receiver {
            match request {
                CoreRequest::Absolute(addr, reply) => {
                    let _ = reply.send(core.absolute_address(addr));
                }
                CoreRequest::Relative(addr, cpu, reply) => {
                    let _ = reply.send(core.relative_address(addr, cpu));
                }
                CoreRequest::Size(t, reply) => {
                    let _ = reply.send(core.memory_size(t));
                }
                CoreRequest::SetValue(t, offset, value, reply) => {
                    let _ = reply.send(core.set_memory_value(t, offset, value));
                }
                CoreRequest::State(t, reply) => {
                    let _ = reply.send(core.memory_state(t));
                }
                CoreRequest::SetState(t, data, reply) => {
                    let _ = reply.send(core.set_memory_state(t, &data));
                }
                CoreRequest::Shutdown => break,
            }
        }
        tracing::debug!("Core host thread exiting");
    }

    /// Stop the host thread and wait for it to exit
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.sender.send(CoreRequest::Shutdown);
            if handle.join().is_err() {
                tracing::error!("Core host thread panicked");
            }
        }
    }
}

impl Drop for CoreHost {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Client side of a [`CoreHost`]
#[derive(Clone)]
pub struct RemoteCore {
    sender: Sender<CoreRequest>,
}

impl RemoteCore {
    fn call<T>(&self, request: impl FnOnce(Reply<T>) -> CoreRequest) -> Result<T, CoreError> {
        let (reply, response) = channel::bounded(1);
        self.sender
            .send(request(reply))
            .map_err(|_| CoreError::Disconnected)?;
        response.recv().map_err(|_| CoreError::Disconnected)?
    }
}

impl NativeCore for RemoteCore {
    fn absolute_address(&self, relative: AddressInfo) -> Result<AddressInfo, CoreError> {
        self.call(|reply| CoreRequest::Absolute(relative, reply))
    }

    fn relative_address(
        &self,
        absolute: AddressInfo,
        cpu_type: CpuType,
    ) -> Result<AddressInfo, CoreError> {
        self.call(|reply| CoreRequest::Relative(absolute, cpu_type, reply))
    }

    fn memory_size(&self, memory_type: MemoryType) -> Result<u32, CoreError> {
        self.call(|reply| CoreRequest::Size(memory_type, reply))
    }

    fn set_memory_value(
        &self,
        memory_type: MemoryType,
        offset: u32,
        value: u8,
    ) -> Result<(), CoreError> {
        self.call(|reply| CoreRequest::SetValue(memory_type, offset, value, reply))
    }

    fn memory_state(&self, memory_type: MemoryType) -> Result<Vec<u8>, CoreError> {
        self.call(|reply| CoreRequest::State(memory_type, reply))
    }

    fn set_memory_state(&self, memory_type: MemoryType, data: &[u8]) -> Result<(), CoreError> {
        let data = data.to_vec();
        self.call(|reply| CoreRequest::SetState(memory_type, data, reply))
    }
}

//! Pooled statement buffers.
//!
//! Every builder writes into a [`PooledBuffer`] taken from a bounded
//! [`BufferPool`]. Acquiring never blocks: an empty pool allocates a fresh
//! buffer. The guard hands its buffer back on drop, so release happens exactly
//! once on every path, including early returns and errors.

use parking_lot::Mutex;
use std::ops::{Deref, DerefMut};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Configuration for a [`BufferPool`].
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of idle buffers kept for reuse.
    pub max_idle: usize,
    /// Capacity of freshly allocated buffers.
    pub initial_capacity: usize,
    /// Buffers that grew beyond this capacity are dropped instead of pooled.
    pub max_retained_capacity: usize,
    /// Number of simultaneously open buffers above which a warning is logged.
    pub active_warn_threshold: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle: 256,
            initial_capacity: 256,
            max_retained_capacity: 16 * 1024,
            active_warn_threshold: 1024,
        }
    }
}

impl PoolConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of idle buffers.
    pub fn with_max_idle(mut self, max_idle: usize) -> Self {
        self.max_idle = max_idle;
        self
    }

    /// Set the capacity of new buffers.
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Set the largest capacity a buffer may have and still be pooled.
    pub fn with_max_retained_capacity(mut self, capacity: usize) -> Self {
        self.max_retained_capacity = capacity;
        self
    }

    /// Set the open-buffer high-water mark.
    pub fn with_active_warn_threshold(mut self, threshold: usize) -> Self {
        self.active_warn_threshold = threshold;
        self
    }
}

/// A bounded pool of reusable `String` buffers.
#[derive(Debug)]
pub struct BufferPool {
    config: PoolConfig,
    idle: Mutex<Vec<String>>,
    active: AtomicUsize,
}

static GLOBAL: OnceLock<BufferPool> = OnceLock::new();

impl BufferPool {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            idle: Mutex::new(Vec::with_capacity(config.max_idle.min(64))),
            active: AtomicUsize::new(0),
            config,
        }
    }

    /// Install the process-wide pool.
    ///
    /// Returns `false` if the global pool was already initialized (explicitly
    /// or by a first builder), in which case `config` is ignored.
    pub fn init_global(config: PoolConfig) -> bool {
        let mut installed = false;
        GLOBAL.get_or_init(|| {
            installed = true;
            BufferPool::new(config)
        });
        installed
    }

    /// The process-wide pool used by statement builders.
    pub fn global() -> &'static BufferPool {
        GLOBAL.get_or_init(|| BufferPool::new(PoolConfig::default()))
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Take a buffer from the pool, allocating if none is idle.
    pub fn acquire(&'static self) -> PooledBuffer {
        let buf = self
            .idle
            .lock()
            .pop()
            .unwrap_or_else(|| String::with_capacity(self.config.initial_capacity));

        let open = self.active.fetch_add(1, Ordering::Relaxed) + 1;
        if open == self.config.active_warn_threshold + 1 {
            tracing::warn!(
                open,
                threshold = self.config.active_warn_threshold,
                "statement builders open above high-water mark; builders may be leaking"
            );
        }

        PooledBuffer { buf, pool: self }
    }

    fn release(&self, mut buf: String) {
        self.active.fetch_sub(1, Ordering::Relaxed);
        if buf.capacity() > self.config.max_retained_capacity {
            return;
        }
        buf.clear();
        let mut idle = self.idle.lock();
        if idle.len() < self.config.max_idle {
            idle.push(buf);
        }
    }

    /// Number of buffers currently handed out.
    pub fn active_count(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }

    /// Number of buffers waiting for reuse.
    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }
}

/// A buffer on loan from a [`BufferPool`]; returned on drop.
#[derive(Debug)]
pub struct PooledBuffer {
    buf: String,
    pool: &'static BufferPool,
}

impl Deref for PooledBuffer {
    type Target = String;

    fn deref(&self) -> &String {
        &self.buf
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut String {
        &mut self.buf
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}

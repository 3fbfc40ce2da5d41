use std::sync::Mutex;

/// The maximum amount of buffers a pool will retain.
const POOL_LIMIT: usize = 4;

/// A reuse pool for the byte buffers that back frame-area reads and file
/// copies. Buffers handed out by [`acquire`](BufPool::acquire) are always
/// zeroed to the requested length, and buffers given back are cleared before
/// they are retained, so no stale state can leak between operations.
pub(crate) struct BufPool {
    bufs: Mutex<Vec<Vec<u8>>>,
}

impl BufPool {
    pub const fn new() -> Self {
        Self {
            bufs: Mutex::new(Vec::new()),
        }
    }

    /// Take a zeroed buffer of exactly `len` bytes, reusing a pooled
    /// allocation when one is available.
    pub fn acquire(&self, len: usize) -> Vec<u8> {
        let mut buf = self.lock().pop().unwrap_or_default();

        buf.clear();
        buf.resize(len, 0);

        buf
    }

    /// Return a buffer to the pool. The buffer is cleared, keeping only its
    /// capacity for the next acquire.
    pub fn release(&self, mut buf: Vec<u8>) {
        buf.clear();

        let mut bufs = self.lock();

        if bufs.len() < POOL_LIMIT {
            bufs.push(buf);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<Vec<Vec<u8>>> {
        // A poisoned pool only ever holds empty buffers, so it's safe to keep
        // using it.
        match self.bufs.lock() {
            Ok(guard) => guard,
            Err(poison) => poison.into_inner(),
        }
    }
}

/// The process-wide buffer pool.
pub(crate) static BUF_POOL: BufPool = BufPool::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_zeroed_buffers() {
        let pool = BufPool::new();

        let mut buf = pool.acquire(8);
        assert_eq!(buf, vec![0; 8]);

        buf.copy_from_slice(b"\x16\x16\x16\x16\x16\x16\x16\x16");
        pool.release(buf);

        // Reused buffers must come back fully reset.
        let buf = pool.acquire(4);
        assert_eq!(buf, vec![0; 4]);
    }

    #[test]
    fn pool_retains_bounded() {
        let pool = BufPool::new();
        let bufs: Vec<Vec<u8>> = (0..8).map(|_| pool.acquire(16)).collect();

        for buf in bufs {
            pool.release(buf);
        }

        assert!(pool.lock().len() <= POOL_LIMIT);
    }
}

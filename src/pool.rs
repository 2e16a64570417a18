use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

/// The process wide pool used by the registry builder.
pub(crate) static STRINGS: Pool = Pool::new(8, 64 * 1024);

/// A bounded free list of string buffers.
///
/// At most `max_buffers` buffers are retained, and only if their capacity does not exceed `max_capacity`.
/// Anything else is dropped when it is given back.
pub(crate) struct Pool {
	buffers: Mutex<Vec<String>>,
	max_buffers: usize,
	max_capacity: usize,
}

impl Pool {
	pub(crate) const fn new(max_buffers: usize, max_capacity: usize) -> Self {
		Self {
			buffers: Mutex::new(Vec::new()),
			max_buffers,
			max_capacity,
		}
	}

	/// Take an empty buffer from the pool, or allocate a new one if the pool is empty.
	///
	/// The buffer is given back when the returned guard is dropped.
	pub(crate) fn take(&self) -> PooledString<'_> {
		// A poisoned lock only means another thread panicked while holding it, the buffers are still fine.
		// We simply stop pooling in that case.
		let buffer = self.buffers.lock().ok().and_then(|mut buffers| buffers.pop()).unwrap_or_default();
		PooledString { buffer, pool: self }
	}

	fn give_back(&self, mut buffer: String) {
		if buffer.capacity() == 0 || buffer.capacity() > self.max_capacity {
			return;
		}
		buffer.clear();
		if let Ok(mut buffers) = self.buffers.lock() {
			if buffers.len() < self.max_buffers {
				buffers.push(buffer);
			}
		}
	}

	#[cfg(test)]
	pub(crate) fn len(&self) -> usize {
		self.buffers.lock().map(|buffers| buffers.len()).unwrap_or(0)
	}
}

/// A string buffer borrowed from a [`Pool`].
///
/// The buffer goes back to the pool exactly once: when the guard is dropped.
pub(crate) struct PooledString<'a> {
	buffer: String,
	pool: &'a Pool,
}

impl Deref for PooledString<'_> {
	type Target = String;

	#[inline]
	fn deref(&self) -> &String {
		&self.buffer
	}
}

impl DerefMut for PooledString<'_> {
	#[inline]
	fn deref_mut(&mut self) -> &mut String {
		&mut self.buffer
	}
}

impl Drop for PooledString<'_> {
	fn drop(&mut self) {
		self.pool.give_back(std::mem::take(&mut self.buffer));
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use assert2::assert;

	#[test]
	fn buffers_are_reused() {
		let pool = Pool::new(2, 1024);
		let mut buffer = pool.take();
		buffer.push_str("hello");
		let capacity = buffer.capacity();
		drop(buffer);
		assert!(pool.len() == 1);

		let buffer = pool.take();
		assert!(buffer.is_empty());
		assert!(buffer.capacity() == capacity);
		assert!(pool.len() == 0);
	}

	#[test]
	fn pool_is_bounded() {
		let pool = Pool::new(2, 1024);
		let mut buffers: Vec<_> = (0..3).map(|_| pool.take()).collect();
		for buffer in &mut buffers {
			buffer.push('x');
		}
		drop(buffers);
		assert!(pool.len() == 2);
	}

	#[test]
	fn large_buffers_are_dropped() {
		let pool = Pool::new(2, 16);
		let mut buffer = pool.take();
		buffer.push_str(&"x".repeat(64));
		drop(buffer);
		assert!(pool.len() == 0);
	}

	#[test]
	fn unused_buffers_are_not_retained() {
		let pool = Pool::new(2, 16);
		drop(pool.take());
		assert!(pool.len() == 0);
	}
}

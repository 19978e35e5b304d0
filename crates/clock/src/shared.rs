//! A clock handle that can be read and steered from several threads.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::{Clock, ClockError};

/// Cloneable handle around a clock behind a mutex.
#[derive(Debug, Default)]
pub struct SharedClock<C> {
    inner: Arc<Mutex<C>>,
}

impl<C> Clone for SharedClock<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Clock> SharedClock<C> {
    pub fn new(clock: C) -> Self {
        Self {
            inner: Arc::new(Mutex::new(clock)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, C>, ClockError> {
        self.inner.lock().map_err(|_| ClockError::Poisoned)
    }

    pub fn now_millis(&self) -> Result<i64, ClockError> {
        Ok(self.lock()?.now_millis())
    }

    pub fn now(&self) -> Result<DateTime<Utc>, ClockError> {
        self.lock()?.now()
    }

    /// Run `f` with exclusive access to the clock.
    pub fn with<R>(&self, f: impl FnOnce(&mut C) -> R) -> Result<R, ClockError> {
        let mut guard = self.lock()?;
        Ok(f(&mut guard))
    }
}

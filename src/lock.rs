/// Something that can be locked and unlocked, like a credential store that
/// is reloaded when its backing file goes stale.
pub trait Lockable {
    fn lock(&self);
    fn unlock(&self);
}

/// Holds a lock on a [`Lockable`] and releases it when dropped, on every
/// path out of the scope.
///
/// ```rust
/// use std::cell::Cell;
/// use xmlbind::{Lockable, Locker};
///
/// struct Counter(Cell<i32>);
///
/// impl Lockable for Counter {
///     fn lock(&self) {
///         self.0.set(self.0.get() + 1);
///     }
///     fn unlock(&self) {
///         self.0.set(self.0.get() - 1);
///     }
/// }
///
/// let counter = Counter(Cell::new(0));
/// {
///     let _locker = Locker::new(&counter);
///     assert_eq!(counter.0.get(), 1);
/// }
/// assert_eq!(counter.0.get(), 0);
/// ```
#[must_use = "the lock is released as soon as the locker is dropped"]
pub struct Locker<'a, L: Lockable + ?Sized> {
    lockee: Option<&'a L>,
}

impl<'a, L: Lockable + ?Sized> Locker<'a, L> {
    /// Lock `lockee` until the locker is dropped.
    pub fn new(lockee: &'a L) -> Self {
        lockee.lock();
        Self {
            lockee: Some(lockee),
        }
    }

    /// A locker holding nothing yet.
    pub fn empty() -> Self {
        Self { lockee: None }
    }

    /// Take over an object that is already locked; it is unlocked when the
    /// locker is dropped.
    pub fn adopt(lockee: &'a L) -> Self {
        Self {
            lockee: Some(lockee),
        }
    }

    /// Unlock what is held, then lock and hold `lockee`.
    pub fn assign(&mut self, lockee: Option<&'a L>) {
        self.release();
        if let Some(lockee) = lockee {
            lockee.lock();
        }
        self.lockee = lockee;
    }

    /// Unlock early. Dropping the locker afterwards does nothing.
    pub fn release(&mut self) {
        if let Some(lockee) = self.lockee.take() {
            lockee.unlock();
        }
    }

    pub fn is_locked(&self) -> bool {
        self.lockee.is_some()
    }
}

impl<L: Lockable + ?Sized> Drop for Locker<'_, L> {
    fn drop(&mut self) {
        self.release();
    }
}

use core::{
    cell::UnsafeCell,
    marker::PhantomData,
    sync::atomic::{AtomicBool, Ordering},
};

use super::irq::{Interrupts, IrqControl};

/// IRQ-masking mutex for a single core.
///
/// - Masks interrupts on lock
/// - Restores the exact prior mask on drop
///
/// There is no spinning: with one core and the relevant interrupts masked,
/// nothing else can run. Only load/store atomics are used, so it works on
/// cores without compare-and-swap.
///
/// Safe to use from:
/// - IRQ context
/// - Normal context
///
/// Not reentrant. Debug builds assert on re-entry.
pub struct IrqMutex<T, I: IrqControl = Interrupts> {
    locked: AtomicBool,
    data: UnsafeCell<T>,
    _irq: PhantomData<I>,
}

unsafe impl<T: Send, I: IrqControl> Send for IrqMutex<T, I> {}
unsafe impl<T: Send, I: IrqControl> Sync for IrqMutex<T, I> {}

impl<T, I: IrqControl> IrqMutex<T, I> {
    /// Create a new IRQ-masking mutex.
    pub const fn new(data: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            data: UnsafeCell::new(data),
            _irq: PhantomData,
        }
    }

    /// Acquire the mutex with interrupts masked.
    pub fn lock(&self) -> IrqMutexGuard<'_, T, I> {
        let irq_state = I::disable();

        debug_assert!(
            !self.locked.load(Ordering::Relaxed),
            "IrqMutex locked re-entrantly"
        );
        self.locked.store(true, Ordering::Relaxed);

        IrqMutexGuard {
            lock: self,
            irq_state,
        }
    }

    /// Consume the mutex, returning the protected value.
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

/// Guard returned by `IrqMutex::lock`.
///
/// Restores interrupt state on drop.
pub struct IrqMutexGuard<'a, T, I: IrqControl> {
    lock: &'a IrqMutex<T, I>,
    irq_state: I::State,
}

impl<'a, T, I: IrqControl> core::ops::Deref for IrqMutexGuard<'a, T, I> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        // SAFETY: the guard exists only while interrupts are masked and the
        // lock flag is set, so no other reference to the data is live.
        unsafe { &*self.lock.data.get() }
    }
}

impl<'a, T, I: IrqControl> core::ops::DerefMut for IrqMutexGuard<'a, T, I> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: see `deref`.
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<'a, T, I: IrqControl> Drop for IrqMutexGuard<'a, T, I> {
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Relaxed);

        I::restore(self.irq_state);
    }
}

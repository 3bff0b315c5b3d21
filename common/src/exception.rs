//! Exception handler table.
//!
//! The vector stubs look up the handler for their exception kind here and
//! call it through [`dispatch`]. The table is guarded by an [`IrqMutex`], so
//! it can be updated from normal context while handlers are live.

use crate::sync::IrqMutex;

/// Handler invoked for an exception. Runs in the exception's mode.
pub type ExceptionHandler = fn();

/// ARM exception kinds, in vector-table order.
#[repr(usize)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExceptionKind {
    Reset = 0,
    Undefined = 1,
    SoftwareInterrupt = 2,
    PrefetchAbort = 3,
    DataAbort = 4,
    Irq = 5,
    Fiq = 6,
}

impl ExceptionKind {
    /// Number of exception kinds.
    pub const COUNT: usize = 7;
}

static HANDLERS: IrqMutex<[Option<ExceptionHandler>; ExceptionKind::COUNT]> =
    IrqMutex::new([None; ExceptionKind::COUNT]);

/// Install the handler for an exception kind, replacing any previous one.
pub fn set_handler(kind: ExceptionKind, handler: ExceptionHandler) {
    HANDLERS.lock()[kind as usize] = Some(handler);
}

/// The handler currently installed for `kind`.
pub fn get_handler(kind: ExceptionKind) -> Option<ExceptionHandler> {
    HANDLERS.lock()[kind as usize]
}

/// Call the handler for `kind`, if one is installed.
///
/// The table lock is released before the handler runs, so a handler may
/// install other handlers. Returns `false` when no handler is installed.
pub fn dispatch(kind: ExceptionKind) -> bool {
    match get_handler(kind) {
        Some(handler) => {
            handler();
            true
        }
        None => false,
    }
}

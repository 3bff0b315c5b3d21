//! Host stand-in used when building for anything but ARM.
//!
//! There are no real interrupts on the host. The mask is a plain atomic
//! word with the same bit semantics, so code that brackets state with
//! critical sections can be exercised and its mask bookkeeping checked.

pub mod irq;

pub mod critical_section;
pub mod irq;
pub mod irq_mutex;
pub use critical_section::CriticalSection;
pub use irq::{Fiq, InterruptMask, Interrupts, Irq, IrqControl};
pub use irq_mutex::IrqMutex;

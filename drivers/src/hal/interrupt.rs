//! Interrupt Controller Hardware Abstraction Layer.
//!
//! Drivers only register with the interrupt controller; how it
//! prioritizes and dispatches sources is its own business.

/// Interrupt source number.
pub type IrqNumber = u32;

/// Handler for an interrupt source, called by the controller's dispatcher.
pub type InterruptHandler = fn();

/// Interrupt priority level.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Priority {
    /// Routed to the CPU IRQ line.
    Normal,
}

/// Interrupt controller trait.
///
/// The surface a driver needs to hook its service routine up.
pub trait InterruptController {
    /// Route a source to a priority level.
    fn set_priority(&mut self, irq: IrqNumber, priority: Priority);

    /// Install the handler for a source, replacing any previous one.
    fn set_handler(&mut self, irq: IrqNumber, handler: InterruptHandler);

    /// Enable (unmask) a source at the controller.
    fn enable_interrupt(&mut self, irq: IrqNumber);
}

use crate::hal::interrupt::{InterruptController, InterruptHandler, IrqNumber, Priority};

const SOURCES: usize = 16;

/// Interrupt controller that records what drivers register.
pub struct SimInterruptController {
    priorities: [Option<Priority>; SOURCES],
    handlers: [Option<InterruptHandler>; SOURCES],
    enabled: u32,
}

impl SimInterruptController {
    pub const fn new() -> Self {
        Self {
            priorities: [None; SOURCES],
            handlers: [None; SOURCES],
            enabled: 0,
        }
    }

    pub fn priority(&self, irq: IrqNumber) -> Option<Priority> {
        self.priorities[irq as usize]
    }

    pub fn handler(&self, irq: IrqNumber) -> Option<InterruptHandler> {
        self.handlers[irq as usize]
    }

    pub fn is_enabled(&self, irq: IrqNumber) -> bool {
        self.enabled & (1 << irq) != 0
    }

    /// Call the handler of an enabled source. Returns whether it ran.
    pub fn fire(&self, irq: IrqNumber) -> bool {
        match self.handler(irq) {
            Some(handler) if self.is_enabled(irq) => {
                handler();
                true
            }
            _ => false,
        }
    }
}

impl Default for SimInterruptController {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptController for SimInterruptController {
    fn set_priority(&mut self, irq: IrqNumber, priority: Priority) {
        self.priorities[irq as usize] = Some(priority);
    }

    fn set_handler(&mut self, irq: IrqNumber, handler: InterruptHandler) {
        self.handlers[irq as usize] = Some(handler);
    }

    fn enable_interrupt(&mut self, irq: IrqNumber) {
        self.enabled |= 1 << irq;
    }
}

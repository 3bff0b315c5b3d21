use common::sync::IrqMutex;

use crate::hal::serial::SerialError;

/// Maximum number of named devices.
pub const MAX_DEVICES: usize = 8;

/// Non-blocking send entry point of a serial device.
pub type SendFn = fn(u32, &[u8]) -> Result<usize, SerialError>;

/// Non-blocking receive entry point of a serial device.
pub type ReceiveFn = fn(u32, &mut [u8]) -> Result<usize, SerialError>;

/// A serial device as seen by the rest of the system: an instance id plus
/// the functions that move bytes through it.
#[derive(Debug, Copy, Clone)]
pub struct SerialDevice {
    pub id: u32,
    pub send: SendFn,
    pub receive: ReceiveFn,
}

impl SerialDevice {
    pub fn send(&self, bytes: &[u8]) -> Result<usize, SerialError> {
        (self.send)(self.id, bytes)
    }

    pub fn receive(&self, buffer: &mut [u8]) -> Result<usize, SerialError> {
        (self.receive)(self.id, buffer)
    }
}

/// Device types that can be managed
#[derive(Debug, Copy, Clone)]
pub enum Device {
    Serial(SerialDevice),
}

/// Where drivers publish their devices.
pub trait DeviceRegistry {
    fn register_serial(&mut self, name: &'static str, device: SerialDevice);
}

pub struct DeviceManager {
    devices: [Option<(&'static str, Device)>; MAX_DEVICES],
}

impl DeviceManager {
    pub const fn new() -> Self {
        Self {
            devices: [None; MAX_DEVICES],
        }
    }

    /// Register `device` under `name`, replacing any device already there.
    ///
    /// A new name is dropped with a warning once the table is full.
    pub fn register(&mut self, name: &'static str, device: Device) {
        if let Some(slot) = self
            .devices
            .iter_mut()
            .flatten()
            .find(|(existing, _)| *existing == name)
        {
            slot.1 = device;
            return;
        }

        match self.devices.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => *slot = Some((name, device)),
            None => log::warn!("device table full, dropping {name}"),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Device> {
        self.devices
            .iter()
            .flatten()
            .find(|(existing, _)| *existing == name)
            .map(|(_, device)| device)
    }

    pub fn list(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.devices.iter().flatten().map(|(name, _)| *name)
    }

    pub fn serial(&self, name: &str) -> Option<SerialDevice> {
        match self.get(name)? {
            Device::Serial(serial) => Some(*serial),
        }
    }

    pub fn console(&self) -> Option<SerialDevice> {
        self.serial("console")
    }
}

impl Default for DeviceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceRegistry for DeviceManager {
    fn register_serial(&mut self, name: &'static str, device: SerialDevice) {
        self.register(name, Device::Serial(device));
    }
}

static DEVICE_MANAGER: IrqMutex<DeviceManager> = IrqMutex::new(DeviceManager::new());

pub fn devices() -> &'static IrqMutex<DeviceManager> {
    &DEVICE_MANAGER
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo_send(id: u32, bytes: &[u8]) -> Result<usize, SerialError> {
        if id == 0 {
            Ok(bytes.len())
        } else {
            Err(SerialError::InvalidParameter)
        }
    }

    fn fill_receive(_id: u32, buffer: &mut [u8]) -> Result<usize, SerialError> {
        buffer.fill(b'r');
        Ok(buffer.len())
    }

    fn serial(id: u32) -> SerialDevice {
        SerialDevice {
            id,
            send: echo_send,
            receive: fill_receive,
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut manager = DeviceManager::new();
        manager.register_serial("console", serial(0));

        let console = manager.console().unwrap();
        assert_eq!(console.id, 0);
        assert_eq!(console.send(b"abc"), Ok(3));

        let mut buf = [0u8; 2];
        assert_eq!(console.receive(&mut buf), Ok(2));
        assert_eq!(&buf, b"rr");

        assert!(manager.serial("missing").is_none());
    }

    #[test]
    fn test_same_name_replaces() {
        let mut manager = DeviceManager::new();
        manager.register_serial("uart", serial(0));
        manager.register_serial("uart", serial(1));

        assert_eq!(manager.list().count(), 1);
        let uart = manager.serial("uart").unwrap();
        assert_eq!(uart.send(b"x"), Err(SerialError::InvalidParameter));
    }

    #[test]
    fn test_full_table_drops_new_names() {
        const NAMES: [&str; MAX_DEVICES + 1] =
            ["d0", "d1", "d2", "d3", "d4", "d5", "d6", "d7", "d8"];

        let mut manager = DeviceManager::new();
        for (id, &name) in NAMES.iter().enumerate() {
            manager.register_serial(name, serial(id as u32));
        }

        assert_eq!(manager.list().count(), MAX_DEVICES);
        assert!(manager.serial("d8").is_none());

        // Existing names can still be replaced.
        manager.register_serial("d3", serial(42));
        assert_eq!(manager.serial("d3").map(|d| d.id), Some(42));
    }

    #[test]
    fn test_list_in_registration_order() {
        let mut manager = DeviceManager::new();
        manager.register_serial("b", serial(0));
        manager.register_serial("a", serial(1));

        let mut names = manager.list();
        assert_eq!(names.next(), Some("b"));
        assert_eq!(names.next(), Some("a"));
        assert_eq!(names.next(), None);
    }
}

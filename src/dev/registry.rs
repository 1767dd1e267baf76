use core::fmt::Write;

use alloc::{boxed::Box, vec::Vec};
use arrayvec::ArrayString;

use crate::config::DESCR_CAPACITY;

use super::{DevClass, DevError, DevResult, Device, DriverDesc};

pub type DevName = ArrayString<16>;
pub type DevDescr = ArrayString<DESCR_CAPACITY>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DevHandle(usize);

struct DevEntry {
    name: DevName,
    description: DevDescr,
    drv: &'static DriverDesc,
    dev: Box<dyn Device>,
}

/// Devices attached by driver probe routines.
///
/// Devices are never detached, so a [`DevHandle`] stays valid for the lifetime of the registry.
pub struct DeviceRegistry {
    devices: Vec<DevEntry>,
}

impl DeviceRegistry {
    pub const fn new() -> Self {
        Self {
            devices: Vec::new(),
        }
    }

    /// Attaches `dev` under the next free `<bootname><n>` name of its driver.
    pub fn attach(
        &mut self,
        drv: &'static DriverDesc,
        dev: Box<dyn Device>,
        description: &str,
    ) -> DevResult<DevHandle> {
        let unit = self
            .devices
            .iter()
            .filter(|e| e.drv.bootname == drv.bootname)
            .count();

        let mut name = DevName::new();
        write!(name, "{}{unit}", drv.bootname).map_err(|_| DevError::InvalidArgument)?;
        let description = DevDescr::from(description).map_err(|_| DevError::InvalidArgument)?;

        if self.devices.try_reserve(1).is_err() {
            return Err(DevError::NoMem);
        }

        log::debug!("attached {name}: {description}");
        self.devices.push(DevEntry {
            name,
            description,
            drv,
            dev,
        });
        Ok(DevHandle(self.devices.len() - 1))
    }

    pub fn find(&self, name: &str) -> Option<DevHandle> {
        self.devices
            .iter()
            .position(|e| e.name.as_str() == name)
            .map(DevHandle)
    }

    pub fn name(&self, h: DevHandle) -> Option<&str> {
        self.devices.get(h.0).map(|e| e.name.as_str())
    }

    pub fn description(&self, h: DevHandle) -> Option<&str> {
        self.devices.get(h.0).map(|e| e.description.as_str())
    }

    pub fn class(&self, h: DevHandle) -> Option<DevClass> {
        self.devices.get(h.0).map(|e| e.drv.class)
    }

    pub fn get_mut(&mut self, h: DevHandle) -> DevResult<&mut (dyn Device + 'static)> {
        match self.devices.get_mut(h.0) {
            Some(e) => Ok(e.dev.as_mut()),
            None => Err(DevError::NotFound),
        }
    }

    /// Names and descriptions of every attached device, in attach order.
    pub fn iter(&self) -> impl Iterator<Item = (DevHandle, &str, &str)> {
        self.devices
            .iter()
            .enumerate()
            .map(|(i, e)| (DevHandle(i), e.name.as_str(), e.description.as_str()))
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

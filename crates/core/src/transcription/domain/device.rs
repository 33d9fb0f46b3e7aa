use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Caller-requested compute device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DevicePreference {
    Auto,
    Cpu,
    Cuda,
}

/// Concrete device the pipeline will run on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Device {
    Cpu,
    Cuda,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DeviceError {
    #[error("requested device '{0}' is not available on this machine")]
    Unavailable(&'static str),
}

/// Resolve a device preference against detected hardware capability.
///
/// `auto` takes the accelerated device when present and falls back to CPU.
/// An explicit `cuda` request with no acceleration present is a caller
/// configuration error, never a silent downgrade.
pub fn resolve(
    preference: DevicePreference,
    accelerated_available: bool,
) -> Result<Device, DeviceError> {
    match preference {
        DevicePreference::Auto => {
            if accelerated_available {
                Ok(Device::Cuda)
            } else {
                Ok(Device::Cpu)
            }
        }
        DevicePreference::Cpu => Ok(Device::Cpu),
        DevicePreference::Cuda => {
            if accelerated_available {
                Ok(Device::Cuda)
            } else {
                Err(DeviceError::Unavailable("cuda"))
            }
        }
    }
}

impl fmt::Display for DevicePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DevicePreference::Auto => write!(f, "auto"),
            DevicePreference::Cpu => write!(f, "cpu"),
            DevicePreference::Cuda => write!(f, "cuda"),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda => write!(f, "cuda"),
        }
    }
}

impl FromStr for DevicePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(DevicePreference::Auto),
            "cpu" => Ok(DevicePreference::Cpu),
            "cuda" => Ok(DevicePreference::Cuda),
            other => Err(format!(
                "Device must be one of: auto, cpu, cuda, got '{other}'"
            )),
        }
    }
}

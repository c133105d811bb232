//! Player Adapters - 宿主音频输出设备

mod rodio_device;

pub use rodio_device::{RodioDevice, RodioDeviceFactory};

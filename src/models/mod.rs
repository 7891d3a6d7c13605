pub mod camera;
pub mod scan_result;

pub use camera::{CameraDescriptor, DeviceKind, MediaDeviceInfo};
pub use scan_result::{format_scan_result, format_scan_result_at, ScanResult, FILE_SCAN_FORMAT};

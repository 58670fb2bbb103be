//! Error types for the climate globe.
//!
//! This module provides error types for GPU surface creation, dataset loading,
//! and running the viewer.

use std::fmt;

/// Errors that can occur while acquiring a render surface.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// The adapter reports no usable format for the surface.
    UnsupportedSurface,
    /// The container has no drawable area (zero width or height).
    EmptyViewport,
    /// The scene lacks a node the surface needs to upload.
    IncompleteScene,
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            GpuError::UnsupportedSurface => write!(f, "The GPU adapter cannot present to this window"),
            GpuError::EmptyViewport => write!(f, "Cannot create a render surface for a zero-sized viewport"),
            GpuError::IncompleteScene => write!(f, "Cannot create a render surface for an incomplete scene"),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur while loading or validating a dataset.
#[derive(Debug)]
pub enum DatasetError {
    /// Failed to read the dataset file from disk.
    Io(std::io::Error),
    /// The file is not valid dataset JSON.
    Parse(serde_json::Error),
    /// The dataset has no periods.
    NoPeriods,
    /// A series does not have one value per period.
    SeriesLength {
        category: String,
        series: String,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetError::Io(e) => write!(f, "Failed to read dataset file: {}", e),
            DatasetError::Parse(e) => write!(f, "Failed to parse dataset: {}", e),
            DatasetError::NoPeriods => write!(f, "Dataset must contain at least one period"),
            DatasetError::SeriesLength {
                category,
                series,
                expected,
                found,
            } => write!(
                f,
                "Series '{}/{}' has {} values but the dataset has {} periods",
                category, series, found, expected
            ),
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatasetError::Io(e) => Some(e),
            DatasetError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DatasetError {
    fn from(e: std::io::Error) -> Self {
        DatasetError::Io(e)
    }
}

impl From<serde_json::Error> for DatasetError {
    fn from(e: serde_json::Error) -> Self {
        DatasetError::Parse(e)
    }
}

/// Errors that can occur when running the globe viewer.
#[derive(Debug)]
pub enum GlobeError {
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// Render surface acquisition failed.
    Gpu(GpuError),
    /// The dataset could not be loaded.
    Dataset(DatasetError),
}

impl fmt::Display for GlobeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlobeError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            GlobeError::Window(e) => write!(f, "Failed to create window: {}", e),
            GlobeError::Gpu(e) => write!(f, "GPU error: {}", e),
            GlobeError::Dataset(e) => write!(f, "Dataset error: {}", e),
        }
    }
}

impl std::error::Error for GlobeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GlobeError::EventLoop(e) => Some(e),
            GlobeError::Window(e) => Some(e),
            GlobeError::Gpu(e) => Some(e),
            GlobeError::Dataset(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for GlobeError {
    fn from(e: winit::error::EventLoopError) -> Self {
        GlobeError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for GlobeError {
    fn from(e: winit::error::OsError) -> Self {
        GlobeError::Window(e)
    }
}

impl From<GpuError> for GlobeError {
    fn from(e: GpuError) -> Self {
        GlobeError::Gpu(e)
    }
}

impl From<DatasetError> for GlobeError {
    fn from(e: DatasetError) -> Self {
        GlobeError::Dataset(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_series_length_message() {
        let err = DatasetError::SeriesLength {
            category: "atmosphere".into(),
            series: "co2_ppm".into(),
            expected: 5,
            found: 3,
        };
        assert_eq!(
            err.to_string(),
            "Series 'atmosphere/co2_ppm' has 3 values but the dataset has 5 periods"
        );
    }

    #[test]
    fn test_globe_error_source_chain() {
        let err = GlobeError::from(GpuError::NoAdapter);
        assert!(err.to_string().starts_with("GPU error:"));
        assert!(err.source().is_some());
    }
}

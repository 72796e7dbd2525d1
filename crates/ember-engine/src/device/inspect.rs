//! Adapter/device capability reports.
//!
//! The report is diagnostic output only. Nothing here changes how the
//! bootstrap sequence behaves.

use std::fmt;
use std::io::Write;

use super::driver::GpuDriver;
use super::error::InspectError;

/// Texture-related numeric limits.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct TextureLimits {
    pub max_texture_dimension_1d: u32,
    pub max_texture_dimension_2d: u32,
    pub max_texture_dimension_3d: u32,
    pub max_texture_array_layers: u32,
}

impl From<&wgpu::Limits> for TextureLimits {
    fn from(limits: &wgpu::Limits) -> Self {
        Self {
            max_texture_dimension_1d: limits.max_texture_dimension_1d,
            max_texture_dimension_2d: limits.max_texture_dimension_2d,
            max_texture_dimension_3d: limits.max_texture_dimension_3d,
            max_texture_array_layers: limits.max_texture_array_layers,
        }
    }
}

/// Name of one optional feature.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct FeatureName(pub &'static str);

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Descriptive adapter properties.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct AdapterProperties {
    pub vendor_id: u32,
    pub device_id: u32,
    pub name: String,
    pub driver: String,
    pub driver_description: String,
    pub adapter_type: String,
    pub backend_type: String,
}

/// Point-in-time copy of what an adapter or device advertises.
#[derive(Debug, Clone, Default)]
pub(crate) struct CapabilitySnapshot {
    pub limits: Option<TextureLimits>,
    pub features: Vec<FeatureName>,
    pub properties: Option<AdapterProperties>,
}

impl CapabilitySnapshot {
    pub(crate) fn of_adapter<D: GpuDriver>(driver: &D, adapter: &D::Adapter) -> Result<Self, InspectError> {
        Ok(Self {
            limits: driver.adapter_limits(adapter),
            features: enumerate_features("ADAPTER", |dest| driver.adapter_features(adapter, dest))?,
            properties: Some(driver.adapter_properties(adapter)),
        })
    }

    pub(crate) fn of_device<D: GpuDriver>(driver: &D, device: &D::Device) -> Result<Self, InspectError> {
        Ok(Self {
            limits: driver.device_limits(device),
            features: enumerate_features("DEVICE", |dest| driver.device_features(device, dest))?,
            properties: None,
        })
    }

    pub(crate) fn write_report(&self, heading: &str, out: &mut dyn Write) -> std::io::Result<()> {
        if let Some(limits) = &self.limits {
            writeln!(out, "{heading} limits:")?;
            writeln!(out, " - maxTextureDimension1D: {}", limits.max_texture_dimension_1d)?;
            writeln!(out, " - maxTextureDimension2D: {}", limits.max_texture_dimension_2d)?;
            writeln!(out, " - maxTextureDimension3D: {}", limits.max_texture_dimension_3d)?;
            writeln!(out, " - maxTextureArrayLayers: {}", limits.max_texture_array_layers)?;
        }

        writeln!(out, "{heading} features:")?;
        for feature in &self.features {
            writeln!(out, " - {feature}")?;
        }

        if let Some(p) = &self.properties {
            writeln!(out, "{heading} properties:")?;
            writeln!(out, " - vendorID: {:#06x}", p.vendor_id)?;
            writeln!(out, " - deviceID: {:#06x}", p.device_id)?;
            if !p.name.is_empty() {
                writeln!(out, " - name: {}", p.name)?;
            }
            if !p.driver.is_empty() {
                writeln!(out, " - driver: {}", p.driver)?;
            }
            if !p.driver_description.is_empty() {
                writeln!(out, " - driverDescription: {}", p.driver_description)?;
            }
            writeln!(out, " - adapterType: {}", p.adapter_type)?;
            writeln!(out, " - backendType: {}", p.backend_type)?;
        }

        Ok(())
    }
}

/// Two-pass feature enumeration: count, allocate, fill.
///
/// # Panics
///
/// Panics if the driver reports a different count on the second pass.
fn enumerate_features(
    target: &'static str,
    mut query: impl FnMut(Option<&mut [FeatureName]>) -> usize,
) -> Result<Vec<FeatureName>, InspectError> {
    let count = query(None);

    let mut features = Vec::new();
    if features.try_reserve_exact(count).is_err() {
        return Err(InspectError::Allocation { target, count });
    }
    features.resize(count, FeatureName::default());

    let written = query(Some(&mut features));
    assert_eq!(
        written, count,
        "{target} feature enumeration returned {written} entries after reporting {count}"
    );

    Ok(features)
}

/// Writes the adapter's limits, features and properties to `out`.
pub fn inspect_adapter<D: GpuDriver>(
    driver: &D,
    adapter: &D::Adapter,
    out: &mut dyn Write,
) -> Result<(), InspectError> {
    let snapshot = CapabilitySnapshot::of_adapter(driver, adapter)?;
    snapshot.write_report("Adapter", out)?;
    Ok(())
}

/// Writes the device's features and limits to `out`.
pub fn inspect_device<D: GpuDriver>(
    driver: &D,
    device: &D::Device,
    out: &mut dyn Write,
) -> Result<(), InspectError> {
    let snapshot = CapabilitySnapshot::of_device(driver, device)?;
    snapshot.write_report("Device", out)?;
    Ok(())
}

// Copyright 2026 The hevk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Capabilities
//!
//! Optional device extensions that change how programs are built.  Detected once per physical
//! device and then passed around as plain booleans.

use std::ffi::CStr;

use ash::vk;

use crate::prelude::*;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// `VK_KHR_push_descriptor`
    pub push_descriptors: bool,
    /// `VK_EXT_mesh_shader`, preferred over the NV flavor.
    pub mesh_shading: bool,
    /// Only `VK_NV_mesh_shader` is available.
    pub mesh_shading_nv: bool,
}

impl Capabilities {
    pub fn detect(
        instance: &ash::Instance,
        physical_device: vk::PhysicalDevice,
    ) -> Result<Self, VulkanError> {
        let properties =
            unsafe { instance.enumerate_device_extension_properties(physical_device)? };
        let names = properties
            .iter()
            .filter_map(|p| p.extension_name_as_c_str().ok());
        let capabilities = Self::from_extension_names(names);
        log::debug!("device capabilities: {capabilities:?}");
        Ok(capabilities)
    }

    pub fn from_extension_names<'a>(names: impl IntoIterator<Item = &'a CStr>) -> Self {
        let mut capabilities = Self::default();
        let mut nv = false;
        for name in names {
            if name == vk::KHR_PUSH_DESCRIPTOR_NAME {
                capabilities.push_descriptors = true;
            } else if name == vk::EXT_MESH_SHADER_NAME {
                capabilities.mesh_shading = true;
            } else if name == vk::NV_MESH_SHADER_NAME {
                nv = true;
            }
        }
        capabilities.mesh_shading_nv = nv && !capabilities.mesh_shading;
        capabilities
    }

    /// Device extensions to enable for these capabilities.
    pub fn required_extensions(&self) -> Vec<&'static CStr> {
        let mut extensions = Vec::with_capacity(2);
        if self.push_descriptors {
            extensions.push(vk::KHR_PUSH_DESCRIPTOR_NAME);
        }
        if self.mesh_shading {
            extensions.push(vk::EXT_MESH_SHADER_NAME);
        } else if self.mesh_shading_nv {
            extensions.push(vk::NV_MESH_SHADER_NAME);
        }
        extensions
    }

    /// An extension without the `meshShader` feature is no mesh shading at all.
    pub fn with_mesh_features(mut self, features: MeshFeatures) -> Self {
        if !features.mesh_shader {
            if self.mesh_shading || self.mesh_shading_nv {
                log::warn!("mesh shader extension present without the meshShader feature");
            }
            self.mesh_shading = false;
            self.mesh_shading_nv = false;
        }
        self
    }
}

/// Mesh shader features the device reports for whichever mesh extension is in use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeshFeatures {
    pub task_shader: bool,
    pub mesh_shader: bool,
}

impl MeshFeatures {
    pub fn query(
        instance: &ash::Instance,
        physical_device: vk::PhysicalDevice,
        capabilities: &Capabilities,
    ) -> Self {
        if capabilities.mesh_shading {
            let mut ext = vk::PhysicalDeviceMeshShaderFeaturesEXT::default();
            let mut features = vk::PhysicalDeviceFeatures2::default().push_next(&mut ext);
            unsafe { instance.get_physical_device_features2(physical_device, &mut features) };
            MeshFeatures {
                task_shader: ext.task_shader == vk::TRUE,
                mesh_shader: ext.mesh_shader == vk::TRUE,
            }
        } else if capabilities.mesh_shading_nv {
            let mut nv = vk::PhysicalDeviceMeshShaderFeaturesNV::default();
            let mut features = vk::PhysicalDeviceFeatures2::default().push_next(&mut nv);
            unsafe { instance.get_physical_device_features2(physical_device, &mut features) };
            MeshFeatures {
                task_shader: nv.task_shader == vk::TRUE,
                mesh_shader: nv.mesh_shader == vk::TRUE,
            }
        } else {
            MeshFeatures::default()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_extension_names() {
        let capabilities = Capabilities::from_extension_names([
            vk::KHR_SWAPCHAIN_NAME,
            vk::KHR_PUSH_DESCRIPTOR_NAME,
        ]);
        assert_eq!(
            capabilities,
            Capabilities {
                push_descriptors: true,
                mesh_shading: false,
                mesh_shading_nv: false,
            }
        );
        assert_eq!(
            capabilities.required_extensions(),
            vec![vk::KHR_PUSH_DESCRIPTOR_NAME]
        );
    }

    #[test]
    fn test_prefer_ext_mesh_shader() {
        let capabilities =
            Capabilities::from_extension_names([vk::NV_MESH_SHADER_NAME, vk::EXT_MESH_SHADER_NAME]);
        assert!(capabilities.mesh_shading);
        assert!(!capabilities.mesh_shading_nv);
        assert_eq!(
            capabilities.required_extensions(),
            vec![vk::EXT_MESH_SHADER_NAME]
        );

        let capabilities = Capabilities::from_extension_names([vk::NV_MESH_SHADER_NAME]);
        assert!(capabilities.mesh_shading_nv);
        assert_eq!(
            capabilities.required_extensions(),
            vec![vk::NV_MESH_SHADER_NAME]
        );
    }

    #[test]
    fn test_nothing_supported() {
        let capabilities = Capabilities::from_extension_names(std::iter::empty::<&CStr>());
        assert_eq!(capabilities, Capabilities::default());
        assert!(capabilities.required_extensions().is_empty());
    }

    #[test]
    fn test_mesh_features() {
        let ext = Capabilities::from_extension_names([vk::EXT_MESH_SHADER_NAME]);
        let mesh_only = MeshFeatures {
            task_shader: false,
            mesh_shader: true,
        };
        assert_eq!(ext.with_mesh_features(mesh_only), ext);

        let nv = Capabilities::from_extension_names([vk::NV_MESH_SHADER_NAME]);
        assert_eq!(nv.with_mesh_features(mesh_only), nv);

        let disabled = nv.with_mesh_features(MeshFeatures::default());
        assert_eq!(disabled, Capabilities::default());
        assert!(disabled.required_extensions().is_empty());
    }
}

// Copyright 2026 The hevk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Context
//!
//! Fundamentally required resources, including the entry, instance, and hardware device, are
//! encapsulated by `VkContext`.  The context is headless.  Presentation is somebody else's problem.
//!
//! Initializing a physical device for use results in a logical `ash::Device`, which is used in most
//! calls to Vulkan.  Optional extensions are enabled when [`Capabilities`] finds them.
//!
//! Set `HEVK_VALIDATION` to any non-empty value to enable the Khronos validation layer.

use std::ffi::CStr;

use ash::vk;

use crate::capabilities::MeshFeatures;
use crate::prelude::*;

static VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

pub struct VkContext {
    pub entry: ash::Entry,
    pub instance: ash::Instance,

    pub physical_device: vk::PhysicalDevice,
    /// Vulkan logical device
    pub device: ash::Device,
    pub capabilities: Capabilities,
    /// Loaded when push descriptors are supported.
    pub push_descriptor: Option<ash::khr::push_descriptor::Device>,

    /// One family that can do both graphics and compute.
    pub queue_family_index: u32,
    pub queue: vk::Queue,
    pub command_pool: vk::CommandPool,
}

fn validation_requested() -> bool {
    std::env::var_os("HEVK_VALIDATION").is_some_and(|v| !v.is_empty())
}

impl VkContext {
    /// Obtain an entry, instance, and initialized device.
    ///
    /// The first device with Vulkan 1.3 and a graphics and compute queue is used.
    pub fn new() -> Result<Self, VulkanError> {
        let entry = unsafe { ash::Entry::load()? };

        let mut layers = Vec::with_capacity(1);
        if validation_requested() {
            let available = unsafe { entry.enumerate_instance_layer_properties()? };
            if available
                .iter()
                .any(|l| l.layer_name_as_c_str().is_ok_and(|n| n == VALIDATION_LAYER))
            {
                layers.push(VALIDATION_LAYER.as_ptr());
            } else {
                log::warn!("HEVK_VALIDATION is set but {VALIDATION_LAYER:?} is not installed");
            }
        }

        let app_info = vk::ApplicationInfo::default()
            .application_name(c"hevk")
            .api_version(vk::API_VERSION_1_3);

        let instance_info = vk::InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_layer_names(&layers);

        let instance = unsafe { entry.create_instance(&instance_info, None)? };

        match Self::with_instance(entry, instance) {
            Ok(context) => Ok(context),
            Err((instance, e)) => {
                unsafe { instance.destroy_instance(None) };
                Err(e)
            }
        }
    }

    // Hands the instance back on failure so it can be destroyed.
    fn with_instance(
        entry: ash::Entry,
        instance: ash::Instance,
    ) -> Result<Self, (ash::Instance, VulkanError)> {
        let (physical_device, queue_family_index) = match pick_device(&instance) {
            Ok(Some(found)) => found,
            Ok(None) => return Err((instance, VulkanError::NoDevice)),
            Err(e) => return Err((instance, e)),
        };

        let capabilities = match Capabilities::detect(&instance, physical_device) {
            Ok(capabilities) => capabilities,
            Err(e) => return Err((instance, e)),
        };
        let mesh = MeshFeatures::query(&instance, physical_device, &capabilities);
        let capabilities = capabilities.with_mesh_features(mesh);

        let extensions: Vec<_> = capabilities
            .required_extensions()
            .iter()
            .map(|name| name.as_ptr())
            .collect();

        // Only what the device reports is enabled.
        let mut mesh_features = vk::PhysicalDeviceMeshShaderFeaturesEXT::default()
            .task_shader(mesh.task_shader)
            .mesh_shader(mesh.mesh_shader);
        let mut mesh_features_nv = vk::PhysicalDeviceMeshShaderFeaturesNV::default()
            .task_shader(mesh.task_shader)
            .mesh_shader(mesh.mesh_shader);
        let mut vulkan13_features = vk::PhysicalDeviceVulkan13Features::default()
            .dynamic_rendering(true)
            .synchronization2(true);

        let queue_priorities = [1.0];
        let queue_infos = [vk::DeviceQueueCreateInfo::default()
            .queue_family_index(queue_family_index)
            .queue_priorities(&queue_priorities)];

        let mut device_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_infos)
            .enabled_extension_names(&extensions)
            .push_next(&mut vulkan13_features);
        if capabilities.mesh_shading {
            device_info = device_info.push_next(&mut mesh_features);
        } else if capabilities.mesh_shading_nv {
            device_info = device_info.push_next(&mut mesh_features_nv);
        }

        let device = match unsafe { instance.create_device(physical_device, &device_info, None) } {
            Ok(device) => device,
            Err(e) => return Err((instance, e.into())),
        };

        let queue = unsafe { device.get_device_queue(queue_family_index, 0) };
        let pool_info = vk::CommandPoolCreateInfo::default()
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
            .queue_family_index(queue_family_index);
        let command_pool = match unsafe { device.create_command_pool(&pool_info, None) } {
            Ok(pool) => pool,
            Err(e) => {
                unsafe { device.destroy_device(None) };
                return Err((instance, e.into()));
            }
        };

        let push_descriptor = capabilities
            .push_descriptors
            .then(|| ash::khr::push_descriptor::Device::new(&instance, &device));

        log::info!(
            "device ready: queue family {queue_family_index}, {:?}",
            capabilities
        );

        Ok(Self {
            entry,
            instance,
            physical_device,
            device,
            capabilities,
            push_descriptor,
            queue_family_index,
            queue,
            command_pool,
        })
    }

    pub fn device(&self) -> &ash::Device {
        &self.device
    }

    // XXX in reality, this consumes the context, but ownership friction needs worked out.
    pub fn destroy(&self) {
        unsafe {
            self.device.destroy_command_pool(self.command_pool, None);
            self.device.destroy_device(None);
            self.instance.destroy_instance(None);
        }
    }
}

/// First physical device on Vulkan 1.3 with a queue family that does graphics and compute.
fn pick_device(instance: &ash::Instance) -> Result<Option<(vk::PhysicalDevice, u32)>, VulkanError> {
    let physical_devices = unsafe { instance.enumerate_physical_devices()? };
    for physical_device in physical_devices {
        let properties = unsafe { instance.get_physical_device_properties(physical_device) };
        if properties.api_version < vk::API_VERSION_1_3 {
            log::debug!(
                "skipping {:?}: Vulkan {}.{}",
                properties.device_name_as_c_str().unwrap_or(c"unknown"),
                vk::api_version_major(properties.api_version),
                vk::api_version_minor(properties.api_version),
            );
            continue;
        }

        let families =
            unsafe { instance.get_physical_device_queue_family_properties(physical_device) };
        if let Some(index) =
            min_caps_family(&families, vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE)
        {
            return Ok(Some((physical_device, index)));
        }
    }
    Ok(None)
}

/// Return the index of the family with the fewest capabilities beyond the requested `flags`.
fn min_caps_family(families: &[vk::QueueFamilyProperties], flags: vk::QueueFlags) -> Option<u32> {
    families
        .iter()
        .enumerate()
        .filter(|(_, f)| f.queue_flags.contains(flags) && f.queue_count > 0)
        .min_by_key(|(_, f)| f.queue_flags.as_raw().count_ones())
        .map(|(i, _)| i as u32)
}

#[cfg(test)]
mod test {
    use super::*;

    fn family(flags: vk::QueueFlags) -> vk::QueueFamilyProperties {
        vk::QueueFamilyProperties {
            queue_flags: flags,
            queue_count: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_min_caps_family() {
        let families = [
            family(vk::QueueFlags::TRANSFER),
            family(
                vk::QueueFlags::GRAPHICS
                    | vk::QueueFlags::COMPUTE
                    | vk::QueueFlags::TRANSFER
                    | vk::QueueFlags::SPARSE_BINDING,
            ),
            family(vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE | vk::QueueFlags::TRANSFER),
        ];
        let wanted = vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE;
        assert_eq!(min_caps_family(&families, wanted), Some(2));
        assert_eq!(min_caps_family(&families[..1], wanted), None);
        assert_eq!(
            min_caps_family(&families, vk::QueueFlags::TRANSFER),
            Some(0)
        );
    }

    #[test]
    #[ignore = "needs a Vulkan 1.3 device"]
    fn test_context_lifecycle() {
        let vk_context = VkContext::new().unwrap();
        vk_context.destroy();
    }
}

//! EKS node image (AMI type) catalog
//!
//! Fixed enumeration of OS-image identifiers partitioned by architecture and
//! accelerator presence. Compiled-in reference data, never mutated at
//! runtime.

use crate::quota_codes::resolve_gpu_quota_code;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Architecture {
    X86_64,
    Arm64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accelerator {
    Standard,
    Nvidia,
    Neuron,
}

/// One entry in the AMI type catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmiType {
    pub id: &'static str,
    pub architecture: Architecture,
    pub accelerator: Accelerator,
}

pub const AMI_TYPES: &[AmiType] = &[
    AmiType { id: "AL2023_x86_64_STANDARD", architecture: Architecture::X86_64, accelerator: Accelerator::Standard },
    AmiType { id: "AL2023_ARM_64_STANDARD", architecture: Architecture::Arm64, accelerator: Accelerator::Standard },
    AmiType { id: "AL2023_x86_64_NVIDIA", architecture: Architecture::X86_64, accelerator: Accelerator::Nvidia },
    AmiType { id: "AL2023_x86_64_NEURON", architecture: Architecture::X86_64, accelerator: Accelerator::Neuron },
    AmiType { id: "AL2_x86_64", architecture: Architecture::X86_64, accelerator: Accelerator::Standard },
    AmiType { id: "AL2_x86_64_GPU", architecture: Architecture::X86_64, accelerator: Accelerator::Nvidia },
    AmiType { id: "AL2_ARM_64", architecture: Architecture::Arm64, accelerator: Accelerator::Standard },
    AmiType { id: "BOTTLEROCKET_x86_64", architecture: Architecture::X86_64, accelerator: Accelerator::Standard },
    AmiType { id: "BOTTLEROCKET_ARM_64", architecture: Architecture::Arm64, accelerator: Accelerator::Standard },
    AmiType { id: "BOTTLEROCKET_x86_64_NVIDIA", architecture: Architecture::X86_64, accelerator: Accelerator::Nvidia },
    AmiType { id: "BOTTLEROCKET_ARM_64_NVIDIA", architecture: Architecture::Arm64, accelerator: Accelerator::Nvidia },
];

/// All catalog entries matching the given partition.
pub fn ami_types_for(architecture: Architecture, accelerator: Accelerator) -> Vec<&'static AmiType> {
    AMI_TYPES
        .iter()
        .filter(|t| t.architecture == architecture && t.accelerator == accelerator)
        .collect()
}

/// Whether the catalog contains `id`.
pub fn is_known_ami_type(id: &str) -> bool {
    AMI_TYPES.iter().any(|t| t.id == id)
}

/// Accelerator class implied by an instance type: Neuron for inf*/trn*,
/// Nvidia for the other GPU families, Standard otherwise.
pub fn accelerator_for_instance(instance_type: &str) -> Accelerator {
    match resolve_gpu_quota_code(instance_type) {
        Some(("L-1945791B", _)) => Accelerator::Neuron,
        Some(_) => Accelerator::Nvidia,
        None => Accelerator::Standard,
    }
}

/// Architecture implied by an instance type. Graviton families carry a `g`
/// in the suffix after the generation digit (m6g, c7gn, t4g); the GPU `g4`/
/// `g5` families are x86.
pub fn architecture_for_instance(instance_type: &str) -> Architecture {
    let family = instance_type
        .split('.')
        .next()
        .unwrap_or(instance_type)
        .to_ascii_lowercase();
    if resolve_gpu_quota_code(&family).is_some() {
        return Architecture::X86_64;
    }
    let suffix: String = family.chars().skip_while(|c| !c.is_ascii_digit()).collect();
    if suffix.chars().any(|c| c == 'g') {
        Architecture::Arm64
    } else {
        Architecture::X86_64
    }
}

/// Catalog entries compatible with an instance type, preferring the
/// matching architecture and accelerator partition.
pub fn recommended_ami_types(instance_type: &str) -> Vec<&'static AmiType> {
    ami_types_for(
        architecture_for_instance(instance_type),
        accelerator_for_instance(instance_type),
    )
}

//! Instance-type to Service Quotas code tables
//!
//! Fixed reference data, loaded as compiled-in constants and never mutated
//! at runtime. Lookup is exact match first, then longest family prefix.

/// Quota code shared by all standard (a/c/d/h/i/m/r/t/z) vCPU families,
/// and the fallback for unrecognized instance types.
pub const STANDARD_VCPU_QUOTA_CODE: &str = "L-34B43A08";

/// Assumed vCPU count per instance when live instance-type metadata is
/// unavailable.
pub const DEFAULT_INSTANCE_VCPUS: i32 = 4;

/// Exact instance-type entries. Checked before prefix matching so a curated
/// entry always wins.
const GPU_QUOTA_CODES: &[(&str, &str)] = &[
    ("g4dn.xlarge", "L-1216C47A"),
    ("g4dn.2xlarge", "L-1216C47A"),
    ("g4dn.4xlarge", "L-1216C47A"),
    ("g4dn.8xlarge", "L-1216C47A"),
    ("g4dn.12xlarge", "L-1216C47A"),
    ("g4dn.16xlarge", "L-1216C47A"),
    ("g4ad.xlarge", "L-1216C47A"),
    ("g4ad.2xlarge", "L-1216C47A"),
    ("g4ad.4xlarge", "L-1216C47A"),
    ("g5.xlarge", "L-DB2E81BA"),
    ("g5.2xlarge", "L-DB2E81BA"),
    ("g5.4xlarge", "L-DB2E81BA"),
    ("g5.8xlarge", "L-DB2E81BA"),
    ("g5.12xlarge", "L-DB2E81BA"),
    ("g5.16xlarge", "L-DB2E81BA"),
    ("g5.24xlarge", "L-DB2E81BA"),
    ("g5.48xlarge", "L-DB2E81BA"),
    ("p3.2xlarge", "L-417A185B"),
    ("p3.8xlarge", "L-417A185B"),
    ("p3.16xlarge", "L-417A185B"),
    ("p3dn.24xlarge", "L-417A185B"),
    ("p4d.24xlarge", "L-4EE23FB8"),
    ("p4de.24xlarge", "L-4EE23FB8"),
    ("p5.48xlarge", "L-4EE23FB8"),
    ("inf1.xlarge", "L-1945791B"),
    ("inf1.2xlarge", "L-1945791B"),
    ("inf1.6xlarge", "L-1945791B"),
    ("inf1.24xlarge", "L-1945791B"),
    ("trn1.2xlarge", "L-1945791B"),
    ("trn1.32xlarge", "L-1945791B"),
];

/// Family-prefix entries, matched when no exact entry exists. Longest
/// prefix wins.
const GPU_FAMILY_PREFIXES: &[(&str, &str)] = &[
    ("inf1", "L-1945791B"),
    ("trn1", "L-1945791B"),
    ("g4", "L-1216C47A"),
    ("g5", "L-DB2E81BA"),
    ("p3", "L-417A185B"),
    ("p4", "L-4EE23FB8"),
    ("p5", "L-4EE23FB8"),
];

/// GPU instance quota code → vCPU quota code for the same family.
const GPU_TO_VCPU_QUOTA: &[(&str, &str)] = &[
    ("L-1216C47A", "L-DB2E81BA"),
    ("L-DB2E81BA", "L-DB2E81BA"),
    ("L-417A185B", "L-417A185B"),
    ("L-4EE23FB8", "L-417A185B"),
    ("L-1945791B", "L-1945791B"),
];

/// Candidate regions for the sequential GPU capacity scan: the major
/// commercial regions across US/CA/SA/EU/APAC.
pub const GPU_SCAN_REGIONS: &[&str] = &[
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
    "ca-central-1",
    "sa-east-1",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "eu-central-1",
    "eu-north-1",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-south-1",
];

/// Resolve a GPU instance type to its Service Quotas code. Returns the
/// matched code and the prefix/type it matched on, or `None` when the type
/// is not a GPU type.
pub fn resolve_gpu_quota_code(instance_type: &str) -> Option<(&'static str, &'static str)> {
    let normalized = instance_type.trim().to_ascii_lowercase();

    if let Some((name, code)) = GPU_QUOTA_CODES.iter().find(|(name, _)| *name == normalized) {
        return Some((code, name));
    }

    // Longest prefix wins so e.g. "inf1" is preferred over a bare "i" family
    let mut best: Option<(&'static str, &'static str)> = None;
    for (prefix, code) in GPU_FAMILY_PREFIXES {
        if normalized.starts_with(prefix) {
            match best {
                Some((_, current)) if current.len() >= prefix.len() => {}
                _ => best = Some((code, prefix)),
            }
        }
    }
    best
}

/// Resolve any instance type to its vCPU quota code. Total: GPU families map
/// through the GPU→vCPU table, the standard families (a/c/d/h/i/m/r/t/z,
/// excluding inf*/trn*) share [`STANDARD_VCPU_QUOTA_CODE`], and anything
/// unrecognized falls back to the standard code as well.
pub fn resolve_vcpu_quota_code(instance_type: &str) -> &'static str {
    if let Some((gpu_code, _)) = resolve_gpu_quota_code(instance_type) {
        return GPU_TO_VCPU_QUOTA
            .iter()
            .find(|(from, _)| *from == gpu_code)
            .map(|(_, to)| *to)
            .unwrap_or(STANDARD_VCPU_QUOTA_CODE);
    }
    STANDARD_VCPU_QUOTA_CODE
}

/// Whether the type belongs to a GPU/accelerator family.
pub fn is_gpu_instance_type(instance_type: &str) -> bool {
    resolve_gpu_quota_code(instance_type).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_takes_priority() {
        let (code, matched) = resolve_gpu_quota_code("g4dn.xlarge").unwrap();
        assert_eq!(code, "L-1216C47A");
        assert_eq!(matched, "g4dn.xlarge");
    }

    #[test]
    fn test_unlisted_size_falls_back_to_prefix() {
        let (code, matched) = resolve_gpu_quota_code("g4dn.32xlarge").unwrap();
        assert_eq!(code, "L-1216C47A");
        assert_eq!(matched, "g4");
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let (code, _) = resolve_gpu_quota_code("G5.XLARGE").unwrap();
        assert_eq!(code, "L-DB2E81BA");
    }

    #[test]
    fn test_non_gpu_types_resolve_to_none() {
        assert!(resolve_gpu_quota_code("t3.medium").is_none());
        assert!(resolve_gpu_quota_code("m5.large").is_none());
        // inf2 is not in the accelerator tables
        assert!(resolve_gpu_quota_code("inf2.xlarge").is_none());
    }

    #[test]
    fn test_vcpu_resolution_is_total() {
        // GPU families map through the GPU→vCPU table
        assert_eq!(resolve_vcpu_quota_code("g5.xlarge"), "L-DB2E81BA");
        assert_eq!(resolve_vcpu_quota_code("p4d.24xlarge"), "L-417A185B");
        assert_eq!(resolve_vcpu_quota_code("trn1.2xlarge"), "L-1945791B");

        // Standard families share the standard code
        assert_eq!(resolve_vcpu_quota_code("t3.medium"), STANDARD_VCPU_QUOTA_CODE);
        assert_eq!(resolve_vcpu_quota_code("m5.large"), STANDARD_VCPU_QUOTA_CODE);
        assert_eq!(resolve_vcpu_quota_code("z1d.metal"), STANDARD_VCPU_QUOTA_CODE);

        // Unrecognized types never error
        assert_eq!(resolve_vcpu_quota_code("x2gd.medium"), STANDARD_VCPU_QUOTA_CODE);
        assert_eq!(resolve_vcpu_quota_code(""), STANDARD_VCPU_QUOTA_CODE);
        assert_eq!(resolve_vcpu_quota_code("not-a-type"), STANDARD_VCPU_QUOTA_CODE);
    }

    #[test]
    fn test_region_scan_list_is_fixed() {
        assert_eq!(GPU_SCAN_REGIONS.len(), 16);
        assert!(GPU_SCAN_REGIONS.contains(&"us-east-1"));
        assert!(GPU_SCAN_REGIONS.contains(&"ap-south-1"));
        assert!(GPU_SCAN_REGIONS.contains(&"sa-east-1"));
    }
}

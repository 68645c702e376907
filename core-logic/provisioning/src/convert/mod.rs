//! Conversion between the caller facing representations and the internal data model.
//!
//! - [`InputConverter`]: validates requests and converts them into clusters and configurations.
//! - [`operation_status`] and [`runtime_status`]: report records back to callers.
use std::cmp::Ordering;

use provisioner_errors::AppError;
use provisioner_errors::AppResult;

mod input;
mod status;

pub use self::input::InputConverter;
pub use self::status::operation_kind;
pub use self::status::operation_status;
pub use self::status::runtime_status;

/// Parse a Kubernetes version, accepting `major.minor` as a shorthand for `major.minor.0`.
pub fn parse_kubernetes_version(version: &str) -> AppResult<semver::Version> {
    let trimmed = version.trim().trim_start_matches('v');
    let normalised = match trimmed.matches('.').count() {
        0 => format!("{}.0.0", trimmed),
        1 => format!("{}.0", trimmed),
        _ => trimmed.to_string(),
    };
    semver::Version::parse(&normalised).map_err(|error| {
        AppError::bad_request(format!(
            "invalid Kubernetes version '{}': {}",
            version, error
        ))
    })
}

/// Compare two Kubernetes versions.
pub fn compare_kubernetes_versions(left: &str, right: &str) -> AppResult<Ordering> {
    let left = parse_kubernetes_version(left)?;
    let right = parse_kubernetes_version(right)?;
    Ok(left.cmp(&right))
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use provisioner_errors::ErrorCode;

    use super::compare_kubernetes_versions;
    use super::parse_kubernetes_version;

    #[test]
    fn minor_versions_are_normalised() {
        let version = parse_kubernetes_version("1.16").expect("version to parse");
        assert_eq!(version, semver::Version::new(1, 16, 0));
        let version = parse_kubernetes_version("v1.20.4").expect("version to parse");
        assert_eq!(version, semver::Version::new(1, 20, 4));
    }

    #[test]
    fn versions_compare_numerically() {
        let order = compare_kubernetes_versions("1.9", "1.10").expect("versions to compare");
        assert_eq!(order, Ordering::Less);
        let order = compare_kubernetes_versions("1.20", "1.20.0").expect("versions to compare");
        assert_eq!(order, Ordering::Equal);
    }

    #[test]
    fn invalid_version_is_bad_request() {
        let error = parse_kubernetes_version("latest").expect_err("version to be rejected");
        assert_eq!(error.code(), ErrorCode::BadRequest);
    }
}

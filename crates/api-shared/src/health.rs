use crate::dto::HealthRes;

/// Health check shared by every server binary through the REST router.
pub struct HealthService;

impl HealthService {
    /// Static method to check health without creating an instance
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Permissions API is alive".into(),
        }
    }
}

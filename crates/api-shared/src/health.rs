use crate::dto::HealthRes;

/// Simple health service shared by the API surfaces.
#[derive(Clone, Copy, Debug, Default)]
pub struct HealthService;

impl HealthService {
    /// Static health check; no instance needed.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Discharge assistant is alive".into(),
        }
    }
}

//! Service registry and lifecycle error types.

/// Error kinds for service operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ServiceErrorKind {
    /// A global service was requested that was never registered.
    #[display("Attempted to get global service '{}' that is not enabled", _0)]
    GlobalNotEnabled(String),

    /// A local service was requested that is not running on the guild.
    #[display(
        "Attempted to get local service '{}' that was not enabled on guild with ID {}",
        service,
        guild_id
    )]
    LocalNotEnabled {
        /// Service name.
        service: String,
        /// Guild the lookup was scoped to.
        guild_id: u64,
    },

    /// The service exists but is not of the requested concrete type.
    #[display("Service '{}' is not a {}", service, expected)]
    TypeMismatch {
        /// Service name.
        service: String,
        /// Name of the requested type.
        expected: &'static str,
    },

    /// A service with the same name is already registered.
    #[display("Service '{}' is already registered", _0)]
    DuplicateRegistration(String),

    /// A service failed to start.
    #[display("Service '{}' failed to start: {}", service, message)]
    StartFailed {
        /// Service name.
        service: String,
        /// Failure description.
        message: String,
    },

    /// A service failed to stop.
    #[display("Service '{}' failed to stop: {}", service, message)]
    StopFailed {
        /// Service name.
        service: String,
        /// Failure description.
        message: String,
    },
}

impl ServiceErrorKind {
    /// Check if this is a "service not enabled" lookup failure.
    pub fn is_not_enabled(&self) -> bool {
        matches!(self, Self::GlobalNotEnabled(_) | Self::LocalNotEnabled { .. })
    }
}

/// Service error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Service Error: {} at line {} in {}", kind, line, file)]
pub struct ServiceError {
    /// The error kind
    pub kind: ServiceErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl ServiceError {
    /// Create a new ServiceError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ServiceErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Convenience constructor for a start failure.
    #[track_caller]
    pub fn start_failed(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::StartFailed {
            service: service.into(),
            message: message.into(),
        })
    }

    /// Convenience constructor for a stop failure.
    #[track_caller]
    pub fn stop_failed(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::StopFailed {
            service: service.into(),
            message: message.into(),
        })
    }

    /// Check if this is a "service not enabled" lookup failure.
    pub fn is_not_enabled(&self) -> bool {
        self.kind.is_not_enabled()
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

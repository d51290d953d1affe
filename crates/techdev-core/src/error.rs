use thiserror::Error;

#[derive(Debug, Error)]
pub enum TechDevError {
    #[error("weak password: {0}")]
    WeakSecret(String),

    #[error("account already registered: {0}")]
    DuplicateIdentifier(String),

    #[error("invalid identifier '{0}': must be non-empty and contain no whitespace")]
    InvalidIdentifier(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("too many failed attempts: try again in {retry_after_minutes} minutes")]
    RateLimited { retry_after_minutes: i64 },

    #[error("weak tech lead token: {0}")]
    WeakToken(String),

    #[error("invalid role: {0}")]
    InvalidRole(String),

    #[error("role already assigned: {identifier} is a {current}")]
    RoleConflict { identifier: String, current: String },

    #[error("unknown page: {0}")]
    UnknownPage(String),

    #[error("not logged in")]
    NotAuthenticated,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("team is full: maximum team size is {capacity} members")]
    TeamFull { capacity: usize },

    #[error("handle '{0}' is already in this team")]
    DuplicateHandle(String),

    #[error("no member at position {position}: team has {len} members")]
    IndexOutOfRange { position: usize, len: usize },

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TechDevError>;

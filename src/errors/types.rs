use std::sync::Arc;
/// Shared, type-erased error value. Identity is the address of the allocation.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync + 'static>;
/// Named error with an optional cause, the building block scenarios are made of.
#[derive(Debug, Clone)]
pub struct FixError {
    pub name: String,
    pub message: String,
    pub cause: Option<SharedError>,
}
impl FixError {
    pub fn new(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            message: message.to_string(),
            cause: None,
        }
    }
    pub fn wrapping(name: &str, message: &str, cause: SharedError) -> Self {
        Self {
            name: name.to_string(),
            message: message.to_string(),
            cause: Some(cause),
        }
    }
    pub fn with_cause(mut self, cause: SharedError) -> Self {
        self.cause = Some(cause);
        self
    }
    pub fn shared(self) -> SharedError {
        Arc::new(self)
    }
}
impl std::fmt::Display for FixError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.name, self.message)
    }
}
impl std::error::Error for FixError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_deref().map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    #[test]
    fn test_display_and_source() {
        let root = FixError::new("disk_full", "no space left").shared();
        let wrapped = FixError::wrapping("write_failed", "cannot write", root.clone());
        assert_eq!(wrapped.to_string(), "[write_failed] cannot write");
        let source = wrapped.source().unwrap();
        assert_eq!(source.to_string(), "[disk_full] no space left");
        assert!(FixError::new("plain", "x").source().is_none());
    }
}

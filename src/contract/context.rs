//! Caller identity resolution

/// Supplies the address of the caller of the current call
pub trait Identity {
    fn current_sender(&self) -> Option<String>;
}

/// A fixed caller address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender(pub String);

impl Sender {
    pub fn new(address: &str) -> Self {
        Self(address.to_string())
    }
}

impl Identity for Sender {
    fn current_sender(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// No caller; transaction calls are rejected
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl Identity for Anonymous {
    fn current_sender(&self) -> Option<String> {
        None
    }
}

impl<T: Identity + ?Sized> Identity for &T {
    fn current_sender(&self) -> Option<String> {
        (**self).current_sender()
    }
}

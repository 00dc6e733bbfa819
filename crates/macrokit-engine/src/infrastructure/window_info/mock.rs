//! Settable window title source for unit testing.

use std::sync::{Arc, Mutex};

use super::ActiveWindowTitle;

/// A mock [`ActiveWindowTitle`] whose title tests set directly.
#[derive(Clone, Default)]
pub struct MockWindowTitle {
    title: Arc<Mutex<String>>,
}

impl MockWindowTitle {
    pub fn new(title: &str) -> Self {
        Self {
            title: Arc::new(Mutex::new(title.to_string())),
        }
    }

    /// Changes the reported foreground title, simulating a focus switch.
    pub fn set(&self, title: &str) {
        *self.title.lock().expect("lock poisoned") = title.to_string();
    }
}

impl ActiveWindowTitle for MockWindowTitle {
    fn current(&self) -> String {
        self.title.lock().expect("lock poisoned").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_title_reflects_latest_set() {
        let window = MockWindowTitle::new("Notepad");
        assert_eq!(window.current(), "Notepad");

        window.set("Calculator");
        assert_eq!(window.current(), "Calculator");
    }
}

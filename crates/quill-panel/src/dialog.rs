//! Modal dialog state.
//!
//! Only the open/closed state and content live here. Outside-click and
//! focus handling belong to the host's renderer, which calls [`Dialog::close`].

/// A titled modal with a text body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dialog {
    title: String,
    body: String,
    open: bool,
}

impl Dialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the dialog, replacing any previous content.
    pub fn open(&mut self, title: impl Into<String>, body: impl Into<String>) {
        self.title = title.into();
        self.body = body.into();
        self.open = true;
    }

    /// Hide the dialog. Content is kept until the next `open`.
    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_closed() {
        let dialog = Dialog::new();
        assert!(!dialog.is_open());
        assert_eq!(dialog.title(), "");
    }

    #[test]
    fn test_open_close() {
        let mut dialog = Dialog::new();
        dialog.open("Translation", "Привет");
        assert!(dialog.is_open());
        assert_eq!(dialog.title(), "Translation");
        assert_eq!(dialog.body(), "Привет");

        dialog.close();
        assert!(!dialog.is_open());
        assert_eq!(dialog.body(), "Привет");
    }

    #[test]
    fn test_reopen_replaces_content() {
        let mut dialog = Dialog::new();
        dialog.open("A", "first");
        dialog.close();
        dialog.open("B", "second");
        assert_eq!(dialog.title(), "B");
        assert_eq!(dialog.body(), "second");
    }
}

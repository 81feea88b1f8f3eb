use owo_colors::OwoColorize;

/// Terminal coloring, switched off entirely by `--no-color`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paint {
    enabled: bool,
}

impl Paint {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn red(self, text: &str) -> String {
        self.apply(text, |t| t.red().to_string())
    }

    pub fn green(self, text: &str) -> String {
        self.apply(text, |t| t.green().to_string())
    }

    pub fn yellow(self, text: &str) -> String {
        self.apply(text, |t| t.yellow().to_string())
    }

    pub fn blue(self, text: &str) -> String {
        self.apply(text, |t| t.blue().to_string())
    }

    fn apply(self, text: &str, color: impl Fn(&str) -> String) -> String {
        if self.enabled {
            color(text)
        } else {
            text.to_owned()
        }
    }
}

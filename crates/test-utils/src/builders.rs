use concur::config::Settings;

/// Builder for `Settings` to simplify test setup.
///
/// Defaults to foreground mode (no detaching fork) and a unique prefix.
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    pub fn new(tag: &str) -> Self {
        Self {
            settings: Settings {
                prefix: crate::unique_prefix(tag),
                detach: false,
                ..Settings::default()
            },
        }
    }

    pub fn capacity(mut self, n: u32) -> Self {
        self.settings.capacity = Some(n);
        self
    }

    pub fn build(self) -> Settings {
        self.settings
    }
}

use std::path::PathBuf;

/// Window and asset settings for a walkthrough session.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    /// Directory that contains `Data/`.
    pub resource_root: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Lionel Brits & NeHe's 3D World Tutorial".to_string(),
            width: 640,
            height: 480,
            fullscreen: false,
            resource_root: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn fullscreen(mut self, fullscreen: bool) -> Self {
        self.fullscreen = fullscreen;
        self
    }

    pub fn resource_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.resource_root = root.into();
        self
    }
}

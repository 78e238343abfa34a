use crate::widget::WidgetState;
use indicatif::HumanBytes;
use std::fmt;

/// MIME filter offered by the picker
pub const ACCEPT: &str = "image/*";

pub const TIPS: &[&str] = &[
    "Take the photo in good, even light",
    "Keep the whole document flat and inside the frame",
    "JPG, PNG or WebP images up to 5 MB",
];

/// Snapshot of what the widget shows for a given state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub picker_disabled: bool,
    pub accept: &'static str,
    pub preview: Option<PreviewPanel>,
    pub loading: bool,
    pub error_banner: Option<String>,
    pub tips: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewPanel {
    pub data_url: String,
    pub mime: String,
    pub size: u64,
    /// Cancel is only offered while idle
    pub cancellable: bool,
}

impl View {
    pub fn render(state: &WidgetState) -> Self {
        Self {
            picker_disabled: state.uploading,
            accept: ACCEPT,
            preview: state.preview.as_ref().map(|preview| PreviewPanel {
                data_url: preview.data_url.clone(),
                mime: preview.mime.clone(),
                size: preview.size,
                cancellable: !state.uploading,
            }),
            loading: state.uploading,
            error_banner: state.error.clone().filter(|message| !message.is_empty()),
            tips: TIPS,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.picker_disabled {
            writeln!(f, "[ Select image ({}) ] (disabled)", self.accept)?;
        } else {
            writeln!(f, "[ Select image ({}) ]", self.accept)?;
        }
        if let Some(preview) = &self.preview {
            write!(f, "Preview: {} {}", preview.mime, HumanBytes(preview.size))?;
            if preview.cancellable {
                write!(f, " [x cancel]")?;
            }
            writeln!(f)?;
        }
        if self.loading {
            writeln!(f, "Recognizing...")?;
        }
        if let Some(error) = &self.error_banner {
            writeln!(f, "Error: {}", error)?;
        }
        writeln!(f, "Tips:")?;
        for tip in self.tips {
            writeln!(f, "  - {}", tip)?;
        }
        Ok(())
    }
}

pub mod project;
pub mod settings;

pub use project::{
    OverlayKind, ProcessAck, Project, ProjectStatus, StatusReport, SystemStatus, UploadReceipt,
};
pub use settings::HologramSettings;

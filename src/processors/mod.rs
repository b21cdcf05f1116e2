// comic-tool/src/processors/mod.rs
mod archive;
mod encoder;
mod loader;
mod renumber;
mod splitter;
mod workspace;

pub use archive::{ArchiveCodec, ArchiveKind, StandardCodec};
pub use encoder::Encoder;
pub use loader::{Loader, PageImage};
pub use renumber::{
    canonical_name, extract_token, validate_sequence, Approval, RenumberPlan, Renumberer,
    StagedRename,
};
pub use splitter::{Splitter, LEFT_HALF_SUFFIX, RIGHT_HALF_SUFFIX};
pub use workspace::{Workspace, WorkspaceArena, WorkspaceId, WorkspaceRole};

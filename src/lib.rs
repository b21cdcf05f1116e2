mod cli;
mod core;
mod processors;
mod reporter;
mod utils;

pub use cli::{Cli, Commands, PackArgs};
pub use self::core::processor::{ClassifiedFile, TreeNode, TreeProcessor};
pub use self::core::{
    ComicToolError, ProcessConfig, ProcessMode, Result, RunSummary, UnitFailure,
    DEFAULT_JPEG_QUALITY,
};
pub use processors::{
    canonical_name, extract_token, validate_sequence, Approval, ArchiveCodec, ArchiveKind,
    Encoder, Loader, PageImage, RenumberPlan, Renumberer, Splitter, StagedRename, StandardCodec,
    Workspace, WorkspaceArena, WorkspaceId, WorkspaceRole, LEFT_HALF_SUFFIX, RIGHT_HALF_SUFFIX,
};
pub use reporter::{ConsoleReporter, LogReporter, ProgressMarker, Reporter};
pub use utils::{classify, is_archive, is_page_image, FileKind};

pub mod prelude {
    pub use crate::{
        Approval, ConsoleReporter, LogReporter, ProcessConfig, ProcessMode, Renumberer, Reporter,
        TreeProcessor,
    };
}

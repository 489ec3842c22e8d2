#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod apply;
pub mod config;
pub mod confirm;
pub mod convert;
pub mod entry;
pub mod error;
pub mod listing;
pub mod manifest;
pub mod operations;
pub mod output;
pub mod plan;
pub mod preview;
pub mod status;

pub use apply::{apply_plan, apply_plan_with_observer, ApplyEvent, ApplyOptions, ApplyReport};
pub use config::Config;
pub use confirm::{
    confirmation_prompt_active, AssumeYes, ConfirmRequest, Confirmation, PromptConfirmation,
};
pub use convert::{convert_batch, ConversionReport, ConvertOptions, TargetFormat};
pub use entry::{FileEntry, Numbering};
pub use error::PhotoseqError;
pub use listing::{DirectoryListing, ExtensionSet};
pub use manifest::OrderManifest;
pub use operations::{
    convert_operation, number_operation, order_operation, status_operation, RunOptions,
};
pub use output::{
    ConvertResult, NumberResult, OrderResult, OutputFormat, OutputFormatter, RunStatus,
    StatusResult, VersionResult,
};
pub use plan::{compute_gap_fill_plan, compute_order_apply_plan, PlanKind, RenamePlan};
pub use preview::Preview;
pub use status::{gallery_status, sequence_status, GalleryStatus, IndexGap, SequenceStatus};

//! Configuration types and loading for req-notifier

mod loader;
mod mail;
mod notify;
mod stage;
mod workbook;

pub use loader::NotifierConfig;
pub use mail::{MailConfig, TransportKind};
pub use notify::{
    DeclinePolicy, ErrorPolicy, NotifyConfig, PromptConfig, SubmissionNoticeConfig,
};
pub use stage::StageConfig;
pub use workbook::{DocumentsConfig, FieldsConfig, WorkbookConfig};

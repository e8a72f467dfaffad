//! Evaluation Pipeline - 提交 -> 轮询 -> 分类

mod classifier;
mod outcome;
mod poller;
mod submission;

pub use classifier::{
    Classification, Rejection, RejectionKind, ResultClassifier, NON_MEDICAL_ERROR_CODE,
    TITLE_BACKEND_ERROR, TITLE_PROMPT_REJECTED, TITLE_TIMEOUT,
};
pub use outcome::TaskOutcome;
pub use poller::{PollConfig, TaskPoller};
pub use submission::TaskSubmitter;

//! The service application submission workflow.
//!
//! Validation strictly precedes payment, payment strictly precedes the
//! multipart submission, and no attempt overlaps another for the same form
//! instance. Every failure is user-correctable: the form and attachment
//! state survive so the attempt can be retried.

pub mod documents;
pub mod domain;
pub mod form;
pub mod payment;
pub mod submission;

#[cfg(test)]
mod tests;

pub use documents::{
    format_file_size, AttachOutcome, AttachmentSet, DocumentIntake, FileError, FilePicker,
    PickOutcome, PickedFile, UploadedDocument, MAX_DOCUMENT_BYTES,
};
pub use domain::{ApplicationStatus, ApplicationSummary, Money, ServiceDefinition};
pub use form::{ApplicationForm, FormField, ValidationError};
pub use payment::{
    charge_amount, CheckoutPrefill, CheckoutRequest, PaymentError, PaymentGateway, PaymentMode,
    PaymentReceipt, PaymentSelection,
};
pub use submission::{
    ApplicationWorkflow, ServiceApplyRequest, SubmissionPhase, SubmissionSuccess, SubmitError,
};

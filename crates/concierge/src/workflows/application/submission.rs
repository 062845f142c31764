use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::api::{ApiError, ConciergeApi};
use crate::config::CheckoutConfig;
use crate::session::Session;

use super::documents::{
    AttachOutcome, AttachmentSet, DocumentIntake, FileError, FilePicker, UploadedDocument,
};
use super::domain::{Money, ServiceDefinition};
use super::form::{ApplicationForm, ValidationError};
use super::payment::{
    charge_amount, CheckoutRequest, PaymentError, PaymentGateway, PaymentMode, PaymentReceipt,
    PaymentSelection,
};

/// Fallback when the backend rejects without a message.
const GENERIC_REJECTION: &str = "Failed to submit application";

/// Where a submission attempt currently stands. Failures surface an error
/// and return the workflow to `Idle` with all form state intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    Idle,
    Validating,
    Paying,
    Submitting,
    Succeeded,
}

impl SubmissionPhase {
    pub const fn label(self) -> &'static str {
        match self {
            SubmissionPhase::Idle => "idle",
            SubmissionPhase::Validating => "validating",
            SubmissionPhase::Paying => "paying",
            SubmissionPhase::Submitting => "submitting",
            SubmissionPhase::Succeeded => "succeeded",
        }
    }
}

/// Fully assembled `POST /serviceApply` payload. Field names and the indexed
/// `doc_require[i]` / `docname[i]` arrays reproduce the backend's expected
/// encoding exactly; files correspond to labels by position only.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceApplyRequest {
    pub first_name: String,
    pub last_name: String,
    pub mobile: String,
    pub email: String,
    pub payment_type: PaymentMode,
    pub wallet_amount: Money,
    pub dob: Option<NaiveDate>,
    pub gender: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub country: String,
    pub service_id: u64,
    pub fees: Money,
    pub doc_require: Vec<String>,
    pub documents: Vec<UploadedDocument>,
}

impl ServiceApplyRequest {
    /// Scalar multipart fields in their wire order. File parts are attached
    /// separately as `docname[i]`.
    pub fn fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("first_name".to_string(), self.first_name.clone()),
            ("last_name".to_string(), self.last_name.clone()),
            ("mobile".to_string(), self.mobile.clone()),
            ("email".to_string(), self.email.clone()),
            ("payment_type".to_string(), self.payment_type.as_str().to_string()),
            ("wallet_amount".to_string(), self.wallet_amount.to_string()),
        ];

        if let Some(dob) = self.dob {
            fields.push(("dob".to_string(), dob.format("%Y-%m-%d").to_string()));
        }

        fields.extend([
            ("gender".to_string(), self.gender.clone()),
            ("address".to_string(), self.address.clone()),
            ("city".to_string(), self.city.clone()),
            ("state".to_string(), self.state.clone()),
            ("pincode".to_string(), self.pincode.clone()),
            ("country".to_string(), self.country.clone()),
            ("service_id".to_string(), self.service_id.to_string()),
            ("fees".to_string(), self.fees.to_string()),
        ]);

        for (index, label) in self.doc_require.iter().enumerate() {
            fields.push((format!("doc_require[{index}]"), label.clone()));
        }

        fields
    }
}

/// What the caller receives after a successful attempt: the receipt and the
/// service context the status view should open with.
#[derive(Debug, Clone)]
pub struct SubmissionSuccess {
    pub service: ServiceDefinition,
    pub receipt: PaymentReceipt,
    pub message: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Payment(#[from] PaymentError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("{message}")]
    Rejected { message: String },
    #[error("a submission attempt is already in progress")]
    AttemptInFlight,
}

/// One screenful of application state: the form, the attachment set, the
/// payment selection, and the seams to the outside world. Owned exclusively
/// by one screen instance; nothing mutates it outside the user-input stream.
pub struct ApplicationWorkflow<A, G, P> {
    api: Arc<A>,
    gateway: Arc<G>,
    checkout: CheckoutConfig,
    session: Session,
    service: ServiceDefinition,
    form: ApplicationForm,
    documents: DocumentIntake<P>,
    payment: PaymentSelection,
    wallet_balance: Money,
    phase: SubmissionPhase,
}

impl<A, G, P> ApplicationWorkflow<A, G, P>
where
    A: ConciergeApi,
    G: PaymentGateway,
    P: FilePicker,
{
    pub fn new(
        api: Arc<A>,
        gateway: Arc<G>,
        picker: P,
        checkout: CheckoutConfig,
        session: Session,
        service: ServiceDefinition,
    ) -> Self {
        let form = ApplicationForm::for_service(&service);
        Self {
            api,
            gateway,
            checkout,
            session,
            service,
            form,
            documents: DocumentIntake::new(picker),
            payment: PaymentSelection::default(),
            wallet_balance: Money::ZERO,
            phase: SubmissionPhase::Idle,
        }
    }

    pub fn service(&self) -> &ServiceDefinition {
        &self.service
    }

    pub fn form(&self) -> &ApplicationForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ApplicationForm {
        &mut self.form
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    pub fn attachments(&self) -> &AttachmentSet {
        self.documents.attachments()
    }

    pub fn wallet_balance(&self) -> Money {
        self.wallet_balance
    }

    pub fn set_payment_mode(&mut self, mode: PaymentMode) {
        self.payment.mode = mode;
    }

    /// Opting in is only meaningful once a non-zero balance has been
    /// fetched; with a zero balance the offset is simply zero.
    pub fn set_use_wallet(&mut self, use_wallet: bool) {
        self.payment.use_wallet = use_wallet;
    }

    /// Fetch the wallet balance for the offset opt-in. On failure the stored
    /// balance is left as it was; the caller may retry or continue without
    /// the offset.
    pub async fn refresh_wallet(&mut self) -> Result<Money, ApiError> {
        let balance = self.api.wallet_balance(&self.session).await?;
        self.wallet_balance = balance;
        Ok(balance)
    }

    /// Run the external picker for one required-document label.
    pub async fn attach_document(&mut self, document_type: &str) -> Result<AttachOutcome, FileError> {
        self.documents.attach(document_type).await
    }

    /// One full submission attempt: validate, pay, submit. Strictly ordered;
    /// any failure surfaces its error and restores `Idle` with the form
    /// untouched so the user can correct and retry. Retrying re-triggers
    /// payment.
    pub async fn submit(&mut self) -> Result<SubmissionSuccess, SubmitError> {
        if self.phase != SubmissionPhase::Idle {
            return Err(SubmitError::AttemptInFlight);
        }

        self.phase = SubmissionPhase::Validating;
        if let Err(err) = self.form.validate(&self.service, self.documents.attachments()) {
            self.phase = SubmissionPhase::Idle;
            return Err(err.into());
        }

        self.phase = SubmissionPhase::Paying;
        let amount = charge_amount(self.form.fees, self.payment.mode);
        let checkout = CheckoutRequest::build(&self.checkout, &self.form, amount);
        let receipt = match self.gateway.checkout(checkout).await {
            Ok(receipt) => receipt,
            Err(err) => {
                warn!(service_id = self.service.id, error = %err, "payment did not complete");
                self.phase = SubmissionPhase::Idle;
                return Err(err.into());
            }
        };
        info!(
            service_id = self.service.id,
            payment_id = %receipt.payment_id,
            amount_paise = amount.paise(),
            "payment captured"
        );

        self.phase = SubmissionPhase::Submitting;
        let request = self.apply_request();
        let response = match self.api.service_apply(&self.session, &request).await {
            Ok(response) => response,
            Err(err) => {
                self.phase = SubmissionPhase::Idle;
                return Err(err.into());
            }
        };

        if response.is_success() {
            self.phase = SubmissionPhase::Succeeded;
            info!(service_id = self.service.id, "application submitted");
            Ok(SubmissionSuccess {
                service: self.service.clone(),
                receipt,
                message: response.message,
            })
        } else {
            self.phase = SubmissionPhase::Idle;
            Err(SubmitError::Rejected {
                message: response
                    .message
                    .unwrap_or_else(|| GENERIC_REJECTION.to_string()),
            })
        }
    }

    /// Assemble the typed payload from validated state. Attachment order
    /// determines the `docname[i]` positions.
    fn apply_request(&self) -> ServiceApplyRequest {
        ServiceApplyRequest {
            first_name: self.form.first_name.clone(),
            last_name: self.form.last_name.clone(),
            mobile: self.form.mobile.clone(),
            email: self.form.email.clone(),
            payment_type: self.payment.mode,
            wallet_amount: self.payment.wallet_amount(self.wallet_balance),
            dob: self.service.collects_dob().then_some(self.form.dob),
            gender: self.form.gender.clone(),
            address: self.form.address.clone(),
            city: self.form.city.clone(),
            state: self.form.state.clone(),
            pincode: self.form.pincode.clone(),
            country: self.form.country.clone(),
            service_id: self.form.service_id,
            fees: self.form.fees,
            doc_require: self.service.required_documents(),
            documents: self.documents.attachments().to_vec(),
        }
    }
}

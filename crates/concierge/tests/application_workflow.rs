//! End-to-end scenarios for the service application submission workflow,
//! driven through the public facade with in-process collaborators so
//! validation, payment ordering, and dispatch can be asserted without a
//! backend.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use concierge::api::{ApiError, ConciergeApi, HomeData, ServiceApplyResponse};
    use concierge::session::Session;
    use concierge::workflows::application::{
        ApplicationSummary, CheckoutRequest, FileError, FilePicker, Money, PaymentError,
        PaymentGateway, PaymentReceipt, PickOutcome, PickedFile, ServiceApplyRequest,
        ServiceDefinition,
    };
    use concierge::config::CheckoutConfig;

    pub fn session() -> Session {
        Session {
            token: "tok-abc".to_string(),
            user_id: Some("7".to_string()),
        }
    }

    pub fn checkout_config() -> CheckoutConfig {
        CheckoutConfig {
            key: "rzp_test_key".to_string(),
            currency: "INR".to_string(),
            merchant_name: "DNS CONCIERGE".to_string(),
            description: "Order Purchase".to_string(),
            logo_url: "https://example.test/logo.png".to_string(),
            theme_color: "#495477".to_string(),
        }
    }

    pub fn service(fees: u64, doc_require: Option<&str>, dob_status: bool) -> ServiceDefinition {
        serde_json::from_value(serde_json::json!({
            "id": 12,
            "name": "Driving License",
            "fees": fees,
            "doc_require": doc_require,
            "dob_status": if dob_status { 1 } else { 0 },
        }))
        .expect("service fixture decodes")
    }

    pub fn picked_file(file_name: &str, size_bytes: u64) -> PickedFile {
        PickedFile {
            file_name: file_name.to_string(),
            mime_type: mime::APPLICATION_PDF,
            size_bytes,
            bytes: vec![0u8; size_bytes.min(64) as usize],
        }
    }

    /// API double recording every submission and answering from a script.
    #[derive(Default)]
    pub struct RecordingApi {
        pub balance: Money,
        pub wallet_calls: Mutex<u32>,
        pub apply_responses: Mutex<Vec<ServiceApplyResponse>>,
        pub apply_failures: Mutex<Vec<ApiError>>,
        pub submissions: Mutex<Vec<ServiceApplyRequest>>,
    }

    impl RecordingApi {
        pub fn with_balance(balance: Money) -> Arc<Self> {
            Arc::new(Self {
                balance,
                ..Self::default()
            })
        }

        pub fn respond_with(&self, status: i64, message: Option<&str>) {
            self.apply_responses
                .lock()
                .expect("responses mutex poisoned")
                .push(apply_response(status, message));
        }

        pub fn fail_next(&self, error: ApiError) {
            self.apply_failures
                .lock()
                .expect("failures mutex poisoned")
                .push(error);
        }

        pub fn submission_count(&self) -> usize {
            self.submissions.lock().expect("submissions mutex poisoned").len()
        }

        pub fn last_submission(&self) -> ServiceApplyRequest {
            self.submissions
                .lock()
                .expect("submissions mutex poisoned")
                .last()
                .expect("a submission was recorded")
                .clone()
        }
    }

    fn apply_response(status: i64, message: Option<&str>) -> ServiceApplyResponse {
        serde_json::from_value(serde_json::json!({
            "status": status,
            "message": message,
        }))
        .expect("response fixture decodes")
    }

    #[async_trait]
    impl ConciergeApi for RecordingApi {
        async fn view_services(&self) -> Result<Vec<ServiceDefinition>, ApiError> {
            Ok(vec![service(1000, None, false)])
        }

        async fn home(&self) -> Result<HomeData, ApiError> {
            Ok(serde_json::from_value(serde_json::json!({ "slider": [], "service": [] }))
                .expect("home fixture decodes"))
        }

        async fn wallet_balance(&self, _session: &Session) -> Result<Money, ApiError> {
            *self.wallet_calls.lock().expect("wallet mutex poisoned") += 1;
            Ok(self.balance)
        }

        async fn view_applications(
            &self,
            _session: &Session,
        ) -> Result<Vec<ApplicationSummary>, ApiError> {
            Ok(Vec::new())
        }

        async fn service_apply(
            &self,
            _session: &Session,
            request: &ServiceApplyRequest,
        ) -> Result<ServiceApplyResponse, ApiError> {
            self.submissions
                .lock()
                .expect("submissions mutex poisoned")
                .push(request.clone());
            let mut failures = self.apply_failures.lock().expect("failures mutex poisoned");
            if !failures.is_empty() {
                return Err(failures.remove(0));
            }
            let mut responses = self.apply_responses.lock().expect("responses mutex poisoned");
            if responses.is_empty() {
                Ok(apply_response(1, None))
            } else {
                Ok(responses.remove(0))
            }
        }
    }

    /// Gateway double: either approves with a fixed receipt or refuses, and
    /// records the checkout it was opened with.
    pub struct ScriptedGateway {
        pub approve: bool,
        pub requests: Mutex<Vec<CheckoutRequest>>,
    }

    impl ScriptedGateway {
        pub fn approving() -> Arc<Self> {
            Arc::new(Self {
                approve: true,
                requests: Mutex::new(Vec::new()),
            })
        }

        pub fn refusing() -> Arc<Self> {
            Arc::new(Self {
                approve: false,
                requests: Mutex::new(Vec::new()),
            })
        }

        pub fn opened_count(&self) -> usize {
            self.requests.lock().expect("gateway mutex poisoned").len()
        }

        pub fn last_request(&self) -> CheckoutRequest {
            self.requests
                .lock()
                .expect("gateway mutex poisoned")
                .last()
                .expect("gateway was opened")
                .clone()
        }
    }

    #[async_trait]
    impl PaymentGateway for ScriptedGateway {
        async fn checkout(
            &self,
            request: CheckoutRequest,
        ) -> Result<PaymentReceipt, PaymentError> {
            self.requests
                .lock()
                .expect("gateway mutex poisoned")
                .push(request);
            if self.approve {
                Ok(PaymentReceipt {
                    payment_id: "pay_123".to_string(),
                })
            } else {
                Err(PaymentError::Cancelled)
            }
        }
    }

    /// Picker double answering from a fixed per-type map; unknown types
    /// cancel.
    pub struct MapPicker {
        files: HashMap<String, PickedFile>,
    }

    impl MapPicker {
        pub fn empty() -> Self {
            Self {
                files: HashMap::new(),
            }
        }

        pub fn with(mut self, document_type: &str, file: PickedFile) -> Self {
            self.files.insert(document_type.to_string(), file);
            self
        }
    }

    #[async_trait]
    impl FilePicker for MapPicker {
        async fn pick(&self, document_type: &str) -> Result<PickOutcome, FileError> {
            Ok(match self.files.get(document_type) {
                Some(file) => PickOutcome::Selected(file.clone()),
                None => PickOutcome::Cancelled,
            })
        }
    }
}

use common::{
    checkout_config, picked_file, service, session, MapPicker, RecordingApi, ScriptedGateway,
};
use concierge::api::ApiError;
use concierge::session::{require_session, SessionError, SessionStore};
use concierge::workflows::application::{
    ApplicationWorkflow, FormField, Money, PaymentMode, SubmissionPhase, SubmitError,
    ValidationError,
};

fn fill_personal_fields<A, G, P>(workflow: &mut ApplicationWorkflow<A, G, P>)
where
    A: concierge::api::ConciergeApi,
    G: concierge::workflows::application::PaymentGateway,
    P: concierge::workflows::application::FilePicker,
{
    let form = workflow.form_mut();
    form.set(FormField::FirstName, "Asha");
    form.set(FormField::LastName, "Nair");
    form.set(FormField::Mobile, "9876543210");
    form.set(FormField::Email, "asha@example.com");
    form.set(FormField::Address, "12 MG Road");
    form.set(FormField::State, "Karnataka");
    form.set(FormField::City, "Bengaluru");
    form.set(FormField::Pincode, "560001");
    form.set(FormField::Gender, "Female");
}

#[tokio::test]
async fn full_payment_without_documents_submits_and_succeeds() {
    // Scenario A: no documents, no dob, full payment of 1000.
    let api = RecordingApi::with_balance(Money::ZERO);
    let gateway = ScriptedGateway::approving();
    let mut workflow = ApplicationWorkflow::new(
        api.clone(),
        gateway.clone(),
        MapPicker::empty(),
        checkout_config(),
        session(),
        service(1000, None, false),
    );

    fill_personal_fields(&mut workflow);
    workflow.set_payment_mode(PaymentMode::Full);

    let success = workflow.submit().await.expect("submission succeeds");

    assert_eq!(workflow.phase(), SubmissionPhase::Succeeded);
    assert_eq!(success.service.id, 12);
    assert_eq!(gateway.last_request().amount, 100_000);

    let submission = api.last_submission();
    let fields = submission.fields();
    assert!(!fields.iter().any(|(name, _)| name == "dob"));
    assert!(!fields.iter().any(|(name, _)| name.starts_with("doc_require[")));
    assert!(submission.documents.is_empty());
}

#[tokio::test]
async fn missing_required_document_fails_before_any_payment() {
    // Scenario B: PAN uploaded, Aadhar missing.
    let api = RecordingApi::with_balance(Money::ZERO);
    let gateway = ScriptedGateway::approving();
    let picker = MapPicker::empty().with("PAN", picked_file("pan.pdf", 2048));
    let mut workflow = ApplicationWorkflow::new(
        api.clone(),
        gateway.clone(),
        picker,
        checkout_config(),
        session(),
        service(1000, Some("PAN,Aadhar"), true),
    );

    fill_personal_fields(&mut workflow);
    workflow.attach_document("PAN").await.expect("pan attaches");

    let err = workflow.submit().await.expect_err("Aadhar is missing");
    assert!(matches!(
        err,
        SubmitError::Validation(ValidationError::MissingDocument { ref label }) if label == "Aadhar"
    ));
    assert_eq!(workflow.phase(), SubmissionPhase::Idle);
    assert_eq!(gateway.opened_count(), 0);
    assert_eq!(api.submission_count(), 0);
}

#[tokio::test]
async fn partial_payment_charges_half_in_minor_units() {
    // Scenario C: partial of 2000 => gateway sees 100000 paise.
    let api = RecordingApi::with_balance(Money::ZERO);
    let gateway = ScriptedGateway::approving();
    let mut workflow = ApplicationWorkflow::new(
        api,
        gateway.clone(),
        MapPicker::empty(),
        checkout_config(),
        session(),
        service(2000, None, false),
    );

    fill_personal_fields(&mut workflow);
    workflow.set_payment_mode(PaymentMode::Partial);

    workflow.submit().await.expect("submission succeeds");
    assert_eq!(gateway.last_request().amount, 100_000);
}

#[tokio::test]
async fn cancelled_payment_aborts_without_submitting() {
    // Scenario D: the gateway refuses; nothing reaches the backend.
    let api = RecordingApi::with_balance(Money::ZERO);
    let gateway = ScriptedGateway::refusing();
    let mut workflow = ApplicationWorkflow::new(
        api.clone(),
        gateway,
        MapPicker::empty(),
        checkout_config(),
        session(),
        service(1000, None, false),
    );

    fill_personal_fields(&mut workflow);
    let form_before = workflow.form().clone();

    let err = workflow.submit().await.expect_err("payment cancelled");
    assert!(matches!(
        err,
        SubmitError::Payment(concierge::workflows::application::PaymentError::Cancelled)
    ));
    assert_eq!(workflow.phase(), SubmissionPhase::Idle);
    assert_eq!(api.submission_count(), 0);
    assert_eq!(workflow.form(), &form_before);
}

#[tokio::test]
async fn accepted_submission_routes_to_the_status_view() {
    // Scenario E: status == 1 carries the service context forward.
    let api = RecordingApi::with_balance(Money::ZERO);
    api.respond_with(1, Some("Application received"));
    let gateway = ScriptedGateway::approving();
    let mut workflow = ApplicationWorkflow::new(
        api,
        gateway,
        MapPicker::empty(),
        checkout_config(),
        session(),
        service(1000, None, false),
    );

    fill_personal_fields(&mut workflow);
    workflow.set_payment_mode(PaymentMode::Full);

    let success = workflow.submit().await.expect("submission succeeds");
    assert_eq!(workflow.phase(), SubmissionPhase::Succeeded);
    assert_eq!(success.service.name, "Driving License");
    assert_eq!(success.message.as_deref(), Some("Application received"));
    assert_eq!(success.receipt.payment_id, "pay_123");
}

#[tokio::test]
async fn server_rejection_surfaces_the_message_and_allows_retry() {
    let api = RecordingApi::with_balance(Money::ZERO);
    api.respond_with(0, Some("Duplicate application"));
    let gateway = ScriptedGateway::approving();
    let mut workflow = ApplicationWorkflow::new(
        api.clone(),
        gateway.clone(),
        MapPicker::empty(),
        checkout_config(),
        session(),
        service(1000, None, false),
    );

    fill_personal_fields(&mut workflow);

    let err = workflow.submit().await.expect_err("backend rejects");
    assert!(matches!(
        err,
        SubmitError::Rejected { ref message } if message == "Duplicate application"
    ));
    assert_eq!(workflow.phase(), SubmissionPhase::Idle);

    // Retry re-triggers payment, then the scripted default accepts.
    workflow.submit().await.expect("retry succeeds");
    assert_eq!(gateway.opened_count(), 2);
    assert_eq!(api.submission_count(), 2);
}

#[tokio::test]
async fn rejection_without_a_message_gets_the_generic_fallback() {
    let api = RecordingApi::with_balance(Money::ZERO);
    api.respond_with(0, None);
    let gateway = ScriptedGateway::approving();
    let mut workflow = ApplicationWorkflow::new(
        api,
        gateway,
        MapPicker::empty(),
        checkout_config(),
        session(),
        service(1000, None, false),
    );

    fill_personal_fields(&mut workflow);

    let err = workflow.submit().await.expect_err("backend rejects");
    assert_eq!(err.to_string(), "Failed to submit application");
}

#[tokio::test]
async fn wallet_opt_in_sends_the_fetched_balance() {
    let api = RecordingApi::with_balance(Money::from_rupees(250));
    let gateway = ScriptedGateway::approving();
    let mut workflow = ApplicationWorkflow::new(
        api.clone(),
        gateway.clone(),
        MapPicker::empty(),
        checkout_config(),
        session(),
        service(1000, None, false),
    );

    fill_personal_fields(&mut workflow);
    let balance = workflow.refresh_wallet().await.expect("balance fetch");
    assert_eq!(balance, Money::from_rupees(250));
    workflow.set_use_wallet(true);
    workflow.set_payment_mode(PaymentMode::Full);

    workflow.submit().await.expect("submission succeeds");

    let submission = api.last_submission();
    assert_eq!(submission.wallet_amount, Money::from_rupees(250));
    // The gateway charge ignores the wallet offset; the server applies it.
    assert_eq!(gateway.last_request().amount, 100_000);
}

#[tokio::test]
async fn dob_is_submitted_when_the_service_collects_it() {
    let api = RecordingApi::with_balance(Money::ZERO);
    let gateway = ScriptedGateway::approving();
    let picker = MapPicker::empty().with("PAN", picked_file("pan.pdf", 2048));
    let mut workflow = ApplicationWorkflow::new(
        api.clone(),
        gateway,
        picker,
        checkout_config(),
        session(),
        service(1000, Some("PAN"), true),
    );

    fill_personal_fields(&mut workflow);
    workflow
        .form_mut()
        .set_dob(chrono::NaiveDate::from_ymd_opt(1994, 3, 17).expect("valid date"));
    workflow.attach_document("PAN").await.expect("pan attaches");

    workflow.submit().await.expect("submission succeeds");

    let fields = api.last_submission().fields();
    let dob = fields
        .iter()
        .find(|(name, _)| name == "dob")
        .map(|(_, value)| value.clone());
    assert_eq!(dob.as_deref(), Some("1994-03-17"));
    assert_eq!(
        fields
            .iter()
            .filter(|(name, _)| name.starts_with("doc_require["))
            .count(),
        1
    );
}

#[tokio::test]
async fn a_finished_workflow_refuses_another_attempt() {
    let api = RecordingApi::with_balance(Money::ZERO);
    let gateway = ScriptedGateway::approving();
    let mut workflow = ApplicationWorkflow::new(
        api.clone(),
        gateway.clone(),
        MapPicker::empty(),
        checkout_config(),
        session(),
        service(1000, None, false),
    );

    fill_personal_fields(&mut workflow);
    workflow.submit().await.expect("submission succeeds");
    assert_eq!(workflow.phase(), SubmissionPhase::Succeeded);

    let err = workflow.submit().await.expect_err("workflow already finished");
    assert!(matches!(err, SubmitError::AttemptInFlight));
    // Nothing was re-validated, re-charged, or re-sent.
    assert_eq!(workflow.phase(), SubmissionPhase::Succeeded);
    assert_eq!(gateway.opened_count(), 1);
    assert_eq!(api.submission_count(), 1);
}

#[tokio::test]
async fn api_failure_during_dispatch_returns_to_idle_with_the_form_intact() {
    let api = RecordingApi::with_balance(Money::ZERO);
    api.fail_next(ApiError::Timeout {
        endpoint: "/serviceApply",
    });
    let gateway = ScriptedGateway::approving();
    let mut workflow = ApplicationWorkflow::new(
        api.clone(),
        gateway.clone(),
        MapPicker::empty(),
        checkout_config(),
        session(),
        service(1000, None, false),
    );

    fill_personal_fields(&mut workflow);
    let form_before = workflow.form().clone();

    let err = workflow.submit().await.expect_err("dispatch times out");
    assert!(matches!(err, SubmitError::Api(ApiError::Timeout { .. })));
    assert_eq!(workflow.phase(), SubmissionPhase::Idle);
    assert_eq!(workflow.form(), &form_before);

    // The user can retry as-is; the retry re-triggers payment.
    workflow.submit().await.expect("retry succeeds");
    assert_eq!(workflow.phase(), SubmissionPhase::Succeeded);
    assert_eq!(gateway.opened_count(), 2);
    assert_eq!(api.submission_count(), 2);
}

struct EmptyStore;

impl SessionStore for EmptyStore {
    fn load(&self) -> Result<Option<concierge::session::Session>, SessionError> {
        Ok(None)
    }
}

#[test]
fn submission_is_blocked_without_a_stored_session() {
    let err = require_session(&EmptyStore).expect_err("no session");
    assert!(matches!(err, SessionError::NotLoggedIn));
    assert_eq!(err.to_string(), "Please log in to submit application");
}

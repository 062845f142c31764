use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::workflows::application::documents::{
    FileError, FilePicker, PickOutcome, PickedFile,
};
use crate::workflows::application::domain::{Money, ServiceDefinition};
use crate::workflows::application::form::{ApplicationForm, FormField};

pub(super) fn service(doc_require: Option<&str>, dob_status: bool) -> ServiceDefinition {
    ServiceDefinition {
        id: 12,
        name: "Driving License".to_string(),
        description: Some("Fresh driving license issuance".to_string()),
        category: Some("Transport".to_string()),
        image: None,
        fees: Money::from_rupees(1000),
        doc_require: doc_require.map(str::to_string),
        dob_status,
    }
}

pub(super) fn filled_form(service: &ServiceDefinition) -> ApplicationForm {
    let mut form = ApplicationForm::for_service(service);
    form.set(FormField::FirstName, "Asha");
    form.set(FormField::LastName, "Nair");
    form.set(FormField::Mobile, "9876543210");
    form.set(FormField::Email, "asha@example.com");
    form.set(FormField::Address, "12 MG Road");
    form.set(FormField::State, "Karnataka");
    form.set(FormField::City, "Bengaluru");
    form.set(FormField::Pincode, "560001");
    form.set(FormField::Gender, "Female");
    form
}

pub(super) fn picked_file(file_name: &str, size_bytes: u64) -> PickedFile {
    PickedFile {
        file_name: file_name.to_string(),
        mime_type: mime::APPLICATION_PDF,
        size_bytes,
        bytes: vec![0u8; size_bytes.min(64) as usize],
    }
}

/// Picker double scripted per document type. Each scripted file is consumed
/// once, in order; a type with nothing queued cancels, as a user backing out
/// of the native picker would.
pub(super) struct ScriptedPicker {
    selections: Mutex<HashMap<String, VecDeque<PickedFile>>>,
}

impl ScriptedPicker {
    pub(super) fn new() -> Self {
        Self {
            selections: Mutex::new(HashMap::new()),
        }
    }

    pub(super) fn with(self, document_type: &str, file: PickedFile) -> Self {
        self.selections
            .lock()
            .expect("picker mutex poisoned")
            .entry(document_type.to_string())
            .or_default()
            .push_back(file);
        self
    }
}

#[async_trait]
impl FilePicker for ScriptedPicker {
    async fn pick(&self, document_type: &str) -> Result<PickOutcome, FileError> {
        let mut selections = self.selections.lock().expect("picker mutex poisoned");
        Ok(match selections.get_mut(document_type).and_then(VecDeque::pop_front) {
            Some(file) => PickOutcome::Selected(file),
            None => PickOutcome::Cancelled,
        })
    }
}

use chrono::NaiveDate;

use super::documents::{AttachmentSet, MAX_DOCUMENT_BYTES};
use super::domain::{Money, ServiceDefinition};

/// Country is fixed for every application today.
const DEFAULT_COUNTRY: &str = "india";

/// Mutable form aggregate built field-by-field on user input and consumed
/// read-only at submission time.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationForm {
    pub first_name: String,
    pub last_name: String,
    pub mobile: String,
    pub email: String,
    pub address: String,
    pub state: String,
    pub city: String,
    pub pincode: String,
    pub gender: String,
    pub dob: NaiveDate,
    pub country: String,
    pub service_id: u64,
    pub fees: Money,
}

/// The free-text fields the user fills in, in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    FirstName,
    LastName,
    Mobile,
    Email,
    Address,
    State,
    City,
    Pincode,
    Gender,
}

impl FormField {
    /// Wire name, doubling as the source for the humanized display name.
    pub const fn key(self) -> &'static str {
        match self {
            FormField::FirstName => "first_name",
            FormField::LastName => "last_name",
            FormField::Mobile => "mobile",
            FormField::Email => "email",
            FormField::Address => "address",
            FormField::State => "state",
            FormField::City => "city",
            FormField::Pincode => "pincode",
            FormField::Gender => "gender",
        }
    }

    pub fn display_name(self) -> String {
        self.key().replace('_', " ")
    }
}

/// Required fields checked first, in this exact order.
const REQUIRED_FIELDS: [FormField; 9] = [
    FormField::FirstName,
    FormField::LastName,
    FormField::Mobile,
    FormField::Email,
    FormField::Address,
    FormField::State,
    FormField::City,
    FormField::Pincode,
    FormField::Gender,
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please fill in {field}")]
    MissingField { field: String },
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Please enter a valid 10-digit mobile number")]
    InvalidMobile,
    #[error("Please enter a valid 6-digit pincode")]
    InvalidPincode,
    #[error("Please upload {label}")]
    MissingDocument { label: String },
    #[error("File \"{file_name}\" exceeds the 500KB size limit. Please replace it with a smaller file.")]
    OversizedDocument { file_name: String },
}

impl ApplicationForm {
    /// Open a blank form for a service, copying its id and fee.
    pub fn for_service(service: &ServiceDefinition) -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            mobile: String::new(),
            email: String::new(),
            address: String::new(),
            state: String::new(),
            city: String::new(),
            pincode: String::new(),
            gender: String::new(),
            dob: chrono::Local::now().date_naive(),
            country: DEFAULT_COUNTRY.to_string(),
            service_id: service.id,
            fees: service.fees,
        }
    }

    /// Unconditional field mutation; nothing is validated until `validate`.
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::FirstName => self.first_name = value,
            FormField::LastName => self.last_name = value,
            FormField::Mobile => self.mobile = value,
            FormField::Email => self.email = value,
            FormField::Address => self.address = value,
            FormField::State => self.state = value,
            FormField::City => self.city = value,
            FormField::Pincode => self.pincode = value,
            FormField::Gender => self.gender = value,
        }
    }

    pub fn set_dob(&mut self, dob: NaiveDate) {
        self.dob = dob;
    }

    fn field(&self, field: FormField) -> &str {
        match field {
            FormField::FirstName => &self.first_name,
            FormField::LastName => &self.last_name,
            FormField::Mobile => &self.mobile,
            FormField::Email => &self.email,
            FormField::Address => &self.address,
            FormField::State => &self.state,
            FormField::City => &self.city,
            FormField::Pincode => &self.pincode,
            FormField::Gender => &self.gender,
        }
    }

    /// "first last" with either side tolerated blank; used for the gateway
    /// prefill.
    pub fn applicant_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Pure, synchronous, fail-fast validation. Returns the first violated
    /// rule in a fixed order: required fields, email shape, mobile, pincode,
    /// then required documents. Performs no I/O.
    pub fn validate(
        &self,
        service: &ServiceDefinition,
        attachments: &AttachmentSet,
    ) -> Result<(), ValidationError> {
        for field in REQUIRED_FIELDS {
            if self.field(field).trim().is_empty() {
                return Err(ValidationError::MissingField {
                    field: field.display_name(),
                });
            }
        }

        if !is_valid_email(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        if !is_exact_digits(&self.mobile, 10) {
            return Err(ValidationError::InvalidMobile);
        }
        if !is_exact_digits(&self.pincode, 6) {
            return Err(ValidationError::InvalidPincode);
        }

        let required = service.required_documents();
        if !required.is_empty() {
            for label in &required {
                if !attachments.contains(label) {
                    return Err(ValidationError::MissingDocument {
                        label: label.clone(),
                    });
                }
            }

            // Re-check sizes in case an attachment was admitted elsewhere.
            for document in attachments.iter() {
                if document.file.size_bytes > MAX_DOCUMENT_BYTES {
                    return Err(ValidationError::OversizedDocument {
                        file_name: document.file.file_name.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// `local@domain.tld` shape: one `@`, non-empty whitespace-free segments, and
/// an interior dot in the domain.
fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    if local.is_empty() || local.contains(char::is_whitespace) {
        return false;
    }
    if domain.contains(char::is_whitespace) {
        return false;
    }
    domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

fn is_exact_digits(value: &str, count: usize) -> bool {
    value.len() == count && value.bytes().all(|b| b.is_ascii_digit())
}

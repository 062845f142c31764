//! Concrete collaborators for running the workflow from a terminal: a
//! file-backed session store, a path-backed document picker, and a console
//! stand-in for the modal payment gateway.

use std::collections::HashMap;
use std::env;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use concierge::session::{Session, SessionError, SessionStore};
use concierge::workflows::application::{
    format_file_size, CheckoutRequest, FileError, FilePicker, Money, PaymentError, PaymentGateway,
    PaymentReceipt, PickOutcome, PickedFile,
};
use tracing::debug;

/// JSON session file, the CLI's stand-in for the app's local key-value store.
/// Written by `concierge session set`, read by every authenticated command.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn from_env() -> Self {
        let path = env::var("CONCIERGE_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
                Path::new(&home).join(".concierge").join("session.json")
            });
        Self { path }
    }

    pub fn save(&self, session: &Session) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_vec_pretty(session)?;
        std::fs::write(&self.path, body)
    }

    pub fn clear(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        let body = match std::fs::read(&self.path) {
            Ok(body) => body,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(SessionError::Unreadable(err.to_string())),
        };
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|err| SessionError::Unreadable(err.to_string()))
    }
}

/// Picker that resolves each document type from a `label=path` mapping given
/// on the command line. A label with no mapping behaves like a cancelled
/// native picker.
pub struct PathFilePicker {
    sources: HashMap<String, PathBuf>,
}

impl PathFilePicker {
    pub fn new(sources: HashMap<String, PathBuf>) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl FilePicker for PathFilePicker {
    async fn pick(&self, document_type: &str) -> Result<PickOutcome, FileError> {
        let Some(path) = self.sources.get(document_type) else {
            return Ok(PickOutcome::Cancelled);
        };

        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let mime_type = mime_guess::from_path(path).first_or_octet_stream();

        debug!(document_type, path = %path.display(), "document read from disk");
        Ok(PickOutcome::Selected(PickedFile {
            file_name,
            mime_type,
            size_bytes: bytes.len() as u64,
            bytes,
        }))
    }
}

/// Console rendition of the modal checkout: shows the charge, then waits for
/// the gateway's payment id on stdin. An empty line cancels, as closing the
/// modal would.
pub struct ConsoleGateway;

#[async_trait]
impl PaymentGateway for ConsoleGateway {
    async fn checkout(&self, request: CheckoutRequest) -> Result<PaymentReceipt, PaymentError> {
        let amount = Money::from_paise(request.amount);
        println!();
        println!("{} — {}", request.name, request.description);
        println!("Charge: ₹{} ({})", amount, request.currency);
        println!("Payer:  {} <{}> {}", request.prefill.name, request.prefill.email, request.prefill.contact);
        print!("Enter the gateway payment id to confirm, or press Enter to cancel: ");
        io::stdout()
            .flush()
            .map_err(|err| PaymentError::Gateway(err.to_string()))?;

        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|err| PaymentError::Gateway(err.to_string()))?;

        let payment_id = line.trim();
        if payment_id.is_empty() {
            return Err(PaymentError::Cancelled);
        }
        Ok(PaymentReceipt {
            payment_id: payment_id.to_string(),
        })
    }
}

/// Used in user-facing document summaries.
pub fn describe_file(file: &PickedFile) -> String {
    format!("{} ({})", file.file_name, format_file_size(file.size_bytes))
}

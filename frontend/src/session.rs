use crate::notice::Notice;
use crate::service::ServiceError;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use shared::PredictionResult;
use std::rc::Rc;

const IMAGE_MEDIA_PREFIX: &str = "image/";

/// A file handed over by the browser, not yet validated.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// The image waiting to be submitted, plus a `data:` URL preview of it.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingImage {
    name: String,
    media_type: String,
    bytes: Rc<[u8]>,
    preview_url: String,
}

impl PendingImage {
    fn from_file(file: SelectedFile) -> Self {
        let preview_url = format!("data:{};base64,{}", file.media_type, STANDARD.encode(&file.bytes));
        Self {
            name: file.name,
            media_type: file.media_type,
            bytes: file.bytes.into(),
            preview_url,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn preview_url(&self) -> &str {
        &self.preview_url
    }
}

/// Identifies one submission. A reply is only applied while its ticket is
/// the one the session is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Single-use wrapper around the pending image for transmission.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    ticket: Ticket,
    file_name: String,
    media_type: String,
    bytes: Rc<[u8]>,
}

impl PredictionRequest {
    fn new(ticket: Ticket, image: &PendingImage) -> Self {
        Self {
            ticket,
            file_name: image.name.clone(),
            media_type: image.media_type.clone(),
            bytes: Rc::clone(&image.bytes),
        }
    }

    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Idle,
    Submitting(Ticket),
    Displaying(PredictionResult),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("`{media_type}` is not an image type")]
    InvalidFileType { media_type: String },
    #[error("no image selected")]
    NoImageSelected,
    #[error("analysis failed: {cause}")]
    AnalysisFailed { cause: ServiceError },
    #[error("reply for {0:?} arrived after its session was superseded")]
    StaleResponse(Ticket),
    #[error("session is busy")]
    Busy,
    #[error("could not read file: {reason}")]
    FileUnreadable { reason: String },
}

impl SessionError {
    /// The notice this error surfaces, `None` for internal ones.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            SessionError::InvalidFileType { .. } => Some(Notice::invalid_file_type()),
            SessionError::NoImageSelected => Some(Notice::no_image_selected()),
            SessionError::AnalysisFailed { cause } => {
                Some(Notice::analysis_failed(cause.service_message()))
            }
            SessionError::FileUnreadable { .. } => Some(Notice::file_unreadable()),
            SessionError::StaleResponse(_) | SessionError::Busy => None,
        }
    }
}

/// Upload → submit → result cycle for one page.
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
    pending: Option<PendingImage>,
    generation: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn pending(&self) -> Option<&PendingImage> {
        self.pending.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, SessionState::Submitting(_))
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        match &self.state {
            SessionState::Displaying(result) => Some(result),
            _ => None,
        }
    }

    /// Whether a file of `media_type` may be selected now. Checked before
    /// the file is read so rejected files are never loaded.
    pub fn accepts(&self, media_type: &str) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            log::warn!("Ignoring file selection while the session is busy");
            return Err(SessionError::Busy);
        }

        if !media_type.starts_with(IMAGE_MEDIA_PREFIX) {
            log::warn!("Rejected non-image file of type {:?}", media_type);
            return Err(SessionError::InvalidFileType {
                media_type: media_type.to_string(),
            });
        }
        Ok(())
    }

    /// Validates and stores the file. A rejected file leaves any earlier
    /// selection in place.
    pub fn select_file(&mut self, file: SelectedFile) -> Result<&PendingImage, SessionError> {
        self.accepts(&file.media_type)?;

        log::info!("Selected {} ({} bytes)", file.name, file.bytes.len());
        Ok(self.pending.insert(PendingImage::from_file(file)))
    }

    pub fn clear_selection(&mut self) {
        if let Some(image) = self.pending.take() {
            log::info!("Cleared selection {}", image.name);
        }
    }

    /// Moves `Idle → Submitting` and hands back the one request to send.
    pub fn begin_submission(&mut self) -> Result<PredictionRequest, SessionError> {
        if self.state != SessionState::Idle {
            log::warn!("Ignoring submit while the session is busy");
            return Err(SessionError::Busy);
        }

        let image = self.pending.as_ref().ok_or(SessionError::NoImageSelected)?;
        self.generation += 1;
        let request = PredictionRequest::new(Ticket(self.generation), image);
        self.state = SessionState::Submitting(request.ticket);

        log::info!("Submitting {} as {:?}", request.file_name, request.ticket);
        Ok(request)
    }

    /// Applies the reply for `ticket`. Failures return to `Idle` with the
    /// pending image kept so the user can retry.
    pub fn settle(
        &mut self,
        ticket: Ticket,
        outcome: Result<PredictionResult, ServiceError>,
    ) -> Result<(), SessionError> {
        if self.state != SessionState::Submitting(ticket) {
            log::debug!("Discarding stale reply for {:?}", ticket);
            return Err(SessionError::StaleResponse(ticket));
        }

        match outcome {
            Ok(result) => {
                log::info!(
                    "Diagnosis {} with confidence {:.3}",
                    result.prediction,
                    result.confidence
                );
                self.state = SessionState::Displaying(result);
                Ok(())
            }
            Err(cause) => {
                log::error!("Prediction failed: {}", cause);
                self.state = SessionState::Idle;
                Err(SessionError::AnalysisFailed { cause })
            }
        }
    }

    /// Back to `Idle` with nothing selected. Any reply still in flight is
    /// superseded.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = SessionState::Idle;
        self.pending = None;
        log::info!("Session reset");
    }
}

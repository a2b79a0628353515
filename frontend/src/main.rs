mod components;
mod config;
mod notice;
mod presenter;
mod service;
mod session;

use components::handlers;
use components::header::render_header;
use components::notices::render_notices;
use components::results::render_results;
use components::upload_section::render_upload_section;
use gloo_file::File as GlooFile;
use gloo_file::callbacks::FileReader;
use gloo_timers::callback::Timeout;
use notice::Notice;
use presenter::ResultView;
use service::{HttpPredictionService, ServiceError};
use session::{SelectedFile, Session, SessionState, Ticket};
use shared::PredictionResult;
use std::rc::Rc;
use web_sys::DragEvent;
use yew::prelude::*;

struct ActiveNotice {
    id: u64,
    notice: Notice,
    // Dropping the timeout cancels the auto-dismiss.
    _dismiss: Timeout,
}

// Yew msg components
enum Msg {
    // Selection
    FileChosen(GlooFile),
    FileLoaded(SelectedFile),
    FileReadFailed(String),
    ClearSelection,

    // Submission
    Submit,
    Settled(Ticket, Result<PredictionResult, ServiceError>),
    Reset,

    // UI states
    DismissNotice(u64),
    SetDragging(bool),
    HandleDrop(DragEvent),
}

// Main component
struct Model {
    session: Session,
    service: Rc<HttpPredictionService>,
    notices: Vec<ActiveNotice>,
    file_reader: Option<FileReader>,
    is_dragging: bool,
}

impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        let service = Rc::new(HttpPredictionService::new(
            config::SERVICE_BASE_URL,
            config::REQUEST_TIMEOUT_MS,
        ));
        log::info!("Using prediction service at {}", config::SERVICE_BASE_URL);
        handlers::check_service_health(Rc::clone(&service));

        Self {
            session: Session::new(),
            service,
            notices: Vec::new(),
            file_reader: None,
            is_dragging: false,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::FileChosen(file) => handlers::handle_file_chosen(self, ctx, file),
            Msg::FileLoaded(file) => handlers::handle_file_loaded(self, ctx, file),
            Msg::FileReadFailed(error) => handlers::handle_file_read_failed(self, ctx, error),
            Msg::ClearSelection => handlers::handle_clear_selection(self),

            Msg::Submit => handlers::handle_submit(self, ctx),
            Msg::Settled(ticket, outcome) => handlers::handle_settled(self, ctx, ticket, outcome),
            Msg::Reset => handlers::handle_reset(self),

            Msg::DismissNotice(id) => handlers::handle_dismiss_notice(self, id),
            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }
            Msg::HandleDrop(event) => handlers::handle_drop(self, ctx, event),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let content = match self.session.state() {
            SessionState::Displaying(result) => render_results(&ResultView::derive(result), ctx),
            SessionState::Idle | SessionState::Submitting(_) => render_upload_section(self, ctx),
        };

        html! {
            <div class="container">
                { render_header() }

                <main class="main-content">
                    { content }
                </main>

                { render_notices(self, ctx) }

                <footer class="app-footer">
                    <p>{"Chili Plant Care Assistant | Fullstack Rust WASM"}</p>
                </footer>
            </div>
        }
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("App starting...");
    yew::Renderer::<Model>::new().render();
}

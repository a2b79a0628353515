use super::super::{ActiveNotice, Model, Msg};
use crate::components::utils::generate_id;
use crate::notice::Notice;
use crate::service::{HttpPredictionService, PredictionService, ServiceError};
use crate::session::{PredictionRequest, SelectedFile, SessionError, Ticket};
use gloo_file::File as GlooFile;
use gloo_timers::callback::Timeout;
use shared::PredictionResult;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use web_sys::DragEvent;
use yew::prelude::*;

pub fn handle_file_chosen(model: &mut Model, ctx: &Context<Model>, file: GlooFile) -> bool {
    let media_type = file.raw_mime_type();
    if let Err(err) = model.session.accepts(&media_type) {
        report(model, ctx, &err);
        return true;
    }

    let name = file.name();
    let link = ctx.link().clone();

    let reader = gloo_file::callbacks::read_as_bytes(&file, move |bytes| match bytes {
        Ok(bytes) => link.send_message(Msg::FileLoaded(SelectedFile {
            name,
            media_type,
            bytes,
        })),
        Err(e) => link.send_message(Msg::FileReadFailed(format!("{:?}", e))),
    });

    // Dropping a previous reader aborts it.
    model.file_reader = Some(reader);
    false
}

pub fn handle_file_loaded(model: &mut Model, ctx: &Context<Model>, file: SelectedFile) -> bool {
    model.file_reader = None;
    if let Err(err) = model.session.select_file(file) {
        report(model, ctx, &err);
    }
    true
}

pub fn handle_file_read_failed(model: &mut Model, ctx: &Context<Model>, error: String) -> bool {
    model.file_reader = None;
    log::error!("Failed to read selected file: {}", error);
    report(model, ctx, &SessionError::FileUnreadable { reason: error });
    true
}

pub fn handle_clear_selection(model: &mut Model) -> bool {
    model.session.clear_selection();
    true
}

pub fn handle_submit(model: &mut Model, ctx: &Context<Model>) -> bool {
    match model.session.begin_submission() {
        Ok(request) => {
            send_prediction_request(ctx, Rc::clone(&model.service), request);
            true
        }
        Err(err) => {
            report(model, ctx, &err);
            false
        }
    }
}

pub fn handle_settled(
    model: &mut Model,
    ctx: &Context<Model>,
    ticket: Ticket,
    outcome: Result<PredictionResult, ServiceError>,
) -> bool {
    match model.session.settle(ticket, outcome) {
        Ok(()) => {
            if let Some(result) = model.session.result() {
                log::info!("on_prediction: {}", result.prediction);
            }
            push_notice(model, ctx, Notice::analysis_complete());
            true
        }
        Err(SessionError::StaleResponse(_)) => false,
        Err(err) => {
            report(model, ctx, &err);
            true
        }
    }
}

pub fn handle_reset(model: &mut Model) -> bool {
    log::info!("on_reset");
    model.file_reader = None;
    model.session.reset();
    true
}

pub fn handle_drop(model: &mut Model, ctx: &Context<Model>, event: DragEvent) -> bool {
    event.prevent_default();
    model.is_dragging = false;

    let file = event
        .data_transfer()
        .and_then(|data_transfer| data_transfer.files())
        .and_then(|files| files.item(0));

    if let Some(file) = file {
        handle_file_chosen(model, ctx, GlooFile::from(file));
    }

    true
}

pub fn handle_dismiss_notice(model: &mut Model, id: u64) -> bool {
    let before = model.notices.len();
    model.notices.retain(|active| active.id != id);
    model.notices.len() != before
}

fn report(model: &mut Model, ctx: &Context<Model>, err: &SessionError) {
    match err.notice() {
        Some(notice) => push_notice(model, ctx, notice),
        None => log::debug!("Suppressed session error: {}", err),
    }
}

pub fn push_notice(model: &mut Model, ctx: &Context<Model>, notice: Notice) {
    let id = generate_id();
    let link = ctx.link().clone();
    let dismiss = Timeout::new(notice.duration_ms, move || {
        link.send_message(Msg::DismissNotice(id));
    });

    model.notices.push(ActiveNotice {
        id,
        notice,
        _dismiss: dismiss,
    });
}

pub fn send_prediction_request(
    ctx: &Context<Model>,
    service: Rc<HttpPredictionService>,
    request: PredictionRequest,
) {
    spawn_local({
        let link = ctx.link().clone();

        async move {
            let outcome = service.predict(&request).await;
            link.send_message(Msg::Settled(request.ticket(), outcome));
        }
    });
}

pub fn check_service_health(service: Rc<HttpPredictionService>) {
    spawn_local(async move {
        match service.check_health().await {
            Ok(health) if health.model_loaded => log::info!("Prediction service is ready"),
            Ok(_) => log::warn!("Prediction service is up but has no model loaded"),
            Err(e) => log::warn!("Prediction service unreachable: {}", e),
        }
    });
}

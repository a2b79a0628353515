use super::super::{Model, Msg};
use super::utils::{debounce, open_file_picker};
use gloo_file::File as GlooFile;
use web_sys::{DragEvent, HtmlInputElement};
use yew::prelude::*;

pub fn render_upload_section(model: &Model, ctx: &Context<Model>) -> Html {
    html! {
        <div class="upload-section card">
            { render_drop_zone(model, ctx) }
            { render_file_input(ctx) }
            { render_actions(model, ctx) }
        </div>
    }
}

fn render_file_input(ctx: &Context<Model>) -> Html {
    let handle_change = ctx.link().batch_callback(|e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        let file = input
            .files()
            .and_then(|files| files.item(0))
            .map(GlooFile::from);

        input.set_value("");
        file.map(Msg::FileChosen)
    });

    html! {
        <input
            type="file"
            id="file-input"
            accept="image/*"
            style="display: none;"
            onchange={handle_change}
        />
    }
}

fn render_drop_zone(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link();
    let handle_drag_over = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(true)
    });
    let handle_drag_leave = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(false)
    });
    let handle_drop = link.callback(Msg::HandleDrop);
    let submitting = model.session.is_submitting();

    let content = match model.session.pending() {
        Some(image) => html! {
            <figure class="preview">
                <img
                    id="image-preview"
                    src={image.preview_url().to_string()}
                    alt="Preview"
                    style="max-width: 100%; max-height: 100%; object-fit: contain;"
                />
                <figcaption>{ image.name().to_string() }</figcaption>
            </figure>
        },
        None => html! {
            <div class="upload-placeholder">
                <i class="fa-solid fa-image"></i>
                <p>{"Click to upload plant image"}</p>
                <p class="file-types">{"or drag and drop"}</p>
            </div>
        },
    };

    html! {
        <div
            id="drop-zone"
            class={classes!(
                "upload-area",
                model.session.pending().is_some().then_some("has-preview"),
                model.is_dragging.then_some("drag-over"),
            )}
            ondragover={handle_drag_over}
            ondragleave={handle_drag_leave}
            ondrop={handle_drop}
            onclick={Callback::from(move |_: MouseEvent| {
                if !submitting {
                    open_file_picker();
                }
            })}
        >
            { content }
        </div>
    }
}

fn render_actions(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link().clone();

    if model.session.pending().is_none() {
        return html! {
            <div class="button-container">
                <button
                    id="select-button"
                    class="analyze-btn"
                    onclick={debounce(300, open_file_picker)}
                >
                    <i class="fa-solid fa-image"></i>{" Select Image"}
                </button>
            </div>
        };
    }

    let submitting = model.session.is_submitting();

    html! {
        <div class="button-container">
            <button
                id="analyze-button"
                class="analyze-btn"
                disabled={submitting}
                onclick={debounce(300, {
                    let link = link.clone();
                    move || link.send_message(Msg::Submit)
                })}
            >
                {
                    if submitting {
                        html! { <><i class="fa-solid fa-spinner fa-spin"></i>{" Analyzing..."}</> }
                    } else {
                        html! { <><i class="fa-solid fa-upload"></i>{" Analyze Plant"}</> }
                    }
                }
            </button>
            <button
                id="clear-button"
                class="analyze-btn outline"
                disabled={submitting}
                onclick={link.callback(|_| Msg::ClearSelection)}
            >
                {"Choose Different Image"}
            </button>
        </div>
    }
}

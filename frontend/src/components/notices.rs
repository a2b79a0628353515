use super::super::{Model, Msg};
use yew::prelude::*;

/// Stack of transient notices in the corner of the page.
pub fn render_notices(model: &Model, ctx: &Context<Model>) -> Html {
    if model.notices.is_empty() {
        return html! {};
    }

    html! {
        <div class="notice-stack">
            { for model.notices.iter().map(|active| {
                let id = active.id;
                let notice = &active.notice;
                html! {
                    <div key={id.to_string()} class={classes!("notice", notice.level.css_class())}>
                        <i class={notice.level.icon()}></i>
                        <div class="notice-body">
                            <strong>{ notice.title.clone() }</strong>
                            <p>{ notice.description.clone() }</p>
                        </div>
                        <button
                            class="notice-close"
                            title="Dismiss"
                            onclick={ctx.link().callback(move |_| Msg::DismissNotice(id))}
                        >
                            <i class="fa-solid fa-times"></i>
                        </button>
                    </div>
                }
            })}
        </div>
    }
}

use super::super::{Model, Msg};
use crate::presenter::ResultView;
use yew::prelude::*;

pub fn render_results(view: &ResultView, ctx: &Context<Model>) -> Html {
    html! {
        <div class={classes!("results-container", view.tone.css_class())}>
            { render_status(view) }
            { render_symptoms(view) }
            { render_recommendations(view) }
            { render_breakdown(view) }
            <div class="button-container">
                <button
                    id="reset-button"
                    class="analyze-btn"
                    onclick={ctx.link().callback(|_| Msg::Reset)}
                >
                    <i class="fa-solid fa-rotate"></i>{" Analyze Another Plant"}
                </button>
            </div>
        </div>
    }
}

fn render_status(view: &ResultView) -> Html {
    html! {
        <div class="result-header">
            <h2>
                <i class={view.tone.icon()}></i>
                {" "}{ view.headline.clone() }
            </h2>
            <span class={classes!("severity-badge", view.emphasis.css_class())}>
                { view.confidence_label() }
            </span>
            <div class="confidence-meter">
                <div class="meter">
                    <div
                        class={classes!("meter-fill", view.tone.css_class())}
                        style={format!("width: {}%", view.confidence_percent)}
                    ></div>
                </div>
            </div>
        </div>
    }
}

fn render_symptoms(view: &ResultView) -> Html {
    match view.symptoms {
        Some(symptoms) => html! {
            <div class={classes!("symptoms-alert", view.emphasis.css_class())}>
                <i class="fa-solid fa-triangle-exclamation"></i>
                <div>
                    <h3>{"Symptoms"}</h3>
                    <p>{ symptoms }</p>
                </div>
            </div>
        },
        None => html! {},
    }
}

fn render_recommendations(view: &ResultView) -> Html {
    html! {
        <div class="recommendations card">
            <h3 class="card-header">{ view.recommendations_heading }</h3>
            <dl class="recommendation-grid">
                { for view.details().into_iter().map(|(label, value)| html! {
                    <div class="info-card">
                        <dt>{ label }</dt>
                        <dd>{ value }</dd>
                    </div>
                })}
            </dl>
        </div>
    }
}

fn render_breakdown(view: &ResultView) -> Html {
    if view.breakdown.is_empty() {
        return html! {};
    }

    html! {
        <div class="detailed-results">
            <h3>{"Detailed Analysis"}</h3>
            <div class="result-bars">
                { for view.breakdown.iter().map(|share| html! {
                    <div class="result-item">
                        <div class="result-label">{ share.label }</div>
                        <div class="result-bar-container">
                            <div class="result-bar" style={format!("width: {}%", share.percent)}></div>
                        </div>
                        <div class="result-value">{ format!("{:.1}%", share.percent) }</div>
                    </div>
                })}
            </div>
        </div>
    }
}

use yew::prelude::*;

/// Renders the application header
pub fn render_header() -> Html {
    html! {
        <header class="app-header">
            <h1><span class="chili-icon">{"🌶️"}</span>{" Chili Plant Care Assistant"}</h1>
            <p class="subtitle">
                {"Upload a photo of your chili plant to detect nutrient deficiencies and get personalized organic fertilizer recommendations"}
            </p>
        </header>
    }
}

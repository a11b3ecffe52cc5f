use leptos::prelude::*;

use crate::auth::use_session;
use crate::web::router::Link;

#[component]
pub fn WelcomePage() -> impl IntoView {
    let session = use_session();

    // 已登录用户直接进入仪表盘，否则先登录
    let cta = move || match session.principal() {
        Some(p) => view! {
            <Link to="/dashboard" class="btn btn-primary">
                {format!("Continue as {}", p.greeting_name())}
            </Link>
        }
        .into_any(),
        None => view! {
            <Link to="/login" class="btn btn-primary">"Get Started"</Link>
        }
        .into_any(),
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content text-center">
                <div class="max-w-xl space-y-6">
                    <h1 class="text-5xl font-bold">"Accessibility Analyzer"</h1>
                    <p class="text-lg text-base-content/70">
                        "Scan any web page for accessibility issues, see them grouped by severity, "
                        "and get AI-assisted suggestions for fixing them."
                    </p>
                    <ul class="text-left mx-auto w-fit space-y-1 text-base-content/80">
                        <li>"Automated WCAG checks on any public URL"</li>
                        <li>"Saved reports you can revisit and compare"</li>
                        <li>"Actionable fixes for every issue"</li>
                    </ul>
                    {cta}
                </div>
            </div>
        </div>
    }
}

use a11y_analyzer_shared::{Report, normalize_url};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::{ScreenError, authorized, handle_error, use_api};
use crate::auth::use_session;
use crate::components::feedback::{ErrorAlert, Spinner};
use crate::components::results::AnalysisResults;
use crate::fetch_guard::LatestRequest;
use crate::web::route::AppRoute;
use crate::web::router::Link;

#[component]
pub fn AnalyzePage() -> impl IntoView {
    let session = use_session();
    let client = use_api().client();

    let (url, set_url) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error, set_error) = signal(Option::<ScreenError>::None);
    let (report, set_report) = signal(Option::<Report>::None);

    let guard = LatestRequest::new();
    on_cleanup({
        let guard = guard.clone();
        move || guard.close()
    });

    let submit = move || {
        // 空输入在发请求之前就拦下
        let target = match normalize_url(&url.get_untracked()) {
            Ok(target) => target,
            Err(e) => {
                set_error.set(Some(ScreenError::from(&e)));
                return;
            }
        };

        let ticket = guard.begin();
        set_is_submitting.set(true);
        set_error.set(None);
        set_report.set(None);

        let client = client.clone();
        spawn_local(async move {
            let result = authorized(&session, |token| async move {
                client.submit_analysis(&target, &token).await
            })
            .await;

            if !ticket.is_current() {
                return;
            }
            match result {
                Ok(r) => set_report.set(Some(r)),
                Err(e) => set_error.set(Some(handle_error(&session, "Analyze", e))),
            }
            set_is_submitting.set(false);
        });
    };
    let submit = StoredValue::new(submit);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        submit.with_value(|f| f());
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <form class="card-body" on:submit=on_submit>
                <h2 class="card-title">"Analyze a Web Page"</h2>
                <p class="text-base-content/70 text-sm">
                    "Enter a URL. If you leave out the scheme, http:// is assumed."
                </p>
                <div class="join w-full">
                    <input
                        type="text"
                        placeholder="example.com"
                        aria-label="Website URL"
                        class="input input-bordered join-item w-full"
                        on:input=move |ev| set_url.set(event_target_value(&ev))
                        prop:value=url
                    />
                    <button class="btn btn-primary join-item" disabled=move || is_submitting.get()>
                        {move || if is_submitting.get() {
                            view! { <span class="loading loading-spinner"></span> "Analyzing..." }.into_any()
                        } else {
                            "Analyze".into_any()
                        }}
                    </button>
                </div>
            </form>
        </div>

        {move || error.get().map(|e| view! {
            <ErrorAlert error=e on_retry=Callback::new(move |_| submit.with_value(|f| f())) />
        })}

        <Show when=move || is_submitting.get()>
            <Spinner label="Scanning the page, this can take a minute..." />
        </Show>

        {move || report.get().map(|r| {
            let detail_path = AppRoute::ReportDetail(r.id.clone()).to_path();
            let has_id = !r.id.is_empty();
            let title = r.title();
            let page_url = r.url.clone();
            view! {
                <div class="space-y-4">
                    <div class="flex flex-wrap items-center justify-between gap-2">
                        <div>
                            <h2 class="text-2xl font-bold">{title}</h2>
                            <p class="text-sm text-base-content/60 break-all">{page_url}</p>
                        </div>
                        {has_id.then(|| view! {
                            <Link to=detail_path class="btn btn-outline btn-sm">"Open saved report"</Link>
                        })}
                    </div>
                    <AnalysisResults report=r />
                </div>
            }
        })}
    }
}

//! 设置页
//!
//! 表单状态整合为 `SettingsForm`，负责：
//! - 数据的持有
//! - 从服务端数据填充
//! - 转换为保存请求

use a11y_analyzer_shared::{Settings, Theme};
use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::{ScreenError, authorized, handle_error, use_api};
use crate::auth::use_session;
use crate::components::feedback::{ErrorAlert, Flash, FlashMessage, Spinner};
use crate::fetch_guard::LatestRequest;

/// 表单状态结构体
///
/// 使用 `RwSignal` 因为它实现了 `Copy` trait，可以直接在闭包间传递。
#[derive(Clone, Copy)]
struct SettingsForm {
    email_notifications: RwSignal<bool>,
    theme: RwSignal<Theme>,
}

impl SettingsForm {
    fn new() -> Self {
        Self {
            email_notifications: RwSignal::new(false),
            theme: RwSignal::new(Theme::default()),
        }
    }

    fn fill(&self, settings: Settings) {
        self.email_notifications.set(settings.email_notifications);
        self.theme.set(settings.theme);
    }

    fn to_settings(self) -> Settings {
        Settings {
            email_notifications: self.email_notifications.get_untracked(),
            theme: self.theme.get_untracked(),
        }
    }
}

#[component]
pub fn SettingsPage() -> impl IntoView {
    let session = use_session();
    let client = use_api().client();

    let form = SettingsForm::new();
    let (loading, set_loading) = signal(true);
    let (saving, set_saving) = signal(false);
    let (load_error, set_load_error) = signal(Option::<ScreenError>::None);
    let (flash, set_flash) = signal(Option::<Flash>::None);
    // 每条提示一个序号，旧的定时器不会清掉新的提示
    let flash_seq = StoredValue::new(0u64);

    let loader = LatestRequest::new();
    let saver = LatestRequest::new();
    on_cleanup({
        let loader = loader.clone();
        let saver = saver.clone();
        move || {
            loader.close();
            saver.close();
        }
    });

    let show_flash = move |f: Flash| {
        let duration = f.duration_ms();
        flash_seq.update_value(|s| *s += 1);
        let seq = flash_seq.get_value();
        set_flash.set(Some(f));
        Timeout::new(duration, move || {
            if flash_seq.try_get_value() == Some(seq) {
                set_flash.try_set(None);
            }
        })
        .forget();
    };

    let load = {
        let client = client.clone();
        move || {
            let ticket = loader.begin();
            set_loading.set(true);
            set_load_error.set(None);

            let client = client.clone();
            spawn_local(async move {
                let result =
                    authorized(&session, |token| async move { client.fetch_settings(&token).await })
                        .await;

                if !ticket.is_current() {
                    return;
                }
                match result {
                    Ok(settings) => form.fill(settings),
                    Err(e) => set_load_error.set(Some(handle_error(&session, "Settings", e))),
                }
                set_loading.set(false);
            });
        }
    };
    let load = StoredValue::new(load);

    Effect::new(move |_| load.with_value(|f| f()));

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }
        let ticket = saver.begin();
        let settings = form.to_settings();
        set_saving.set(true);

        let client = client.clone();
        spawn_local(async move {
            let result = authorized(&session, |token| async move {
                client.save_settings(&settings, &token).await
            })
            .await;

            if !ticket.is_current() {
                return;
            }
            match result {
                Ok(()) => show_flash(Flash::success("Settings saved successfully.")),
                Err(e) => {
                    let err = handle_error(&session, "Settings", e);
                    show_flash(Flash::error(err.message));
                }
            }
            set_saving.set(false);
        });
    };

    view! {
        <div class="card bg-base-100 shadow-xl max-w-2xl">
            <div class="card-body">
                <h2 class="card-title">"Settings"</h2>

                {move || load_error.get().map(|e| view! {
                    <ErrorAlert error=e on_retry=Callback::new(move |_| load.with_value(|f| f())) />
                })}

                <Show
                    when=move || !loading.get()
                    fallback=|| view! { <Spinner label="Loading settings..." /> }
                >
                    <form class="space-y-4" on:submit=on_submit.clone()>
                        <div class="form-control">
                            <label class="label cursor-pointer justify-start gap-4">
                                <input
                                    type="checkbox"
                                    class="toggle toggle-primary"
                                    prop:checked=move || form.email_notifications.get()
                                    on:change=move |ev| form.email_notifications.set(event_target_checked(&ev))
                                />
                                <span class="label-text">"Email notifications"</span>
                            </label>
                        </div>

                        <div class="form-control">
                            <label class="label" for="theme">
                                <span class="label-text">"Theme"</span>
                            </label>
                            <select
                                id="theme"
                                class="select select-bordered w-full max-w-xs"
                                on:change=move |ev| {
                                    if let Some(theme) = Theme::from_label(&event_target_value(&ev)) {
                                        form.theme.set(theme);
                                    }
                                }
                            >
                                {Theme::ALL
                                    .into_iter()
                                    .map(|t| view! {
                                        <option value=t.label() selected=move || form.theme.get() == t>
                                            {t.label()}
                                        </option>
                                    })
                                    .collect_view()}
                            </select>
                        </div>

                        <FlashMessage flash=flash />

                        <button class="btn btn-primary" disabled=move || saving.get()>
                            {move || if saving.get() {
                                view! { <span class="loading loading-spinner"></span> "Saving..." }.into_any()
                            } else {
                                "Save Settings".into_any()
                            }}
                        </button>
                    </form>
                </Show>
            </div>
        </div>
    }
}

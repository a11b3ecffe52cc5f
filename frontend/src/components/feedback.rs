//! 加载 / 错误 / 提示等通用反馈组件

use leptos::prelude::*;

use crate::api::ScreenError;

#[component]
pub fn Spinner(#[prop(into, optional)] label: Option<String>) -> impl IntoView {
    view! {
        <div class="flex flex-col items-center justify-center gap-3 py-12 text-base-content/60">
            <span class="loading loading-spinner loading-lg text-primary"></span>
            {label.map(|l| view! { <span class="text-sm">{l}</span> })}
        </div>
    }
}

/// 错误提示；可重试的错误显示 "Retry" 按钮
#[component]
pub fn ErrorAlert(
    error: ScreenError,
    /// 点击重试时调用
    #[prop(optional)]
    on_retry: Option<Callback<()>>,
) -> impl IntoView {
    let retry = on_retry.filter(|_| error.retryable);

    view! {
        <div role="alert" class="alert alert-error">
            <svg xmlns="http://www.w3.org/2000/svg" class="stroke-current shrink-0 h-6 w-6" fill="none" viewBox="0 0 24 24"><path stroke-linecap="round" stroke-linejoin="round" stroke-width="2" d="M10 14l2-2m0 0l2-2m-2 2l-2-2m2 2l2 2m7-2a9 9 0 11-18 0 9 9 0 0118 0z" /></svg>
            <span>{error.message}</span>
            {retry.map(|cb| view! {
                <button class="btn btn-sm" on:click=move |_| cb.run(())>"Retry"</button>
            })}
        </div>
    }
}

/// 短暂显示的提示（成功或失败）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub message: String,
    pub is_error: bool,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }

    /// 自动消失前的显示时长
    pub fn duration_ms(&self) -> u32 {
        if self.is_error { 5_000 } else { 3_000 }
    }
}

#[component]
pub fn FlashMessage(flash: ReadSignal<Option<Flash>>) -> impl IntoView {
    move || {
        flash.get().map(|f| {
            let class = if f.is_error {
                "alert alert-error text-sm py-2"
            } else {
                "alert alert-success text-sm py-2"
            };
            view! {
                <div role="status" class=class>
                    <span>{f.message}</span>
                </div>
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_durations() {
        assert_eq!(Flash::success("Saved").duration_ms(), 3_000);
        assert_eq!(Flash::error("Nope").duration_ms(), 5_000);
    }
}

//! 认证模块
//!
//! 管理用户认证状态，与路由系统解耦。
//! 路由服务通过注入的认证阶段信号来检查认证状态。
//! 状态转移规则在 `a11y_analyzer_shared::session` 中，这里只负责把身份提供方的推送接到信号上。

use std::rc::Rc;

use a11y_analyzer_shared::{ApiError, ApiResult, Principal, SessionEvent, SessionState};
use leptos::logging::{error, log, warn};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::identity::{IdentityProvider, Subscription};
use crate::web::route::AuthPhase;

/// 认证上下文
///
/// 包含状态信号与身份提供方，通过 Context 在组件间共享。
#[derive(Clone, Copy)]
pub struct SessionContext {
    /// 会话状态
    pub state: RwSignal<SessionState>,
    provider: StoredValue<Rc<dyn IdentityProvider>, LocalStorage>,
    subscription: StoredValue<Option<Subscription>, LocalStorage>,
}

impl SessionContext {
    /// 创建新的认证上下文
    pub fn new(provider: Rc<dyn IdentityProvider>) -> Self {
        Self {
            state: RwSignal::new(SessionState::default()),
            provider: StoredValue::new_local(provider),
            subscription: StoredValue::new_local(None),
        }
    }

    /// 获取认证阶段信号（用于路由服务注入）
    pub fn auth_phase_signal(&self) -> Signal<AuthPhase> {
        let state = self.state;
        Signal::derive(move || {
            state.with(|s| {
                if !s.is_resolved() {
                    AuthPhase::Unknown
                } else if s.is_authenticated() {
                    AuthPhase::Authenticated
                } else {
                    AuthPhase::Anonymous
                }
            })
        })
    }

    /// 当前用户（响应式）
    pub fn principal(&self) -> Option<Principal> {
        self.state.with(|s| s.principal().cloned())
    }

    /// 当前用户 id 的 Memo，仅在用户切换时通知订阅者
    pub fn principal_uid(&self) -> Memo<Option<String>> {
        let state = self.state;
        Memo::new(move |_| state.with(|s| s.principal_uid().map(str::to_string)))
    }

    pub fn principal_untracked(&self) -> Option<Principal> {
        self.state.with_untracked(|s| s.principal().cloned())
    }

    /// 登录 / 登出是否进行中
    pub fn is_pending(&self) -> bool {
        self.state.with(|s| s.pending)
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.with(|s| s.last_error.clone())
    }

    fn provider(&self) -> Rc<dyn IdentityProvider> {
        self.provider.get_value()
    }

    fn apply(&self, event: SessionEvent) -> bool {
        let mut changed = false;
        self.state.update(|s| changed = s.apply(event));
        changed
    }
}

/// 从 Context 获取认证上下文
pub fn use_session() -> SessionContext {
    use_context::<SessionContext>().expect("SessionContext should be provided")
}

/// 初始化认证状态：订阅身份提供方的推送
///
/// 订阅在根组件销毁时取消。
pub fn init_session(ctx: &SessionContext) {
    let ctx = *ctx;
    let subscription = ctx.provider().subscribe(Box::new(move |principal| {
        let uid = principal.as_ref().map(|p| p.uid.clone());
        if ctx.apply(SessionEvent::ProviderChanged(principal)) {
            match uid {
                Some(uid) => log!("[Auth] Signed in as {}", uid),
                None => log!("[Auth] Signed out"),
            }
        }
    }));
    ctx.subscription.set_value(Some(subscription));

    on_cleanup(move || {
        ctx.subscription.update_value(|sub| {
            if let Some(sub) = sub.take() {
                sub.cancel();
            }
        });
    });
}

/// 交互式登录
///
/// 成功时用户通过订阅推送送达，这里只维护进行中状态与错误消息。
pub async fn sign_in(ctx: &SessionContext) {
    ctx.apply(SessionEvent::OperationStarted);
    let result = ctx.provider().sign_in().await;
    let message = result.err().map(|e| {
        warn!("[Auth] Sign-in failed: {}", e);
        e.user_message()
    });
    ctx.apply(SessionEvent::OperationFinished(message));
}

/// 注销
///
/// 导航将由路由服务的认证状态监听自动处理。
pub async fn sign_out(ctx: &SessionContext) {
    ctx.apply(SessionEvent::OperationStarted);
    let result = ctx.provider().sign_out().await;
    let message = result.err().map(|e| {
        error!("[Auth] Sign-out failed: {}", e);
        e.user_message()
    });
    ctx.apply(SessionEvent::OperationFinished(message));
}

/// 每次请求前获取新的令牌，不缓存
pub async fn fresh_token(ctx: &SessionContext) -> ApiResult<String> {
    if ctx.principal_untracked().is_none() {
        return Err(ApiError::auth("You are not signed in"));
    }
    ctx.provider()
        .id_token()
        .await
        .map_err(|e| ApiError::auth(e.user_message()).in_op("fresh_token"))
}

/// 后端拒绝了凭据：立即视为未登录，再通知身份提供方登出
///
/// 本地状态先变为未登录，路由只会重定向一次；提供方随后的推送不再产生变化。
pub fn expire_session(ctx: &SessionContext) {
    if !ctx.apply(SessionEvent::ProviderChanged(None)) {
        return;
    }
    warn!("[Auth] Credential rejected by backend, signing out");
    let ctx = *ctx;
    spawn_local(async move {
        if let Err(e) = ctx.provider().sign_out().await {
            error!("[Auth] Provider sign-out failed: {}", e);
        }
    });
}

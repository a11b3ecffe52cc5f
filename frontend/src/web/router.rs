//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，实现高内聚：
//! 所有对 window.history 的操作都集中在此模块。
//! 守卫判定由 `route::RouteMachine` 完成，这里只负责把它的输出应用到浏览器与信号上。

use leptos::logging::log;
use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::route::{AppRoute, AuthPhase, HistoryOp, Outlet, RouteMachine};

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 执行 History 操作（内部工具函数）
fn apply_history(op: &HistoryOp) {
    let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
        return;
    };
    let _ = match op {
        HistoryOp::Push(path) => history.push_state_with_url(&JsValue::NULL, "", Some(path)),
        HistoryOp::Replace(path) => history.replace_state_with_url(&JsValue::NULL, "", Some(path)),
    };
}

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
/// 通过注入认证阶段信号实现与认证系统的解耦。
#[derive(Clone, Copy)]
pub struct RouterService {
    machine: RwSignal<RouteMachine>,
    /// 认证阶段（注入的信号，实现解耦）
    auth_phase: Signal<AuthPhase>,
}

impl RouterService {
    /// 创建新的路由服务
    ///
    /// # Arguments
    /// * `auth_phase` - 认证阶段信号，由外部注入实现解耦
    fn new(auth_phase: Signal<AuthPhase>) -> Self {
        // 1. 初始化当前路由（从 URL 解析）
        let (machine, op) = RouteMachine::new(&current_path(), auth_phase.get_untracked());
        if let Some(op) = op {
            apply_history(&op);
        }

        Self {
            machine: RwSignal::new(machine),
            auth_phase,
        }
    }

    /// 出口当前应显示的内容
    pub fn outlet(&self) -> Memo<Outlet> {
        let machine = self.machine;
        Memo::new(move |_| machine.with(|m| m.outlet().clone()))
    }

    /// 当前请求的路由（用于导航高亮）
    pub fn current_route(&self) -> Memo<AppRoute> {
        let machine = self.machine;
        Memo::new(move |_| machine.with(|m| m.requested().clone()))
    }

    /// **核心方法：导航与守卫**
    ///
    /// 流程：请求 -> 验证(Guard) -> 处理 -> 加载
    pub fn navigate(&self, path: &str) {
        let mut op = None;
        self.machine.update(|m| op = m.navigate(path));
        if let Some(op) = op {
            if !matches!(&op, HistoryOp::Push(p) if p == path) {
                log!("[Router] Guard redirected {} -> {:?}", path, op);
            }
            apply_history(&op);
        }
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let machine = self.machine;

        let closure = Closure::<dyn Fn()>::new(move || {
            let path = current_path();
            let mut op = None;
            // popstate 时也执行守卫逻辑
            machine.update(|m| op = m.pop(&path));
            if let Some(op) = op {
                log!("[Router] Access Denied on history navigation. {:?}", op);
                apply_history(&op);
            }
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 设置认证状态变化时的自动重定向
    fn setup_auth_redirect(&self) {
        let machine = self.machine;
        let auth_phase = self.auth_phase;

        // 使用 Effect 监听认证状态变化
        Effect::new(move |_| {
            let phase = auth_phase.get();
            let mut op = None;
            machine.update(|m| op = m.auth_changed(phase));
            if let Some(op) = op {
                log!("[Router] Auth state changed to {:?}, redirecting: {:?}", phase, op);
                apply_history(&op);
            }
        });
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(auth_phase: Signal<AuthPhase>) -> RouterService {
    let router = RouterService::new(auth_phase);

    // 初始化监听器
    router.init_popstate_listener();
    router.setup_auth_redirect();

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

/// 导航函数（返回一个可调用的闭包）
pub fn use_navigate() -> impl Fn(&str) + Clone {
    let router = use_router();
    move |to: &str| {
        router.navigate(to);
    }
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
///
/// 提供路由上下文，应在 App 根部使用。
#[component]
pub fn Router(
    /// 认证阶段信号
    auth_phase: Signal<AuthPhase>,
    /// 子组件
    children: Children,
) -> impl IntoView {
    // 提供路由服务到 Context
    provide_router(auth_phase);

    children()
}

/// 路由出口组件
///
/// 根据当前路由状态渲染对应的组件；认证未确定时显示加载状态。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let outlet = use_router().outlet();

    move || match outlet.get() {
        Outlet::Loading => view! {
            <div class="flex items-center justify-center min-h-screen">
                <span class="loading loading-spinner loading-lg text-primary"></span>
            </div>
        }
        .into_any(),
        Outlet::Page(route) => matcher(route),
    }
}

/// 应用内链接：拦截点击，走路由服务
#[component]
pub fn Link(
    /// 目标路径
    #[prop(into)]
    to: String,
    #[prop(into, optional)] class: MaybeProp<String>,
    /// 子内容
    children: Children,
) -> impl IntoView {
    let router = use_router();

    let to_clone = to.clone();
    let on_click = move |ev: leptos::ev::MouseEvent| {
        // 保留 Ctrl / Cmd 点击在新标签页打开的行为
        if ev.ctrl_key() || ev.meta_key() || ev.shift_key() {
            return;
        }
        ev.prevent_default();
        router.navigate(&to_clone);
    };

    view! {
        <a href=to class=move || class.get() on:click=on_click>
            {children()}
        </a>
    }
}

//! 无障碍分析器前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::route`: 路由定义与守卫状态机（领域模型）
//! - `web::router`: 路由服务（核心引擎）
//! - `auth` / `identity`: 认证状态管理与身份提供方
//! - `api`: 报告服务客户端接入
//! - `components`: UI 组件层

mod api;
mod auth;
mod config;
mod fetch_guard;
mod identity;
mod components {
    pub mod analyze;
    pub mod chart;
    pub mod dashboard;
    pub mod feedback;
    pub mod layout;
    pub mod login;
    pub mod profile;
    pub mod report_detail;
    pub mod results;
    pub mod saved_reports;
    pub mod settings;
    pub mod welcome;
}

use crate::api::ApiContext;
use crate::auth::{SessionContext, init_session};
use crate::components::analyze::AnalyzePage;
use crate::components::dashboard::DashboardPage;
use crate::components::layout::AppShell;
use crate::components::login::LoginPage;
use crate::components::profile::ProfilePage;
use crate::components::report_detail::ReportDetailPage;
use crate::components::saved_reports::SavedReportsPage;
use crate::components::settings::SettingsPage;
use crate::components::welcome::WelcomePage;
use crate::config::AppConfig;
use crate::identity::connect_identity;

use leptos::logging::log;
use leptos::prelude::*;

pub(crate) mod web {
    pub mod route;
    pub mod router;
}

use web::route::AppRoute;
use web::router::{Router, RouterOutlet};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件；受保护页面包在应用外壳中。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Welcome => view! { <WelcomePage /> }.into_any(),
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Analyze => view! { <AppShell><AnalyzePage /></AppShell> }.into_any(),
        AppRoute::Dashboard => view! { <AppShell><DashboardPage /></AppShell> }.into_any(),
        AppRoute::Reports => view! { <AppShell><SavedReportsPage /></AppShell> }.into_any(),
        AppRoute::ReportDetail(id) => {
            view! { <AppShell><ReportDetailPage id=id /></AppShell> }.into_any()
        }
        AppRoute::Settings => view! { <AppShell><SettingsPage /></AppShell> }.into_any(),
        AppRoute::Profile => view! { <AppShell><ProfilePage /></AppShell> }.into_any(),
        // 守卫会在认证确定后重定向，这里不会长时间停留
        AppRoute::NotFound(_) => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"Page not found"</p>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 读取配置
    let config = AppConfig::load();
    log!("[App] Using analysis service at {}", config.api.base_url);

    // 2. 创建认证上下文并订阅身份提供方
    let session = SessionContext::new(connect_identity(&config.firebase));
    provide_context(session);
    init_session(&session);

    // 3. 报告服务客户端
    provide_context(ApiContext::new(&config.api.base_url));

    // 4. 获取认证阶段信号，用于注入路由服务（解耦！）
    let auth_phase = session.auth_phase_signal();

    view! {
        // 5. 路由器组件：注入认证信号实现守卫
        <Router auth_phase=auth_phase>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}

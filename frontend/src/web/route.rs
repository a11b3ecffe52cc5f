//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由、守卫规则，以及一个可在原生环境下测试的导航状态机。

use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 欢迎页 (默认路由)
    #[default]
    Welcome,
    Login,
    /// 提交分析 (需要认证)
    Analyze,
    Dashboard,
    /// 已保存的报告列表
    Reports,
    /// 单份报告详情，携带报告 id
    ReportDetail(String),
    Settings,
    Profile,
    /// 页面未找到，保留原始路径
    NotFound(String),
}

/// 认证阶段（路由只关心这三种情况）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthPhase {
    /// 身份提供方尚未给出第一次结果
    #[default]
    Unknown,
    Anonymous,
    Authenticated,
}

/// 守卫的裁决
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Render,
    /// 显示加载状态，等待认证结果
    Suspend,
    Redirect(AppRoute),
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim();
        let normalized = match trimmed.trim_end_matches('/') {
            "" => "/",
            p => p,
        };

        match normalized {
            "/" => Self::Welcome,
            "/login" => Self::Login,
            "/analyze" => Self::Analyze,
            "/dashboard" => Self::Dashboard,
            "/reports" => Self::Reports,
            "/settings" => Self::Settings,
            "/profile" => Self::Profile,
            other => match other.strip_prefix("/reports/") {
                // id 只在这里解码一次，请求时再由客户端转义
                Some(id) if !id.is_empty() && !id.contains('/') => Self::ReportDetail(
                    urlencoding::decode(id)
                        .map(|d| d.into_owned())
                        .unwrap_or_else(|_| id.to_string()),
                ),
                _ => Self::NotFound(trimmed.to_string()),
            },
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Welcome => "/".into(),
            Self::Login => "/login".into(),
            Self::Analyze => "/analyze".into(),
            Self::Dashboard => "/dashboard".into(),
            Self::Reports => "/reports".into(),
            Self::ReportDetail(id) => format!("/reports/{}", urlencoding::encode(id)),
            Self::Settings => "/settings".into(),
            Self::Profile => "/profile".into(),
            Self::NotFound(path) => path.clone(),
        }
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Self::Analyze
                | Self::Dashboard
                | Self::Reports
                | Self::ReportDetail(_)
                | Self::Settings
                | Self::Profile
        )
    }

    /// 导航栏中对应的顶级路径，用于高亮当前项
    pub fn section(&self) -> String {
        match self {
            Self::ReportDetail(_) => Self::Reports.to_path(),
            other => other.to_path(),
        }
    }

    /// 给定认证阶段，决定该路由如何处理
    pub fn guard(&self, phase: AuthPhase) -> RouteDecision {
        match (phase, self) {
            (_, Self::Welcome) => RouteDecision::Render,
            (AuthPhase::Unknown, _) => RouteDecision::Suspend,

            (AuthPhase::Anonymous, Self::Login) => RouteDecision::Render,
            (AuthPhase::Anonymous, Self::NotFound(_)) => RouteDecision::Redirect(Self::Welcome),
            (AuthPhase::Anonymous, _) => RouteDecision::Redirect(Self::auth_failure_redirect()),

            (AuthPhase::Authenticated, Self::Login | Self::NotFound(_)) => {
                RouteDecision::Redirect(Self::auth_success_redirect())
            }
            (AuthPhase::Authenticated, _) => RouteDecision::Render,
        }
    }

    /// 获取认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 获取认证成功时的重定向目标（从登录页）
    pub fn auth_success_redirect() -> Self {
        Self::Dashboard
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

// =========================================================
// 导航状态机
// =========================================================

/// 需要对 window.history 执行的操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryOp {
    Push(String),
    Replace(String),
}

/// 路由出口当前应显示的内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outlet {
    Loading,
    Page(AppRoute),
}

/// 导航来源，决定重定向使用 push 还是 replace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// 应用内点击：地址栏尚未改变
    Navigate,
    /// 浏览器后退 / 前进或首次加载：地址栏已经是目标路径
    External,
    /// 认证状态变化：对当前条目重新判定
    AuthChange,
}

/// 纯状态机：记录请求的路由与认证阶段，输出出口内容与 History 操作
///
/// 重定向只在阶段变化或导航时计算一次，重复的认证推送不会再次重定向。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMachine {
    requested: AppRoute,
    phase: AuthPhase,
    outlet: Outlet,
}

/// 重定向链的上限（实际最多一跳）
const MAX_REDIRECTS: usize = 4;

impl RouteMachine {
    /// 首次加载时根据地址栏创建
    pub fn new(path: &str, phase: AuthPhase) -> (Self, Option<HistoryOp>) {
        let mut machine = Self {
            requested: AppRoute::default(),
            phase,
            outlet: Outlet::Loading,
        };
        let op = machine.resolve(AppRoute::from_path(path), Origin::External);
        (machine, op)
    }

    pub fn outlet(&self) -> &Outlet {
        &self.outlet
    }

    pub fn requested(&self) -> &AppRoute {
        &self.requested
    }

    pub fn phase(&self) -> AuthPhase {
        self.phase
    }

    /// 应用内导航
    pub fn navigate(&mut self, path: &str) -> Option<HistoryOp> {
        self.resolve(AppRoute::from_path(path), Origin::Navigate)
    }

    /// 浏览器后退 / 前进
    pub fn pop(&mut self, path: &str) -> Option<HistoryOp> {
        self.resolve(AppRoute::from_path(path), Origin::External)
    }

    /// 认证阶段变化；阶段未变时不做任何事
    pub fn auth_changed(&mut self, phase: AuthPhase) -> Option<HistoryOp> {
        if phase == self.phase {
            return None;
        }
        self.phase = phase;
        let target = self.requested.clone();
        self.resolve(target, Origin::AuthChange)
    }

    fn resolve(&mut self, target: AppRoute, origin: Origin) -> Option<HistoryOp> {
        let mut current = target;
        let mut redirected = false;

        for _ in 0..MAX_REDIRECTS {
            match current.guard(self.phase) {
                RouteDecision::Redirect(next) if next != current => {
                    current = next;
                    redirected = true;
                }
                RouteDecision::Suspend => {
                    self.requested = current.clone();
                    self.outlet = Outlet::Loading;
                    return Self::history_op(&current, origin, redirected);
                }
                _ => break,
            }
        }

        self.requested = current.clone();
        let op = Self::history_op(&current, origin, redirected);
        self.outlet = Outlet::Page(current);
        op
    }

    fn history_op(route: &AppRoute, origin: Origin, redirected: bool) -> Option<HistoryOp> {
        match (origin, redirected) {
            (Origin::Navigate, _) => Some(HistoryOp::Push(route.to_path())),
            (_, true) => Some(HistoryOp::Replace(route.to_path())),
            (_, false) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_parsing() {
        assert_eq!(AppRoute::from_path("/"), AppRoute::Welcome);
        assert_eq!(AppRoute::from_path(""), AppRoute::Welcome);
        assert_eq!(AppRoute::from_path("/dashboard/"), AppRoute::Dashboard);
        assert_eq!(
            AppRoute::from_path("/reports/65f0c1"),
            AppRoute::ReportDetail("65f0c1".into())
        );
        assert_eq!(AppRoute::from_path("/reports"), AppRoute::Reports);
        assert_eq!(
            AppRoute::from_path("/reports/a/b"),
            AppRoute::NotFound("/reports/a/b".into())
        );
        assert_eq!(AppRoute::from_path("/nope"), AppRoute::NotFound("/nope".into()));
    }

    #[test]
    fn test_path_round_trip() {
        for route in [
            AppRoute::Welcome,
            AppRoute::Login,
            AppRoute::Analyze,
            AppRoute::Dashboard,
            AppRoute::Reports,
            AppRoute::ReportDetail("abc".into()),
            AppRoute::Settings,
            AppRoute::Profile,
        ] {
            assert_eq!(AppRoute::from_path(&route.to_path()), route);
        }
    }

    #[test]
    fn test_report_id_is_decoded_once() {
        let route = AppRoute::from_path("/reports/a%25b%20c");
        assert_eq!(route, AppRoute::ReportDetail("a%b c".into()));
        assert_eq!(route.to_path(), "/reports/a%25b%20c");

        let slash = AppRoute::ReportDetail("x/y".into());
        assert_eq!(slash.to_path(), "/reports/x%2Fy");
        assert_eq!(AppRoute::from_path(&slash.to_path()), slash);
    }

    #[test]
    fn test_section_groups_report_detail() {
        assert_eq!(AppRoute::ReportDetail("x".into()).section(), "/reports");
        assert_eq!(AppRoute::Settings.section(), "/settings");
    }

    #[test]
    fn test_guard_table() {
        use AuthPhase::*;
        let protected = AppRoute::Dashboard;

        assert_eq!(protected.guard(Unknown), RouteDecision::Suspend);
        assert_eq!(protected.guard(Anonymous), RouteDecision::Redirect(AppRoute::Login));
        assert_eq!(protected.guard(Authenticated), RouteDecision::Render);

        assert_eq!(AppRoute::Login.guard(Anonymous), RouteDecision::Render);
        assert_eq!(
            AppRoute::Login.guard(Authenticated),
            RouteDecision::Redirect(AppRoute::Dashboard)
        );

        let missing = AppRoute::NotFound("/x".into());
        assert_eq!(missing.guard(Unknown), RouteDecision::Suspend);
        assert_eq!(missing.guard(Anonymous), RouteDecision::Redirect(AppRoute::Welcome));
        assert_eq!(
            missing.guard(Authenticated),
            RouteDecision::Redirect(AppRoute::Dashboard)
        );

        for phase in [Unknown, Anonymous, Authenticated] {
            assert_eq!(AppRoute::Welcome.guard(phase), RouteDecision::Render);
        }
    }

    #[test]
    fn test_unknown_auth_suspends_then_redirects_once() {
        let (mut machine, op) = RouteMachine::new("/reports", AuthPhase::Unknown);
        assert_eq!(op, None);
        assert_eq!(machine.outlet(), &Outlet::Loading);

        let op = machine.auth_changed(AuthPhase::Anonymous);
        assert_eq!(op, Some(HistoryOp::Replace("/login".into())));
        assert_eq!(machine.outlet(), &Outlet::Page(AppRoute::Login));

        // 重复推送同一阶段不会再次重定向
        assert_eq!(machine.auth_changed(AuthPhase::Anonymous), None);
        assert_eq!(machine.outlet(), &Outlet::Page(AppRoute::Login));
    }

    #[test]
    fn test_unknown_auth_then_signed_in_renders_target() {
        let (mut machine, _) = RouteMachine::new("/reports/r1", AuthPhase::Unknown);
        assert_eq!(machine.auth_changed(AuthPhase::Authenticated), None);
        assert_eq!(
            machine.outlet(),
            &Outlet::Page(AppRoute::ReportDetail("r1".into()))
        );
    }

    #[test]
    fn test_sign_in_from_login_goes_to_dashboard() {
        let (mut machine, _) = RouteMachine::new("/login", AuthPhase::Anonymous);
        assert_eq!(machine.outlet(), &Outlet::Page(AppRoute::Login));

        let op = machine.auth_changed(AuthPhase::Authenticated);
        assert_eq!(op, Some(HistoryOp::Replace("/dashboard".into())));
        assert_eq!(machine.requested(), &AppRoute::Dashboard);
    }

    #[test]
    fn test_sign_out_on_protected_page() {
        let (mut machine, _) = RouteMachine::new("/settings", AuthPhase::Authenticated);
        let op = machine.auth_changed(AuthPhase::Anonymous);
        assert_eq!(op, Some(HistoryOp::Replace("/login".into())));

        // 欢迎页在登出时保持不变
        let (mut machine, _) = RouteMachine::new("/", AuthPhase::Authenticated);
        assert_eq!(machine.auth_changed(AuthPhase::Anonymous), None);
        assert_eq!(machine.outlet(), &Outlet::Page(AppRoute::Welcome));
    }

    #[test]
    fn test_navigate_pushes_final_path() {
        let (mut machine, _) = RouteMachine::new("/", AuthPhase::Anonymous);
        assert_eq!(
            machine.navigate("/analyze"),
            Some(HistoryOp::Push("/login".into()))
        );

        let (mut machine, _) = RouteMachine::new("/dashboard", AuthPhase::Authenticated);
        assert_eq!(
            machine.navigate("/reports/abc"),
            Some(HistoryOp::Push("/reports/abc".into()))
        );
        assert_eq!(
            machine.outlet(),
            &Outlet::Page(AppRoute::ReportDetail("abc".into()))
        );
    }

    #[test]
    fn test_unmatched_path_on_load() {
        let (machine, op) = RouteMachine::new("/missing", AuthPhase::Authenticated);
        assert_eq!(op, Some(HistoryOp::Replace("/dashboard".into())));
        assert_eq!(machine.outlet(), &Outlet::Page(AppRoute::Dashboard));

        let (mut machine, op) = RouteMachine::new("/missing", AuthPhase::Unknown);
        assert_eq!(op, None);
        assert_eq!(
            machine.auth_changed(AuthPhase::Anonymous),
            Some(HistoryOp::Replace("/".into()))
        );
    }

    #[test]
    fn test_popstate_redirect_replaces() {
        let (mut machine, _) = RouteMachine::new("/", AuthPhase::Anonymous);
        assert_eq!(
            machine.pop("/profile"),
            Some(HistoryOp::Replace("/login".into()))
        );
        assert_eq!(machine.pop("/"), None);
    }
}

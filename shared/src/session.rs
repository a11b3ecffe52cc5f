//! 认证状态机
//!
//! 身份提供方采用推送模型：登录 / 登出本身不返回用户，
//! 真正的用户变化通过 `onAuthStateChanged` 回调送达。
//! 这里把这些事件折叠为一个不可变的 `SessionState`。

use crate::Principal;

/// 认证状态
///
/// 初次检查完成前为 `Unknown`：既不是已登录也不是已确认未登录，
/// 依赖用户的界面必须暂停渲染。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthStatus {
    #[default]
    Unknown,
    SignedOut,
    SignedIn(Principal),
}

impl AuthStatus {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, AuthStatus::Unknown)
    }

    pub fn principal(&self) -> Option<&Principal> {
        match self {
            AuthStatus::SignedIn(p) => Some(p),
            _ => None,
        }
    }
}

/// 会话事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// 身份提供方推送的用户变化（`None` 表示未登录）
    ProviderChanged(Option<Principal>),
    /// 交互式登录 / 登出开始
    OperationStarted,
    /// 交互式登录 / 登出结束（无论成败）；失败时携带消息
    OperationFinished(Option<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub status: AuthStatus,
    /// 是否有登录 / 登出操作进行中（仅用于按钮状态，不影响 `status`）
    pub pending: bool,
    /// 最近一次登录 / 登出失败的消息
    pub last_error: Option<String>,
}

impl SessionState {
    pub fn principal(&self) -> Option<&Principal> {
        self.status.principal()
    }

    /// 当前用户 id；只随用户变化，不受 `pending` / `last_error` 影响
    pub fn principal_uid(&self) -> Option<&str> {
        self.principal().map(|p| p.uid.as_str())
    }

    pub fn is_resolved(&self) -> bool {
        self.status.is_resolved()
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal().is_some()
    }

    /// 应用一个事件，返回用户是否发生了变化
    pub fn apply(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::ProviderChanged(principal) => {
                let next = match principal {
                    Some(p) => AuthStatus::SignedIn(p),
                    None => AuthStatus::SignedOut,
                };
                let changed = next != self.status;
                self.status = next;
                if self.is_authenticated() {
                    self.last_error = None;
                }
                changed
            }
            SessionEvent::OperationStarted => {
                self.pending = true;
                self.last_error = None;
                false
            }
            SessionEvent::OperationFinished(error) => {
                self.pending = false;
                self.last_error = error;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(uid: &str) -> Principal {
        Principal {
            uid: uid.into(),
            display_name: Some("Ada".into()),
            email: None,
            photo_url: None,
        }
    }

    #[test]
    fn test_starts_unknown() {
        let state = SessionState::default();
        assert!(!state.is_resolved());
        assert!(!state.is_authenticated());
        assert!(state.principal().is_none());
    }

    #[test]
    fn test_provider_push_resolves() {
        let mut state = SessionState::default();
        assert!(state.apply(SessionEvent::ProviderChanged(None)));
        assert!(state.is_resolved());
        assert_eq!(state.status, AuthStatus::SignedOut);

        assert!(state.apply(SessionEvent::ProviderChanged(Some(principal("u1")))));
        assert_eq!(state.principal().unwrap().uid, "u1");

        // 相同用户再次推送不算变化
        assert!(!state.apply(SessionEvent::ProviderChanged(Some(principal("u1")))));
    }

    #[test]
    fn test_failed_sign_in_keeps_principal() {
        let mut state = SessionState::default();
        state.apply(SessionEvent::ProviderChanged(None));
        state.apply(SessionEvent::OperationStarted);
        assert!(state.pending);
        assert!(state.is_resolved());

        state.apply(SessionEvent::OperationFinished(Some("popup closed".into())));
        assert!(!state.pending);
        assert_eq!(state.status, AuthStatus::SignedOut);
        assert_eq!(state.last_error.as_deref(), Some("popup closed"));
    }

    #[test]
    fn test_sign_in_success_is_push_based() {
        let mut state = SessionState::default();
        state.apply(SessionEvent::ProviderChanged(None));
        state.apply(SessionEvent::OperationStarted);
        state.apply(SessionEvent::ProviderChanged(Some(principal("u2"))));
        state.apply(SessionEvent::OperationFinished(None));
        assert!(state.is_authenticated());
        assert!(!state.pending);
        assert!(state.last_error.is_none());
    }

    #[test]
    fn test_uid_is_stable_across_operations() {
        let mut state = SessionState::default();
        assert_eq!(state.principal_uid(), None);

        state.apply(SessionEvent::ProviderChanged(Some(principal("u1"))));
        let before = state.principal_uid().map(str::to_string);

        state.apply(SessionEvent::OperationStarted);
        assert_eq!(state.principal_uid().map(str::to_string), before);
        state.apply(SessionEvent::OperationFinished(Some("network".into())));
        assert_eq!(state.principal_uid(), Some("u1"));

        state.apply(SessionEvent::ProviderChanged(Some(principal("u2"))));
        assert_eq!(state.principal_uid(), Some("u2"));
    }
}

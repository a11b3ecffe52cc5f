//! 身份提供方
//!
//! 通过 `IdentityProvider` trait 与会话层解耦。
//! 浏览器中使用 Firebase compat SDK（index.html 中加载的 `window.firebase`），
//! 未配置或非 WASM 环境下使用 `UnavailableIdentity`。

use std::fmt;
use std::rc::Rc;

use a11y_analyzer_shared::Principal;
use async_trait::async_trait;
use leptos::logging::warn;

use crate::config::FirebaseConfig;

// =========================================================
// 错误
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityError {
    /// 身份提供方的错误码，例如 `auth/popup-closed-by-user`
    pub code: Option<String>,
    pub message: String,
}

impl IdentityError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// 面向用户的提示
    pub fn user_message(&self) -> String {
        match self.code.as_deref() {
            Some("auth/popup-closed-by-user") | Some("auth/cancelled-popup-request") => {
                "Sign-in was cancelled.".to_string()
            }
            Some("auth/popup-blocked") => {
                "The sign-in popup was blocked by the browser. Allow popups and try again."
                    .to_string()
            }
            Some("auth/network-request-failed") => {
                "Could not reach the sign-in service. Check your connection.".to_string()
            }
            _ => self.message.clone(),
        }
    }
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "[{}] {}", code, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for IdentityError {}

// =========================================================
// Trait
// =========================================================

/// 取消订阅句柄
pub struct Subscription(Option<Box<dyn FnOnce()>>);

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self(Some(Box::new(cancel)))
    }

    pub fn noop() -> Self {
        Self(None)
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.0.take() {
            cancel();
        }
    }
}

pub type PrincipalCallback = Box<dyn Fn(Option<Principal>)>;

/// 身份提供方：推送模型
///
/// `sign_in` / `sign_out` 成功时不返回用户，
/// 用户变化只通过 `subscribe` 注册的回调送达。
#[async_trait(?Send)]
pub trait IdentityProvider {
    fn subscribe(&self, on_change: PrincipalCallback) -> Subscription;

    async fn sign_in(&self) -> Result<(), IdentityError>;

    async fn sign_out(&self) -> Result<(), IdentityError>;

    /// 获取一个新的令牌（可能触发刷新）
    async fn id_token(&self) -> Result<String, IdentityError>;
}

/// 将 SDK 推送的 JSON 快照解析为用户
pub fn parse_principal(raw: Option<String>) -> Option<Principal> {
    let raw = raw?;
    match serde_json::from_str::<Principal>(&raw) {
        Ok(p) if !p.uid.is_empty() => Some(p),
        Ok(_) => None,
        Err(e) => {
            warn!("[Identity] Ignoring malformed user snapshot: {}", e);
            None
        }
    }
}

// =========================================================
// 不可用的提供方
// =========================================================

/// 未配置身份提供方时使用：始终处于未登录状态
pub struct UnavailableIdentity {
    reason: String,
}

impl UnavailableIdentity {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait(?Send)]
impl IdentityProvider for UnavailableIdentity {
    fn subscribe(&self, on_change: PrincipalCallback) -> Subscription {
        on_change(None);
        Subscription::noop()
    }

    async fn sign_in(&self) -> Result<(), IdentityError> {
        Err(IdentityError::new(self.reason.clone()))
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        Ok(())
    }

    async fn id_token(&self) -> Result<String, IdentityError> {
        Err(IdentityError::new(self.reason.clone()))
    }
}

/// 根据配置选择身份提供方
pub fn connect_identity(config: &FirebaseConfig) -> Rc<dyn IdentityProvider> {
    if !config.is_configured() {
        warn!("[Identity] Firebase is not configured; sign-in is disabled");
        return Rc::new(UnavailableIdentity::new(
            "Sign-in is not configured for this deployment.",
        ));
    }
    connect_firebase(config)
}

#[cfg(not(target_arch = "wasm32"))]
fn connect_firebase(_config: &FirebaseConfig) -> Rc<dyn IdentityProvider> {
    Rc::new(UnavailableIdentity::new(
        "Sign-in is only available in the browser.",
    ))
}

#[cfg(target_arch = "wasm32")]
fn connect_firebase(config: &FirebaseConfig) -> Rc<dyn IdentityProvider> {
    match firebase::FirebaseIdentity::init(config) {
        Ok(provider) => Rc::new(provider),
        Err(e) => {
            leptos::logging::error!("[Identity] Firebase init failed: {}", e);
            Rc::new(UnavailableIdentity::new(e.user_message()))
        }
    }
}

// =========================================================
// Firebase 绑定
// =========================================================

#[cfg(target_arch = "wasm32")]
mod firebase {
    use async_trait::async_trait;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;

    use super::{IdentityError, IdentityProvider, PrincipalCallback, Subscription, parse_principal};
    use crate::config::FirebaseConfig;

    #[wasm_bindgen(inline_js = r#"
        function auth() {
            if (!window.firebase) { throw new Error("Firebase SDK is not loaded"); }
            return window.firebase.auth();
        }
        export function init_app(configJson) {
            if (!window.firebase) { throw new Error("Firebase SDK is not loaded"); }
            if (!window.firebase.apps.length) {
                window.firebase.initializeApp(JSON.parse(configJson));
            }
        }
        export function on_auth_state_changed(callback) {
            return auth().onAuthStateChanged((u) => {
                callback(u ? JSON.stringify({
                    uid: u.uid,
                    displayName: u.displayName,
                    email: u.email,
                    photoURL: u.photoURL,
                }) : null);
            });
        }
        export function sign_in_with_google() {
            const provider = new window.firebase.auth.GoogleAuthProvider();
            return auth().signInWithPopup(provider).then(() => undefined);
        }
        export function sign_out() {
            return auth().signOut();
        }
        export function current_id_token() {
            const user = auth().currentUser;
            if (!user) { return Promise.reject(new Error("No signed-in user")); }
            return user.getIdToken();
        }
    "#)]
    extern "C" {
        #[wasm_bindgen(catch)]
        fn init_app(config_json: &str) -> Result<(), JsValue>;
        #[wasm_bindgen(catch)]
        fn on_auth_state_changed(
            callback: &Closure<dyn FnMut(Option<String>)>,
        ) -> Result<js_sys::Function, JsValue>;
        #[wasm_bindgen(catch)]
        fn sign_in_with_google() -> Result<js_sys::Promise, JsValue>;
        #[wasm_bindgen(catch)]
        fn sign_out() -> Result<js_sys::Promise, JsValue>;
        #[wasm_bindgen(catch)]
        fn current_id_token() -> Result<js_sys::Promise, JsValue>;
    }

    impl From<JsValue> for IdentityError {
        fn from(value: JsValue) -> Self {
            let code = js_sys::Reflect::get(&value, &JsValue::from_str("code"))
                .ok()
                .and_then(|c| c.as_string());
            let message = value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
                .or_else(|| value.as_string())
                .unwrap_or_else(|| "Unknown identity provider error".to_string());
            IdentityError { code, message }
        }
    }

    async fn settle(promise: Result<js_sys::Promise, JsValue>) -> Result<JsValue, IdentityError> {
        let promise = promise?;
        Ok(JsFuture::from(promise).await?)
    }

    pub struct FirebaseIdentity;

    impl FirebaseIdentity {
        pub fn init(config: &FirebaseConfig) -> Result<Self, IdentityError> {
            let json = serde_json::to_string(config)
                .map_err(|e| IdentityError::new(format!("Invalid Firebase config: {}", e)))?;
            init_app(&json)?;
            Ok(Self)
        }
    }

    #[async_trait(?Send)]
    impl IdentityProvider for FirebaseIdentity {
        fn subscribe(&self, on_change: PrincipalCallback) -> Subscription {
            let closure = Closure::<dyn FnMut(Option<String>)>::new(move |raw: Option<String>| {
                on_change(parse_principal(raw));
            });
            match on_auth_state_changed(&closure) {
                Ok(unsubscribe) => Subscription::new(move || {
                    let _ = unsubscribe.call0(&JsValue::NULL);
                    // 取消订阅后闭包才能释放
                    drop(closure);
                }),
                Err(e) => {
                    leptos::logging::error!(
                        "[Identity] Subscription failed: {}",
                        IdentityError::from(e)
                    );
                    Subscription::noop()
                }
            }
        }

        async fn sign_in(&self) -> Result<(), IdentityError> {
            settle(sign_in_with_google()).await.map(|_| ())
        }

        async fn sign_out(&self) -> Result<(), IdentityError> {
            settle(sign_out()).await.map(|_| ())
        }

        async fn id_token(&self) -> Result<String, IdentityError> {
            settle(current_id_token())
                .await?
                .as_string()
                .ok_or_else(|| IdentityError::new("Identity token was not a string"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_parse_principal() {
        let raw = r#"{"uid":"u1","displayName":"Ada","email":null,"photoURL":null}"#;
        let p = parse_principal(Some(raw.into())).unwrap();
        assert_eq!(p.uid, "u1");
        assert_eq!(p.display_name.as_deref(), Some("Ada"));

        assert!(parse_principal(None).is_none());
        assert!(parse_principal(Some("not json".into())).is_none());
        assert!(parse_principal(Some(r#"{"uid":""}"#.into())).is_none());
    }

    #[test]
    fn test_user_message_maps_known_codes() {
        let cancelled = IdentityError::with_code("auth/popup-closed-by-user", "Popup closed");
        assert_eq!(cancelled.user_message(), "Sign-in was cancelled.");

        let other = IdentityError::with_code("auth/internal-error", "boom");
        assert_eq!(other.user_message(), "boom");
        assert_eq!(other.to_string(), "[auth/internal-error] boom");
    }

    #[test]
    fn test_subscription_cancel_runs_once() {
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        Subscription::new(move || *c.borrow_mut() += 1).cancel();
        assert_eq!(*count.borrow(), 1);
        Subscription::noop().cancel();
    }

    #[tokio::test]
    async fn test_unavailable_identity_resolves_signed_out() {
        let provider = UnavailableIdentity::new("not configured");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        provider.subscribe(Box::new(move |p| s.borrow_mut().push(p))).cancel();

        assert_eq!(*seen.borrow(), vec![None]);
        assert_eq!(provider.sign_in().await.unwrap_err().message, "not configured");
        assert!(provider.id_token().await.is_err());
        assert!(provider.sign_out().await.is_ok());
    }

    #[test]
    fn test_unconfigured_firebase_falls_back() {
        let config = FirebaseConfig {
            api_key: String::new(),
            auth_domain: String::new(),
            project_id: String::new(),
            app_id: String::new(),
        };
        let provider = connect_identity(&config);
        let seen = Rc::new(RefCell::new(0));
        let s = Rc::clone(&seen);
        provider
            .subscribe(Box::new(move |p| {
                assert!(p.is_none());
                *s.borrow_mut() += 1;
            }))
            .cancel();
        assert_eq!(*seen.borrow(), 1);
    }
}

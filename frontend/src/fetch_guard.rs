//! 过期响应保护
//!
//! 页面可能在请求返回前被卸载，或在旧请求返回前发起了新请求。
//! 每次发起请求领取一张 `RequestTicket`，响应返回时先检查票据是否仍然有效，
//! 无效则直接丢弃结果，不再写入任何信号。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// 某个页面上 "最新一次请求" 的序号
#[derive(Debug, Clone, Default)]
pub struct LatestRequest {
    seq: Arc<AtomicU64>,
    closed: Arc<AtomicBool>,
}

/// 单次请求的票据
#[derive(Debug, Clone)]
pub struct RequestTicket {
    id: u64,
    seq: Arc<AtomicU64>,
    closed: Arc<AtomicBool>,
}

impl LatestRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// 发起新请求：之前领取的票据全部失效
    pub fn begin(&self) -> RequestTicket {
        let id = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        RequestTicket {
            id,
            seq: Arc::clone(&self.seq),
            closed: Arc::clone(&self.closed),
        }
    }

    /// 页面卸载：所有票据失效，且之后领取的票据也无效
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl RequestTicket {
    /// 结果是否仍应写回页面
    pub fn is_current(&self) -> bool {
        !self.closed.load(Ordering::SeqCst) && self.seq.load(Ordering::SeqCst) == self.id
    }
}
